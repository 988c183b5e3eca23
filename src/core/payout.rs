use rand::{Rng, RngCore};

use super::types::DistributionModelKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocPayout {
    pub amount: f64,
    pub per_share: f64,
}

impl RocPayout {
    fn new(amount: f64, total_shares: f64) -> Self {
        let per_share = if total_shares > 0.0 {
            amount / total_shares
        } else {
            0.0
        };
        Self { amount, per_share }
    }
}

/// Turns the month's balance and realized price move into the cash paid out
/// as return of capital.
pub trait DistributionModel {
    fn name(&self) -> &'static str;

    fn monthly_distribution(
        &self,
        balance: f64,
        target_monthly_rate: f64,
        monthly_return: f64,
        total_shares: f64,
        rng: &mut dyn RngCore,
    ) -> RocPayout;
}

pub fn distribution_model(kind: DistributionModelKind) -> Box<dyn DistributionModel> {
    match kind {
        DistributionModelKind::Vrp => Box::new(VrpDistributionModel::default()),
        DistributionModelKind::SteadyYield => Box::new(SteadyYieldModel::default()),
    }
}

/// Volatility-risk-premium approximation: premium collected on the whole
/// balance, minus what sold calls give back when the month moves more than
/// a typical month.
#[derive(Debug, Clone, Copy)]
pub struct VrpDistributionModel {
    pub premium_markup: f64,
    pub typical_monthly_volatility: f64,
    pub payout_haircut: f64,
    pub variation: f64,
    pub floor_rate: f64,
}

impl Default for VrpDistributionModel {
    fn default() -> Self {
        Self {
            premium_markup: 1.03,
            typical_monthly_volatility: 0.015,
            payout_haircut: 0.5,
            variation: 0.05,
            floor_rate: 0.002,
        }
    }
}

impl VrpDistributionModel {
    pub fn premium(&self, balance: f64, target_monthly_rate: f64) -> f64 {
        balance * target_monthly_rate * self.premium_markup
    }

    pub fn option_payout(&self, balance: f64, monthly_return: f64) -> f64 {
        let excess_move = (monthly_return.abs() - self.typical_monthly_volatility).max(0.0);
        excess_move * balance * self.payout_haircut
    }
}

impl DistributionModel for VrpDistributionModel {
    fn name(&self) -> &'static str {
        "vrp"
    }

    fn monthly_distribution(
        &self,
        balance: f64,
        target_monthly_rate: f64,
        monthly_return: f64,
        total_shares: f64,
        rng: &mut dyn RngCore,
    ) -> RocPayout {
        let net = self.premium(balance, target_monthly_rate) - self.option_payout(balance, monthly_return);
        let amount = (net * variation_factor(self.variation, rng)).max(balance * self.floor_rate);
        RocPayout::new(amount, total_shares)
    }
}

/// Pays the target rate on the balance regardless of how the month moved.
#[derive(Debug, Clone, Copy)]
pub struct SteadyYieldModel {
    pub variation: f64,
    pub floor_rate: f64,
}

impl Default for SteadyYieldModel {
    fn default() -> Self {
        Self {
            variation: 0.05,
            floor_rate: 0.002,
        }
    }
}

impl DistributionModel for SteadyYieldModel {
    fn name(&self) -> &'static str {
        "steady-yield"
    }

    fn monthly_distribution(
        &self,
        balance: f64,
        target_monthly_rate: f64,
        _monthly_return: f64,
        total_shares: f64,
        rng: &mut dyn RngCore,
    ) -> RocPayout {
        let amount = (balance * target_monthly_rate * variation_factor(self.variation, rng))
            .max(balance * self.floor_rate);
        RocPayout::new(amount, total_shares)
    }
}

fn variation_factor(variation: f64, rng: &mut dyn RngCore) -> f64 {
    1.0 + (rng.r#gen::<f64>() * 2.0 - 1.0) * variation
}
