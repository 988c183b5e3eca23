use serde::Serialize;

use super::types::TaxSettings;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    shares: f64,
    cost_basis_per_share: f64,
    total_cost_basis: f64,
    month_added: usize,
}

impl Lot {
    pub fn shares(&self) -> f64 {
        self.shares
    }

    pub fn cost_basis_per_share(&self) -> f64 {
        self.cost_basis_per_share
    }

    pub fn total_cost_basis(&self) -> f64 {
        self.total_cost_basis
    }

    pub fn month_added(&self) -> usize {
        self.month_added
    }

    fn set_cost_basis_per_share(&mut self, value: f64) {
        debug_assert!(value >= 0.0 && value <= self.cost_basis_per_share);
        self.cost_basis_per_share = value.max(0.0);
        self.total_cost_basis = self.shares * self.cost_basis_per_share;
    }
}

/// Weighted long/short split used for Section 1256-style contracts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendedTaxRate(f64);

impl BlendedTaxRate {
    pub fn new(long_term_rate: f64, short_term_rate: f64, long_term_share: f64) -> Self {
        Self(long_term_share * long_term_rate + (1.0 - long_term_share) * short_term_rate)
    }

    pub fn from_settings(tax: &TaxSettings) -> Self {
        Self::new(tax.long_term_rate, tax.short_term_rate, tax.long_term_share)
    }

    pub fn rate(self) -> f64 {
        self.0
    }
}

impl Default for BlendedTaxRate {
    fn default() -> Self {
        Self::from_settings(&TaxSettings::default())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistributionTax {
    pub tax_deferred: f64,
    pub taxes_paid: f64,
}

/// Purchase lots in creation order.
///
/// A distribution is applied pro rata to every lot each month, not consumed
/// from the oldest lot first.
#[derive(Debug, Clone)]
pub struct TaxLotLedger {
    lots: Vec<Lot>,
    blended_rate: BlendedTaxRate,
}

impl TaxLotLedger {
    pub fn new(blended_rate: BlendedTaxRate) -> Self {
        Self {
            lots: Vec::new(),
            blended_rate,
        }
    }

    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    pub fn blended_rate(&self) -> BlendedTaxRate {
        self.blended_rate
    }

    /// Records a purchase. Purchases that buy no shares are ignored.
    pub fn add_lot(&mut self, shares: f64, cost_basis_per_share: f64, month_added: usize) -> bool {
        if !shares.is_finite()
            || shares <= 0.0
            || cost_basis_per_share.is_nan()
            || cost_basis_per_share < 0.0
        {
            return false;
        }

        self.lots.push(Lot {
            shares,
            cost_basis_per_share,
            total_cost_basis: shares * cost_basis_per_share,
            month_added,
        });
        true
    }

    pub fn apply_distribution(&mut self, per_share: f64) -> DistributionTax {
        let rate = self.blended_rate.rate();
        let mut result = DistributionTax::default();
        if per_share.is_nan() || per_share <= 0.0 {
            return result;
        }

        for lot in &mut self.lots {
            if lot.cost_basis_per_share > 0.0 {
                let reduction = per_share.min(lot.cost_basis_per_share);
                lot.set_cost_basis_per_share(lot.cost_basis_per_share - reduction);
                result.tax_deferred += reduction * lot.shares;

                if lot.cost_basis_per_share == 0.0 && per_share > reduction {
                    let taxable_gain = (per_share - reduction) * lot.shares;
                    result.taxes_paid += taxable_gain * rate;
                }
            } else {
                result.taxes_paid += per_share * lot.shares * rate;
            }
        }

        result
    }

    pub fn total_cost_basis(&self) -> f64 {
        self.lots.iter().map(|lot| lot.total_cost_basis).sum()
    }

    pub fn total_shares(&self) -> f64 {
        self.lots.iter().map(|lot| lot.shares).sum()
    }

    pub fn capital_gains_tax(&self, final_balance: f64, rate: f64) -> f64 {
        capital_gains_tax(final_balance, self.total_cost_basis(), rate)
    }
}

pub fn capital_gains_tax(final_balance: f64, cost_basis: f64, rate: f64) -> f64 {
    let gain = final_balance - cost_basis;
    if gain > 0.0 { gain * rate } else { 0.0 }
}
