use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::debug;

use super::error::{ProjectionError, validate};
use super::ledger::{BlendedTaxRate, TaxLotLedger};
use super::market::{PricePathGenerator, price_generator};
use super::payout::{DistributionModel, distribution_model};
use super::types::{
    MonthlyRecord, Projection, ProjectionSummary, SimulationParameters, YearlyAggregate,
};

#[derive(Debug)]
struct Position {
    total_shares: f64,
    share_price: f64,
    total_principal: f64,
    total_roc: f64,
    total_roc_reinvested: f64,
    total_tax_deferred: f64,
    total_taxes_paid: f64,
}

#[derive(Debug, Clone, Copy)]
struct CalendarMonth {
    month: u32,
    year: i32,
}

impl CalendarMonth {
    fn at(params: &SimulationParameters, month_index: usize) -> Self {
        let offset = params.start_month as i64 - 1 + month_index as i64;
        Self {
            month: (offset % 12) as u32 + 1,
            year: params.start_year + (offset / 12) as i32,
        }
    }
}

#[derive(Debug, Default)]
struct YearBucket {
    end_balance: f64,
    roc_received: f64,
    share_price: f64,
}

impl YearBucket {
    fn fold(&mut self, record: &MonthlyRecord) {
        self.end_balance = record.balance;
        self.roc_received += record.monthly_roc;
        self.share_price = record.share_price;
    }

    fn flush(&mut self, year: i32) -> YearlyAggregate {
        let bucket = std::mem::take(self);
        YearlyAggregate {
            year,
            end_balance: bucket.end_balance,
            roc_received: bucket.roc_received,
            share_price: bucket.share_price,
        }
    }
}

/// Random source for a projection: reproducible when seeded, fresh entropy
/// otherwise.
pub fn projection_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

pub fn run_projection(params: &SimulationParameters) -> Result<Projection, ProjectionError> {
    let generator = price_generator(params.price_model);
    let model = distribution_model(params.distribution_model);
    let mut rng = projection_rng(params.seed);
    run_projection_with(params, generator.as_ref(), model.as_ref(), &mut rng)
}

pub fn run_projection_with(
    params: &SimulationParameters,
    generator: &dyn PricePathGenerator,
    model: &dyn DistributionModel,
    rng: &mut dyn RngCore,
) -> Result<Projection, ProjectionError> {
    validate(params)?;

    let total_months = params.total_months();
    debug!(
        total_months,
        regime = params.market_regime.as_str(),
        price_model = generator.name(),
        distribution_model = model.name(),
        seeded = params.seed.is_some(),
        "starting projection"
    );

    let trends = generator.generate(
        total_months,
        params.market_regime,
        params.initial_share_price,
        rng,
    );

    let mut ledger = TaxLotLedger::new(BlendedTaxRate::from_settings(&params.tax));
    let mut position = Position {
        total_shares: params.initial_balance / params.initial_share_price,
        share_price: params.initial_share_price,
        total_principal: params.initial_balance,
        total_roc: 0.0,
        total_roc_reinvested: 0.0,
        total_tax_deferred: 0.0,
        total_taxes_paid: 0.0,
    };
    ledger.add_lot(position.total_shares, params.initial_share_price, 0);

    let target_monthly_rate = params.target_monthly_rate();
    let mut months = Vec::with_capacity(total_months);
    let mut years = Vec::with_capacity(params.projection_years() as usize + 1);
    let mut bucket = YearBucket::default();

    for (month, &trend) in trends.iter().enumerate() {
        let calendar = CalendarMonth::at(params, month);
        let age = params.current_age + (month / 12) as u32;
        let accumulating = age < params.target_age;

        position.share_price *= 1.0 + trend;

        if accumulating {
            let shares_added = shares_for(params.monthly_contribution, position.share_price);
            position.total_shares += shares_added;
            position.total_principal += params.monthly_contribution;
            ledger.add_lot(shares_added, position.share_price, month);
        }

        let balance = position.total_shares * position.share_price;
        let payout = model.monthly_distribution(
            balance,
            target_monthly_rate,
            trend,
            position.total_shares,
            rng,
        );
        position.total_roc += payout.amount;

        if accumulating {
            let shares_from_roc = shares_for(payout.amount, position.share_price);
            position.total_shares += shares_from_roc;
            position.total_roc_reinvested += payout.amount;
            ledger.add_lot(shares_from_roc, position.share_price, month);
        }

        let tax = ledger.apply_distribution(payout.per_share);
        position.total_tax_deferred += tax.tax_deferred;
        position.total_taxes_paid += tax.taxes_paid;

        let record = MonthlyRecord {
            month: calendar.month,
            year: calendar.year,
            age,
            shares: position.total_shares,
            share_price: position.share_price,
            total_invested: position.total_principal,
            balance,
            monthly_roc: payout.amount,
            total_roc: position.total_roc,
            tax_deferred: tax.tax_deferred,
            taxes_paid: tax.taxes_paid,
            cost_basis: ledger.total_cost_basis(),
            trend,
            capital_gains_tax: None,
        };
        bucket.fold(&record);
        months.push(record);

        if (month + 1) % 12 == 0 || month + 1 == total_months {
            years.push(bucket.flush(calendar.year));
        }
    }

    let final_balance = months
        .last()
        .map(|record| record.balance)
        .unwrap_or(position.total_shares * position.share_price);
    let final_cost_basis = ledger.total_cost_basis();
    let capital_gains_tax = ledger.capital_gains_tax(final_balance, params.tax.capital_gains_rate);

    if let Some(last) = months.last_mut() {
        last.taxes_paid += capital_gains_tax;
        last.capital_gains_tax = Some(capital_gains_tax);
    }

    let summary = summarize(
        params,
        &months,
        &position,
        final_balance,
        final_cost_basis,
        capital_gains_tax,
    );

    debug!(
        final_balance = summary.final_balance,
        total_roc = summary.total_roc,
        total_taxes_paid = summary.total_taxes_paid,
        lots = ledger.lots().len(),
        "projection finished"
    );

    Ok(Projection {
        months,
        years,
        summary,
        running_total_roc: position.total_roc,
    })
}

fn shares_for(cash: f64, share_price: f64) -> f64 {
    if share_price > 0.0 {
        cash / share_price
    } else {
        0.0
    }
}

fn summarize(
    params: &SimulationParameters,
    months: &[MonthlyRecord],
    position: &Position,
    final_balance: f64,
    final_cost_basis: f64,
    capital_gains_tax: f64,
) -> ProjectionSummary {
    let total_roc: f64 = months.iter().map(|record| record.monthly_roc).sum();
    let latest_annual_roc: f64 = months
        .iter()
        .rev()
        .take(12)
        .map(|record| record.monthly_roc)
        .sum();
    let total_invested = position.total_principal + position.total_roc_reinvested;

    let initial_price = params.initial_share_price;
    let final_price = position.share_price;
    let projection_years = params.projection_years().max(1) as f64;
    let total_market_growth_pct = (final_price - initial_price) / initial_price * 100.0;
    let avg_annual_market_growth_pct =
        ((final_price / initial_price).powf(1.0 / projection_years) - 1.0) * 100.0;

    ProjectionSummary {
        final_balance,
        total_principal: position.total_principal,
        total_invested,
        total_roc_reinvested: position.total_roc_reinvested,
        total_roc,
        latest_annual_roc,
        total_tax_deferred: position.total_tax_deferred,
        roc_taxes_paid: position.total_taxes_paid,
        capital_gains_tax,
        total_taxes_paid: position.total_taxes_paid + capital_gains_tax,
        final_cost_basis,
        total_gain: final_balance - total_invested + total_roc,
        target_year: params.start_year + (params.target_age - params.current_age) as i32,
        final_share_price: final_price,
        total_market_growth_pct,
        avg_annual_market_growth_pct,
    }
}
