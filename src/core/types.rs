use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketRegime {
    Bullish,
    Bearish,
    Neutral,
    Random,
}

impl MarketRegime {
    pub fn as_str(self) -> &'static str {
        match self {
            MarketRegime::Bullish => "bullish",
            MarketRegime::Bearish => "bearish",
            MarketRegime::Neutral => "neutral",
            MarketRegime::Random => "random",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PriceModel {
    BetaDrift,
    /// `mean_reversion` is the yearly strength of the pull back toward the
    /// initial price; 0 disables it.
    AnnualTarget { mean_reversion: f64 },
}

impl PriceModel {
    pub fn as_str(self) -> &'static str {
        match self {
            PriceModel::BetaDrift => "beta-drift",
            PriceModel::AnnualTarget { .. } => "annual-target",
        }
    }

    pub fn mean_reversion(self) -> f64 {
        match self {
            PriceModel::BetaDrift => 0.0,
            PriceModel::AnnualTarget { mean_reversion } => mean_reversion,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DistributionModelKind {
    Vrp,
    SteadyYield,
}

impl DistributionModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DistributionModelKind::Vrp => "vrp",
            DistributionModelKind::SteadyYield => "steady-yield",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TaxSettings {
    pub long_term_rate: f64,
    pub short_term_rate: f64,
    pub long_term_share: f64,
    pub capital_gains_rate: f64,
}

impl Default for TaxSettings {
    fn default() -> Self {
        Self {
            long_term_rate: 0.15,
            short_term_rate: 0.24,
            long_term_share: 0.60,
            capital_gains_rate: 0.20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationParameters {
    pub initial_balance: f64,
    pub initial_share_price: f64,
    pub monthly_contribution: f64,
    pub current_age: u32,
    pub target_age: u32,
    pub sell_age: u32,
    pub annual_roc_rate: f64,
    pub market_regime: MarketRegime,
    pub price_model: PriceModel,
    pub distribution_model: DistributionModelKind,
    pub tax: TaxSettings,
    pub start_year: i32,
    pub start_month: u32,
    pub seed: Option<u64>,
}

impl SimulationParameters {
    pub fn total_months(&self) -> usize {
        12 * self.sell_age.saturating_sub(self.current_age) as usize
    }

    pub fn projection_years(&self) -> u32 {
        self.sell_age.saturating_sub(self.current_age)
    }

    pub fn target_monthly_rate(&self) -> f64 {
        self.annual_roc_rate / 12.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecord {
    pub month: u32,
    pub year: i32,
    pub age: u32,
    pub shares: f64,
    pub share_price: f64,
    pub total_invested: f64,
    pub balance: f64,
    pub monthly_roc: f64,
    pub total_roc: f64,
    pub tax_deferred: f64,
    pub taxes_paid: f64,
    pub cost_basis: f64,
    pub trend: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capital_gains_tax: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyAggregate {
    pub year: i32,
    pub end_balance: f64,
    pub roc_received: f64,
    pub share_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub final_balance: f64,
    pub total_principal: f64,
    pub total_invested: f64,
    pub total_roc_reinvested: f64,
    pub total_roc: f64,
    pub latest_annual_roc: f64,
    pub total_tax_deferred: f64,
    pub roc_taxes_paid: f64,
    pub capital_gains_tax: f64,
    pub total_taxes_paid: f64,
    pub final_cost_basis: f64,
    pub total_gain: f64,
    pub target_year: i32,
    pub final_share_price: f64,
    pub total_market_growth_pct: f64,
    pub avg_annual_market_growth_pct: f64,
}

#[derive(Debug, Clone)]
pub struct Projection {
    pub months: Vec<MonthlyRecord>,
    pub years: Vec<YearlyAggregate>,
    pub summary: ProjectionSummary,
    /// Running sum of distributions kept by the month loop, independent of
    /// the per-record amounts.
    pub running_total_roc: f64,
}
