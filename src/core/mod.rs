mod engine;
mod error;
mod ledger;
mod market;
mod payout;
mod session;
mod types;

pub use engine::{projection_rng, run_projection, run_projection_with};
pub use error::{MAX_PROJECTION_YEARS, ProjectionError, validate};
pub use ledger::{BlendedTaxRate, DistributionTax, Lot, TaxLotLedger, capital_gains_tax};
pub use market::{
    AnnualTargetGenerator, BetaDriftGenerator, PricePathGenerator, YearRegimeParams,
    price_generator, standard_normal,
};
pub use payout::{
    DistributionModel, RocPayout, SteadyYieldModel, VrpDistributionModel, distribution_model,
};
pub use session::SimulationSession;
pub use types::{
    DistributionModelKind, MarketRegime, MonthlyRecord, PriceModel, Projection,
    ProjectionSummary, SimulationParameters, TaxSettings, YearlyAggregate,
};
