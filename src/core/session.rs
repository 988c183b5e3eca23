use super::engine::run_projection;
use super::error::ProjectionError;
use super::types::{MonthlyRecord, Projection, SimulationParameters, YearlyAggregate};

/// Caller-owned holder for the most recent projection. Report and export
/// code takes it by reference instead of reading shared state.
#[derive(Debug, Default)]
pub struct SimulationSession {
    latest: Option<(SimulationParameters, Projection)>,
}

impl SimulationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a projection and replaces the stored result. On a validation
    /// failure the previous result is left untouched.
    pub fn run(&mut self, params: SimulationParameters) -> Result<&Projection, ProjectionError> {
        let projection = run_projection(&params)?;
        let (_, projection) = self.latest.insert((params, projection));
        Ok(projection)
    }

    pub fn parameters(&self) -> Option<&SimulationParameters> {
        self.latest.as_ref().map(|(params, _)| params)
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.latest.as_ref().map(|(_, projection)| projection)
    }

    pub fn months(&self) -> &[MonthlyRecord] {
        self.projection()
            .map(|projection| projection.months.as_slice())
            .unwrap_or(&[])
    }

    pub fn years(&self) -> &[YearlyAggregate] {
        self.projection()
            .map(|projection| projection.years.as_slice())
            .unwrap_or(&[])
    }

    pub fn clear(&mut self) {
        self.latest = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DistributionModelKind, MarketRegime, PriceModel, TaxSettings};

    fn params(seed: u64) -> SimulationParameters {
        SimulationParameters {
            initial_balance: 5_000.0,
            initial_share_price: 50.0,
            monthly_contribution: 100.0,
            current_age: 30,
            target_age: 32,
            sell_age: 33,
            annual_roc_rate: 0.12,
            market_regime: MarketRegime::Random,
            price_model: PriceModel::BetaDrift,
            distribution_model: DistributionModelKind::Vrp,
            tax: TaxSettings::default(),
            start_year: 2026,
            start_month: 3,
            seed: Some(seed),
        }
    }

    #[test]
    fn empty_session_exposes_no_records() {
        let session = SimulationSession::new();
        assert!(session.projection().is_none());
        assert!(session.months().is_empty());
        assert!(session.years().is_empty());
    }

    #[test]
    fn run_replaces_latest_projection() {
        let mut session = SimulationSession::new();
        session.run(params(1)).expect("valid params");
        let first = session.months().to_vec();

        session.run(params(2)).expect("valid params");
        assert_eq!(session.months().len(), 36);
        assert_ne!(session.months(), first.as_slice());
        assert_eq!(session.parameters().and_then(|p| p.seed), Some(2));
    }

    #[test]
    fn failed_run_keeps_previous_projection() {
        let mut session = SimulationSession::new();
        session.run(params(1)).expect("valid params");

        let mut invalid = params(2);
        invalid.target_age = invalid.current_age;
        assert!(session.run(invalid).is_err());
        assert_eq!(session.parameters().and_then(|p| p.seed), Some(1));
        assert_eq!(session.years().len(), 3);
    }

    #[test]
    fn clear_drops_results() {
        let mut session = SimulationSession::new();
        session.run(params(1)).expect("valid params");
        session.clear();
        assert!(session.months().is_empty());
    }
}
