use std::f64::consts::PI;

use rand::{Rng, RngCore};

use super::types::{MarketRegime, PriceModel};

/// Produces the monthly fractional price returns for a whole projection.
///
/// Every call consumes fresh draws from `rng`, so two calls with the same
/// regime give different paths unless the caller reseeds.
pub trait PricePathGenerator {
    fn name(&self) -> &'static str;

    fn generate(
        &self,
        month_count: usize,
        regime: MarketRegime,
        initial_price: f64,
        rng: &mut dyn RngCore,
    ) -> Vec<f64>;
}

pub fn price_generator(model: PriceModel) -> Box<dyn PricePathGenerator> {
    match model {
        PriceModel::BetaDrift => Box::new(BetaDriftGenerator::default()),
        PriceModel::AnnualTarget { mean_reversion } => Box::new(AnnualTargetGenerator {
            mean_reversion,
            ..AnnualTargetGenerator::default()
        }),
    }
}

/// Random walk with drift around the underlying index's long-run monthly
/// statistics, scaled down by the income vehicle's market sensitivity.
#[derive(Debug, Clone, Copy)]
pub struct BetaDriftGenerator {
    pub index_annual_return: f64,
    pub index_annual_volatility: f64,
    pub sensitivity: f64,
    pub bullish_annual_target: f64,
    pub bearish_drift_multiplier: f64,
    pub bearish_volatility_multiplier: f64,
}

impl Default for BetaDriftGenerator {
    fn default() -> Self {
        Self {
            index_annual_return: 0.13,
            index_annual_volatility: 0.20,
            sensitivity: 0.1,
            bullish_annual_target: 0.03,
            bearish_drift_multiplier: -2.0,
            bearish_volatility_multiplier: 1.5,
        }
    }
}

impl BetaDriftGenerator {
    pub fn base_monthly_drift(&self) -> f64 {
        self.index_annual_return / 12.0 * self.sensitivity
    }

    pub fn base_monthly_volatility(&self) -> f64 {
        self.index_annual_volatility / 12.0_f64.sqrt() * self.sensitivity
    }

    fn regime_drift_and_volatility(&self, regime: MarketRegime) -> (f64, f64) {
        let drift = self.base_monthly_drift();
        let vol = self.base_monthly_volatility();
        match regime {
            MarketRegime::Bullish => (self.bullish_annual_target / 12.0, vol),
            MarketRegime::Bearish => (
                drift * self.bearish_drift_multiplier,
                vol * self.bearish_volatility_multiplier,
            ),
            MarketRegime::Neutral => (0.0, 0.0),
            MarketRegime::Random => (drift, vol),
        }
    }
}

impl PricePathGenerator for BetaDriftGenerator {
    fn name(&self) -> &'static str {
        "beta-drift"
    }

    fn generate(
        &self,
        month_count: usize,
        regime: MarketRegime,
        _initial_price: f64,
        rng: &mut dyn RngCore,
    ) -> Vec<f64> {
        if regime == MarketRegime::Neutral {
            return vec![0.0; month_count];
        }

        let (drift, vol) = self.regime_drift_and_volatility(regime);
        (0..month_count)
            .map(|_| drift + standard_normal(rng) * vol)
            .collect()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum YearRegime {
    Bull,
    Bear,
    Flat,
}

#[derive(Debug, Clone, Copy)]
pub struct YearRegimeParams {
    pub annual_mean: f64,
    pub annual_volatility: f64,
}

/// Samples one annual target per projection year, spreads it geometrically
/// over the months and optionally pulls the price back toward where it
/// started.
#[derive(Debug, Clone, Copy)]
pub struct AnnualTargetGenerator {
    pub bull: YearRegimeParams,
    pub bear: YearRegimeParams,
    pub flat: YearRegimeParams,
    pub bull_weight: f64,
    pub bear_weight: f64,
    pub monthly_noise: f64,
    pub mean_reversion: f64,
}

impl Default for AnnualTargetGenerator {
    fn default() -> Self {
        Self {
            bull: YearRegimeParams {
                annual_mean: 0.03,
                annual_volatility: 0.06,
            },
            bear: YearRegimeParams {
                annual_mean: -0.08,
                annual_volatility: 0.10,
            },
            flat: YearRegimeParams {
                annual_mean: 0.0,
                annual_volatility: 0.04,
            },
            bull_weight: 0.55,
            bear_weight: 0.25,
            monthly_noise: 0.01,
            mean_reversion: 0.0,
        }
    }
}

impl AnnualTargetGenerator {
    fn sample_year_regime(&self, regime: MarketRegime, rng: &mut dyn RngCore) -> YearRegime {
        match regime {
            MarketRegime::Bullish => YearRegime::Bull,
            MarketRegime::Bearish => YearRegime::Bear,
            MarketRegime::Neutral => YearRegime::Flat,
            MarketRegime::Random => {
                let u: f64 = rng.r#gen();
                if u < self.bull_weight {
                    YearRegime::Bull
                } else if u < self.bull_weight + self.bear_weight {
                    YearRegime::Bear
                } else {
                    YearRegime::Flat
                }
            }
        }
    }

    fn params(&self, regime: YearRegime) -> YearRegimeParams {
        match regime {
            YearRegime::Bull => self.bull,
            YearRegime::Bear => self.bear,
            YearRegime::Flat => self.flat,
        }
    }
}

impl PricePathGenerator for AnnualTargetGenerator {
    fn name(&self) -> &'static str {
        "annual-target"
    }

    fn generate(
        &self,
        month_count: usize,
        regime: MarketRegime,
        initial_price: f64,
        rng: &mut dyn RngCore,
    ) -> Vec<f64> {
        if regime == MarketRegime::Neutral {
            return vec![0.0; month_count];
        }

        let mut returns = Vec::with_capacity(month_count);
        let mut price = initial_price;
        let mut monthly_base = 0.0;

        for month in 0..month_count {
            if month % 12 == 0 {
                let params = self.params(self.sample_year_regime(regime, rng));
                let annual = (params.annual_mean + standard_normal(rng) * params.annual_volatility)
                    .clamp(-0.6, 1.0);
                monthly_base = (1.0 + annual).powf(1.0 / 12.0) - 1.0;
            }

            let shock = standard_normal(rng) * self.monthly_noise;
            let pull = if self.mean_reversion > 0.0 && price > 0.0 && initial_price > 0.0 {
                -self.mean_reversion * (price / initial_price).ln() / 12.0
            } else {
                0.0
            };

            let monthly_return = (monthly_base + shock + pull).max(-0.95);
            price *= 1.0 + monthly_return;
            returns.push(monthly_return);
        }

        returns
    }
}

/// Box–Muller transform over two uniform draws.
pub fn standard_normal(rng: &mut dyn RngCore) -> f64 {
    // gen::<f64>() is in [0, 1); keep ln away from zero.
    let u1 = rng.r#gen::<f64>().max(1e-12);
    let u2 = rng.r#gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
