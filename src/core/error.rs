use thiserror::Error;

use super::types::{PriceModel, SimulationParameters};

/// Longest projection accepted, from current age to sell age.
pub const MAX_PROJECTION_YEARS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("target age ({target}) must be greater than current age ({current})")]
    TargetAgeNotAfterCurrent { current: u32, target: u32 },
    #[error("sell age ({sell}) must be greater than or equal to target age ({target})")]
    SellAgeBeforeTarget { target: u32, sell: u32 },
    #[error("initial share price must be > 0, got {0}")]
    NonPositiveSharePrice(f64),
    #[error("{field} must be >= 0, got {value}")]
    NegativeAmount { field: &'static str, value: f64 },
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("{field} must be between 0 and 1, got {value}")]
    RateOutOfRange { field: &'static str, value: f64 },
    #[error("projection of {years} years exceeds the {max}-year limit")]
    HorizonTooLong { years: u32, max: u32 },
    #[error("start month must be between 1 and 12, got {0}")]
    InvalidStartMonth(u32),
}

pub fn validate(params: &SimulationParameters) -> Result<(), ProjectionError> {
    if params.target_age <= params.current_age {
        return Err(ProjectionError::TargetAgeNotAfterCurrent {
            current: params.current_age,
            target: params.target_age,
        });
    }

    if params.sell_age < params.target_age {
        return Err(ProjectionError::SellAgeBeforeTarget {
            target: params.target_age,
            sell: params.sell_age,
        });
    }

    let years = params.projection_years();
    if years > MAX_PROJECTION_YEARS {
        return Err(ProjectionError::HorizonTooLong {
            years,
            max: MAX_PROJECTION_YEARS,
        });
    }

    let mean_reversion = params.price_model.mean_reversion();
    for (field, value) in [
        ("initial balance", params.initial_balance),
        ("initial share price", params.initial_share_price),
        ("monthly contribution", params.monthly_contribution),
        ("annual ROC rate", params.annual_roc_rate),
        ("mean reversion", mean_reversion),
    ] {
        if !value.is_finite() {
            return Err(ProjectionError::NonFinite { field });
        }
    }

    if params.initial_share_price <= 0.0 {
        return Err(ProjectionError::NonPositiveSharePrice(
            params.initial_share_price,
        ));
    }

    for (field, value) in [
        ("initial balance", params.initial_balance),
        ("monthly contribution", params.monthly_contribution),
        ("annual ROC rate", params.annual_roc_rate),
        ("mean reversion", mean_reversion),
    ] {
        if value < 0.0 {
            return Err(ProjectionError::NegativeAmount { field, value });
        }
    }

    let tax = &params.tax;
    for (field, value) in [
        ("long-term rate", tax.long_term_rate),
        ("short-term rate", tax.short_term_rate),
        ("long-term share", tax.long_term_share),
        ("capital gains rate", tax.capital_gains_rate),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ProjectionError::RateOutOfRange { field, value });
        }
    }

    if !(1..=12).contains(&params.start_month) {
        return Err(ProjectionError::InvalidStartMonth(params.start_month));
    }

    Ok(())
}
