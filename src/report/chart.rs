use serde::Serialize;

use crate::core::YearlyAggregate;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartAxis {
    /// Left axis, currency amounts.
    Currency,
    /// Right axis, share price.
    Price,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub label: &'static str,
    pub axis: ChartAxis,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub labels: Vec<i32>,
    pub series: Vec<ChartSeries>,
}

pub fn chart_data(years: &[YearlyAggregate]) -> ChartData {
    let series = |label, axis, value: fn(&YearlyAggregate) -> f64| ChartSeries {
        label,
        axis,
        values: years.iter().map(value).collect(),
    };

    ChartData {
        labels: years.iter().map(|y| y.year).collect(),
        series: vec![
            series("Total Balance", ChartAxis::Currency, |y| y.end_balance),
            series("Annual ROC", ChartAxis::Currency, |y| y.roc_received),
            series("Share Price", ChartAxis::Price, |y| y.share_price),
        ],
    }
}
