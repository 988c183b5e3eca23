use serde::Serialize;

use crate::core::{MonthlyRecord, ProjectionSummary};

/// Whole-dollar currency with thousands separators, e.g. `$12,345`.
pub fn format_currency(value: f64) -> String {
    let dollars = value.abs().round() as i64;
    let sign = if value < 0.0 && dollars > 0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(dollars))
}

/// Share-price style currency with cents, e.g. `$49.87`.
pub fn format_price(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", value.abs())
    } else {
        format!("${value:.2}")
    }
}

pub fn format_percent(value_pct: f64) -> String {
    format!("{value_pct:.2}%")
}

fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCard {
    pub id: &'static str,
    pub label: &'static str,
    pub value: f64,
    pub formatted: String,
    pub negative: bool,
}

impl SummaryCard {
    fn currency(id: &'static str, label: &'static str, value: f64) -> Self {
        Self {
            id,
            label,
            value,
            formatted: format_currency(value),
            negative: value < 0.0,
        }
    }

    fn percent(id: &'static str, label: &'static str, value: f64) -> Self {
        Self {
            id,
            label,
            value,
            formatted: format_percent(value),
            negative: value < 0.0,
        }
    }
}

pub fn summary_cards(summary: &ProjectionSummary) -> Vec<SummaryCard> {
    vec![
        SummaryCard::currency("totalPrincipal", "Total Principal", summary.total_principal),
        SummaryCard::currency("totalInvested", "Total Invested", summary.total_invested),
        SummaryCard::currency("totalGain", "Total Gain", summary.total_gain),
        SummaryCard::currency("finalBalance", "Final Balance", summary.final_balance),
        SummaryCard::currency("totalROC", "Total ROC Received", summary.total_roc),
        SummaryCard::currency(
            "latestAnnualROC",
            "Latest Annual ROC",
            summary.latest_annual_roc,
        ),
        SummaryCard::currency(
            "totalTaxDeferred",
            "Total Tax Deferred",
            summary.total_tax_deferred,
        ),
        SummaryCard::currency("totalROCTaxesPaid", "ROC Taxes Paid", summary.roc_taxes_paid),
        SummaryCard::currency(
            "capitalGainsTax",
            "Capital Gains Tax",
            summary.capital_gains_tax,
        ),
        SummaryCard::currency("totalTaxesPaid", "Total Taxes Paid", summary.total_taxes_paid),
        SummaryCard::currency("finalCostBasis", "Final Cost Basis", summary.final_cost_basis),
        SummaryCard::percent(
            "avgMarketGrowth",
            "Avg Annual Market Growth",
            summary.avg_annual_market_growth_pct,
        ),
        SummaryCard::percent(
            "totalMarketGrowth",
            "Total Market Growth",
            summary.total_market_growth_pct,
        ),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub total: f64,
    pub roc: f64,
    pub sale: f64,
}

/// Splits the final sale month's taxes into the ROC part and the capital
/// gains part. Other months have no breakdown.
pub fn tax_breakdown(record: &MonthlyRecord) -> Option<TaxBreakdown> {
    let sale = record.capital_gains_tax.filter(|tax| *tax > 0.0)?;
    Some(TaxBreakdown {
        total: record.taxes_paid,
        roc: record.taxes_paid - sale,
        sale,
    })
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowHighlight {
    None,
    /// December of the first year without contributions.
    TargetYearEnd,
    /// The final month, where the position is sold.
    Sale,
    /// ROC exceeded basis somewhere and tax was due.
    TaxPaid,
}

pub fn row_highlight(record: &MonthlyRecord, target_age: u32) -> RowHighlight {
    if record.capital_gains_tax.is_some() {
        RowHighlight::Sale
    } else if record.taxes_paid > 0.0 {
        RowHighlight::TaxPaid
    } else if record.age == target_age && record.month == 12 {
        RowHighlight::TargetYearEnd
    } else {
        RowHighlight::None
    }
}
