use std::io;

use crate::core::MonthlyRecord;

pub const CSV_HEADERS: [&str; 13] = [
    "Month",
    "Year",
    "Age",
    "Shares",
    "Share Price",
    "Total Invested",
    "Total Balance",
    "Monthly ROC",
    "Total ROC (Cumulative)",
    "Tax Deferred",
    "Taxes Paid",
    "Cost Basis",
    "Market Trend(%)",
];

pub const DEFAULT_CSV_FILE_NAME: &str = "roc_simulation_results.csv";

pub fn write_csv<W: io::Write>(records: &[MonthlyRecord], writer: W) -> Result<(), csv::Error> {
    let mut out = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    out.write_record(CSV_HEADERS)?;
    for record in records {
        out.write_record(csv_row(record))?;
    }
    out.flush()?;
    Ok(())
}

pub fn csv_string(records: &[MonthlyRecord]) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn csv_row(record: &MonthlyRecord) -> [String; 13] {
    [
        record.month.to_string(),
        record.year.to_string(),
        record.age.to_string(),
        format!("{:.2}", record.shares),
        format!("{:.2}", record.share_price),
        format!("{:.2}", record.total_invested),
        format!("{:.2}", record.balance),
        format!("{:.2}", record.monthly_roc),
        format!("{:.2}", record.total_roc),
        format!("{:.2}", record.tax_deferred),
        format!("{:.2}", record.taxes_paid),
        format!("{:.2}", record.cost_basis),
        format_trend(record.trend),
    ]
}

pub fn format_trend(trend: f64) -> String {
    // -0.0 would print as "-0.00%".
    let pct = if trend == 0.0 { 0.0 } else { trend * 100.0 };
    format!("{pct:+.2}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(month: u32, trend: f64) -> MonthlyRecord {
        MonthlyRecord {
            month,
            year: 2026,
            age: 40,
            shares: 202.06,
            share_price: 50.0,
            total_invested: 10_000.0,
            balance: 10_000.0,
            monthly_roc: 103.456,
            total_roc: 103.456,
            tax_deferred: 104.0609,
            taxes_paid: 0.0,
            cost_basis: 9_998.9391,
            trend,
            capital_gains_tax: None,
        }
    }

    #[test]
    fn header_has_thirteen_fixed_columns() {
        let csv = csv_string(&[]).expect("csv");
        assert_eq!(
            csv.trim_end(),
            "Month,Year,Age,Shares,Share Price,Total Invested,Total Balance,Monthly ROC,\
             Total ROC (Cumulative),Tax Deferred,Taxes Paid,Cost Basis,Market Trend(%)"
        );
    }

    #[test]
    fn rows_round_to_two_decimals_with_signed_trend() {
        let csv = csv_string(&[record(1, 0.012345), record(2, -0.005)]).expect("csv");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "1,2026,40,202.06,50.00,10000.00,10000.00,103.46,103.46,104.06,0.00,9998.94,+1.23%"
        );
        assert!(lines[2].ends_with(",-0.50%"));
        assert!(lines.iter().all(|line| line.split(',').count() == 13));
    }

    #[test]
    fn flat_month_shows_positive_zero_trend() {
        assert_eq!(format_trend(0.0), "+0.00%");
        assert_eq!(format_trend(-0.0), "+0.00%");
    }
}
