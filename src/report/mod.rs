mod chart;
mod export;
mod format;

pub use chart::{ChartAxis, ChartData, ChartSeries, chart_data};
pub use export::{CSV_HEADERS, DEFAULT_CSV_FILE_NAME, csv_string, format_trend, write_csv};
pub use format::{
    RowHighlight, SummaryCard, TaxBreakdown, format_currency, format_percent, format_price,
    row_highlight, summary_cards, tax_breakdown,
};
