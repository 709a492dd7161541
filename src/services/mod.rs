pub mod checker;
pub mod report;

pub use checker::Checker;
pub use report::{build_rows, render_table, write_csv, ReportRow, ReportTotals, WalletReport};
