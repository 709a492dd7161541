//! Checker rows, the totals row, and their table/CSV renderings.

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::adapters::RankStats;
use crate::domain::{wei_to_decimal, wei_to_native, PointTotals};
use crate::error::Result;

/// Everything collected for one wallet; built by one worker, never mutated
#[derive(Debug, Clone)]
pub struct WalletReport {
    pub index: usize,
    pub address: Address,
    pub eth_wei: U256,
    pub weth_wei: U256,
    pub today_txns: usize,
    pub all_txns: usize,
    /// `None` when the rank API failed
    pub rank: Option<RankStats>,
    /// Today's points
    pub points: PointTotals,
    pub today_fees_wei: U256,
    pub all_fees_wei: U256,
}

impl WalletReport {
    pub fn is_banned(&self) -> bool {
        self.rank.as_ref().map(|r| r.blacklisted).unwrap_or(false)
    }
}

/// Sums over every wallet row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportTotals {
    pub eth_wei: U256,
    pub weth_wei: U256,
    pub today_txns: usize,
    pub all_txns: usize,
    pub banned: usize,
    pub wallets: usize,
    pub today_fees_wei: U256,
    pub all_fees_wei: U256,
}

impl ReportTotals {
    /// Fold the finished per-wallet reports
    pub fn from_reports(reports: &[WalletReport]) -> Self {
        reports.iter().fold(Self::default(), |acc, r| Self {
            eth_wei: acc.eth_wei.saturating_add(r.eth_wei),
            weth_wei: acc.weth_wei.saturating_add(r.weth_wei),
            today_txns: acc.today_txns + r.today_txns,
            all_txns: acc.all_txns + r.all_txns,
            banned: acc.banned + usize::from(r.is_banned()),
            wallets: acc.wallets + 1,
            today_fees_wei: acc.today_fees_wei.saturating_add(r.today_fees_wei),
            all_fees_wei: acc.all_fees_wei.saturating_add(r.all_fees_wei),
        })
    }
}

/// One rendered line of the checker table
#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct ReportRow {
    #[tabled(rename = "№")]
    pub number: String,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "ETH")]
    pub eth: String,
    #[tabled(rename = "WETH")]
    pub weth: String,
    #[tabled(rename = "Txns\n24h|all")]
    pub txns: String,
    #[tabled(rename = "Score")]
    pub score: String,
    #[tabled(rename = "Rank")]
    pub rank: String,
    #[tabled(rename = "LVL")]
    pub level: String,
    #[tabled(rename = "Ban")]
    pub ban: String,
    #[tabled(rename = "Vol\n(%)")]
    pub volume_pct: String,
    #[tabled(rename = "Gas\n(%)")]
    pub gas_pct: String,
    #[tabled(rename = "Gas ($)\n24h|all")]
    pub gas_usd: String,
}

pub const TOTAL_LABEL: &str = "Total";

impl ReportRow {
    pub fn wallet(report: &WalletReport, target: f64, eth_price: Decimal) -> Self {
        let checksum = report.address.to_checksum(None);
        let (score, rank, level, ban) = match &report.rank {
            Some(stats) => (
                group_thousands(stats.score.max(0.0).round() as u64),
                format!("#{}", group_thousands(stats.rank)),
                stats.level().to_string(),
                ban_mark(stats.blacklisted).to_string(),
            ),
            None => ("-".into(), "-".into(), "-".into(), "-".into()),
        };

        Self {
            number: report.index.to_string(),
            address: format!("{}...{}", &checksum[..5], &checksum[checksum.len() - 5..]),
            eth: format!("{:.5}", wei_to_native(report.eth_wei)),
            weth: format!("{:.5}", wei_to_native(report.weth_wei)),
            txns: format!(
                "{}|{}",
                group_thousands(report.today_txns as u64),
                group_thousands(report.all_txns as u64)
            ),
            score,
            rank,
            level,
            ban,
            volume_pct: format!("{:.1}%", report.points.volume_progress_pct(target)),
            gas_pct: format!("{:.1}%", report.points.gas_progress_pct(target)),
            gas_usd: format!(
                "{}|{}",
                usd(report.today_fees_wei, eth_price),
                usd(report.all_fees_wei, eth_price)
            ),
        }
    }

    pub fn totals(totals: &ReportTotals, eth_price: Decimal) -> Self {
        Self {
            number: TOTAL_LABEL.to_string(),
            address: String::new(),
            eth: format!("{:.5}", wei_to_native(totals.eth_wei)),
            weth: format!("{:.5}", wei_to_native(totals.weth_wei)),
            txns: format!(
                "{}|{}",
                group_thousands(totals.today_txns as u64),
                group_thousands(totals.all_txns as u64)
            ),
            score: String::new(),
            rank: String::new(),
            level: String::new(),
            ban: format!("{}/{}", totals.banned, totals.wallets),
            volume_pct: String::new(),
            gas_pct: String::new(),
            gas_usd: format!(
                "{}|{}",
                usd(totals.today_fees_wei, eth_price),
                usd(totals.all_fees_wei, eth_price)
            ),
        }
    }

    pub fn is_total(&self) -> bool {
        self.number == TOTAL_LABEL
    }
}

/// Wallet rows ordered by index, then the totals row
pub fn build_rows(mut reports: Vec<WalletReport>, target: f64, eth_price: Decimal) -> Vec<ReportRow> {
    reports.sort_by_key(|r| r.index);
    let totals = ReportTotals::from_reports(&reports);

    let mut rows: Vec<ReportRow> = reports
        .iter()
        .map(|r| ReportRow::wallet(r, target, eth_price))
        .collect();
    rows.push(ReportRow::totals(&totals, eth_price));
    rows
}

pub fn render_table(rows: &[ReportRow]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Write `rows` as CSV, replacing any file already at `path`
pub fn write_csv(rows: &[ReportRow], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let headers: Vec<String> = ReportRow::headers()
        .iter()
        .map(|h| csv_field(&h.replace('\n', " ")))
        .collect();
    writeln!(writer, "{}", headers.join(","))?;

    for row in rows {
        let fields: Vec<String> = row.fields().iter().map(|f| csv_field(f)).collect();
        writeln!(writer, "{}", fields.join(","))?;
    }

    writer.flush()?;
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn ban_mark(blacklisted: bool) -> &'static str {
    if blacklisted {
        "✅"
    } else {
        "❌"
    }
}

fn usd(fees_wei: U256, eth_price: Decimal) -> String {
    let value = (wei_to_decimal(fees_wei) * eth_price).round_dp(2);
    format!("{:.2}", value)
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
