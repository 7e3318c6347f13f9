// Dashboard aggregation - the one piece of real policy in the system.
//
// Given the already-fetched companies, profit centers and one month of
// transactions, build the daily revenue matrix, split actual from projected
// amounts, clip month-to-date at "today", and extrapolate a run-rate
// projection for the current month. Pure function: no I/O, no clock reads,
// no hidden state - the caller supplies both the month and today's date,
// which is what makes this directly unit-testable.

use std::collections::{BTreeMap, HashMap};

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::entities::{
    Company, ProfitCenter, Transaction, UNKNOWN_COMPANY_COLOR, UNKNOWN_COMPANY_NAME,
};

// ============================================================================
// MONTH
// ============================================================================

/// A calendar month, 1-indexed. Parsed from the `YYYY-MM` query form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    /// Parse `YYYY-MM` (4-digit year, month 1-12). Anything else is a
    /// client error at the boundary - the aggregator never sees it.
    pub fn parse(s: &str) -> Result<Self> {
        let (y, m) = s
            .split_once('-')
            .with_context(|| format!("month must be YYYY-MM, got '{}'", s))?;
        if y.len() != 4 {
            bail!("month must be YYYY-MM, got '{}'", s);
        }
        let year: i32 = y
            .parse()
            .with_context(|| format!("invalid year in month '{}'", s))?;
        let month: u32 = m
            .parse()
            .with_context(|| format!("invalid month number in '{}'", s))?;
        if !(1..=12).contains(&month) {
            bail!("month number must be 1-12, got {}", month);
        }
        Ok(Self { year, month })
    }

    /// Days in this month, leap years included.
    pub fn days(&self) -> u32 {
        match self.month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            // February: chrono knows whether the 29th exists this year
            _ => {
                if NaiveDate::from_ymd_opt(self.year, 2, 29).is_some() {
                    29
                } else {
                    28
                }
            }
        }
    }

    /// Zero-padded `YYYY-MM` label, echoed back in the report.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Zero-padded `YYYY-MM-DD` key for one day of this month.
    /// Fixed-width, so lexical order equals chronological order.
    pub fn day_key(&self, day: u32) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, day)
    }

    /// First and last day of the month, as inclusive date-string bounds.
    pub fn date_range(&self) -> (String, String) {
        (self.day_key(1), self.day_key(self.days()))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

// ============================================================================
// REPORT SHAPE
// ============================================================================

/// Per-profit-center slice of the report. Explicitly shaped response struct:
/// storage-only fields are simply never present.
#[derive(Debug, Clone, Serialize)]
pub struct ProfitCenterReport {
    pub id: String,
    pub holding_account_id: String,
    pub company_id: String,
    pub name: String,
    pub display_order: i64,
    pub active: bool,
    pub include_in_projection: Option<bool>,

    /// Owning company's name, or "Unknown" when the reference dangles.
    pub company_name: String,
    pub company_color: String,

    /// Actual cents per day, one entry for every day of the month.
    pub daily: BTreeMap<String, i64>,

    /// Projected (expected, unrealized) cents per day.
    pub daily_projected: BTreeMap<String, i64>,

    /// Actual cents summed over days 1..=day_of_month. Projected amounts
    /// never count here, and neither do actuals dated past "today".
    pub mtd: i64,

    /// Run-rate extrapolation for the current month; equals mtd for a
    /// completed month.
    pub projection: i64,
}

/// A company with its profit-center reports nested, preserving order.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyGroup {
    pub id: String,
    pub holding_account_id: String,
    pub name: String,
    pub color: String,
    pub display_order: i64,
    pub active: bool,
    pub profit_centers: Vec<ProfitCenterReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub month: String,
    pub days_in_month: u32,
    pub day_of_month: u32,
    pub is_current_month: bool,
    pub companies: Vec<CompanyGroup>,
    pub profit_centers: Vec<ProfitCenterReport>,
    pub daily_totals: BTreeMap<String, i64>,
    pub daily_projected_totals: BTreeMap<String, i64>,
    pub grand_mtd: i64,
    pub grand_projection: i64,
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Assemble the monthly dashboard report.
///
/// Inputs are assumed pre-filtered by the caller: active entities for one
/// holding account, transactions with `txn_date` inside `month`. Transactions
/// referencing a profit center not in `profit_centers` are dropped rather
/// than failing the whole report; a profit center whose company is missing
/// gets a neutral placeholder.
pub fn compute_dashboard(
    companies: &[Company],
    profit_centers: &[ProfitCenter],
    transactions: &[Transaction],
    month: Month,
    today: NaiveDate,
) -> DashboardReport {
    let days_in_month = month.days();

    // Day x profit-center accumulator grids, zeroed for the full month so
    // every day shows up in the output even with no transactions.
    let mut actual: HashMap<String, BTreeMap<String, i64>> = HashMap::new();
    let mut projected: HashMap<String, BTreeMap<String, i64>> = HashMap::new();
    for pc in profit_centers {
        let mut zeroed = BTreeMap::new();
        for day in 1..=days_in_month {
            zeroed.insert(month.day_key(day), 0);
        }
        actual.insert(pc.id.clone(), zeroed.clone());
        projected.insert(pc.id.clone(), zeroed);
    }

    for tx in transactions {
        let grid = if tx.is_projected {
            &mut projected
        } else {
            &mut actual
        };
        // Unknown profit center or out-of-month date: silently ignored
        if let Some(days) = grid.get_mut(&tx.profit_center_id) {
            if let Some(cell) = days.get_mut(&tx.txn_date) {
                *cell += tx.amount_cents;
            }
        }
    }

    let is_current_month = month.contains(today);
    // A past month is always complete
    let day_of_month = if is_current_month {
        today.day()
    } else {
        days_in_month
    };

    let mut reports: Vec<ProfitCenterReport> = Vec::with_capacity(profit_centers.len());
    for pc in profit_centers {
        let company = companies.iter().find(|c| c.id == pc.company_id);

        let daily = actual.remove(&pc.id).unwrap_or_default();
        let daily_projected = projected.remove(&pc.id).unwrap_or_default();

        let mut mtd = 0;
        for day in 1..=day_of_month.min(days_in_month) {
            mtd += daily.get(&month.day_key(day)).copied().unwrap_or(0);
        }

        // Guarded even though day_of_month >= 1 always holds
        let avg_daily = if day_of_month > 0 {
            mtd as f64 / day_of_month as f64
        } else {
            0.0
        };
        // Round once, at the end, half away from zero
        let projection = if is_current_month {
            (avg_daily * days_in_month as f64).round() as i64
        } else {
            mtd
        };

        reports.push(ProfitCenterReport {
            id: pc.id.clone(),
            holding_account_id: pc.holding_account_id.clone(),
            company_id: pc.company_id.clone(),
            name: pc.name.clone(),
            display_order: pc.display_order,
            active: pc.active,
            include_in_projection: pc.include_in_projection,
            company_name: company
                .map(|c| c.name.clone())
                .unwrap_or_else(|| UNKNOWN_COMPANY_NAME.to_string()),
            company_color: company
                .map(|c| c.color.clone())
                .unwrap_or_else(|| UNKNOWN_COMPANY_COLOR.to_string()),
            daily,
            daily_projected,
            mtd,
            projection,
        });
    }

    let company_groups: Vec<CompanyGroup> = companies
        .iter()
        .map(|c| CompanyGroup {
            id: c.id.clone(),
            holding_account_id: c.holding_account_id.clone(),
            name: c.name.clone(),
            color: c.color.clone(),
            display_order: c.display_order,
            active: c.active,
            profit_centers: reports
                .iter()
                .filter(|pc| pc.company_id == c.id)
                .cloned()
                .collect(),
        })
        .collect();

    let mut daily_totals = BTreeMap::new();
    let mut daily_projected_totals = BTreeMap::new();
    for day in 1..=days_in_month {
        let key = month.day_key(day);
        let total: i64 = reports
            .iter()
            .map(|pc| pc.daily.get(&key).copied().unwrap_or(0))
            .sum();
        let projected_total: i64 = reports
            .iter()
            .map(|pc| pc.daily_projected.get(&key).copied().unwrap_or(0))
            .sum();
        daily_totals.insert(key.clone(), total);
        daily_projected_totals.insert(key, projected_total);
    }

    let grand_mtd: i64 = reports.iter().map(|pc| pc.mtd).sum();
    // Opted-out centers still carry their own projection figure; they just
    // contribute nothing to the holding-wide total. Absent flag = included.
    let grand_projection: i64 = reports
        .iter()
        .filter(|pc| pc.include_in_projection != Some(false))
        .map(|pc| pc.projection)
        .sum();

    DashboardReport {
        month: month.label(),
        days_in_month,
        day_of_month,
        is_current_month,
        companies: company_groups,
        profit_centers: reports,
        daily_totals,
        daily_projected_totals,
        grand_mtd,
        grand_projection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(id: &str, name: &str) -> Company {
        Company::new("ha-1".to_string(), name.to_string(), None, 0).with_id(id)
    }

    fn center(id: &str, company_id: &str, name: &str) -> ProfitCenter {
        let mut pc = ProfitCenter::new(
            "ha-1".to_string(),
            company_id.to_string(),
            name.to_string(),
            0,
        );
        pc.id = id.to_string();
        pc
    }

    fn txn(pc: &str, date: &str, cents: i64, projected: bool) -> Transaction {
        Transaction::new(
            "ha-1".to_string(),
            pc.to_string(),
            "co-1".to_string(),
            date.to_string(),
            cents,
            None,
            None,
            projected,
        )
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    trait WithId {
        fn with_id(self, id: &str) -> Self;
    }

    impl WithId for Company {
        fn with_id(mut self, id: &str) -> Self {
            self.id = id.to_string();
            self
        }
    }

    #[test]
    fn test_month_parse() {
        let m = Month::parse("2024-02").unwrap();
        assert_eq!(m, Month { year: 2024, month: 2 });
        assert_eq!(m.label(), "2024-02");
        assert_eq!(m.day_key(3), "2024-02-03");
        assert_eq!(m.date_range(), ("2024-02-01".to_string(), "2024-02-29".to_string()));

        assert!(Month::parse("2024").is_err());
        assert!(Month::parse("2024-13").is_err());
        assert!(Month::parse("2024-00").is_err());
        assert!(Month::parse("24-05").is_err());
        assert!(Month::parse("2024-xx").is_err());
    }

    #[test]
    fn test_days_in_month_handles_leap_years() {
        assert_eq!(Month { year: 2024, month: 2 }.days(), 29);
        assert_eq!(Month { year: 2023, month: 2 }.days(), 28);
        assert_eq!(Month { year: 2000, month: 2 }.days(), 29);
        assert_eq!(Month { year: 1900, month: 2 }.days(), 28);
        assert_eq!(Month { year: 2024, month: 11 }.days(), 30);
        assert_eq!(Month { year: 2024, month: 12 }.days(), 31);
    }

    #[test]
    fn test_day_coverage_one_entry_per_calendar_day() {
        let companies = vec![company("co-1", "Acme")];
        let centers = vec![center("pc-1", "co-1", "Store")];

        let report = compute_dashboard(
            &companies,
            &centers,
            &[],
            Month { year: 2024, month: 2 },
            date("2024-05-15"),
        );

        assert_eq!(report.days_in_month, 29);
        assert_eq!(report.daily_totals.len(), 29);
        assert_eq!(report.daily_projected_totals.len(), 29);
        assert_eq!(report.profit_centers[0].daily.len(), 29);
        assert_eq!(report.profit_centers[0].daily_projected.len(), 29);
        assert!(report.daily_totals.contains_key("2024-02-29"));
        assert!(report.daily_totals.values().all(|&v| v == 0));
    }

    #[test]
    fn test_actual_projected_separation() {
        let companies = vec![company("co-1", "Acme")];
        let centers = vec![center("pc-1", "co-1", "Store")];
        let txns = vec![
            txn("pc-1", "2024-03-05", 10000, false),
            txn("pc-1", "2024-03-05", 7500, true),
        ];

        let report = compute_dashboard(
            &companies,
            &centers,
            &txns,
            Month { year: 2024, month: 3 },
            date("2024-03-20"),
        );

        let pc = &report.profit_centers[0];
        assert_eq!(pc.daily["2024-03-05"], 10000);
        assert_eq!(pc.daily_projected["2024-03-05"], 7500);
        assert_eq!(pc.mtd, 10000, "projected amounts never count toward mtd");
        assert_eq!(report.daily_totals["2024-03-05"], 10000);
        assert_eq!(report.daily_projected_totals["2024-03-05"], 7500);
    }

    #[test]
    fn test_mtd_clips_at_today_for_current_month() {
        let companies = vec![company("co-1", "Acme")];
        let centers = vec![center("pc-1", "co-1", "Store")];
        let txns = vec![
            txn("pc-1", "2024-03-05", 10000, false),
            // Pre-entered future-dated actual: visible in the grid, not in mtd
            txn("pc-1", "2024-03-25", 99900, false),
        ];

        let report = compute_dashboard(
            &companies,
            &centers,
            &txns,
            Month { year: 2024, month: 3 },
            date("2024-03-10"),
        );

        assert!(report.is_current_month);
        assert_eq!(report.day_of_month, 10);
        assert_eq!(report.profit_centers[0].mtd, 10000);
        assert_eq!(report.profit_centers[0].daily["2024-03-25"], 99900);
        assert_eq!(report.daily_totals["2024-03-25"], 99900);
    }

    #[test]
    fn test_past_month_is_complete_and_projection_equals_mtd() {
        let companies = vec![company("co-1", "Acme")];
        let centers = vec![center("pc-1", "co-1", "Store")];
        // $10 every day of November 2023
        let txns: Vec<Transaction> = (1..=30)
            .map(|day| txn("pc-1", &format!("2023-11-{:02}", day), 1000, false))
            .collect();

        let report = compute_dashboard(
            &companies,
            &centers,
            &txns,
            Month { year: 2023, month: 11 },
            date("2024-03-10"),
        );

        assert!(!report.is_current_month);
        assert_eq!(report.day_of_month, 30);
        assert_eq!(report.profit_centers[0].mtd, 30_000);
        assert_eq!(report.profit_centers[0].projection, 30_000);
        assert_eq!(report.grand_mtd, 30_000);
        assert_eq!(report.grand_projection, 30_000);
    }

    #[test]
    fn test_run_rate_projection_leap_february() {
        // Current month 2024-02, today the 10th. PC1 has +$100.00 on the 1st
        // and +$50.00 on the 5th: mtd 15000, avg 1500/day, projection
        // round(1500 * 29) = 43500.
        let companies = vec![company("co-1", "Acme")];
        let centers = vec![center("pc-1", "co-1", "Store")];
        let txns = vec![
            txn("pc-1", "2024-02-01", 10000, false),
            txn("pc-1", "2024-02-05", 5000, false),
        ];

        let report = compute_dashboard(
            &companies,
            &centers,
            &txns,
            Month { year: 2024, month: 2 },
            date("2024-02-10"),
        );

        assert!(report.is_current_month);
        assert_eq!(report.days_in_month, 29);
        assert_eq!(report.day_of_month, 10);
        assert_eq!(report.profit_centers[0].mtd, 15_000);
        assert_eq!(report.profit_centers[0].projection, 43_500);
        assert_eq!(report.grand_projection, 43_500);
    }

    #[test]
    fn test_projection_rounds_fractional_run_rate() {
        // mtd 100 over 3 days in a 31-day month: 100/3 * 31 = 1033.33 -> 1033
        let companies = vec![company("co-1", "Acme")];
        let centers = vec![center("pc-1", "co-1", "Store")];
        let txns = vec![txn("pc-1", "2024-01-02", 100, false)];

        let report = compute_dashboard(
            &companies,
            &centers,
            &txns,
            Month { year: 2024, month: 1 },
            date("2024-01-03"),
        );

        assert_eq!(report.profit_centers[0].projection, 1033);
    }

    #[test]
    fn test_projection_opt_out_excluded_from_grand_total() {
        let companies = vec![company("co-1", "Acme")];
        let mut opted_out = center("pc-2", "co-1", "Legacy Line");
        opted_out.include_in_projection = Some(false);
        let centers = vec![center("pc-1", "co-1", "Store"), opted_out];
        let txns = vec![
            txn("pc-1", "2024-03-01", 1000, false),
            txn("pc-2", "2024-03-01", 2000, false),
        ];

        let report = compute_dashboard(
            &companies,
            &centers,
            &txns,
            Month { year: 2024, month: 3 },
            date("2024-03-02"),
        );

        // 1000 over 2 days -> 500/day * 31
        assert_eq!(report.profit_centers[0].projection, 15_500);
        // Own projection still computed and reported
        assert_eq!(report.profit_centers[1].projection, 31_000);
        // ...but excluded from the grand total
        assert_eq!(report.grand_projection, 15_500);
        // mtd is unaffected by the opt-out
        assert_eq!(report.grand_mtd, 3000);
    }

    #[test]
    fn test_unknown_profit_center_is_ignored() {
        let companies = vec![company("co-1", "Acme")];
        let centers = vec![center("pc-1", "co-1", "Store")];
        let txns = vec![
            txn("pc-1", "2024-03-01", 1000, false),
            txn("pc-ghost", "2024-03-01", 50_000, false),
        ];

        let report = compute_dashboard(
            &companies,
            &centers,
            &txns,
            Month { year: 2024, month: 3 },
            date("2024-03-05"),
        );

        assert_eq!(report.grand_mtd, 1000);
        assert_eq!(report.daily_totals["2024-03-01"], 1000);
        assert_eq!(report.profit_centers.len(), 1);
    }

    #[test]
    fn test_missing_company_gets_placeholder() {
        let centers = vec![center("pc-1", "co-missing", "Orphan")];
        let txns = vec![txn("pc-1", "2024-03-01", 1000, false)];

        let report = compute_dashboard(
            &[],
            &centers,
            &txns,
            Month { year: 2024, month: 3 },
            date("2024-03-05"),
        );

        let pc = &report.profit_centers[0];
        assert_eq!(pc.company_name, "Unknown");
        assert_eq!(pc.company_color, UNKNOWN_COMPANY_COLOR);
        assert_eq!(pc.mtd, 1000);
        // No owning company in the list, so no nested group either
        assert!(report.companies.is_empty());
    }

    #[test]
    fn test_companies_nest_their_centers_in_order() {
        let companies = vec![
            company("co-1", "Acme").with_id("co-1"),
            company("co-2", "Globex").with_id("co-2"),
        ];
        let centers = vec![
            center("pc-1", "co-1", "Retail"),
            center("pc-2", "co-2", "Wholesale"),
            center("pc-3", "co-1", "Online"),
        ];

        let report = compute_dashboard(
            &companies,
            &centers,
            &[],
            Month { year: 2024, month: 3 },
            date("2024-03-05"),
        );

        assert_eq!(report.profit_centers.len(), 3);
        assert_eq!(report.companies.len(), 2);
        let acme = &report.companies[0];
        assert_eq!(acme.profit_centers.len(), 2);
        assert_eq!(acme.profit_centers[0].id, "pc-1");
        assert_eq!(acme.profit_centers[1].id, "pc-3");
        assert_eq!(report.companies[1].profit_centers[0].id, "pc-2");
    }

    #[test]
    fn test_idempotence_byte_identical_output() {
        let companies = vec![company("co-1", "Acme")];
        let centers = vec![center("pc-1", "co-1", "Store")];
        let txns = vec![
            txn("pc-1", "2024-02-01", 10000, false),
            txn("pc-1", "2024-02-05", 5000, true),
        ];

        let a = compute_dashboard(
            &companies,
            &centers,
            &txns,
            Month { year: 2024, month: 2 },
            date("2024-02-10"),
        );
        let b = compute_dashboard(
            &companies,
            &centers,
            &txns,
            Month { year: 2024, month: 2 },
            date("2024-02-10"),
        );

        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_multiple_transactions_same_day_accumulate() {
        let companies = vec![company("co-1", "Acme")];
        let centers = vec![center("pc-1", "co-1", "Store")];
        let txns = vec![
            txn("pc-1", "2024-03-01", 1000, false),
            txn("pc-1", "2024-03-01", 2500, false),
            txn("pc-1", "2024-03-01", -500, false),
        ];

        let report = compute_dashboard(
            &companies,
            &centers,
            &txns,
            Month { year: 2024, month: 3 },
            date("2024-03-02"),
        );

        assert_eq!(report.profit_centers[0].daily["2024-03-01"], 3000);
        assert_eq!(report.grand_mtd, 3000);
    }
}
