//! Per-file normalization.
//!
//! Takes the raw rows of one monthly sheet and produces canonical
//! transactions plus the month's summary figures. Missing optional columns
//! are defaulted; missing required columns and bad label codes fail the file
//! (and only the file — the caller records the error and moves on).

use crate::config::Config;
use crate::dataset::MonthSummary;
use crate::ingest::workbook::{RawRow, RawValue};
use crate::model::{
    Amount, Label, Month, Transaction, AMOUNT_STR, CATEGORY_STR, DATE_STR, DEFAULT_WHO,
    DEFAULT_WHOM, DESCRIPTION_STR, LABEL_STR, REQUIRED_COLUMNS, WHO_STR, WHOM_STR,
};
use crate::Result;
use anyhow::{bail, Context};
use chrono::{Days, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::warn;

/// Fallback name/amount when a month has no regular expense rows at all.
const NO_TOP_CATEGORY: &str = "Unknown";

/// Normalizes one file's raw rows into canonical transactions and the
/// month's summary row.
///
/// `anchor_income` is the value read from the income anchor cell, if any;
/// when absent the income falls back to
/// `regular_expenses * income_fallback_ratio`.
///
/// # Errors
///
/// Fails (for this file only) when a required column is missing, a label
/// value is outside the accepted codes, or a row carries no usable category
/// or amount.
pub fn normalize(
    rows: Vec<RawRow>,
    month: &Month,
    anchor_income: Option<Decimal>,
    config: &Config,
) -> Result<(Vec<Transaction>, MonthSummary)> {
    // Required columns must exist in the sheet; a sheet with no data rows has
    // no columns at all and fails the same check.
    let columns: Vec<&String> = rows.first().map(|r| r.keys().collect()).unwrap_or_default();
    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|c| c.as_str() == required) {
            bail!("Required column '{required}' not found");
        }
    }

    validate_labels(&rows)?;

    let has_date = columns.iter().any(|c| c.as_str() == DATE_STR);
    let has_description = columns.iter().any(|c| c.as_str() == DESCRIPTION_STR);
    let has_who = columns.iter().any(|c| c.as_str() == WHO_STR);
    let has_whom = columns.iter().any(|c| c.as_str() == WHOM_STR);
    if !has_date {
        warn!("'{DATE_STR}' column not found, using first-of-month defaults");
    }
    if !has_description {
        warn!("'{DESCRIPTION_STR}' column not found, deriving from category");
    }

    let default_date =
        NaiveDate::from_ymd_opt(config.default_year(), month.calendar_number(), 1)
            .context("Unable to build the default date for this month")?;

    let mut transactions = Vec::with_capacity(rows.len());
    for (ix, row) in rows.iter().enumerate() {
        // Header row is sheet row 1, data starts at 2.
        let sheet_row = ix + 2;

        let category = text_value(row.get(CATEGORY_STR).unwrap_or(&RawValue::Empty));
        if category.is_empty() {
            bail!("Row {sheet_row} has no category");
        }

        let amount = amount_value(row.get(AMOUNT_STR).unwrap_or(&RawValue::Empty))
            .with_context(|| format!("Row {sheet_row} has no usable amount"))?;

        // Codes were validated above; per-row mapping cannot fail.
        let code = text_value(row.get(LABEL_STR).unwrap_or(&RawValue::Empty)).to_uppercase();
        let label = Label::from_code(&code).unwrap_or_default();

        let date = if has_date {
            parse_date(row.get(DATE_STR).unwrap_or(&RawValue::Empty)).unwrap_or(default_date)
        } else {
            default_date
        };

        let description = if has_description {
            text_value(row.get(DESCRIPTION_STR).unwrap_or(&RawValue::Empty))
        } else {
            format!("{category} expense")
        };

        let who = if has_who {
            text_value(row.get(WHO_STR).unwrap_or(&RawValue::Empty))
        } else {
            DEFAULT_WHO.to_string()
        };
        let whom = if has_whom {
            text_value(row.get(WHOM_STR).unwrap_or(&RawValue::Empty))
        } else {
            DEFAULT_WHOM.to_string()
        };

        let mut transaction = Transaction {
            date,
            description,
            category,
            amount,
            who,
            whom,
            label,
            month: month.name().to_string(),
        };
        transaction.enforce_investment_label();
        transactions.push(transaction);
    }

    let summary = summarize(month, &transactions, anchor_income, config);
    Ok((transactions, summary))
}

/// Scans the `Label` column and rejects the file when any value falls outside
/// the accepted code set, listing the distinct offenders.
fn validate_labels(rows: &[RawRow]) -> Result<()> {
    let mut invalid: Vec<String> = Vec::new();
    for row in rows {
        let code = text_value(row.get(LABEL_STR).unwrap_or(&RawValue::Empty)).to_uppercase();
        if Label::from_code(&code).is_err() && !invalid.contains(&code) {
            invalid.push(code);
        }
    }
    if !invalid.is_empty() {
        bail!("Invalid label values found: {}", invalid.join(", "));
    }
    Ok(())
}

/// Computes the month's summary figures from its canonical transactions.
fn summarize(
    month: &Month,
    transactions: &[Transaction],
    anchor_income: Option<Decimal>,
    config: &Config,
) -> MonthSummary {
    let regular_expenses: Amount = transactions
        .iter()
        .filter(|t| !t.is_investment())
        .map(|t| t.amount)
        .sum();
    let investments: Amount = transactions
        .iter()
        .filter(|t| t.is_investment())
        .map(|t| t.amount)
        .sum();

    let income = match anchor_income {
        Some(value) => Amount::new(value),
        None => {
            let fallback = regular_expenses.value() * config.income_fallback_ratio();
            warn!(
                "No income anchor value for {}, falling back to expenses x {}",
                month.name(),
                config.income_fallback_ratio()
            );
            Amount::new(fallback)
        }
    };
    let surplus = income - regular_expenses;

    // Per-category totals in lexicographic order; the first maximum wins.
    let mut by_category: BTreeMap<&str, Amount> = BTreeMap::new();
    for t in transactions.iter().filter(|t| !t.is_investment()) {
        *by_category.entry(t.category.as_str()).or_default() += t.amount;
    }
    let (top_expense_category, top_expense_amount) = by_category
        .into_iter()
        .fold(None::<(&str, Amount)>, |top, (category, total)| match top {
            Some((_, best)) if best >= total => top,
            _ => Some((category, total)),
        })
        .map(|(category, total)| (category.to_string(), total))
        .unwrap_or_else(|| (NO_TOP_CATEGORY.to_string(), Amount::ZERO));

    MonthSummary {
        month: month.name().to_string(),
        total_income: income,
        total_expenses: regular_expenses,
        investments,
        surplus,
        top_expense_category,
        top_expense_amount,
    }
}

/// Permissive date parsing: typed dates, common text formats, or an Excel
/// serial number. `None` means the caller substitutes the month default.
fn parse_date(value: &RawValue) -> Option<NaiveDate> {
    match value {
        RawValue::Date(d) => Some(*d),
        RawValue::Text(s) => {
            let s = s.trim();
            ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"]
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        }
        RawValue::Number(n) if *n > 0.0 => {
            // Excel serial day 1 is 1900-01-01; the epoch below absorbs the
            // off-by-two of the fictional 1900 leap day.
            let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
            epoch.checked_add_days(Days::new(n.trunc() as u64))
        }
        _ => None,
    }
}

fn text_value(value: &RawValue) -> String {
    match value {
        RawValue::Text(s) => s.trim().to_string(),
        // Integers print without a decimal point, matching cell display.
        RawValue::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
        RawValue::Date(d) => d.to_string(),
        RawValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        RawValue::Empty => String::new(),
    }
}

fn amount_value(value: &RawValue) -> Option<Amount> {
    match value {
        RawValue::Number(n) => Decimal::from_f64(*n).map(Amount::new),
        RawValue::Text(s) if !s.trim().is_empty() => Amount::from_str(s).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::test_config;

    fn raw(cells: &[(&str, RawValue)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    fn full_row(category: &str, amount: f64, label: &str) -> RawRow {
        raw(&[
            (CATEGORY_STR, text(category)),
            (AMOUNT_STR, RawValue::Number(amount)),
            (LABEL_STR, text(label)),
        ])
    }

    #[test]
    fn test_missing_required_column_fails() {
        let (_dir, config) = test_config();
        let rows = vec![raw(&[
            (CATEGORY_STR, text("Groceries")),
            (LABEL_STR, text("N")),
        ])];
        let err = normalize(rows, &Month::resolve("Jan"), None, &config).unwrap_err();
        assert!(err.to_string().contains("Required column 'Amount'"));
    }

    #[test]
    fn test_empty_sheet_fails_required_columns() {
        let (_dir, config) = test_config();
        let err = normalize(Vec::new(), &Month::resolve("Jan"), None, &config).unwrap_err();
        assert!(err.to_string().contains("Required column"));
    }

    #[test]
    fn test_invalid_labels_are_listed() {
        let (_dir, config) = test_config();
        let rows = vec![
            full_row("Groceries", 100.0, "N"),
            full_row("Fuel", 50.0, "x"),
            full_row("Rent", 900.0, "Q"),
            full_row("Movies", 20.0, "x"),
        ];
        let err = normalize(rows, &Month::resolve("Jan"), None, &config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Invalid label values found"));
        // Upper-cased, de-duplicated, in first-seen order.
        assert!(message.contains("X, Q"));
    }

    #[test]
    fn test_label_codes_map_to_full_labels() {
        let (_dir, config) = test_config();
        let rows = vec![
            full_row("Groceries", 100.0, "n"),
            full_row("Dining", 60.0, "W"),
            full_row("Watch", 300.0, "L"),
            full_row("Deposit", 500.0, "S"),
            full_row("Stocks", 700.0, "I"),
            full_row("Misc", 10.0, ""),
        ];
        let (transactions, _) = normalize(rows, &Month::resolve("Jan"), None, &config).unwrap();
        let labels: Vec<Label> = transactions.iter().map(|t| t.label).collect();
        assert_eq!(
            labels,
            vec![
                Label::Needs,
                Label::Wants,
                Label::Luxury,
                Label::Savings,
                Label::Investment,
                Label::Unlabeled,
            ]
        );
    }

    #[test]
    fn test_investment_rows_get_savings_label() {
        let (_dir, config) = test_config();
        let rows = vec![
            full_row("Investment - SIP", 1000.0, ""),
            full_row("Investment - Gold", 500.0, "W"),
        ];
        let (transactions, _) = normalize(rows, &Month::resolve("Jan"), None, &config).unwrap();
        assert_eq!(transactions[0].label, Label::Savings);
        // An explicit label is not overridden.
        assert_eq!(transactions[1].label, Label::Wants);
    }

    #[test]
    fn test_missing_optional_columns_are_defaulted() {
        let (_dir, config) = test_config();
        let rows = vec![full_row("Groceries", 100.0, "N")];
        let (transactions, _) = normalize(rows, &Month::resolve("Mar"), None, &config).unwrap();
        let t = &transactions[0];
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(t.description, "Groceries expense");
        assert_eq!(t.who, DEFAULT_WHO);
        assert_eq!(t.whom, DEFAULT_WHOM);
        assert_eq!(t.month, "March");
    }

    #[test]
    fn test_present_columns_are_not_defaulted() {
        let (_dir, config) = test_config();
        let rows = vec![raw(&[
            (CATEGORY_STR, text("Groceries")),
            (AMOUNT_STR, RawValue::Number(100.0)),
            (LABEL_STR, text("N")),
            (DESCRIPTION_STR, text("Weekly shop")),
            (WHO_STR, text("Self")),
            (WHOM_STR, text("Big Bazaar")),
            (
                DATE_STR,
                RawValue::Date(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()),
            ),
        ])];
        let (transactions, _) = normalize(rows, &Month::resolve("Mar"), None, &config).unwrap();
        let t = &transactions[0];
        assert_eq!(t.description, "Weekly shop");
        assert_eq!(t.who, "Self");
        assert_eq!(t.whom, "Big Bazaar");
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
    }

    #[test]
    fn test_unparsable_date_takes_month_default() {
        let (_dir, config) = test_config();
        let rows = vec![
            raw(&[
                (CATEGORY_STR, text("Groceries")),
                (AMOUNT_STR, RawValue::Number(100.0)),
                (LABEL_STR, text("N")),
                (DATE_STR, text("soonish")),
            ]),
            raw(&[
                (CATEGORY_STR, text("Fuel")),
                (AMOUNT_STR, RawValue::Number(50.0)),
                (LABEL_STR, text("N")),
                (DATE_STR, text("2025-06-15")),
            ]),
        ];
        let (transactions, _) = normalize(rows, &Month::resolve("Jun"), None, &config).unwrap();
        assert_eq!(
            transactions[0].date,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
        assert_eq!(
            transactions[1].date,
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
    }

    #[test]
    fn test_text_amounts_parse() {
        let (_dir, config) = test_config();
        let rows = vec![raw(&[
            (CATEGORY_STR, text("Rent")),
            (AMOUNT_STR, text("₹12,000.50")),
            (LABEL_STR, text("N")),
        ])];
        let (transactions, _) = normalize(rows, &Month::resolve("Jan"), None, &config).unwrap();
        assert_eq!(
            transactions[0].amount,
            Amount::from_str("12000.50").unwrap()
        );
    }

    #[test]
    fn test_row_without_amount_fails_file() {
        let (_dir, config) = test_config();
        let rows = vec![raw(&[
            (CATEGORY_STR, text("Rent")),
            (AMOUNT_STR, RawValue::Empty),
            (LABEL_STR, text("N")),
        ])];
        let err = normalize(rows, &Month::resolve("Jan"), None, &config).unwrap_err();
        assert!(err.to_string().contains("no usable amount"));
    }

    #[test]
    fn test_income_fallback_ratio() {
        let (_dir, config) = test_config();
        let rows = vec![
            full_row("Groceries", 600.0, "N"),
            full_row("Fuel", 400.0, "W"),
        ];
        let (_, summary) = normalize(rows, &Month::resolve("Jan"), None, &config).unwrap();
        assert_eq!(summary.total_expenses, Amount::from_str("1000").unwrap());
        assert_eq!(summary.total_income, Amount::from_str("1500").unwrap());
        assert_eq!(summary.surplus, Amount::from_str("500").unwrap());
    }

    #[test]
    fn test_income_anchor_wins_over_fallback() {
        let (_dir, config) = test_config();
        let rows = vec![full_row("Groceries", 600.0, "N")];
        let anchor = Some(Decimal::from(50000));
        let (_, summary) = normalize(rows, &Month::resolve("Jan"), anchor, &config).unwrap();
        assert_eq!(summary.total_income, Amount::from_str("50000").unwrap());
        assert_eq!(summary.surplus, Amount::from_str("49400").unwrap());
    }

    #[test]
    fn test_investments_excluded_from_expenses() {
        let (_dir, config) = test_config();
        let rows = vec![
            full_row("Groceries", 600.0, "N"),
            full_row("Investment - SIP", 1000.0, ""),
        ];
        let (_, summary) = normalize(rows, &Month::resolve("Jan"), None, &config).unwrap();
        assert_eq!(summary.total_expenses, Amount::from_str("600").unwrap());
        assert_eq!(summary.investments, Amount::from_str("1000").unwrap());
        // Fallback income uses regular expenses only.
        assert_eq!(summary.total_income, Amount::from_str("900").unwrap());
    }

    #[test]
    fn test_top_expense_category() {
        let (_dir, config) = test_config();
        let rows = vec![
            full_row("Groceries", 300.0, "N"),
            full_row("Rent", 900.0, "N"),
            full_row("Groceries", 700.0, "N"),
            full_row("Investment - SIP", 5000.0, ""),
        ];
        let (_, summary) = normalize(rows, &Month::resolve("Jan"), None, &config).unwrap();
        assert_eq!(summary.top_expense_category, "Groceries");
        assert_eq!(summary.top_expense_amount, Amount::from_str("1000").unwrap());
    }

    #[test]
    fn test_top_expense_tie_takes_first_sorted() {
        let (_dir, config) = test_config();
        let rows = vec![
            full_row("Zoo", 500.0, "W"),
            full_row("Aquarium", 500.0, "W"),
        ];
        let (_, summary) = normalize(rows, &Month::resolve("Jan"), None, &config).unwrap();
        assert_eq!(summary.top_expense_category, "Aquarium");
    }

    #[test]
    fn test_only_investment_rows_top_category_unknown() {
        let (_dir, config) = test_config();
        let rows = vec![full_row("Investment - SIP", 5000.0, "")];
        let (_, summary) = normalize(rows, &Month::resolve("Jan"), None, &config).unwrap();
        assert_eq!(summary.top_expense_category, NO_TOP_CATEGORY);
        assert_eq!(summary.top_expense_amount, Amount::ZERO);
    }

    #[test]
    fn test_excel_serial_date_parses() {
        // 45658 is 2025-01-01 in the 1900 date system.
        assert_eq!(
            parse_date(&RawValue::Number(45658.0)),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
    }
}
