//! Statement normalization
//!
//! Turns a raw table into canonical transactions: resolves which column
//! is the date, fills blank monetary cells with zero, folds debit signs
//! into absolute values, and drops rows that carry no category. Every
//! downstream stage works on the normalized output, including the
//! income/expenditure totals (so uncategorized rows never count).

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Transaction;
use crate::table::RawTable;

/// Date columns in preference order; the first one present wins.
const DATE_COLUMNS: [&str; 3] = ["Transaction Date", "Posting Date", "Date"];

/// Normalize a raw statement table into transactions.
///
/// Fails on a table with no rows or with a required column missing
/// entirely. A table whose rows are all uncategorized normalizes to an
/// empty vector, which downstream stages treat as a statement with
/// nothing to report.
pub fn normalize(table: &RawTable) -> Result<Vec<Transaction>> {
    if table.row_count() == 0 {
        return Err(Error::EmptyTable);
    }

    let description_col = require_column(table, "Description")?;
    let category_col = require_column(table, "Category")?;
    let money_in_col = require_column(table, "Money In")?;
    let money_out_col = require_column(table, "Money Out")?;
    let fee_col = require_column(table, "Fee")?;
    let date_col = DATE_COLUMNS
        .into_iter()
        .find_map(|name| table.column_index(name));

    let mut transactions = Vec::with_capacity(table.row_count());
    let mut dropped = 0usize;

    for row in 0..table.row_count() {
        let category = table.cell(row, category_col).trim();
        if category.is_empty() {
            // No category: excluded from the analysis table entirely
            dropped += 1;
            continue;
        }

        let money_in = parse_amount(table.cell(row, money_in_col), "Money In", row)?;
        let money_out = parse_amount(table.cell(row, money_out_col), "Money Out", row)?;
        let fee = parse_amount(table.cell(row, fee_col), "Fee", row)?;

        transactions.push(Transaction {
            date: date_col
                .map(|col| table.cell(row, col).trim().to_string())
                .unwrap_or_default(),
            description: table.cell(row, description_col).trim().to_string(),
            category: category.to_string(),
            money_in,
            // Export sign conventions vary; store debits as magnitudes
            money_out: money_out.abs(),
            fee: fee.abs(),
        });
    }

    debug!(
        "Normalized {} transactions ({} uncategorized rows dropped)",
        transactions.len(),
        dropped
    );
    Ok(transactions)
}

fn require_column(table: &RawTable, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .ok_or_else(|| Error::MissingColumn(name.to_string()))
}

/// Parse a monetary cell.
///
/// Blank cells mean zero. Accepts currency symbols, thousands
/// separators, and accounting-style parenthesized negatives.
fn parse_amount(value: &str, column: &str, row: usize) -> Result<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }

    let mut cleaned = trimmed.replace(['$', '£', '€', ','], "");
    let negative = cleaned.starts_with('(') && cleaned.ends_with(')');
    if negative {
        cleaned = cleaned[1..cleaned.len() - 1].to_string();
    }

    let amount: f64 = cleaned
        .trim()
        .parse()
        .map_err(|_| Error::InvalidAmount {
            column: column.to_string(),
            row,
            value: value.to_string(),
        })?;
    if !amount.is_finite() {
        return Err(Error::InvalidAmount {
            column: column.to_string(),
            row,
            value: value.to_string(),
        });
    }

    Ok(if negative { -amount } else { amount })
}
