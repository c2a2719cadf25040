//! Financial aggregation
//!
//! Totals, top transactions, and per-category spending views over a
//! normalized statement. Pure arithmetic; an empty statement aggregates
//! to zeros and empty lists.

use tracing::debug;

use crate::models::{CategoryBreakdown, TopTransaction, Transaction};

/// Pie bucket covering spend outside the top categories.
const OTHER_BUCKET: &str = "Other";

/// Float residue guard for the "Other" bucket.
const OTHER_EPSILON: f64 = 1e-9;

/// Aggregated monetary views of a statement.
#[derive(Debug, Clone)]
pub struct Aggregates {
    pub total_income: f64,
    pub total_expenditure: f64,
    pub net_balance: f64,
    pub money_in_transactions: Vec<TopTransaction>,
    pub money_out_transactions: Vec<TopTransaction>,
    /// Every category's spend, in first-occurrence order
    pub categories: CategoryBreakdown,
    /// The `top_categories` biggest spenders, descending
    pub top_spend: CategoryBreakdown,
    /// Top spenders plus an "Other" bucket covering the remainder
    pub pie: CategoryBreakdown,
}

/// Compute all aggregate views.
pub fn aggregate(
    transactions: &[Transaction],
    top_transactions: usize,
    top_categories: usize,
) -> Aggregates {
    let total_income: f64 = transactions.iter().map(|tx| tx.money_in).sum();
    let total_expenditure: f64 = transactions.iter().map(|tx| tx.money_out + tx.fee).sum();
    let net_balance = total_income - total_expenditure;

    let money_in_transactions = top_by(transactions, top_transactions, |tx| tx.money_in);
    let money_out_transactions = top_by(transactions, top_transactions, |tx| tx.money_out);

    let categories = category_spend(transactions);

    let mut top_spend = categories.clone();
    top_spend
        .0
        .sort_by(|a, b| b.1.total_cmp(&a.1));
    top_spend.0.truncate(top_categories);

    let mut pie = top_spend.clone();
    let other = categories.total() - top_spend.total();
    if other > OTHER_EPSILON {
        pie.0.push((OTHER_BUCKET.to_string(), other));
    }

    debug!(
        "Aggregated {} transactions across {} categories",
        transactions.len(),
        categories.len()
    );

    Aggregates {
        total_income,
        total_expenditure,
        net_balance,
        money_in_transactions,
        money_out_transactions,
        categories,
        top_spend,
        pie,
    }
}

/// The `n` largest strictly positive amounts, ties kept in input order.
fn top_by<F: Fn(&Transaction) -> f64>(
    transactions: &[Transaction],
    n: usize,
    amount: F,
) -> Vec<TopTransaction> {
    let mut qualifying: Vec<&Transaction> = transactions
        .iter()
        .filter(|&tx| amount(tx) > 0.0)
        .collect();
    // Stable sort preserves first-occurrence precedence on equal amounts
    qualifying.sort_by(|&a, &b| amount(b).total_cmp(&amount(a)));
    qualifying
        .into_iter()
        .take(n)
        .map(|tx| TopTransaction {
            description: tx.description.clone(),
            amount: amount(tx),
            date: tx.date.clone(),
        })
        .collect()
}

/// Per-category `money_out` sums in first-occurrence order.
fn category_spend(transactions: &[Transaction]) -> CategoryBreakdown {
    let mut breakdown = CategoryBreakdown::default();
    for tx in transactions {
        match breakdown
            .0
            .iter_mut()
            .find(|(category, _)| *category == tx.category)
        {
            Some((_, spend)) => *spend += tx.money_out,
            None => breakdown.0.push((tx.category.clone(), tx.money_out)),
        }
    }
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(description: &str, category: &str, money_in: f64, money_out: f64, fee: f64) -> Transaction {
        Transaction {
            date: "2024-01-01".to_string(),
            description: description.to_string(),
            category: category.to_string(),
            money_in,
            money_out,
            fee,
        }
    }

    #[test]
    fn test_totals_conservation() {
        let statement = vec![
            tx("SALARY", "Income", 5000.0, 0.0, 0.0),
            tx("RENT", "Housing", 0.0, 1200.0, 0.0),
            tx("SPAR", "Groceries", 0.0, 350.5, 5.0),
        ];
        let aggregates = aggregate(&statement, 3, 5);
        assert_eq!(aggregates.total_income, 5000.0);
        assert_eq!(aggregates.total_expenditure, 1200.0 + 350.5 + 5.0);
        assert_eq!(
            aggregates.net_balance,
            aggregates.total_income - aggregates.total_expenditure
        );
    }

    #[test]
    fn test_top_transactions() {
        let statement = vec![
            tx("A", "X", 0.0, 10.0, 0.0),
            tx("B", "X", 0.0, 40.0, 0.0),
            tx("C", "X", 0.0, 30.0, 0.0),
            tx("D", "X", 0.0, 20.0, 0.0),
            tx("E", "X", 0.0, 0.0, 0.0),
        ];
        let aggregates = aggregate(&statement, 3, 5);
        let names: Vec<&str> = aggregates
            .money_out_transactions
            .iter()
            .map(|t| t.description.as_str())
            .collect();
        assert_eq!(names, ["B", "C", "D"]);
        assert!(aggregates.money_in_transactions.is_empty());
    }

    #[test]
    fn test_top_transactions_stable_on_ties() {
        let statement = vec![
            tx("FIRST", "X", 0.0, 25.0, 0.0),
            tx("SECOND", "X", 0.0, 25.0, 0.0),
            tx("THIRD", "X", 0.0, 25.0, 0.0),
            tx("FOURTH", "X", 0.0, 25.0, 0.0),
        ];
        let aggregates = aggregate(&statement, 3, 5);
        let names: Vec<&str> = aggregates
            .money_out_transactions
            .iter()
            .map(|t| t.description.as_str())
            .collect();
        assert_eq!(names, ["FIRST", "SECOND", "THIRD"]);
    }

    #[test]
    fn test_fewer_than_n_qualifying_rows() {
        let statement = vec![
            tx("ONLY", "X", 0.0, 12.0, 0.0),
            tx("ZERO", "X", 0.0, 0.0, 0.0),
        ];
        let aggregates = aggregate(&statement, 3, 5);
        assert_eq!(aggregates.money_out_transactions.len(), 1);
    }

    #[test]
    fn test_pie_includes_other_beyond_top_five() {
        let statement: Vec<Transaction> = (0..7)
            .map(|i| tx("X", &format!("Cat{i}"), 0.0, (i + 1) as f64 * 10.0, 0.0))
            .collect();
        let aggregates = aggregate(&statement, 3, 5);

        assert_eq!(aggregates.top_spend.len(), 5);
        assert_eq!(aggregates.pie.len(), 6);
        // Pie view accounts for every category's spend
        assert!((aggregates.pie.total() - aggregates.categories.total()).abs() < 1e-9);
        // Cat6 (70) first, "Other" = 10 + 20
        assert_eq!(aggregates.pie.0[0].0, "Cat6");
        assert_eq!(aggregates.pie.get("Other"), Some(30.0));
    }

    #[test]
    fn test_pie_omits_other_at_five_or_fewer() {
        let statement: Vec<Transaction> = (0..5)
            .map(|i| tx("X", &format!("Cat{i}"), 0.0, 10.0, 0.0))
            .collect();
        let aggregates = aggregate(&statement, 3, 5);
        assert!(aggregates.pie.get("Other").is_none());
        assert_eq!(aggregates.pie.len(), 5);
    }

    #[test]
    fn test_empty_statement_aggregates_to_zero() {
        let aggregates = aggregate(&[], 3, 5);
        assert_eq!(aggregates.total_income, 0.0);
        assert_eq!(aggregates.total_expenditure, 0.0);
        assert_eq!(aggregates.net_balance, 0.0);
        assert!(aggregates.categories.is_empty());
    }

    #[test]
    fn test_fee_only_expenditure() {
        let statement = vec![
            tx("A", "X", 0.0, 0.0, 2.5),
            tx("B", "X", 0.0, 0.0, 1.0),
            tx("C", "X", 0.0, 0.0, 0.5),
        ];
        let aggregates = aggregate(&statement, 3, 5);
        assert!(aggregates.money_out_transactions.is_empty());
        assert_eq!(aggregates.total_expenditure, 4.0);
    }
}
