//! Totals for the expenses in a date range.

use std::collections::BTreeMap;

use time::Date;

use crate::expense::{Amount, Expense};

/// The sum of the expenses recorded on a single day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: Date,
    pub total: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseSummary {
    /// The sum of every expense, zero if there are none.
    pub total: Amount,
    /// One entry per day that has expenses, most recent day first.
    pub daily_totals: Vec<DailyTotal>,
}

pub fn summarize(expenses: &[Expense]) -> ExpenseSummary {
    let total = expenses.iter().map(|expense| expense.amount).sum();

    let mut totals_by_date: BTreeMap<Date, Vec<Amount>> = BTreeMap::new();
    for expense in expenses {
        totals_by_date
            .entry(expense.date)
            .or_default()
            .push(expense.amount);
    }

    let daily_totals = totals_by_date
        .into_iter()
        .rev()
        .map(|(date, amounts)| DailyTotal {
            date,
            total: amounts.into_iter().sum(),
        })
        .collect();

    ExpenseSummary {
        total,
        daily_totals,
    }
}
