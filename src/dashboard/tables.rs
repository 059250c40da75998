//! Table views for the dashboard and the monthly page.

use maud::{Markup, html};

use crate::{
    dashboard::summary::DailyTotal,
    endpoints::{self, format_endpoint},
    expense::{Amount, Expense},
    html::{
        CARD_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        format_currency, format_date,
    },
};

const TABLE_STYLE: &str = "w-full text-sm text-left text-gray-500 dark:text-gray-400";
const AMOUNT_CELL_STYLE: &str = "px-6 py-4 text-right whitespace-nowrap";

/// A card showing the total spent over the period named by `label`.
pub(super) fn total_card(label: &str, total: Amount) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
            p id="total" class="text-3xl font-bold" { (format_currency(total.as_decimal())) }
        }
    }
}

/// Renders the expenses in the order given.
///
/// Staff get links to edit and delete each expense.
pub(super) fn expenses_table(expenses: &[Expense], show_actions: bool) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow w-full"
        {
            table id="expenses" class=(TABLE_STYLE)
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(AMOUNT_CELL_STYLE) { "Amount" }

                        @if show_actions {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }
                }

                tbody
                {
                    @for expense in expenses {
                        tr class=(TABLE_ROW_STYLE) data-expense-id=(expense.id)
                        {
                            td class=(TABLE_CELL_STYLE) { (format_date(expense.date)) }
                            td class=(TABLE_CELL_STYLE) { (expense.category) }
                            td class=(TABLE_CELL_STYLE) { (expense.description) }
                            td class=(AMOUNT_CELL_STYLE) { (format_currency(expense.amount.as_decimal())) }

                            @if show_actions {
                                td class={(TABLE_CELL_STYLE) " space-x-2"}
                                {
                                    a
                                        href=(format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id))
                                        class=(LINK_STYLE)
                                    {
                                        "Edit"
                                    }

                                    a
                                        href=(format_endpoint(endpoints::DELETE_EXPENSE_VIEW, expense.id))
                                        class="text-red-600 hover:text-red-500 dark:text-red-500 underline"
                                    {
                                        "Delete"
                                    }
                                }
                            }
                        }
                    }

                    @if expenses.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan=(if show_actions { 5 } else { 4 }) class={(TABLE_CELL_STYLE) " text-center"}
                            {
                                "No expenses recorded for this period."
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders one row per day with the sum spent on that day.
pub(super) fn daily_totals_table(daily_totals: &[DailyTotal]) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow w-full"
        {
            table id="daily-totals" class=(TABLE_STYLE)
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(AMOUNT_CELL_STYLE) { "Total" }
                    }
                }

                tbody
                {
                    @for day in daily_totals {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (format_date(day.date)) }
                            td class=(AMOUNT_CELL_STYLE) { (format_currency(day.total.as_decimal())) }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::Html;
    use time::macros::date;

    use crate::{
        expense::Expense,
        test_utils::{assert_valid_html, select_text},
    };

    use super::expenses_table;

    fn expense() -> Expense {
        Expense {
            id: 3,
            date: date!(2025 - 03 - 14),
            amount: "7.5".parse().unwrap(),
            category: "Tea".to_owned(),
            description: "Chai".to_owned(),
        }
    }

    #[test]
    fn actions_only_shown_when_requested() {
        let with_actions = Html::parse_fragment(&expenses_table(&[expense()], true).into_string());
        let without_actions =
            Html::parse_fragment(&expenses_table(&[expense()], false).into_string());

        assert_valid_html(&with_actions);
        assert_eq!(select_text(&with_actions, "tbody a"), vec!["Edit", "Delete"]);
        assert!(select_text(&without_actions, "tbody a").is_empty());
    }

    #[test]
    fn shows_placeholder_for_empty_period() {
        let html = Html::parse_fragment(&expenses_table(&[], false).into_string());

        assert_eq!(
            select_text(&html, "tbody td"),
            vec!["No expenses recorded for this period."]
        );
    }
}
