//! The expense form shared by the create and edit flows, and its validation.

use std::str::FromStr;

use maud::{Markup, html};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    database_id::ExpenseId,
    endpoints::{self, format_endpoint},
    expense::{Amount, Expense, NewExpense},
    html::{
        BUTTON_PRIMARY_STYLE, DATE_FORMAT, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, field_error,
        format_date,
    },
};

pub const REQUIRED_ERROR_MSG: &str = "This field is required.";
pub const INVALID_DATE_ERROR_MSG: &str = "Enter a valid date.";
pub const INVALID_AMOUNT_ERROR_MSG: &str = "Enter a number.";

const AMOUNT_MAX_DIGITS: u32 = 10;
const AMOUNT_DECIMAL_PLACES: u32 = 2;
const CATEGORY_MAX_LENGTH: usize = 100;

/// The raw form fields as submitted by the browser.
///
/// Everything is kept as a string so that invalid input can be shown back to
/// the user next to its error message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExpenseFormData {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
}

impl ExpenseFormData {
    /// An empty form with the date set to `today`.
    pub fn with_date(today: Date) -> Self {
        Self {
            date: format_date(today),
            ..Default::default()
        }
    }

    /// Check every field, returning the expense to save or the error for each invalid field.
    pub fn validate(&self) -> Result<NewExpense, ExpenseFormErrors> {
        let date = parse_date(&self.date);
        let amount = parse_amount(&self.amount);
        let category = parse_category(&self.category);

        match (date, amount, category) {
            (Ok(date), Ok(amount), Ok(category)) => Ok(NewExpense {
                date,
                amount,
                category,
                description: self.description.trim().to_owned(),
            }),
            (date, amount, category) => Err(ExpenseFormErrors {
                date: date.err(),
                amount: amount.err(),
                category: category.err(),
            }),
        }
    }
}

impl From<&Expense> for ExpenseFormData {
    fn from(expense: &Expense) -> Self {
        Self {
            date: format_date(expense.date),
            amount: expense.amount.to_string(),
            category: expense.category.clone(),
            description: expense.description.clone(),
        }
    }
}

/// The error message for each invalid field, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFormErrors {
    pub date: Option<String>,
    pub amount: Option<String>,
    pub category: Option<String>,
}

fn parse_date(raw: &str) -> Result<Date, String> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(REQUIRED_ERROR_MSG.to_owned());
    }

    Date::parse(raw, DATE_FORMAT).map_err(|_| INVALID_DATE_ERROR_MSG.to_owned())
}

fn parse_amount(raw: &str) -> Result<Amount, String> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(REQUIRED_ERROR_MSG.to_owned());
    }

    let amount = Decimal::from_str(raw).map_err(|_| INVALID_AMOUNT_ERROR_MSG.to_owned())?;

    // Digits are counted as written, so "1.500" has three decimal places.
    let scale = amount.scale();
    let mantissa_digits = amount.mantissa().unsigned_abs().to_string().len() as u32;
    let (digits, decimals) = if scale > mantissa_digits {
        (scale, scale)
    } else {
        (mantissa_digits, scale)
    };
    let whole_digits = digits - decimals;

    if digits > AMOUNT_MAX_DIGITS {
        return Err(format!(
            "Ensure that there are no more than {AMOUNT_MAX_DIGITS} digits in total."
        ));
    }

    if decimals > AMOUNT_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {AMOUNT_DECIMAL_PLACES} decimal places."
        ));
    }

    if whole_digits > AMOUNT_MAX_DIGITS - AMOUNT_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            AMOUNT_MAX_DIGITS - AMOUNT_DECIMAL_PLACES
        ));
    }

    Ok(Amount::new(amount))
}

fn parse_category(raw: &str) -> Result<String, String> {
    let category = raw.trim();
    let length = category.chars().count();

    if category.is_empty() {
        Err(REQUIRED_ERROR_MSG.to_owned())
    } else if length > CATEGORY_MAX_LENGTH {
        Err(format!(
            "Ensure this value has at most {CATEGORY_MAX_LENGTH} characters (it has {length})."
        ))
    } else {
        Ok(category.to_owned())
    }
}

/// Whether the form creates a new expense or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Create,
    Update(ExpenseId),
}

/// The expense form.
///
/// Submitting the form swaps the response in place of the form, so
/// validation errors render next to their fields. Error responses go to the
/// alert container instead.
pub fn expense_form(
    action: FormAction,
    values: &ExpenseFormData,
    errors: &ExpenseFormErrors,
    categories: &[String],
) -> Markup {
    let (hx_post, hx_put, submit_text) = match action {
        FormAction::Create => (Some(endpoints::EXPENSES_API.to_owned()), None, "Add expense"),
        FormAction::Update(id) => (
            None,
            Some(format_endpoint(endpoints::EXPENSE, id)),
            "Save changes",
        ),
    };

    html! {
        form
            id="expense-form"
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    type="date"
                    name="date"
                    id="date"
                    value=(values.date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.date.as_deref()))
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount (₹)" }

                input
                    type="number"
                    name="amount"
                    id="amount"
                    step="0.01"
                    inputmode="decimal"
                    placeholder="0.00"
                    value=(values.amount)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.amount.as_deref()))
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                input
                    type="text"
                    name="category"
                    id="category"
                    list="category-suggestions"
                    placeholder="e.g., Food, Transport"
                    maxlength=(CATEGORY_MAX_LENGTH)
                    value=(values.category)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                datalist id="category-suggestions"
                {
                    @for category in categories {
                        option value=(category) {}
                    }
                }

                (field_error(errors.category.as_deref()))
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    type="text"
                    name="description"
                    id="description"
                    placeholder="Optional notes"
                    value=(values.description)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }
        }
    }
}
