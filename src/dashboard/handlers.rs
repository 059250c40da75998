//! Dashboard HTTP handlers and view rendering.

use std::{
    ops::RangeInclusive,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, Month};

use crate::{
    AppState, Error,
    alert::Alert,
    auth::Access,
    dashboard::{
        range::{DashboardQuery, INVALID_DATE_FORMAT_MSG, ResolvedRange, month_range, resolve_range},
        summary::summarize,
        tables::{daily_totals_table, expenses_table, total_card},
    },
    endpoints::{self, format_monthly_endpoint},
    expense::{
        ExpenseFormData, ExpenseFormErrors, FormAction, SortOrder, expense_form, get_categories,
        get_expenses_in_range,
    },
    flash::take_flash,
    html::{
        BUTTON_SECONDARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, flash_view, format_date, link,
    },
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed for displaying the dashboard and monthly pages.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The key used to decrypt the flash message cookie.
    pub cookie_key: Key,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<DashboardState> for Key {
    fn from_ref(state: &DashboardState) -> Self {
        state.cookie_key.clone()
    }
}

/// Display the expenses and totals for a month or an explicit date range.
///
/// Staff also get the form for adding an expense.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    access: Access,
    jar: PrivateCookieJar,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let Some(today) = local_today(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let resolved = resolve_range(&query, today);

    let (expenses, categories) = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        let expenses =
            match get_expenses_in_range(resolved.range.clone(), SortOrder::Descending, &connection)
            {
                Ok(expenses) => expenses,
                Err(error) => return error.into_response(),
            };

        let categories = if access.is_staff {
            match get_categories(&connection) {
                Ok(categories) => categories,
                Err(error) => return error.into_response(),
            }
        } else {
            Vec::new()
        };

        (expenses, categories)
    };

    let summary = summarize(&expenses);
    let (jar, flash) = take_flash(jar);

    let is_filtered = month_range(resolved.year, resolved.month).as_ref() != Some(&resolved.range);
    let total_label = if is_filtered {
        format!(
            "Total from {} to {}",
            format_date(*resolved.range.start()),
            format_date(*resolved.range.end())
        )
    } else {
        format!("Total for {} {}", resolved.month, resolved.year)
    };

    let create_form = access.is_staff.then(|| {
        expense_form(
            FormAction::Create,
            &ExpenseFormData::with_date(today),
            &ExpenseFormErrors::default(),
            &categories,
        )
    });

    let content = html! {
        (NavBar::new(endpoints::DASHBOARD_VIEW, access).into_html())
        (flash_view(flash.as_ref()))

        @if resolved.invalid_filter {
            div class="w-full max-w-5xl mx-auto px-6 pt-4"
            {
                (Alert::ErrorSimple { message: INVALID_DATE_FORMAT_MSG.to_owned() }.into_html())
            }
        }

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                h1 class="text-2xl font-bold" { "Expenses" }

                div class="grid gap-4 md:grid-cols-2"
                {
                    (month_picker(&resolved))
                    (filter_form(&resolved))
                }

                (total_card(&total_label, summary.total))

                p class="text-sm"
                {
                    (link(
                        &format_monthly_endpoint(resolved.year, u8::from(resolved.month)),
                        &format!("Monthly view for {} {}", resolved.month, resolved.year),
                    ))
                }

                @if let Some(create_form) = create_form {
                    div class=(CARD_STYLE)
                    {
                        h2 class="mb-4 text-lg font-semibold" { "Add expense" }
                        (create_form)
                    }
                }

                h2 class="text-lg font-semibold" { "Daily breakdown" }
                (daily_totals_table(&summary.daily_totals))

                h2 class="text-lg font-semibold" { "All expenses" }
                (expenses_table(&expenses, access.is_staff))
            }
        }
    };

    (jar, base("Dashboard", &content)).into_response()
}

fn month_picker(resolved: &ResolvedRange) -> Markup {
    let months = (1..=12u8).filter_map(|number| Month::try_from(number).ok());

    html! {
        form method="get" action=(endpoints::DASHBOARD_VIEW) class={(CARD_STYLE) " space-y-2"}
        {
            div class="flex gap-2"
            {
                div class="flex-1"
                {
                    label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                    select name="month" id="month" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for month in months {
                            option value=(u8::from(month)) selected[month == resolved.month]
                            {
                                (month.to_string())
                            }
                        }
                    }
                }

                div class="flex-1"
                {
                    label for="year" class=(FORM_LABEL_STYLE) { "Year" }

                    input
                        type="number"
                        name="year"
                        id="year"
                        value=(resolved.year)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Show month" }
        }
    }
}

fn filter_form(resolved: &ResolvedRange) -> Markup {
    html! {
        form method="get" action=(endpoints::DASHBOARD_VIEW) class={(CARD_STYLE) " space-y-2"}
        {
            div class="flex gap-2"
            {
                div class="flex-1"
                {
                    label for="filter_start" class=(FORM_LABEL_STYLE) { "From" }

                    input
                        type="date"
                        name="filter_start"
                        id="filter_start"
                        value=(format_date(*resolved.range.start()))
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div class="flex-1"
                {
                    label for="filter_end" class=(FORM_LABEL_STYLE) { "To" }

                    input
                        type="date"
                        name="filter_end"
                        id="filter_end"
                        value=(format_date(*resolved.range.end()))
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Filter" }
        }
    }
}

fn parse_month_path(
    raw_year: &str,
    raw_month: &str,
) -> Option<(i32, Month, RangeInclusive<Date>)> {
    let year = raw_year.parse::<i32>().ok()?;
    let month = raw_month
        .parse::<u8>()
        .ok()
        .and_then(|month| Month::try_from(month).ok())?;
    let range = month_range(year, month)?;

    Some((year, month, range))
}

/// Display the expenses of a single month in date order.
///
/// A path that is not a number, a month outside 1 to 12, or a year that
/// cannot be represented is a 404.
pub async fn get_monthly_page(
    State(state): State<DashboardState>,
    access: Access,
    Path((raw_year, raw_month)): Path<(String, String)>,
) -> Response {
    let Some((year, month, range)) = parse_month_path(&raw_year, &raw_month) else {
        return Error::NotFound.into_response();
    };

    let expenses = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match get_expenses_in_range(range, SortOrder::Ascending, &connection) {
            Ok(expenses) => expenses,
            Err(error) => return error.into_response(),
        }
    };

    let summary = summarize(&expenses);
    let title = format!("{month} {year}");

    let content = html! {
        (NavBar::new(endpoints::MONTHLY_VIEW, access).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                h1 class="text-2xl font-bold" { "Expenses for " (title) }

                (total_card(&format!("Total for {title}"), summary.total))

                (expenses_table(&expenses, access.is_staff))

                p class="text-sm"
                {
                    (link(
                        &format!("{}?year={year}&month={}", endpoints::DASHBOARD_VIEW, u8::from(month)),
                        "Back to dashboard",
                    ))
                }
            }
        }
    };

    base(&title, &content).into_response()
}

#[cfg(test)]
mod dashboard_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};
    use time::macros::date;

    use crate::{
        auth::{Access, UserID},
        dashboard::range::{DashboardQuery, INVALID_DATE_FORMAT_MSG},
        endpoints,
        expense::{NewExpense, create_expense},
        test_utils::{
            assert_hx_endpoint, assert_valid_html, get_test_connection, parse_html_document,
            select_text,
        },
    };

    use super::{DashboardState, get_dashboard_page, get_monthly_page};

    fn get_state() -> DashboardState {
        let connection = get_test_connection();

        for (date, amount, category) in [
            (date!(2025 - 02 - 28), "1000", "Rent"),
            (date!(2025 - 03 - 01), "12.50", "Food"),
            (date!(2025 - 03 - 01), "7.25", "Transport"),
            (date!(2025 - 03 - 31), "100", "Bills"),
            (date!(2025 - 04 - 01), "2000", "Rent"),
        ] {
            create_expense(
                &NewExpense {
                    date,
                    amount: amount.parse().unwrap(),
                    category: category.to_owned(),
                    description: String::new(),
                },
                &connection,
            )
            .unwrap();
        }

        DashboardState {
            cookie_key: Key::from(&Sha512::digest("foobar")),
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn staff() -> Access {
        Access {
            user_id: Some(UserID::new(1)),
            view_access: true,
            is_staff: true,
        }
    }

    fn family() -> Access {
        Access {
            user_id: None,
            view_access: true,
            is_staff: false,
        }
    }

    fn month_query(year: &str, month: &str) -> DashboardQuery {
        DashboardQuery {
            year: Some(year.to_owned()),
            month: Some(month.to_owned()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn shows_month_total_and_breakdown() {
        let state = get_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response =
            get_dashboard_page(State(state), family(), jar, Query(month_query("2025", "3"))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        assert_eq!(select_text(&document, "#total"), vec!["₹119.75"]);
        assert_eq!(
            select_text(&document, "#daily-totals tbody td"),
            vec!["2025-03-31", "₹100.00", "2025-03-01", "₹19.75"]
        );
        assert_eq!(
            select_text(&document, "#expenses tbody td:nth-child(2)"),
            vec!["Bills", "Transport", "Food"]
        );
    }

    #[tokio::test]
    async fn create_form_only_shown_to_staff() {
        let state = get_state();

        let staff_response = get_dashboard_page(
            State(state.clone()),
            staff(),
            PrivateCookieJar::new(state.cookie_key.clone()),
            Query(month_query("2025", "3")),
        )
        .await;
        let family_response = get_dashboard_page(
            State(state.clone()),
            family(),
            PrivateCookieJar::new(state.cookie_key.clone()),
            Query(month_query("2025", "3")),
        )
        .await;

        let staff_document = parse_html_document(staff_response).await;
        let form = staff_document
            .select(&scraper::Selector::parse("form#expense-form").unwrap())
            .next()
            .expect("staff should see the create form");
        assert_hx_endpoint(&form, endpoints::EXPENSES_API, "hx-post");

        let family_document = parse_html_document(family_response).await;
        assert!(
            family_document
                .select(&scraper::Selector::parse("form#expense-form").unwrap())
                .next()
                .is_none()
        );
        assert!(select_text(&family_document, "#expenses a").is_empty());
    }

    #[tokio::test]
    async fn filter_range_overrides_month() {
        let state = get_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let query = DashboardQuery {
            filter_start: Some("2025-02-28".to_owned()),
            filter_end: Some("2025-03-01".to_owned()),
            ..Default::default()
        };

        let response = get_dashboard_page(State(state), family(), jar, Query(query)).await;

        let document = parse_html_document(response).await;
        assert_eq!(select_text(&document, "#total"), vec!["₹1019.75"]);
    }

    #[tokio::test]
    async fn malformed_filter_shows_error_and_uses_month() {
        let state = get_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let query = DashboardQuery {
            year: Some("2025".to_owned()),
            month: Some("4".to_owned()),
            filter_start: Some("not-a-date".to_owned()),
            filter_end: Some("2025-03-01".to_owned()),
        };

        let response = get_dashboard_page(State(state), family(), jar, Query(query)).await;

        let document = parse_html_document(response).await;
        let text = document.root_element().text().collect::<String>();
        assert!(text.contains(INVALID_DATE_FORMAT_MSG));
        assert_eq!(select_text(&document, "#total"), vec!["₹2000.00"]);
    }

    #[tokio::test]
    async fn monthly_page_lists_month_in_date_order() {
        let state = get_state();

        let response = get_monthly_page(
            State(state),
            family(),
            Path(("2025".to_owned(), "3".to_owned())),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        assert_eq!(select_text(&document, "#total"), vec!["₹119.75"]);
        assert_eq!(
            select_text(&document, "#expenses tbody td:nth-child(2)"),
            vec!["Food", "Transport", "Bills"]
        );
    }

    #[tokio::test]
    async fn monthly_page_with_invalid_month_is_404() {
        let state = get_state();

        let response = get_monthly_page(
            State(state),
            family(),
            Path(("2025".to_owned(), "13".to_owned())),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn monthly_page_with_non_numeric_month_is_404() {
        let state = get_state();

        let response = get_monthly_page(
            State(state),
            family(),
            Path(("2025".to_owned(), "abc".to_owned())),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn staff_form_defaults_to_today() {
        let state = get_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let today = crate::timezone::local_today("Etc/UTC").unwrap();

        let response =
            get_dashboard_page(State(state), staff(), jar, Query(DashboardQuery::default())).await;

        let document = parse_html_document(response).await;
        let date_input = document
            .select(&scraper::Selector::parse("form#expense-form input[name=date]").unwrap())
            .next()
            .unwrap();
        assert_eq!(
            date_input.value().attr("value"),
            Some(crate::html::format_date(today).as_str())
        );
    }
}
