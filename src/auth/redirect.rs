//! Helpers for redirect URLs during authentication flows.

use axum::{extract::Request, http::Uri};
use tracing::{error, warn};

use crate::endpoints;

fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(redirect_url);

    path != endpoints::LOG_IN_VIEW && !path.starts_with("/api/")
}

/// Reduce `raw_url` to a local path and query, or `None` if it would leave the
/// site, point back to the log-in page, or point at an API route.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

fn normalize_hx_current_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// The log-in page URL that sends the client back to where it came from
/// after logging in, falling back to the dashboard.
pub(super) fn build_log_in_redirect_url(request: &Request) -> String {
    let redirect_target = if is_hx_request(request) {
        redirect_target_from_hx_request(request)
    } else {
        redirect_target_from_request_uri(request)
    };

    let redirect_target = redirect_target.unwrap_or_else(|| {
        warn!(
            "No usable redirect URL for request to {}. Falling back to dashboard.",
            request.uri()
        );
        endpoints::DASHBOARD_VIEW.to_owned()
    });

    build_log_in_redirect_url_from_target(&redirect_target)
        .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
}

pub(super) fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => Some(format!("{}?{}", endpoints::LOG_IN_VIEW, param)),
        Err(error) => {
            error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

fn is_hx_request(request: &Request) -> bool {
    request
        .headers()
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .map(|header| header.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn redirect_target_from_request_uri(request: &Request) -> Option<String> {
    let path_and_query = request.uri().path_and_query()?.as_str();
    normalize_redirect_url(path_and_query)
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let current_url = match request
        .headers()
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    {
        Some(value) => value,
        None => {
            warn!("Missing HX-Current-URL header for HTMX request.");
            return None;
        }
    };

    let redirect_url = normalize_hx_current_url(current_url);
    if redirect_url.is_none() {
        warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, extract::Request};

    use crate::endpoints;

    use super::{build_log_in_redirect_url, normalize_redirect_url};

    fn log_in_url_for(target: &str) -> String {
        format!(
            "{}?{}",
            endpoints::LOG_IN_VIEW,
            serde_urlencoded::to_string([("redirect_url", target)]).unwrap()
        )
    }

    #[test]
    fn accepts_local_paths() {
        assert_eq!(
            normalize_redirect_url("/dashboard?year=2025&month=3"),
            Some("/dashboard?year=2025&month=3".to_owned())
        );
    }

    #[test]
    fn rejects_external_and_unsafe_urls() {
        assert_eq!(normalize_redirect_url("https://evil.example/dashboard"), None);
        assert_eq!(normalize_redirect_url("//evil.example"), None);
        assert_eq!(normalize_redirect_url("dashboard"), None);
        assert_eq!(normalize_redirect_url(endpoints::LOG_IN_VIEW), None);
        assert_eq!(normalize_redirect_url("/api/expenses"), None);
    }

    #[test]
    fn page_request_redirects_back_to_page() {
        let request = Request::builder()
            .uri("/expenses/2025/3")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            log_in_url_for("/expenses/2025/3")
        );
    }

    #[test]
    fn hx_request_redirects_back_to_current_url() {
        let request = Request::builder()
            .uri("/api/expenses")
            .header("HX-Request", "true")
            .header("HX-Current-URL", "https://localhost:3000/dashboard?month=2")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            log_in_url_for("/dashboard?month=2")
        );
    }

    #[test]
    fn api_request_falls_back_to_dashboard() {
        let request = Request::builder()
            .uri("/api/expenses")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            log_in_url_for(endpoints::DASHBOARD_VIEW)
        );
    }
}
