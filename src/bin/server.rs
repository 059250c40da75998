use std::{env, fs::OpenOptions, net::SocketAddr, path::Path, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use family_expenses::{AppState, build_router, graceful_shutdown, logging_middleware};

/// Receives every log event at debug level and above, regardless of `RUST_LOG`.
const LOG_FILE: &str = "debug.log";

/// The web server for tracking family expenses.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the SQLite database holding users, expenses and view passwords.
    #[arg(long)]
    db_path: String,

    /// Directory holding the TLS certificate `cert.pem` and its key `key.pem`.
    #[arg(long)]
    cert_path: String,

    /// The port to listen on. Only localhost is bound.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the timezone used to decide what "today" is, e.g. "Asia/Kolkata".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let args = Args::parse();
    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let cert_dir = Path::new(&args.cert_path);
    let tls_config = RustlsConfig::from_pem_file(cert_dir.join("cert.pem"), cert_dir.join("key.pem"))
        .await
        .unwrap_or_else(|error| {
            panic!("Could not load the TLS certificate from {}: {error}", args.cert_path)
        });

    // Session and flash cookies are encrypted with a key derived from this secret, so changing
    // it logs everyone out.
    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let connection = Connection::open(&args.db_path)
        .unwrap_or_else(|error| panic!("Could not open the database at {}: {error}", args.db_path));
    let state = AppState::new(connection, &secret, &args.timezone)
        .unwrap_or_else(|error| panic!("Could not start with timezone {}: {error}", args.timezone));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = with_request_spans(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!(
        "Serving family expenses on https://{addr} with timezone {}",
        args.timezone
    );
    axum_server::bind_rustls(addr, tls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("The server stopped unexpectedly");
}

/// Log to stdout at the level set by `RUST_LOG` (info by default), and log everything from
/// debug up to a file.
fn init_tracing() {
    let stdout_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(stdout_filter);

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_FILE)
        .unwrap_or_else(|error| panic!("Could not open the log file {LOG_FILE}: {error}"));

    let file_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(file_log)
        .init();
}

/// Wrap each request in a span carrying its method, URI and matched route.
fn with_request_spans(router: Router) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request| {
            let method = request.method();
            let uri = request.uri();
            let matched_path = request
                .extensions()
                .get::<MatchedPath>()
                .map(MatchedPath::as_str);

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Failed requests are already logged by `Error::into_response` and the logging middleware.
        .on_failure(());

    router.layer(trace_layer)
}
