use std::{
    future::IntoFuture as _,
    io,
    process::ExitCode,
    sync::{Arc, OnceLock},
    time,
};

use application::{
    api, graphql, Args, Config, SearchCache, USER_ID_HEADER_NAME,
};
use axum::{
    body::Body,
    extract::MatchedPath,
    routing::{on, MethodFilter},
    Extension, Router,
};
use axum_client_ip::InsecureClientIp;
use service::{
    infra::{postgres, Postgres},
    Service,
};
use tokio::net::TcpListener;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::CorsLayer,
    trace::{MakeSpan, OnResponse, TraceLayer},
};
use tracing as log;
use tracing_subscriber::{
    filter::{filter_fn, FilterFn},
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}

/// Installs stdout and stderr log writers, splitting records by level.
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(level_filter(false)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(level_filter(true)),
        )
        .init();
}

/// Passes spans and the records of the configured [`LOG_LEVEL`] going to
/// stderr (if `stderr` is `true`) or stdout.
fn level_filter(
    stderr: bool,
) -> FilterFn<impl Fn(&log::Metadata<'_>) -> bool> {
    filter_fn(move |meta| {
        let max = LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO);
        meta.is_span()
            || (STDERR_LEVELS.contains(meta.level()) == stderr
                && max >= *meta.level())
    })
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        postgres,
        service,
        server,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let postgres_config = postgres.into();
    let mut postgres = Postgres::new(&postgres_config).map_err(|e| {
        log::error!("failed to initialize `Postgres` client: {e}");
    })?;

    let report = migrations::runner()
        .run_async(&mut postgres)
        .await
        .map_err(|e| {
            log::error!("failed to run database migrations: {e}");
        })?;
    for m in report.applied_migrations() {
        log::info!("applied migration `{m}`");
    }

    let cache = SearchCache::new(service.search_cache_ttl);
    let (service, background) = Service::new(service.into(), postgres, cache);

    let app = Router::new()
        .route(
            "/graphql",
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .layer(Extension(Arc::new(api::schema())))
        .layer(Extension(service))
        .layer(cors_layer(&server.cors.origins)?)
        .layer(trace_layer());

    let listener = TcpListener::bind((server.host.clone(), server.port))
        .await
        .map_err(|e| {
            log::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;

    log::info!("listening on `{}:{}`", server.host, server.port);

    let serve = axum::serve(listener, app).with_graceful_shutdown(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to listen for Ctrl+C: {e}");
        }
        log::info!("received Ctrl+C, shutting down");
    });

    tokio::select! {
        served = serve.into_future() => {
            served.map_err(|e| log::error!("webserver failed: {e}"))
        }
        Err(e) = background.into_future() => {
            log::error!("background task failed: {e}");
            Err(())
        }
    }
}

/// Builds a [`CorsLayer`] allowing the provided `origins` to call the GraphQL
/// endpoint on behalf of a `User`.
fn cors_layer(origins: &[String]) -> Result<CorsLayer, ()> {
    let mut cors = CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::POST,
        ])
        .allow_headers([
            http::header::CONTENT_TYPE,
            USER_ID_HEADER_NAME.clone(),
        ]);
    for origin in origins {
        cors = cors.allow_origin(
            origin.parse::<http::header::HeaderValue>().map_err(|e| {
                log::error!("`{origin}` is not current CORS origin: {e}");
            })?,
        );
    }
    Ok(cors)
}

/// Builds a [`TraceLayer`] wrapping every HTTP request into an
/// `HTTP request` span.
fn trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl MakeSpan<Body> + Clone,
    tower_http::trace::DefaultOnRequest,
    impl OnResponse<Body> + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(|r: &http::Request<Body>| {
            tracing::info_span!(
                "HTTP request",
                http.client_ip = InsecureClientIp::from(
                    r.headers(),
                    r.extensions()
                )
                    .map(|ip| ip.0.to_string())
                    .ok(),
                http.flavor = ?r.version(),
                http.host = r.uri().host(),
                http.method = r.method().as_str(),
                http.route = r
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str),
                http.scheme = r
                    .uri()
                    .scheme()
                    .map(http::uri::Scheme::as_str),
                http.target = r
                    .uri()
                    .path_and_query()
                    .map(http::uri::PathAndQuery::as_str),
                http.user_agent = r
                    .headers()
                    .get("User-Agent")
                    .and_then(|h| h.to_str().ok()),
                http.status_code = tracing::field::Empty,
            )
        })
        .on_response(
            |r: &http::Response<Body>,
             dur: time::Duration,
             span: &tracing::Span| {
                span.record(
                    "http.status_code",
                    tracing::field::display(r.status().as_u16()),
                );

                if r.status().is_server_error()
                    || r.status().is_client_error()
                {
                    tracing::error!(
                        duration = format!("{}ms", dur.as_millis()),
                    );
                } else {
                    tracing::info!(
                        duration = format!("{}ms", dur.as_millis()),
                    );
                }
            },
        )
}
