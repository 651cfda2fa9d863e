use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::extract::{Path as AxumPath, RawQuery, State};
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::cli::{ListingArgs, ServeArgs, StoreArgs};
use crate::fetch::{FetchHub, LoadState};
use crate::record::{Listable, Vertical};
use crate::render;
use crate::storage::FileDocumentStore;
use crate::store::{DocumentStore, HttpDocumentStore};
use crate::url_state::{self, ListingState};
use crate::verticals::{Doctor, EmergencyProvider, Hospital, Lab, Salon};
use crate::view::{self, ListingConfig, ViewStatus};

#[derive(Clone)]
pub struct AppState {
    pub fetches: FetchHub,
    pub listing: ListingConfig,
    pub fetch_deadline: Duration,
    pub debounce_ms: u64,
}

pub fn open_store(opts: &StoreArgs) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match opts.store_url.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(url) => {
            tracing::info!("Reading collections from document store at {}", url);
            let store = HttpDocumentStore::new(url, opts.store_token.clone(), opts.max_retries)?
                .with_backoff(Duration::from_millis(opts.retry_backoff_ms));
            Ok(Arc::new(store))
        }
        None => {
            let store = FileDocumentStore::new(&opts.data_dir);
            tracing::info!("Reading collections from {}", opts.data_dir);
            for missing in store.missing_collections() {
                tracing::warn!(
                    "No data for collection {} at {}",
                    missing,
                    store.collection_path(missing).display()
                );
            }
            Ok(Arc::new(store))
        }
    }
}

pub fn listing_config(opts: &ListingArgs) -> ListingConfig {
    ListingConfig {
        page_size: usize::try_from(opts.page_size).unwrap_or(10),
        window: usize::try_from(opts.window).unwrap_or(5),
    }
}

pub async fn run(opts: ServeArgs) -> anyhow::Result<()> {
    let state = AppState {
        fetches: FetchHub::new(open_store(&opts.store)?),
        listing: listing_config(&opts.listing),
        fetch_deadline: Duration::from_millis(opts.fetch_deadline_ms.max(1)),
        debounce_ms: opts.debounce_ms,
    };

    let addr: SocketAddr = format!("{}:{}", opts.host, opts.port)
        .parse()
        .context("parse host:port")?;

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Received Ctrl-C, shutting down");
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/api/:vertical", get(api_listing))
        .route("/:vertical", get(listing_page))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<String> {
    Html(render::render_index())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(render::render_not_found())).into_response()
}

async fn listing_page(
    State(st): State<AppState>,
    AxumPath(slug): AxumPath<String>,
    RawQuery(query): RawQuery,
) -> Response {
    let Some(vertical) = Vertical::from_slug(&slug) else {
        return not_found().await;
    };
    let state = url_state::parse(vertical, query.as_deref());
    match vertical {
        Vertical::Doctors => page::<Doctor>(&st, &state).await,
        Vertical::Hospitals => page::<Hospital>(&st, &state).await,
        Vertical::Labs => page::<Lab>(&st, &state).await,
        Vertical::Emergency => page::<EmergencyProvider>(&st, &state).await,
        Vertical::Salons => page::<Salon>(&st, &state).await,
    }
}

async fn load<R: Listable>(st: &AppState) -> LoadState<R> {
    let load = st.fetches.load::<R>(st.fetch_deadline).await;
    if let LoadState::Failed(err) = &load {
        tracing::error!(collection = R::VERTICAL.collection(), "fetch failed: {err}");
    }
    load
}

async fn page<R: Listable>(st: &AppState, state: &ListingState) -> Response {
    let load = load::<R>(st).await;
    let view = view::build(&load, state, st.listing);
    let html = render::render_listing(&view, st.listing.page_size, st.debounce_ms);
    ([(CACHE_CONTROL, "no-store")], Html(html)).into_response()
}

async fn api_listing(
    State(st): State<AppState>,
    AxumPath(slug): AxumPath<String>,
    RawQuery(query): RawQuery,
) -> Response {
    let Some(vertical) = Vertical::from_slug(&slug) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("unknown vertical {slug}")})),
        )
            .into_response();
    };
    let state = url_state::parse(vertical, query.as_deref());
    match vertical {
        Vertical::Doctors => api_page::<Doctor>(&st, &state).await,
        Vertical::Hospitals => api_page::<Hospital>(&st, &state).await,
        Vertical::Labs => api_page::<Lab>(&st, &state).await,
        Vertical::Emergency => api_page::<EmergencyProvider>(&st, &state).await,
        Vertical::Salons => api_page::<Salon>(&st, &state).await,
    }
}

async fn api_page<R: Listable>(st: &AppState, state: &ListingState) -> Response {
    let load = load::<R>(st).await;
    let view = view::build(&load, state, st.listing);
    match view.status {
        ViewStatus::Loading | ViewStatus::Unavailable => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "listing unavailable", "status": view.status})),
        )
            .into_response(),
        ViewStatus::NoResults | ViewStatus::Results => Json(view).into_response(),
    }
}
