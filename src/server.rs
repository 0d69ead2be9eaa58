// 🌐 Web Server - HTML page + JSON API over one in-memory store
//
// The store lives for the lifetime of the process, like a browser session.

use crate::calendar::WeekStart;
use crate::config::Config;
use crate::error::SubscriptionError;
use crate::form::{parse_date, SubscriptionForm};
use crate::projector::{events_between, BillingEvent};
use crate::store::SubscriptionStore;
use crate::subscription::Subscription;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use log::error;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<SubscriptionStore>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            store: Arc::new(Mutex::new(SubscriptionStore::new())),
            config: Arc::new(config),
        }
    }

    fn store(&self) -> MutexGuard<'_, SubscriptionStore> {
        // A panicking handler cannot leave the Vec half-written
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            field: None,
        }
    }

    fn err(message: String, field: Option<&'static str>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            field,
        }
    }
}

/// Subscription as sent to the page
#[derive(Serialize)]
struct SubscriptionResponse<'a> {
    key: &'a str,
    #[serde(flatten)]
    subscription: &'a Subscription,
    monthly_cost: f64,
}

impl<'a> From<&'a Subscription> for SubscriptionResponse<'a> {
    fn from(subscription: &'a Subscription) -> Self {
        Self {
            key: subscription.key(),
            subscription,
            monthly_cost: subscription.monthly_cost(),
        }
    }
}

/// Display settings the page needs to draw the same grid as the TUI
#[derive(Serialize)]
struct ClientConfig {
    currency_symbol: String,
    week_start: WeekStart,
    headers: [&'static str; 7],
}

#[derive(Debug, Deserialize)]
pub struct EventRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

fn parse_bound(raw: Option<&str>, default: NaiveDate) -> Result<NaiveDate, SubscriptionError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => parse_date(value),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/config - Currency symbol and first day of the week
async fn client_config(State(state): State<AppState>) -> impl IntoResponse {
    let config = &state.config;
    Json(ApiResponse::ok(ClientConfig {
        currency_symbol: config.currency_symbol.clone(),
        week_start: config.week_start,
        headers: config.week_start.headers(),
    }))
}

/// GET /api/subscriptions - Store snapshot in insertion order
async fn list_subscriptions(State(state): State<AppState>) -> Response {
    let store = state.store();
    let response: Vec<SubscriptionResponse> = store.list().iter().map(|s| s.into()).collect();
    (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
}

/// POST /api/subscriptions - Submit the add-subscription form
async fn create_subscription(
    State(state): State<AppState>,
    Json(form): Json<SubscriptionForm>,
) -> Response {
    let mut store = state.store();

    match store.submit(&form, &state.config.currency_symbol) {
        Ok(record) => (
            StatusCode::CREATED,
            Json(ApiResponse::ok(SubscriptionResponse::from(record))),
        )
            .into_response(),
        Err(err) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<()>::err(err.to_string(), err.field())),
        )
            .into_response(),
    }
}

/// GET /api/events?from=YYYY-MM-DD&to=YYYY-MM-DD - Projected billing events
async fn list_events(State(state): State<AppState>, Query(range): Query<EventRange>) -> Response {
    let bounds = parse_bound(range.from.as_deref(), NaiveDate::MIN)
        .and_then(|from| parse_bound(range.to.as_deref(), NaiveDate::MAX).map(|to| (from, to)));
    let (from, to) = match bounds {
        Ok(bounds) => bounds,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::err(err.to_string(), None)),
            )
                .into_response()
        }
    };

    let store = state.store();
    match store.project() {
        Ok(events) => {
            let selected: Vec<&BillingEvent> = events_between(&events, from, to).collect();
            (StatusCode::OK, Json(ApiResponse::ok(selected))).into_response()
        }
        Err(err) => {
            error!("Error projecting events: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::err(err.to_string(), None)),
            )
                .into_response()
        }
    }
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

/// Full router: page at `/`, JSON under `/api`.
pub fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/config", get(client_config))
        .route(
            "/subscriptions",
            get(list_subscriptions).post(create_subscription),
        )
        .route("/events", get(list_events))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}
