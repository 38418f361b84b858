//! HTTP boundary
//!
//! Exposes the income calculator over JSON. Every response, success or
//! failure, uses the `{success, data?, error?}` envelope.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::data::{ChannelIncome, StatisticsProvider};
use crate::error::{Error, ErrorKind};
use crate::income::{ChannelRankings, IncomeCalculator, DEFAULT_LANGUAGE};

/// Response envelope shared by the HTTP API and the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// HTTP status reported for each error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidChannelUrl => StatusCode::BAD_REQUEST,
        ErrorKind::ChannelLookup | ErrorKind::ChannelNotFound => StatusCode::NOT_FOUND,
        ErrorKind::QuotaOrAuth => StatusCode::FORBIDDEN,
        ErrorKind::Provider | ErrorKind::Processing => StatusCode::BAD_GATEWAY,
        ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A failed request, rendered as an envelope
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        tracing::error!(kind = ?err.kind(), error = %err, "request failed");
        Self {
            status: status_for(err.kind()),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::failure(self.message))).into_response()
    }
}

/// Body of `POST /api/youtube/calculate`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub channel_url: Option<String>,
    pub language: Option<String>,
}

/// Builds the API router
///
/// Any origin may call the API. Responses carry conservative security headers
/// unless a handler already set them.
pub fn router<P>(calculator: Arc<IncomeCalculator<P>>) -> Router
where
    P: StatisticsProvider + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/youtube/calculate", post(calculate_income::<P>))
        .route("/api/youtube/rankings", get(channel_rankings::<P>))
        .with_state(calculator)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn calculate_income<P>(
    State(calculator): State<Arc<IncomeCalculator<P>>>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ChannelIncome>>, ApiError>
where
    P: StatisticsProvider + 'static,
{
    let Json(request) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let channel_url = request
        .channel_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("channel URL is required"))?;
    let language = request.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    let income = calculator
        .calculate_channel_income(&channel_url, &language)
        .await?;
    Ok(Json(ApiResponse::ok(income)))
}

async fn channel_rankings<P>(
    State(calculator): State<Arc<IncomeCalculator<P>>>,
    Query(query): Query<BTreeMap<String, String>>,
) -> Result<Json<ApiResponse<ChannelRankings>>, ApiError>
where
    P: StatisticsProvider + 'static,
{
    let rankings = calculator.channel_rankings(query).await?;
    Ok(Json(ApiResponse::ok(rankings)))
}

/// Serves the API on `addr` until the process is stopped
pub async fn serve<P>(calculator: Arc<IncomeCalculator<P>>, addr: SocketAddr) -> std::io::Result<()>
where
    P: StatisticsProvider + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(calculator)).await
}
