//! Token endpoint

use crate::auth::{self, RequestError, Role, Subject, TokenQuery, TokenRequest};
use crate::server::error::{ApiError, ApiResult};
use crate::server::AppState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub app_id: String,
    pub channel_name: String,
    pub uid: Subject,
    pub role: Role,
    pub expiration_time_in_seconds: u32,
    /// RFC 3339, millisecond precision
    pub expires_at: String,
}

/// GET /api/token?channel=&uid=&role=&expiration=
pub async fn issue_token(
    State(state): State<AppState>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if query.channel.as_deref().map_or(true, str::is_empty) {
        return Err(RequestError::MissingChannel.into());
    }

    let app = state.credentials.as_ref().ok_or(ApiError::NotConfigured)?;
    let request = TokenRequest::from_query(&query)?;
    let credential = auth::issue(app, &request, auth::now_secs())?;

    info!(
        channel = %request.channel,
        uid = %request.subject,
        auto_uid = request.subject.is_auto_assigned(),
        role = %request.role,
        expires_at = credential.expires_at(),
        "Issued token"
    );

    Ok(Json(TokenResponse {
        expires_at: credential.expires_at_rfc3339(),
        app_id: app.app_id.clone(),
        channel_name: request.channel.to_string(),
        uid: request.subject,
        role: request.role,
        expiration_time_in_seconds: credential.lifetime_secs,
        token: credential.token.into_string(),
    }))
}
