use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use planboard_auth::{Principal, RequestContext};

use crate::app::dto::ContextView;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(principal: Option<Extension<Principal>>) -> Response {
    match principal {
        Some(Extension(principal)) => Json(serde_json::json!({
            "user_id": principal.user_id.to_string(),
        }))
        .into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

/// Echo what the context loader resolved for this route.
pub async fn context(Extension(ctx): Extension<RequestContext>) -> Json<ContextView> {
    Json(ContextView::from(&ctx))
}
