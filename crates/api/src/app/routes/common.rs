use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use planboard_auth::RequestContext;

use crate::app::dto::Ack;

/// Acknowledge an authorized action, echoing the resolved ids.
pub fn ack(status: StatusCode, action: &'static str, ctx: &RequestContext, detail: Option<Value>) -> Response {
    let body = Ack {
        action,
        user_id: ctx.principal().map(|p| p.to_string()),
        project_id: ctx.project_id().map(|p| p.get()),
        task_id: ctx.task().map(|t| t.task_id.get()),
        detail,
    };
    (status, Json(body)).into_response()
}
