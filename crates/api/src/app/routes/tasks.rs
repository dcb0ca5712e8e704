use axum::{
    Json, Router,
    extract::Extension,
    handler::Handler,
    http::StatusCode,
    response::Response,
    routing::{get, put},
};
use serde_json::json;
use tracing::instrument;

use planboard_auth::{AssigneePolicy, Method, RequestContext, Requirement, RolePolicy};
use planboard_core::ProjectRole;

use crate::app::dto;
use crate::app::routes::common::ack;
use crate::policy::Policies;

pub fn router(policies: &Policies) -> Router {
    let assignee_edit = AssigneePolicy::new([Method::Put]);
    let status_change = AssigneePolicy::new([Method::Put]).with_roles([
        ProjectRole::Member,
        ProjectRole::Leader,
        ProjectRole::Tester,
    ]);

    Router::new()
        .route(
            "/tasks/:taskId",
            get(get_task.layer(policies.require([Requirement::Member, assignee_edit.clone().into()])))
                .put(update_task.layer(policies.require([assignee_edit])))
                .delete(delete_task.layer(policies.require([RolePolicy::manager_or_leader([Method::Delete])]))),
        )
        .route(
            "/tasks/:taskId/status",
            put(update_status.layer(policies.require([status_change]))),
        )
        .route(
            "/tasks/:taskId/review",
            put(review_task.layer(policies.require([RolePolicy::tester_only([Method::Put])]))),
        )
}

pub async fn get_task(Extension(ctx): Extension<RequestContext>) -> Response {
    let status = ctx.task().map(|t| t.status.clone());
    ack(StatusCode::OK, "task.read", &ctx, Some(json!({ "status": status })))
}

pub async fn update_task(
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<dto::UpdateTaskRequest>,
) -> Response {
    ack(StatusCode::OK, "task.update", &ctx, Some(json!({ "title": body.title })))
}

pub async fn delete_task(Extension(ctx): Extension<RequestContext>) -> Response {
    ack(StatusCode::OK, "task.delete", &ctx, None)
}

#[instrument(skip_all, fields(status = %body.status))]
pub async fn update_status(
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<dto::UpdateStatusRequest>,
) -> Response {
    ack(StatusCode::OK, "task.status", &ctx, Some(json!({ "status": body.status })))
}

pub async fn review_task(
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<dto::ReviewRequest>,
) -> Response {
    ack(
        StatusCode::OK,
        "task.review",
        &ctx,
        Some(json!({ "approved": body.approved, "note": body.note })),
    )
}
