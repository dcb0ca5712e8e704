use axum::{
    Json, Router,
    extract::{Extension, Path},
    handler::Handler,
    http::StatusCode,
    response::Response,
    routing::{get, post, put},
};
use serde_json::json;
use tracing::instrument;

use planboard_auth::{Method, QuotaPolicy, RequestContext, Requirement, RolePolicy};

use crate::app::dto;
use crate::app::routes::common::ack;
use crate::policy::Policies;

pub fn router(policies: &Policies) -> Router {
    let project_manager =
        |methods: &[Method]| Requirement::from(RolePolicy::project_manager_only(methods.iter().copied()));
    let manager_or_leader =
        |methods: &[Method]| Requirement::from(RolePolicy::manager_or_leader(methods.iter().copied()));
    let manage_project = project_manager(&[Method::Put, Method::Delete]);

    Router::new()
        .route(
            "/projects",
            post(create_project.layer(policies.require([QuotaPolicy::ProjectCount]))),
        )
        .route(
            "/projects/:projectId",
            get(get_project.layer(policies.require([Requirement::Member])))
                .put(update_project.layer(policies.require([manage_project.clone()])))
                .delete(delete_project.layer(policies.require([manage_project]))),
        )
        .route(
            "/projects/:projectId/members",
            post(add_member.layer(policies.require([
                project_manager(&[Method::Post]),
                QuotaPolicy::MemberCount.into(),
            ]))),
        )
        .route(
            "/projects/:projectId/members/:userId",
            put(change_member_role.layer(policies.require([manager_or_leader(&[Method::Put])])))
                .delete(remove_member.layer(policies.require([project_manager(&[Method::Delete])]))),
        )
        .route(
            "/projects/:projectId/files",
            post(upload_file.layer(policies.require([Requirement::Member, QuotaPolicy::Storage.into()]))),
        )
        .route(
            "/projects/:projectId/tasks",
            post(create_task.layer(policies.require([manager_or_leader(&[Method::Post])]))),
        )
}

#[instrument(skip_all, fields(name = %body.name))]
pub async fn create_project(
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<dto::CreateProjectRequest>,
) -> Response {
    ack(StatusCode::CREATED, "project.create", &ctx, Some(json!({ "name": body.name })))
}

pub async fn get_project(Extension(ctx): Extension<RequestContext>) -> Response {
    ack(
        StatusCode::OK,
        "project.read",
        &ctx,
        Some(json!({ "role": ctx.membership().map(|m| m.role) })),
    )
}

pub async fn update_project(
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<dto::UpdateProjectRequest>,
) -> Response {
    ack(StatusCode::OK, "project.update", &ctx, Some(json!({ "name": body.name })))
}

pub async fn delete_project(Extension(ctx): Extension<RequestContext>) -> Response {
    ack(StatusCode::OK, "project.delete", &ctx, None)
}

#[instrument(skip_all, fields(member = %body.user_id, role = %body.role))]
pub async fn add_member(
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<dto::AddMemberRequest>,
) -> Response {
    ack(
        StatusCode::CREATED,
        "project.members.add",
        &ctx,
        Some(json!({ "member": body.user_id, "role": body.role })),
    )
}

pub async fn change_member_role(
    Extension(ctx): Extension<RequestContext>,
    Path((_project_id, user_id)): Path<(String, String)>,
    Json(body): Json<dto::ChangeRoleRequest>,
) -> Response {
    ack(
        StatusCode::OK,
        "project.members.change_role",
        &ctx,
        Some(json!({ "member": user_id, "role": body.role })),
    )
}

pub async fn remove_member(
    Extension(ctx): Extension<RequestContext>,
    Path((_project_id, user_id)): Path<(String, String)>,
) -> Response {
    ack(
        StatusCode::OK,
        "project.members.remove",
        &ctx,
        Some(json!({ "member": user_id })),
    )
}

pub async fn upload_file(
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<dto::UploadFileRequest>,
) -> Response {
    ack(
        StatusCode::CREATED,
        "project.files.upload",
        &ctx,
        Some(json!({ "file_name": body.file_name, "size": body.size })),
    )
}

pub async fn create_task(
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<dto::CreateTaskRequest>,
) -> Response {
    ack(
        StatusCode::CREATED,
        "project.tasks.create",
        &ctx,
        Some(json!({ "title": body.title, "assignee_id": body.assignee_id })),
    )
}
