use serde::{Deserialize, Serialize};

use planboard_auth::RequestContext;
use planboard_core::{ProjectRole, UserId};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: UserId,
    pub role: ProjectRole,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: ProjectRole,
}

#[derive(Debug, Deserialize)]
pub struct UploadFileRequest {
    pub file_name: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub assignee_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub approved: bool,
    pub note: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

/// Read view of the resolved request context.
#[derive(Debug, Serialize)]
pub struct ContextView {
    pub principal: Option<String>,
    pub method: String,
    pub project_id: Option<i64>,
    pub role: Option<ProjectRole>,
    pub task_id: Option<i64>,
    pub assignee_id: Option<String>,
}

impl From<&RequestContext> for ContextView {
    fn from(ctx: &RequestContext) -> Self {
        Self {
            principal: ctx.principal().map(|p| p.to_string()),
            method: ctx.method().to_string(),
            project_id: ctx.project_id().map(|p| p.get()),
            role: ctx.membership().map(|m| m.role),
            task_id: ctx.task().map(|t| t.task_id.get()),
            assignee_id: ctx
                .task()
                .and_then(|t| t.assignee_id.as_ref())
                .map(|a| a.to_string()),
        }
    }
}

/// Acknowledgement returned once an action passed authorization.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub action: &'static str,
    pub user_id: Option<String>,
    pub project_id: Option<i64>,
    pub task_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}
