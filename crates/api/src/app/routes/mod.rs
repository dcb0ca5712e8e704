use axum::{Router, handler::Handler, routing::get};

use planboard_auth::Requirement;

use crate::policy::Policies;

pub mod common;
pub mod projects;
pub mod system;
pub mod tasks;

/// Router for every endpoint that goes through context loading.
///
/// `/context` without ids only echoes the caller and needs no membership.
pub fn router(policies: &Policies) -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/context", get(system::context))
        .route(
            "/projects/:projectId/context",
            get(system::context.layer(policies.require([Requirement::Member]))),
        )
        .route(
            "/tasks/:taskId/context",
            get(system::context.layer(policies.require([Requirement::Member]))),
        )
        .merge(projects::router(policies))
        .merge(tasks::router(policies))
}
