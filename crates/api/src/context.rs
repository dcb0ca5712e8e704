//! Binding HTTP request data to the authorization context types.

use axum::extract::RawPathParams;

use planboard_auth::{Method, RouteIds};
use planboard_core::{ProjectId, TaskId};

/// Route parameter carrying the project id.
pub const PROJECT_ID_PARAM: &str = "projectId";
/// Route parameter carrying the task id.
pub const TASK_ID_PARAM: &str = "taskId";

/// Bind project and task ids by parameter name.
///
/// A value that is not an integer leaves the slot unset, the same outcome
/// as a route without that parameter.
pub fn bind_route_ids<'a, I>(params: I) -> RouteIds
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut ids = RouteIds::default();
    for (key, value) in params {
        match key {
            PROJECT_ID_PARAM => ids.project_id = value.parse::<ProjectId>().ok(),
            TASK_ID_PARAM => ids.task_id = value.parse::<TaskId>().ok(),
            _ => {}
        }
    }
    ids
}

pub fn route_ids(params: Option<&RawPathParams>) -> RouteIds {
    match params {
        Some(params) => bind_route_ids(params.iter()),
        None => RouteIds::default(),
    }
}

pub fn method_of(method: &axum::http::Method) -> Method {
    method.as_str().parse().unwrap_or(Method::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_named_params_only() {
        let ids = bind_route_ids([("userId", "12"), ("projectId", "3"), ("taskId", "44")]);
        assert_eq!(ids.project_id, Some(ProjectId::new(3)));
        assert_eq!(ids.task_id, Some(TaskId::new(44)));
    }

    #[test]
    fn unrelated_integer_params_are_ignored() {
        let ids = bind_route_ids([("userId", "12")]);
        assert_eq!(ids, RouteIds::default());
    }

    #[test]
    fn non_integer_value_leaves_slot_unset() {
        let ids = bind_route_ids([("projectId", "latest")]);
        assert_eq!(ids.project_id, None);
    }

    #[test]
    fn http_methods_convert() {
        assert_eq!(method_of(&axum::http::Method::GET), Method::Get);
        assert_eq!(method_of(&axum::http::Method::DELETE), Method::Delete);
        assert_eq!(method_of(&axum::http::Method::TRACE), Method::Other);
    }
}
