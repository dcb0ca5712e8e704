//! Request-scoped authorization context and the loader that fills it.
//!
//! The loader runs once per request. Handlers read what it resolved and never
//! query membership or task records again.

use tracing::{debug, instrument};

use planboard_core::{EntityLookup, LookupError, Membership, ProjectId, TaskId, TaskRecord, UserId};

use crate::Method;

/// Ids bound from named route parameters.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RouteIds {
    pub project_id: Option<ProjectId>,
    pub task_id: Option<TaskId>,
}

/// Everything the requirement handlers may consult for one request.
///
/// Lookup fields are fixed at construction; only the failure slot is written
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    principal: Option<UserId>,
    method: Method,
    project_id: Option<ProjectId>,
    membership: Option<Membership>,
    task: Option<TaskRecord>,
    failure: Option<String>,
}

impl RequestContext {
    pub fn new(principal: Option<UserId>, method: Method) -> Self {
        Self {
            principal,
            method,
            project_id: None,
            membership: None,
            task: None,
            failure: None,
        }
    }

    pub fn with_project_id(mut self, project_id: Option<ProjectId>) -> Self {
        self.project_id = project_id;
        self
    }

    pub fn with_membership(mut self, membership: Option<Membership>) -> Self {
        self.membership = membership;
        self
    }

    pub fn with_task(mut self, task: Option<TaskRecord>) -> Self {
        self.task = task;
        self
    }

    pub fn principal(&self) -> Option<&UserId> {
        self.principal.as_ref()
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    pub fn membership(&self) -> Option<&Membership> {
        self.membership.as_ref()
    }

    pub fn task(&self) -> Option<&TaskRecord> {
        self.task.as_ref()
    }

    /// Last recorded denial reason, if any.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Store a denial reason. Last writer wins.
    pub fn record_failure(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
    }
}

/// Resolves the task, project id and membership for a request.
#[derive(Debug, Clone)]
pub struct ContextLoader<L> {
    lookup: L,
}

impl<L> ContextLoader<L>
where
    L: EntityLookup,
{
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Build the context for one request.
    ///
    /// The task is resolved first so that task routes without a project
    /// segment still get a project id. A missing route slot or an empty
    /// lookup leaves the field unset; only lookup faults are errors.
    #[instrument(skip(self, principal), fields(user_id = ?principal.as_ref().map(|p| p.as_str())), err)]
    pub async fn load(
        &self,
        principal: Option<UserId>,
        method: Method,
        route: RouteIds,
    ) -> Result<RequestContext, LookupError> {
        let task = match route.task_id {
            Some(task_id) => self.lookup.task(task_id).await?,
            None => None,
        };

        let project_id = route
            .project_id
            .or_else(|| task.as_ref().map(|t| t.project_id));

        let membership = match (project_id, principal.as_ref()) {
            (Some(project_id), Some(user_id)) => self.lookup.membership(project_id, user_id).await?,
            _ => None,
        };

        debug!(
            project_id = ?project_id.map(|p| p.get()),
            task_found = task.is_some(),
            member = membership.is_some(),
            "request context loaded"
        );

        Ok(RequestContext::new(principal, method)
            .with_project_id(project_id)
            .with_membership(membership)
            .with_task(task))
    }
}
