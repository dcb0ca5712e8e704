//! Test doubles for the lookup collaborator.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use planboard_core::{
    EntityLookup, Feature, FeatureId, LookupError, LookupResult, Membership, PlanFeatureValue, PlanId,
    Project, ProjectId, ProjectRole, Subscription, TaskId, TaskRecord, UserId,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct Calls {
    pub membership: usize,
    pub task: usize,
    pub project: usize,
    pub subscription: usize,
}

#[derive(Debug, Default)]
struct State {
    memberships: Vec<Membership>,
    tasks: Vec<TaskRecord>,
    projects: Vec<Project>,
    subscriptions: Vec<Subscription>,
    features: Vec<Feature>,
    plan_values: Vec<PlanFeatureValue>,
    owned_projects: HashMap<UserId, u64>,
    members: HashMap<ProjectId, u64>,
    storage: HashMap<UserId, u64>,
    failing: bool,
    calls: Calls,
}

/// Cloneable in-process lookup with call counting.
#[derive(Debug, Default, Clone)]
pub struct StubLookup {
    state: Arc<Mutex<State>>,
}

impl StubLookup {
    fn edit(self, f: impl FnOnce(&mut State)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn with_membership(self, m: Membership) -> Self {
        self.edit(|s| s.memberships.push(m))
    }

    pub fn with_task(self, t: TaskRecord) -> Self {
        self.edit(|s| s.tasks.push(t))
    }

    pub fn with_project(self, p: Project) -> Self {
        self.edit(|s| s.projects.push(p))
    }

    pub fn with_subscription(self, owner: &str, plan: i64) -> Self {
        self.edit(|s| {
            s.subscriptions.push(Subscription {
                owner_id: UserId::new(owner),
                plan_id: PlanId::new(plan),
            })
        })
    }

    pub fn with_feature(self, id: i64, name: &str) -> Self {
        self.edit(|s| {
            s.features.push(Feature {
                feature_id: FeatureId::new(id),
                name: name.to_string(),
            })
        })
    }

    pub fn with_plan_value(self, plan: i64, feature: i64, value: &str) -> Self {
        self.edit(|s| {
            s.plan_values.push(PlanFeatureValue {
                plan_id: PlanId::new(plan),
                feature_id: FeatureId::new(feature),
                value: value.to_string(),
            })
        })
    }

    pub fn with_owned_projects(self, owner: &str, count: u64) -> Self {
        self.edit(|s| {
            s.owned_projects.insert(UserId::new(owner), count);
        })
    }

    pub fn with_member_count(self, project: i64, count: u64) -> Self {
        self.edit(|s| {
            s.members.insert(ProjectId::new(project), count);
        })
    }

    pub fn with_storage_used(self, owner: &str, used: u64) -> Self {
        self.edit(|s| {
            s.storage.insert(UserId::new(owner), used);
        })
    }

    pub fn failing(self) -> Self {
        self.edit(|s| s.failing = true)
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls
    }

    fn read<T>(&self, f: impl FnOnce(&mut State) -> T) -> LookupResult<T> {
        let mut state = self.state.lock().unwrap();
        if state.failing {
            return Err(LookupError::Unavailable("stub failure".into()));
        }
        Ok(f(&mut state))
    }
}

#[async_trait]
impl EntityLookup for StubLookup {
    async fn membership(&self, project_id: ProjectId, user_id: &UserId) -> LookupResult<Option<Membership>> {
        self.read(|s| {
            s.calls.membership += 1;
            s.memberships
                .iter()
                .find(|m| m.project_id == project_id && &m.user_id == user_id)
                .cloned()
        })
    }

    async fn task(&self, task_id: TaskId) -> LookupResult<Option<TaskRecord>> {
        self.read(|s| {
            s.calls.task += 1;
            s.tasks.iter().find(|t| t.task_id == task_id).cloned()
        })
    }

    async fn project(&self, project_id: ProjectId) -> LookupResult<Option<Project>> {
        self.read(|s| {
            s.calls.project += 1;
            s.projects.iter().find(|p| p.project_id == project_id).cloned()
        })
    }

    async fn subscription(&self, owner_id: &UserId) -> LookupResult<Option<Subscription>> {
        self.read(|s| {
            s.calls.subscription += 1;
            s.subscriptions.iter().find(|sub| &sub.owner_id == owner_id).cloned()
        })
    }

    async fn feature_by_name(&self, name: &str) -> LookupResult<Option<Feature>> {
        self.read(|s| s.features.iter().find(|f| f.name == name).cloned())
    }

    async fn plan_feature_value(
        &self,
        plan_id: PlanId,
        feature_id: FeatureId,
    ) -> LookupResult<Option<PlanFeatureValue>> {
        self.read(|s| {
            s.plan_values
                .iter()
                .find(|v| v.plan_id == plan_id && v.feature_id == feature_id)
                .cloned()
        })
    }

    async fn count_projects_owned_by(&self, user_id: &UserId) -> LookupResult<u64> {
        self.read(|s| s.owned_projects.get(user_id).copied().unwrap_or(0))
    }

    async fn count_project_members(&self, project_id: ProjectId) -> LookupResult<u64> {
        self.read(|s| s.members.get(&project_id).copied().unwrap_or(0))
    }

    async fn storage_used(&self, owner_id: &UserId) -> LookupResult<u64> {
        self.read(|s| s.storage.get(owner_id).copied().unwrap_or(0))
    }
}

pub fn membership(project: i64, user: &str, role: ProjectRole) -> Membership {
    Membership {
        project_id: ProjectId::new(project),
        user_id: UserId::new(user),
        role,
        joined_at: Utc::now(),
    }
}

pub fn task(id: i64, project: i64, assignee: Option<&str>) -> TaskRecord {
    TaskRecord {
        task_id: TaskId::new(id),
        project_id: ProjectId::new(project),
        assignee_id: assignee.map(UserId::new),
        status: "In Progress".to_string(),
    }
}

pub fn project(id: i64, owner: Option<&str>) -> Project {
    Project {
        project_id: ProjectId::new(id),
        name: format!("project-{id}"),
        created_by: owner.map(UserId::new),
    }
}
