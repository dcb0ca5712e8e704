//! In-memory entity directory for tests/dev.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use planboard_core::{
    EntityLookup, Feature, FeatureId, LookupError, LookupResult, Membership, PlanFeatureValue, PlanId,
    Project, ProjectId, Subscription, TaskId, TaskRecord, UserId, feature_names,
};

#[derive(Debug, Default)]
struct Tables {
    memberships: HashMap<(ProjectId, UserId), Membership>,
    tasks: HashMap<TaskId, TaskRecord>,
    projects: HashMap<ProjectId, Project>,
    subscriptions: HashMap<UserId, Subscription>,
    features: HashMap<String, Feature>,
    plan_values: HashMap<(PlanId, FeatureId), PlanFeatureValue>,
    storage_used: HashMap<UserId, u64>,
}

/// Seedable in-memory implementation of [`EntityLookup`].
///
/// Memberships are keyed by (project, user), so inserting a second membership
/// for the same pair replaces the first (a role change).
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: RwLock<Tables>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory with the quota feature vocabulary installed.
    pub fn with_default_features() -> Self {
        let directory = Self::new();
        directory.seed_default_features();
        directory
    }

    fn read(&self) -> LookupResult<RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|_| LookupError::Unavailable("directory lock poisoned".to_string()))
    }

    fn write(&self) -> Option<RwLockWriteGuard<'_, Tables>> {
        match self.inner.write() {
            Ok(guard) => Some(guard),
            Err(_) => {
                tracing::error!("directory lock poisoned; write dropped");
                None
            }
        }
    }

    pub fn seed_default_features(&self) {
        let names = [
            feature_names::PROJECT_COUNT,
            feature_names::MEMBER_COUNT,
            feature_names::FILE_STORAGE,
        ];
        for (idx, name) in names.into_iter().enumerate() {
            self.insert_feature(Feature {
                feature_id: FeatureId::new(idx as i64 + 1),
                name: name.to_string(),
            });
        }
    }

    pub fn insert_membership(&self, membership: Membership) {
        if let Some(mut t) = self.write() {
            t.memberships
                .insert((membership.project_id, membership.user_id.clone()), membership);
        }
    }

    pub fn remove_membership(&self, project_id: ProjectId, user_id: &UserId) {
        if let Some(mut t) = self.write() {
            t.memberships.remove(&(project_id, user_id.clone()));
        }
    }

    pub fn insert_task(&self, task: TaskRecord) {
        if let Some(mut t) = self.write() {
            t.tasks.insert(task.task_id, task);
        }
    }

    pub fn insert_project(&self, project: Project) {
        if let Some(mut t) = self.write() {
            t.projects.insert(project.project_id, project);
        }
    }

    pub fn insert_subscription(&self, subscription: Subscription) {
        if let Some(mut t) = self.write() {
            t.subscriptions.insert(subscription.owner_id.clone(), subscription);
        }
    }

    pub fn insert_feature(&self, feature: Feature) {
        if let Some(mut t) = self.write() {
            t.features.insert(feature.name.clone(), feature);
        }
    }

    pub fn insert_plan_value(&self, value: PlanFeatureValue) {
        if let Some(mut t) = self.write() {
            t.plan_values.insert((value.plan_id, value.feature_id), value);
        }
    }

    pub fn set_storage_used(&self, owner_id: UserId, used: u64) {
        if let Some(mut t) = self.write() {
            t.storage_used.insert(owner_id, used);
        }
    }
}

#[async_trait]
impl EntityLookup for InMemoryDirectory {
    async fn membership(&self, project_id: ProjectId, user_id: &UserId) -> LookupResult<Option<Membership>> {
        Ok(self.read()?.memberships.get(&(project_id, user_id.clone())).cloned())
    }

    async fn task(&self, task_id: TaskId) -> LookupResult<Option<TaskRecord>> {
        Ok(self.read()?.tasks.get(&task_id).cloned())
    }

    async fn project(&self, project_id: ProjectId) -> LookupResult<Option<Project>> {
        Ok(self.read()?.projects.get(&project_id).cloned())
    }

    async fn subscription(&self, owner_id: &UserId) -> LookupResult<Option<Subscription>> {
        Ok(self.read()?.subscriptions.get(owner_id).cloned())
    }

    async fn feature_by_name(&self, name: &str) -> LookupResult<Option<Feature>> {
        Ok(self.read()?.features.get(name).cloned())
    }

    async fn plan_feature_value(
        &self,
        plan_id: PlanId,
        feature_id: FeatureId,
    ) -> LookupResult<Option<PlanFeatureValue>> {
        Ok(self.read()?.plan_values.get(&(plan_id, feature_id)).cloned())
    }

    async fn count_projects_owned_by(&self, user_id: &UserId) -> LookupResult<u64> {
        let t = self.read()?;
        Ok(t.projects.values().filter(|p| p.owner() == Some(user_id)).count() as u64)
    }

    async fn count_project_members(&self, project_id: ProjectId) -> LookupResult<u64> {
        let t = self.read()?;
        Ok(t.memberships.keys().filter(|(p, _)| *p == project_id).count() as u64)
    }

    async fn storage_used(&self, owner_id: &UserId) -> LookupResult<u64> {
        Ok(self.read()?.storage_used.get(owner_id).copied().unwrap_or(0))
    }
}
