//! Postgres-backed entity lookup.
//!
//! One parameterized query per lookup. Tables:
//!
//! | Table | Columns used |
//! |-------|--------------|
//! | `project_members` | `project_id`, `user_id`, `role`, `joined_at` |
//! | `tasks` | `id`, `project_id`, `assignee_id`, `status` |
//! | `projects` | `id`, `name`, `created_by` |
//! | `subscriptions` | `owner_id`, `plan_id`, `is_active` |
//! | `features` | `id`, `name` |
//! | `plan_features` | `plan_id`, `feature_id`, `value` |
//! | `storage_usage` | `owner_id`, `used` |
//!
//! ## Error Mapping
//!
//! Every sqlx error becomes `LookupError::Storage` tagged with the lookup
//! name, except a closed pool which is `LookupError::Unavailable`. Rows that
//! fail to decode (including unknown role names) are storage errors too.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use planboard_core::{
    EntityLookup, Feature, FeatureId, LookupError, LookupResult, Membership, PlanFeatureValue, PlanId,
    Project, ProjectId, ProjectRole, Subscription, TaskId, TaskRecord, UserId,
};

#[derive(Debug, Clone)]
pub struct PostgresLookup {
    pool: Arc<PgPool>,
}

impl PostgresLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Connect with a small pool sized for request-path lookups.
    pub async fn connect(database_url: &str) -> LookupResult<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> LookupError {
    match err {
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => LookupError::Unavailable(err.to_string()),
        other => LookupError::storage(operation, other.to_string()),
    }
}

/// An unrecognised stored role is a storage fault, not an absent membership.
fn decode_role(raw: &str) -> Result<ProjectRole, LookupError> {
    raw.parse::<ProjectRole>()
        .map_err(|e| LookupError::storage("membership", e.to_string()))
}

fn membership_from_row(row: &PgRow) -> Result<Membership, LookupError> {
    let decode = |e: sqlx::Error| map_sqlx_error("membership", e);
    let role = decode_role(&row.try_get::<String, _>("role").map_err(decode)?)?;
    let joined_at: DateTime<Utc> = row.try_get("joined_at").map_err(decode)?;

    Ok(Membership {
        project_id: ProjectId::new(row.try_get("project_id").map_err(decode)?),
        user_id: UserId::new(row.try_get::<String, _>("user_id").map_err(decode)?),
        role,
        joined_at,
    })
}

fn task_from_row(row: &PgRow) -> Result<TaskRecord, LookupError> {
    let decode = |e: sqlx::Error| map_sqlx_error("task", e);
    Ok(TaskRecord {
        task_id: TaskId::new(row.try_get("id").map_err(decode)?),
        project_id: ProjectId::new(row.try_get("project_id").map_err(decode)?),
        assignee_id: row
            .try_get::<Option<String>, _>("assignee_id")
            .map_err(decode)?
            .map(UserId::new),
        status: row.try_get("status").map_err(decode)?,
    })
}

fn project_from_row(row: &PgRow) -> Result<Project, LookupError> {
    let decode = |e: sqlx::Error| map_sqlx_error("project", e);
    Ok(Project {
        project_id: ProjectId::new(row.try_get("id").map_err(decode)?),
        name: row.try_get("name").map_err(decode)?,
        created_by: row
            .try_get::<Option<String>, _>("created_by")
            .map_err(decode)?
            .map(UserId::new),
    })
}

fn count_from_row(operation: &'static str, row: &PgRow) -> Result<u64, LookupError> {
    let total: i64 = row.try_get("total").map_err(|e| map_sqlx_error(operation, e))?;
    Ok(total.max(0) as u64)
}

#[async_trait]
impl EntityLookup for PostgresLookup {
    #[instrument(skip(self), err)]
    async fn membership(&self, project_id: ProjectId, user_id: &UserId) -> LookupResult<Option<Membership>> {
        let row = sqlx::query(
            r#"
            SELECT project_id, user_id, role, joined_at
            FROM project_members
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id.get())
        .bind(user_id.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("membership", e))?;

        row.as_ref().map(membership_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn task(&self, task_id: TaskId) -> LookupResult<Option<TaskRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, project_id, assignee_id, status
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(task_id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("task", e))?;

        row.as_ref().map(task_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn project(&self, project_id: ProjectId) -> LookupResult<Option<Project>> {
        let row = sqlx::query("SELECT id, name, created_by FROM projects WHERE id = $1")
            .bind(project_id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("project", e))?;

        row.as_ref().map(project_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn subscription(&self, owner_id: &UserId) -> LookupResult<Option<Subscription>> {
        let row = sqlx::query(
            r#"
            SELECT owner_id, plan_id
            FROM subscriptions
            WHERE owner_id = $1 AND is_active
            LIMIT 1
            "#,
        )
        .bind(owner_id.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("subscription", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let plan_id: i64 = row
            .try_get("plan_id")
            .map_err(|e| map_sqlx_error("subscription", e))?;

        Ok(Some(Subscription {
            owner_id: owner_id.clone(),
            plan_id: PlanId::new(plan_id),
        }))
    }

    #[instrument(skip(self), err)]
    async fn feature_by_name(&self, name: &str) -> LookupResult<Option<Feature>> {
        let row = sqlx::query("SELECT id, name FROM features WHERE name = $1")
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("feature_by_name", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let decode = |e: sqlx::Error| map_sqlx_error("feature_by_name", e);

        Ok(Some(Feature {
            feature_id: FeatureId::new(row.try_get("id").map_err(decode)?),
            name: row.try_get("name").map_err(decode)?,
        }))
    }

    #[instrument(skip(self), err)]
    async fn plan_feature_value(
        &self,
        plan_id: PlanId,
        feature_id: FeatureId,
    ) -> LookupResult<Option<PlanFeatureValue>> {
        let row = sqlx::query("SELECT value FROM plan_features WHERE plan_id = $1 AND feature_id = $2")
            .bind(plan_id.get())
            .bind(feature_id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("plan_feature_value", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let value: String = row
            .try_get("value")
            .map_err(|e| map_sqlx_error("plan_feature_value", e))?;

        Ok(Some(PlanFeatureValue {
            plan_id,
            feature_id,
            value,
        }))
    }

    #[instrument(skip(self), err)]
    async fn count_projects_owned_by(&self, user_id: &UserId) -> LookupResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM projects WHERE created_by = $1")
            .bind(user_id.as_str())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_projects_owned_by", e))?;

        count_from_row("count_projects_owned_by", &row)
    }

    #[instrument(skip(self), err)]
    async fn count_project_members(&self, project_id: ProjectId) -> LookupResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM project_members WHERE project_id = $1")
            .bind(project_id.get())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_project_members", e))?;

        count_from_row("count_project_members", &row)
    }

    #[instrument(skip(self), err)]
    async fn storage_used(&self, owner_id: &UserId) -> LookupResult<u64> {
        let row = sqlx::query("SELECT COALESCE(SUM(used), 0)::BIGINT AS total FROM storage_usage WHERE owner_id = $1")
            .bind(owner_id.as_str())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("storage_used", e))?;

        count_from_row("storage_used", &row)
    }
}
