//! Requirement handlers: one evaluation unit per requirement kind.

use async_trait::async_trait;

use planboard_core::LookupError;

use crate::{RequestContext, Verdict};

pub mod assignee;
pub mod membership;
pub mod quota;
pub mod role;

pub use assignee::AssigneeHandler;
pub use membership::MembershipHandler;
pub use quota::QuotaHandler;
pub use role::RolePolicyHandler;

/// Evaluates one kind of requirement against the request context.
///
/// Handlers must return an explicit verdict. `Err` is reserved for lookup
/// faults, which abort the request instead of denying it.
#[async_trait]
pub trait RequirementHandler: Send + Sync {
    type Requirement: Sync + ?Sized;

    async fn evaluate(
        &self,
        ctx: &RequestContext,
        requirement: &Self::Requirement,
    ) -> Result<Verdict, LookupError>;
}

pub(crate) const NOT_A_MEMBER: &str = "You are not a member of this project.";
