//! `planboard-core`: domain records and the entity lookup seam.
//!
//! This crate contains ids, the role vocabulary and plain records. The only
//! abstraction over storage is the read-only [`EntityLookup`] trait.

pub mod error;
pub mod id;
pub mod lookup;
pub mod records;
pub mod role;

pub use error::{DomainError, DomainResult};
pub use id::{FeatureId, PlanId, ProjectId, TaskId, UserId};
pub use lookup::{EntityLookup, LookupError, LookupResult};
pub use records::{
    Feature, Membership, PlanFeatureValue, PlanLimit, Project, Subscription, TaskRecord, UNLIMITED,
    feature_names,
};
pub use role::ProjectRole;
