//! `planboard-auth`: per-request authorization for project resources.
//!
//! Requirements are declarative values; handlers turn a requirement and a
//! request context into an explicit [`Verdict`]. Storage is reached only
//! through [`planboard_core::EntityLookup`]; this crate knows nothing of HTTP.

pub mod claims;
pub mod context;
pub mod evaluator;
pub mod handlers;
pub mod method;
pub mod principal;
pub mod requirement;
pub mod verdict;

#[cfg(test)]
pub(crate) mod testing;

pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use context::{ContextLoader, RequestContext, RouteIds};
pub use evaluator::PolicyEvaluator;
pub use method::Method;
pub use principal::Principal;
pub use requirement::{AssigneePolicy, QuotaPolicy, Requirement, RolePolicy};
pub use verdict::{Denial, DenialKind, Verdict};
