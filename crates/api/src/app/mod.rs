//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: lookup backend and the shared loader/evaluator
//! - `routes/`: HTTP routes + handlers, with their requirements attached
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses
//!
//! Layer order, outermost first: failure rewriter, authentication, context
//! loader (per route), policy guard (per handler), handler.

use std::sync::Arc;

use axum::{Router, middleware::from_fn, middleware::from_fn_with_state, routing::get};

use planboard_auth::Hs256JwtValidator;

use crate::middleware;
use crate::policy::Policies;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(jwt_secret: String, lookup: services::SharedLookup) -> Router {
    let jwt = Arc::new(Hs256JwtValidator::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState { jwt };

    let services = services::AppServices::new(lookup);
    let policies = Policies::new(services.evaluator.clone());

    let protected = routes::router(&policies)
        .route_layer(from_fn_with_state(services, middleware::load_context))
        .layer(from_fn_with_state(auth_state, middleware::authenticate));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(from_fn(middleware::rewrite_failure))
}
