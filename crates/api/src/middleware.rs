use std::sync::Arc;

use axum::{
    body::Body,
    extract::{RawPathParams, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, error};

use planboard_auth::{JwtValidator, Principal};

use crate::app::{errors, services::AppServices};
use crate::context::{method_of, route_ids};
use crate::policy::AuthorizationFailure;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Attach the authenticated [`Principal`] when a bearer token is present.
///
/// A request without an `Authorization` header continues anonymously and is
/// later denied as a non-member. A header that is present but invalid is `401`.
pub async fn authenticate(State(state): State<AuthState>, mut req: Request<Body>, next: Next) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(Some(token)) => token,
        Ok(None) => return next.run(req).await,
        Err(reason) => {
            debug!(reason, "rejected authorization header");
            return errors::unauthorized();
        }
    };

    let claims = match state.jwt.validate(token, Utc::now()) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "rejected bearer token");
            return errors::unauthorized();
        }
    };

    req.extensions_mut().insert(Principal::new(claims.sub));
    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, &'static str> {
    let Some(header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| "non-ascii header")?;
    let token = header.strip_prefix("Bearer ").ok_or("not a bearer token")?.trim();
    if token.is_empty() {
        return Err("empty bearer token");
    }

    Ok(Some(token))
}

/// Resolve the request context once, from named route parameters.
///
/// Must be installed with `route_layer` so route parameters are available.
pub async fn load_context(
    State(services): State<AppServices>,
    params: Option<RawPathParams>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let principal = req.extensions().get::<Principal>().map(|p| p.user_id.clone());
    let method = method_of(req.method());
    let ids = route_ids(params.as_ref());

    match services.loader.load(principal, method, ids).await {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(e) => {
            error!(error = %e, path = %req.uri().path(), "failed to load request context");
            errors::internal_error()
        }
    }
}

/// Replace the body of a denied response with `{"error": reason}`.
///
/// Only `403` responses carrying an [`AuthorizationFailure`] are touched.
pub fn rewrite_denied_body(response: Response) -> Response {
    if response.status() != StatusCode::FORBIDDEN {
        return response;
    }
    let Some(failure) = response.extensions().get::<AuthorizationFailure>().cloned() else {
        return response;
    };

    let (mut parts, _body) = response.into_parts();
    parts
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    parts.headers.remove(header::CONTENT_LENGTH);

    let body = json!({ "error": failure.reason }).to_string();
    Response::from_parts(parts, Body::from(body))
}

/// Outermost layer: rewrites denial bodies once the status is final.
pub async fn rewrite_failure(req: Request<Body>, next: Next) -> Response {
    let response = next.run(req).await;
    rewrite_denied_body(response)
}
