//! Route-level policy guard.
//!
//! Endpoints declare the requirements they need by wrapping their handler in
//! a [`RequireLayer`]. The guard runs after the context loader and before the
//! handler body.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use tracing::error;

use planboard_auth::{PolicyEvaluator, RequestContext, Requirement, Verdict};

use crate::app::errors;
use crate::app::services::SharedLookup;

/// Denial reason attached to a `403` response for the failure rewriter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationFailure {
    pub reason: String,
}

/// Builds guards that share one evaluator.
#[derive(Clone)]
pub struct Policies {
    evaluator: Arc<PolicyEvaluator<SharedLookup>>,
}

impl Policies {
    pub fn new(evaluator: Arc<PolicyEvaluator<SharedLookup>>) -> Self {
        Self { evaluator }
    }

    pub fn require<I, R>(&self, requirements: I) -> RequireLayer
    where
        I: IntoIterator<Item = R>,
        R: Into<Requirement>,
    {
        RequireLayer {
            evaluator: self.evaluator.clone(),
            requirements: requirements.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone)]
pub struct RequireLayer {
    evaluator: Arc<PolicyEvaluator<SharedLookup>>,
    requirements: Arc<[Requirement]>,
}

impl<S> Layer<S> for RequireLayer {
    type Service = PolicyGuard<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PolicyGuard {
            inner,
            evaluator: self.evaluator.clone(),
            requirements: self.requirements.clone(),
        }
    }
}

#[derive(Clone)]
pub struct PolicyGuard<S> {
    inner: S,
    evaluator: Arc<PolicyEvaluator<SharedLookup>>,
    requirements: Arc<[Requirement]>,
}

impl<S> Service<Request<Body>> for PolicyGuard<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let evaluator = self.evaluator.clone();
        let requirements = self.requirements.clone();
        // Take the service that was driven to readiness; leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let Some(ctx) = req.extensions_mut().get_mut::<RequestContext>() else {
                error!("policy guard reached without a request context");
                return Ok(errors::internal_error());
            };

            let outcome = evaluator.evaluate(ctx, &requirements).await;
            match outcome {
                Ok(Verdict::Allow) => inner.call(req).await,
                Ok(Verdict::Deny(denial)) => {
                    // Reason as recorded on the context by the evaluator.
                    let reason = ctx.failure().map(str::to_owned).unwrap_or(denial.reason);
                    Ok(forbidden(reason))
                }
                Err(e) => {
                    error!(error = %e, path = %req.uri().path(), "lookup failed during authorization");
                    Ok(errors::internal_error())
                }
            }
        })
    }
}

/// Bare `403` carrying the reason; the body is filled in by the rewriter.
pub fn forbidden(reason: impl Into<String>) -> Response {
    let reason = reason.into();
    let mut response = StatusCode::FORBIDDEN.into_response();
    response
        .extensions_mut()
        .insert(AuthorizationFailure { reason });
    response
}
