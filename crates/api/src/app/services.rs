//! Service wiring shared by middleware and routes.

use std::sync::Arc;

use planboard_auth::{ContextLoader, PolicyEvaluator};
use planboard_core::EntityLookup;
use planboard_infra::{InMemoryDirectory, PostgresLookup};

/// Lookup collaborator as shared across requests.
pub type SharedLookup = Arc<dyn EntityLookup>;

#[derive(Clone)]
pub struct AppServices {
    pub loader: Arc<ContextLoader<SharedLookup>>,
    pub evaluator: Arc<PolicyEvaluator<SharedLookup>>,
}

impl AppServices {
    pub fn new(lookup: SharedLookup) -> Self {
        Self {
            loader: Arc::new(ContextLoader::new(lookup.clone())),
            evaluator: Arc::new(PolicyEvaluator::new(lookup)),
        }
    }
}

/// Pick the lookup backend: Postgres when a database URL is configured,
/// otherwise an in-memory directory seeded with the feature vocabulary.
pub async fn build_lookup(database_url: Option<&str>) -> anyhow::Result<SharedLookup> {
    match database_url {
        Some(url) => {
            let lookup = PostgresLookup::connect(url).await?;
            tracing::info!("using postgres entity lookup");
            Ok(Arc::new(lookup))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using empty in-memory directory");
            Ok(Arc::new(InMemoryDirectory::with_default_features()))
        }
    }
}
