use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::artifact::Artifact;

const LOCATOR_SCHEME: &str = "blob:clip-recorder/";

/// Revocable reference to an artifact, usable for playback or download
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator(String);

impl Locator {
    fn generate() -> Self {
        Self(format!("{}{}", LOCATOR_SCHEME, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host blob/locator facility
///
/// Cheap to clone; clones share the same table.
#[derive(Clone, Default)]
pub struct LocatorRegistry {
    entries: Arc<RwLock<HashMap<Locator, Arc<Artifact>>>>,
}

impl LocatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh locator for `artifact`
    pub async fn register(&self, artifact: Arc<Artifact>) -> Locator {
        let locator = Locator::generate();
        debug!("Registered {} ({} bytes)", locator, artifact.len());
        self.entries.write().await.insert(locator.clone(), artifact);
        locator
    }

    /// Look up a live locator
    pub async fn resolve(&self, locator: &Locator) -> Option<Arc<Artifact>> {
        self.entries.read().await.get(locator).cloned()
    }

    /// Revoke a locator. Returns false if it was not live.
    pub async fn revoke(&self, locator: &Locator) -> bool {
        let removed = self.entries.write().await.remove(locator).is_some();
        if removed {
            debug!("Revoked {}", locator);
        }
        removed
    }

    /// Number of locators currently live
    pub async fn live_count(&self) -> usize {
        self.entries.read().await.len()
    }
}
