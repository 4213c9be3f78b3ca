//! Service registry - manifest directory scan and runtime map
//!
//! Scans the services directory for `<dir>/service.config.json` files.
//! A manifest that fails to parse, or carries an empty id, is skipped
//! with a warning; one bad manifest never aborts loading of the others.
//! Updates rewrite a single manifest file and rebuild only that runtime
//! entry in place.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::{info, warn};

use svchub_core::{
    Error, Result, ServiceManifest, ServiceRuntime, UpdateService, MANIFEST_FILE,
};

pub struct ServiceRegistry {
    services_dir: PathBuf,
    services: RwLock<HashMap<String, ServiceRuntime>>,
}

impl ServiceRegistry {
    pub fn new(services_dir: &Path) -> Self {
        Self {
            services_dir: services_dir.to_path_buf(),
            services: RwLock::new(HashMap::new()),
        }
    }

    /// Scan the services directory and (re)build runtime entries.
    ///
    /// Each valid manifest replaces any prior entry for its id. Returns
    /// the number of services held after the scan.
    pub async fn load(&self) -> Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.services_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "[registry] services directory {:?} unreadable: {}",
                    self.services_dir, e
                );
                return Ok(self.services.read().await.len());
            }
        };

        let mut services = self.services.write().await;
        while let Some(entry) = entries.next_entry().await? {
            let service_dir = entry.path();
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let manifest_path = service_dir.join(MANIFEST_FILE);
            let raw = match tokio::fs::read_to_string(&manifest_path).await {
                Ok(raw) => raw,
                Err(_) => continue,
            };
            let manifest: ServiceManifest = match serde_json::from_str(&raw) {
                Ok(manifest) => manifest,
                Err(e) => {
                    warn!("[registry] {:?} failed to parse: {}", manifest_path, e);
                    continue;
                }
            };
            if manifest.id.is_empty() {
                warn!("[registry] {:?} has no id, skipped", manifest_path);
                continue;
            }
            let runtime = ServiceRuntime::build(manifest, &service_dir);
            services.insert(runtime.id().to_string(), runtime);
        }
        info!("[registry] loaded {} services", services.len());
        Ok(services.len())
    }

    pub async fn list(&self) -> Vec<ServiceRuntime> {
        self.services.read().await.values().cloned().collect()
    }

    pub async fn get(&self, service_id: &str) -> Option<ServiceRuntime> {
        self.services.read().await.get(service_id).cloned()
    }

    /// Merge the allowed mutable fields into the persisted manifest, then
    /// rebuild that single runtime entry in place.
    ///
    /// The write lock is held across the whole read-merge-write-reload
    /// sequence so concurrent updates serialize. Other entries are never
    /// touched and no full reload occurs.
    pub async fn update(
        &self,
        service_id: &str,
        updates: &UpdateService,
    ) -> Result<ServiceRuntime> {
        let mut services = self.services.write().await;
        let service_dir = services
            .get(service_id)
            .map(|rt| rt.service_dir.clone())
            .ok_or(Error::ServiceNotFound)?;

        let manifest_path = service_dir.join(MANIFEST_FILE);
        let raw = tokio::fs::read_to_string(&manifest_path).await?;
        let mut manifest: ServiceManifest = serde_json::from_str(&raw)?;
        manifest.apply_update(updates);
        tokio::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?).await?;

        let runtime = ServiceRuntime::build(manifest, &service_dir);
        services.insert(service_id.to_string(), runtime.clone());
        Ok(runtime)
    }
}
