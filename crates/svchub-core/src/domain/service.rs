//! Service manifest and runtime entities
//!
//! A `ServiceManifest` is the persisted, authoritative configuration for
//! one backend service (`service.config.json` inside the service's
//! directory). A `ServiceRuntime` is the manifest after load-time
//! resolution: `${VAR}` placeholders substituted and asset/document paths
//! made absolute. Runtimes are rebuilt whenever the manifest is (re)loaded.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::env_subst::substitute_env;

/// Path rewrite applied to proxied requests when the manifest sets none
pub const DEFAULT_PROXY_REWRITE: &str = "/api";

/// Manifest file name expected in each service directory
pub const MANIFEST_FILE: &str = "service.config.json";

/// Persisted service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceManifest {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Entry page, relative to the service directory
    pub entry_html: String,
    /// Entry script, relative to the service directory; its parent is the
    /// distribution directory for asset serving
    pub entry_script: String,
    #[serde(default)]
    pub required_roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_rewrite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_target: Option<String>,
}

/// Mutable manifest fields accepted by the admin update endpoint.
///
/// Omitted fields retain their prior values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateService {
    pub name: Option<String>,
    pub description: Option<String>,
    pub required_roles: Option<Vec<String>>,
    pub proxy_target: Option<String>,
    pub proxy_rewrite: Option<String>,
}

impl ServiceManifest {
    /// Merge the allowed mutable fields into this manifest.
    pub fn apply_update(&mut self, updates: &UpdateService) {
        if let Some(name) = &updates.name {
            self.name = name.clone();
        }
        if let Some(description) = &updates.description {
            self.description = Some(description.clone());
        }
        if let Some(required_roles) = &updates.required_roles {
            self.required_roles = required_roles.clone();
        }
        if let Some(proxy_target) = &updates.proxy_target {
            self.proxy_target = Some(proxy_target.clone());
        }
        if let Some(proxy_rewrite) = &updates.proxy_rewrite {
            self.proxy_rewrite = Some(proxy_rewrite.clone());
        }
    }
}

/// A manifest resolved against the process environment and filesystem.
#[derive(Debug, Clone)]
pub struct ServiceRuntime {
    pub manifest: ServiceManifest,
    /// Directory the manifest was loaded from
    pub service_dir: PathBuf,
    pub abs_html_path: PathBuf,
    pub abs_script_path: PathBuf,
    pub api_doc_path: PathBuf,
    pub plan_path: PathBuf,
    pub workbook_path: PathBuf,
}

impl ServiceRuntime {
    /// Resolve a manifest into a runtime entry.
    ///
    /// `${VAR}` placeholders in `proxyTarget` are substituted here, once,
    /// so later reads see a plain URL.
    pub fn build(mut manifest: ServiceManifest, service_dir: &Path) -> Self {
        manifest.proxy_target = manifest
            .proxy_target
            .as_deref()
            .map(substitute_env);
        Self {
            abs_html_path: service_dir.join(&manifest.entry_html),
            abs_script_path: service_dir.join(&manifest.entry_script),
            api_doc_path: service_dir.join("API_DOCUMENT.md"),
            plan_path: service_dir.join("PLAN.md"),
            workbook_path: service_dir.join("WORKBLOOK.md"),
            service_dir: service_dir.to_path_buf(),
            manifest,
        }
    }

    pub fn id(&self) -> &str {
        &self.manifest.id
    }

    /// Distribution directory for asset requests: the entry script's parent.
    pub fn dist_dir(&self) -> &Path {
        self.abs_script_path
            .parent()
            .unwrap_or(&self.service_dir)
    }

    /// Path rewrite for proxied requests, defaulting to `/api`.
    pub fn proxy_rewrite(&self) -> &str {
        self.manifest
            .proxy_rewrite
            .as_deref()
            .unwrap_or(DEFAULT_PROXY_REWRITE)
    }

    /// Gateway-side path prefix clients call for this service's API.
    pub fn proxy_path(&self) -> String {
        format!("/{}/api", self.manifest.id)
    }
}
