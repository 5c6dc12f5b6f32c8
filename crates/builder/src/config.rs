//! Build pipeline configuration

use launchpad_workspace::{WorkspaceManager, DEFAULT_RETAIN};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

fn default_install_command() -> Vec<String> {
    ["npm", "install", "--prefer-offline", "--no-audit", "--no-fund"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_build_command() -> Vec<String> {
    ["npm", "run", "build"].iter().map(ToString::to_string).collect()
}

/// Tunable parameters for one [`crate::Builder`].
///
/// Every field has a production default; a TOML config file or CLI flags may
/// override any subset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Workspace base directory; `<tmp>/launchpad-builds` when unset
    pub base_dir: Option<PathBuf>,
    /// Package-manager install command (argv)
    pub install_command: Vec<String>,
    /// Framework production-build command (argv)
    pub build_command: Vec<String>,
    /// Install-phase timeout in milliseconds
    pub install_timeout_ms: u64,
    /// Build-phase timeout in milliseconds
    pub build_timeout_ms: u64,
    /// Per-stream output retention cap in bytes
    pub max_output_bytes: usize,
    /// Workspaces kept by the retention sweep
    pub retain_workspaces: usize,
    /// Static export directory expected under the workspace root
    pub out_dir_name: String,
    /// Additional clamp on computed retry backoff, in milliseconds.
    /// The production default equals the backoff engine's own cap.
    pub backoff_cap_ms: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            install_command: default_install_command(),
            build_command: default_build_command(),
            install_timeout_ms: 120_000,
            build_timeout_ms: 300_000,
            max_output_bytes: 10 * 1024 * 1024,
            retain_workspaces: DEFAULT_RETAIN,
            out_dir_name: "out".to_string(),
            backoff_cap_ms: launchpad_retry::MAX_DELAY_MS,
        }
    }
}

impl BuildConfig {
    /// Install-phase timeout
    #[must_use]
    pub fn install_timeout(&self) -> Duration {
        Duration::from_millis(self.install_timeout_ms)
    }

    /// Build-phase timeout
    #[must_use]
    pub fn build_timeout(&self) -> Duration {
        Duration::from_millis(self.build_timeout_ms)
    }

    /// Backoff clamp applied on top of the retry engine's cap
    #[must_use]
    pub fn backoff_cap(&self) -> Duration {
        Duration::from_millis(self.backoff_cap_ms)
    }

    /// Workspace manager rooted at this config's base directory
    #[must_use]
    pub fn workspace_manager(&self) -> WorkspaceManager {
        match &self.base_dir {
            Some(base) => WorkspaceManager::new(base.clone()),
            None => WorkspaceManager::default_base(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pipeline_contract() {
        let config = BuildConfig::default();
        assert_eq!(config.install_timeout(), Duration::from_secs(120));
        assert_eq!(config.build_timeout(), Duration::from_secs(300));
        assert_eq!(config.max_output_bytes, 10 * 1024 * 1024);
        assert_eq!(config.retain_workspaces, 10);
        assert_eq!(config.out_dir_name, "out");
        assert_eq!(config.install_command[0], "npm");
    }

    #[test]
    fn partial_toml_overrides_merge_with_defaults() {
        let config: BuildConfig =
            toml::from_str("install_timeout_ms = 5000\nout_dir_name = \"dist\"").unwrap();
        assert_eq!(config.install_timeout(), Duration::from_secs(5));
        assert_eq!(config.out_dir_name, "dist");
        assert_eq!(config.build_timeout(), Duration::from_secs(300));
    }
}
