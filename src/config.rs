//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/mepgraph/mepgraph.toml`
//! 3. Local config: `<model_dir>/.mepgraph.toml` (next to the model file)
//! 4. Environment variables: `MEPGRAPH_*` prefix, `__` separates sections
//! 5. Command line flags (applied by the CLI layer)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{TraversalOrder, DEFAULT_MAX_NODES};

/// Where serialized graphs are persisted besides the output files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Store each system's hierarchy text on the system itself
    pub per_system: bool,
    /// Store the project composite on the project record
    pub project_level: bool,
    /// Order of the stored hierarchy text
    pub order: TraversalOrder,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            per_system: false,
            project_level: true,
            order: TraversalOrder::RootFirst,
        }
    }
}

impl StorageConfig {
    /// True if any attribute write is requested.
    pub fn any(&self) -> bool {
        self.per_system || self.project_level
    }
}

/// Traversal limits and scheduling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TraversalConfig {
    /// Abort a system's traversal beyond this many nodes
    pub max_nodes: usize,
    /// Traverse systems in parallel (output order is unaffected)
    pub parallel: bool,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            parallel: false,
        }
    }
}

/// Raw storage config for intermediate parsing (Option detects "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawStorageConfig {
    pub per_system: Option<bool>,
    pub project_level: Option<bool>,
    pub order: Option<TraversalOrder>,
}

/// Raw traversal config for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTraversalConfig {
    pub max_nodes: Option<usize>,
    pub parallel: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub output_dir: Option<PathBuf>,
    pub storage: RawStorageConfig,
    pub traversal: RawTraversalConfig,
}

/// Unified configuration for mepgraph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Output directory (default: fresh directory under the system temp dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Attribute storage settings
    pub storage: StorageConfig,
    /// Traversal settings
    pub traversal: TraversalConfig,
}

/// Get the XDG config directory for mepgraph.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mepgraph").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("mepgraph.toml"))
}

/// Get the path to the local config file next to a model.
pub fn local_config_path(model_dir: &Path) -> PathBuf {
    model_dir.join(".mepgraph.toml")
}

/// Fresh timestamped output directory under the system temp dir.
pub fn default_output_dir() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    std::env::temp_dir().join(format!("mepgraph-{stamp}"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Output directory, falling back to [`default_output_dir`].
    pub fn resolve_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(default_output_dir)
    }

    /// Expand `~`, `$VAR` and `${VAR}` in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(dir) = &self.output_dir {
            let raw = dir.to_string_lossy();
            let expanded = shellexpand::full(raw.as_ref())
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            self.output_dir = Some(PathBuf::from(expanded));
        }
    }

    /// Overlay wins where it specifies a value, otherwise keep self.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            output_dir: overlay
                .output_dir
                .clone()
                .or_else(|| self.output_dir.clone()),
            storage: StorageConfig {
                per_system: overlay
                    .storage
                    .per_system
                    .unwrap_or(self.storage.per_system),
                project_level: overlay
                    .storage
                    .project_level
                    .unwrap_or(self.storage.project_level),
                order: overlay.storage.order.unwrap_or(self.storage.order),
            },
            traversal: TraversalConfig {
                max_nodes: overlay
                    .traversal
                    .max_nodes
                    .unwrap_or(self.traversal.max_nodes),
                parallel: overlay
                    .traversal
                    .parallel
                    .unwrap_or(self.traversal.parallel),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `model_dir` - Optional directory of the model file for local config
    pub fn load(model_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = model_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Reject values no run can work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.traversal.max_nodes == 0 {
            return Err(ApplicationError::Config {
                message: "traversal.max_nodes must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Apply MEPGRAPH_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("MEPGRAPH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("output_dir") {
            settings.output_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("storage.per_system") {
            settings.storage.per_system = val;
        }
        if let Ok(val) = config.get_bool("storage.project_level") {
            settings.storage.project_level = val;
        }
        if let Ok(val) = config.get_string("storage.order") {
            settings.storage.order = val.parse().map_err(|message| ApplicationError::Config {
                message: format!("MEPGRAPH_STORAGE__ORDER: {message}"),
            })?;
        }
        if let Ok(val) = config.get_int("traversal.max_nodes") {
            settings.traversal.max_nodes =
                usize::try_from(val).map_err(|e| ApplicationError::Config {
                    message: format!("MEPGRAPH_TRAVERSAL__MAX_NODES: {e}"),
                })?;
        }
        if let Ok(val) = config.get_bool("traversal.parallel") {
            settings.traversal.parallel = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# mepgraph configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/mepgraph/mepgraph.toml
#   Local:  <model_dir>/.mepgraph.toml
#   Env:    MEPGRAPH_* environment variables, e.g. MEPGRAPH_STORAGE__PER_SYSTEM=true

# Directory for exported files (default: new directory under the temp dir)
# output_dir = "~/mep-exports"

[storage]
# Store each system's hierarchy text on the system
# per_system = false

# Store the project composite on the project record
# project_level = true

# Order of stored hierarchy text: "root-first" or "leaf-first"
# order = "root-first"

[traversal]
# Abort a system's traversal beyond this many nodes
# max_nodes = 1000000

# Traverse systems on all cores
# parallel = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
