//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/cmstree/cmstree.toml`
//! 3. Local config: `<project_dir>/.cmstree.toml`
//! 4. Environment variables: `CMSTREE_*` prefix

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::policy::{AllowAll, AllowList, ChildPolicy, ROOT_KEY};

/// Raw settings for intermediate parsing (fields are Option to detect "not specified").
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty list
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub enforce_child_rules: Option<bool>,
    pub pretty: Option<bool>,
    pub child_rules: Option<BTreeMap<String, Vec<String>>>,
}

/// Unified configuration for cmstree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Check child-type rules on insert (default: true)
    pub enforce_child_rules: bool,
    /// Pretty-print JSON output (default: true)
    pub pretty: bool,
    /// Allowed child tags per parent tag; `root` is the top level of a tree
    pub child_rules: BTreeMap<String, Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        let rule = |parent: &str, children: &[&str]| {
            (
                parent.to_string(),
                children.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
            )
        };
        let child_rules = BTreeMap::from([
            rule(ROOT_KEY, &["Link", "Page", "Section"]),
            rule("Section", &["Row"]),
            rule("Row", &["Column"]),
            rule("Column", &["Image", "Row", "Text"]),
            rule("Text", &[]),
            rule("Image", &[]),
        ]);
        Self {
            enforce_child_rules: true,
            pretty: true,
            child_rules,
        }
    }
}

/// Merge lists with union semantics and negation support.
///
/// - Items from overlay are added to base
/// - Items prefixed with `!` remove the corresponding item from the result
/// - Duplicates are de-duplicated
///
/// # Examples
/// ```ignore
/// merge_array(&["Row"], &["Text"])          // → ["Row", "Text"]
/// merge_array(&["Row", "Text"], &["!Row"])  // → ["Text"]
/// ```
pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
    let mut result: HashSet<String> = base.iter().cloned().collect();

    for pattern in overlay {
        if let Some(negated) = pattern.strip_prefix('!') {
            result.remove(negated);
        } else {
            result.insert(pattern.clone());
        }
    }

    // Convert to sorted Vec for deterministic output
    let mut vec: Vec<String> = result.into_iter().collect();
    vec.sort();
    vec
}

/// Get the XDG config directory for cmstree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cmstree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("cmstree.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".cmstree.toml")
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
    /// Merge overlay config onto self (base) with union semantics for rule lists.
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - Rule lists: per parent tag, union merge with negation support
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut child_rules = self.child_rules.clone();
        if let Some(rules) = &overlay.child_rules {
            for (parent, children) in rules {
                let base = child_rules.get(parent).cloned().unwrap_or_default();
                child_rules.insert(parent.clone(), merge_array(&base, children));
            }
        }
        Self {
            enforce_child_rules: overlay.enforce_child_rules.unwrap_or(self.enforce_child_rules),
            pretty: overlay.pretty.unwrap_or(self.pretty),
            child_rules,
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for rules.
    ///
    /// Unlike `merge_with()` which uses union semantics, this method replaces
    /// the rule table entirely if the global config specifies one.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            enforce_child_rules: global.enforce_child_rules.unwrap_or(self.enforce_child_rules),
            pretty: global.pretty.unwrap_or(self.pretty),
            child_rules: global
                .child_rules
                .clone()
                .unwrap_or_else(|| self.child_rules.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a local `.cmstree.toml`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config (rule table REPLACES defaults)
    /// 3. Local config (rule lists UNION with global)
    /// 4. Environment variables: `CMSTREE_*` prefix (scalars only)
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Load global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        // 3. Load and merge local config
        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Apply environment variables (replaces - explicit override)
        Self::apply_env_overrides(current)
    }

    /// Apply CMSTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("CMSTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("enforce_child_rules") {
            settings.enforce_child_rules = val;
        }
        if let Ok(val) = config.get_bool("pretty") {
            settings.pretty = val;
        }

        Ok(settings)
    }

    /// Child-type policy described by these settings.
    pub fn policy(&self) -> Arc<dyn ChildPolicy> {
        if self.enforce_child_rules {
            Arc::new(AllowList::new(self.child_rules.clone()))
        } else {
            Arc::new(AllowAll)
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# cmstree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/cmstree/cmstree.toml  (defines your baseline)
#   Local:  <project>/.cmstree.toml         (project-specific additions)
#   Env:    CMSTREE_* environment variables (explicit overrides)
#
# Rule Merge Semantics:
#   Global child_rules REPLACE the compiled defaults.
#   Local child_rules UNION with global, per parent tag.
#   Use "!Tag" in local config to REMOVE an inherited child:
#     Column = ["Video", "!Image"]  # allows Video, forbids Image

# Check child-type rules when adding nodes
# enforce_child_rules = true

# Pretty-print JSON output
# pretty = true

[child_rules]
# root = ["Section", "Link", "Page"]
# Section = ["Row"]
# Row = ["Column"]
# Column = ["Row", "Text", "Image"]
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
