//! Generator configuration
//!
//! Loaded from a TOML file; every key is optional.
//!
//! ```toml
//! stub_suffix = "ClosureInterface"
//! output_suffix = "_bridge.js"
//! skip_methods = ["connectedCallback"]
//! ```

use crate::diagnostics::{BridgeError, BridgeResult};
use serde::Deserialize;
use std::path::Path;

/// Custom element callbacks invoked by the browser, never by consumers
pub const LIFECYCLE_METHODS: &[&str] = &[
    "connectedCallback",
    "disconnectedCallback",
    "adoptedCallback",
    "attributeChangedCallback",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Appended to the component name to form the stub class name
    pub stub_suffix: String,
    /// Prepended to the component name to form the factory name
    pub factory_prefix: String,
    /// Appended to the source file stem to form the output file name
    pub output_suffix: String,
    /// Command quoted in the generated header
    pub regenerate_command: String,
    /// Public methods that are never bridged
    pub skip_methods: Vec<String>,
    /// Accept imported types as pass-through references
    pub allow_external: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            stub_suffix: "Interface".to_string(),
            factory_prefix: "create".to_string(),
            output_suffix: "_bridge.js".to_string(),
            regenerate_command: "gen-bridge".to_string(),
            skip_methods: LIFECYCLE_METHODS.iter().map(|m| m.to_string()).collect(),
            allow_external: true,
        }
    }
}

impl BridgeConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> BridgeResult<Self> {
        let config: BridgeConfig =
            toml::from_str(text).map_err(|e| BridgeError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::config(format!("reading {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> BridgeResult<()> {
        if self.stub_suffix.is_empty() {
            return Err(BridgeError::config("stub_suffix must not be empty"));
        }
        if self.factory_prefix.is_empty() {
            return Err(BridgeError::config("factory_prefix must not be empty"));
        }
        if self.output_suffix.is_empty() {
            return Err(BridgeError::config("output_suffix must not be empty"));
        }
        Ok(())
    }

    pub fn skips(&self, method: &str) -> bool {
        self.skip_methods.iter().any(|m| m == method)
    }

    pub fn stub_name(&self, component: &str) -> String {
        format!("{}{}", component, self.stub_suffix)
    }

    pub fn factory_name(&self, component: &str) -> String {
        format!("{}{}", self.factory_prefix, component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_skip_lifecycle_callbacks() {
        let config = BridgeConfig::default();
        assert!(config.skips("connectedCallback"));
        assert!(!config.skips("render"));
        assert_eq!(config.stub_name("Greeter"), "GreeterInterface");
        assert_eq!(config.factory_name("Greeter"), "createGreeter");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = BridgeConfig::from_toml_str(
            r#"
stub_suffix = "ClosureInterface"
allow_external = false
"#,
        )
        .unwrap();
        assert_eq!(config.stub_name("Crumbs"), "CrumbsClosureInterface");
        assert!(!config.allow_external);
        assert_eq!(config.output_suffix, "_bridge.js");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = BridgeConfig::from_toml_str("stub_sufix = \"X\"").unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn empty_suffix_is_rejected() {
        let err = BridgeConfig::from_toml_str("output_suffix = \"\"").unwrap_err();
        assert!(err.to_string().contains("output_suffix"));
    }
}
