//! BridgeBuilder - read a component source, generate its bridge, write it
//!
//! The whole module is rendered in memory before anything touches the
//! output path, and the write goes through a sibling temporary file that
//! is renamed into place. A failed run leaves the filesystem untouched.

use crate::config::BridgeConfig;
use crate::contract::ComponentContract;
use crate::diagnostics::{BridgeError, BridgeResult};
use crate::emit::{relative_specifier, BridgeEmitter};
use crate::extract::extract_contract;
use crate::source::parse_typescript_file;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What happened to the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// The bridge was written
    Written,
    /// Check mode: the file on disk matches the generated text
    UpToDate,
    /// Check mode: the file is missing or differs
    Stale,
}

/// Result of a successful run
#[derive(Debug)]
pub struct BuildOutput {
    pub output_path: PathBuf,
    pub contract: ComponentContract,
    /// Generated module text
    pub text: String,
    pub status: BuildStatus,
}

/// Builder for generating one bridge module
///
/// # Example
///
/// ```no_run
/// use bridge_gen::BridgeBuilder;
///
/// BridgeBuilder::new("front_end/Greeter.ts")
///     .component("Greeter")
///     .build()
///     .expect("Failed to generate bridge");
/// ```
#[derive(Debug, Clone)]
pub struct BridgeBuilder {
    /// TypeScript source of the component
    pub source: PathBuf,
    /// Component class name; the `HTMLElement` subclass when unset
    pub component: Option<String>,
    pub config: BridgeConfig,
    /// Explicit output path
    pub output: Option<PathBuf>,
    /// Compare with the file on disk instead of writing
    pub check: bool,
}

impl BridgeBuilder {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            component: None,
            config: BridgeConfig::default(),
            output: None,
            check: false,
        }
    }

    /// Set the component class name
    pub fn component(mut self, name: impl Into<String>) -> Self {
        self.component = Some(name.into());
        self
    }

    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Write to `path` instead of the derived output path
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    /// Output path: explicit, or `<source dir>/<stem><output_suffix>`
    pub fn output_path(&self) -> BridgeResult<PathBuf> {
        if let Some(output) = &self.output {
            return Ok(output.clone());
        }
        let stem = self
            .source
            .file_stem()
            .ok_or_else(|| BridgeError::InvalidPath(self.source.display().to_string()))?;
        Ok(self.source.with_file_name(format!(
            "{}{}",
            stem.to_string_lossy(),
            self.config.output_suffix
        )))
    }

    /// Extract and render without touching the output path
    pub fn generate(&self) -> BridgeResult<(ComponentContract, String)> {
        self.config.validate()?;

        let absolute = if self.source.is_relative() {
            std::env::current_dir()?.join(&self.source)
        } else {
            self.source.clone()
        };
        let parsed = parse_typescript_file(&absolute)?;
        let mut contract = extract_contract(&parsed, self.component.as_deref(), &self.config)?;
        // The header quotes the path as it was given
        contract.source_path = self.source.clone();

        debug!(
            component = %contract.name,
            methods = contract.methods.len(),
            records = contract.records.len(),
            enums = contract.enums.len(),
            "extracted contract"
        );
        // The import is resolved from wherever the bridge is written
        let output = self.output_path()?;
        let output = if output.is_relative() {
            std::env::current_dir()?.join(output)
        } else {
            output
        };
        let output_dir = output
            .parent()
            .ok_or_else(|| BridgeError::InvalidPath(output.display().to_string()))?;
        let specifier = relative_specifier(output_dir, &absolute.with_extension("js"));

        let text = BridgeEmitter::new(&contract, &self.config)
            .import_specifier(specifier)
            .generate()
            .render();
        Ok((contract, text))
    }

    /// Generate the bridge and write or check it
    pub fn build(self) -> BridgeResult<BuildOutput> {
        let output_path = self.output_path()?;
        let (contract, text) = self.generate()?;

        let status = if self.check {
            let current = match std::fs::read_to_string(&output_path) {
                Ok(current) => Some(current),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                Err(e) => return Err(e.into()),
            };
            if current.as_deref() == Some(text.as_str()) {
                info!(path = %output_path.display(), "bridge is up to date");
                BuildStatus::UpToDate
            } else {
                info!(path = %output_path.display(), "bridge is out of date");
                BuildStatus::Stale
            }
        } else {
            write_atomic(&output_path, &text)?;
            info!(
                path = %output_path.display(),
                component = %contract.name,
                "wrote bridge"
            );
            BuildStatus::Written
        };

        Ok(BuildOutput {
            output_path,
            contract,
            text,
            status,
        })
    }
}

/// Write through a temporary sibling file renamed into place
fn write_atomic(path: &Path, text: &str) -> BridgeResult<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| BridgeError::InvalidPath(path.display().to_string()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }

    let tmp = dir.join(format!(".{}.tmp", file_name.to_string_lossy()));
    std::fs::write(&tmp, text)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
