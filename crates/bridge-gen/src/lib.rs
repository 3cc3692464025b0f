//! bridge-gen: Closure bridge generator for TypeScript web components
//!
//! Reads a component class from a TypeScript module and emits a
//! Closure-annotated JavaScript module that lets Closure-typed code use
//! the component without importing its concrete class:
//! - Parsing the source with deno_ast/SWC
//! - Extracting the public methods, getters and setters of the component
//! - Resolving parameter and return types into primitives, arrays, records and enums
//! - Emitting record typedefs, a body-less stub class and a factory function
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐   ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Component.ts   │──▶│  extract    │──▶│ Contract     │──▶│  emit        │
//! │ (SWC parse)    │   │  + resolve  │   │ (shapes)     │   │ _bridge.js   │
//! └────────────────┘   └─────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use bridge_gen::BridgeBuilder;
//!
//! BridgeBuilder::new("front_end/Greeter.ts")
//!     .component("Greeter")
//!     .build()
//!     .expect("Failed to generate bridge");
//! ```

// Data model
pub mod contract;

// Parsing and analysis
pub mod diagnostics;
pub mod extract;
pub mod index;
pub mod resolve;
pub mod source;
pub mod visibility;

// Output
pub mod builder;
pub mod config;
pub mod emit;

use std::path::Path;
use std::sync::Arc;

pub use builder::{BridgeBuilder, BuildOutput, BuildStatus};
pub use config::BridgeConfig;
pub use contract::{
    ComponentContract, EnumKind, EnumShape, FieldShape, MethodKind, MethodSignature,
    ParamSignature, Primitive, RecordOrigin, RecordShape, TypeShape,
};
pub use diagnostics::{BridgeError, BridgeResult};
pub use emit::{emit, relative_specifier, BridgeEmitter, GeneratedModule};
pub use extract::extract_contract;
pub use source::{parse_typescript_file, parse_typescript_source, Location, ParsedModule};

/// Generate bridge text from in-memory source
///
/// `path` must be absolute; it is quoted in the header and used to derive
/// the import of the component module.
pub fn generate_bridge(
    path: impl AsRef<Path>,
    source: impl Into<Arc<str>>,
    component: Option<&str>,
    config: &BridgeConfig,
) -> BridgeResult<String> {
    config.validate()?;
    let parsed = parse_typescript_source(path, source)?;
    let contract = extract_contract(&parsed, component, config)?;
    Ok(emit(&contract, config).render())
}
