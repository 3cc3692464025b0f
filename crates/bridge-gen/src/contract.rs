//! Component contract data model
//!
//! The extracted public surface of one web component, with every type
//! normalised into a [`TypeShape`]. A contract is built once per run and
//! never mutated afterwards.

use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Built-in types that map directly onto a Closure type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Primitive {
    String,
    Number,
    Boolean,
    /// The global `Object` type, passed through opaquely
    Object,
}

impl Primitive {
    /// Closure spelling of the primitive
    pub fn closure_name(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::Object => "!Object",
        }
    }
}

/// Canonical description of a type on the component surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeShape {
    Primitive(Primitive),
    ArrayOf(Box<TypeShape>),
    /// Reference to a [`RecordShape`] collected in the same contract
    RecordRef(String),
    /// Reference to an [`EnumShape`] collected in the same contract
    EnumRef(String),
    /// Anonymous object literal type, rendered in place
    InlineRecord(IndexMap<String, FieldShape>),
}

impl TypeShape {
    pub fn array_of(inner: TypeShape) -> Self {
        TypeShape::ArrayOf(Box::new(inner))
    }
}

/// A record field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldShape {
    pub shape: TypeShape,
    /// Declared with `?`
    pub optional: bool,
}

/// Where a record's definition lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RecordOrigin {
    /// Declared in the analysed module; fields are known
    Local,
    /// Imported from another module; passed through without a shape
    External { module: String },
}

/// A named record type reachable from the component surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordShape {
    pub name: String,
    /// Field order follows the declaration, bases first
    pub fields: IndexMap<String, FieldShape>,
    pub origin: RecordOrigin,
}

impl RecordShape {
    pub fn local(name: impl Into<String>, fields: IndexMap<String, FieldShape>) -> Self {
        Self {
            name: name.into(),
            fields,
            origin: RecordOrigin::Local,
        }
    }

    pub fn external(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            origin: RecordOrigin::External {
                module: module.into(),
            },
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self.origin, RecordOrigin::External { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EnumKind {
    String,
    Number,
}

impl EnumKind {
    pub fn closure_name(&self) -> &'static str {
        match self {
            EnumKind::String => "string",
            EnumKind::Number => "number",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    pub name: String,
    /// JavaScript literal for the member value, quoted for string enums
    pub value: String,
}

/// A `const enum` reachable from the component surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumShape {
    pub name: String,
    pub kind: EnumKind,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MethodKind {
    Method,
    Getter,
    Setter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSignature {
    pub name: String,
    pub shape: TypeShape,
    pub optional: bool,
}

/// One bridged member of the component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSignature {
    pub name: String,
    pub kind: MethodKind,
    /// Declaration order; callers pass arguments by position
    pub params: Vec<ParamSignature>,
    pub return_shape: Option<TypeShape>,
}

/// The public surface of a component, ready for emission
#[derive(Debug, Clone, Serialize)]
pub struct ComponentContract {
    pub name: String,
    pub source_path: PathBuf,
    /// Tag registered with `customElements.define`, if any
    pub tag_name: Option<String>,
    pub extends_html_element: bool,
    pub methods: Vec<MethodSignature>,
    /// Records in first-encountered order
    pub records: Vec<Arc<RecordShape>>,
    /// Enums in first-encountered order
    pub enums: Vec<Arc<EnumShape>>,
}

impl ComponentContract {
    pub fn method_names(&self) -> Vec<&str> {
        self.methods.iter().map(|m| m.name.as_str()).collect()
    }

    /// Serialize the contract for inspection
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
