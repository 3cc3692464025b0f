//! Bridge module emitter
//!
//! Renders a [`ComponentContract`] as a Closure-annotated JavaScript
//! module: record typedefs, enums, a body-less stub class and a factory
//! returning the real element typed as the stub.

use crate::config::BridgeConfig;
use crate::contract::{
    ComponentContract, EnumShape, FieldShape, MethodKind, MethodSignature, ParamSignature,
    RecordOrigin, RecordShape, TypeShape,
};
use std::ffi::OsString;
use std::path::{Component, Path};

/// The rendered parts of a bridge module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    pub header: String,
    pub import: String,
    /// One block per record, then one per enum
    pub type_blocks: Vec<String>,
    pub stub_class: String,
    pub factory: String,
}

impl GeneratedModule {
    /// Full module text; parts are separated by a blank line
    pub fn render(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.type_blocks.len() + 4);
        parts.push(&self.header);
        parts.push(&self.import);
        parts.extend(self.type_blocks.iter().map(String::as_str));
        parts.push(&self.stub_class);
        parts.push(&self.factory);
        parts.join("\n")
    }
}

/// Emit the bridge module for a contract
pub fn emit(contract: &ComponentContract, config: &BridgeConfig) -> GeneratedModule {
    BridgeEmitter::new(contract, config).generate()
}

/// Generator for one bridge module
pub struct BridgeEmitter<'a> {
    contract: &'a ComponentContract,
    config: &'a BridgeConfig,
    /// Specifier of the component module; `./<stem>.js` unless set
    import_specifier: Option<String>,
}

impl<'a> BridgeEmitter<'a> {
    pub fn new(contract: &'a ComponentContract, config: &'a BridgeConfig) -> Self {
        Self {
            contract,
            config,
            import_specifier: None,
        }
    }

    /// Import the component module through `specifier`, for bridges
    /// written outside the source directory
    pub fn import_specifier(mut self, specifier: impl Into<String>) -> Self {
        self.import_specifier = Some(specifier.into());
        self
    }

    pub fn generate(&self) -> GeneratedModule {
        let mut type_blocks: Vec<String> = self
            .contract
            .records
            .iter()
            .map(|r| self.generate_record(r))
            .collect();
        type_blocks.extend(self.contract.enums.iter().map(|e| self.generate_enum(e)));

        GeneratedModule {
            header: self.generate_header(),
            import: self.generate_import(),
            type_blocks,
            stub_class: self.generate_stub_class(),
            factory: self.generate_factory(),
        }
    }

    fn stub_name(&self) -> String {
        self.config.stub_name(&self.contract.name)
    }

    fn generate_header(&self) -> String {
        let mut output = String::new();
        output.push_str("/**\n");
        output.push_str(" * WARNING: do not modify this file by hand!\n");
        output.push_str(" * It was generated by the component bridge generator.\n");
        output.push_str(" * If the component changes, regenerate it with:\n");
        output.push_str(&format!(
            " *   {} {}\n",
            self.config.regenerate_command,
            self.contract.source_path.display()
        ));
        output.push_str(" */\n");
        output
    }

    fn generate_import(&self) -> String {
        let specifier = self.import_specifier.clone().unwrap_or_else(|| {
            let stem = self
                .contract
                .source_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.contract.name.clone());
            format!("./{}.js", stem)
        });

        match self.contract.tag_name {
            // Importing for side effects registers the element
            Some(_) => format!("import {};\n", js_string_literal(&specifier)),
            None => format!(
                "import {{{}}} from {};\n",
                self.contract.name,
                js_string_literal(&specifier)
            ),
        }
    }

    fn generate_record(&self, record: &RecordShape) -> String {
        let mut output = String::new();

        match &record.origin {
            RecordOrigin::Local => {
                output.push_str("/**\n");
                output.push_str("* @typedef {{\n");
                for (name, field) in &record.fields {
                    output.push_str(&format!("* {}:{},\n", js_key(name), field_type(field)));
                }
                output.push_str("* }}\n");
                output.push_str("*/\n");
            }
            RecordOrigin::External { module } => {
                output.push_str(&format!(
                    "// {} is defined in {} and passed through without a local shape\n",
                    record.name, module
                ));
            }
        }

        output.push_str("// @ts-ignore we export this for Closure not TS\n");
        output.push_str(&format!("export let {};\n", record.name));
        output
    }

    fn generate_enum(&self, e: &EnumShape) -> String {
        let mut output = String::new();
        output.push_str("/**\n");
        output.push_str(&format!("* @enum {{{}}}\n", e.kind.closure_name()));
        output.push_str("*/\n");
        output.push_str("// @ts-ignore we export this for Closure not TS\n");
        output.push_str(&format!("export let {} = {{\n", e.name));
        for member in &e.members {
            output.push_str(&format!("  {}: {},\n", js_key(&member.name), member.value));
        }
        output.push_str("};\n");
        output
    }

    fn generate_stub_class(&self) -> String {
        let mut output = String::new();
        output.push_str("// eslint-disable-next-line no-unused-vars\n");
        if self.contract.extends_html_element {
            output.push_str(&format!(
                "export class {} extends HTMLElement {{\n",
                self.stub_name()
            ));
        } else {
            output.push_str(&format!("export class {} {{\n", self.stub_name()));
        }

        for method in &self.contract.methods {
            output.push_str(&self.generate_member(method));
        }

        output.push_str("}\n");
        output
    }

    fn generate_member(&self, method: &MethodSignature) -> String {
        let mut output = String::new();

        let mut doc_lines: Vec<String> = method
            .params
            .iter()
            .map(|p| format!("@param {{{}}} {}", param_type(p), p.name))
            .collect();
        if let Some(shape) = &method.return_shape {
            doc_lines.push(format!("@return {{{}}}", closure_type(shape)));
        }
        if !doc_lines.is_empty() {
            output.push_str("  /**\n");
            for line in doc_lines {
                output.push_str(&format!("  * {}\n", line));
            }
            output.push_str("  */\n");
        }

        let params: Vec<&str> = method.params.iter().map(|p| p.name.as_str()).collect();
        let prefix = match method.kind {
            MethodKind::Method => "",
            MethodKind::Getter => "get ",
            MethodKind::Setter => "set ",
        };
        output.push_str(&format!(
            "  {}{}({}) {{\n",
            prefix,
            method.name,
            params.join(", ")
        ));
        output.push_str("  }\n");
        output
    }

    fn generate_factory(&self) -> String {
        let stub = self.stub_name();
        let construct = match &self.contract.tag_name {
            Some(tag) => format!("document.createElement({})", js_string_literal(tag)),
            None => format!("new {}()", self.contract.name),
        };

        let mut output = String::new();
        output.push_str("/**\n");
        output.push_str(&format!("* @return {{!{}}}\n", stub));
        output.push_str("*/\n");
        output.push_str(&format!(
            "export function {}() {{\n",
            self.config.factory_name(&self.contract.name)
        ));
        output.push_str(&format!(
            "  return /** @type {{!{}}} */ ({});\n",
            stub, construct
        ));
        output.push_str("}\n");
        output
    }
}

/// Closure type expression for a shape
pub fn closure_type(shape: &TypeShape) -> String {
    match shape {
        TypeShape::Primitive(p) => p.closure_name().to_string(),
        TypeShape::ArrayOf(inner) => format!("!Array.<{}>", closure_type(inner)),
        TypeShape::RecordRef(name) | TypeShape::EnumRef(name) => format!("!{}", name),
        TypeShape::InlineRecord(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(name, field)| format!("{}: {}", js_key(name), field_type(field)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
    }
}

fn field_type(field: &FieldShape) -> String {
    if field.optional {
        format!("({}|undefined)", closure_type(&field.shape))
    } else {
        closure_type(&field.shape)
    }
}

fn param_type(param: &ParamSignature) -> String {
    if !param.optional {
        return closure_type(&param.shape);
    }
    match &param.shape {
        TypeShape::RecordRef(_) | TypeShape::EnumRef(_) => {
            format!("{}=", closure_type(&param.shape))
        }
        shape => format!("({}|undefined)=", closure_type(shape)),
    }
}

/// Relative import specifier for `target` as seen from a module in `from_dir`
///
/// Both paths must be absolute; `.` and `..` are resolved lexically.
pub fn relative_specifier(from_dir: &Path, target: &Path) -> String {
    let from = lexical_components(from_dir);
    let to = lexical_components(target);
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<String> = vec!["..".to_string(); from.len() - common];
    parts.extend(to[common..].iter().map(|c| c.to_string_lossy().into_owned()));
    let specifier = parts.join("/");
    if specifier.starts_with("..") {
        specifier
    } else {
        format!("./{}", specifier)
    }
}

fn lexical_components(path: &Path) -> Vec<OsString> {
    let mut out: Vec<OsString> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str().to_os_string()),
        }
    }
    out
}

/// Single-quoted JavaScript string literal
pub fn js_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Object key, quoted unless it is a valid identifier
fn js_key(name: &str) -> String {
    let mut chars = name.chars();
    let is_ident = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if is_ident {
        name.to_string()
    } else {
        js_string_literal(name)
    }
}
