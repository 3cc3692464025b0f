//! TypeScript source loading via deno_ast
//!
//! Wraps `deno_ast::parse_module` and keeps enough of the original text
//! around to turn SWC spans back into file/line locations for diagnostics.

use crate::diagnostics::{BridgeError, BridgeResult};
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::{BytePos, Span};
use deno_ast::{MediaType, ParseParams, ParsedSource, SourcePos, SourceTextInfo};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A position inside a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Source filename
    pub filename: String,
    /// 1-indexed line number
    pub line: usize,
    /// 0-indexed column number
    pub col: usize,
}

impl Location {
    pub fn new(filename: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            filename: filename.into(),
            line,
            col,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.col + 1)
    }
}

/// Information about the source file
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// The file path
    pub path: PathBuf,
    /// The source text
    pub text: Arc<str>,
    /// Source text info for location lookups
    pub text_info: SourceTextInfo,
}

impl SourceInfo {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> Self {
        let text: Arc<str> = text.into();
        let text_info = SourceTextInfo::new(text.clone());
        Self {
            path: path.into(),
            text,
            text_info,
        }
    }

    /// Convert a byte position to a 1-indexed line and 0-indexed column
    pub fn line_col(&self, pos: BytePos) -> (usize, usize) {
        // Positions handed out by SWC are valid for this text
        let source_pos = SourcePos::unsafely_from_byte_pos(pos);
        let line_and_col = self.text_info.line_and_column_index(source_pos);
        (line_and_col.line_index + 1, line_and_col.column_index)
    }

    pub fn span_to_location(&self, span: Span) -> Location {
        let (line, col) = self.line_col(span.lo);
        Location::new(self.path.display().to_string(), line, col)
    }
}

/// A parsed TypeScript module with source information
#[derive(Debug)]
pub struct ParsedModule {
    /// The parsed source from deno_ast
    pub source: ParsedSource,
    /// Source information for location lookups
    pub source_info: SourceInfo,
}

impl ParsedModule {
    /// Get the module AST
    pub fn module(&self) -> &swc_ast::Module {
        match self.source.program_ref() {
            deno_ast::ProgramRef::Module(m) => m,
            // parse_typescript_source only accepts module programs
            deno_ast::ProgramRef::Script(_) => unreachable!("parsed source is not a module"),
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.source_info.path
    }

    /// Convert a span to a Location
    pub fn span_to_location(&self, span: Span) -> Location {
        self.source_info.span_to_location(span)
    }
}

/// Parse a TypeScript file from disk
pub fn parse_typescript_file(path: impl AsRef<Path>) -> BridgeResult<ParsedModule> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        BridgeError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read {}: {}", path.display(), e),
        ))
    })?;

    parse_typescript_source(path, text)
}

/// Parse TypeScript source code from a string
///
/// `path` must be absolute; deno_ast needs a `file://` specifier.
pub fn parse_typescript_source(
    path: impl AsRef<Path>,
    source: impl Into<Arc<str>>,
) -> BridgeResult<ParsedModule> {
    let path = path.as_ref();
    let source: Arc<str> = source.into();

    let media_type = MediaType::from_path(path);

    let specifier = deno_ast::ModuleSpecifier::from_file_path(path)
        .map_err(|_| BridgeError::InvalidPath(path.display().to_string()))?;

    let parsed = deno_ast::parse_module(ParseParams {
        specifier,
        text: source.clone(),
        media_type,
        capture_tokens: false,
        scope_analysis: false,
        maybe_syntax: None,
    })
    .map_err(|e| BridgeError::TypeScriptParse {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if !matches!(parsed.program_ref(), deno_ast::ProgramRef::Module(_)) {
        return Err(BridgeError::TypeScriptParse {
            file: path.to_path_buf(),
            message: "expected an ES module".to_string(),
        });
    }

    Ok(ParsedModule {
        source: parsed,
        source_info: SourceInfo::new(path, source),
    })
}

/// Convert an SWC string literal to an owned String
///
/// The value is stored as WTF-8, a superset of UTF-8.
pub fn str_value(s: &swc_ast::Str) -> String {
    String::from_utf8_lossy(s.value.as_bytes()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_component_source() {
        let source = r#"
            export class Greeter extends HTMLElement {
                greet(name: string): void {}
            }
        "#;

        // deno_ast requires absolute paths for file specifiers
        let parsed = parse_typescript_source("/tmp/greeter.ts", source).unwrap();
        assert_eq!(parsed.module().body.len(), 1);
        assert_eq!(parsed.path(), Path::new("/tmp/greeter.ts"));
    }

    #[test]
    fn reports_syntax_errors() {
        let err = parse_typescript_source("/tmp/broken.ts", "class {{{").unwrap_err();
        assert!(matches!(err, BridgeError::TypeScriptParse { .. }));
    }

    #[test]
    fn rejects_relative_paths() {
        let err = parse_typescript_source("relative.ts", "").unwrap_err();
        assert!(matches!(err, BridgeError::InvalidPath(_)));
    }

    #[test]
    fn location_display_is_one_based() {
        let loc = Location::new("a.ts", 3, 4);
        assert_eq!(loc.to_string(), "a.ts:3:5");
    }
}
