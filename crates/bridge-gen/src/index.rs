//! Top-level declaration index
//!
//! One pass over the module body collecting the declarations the
//! extractor and resolver look up by name. The first declaration of a
//! name wins.

use crate::source::{str_value, ParsedModule};
use deno_ast::swc::ast as swc_ast;
use indexmap::IndexMap;

/// A top-level class declaration
#[derive(Debug, Clone, Copy)]
pub struct ClassEntry<'a> {
    pub class: &'a swc_ast::Class,
}

impl ClassEntry<'_> {
    /// Name of the superclass when it is a plain identifier
    pub fn super_class_name(&self) -> Option<String> {
        match self.class.super_class.as_deref() {
            Some(swc_ast::Expr::Ident(i)) => Some(i.sym.to_string()),
            _ => None,
        }
    }

    pub fn extends_html_element(&self) -> bool {
        self.super_class_name().as_deref() == Some("HTMLElement")
    }
}

/// A name brought in by a named import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedName {
    /// Module specifier as written
    pub module: String,
}

/// Declarations of one module, keyed by name
#[derive(Debug, Default)]
pub struct DeclarationIndex<'a> {
    pub classes: IndexMap<String, ClassEntry<'a>>,
    pub interfaces: IndexMap<String, &'a swc_ast::TsInterfaceDecl>,
    pub aliases: IndexMap<String, &'a swc_ast::TsTypeAliasDecl>,
    pub enums: IndexMap<String, &'a swc_ast::TsEnumDecl>,
    pub imports: IndexMap<String, ImportedName>,
    /// Class name to the tag it is registered under
    pub custom_elements: IndexMap<String, String>,
}

impl<'a> DeclarationIndex<'a> {
    pub fn build(parsed: &'a ParsedModule) -> Self {
        let mut index = DeclarationIndex::default();
        for item in &parsed.module().body {
            index.add_item(item);
        }
        index
    }

    /// Whether any non-class declaration carries the name
    pub fn declares_type(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
            || self.aliases.contains_key(name)
            || self.enums.contains_key(name)
    }

    /// First class that extends `HTMLElement`
    pub fn first_element_class(&self) -> Option<(&str, &ClassEntry<'a>)> {
        self.classes
            .iter()
            .find(|(_, entry)| entry.extends_html_element())
            .map(|(name, entry)| (name.as_str(), entry))
    }

    fn add_item(&mut self, item: &'a swc_ast::ModuleItem) {
        match item {
            swc_ast::ModuleItem::ModuleDecl(decl) => match decl {
                swc_ast::ModuleDecl::ExportDecl(export) => self.add_decl(&export.decl),
                swc_ast::ModuleDecl::ExportDefaultDecl(export) => match &export.decl {
                    swc_ast::DefaultDecl::Class(class_expr) => {
                        if let Some(ident) = &class_expr.ident {
                            self.classes
                                .entry(ident.sym.to_string())
                                .or_insert(ClassEntry { class: &class_expr.class });
                        }
                    }
                    swc_ast::DefaultDecl::TsInterfaceDecl(iface) => {
                        self.interfaces
                            .entry(iface.id.sym.to_string())
                            .or_insert(iface);
                    }
                    swc_ast::DefaultDecl::Fn(_) => {}
                },
                swc_ast::ModuleDecl::Import(import) => self.add_import(import),
                _ => {}
            },
            swc_ast::ModuleItem::Stmt(swc_ast::Stmt::Decl(decl)) => self.add_decl(decl),
            swc_ast::ModuleItem::Stmt(swc_ast::Stmt::Expr(expr_stmt)) => {
                if let Some((tag, class_name)) = custom_element_definition(&expr_stmt.expr) {
                    self.custom_elements.entry(class_name).or_insert(tag);
                }
            }
            _ => {}
        }
    }

    fn add_decl(&mut self, decl: &'a swc_ast::Decl) {
        match decl {
            swc_ast::Decl::Class(class_decl) => {
                self.classes
                    .entry(class_decl.ident.sym.to_string())
                    .or_insert(ClassEntry { class: &class_decl.class });
            }
            swc_ast::Decl::TsInterface(iface) => {
                self.interfaces
                    .entry(iface.id.sym.to_string())
                    .or_insert(iface);
            }
            swc_ast::Decl::TsTypeAlias(alias) => {
                self.aliases.entry(alias.id.sym.to_string()).or_insert(alias);
            }
            swc_ast::Decl::TsEnum(ts_enum) => {
                self.enums.entry(ts_enum.id.sym.to_string()).or_insert(ts_enum);
            }
            _ => {}
        }
    }

    fn add_import(&mut self, import: &'a swc_ast::ImportDecl) {
        let module = str_value(&import.src);
        for specifier in &import.specifiers {
            if let swc_ast::ImportSpecifier::Named(named) = specifier {
                self.imports
                    .entry(named.local.sym.to_string())
                    .or_insert(ImportedName { module: module.clone() });
            }
        }
    }
}

/// Match `customElements.define('tag', ClassName)` and return the tag and class name
fn custom_element_definition(expr: &swc_ast::Expr) -> Option<(String, String)> {
    let swc_ast::Expr::Call(call) = expr else {
        return None;
    };
    let callee = call.callee.as_expr()?;
    let swc_ast::Expr::Member(member) = callee.as_ref() else {
        return None;
    };
    let swc_ast::Expr::Ident(obj) = member.obj.as_ref() else {
        return None;
    };
    let swc_ast::MemberProp::Ident(prop) = &member.prop else {
        return None;
    };
    if &*obj.sym != "customElements" || &*prop.sym != "define" {
        return None;
    }

    let tag = match call.args.first().map(|a| a.expr.as_ref()) {
        Some(swc_ast::Expr::Lit(swc_ast::Lit::Str(s))) => str_value(s),
        _ => return None,
    };
    let class_name = match call.args.get(1).map(|a| a.expr.as_ref()) {
        Some(swc_ast::Expr::Ident(i)) => i.sym.to_string(),
        _ => return None,
    };
    Some((tag, class_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::parse_typescript_source;

    #[test]
    fn indexes_declarations_imports_and_registrations() {
        let source = r#"
import {Crumb, type Step as RenamedStep} from './crumbs.js';
import * as Helpers from './helpers.js';

interface Person { name: string }
export type Pet = { name: string };
export const enum Mode { On = 'on' }

export class Breadcrumbs extends HTMLElement {}
class Helper {}

customElements.define('devtools-breadcrumbs', Breadcrumbs);
"#;
        let parsed = parse_typescript_source("/tmp/breadcrumbs.ts", source).unwrap();
        let index = DeclarationIndex::build(&parsed);

        assert!(index.interfaces.contains_key("Person"));
        assert!(index.aliases.contains_key("Pet"));
        assert!(index.enums.contains_key("Mode"));
        assert!(index.declares_type("Pet"));
        assert!(!index.declares_type("Helper"));

        assert_eq!(index.classes.len(), 2);
        assert!(index.classes.contains_key("Helper"));
        assert_eq!(index.first_element_class().map(|(n, _)| n), Some("Breadcrumbs"));

        assert_eq!(index.imports["Crumb"].module, "./crumbs.js");
        assert_eq!(index.imports["RenamedStep"].module, "./crumbs.js");
        assert!(!index.imports.contains_key("Step"));
        assert!(!index.imports.contains_key("Helpers"));

        assert_eq!(
            index.custom_elements.get("Breadcrumbs").map(String::as_str),
            Some("devtools-breadcrumbs")
        );
    }

    #[test]
    fn ignores_other_define_calls() {
        let source = r#"
class A extends HTMLElement {}
registry.define('x-a', A);
customElements.define(tagName, A);
"#;
        let parsed = parse_typescript_source("/tmp/a.ts", source).unwrap();
        let index = DeclarationIndex::build(&parsed);
        assert!(index.custom_elements.is_empty());
    }
}
