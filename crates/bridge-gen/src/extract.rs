//! Interface extraction
//!
//! Locates the component class in a parsed module and reads its public
//! surface into a [`ComponentContract`], resolving every parameter and
//! return type on the way.

use crate::config::BridgeConfig;
use crate::contract::{ComponentContract, MethodKind, MethodSignature, ParamSignature};
use crate::diagnostics::{BridgeError, BridgeResult};
use crate::index::{ClassEntry, DeclarationIndex};
use crate::resolve::{type_label, TypeResolver};
use crate::source::{str_value, ParsedModule};
use crate::visibility::Visibility;
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::{Span, Spanned};
use std::collections::HashSet;
use tracing::debug;

/// Extract the contract of a component class
///
/// With `component` set, the class of that name is used; otherwise the
/// first class extending `HTMLElement`.
pub fn extract_contract(
    parsed: &ParsedModule,
    component: Option<&str>,
    config: &BridgeConfig,
) -> BridgeResult<ComponentContract> {
    let index = DeclarationIndex::build(parsed);
    let (name, entry) = locate_component(parsed, &index, component)?;
    debug!(component = %name, file = %parsed.path().display(), "extracting component");

    let mut extractor = Extractor {
        parsed,
        component: &name,
        config,
        resolver: TypeResolver::new(parsed, &index).allow_external(config.allow_external),
    };
    let methods = extractor.methods(entry.class)?;
    let resolved = extractor.resolver.finish();

    Ok(ComponentContract {
        tag_name: index.custom_elements.get(&name).cloned(),
        extends_html_element: entry.extends_html_element(),
        name,
        source_path: parsed.path().to_path_buf(),
        methods,
        records: resolved.records,
        enums: resolved.enums,
    })
}

fn locate_component<'a>(
    parsed: &ParsedModule,
    index: &DeclarationIndex<'a>,
    component: Option<&str>,
) -> BridgeResult<(String, ClassEntry<'a>)> {
    let not_found = |name: &str, reason: &str| BridgeError::ComponentNotFound {
        file: parsed.path().to_path_buf(),
        name: name.to_string(),
        reason: reason.to_string(),
    };

    match component {
        Some(name) => {
            if let Some(entry) = index.classes.get(name) {
                return Ok((name.to_string(), *entry));
            }
            let reason = if index.interfaces.contains_key(name) {
                "it is declared as an interface, not a class"
            } else if index.aliases.contains_key(name) {
                "it is declared as a type alias, not a class"
            } else if index.enums.contains_key(name) {
                "it is declared as an enum, not a class"
            } else {
                "no class with this name is declared at the top level"
            };
            Err(not_found(name, reason))
        }
        None => index
            .first_element_class()
            .map(|(name, entry)| (name.to_string(), *entry))
            .ok_or_else(|| not_found("<component>", "no class extending HTMLElement is declared")),
    }
}

struct Extractor<'a> {
    parsed: &'a ParsedModule,
    component: &'a str,
    config: &'a BridgeConfig,
    resolver: TypeResolver<'a>,
}

impl Extractor<'_> {
    fn methods(&mut self, class: &swc_ast::Class) -> BridgeResult<Vec<MethodSignature>> {
        let mut methods = Vec::new();
        // Overload signatures repeat a name; the first declaration is bridged
        let mut seen = HashSet::new();

        for member in &class.body {
            let Some(visibility) = Visibility::of_member(member) else {
                continue;
            };
            let swc_ast::ClassMember::Method(method) = member else {
                debug!(visibility = visibility.display(), "skipping private member");
                continue;
            };
            let Some(name) = method_name(&method.key) else {
                debug!("skipping member with computed name");
                continue;
            };
            if method.is_static {
                debug!(method = %name, "skipping static member");
                continue;
            }
            if !visibility.is_bridged() {
                debug!(method = %name, visibility = visibility.display(), "skipping non-public member");
                continue;
            }
            if self.config.skips(&name) {
                debug!(method = %name, "skipping configured method");
                continue;
            }

            let kind = match method.kind {
                swc_ast::MethodKind::Method => MethodKind::Method,
                swc_ast::MethodKind::Getter => MethodKind::Getter,
                swc_ast::MethodKind::Setter => MethodKind::Setter,
            };
            if !seen.insert((name.clone(), kind)) {
                continue;
            }

            let signature = self.method(name, kind, method)?;
            debug!(
                method = %signature.name,
                params = signature.params.len(),
                "extracted member"
            );
            methods.push(signature);
        }

        Ok(methods)
    }

    fn method(
        &mut self,
        name: String,
        kind: MethodKind,
        method: &swc_ast::ClassMethod,
    ) -> BridgeResult<MethodSignature> {
        let decl = format!("{}.{}", self.component, name);
        let function = &method.function;

        if function.type_params.is_some() {
            return Err(self.unsupported(
                method.span,
                &decl,
                "type parameters",
                "generic methods cannot be bridged",
            ));
        }

        // A leading `this` parameter only types the receiver
        let declared = match function.params.split_first() {
            Some((first, rest)) if is_this_param(&first.pat) => rest,
            _ => function.params.as_slice(),
        };
        let params = declared
            .iter()
            .map(|param| self.param(&param.pat, &decl))
            .collect::<BridgeResult<Vec<_>>>()?;

        let return_type = function.return_type.as_ref().map(|ann| ann.type_ann.as_ref());
        let return_shape = match return_type {
            None => None,
            Some(ty) if is_void(ty) => None,
            Some(ty) => Some(self.resolver.resolve(ty, &decl)?),
        };

        match kind {
            MethodKind::Getter if return_shape.is_none() => {
                return Err(self.unsupported(
                    method.span,
                    &decl,
                    return_type.map(type_label).unwrap_or_else(|| "implicit any".to_string()),
                    "getters need a non-void return type annotation",
                ));
            }
            MethodKind::Setter if params.len() != 1 => {
                return Err(self.unsupported(
                    method.span,
                    &decl,
                    "setter parameters",
                    "setters need exactly one typed parameter",
                ));
            }
            _ => {}
        }

        Ok(MethodSignature {
            name,
            kind,
            params,
            return_shape,
        })
    }

    fn param(&mut self, pat: &swc_ast::Pat, decl: &str) -> BridgeResult<ParamSignature> {
        let (binding, has_default) = match pat {
            swc_ast::Pat::Ident(binding) => (binding, false),
            swc_ast::Pat::Assign(assign) => match assign.left.as_ref() {
                swc_ast::Pat::Ident(binding) => (binding, true),
                other => {
                    return Err(self.unsupported(
                        other.span(),
                        decl,
                        "destructuring pattern",
                        "parameters must be plain identifiers",
                    ))
                }
            },
            swc_ast::Pat::Rest(rest) => {
                return Err(self.unsupported(
                    rest.span,
                    decl,
                    "rest parameter",
                    "rest parameters cannot be bridged",
                ))
            }
            other => {
                return Err(self.unsupported(
                    other.span(),
                    decl,
                    "destructuring pattern",
                    "parameters must be plain identifiers",
                ))
            }
        };

        let name = binding.sym.to_string();
        let Some(type_ann) = binding.type_ann.as_ref() else {
            return Err(self.unsupported(
                binding.id.span,
                decl,
                "implicit any",
                format!("parameter `{}` needs a type annotation", name),
            ));
        };
        let shape = self.resolver.resolve(&type_ann.type_ann, decl)?;

        Ok(ParamSignature {
            name,
            shape,
            optional: binding.optional || has_default,
        })
    }

    fn unsupported(
        &self,
        span: Span,
        decl: &str,
        ty: impl Into<String>,
        reason: impl Into<String>,
    ) -> BridgeError {
        BridgeError::UnsupportedType {
            location: self.parsed.span_to_location(span),
            decl: decl.to_string(),
            ty: ty.into(),
            reason: reason.into(),
        }
    }
}

fn method_name(key: &swc_ast::PropName) -> Option<String> {
    match key {
        swc_ast::PropName::Ident(i) => Some(i.sym.to_string()),
        swc_ast::PropName::Str(s) => Some(str_value(s)),
        _ => None,
    }
}

fn is_this_param(pat: &swc_ast::Pat) -> bool {
    matches!(pat, swc_ast::Pat::Ident(binding) if &*binding.id.sym == "this")
}

fn is_void(ty: &swc_ast::TsType) -> bool {
    matches!(
        ty,
        swc_ast::TsType::TsKeywordType(swc_ast::TsKeywordType {
            kind: swc_ast::TsKeywordTypeKind::TsVoidKeyword,
            ..
        })
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Primitive, TypeShape};
    use crate::source::parse_typescript_source;

    fn extract(source: &str, component: Option<&str>) -> BridgeResult<ComponentContract> {
        let parsed = parse_typescript_source("/tmp/component.ts", source).unwrap();
        extract_contract(&parsed, component, &BridgeConfig::default())
    }

    #[test]
    fn extracts_the_greeter_surface() {
        let contract = extract(
            r#"
export class Greeter extends HTMLElement {
  greet(name: string): void {}
  private secret(): void {}
}
"#,
            Some("Greeter"),
        )
        .unwrap();

        assert_eq!(contract.name, "Greeter");
        assert!(contract.extends_html_element);
        assert_eq!(contract.method_names(), vec!["greet"]);
        let greet = &contract.methods[0];
        assert_eq!(greet.params[0].name, "name");
        assert_eq!(greet.params[0].shape, TypeShape::Primitive(Primitive::String));
        assert_eq!(greet.return_shape, None);
    }

    #[test]
    fn member_order_follows_the_source() {
        let contract = extract(
            r#"
class Panel extends HTMLElement {
  zeta(): void {}
  alpha(): void {}
  get value(): number { return 1; }
  set value(v: number) {}
  middle(): string { return ''; }
}
"#,
            None,
        )
        .unwrap();
        assert_eq!(
            contract.method_names(),
            vec!["zeta", "alpha", "value", "value", "middle"]
        );
        assert_eq!(contract.methods[2].kind, MethodKind::Getter);
        assert_eq!(contract.methods[3].kind, MethodKind::Setter);
        assert_eq!(
            contract.methods[4].return_shape,
            Some(TypeShape::Primitive(Primitive::String))
        );
    }

    #[test]
    fn hidden_members_are_excluded() {
        let contract = extract(
            r#"
class Widget extends HTMLElement {
  constructor() { super(); }
  label: string = '';
  static create(): void {}
  connectedCallback(): void {}
  protected layout(): void {}
  private paint(): void {}
  #render(): void {}
  public update(): void {}
}
"#,
            None,
        )
        .unwrap();
        assert_eq!(contract.method_names(), vec!["update"]);
    }

    #[test]
    fn skip_list_is_configurable() {
        let parsed = parse_typescript_source(
            "/tmp/widget.ts",
            "class Widget extends HTMLElement { connectedCallback(): void {} render(): void {} }",
        )
        .unwrap();
        let config = BridgeConfig {
            skip_methods: vec!["render".to_string()],
            ..BridgeConfig::default()
        };
        let contract = extract_contract(&parsed, None, &config).unwrap();
        assert_eq!(contract.method_names(), vec!["connectedCallback"]);
    }

    #[test]
    fn optional_and_default_params_are_optional() {
        let contract = extract(
            r#"
class Search extends HTMLElement {
  find(query: string, limit?: number, exact: boolean = false): void {}
}
"#,
            None,
        )
        .unwrap();
        let optional: Vec<bool> = contract.methods[0].params.iter().map(|p| p.optional).collect();
        assert_eq!(optional, vec![false, true, true]);
    }

    #[test]
    fn overload_signatures_are_bridged_once() {
        let contract = extract(
            r#"
class Search extends HTMLElement {
  find(query: string): void;
  find(query: string): void {}
}
"#,
            None,
        )
        .unwrap();
        assert_eq!(contract.method_names(), vec!["find"]);
    }

    #[test]
    fn this_parameter_is_not_positional() {
        let contract = extract(
            r#"
interface Ctx { a: string }
class Greeter extends HTMLElement {
  greet(this: Ctx, name: string): void {}
  wave(this: Greeter): void {}
}
"#,
            None,
        )
        .unwrap();
        let params: Vec<&str> = contract.methods[0]
            .params
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(params, vec!["name"]);
        assert!(contract.methods[1].params.is_empty());
        assert!(contract.records.is_empty());
    }

    #[test]
    fn records_follow_first_use() {
        let contract = extract(
            r#"
interface Dog { name: string; isGoodDog: boolean; }
interface Owner { name: string; }
class Kennel extends HTMLElement {
  adopt(owner: Owner): void {}
  admit(dog: Dog): Dog { return dog; }
  release(dog: Dog): void {}
}
"#,
            None,
        )
        .unwrap();
        let names: Vec<&str> = contract.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Owner", "Dog"]);
    }

    #[test]
    fn tag_name_comes_from_define() {
        let contract = extract(
            r#"
export class Breadcrumbs extends HTMLElement {}
customElements.define('devtools-breadcrumbs', Breadcrumbs);
"#,
            None,
        )
        .unwrap();
        assert_eq!(contract.tag_name.as_deref(), Some("devtools-breadcrumbs"));
        assert!(contract.methods.is_empty());
    }

    #[test]
    fn named_component_need_not_extend_html_element() {
        let contract = extract("export class Plain { run(): void {} }", Some("Plain")).unwrap();
        assert!(!contract.extends_html_element);
        assert_eq!(contract.method_names(), vec!["run"]);
    }

    #[test]
    fn missing_component_is_reported() {
        let err = extract("interface Greeter {}", Some("Greeter")).unwrap_err();
        match err {
            BridgeError::ComponentNotFound { name, reason, .. } => {
                assert_eq!(name, "Greeter");
                assert!(reason.contains("interface"));
            }
            other => panic!("expected ComponentNotFound, got {:?}", other),
        }

        let err = extract("class Helper {}", None).unwrap_err();
        assert!(matches!(err, BridgeError::ComponentNotFound { .. }));

        let err = extract("class Helper {}", Some("Greeter")).unwrap_err();
        assert!(matches!(err, BridgeError::ComponentNotFound { .. }));
    }

    #[test]
    fn union_params_are_unsupported() {
        let err = extract(
            r#"
class Greeter extends HTMLElement {
  greet(name: string | null): void {}
}
"#,
            None,
        )
        .unwrap_err();
        match err {
            BridgeError::UnsupportedType { decl, ty, location, .. } => {
                assert_eq!(decl, "Greeter.greet");
                assert_eq!(ty, "string | null");
                assert_eq!(location.line, 3);
            }
            other => panic!("expected UnsupportedType, got {:?}", other),
        }
    }

    #[test]
    fn unsupported_parameter_forms() {
        for method in [
            "greet(...names: string[]): void {}",
            "greet({name}: {name: string}): void {}",
            "greet(name): void {}",
            "greet<T>(name: string): void {}",
            "get name() { return ''; }",
        ] {
            let source = format!("class Greeter extends HTMLElement {{ {} }}", method);
            let err = extract(&source, None).unwrap_err();
            assert!(
                matches!(err, BridgeError::UnsupportedType { .. }),
                "{} should be unsupported, got {:?}",
                method,
                err
            );
        }
    }

    #[test]
    fn errors_in_private_members_are_ignored() {
        let contract = extract(
            r#"
class Greeter extends HTMLElement {
  private lookup(key: string | number): Map<string, string> { return new Map(); }
  greet(name: string): void {}
}
"#,
            None,
        )
        .unwrap();
        assert_eq!(contract.method_names(), vec!["greet"]);
    }
}
