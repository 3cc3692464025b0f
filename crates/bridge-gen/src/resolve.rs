//! Type shape resolution
//!
//! Turns the TypeScript types found on a component's public surface into
//! [`TypeShape`]s, collecting every named record and enum they reach.
//! Records are memoised by name: resolving a name twice hands back the
//! same `Arc`, and the first-encountered order is kept for emission.

use crate::contract::{
    EnumKind, EnumMember, EnumShape, FieldShape, Primitive, RecordShape, TypeShape,
};
use crate::diagnostics::{BridgeError, BridgeResult};
use crate::index::DeclarationIndex;
use crate::source::{str_value, ParsedModule};
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::{Span, Spanned};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// Global types that exist at runtime but have no bridgeable shape
const UNSUPPORTED_GLOBALS: &[&str] = &[
    "Date",
    "Map",
    "Set",
    "WeakMap",
    "WeakSet",
    "Promise",
    "Function",
    "Symbol",
    "RegExp",
    "Error",
    "Node",
    "Element",
    "HTMLElement",
    "Event",
    "Document",
    "Window",
];

/// Collected records and enums, in first-encountered order
#[derive(Debug, Default)]
pub struct ResolvedTypes {
    pub records: Vec<Arc<RecordShape>>,
    pub enums: Vec<Arc<EnumShape>>,
}

pub struct TypeResolver<'a> {
    parsed: &'a ParsedModule,
    index: &'a DeclarationIndex<'a>,
    allow_external: bool,
    /// `None` marks a record whose fields are still being resolved
    records: IndexMap<String, Option<Arc<RecordShape>>>,
    enums: IndexMap<String, Arc<EnumShape>>,
    /// Names currently on the resolution path
    resolving: Vec<String>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(parsed: &'a ParsedModule, index: &'a DeclarationIndex<'a>) -> Self {
        Self {
            parsed,
            index,
            allow_external: true,
            records: IndexMap::new(),
            enums: IndexMap::new(),
            resolving: Vec::new(),
        }
    }

    /// Accept or reject imported types as pass-through references
    pub fn allow_external(mut self, allow: bool) -> Self {
        self.allow_external = allow;
        self
    }

    /// A record resolved so far
    pub fn record(&self, name: &str) -> Option<Arc<RecordShape>> {
        self.records.get(name).cloned().flatten()
    }

    pub fn finish(self) -> ResolvedTypes {
        ResolvedTypes {
            records: self.records.into_values().flatten().collect(),
            enums: self.enums.into_values().collect(),
        }
    }

    /// Resolve a type found while processing `decl`
    pub fn resolve(&mut self, ty: &swc_ast::TsType, decl: &str) -> BridgeResult<TypeShape> {
        match ty {
            swc_ast::TsType::TsKeywordType(kw) => match kw.kind {
                swc_ast::TsKeywordTypeKind::TsStringKeyword => {
                    Ok(TypeShape::Primitive(Primitive::String))
                }
                swc_ast::TsKeywordTypeKind::TsNumberKeyword => {
                    Ok(TypeShape::Primitive(Primitive::Number))
                }
                swc_ast::TsKeywordTypeKind::TsBooleanKeyword => {
                    Ok(TypeShape::Primitive(Primitive::Boolean))
                }
                _ => Err(self.unsupported(
                    ty.span(),
                    decl,
                    type_label(ty),
                    "only string, number and boolean keyword types can be bridged",
                )),
            },
            swc_ast::TsType::TsArrayType(arr) => {
                Ok(TypeShape::array_of(self.resolve(&arr.elem_type, decl)?))
            }
            swc_ast::TsType::TsParenthesizedType(paren) => self.resolve(&paren.type_ann, decl),
            swc_ast::TsType::TsTypeOperator(op)
                if matches!(op.op, swc_ast::TsTypeOperatorOp::ReadOnly) =>
            {
                self.resolve(&op.type_ann, decl)
            }
            swc_ast::TsType::TsTypeRef(type_ref) => self.resolve_type_ref(ty, type_ref, decl),
            swc_ast::TsType::TsTypeLit(lit) => {
                let mut fields = IndexMap::new();
                self.collect_members(&lit.members, decl, &mut fields)?;
                Ok(TypeShape::InlineRecord(fields))
            }
            swc_ast::TsType::TsUnionOrIntersectionType(
                swc_ast::TsUnionOrIntersectionType::TsUnionType(_),
            ) => Err(self.unsupported(
                ty.span(),
                decl,
                type_label(ty),
                "union types cannot be bridged",
            )),
            swc_ast::TsType::TsUnionOrIntersectionType(
                swc_ast::TsUnionOrIntersectionType::TsIntersectionType(_),
            ) => Err(self.unsupported(
                ty.span(),
                decl,
                type_label(ty),
                "intersections are only bridged as the target of a type alias",
            )),
            swc_ast::TsType::TsLitType(_) => Err(self.unsupported(
                ty.span(),
                decl,
                type_label(ty),
                "literal types cannot be bridged",
            )),
            swc_ast::TsType::TsFnOrConstructorType(_) => Err(self.unsupported(
                ty.span(),
                decl,
                type_label(ty),
                "function types cannot be bridged",
            )),
            _ => Err(self.unsupported(
                ty.span(),
                decl,
                type_label(ty),
                "type cannot be expressed as a primitive, array or record",
            )),
        }
    }

    fn resolve_type_ref(
        &mut self,
        ty: &swc_ast::TsType,
        type_ref: &swc_ast::TsTypeRef,
        decl: &str,
    ) -> BridgeResult<TypeShape> {
        let name = match &type_ref.type_name {
            swc_ast::TsEntityName::Ident(i) => i.sym.to_string(),
            swc_ast::TsEntityName::TsQualifiedName(_) => {
                return Err(self.unsupported(
                    ty.span(),
                    decl,
                    type_label(ty),
                    "qualified type names cannot be bridged",
                ))
            }
        };
        let args: Vec<&swc_ast::TsType> = type_ref
            .type_params
            .as_ref()
            .map(|p| p.params.iter().map(|t| t.as_ref()).collect())
            .unwrap_or_default();

        match (name.as_str(), args.as_slice()) {
            ("Array" | "ReadonlyArray", [elem]) => {
                Ok(TypeShape::array_of(self.resolve(elem, decl)?))
            }
            ("Readonly", [inner]) => self.resolve(inner, decl),
            ("Object", []) => Ok(TypeShape::Primitive(Primitive::Object)),
            (_, [_, ..]) => Err(self.unsupported(
                ty.span(),
                decl,
                type_label(ty),
                "generic types cannot be bridged",
            )),
            _ => self.resolve_named(&name, ty.span(), decl),
        }
    }

    /// Resolve a bare type name to a record or enum reference
    pub fn resolve_named(&mut self, name: &str, span: Span, decl: &str) -> BridgeResult<TypeShape> {
        if self.resolving.iter().any(|n| n == name) {
            return Err(self.cycle(span, decl, name));
        }
        match self.records.get(name) {
            Some(Some(_)) => return Ok(TypeShape::RecordRef(name.to_string())),
            Some(None) => return Err(self.cycle(span, decl, name)),
            None => {}
        }
        if self.enums.contains_key(name) {
            return Ok(TypeShape::EnumRef(name.to_string()));
        }

        let index = self.index;
        if let Some(iface) = index.interfaces.get(name) {
            self.resolve_interface(name, iface)?;
            return Ok(TypeShape::RecordRef(name.to_string()));
        }
        if let Some(alias) = index.aliases.get(name) {
            return self.resolve_alias(name, alias);
        }
        if let Some(ts_enum) = index.enums.get(name) {
            self.resolve_enum(name, ts_enum)?;
            return Ok(TypeShape::EnumRef(name.to_string()));
        }
        if let Some(import) = index.imports.get(name) {
            if self.allow_external {
                debug!(record = name, module = %import.module, "passing through external type");
                self.records.insert(
                    name.to_string(),
                    Some(Arc::new(RecordShape::external(name, import.module.clone()))),
                );
                return Ok(TypeShape::RecordRef(name.to_string()));
            }
        }
        if UNSUPPORTED_GLOBALS.contains(&name) {
            return Err(self.unsupported(
                span,
                decl,
                name,
                "built-in types other than string, number, boolean and Object cannot be bridged",
            ));
        }

        Err(BridgeError::UnresolvedReference {
            location: self.parsed.span_to_location(span),
            decl: decl.to_string(),
            name: name.to_string(),
        })
    }

    fn resolve_interface(
        &mut self,
        name: &str,
        iface: &swc_ast::TsInterfaceDecl,
    ) -> BridgeResult<()> {
        if iface.type_params.is_some() {
            return Err(self.unsupported(
                iface.span,
                name,
                name,
                "generic interfaces cannot be bridged",
            ));
        }

        self.records.insert(name.to_string(), None);
        self.resolving.push(name.to_string());
        let mut fields = IndexMap::new();
        let result = self.collect_interface_fields(name, iface, &mut fields);
        self.resolving.pop();
        result?;

        debug!(record = name, fields = fields.len(), "resolved interface");
        self.records.insert(
            name.to_string(),
            Some(Arc::new(RecordShape::local(name, fields))),
        );
        Ok(())
    }

    /// Fields of an interface with its `extends` chain flattened, bases first
    fn collect_interface_fields(
        &mut self,
        owner: &str,
        iface: &swc_ast::TsInterfaceDecl,
        fields: &mut IndexMap<String, FieldShape>,
    ) -> BridgeResult<()> {
        for base in &iface.extends {
            let base_name = match base.expr.as_ref() {
                swc_ast::Expr::Ident(i) if base.type_args.is_none() => i.sym.to_string(),
                _ => {
                    return Err(self.unsupported(
                        base.span,
                        owner,
                        "extends clause",
                        "interfaces may only extend plain local interfaces",
                    ))
                }
            };
            if self.resolving.contains(&base_name) {
                return Err(self.cycle(base.span, owner, &base_name));
            }
            let index = self.index;
            let Some(base_iface) = index.interfaces.get(&base_name) else {
                return Err(self.not_inlinable(base.span, owner, &base_name));
            };
            self.resolving.push(base_name);
            let result = self.collect_interface_fields(owner, base_iface, fields);
            self.resolving.pop();
            result?;
        }
        self.collect_members(&iface.body.body, owner, fields)
    }

    fn resolve_alias(
        &mut self,
        name: &str,
        alias: &swc_ast::TsTypeAliasDecl,
    ) -> BridgeResult<TypeShape> {
        if alias.type_params.is_some() {
            return Err(self.unsupported(
                alias.span,
                name,
                name,
                "generic type aliases cannot be bridged",
            ));
        }

        let target = strip_parens(&alias.type_ann);
        let is_record = matches!(
            target,
            swc_ast::TsType::TsTypeLit(_)
                | swc_ast::TsType::TsUnionOrIntersectionType(
                    swc_ast::TsUnionOrIntersectionType::TsIntersectionType(_)
                )
        );

        if !is_record {
            // Transparent alias, e.g. `type Names = string[]`
            self.resolving.push(name.to_string());
            let result = self.resolve(target, name);
            self.resolving.pop();
            return result;
        }

        self.records.insert(name.to_string(), None);
        self.resolving.push(name.to_string());
        let mut fields = IndexMap::new();
        let result = self.flatten_object_type(target, name, &mut fields);
        self.resolving.pop();
        result?;

        debug!(record = name, fields = fields.len(), "resolved type alias");
        self.records.insert(
            name.to_string(),
            Some(Arc::new(RecordShape::local(name, fields))),
        );
        Ok(TypeShape::RecordRef(name.to_string()))
    }

    /// Merge the fields of an object literal, intersection or record reference
    fn flatten_object_type(
        &mut self,
        ty: &swc_ast::TsType,
        owner: &str,
        fields: &mut IndexMap<String, FieldShape>,
    ) -> BridgeResult<()> {
        match strip_parens(ty) {
            swc_ast::TsType::TsTypeLit(lit) => self.collect_members(&lit.members, owner, fields),
            swc_ast::TsType::TsUnionOrIntersectionType(
                swc_ast::TsUnionOrIntersectionType::TsIntersectionType(inter),
            ) => {
                for part in &inter.types {
                    self.flatten_object_type(part, owner, fields)?;
                }
                Ok(())
            }
            swc_ast::TsType::TsTypeRef(type_ref) if type_ref.type_params.is_none() => {
                let swc_ast::TsEntityName::Ident(ident) = &type_ref.type_name else {
                    return Err(self.unsupported(
                        type_ref.span,
                        owner,
                        type_label(ty),
                        "qualified type names cannot be bridged",
                    ));
                };
                let part_name = ident.sym.to_string();
                if self.resolving.contains(&part_name) {
                    return Err(self.cycle(type_ref.span, owner, &part_name));
                }

                let index = self.index;
                self.resolving.push(part_name.clone());
                let result = if let Some(iface) = index.interfaces.get(&part_name) {
                    self.collect_interface_fields(owner, iface, fields)
                } else if let Some(alias) = index.aliases.get(&part_name) {
                    self.flatten_object_type(&alias.type_ann, owner, fields)
                } else {
                    Err(self.not_inlinable(type_ref.span, owner, &part_name))
                };
                self.resolving.pop();
                result
            }
            other => Err(self.unsupported(
                other.span(),
                owner,
                type_label(other),
                "only object types can be merged into a record",
            )),
        }
    }

    fn collect_members(
        &mut self,
        members: &[swc_ast::TsTypeElement],
        owner: &str,
        fields: &mut IndexMap<String, FieldShape>,
    ) -> BridgeResult<()> {
        for member in members {
            let swc_ast::TsTypeElement::TsPropertySignature(prop) = member else {
                return Err(self.unsupported(
                    member.span(),
                    owner,
                    "member signature",
                    "records may only contain property signatures",
                ));
            };
            let field_name = match prop.key.as_ref() {
                swc_ast::Expr::Ident(i) if !prop.computed => i.sym.to_string(),
                swc_ast::Expr::Lit(swc_ast::Lit::Str(s)) if !prop.computed => str_value(s),
                _ => {
                    return Err(self.unsupported(
                        prop.span,
                        owner,
                        "computed key",
                        "record keys must be plain names",
                    ))
                }
            };
            let decl = format!("{}.{}", owner, field_name);
            let Some(type_ann) = prop.type_ann.as_ref() else {
                return Err(self.unsupported(
                    prop.span,
                    &decl,
                    "implicit any",
                    "record fields need an explicit type",
                ));
            };
            let shape = self.resolve(&type_ann.type_ann, &decl)?;
            fields.insert(
                field_name,
                FieldShape {
                    shape,
                    optional: prop.optional,
                },
            );
        }
        Ok(())
    }

    fn resolve_enum(&mut self, name: &str, ts_enum: &swc_ast::TsEnumDecl) -> BridgeResult<()> {
        if !ts_enum.is_const {
            return Err(self.unsupported(
                ts_enum.span,
                name,
                name,
                "only const enums can be bridged",
            ));
        }

        let mut kind = None;
        let mut members = Vec::with_capacity(ts_enum.members.len());
        for member in &ts_enum.members {
            let member_name = match &member.id {
                swc_ast::TsEnumMemberId::Ident(i) => i.sym.to_string(),
                swc_ast::TsEnumMemberId::Str(s) => str_value(s),
            };
            let decl = format!("{}.{}", name, member_name);
            let (member_kind, value) = match member.init.as_deref() {
                Some(swc_ast::Expr::Lit(swc_ast::Lit::Str(s))) => {
                    (EnumKind::String, crate::emit::js_string_literal(&str_value(s)))
                }
                Some(swc_ast::Expr::Lit(swc_ast::Lit::Num(n))) => {
                    (EnumKind::Number, n.value.to_string())
                }
                Some(swc_ast::Expr::Unary(unary))
                    if matches!(unary.op, swc_ast::UnaryOp::Minus) =>
                {
                    match unary.arg.as_ref() {
                        swc_ast::Expr::Lit(swc_ast::Lit::Num(n)) => {
                            (EnumKind::Number, (-n.value).to_string())
                        }
                        _ => {
                            return Err(self.unsupported(
                                member.span,
                                &decl,
                                "computed value",
                                "enum members must be string or number literals",
                            ))
                        }
                    }
                }
                Some(_) => {
                    return Err(self.unsupported(
                        member.span,
                        &decl,
                        "computed value",
                        "enum members must be string or number literals",
                    ))
                }
                None => {
                    return Err(self.unsupported(
                        member.span,
                        &decl,
                        "implicit value",
                        "enum members must have explicit values",
                    ))
                }
            };
            if kind.is_some_and(|k| k != member_kind) {
                return Err(self.unsupported(
                    member.span,
                    &decl,
                    "mixed enum",
                    "enums must not mix string and number members",
                ));
            }
            kind = Some(member_kind);
            members.push(EnumMember {
                name: member_name,
                value,
            });
        }

        debug!(r#enum = name, members = members.len(), "resolved enum");
        self.enums.insert(
            name.to_string(),
            Arc::new(EnumShape {
                name: name.to_string(),
                kind: kind.unwrap_or(EnumKind::Number),
                members,
            }),
        );
        Ok(())
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

    fn cycle(&self, span: Span, decl: &str, name: &str) -> BridgeError {
        self.unsupported(
            span,
            decl,
            name,
            "self-referential types cannot be expressed in a bridge",
        )
    }

    /// Error for a base type that must be inlined but has no local interface
    fn not_inlinable(&self, span: Span, owner: &str, name: &str) -> BridgeError {
        if self.index.declares_type(name) || self.index.imports.contains_key(name) {
            self.unsupported(
                span,
                owner,
                name,
                "only local interfaces and object types can be inlined",
            )
        } else {
            BridgeError::UnresolvedReference {
                location: self.parsed.span_to_location(span),
                decl: owner.to_string(),
                name: name.to_string(),
            }
        }
    }
}

fn strip_parens(ty: &swc_ast::TsType) -> &swc_ast::TsType {
    match ty {
        swc_ast::TsType::TsParenthesizedType(paren) => strip_parens(&paren.type_ann),
        other => other,
    }
}

/// Short human-readable rendering of a type for diagnostics
pub fn type_label(ty: &swc_ast::TsType) -> String {
    match ty {
        swc_ast::TsType::TsKeywordType(kw) => match kw.kind {
            swc_ast::TsKeywordTypeKind::TsStringKeyword => "string",
            swc_ast::TsKeywordTypeKind::TsNumberKeyword => "number",
            swc_ast::TsKeywordTypeKind::TsBooleanKeyword => "boolean",
            swc_ast::TsKeywordTypeKind::TsVoidKeyword => "void",
            swc_ast::TsKeywordTypeKind::TsNullKeyword => "null",
            swc_ast::TsKeywordTypeKind::TsUndefinedKeyword => "undefined",
            swc_ast::TsKeywordTypeKind::TsNeverKeyword => "never",
            swc_ast::TsKeywordTypeKind::TsUnknownKeyword => "unknown",
            swc_ast::TsKeywordTypeKind::TsAnyKeyword => "any",
            swc_ast::TsKeywordTypeKind::TsObjectKeyword => "object",
            swc_ast::TsKeywordTypeKind::TsSymbolKeyword => "symbol",
            swc_ast::TsKeywordTypeKind::TsBigIntKeyword => "bigint",
            swc_ast::TsKeywordTypeKind::TsIntrinsicKeyword => "intrinsic",
        }
        .to_string(),
        swc_ast::TsType::TsTypeRef(type_ref) => {
            let name = entity_name(&type_ref.type_name);
            match &type_ref.type_params {
                Some(params) => {
                    let args: Vec<String> = params.params.iter().map(|t| type_label(t)).collect();
                    format!("{}<{}>", name, args.join(", "))
                }
                None => name,
            }
        }
        swc_ast::TsType::TsArrayType(arr) => format!("{}[]", type_label(&arr.elem_type)),
        swc_ast::TsType::TsParenthesizedType(paren) => format!("({})", type_label(&paren.type_ann)),
        swc_ast::TsType::TsUnionOrIntersectionType(
            swc_ast::TsUnionOrIntersectionType::TsUnionType(u),
        ) => u
            .types
            .iter()
            .map(|t| type_label(t))
            .collect::<Vec<_>>()
            .join(" | "),
        swc_ast::TsType::TsUnionOrIntersectionType(
            swc_ast::TsUnionOrIntersectionType::TsIntersectionType(i),
        ) => i
            .types
            .iter()
            .map(|t| type_label(t))
            .collect::<Vec<_>>()
            .join(" & "),
        swc_ast::TsType::TsLitType(lit) => match &lit.lit {
            swc_ast::TsLit::Str(s) => format!("'{}'", str_value(s)),
            swc_ast::TsLit::Number(n) => n.value.to_string(),
            swc_ast::TsLit::Bool(b) => b.value.to_string(),
            _ => "literal".to_string(),
        },
        swc_ast::TsType::TsTypeLit(_) => "{...}".to_string(),
        swc_ast::TsType::TsFnOrConstructorType(_) => "function".to_string(),
        swc_ast::TsType::TsTupleType(_) => "tuple".to_string(),
        _ => "type expression".to_string(),
    }
}

fn entity_name(name: &swc_ast::TsEntityName) -> String {
    match name {
        swc_ast::TsEntityName::Ident(i) => i.sym.to_string(),
        swc_ast::TsEntityName::TsQualifiedName(q) => {
            format!("{}.{}", entity_name(&q.left), q.right.sym)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::parse_typescript_source;

    /// Resolve the type of the first parameter of `sample(x: ...)`
    fn resolve_param(source: &str) -> (BridgeResult<TypeShape>, ResolvedTypes) {
        let parsed = parse_typescript_source("/tmp/resolve.ts", source).unwrap();
        let index = DeclarationIndex::build(&parsed);
        let mut resolver = TypeResolver::new(&parsed, &index);
        let result = sample_type(&parsed)
            .map(|ty| resolver.resolve(ty, "sample"))
            .expect("sample function");
        (result, resolver.finish())
    }

    fn sample_type(parsed: &ParsedModule) -> Option<&swc_ast::TsType> {
        parsed.module().body.iter().find_map(|item| match item {
            swc_ast::ModuleItem::Stmt(swc_ast::Stmt::Decl(swc_ast::Decl::Fn(f)))
                if &*f.ident.sym == "sample" =>
            {
                match &f.function.params.first()?.pat {
                    swc_ast::Pat::Ident(i) => i.type_ann.as_ref().map(|t| t.type_ann.as_ref()),
                    _ => None,
                }
            }
            _ => None,
        })
    }

    fn record_names(types: &ResolvedTypes) -> Vec<&str> {
        types.records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn primitives_and_nested_arrays() {
        let (shape, _) = resolve_param("function sample(x: string[][]) {}");
        assert_eq!(
            shape.unwrap(),
            TypeShape::array_of(TypeShape::array_of(TypeShape::Primitive(Primitive::String)))
        );

        let (shape, _) = resolve_param("function sample(x: ReadonlyArray<Array<boolean>>) {}");
        assert_eq!(
            shape.unwrap(),
            TypeShape::array_of(TypeShape::array_of(TypeShape::Primitive(Primitive::Boolean)))
        );

        let (shape, _) = resolve_param("function sample(x: readonly number[]) {}");
        assert_eq!(
            shape.unwrap(),
            TypeShape::array_of(TypeShape::Primitive(Primitive::Number))
        );
    }

    #[test]
    fn object_type_is_opaque() {
        let (shape, types) = resolve_param("function sample(x: Object[]) {}");
        assert_eq!(
            shape.unwrap(),
            TypeShape::array_of(TypeShape::Primitive(Primitive::Object))
        );
        assert!(types.records.is_empty());
    }

    #[test]
    fn records_are_collected_in_first_encountered_order() {
        let (shape, types) = resolve_param(
            r#"
type Person = { name: Name; age: number; };
interface Name { firstLetter: string; rest: string[]; }
function sample(x: Person) {}
"#,
        );
        assert_eq!(shape.unwrap(), TypeShape::RecordRef("Person".to_string()));
        assert_eq!(record_names(&types), vec!["Person", "Name"]);

        let person = &types.records[0];
        let keys: Vec<&str> = person.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "age"]);
        assert_eq!(
            person.fields["name"].shape,
            TypeShape::RecordRef("Name".to_string())
        );
    }

    #[test]
    fn repeated_resolution_returns_the_same_record() {
        let source = r#"
interface Dog { name: string; isGoodDog: boolean; }
function sample(x: Dog) {}
"#;
        let parsed = parse_typescript_source("/tmp/dog.ts", source).unwrap();
        let index = DeclarationIndex::build(&parsed);
        let mut resolver = TypeResolver::new(&parsed, &index);
        let ty = sample_type(&parsed).unwrap();

        resolver.resolve(ty, "sample").unwrap();
        let first = resolver.record("Dog").unwrap();
        resolver.resolve(ty, "sample").unwrap();
        let second = resolver.record("Dog").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.finish().records.len(), 1);
    }

    #[test]
    fn interface_extends_are_flattened_bases_first() {
        let (_, types) = resolve_param(
            r#"
interface NamedThing { name: Name; }
interface Name { first: string; last: string; }
interface AgedThing extends NamedThing { age: number }
interface Person extends AgedThing { favouriteColour: string; }
function sample(x: Person) {}
"#,
        );
        assert_eq!(record_names(&types), vec!["Person", "Name"]);
        let keys: Vec<&str> = types.records[0].fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "age", "favouriteColour"]);
    }

    #[test]
    fn intersections_become_one_record() {
        let (_, types) = resolve_param(
            r#"
type NamedThing = { name: string; details: Detail[]; };
interface Detail { id: number; }
type Person = NamedThing & { otherField: string };
function sample(x: Person) {}
"#,
        );
        assert_eq!(record_names(&types), vec!["Person", "Detail"]);
        let keys: Vec<&str> = types.records[0].fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "details", "otherField"]);
    }

    #[test]
    fn transparent_aliases_resolve_to_their_target() {
        let (shape, types) = resolve_param(
            r#"
type Names = string[];
function sample(x: Names) {}
"#,
        );
        assert_eq!(
            shape.unwrap(),
            TypeShape::array_of(TypeShape::Primitive(Primitive::String))
        );
        assert!(types.records.is_empty());
    }

    #[test]
    fn optional_fields_are_marked() {
        let (_, types) = resolve_param(
            r#"
interface Person { pet?: Pet }
interface Pet {}
function sample(x: Person) {}
"#,
        );
        assert!(types.records[0].fields["pet"].optional);
        assert!(types.records[1].fields.is_empty());
    }

    #[test]
    fn const_enums_are_collected() {
        let (shape, types) = resolve_param(
            r#"
export const enum SettingType { Boolean = 'boolean', Choice = 'enum' }
function sample(x: SettingType) {}
"#,
        );
        assert_eq!(shape.unwrap(), TypeShape::EnumRef("SettingType".to_string()));
        let setting = &types.enums[0];
        assert_eq!(setting.kind, EnumKind::String);
        assert_eq!(setting.members[0].value, "'boolean'");
    }

    #[test]
    fn non_const_enums_are_rejected() {
        let (shape, _) = resolve_param(
            r#"
enum Mode { A = 0 }
function sample(x: Mode) {}
"#,
        );
        assert!(matches!(shape, Err(BridgeError::UnsupportedType { .. })));
    }

    #[test]
    fn enums_without_explicit_values_are_rejected() {
        let (shape, _) = resolve_param(
            r#"
const enum Mode { A, B }
function sample(x: Mode) {}
"#,
        );
        let err = shape.unwrap_err();
        assert!(err.to_string().contains("explicit values"));
    }

    #[test]
    fn negative_enum_values_are_numbers() {
        let (shape, types) = resolve_param(
            r#"
const enum Level { Low = -1, Mid = 0, High = 2.5 }
function sample(x: Level) {}
"#,
        );
        assert_eq!(shape.unwrap(), TypeShape::EnumRef("Level".to_string()));
        let level = &types.enums[0];
        assert_eq!(level.kind, EnumKind::Number);
        let values: Vec<&str> = level.members.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(values, vec!["-1", "0", "2.5"]);
    }

    #[test]
    fn negated_expressions_are_still_computed() {
        let (shape, _) = resolve_param(
            r#"
const enum Level { Low = -other }
function sample(x: Level) {}
"#,
        );
        assert!(shape.unwrap_err().to_string().contains("computed value"));
    }

    #[test]
    fn imported_types_pass_through() {
        let (shape, types) = resolve_param(
            r#"
import {Crumb} from './crumb.js';
function sample(x: Crumb[]) {}
"#,
        );
        assert_eq!(
            shape.unwrap(),
            TypeShape::array_of(TypeShape::RecordRef("Crumb".to_string()))
        );
        assert!(types.records[0].is_external());
    }

    #[test]
    fn imported_types_are_unresolved_when_pass_through_is_disabled() {
        let source = r#"
import {Crumb} from './crumb.js';
function sample(x: Crumb) {}
"#;
        let parsed = parse_typescript_source("/tmp/crumb.ts", source).unwrap();
        let index = DeclarationIndex::build(&parsed);
        let mut resolver = TypeResolver::new(&parsed, &index).allow_external(false);
        let err = resolver
            .resolve(sample_type(&parsed).unwrap(), "sample")
            .unwrap_err();
        assert!(matches!(err, BridgeError::UnresolvedReference { ref name, .. } if name == "Crumb"));
    }

    #[test]
    fn unknown_names_are_unresolved() {
        let (shape, _) = resolve_param("function sample(x: Missing) {}");
        assert!(
            matches!(shape, Err(BridgeError::UnresolvedReference { ref name, .. }) if name == "Missing")
        );
    }

    #[test]
    fn unions_generics_and_globals_are_unsupported() {
        for ty in [
            "string | null",
            "Map<string, number>",
            "Date",
            "any",
            "'a'",
            "() => void",
            "[string, number]",
        ] {
            let (shape, _) = resolve_param(&format!("function sample(x: {}) {{}}", ty));
            assert!(
                matches!(shape, Err(BridgeError::UnsupportedType { .. })),
                "{} should be unsupported",
                ty
            );
        }
    }

    #[test]
    fn union_aliases_are_unsupported() {
        let (shape, _) = resolve_param(
            r#"
type Name = 'a' | 'b';
interface Settings { name: Name }
function sample(x: Settings) {}
"#,
        );
        match shape {
            Err(BridgeError::UnsupportedType { decl, .. }) => assert_eq!(decl, "Name"),
            other => panic!("expected UnsupportedType, got {:?}", other),
        }
    }

    #[test]
    fn cyclic_records_are_rejected() {
        let (shape, _) = resolve_param(
            r#"
interface TreeNode { children: TreeNode[] }
function sample(x: TreeNode) {}
"#,
        );
        assert!(matches!(shape, Err(BridgeError::UnsupportedType { .. })));

        let (shape, _) = resolve_param(
            r#"
interface A { b: B }
interface B { a: A }
function sample(x: A) {}
"#,
        );
        assert!(matches!(shape, Err(BridgeError::UnsupportedType { .. })));
    }

    #[test]
    fn cyclic_extends_are_rejected() {
        let (shape, _) = resolve_param(
            r#"
interface A extends B { x: string }
interface B extends A { y: string }
function sample(x: A) {}
"#,
        );
        assert!(matches!(shape, Err(BridgeError::UnsupportedType { .. })));
    }

    #[test]
    fn method_signatures_in_records_are_unsupported() {
        let (shape, _) = resolve_param(
            r#"
interface Person { getName(): string }
function sample(x: Person) {}
"#,
        );
        assert!(matches!(shape, Err(BridgeError::UnsupportedType { .. })));
    }

    #[test]
    fn type_labels_render_source_like_text() {
        let parsed =
            parse_typescript_source("/tmp/label.ts", "function sample(x: Array<Foo | null>) {}")
                .unwrap();
        assert_eq!(type_label(sample_type(&parsed).unwrap()), "Array<Foo | null>");
    }
}
