//! Schema Lowering
//!
//! Turns a set of JSON Schema documents into a [`TypeSet`].
//!
//! Every document root and every entry under `definitions`/`$defs` gets a
//! reserved type name before anything is lowered, so `$ref`s resolve no
//! matter which document or definition comes first. Inline object, enum and
//! union schemas get names derived from where they appear.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{CompileError, Result};
use crate::model::{
    EnumVariant, Field, Flattened, TypeDef, TypeDefKind, TypeExpr, TypeSet, UnionVariant,
};
use crate::names::{to_pascal_case, to_snake_case, NameAllocator};
use crate::schema::SchemaDocument;

/// Keywords that give a `oneOf`/`anyOf` branch a type of its own.
/// Branches without any of them only add constraints (e.g. `{"required": [..]}`).
const TYPE_KEYWORDS: &[&str] = &[
    "type", "properties", "$ref", "enum", "const", "items", "oneOf", "anyOf", "allOf",
    "additionalProperties",
];

/// Lower a set of documents into types, in discovery order
pub fn lower(docs: &[SchemaDocument]) -> Result<TypeSet> {
    let mut lowerer = Lowerer::new(docs)?;

    for (i, doc) in docs.iter().enumerate() {
        let root = lowerer.root_name(i);
        lowerer.define(&root, &doc.value, &format!("{}#", doc.file_name), i)?;

        for (section, name, schema) in doc.definitions() {
            let origin = format!("{}#/{}/{}", doc.file_name, section, name);
            lowerer.define(&to_pascal_case(name), schema, &origin, i)?;
        }
    }

    lowerer.strip_tags();
    debug!(types = lowerer.types.len(), documents = docs.len(), "lowered schemas");
    Ok(lowerer.types)
}

// =============================================================================
// Shapes
// =============================================================================

/// Structural pattern of a schema, as far as type generation cares
enum Shape<'v> {
    Ref(&'v str),
    StringEnum(Vec<String>),
    /// `allOf` with a single member and nothing else
    Wrapped(&'v Value),
    AllOf(&'v [Value]),
    Object(&'v Map<String, Value>),
    Union(&'v [Value]),
    Other,
}

fn shape(schema: &Value) -> Shape<'_> {
    if let Some(target) = schema.get("$ref").and_then(Value::as_str) {
        return Shape::Ref(target);
    }
    if let Some(values) = string_enum_values(schema) {
        return Shape::StringEnum(values);
    }

    let properties = schema.get("properties").and_then(Value::as_object);

    if let Some(all_of) = schema.get("allOf").and_then(Value::as_array) {
        if all_of.len() == 1 && properties.is_none() {
            return Shape::Wrapped(&all_of[0]);
        }
        if !all_of.is_empty() {
            return Shape::AllOf(all_of);
        }
    }

    if let Some(props) = properties {
        return Shape::Object(props);
    }

    for keyword in ["oneOf", "anyOf"] {
        if let Some(branches) = schema.get(keyword).and_then(Value::as_array) {
            if !branches.is_empty() && !branches.iter().all(is_constraint_only) {
                return Shape::Union(branches);
            }
        }
    }

    Shape::Other
}

/// String values of an `enum` (nulls allowed, anything else disqualifies)
fn string_enum_values(schema: &Value) -> Option<Vec<String>> {
    let values = schema.get("enum").and_then(Value::as_array)?;
    let mut strings = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Value::String(s) => strings.push(s.clone()),
            Value::Null => {}
            _ => return None,
        }
    }
    if strings.is_empty() {
        None
    } else {
        Some(strings)
    }
}

fn is_constraint_only(branch: &Value) -> bool {
    match branch.as_object() {
        Some(obj) => !TYPE_KEYWORDS.iter().any(|k| obj.contains_key(*k)),
        None => false,
    }
}

fn is_null_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
        || schema.get("const").map(Value::is_null).unwrap_or(false)
}

/// Does `type` (or `enum`) admit `null`?
fn admits_null(schema: &Value) -> bool {
    let by_type = match schema.get("type") {
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("null")),
        _ => false,
    };
    let by_enum = schema
        .get("enum")
        .and_then(Value::as_array)
        .map(|values| values.iter().any(Value::is_null))
        .unwrap_or(false);
    by_type || by_enum
}

/// The single string a schema pins a value to (`const` or one-element `enum`)
fn single_string_value(schema: &Value) -> Option<&str> {
    if let Some(value) = schema.get("const") {
        return value.as_str();
    }
    match schema.get("enum").and_then(Value::as_array) {
        Some(values) if values.len() == 1 => values[0].as_str(),
        _ => None,
    }
}

fn description(schema: &Value) -> Option<String> {
    schema
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from)
}

fn required_set(schema: &Value) -> HashSet<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn scalar_kind(value: &Value) -> TypeExpr {
    match value {
        Value::String(_) => TypeExpr::String,
        Value::Bool(_) => TypeExpr::Boolean,
        Value::Number(n) if n.is_i64() || n.is_u64() => TypeExpr::Integer,
        Value::Number(_) => TypeExpr::Number,
        Value::Array(_) => TypeExpr::array(TypeExpr::Any),
        Value::Object(_) => TypeExpr::map(TypeExpr::Any),
        Value::Null => TypeExpr::Any,
    }
}

/// Rust variant name for an untagged union payload
fn variant_name(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Named(name) => name.clone(),
        TypeExpr::String => "String".to_string(),
        TypeExpr::Integer => "Integer".to_string(),
        TypeExpr::Number => "Number".to_string(),
        TypeExpr::Boolean => "Boolean".to_string(),
        TypeExpr::Array(_) => "Array".to_string(),
        TypeExpr::Map(_) => "Object".to_string(),
        TypeExpr::Any => "Any".to_string(),
        TypeExpr::Optional(inner) | TypeExpr::Boxed(inner) => variant_name(inner),
    }
}

// =============================================================================
// Reference targets
// =============================================================================

/// A reserved, nameable schema location
#[derive(Debug, Clone)]
struct Target {
    name: String,
    doc: usize,
    /// `(section, key)` for definitions, `None` for the document root
    definition: Option<(String, String)>,
}

fn target_key(file: &str, definition: Option<(&str, &str)>) -> String {
    match definition {
        Some((section, name)) => format!("{}#/{}/{}", file, section, name),
        None => format!("{}#", file),
    }
}

fn decode_pointer_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

// =============================================================================
// Lowerer
// =============================================================================

struct Lowerer<'a> {
    docs: &'a [SchemaDocument],
    /// File name or `$id` -> document index
    by_file: HashMap<String, usize>,
    /// `file#pointer` -> reserved target
    targets: HashMap<String, Target>,
    /// Reserved type name -> origin that owns it
    owners: HashMap<String, String>,
    types: TypeSet,
}

/// How a generated type is referred to by another
enum Use {
    /// Payload of a tagged union variant with this discriminator
    Variant(String),
    /// Target of this alias
    Alias(String),
    Other,
}

impl<'a> Lowerer<'a> {
    fn new(docs: &'a [SchemaDocument]) -> Result<Self> {
        let mut lowerer = Self {
            docs,
            by_file: HashMap::new(),
            targets: HashMap::new(),
            owners: HashMap::new(),
            types: TypeSet::new(),
        };

        for (i, doc) in docs.iter().enumerate() {
            if lowerer.by_file.insert(doc.file_name.clone(), i).is_some() {
                return Err(CompileError::InvalidSchema {
                    file: doc.file_name.clone(),
                    reason: "document is listed more than once".to_string(),
                });
            }
            if let Some(id) = doc.id() {
                lowerer.by_file.entry(id.trim_end_matches('#').to_string()).or_insert(i);
            }
        }

        for (i, doc) in docs.iter().enumerate() {
            let root = Target {
                name: lowerer.root_name(i),
                doc: i,
                definition: None,
            };
            lowerer.reserve(target_key(&doc.file_name, None), root)?;

            for (section, name, _) in doc.definitions() {
                let target = Target {
                    name: to_pascal_case(name),
                    doc: i,
                    definition: Some((section.to_string(), name.to_string())),
                };
                lowerer.reserve(target_key(&doc.file_name, Some((section, name))), target)?;
            }
        }

        Ok(lowerer)
    }

    fn root_name(&self, doc: usize) -> String {
        let doc = &self.docs[doc];
        to_pascal_case(doc.title().unwrap_or_else(|| doc.stem()))
    }

    fn reserve(&mut self, key: String, target: Target) -> Result<()> {
        if let Some(first) = self.owners.get(&target.name) {
            return Err(CompileError::DuplicateType {
                name: target.name.clone(),
                first: first.clone(),
                second: key,
            });
        }
        self.owners.insert(target.name.clone(), key.clone());
        self.targets.insert(key, target);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reference resolution
    // -------------------------------------------------------------------------

    fn resolve(&self, reference: &str, doc: usize, location: &str) -> Result<&Target> {
        let unresolved = || CompileError::UnresolvedRef {
            reference: reference.to_string(),
            location: location.to_string(),
        };

        let (file_part, fragment) = match reference.split_once('#') {
            Some((file, fragment)) => (file, fragment),
            None => (reference, ""),
        };

        let file_idx = if file_part.is_empty() {
            doc
        } else {
            let file = file_part.trim_start_matches("./");
            *self.by_file.get(file).ok_or_else(unresolved)?
        };
        let file_name = &self.docs[file_idx].file_name;

        let key = match fragment.trim_start_matches('/') {
            "" => target_key(file_name, None),
            pointer => {
                let mut segments = pointer.split('/');
                match (segments.next(), segments.next(), segments.next()) {
                    (Some(section @ ("definitions" | "$defs")), Some(name), None) => {
                        target_key(file_name, Some((section, &decode_pointer_segment(name))))
                    }
                    _ => return Err(unresolved()),
                }
            }
        };

        self.targets.get(&key).ok_or_else(unresolved)
    }

    /// Raw schema behind a reference, following `$ref` chains
    fn resolve_raw(&self, reference: &str, doc: usize, location: &str) -> Result<(usize, &'a Value)> {
        let docs: &'a [SchemaDocument] = self.docs;
        let mut reference = reference.to_string();
        let mut doc = doc;

        for _ in 0..16 {
            let target = self.resolve(&reference, doc, location)?;
            let d = &docs[target.doc];
            let schema = match &target.definition {
                Some((section, name)) => d.definition(section, name),
                None => Some(&d.value),
            };
            let schema = schema.ok_or_else(|| CompileError::UnresolvedRef {
                reference: reference.clone(),
                location: location.to_string(),
            })?;

            match schema.get("$ref").and_then(Value::as_str) {
                Some(next) => {
                    reference = next.to_string();
                    doc = target.doc;
                }
                None => return Ok((target.doc, schema)),
            }
        }

        Err(CompileError::UnresolvedRef {
            reference,
            location: location.to_string(),
        })
    }

    // -------------------------------------------------------------------------
    // Definitions
    // -------------------------------------------------------------------------

    /// Create the named type `name` from `schema`
    fn define(&mut self, name: &str, schema: &'a Value, origin: &str, doc: usize) -> Result<()> {
        self.define_with(name, description(schema), origin, |this| this.lower_kind(name, schema, origin, doc))
    }

    /// Reserve `name` in discovery order, then fill it in with `lower`
    fn define_with(
        &mut self,
        name: &str,
        description: Option<String>,
        origin: &str,
        lower: impl FnOnce(&mut Self) -> Result<TypeDefKind>,
    ) -> Result<()> {
        if let Some(owner) = self.owners.get(name) {
            if owner != origin {
                return Err(CompileError::DuplicateType {
                    name: name.to_string(),
                    first: owner.clone(),
                    second: origin.to_string(),
                });
            }
        }

        // Parent goes in first so types come out in the order they were found
        let placeholder = TypeDef {
            name: name.to_string(),
            description,
            origin: origin.to_string(),
            kind: TypeDefKind::Alias { target: TypeExpr::Any },
        };
        if let Err(first) = self.types.insert(placeholder) {
            return Err(CompileError::DuplicateType {
                name: name.to_string(),
                first,
                second: origin.to_string(),
            });
        }

        let kind = lower(self)?;
        trace!(name, origin, "defined type");
        if let Some(def) = self.types.get_mut(name) {
            def.kind = kind;
        }
        Ok(())
    }

    fn lower_kind(&mut self, name: &str, schema: &'a Value, origin: &str, doc: usize) -> Result<TypeDefKind> {
        match shape(schema) {
            Shape::StringEnum(values) => Ok(string_enum(&values)),
            Shape::Wrapped(member) => self.lower_kind(name, member, &format!("{}/allOf/0", origin), doc),
            Shape::AllOf(members) => self.lower_all_of(name, schema, members, origin, doc),
            Shape::Object(props) => self.lower_struct(name, schema, props, origin, doc),
            Shape::Union(branches) => {
                let nullable = branches.iter().any(is_null_schema);
                let non_null: Vec<(usize, &'a Value)> = branches
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| !is_null_schema(b))
                    .collect();
                let keyword = union_keyword(schema);
                let inner = format!("{}Inner", name);

                match (non_null.as_slice(), nullable) {
                    ([], _) => Ok(TypeDefKind::Alias { target: TypeExpr::Any }),
                    (&[(i, only)], false) => {
                        self.lower_kind(name, only, &format!("{}/{}/{}", origin, keyword, i), doc)
                    }
                    // Nullable definitions alias `Option<..>` of the non-null shape
                    (&[(i, only)], true) => {
                        let location = format!("{}/{}/{}", origin, keyword, i);
                        let target = self.lower_expr(only, &inner, &location, doc)?;
                        Ok(TypeDefKind::Alias {
                            target: TypeExpr::optional(target),
                        })
                    }
                    (_, false) => self.lower_union(name, schema, &non_null, origin, doc),
                    (_, true) => {
                        self.define_with(&inner, None, origin, |this| {
                            this.lower_union(&inner, schema, &non_null, origin, doc)
                        })?;
                        Ok(TypeDefKind::Alias {
                            target: TypeExpr::optional(TypeExpr::Named(inner.clone())),
                        })
                    }
                }
            }
            Shape::Ref(_) | Shape::Other => {
                let target = self.lower_expr(schema, name, origin, doc)?;
                Ok(TypeDefKind::Alias { target })
            }
        }
    }

    fn lower_struct(
        &mut self,
        name: &str,
        schema: &'a Value,
        props: &'a Map<String, Value>,
        origin: &str,
        doc: usize,
    ) -> Result<TypeDefKind> {
        let required = required_set(schema);
        let mut names = NameAllocator::new();
        let mut fields = Vec::with_capacity(props.len());

        for (json_name, prop) in props {
            let rust_name = names.allocate(&to_snake_case(json_name));
            let hint = format!("{}{}", name, to_pascal_case(json_name));
            let location = format!("{}/properties/{}", origin, json_name);
            let is_required = required.contains(json_name.as_str());

            let ty = self.lower_expr(prop, &hint, &location, doc)?;
            let ty = if is_required { ty } else { TypeExpr::optional(ty) };

            fields.push(Field {
                json_name: json_name.clone(),
                rust_name,
                ty,
                required: is_required,
                description: description(prop),
            });
        }

        let additional = match schema.get("additionalProperties") {
            Some(extra @ Value::Object(_)) => {
                let hint = format!("{}Value", name);
                let location = format!("{}/additionalProperties", origin);
                Some(self.lower_expr(extra, &hint, &location, doc)?)
            }
            _ => None,
        };

        Ok(TypeDefKind::Struct {
            fields,
            flatten: Vec::new(),
            additional,
        })
    }

    fn lower_all_of(
        &mut self,
        name: &str,
        schema: &'a Value,
        members: &'a [Value],
        origin: &str,
        doc: usize,
    ) -> Result<TypeDefKind> {
        let mut names = NameAllocator::new();
        let mut flatten = Vec::with_capacity(members.len());

        for (i, member) in members.iter().enumerate() {
            let hint = format!("{}Part{}", name, i + 1);
            let location = format!("{}/allOf/{}", origin, i);
            let ty = self.lower_expr(member, &hint, &location, doc)?;
            let base = match (&ty, member.get("$ref")) {
                (TypeExpr::Named(n), Some(_)) => to_snake_case(n),
                _ => format!("part{}", i + 1),
            };
            flatten.push(Flattened {
                rust_name: names.allocate(&base),
                ty,
            });
        }

        let (fields, additional) = match schema.get("properties").and_then(Value::as_object) {
            Some(props) => match self.lower_struct(name, schema, props, origin, doc)? {
                TypeDefKind::Struct { fields, additional, .. } => (fields, additional),
                _ => (Vec::new(), None),
            },
            None => (Vec::new(), None),
        };

        // Own fields keep their names; flattened members yield on collision
        let taken: HashSet<&str> = fields.iter().map(|f| f.rust_name.as_str()).collect();
        for member in &mut flatten {
            if taken.contains(member.rust_name.as_str()) {
                member.rust_name.push_str("_part");
            }
        }

        Ok(TypeDefKind::Struct {
            fields,
            flatten,
            additional,
        })
    }

    fn lower_union(
        &mut self,
        name: &str,
        schema: &'a Value,
        branches: &[(usize, &'a Value)],
        origin: &str,
        doc: usize,
    ) -> Result<TypeDefKind> {
        let keyword = union_keyword(schema);

        // All branches pin a string: plain enum
        let constants: Option<Vec<String>> = branches
            .iter()
            .map(|(_, b)| {
                single_string_value(b)
                    .map(|s| vec![s.to_string()])
                    .or_else(|| if b.get("$ref").is_none() { string_enum_values(b) } else { None })
            })
            .collect::<Option<Vec<Vec<String>>>>()
            .map(|groups| groups.into_iter().flatten().collect());
        if let Some(values) = constants {
            return Ok(string_enum(&values));
        }

        let prefix = format!("{}/{}", origin, keyword);
        if let Some(tag) = self.find_discriminator(branches, &prefix, doc)? {
            let mut names = NameAllocator::new();
            let mut variants = Vec::with_capacity(branches.len());

            for &(i, branch) in branches {
                let hint = format!("{}Variant{}", name, i + 1);
                let location = format!("{}/{}/{}", origin, keyword, i);
                let ty = self.lower_expr(branch, &hint, &location, doc)?;
                let raw = self.branch_object(branch, doc, &location)?;
                let tag_value = raw
                    .and_then(|(_, obj)| obj.get("properties"))
                    .and_then(|p| p.get(&tag))
                    .and_then(single_string_value)
                    .map(String::from);

                let base = match (&ty, branch.get("$ref"), &tag_value) {
                    (TypeExpr::Named(n), Some(_), _) => n.clone(),
                    (_, _, Some(value)) => to_pascal_case(value),
                    _ => variant_name(&ty),
                };
                variants.push(UnionVariant {
                    rust_name: names.allocate(&base),
                    tag_value,
                    ty,
                });
            }

            return Ok(TypeDefKind::TaggedUnion { tag, variants });
        }

        let mut names = NameAllocator::new();
        let mut variants = Vec::with_capacity(branches.len());
        for &(i, branch) in branches {
            let hint = format!("{}Variant{}", name, i + 1);
            let location = format!("{}/{}/{}", origin, keyword, i);
            let ty = self.lower_expr(branch, &hint, &location, doc)?;
            variants.push(UnionVariant {
                rust_name: names.allocate(&variant_name(&ty)),
                tag_value: None,
                ty,
            });
        }
        Ok(TypeDefKind::Untagged { variants })
    }

    /// The object schema a union branch stands for, if it is one
    fn branch_object(&self, branch: &'a Value, doc: usize, location: &str) -> Result<Option<(usize, &'a Value)>> {
        let (doc, schema) = match branch.get("$ref").and_then(Value::as_str) {
            Some(reference) => self.resolve_raw(reference, doc, location)?,
            None => (doc, branch),
        };
        Ok(match shape(schema) {
            Shape::Object(_) => Some((doc, schema)),
            _ => None,
        })
    }

    /// A property every branch requires and pins to a distinct string.
    ///
    /// `prefix` locates the branch list, e.g. `site.schema.json#/definitions/X/oneOf`.
    fn find_discriminator(
        &self,
        branches: &[(usize, &'a Value)],
        prefix: &str,
        doc: usize,
    ) -> Result<Option<String>> {
        let mut objects = Vec::with_capacity(branches.len());
        for &(i, branch) in branches {
            match self.branch_object(branch, doc, &format!("{}/{}", prefix, i))? {
                Some((_, obj)) => objects.push(obj),
                None => return Ok(None),
            }
        }

        let candidates: Vec<&String> = match objects[0].get("properties").and_then(Value::as_object) {
            Some(props) => props.keys().collect(),
            None => return Ok(None),
        };

        'candidates: for candidate in candidates {
            let mut seen = HashSet::new();
            for obj in &objects {
                let pinned = obj
                    .get("properties")
                    .and_then(|p| p.get(candidate.as_str()))
                    .and_then(single_string_value);
                let required = required_set(obj).contains(candidate.as_str());
                match pinned {
                    Some(value) if required && seen.insert(value) => {}
                    _ => continue 'candidates,
                }
            }
            return Ok(Some(candidate.clone()));
        }
        Ok(None)
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    /// Lower a schema used in a field, item, value or variant position.
    ///
    /// Shapes that need a nominal type are defined under `hint`.
    fn lower_expr(&mut self, schema: &'a Value, hint: &str, location: &str, doc: usize) -> Result<TypeExpr> {
        let ty = match shape(schema) {
            Shape::Ref(reference) => TypeExpr::Named(self.resolve(reference, doc, location)?.name.clone()),
            Shape::Wrapped(member) => {
                self.lower_expr(member, hint, &format!("{}/allOf/0", location), doc)?
            }
            Shape::StringEnum(_) | Shape::AllOf(_) | Shape::Object(_) => {
                self.define(hint, schema, location, doc)?;
                TypeExpr::Named(hint.to_string())
            }
            Shape::Union(branches) => {
                let nullable = branches.iter().any(is_null_schema);
                let non_null: Vec<(usize, &'a Value)> = branches
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| !is_null_schema(b))
                    .collect();
                let ty = match non_null.as_slice() {
                    [] => TypeExpr::Any,
                    &[(i, only)] => {
                        let keyword = union_keyword(schema);
                        self.lower_expr(only, hint, &format!("{}/{}/{}", location, keyword, i), doc)?
                    }
                    _ => {
                        self.define_with(hint, description(schema), location, |this| {
                            this.lower_union(hint, schema, &non_null, location, doc)
                        })?;
                        TypeExpr::Named(hint.to_string())
                    }
                };
                if nullable {
                    TypeExpr::optional(ty)
                } else {
                    ty
                }
            }
            Shape::Other => self.lower_scalar(schema, hint, location, doc)?,
        };

        Ok(if admits_null(schema) { TypeExpr::optional(ty) } else { ty })
    }

    fn lower_scalar(&mut self, schema: &'a Value, hint: &str, location: &str, doc: usize) -> Result<TypeExpr> {
        let types: Vec<&str> = match schema.get("type") {
            Some(Value::String(t)) => vec![t.as_str()],
            Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).filter(|t| *t != "null").collect(),
            _ => Vec::new(),
        };

        let ty = match types.as_slice() {
            [] => self.infer_untyped(schema, hint, location, doc)?,
            ["string"] => TypeExpr::String,
            ["integer"] => TypeExpr::Integer,
            ["number"] => TypeExpr::Number,
            ["boolean"] => TypeExpr::Boolean,
            ["array"] => self.lower_items(schema, hint, location, doc)?,
            ["object"] => self.lower_map(schema, hint, location, doc)?,
            _ => TypeExpr::Any,
        };
        Ok(ty)
    }

    fn infer_untyped(&mut self, schema: &'a Value, hint: &str, location: &str, doc: usize) -> Result<TypeExpr> {
        if let Some(value) = schema.get("const") {
            return Ok(scalar_kind(value));
        }
        if let Some(values) = schema.get("enum").and_then(Value::as_array) {
            let kinds: HashSet<TypeExpr> = values.iter().filter(|v| !v.is_null()).map(scalar_kind).collect();
            let mut kinds = kinds.into_iter();
            return Ok(match (kinds.next(), kinds.next()) {
                (Some(kind), None) => kind,
                _ => TypeExpr::Any,
            });
        }
        if schema.get("items").is_some() {
            return self.lower_items(schema, hint, location, doc);
        }
        if schema.get("additionalProperties").is_some() {
            return self.lower_map(schema, hint, location, doc);
        }
        Ok(TypeExpr::Any)
    }

    fn lower_items(&mut self, schema: &'a Value, hint: &str, location: &str, doc: usize) -> Result<TypeExpr> {
        match schema.get("items") {
            Some(items @ Value::Object(_)) => {
                let inner = self.lower_expr(items, &format!("{}Item", hint), &format!("{}/items", location), doc)?;
                Ok(TypeExpr::array(inner))
            }
            _ => Ok(TypeExpr::array(TypeExpr::Any)),
        }
    }

    fn lower_map(&mut self, schema: &'a Value, hint: &str, location: &str, doc: usize) -> Result<TypeExpr> {
        match schema.get("additionalProperties") {
            Some(values @ Value::Object(_)) => {
                let location = format!("{}/additionalProperties", location);
                let inner = self.lower_expr(values, &format!("{}Value", hint), &location, doc)?;
                Ok(TypeExpr::map(inner))
            }
            _ => Ok(TypeExpr::map(TypeExpr::Any)),
        }
    }

    // -------------------------------------------------------------------------
    // Post-processing
    // -------------------------------------------------------------------------

    /// Tagged union members drop the discriminator; the enum carries it.
    ///
    /// The struct behind each variant (through any aliases) loses its tag
    /// field only when nothing but tagged variants with that same tag refer
    /// to it. Otherwise the union gets a tag-free copy named
    /// `Union + Member` and the original keeps the field.
    fn strip_tags(&mut self) {
        let uses = self.collect_uses();
        let mut strip: Vec<(String, String)> = Vec::new();
        let mut copies: Vec<(String, usize, String, String)> = Vec::new();

        for def in self.types.iter() {
            let TypeDefKind::TaggedUnion { tag, variants } = &def.kind else {
                continue;
            };
            for (i, variant) in variants.iter().enumerate() {
                let TypeExpr::Named(member) = &variant.ty else {
                    continue;
                };
                let Some(target) = self.struct_behind(member) else {
                    continue;
                };
                if self.only_tagged_variant(&target, tag, &uses, &mut HashSet::new()) {
                    strip.push((target, tag.clone()));
                } else {
                    copies.push((def.name.clone(), i, target, tag.clone()));
                }
            }
        }

        for (member, tag) in strip {
            if let Some(TypeDef {
                kind: TypeDefKind::Struct { fields, .. },
                ..
            }) = self.types.get_mut(&member)
            {
                fields.retain(|f| f.json_name != tag);
            }
        }

        for (owner, index, member, tag) in copies {
            let Some(mut copy) = self.types.get(&member).cloned() else {
                continue;
            };
            let name = self.unused_name(&format!("{}{}", owner, member));
            copy.name = name.clone();
            if let TypeDefKind::Struct { fields, .. } = &mut copy.kind {
                fields.retain(|f| f.json_name != tag);
            }
            if self.types.insert(copy).is_err() {
                continue;
            }
            debug!(owner = %owner, member = %member, copy = %name, "tagged member is shared, using a copy");
            if let Some(TypeDef {
                kind: TypeDefKind::TaggedUnion { variants, .. },
                ..
            }) = self.types.get_mut(&owner)
            {
                if let Some(variant) = variants.get_mut(index) {
                    variant.ty = TypeExpr::Named(name);
                }
            }
        }
    }

    /// Every reference to every type, by kind of use. Document roots count as used.
    fn collect_uses(&self) -> HashMap<String, Vec<Use>> {
        let mut uses: HashMap<String, Vec<Use>> = HashMap::new();
        for doc in 0..self.docs.len() {
            uses.entry(self.root_name(doc)).or_default().push(Use::Other);
        }

        for def in self.types.iter() {
            match &def.kind {
                TypeDefKind::TaggedUnion { tag, variants } => {
                    for variant in variants {
                        match &variant.ty {
                            TypeExpr::Named(name) => {
                                uses.entry(name.clone()).or_default().push(Use::Variant(tag.clone()))
                            }
                            other => {
                                for name in other.all_refs() {
                                    uses.entry(name.to_string()).or_default().push(Use::Other);
                                }
                            }
                        }
                    }
                }
                TypeDefKind::Alias {
                    target: TypeExpr::Named(name),
                } => uses.entry(name.clone()).or_default().push(Use::Alias(def.name.clone())),
                _ => {
                    for expr in def.type_exprs() {
                        for name in expr.all_refs() {
                            uses.entry(name.to_string()).or_default().push(Use::Other);
                        }
                    }
                }
            }
        }
        uses
    }

    /// The struct a name stands for, following plain aliases
    fn struct_behind(&self, name: &str) -> Option<String> {
        let mut current = name;
        for _ in 0..=self.types.len() {
            match &self.types.get(current)?.kind {
                TypeDefKind::Struct { .. } => return Some(current.to_string()),
                TypeDefKind::Alias {
                    target: TypeExpr::Named(next),
                } => current = next,
                _ => return None,
            }
        }
        None
    }

    /// Is `name` only ever a `tag`-tagged variant payload, directly or through aliases?
    fn only_tagged_variant(
        &self,
        name: &str,
        tag: &str,
        uses: &HashMap<String, Vec<Use>>,
        seen: &mut HashSet<String>,
    ) -> bool {
        if !seen.insert(name.to_string()) {
            return true;
        }
        let Some(list) = uses.get(name) else {
            return false;
        };
        list.iter().all(|u| match u {
            Use::Variant(t) => t == tag,
            Use::Alias(alias) => self.only_tagged_variant(alias, tag, uses, seen),
            Use::Other => false,
        })
    }

    fn unused_name(&self, base: &str) -> String {
        if !self.types.contains(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}{}", base, n))
            .find(|candidate| !self.types.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

fn union_keyword(schema: &Value) -> &'static str {
    if schema.get("oneOf").is_some() {
        "oneOf"
    } else {
        "anyOf"
    }
}

fn string_enum(values: &[String]) -> TypeDefKind {
    let mut names = NameAllocator::new();
    let mut seen = HashSet::new();
    let variants = values
        .iter()
        .filter(|v| seen.insert(v.as_str()))
        .map(|value| EnumVariant {
            rust_name: names.allocate(&to_pascal_case(value)),
            value: value.clone(),
        })
        .collect();
    TypeDefKind::StringEnum { variants }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(file: &str, value: Value) -> SchemaDocument {
        SchemaDocument::from_text(file, value.to_string()).unwrap()
    }

    fn lower_one(value: Value) -> TypeSet {
        lower(&[doc("test.schema.json", value)]).unwrap()
    }

    fn struct_fields(def: &TypeDef) -> &[Field] {
        match &def.kind {
            TypeDefKind::Struct { fields, .. } => fields,
            other => panic!("Expected Struct, got {:?}", other),
        }
    }

    #[test]
    fn test_root_named_from_title() {
        let types = lower_one(json!({
            "title": "Site configuration",
            "type": "object",
            "properties": {"externalURL": {"type": "string"}},
            "required": ["externalURL"]
        }));
        let def = types.get("SiteConfiguration").unwrap();
        let fields = struct_fields(def);
        assert_eq!(fields[0].rust_name, "external_url");
        assert_eq!(fields[0].ty, TypeExpr::String);
        assert!(fields[0].required);
    }

    #[test]
    fn test_root_named_from_stem_without_title() {
        let types = lower(&[doc("gitolite.schema.json", json!({"type": "object", "properties": {}}))]).unwrap();
        assert!(types.get("Gitolite").is_some());
    }

    #[test]
    fn test_optional_and_nullable_fields() {
        let types = lower_one(json!({
            "title": "T",
            "type": "object",
            "properties": {
                "a": {"type": "integer"},
                "b": {"type": ["boolean", "null"]},
                "c": {"type": ["string", "null"]}
            },
            "required": ["c"]
        }));
        let fields = struct_fields(types.get("T").unwrap());
        assert_eq!(fields[0].ty, TypeExpr::optional(TypeExpr::Integer));
        assert_eq!(fields[1].ty, TypeExpr::optional(TypeExpr::Boolean));
        assert!(fields[2].required);
        assert_eq!(fields[2].ty, TypeExpr::optional(TypeExpr::String));
    }

    #[test]
    fn test_inline_enum_gets_derived_name() {
        let types = lower_one(json!({
            "title": "Notice",
            "type": "object",
            "properties": {"location": {"type": "string", "enum": ["top", "home"]}}
        }));
        let fields = struct_fields(types.get("Notice").unwrap());
        assert_eq!(fields[0].ty, TypeExpr::optional(TypeExpr::Named("NoticeLocation".into())));
        match &types.get("NoticeLocation").unwrap().kind {
            TypeDefKind::StringEnum { variants } => {
                let names: Vec<_> = variants.iter().map(|v| v.rust_name.as_str()).collect();
                assert_eq!(names, vec!["Top", "Home"]);
            }
            other => panic!("Expected StringEnum, got {:?}", other),
        }
    }

    #[test]
    fn test_parent_precedes_inline_children() {
        let types = lower_one(json!({
            "title": "Outer",
            "type": "object",
            "properties": {"inner": {"type": "object", "properties": {"x": {"type": "string"}}}}
        }));
        let names: Vec<_> = types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "OuterInner"]);
    }

    #[test]
    fn test_local_and_cross_document_refs() {
        let a = doc("a.schema.json", json!({
            "title": "A",
            "type": "object",
            "properties": {
                "local": {"$ref": "#/definitions/Local"},
                "remote": {"$ref": "b.schema.json#/definitions/Remote"},
                "whole": {"$ref": "b.schema.json"}
            },
            "definitions": {"Local": {"type": "string"}}
        }));
        let b = doc("b.schema.json", json!({
            "title": "B",
            "type": "object",
            "properties": {},
            "definitions": {"Remote": {"type": "integer"}}
        }));
        let types = lower(&[a, b]).unwrap();
        let fields = struct_fields(types.get("A").unwrap());
        assert_eq!(fields[0].ty, TypeExpr::optional(TypeExpr::Named("Local".into())));
        assert_eq!(fields[1].ty, TypeExpr::optional(TypeExpr::Named("Remote".into())));
        assert_eq!(fields[2].ty, TypeExpr::optional(TypeExpr::Named("B".into())));
        assert!(types.get("Local").unwrap().is_alias());
    }

    #[test]
    fn test_unresolved_ref() {
        let err = lower(&[doc("a.schema.json", json!({
            "type": "object",
            "properties": {"x": {"$ref": "#/definitions/Missing"}}
        }))])
        .unwrap_err();
        match err {
            CompileError::UnresolvedRef { reference, location } => {
                assert_eq!(reference, "#/definitions/Missing");
                assert_eq!(location, "a.schema.json#/properties/x");
            }
            other => panic!("Expected UnresolvedRef, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_definition_names_across_documents() {
        let a = doc("a.schema.json", json!({"definitions": {"Exclude": {"type": "string"}}}));
        let b = doc("b.schema.json", json!({"definitions": {"Exclude": {"type": "string"}}}));
        let err = lower(&[a, b]).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateType { ref name, .. } if name == "Exclude"));
    }

    #[test]
    fn test_tagged_union_strips_discriminator() {
        let types = lower_one(json!({
            "title": "Root",
            "type": "object",
            "properties": {"providers": {"type": "array", "items": {"$ref": "#/definitions/Providers"}}},
            "definitions": {
                "Providers": {"oneOf": [{"$ref": "#/definitions/Builtin"}, {"$ref": "#/definitions/Saml"}]},
                "Builtin": {
                    "type": "object",
                    "required": ["type"],
                    "properties": {"type": {"type": "string", "const": "builtin"}, "allowSignup": {"type": "boolean"}}
                },
                "Saml": {
                    "type": "object",
                    "required": ["type"],
                    "properties": {"type": {"type": "string", "const": "saml"}, "configID": {"type": "string"}}
                }
            }
        }));

        match &types.get("Providers").unwrap().kind {
            TypeDefKind::TaggedUnion { tag, variants } => {
                assert_eq!(tag, "type");
                assert_eq!(variants[0].rust_name, "Builtin");
                assert_eq!(variants[0].tag_value.as_deref(), Some("builtin"));
                assert_eq!(variants[1].tag_value.as_deref(), Some("saml"));
            }
            other => panic!("Expected TaggedUnion, got {:?}", other),
        }
        let fields = struct_fields(types.get("Builtin").unwrap());
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].json_name, "allowSignup");
    }

    #[test]
    fn test_untagged_union_of_scalars() {
        let types = lower_one(json!({
            "title": "Root",
            "type": "object",
            "properties": {
                "args": {"type": "array", "items": {"oneOf": [{"type": "string"}, {"type": "number"}, {"type": "object"}]}}
            }
        }));
        match &types.get("RootArgsItem").unwrap().kind {
            TypeDefKind::Untagged { variants } => {
                let names: Vec<_> = variants.iter().map(|v| v.rust_name.as_str()).collect();
                assert_eq!(names, vec!["String", "Number", "Object"]);
            }
            other => panic!("Expected Untagged, got {:?}", other),
        }
    }

    #[test]
    fn test_nullable_single_branch_union_collapses() {
        let types = lower_one(json!({
            "title": "Root",
            "type": "object",
            "properties": {"x": {"anyOf": [{"type": "null"}, {"type": "string"}]}},
            "required": ["x"]
        }));
        let fields = struct_fields(types.get("Root").unwrap());
        assert_eq!(fields[0].ty, TypeExpr::optional(TypeExpr::String));
        assert_eq!(types.len(), 1);
    }

    #[test]
    fn test_constraint_only_any_of_is_ignored() {
        let types = lower_one(json!({
            "title": "Conn",
            "type": "object",
            "properties": {"token": {"type": "string"}, "password": {"type": "string"}},
            "anyOf": [{"required": ["token"]}, {"required": ["password"]}]
        }));
        assert_eq!(struct_fields(types.get("Conn").unwrap()).len(), 2);
    }

    #[test]
    fn test_const_branches_become_enum() {
        let types = lower_one(json!({
            "title": "Mode",
            "oneOf": [{"const": "enabled"}, {"const": "disabled"}]
        }));
        assert!(matches!(types.get("Mode").unwrap().kind, TypeDefKind::StringEnum { .. }));
    }

    #[test]
    fn test_all_of_flattens_members() {
        let types = lower_one(json!({
            "title": "Combined",
            "allOf": [{"$ref": "#/definitions/Base"}, {"type": "object", "properties": {"y": {"type": "string"}}}],
            "properties": {"z": {"type": "boolean"}},
            "definitions": {"Base": {"type": "object", "properties": {"x": {"type": "string"}}}}
        }));
        match &types.get("Combined").unwrap().kind {
            TypeDefKind::Struct { fields, flatten, .. } => {
                assert_eq!(fields.len(), 1);
                assert_eq!(flatten[0].rust_name, "base");
                assert_eq!(flatten[0].ty, TypeExpr::Named("Base".into()));
                assert_eq!(flatten[1].ty, TypeExpr::Named("CombinedPart2".into()));
            }
            other => panic!("Expected Struct, got {:?}", other),
        }
    }

    #[test]
    fn test_maps_and_arrays() {
        let types = lower_one(json!({
            "title": "Settings",
            "type": "object",
            "properties": {
                "groups": {"type": "object", "additionalProperties": {"type": "array", "items": {"type": "string"}}},
                "extensions": {"type": "object", "additionalProperties": {"type": "boolean"}},
                "free": {"type": "object"},
                "tuple": {"type": "array", "items": [{"type": "string"}]},
                "anything": {}
            }
        }));
        let fields = struct_fields(types.get("Settings").unwrap());
        let tys: Vec<_> = fields.iter().map(|f| f.ty.clone()).collect();
        assert_eq!(tys[0], TypeExpr::optional(TypeExpr::map(TypeExpr::array(TypeExpr::String))));
        assert_eq!(tys[1], TypeExpr::optional(TypeExpr::map(TypeExpr::Boolean)));
        assert_eq!(tys[2], TypeExpr::optional(TypeExpr::map(TypeExpr::Any)));
        assert_eq!(tys[3], TypeExpr::optional(TypeExpr::array(TypeExpr::Any)));
        assert_eq!(tys[4], TypeExpr::optional(TypeExpr::Any));
    }

    #[test]
    fn test_field_name_collisions() {
        let types = lower_one(json!({
            "title": "T",
            "type": "object",
            "properties": {"auth.providers": {"type": "string"}, "authProviders": {"type": "string"}}
        }));
        let fields = struct_fields(types.get("T").unwrap());
        assert_eq!(fields[0].rust_name, "auth_providers");
        assert_eq!(fields[1].rust_name, "auth_providers2");
    }

    fn tagged(def: &TypeDef) -> (&str, &[UnionVariant]) {
        match &def.kind {
            TypeDefKind::TaggedUnion { tag, variants } => (tag, variants),
            other => panic!("Expected TaggedUnion, got {:?}", other),
        }
    }

    fn json_names(def: &TypeDef) -> Vec<&str> {
        struct_fields(def).iter().map(|f| f.json_name.as_str()).collect()
    }

    fn kind_struct(kind: &str, extra: &str) -> Value {
        let mut properties = Map::new();
        properties.insert("kind".to_string(), json!({"type": "string", "const": kind}));
        properties.insert(extra.to_string(), json!({"type": "string"}));
        json!({"type": "object", "required": ["kind"], "properties": properties})
    }

    #[test]
    fn test_defs_section_and_self_reference() {
        let types = lower_one(json!({
            "title": "Node",
            "type": "object",
            "properties": {
                "next": {"$ref": "#"},
                "label": {"$ref": "#/$defs/Label"}
            },
            "$defs": {"Label": {"type": "string"}}
        }));
        let fields = struct_fields(types.get("Node").unwrap());
        assert_eq!(fields[0].ty, TypeExpr::optional(TypeExpr::Named("Node".into())));
        assert_eq!(fields[1].ty, TypeExpr::optional(TypeExpr::Named("Label".into())));
        assert_eq!(types.get("Label").unwrap().origin, "test.schema.json#/$defs/Label");
    }

    #[test]
    fn test_ref_by_document_id() {
        let a = doc("a.schema.json", json!({
            "title": "A",
            "type": "object",
            "properties": {"remote": {"$ref": "https://example.com/b.schema.json#/definitions/Remote"}}
        }));
        let b = doc("b.schema.json", json!({
            "$id": "https://example.com/b.schema.json#",
            "title": "B",
            "definitions": {"Remote": {"type": "integer"}}
        }));
        let types = lower(&[a, b]).unwrap();
        let fields = struct_fields(types.get("A").unwrap());
        assert_eq!(fields[0].ty, TypeExpr::optional(TypeExpr::Named("Remote".into())));
    }

    /// `Pick` is a union over a `$ref` chain of `hops` links ending at a tagged struct
    fn ref_chain(hops: usize) -> Value {
        let mut definitions = Map::new();
        definitions.insert(
            "Pick".to_string(),
            json!({"oneOf": [{"$ref": "#/definitions/D0"}, {"$ref": "#/definitions/Other"}]}),
        );
        for k in 0..hops {
            definitions.insert(format!("D{}", k), json!({"$ref": format!("#/definitions/D{}", k + 1)}));
        }
        definitions.insert(format!("D{}", hops), kind_struct("chained", "value"));
        definitions.insert("Other".to_string(), kind_struct("other", "value"));
        json!({"title": "Root", "definitions": definitions})
    }

    #[test]
    fn test_discriminator_found_through_ref_chain() {
        let types = lower_one(ref_chain(15));
        let (tag, variants) = tagged(types.get("Pick").unwrap());
        assert_eq!(tag, "kind");
        assert_eq!(variants[0].tag_value.as_deref(), Some("chained"));
        assert_eq!(variants[0].ty, TypeExpr::Named("D0".into()));
        assert_eq!(json_names(types.get("D15").unwrap()), vec!["value"]);
    }

    #[test]
    fn test_ref_chain_gives_up_after_sixteen_hops() {
        let err = lower(&[doc("test.schema.json", ref_chain(17))]).unwrap_err();
        match err {
            CompileError::UnresolvedRef { reference, location } => {
                assert_eq!(reference, "#/definitions/D16");
                assert_eq!(location, "test.schema.json#/definitions/Pick/oneOf/0");
            }
            other => panic!("Expected UnresolvedRef, got {:?}", other),
        }
    }

    fn auth_schema(properties: Value) -> Value {
        json!({
            "title": "Root",
            "type": "object",
            "properties": properties,
            "definitions": {
                "Auth": {"oneOf": [{"$ref": "#/definitions/TokenAuth"}, {"$ref": "#/definitions/PasswordAuth"}]},
                "TokenAuth": kind_struct("token", "token"),
                "PasswordAuth": kind_struct("password", "password")
            }
        })
    }

    #[test]
    fn test_shared_tagged_member_keeps_its_tag() {
        let types = lower_one(auth_schema(json!({
            "auth": {"$ref": "#/definitions/Auth"},
            "primary": {"$ref": "#/definitions/TokenAuth"}
        })));

        assert_eq!(json_names(types.get("TokenAuth").unwrap()), vec!["kind", "token"]);
        assert_eq!(json_names(types.get("AuthTokenAuth").unwrap()), vec!["token"]);
        assert_eq!(json_names(types.get("PasswordAuth").unwrap()), vec!["password"]);

        let (_, variants) = tagged(types.get("Auth").unwrap());
        assert_eq!(variants[0].rust_name, "TokenAuth");
        assert_eq!(variants[0].ty, TypeExpr::Named("AuthTokenAuth".into()));
        assert_eq!(variants[1].ty, TypeExpr::Named("PasswordAuth".into()));
    }

    #[test]
    fn test_copy_name_avoids_existing_type() {
        let mut schema = auth_schema(json!({"primary": {"$ref": "#/definitions/TokenAuth"}}));
        schema["definitions"]["AuthTokenAuth"] = json!({"type": "string"});
        let types = lower_one(schema);
        let (_, variants) = tagged(types.get("Auth").unwrap());
        assert_eq!(variants[0].ty, TypeExpr::Named("AuthTokenAuth2".into()));
        assert!(types.get("AuthTokenAuth").unwrap().is_alias());
    }

    #[test]
    fn test_member_behind_alias_loses_tag() {
        let mut schema = auth_schema(json!({"auth": {"$ref": "#/definitions/Auth"}}));
        schema["definitions"]["Auth"] =
            json!({"oneOf": [{"$ref": "#/definitions/TokenAlias"}, {"$ref": "#/definitions/PasswordAuth"}]});
        schema["definitions"]["TokenAlias"] = json!({"$ref": "#/definitions/TokenAuth"});
        let types = lower_one(schema);

        let (tag, variants) = tagged(types.get("Auth").unwrap());
        assert_eq!(tag, "kind");
        assert_eq!(variants[0].tag_value.as_deref(), Some("token"));
        assert_eq!(variants[0].ty, TypeExpr::Named("TokenAlias".into()));
        assert_eq!(json_names(types.get("TokenAuth").unwrap()), vec!["token"]);
    }

    #[test]
    fn test_alias_used_elsewhere_gets_a_copy() {
        let mut schema = auth_schema(json!({
            "auth": {"$ref": "#/definitions/Auth"},
            "fallback": {"$ref": "#/definitions/TokenAlias"}
        }));
        schema["definitions"]["Auth"] =
            json!({"oneOf": [{"$ref": "#/definitions/TokenAlias"}, {"$ref": "#/definitions/PasswordAuth"}]});
        schema["definitions"]["TokenAlias"] = json!({"$ref": "#/definitions/TokenAuth"});
        let types = lower_one(schema);

        assert_eq!(json_names(types.get("TokenAuth").unwrap()), vec!["kind", "token"]);
        let (_, variants) = tagged(types.get("Auth").unwrap());
        assert_eq!(variants[0].ty, TypeExpr::Named("AuthTokenAuth".into()));
        assert_eq!(json_names(types.get("AuthTokenAuth").unwrap()), vec!["token"]);
    }

    #[test]
    fn test_nullable_definitions_alias_option() {
        let types = lower_one(json!({
            "title": "Root",
            "definitions": {
                "ViaUnion": {"anyOf": [{"type": "null"}, {"type": "string"}]},
                "ViaTypeArray": {"type": ["string", "null"]},
                "Choice": {"oneOf": [{"type": "string"}, {"type": "integer"}, {"type": "null"}]},
                "Maybe": {"oneOf": [{"type": "null"}, {"type": "object", "properties": {"x": {"type": "string"}}}]}
            }
        }));
        let alias_target = |name: &str| match &types.get(name).unwrap().kind {
            TypeDefKind::Alias { target } => target.clone(),
            other => panic!("Expected Alias, got {:?}", other),
        };

        assert_eq!(alias_target("ViaUnion"), TypeExpr::optional(TypeExpr::String));
        assert_eq!(alias_target("ViaTypeArray"), TypeExpr::optional(TypeExpr::String));
        assert_eq!(alias_target("Choice"), TypeExpr::optional(TypeExpr::Named("ChoiceInner".into())));
        assert_eq!(alias_target("Maybe"), TypeExpr::optional(TypeExpr::Named("MaybeInner".into())));

        match &types.get("ChoiceInner").unwrap().kind {
            TypeDefKind::Untagged { variants } => {
                let names: Vec<_> = variants.iter().map(|v| v.rust_name.as_str()).collect();
                assert_eq!(names, vec!["String", "Integer"]);
            }
            other => panic!("Expected Untagged, got {:?}", other),
        }
        assert_eq!(json_names(types.get("MaybeInner").unwrap()), vec!["x"]);
    }
}
