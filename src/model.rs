//! Type Model
//!
//! Language-level description of the types a set of schemas compiles to.
//! Lowering (`lower.rs`) produces it, recursion analysis (`graph.rs`) marks
//! boxed edges on it, and emitters render it. Emitters never look at raw
//! schema JSON.

use std::collections::HashMap;

// =============================================================================
// Type expressions
// =============================================================================

/// The type of a field, variant payload or alias target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    String,
    Integer,
    Number,
    Boolean,
    /// Unconstrained JSON value
    Any,
    Array(Box<TypeExpr>),
    /// JSON object with string keys
    Map(Box<TypeExpr>),
    /// Value may be `null`
    Optional(Box<TypeExpr>),
    /// A generated type
    Named(String),
    /// Heap indirection inserted to break recursion
    Boxed(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn array(inner: TypeExpr) -> Self {
        Self::Array(Box::new(inner))
    }

    pub fn map(inner: TypeExpr) -> Self {
        Self::Map(Box::new(inner))
    }

    /// Wrap in `Optional` unless it already is
    pub fn optional(inner: TypeExpr) -> Self {
        match inner {
            Self::Optional(_) => inner,
            other => Self::Optional(Box::new(other)),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Named types held by value (not behind `Vec`, map or `Box`)
    pub fn direct_refs(&self) -> Vec<&str> {
        match self {
            Self::Named(name) => vec![name.as_str()],
            Self::Optional(inner) => inner.direct_refs(),
            _ => Vec::new(),
        }
    }

    /// Every named type mentioned anywhere in this expression
    pub fn all_refs(&self) -> Vec<&str> {
        match self {
            Self::Named(name) => vec![name.as_str()],
            Self::Optional(inner) | Self::Array(inner) | Self::Map(inner) | Self::Boxed(inner) => {
                inner.all_refs()
            }
            _ => Vec::new(),
        }
    }

    /// Box the by-value reference to `target`, leaving collections alone
    pub fn box_ref(&mut self, target: &str) -> bool {
        match self {
            Self::Named(name) if name.as_str() == target => {
                let named = Self::Named(std::mem::take(name));
                *self = Self::Boxed(Box::new(named));
                true
            }
            Self::Optional(inner) => inner.box_ref(target),
            _ => false,
        }
    }
}

// =============================================================================
// Type definitions
// =============================================================================

/// A struct field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Property name in JSON
    pub json_name: String,
    /// Field identifier in Rust
    pub rust_name: String,
    pub ty: TypeExpr,
    pub required: bool,
    pub description: Option<String>,
}

impl Field {
    pub fn needs_rename(&self) -> bool {
        self.json_name != self.rust_name
    }
}

/// A flattened member of an `allOf` composition
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened {
    pub rust_name: String,
    pub ty: TypeExpr,
}

/// A string enum variant
#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    pub rust_name: String,
    pub value: String,
}

/// A variant of a tagged or untagged union
#[derive(Debug, Clone, PartialEq)]
pub struct UnionVariant {
    pub rust_name: String,
    /// Discriminator value (tagged unions only)
    pub tag_value: Option<String>,
    pub ty: TypeExpr,
}

/// What a generated type looks like
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    Struct {
        fields: Vec<Field>,
        flatten: Vec<Flattened>,
        /// Value type of a flattened catch-all map (`additionalProperties`)
        additional: Option<TypeExpr>,
    },
    StringEnum {
        variants: Vec<EnumVariant>,
    },
    TaggedUnion {
        tag: String,
        variants: Vec<UnionVariant>,
    },
    Untagged {
        variants: Vec<UnionVariant>,
    },
    Alias {
        target: TypeExpr,
    },
}

/// A named type to generate
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub description: Option<String>,
    /// Where the type came from, e.g. `site.schema.json#/definitions/Log`
    pub origin: String,
    pub kind: TypeDefKind,
}

impl TypeDef {
    pub fn is_alias(&self) -> bool {
        matches!(self.kind, TypeDefKind::Alias { .. })
    }

    /// Mutable access to every type expression this definition holds
    pub fn type_exprs_mut(&mut self) -> Vec<&mut TypeExpr> {
        match &mut self.kind {
            TypeDefKind::Struct { fields, flatten, additional } => {
                let mut exprs: Vec<&mut TypeExpr> = fields.iter_mut().map(|f| &mut f.ty).collect();
                exprs.extend(flatten.iter_mut().map(|f| &mut f.ty));
                exprs.extend(additional.iter_mut());
                exprs
            }
            TypeDefKind::StringEnum { .. } => Vec::new(),
            TypeDefKind::TaggedUnion { variants, .. } | TypeDefKind::Untagged { variants } => {
                variants.iter_mut().map(|v| &mut v.ty).collect()
            }
            TypeDefKind::Alias { target } => vec![target],
        }
    }

    /// Every type expression this definition holds
    pub fn type_exprs(&self) -> Vec<&TypeExpr> {
        match &self.kind {
            TypeDefKind::Struct { fields, flatten, additional } => {
                let mut exprs: Vec<&TypeExpr> = fields.iter().map(|f| &f.ty).collect();
                exprs.extend(flatten.iter().map(|f| &f.ty));
                exprs.extend(additional.iter());
                exprs
            }
            TypeDefKind::StringEnum { .. } => Vec::new(),
            TypeDefKind::TaggedUnion { variants, .. } | TypeDefKind::Untagged { variants } => {
                variants.iter().map(|v| &v.ty).collect()
            }
            TypeDefKind::Alias { target } => vec![target],
        }
    }
}

// =============================================================================
// Type set
// =============================================================================

/// All generated types in discovery order
#[derive(Debug, Clone, Default)]
pub struct TypeSet {
    types: Vec<TypeDef>,
    index: HashMap<String, usize>,
}

impl TypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition; returns the existing origin if the name is taken
    pub fn insert(&mut self, def: TypeDef) -> Result<(), String> {
        if let Some(&i) = self.index.get(&def.name) {
            return Err(self.types[i].origin.clone());
        }
        self.index.insert(def.name.clone(), self.types.len());
        self.types.push(def);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TypeDef> {
        match self.index.get(name) {
            Some(&i) => self.types.get_mut(i),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
