//
// Copyright (c) The yang-schema Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Primitive value types shared by the object model.

use std::sync::Arc;

/// Index of a schema node in the context arena.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

/// Index of a module or submodule in the context registry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub(crate) u32);

/// YANG built-in base types.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum BaseType {
    #[default]
    None = 0,
    Any = 1,
    Bits = 2,
    Enum = 3,
    Empty = 4,
    Boolean = 5,
    Int8 = 6,
    Int16 = 7,
    Int32 = 8,
    Int64 = 9,
    Uint8 = 10,
    Uint16 = 11,
    Uint32 = 12,
    Uint64 = 13,
    Decimal64 = 14,
    Float64 = 15,
    String = 16,
    Binary = 17,
    InstanceId = 18,
    Union = 19,
    LeafRef = 20,
    IdentityRef = 21,
    Slist = 22,
    Container = 23,
    Choice = 24,
    Case = 25,
    List = 26,
}

/// YANG status statement value.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Status {
    #[default]
    None,
    Current,
    Deprecated,
    Obsolete,
}

/// Maximum access permitted on a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Access {
    None,
    ReadOnly,
    ReadWrite,
    ReadCreate,
}

/// Location of a statement in its source module.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SourceLocation {
    pub module: Option<ModuleId>,
    pub line: u32,
    pub column: u32,
}

/// A type definition, either built-in or a reference to a named typedef.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDef {
    basetype: BaseType,
    prefix: Option<String>,
    name: Option<String>,
}

/// A named `typedef` statement.
#[derive(Clone, Debug, PartialEq)]
pub struct Typedef {
    pub name: String,
    pub typdef: Arc<TypeDef>,
    pub description: Option<String>,
    pub units: Option<String>,
    pub default: Option<String>,
    pub status: Status,
    pub tkerr: SourceLocation,
}

/// An XPath expression (`when`, `must`) kept in source form.
#[derive(Clone, Debug, PartialEq)]
pub struct XPathExpr {
    pub source: String,
    pub tkerr: SourceLocation,
}

/// A `must` statement.
#[derive(Clone, Debug, PartialEq)]
pub struct Must {
    pub expr: XPathExpr,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub error_message: Option<String>,
    pub error_app_tag: Option<String>,
}

/// One extension usage (appinfo) entry.
#[derive(Clone, Debug, PartialEq)]
pub struct AppInfo {
    pub prefix: Option<String>,
    pub name: String,
    pub value: Option<String>,
    pub tkerr: SourceLocation,
}

// ===== impl BaseType =====

impl BaseType {
    /// Returns whether the type is a signed or unsigned integer type.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            BaseType::Int8
                | BaseType::Int16
                | BaseType::Int32
                | BaseType::Int64
                | BaseType::Uint8
                | BaseType::Uint16
                | BaseType::Uint32
                | BaseType::Uint64
        )
    }

    /// Returns whether the type carries simple (text) content.
    pub fn is_simple(&self) -> bool {
        !matches!(
            self,
            BaseType::None
                | BaseType::Any
                | BaseType::Container
                | BaseType::Choice
                | BaseType::Case
                | BaseType::List
        )
    }

    /// Built-in type for a YANG type keyword.
    pub fn from_name(name: &str) -> Option<BaseType> {
        let basetype = match name {
            "anyxml" => BaseType::Any,
            "bits" => BaseType::Bits,
            "enumeration" => BaseType::Enum,
            "empty" => BaseType::Empty,
            "boolean" => BaseType::Boolean,
            "int8" => BaseType::Int8,
            "int16" => BaseType::Int16,
            "int32" => BaseType::Int32,
            "int64" => BaseType::Int64,
            "uint8" => BaseType::Uint8,
            "uint16" => BaseType::Uint16,
            "uint32" => BaseType::Uint32,
            "uint64" => BaseType::Uint64,
            "decimal64" => BaseType::Decimal64,
            "float64" => BaseType::Float64,
            "string" => BaseType::String,
            "binary" => BaseType::Binary,
            "instance-identifier" => BaseType::InstanceId,
            "union" => BaseType::Union,
            "leafref" => BaseType::LeafRef,
            "identityref" => BaseType::IdentityRef,
            _ => return None,
        };
        Some(basetype)
    }

    pub(crate) fn int_in_range(&self, value: i64) -> bool {
        match self {
            BaseType::Int8 => i8::try_from(value).is_ok(),
            BaseType::Int16 => i16::try_from(value).is_ok(),
            BaseType::Int32 => i32::try_from(value).is_ok(),
            _ => true,
        }
    }

    pub(crate) fn uint_in_range(&self, value: u64) -> bool {
        match self {
            BaseType::Uint8 => u8::try_from(value).is_ok(),
            BaseType::Uint16 => u16::try_from(value).is_ok(),
            BaseType::Uint32 => u32::try_from(value).is_ok(),
            _ => true,
        }
    }
}

// ===== impl TypeDef =====

impl TypeDef {
    /// A built-in type.
    pub fn builtin(basetype: BaseType) -> TypeDef {
        TypeDef {
            basetype,
            prefix: None,
            name: None,
        }
    }

    /// A reference to a named type (`prefix:name` or `name`), unresolved.
    pub fn named(qname: &str) -> TypeDef {
        let (prefix, name) = crate::utils::split_qname(qname);
        TypeDef {
            basetype: BaseType::None,
            prefix: prefix.map(str::to_owned),
            name: Some(name.to_owned()),
        }
    }

    /// Resolved base type; `BaseType::None` for an unresolved named type.
    pub fn basetype(&self) -> BaseType {
        self.basetype
    }

    /// Name of the referenced typedef.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Prefix of the referenced typedef.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }

    /// Copy of this named type with the base type filled in.
    pub(crate) fn with_basetype(&self, basetype: BaseType) -> TypeDef {
        TypeDef {
            basetype,
            prefix: self.prefix.clone(),
            name: self.name.clone(),
        }
    }
}

// ===== impl Typedef =====

impl Typedef {
    pub fn new(name: &str, typdef: TypeDef) -> Typedef {
        Typedef {
            name: name.to_owned(),
            typdef: Arc::new(typdef),
            description: None,
            units: None,
            default: None,
            status: Status::Current,
            tkerr: SourceLocation::default(),
        }
    }
}

// ===== impl XPathExpr =====

impl XPathExpr {
    pub fn new(source: &str) -> XPathExpr {
        XPathExpr {
            source: source.to_owned(),
            tkerr: SourceLocation::default(),
        }
    }
}

// ===== impl Must =====

impl Must {
    pub fn new(source: &str) -> Must {
        Must {
            expr: XPathExpr::new(source),
            description: None,
            reference: None,
            error_message: None,
            error_app_tag: None,
        }
    }
}

// ===== impl AppInfo =====

impl AppInfo {
    pub fn new(
        prefix: Option<&str>,
        name: &str,
        value: Option<&str>,
    ) -> AppInfo {
        AppInfo {
            prefix: prefix.map(str::to_owned),
            name: name.to_owned(),
            value: value.map(str::to_owned),
            tkerr: SourceLocation::default(),
        }
    }
}
