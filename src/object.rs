//
// Copyright (c) The yang-schema Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Schema node records.
//!
//! Every YANG data-definition statement is stored as one [`ObjectTemplate`]
//! in the context arena. The kind-specific part of a node lives in the
//! [`ObjectDef`] sum type; everything that applies to all kinds (flags,
//! extensions, if-features, links) lives in the template itself.

use std::sync::Arc;

use bitflags::bitflags;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::error::{Error, ErrorCode, Result};
use crate::feature::IfFeature;
use crate::types::{
    AppInfo, BaseType, ModuleId, Must, NodeId, SourceLocation, Status, TypeDef,
    Typedef, XPathExpr,
};

bitflags! {
    /// Schema node flags.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct ObjectFlags: u32 {
        /// Node is a clone of a grouping or augment member.
        const CLONE = 1 << 0;
        /// Uses or augment clone referring to the original definition.
        const DEFCLONE = 1 << 1;
        /// Node was added to its parent by an augment.
        const AUGCLONE = 1 << 2;
        const DELETED = 1 << 3;
        /// Node has a `when` statement of its own or inherited.
        const CONDITIONAL = 1 << 4;
        /// Node is in a module top-level queue.
        const TOP = 1 << 5;
        const EMPTY = 1 << 6;
        const SEEN = 1 << 7;
        const DIFF = 1 << 8;
        const HIDDEN = 1 << 9;
        const ROOT = 1 << 10;
        const PASSWD = 1 << 11;
        const CLI = 1 << 12;
        const XSDLIST = 1 << 13;
        const KEY = 1 << 14;
        const ABSTRACT = 1 << 15;
        /// A `config` statement was present.
        const CONFSET = 1 << 16;
        /// Value of the `config` statement.
        const CONFIG = 1 << 17;
        /// A `mandatory` statement was present.
        const MANDSET = 1 << 18;
        /// Value of the `mandatory` statement.
        const MANDATORY = 1 << 19;
        const UNIQUE = 1 << 20;
        const XPATH = 1 << 21;
        const QNAME = 1 << 22;
        const SCHEMAINST = 1 << 23;
        const SECURE = 1 << 24;
        const VERY_SECURE = 1 << 25;
        const CLI_EQUALS_OK = 1 << 26;
        const SIL_DELETE_CHILDREN_FIRST = 1 << 27;
        const BLOCK_CREATE = 1 << 28;
        const BLOCK_UPDATE = 1 << 29;
        const BLOCK_DELETE = 1 << 30;
    }
}

/// YANG schema node kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, FromPrimitive)]
pub enum ObjectKind {
    Anyxml = 1,
    Container = 2,
    Leaf = 3,
    LeafList = 4,
    List = 5,
    Choice = 6,
    Case = 7,
    Uses = 8,
    Refine = 9,
    Augment = 10,
    Rpc = 11,
    RpcIo = 12,
    Notification = 13,
}

/// Kind of node an augment adds children to.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AugmentType {
    #[default]
    None,
    RpcInput,
    RpcOutput,
    Case,
    Data,
}

/// Kind-specific part of a schema node.
#[derive(Clone, Debug, PartialEq)]
pub enum ObjectDef {
    Anyxml(LeafDef),
    Container(ContainerDef),
    Leaf(LeafDef),
    LeafList(LeafListDef),
    List(ListDef),
    Choice(ChoiceDef),
    Case(CaseDef),
    Uses(Arc<UsesDef>),
    Refine(RefineDef),
    Augment(Arc<AugmentDef>),
    Rpc(RpcDef),
    RpcIo(RpcIoDef),
    Notification(NotifDef),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContainerDef {
    pub name: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub presence: Option<String>,
    pub status: Status,
    pub musts: Vec<Must>,
    pub typedefs: Arc<Vec<Typedef>>,
    pub groupings: Arc<Vec<Grouping>>,
    pub datadefs: Vec<NodeId>,
}

/// Payload shared by `leaf` and `anyxml`.
#[derive(Clone, Debug, PartialEq)]
pub struct LeafDef {
    pub name: String,
    pub units: Option<String>,
    pub default: Option<String>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub status: Status,
    pub typdef: Arc<TypeDef>,
    pub musts: Vec<Must>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LeafListDef {
    pub name: String,
    pub units: Option<String>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub status: Status,
    pub typdef: Arc<TypeDef>,
    pub ordersys: bool,
    pub min_elements: Option<u32>,
    pub max_elements: Option<u32>,
    pub musts: Vec<Must>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListDef {
    pub name: String,
    pub keystr: Option<String>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub status: Status,
    pub ordersys: bool,
    pub min_elements: Option<u32>,
    pub max_elements: Option<u32>,
    pub musts: Vec<Must>,
    pub keys: Vec<NodeId>,
    pub uniques: Vec<UniqueDef>,
    pub typedefs: Arc<Vec<Typedef>>,
    pub groupings: Arc<Vec<Grouping>>,
    pub datadefs: Vec<NodeId>,
}

/// One `unique` statement of a list.
#[derive(Clone, Debug, PartialEq)]
pub struct UniqueDef {
    pub xpath: String,
    pub components: Vec<NodeId>,
    pub isconfig: bool,
    pub tkerr: SourceLocation,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChoiceDef {
    pub name: String,
    pub default: Option<String>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub status: Status,
    pub cases: Vec<NodeId>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CaseDef {
    pub name: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub status: Status,
    /// Synthetic case created for a short-form case statement.
    pub nameclone: bool,
    pub datadefs: Vec<NodeId>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UsesDef {
    pub prefix: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub status: Status,
    pub grouping: Option<GroupingRef>,
    /// Refine and augment children.
    pub datadefs: Vec<NodeId>,
    pub expand_done: bool,
}

/// Refine statement. Each overridable field keeps the location of the
/// statement that set it, so an explicit zero is told apart from an unset
/// value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RefineDef {
    pub target: String,
    pub target_obj: Option<NodeId>,
    pub description: Option<String>,
    pub description_tkerr: Option<SourceLocation>,
    pub reference: Option<String>,
    pub reference_tkerr: Option<SourceLocation>,
    pub presence: Option<String>,
    pub presence_tkerr: Option<SourceLocation>,
    pub default: Option<String>,
    pub default_tkerr: Option<SourceLocation>,
    pub config_tkerr: Option<SourceLocation>,
    pub mandatory_tkerr: Option<SourceLocation>,
    pub min_elements: u32,
    pub min_elements_tkerr: Option<SourceLocation>,
    pub max_elements: u32,
    pub max_elements_tkerr: Option<SourceLocation>,
    pub musts: Vec<Must>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AugmentDef {
    pub target: String,
    pub target_obj: Option<NodeId>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub status: Status,
    pub augtype: AugmentType,
    pub datadefs: Vec<NodeId>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RpcDef {
    pub name: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub status: Status,
    pub typedefs: Arc<Vec<Typedef>>,
    pub groupings: Arc<Vec<Grouping>>,
    /// Input and output nodes.
    pub datadefs: Vec<NodeId>,
    pub supported: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RpcIoDef {
    pub name: String,
    pub typedefs: Arc<Vec<Typedef>>,
    pub groupings: Arc<Vec<Grouping>>,
    pub datadefs: Vec<NodeId>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NotifDef {
    pub name: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub status: Status,
    pub typedefs: Arc<Vec<Typedef>>,
    pub groupings: Arc<Vec<Grouping>>,
    pub datadefs: Vec<NodeId>,
}

/// A `grouping` statement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grouping {
    pub name: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub status: Status,
    pub typedefs: Vec<Typedef>,
    pub datadefs: Vec<NodeId>,
    pub tkerr: SourceLocation,
}

/// Owner of a grouping queue.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GroupingOwner {
    Module(ModuleId),
    Node(NodeId),
}

/// Location of a grouping inside its owner's queue.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GroupingRef {
    pub owner: GroupingOwner,
    pub index: usize,
}

/// An XML attribute definition attached to a node.
#[derive(Clone, Debug, PartialEq)]
pub struct Metadata {
    pub name: String,
    pub typdef: Arc<TypeDef>,
    pub tkerr: SourceLocation,
}

/// One schema node.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectTemplate {
    pub(crate) def: ObjectDef,
    pub(crate) flags: ObjectFlags,
    pub(crate) tkerr: SourceLocation,
    pub(crate) module: ModuleId,
    pub(crate) nsid: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) uses_obj: Option<NodeId>,
    pub(crate) aug_obj: Option<NodeId>,
    pub(crate) in_grouping: Option<GroupingRef>,
    pub(crate) when: Option<XPathExpr>,
    pub(crate) metadata: Vec<Metadata>,
    pub(crate) appinfo: Vec<AppInfo>,
    pub(crate) iffeatures: Vec<IfFeature>,
    pub(crate) inherited_iffeatures: Vec<IfFeature>,
    pub(crate) inherited_whens: Vec<XPathExpr>,
}

// ===== impl ObjectKind =====

impl ObjectKind {
    /// Decode a numeric kind code.
    pub fn try_from_code(code: u32) -> Result<ObjectKind> {
        ObjectKind::from_u32(code).ok_or_else(|| {
            Error::with_msg(
                ErrorCode::InternalValue,
                format!("invalid object kind {}", code),
            )
        })
    }

    /// Returns whether nodes of this kind carry a name.
    pub fn has_name(&self) -> bool {
        !matches!(
            self,
            ObjectKind::Uses | ObjectKind::Augment | ObjectKind::Refine
        )
    }

    /// Returns whether this is a real database node kind.
    pub fn is_data(&self) -> bool {
        matches!(
            self,
            ObjectKind::Anyxml
                | ObjectKind::Container
                | ObjectKind::Leaf
                | ObjectKind::LeafList
                | ObjectKind::List
        )
    }

    /// Returns whether this is a choice or case.
    pub fn is_choice_or_case(&self) -> bool {
        matches!(self, ObjectKind::Choice | ObjectKind::Case)
    }

    /// Returns whether this is an rpc or notification.
    pub fn is_rpc_or_notif(&self) -> bool {
        matches!(self, ObjectKind::Rpc | ObjectKind::Notification)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Anyxml => "anyxml",
            ObjectKind::Container => "container",
            ObjectKind::Leaf => "leaf",
            ObjectKind::LeafList => "leaf-list",
            ObjectKind::List => "list",
            ObjectKind::Choice => "choice",
            ObjectKind::Case => "case",
            ObjectKind::Uses => "uses",
            ObjectKind::Refine => "refine",
            ObjectKind::Augment => "augment",
            ObjectKind::Rpc => "rpc",
            ObjectKind::RpcIo => "rpc-io",
            ObjectKind::Notification => "notification",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ===== impl LeafDef =====

impl LeafDef {
    fn new(name: &str, basetype: BaseType) -> LeafDef {
        LeafDef {
            name: name.to_owned(),
            units: None,
            default: None,
            description: None,
            reference: None,
            status: Status::None,
            typdef: Arc::new(TypeDef::builtin(basetype)),
            musts: Vec::new(),
        }
    }
}

// ===== impl ObjectDef =====

impl ObjectDef {
    /// Allocate an empty payload of the given kind.
    ///
    /// `name` is the node name for named kinds, the grouping reference for
    /// `uses` and the target path for `augment` and `refine`.
    pub fn new(kind: ObjectKind, name: &str) -> ObjectDef {
        let name_owned = name.to_owned();
        match kind {
            ObjectKind::Anyxml => {
                ObjectDef::Anyxml(LeafDef::new(name, BaseType::Any))
            }
            ObjectKind::Container => ObjectDef::Container(ContainerDef {
                name: name_owned,
                ..Default::default()
            }),
            ObjectKind::Leaf => {
                ObjectDef::Leaf(LeafDef::new(name, BaseType::None))
            }
            ObjectKind::LeafList => ObjectDef::LeafList(LeafListDef {
                name: name_owned,
                units: None,
                description: None,
                reference: None,
                status: Status::None,
                typdef: Arc::new(TypeDef::builtin(BaseType::None)),
                ordersys: true,
                min_elements: None,
                max_elements: None,
                musts: Vec::new(),
            }),
            ObjectKind::List => ObjectDef::List(ListDef {
                name: name_owned,
                ordersys: true,
                ..Default::default()
            }),
            ObjectKind::Choice => ObjectDef::Choice(ChoiceDef {
                name: name_owned,
                ..Default::default()
            }),
            ObjectKind::Case => ObjectDef::Case(CaseDef {
                name: name_owned,
                ..Default::default()
            }),
            ObjectKind::Uses => {
                let (prefix, name) = crate::utils::split_qname(name);
                ObjectDef::Uses(Arc::new(UsesDef {
                    prefix: prefix.map(str::to_owned),
                    name: name.to_owned(),
                    ..Default::default()
                }))
            }
            ObjectKind::Refine => ObjectDef::Refine(RefineDef {
                target: name_owned,
                ..Default::default()
            }),
            ObjectKind::Augment => ObjectDef::Augment(Arc::new(AugmentDef {
                target: name_owned,
                ..Default::default()
            })),
            ObjectKind::Rpc => ObjectDef::Rpc(RpcDef {
                name: name_owned,
                supported: true,
                ..Default::default()
            }),
            ObjectKind::RpcIo => ObjectDef::RpcIo(RpcIoDef {
                name: name_owned,
                ..Default::default()
            }),
            ObjectKind::Notification => ObjectDef::Notification(NotifDef {
                name: name_owned,
                ..Default::default()
            }),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            ObjectDef::Anyxml(_) => ObjectKind::Anyxml,
            ObjectDef::Container(_) => ObjectKind::Container,
            ObjectDef::Leaf(_) => ObjectKind::Leaf,
            ObjectDef::LeafList(_) => ObjectKind::LeafList,
            ObjectDef::List(_) => ObjectKind::List,
            ObjectDef::Choice(_) => ObjectKind::Choice,
            ObjectDef::Case(_) => ObjectKind::Case,
            ObjectDef::Uses(_) => ObjectKind::Uses,
            ObjectDef::Refine(_) => ObjectKind::Refine,
            ObjectDef::Augment(_) => ObjectKind::Augment,
            ObjectDef::Rpc(_) => ObjectKind::Rpc,
            ObjectDef::RpcIo(_) => ObjectKind::RpcIo,
            ObjectDef::Notification(_) => ObjectKind::Notification,
        }
    }

    /// Node name; `None` for uses, augment and refine.
    pub fn name(&self) -> Option<&str> {
        match self {
            ObjectDef::Anyxml(def) | ObjectDef::Leaf(def) => Some(&def.name),
            ObjectDef::Container(def) => Some(&def.name),
            ObjectDef::LeafList(def) => Some(&def.name),
            ObjectDef::List(def) => Some(&def.name),
            ObjectDef::Choice(def) => Some(&def.name),
            ObjectDef::Case(def) => Some(&def.name),
            ObjectDef::Rpc(def) => Some(&def.name),
            ObjectDef::RpcIo(def) => Some(&def.name),
            ObjectDef::Notification(def) => Some(&def.name),
            ObjectDef::Uses(_)
            | ObjectDef::Refine(_)
            | ObjectDef::Augment(_) => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            ObjectDef::Anyxml(def) | ObjectDef::Leaf(def) => {
                def.description.as_deref()
            }
            ObjectDef::Container(def) => def.description.as_deref(),
            ObjectDef::LeafList(def) => def.description.as_deref(),
            ObjectDef::List(def) => def.description.as_deref(),
            ObjectDef::Choice(def) => def.description.as_deref(),
            ObjectDef::Case(def) => def.description.as_deref(),
            ObjectDef::Uses(def) => def.description.as_deref(),
            ObjectDef::Refine(def) => def.description.as_deref(),
            ObjectDef::Augment(def) => def.description.as_deref(),
            ObjectDef::Rpc(def) => def.description.as_deref(),
            ObjectDef::Notification(def) => def.description.as_deref(),
            ObjectDef::RpcIo(_) => None,
        }
    }

    pub fn reference(&self) -> Option<&str> {
        match self {
            ObjectDef::Anyxml(def) | ObjectDef::Leaf(def) => {
                def.reference.as_deref()
            }
            ObjectDef::Container(def) => def.reference.as_deref(),
            ObjectDef::LeafList(def) => def.reference.as_deref(),
            ObjectDef::List(def) => def.reference.as_deref(),
            ObjectDef::Choice(def) => def.reference.as_deref(),
            ObjectDef::Case(def) => def.reference.as_deref(),
            ObjectDef::Uses(def) => def.reference.as_deref(),
            ObjectDef::Refine(def) => def.reference.as_deref(),
            ObjectDef::Augment(def) => def.reference.as_deref(),
            ObjectDef::Rpc(def) => def.reference.as_deref(),
            ObjectDef::Notification(def) => def.reference.as_deref(),
            ObjectDef::RpcIo(_) => None,
        }
    }

    pub fn status(&self) -> Status {
        match self {
            ObjectDef::Anyxml(def) | ObjectDef::Leaf(def) => def.status,
            ObjectDef::Container(def) => def.status,
            ObjectDef::LeafList(def) => def.status,
            ObjectDef::List(def) => def.status,
            ObjectDef::Choice(def) => def.status,
            ObjectDef::Case(def) => def.status,
            ObjectDef::Uses(def) => def.status,
            ObjectDef::Augment(def) => def.status,
            ObjectDef::Rpc(def) => def.status,
            ObjectDef::Notification(def) => def.status,
            ObjectDef::Refine(_) | ObjectDef::RpcIo(_) => Status::None,
        }
    }

    /// Child queue. Choices return their case queue.
    pub fn datadefs(&self) -> &[NodeId] {
        match self {
            ObjectDef::Container(def) => &def.datadefs,
            ObjectDef::List(def) => &def.datadefs,
            ObjectDef::Choice(def) => &def.cases,
            ObjectDef::Case(def) => &def.datadefs,
            ObjectDef::Uses(def) => &def.datadefs,
            ObjectDef::Augment(def) => &def.datadefs,
            ObjectDef::Rpc(def) => &def.datadefs,
            ObjectDef::RpcIo(def) => &def.datadefs,
            ObjectDef::Notification(def) => &def.datadefs,
            ObjectDef::Anyxml(_)
            | ObjectDef::Leaf(_)
            | ObjectDef::LeafList(_)
            | ObjectDef::Refine(_) => &[],
        }
    }

    pub(crate) fn datadefs_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            ObjectDef::Container(def) => Some(&mut def.datadefs),
            ObjectDef::List(def) => Some(&mut def.datadefs),
            ObjectDef::Choice(def) => Some(&mut def.cases),
            ObjectDef::Case(def) => Some(&mut def.datadefs),
            ObjectDef::Uses(def) => Some(&mut Arc::make_mut(def).datadefs),
            ObjectDef::Augment(def) => {
                Some(&mut Arc::make_mut(def).datadefs)
            }
            ObjectDef::Rpc(def) => Some(&mut def.datadefs),
            ObjectDef::RpcIo(def) => Some(&mut def.datadefs),
            ObjectDef::Notification(def) => Some(&mut def.datadefs),
            ObjectDef::Anyxml(_)
            | ObjectDef::Leaf(_)
            | ObjectDef::LeafList(_)
            | ObjectDef::Refine(_) => None,
        }
    }

    /// Must statements; empty for kinds without them.
    pub fn musts(&self) -> &[Must] {
        match self {
            ObjectDef::Anyxml(def) | ObjectDef::Leaf(def) => &def.musts,
            ObjectDef::Container(def) => &def.musts,
            ObjectDef::LeafList(def) => &def.musts,
            ObjectDef::List(def) => &def.musts,
            ObjectDef::Refine(def) => &def.musts,
            _ => &[],
        }
    }

    pub(crate) fn musts_mut(&mut self) -> Option<&mut Vec<Must>> {
        match self {
            ObjectDef::Anyxml(def) | ObjectDef::Leaf(def) => {
                Some(&mut def.musts)
            }
            ObjectDef::Container(def) => Some(&mut def.musts),
            ObjectDef::LeafList(def) => Some(&mut def.musts),
            ObjectDef::List(def) => Some(&mut def.musts),
            ObjectDef::Refine(def) => Some(&mut def.musts),
            _ => None,
        }
    }

    /// Locally defined typedefs.
    pub fn typedefs(&self) -> &[Typedef] {
        match self {
            ObjectDef::Container(def) => &def.typedefs,
            ObjectDef::List(def) => &def.typedefs,
            ObjectDef::Rpc(def) => &def.typedefs,
            ObjectDef::RpcIo(def) => &def.typedefs,
            ObjectDef::Notification(def) => &def.typedefs,
            _ => &[],
        }
    }

    pub(crate) fn typedefs_mut(&mut self) -> Option<&mut Vec<Typedef>> {
        let typedefs = match self {
            ObjectDef::Container(def) => &mut def.typedefs,
            ObjectDef::List(def) => &mut def.typedefs,
            ObjectDef::Rpc(def) => &mut def.typedefs,
            ObjectDef::RpcIo(def) => &mut def.typedefs,
            ObjectDef::Notification(def) => &mut def.typedefs,
            _ => return None,
        };
        Some(Arc::make_mut(typedefs))
    }

    /// Locally defined groupings.
    pub fn groupings(&self) -> &[Grouping] {
        match self {
            ObjectDef::Container(def) => &def.groupings,
            ObjectDef::List(def) => &def.groupings,
            ObjectDef::Rpc(def) => &def.groupings,
            ObjectDef::RpcIo(def) => &def.groupings,
            ObjectDef::Notification(def) => &def.groupings,
            _ => &[],
        }
    }

    pub(crate) fn groupings_mut(&mut self) -> Option<&mut Vec<Grouping>> {
        let groupings = match self {
            ObjectDef::Container(def) => &mut def.groupings,
            ObjectDef::List(def) => &mut def.groupings,
            ObjectDef::Rpc(def) => &mut def.groupings,
            ObjectDef::RpcIo(def) => &mut def.groupings,
            ObjectDef::Notification(def) => &mut def.groupings,
            _ => return None,
        };
        Some(Arc::make_mut(groupings))
    }

    /// Type definition of a leaf, leaf-list or anyxml.
    pub fn typdef(&self) -> Option<&Arc<TypeDef>> {
        match self {
            ObjectDef::Anyxml(def) | ObjectDef::Leaf(def) => Some(&def.typdef),
            ObjectDef::LeafList(def) => Some(&def.typdef),
            _ => None,
        }
    }

    pub fn presence(&self) -> Option<&str> {
        match self {
            ObjectDef::Container(def) => def.presence.as_deref(),
            ObjectDef::Refine(def) => def.presence.as_deref(),
            _ => None,
        }
    }

    /// Default value of a leaf, or default case of a choice.
    pub fn default(&self) -> Option<&str> {
        match self {
            ObjectDef::Leaf(def) => def.default.as_deref(),
            ObjectDef::Choice(def) => def.default.as_deref(),
            ObjectDef::Refine(def) => def.default.as_deref(),
            _ => None,
        }
    }

    pub fn units(&self) -> Option<&str> {
        match self {
            ObjectDef::Leaf(def) => def.units.as_deref(),
            ObjectDef::LeafList(def) => def.units.as_deref(),
            _ => None,
        }
    }

    pub fn min_elements(&self) -> Option<u32> {
        match self {
            ObjectDef::LeafList(def) => def.min_elements,
            ObjectDef::List(def) => def.min_elements,
            ObjectDef::Refine(def) => {
                def.min_elements_tkerr.map(|_| def.min_elements)
            }
            _ => None,
        }
    }

    pub fn max_elements(&self) -> Option<u32> {
        match self {
            ObjectDef::LeafList(def) => def.max_elements,
            ObjectDef::List(def) => def.max_elements,
            ObjectDef::Refine(def) => {
                def.max_elements_tkerr.map(|_| def.max_elements)
            }
            _ => None,
        }
    }
}

// ===== impl ObjectTemplate =====

impl ObjectTemplate {
    pub(crate) fn new(
        kind: ObjectKind,
        name: &str,
        module: ModuleId,
        nsid: u32,
    ) -> ObjectTemplate {
        ObjectTemplate {
            def: ObjectDef::new(kind, name),
            flags: ObjectFlags::empty(),
            tkerr: SourceLocation {
                module: Some(module),
                ..Default::default()
            },
            module,
            nsid,
            parent: None,
            uses_obj: None,
            aug_obj: None,
            in_grouping: None,
            when: None,
            metadata: Vec::new(),
            appinfo: Vec::new(),
            iffeatures: Vec::new(),
            inherited_iffeatures: Vec::new(),
            inherited_whens: Vec::new(),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.def.kind()
    }

    pub fn def(&self) -> &ObjectDef {
        &self.def
    }

    pub fn flags(&self) -> ObjectFlags {
        self.flags
    }

    pub fn tkerr(&self) -> SourceLocation {
        self.tkerr
    }

    pub fn module(&self) -> ModuleId {
        self.module
    }

    pub fn nsid(&self) -> u32 {
        self.nsid
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn when(&self) -> Option<&XPathExpr> {
        self.when.as_ref()
    }

    pub fn appinfo(&self) -> &[AppInfo] {
        &self.appinfo
    }

    pub fn iffeatures(&self) -> &[IfFeature] {
        &self.iffeatures
    }

    pub fn metadata(&self) -> &[Metadata] {
        &self.metadata
    }

    fn unsupported(&self, field: &str) -> Error {
        Error::with_msg(
            ErrorCode::InternalValue,
            format!("{} has no {} field", self.kind(), field),
        )
    }

    /// Set the source location of the statement.
    pub fn set_location(&mut self, line: u32, column: u32) {
        self.tkerr.line = line;
        self.tkerr.column = column;
    }

    pub fn set_description(&mut self, value: &str) -> Result<()> {
        let tkerr = self.tkerr;
        let value = Some(value.to_owned());
        match &mut self.def {
            ObjectDef::Anyxml(def) | ObjectDef::Leaf(def) => {
                def.description = value
            }
            ObjectDef::Container(def) => def.description = value,
            ObjectDef::LeafList(def) => def.description = value,
            ObjectDef::List(def) => def.description = value,
            ObjectDef::Choice(def) => def.description = value,
            ObjectDef::Case(def) => def.description = value,
            ObjectDef::Uses(def) => Arc::make_mut(def).description = value,
            ObjectDef::Augment(def) => {
                Arc::make_mut(def).description = value
            }
            ObjectDef::Rpc(def) => def.description = value,
            ObjectDef::Notification(def) => def.description = value,
            ObjectDef::Refine(def) => {
                def.description = value;
                def.description_tkerr = Some(tkerr);
            }
            ObjectDef::RpcIo(_) => return Err(self.unsupported("description")),
        }
        Ok(())
    }

    pub fn set_reference(&mut self, value: &str) -> Result<()> {
        let tkerr = self.tkerr;
        let value = Some(value.to_owned());
        match &mut self.def {
            ObjectDef::Anyxml(def) | ObjectDef::Leaf(def) => {
                def.reference = value
            }
            ObjectDef::Container(def) => def.reference = value,
            ObjectDef::LeafList(def) => def.reference = value,
            ObjectDef::List(def) => def.reference = value,
            ObjectDef::Choice(def) => def.reference = value,
            ObjectDef::Case(def) => def.reference = value,
            ObjectDef::Uses(def) => Arc::make_mut(def).reference = value,
            ObjectDef::Augment(def) => Arc::make_mut(def).reference = value,
            ObjectDef::Rpc(def) => def.reference = value,
            ObjectDef::Notification(def) => def.reference = value,
            ObjectDef::Refine(def) => {
                def.reference = value;
                def.reference_tkerr = Some(tkerr);
            }
            ObjectDef::RpcIo(_) => return Err(self.unsupported("reference")),
        }
        Ok(())
    }

    pub fn set_presence(&mut self, value: &str) -> Result<()> {
        let tkerr = self.tkerr;
        match &mut self.def {
            ObjectDef::Container(def) => def.presence = Some(value.to_owned()),
            ObjectDef::Refine(def) => {
                def.presence = Some(value.to_owned());
                def.presence_tkerr = Some(tkerr);
            }
            _ => return Err(self.unsupported("presence")),
        }
        Ok(())
    }

    /// Set the default value of a leaf or the default case of a choice.
    pub fn set_default(&mut self, value: &str) -> Result<()> {
        let tkerr = self.tkerr;
        match &mut self.def {
            ObjectDef::Leaf(def) => def.default = Some(value.to_owned()),
            ObjectDef::Choice(def) => def.default = Some(value.to_owned()),
            ObjectDef::Refine(def) => {
                def.default = Some(value.to_owned());
                def.default_tkerr = Some(tkerr);
            }
            _ => return Err(self.unsupported("default")),
        }
        Ok(())
    }

    pub fn set_units(&mut self, value: &str) -> Result<()> {
        match &mut self.def {
            ObjectDef::Leaf(def) => def.units = Some(value.to_owned()),
            ObjectDef::LeafList(def) => def.units = Some(value.to_owned()),
            _ => return Err(self.unsupported("units")),
        }
        Ok(())
    }

    pub fn set_status(&mut self, status: Status) -> Result<()> {
        match &mut self.def {
            ObjectDef::Anyxml(def) | ObjectDef::Leaf(def) => {
                def.status = status
            }
            ObjectDef::Container(def) => def.status = status,
            ObjectDef::LeafList(def) => def.status = status,
            ObjectDef::List(def) => def.status = status,
            ObjectDef::Choice(def) => def.status = status,
            ObjectDef::Case(def) => def.status = status,
            ObjectDef::Uses(def) => Arc::make_mut(def).status = status,
            ObjectDef::Augment(def) => Arc::make_mut(def).status = status,
            ObjectDef::Rpc(def) => def.status = status,
            ObjectDef::Notification(def) => def.status = status,
            ObjectDef::Refine(_) | ObjectDef::RpcIo(_) => {
                return Err(self.unsupported("status"))
            }
        }
        Ok(())
    }

    /// Set the type of a leaf or leaf-list.
    pub fn set_type(&mut self, typdef: TypeDef) -> Result<()> {
        match &mut self.def {
            ObjectDef::Leaf(def) => def.typdef = Arc::new(typdef),
            ObjectDef::LeafList(def) => def.typdef = Arc::new(typdef),
            _ => return Err(self.unsupported("type")),
        }
        Ok(())
    }

    pub fn set_keystr(&mut self, value: &str) -> Result<()> {
        match &mut self.def {
            ObjectDef::List(def) => def.keystr = Some(value.to_owned()),
            _ => return Err(self.unsupported("key")),
        }
        Ok(())
    }

    /// Add a `unique` statement; components are resolved by
    /// [`Context::resolve_list`](crate::context::Context::resolve_list).
    pub fn add_unique(&mut self, xpath: &str) -> Result<()> {
        let tkerr = self.tkerr;
        match &mut self.def {
            ObjectDef::List(def) => def.uniques.push(UniqueDef {
                xpath: xpath.to_owned(),
                components: Vec::new(),
                isconfig: false,
                tkerr,
            }),
            _ => return Err(self.unsupported("unique")),
        }
        Ok(())
    }

    pub fn set_min_elements(&mut self, value: u32) -> Result<()> {
        let tkerr = self.tkerr;
        match &mut self.def {
            ObjectDef::LeafList(def) => def.min_elements = Some(value),
            ObjectDef::List(def) => def.min_elements = Some(value),
            ObjectDef::Refine(def) => {
                def.min_elements = value;
                def.min_elements_tkerr = Some(tkerr);
            }
            _ => return Err(self.unsupported("min-elements")),
        }
        Ok(())
    }

    pub fn set_max_elements(&mut self, value: u32) -> Result<()> {
        let tkerr = self.tkerr;
        match &mut self.def {
            ObjectDef::LeafList(def) => def.max_elements = Some(value),
            ObjectDef::List(def) => def.max_elements = Some(value),
            ObjectDef::Refine(def) => {
                def.max_elements = value;
                def.max_elements_tkerr = Some(tkerr);
            }
            _ => return Err(self.unsupported("max-elements")),
        }
        Ok(())
    }

    /// Set `ordered-by user` (`true`) or `ordered-by system` (`false`).
    pub fn set_ordered_by_user(&mut self, user: bool) -> Result<()> {
        match &mut self.def {
            ObjectDef::LeafList(def) => def.ordersys = !user,
            ObjectDef::List(def) => def.ordersys = !user,
            _ => return Err(self.unsupported("ordered-by")),
        }
        Ok(())
    }

    /// Record an explicit `config` statement.
    pub fn set_config(&mut self, config: bool) -> Result<()> {
        match &mut self.def {
            ObjectDef::Uses(_)
            | ObjectDef::Augment(_)
            | ObjectDef::Case(_)
            | ObjectDef::Rpc(_)
            | ObjectDef::RpcIo(_)
            | ObjectDef::Notification(_) => {
                return Err(self.unsupported("config"))
            }
            ObjectDef::Refine(def) => def.config_tkerr = Some(self.tkerr),
            _ => (),
        }
        self.flags.insert(ObjectFlags::CONFSET);
        self.flags.set(ObjectFlags::CONFIG, config);
        Ok(())
    }

    /// Record an explicit `mandatory` statement.
    pub fn set_mandatory(&mut self, mandatory: bool) -> Result<()> {
        match &mut self.def {
            ObjectDef::Anyxml(_)
            | ObjectDef::Leaf(_)
            | ObjectDef::Choice(_) => (),
            ObjectDef::Refine(def) => def.mandatory_tkerr = Some(self.tkerr),
            _ => return Err(self.unsupported("mandatory")),
        }
        self.flags.insert(ObjectFlags::MANDSET);
        self.flags.set(ObjectFlags::MANDATORY, mandatory);
        Ok(())
    }

    pub fn add_must(&mut self, must: Must) -> Result<()> {
        match self.def.musts_mut() {
            Some(musts) => {
                musts.push(must);
                Ok(())
            }
            None => Err(self.unsupported("must")),
        }
    }

    pub fn set_when(&mut self, when: XPathExpr) {
        self.when = Some(when);
        self.flags.insert(ObjectFlags::CONDITIONAL);
    }

    pub fn add_appinfo(&mut self, appinfo: AppInfo) {
        self.appinfo.push(appinfo);
    }

    /// Mark an rpc as implemented (`true`) or only loaded (`false`).
    pub fn set_supported(&mut self, supported: bool) -> Result<()> {
        match &mut self.def {
            ObjectDef::Rpc(def) => def.supported = supported,
            _ => return Err(self.unsupported("supported")),
        }
        Ok(())
    }

    pub fn set_augment_type(&mut self, augtype: AugmentType) -> Result<()> {
        match &mut self.def {
            ObjectDef::Augment(def) => Arc::make_mut(def).augtype = augtype,
            _ => return Err(self.unsupported("augment type")),
        }
        Ok(())
    }

    pub fn set_flag(&mut self, flag: ObjectFlags, value: bool) {
        self.flags.set(flag, value);
    }

    /// Replace the payload of a leaf or leaf-list type reference once the
    /// named type has been resolved.
    pub(crate) fn set_resolved_type(&mut self, typdef: Arc<TypeDef>) {
        match &mut self.def {
            ObjectDef::Leaf(def) | ObjectDef::Anyxml(def) => {
                def.typdef = typdef
            }
            ObjectDef::LeafList(def) => def.typdef = typdef,
            _ => (),
        }
    }
}
