//
// Copyright (c) The yang-schema Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! In-memory object model for compiled YANG schemas.
//!
//! A [`Context`] owns every loaded module and every schema node. A statement
//! parser builds the tree through the context's construction primitives;
//! afterwards the tree is queried through borrowed [`SchemaModule`] and
//! [`SchemaNode`] handles.
//!
//! ## Features
//! * Schema node templates for every YANG data-definition statement, stored
//!   in an arena and addressed by [`NodeId`]
//! * Grouping expansion (`uses` with `refine` and nested `augment`) and
//!   top-level `augment` expansion through subtree cloning
//! * Name resolution that sees through `choice` and `case` layers, with
//!   exact, case-insensitive and partial matching policies
//! * Evaluation of effective `config`, `mandatory`, access and `if-feature`
//!   state
//! * XPath-style and identifier-style object identifiers
//! * NETCONF capability URIs
//!
//! ## Logging
//! Diagnostics go through the [`log`] facade under the `yang-schema`
//! target, or to a callback installed with
//! [`Context::set_log_callback`].
//!
//! ## Examples
//!
//! See `demos/schema_iteration.rs`.

mod error;

pub mod clone;
pub mod context;
pub mod feature;
pub mod find;
pub mod iter;
pub mod list;
pub mod logging;
pub mod module;
pub mod object;
pub mod object_id;
pub mod schema;
pub mod types;
pub mod utils;

pub use crate::context::{Context, ContextFlags};
pub use crate::error::{Error, ErrorCode, Result};
pub use crate::find::{FindOptions, MatchMode};
pub use crate::object::{ObjectDef, ObjectFlags, ObjectKind};
pub use crate::object_id::{IdStyle, ObjectIdOptions, Qualify};
pub use crate::schema::{SchemaModule, SchemaNode};
pub use crate::types::{ModuleId, NodeId};
