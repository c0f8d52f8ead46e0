//
// Copyright (c) The yang-schema Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Module and submodule records.

use std::sync::{Arc, OnceLock};

use crate::feature::Feature;
use crate::list::ValueList;
use crate::object::Grouping;
use crate::types::{
    AppInfo, BaseType, ModuleId, NodeId, SourceLocation, Typedef,
};

/// One YANG module or submodule.
///
/// Descriptive statements are plain fields; the structural queues are only
/// changed through the [`Context`](crate::context::Context) so that node
/// links stay consistent.
#[derive(Debug)]
pub struct ModuleData {
    pub name: String,
    pub revision: Option<String>,
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub xmlprefix: Option<String>,
    pub organization: Option<String>,
    pub contact: Option<String>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub source: Option<String>,
    pub belongs_to: Option<String>,
    pub appinfo: Vec<AppInfo>,
    pub(crate) is_module: bool,
    pub(crate) nsid: u32,
    pub(crate) parent: Option<ModuleId>,
    pub(crate) imports: Vec<Import>,
    pub(crate) includes: Vec<Include>,
    pub(crate) typedefs: Arc<Vec<Typedef>>,
    pub(crate) groupings: Arc<Vec<Grouping>>,
    pub(crate) datadefs: Vec<NodeId>,
    pub(crate) features: Vec<Feature>,
    pub(crate) deviations: ValueList,
    /// Uses and augment nodes taken out of the tree after expansion.
    pub(crate) retired: Vec<NodeId>,
}

/// An `import` statement.
#[derive(Clone, Debug, PartialEq)]
pub struct Import {
    pub module: String,
    pub prefix: String,
    pub revision: Option<String>,
    pub tkerr: SourceLocation,
}

/// An `include` statement.
///
/// The submodule is looked up in the context registry the first time it is
/// needed.
#[derive(Debug)]
pub struct Include {
    pub submodule: String,
    pub revision: Option<String>,
    pub tkerr: SourceLocation,
    pub(crate) resolved: OnceLock<ModuleId>,
}

// ===== impl ModuleData =====

impl ModuleData {
    pub(crate) fn new(name: &str, is_module: bool, nsid: u32) -> ModuleData {
        ModuleData {
            name: name.to_owned(),
            revision: None,
            namespace: None,
            prefix: None,
            xmlprefix: None,
            organization: None,
            contact: None,
            description: None,
            reference: None,
            source: None,
            belongs_to: None,
            appinfo: Vec::new(),
            is_module,
            nsid,
            parent: None,
            imports: Vec::new(),
            includes: Vec::new(),
            typedefs: Arc::new(Vec::new()),
            groupings: Arc::new(Vec::new()),
            datadefs: Vec::new(),
            features: Vec::new(),
            deviations: ValueList::new(BaseType::String),
            retired: Vec::new(),
        }
    }

    /// Prefix used to qualify names in XPath expressions.
    pub fn xpath_prefix(&self) -> Option<&str> {
        self.xmlprefix.as_deref().or(self.prefix.as_deref())
    }

    /// Add an `import` statement.
    pub fn add_import(
        &mut self,
        module: &str,
        prefix: &str,
        revision: Option<&str>,
    ) {
        self.imports.push(Import {
            module: module.to_owned(),
            prefix: prefix.to_owned(),
            revision: revision.map(str::to_owned),
            tkerr: SourceLocation::default(),
        });
    }

    /// Add an `include` statement.
    pub fn add_include(&mut self, submodule: &str, revision: Option<&str>) {
        self.includes.push(Include {
            submodule: submodule.to_owned(),
            revision: revision.map(str::to_owned),
            tkerr: SourceLocation::default(),
            resolved: OnceLock::new(),
        });
    }

    /// Add a module named in a `deviation` statement targeting this module.
    pub fn add_deviation(&mut self, module: &str) {
        if !self.deviations.contains_str(module) {
            self.deviations.push_str(module);
        }
    }

    pub fn add_typedef(&mut self, typedef: Typedef) {
        Arc::make_mut(&mut self.typedefs).push(typedef);
    }

    pub(crate) fn find_import_by_prefix(
        &self,
        prefix: &str,
    ) -> Option<&Import> {
        self.imports.iter().find(|imp| imp.prefix == prefix)
    }

    /// Returns whether `prefix` refers to this module itself.
    pub(crate) fn is_own_prefix(&self, prefix: Option<&str>) -> bool {
        match prefix {
            None => true,
            Some(prefix) => self.prefix.as_deref() == Some(prefix),
        }
    }
}

// ===== impl Include =====

impl Include {
    pub fn submodule_id(&self) -> Option<ModuleId> {
        self.resolved.get().copied()
    }
}
