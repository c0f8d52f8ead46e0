//
// Copyright (c) The yang-schema Core Contributors
//
// See LICENSE for license details.
//

//! YANG context.

use std::sync::Arc;

use bitflags::bitflags;
use log::Level;

use crate::error::{Error, ErrorCode, Result};
use crate::feature::{Feature, FeatureConfig, FeatureRef, IfFeature};
use crate::iter::SchemaModules;
use crate::logging::{self, LogCallback, LoggingCallbackAlreadySet};
use crate::module::ModuleData;
use crate::object::{
    CaseDef, Grouping, GroupingOwner, GroupingRef, Metadata, ObjectDef,
    ObjectFlags, ObjectKind, ObjectTemplate,
};
use crate::schema::{SchemaModule, SchemaNode};
use crate::types::{
    BaseType, ModuleId, NodeId, SourceLocation, TypeDef, Typedef,
};
use crate::utils::{split_qname, Binding};

/// Context of the YANG schemas.
///
/// The context owns every module and every schema node. Nodes are stored in
/// an arena and addressed by [`NodeId`]; identifiers of deleted nodes are
/// never reused.
#[derive(Debug)]
pub struct Context {
    flags: ContextFlags,
    features: FeatureConfig,
    next_nsid: u32,
    pub(crate) modules: Vec<Option<ModuleData>>,
    pub(crate) nodes: Vec<Option<ObjectTemplate>>,
}

bitflags! {
    /// Options to change context behavior.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct ContextFlags: u16 {
        /// Features start disabled unless an enable entry says otherwise.
        const DISABLE_FEATURES = 0x01;

        /// Report duplicate clones discarded during uses and augment
        /// expansion at debug level instead of warning level.
        const QUIET_DUPLICATES = 0x02;
    }
}

/// Scope in which typedefs and groupings are looked up.
#[derive(Clone, Copy, Debug)]
enum Scope {
    Node(NodeId),
    Module(ModuleId),
}

impl Context {
    /// Create an empty context.
    pub fn new(options: ContextFlags) -> Context {
        Context {
            flags: options,
            features: FeatureConfig::new(
                !options.contains(ContextFlags::DISABLE_FEATURES),
            ),
            next_nsid: 1,
            modules: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Get the currently set context's options.
    pub fn get_options(&self) -> ContextFlags {
        self.flags
    }

    /// Set some of the context's options.
    pub fn set_options(&mut self, options: ContextFlags) {
        self.flags.insert(options);
    }

    /// Unset some of the context's options.
    pub fn unset_options(&mut self, options: ContextFlags) {
        self.flags.remove(options);
    }

    /// Feature enable configuration.
    pub fn feature_config(&self) -> &FeatureConfig {
        &self.features
    }

    /// Feature enable configuration. Changes apply to features added
    /// afterwards.
    pub fn feature_config_mut(&mut self) -> &mut FeatureConfig {
        &mut self.features
    }

    /// Set the log level to trace.
    pub fn set_log_level_trace() {
        logging::set_log_level_trace();
    }

    /// Set the log level to debug.
    pub fn set_log_level_debug() {
        logging::set_log_level_debug();
    }

    /// Set the log level to warn.
    pub fn set_log_level_warn() {
        logging::set_log_level_warn();
    }

    /// Set the log level to error.
    pub fn set_log_level_error() {
        logging::set_log_level_error();
    }

    /// Install a process-wide sink for schema diagnostics.
    pub fn set_log_callback<C: LogCallback>(
        callback: C,
    ) -> std::result::Result<(), LoggingCallbackAlreadySet> {
        logging::init_logger(callback)
    }

    // ----- modules -----

    /// Register a new main module.
    ///
    /// Fails with `EntryExists` if a module with the same name and revision
    /// is already registered.
    pub fn add_module(
        &mut self,
        name: &str,
        revision: Option<&str>,
    ) -> Result<ModuleId> {
        self.check_module_unique(name, revision)?;

        let nsid = self.next_nsid;
        self.next_nsid += 1;
        let mut module = ModuleData::new(name, true, nsid);
        module.revision = revision.map(str::to_owned);
        Ok(self.push_module(module))
    }

    /// Register a submodule belonging to `main`.
    pub fn add_submodule(
        &mut self,
        name: &str,
        revision: Option<&str>,
        main: ModuleId,
    ) -> Result<ModuleId> {
        self.check_module_unique(name, revision)?;

        let parent = self.module_data(main)?;
        let mut module = ModuleData::new(name, false, parent.nsid);
        module.revision = revision.map(str::to_owned);
        module.belongs_to = Some(parent.name.clone());
        module.namespace = parent.namespace.clone();
        module.prefix = parent.prefix.clone();
        module.xmlprefix = parent.xmlprefix.clone();
        module.parent = Some(main);
        Ok(self.push_module(module))
    }

    fn check_module_unique(
        &self,
        name: &str,
        revision: Option<&str>,
    ) -> Result<()> {
        let exists = self.modules.iter().flatten().any(|module| {
            module.name == name && module.revision.as_deref() == revision
        });
        if exists {
            return Err(Error::with_msg(
                ErrorCode::EntryExists,
                format!("module '{}' already exists", name),
            ));
        }
        Ok(())
    }

    fn push_module(&mut self, module: ModuleData) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(Some(module));
        id
    }

    pub(crate) fn module_data(&self, id: ModuleId) -> Result<&ModuleData> {
        self.modules
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| {
                Error::with_msg(
                    ErrorCode::InternalPointer,
                    format!("invalid module id {}", id.0),
                )
            })
    }

    /// Mutable access to a module's descriptive statements and its import,
    /// include and deviation lists.
    pub fn module_mut(&mut self, id: ModuleId) -> Result<&mut ModuleData> {
        self.modules
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| {
                Error::with_msg(
                    ErrorCode::InternalPointer,
                    format!("invalid module id {}", id.0),
                )
            })
    }

    /// Get a module or submodule handle.
    pub fn module(&self, id: ModuleId) -> Result<SchemaModule<'_>> {
        let _ = self.module_data(id)?;
        SchemaModule::from_id(self, id).ok_or_else(|| {
            Error::new(ErrorCode::InternalPointer)
        })
    }

    /// Get YANG module of the given name and revision.
    ///
    /// If the revision is not specified, the latest revision is returned.
    pub fn get_module(
        &self,
        name: &str,
        revision: Option<&str>,
    ) -> Option<SchemaModule<'_>> {
        let id = self.find_module_id(name, revision, true)?;
        SchemaModule::from_id(self, id)
    }

    /// Get a submodule of the given name and revision.
    pub fn get_submodule(
        &self,
        name: &str,
        revision: Option<&str>,
    ) -> Option<SchemaModule<'_>> {
        let id = self.find_module_id(name, revision, false)?;
        SchemaModule::from_id(self, id)
    }

    pub(crate) fn find_module_id(
        &self,
        name: &str,
        revision: Option<&str>,
        is_module: bool,
    ) -> Option<ModuleId> {
        let candidates = self
            .modules
            .iter()
            .enumerate()
            .filter_map(|(idx, module)| {
                module.as_ref().map(|module| (ModuleId(idx as u32), module))
            })
            .filter(|(_, module)| {
                module.name == name && module.is_module == is_module
            });

        match revision {
            Some(revision) => candidates
                .filter(|(_, module)| {
                    module.revision.as_deref() == Some(revision)
                })
                .map(|(id, _)| id)
                .next(),
            None => candidates
                .max_by(|(_, a), (_, b)| a.revision.cmp(&b.revision))
                .map(|(id, _)| id),
        }
    }

    /// Get list of registered modules and submodules.
    pub fn modules(&self) -> SchemaModules<'_> {
        SchemaModules::new(self)
    }

    /// Returns an iterator over all data nodes from all modules in the
    /// context (depth-first search algorithm).
    pub fn traverse(&self) -> impl Iterator<Item = SchemaNode<'_>> {
        self.modules()
            .flat_map(|module| module.data())
            .flat_map(|snode| snode.traverse())
    }

    /// Remove a module and free every node it owns.
    ///
    /// Clones other modules placed under the module's nodes (augments into
    /// its tree) are freed with it. Freed ids are never reused.
    pub fn remove_module(&mut self, id: ModuleId) -> Result<()> {
        let _ = self.module_data(id)?;

        let mut owned: Vec<NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| match slot {
                Some(obj) if obj.module == id => Some(NodeId(idx as u32)),
                _ => None,
            })
            .collect();

        // Foreign children linked under a removed node.
        let mut stack = owned.clone();
        while let Some(node) = stack.pop() {
            let Some(obj) = self.template_opt(node) else {
                continue;
            };
            for child in obj.def.datadefs() {
                let Some(cobj) = self.template_opt(*child) else {
                    continue;
                };
                if cobj.module != id && cobj.parent == Some(node) {
                    owned.push(*child);
                    stack.push(*child);
                }
            }
        }

        // Unlink from surviving parents first.
        for node in &owned {
            let parent = match self.template_opt(*node) {
                Some(obj) => obj.parent,
                None => continue,
            };
            if let Some(parent) = parent {
                if let Some(pobj) = self.template_opt(parent) {
                    if pobj.module != id {
                        self.unlink(*node)?;
                    }
                }
            }
        }
        for node in owned {
            self.nodes[node.0 as usize] = None;
        }
        self.modules[id.0 as usize] = None;

        Ok(())
    }

    // ----- nodes -----

    pub(crate) fn template(&self, id: NodeId) -> Result<&ObjectTemplate> {
        self.template_opt(id).ok_or_else(|| stale_node(id))
    }

    pub(crate) fn template_opt(&self, id: NodeId) -> Option<&ObjectTemplate> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Mutable access to a node's statements.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut ObjectTemplate> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| stale_node(id))
    }

    /// Get a schema node handle.
    pub fn node(&self, id: NodeId) -> Result<SchemaNode<'_>> {
        SchemaNode::from_id(self, id).ok_or_else(|| stale_node(id))
    }

    pub(crate) fn alloc(&mut self, obj: ObjectTemplate) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(obj));
        id
    }

    /// Create a detached node of the given kind owned by `module`.
    ///
    /// `name` is the node name for named kinds, the grouping reference for
    /// `uses` and the target for `augment` and `refine`.
    pub fn new_node(
        &mut self,
        module: ModuleId,
        kind: ObjectKind,
        name: &str,
    ) -> Result<NodeId> {
        let nsid = self.module_data(module)?.nsid;
        Ok(self.alloc(ObjectTemplate::new(kind, name, module, nsid)))
    }

    /// Create a detached node from a numeric kind code.
    pub fn new_node_code(
        &mut self,
        module: ModuleId,
        code: u32,
        name: &str,
    ) -> Result<NodeId> {
        let kind = ObjectKind::try_from_code(code)?;
        self.new_node(module, kind, name)
    }

    /// Returns whether `queue` already holds a named node clashing with
    /// `name` in namespace `nsid`.
    pub(crate) fn queue_has_name(
        &self,
        queue: &[NodeId],
        name: &str,
        nsid: u32,
    ) -> bool {
        queue.iter().filter_map(|id| self.template_opt(*id)).any(|obj| {
            obj.nsid == nsid && obj.def.name() == Some(name)
        })
    }

    /// Append `child` to the kind-appropriate child queue of `parent`.
    ///
    /// A data node added directly to a choice is wrapped in a synthetic
    /// case carrying the child's name.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let pobj = self.template(parent)?;
        let pkind = pobj.kind();
        let in_grouping = pobj.in_grouping;
        let cobj = self.template(child)?;
        let ckind = cobj.kind();

        if pkind == ObjectKind::Choice
            && !matches!(
                ckind,
                ObjectKind::Case | ObjectKind::Uses | ObjectKind::Augment
            )
        {
            let case = self.new_short_case(child)?;
            if let Err(error) = self.link_child(case, child, in_grouping) {
                self.free_subtree(case);
                return Err(error);
            }
            if let Err(error) = self.link_child(parent, case, in_grouping) {
                self.unlink(child)?;
                self.free_subtree(case);
                return Err(error);
            }
            return Ok(());
        }

        self.link_child(parent, child, in_grouping)
    }

    /// Create the synthetic case wrapping a short-form case child.
    pub(crate) fn new_short_case(&mut self, child: NodeId) -> Result<NodeId> {
        let cobj = self.template(child)?;
        let name = cobj.def.name().unwrap_or_default().to_owned();
        let mut case = ObjectTemplate::new(
            ObjectKind::Case,
            &name,
            cobj.module,
            cobj.nsid,
        );
        case.tkerr = cobj.tkerr;
        case.flags = cobj.flags
            & (ObjectFlags::CLONE | ObjectFlags::AUGCLONE);
        case.def = ObjectDef::Case(CaseDef {
            name,
            status: cobj.def.status(),
            nameclone: true,
            ..Default::default()
        });
        Ok(self.alloc(case))
    }

    pub(crate) fn link_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        in_grouping: Option<GroupingRef>,
    ) -> Result<()> {
        let cobj = self.template(child)?;
        let (name, nsid) = (cobj.def.name().map(str::to_owned), cobj.nsid);

        let pobj = self.template(parent)?;
        if let Some(name) = &name {
            if self.queue_has_name(pobj.def.datadefs(), name, nsid) {
                return Err(Error::with_msg(
                    ErrorCode::EntryExists,
                    format!("duplicate child '{}'", name),
                ));
            }
        }

        let pobj = self.node_mut(parent)?;
        let kind = pobj.kind();
        match pobj.def.datadefs_mut() {
            Some(queue) => queue.push(child),
            None => {
                return Err(Error::with_msg(
                    ErrorCode::InternalValue,
                    format!("{} cannot have child nodes", kind),
                ))
            }
        }

        let cobj = self.node_mut(child)?;
        cobj.parent = Some(parent);
        cobj.in_grouping = in_grouping;
        Ok(())
    }

    /// Append `node` to the top-level queue of `module`.
    pub fn add_top_node(
        &mut self,
        module: ModuleId,
        node: NodeId,
    ) -> Result<()> {
        let obj = self.template(node)?;
        let (name, nsid) = (obj.def.name().map(str::to_owned), obj.nsid);
        let mdata = self.module_data(module)?;
        if let Some(name) = &name {
            if self.queue_has_name(&mdata.datadefs, name, nsid) {
                return Err(Error::with_msg(
                    ErrorCode::EntryExists,
                    format!("duplicate top-level node '{}'", name),
                ));
            }
        }

        self.module_mut(module)?.datadefs.push(node);
        let obj = self.node_mut(node)?;
        obj.parent = None;
        obj.flags.insert(ObjectFlags::TOP);
        Ok(())
    }

    /// Remove a node from whatever queue holds it and free its subtree.
    pub fn delete_template(&mut self, id: NodeId) -> Result<()> {
        self.unlink(id)?;
        self.free_subtree(id);
        Ok(())
    }

    /// Remove a node from the queue holding it, leaving it allocated.
    pub(crate) fn unlink(&mut self, id: NodeId) -> Result<()> {
        let obj = self.template(id)?;
        let (parent, module, top, grouping) = (
            obj.parent,
            obj.module,
            obj.flags.contains(ObjectFlags::TOP),
            obj.in_grouping,
        );

        if let Some(parent) = parent {
            let pobj = self.node_mut(parent)?;
            if let ObjectDef::List(list) = &mut pobj.def {
                list.keys.retain(|key| *key != id);
            }
            if let Some(queue) = pobj.def.datadefs_mut() {
                queue.retain(|child| *child != id);
            }
        } else if top {
            if let Ok(mdata) = self.module_mut(module) {
                mdata.datadefs.retain(|child| *child != id);
            }
        } else if let Some(grouping) = grouping {
            if let Some(grp) = self.grouping_mut(grouping) {
                grp.datadefs.retain(|child| *child != id);
            }
        }

        let obj = self.node_mut(id)?;
        obj.parent = None;
        obj.flags.remove(ObjectFlags::TOP);
        Ok(())
    }

    /// Free a node and everything it owns. The node must be unlinked.
    pub(crate) fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(obj) =
                self.nodes.get_mut(id.0 as usize).and_then(Option::take)
            else {
                continue;
            };

            // Reference clones do not own the definition's children.
            if obj.flags.contains(ObjectFlags::DEFCLONE) {
                continue;
            }
            stack.extend_from_slice(obj.def.datadefs());
            if !obj.flags.contains(ObjectFlags::CLONE) {
                for grouping in obj.def.groupings() {
                    stack.extend_from_slice(&grouping.datadefs);
                }
            }
        }
    }

    // ----- groupings and typedefs -----

    /// Add a grouping to a module or to a container-like node.
    pub fn add_grouping(
        &mut self,
        owner: GroupingOwner,
        grouping: Grouping,
    ) -> Result<GroupingRef> {
        let queue = match owner {
            GroupingOwner::Module(module) => {
                Arc::make_mut(&mut self.module_mut(module)?.groupings)
            }
            GroupingOwner::Node(node) => {
                let obj = self.node_mut(node)?;
                let kind = obj.kind();
                obj.def.groupings_mut().ok_or_else(|| {
                    Error::with_msg(
                        ErrorCode::InternalValue,
                        format!("{} cannot hold groupings", kind),
                    )
                })?
            }
        };
        if queue.iter().any(|grp| grp.name == grouping.name) {
            return Err(Error::with_msg(
                ErrorCode::EntryExists,
                format!("duplicate grouping '{}'", grouping.name),
            ));
        }
        queue.push(grouping);
        Ok(GroupingRef {
            owner,
            index: queue.len() - 1,
        })
    }

    /// Append a data-definition node to a grouping body.
    pub fn add_grouping_node(
        &mut self,
        grouping: GroupingRef,
        node: NodeId,
    ) -> Result<()> {
        let obj = self.template(node)?;
        let (name, nsid) = (obj.def.name().map(str::to_owned), obj.nsid);
        let grp = self.grouping(grouping)?;
        if let Some(name) = &name {
            if self.queue_has_name(&grp.datadefs, name, nsid) {
                return Err(Error::with_msg(
                    ErrorCode::EntryExists,
                    format!("duplicate grouping member '{}'", name),
                ));
            }
        }

        self.grouping_mut(grouping)
            .ok_or_else(|| Error::new(ErrorCode::InternalPointer))?
            .datadefs
            .push(node);
        let obj = self.node_mut(node)?;
        obj.parent = None;
        obj.in_grouping = Some(grouping);
        Ok(())
    }

    /// Look up a grouping by reference.
    pub fn grouping(&self, grouping: GroupingRef) -> Result<&Grouping> {
        let queue = match grouping.owner {
            GroupingOwner::Module(module) => {
                self.module_data(module)?.groupings.as_slice()
            }
            GroupingOwner::Node(node) => self.template(node)?.def.groupings(),
        };
        queue
            .get(grouping.index)
            .ok_or_else(|| Error::new(ErrorCode::InternalPointer))
    }

    pub(crate) fn grouping_mut(
        &mut self,
        grouping: GroupingRef,
    ) -> Option<&mut Grouping> {
        let queue = match grouping.owner {
            GroupingOwner::Module(module) => {
                Arc::make_mut(&mut self.module_mut(module).ok()?.groupings)
            }
            GroupingOwner::Node(node) => {
                self.node_mut(node).ok()?.def.groupings_mut()?
            }
        };
        queue.get_mut(grouping.index)
    }

    /// Add a typedef to a container-like node.
    pub fn add_typedef(
        &mut self,
        owner: NodeId,
        typedef: Typedef,
    ) -> Result<()> {
        let obj = self.node_mut(owner)?;
        let kind = obj.kind();
        match obj.def.typedefs_mut() {
            Some(queue) => {
                queue.push(typedef);
                Ok(())
            }
            None => Err(Error::with_msg(
                ErrorCode::InternalValue,
                format!("{} cannot hold typedefs", kind),
            )),
        }
    }

    /// Find a grouping visible from `node` by `prefix:name` or `name`.
    ///
    /// Groupings of the enclosing nodes are searched first, then the
    /// module, its submodules and the main module. A foreign prefix is
    /// looked up through the imports of the node's module.
    pub fn find_grouping(
        &self,
        node: NodeId,
        qname: &str,
    ) -> Result<GroupingRef> {
        let module = self.template(node)?.module;
        let (prefix, name) = split_qname(qname);
        let mut found = None;
        self.scope_walk(Scope::Node(node), module, prefix, |ctx, scope| {
            found = ctx.groupings_in(scope, name);
            found.is_some()
        })?;
        found.ok_or_else(|| {
            Error::with_msg(
                ErrorCode::DefNotFound,
                format!("grouping '{}' not found", qname),
            )
        })
    }

    /// Find a typedef visible from `node` by `prefix:name` or `name`.
    pub(crate) fn lookup_typedef(
        &self,
        node: NodeId,
        qname: &str,
    ) -> Option<&Typedef> {
        let module = self.template_opt(node)?.module;
        let (prefix, name) = split_qname(qname);
        let mut found = None;
        self.scope_walk(Scope::Node(node), module, prefix, |ctx, scope| {
            if ctx.typedef_in(scope, name).is_some() {
                found = Some(scope);
            }
            found.is_some()
        })
        .ok()?;
        self.typedef_in(found?, name)
    }

    fn groupings_in(&self, scope: Scope, name: &str) -> Option<GroupingRef> {
        let (owner, queue) = match scope {
            Scope::Node(node) => {
                let groupings = self.template_opt(node)?.def.groupings();
                (GroupingOwner::Node(node), groupings)
            }
            Scope::Module(module) => (
                GroupingOwner::Module(module),
                self.module_data(module).ok()?.groupings.as_slice(),
            ),
        };
        queue
            .iter()
            .position(|grp| grp.name == name)
            .map(|index| GroupingRef { owner, index })
    }

    fn typedef_in(&self, scope: Scope, name: &str) -> Option<&Typedef> {
        let mut typedefs = match scope {
            Scope::Node(node) => self.template_opt(node)?.def.typedefs(),
            Scope::Module(module) => {
                self.module_data(module).ok()?.typedefs.as_slice()
            }
        }
        .iter();
        typedefs.find(|typedef| typedef.name == name)
    }

    /// Visit the lookup scopes for a name in order until `visit` returns
    /// true.
    fn scope_walk<F>(
        &self,
        start: Scope,
        module: ModuleId,
        prefix: Option<&str>,
        mut visit: F,
    ) -> Result<()>
    where
        F: FnMut(&Context, Scope) -> bool,
    {
        let mdata = self.module_data(module)?;
        let own = mdata.is_own_prefix(prefix)
            || mdata
                .parent
                .and_then(|main| self.module_data(main).ok())
                .is_some_and(|main| main.is_own_prefix(prefix));

        if !own {
            // Imported definitions are only visible at the top level.
            let prefix = prefix.unwrap_or_default();
            let import = mdata.find_import_by_prefix(prefix).ok_or_else(|| {
                Error::with_msg(
                    ErrorCode::DefNotFound,
                    format!("prefix '{}' not found", prefix),
                )
            })?;
            let target = self
                .find_module_id(
                    &import.module,
                    import.revision.as_deref(),
                    true,
                )
                .ok_or_else(|| {
                    Error::with_msg(
                        ErrorCode::DefNotFound,
                        format!("module '{}' not found", import.module),
                    )
                })?;
            for scope in self.module_scopes(target) {
                if visit(self, scope) {
                    return Ok(());
                }
            }
            return Ok(());
        }

        // Enclosing nodes, continuing through the owners of groupings.
        let mut next = match start {
            Scope::Node(node) => Some(node),
            Scope::Module(_) => None,
        };
        while let Some(node) = next {
            let Some(obj) = self.template_opt(node) else {
                break;
            };
            if visit(self, Scope::Node(node)) {
                return Ok(());
            }
            next = match (obj.parent, obj.in_grouping) {
                (Some(parent), _) => Some(parent),
                (None, Some(grp)) => match grp.owner {
                    GroupingOwner::Node(owner) => Some(owner),
                    GroupingOwner::Module(_) => None,
                },
                (None, None) => None,
            };
        }

        for scope in self.module_scopes(module) {
            if visit(self, scope) {
                return Ok(());
            }
        }
        Ok(())
    }

    /// A module followed by its submodules, then the main module and its
    /// other submodules when `module` is itself a submodule.
    fn module_scopes(&self, module: ModuleId) -> Vec<Scope> {
        let mut scopes = vec![Scope::Module(module)];
        let mut push = |id: ModuleId| {
            let seen = scopes
                .iter()
                .any(|s| matches!(s, Scope::Module(m) if *m == id));
            if !seen {
                scopes.push(Scope::Module(id));
            }
        };
        for sub in self.included_submodules(module) {
            push(sub);
        }
        let main = self.module_data(module).ok().and_then(|m| m.parent);
        if let Some(main) = main {
            push(main);
            for sub in self.included_submodules(main) {
                push(sub);
            }
        }
        scopes
    }

    /// Submodules reachable through the `include` statements of a module.
    pub(crate) fn included_submodules(
        &self,
        module: ModuleId,
    ) -> Vec<ModuleId> {
        let Ok(mdata) = self.module_data(module) else {
            return Vec::new();
        };
        mdata
            .includes
            .iter()
            .filter_map(|inc| {
                if let Some(id) = inc.resolved.get() {
                    if self.module_data(*id).is_ok() {
                        return Some(*id);
                    }
                }
                let id = self.find_module_id(
                    &inc.submodule,
                    inc.revision.as_deref(),
                    false,
                )?;
                let _ = inc.resolved.set(id);
                Some(id)
            })
            .collect()
    }

    /// Resolve the named type of a leaf or leaf-list to its base type.
    ///
    /// Fails with `UnknownType` if a type in the chain is not defined and
    /// with `DefLoop` if the chain refers back to itself.
    pub fn set_named_type(&mut self, id: NodeId) -> Result<()> {
        let obj = self.template(id)?;
        let Some(typdef) = obj.def.typdef().cloned() else {
            return Err(Error::with_msg(
                ErrorCode::InternalValue,
                format!("{} has no type", obj.kind()),
            ));
        };
        if !typdef.is_named() {
            return Ok(());
        }

        let basetype = self.resolve_type_chain(id, obj.module, &typdef)?;
        let resolved = Arc::new(typdef.with_basetype(basetype));
        self.node_mut(id)?.set_resolved_type(resolved);
        Ok(())
    }

    fn resolve_type_chain(
        &self,
        node: NodeId,
        module: ModuleId,
        typdef: &TypeDef,
    ) -> Result<BaseType> {
        let mut visited: Vec<(ModuleId, String)> = Vec::new();
        let mut current = typdef.clone();
        let mut module = module;
        let mut start = Scope::Node(node);

        loop {
            let Some(name) = current.name() else {
                return Ok(current.basetype());
            };
            if current.prefix().is_none() {
                if let Some(builtin) = BaseType::from_name(name) {
                    return Ok(builtin);
                }
            }

            let mut found = None;
            self.scope_walk(start, module, current.prefix(), |ctx, scope| {
                if let Some(typedef) = ctx.typedef_in(scope, name) {
                    let owner = match scope {
                        Scope::Node(node) => ctx
                            .template_opt(node)
                            .map(|obj| obj.module)
                            .unwrap_or(module),
                        Scope::Module(module) => module,
                    };
                    found = Some((owner, typedef.typdef.clone()));
                    return true;
                }
                false
            })?;

            let Some((owner, next)) = found else {
                return Err(Error::with_msg(
                    ErrorCode::UnknownType,
                    format!("type '{}' not found", name),
                ));
            };

            let key = (owner, name.to_owned());
            if visited.contains(&key) {
                return Err(Error::with_msg(
                    ErrorCode::DefLoop,
                    format!("type '{}' refers to itself", name),
                ));
            }
            visited.push(key);

            current = (*next).clone();
            module = owner;
            start = Scope::Module(owner);
        }
    }

    // ----- lists -----

    /// Resolve the key and unique statements of a list.
    ///
    /// Key leaves get the KEY flag; unique components get the UNIQUE flag.
    pub fn resolve_list(&mut self, id: NodeId) -> Result<()> {
        let obj = self.template(id)?;
        let ObjectDef::List(list) = &obj.def else {
            return Err(Error::with_msg(
                ErrorCode::InternalValue,
                format!("{} is not a list", obj.kind()),
            ));
        };

        let mut keys = Vec::new();
        if let Some(keystr) = &list.keystr {
            for keyname in keystr.split_whitespace() {
                let (_, keyname) = split_qname(keyname);
                let key = list
                    .datadefs
                    .iter()
                    .copied()
                    .find(|child| {
                        self.template_opt(*child)
                            .and_then(|c| c.def.name())
                            == Some(keyname)
                    })
                    .ok_or_else(|| {
                        Error::with_msg(
                            ErrorCode::DefNotFound,
                            format!("key leaf '{}' not found", keyname),
                        )
                    })?;
                if self.template(key)?.kind() != ObjectKind::Leaf {
                    return Err(Error::with_msg(
                        ErrorCode::WrongType,
                        format!("key '{}' is not a leaf", keyname),
                    ));
                }
                keys.push(key);
            }
        }

        let mut uniques = Vec::new();
        for (index, unique) in list.uniques.iter().enumerate() {
            let mut components = Vec::new();
            for path in unique.xpath.split_whitespace() {
                components.push(self.resolve_descendant(id, path)?);
            }
            uniques.push((index, components));
        }

        for key in &keys {
            self.node_mut(*key)?.flags.insert(ObjectFlags::KEY);
        }
        let mut unique_config = Vec::new();
        for (index, components) in &uniques {
            let mut isconfig = true;
            for component in components {
                self.node_mut(*component)?
                    .flags
                    .insert(ObjectFlags::UNIQUE);
                isconfig &= self.node(*component)?.is_config();
            }
            unique_config.push((*index, components.clone(), isconfig));
        }

        if let ObjectDef::List(list) = &mut self.node_mut(id)?.def {
            list.keys = keys;
            for (index, components, isconfig) in unique_config {
                list.uniques[index].components = components;
                list.uniques[index].isconfig = isconfig;
            }
        }
        Ok(())
    }

    /// Resolve a descendant schema node id (`a/b/c`) below `node`, looking
    /// through choice and case layers.
    pub(crate) fn resolve_descendant(
        &self,
        node: NodeId,
        path: &str,
    ) -> Result<NodeId> {
        let mut current = node;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let (_, name) = split_qname(segment);
            let queue = self.template(current)?.def.datadefs();
            let (found, _) = self.find_template(
                queue,
                None,
                name,
                crate::find::FindOptions::deep(),
            );
            current = found.ok_or_else(|| {
                Error::with_msg(
                    ErrorCode::DefNotFound,
                    format!("node '{}' not found", path),
                )
            })?;
        }
        Ok(current)
    }

    // ----- appinfo-derived flags and metadata -----

    /// Set node flags from the extension statements attached to a node.
    pub fn set_ncx_flags(&mut self, id: NodeId) -> Result<()> {
        let obj = self.node_mut(id)?;
        let mut flags = obj.flags;
        for appinfo in &obj.appinfo {
            match appinfo.name.as_str() {
                "hidden" => flags |= ObjectFlags::HIDDEN,
                "root" => flags |= ObjectFlags::ROOT,
                "password" => flags |= ObjectFlags::PASSWD,
                "cli" => flags |= ObjectFlags::CLI,
                "abstract" => flags |= ObjectFlags::ABSTRACT,
                "xsdlist" => flags |= ObjectFlags::XSDLIST,
                "xpath" => flags |= ObjectFlags::XPATH,
                "qname" => flags |= ObjectFlags::QNAME,
                "schema-instance" => flags |= ObjectFlags::SCHEMAINST,
                "secure" | "default-deny-write" => flags |= ObjectFlags::SECURE,
                "very-secure" | "default-deny-all" => {
                    flags |= ObjectFlags::VERY_SECURE
                }
                "sil-delete-children-first" => {
                    flags |= ObjectFlags::SIL_DELETE_CHILDREN_FIRST
                }
                "cli-equals-ok" => flags |= ObjectFlags::CLI_EQUALS_OK,
                "user-write" => {
                    let allowed = appinfo.value.as_deref().unwrap_or_default();
                    let allows =
                        |op: &str| allowed.split_whitespace().any(|w| w == op);
                    flags.set(ObjectFlags::BLOCK_CREATE, !allows("create"));
                    flags.set(ObjectFlags::BLOCK_UPDATE, !allows("update"));
                    flags.set(ObjectFlags::BLOCK_DELETE, !allows("delete"));
                }
                _ => (),
            }
        }
        obj.flags = flags;
        Ok(())
    }

    /// Attach an XML attribute definition to a node.
    pub fn add_metadata(
        &mut self,
        id: NodeId,
        metadata: Metadata,
    ) -> Result<()> {
        let obj = self.node_mut(id)?;
        if obj.metadata.iter().any(|meta| meta.name == metadata.name) {
            return Err(Error::with_msg(
                ErrorCode::EntryExists,
                format!("duplicate metadata '{}'", metadata.name),
            ));
        }
        obj.metadata.push(metadata);
        Ok(())
    }

    // ----- features -----

    /// Add a feature definition to a module, applying the context's enable
    /// configuration.
    pub fn add_feature(
        &mut self,
        module: ModuleId,
        mut feature: Feature,
    ) -> Result<FeatureRef> {
        let mdata = self.module_data(module)?;
        if mdata.features.iter().any(|f| f.name == feature.name) {
            return Err(Error::with_msg(
                ErrorCode::EntryExists,
                format!("duplicate feature '{}'", feature.name),
            ));
        }
        let modname = match mdata.parent {
            Some(main) => self.module_data(main)?.name.clone(),
            None => mdata.name.clone(),
        };

        feature.enabled = self.features.enabled_for(&modname, &feature.name);
        feature.tkerr.module = Some(module);
        let mdata = self.module_mut(module)?;
        mdata.features.push(feature);
        Ok(FeatureRef {
            module,
            index: mdata.features.len() - 1,
        })
    }

    /// Look up a feature definition.
    pub fn feature(&self, feature: FeatureRef) -> Option<&Feature> {
        self.module_data(feature.module)
            .ok()?
            .features
            .get(feature.index)
    }

    /// Find the feature named by `prefix:name` or `name` as seen from
    /// `module`.
    pub fn find_feature(
        &self,
        module: ModuleId,
        qname: &str,
    ) -> Result<FeatureRef> {
        let (prefix, name) = split_qname(qname);
        let mut found = None;
        self.scope_walk(Scope::Module(module), module, prefix, |ctx, scope| {
            if let Scope::Module(id) = scope {
                found = ctx.module_data(id).ok().and_then(|m| {
                    m.features
                        .iter()
                        .position(|f| f.name == name)
                        .map(|index| FeatureRef { module: id, index })
                });
            }
            found.is_some()
        })?;
        found.ok_or_else(|| {
            Error::with_msg(
                ErrorCode::DefNotFound,
                format!("feature '{}' not found", qname),
            )
        })
    }

    /// Add a resolved `if-feature` reference to a node.
    pub fn add_iffeature(&mut self, id: NodeId, qname: &str) -> Result<()> {
        let module = self.template(id)?.module;
        let iff = self.new_iffeature(module, qname)?;
        self.node_mut(id)?.iffeatures.push(iff);
        Ok(())
    }

    /// Add a resolved `if-feature` reference to a feature definition.
    pub fn add_feature_iffeature(
        &mut self,
        feature: FeatureRef,
        qname: &str,
    ) -> Result<()> {
        let iff = self.new_iffeature(feature.module, qname)?;
        let mdata = self.module_mut(feature.module)?;
        let feature = mdata
            .features
            .get_mut(feature.index)
            .ok_or_else(|| Error::new(ErrorCode::InternalPointer))?;
        feature.iffeatures.push(iff);
        Ok(())
    }

    fn new_iffeature(
        &self,
        module: ModuleId,
        qname: &str,
    ) -> Result<IfFeature> {
        let mut iff = IfFeature::new(qname);
        iff.feature = Some(self.find_feature(module, qname)?);
        iff.tkerr = SourceLocation {
            module: Some(module),
            ..Default::default()
        };
        Ok(iff)
    }

    /// Returns whether a feature and every feature it depends on is
    /// enabled.
    pub fn feature_enabled(&self, feature: FeatureRef) -> bool {
        let mut visiting = Vec::new();
        self.feature_enabled_rec(feature, &mut visiting)
    }

    fn feature_enabled_rec(
        &self,
        feature: FeatureRef,
        visiting: &mut Vec<FeatureRef>,
    ) -> bool {
        let Some(def) = self.feature(feature) else {
            return false;
        };
        if !def.enabled || visiting.contains(&feature) {
            return false;
        }
        visiting.push(feature);
        let enabled = def.iffeatures.iter().all(|iff| {
            iff.feature
                .is_some_and(|dep| self.feature_enabled_rec(dep, visiting))
        });
        visiting.pop();
        enabled
    }

    /// Returns whether an if-feature reference names an enabled feature.
    pub fn iffeature_enabled(&self, iff: &IfFeature) -> bool {
        iff.feature.is_some_and(|feature| self.feature_enabled(feature))
    }

    // ----- diagnostics -----

    /// Render a source location as `module:line.column`.
    pub(crate) fn location(&self, tkerr: &SourceLocation) -> Option<String> {
        let module = self.module_data(tkerr.module?).ok()?;
        Some(format!("{}:{}.{}", module.name, tkerr.line, tkerr.column))
    }

    pub(crate) fn log(&self, level: Level, tkerr: &SourceLocation, msg: &str) {
        logging::emit(level, self.location(tkerr).as_deref(), msg);
    }
}

impl Default for Context {
    fn default() -> Context {
        Context::new(ContextFlags::empty())
    }
}

fn stale_node(id: NodeId) -> Error {
    Error::with_msg(
        ErrorCode::InternalPointer,
        format!("invalid node id {}", id.0),
    )
}
