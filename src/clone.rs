//
// Copyright (c) The yang-schema Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Template cloning and uses/augment expansion.
//!
//! A clone owns its strings, must statements and child nodes, but shares
//! type definitions and typedef/grouping queues with its source. Uses and
//! augment nodes are never copied; their clones refer to the original
//! definition and carry the DEFCLONE flag.

use std::sync::Arc;

use log::Level;

use crate::context::{Context, ContextFlags};
use crate::error::{Error, ErrorCode, Result};
use crate::feature::IfFeature;
use crate::find::FindOptions;
use crate::object::{
    GroupingRef, ObjectDef, ObjectFlags, ObjectKind, ObjectTemplate,
    RefineDef,
};
use crate::types::{ModuleId, NodeId, XPathExpr};
use crate::utils::split_qname;

/// Queue a node is linked into.
#[derive(Clone, Copy, Debug)]
enum Placement {
    Parent(NodeId),
    Top(ModuleId),
    Grouping(GroupingRef),
    Detached,
}

/// When and if-feature statements passed from a uses or augment node to
/// the nodes it adds.
#[derive(Debug, Default)]
struct Inherited {
    whens: Vec<XPathExpr>,
    iffeatures: Vec<IfFeature>,
}

fn overlay(target: &mut Option<String>, value: &Option<String>) {
    if value.is_some() {
        target.clone_from(value);
    }
}

/// Copy a kind payload with empty child queues, applying the refine
/// overlay to the fields it may override.
fn clone_def(def: &ObjectDef, refine: Option<&RefineDef>) -> ObjectDef {
    let mut def = def.clone();
    match &mut def {
        ObjectDef::Container(c) => {
            c.datadefs.clear();
            if let Some(r) = refine {
                overlay(&mut c.description, &r.description);
                overlay(&mut c.reference, &r.reference);
                overlay(&mut c.presence, &r.presence);
                c.musts.extend(r.musts.iter().cloned());
            }
        }
        ObjectDef::Leaf(l) | ObjectDef::Anyxml(l) => {
            if let Some(r) = refine {
                overlay(&mut l.description, &r.description);
                overlay(&mut l.reference, &r.reference);
                overlay(&mut l.default, &r.default);
                l.musts.extend(r.musts.iter().cloned());
            }
        }
        ObjectDef::LeafList(l) => {
            if let Some(r) = refine {
                overlay(&mut l.description, &r.description);
                overlay(&mut l.reference, &r.reference);
                l.musts.extend(r.musts.iter().cloned());
                if r.min_elements_tkerr.is_some() {
                    l.min_elements = Some(r.min_elements);
                }
                if r.max_elements_tkerr.is_some() {
                    l.max_elements = Some(r.max_elements);
                }
            }
        }
        ObjectDef::List(l) => {
            l.datadefs.clear();
            l.keys.clear();
            for unique in &mut l.uniques {
                unique.components.clear();
            }
            if let Some(r) = refine {
                overlay(&mut l.description, &r.description);
                overlay(&mut l.reference, &r.reference);
                l.musts.extend(r.musts.iter().cloned());
                if r.min_elements_tkerr.is_some() {
                    l.min_elements = Some(r.min_elements);
                }
                if r.max_elements_tkerr.is_some() {
                    l.max_elements = Some(r.max_elements);
                }
            }
        }
        ObjectDef::Choice(c) => {
            c.cases.clear();
            if let Some(r) = refine {
                overlay(&mut c.description, &r.description);
                overlay(&mut c.reference, &r.reference);
                overlay(&mut c.default, &r.default);
            }
        }
        ObjectDef::Case(c) => {
            c.datadefs.clear();
            if let Some(r) = refine {
                overlay(&mut c.description, &r.description);
                overlay(&mut c.reference, &r.reference);
            }
        }
        ObjectDef::Rpc(rpc) => {
            rpc.datadefs.clear();
            if let Some(r) = refine {
                overlay(&mut rpc.description, &r.description);
                overlay(&mut rpc.reference, &r.reference);
            }
        }
        ObjectDef::RpcIo(rpcio) => rpcio.datadefs.clear(),
        ObjectDef::Notification(notif) => {
            notif.datadefs.clear();
            if let Some(r) = refine {
                overlay(&mut notif.description, &r.description);
                overlay(&mut notif.reference, &r.reference);
            }
        }
        ObjectDef::Refine(_) | ObjectDef::Uses(_) | ObjectDef::Augment(_) => {}
    }
    def
}

fn inheritance(obj: &ObjectTemplate) -> Inherited {
    Inherited {
        whens: obj
            .when
            .iter()
            .chain(obj.inherited_whens.iter())
            .cloned()
            .collect(),
        iffeatures: obj
            .iffeatures
            .iter()
            .chain(obj.inherited_iffeatures.iter())
            .cloned()
            .collect(),
    }
}

// ===== impl Context =====

impl Context {
    /// Clone a node subtree into `module`.
    ///
    /// `refines` is a queue of refine nodes whose resolved targets may
    /// name any node of the source subtree. A child whose name collides
    /// with an already cloned sibling is logged and dropped. On error
    /// nothing of the partial clone is kept.
    pub fn clone_template(
        &mut self,
        module: ModuleId,
        source: NodeId,
        refines: &[NodeId],
    ) -> Result<NodeId> {
        let nsid = self.module_data(module)?.nsid;
        let src = self.template(source)?.clone();
        let refine = self.find_refine(refines, source);
        let kind = src.kind();

        let mut obj = ObjectTemplate::new(kind, "", module, nsid);
        obj.flags = (src.flags | ObjectFlags::CLONE) - ObjectFlags::TOP;
        obj.tkerr = src.tkerr;
        obj.when = src.when.clone();
        obj.metadata = src.metadata.clone();
        obj.appinfo = src.appinfo.clone();
        obj.iffeatures = src.iffeatures.clone();
        obj.inherited_whens = src.inherited_whens.clone();
        obj.inherited_iffeatures = src.inherited_iffeatures.clone();
        obj.uses_obj = src.uses_obj;
        obj.aug_obj = src.aug_obj;

        let mut rdef = None;
        if let Some(refine) = &refine {
            if matches!(kind, ObjectKind::Uses | ObjectKind::Augment) {
                return Err(Error::with_msg(
                    ErrorCode::InternalValue,
                    format!("refine cannot target a {} node", kind),
                ));
            }
            let rflags = refine.flags;
            obj.flags |= rflags;
            if rflags.contains(ObjectFlags::MANDSET)
                && !rflags.contains(ObjectFlags::MANDATORY)
            {
                obj.flags.remove(ObjectFlags::MANDATORY);
            }
            if rflags.contains(ObjectFlags::CONFSET)
                && !rflags.contains(ObjectFlags::CONFIG)
            {
                obj.flags.remove(ObjectFlags::CONFIG);
            }
            obj.appinfo.extend(refine.appinfo.iter().cloned());
            obj.iffeatures.extend(refine.iffeatures.iter().cloned());
            if let ObjectDef::Refine(def) = &refine.def {
                rdef = Some(def);
            }
        }

        let defclone = matches!(kind, ObjectKind::Uses | ObjectKind::Augment);
        if defclone {
            obj.def = src.def.clone();
            obj.flags.insert(ObjectFlags::DEFCLONE);
        } else {
            obj.def = clone_def(&src.def, rdef);
        }
        let id = self.alloc(obj);
        if defclone {
            return Ok(id);
        }

        for child in src.def.datadefs() {
            let named = self
                .template_opt(*child)
                .is_some_and(|cobj| cobj.kind().has_name());
            if !named {
                continue;
            }
            let result = self
                .clone_template(module, *child, refines)
                .and_then(|cloned| self.attach_clone(id, cloned));
            if let Err(error) = result {
                self.free_subtree(id);
                return Err(error);
            }
        }

        if let ObjectDef::List(_) = &src.def {
            if let Err(error) = self.reresolve_list(id, &src.def) {
                self.free_subtree(id);
                return Err(error);
            }
        }

        Ok(id)
    }

    /// Clone a node and wrap the clone in a synthetic case carrying its
    /// name.
    pub fn clone_template_case(
        &mut self,
        module: ModuleId,
        source: NodeId,
        refines: &[NodeId],
    ) -> Result<NodeId> {
        let cloned = self.clone_template(module, source, refines)?;
        let case = match self.new_short_case(cloned) {
            Ok(case) => case,
            Err(error) => {
                self.free_subtree(cloned);
                return Err(error);
            }
        };
        if let Err(error) = self.link_child(case, cloned, None) {
            self.free_subtree(cloned);
            self.free_subtree(case);
            return Err(error);
        }
        Ok(case)
    }

    fn find_refine(
        &self,
        refines: &[NodeId],
        source: NodeId,
    ) -> Option<ObjectTemplate> {
        refines
            .iter()
            .filter_map(|id| self.template_opt(*id))
            .find(|obj| {
                matches!(
                    &obj.def,
                    ObjectDef::Refine(r) if r.target_obj == Some(source)
                )
            })
            .cloned()
    }

    /// Link a fresh clone under `parent`, dropping it if the name is taken.
    fn attach_clone(&mut self, parent: NodeId, cloned: NodeId) -> Result<()> {
        match self.link_child(parent, cloned, None) {
            Err(error) if error.errcode == ErrorCode::EntryExists => {
                self.discard_duplicate(cloned);
                Ok(())
            }
            Err(error) => {
                self.free_subtree(cloned);
                Err(error)
            }
            Ok(()) => Ok(()),
        }
    }

    fn discard_duplicate(&mut self, cloned: NodeId) {
        if let Some(obj) = self.template_opt(cloned) {
            let level = if self
                .get_options()
                .contains(ContextFlags::QUIET_DUPLICATES)
            {
                Level::Debug
            } else {
                Level::Warn
            };
            let msg = format!(
                "duplicate {} '{}' discarded",
                obj.kind(),
                obj.def.name().unwrap_or_default()
            );
            self.log(level, &obj.tkerr, &msg);
        }
        self.free_subtree(cloned);
    }

    /// Point the keys and unique components of a cloned list at the
    /// cloned children.
    fn reresolve_list(&mut self, id: NodeId, source: &ObjectDef) -> Result<()> {
        let ObjectDef::List(srclist) = source else {
            return Ok(());
        };

        let mut keys = Vec::new();
        if !srclist.keys.is_empty() {
            let children = self.template(id)?.def.datadefs();
            let keystr = srclist.keystr.as_deref().unwrap_or_default();
            for keyname in keystr.split_whitespace() {
                let (_, keyname) = split_qname(keyname);
                let key = children
                    .iter()
                    .copied()
                    .find(|child| {
                        self.template_opt(*child).and_then(|c| c.def.name())
                            == Some(keyname)
                    })
                    .ok_or_else(|| {
                        Error::with_msg(
                            ErrorCode::InternalValue,
                            format!(
                                "key '{}' missing from cloned list",
                                keyname
                            ),
                        )
                    })?;
                keys.push(key);
            }
        }

        let mut uniques = Vec::new();
        for (index, unique) in srclist.uniques.iter().enumerate() {
            if unique.components.is_empty() {
                continue;
            }
            let components = unique
                .xpath
                .split_whitespace()
                .map(|path| self.resolve_descendant(id, path))
                .collect::<Result<Vec<_>>>()
                .map_err(|_| {
                    Error::with_msg(
                        ErrorCode::InternalValue,
                        format!(
                            "unique '{}' missing from cloned list",
                            unique.xpath
                        ),
                    )
                })?;
            uniques.push((index, components));
        }

        if let ObjectDef::List(list) = &mut self.node_mut(id)?.def {
            list.keys = keys;
            for (index, components) in uniques {
                list.uniques[index].components = components;
            }
        }
        Ok(())
    }

    // ----- uses -----

    /// Replace a uses node by clones of its grouping's body.
    ///
    /// Refine children are applied to the clones and augment children are
    /// expanded into them. The clones take the place of the uses node, which
    /// is moved out of the tree. Nested uses nodes inside the grouping must
    /// be expanded first; unexpanded ones are not cloned.
    pub fn expand_uses(&mut self, uses: NodeId) -> Result<()> {
        let uobj = self.template(uses)?;
        let ObjectDef::Uses(udef) = &uobj.def else {
            return Err(Error::with_msg(
                ErrorCode::InternalValue,
                format!("{} is not a uses node", uobj.kind()),
            ));
        };
        if udef.expand_done {
            return Ok(());
        }
        let udef = Arc::clone(udef);
        let module = uobj.module;
        let inherited = inheritance(uobj);
        let placement = self.placement(uses)?;

        let grouping = match udef.grouping {
            Some(grouping) => grouping,
            None => {
                let qname = match &udef.prefix {
                    Some(prefix) => format!("{}:{}", prefix, udef.name),
                    None => udef.name.clone(),
                };
                self.find_grouping(uses, &qname)?
            }
        };
        let body = self.grouping(grouping)?.datadefs.clone();

        let mut refines = Vec::new();
        let mut augments = Vec::new();
        for child in &udef.datadefs {
            match self.template(*child)?.kind() {
                ObjectKind::Refine => refines.push(*child),
                ObjectKind::Augment => augments.push(*child),
                _ => (),
            }
        }
        for refine in &refines {
            self.resolve_refine_target(*refine, &body)?;
        }

        let into_choice = match placement {
            Placement::Parent(parent) => {
                self.template(parent)?.kind() == ObjectKind::Choice
            }
            _ => false,
        };
        let clones = self.clone_body(module, &body, &refines, into_choice)?;
        for cloned in &clones {
            self.node_mut(*cloned)?.uses_obj = Some(uses);
            self.inherit(*cloned, &inherited)?;
        }
        self.place_clones(placement, Some(uses), clones.clone())?;

        // All targets are checked before any augment is applied, so a
        // failure only has to take back the clones.
        if let Err(error) = self.apply_uses_augments(placement, &augments) {
            self.unplace_clones(&clones);
            return Err(error);
        }

        self.retire(uses)?;
        if let ObjectDef::Uses(def) = &mut self.node_mut(uses)?.def {
            let def = Arc::make_mut(def);
            def.grouping = Some(grouping);
            def.expand_done = true;
        }
        Ok(())
    }

    fn apply_uses_augments(
        &mut self,
        placement: Placement,
        augments: &[NodeId],
    ) -> Result<()> {
        let mut targets = Vec::with_capacity(augments.len());
        for augment in augments {
            let path = self.augment_target_path(*augment)?;
            let target = self.resolve_relative(placement, &path)?;
            self.check_augmentable(target)?;
            targets.push((*augment, target));
        }
        for (augment, target) in targets {
            self.set_augment_target(augment, target)?;
            self.augment_into(augment, target)?;
        }
        Ok(())
    }

    /// Unlink and free clones placed by a failed expansion. Clones already
    /// discarded as duplicates are skipped.
    fn unplace_clones(&mut self, clones: &[NodeId]) {
        for cloned in clones {
            if self.template_opt(*cloned).is_none() {
                continue;
            }
            let _ = self.unlink(*cloned);
            self.free_subtree(*cloned);
        }
    }

    /// Resolve a refine's descendant path against a grouping body.
    fn resolve_refine_target(
        &mut self,
        refine: NodeId,
        body: &[NodeId],
    ) -> Result<()> {
        let ObjectDef::Refine(rdef) = &self.template(refine)?.def else {
            return Err(Error::new(ErrorCode::InternalValue));
        };
        let target = rdef.target.clone();
        let found = self.resolve_path_in(body, &target).map_err(|_| {
            Error::with_msg(
                ErrorCode::DefNotFound,
                format!("refine target '{}' not found", target),
            )
        })?;

        if let ObjectDef::Refine(rdef) = &mut self.node_mut(refine)?.def {
            rdef.target_obj = Some(found);
        }
        Ok(())
    }

    /// Resolve a descendant schema node id starting at `queue`. Choice and
    /// case names are part of the path.
    fn resolve_path_in(&self, queue: &[NodeId], path: &str) -> Result<NodeId> {
        let mut queue = queue;
        let mut current = None;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let (_, name) = split_qname(segment);
            let (found, _) =
                self.find_template(queue, None, name, FindOptions::exact());
            let found = found.ok_or_else(|| {
                Error::with_msg(
                    ErrorCode::DefNotFound,
                    format!("node '{}' not found", path),
                )
            })?;
            queue = self.template(found)?.def.datadefs();
            current = Some(found);
        }
        current.ok_or_else(|| {
            Error::with_msg(ErrorCode::InvalidValue, "empty schema node id")
        })
    }

    fn clone_body(
        &mut self,
        module: ModuleId,
        body: &[NodeId],
        refines: &[NodeId],
        into_choice: bool,
    ) -> Result<Vec<NodeId>> {
        let mut clones = Vec::new();
        for child in body {
            let Some(kind) = self.template_opt(*child).map(|obj| obj.kind())
            else {
                continue;
            };
            if !kind.has_name() {
                continue;
            }
            let result = if into_choice && kind != ObjectKind::Case {
                self.clone_template_case(module, *child, refines)
            } else {
                self.clone_template(module, *child, refines)
            };
            match result {
                Ok(cloned) => clones.push(cloned),
                Err(error) => {
                    for cloned in clones {
                        self.free_subtree(cloned);
                    }
                    return Err(error);
                }
            }
        }
        Ok(clones)
    }

    fn inherit(&mut self, id: NodeId, inherited: &Inherited) -> Result<()> {
        let obj = self.node_mut(id)?;
        obj.inherited_whens.extend(inherited.whens.iter().cloned());
        obj.inherited_iffeatures
            .extend(inherited.iffeatures.iter().cloned());
        if !inherited.whens.is_empty() {
            obj.flags.insert(ObjectFlags::CONDITIONAL);
        }
        Ok(())
    }

    fn placement(&self, id: NodeId) -> Result<Placement> {
        let obj = self.template(id)?;
        Ok(match (obj.parent, obj.in_grouping) {
            (Some(parent), _) => Placement::Parent(parent),
            _ if obj.flags.contains(ObjectFlags::TOP) => {
                Placement::Top(obj.module)
            }
            (None, Some(grouping)) => Placement::Grouping(grouping),
            (None, None) => Placement::Detached,
        })
    }

    fn queue_ref(&self, placement: Placement) -> Result<&[NodeId]> {
        match placement {
            Placement::Parent(parent) => {
                Ok(self.template(parent)?.def.datadefs())
            }
            Placement::Top(module) => Ok(&self.module_data(module)?.datadefs),
            Placement::Grouping(grouping) => {
                Ok(&self.grouping(grouping)?.datadefs)
            }
            Placement::Detached => Err(Error::with_msg(
                ErrorCode::InternalValue,
                "node is not linked into the schema tree",
            )),
        }
    }

    fn queue_mut(&mut self, placement: Placement) -> Result<&mut Vec<NodeId>> {
        match placement {
            Placement::Parent(parent) => {
                let obj = self.node_mut(parent)?;
                let kind = obj.kind();
                obj.def.datadefs_mut().ok_or_else(|| {
                    Error::with_msg(
                        ErrorCode::InternalValue,
                        format!("{} cannot have child nodes", kind),
                    )
                })
            }
            Placement::Top(module) => {
                Ok(&mut self.module_mut(module)?.datadefs)
            }
            Placement::Grouping(grouping) => self
                .grouping_mut(grouping)
                .map(|grp| &mut grp.datadefs)
                .ok_or_else(|| Error::new(ErrorCode::InternalPointer)),
            Placement::Detached => Err(Error::with_msg(
                ErrorCode::InternalValue,
                "node is not linked into the schema tree",
            )),
        }
    }

    /// Insert clones into a queue after `anchor`, or at the end. Clones
    /// whose name is already taken are logged and dropped.
    fn place_clones(
        &mut self,
        placement: Placement,
        anchor: Option<NodeId>,
        clones: Vec<NodeId>,
    ) -> Result<()> {
        let queue = self.queue_ref(placement)?;
        let mut pos = anchor
            .and_then(|anchor| queue.iter().position(|id| *id == anchor))
            .map(|pos| pos + 1)
            .unwrap_or(queue.len());
        let in_grouping = match placement {
            Placement::Parent(parent) => self.template(parent)?.in_grouping,
            Placement::Grouping(grouping) => Some(grouping),
            Placement::Top(_) | Placement::Detached => None,
        };

        for cloned in clones {
            let obj = self.template(cloned)?;
            let (name, nsid) = (obj.def.name().map(str::to_owned), obj.nsid);
            let taken = match &name {
                Some(name) => {
                    self.queue_has_name(self.queue_ref(placement)?, name, nsid)
                }
                None => false,
            };
            if taken {
                self.discard_duplicate(cloned);
                continue;
            }

            self.queue_mut(placement)?.insert(pos, cloned);
            pos += 1;
            let obj = self.node_mut(cloned)?;
            obj.in_grouping = in_grouping;
            match placement {
                Placement::Parent(parent) => obj.parent = Some(parent),
                Placement::Top(_) => {
                    obj.parent = None;
                    obj.flags.insert(ObjectFlags::TOP);
                }
                Placement::Grouping(_) | Placement::Detached => {
                    obj.parent = None
                }
            }
        }
        Ok(())
    }

    /// Take an expanded uses or augment node out of the tree. The node
    /// stays allocated until its module is removed.
    fn retire(&mut self, id: NodeId) -> Result<()> {
        self.unlink(id)?;
        let module = self.template(id)?.module;
        self.module_mut(module)?.retired.push(id);
        Ok(())
    }

    // ----- augment -----

    fn augment_target_path(&self, augment: NodeId) -> Result<String> {
        match &self.template(augment)?.def {
            ObjectDef::Augment(adef) => Ok(adef.target.clone()),
            def => Err(Error::with_msg(
                ErrorCode::InternalValue,
                format!("{} is not an augment node", def.kind()),
            )),
        }
    }

    fn set_augment_target(
        &mut self,
        augment: NodeId,
        target: NodeId,
    ) -> Result<()> {
        if let ObjectDef::Augment(adef) = &mut self.node_mut(augment)?.def {
            Arc::make_mut(adef).target_obj = Some(target);
        }
        Ok(())
    }

    /// Resolve the target of an augment node.
    ///
    /// Absolute targets (`/p:a/p:b`) are resolved from the top level of the
    /// module each prefix names, through the imports of the augment's
    /// module. Relative targets of an augment inside a uses node are
    /// resolved from the uses node's position.
    pub fn resolve_augment_target(&self, augment: NodeId) -> Result<NodeId> {
        let target = self.augment_target_path(augment)?;
        let aobj = self.template(augment)?;
        let not_found = || {
            Error::with_msg(
                ErrorCode::DefNotFound,
                format!("augment target '{}' not found", target),
            )
        };

        let Some(path) = target.strip_prefix('/') else {
            let uses = aobj.parent.ok_or_else(not_found)?;
            if self.template(uses)?.kind() != ObjectKind::Uses {
                return Err(not_found());
            }
            let placement = self.placement(uses)?;
            return self.resolve_relative(placement, &target);
        };

        let mut current: Option<NodeId> = None;
        for segment in path.split('/') {
            let (prefix, name) = split_qname(segment);
            let module = self.prefix_module(aobj.module, prefix)?;
            let modname = self.module(module)?.main_module_name();
            let (found, _) = match current {
                None => self.find_top_in(
                    module,
                    Some(modname),
                    name,
                    FindOptions::exact(),
                ),
                Some(node) => self.find_template(
                    self.template(node)?.def.datadefs(),
                    Some(modname),
                    name,
                    FindOptions::exact(),
                ),
            };
            current = Some(found.ok_or_else(not_found)?);
        }
        current.ok_or_else(not_found)
    }

    fn resolve_relative(
        &self,
        placement: Placement,
        path: &str,
    ) -> Result<NodeId> {
        let queue = self.queue_ref(placement)?;
        self.resolve_path_in(queue, path).map_err(|_| {
            Error::with_msg(
                ErrorCode::DefNotFound,
                format!("augment target '{}' not found", path),
            )
        })
    }

    /// Module named by a prefix as seen from `from`.
    fn prefix_module(
        &self,
        from: ModuleId,
        prefix: Option<&str>,
    ) -> Result<ModuleId> {
        let mdata = self.module_data(from)?;
        let own = mdata.is_own_prefix(prefix)
            || mdata
                .parent
                .and_then(|main| self.module_data(main).ok())
                .is_some_and(|main| main.is_own_prefix(prefix));
        if own {
            return Ok(from);
        }

        let prefix = prefix.unwrap_or_default();
        let import = mdata.find_import_by_prefix(prefix).ok_or_else(|| {
            Error::with_msg(
                ErrorCode::DefNotFound,
                format!("prefix '{}' not found", prefix),
            )
        })?;
        self.find_module_id(&import.module, import.revision.as_deref(), true)
            .ok_or_else(|| {
                Error::with_msg(
                    ErrorCode::DefNotFound,
                    format!("module '{}' not found", import.module),
                )
            })
    }

    /// Add clones of an augment's children to its target and move the
    /// augment node out of the tree.
    ///
    /// Children added to a choice are wrapped in synthetic cases.
    pub fn expand_augment(&mut self, augment: NodeId) -> Result<()> {
        let target = self.resolve_augment_target(augment)?;
        self.set_augment_target(augment, target)?;
        self.augment_into(augment, target)
    }

    fn check_augmentable(&self, target: NodeId) -> Result<()> {
        let tkind = self.template(target)?.kind();
        if !matches!(
            tkind,
            ObjectKind::Container
                | ObjectKind::List
                | ObjectKind::Choice
                | ObjectKind::Case
                | ObjectKind::RpcIo
                | ObjectKind::Notification
        ) {
            return Err(Error::with_msg(
                ErrorCode::InternalValue,
                format!("a {} node cannot be augmented", tkind),
            ));
        }
        Ok(())
    }

    fn augment_into(&mut self, augment: NodeId, target: NodeId) -> Result<()> {
        let aobj = self.template(augment)?;
        let ObjectDef::Augment(adef) = &aobj.def else {
            return Err(Error::new(ErrorCode::InternalValue));
        };
        let body = adef.datadefs.clone();
        let module = aobj.module;
        let inherited = inheritance(aobj);

        self.check_augmentable(target)?;

        let into_choice = self.template(target)?.kind() == ObjectKind::Choice;
        let clones = self.clone_body(module, &body, &[], into_choice)?;
        for cloned in &clones {
            let obj = self.node_mut(*cloned)?;
            obj.flags.insert(ObjectFlags::AUGCLONE);
            obj.aug_obj = Some(augment);
            self.inherit(*cloned, &inherited)?;
        }
        self.place_clones(Placement::Parent(target), None, clones)?;

        self.retire(augment)
    }
}
