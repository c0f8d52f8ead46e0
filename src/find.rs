//
// Copyright (c) The yang-schema Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Schema node name resolution.
//!
//! Choice and case nodes do not appear in instance documents, so every
//! lookup here can see through them. The extended lookups
//! ([`SchemaNode::find_child_ex`], [`SchemaModule::find_template_top_ex`])
//! try progressively looser matching policies until one succeeds.

use std::ops::ControlFlow;

use crate::context::Context;
use crate::error::{Error, ErrorCode, Result};
use crate::object::ObjectKind;
use crate::schema::{SchemaModule, SchemaNode};
use crate::types::{ModuleId, NodeId};
use crate::utils::{name_matches, split_qname, Binding};

/// Name matching policy for the extended lookups.
///
/// The `First` variants accept the first of several partial matches; the
/// other partial variants report `MultipleMatches` instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum MatchMode {
    Exact,
    ExactNoCase,
    One,
    OneNoCase,
    First,
    FirstNoCase,
}

/// Parameters of a single queue search.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FindOptions {
    /// Treat choice and case nodes as fully transparent.
    pub deep: bool,
    /// Compare only the first `objname.len()` characters of each name.
    pub partial: bool,
    /// Compare names case-sensitively.
    pub usecase: bool,
    /// Compare against the `alt-name` extension value instead of the name.
    pub altnames: bool,
    /// Skip rpc and notification nodes.
    pub dataonly: bool,
}

#[derive(Debug, Default)]
struct MatchState {
    first: Option<NodeId>,
    count: u32,
}

// ===== impl MatchMode =====

impl MatchMode {
    /// Returns whether several partial matches are an error.
    fn single_match(&self) -> bool {
        matches!(self, MatchMode::One | MatchMode::OneNoCase)
    }

    /// The (partial, usecase) combinations tried for this mode, in order.
    fn tiers(&self) -> Vec<(bool, bool)> {
        let mut tiers = vec![(false, true)];
        if *self != MatchMode::Exact {
            tiers.push((false, false));
        }
        if *self >= MatchMode::One {
            tiers.push((true, true));
        }
        if matches!(self, MatchMode::OneNoCase | MatchMode::FirstNoCase) {
            tiers.push((true, false));
        }
        tiers
    }
}

// ===== impl FindOptions =====

impl FindOptions {
    /// Exact case-sensitive search that sees choice and case names.
    pub fn exact() -> FindOptions {
        FindOptions {
            deep: false,
            partial: false,
            usecase: true,
            altnames: false,
            dataonly: false,
        }
    }

    /// Exact case-sensitive search through choice and case layers.
    pub fn deep() -> FindOptions {
        FindOptions {
            deep: true,
            ..FindOptions::exact()
        }
    }

    pub fn partial(self, partial: bool) -> FindOptions {
        FindOptions { partial, ..self }
    }

    pub fn usecase(self, usecase: bool) -> FindOptions {
        FindOptions { usecase, ..self }
    }

    pub fn altnames(self, altnames: bool) -> FindOptions {
        FindOptions { altnames, ..self }
    }

    pub fn dataonly(self, dataonly: bool) -> FindOptions {
        FindOptions { dataonly, ..self }
    }
}

/// Run the extended match driver.
///
/// `search` performs one queue search with the given options and returns
/// the match and the number of matching candidates.
fn find_ex<F>(
    base: FindOptions,
    mode: MatchMode,
    altnames: bool,
    objname: &str,
    mut search: F,
) -> Result<NodeId>
where
    F: FnMut(FindOptions) -> (Option<NodeId>, u32),
{
    let passes: &[bool] = if altnames { &[false, true] } else { &[false] };
    for altnames in passes {
        for (partial, usecase) in mode.tiers() {
            let opts = base
                .partial(partial)
                .usecase(usecase)
                .altnames(*altnames);
            let (found, count) = search(opts);
            if partial && count > 1 && mode.single_match() {
                return Err(Error::with_msg(
                    ErrorCode::MultipleMatches,
                    format!("'{}' matches {} nodes", objname, count),
                ));
            }
            if let Some(found) = found {
                return Ok(found);
            }
        }
    }

    Err(Error::with_msg(
        ErrorCode::DefNotFound,
        format!("'{}' not found", objname),
    ))
}

// ===== impl Context =====

impl Context {
    /// Search a child queue for a node name.
    ///
    /// Returns the match and the number of matching candidates. In exact
    /// mode the first match is returned at once. In partial mode every
    /// matching candidate is counted and the first one is returned.
    pub fn find_template(
        &self,
        queue: &[NodeId],
        modname: Option<&str>,
        objname: &str,
        opts: FindOptions,
    ) -> (Option<NodeId>, u32) {
        let mut state = MatchState::default();
        match self.find_in_queue(queue, modname, objname, opts, &mut state) {
            Some(found) => (Some(found), state.count.max(1)),
            None => (state.first, state.count),
        }
    }

    fn find_in_queue(
        &self,
        queue: &[NodeId],
        modname: Option<&str>,
        objname: &str,
        opts: FindOptions,
        state: &mut MatchState,
    ) -> Option<NodeId> {
        for id in queue {
            let Some(node) = SchemaNode::from_id(self, *id) else {
                continue;
            };
            if !node.has_name() || !node.is_enabled() {
                continue;
            }
            let kind = node.kind();
            if opts.dataonly && kind.is_rpc_or_notif() {
                continue;
            }

            if kind.is_choice_or_case() {
                let inner = self.find_in_queue(
                    node.datadefs(),
                    modname,
                    objname,
                    opts,
                    state,
                );
                if inner.is_some() {
                    return inner;
                }
                if opts.deep || opts.partial {
                    continue;
                }
                // Non-deep exact search also accepts the wrapper name.
            }

            if !self.candidate_matches(&node, modname, objname, opts) {
                continue;
            }
            if opts.partial {
                state.count += 1;
                state.first.get_or_insert(*id);
                continue;
            }
            return Some(*id);
        }
        None
    }

    fn candidate_matches(
        &self,
        node: &SchemaNode<'_>,
        modname: Option<&str>,
        objname: &str,
        opts: FindOptions,
    ) -> bool {
        if let Some(modname) = modname {
            if node.module_name() != Some(modname) {
                return false;
            }
        }
        let candidate = if opts.altnames {
            match node.alt_name() {
                Some(altname) => altname,
                None => return false,
            }
        } else {
            match node.name() {
                Some(name) => name,
                None => return false,
            }
        };
        name_matches(candidate, objname, opts.partial, opts.usecase)
    }

    /// Search the top level of a module, its included submodules and, for
    /// a submodule, its main module.
    pub(crate) fn find_top_in(
        &self,
        module: ModuleId,
        modname: Option<&str>,
        objname: &str,
        opts: FindOptions,
    ) -> (Option<NodeId>, u32) {
        let Ok(mdata) = self.module_data(module) else {
            return (None, 0);
        };

        let mut queues = vec![module];
        queues.extend(self.included_submodules(module));
        if let Some(main) = mdata.parent {
            queues.push(main);
        }

        let mut first = None;
        let mut count = 0;
        for id in queues {
            let Ok(mdata) = self.module_data(id) else {
                continue;
            };
            let (found, matches) =
                self.find_template(&mdata.datadefs, modname, objname, opts);
            if !opts.partial && found.is_some() {
                return (found, matches);
            }
            count += matches;
            if first.is_none() {
                first = found;
            }
        }
        (first, count)
    }

    /// Find a top-level node by name in any registered main module.
    pub fn find_template_all(
        &self,
        modname: Option<&str>,
        objname: &str,
    ) -> Option<SchemaNode<'_>> {
        self.modules()
            .filter(|module| module.is_module())
            .filter(|module| modname.is_none_or(|m| module.name() == m))
            .find_map(|module| module.find_template_top(objname))
    }

    /// Resolve an absolute path such as `/m:top/a/b`.
    ///
    /// A segment prefix names a module (by name or by prefix); unqualified
    /// segments stay in the module of the previous segment.
    pub fn find_path(&self, path: &str) -> Result<SchemaNode<'_>> {
        let not_found = || {
            Error::with_msg(
                ErrorCode::DefNotFound,
                format!("path '{}' not found", path),
            )
        };
        let Some(rest) = path.strip_prefix('/') else {
            return Err(Error::with_msg(
                ErrorCode::InvalidValue,
                format!("path '{}' is not absolute", path),
            ));
        };

        let mut current: Option<SchemaNode<'_>> = None;
        let mut module: Option<SchemaModule<'_>> = None;
        for segment in rest.split('/') {
            let (prefix, name) = split_qname(segment);
            if let Some(prefix) = prefix {
                let found = self
                    .module_by_name_or_prefix(prefix)
                    .ok_or_else(not_found)?;
                module = Some(found);
            }
            let module = module.as_ref().ok_or_else(not_found)?;
            let modname = module.main_module_name();

            current = Some(match &current {
                None => module
                    .find_template_top_ex(
                        Some(modname),
                        name,
                        MatchMode::Exact,
                        false,
                        false,
                    )
                    .map_err(|_| not_found())?,
                Some(node) => node
                    .find_child_ex(
                        Some(modname),
                        name,
                        MatchMode::Exact,
                        false,
                        false,
                    )
                    .map_err(|_| not_found())?,
            });
        }
        current.ok_or_else(not_found)
    }

    fn module_by_name_or_prefix(&self, name: &str) -> Option<SchemaModule<'_>> {
        self.get_module(name, None).or_else(|| {
            self.modules().find(|module| {
                module.is_module() && module.prefix() == Some(name)
            })
        })
    }
}

// ===== impl SchemaModule =====

impl<'a> SchemaModule<'a> {
    /// Find a top-level node by exact name.
    pub fn find_template_top(&self, objname: &str) -> Option<SchemaNode<'a>> {
        let (found, _) = self.context().find_top_in(
            self.id(),
            None,
            objname,
            FindOptions::exact(),
        );
        SchemaNode::from_id_opt(self.context(), found)
    }

    /// Find a top-level node using the extended match driver.
    pub fn find_template_top_ex(
        &self,
        modname: Option<&str>,
        objname: &str,
        mode: MatchMode,
        altnames: bool,
        dataonly: bool,
    ) -> Result<SchemaNode<'a>> {
        let context = self.context();
        let base = FindOptions::deep().dataonly(dataonly);
        let found = find_ex(base, mode, altnames, objname, |opts| {
            context.find_top_in(self.id(), modname, objname, opts)
        })?;
        context.node(found)
    }
}

// ===== impl SchemaNode =====

impl<'a> SchemaNode<'a> {
    /// Find a child by exact name, looking through choice and case layers.
    pub fn find_child(
        &self,
        modname: Option<&str>,
        objname: &str,
    ) -> Option<SchemaNode<'a>> {
        let (found, _) = self.context().find_template(
            self.datadefs(),
            modname,
            objname,
            FindOptions::deep(),
        );
        SchemaNode::from_id_opt(self.context(), found)
    }

    /// Find a child using the extended match driver.
    pub fn find_child_ex(
        &self,
        modname: Option<&str>,
        objname: &str,
        mode: MatchMode,
        altnames: bool,
        dataonly: bool,
    ) -> Result<SchemaNode<'a>> {
        let context = self.context();
        let base = FindOptions::deep().dataonly(dataonly);
        let queue = self.datadefs();
        let found = find_ex(base, mode, altnames, objname, |opts| {
            context.find_template(queue, modname, objname, opts)
        })?;
        context.node(found)
    }

    /// Find the children whose names start with `partial_name`.
    ///
    /// Returns the first match and the number of matches.
    pub fn match_child_str(
        &self,
        modname: Option<&str>,
        partial_name: &str,
    ) -> (Option<SchemaNode<'a>>, u32) {
        let (found, count) = self.context().find_template(
            self.datadefs(),
            modname,
            partial_name,
            FindOptions::deep().partial(true),
        );
        (SchemaNode::from_id_opt(self.context(), found), count)
    }

    /// Find a case of a choice by name.
    pub fn find_case(
        &self,
        modname: Option<&str>,
        casename: &str,
    ) -> Option<SchemaNode<'a>> {
        if self.kind() != ObjectKind::Choice {
            return None;
        }
        self.children().find(|case| {
            case.kind() == ObjectKind::Case
                && case.name() == Some(casename)
                && modname.is_none_or(|m| case.module_name() == Some(m))
        })
    }

    fn walk_filter(
        node: &SchemaNode<'a>,
        modname: Option<&str>,
        name: Option<&str>,
        config_only: bool,
    ) -> bool {
        if !node.has_name() || !node.is_enabled() {
            return false;
        }
        if modname.is_some_and(|m| node.module_name() != Some(m)) {
            return false;
        }
        if name.is_some_and(|n| node.name() != Some(n)) {
            return false;
        }
        !config_only || node.is_config()
    }

    /// Call `visitor` for every data child matching the filters, looking
    /// through choice and case layers.
    ///
    /// Returns whether the visitor was called.
    pub fn find_all_children<F>(
        &self,
        modname: Option<&str>,
        name: Option<&str>,
        config_only: bool,
        mut visitor: F,
    ) -> bool
    where
        F: FnMut(SchemaNode<'a>) -> ControlFlow<()>,
    {
        let mut called = false;
        let _ = self.walk_children(
            modname,
            name,
            config_only,
            &mut visitor,
            &mut called,
        );
        called
    }

    fn walk_children<F>(
        &self,
        modname: Option<&str>,
        name: Option<&str>,
        config_only: bool,
        visitor: &mut F,
        called: &mut bool,
    ) -> ControlFlow<()>
    where
        F: FnMut(SchemaNode<'a>) -> ControlFlow<()>,
    {
        for child in self.children() {
            if child.kind().is_choice_or_case() {
                if child.is_enabled() {
                    child.walk_children(
                        modname,
                        name,
                        config_only,
                        visitor,
                        called,
                    )?;
                }
                continue;
            }
            if Self::walk_filter(&child, modname, name, config_only) {
                *called = true;
                visitor(child)?;
            }
        }
        ControlFlow::Continue(())
    }

    /// Call `visitor` for every ancestor matching the filters, skipping
    /// choice and case layers.
    ///
    /// Returns whether the visitor was called.
    pub fn find_all_ancestors<F>(
        &self,
        modname: Option<&str>,
        name: Option<&str>,
        config_only: bool,
        mut visitor: F,
    ) -> bool
    where
        F: FnMut(SchemaNode<'a>) -> ControlFlow<()>,
    {
        let mut called = false;
        for ancestor in self.ancestors() {
            if ancestor.kind().is_choice_or_case() {
                continue;
            }
            if Self::walk_filter(&ancestor, modname, name, config_only) {
                called = true;
                if visitor(ancestor).is_break() {
                    break;
                }
            }
        }
        called
    }

    /// Call `visitor` for every descendant matching the filters, in
    /// depth-first order, skipping choice and case layers.
    ///
    /// Returns whether the visitor was called.
    pub fn find_all_descendants<F>(
        &self,
        modname: Option<&str>,
        name: Option<&str>,
        config_only: bool,
        mut visitor: F,
    ) -> bool
    where
        F: FnMut(SchemaNode<'a>) -> ControlFlow<()>,
    {
        let mut called = false;
        for node in self.traverse().skip(1) {
            if node.kind().is_choice_or_case() {
                continue;
            }
            if Self::walk_filter(&node, modname, name, config_only) {
                called = true;
                if visitor(node).is_break() {
                    break;
                }
            }
        }
        called
    }
}
