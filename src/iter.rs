//
// Copyright (c) The yang-schema Core Contributors
//
// See LICENSE for license details.
//

//! Schema tree iterators.
//!
//! Nodes are addressed by [`NodeId`], so the iterators walk the id queues
//! stored in the arena and skip ids whose node has been freed.

use std::slice;

use crate::context::Context;
use crate::schema::SchemaModule;
use crate::types::{ModuleId, NodeId};
use crate::utils::Binding;

/// Arena navigation shared by the node handle types.
#[doc(hidden)]
pub trait NodeIterable<'a>:
    Sized + Binding<'a, Id = NodeId, Container = Context>
{
    /// Returns the context owning the node.
    fn context(&self) -> &'a Context;

    /// Returns the parent node.
    fn parent(&self) -> Option<Self>;

    /// Returns the ids of the child nodes, in schema order.
    fn child_ids(&self) -> &'a [NodeId];
}

/// An iterator over a queue of sibling nodes.
#[derive(Debug)]
pub struct Siblings<'a, T>
where
    T: NodeIterable<'a>,
{
    context: &'a Context,
    head: Option<T>,
    ids: slice::Iter<'a, NodeId>,
}

/// An iterator over the ancestors of a node.
#[derive(Debug)]
pub struct Ancestors<'a, T>
where
    T: NodeIterable<'a>,
{
    next: Option<T>,
    _marker: std::marker::PhantomData<&'a T>,
}

/// An iterator over a subtree in document order (depth-first search
/// algorithm).
///
/// Uses, augment and refine nodes still held by the tree are visited like
/// any other node.
#[derive(Debug)]
pub struct Traverse<'a, T>
where
    T: NodeIterable<'a>,
{
    context: &'a Context,
    root: Option<T>,
    stack: Vec<slice::Iter<'a, NodeId>>,
}

/// An iterator over the registered modules and submodules.
#[derive(Debug)]
pub struct SchemaModules<'a> {
    context: &'a Context,
    ids: std::ops::Range<u32>,
}

// ===== impl Siblings =====

impl<'a, T> Siblings<'a, T>
where
    T: NodeIterable<'a>,
{
    pub fn new(context: &'a Context, ids: &'a [NodeId]) -> Siblings<'a, T> {
        Siblings {
            context,
            head: None,
            ids: ids.iter(),
        }
    }

    /// Iterator yielding a single node that is not linked into any queue.
    pub fn single(node: T) -> Siblings<'a, T> {
        Siblings {
            context: node.context(),
            head: Some(node),
            ids: <&[NodeId]>::default().iter(),
        }
    }
}

impl<'a, T> Iterator for Siblings<'a, T>
where
    T: NodeIterable<'a>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if let Some(head) = self.head.take() {
            return Some(head);
        }
        let context = self.context;
        self.ids.by_ref().find_map(|id| T::from_id(context, *id))
    }
}

// ===== impl Ancestors =====

impl<'a, T> Ancestors<'a, T>
where
    T: NodeIterable<'a>,
{
    pub fn new(next: Option<T>) -> Ancestors<'a, T> {
        Ancestors {
            next,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<'a, T> Iterator for Ancestors<'a, T>
where
    T: NodeIterable<'a>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let node = self.next.take()?;
        self.next = node.parent();
        Some(node)
    }
}

// ===== impl Traverse =====

impl<'a, T> Traverse<'a, T>
where
    T: NodeIterable<'a>,
{
    pub fn new(root: T) -> Traverse<'a, T> {
        Traverse {
            context: root.context(),
            root: Some(root),
            stack: Vec::new(),
        }
    }
}

impl<'a, T> Iterator for Traverse<'a, T>
where
    T: NodeIterable<'a>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if let Some(root) = self.root.take() {
            self.stack.push(root.child_ids().iter());
            return Some(root);
        }

        // Children first, then the remaining siblings of each level.
        loop {
            let ids = self.stack.last_mut()?;
            match ids.next() {
                Some(id) => {
                    let Some(node) = T::from_id(self.context, *id) else {
                        continue;
                    };
                    self.stack.push(node.child_ids().iter());
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

// ===== impl SchemaModules =====

impl<'a> SchemaModules<'a> {
    pub fn new(context: &'a Context) -> SchemaModules<'a> {
        let count = context.modules.len() as u32;
        SchemaModules {
            context,
            ids: 0..count,
        }
    }
}

impl<'a> Iterator for SchemaModules<'a> {
    type Item = SchemaModule<'a>;

    fn next(&mut self) -> Option<SchemaModule<'a>> {
        let context = self.context;
        self.ids
            .by_ref()
            .find_map(|id| SchemaModule::from_id(context, ModuleId(id)))
    }
}
