//
// Copyright (c) The yang-schema Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Object identifiers.
//!
//! An object identifier names a schema node by the path of node names from
//! the schema root (or from a stop node) down to it. The XPath style uses
//! `/` before every segment; the code style joins segments with `.` and
//! maps `-` to `_` so the result is usable as an identifier.

use std::fmt::{self, Write};

use crate::error::{Error, ErrorCode, Result};
use crate::object::ObjectFlags;
use crate::schema::SchemaNode;
use crate::types::NodeId;

/// Rendering style of an object identifier.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum IdStyle {
    /// `/mod:top/child`
    #[default]
    Xpath,
    /// `mod_top.child`
    Code,
}

/// Module qualification policy.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Qualify {
    /// Qualify the first segment and every segment whose module differs
    /// from the segment above it, using the module name.
    #[default]
    Boundary,
    /// Qualify every segment with its module name.
    Always,
    /// Qualify every segment with its module's XML prefix. Choice and case
    /// segments are left out.
    Prefix,
}

/// Object identifier rendering options.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ObjectIdOptions {
    pub style: IdStyle,
    pub qualify: Qualify,
    /// Render the path relative to this ancestor. A node that is not an
    /// ancestor of the rendered node is ignored and the path is absolute.
    pub stop: Option<NodeId>,
}

/// Byte counter used for the measure pass.
#[derive(Default)]
struct Counter(usize);

/// Bounded writer used for the fill pass.
struct SliceWriter<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

// ===== impl ObjectIdOptions =====

impl ObjectIdOptions {
    pub fn xpath() -> ObjectIdOptions {
        ObjectIdOptions::default()
    }

    pub fn code() -> ObjectIdOptions {
        ObjectIdOptions {
            style: IdStyle::Code,
            ..Default::default()
        }
    }

    pub fn qualify(mut self, qualify: Qualify) -> ObjectIdOptions {
        self.qualify = qualify;
        self
    }

    pub fn stop(mut self, stop: NodeId) -> ObjectIdOptions {
        self.stop = Some(stop);
        self
    }
}

// ===== impl Counter =====

impl Write for Counter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

// ===== impl SliceWriter =====

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.pos + s.len();
        let dst = self.buf.get_mut(self.pos..end).ok_or(fmt::Error)?;
        dst.copy_from_slice(s.as_bytes());
        self.pos = end;
        Ok(())
    }
}

// ===== impl SchemaNode =====

impl<'a> SchemaNode<'a> {
    /// Returns the length in bytes of the node's object identifier.
    pub fn object_id_len(&self, options: &ObjectIdOptions) -> usize {
        let mut counter = Counter::default();
        // Counting never fails.
        let _ = self.write_object_id(options, &mut counter);
        counter.0
    }

    /// Write the node's object identifier into `buf` and return the number
    /// of bytes written.
    ///
    /// Fails with `BufferOverflow` when `buf` is shorter than
    /// [`SchemaNode::object_id_len`]; the buffer contents are unspecified
    /// in that case.
    pub fn copy_object_id(
        &self,
        options: &ObjectIdOptions,
        buf: &mut [u8],
    ) -> Result<usize> {
        let mut writer = SliceWriter { buf, pos: 0 };
        self.write_object_id(options, &mut writer).map_err(|_| {
            Error::with_msg(
                ErrorCode::BufferOverflow,
                format!(
                    "object identifier needs {} bytes",
                    self.object_id_len(options)
                ),
            )
        })?;
        Ok(writer.pos)
    }

    /// Returns the node's object identifier.
    pub fn gen_object_id(&self, options: &ObjectIdOptions) -> String {
        let mut id = String::with_capacity(self.object_id_len(options));
        let _ = self.write_object_id(options, &mut id);
        id
    }

    /// Segments from the root (or the stop node) down to this node.
    fn id_segments(&self, options: &ObjectIdOptions) -> Vec<SchemaNode<'a>> {
        let mut segments = self
            .inclusive_ancestors()
            .take_while(|node| Some(node.id()) != options.stop)
            .filter(|node| node.has_name())
            .filter(|node| !node.flags().contains(ObjectFlags::ROOT))
            .filter(|node| {
                options.qualify != Qualify::Prefix
                    || !node.kind().is_choice_or_case()
            })
            .collect::<Vec<_>>();
        segments.reverse();
        segments
    }

    /// Module qualifier of a segment, if any.
    fn id_qualifier(
        &self,
        options: &ObjectIdOptions,
        above: Option<&SchemaNode<'a>>,
    ) -> Option<&'a str> {
        match options.qualify {
            Qualify::Always => self.module_name(),
            Qualify::Prefix => self.module_xmlprefix().or(self.module_name()),
            Qualify::Boundary => match above {
                None if options.stop.is_none() => self.module_name(),
                None => {
                    let stop = options
                        .stop
                        .and_then(|stop| self.context().node(stop).ok());
                    match stop {
                        Some(stop)
                            if stop.module_name() == self.module_name() =>
                        {
                            None
                        }
                        _ => self.module_name(),
                    }
                }
                Some(above) if above.module_name() != self.module_name() => {
                    self.module_name()
                }
                Some(_) => None,
            },
        }
    }

    fn write_object_id<W: Write>(
        &self,
        options: &ObjectIdOptions,
        out: &mut W,
    ) -> fmt::Result {
        let options = &ObjectIdOptions {
            stop: options
                .stop
                .filter(|stop| self.ancestors().any(|node| node.id() == *stop)),
            ..*options
        };
        let segments = self.id_segments(options);
        let relative = options.stop.is_some();
        let mut above = None;
        for (index, node) in segments.iter().enumerate() {
            let qualifier = node.id_qualifier(options, above);
            let name = node.name().unwrap_or_default();
            match options.style {
                IdStyle::Xpath => {
                    if index > 0 || !relative {
                        out.write_char('/')?;
                    }
                    if let Some(qualifier) = qualifier {
                        out.write_str(qualifier)?;
                        out.write_char(':')?;
                    }
                    out.write_str(name)?;
                }
                IdStyle::Code => {
                    if index > 0 {
                        out.write_char('.')?;
                    }
                    if let Some(qualifier) = qualifier {
                        write_code_ident(out, qualifier)?;
                        out.write_char('_')?;
                    }
                    write_code_ident(out, name)?;
                }
            }
            above = Some(node);
        }
        Ok(())
    }
}

fn write_code_ident<W: Write>(out: &mut W, ident: &str) -> fmt::Result {
    for c in ident.chars() {
        out.write_char(if c == '-' { '_' } else { c })?;
    }
    Ok(())
}
