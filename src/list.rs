//
// Copyright (c) The yang-schema Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Ordered value lists.

use std::cmp::Ordering;

use crate::error::{Error, ErrorCode, Result};
use crate::types::BaseType;

/// Merge policy used when inserting or merging list members.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MergeType {
    First,
    Last,
    Sort,
}

/// One list member.
#[derive(Clone, Debug, PartialEq)]
pub enum ListMember {
    Str(String),
    Int(i64),
    Uint(u64),
    Bool(bool),
}

/// An ordered list of values sharing one base type.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueList {
    btype: BaseType,
    members: Vec<ListMember>,
}

// ===== impl ListMember =====

impl ListMember {
    /// Parse one token according to the list base type.
    pub fn parse(btype: BaseType, token: &str) -> Result<ListMember> {
        let invalid = || {
            Error::with_msg(
                ErrorCode::InvalidValue,
                format!("invalid {:?} list member '{}'", btype, token),
            )
        };

        let member = match btype {
            BaseType::Int8
            | BaseType::Int16
            | BaseType::Int32
            | BaseType::Int64 => {
                let value = token.parse::<i64>().map_err(|_| invalid())?;
                if !btype.int_in_range(value) {
                    return Err(invalid());
                }
                ListMember::Int(value)
            }
            BaseType::Uint8
            | BaseType::Uint16
            | BaseType::Uint32
            | BaseType::Uint64 => {
                let value = token.parse::<u64>().map_err(|_| invalid())?;
                if !btype.uint_in_range(value) {
                    return Err(invalid());
                }
                ListMember::Uint(value)
            }
            BaseType::Boolean => match token {
                "true" => ListMember::Bool(true),
                "false" => ListMember::Bool(false),
                _ => return Err(invalid()),
            },
            BaseType::Empty | BaseType::None => return Err(invalid()),
            _ => ListMember::Str(token.to_owned()),
        };

        Ok(member)
    }

    /// String value, if this is a string member.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ListMember::Str(value) => Some(value),
            _ => None,
        }
    }

    fn compare(&self, other: &ListMember) -> Ordering {
        match (self, other) {
            (ListMember::Str(a), ListMember::Str(b)) => a.cmp(b),
            (ListMember::Int(a), ListMember::Int(b)) => a.cmp(b),
            (ListMember::Uint(a), ListMember::Uint(b)) => a.cmp(b),
            (ListMember::Bool(a), ListMember::Bool(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ListMember::Bool(_) => 0,
            ListMember::Int(_) => 1,
            ListMember::Uint(_) => 2,
            ListMember::Str(_) => 3,
        }
    }
}

// ===== impl ValueList =====

impl ValueList {
    pub fn new(btype: BaseType) -> ValueList {
        ValueList {
            btype,
            members: Vec::new(),
        }
    }

    /// Base type of the members.
    pub fn btype(&self) -> BaseType {
        self.btype
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Remove all members.
    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Returns whether the string is present in the list.
    pub fn contains_str(&self, value: &str) -> bool {
        self.members.iter().any(|m| m.as_str() == Some(value))
    }

    /// Compare two lists member by member; a shorter list that is a prefix
    /// of the other sorts first.
    pub fn compare(&self, other: &ValueList) -> Ordering {
        for (a, b) in self.members.iter().zip(other.members.iter()) {
            match a.compare(b) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }
        self.members.len().cmp(&other.members.len())
    }

    /// Replace the contents of `dest` with a copy of this list.
    pub fn copy_to(&self, dest: &mut ValueList) -> Result<()> {
        if dest.btype != BaseType::None && dest.btype != self.btype {
            return Err(Error::with_msg(
                ErrorCode::WrongType,
                "list base types differ",
            ));
        }
        dest.btype = self.btype;
        dest.members = self.members.clone();
        Ok(())
    }

    /// Move the members of `src` into this list.
    pub fn merge(
        &mut self,
        src: &mut ValueList,
        mergetyp: MergeType,
        allow_dups: bool,
    ) {
        for member in src.members.drain(..) {
            if !allow_dups && self.find(&member).is_some() {
                continue;
            }
            self.insert(member, mergetyp);
        }
    }

    /// Set the list from a whitespace separated string of string members.
    pub fn set_strlist(&mut self, liststr: &str) {
        self.btype = BaseType::String;
        self.members = liststr
            .split_whitespace()
            .map(|token| ListMember::Str(token.to_owned()))
            .collect();
    }

    /// Set the list from a whitespace separated string, parsing each token
    /// according to `btype`.
    pub fn set_list(&mut self, btype: BaseType, strval: &str) -> Result<()> {
        let members = strval
            .split_whitespace()
            .map(|token| ListMember::parse(btype, token))
            .collect::<Result<Vec<_>>>()?;
        self.btype = btype;
        self.members.extend(members);
        Ok(())
    }

    /// Find a member equal to `member`.
    pub fn find(&self, member: &ListMember) -> Option<&ListMember> {
        self.members.iter().find(|m| *m == member)
    }

    /// Insert a member according to the merge policy.
    pub fn insert(&mut self, member: ListMember, mergetyp: MergeType) {
        match mergetyp {
            MergeType::First => self.members.insert(0, member),
            MergeType::Last => self.members.push(member),
            MergeType::Sort => {
                let pos = self
                    .members
                    .iter()
                    .position(|m| m.compare(&member) == Ordering::Greater)
                    .unwrap_or(self.members.len());
                self.members.insert(pos, member);
            }
        }
    }

    /// Add a string member at the end of the list.
    pub fn push_str(&mut self, value: &str) {
        self.members.push(ListMember::Str(value.to_owned()));
    }

    pub fn first(&self) -> Option<&ListMember> {
        self.members.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListMember> {
        self.members.iter()
    }

    /// Iterate over the string members.
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.members.iter().filter_map(|m| m.as_str())
    }
}
