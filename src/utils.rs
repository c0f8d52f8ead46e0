//
// Copyright (c) The yang-schema Core Contributors
//
// See LICENSE for license details.
//

/// Compare a candidate node name against a requested name.
///
/// In partial mode only the first `objname.len()` characters of the
/// candidate are compared.
pub(crate) fn name_matches(
    candidate: &str,
    objname: &str,
    partial: bool,
    usecase: bool,
) -> bool {
    let candidate = if partial {
        match candidate.get(..objname.len()) {
            Some(prefix) => prefix,
            None => return false,
        }
    } else {
        candidate
    };

    if usecase {
        candidate == objname
    } else {
        candidate.eq_ignore_ascii_case(objname)
    }
}

/// Split an optional `prefix:name` string.
pub(crate) fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, qname),
    }
}

/// A trait implemented by all handle types that can be created from an
/// arena identifier and the container owning the arena.
///
/// Returns `None` when the identifier no longer refers to a live entry.
#[doc(hidden)]
pub trait Binding<'a>
where
    Self: Sized,
    <Self as Binding<'a>>::Container: 'a,
{
    type Id: Copy;
    type Container;

    fn from_id(container: &'a Self::Container, id: Self::Id) -> Option<Self>;

    fn from_id_opt(
        container: &'a Self::Container,
        id: Option<Self::Id>,
    ) -> Option<Self> {
        id.and_then(|id| Self::from_id(container, id))
    }
}
