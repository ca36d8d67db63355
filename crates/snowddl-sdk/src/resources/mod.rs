//! Per-resource options, row structs and operation handles.

pub mod alerts;
pub mod common;
pub mod databases;
pub mod functions;
pub mod schemas;
pub mod warehouses;

use snowddl_core::{Error, ObjectIdentifier, Result};

/// Domain objects that know their own identifier.
pub trait Identified {
    /// Identifier type of the object.
    type Id: ObjectIdentifier;

    /// Returns the object's identifier.
    fn id(&self) -> Self::Id;
}

/// Returns the object whose identifier equals `id`.
///
/// `LIKE` patterns are case-insensitive and treat `_` as a wildcard, so a
/// show filtered by name can return neighbours that must be discarded here.
pub fn find_one<T: Identified>(objects: Vec<T>, id: &T::Id) -> Result<T> {
    objects
        .into_iter()
        .find(|object| object.id() == *id)
        .ok_or_else(|| Error::ObjectNotFound(id.fully_qualified_name()))
}
