//! Attribute metadata aggregation.
//!
//! Enumerates every attribute on a node and derives a descriptor for each.
//! One bad attribute must not hide its siblings, so per-attribute failures
//! become [`AttrEntry::Failed`] markers in the map instead of aborting the
//! whole enumeration.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use h5bridge_store::Container;

use crate::describe::{describe, TypeDescriptor};
use crate::error::Result;
use crate::handle::ScopedHandle;
use crate::resolve::{resolve, Role};

/// One attribute's aggregation outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AttrEntry {
    /// The attribute was opened and described.
    Described(TypeDescriptor),
    /// Opening or describing the attribute failed; the message records why.
    Failed(String),
}

/// Describe every attribute on the node at `path`.
///
/// The result maps attribute names, in increasing name order, to their
/// outcomes. Failure to resolve the node itself is still an error; only
/// per-attribute failures degrade to markers.
pub fn attributes_of<C: Container>(
    container: &C,
    path: &str,
) -> Result<BTreeMap<String, AttrEntry>> {
    let owner = resolve(container, path, Role::Any)?;
    let names = container.attribute_names(owner.raw())?;
    debug!(path, count = names.len(), "aggregating attributes");

    let mut out = BTreeMap::new();
    for name in names {
        let entry = match container.open_attribute(owner.raw(), &name) {
            Ok(raw) => {
                let attr = ScopedHandle::new(container, raw);
                match describe(container, attr.raw()) {
                    Ok(descriptor) => AttrEntry::Described(descriptor),
                    Err(e) => AttrEntry::Failed(e.to_string()),
                }
            }
            Err(e) => AttrEntry::Failed(e.to_string()),
        };
        out.insert(name, entry);
    }
    Ok(out)
}
