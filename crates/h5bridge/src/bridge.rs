//! The boundary surface: one facade over resolution, description,
//! selection, marshaling, and aggregation.
//!
//! Every operation is self-contained: it opens what it needs, works, and
//! releases every handle before returning, so the container's open-object
//! count is the same after each call as before it. Nothing is cached
//! between calls.

use std::collections::BTreeMap;

use tracing::debug;

use h5bridge_store::{Container, LinkInfo, LinkKind, ObjectKind};

use crate::attrs::{attributes_of, AttrEntry};
use crate::describe::{describe, TypeDescriptor};
use crate::error::Result;
use crate::marshal::{self, AttributeSource, DatasetSource, MarshaledValue};
use crate::resolve::{resolve, resolve_attribute, Role};
use crate::select::select;

/// Join a parent path and a child name the way the container spells paths.
fn child_path(parent: &str, name: &str) -> String {
    let trimmed = parent.trim_matches('/');
    if trimmed.is_empty() {
        name.to_string()
    } else {
        format!("{trimmed}/{name}")
    }
}

/// Introspection and read operations over one container.
pub struct Bridge<C: Container> {
    container: C,
}

impl<C: Container> Bridge<C> {
    pub fn new(container: C) -> Self {
        Bridge { container }
    }

    /// Borrow the underlying container.
    pub fn container(&self) -> &C {
        &self.container
    }

    /// Give the container back.
    pub fn into_inner(self) -> C {
        self.container
    }

    // -----------------------------------------------------------------------
    // Hierarchy
    // -----------------------------------------------------------------------

    /// Number of links in the group at `path`.
    pub fn child_count(&self, path: &str) -> Result<u64> {
        Ok(self.container.link_names(path)?.len() as u64)
    }

    /// Names of the children of the group at `path`, in increasing name
    /// order.
    pub fn list_children(&self, path: &str) -> Result<Vec<String>> {
        debug!(path, "listing children");
        Ok(self.container.link_names(path)?)
    }

    /// Object kinds of the children of `path`, index-aligned with
    /// [`Bridge::list_children`].
    pub fn list_child_kinds(&self, path: &str) -> Result<Vec<ObjectKind>> {
        let names = self.container.link_names(path)?;
        let mut kinds = Vec::with_capacity(names.len());
        for name in &names {
            kinds.push(self.container.child_kind(&child_path(path, name))?);
        }
        Ok(kinds)
    }

    /// Link kinds of the children of `path`, index-aligned with
    /// [`Bridge::list_children`].
    pub fn list_link_kinds(&self, path: &str) -> Result<Vec<LinkKind>> {
        let names = self.container.link_names(path)?;
        let mut kinds = Vec::with_capacity(names.len());
        for name in &names {
            kinds.push(self.container.link_info(path, name)?.kind);
        }
        Ok(kinds)
    }

    /// Metadata of the link `name` in the group at `path`.
    pub fn link_info(&self, path: &str, name: &str) -> Result<LinkInfo> {
        Ok(self.container.link_info(path, name)?)
    }

    // -----------------------------------------------------------------------
    // Description
    // -----------------------------------------------------------------------

    /// Descriptor of the dataset at `path`.
    pub fn describe(&self, path: &str) -> Result<TypeDescriptor> {
        debug!(path, "describing dataset");
        let handle = resolve(&self.container, path, Role::Dataset)?;
        describe(&self.container, handle.raw())
    }

    /// Descriptor of the attribute `name` on the node at `path`.
    pub fn describe_attribute(&self, path: &str, name: &str) -> Result<TypeDescriptor> {
        debug!(path, name, "describing attribute");
        let (_owner, attr) = resolve_attribute(&self.container, path, name)?;
        describe(&self.container, attr.raw())
    }

    /// Descriptors of every attribute on the node at `path`, keyed by name.
    pub fn list_attributes(&self, path: &str) -> Result<BTreeMap<String, AttrEntry>> {
        attributes_of(&self.container, path)
    }

    // -----------------------------------------------------------------------
    // Data
    // -----------------------------------------------------------------------

    /// Read the dataset at `path`, optionally restricted to the rectangular
    /// sub-region given by `offset` and `count` (which must be provided
    /// together, one entry per dimension).
    pub fn read_data(
        &self,
        path: &str,
        offset: Option<&[u64]>,
        count: Option<&[u64]>,
    ) -> Result<MarshaledValue> {
        debug!(path, ?offset, ?count, "reading dataset");
        let handle = resolve(&self.container, path, Role::Dataset)?;
        let space = self.container.get_space(handle.raw())?;
        let region = select(&space, offset, count)?;
        marshal::read(&DatasetSource::new(&self.container, handle.raw()), &region)
    }

    /// Read the full value of the attribute `name` on the node at `path`.
    pub fn read_attribute(&self, path: &str, name: &str) -> Result<MarshaledValue> {
        debug!(path, name, "reading attribute");
        let (_owner, attr) = resolve_attribute(&self.container, path, name)?;
        let space = self.container.get_space(attr.raw())?;
        let region = select(&space, None, None)?;
        marshal::read(&AttributeSource::new(&self.container, attr.raw()), &region)
    }
}

impl<C: Container + std::fmt::Debug> std::fmt::Debug for Bridge<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("container", &self.container)
            .finish()
    }
}
