//! Container-side collaborator surface for the h5bridge marshaling engine.
//!
//! A *container* is a self-describing hierarchical array store: a tree of
//! named nodes (groups, datasets, named types) connected by links, where
//! datasets and attributes carry their own shape ([`Dataspace`]) and element
//! type ([`Datatype`]) independent of any host type system.
//!
//! This crate defines that surface at its interface:
//!
//! - the object model ([`ObjectKind`], [`LinkKind`], [`AccessMode`]) with
//!   numeric codes matching the source format bit-for-bit,
//! - [`Dataspace`], [`Datatype`], and source-side [`SourceSelection`]s,
//! - the handle-based [`Container`] trait the engine consumes,
//! - [`MemContainer`], an in-memory reference container with a handle table
//!   and a library-owned variable-length heap, built through
//!   [`ContainerBuilder`].
//!
//! The container format itself is externally defined; compatibility means
//! interpreting its constants and layouts correctly, not redefining them.

pub mod builder;
pub mod container;
pub mod dataspace;
pub mod datatype;
pub mod error;
pub mod memory;
pub mod object;
pub mod selection;

pub use builder::{ArraySpec, ContainerBuilder};
pub use container::{Container, RawHandle};
pub use dataspace::Dataspace;
pub use datatype::{ByteOrder, CharacterSet, Datatype, TypeClass, VLEN_REF_SIZE};
pub use error::{StoreError, StoreResult};
pub use memory::MemContainer;
pub use object::{AccessMode, LinkInfo, LinkKind, ObjectKind};
pub use selection::{Hyperslab, SourceSelection};
