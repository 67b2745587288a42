//! Typed marshaling and introspection over hierarchical array containers.
//!
//! The engine sits between a self-describing container of groups, datasets
//! and named datatypes (exposed through the handle-based
//! [`Container`](h5bridge_store::Container) trait) and a dynamically typed
//! host. It resolves paths to objects, derives normalized type
//! descriptors, validates rectangular sub-region selections, and marshals
//! element bytes into host-safe values, resolving variable-length string
//! storage along the way.
//!
//! ```
//! use h5bridge::Bridge;
//! use h5bridge_store::{ArraySpec, ContainerBuilder};
//!
//! let mut builder = ContainerBuilder::new();
//! builder.add_group("measurements");
//! builder.add_dataset("measurements/temps", ArraySpec::f64(&[21.5, 22.0, 19.8]));
//! builder.set_attr("measurements/temps", "units", ArraySpec::fixed_str(8, &["celsius"]));
//! let bridge = Bridge::new(builder.finish());
//!
//! let descriptor = bridge.describe("measurements/temps")?;
//! assert_eq!(descriptor.shape, vec![3]);
//! assert_eq!(descriptor.element_size, 8);
//!
//! let units = bridge.read_attribute("measurements/temps", "units")?;
//! # let _ = units;
//! # Ok::<(), h5bridge::Error>(())
//! ```

pub mod attrs;
pub mod bridge;
pub mod describe;
pub mod error;
pub mod handle;
pub mod marshal;
pub mod resolve;
pub mod select;

pub use attrs::{attributes_of, AttrEntry};
pub use bridge::Bridge;
pub use describe::{describe, TypeDescriptor};
pub use error::{Error, Result, SelectionError};
pub use handle::ScopedHandle;
pub use marshal::{AttributeSource, DataSource, DatasetSource, MarshaledValue};
pub use resolve::{resolve, resolve_attribute, Role};
pub use select::{select, Region};
