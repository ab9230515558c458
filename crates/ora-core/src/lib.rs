//! ORA Core
//!
//! Decodes layered raster containers (a zip archive holding a `stack.xml`
//! stack description plus per-layer PNG entries) into a tree of groups and
//! layers.
//!
//! # Architecture
//!
//! ```text
//! Archive ──► stack.xml ──► StackNode tree ──► TreeBuilder (rayon fan-out)
//!    ▲                                              │         │
//!    └──── Archive::resolve_image ◄── layer ────────┘         ▼
//!                                            Container { flat list, UUID index, root group }
//! ```
//!
//! - [`Container`]: root aggregate, owns the flat registry and the root group
//! - [`Item`]: Layer or Group, retains its markup node for lazy metadata reads
//! - [`StackNode`]: owned element tree of the stack description
//! - [`Archive`]: shared archive handle and PNG resolver
//!
//! # Example
//!
//! ```rust,no_run
//! use ora_core::Container;
//!
//! # fn example() -> Result<(), ora_core::OraError> {
//! let container = Container::open("assets/map.ora")?;
//!
//! let layer = container.get_by_uuid("layer1")?;
//! println!("{} opacity={} visible={}", layer.name(), layer.opacity(), layer.visible());
//!
//! for layer in container.layers() {
//!     let image = layer.image().expect("layers carry pixels");
//!     println!("{}: {}x{}", layer.name(), image.width(), image.height());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod archive;
mod builder;
pub mod config;
pub mod container;
pub mod error;
pub mod item;
pub mod node;

// Re-exports for convenience
pub use archive::{decode_png, Archive};
pub use config::{LoadConfig, DEFAULT_DESCRIPTOR};
pub use container::Container;
pub use error::{OraError, OraResult, ParseError};
pub use item::{Group, Item, ItemKind, Layer, NodeClass};
pub use node::{Attribute, StackNode, DEFAULT_MAX_DEPTH, MAX_DEPTH_CEILING};

/// Decoded pixel buffer type carried by layers, and its pixel
pub use image::{Rgba, RgbaImage};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with decoded containers
    pub use crate::{Container, Item, ItemKind, LoadConfig, OraError, OraResult, StackNode};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
