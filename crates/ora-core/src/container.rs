//! Container - root aggregate of a decoded archive
//!
//! Owns the flat item registry, the UUID index and the root group.
//!
//! # Lifecycle
//! A container is single-use: it is created empty, populated by one
//! [`Container::load`] call and read-only afterwards. A second `load` is
//! rejected with [`OraError::AlreadyLoaded`], whether or not the first one
//! succeeded.
//!
//! A failed load leaves whatever the builder registered before the failure in
//! the flat list and index, and no root group. Treat such a container as
//! partial.

use crate::archive::Archive;
use crate::builder::TreeBuilder;
use crate::config::LoadConfig;
use crate::error::{OraError, OraResult, ParseError};
use crate::item::Item;
use crate::node::StackNode;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::sync::Arc;

/// Stack for builder workers, enough for `MAX_DEPTH_CEILING` nested groups
const WORKER_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Flat registry shared by the builder's workers
///
/// `children` is in completion order. The UUID index is last-writer-wins.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    children: Vec<Arc<Item>>,
    by_uuid: HashMap<String, Arc<Item>>,
}

impl Registry {
    pub(crate) fn insert(&mut self, item: Arc<Item>) {
        self.by_uuid.insert(item.uuid().to_string(), Arc::clone(&item));
        self.children.push(item);
    }

    pub(crate) fn get(&self, uuid: &str) -> Option<&Arc<Item>> {
        self.by_uuid.get(uuid)
    }

    pub(crate) fn len(&self) -> usize {
        self.children.len()
    }
}

/// Decoded layered-image container
#[derive(Debug, Default)]
pub struct Container {
    config: LoadConfig,
    registry: RwLock<Registry>,
    root: Option<Arc<Item>>,
    document: Option<Arc<StackNode>>,
    loaded: bool,
}

impl Container {
    /// Create empty container with default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoadConfig::default())
    }

    /// Create empty container with custom configuration
    #[inline]
    #[must_use]
    pub fn with_config(config: LoadConfig) -> Self {
        Self {
            config,
            registry: RwLock::new(Registry::default()),
            root: None,
            document: None,
            loaded: false,
        }
    }

    /// Open and load a container file
    ///
    /// # Errors
    /// `OraError::Io` if the file cannot be opened, otherwise as [`Container::load`]
    pub fn open(path: impl AsRef<Path>) -> OraResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| OraError::io_error(path, e))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Create a container and load it from a reader
    ///
    /// # Errors
    /// As [`Container::load`]
    pub fn from_reader<R>(reader: R) -> OraResult<Self>
    where
        R: Read + Seek + Send,
    {
        let mut container = Self::new();
        container.load(reader)?;
        Ok(container)
    }

    /// Decode an archive into this container
    ///
    /// Locates the stack description, parses it, wraps the first top-level
    /// element of the document root as the root group and builds the tree
    /// concurrently on a worker pool sized by [`LoadConfig::max_workers`].
    ///
    /// # Errors
    /// - `OraError::AlreadyLoaded` on a second call
    /// - `OraError::ContainerOpen` if the archive is unreadable
    /// - `OraError::DescriptorNotFound` if the stack description is missing
    /// - `OraError::ParseFailure` if the description is malformed, empty or
    ///   nests deeper than [`LoadConfig::max_depth`]
    /// - `OraError::EntryNotFound` / `OraError::DecodeFailure` from any layer
    /// - `OraError::ThreadPool` if the worker pool cannot start
    pub fn load<R>(&mut self, reader: R) -> OraResult<()>
    where
        R: Read + Seek + Send,
    {
        if self.loaded {
            return Err(OraError::AlreadyLoaded);
        }
        self.loaded = true;

        let archive = Archive::open(reader)?;
        let descriptor = &self.config.descriptor_name;
        tracing::info!(entries = archive.len(), descriptor = %descriptor, "loading container");

        let bytes = match archive.read_entry(descriptor) {
            Ok(bytes) => bytes,
            Err(OraError::EntryNotFound { .. }) => {
                return Err(OraError::DescriptorNotFound {
                    name: descriptor.clone(),
                });
            }
            Err(err) => return Err(err),
        };

        let document = StackNode::parse_bytes_with_max_depth(&bytes, self.config.max_depth)?;
        let document = Arc::new(document);
        let root_node = document
            .first_child()
            .cloned()
            .ok_or(ParseError::MissingRootStack)?;
        self.document = Some(document);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.worker_count())
            .stack_size(WORKER_STACK_SIZE)
            .thread_name({
                let prefix = self.config.thread_name_prefix.clone();
                move |index| format!("{prefix}-{index}")
            })
            .build()?;

        let builder = TreeBuilder::new(&archive, &self.registry);
        let root = pool.install(|| builder.build_group(root_node, 0))?;
        let root = Arc::new(root);

        tracing::info!(
            items = self.len(),
            layers = root.layers().len(),
            "container loaded"
        );
        self.root = Some(root);

        Ok(())
    }

    /// Lookup an item by its `uuid` attribute
    ///
    /// # Errors
    /// `OraError::NotFound` if no item carries this UUID
    pub fn get_by_uuid(&self, uuid: &str) -> OraResult<Arc<Item>> {
        self.registry
            .read()
            .get(uuid)
            .cloned()
            .ok_or_else(|| OraError::not_found(uuid))
    }

    /// Snapshot of the flat item list, in completion order
    ///
    /// Excludes the root group.
    #[must_use]
    pub fn children(&self) -> Vec<Arc<Item>> {
        self.registry.read().children.clone()
    }

    /// Snapshot of the UUID index
    #[must_use]
    pub fn uuid_index(&self) -> HashMap<String, Arc<Item>> {
        self.registry.read().by_uuid.clone()
    }

    /// Number of registered items (root group excluded)
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    /// Check if no item is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Root group, present only after a successful load
    #[inline]
    #[must_use]
    pub fn root_group(&self) -> Option<&Arc<Item>> {
        self.root.as_ref()
    }

    /// Parsed document root of the stack description
    #[inline]
    #[must_use]
    pub fn document(&self) -> Option<&Arc<StackNode>> {
        self.document.as_ref()
    }

    /// All layers of the tree, depth-first in document order
    #[must_use]
    pub fn layers(&self) -> Vec<Arc<Item>> {
        self.root.as_ref().map(Item::layers).unwrap_or_default()
    }

    /// Check if `load` has been called
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Configuration used for loading
    #[inline]
    #[must_use]
    pub fn config(&self) -> &LoadConfig {
        &self.config
    }
}
