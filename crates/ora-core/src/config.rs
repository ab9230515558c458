//! Load configuration

use crate::node::{DEFAULT_MAX_DEPTH, MAX_DEPTH_CEILING};

/// Default name of the stack description entry
pub const DEFAULT_DESCRIPTOR: &str = "stack.xml";

/// Configuration for [`crate::Container::load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    /// Worker threads for the tree builder; `None` uses available parallelism
    pub max_workers: Option<usize>,
    /// Archive entry holding the stack description
    pub descriptor_name: String,
    /// Prefix for worker thread names
    pub thread_name_prefix: String,
    /// Deepest element nesting accepted in the stack description
    pub max_depth: usize,
}

impl LoadConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a fixed worker count (values below 1 are raised to 1)
    #[inline]
    #[must_use]
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers.max(1));
        self
    }

    /// With a custom descriptor entry name
    #[inline]
    #[must_use]
    pub fn with_descriptor_name(mut self, name: impl Into<String>) -> Self {
        self.descriptor_name = name.into();
        self
    }

    /// With a custom worker thread name prefix
    #[inline]
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// With a nesting limit (clamped to `1..=MAX_DEPTH_CEILING`)
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.clamp(1, MAX_DEPTH_CEILING);
        self
    }

    /// Worker count the pool will be built with
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.max_workers.unwrap_or_else(|| {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        })
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            max_workers: None,
            descriptor_name: DEFAULT_DESCRIPTOR.to_string(),
            thread_name_prefix: "ora-build".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
