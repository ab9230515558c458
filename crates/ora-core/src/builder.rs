//! Concurrent tree builder
//!
//! Expands a group's child elements with one rayon task per child, at every
//! level of the tree. A nested group finishes its own fan-out before its task
//! returns, so completion is bottom-up.
//!
//! Every item that builds successfully is registered in the container's flat
//! list and UUID index under a single write-lock scope. Its place in the
//! parent's child list is its document position: rayon's indexed collect
//! writes each result into the slot of its source element, so group children
//! keep markup order while the flat list keeps completion order.
//!
//! Errors do not short-circuit a level. All sibling tasks run to completion,
//! then the first failure in document order is returned. Items registered by
//! successful siblings stay registered. A nested group whose subtree failed
//! is still registered and kept in its parent, holding the children that did
//! build.

use crate::archive::Archive;
use crate::container::Registry;
use crate::error::{OraError, OraResult};
use crate::item::{Item, NodeClass};
use crate::node::StackNode;
use parking_lot::RwLock;
use rayon::prelude::*;
use std::io::{Read, Seek};
use std::sync::Arc;

/// Outcome of one child task: the item it produced and the first error
/// raised in its subtree. Both are set for a group whose subtree failed.
type Built = (Option<Arc<Item>>, Option<OraError>);

/// Recursive fan-out over a stack description
pub(crate) struct TreeBuilder<'a, R> {
    archive: &'a Archive<R>,
    registry: &'a RwLock<Registry>,
}

impl<'a, R> TreeBuilder<'a, R>
where
    R: Read + Seek + Send,
{
    pub(crate) fn new(archive: &'a Archive<R>, registry: &'a RwLock<Registry>) -> Self {
        Self { archive, registry }
    }

    /// Build a group and its whole subtree
    ///
    /// The group itself is not registered; callers registering nested groups
    /// do so in [`TreeBuilder::build_child`].
    pub(crate) fn build_group(&self, node: Arc<StackNode>, depth: usize) -> OraResult<Item> {
        match self.assemble_group(node, depth) {
            (group, None) => Ok(group),
            (_, Some(err)) => Err(err),
        }
    }

    fn assemble_group(&self, node: Arc<StackNode>, depth: usize) -> (Item, Option<OraError>) {
        let (children, error) = self.expand(&node, depth);
        (Item::group(node, children), error)
    }

    fn expand(&self, node: &StackNode, depth: usize) -> (Vec<Arc<Item>>, Option<OraError>) {
        let outcomes: Vec<Built> = node
            .children()
            .par_iter()
            .map(|child| self.build_child(child, depth + 1))
            .collect();

        let mut children = Vec::with_capacity(outcomes.len());
        let mut first_error = None;
        let mut failed = 0usize;

        for (item, error) in outcomes {
            if let Some(item) = item {
                children.push(item);
            }
            if let Some(err) = error {
                failed += 1;
                first_error.get_or_insert(err);
            }
        }

        if let Some(err) = &first_error {
            tracing::warn!(
                depth,
                failed,
                built = children.len(),
                "stack level failed: {}",
                err
            );
        }

        (children, first_error)
    }

    fn build_child(&self, node: &Arc<StackNode>, depth: usize) -> Built {
        let (item, error) = match NodeClass::of(node) {
            NodeClass::Group => self.assemble_group(Arc::clone(node), depth),
            NodeClass::Layer => match Item::load_layer(Arc::clone(node), self.archive) {
                Ok(layer) => (layer, None),
                Err(err) => return (None, Some(err)),
            },
            NodeClass::Ignored => {
                tracing::trace!(tag = node.tag(), depth, "ignoring element");
                return (None, None);
            }
        };

        let item = Arc::new(item);
        self.registry.write().insert(Arc::clone(&item));
        tracing::debug!(
            uuid = item.uuid(),
            name = item.name(),
            group = item.is_group(),
            depth,
            complete = error.is_none(),
            "registered item"
        );

        (Some(item), error)
    }
}
