//! Decoded tree items
//!
//! An [`Item`] is either a Layer (leaf with a decoded raster) or a Group
//! (nested stack with ordered children). Both keep the markup node they were
//! built from; metadata such as name, opacity and visibility is read from that
//! node on every call and never cached.

use crate::archive::Archive;
use crate::error::OraResult;
use crate::node::{attr, StackNode, LAYER_TAG, STACK_TAG, VISIBLE};
use image::RgbaImage;
use std::io::{Read, Seek};
use std::sync::Arc;

/// Classification of a markup element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// Nested stack, becomes a Group
    Group,
    /// Leaf element, becomes a Layer
    Layer,
    /// Unknown tag, skipped without error
    Ignored,
}

impl NodeClass {
    /// Classify an element by its local tag name
    #[must_use]
    pub fn of(node: &StackNode) -> Self {
        match node.tag() {
            STACK_TAG => Self::Group,
            LAYER_TAG => Self::Layer,
            _ => Self::Ignored,
        }
    }
}

/// Leaf payload
#[derive(Debug, Clone)]
pub struct Layer {
    image: RgbaImage,
}

impl Layer {
    /// Decoded pixels
    #[inline]
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Nested stack payload
#[derive(Debug, Clone, Default)]
pub struct Group {
    children: Vec<Arc<Item>>,
}

impl Group {
    /// Direct children in document order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Arc<Item>] {
        &self.children
    }
}

/// Variant payload of an [`Item`]
#[derive(Debug, Clone)]
pub enum ItemKind {
    /// Leaf with a decoded raster
    Layer(Layer),
    /// Nested stack
    Group(Group),
}

/// Node of the decoded tree
#[derive(Debug, Clone)]
pub struct Item {
    node: Arc<StackNode>,
    kind: ItemKind,
}

impl Item {
    /// Create a layer item
    #[must_use]
    pub fn layer(node: Arc<StackNode>, image: RgbaImage) -> Self {
        Self {
            node,
            kind: ItemKind::Layer(Layer { image }),
        }
    }

    /// Create a group item with its children already built
    #[must_use]
    pub fn group(node: Arc<StackNode>, children: Vec<Arc<Item>>) -> Self {
        Self {
            node,
            kind: ItemKind::Group(Group { children }),
        }
    }

    /// Build a layer by resolving the node's `src` in the archive
    ///
    /// # Errors
    /// Any image resolution error; no placeholder raster is substituted
    pub fn load_layer<R: Read + Seek>(
        node: Arc<StackNode>,
        archive: &Archive<R>,
    ) -> OraResult<Self> {
        let image = archive.resolve_image(node.attr(attr::SRC))?;
        Ok(Self::layer(node, image))
    }

    /// Markup node this item was built from
    #[inline]
    #[must_use]
    pub fn node(&self) -> &Arc<StackNode> {
        &self.node
    }

    /// Variant payload
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    /// Check for the Group variant
    #[inline]
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ItemKind::Group(_))
    }

    /// Check for the Layer variant
    #[inline]
    #[must_use]
    pub fn is_layer(&self) -> bool {
        matches!(self.kind, ItemKind::Layer(_))
    }

    /// Raw attribute value, empty when absent
    #[inline]
    #[must_use]
    pub fn attr(&self, name: &str) -> &str {
        self.node.attr(name)
    }

    /// Display name, empty when absent
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.attr(attr::NAME)
    }

    /// Identity key, empty when absent
    #[inline]
    #[must_use]
    pub fn uuid(&self) -> &str {
        self.attr(attr::UUID)
    }

    /// Archive entry of the raster (layers), empty when absent
    #[inline]
    #[must_use]
    pub fn src(&self) -> &str {
        self.attr(attr::SRC)
    }

    /// Opacity; `0.0` when absent or not a decimal
    #[inline]
    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.node.attr_f64_or_zero(attr::OPACITY)
    }

    /// True iff `visibility` is exactly `"visible"`
    #[inline]
    #[must_use]
    pub fn visible(&self) -> bool {
        self.attr(attr::VISIBILITY) == VISIBLE
    }

    /// Decoded pixels, `None` for groups
    #[must_use]
    pub fn image(&self) -> Option<&RgbaImage> {
        match &self.kind {
            ItemKind::Layer(layer) => Some(layer.image()),
            ItemKind::Group(_) => None,
        }
    }

    /// Direct children, empty for layers
    #[must_use]
    pub fn children(&self) -> &[Arc<Item>] {
        match &self.kind {
            ItemKind::Group(group) => group.children(),
            ItemKind::Layer(_) => &[],
        }
    }

    /// Layers of this subtree, depth-first in document order
    #[must_use]
    pub fn layers(self: &Arc<Self>) -> Vec<Arc<Item>> {
        let mut out = Vec::new();
        collect_layers(self, &mut out);
        out
    }

    /// Number of items below this one, excluding itself
    #[must_use]
    pub fn descendant_count(&self) -> usize {
        self.children()
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}

fn collect_layers(item: &Arc<Item>, out: &mut Vec<Arc<Item>>) {
    match &item.kind {
        ItemKind::Layer(_) => out.push(Arc::clone(item)),
        ItemKind::Group(group) => {
            for child in group.children() {
                collect_layers(child, out);
            }
        }
    }
}
