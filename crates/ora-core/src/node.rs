//! Owned markup tree for stack descriptions
//!
//! `roxmltree` borrows the descriptor text, so the parsed document is copied
//! into [`StackNode`]s. Items retain their node for lazy attribute reads long
//! after the descriptor buffer is gone.
//!
//! Only elements are kept. Text, comments and processing instructions are
//! dropped while converting, which leaves [`StackNode::children`] holding
//! exactly the child elements in document order.

use crate::error::ParseError;
use std::sync::Arc;

/// Tag denoting a nested group
pub const STACK_TAG: &str = "stack";

/// Tag denoting a leaf layer
pub const LAYER_TAG: &str = "layer";

/// Attribute keys understood by the decoder
pub mod attr {
    //! Recognized attribute names on `stack` and `layer` elements

    /// Identity key for the UUID index
    pub const UUID: &str = "uuid";
    /// Display label
    pub const NAME: &str = "name";
    /// Decimal opacity
    pub const OPACITY: &str = "opacity";
    /// Visibility flag, `"visible"` means shown
    pub const VISIBILITY: &str = "visibility";
    /// Archive entry holding a layer's raster
    pub const SRC: &str = "src";
}

/// Raw string value that marks an item as shown
pub const VISIBLE: &str = "visible";

/// Element nesting accepted by [`StackNode::parse`], document root included
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Hard ceiling for configured nesting limits
///
/// Conversion and the tree builder recurse once per level; the builder's
/// worker stacks are sized for this many levels.
pub const MAX_DEPTH_CEILING: usize = 1024;

/// Single markup attribute (local name, raw value)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Local name, namespace prefix stripped
    pub name: String,
    /// Unnormalized value
    pub value: String,
}

/// Element of the stack description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackNode {
    tag: String,
    attrs: Vec<Attribute>,
    children: Vec<Arc<StackNode>>,
}

impl StackNode {
    /// Create element with no attributes or children
    #[inline]
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// With an attribute appended
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push(Attribute {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// With a child element appended
    #[must_use]
    pub fn with_child(mut self, child: StackNode) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    /// Parse descriptor text into its document root element
    ///
    /// # Errors
    /// - `ParseError::Markup` if the text is not well-formed markup
    /// - `ParseError::TooDeep` past [`DEFAULT_MAX_DEPTH`] nested elements
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::parse_with_max_depth(text, DEFAULT_MAX_DEPTH)
    }

    /// Parse with an explicit nesting limit
    ///
    /// `max_depth` counts the document root as level 1 and is clamped to
    /// [`MAX_DEPTH_CEILING`]. A `<!DOCTYPE>` prologue is accepted.
    ///
    /// # Errors
    /// As [`StackNode::parse`], with `max_depth` as the limit
    pub fn parse_with_max_depth(text: &str, max_depth: usize) -> Result<Self, ParseError> {
        let mut options = roxmltree::ParsingOptions::default();
        options.allow_dtd = true;
        let document = roxmltree::Document::parse_with_options(text, options)?;
        Self::from_element(document.root_element(), 1, max_depth.min(MAX_DEPTH_CEILING))
    }

    /// Parse raw descriptor bytes
    ///
    /// # Errors
    /// `ParseError::Encoding` for non UTF-8 input, otherwise as [`StackNode::parse`]
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        Self::parse(std::str::from_utf8(bytes)?)
    }

    /// Parse raw descriptor bytes with an explicit nesting limit
    ///
    /// # Errors
    /// As [`StackNode::parse_bytes`] and [`StackNode::parse_with_max_depth`]
    pub fn parse_bytes_with_max_depth(bytes: &[u8], max_depth: usize) -> Result<Self, ParseError> {
        Self::parse_with_max_depth(std::str::from_utf8(bytes)?, max_depth)
    }

    fn from_element(
        element: roxmltree::Node<'_, '_>,
        depth: usize,
        max_depth: usize,
    ) -> Result<Self, ParseError> {
        if depth > max_depth {
            return Err(ParseError::TooDeep { max: max_depth });
        }

        let attrs = element
            .attributes()
            .map(|a| Attribute {
                name: a.name().to_string(),
                value: a.value().to_string(),
            })
            .collect();

        let children = element
            .children()
            .filter(roxmltree::Node::is_element)
            .map(|child| Self::from_element(child, depth + 1, max_depth).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            tag: element.tag_name().name().to_string(),
            attrs,
            children,
        })
    }

    /// Local tag name
    #[inline]
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attribute value, `None` when absent
    ///
    /// First occurrence wins when a name repeats.
    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Attribute value, empty string when absent
    #[inline]
    #[must_use]
    pub fn attr(&self, name: &str) -> &str {
        self.get_attr(name).unwrap_or("")
    }

    /// Attribute parsed as a decimal, `0.0` when absent or malformed
    #[inline]
    #[must_use]
    pub fn attr_f64_or_zero(&self, name: &str) -> f64 {
        parse_decimal_or_zero(self.attr(name))
    }

    /// All attributes in document order
    #[inline]
    #[must_use]
    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Child elements in document order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Arc<StackNode>] {
        &self.children
    }

    /// First child element
    #[inline]
    #[must_use]
    pub fn first_child(&self) -> Option<&Arc<StackNode>> {
        self.children.first()
    }
}

/// Best-effort decimal parse: malformed input yields `0.0`
///
/// No trimming. `"0.5"` parses, `" 0.5"` does not.
#[inline]
#[must_use]
pub fn parse_decimal_or_zero(raw: &str) -> f64 {
    raw.parse().unwrap_or(0.0)
}
