//! Testing utilities for ORA workspace
//!
//! Builds container archives in memory: zip entries, PNG rasters and stack
//! descriptions, plus generated trees for property tests.

#![allow(missing_docs)]

use image::{ImageFormat, Rgba, RgbaImage};
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

pub const DESCRIPTOR: &str = "stack.xml";

pub const EMPTY_STACK_XML: &str = "<?xml version='1.0' encoding='UTF-8'?>\n<image version=\"0.0.1\"><stack/></image>";

pub const TWO_LAYER_STACK_XML: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<image version="0.0.1">
  <stack>
    <layer name="Layer 1" src="data/layer1.png" uuid="layer1" opacity="0.5" visibility="visible"/>
    <layer name="Layer 2" src="data/layer2.png" uuid="layer2" opacity="1.0" visibility="visible"/>
  </stack>
</image>"#;

pub const BLACK: [u8; 4] = [0, 0, 0, 255];
pub const CLEAR: [u8; 4] = [0, 0, 0, 0];

/// Encode a solid-color PNG
pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(width, height, Rgba(rgba)))
}

/// Encode any RGBA buffer as PNG
pub fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("png encoding into memory");
    bytes
}

/// In-memory container archive builder
///
/// The descriptor entry, when present, is written first; other entries follow
/// in insertion order.
#[derive(Debug, Clone)]
pub struct OraFixture {
    descriptor: Option<(String, String)>,
    entries: Vec<(String, Vec<u8>)>,
}

impl Default for OraFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl OraFixture {
    /// Fixture with an empty stack description and no other entries
    pub fn new() -> Self {
        Self {
            descriptor: Some((DESCRIPTOR.to_string(), EMPTY_STACK_XML.to_string())),
            entries: Vec::new(),
        }
    }

    pub fn with_stack_xml(self, xml: impl Into<String>) -> Self {
        self.with_descriptor_named(DESCRIPTOR, xml)
    }

    pub fn with_descriptor_named(
        mut self,
        name: impl Into<String>,
        xml: impl Into<String>,
    ) -> Self {
        self.descriptor = Some((name.into(), xml.into()));
        self
    }

    pub fn without_descriptor(mut self) -> Self {
        self.descriptor = None;
        self
    }

    pub fn with_entry(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.entries.push((name.into(), bytes));
        self
    }

    pub fn with_png(self, name: impl Into<String>, width: u32, height: u32, rgba: [u8; 4]) -> Self {
        self.with_entry(name, png_bytes(width, height, rgba))
    }

    pub fn with_image(self, name: impl Into<String>, image: &RgbaImage) -> Self {
        self.with_entry(name, encode_png(image))
    }

    /// Write the zip archive
    pub fn build(&self) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        let descriptor = self
            .descriptor
            .as_ref()
            .map(|(name, xml)| (name.as_str(), xml.as_bytes()));
        let entries = self
            .entries
            .iter()
            .map(|(name, bytes)| (name.as_str(), bytes.as_slice()));

        for (name, bytes) in descriptor.into_iter().chain(entries) {
            writer.start_file(name, options).expect("zip entry header");
            writer.write_all(bytes).expect("zip entry body");
        }

        writer.finish().expect("zip central directory").into_inner()
    }
}

/// Archive with two 100x100 transparent layers, `layer1` and `layer2`
pub fn two_layer_archive() -> Vec<u8> {
    OraFixture::new()
        .with_stack_xml(TWO_LAYER_STACK_XML)
        .with_png("data/layer1.png", 100, 100, CLEAR)
        .with_png("data/layer2.png", 100, 100, CLEAR)
        .build()
}

/// Shape of a generated stack tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// `<layer>` with its own PNG entry
    Layer,
    /// Nested `<stack>`
    Stack(Vec<Shape>),
    /// Unknown element, must be skipped
    Other,
}

/// Archive generated from a list of [`Shape`]s placed under the root stack
#[derive(Debug, Clone)]
pub struct GeneratedArchive {
    pub bytes: Vec<u8>,
    pub stack_xml: String,
    /// UUIDs of every layer and nested stack, pre-order
    pub uuids: Vec<String>,
    pub layers: usize,
    pub groups: usize,
}

impl GeneratedArchive {
    pub fn from_shapes(shapes: &[Shape]) -> Self {
        let mut out = Self {
            bytes: Vec::new(),
            stack_xml: String::new(),
            uuids: Vec::new(),
            layers: 0,
            groups: 0,
        };
        let mut pngs = Vec::new();

        let mut xml = String::from("<?xml version='1.0' encoding='UTF-8'?>\n<image version=\"0.0.1\">\n<stack name=\"root\">\n");
        for shape in shapes {
            out.render(shape, &mut xml, &mut pngs);
        }
        xml.push_str("</stack>\n</image>\n");

        let fixture = pngs.into_iter().fold(
            OraFixture::new().with_stack_xml(xml.clone()),
            |f, name| f.with_png(name, 1, 1, BLACK),
        );
        out.bytes = fixture.build();
        out.stack_xml = xml;
        out
    }

    fn render(&mut self, shape: &Shape, xml: &mut String, pngs: &mut Vec<String>) {
        let index = self.uuids.len();
        match shape {
            Shape::Layer => {
                let uuid = format!("layer-{index}");
                let src = format!("data/{uuid}.png");
                let _ = writeln!(
                    xml,
                    r#"<layer name="Layer {index}" uuid="{uuid}" src="{src}" opacity="1.0" visibility="visible"/>"#
                );
                self.uuids.push(uuid);
                self.layers += 1;
                pngs.push(src);
            }
            Shape::Stack(children) => {
                let uuid = format!("group-{index}");
                let _ = writeln!(xml, r#"<stack name="Group {index}" uuid="{uuid}">"#);
                self.uuids.push(uuid);
                self.groups += 1;
                for child in children {
                    self.render(child, xml, pngs);
                }
                xml.push_str("</stack>\n");
            }
            Shape::Other => xml.push_str("<note text=\"skip me\"/>\n"),
        }
    }

    /// Items expected in the flat index (root excluded)
    pub fn item_count(&self) -> usize {
        self.layers + self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_counts() {
        let generated = GeneratedArchive::from_shapes(&[
            Shape::Layer,
            Shape::Stack(vec![Shape::Layer, Shape::Other]),
            Shape::Other,
        ]);
        assert_eq!(generated.layers, 2);
        assert_eq!(generated.groups, 1);
        assert_eq!(generated.uuids, vec!["layer-0", "group-1", "layer-2"]);
        assert!(!generated.bytes.is_empty());
    }

    #[test]
    fn png_is_png() {
        let bytes = png_bytes(1, 1, BLACK);
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
