//! Renderable header/footer content.
//!
//! Each configured element becomes an [`Element`]; rendering appends OOXML to
//! a [`Container`], one cell of a zone table inside a header/footer part.

mod field;
mod floating_image;
mod horizontal_line;
mod image;
mod inline_group;
mod text;

use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub use field::FieldElement;
pub use floating_image::FloatingImageElement;
pub use horizontal_line::HorizontalLineElement;
pub use image::ImageElement;
pub use inline_group::{InlineGroupElement, InlineItem};
pub use text::TextElement;

use crate::docx::PartContext;
use crate::error::Error;
use crate::ooxml::zone_cell_mut;
use crate::xml::{XmlElement, XmlNode};

/// Something that can write itself into a header/footer.
pub trait Render: fmt::Debug {
    fn render(&self, container: &mut Container<'_>) -> Result<(), Error>;

    fn kind(&self) -> &str {
        "custom"
    }
}

#[derive(Debug)]
pub enum Element {
    Text(TextElement),
    Field(FieldElement),
    HorizontalLine(HorizontalLineElement),
    Image(ImageElement),
    InlineGroup(InlineGroupElement),
    FloatingImage(FloatingImageElement),
    Custom(Box<dyn Render>),
}

impl Render for Element {
    fn render(&self, container: &mut Container<'_>) -> Result<(), Error> {
        match self {
            Element::Text(e) => e.render(container),
            Element::Field(e) => e.render(container),
            Element::HorizontalLine(e) => e.render(container),
            Element::Image(e) => e.render(container),
            Element::InlineGroup(e) => e.render(container),
            Element::FloatingImage(e) => e.render(container),
            Element::Custom(e) => e.render(container),
        }
    }

    fn kind(&self) -> &str {
        match self {
            Element::Text(_) => text::TAG,
            Element::Field(_) => field::TAG,
            Element::HorizontalLine(_) => horizontal_line::TAG,
            Element::Image(_) => image::TAG,
            Element::InlineGroup(_) => inline_group::TAG,
            Element::FloatingImage(_) => floating_image::TAG,
            Element::Custom(e) => e.kind(),
        }
    }
}

pub type Constructor = fn(&Value) -> Result<Element, Error>;

/// Maps `type` tags to element constructors.
#[derive(Clone)]
pub struct ElementFactory {
    registry: BTreeMap<String, Constructor>,
}

impl fmt::Debug for ElementFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.registry.keys()).finish()
    }
}

impl Default for ElementFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementFactory {
    pub fn new() -> Self {
        let mut factory = ElementFactory {
            registry: BTreeMap::new(),
        };
        factory.register(text::TAG, |spec| Ok(Element::Text(TextElement::from_spec(spec)?)));
        factory.register(field::TAG, |spec| Ok(Element::Field(FieldElement::from_spec(spec)?)));
        factory.register(horizontal_line::TAG, |spec| {
            Ok(Element::HorizontalLine(HorizontalLineElement::from_spec(spec)?))
        });
        factory.register(image::TAG, |spec| Ok(Element::Image(ImageElement::from_spec(spec)?)));
        factory.register(inline_group::TAG, |spec| {
            Ok(Element::InlineGroup(InlineGroupElement::from_spec(spec)?))
        });
        factory.register(floating_image::TAG, |spec| {
            Ok(Element::FloatingImage(FloatingImageElement::from_spec(spec)?))
        });
        factory
    }

    /// Adds a tag, or replaces the constructor of an existing one.
    pub fn register(&mut self, tag: &str, constructor: Constructor) {
        self.registry.insert(tag.to_string(), constructor);
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    pub fn create(&self, spec: &Value) -> Result<Element, Error> {
        let kind = spec.get("type").and_then(Value::as_str).unwrap_or_default();
        match self.registry.get(kind) {
            Some(constructor) => constructor(spec),
            None => Err(Error::UnknownElement {
                kind: kind.to_string(),
                available: self.tags().collect::<Vec<_>>().join(", "),
            }),
        }
    }
}

/// Deserializes an element's fields from its raw spec.
pub(crate) fn fields<T: DeserializeOwned>(kind: &str, spec: &Value) -> Result<T, Error> {
    serde_json::from_value(spec.clone()).map_err(|e| Error::InvalidElement {
        kind: kind.to_string(),
        reason: e.to_string(),
    })
}

/// Spreadsheet cells and YAML scalars often arrive as numbers where text is
/// meant ("2024", "1.0").
pub(crate) fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => return Err(serde::de::Error::custom(format!("expected text, found {other}"))),
    })
}

/// An image stored in the package and related to the current part.
#[derive(Clone, Debug)]
pub struct EmbeddedImage {
    pub rel_id: String,
    pub name: String,
    pub width_px: u32,
    pub height_px: u32,
}

/// Where rendered content goes: column `column` of the zone table found at
/// `table` in the part's children.
pub struct Container<'a> {
    part: PartContext<'a>,
    table: usize,
    column: usize,
}

impl<'a> Container<'a> {
    pub(crate) fn cell(part: PartContext<'a>, table: usize, column: usize) -> Self {
        Container { part, table, column }
    }

    pub(crate) fn into_part(self) -> PartContext<'a> {
        self.part
    }

    /// Where the zone table sits now; body-start inserts move it down.
    pub(crate) fn table_index(&self) -> usize {
        self.table
    }

    pub fn part_name(&self) -> &str {
        self.part.name()
    }

    fn target(&mut self) -> Result<&mut XmlElement, Error> {
        let (table, column) = (self.table, self.column);
        match self.part.root_mut().children.get_mut(table) {
            Some(XmlNode::Element(tbl)) if tbl.is("w:tbl") => zone_cell_mut(tbl, column)
                .ok_or_else(|| Error::Structure(format!("zone table has no cell {column}"))),
            _ => Err(Error::Structure(format!("no zone table at child {table}"))),
        }
    }

    /// Appends a block (normally a `w:p`) to the cell.
    pub fn add_paragraph(&mut self, paragraph: XmlElement) -> Result<(), Error> {
        self.target()?.push(paragraph);
        Ok(())
    }

    /// Inserts at the very top of the part body, outside any table.
    pub fn insert_at_body_start(&mut self, block: XmlElement) {
        self.part.root_mut().insert(0, block);
        self.table += 1;
    }

    /// Reads an image file and stores it in the package. Identical files are
    /// stored once.
    pub fn embed_image(&mut self, path: &Path) -> Result<EmbeddedImage, Error> {
        let data = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ImageNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        let image_error = |reason: String| Error::Image {
            path: path.to_path_buf(),
            reason,
        };

        let reader = ::image::ImageReader::new(Cursor::new(&data)).with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| image_error("unrecognized image format".into()))?;
        let (width_px, height_px) = reader
            .into_dimensions()
            .map_err(|e| image_error(e.to_string()))?;
        if width_px == 0 || height_px == 0 {
            return Err(image_error("image has no pixels".into()));
        }
        let ext = format.extensions_str().first().copied().unwrap_or("bin");

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let rel_id = self.part.embed_image(data, ext);
        log::debug!("Embedded {} as {rel_id} in {}", path.display(), self.part.name());
        Ok(EmbeddedImage {
            rel_id,
            name,
            width_px,
            height_px,
        })
    }

    pub fn next_drawing_id(&mut self) -> u32 {
        self.part.next_drawing_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_type_lists_available_tags() {
        let err = ElementFactory::new()
            .create(&json!({"type": "qr_code"}))
            .unwrap_err();
        match err {
            Error::UnknownElement { kind, available } => {
                assert_eq!(kind, "qr_code");
                assert!(available.contains("inline_group"));
                assert!(available.contains("floating_image"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn builtin_tags() {
        let factory = ElementFactory::new();
        let tags: Vec<_> = factory.tags().collect();
        assert_eq!(
            tags,
            ["field", "floating_image", "horizontal_line", "image", "inline_group", "text"]
        );
    }

    #[derive(Debug)]
    struct Marker;

    impl Render for Marker {
        fn render(&self, container: &mut Container<'_>) -> Result<(), Error> {
            container.add_paragraph(XmlElement::new("w:p"))
        }

        fn kind(&self) -> &str {
            "marker"
        }
    }

    #[test]
    fn registered_constructors_are_used() {
        let mut factory = ElementFactory::new();
        factory.register("marker", |_| Ok(Element::Custom(Box::new(Marker))));
        let el = factory.create(&json!({"type": "marker"})).unwrap();
        assert_eq!(el.kind(), "marker");
    }

    #[test]
    fn bad_fields_are_invalid_element() {
        let err = ElementFactory::new()
            .create(&json!({"type": "image", "width_cm": 2.0}))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidElement { ref kind, .. } if kind == "image"));
    }

    #[test]
    fn numbers_are_accepted_as_text() {
        let el = ElementFactory::new()
            .create(&json!({"type": "text", "value": 2024}))
            .unwrap();
        match el {
            Element::Text(t) => assert_eq!(t.value, "2024"),
            other => panic!("unexpected element: {other:?}"),
        }
    }
}
