use serde::Deserialize;
use serde_json::Value;

use super::{Container, Render, fields};
use crate::error::Error;
use crate::ooxml::{HexColor, horizontal_line_paragraph};

pub(super) const TAG: &str = "horizontal_line";

/// A line drawn inside a zone as the bottom border of an empty paragraph.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct HorizontalLineElement {
    pub thickness_pt: f64,
    pub color: HexColor,
}

impl Default for HorizontalLineElement {
    fn default() -> Self {
        HorizontalLineElement {
            thickness_pt: 1.0,
            color: HexColor::default(),
        }
    }
}

impl HorizontalLineElement {
    pub fn from_spec(spec: &Value) -> Result<Self, Error> {
        fields(TAG, spec)
    }
}

impl Render for HorizontalLineElement {
    fn render(&self, container: &mut Container<'_>) -> Result<(), Error> {
        container.add_paragraph(horizontal_line_paragraph(self.thickness_pt, &self.color))
    }

    fn kind(&self) -> &str {
        TAG
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_to_one_point_black() {
        let line = HorizontalLineElement::from_spec(&json!({"type": "horizontal_line"})).unwrap();
        assert_eq!(line.thickness_pt, 1.0);
        assert_eq!(line.color.as_str(), "000000");
    }
}
