use serde::Deserialize;
use serde_json::Value;

use super::{Container, Render, fields, lenient_text};
use crate::error::Error;
use crate::ooxml::{RunStyle, paragraph, text_run};

pub(super) const TAG: &str = "text";

/// One paragraph holding one run of static text.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TextElement {
    #[serde(deserialize_with = "lenient_text")]
    pub value: String,
    pub style: RunStyle,
}

impl TextElement {
    pub fn from_spec(spec: &Value) -> Result<Self, Error> {
        fields(TAG, spec)
    }
}

impl Render for TextElement {
    fn render(&self, container: &mut Container<'_>) -> Result<(), Error> {
        let align = self.style.align.unwrap_or_default();
        container.add_paragraph(paragraph(Some(align)).with_child(text_run(&self.value, &self.style)))
    }

    fn kind(&self) -> &str {
        TAG
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::Align;
    use serde_json::json;

    #[test]
    fn defaults() {
        let t = TextElement::from_spec(&json!({"type": "text"})).unwrap();
        assert_eq!(t.value, "");
        assert_eq!(t.style, RunStyle::default());
    }

    #[test]
    fn style_fields() {
        let t = TextElement::from_spec(&json!({
            "type": "text",
            "value": "Confidential",
            "style": {"font": "Arial", "size": 8, "bold": true, "color": "#c00000", "align": "center"}
        }))
        .unwrap();
        assert_eq!(t.style.size, Some(8.0));
        assert_eq!(t.style.color.as_ref().map(|c| c.as_str()), Some("C00000"));
        assert_eq!(t.style.align, Some(Align::Center));
    }

    #[test]
    fn bad_color_is_rejected() {
        let err = TextElement::from_spec(&json!({"value": "x", "style": {"color": "red"}})).unwrap_err();
        assert!(matches!(err, Error::InvalidElement { .. }));
    }
}
