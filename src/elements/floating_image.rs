use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use super::image::embed_inline;
use super::{Container, Render, fields};
use crate::error::Error;
use crate::ooxml::{AnchorPlacement, WrapMode, build_anchor, paragraph};
use crate::units::cm_to_emu;
use crate::xml::XmlElement;

pub(super) const TAG: &str = "floating_image";

/// A picture positioned absolutely on the page.
///
/// The anchor goes at the top of the header/footer body, outside the zone
/// table. The zone cell only gets an empty carrier paragraph.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FloatingImageElement {
    pub path: PathBuf,
    pub width_cm: f64,
    pub height_cm: Option<f64>,
    /// From the left edge of the page.
    pub x_cm: f64,
    /// From the top edge of the page.
    pub y_cm: f64,
    pub z_order: i64,
    pub wrap: WrapMode,
    pub behind_text: bool,
}

impl Default for FloatingImageElement {
    fn default() -> Self {
        FloatingImageElement {
            path: PathBuf::new(),
            width_cm: 3.0,
            height_cm: None,
            x_cm: 0.0,
            y_cm: 0.0,
            z_order: 1,
            wrap: WrapMode::None,
            behind_text: false,
        }
    }
}

impl FloatingImageElement {
    pub fn from_spec(spec: &Value) -> Result<Self, Error> {
        let mut el: Self = fields(TAG, spec)?;
        if el.path.as_os_str().is_empty() {
            return Err(Error::InvalidElement {
                kind: TAG.to_string(),
                reason: "missing field `path`".into(),
            });
        }
        el.z_order = el.z_order.clamp(1, i64::from(u32::MAX));
        Ok(el)
    }

    pub fn placement(&self) -> AnchorPlacement {
        AnchorPlacement {
            x_emu: cm_to_emu(self.x_cm),
            y_emu: cm_to_emu(self.y_cm),
            z_order: u32::try_from(self.z_order.max(1)).unwrap_or(u32::MAX),
            wrap: self.wrap,
            behind_text: self.behind_text,
        }
    }
}

impl Render for FloatingImageElement {
    fn render(&self, container: &mut Container<'_>) -> Result<(), Error> {
        let inline = embed_inline(container, &self.path, Some(self.width_cm), self.height_cm)?;
        let anchor = build_anchor(&inline, &self.placement())?;

        container.add_paragraph(paragraph(None))?;
        container.insert_at_body_start(
            XmlElement::new("w:p").with_child(
                XmlElement::new("w:r").with_child(XmlElement::new("w:drawing").with_child(anchor)),
            ),
        );
        Ok(())
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
    fn defaults() {
        let f = FloatingImageElement::from_spec(&json!({"type": "floating_image", "path": "logo.png"})).unwrap();
        assert_eq!(f.width_cm, 3.0);
        assert_eq!(f.z_order, 1);
        assert_eq!(f.wrap, WrapMode::None);
        assert!(!f.behind_text);
    }

    #[test]
    fn z_order_is_at_least_one() {
        let f = FloatingImageElement::from_spec(&json!({"path": "a.png", "z_order": -4})).unwrap();
        assert_eq!(f.placement().z_order, 1);
    }

    #[test]
    fn placement_in_emu() {
        let f = FloatingImageElement::from_spec(&json!({
            "path": "a.png", "x_cm": 15.5, "y_cm": 25.8, "wrap": "square", "behind_text": true
        }))
        .unwrap();
        let p = f.placement();
        assert_eq!((p.x_emu, p.y_emu), (5_580_000, 9_288_000));
        assert_eq!(p.wrap, WrapMode::Square);
    }

    #[test]
    fn unknown_wrap_is_rejected() {
        let err = FloatingImageElement::from_spec(&json!({"path": "a.png", "wrap": "through"})).unwrap_err();
        assert!(matches!(err, Error::InvalidElement { .. }));
    }

    #[test]
    fn path_is_required() {
        assert!(FloatingImageElement::from_spec(&json!({"x_cm": 1})).is_err());
    }
}
