use serde::Deserialize;
use serde_json::Value;

use super::{Container, Render, fields};
use crate::error::Error;
use crate::ooxml::{RunStyle, field_run, paragraph};

pub(super) const TAG: &str = "field";

/// A Word field such as ` PAGE ` or ` NUMPAGES `, evaluated by Word when the
/// page is laid out.
#[derive(Clone, Debug, Deserialize)]
pub struct FieldElement {
    pub value: String,
    #[serde(default)]
    pub style: RunStyle,
}

impl FieldElement {
    pub fn from_spec(spec: &Value) -> Result<Self, Error> {
        fields(TAG, spec)
    }
}

impl Render for FieldElement {
    fn render(&self, container: &mut Container<'_>) -> Result<(), Error> {
        container.add_paragraph(paragraph(self.style.align).with_child(field_run(&self.value, &self.style)))
    }

    fn kind(&self) -> &str {
        TAG
    }
}
