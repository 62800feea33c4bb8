use serde::Deserialize;
use serde_json::Value;

use super::{Container, Render, fields, lenient_text};
use crate::error::Error;
use crate::ooxml::{Align, RunStyle, field_run, paragraph, text_run};

pub(super) const TAG: &str = "inline_group";

const DEFAULT_INSTRUCTION: &str = " PAGE ";

/// One piece of an inline group: static text or a field.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct InlineItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_text")]
    pub value: String,
    pub style: RunStyle,
}

/// Text and fields sharing one paragraph, e.g. "Page {PAGE} / {NUMPAGES}".
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct InlineGroupElement {
    pub items: Vec<InlineItem>,
    pub align: Align,
    pub style: RunStyle,
}

impl InlineGroupElement {
    pub fn from_spec(spec: &Value) -> Result<Self, Error> {
        fields(TAG, spec)
    }
}

impl Render for InlineGroupElement {
    fn render(&self, container: &mut Container<'_>) -> Result<(), Error> {
        let mut p = paragraph(Some(self.align));
        for item in &self.items {
            let style = item.style.merged_over(&self.style);
            match item.kind.as_str() {
                "text" => p.push(text_run(&item.value, &style)),
                "field" => {
                    let instruction = if item.value.is_empty() {
                        DEFAULT_INSTRUCTION
                    } else {
                        item.value.as_str()
                    };
                    p.push(field_run(instruction, &style));
                }
                other => log::debug!("inline_group: skipping item of type '{other}'"),
            }
        }
        container.add_paragraph(p)
    }

    fn kind(&self) -> &str {
        TAG
    }
}
