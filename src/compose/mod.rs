//! Writes resolved configurations into the document's header/footer parts.

mod section;
mod zone;

pub(crate) use section::apply_sections;
