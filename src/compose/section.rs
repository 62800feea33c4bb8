use super::zone::compose_part;
use crate::config::ResolvedConfig;
use crate::docx::Document;
use crate::error::Error;

/// Applies every configured role to every section. A part shared by several
/// sections is composed once. Returns the composed part names in order.
pub(crate) fn apply_sections(doc: &mut Document, config: &ResolvedConfig) -> Result<Vec<String>, Error> {
    let mut composed: Vec<String> = Vec::new();
    for index in 0..doc.section_count() {
        if config.has_first_page_roles() && doc.enable_title_page(index) {
            log::debug!("Section {index}: enabled different first page");
        }
        if config.has_even_page_roles() && doc.enable_even_and_odd_headers()? {
            log::debug!("Enabled different even and odd pages");
        }

        for (role, section_config) in &config.roles {
            let name = doc.header_footer_part(index, role.kind(), role.variant())?;

            if let Some(cm) = section_config.distance() {
                if !doc.try_set_distance(index, role.kind(), cm) {
                    log::debug!("Section {index}: {role} distance {cm} cm not applied");
                }
            }

            if composed.contains(&name) {
                continue;
            }
            let geometry = doc
                .section(index)
                .map(|s| s.geometry())
                .ok_or_else(|| Error::Structure(format!("no section at index {index}")))?;
            let part = doc
                .part_context(&name)
                .ok_or_else(|| Error::Structure(format!("{name} is not a header/footer part")))?;
            compose_part(part, &geometry, section_config, config.merge)?;
            composed.push(name);
        }
    }
    Ok(composed)
}
