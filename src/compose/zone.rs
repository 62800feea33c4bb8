use crate::config::{SectionConfig, Zone};
use crate::docx::{PartContext, SectionGeometry};
use crate::elements::{Container, Render};
use crate::error::Error;
use crate::ooxml::{
    column_widths, ensure_namespaces, paragraph, rule_line_paragraph, zone_cell_mut, zone_table,
};
use crate::xml::{XmlElement, XmlNode};

fn table_cell(root: &mut XmlElement, table: usize, column: usize) -> Result<&mut XmlElement, Error> {
    match root.children.get_mut(table) {
        Some(XmlNode::Element(tbl)) => zone_cell_mut(tbl, column),
        _ => None,
    }
    .ok_or_else(|| Error::Structure(format!("zone table cell {column} vanished")))
}

/// Lays one role out in `part`: optional rule above, the three-column zone
/// table, optional rule below. Without `merge` the part's paragraphs and
/// tables are replaced; with it the new content is appended.
pub(crate) fn compose_part(
    mut part: PartContext<'_>,
    geometry: &SectionGeometry,
    config: &SectionConfig,
    merge: bool,
) -> Result<(), Error> {
    // Both rules are checked before the part is touched.
    let top = config.top_rule()?;
    let bottom = config.bottom_rule()?;
    let usable_dxa = geometry.usable_width_dxa();
    let widths = column_widths(usable_dxa, config.column_ratios());

    let root = part.root_mut();
    ensure_namespaces(root);
    if !merge {
        root.retain_elements(|e| !e.is("w:p") && !e.is("w:tbl"));
    }
    if let Some(rule) = &top {
        root.push(rule_line_paragraph(rule.thickness_pt, &rule.color));
    }
    root.push(zone_table(widths));
    let mut table = root.children.len() - 1;

    for zone in Zone::ALL {
        let Some(elements) = config.zones.get(&zone) else {
            continue;
        };
        table_cell(part.root_mut(), table, zone.column())?.retain_elements(|e| !e.is("w:p"));

        let mut container = Container::cell(part, table, zone.column());
        let rendered = elements.iter().try_for_each(|el| el.render(&mut container));
        table = container.table_index();
        part = container.into_part();
        rendered?;

        let cell = table_cell(part.root_mut(), table, zone.column())?;
        if cell.find("w:p").is_none() {
            cell.push(paragraph(None));
        }
    }

    if let Some(rule) = &bottom {
        part.root_mut()
            .push(rule_line_paragraph(rule.thickness_pt, &rule.color));
    }
    log::debug!(
        "Composed {} ({:?}): widths {:?} dxa, {} zone(s){}",
        part.name(),
        part.kind(),
        widths,
        config.zones.len(),
        if merge { ", merged" } else { "" }
    );
    Ok(())
}
