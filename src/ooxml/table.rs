use super::border_edge;
use crate::xml::XmlElement;

pub const ZONE_COLUMNS: usize = 3;

const TABLE_EDGES: [&str; 6] = ["top", "left", "bottom", "right", "insideH", "insideV"];
const CELL_EDGES: [&str; 4] = ["top", "left", "bottom", "right"];

/// Splits `usable_dxa` proportionally to `ratios`. Each share is truncated and
/// whatever truncation lost goes to the last column, so the widths always sum
/// to exactly `usable_dxa`. Callers guarantee a positive ratio sum.
pub fn column_widths(usable_dxa: i64, ratios: [f64; ZONE_COLUMNS]) -> [i64; ZONE_COLUMNS] {
    let total: f64 = ratios.iter().sum();
    let mut widths = ratios.map(|r| (usable_dxa as f64 * r / total) as i64);
    let assigned: i64 = widths.iter().sum();
    widths[ZONE_COLUMNS - 1] += usable_dxa - assigned;
    widths
}

fn no_borders(container: &str, edges: &[&str]) -> XmlElement {
    edges.iter().fold(XmlElement::new(container), |el, side| {
        el.with_child(border_edge(side, "none", 0, "auto"))
    })
}

fn dxa_width(name: &str, w: i64) -> XmlElement {
    XmlElement::new(name)
        .with_attr("w:w", w.to_string())
        .with_attr("w:type", "dxa")
}

/// Borderless, centered, fixed-layout 1×3 table. Grid columns and cell widths
/// carry the same values; Word recomputes from content when they disagree.
pub fn zone_table(widths: [i64; ZONE_COLUMNS]) -> XmlElement {
    let total: i64 = widths.iter().sum();

    let tbl_pr = XmlElement::new("w:tblPr")
        .with_child(dxa_width("w:tblW", total))
        .with_child(XmlElement::new("w:jc").with_attr("w:val", "center"))
        .with_child(no_borders("w:tblBorders", &TABLE_EDGES))
        .with_child(XmlElement::new("w:tblLayout").with_attr("w:type", "fixed"))
        .with_child(
            XmlElement::new("w:tblLook")
                .with_attr("w:val", "04A0")
                .with_attr("w:firstRow", "1")
                .with_attr("w:lastRow", "0")
                .with_attr("w:firstColumn", "1")
                .with_attr("w:lastColumn", "0")
                .with_attr("w:noHBand", "0")
                .with_attr("w:noVBand", "1"),
        );

    let grid = widths.iter().fold(XmlElement::new("w:tblGrid"), |g, w| {
        g.with_child(XmlElement::new("w:gridCol").with_attr("w:w", w.to_string()))
    });

    let row = widths.iter().fold(XmlElement::new("w:tr"), |tr, w| {
        tr.with_child(
            XmlElement::new("w:tc")
                .with_child(
                    XmlElement::new("w:tcPr")
                        .with_child(dxa_width("w:tcW", *w))
                        .with_child(no_borders("w:tcBorders", &CELL_EDGES)),
                )
                .with_child(XmlElement::new("w:p")),
        )
    });

    XmlElement::new("w:tbl")
        .with_child(tbl_pr)
        .with_child(grid)
        .with_child(row)
}

/// The `column`-th cell of a zone table's single row.
pub fn zone_cell_mut(table: &mut XmlElement, column: usize) -> Option<&mut XmlElement> {
    table
        .find_mut("w:tr")?
        .elements_mut()
        .filter(|e| e.is("w:tc"))
        .nth(column)
}
