use serde::Deserialize;

use super::{DML_NS, PIC_NS};
use crate::error::Error;
use crate::xml::XmlElement;

/// An image already stored in the package and related to the part that will
/// show it.
#[derive(Clone, Debug)]
pub struct InlinePicture {
    pub rel_id: String,
    pub drawing_id: u32,
    pub name: String,
    pub width_emu: i64,
    pub height_emu: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapMode {
    #[default]
    None,
    Tight,
    Square,
}

/// Page-relative position of a floating picture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorPlacement {
    pub x_emu: i64,
    pub y_emu: i64,
    pub z_order: u32,
    pub wrap: WrapMode,
    pub behind_text: bool,
}

fn extent(name: &str, cx: i64, cy: i64) -> XmlElement {
    XmlElement::new(name)
        .with_attr("cx", cx.to_string())
        .with_attr("cy", cy.to_string())
}

/// `wp:inline` in the shape Word itself produces for an embedded
/// picture. `a` and `pic` are declared locally so the fragment stays valid
/// wherever it lands.
pub fn inline_picture(pic: &InlinePicture) -> XmlElement {
    let graphic = XmlElement::new("a:graphic")
        .with_attr("xmlns:a", DML_NS)
        .with_child(
            XmlElement::new("a:graphicData")
                .with_attr("uri", PIC_NS)
                .with_child(
                    XmlElement::new("pic:pic")
                        .with_attr("xmlns:pic", PIC_NS)
                        .with_child(
                            XmlElement::new("pic:nvPicPr")
                                .with_child(
                                    XmlElement::new("pic:cNvPr")
                                        .with_attr("id", "0")
                                        .with_attr("name", pic.name.as_str()),
                                )
                                .with_child(XmlElement::new("pic:cNvPicPr")),
                        )
                        .with_child(
                            XmlElement::new("pic:blipFill")
                                .with_child(
                                    XmlElement::new("a:blip").with_attr("r:embed", pic.rel_id.as_str()),
                                )
                                .with_child(
                                    XmlElement::new("a:stretch").with_child(XmlElement::new("a:fillRect")),
                                ),
                        )
                        .with_child(
                            XmlElement::new("pic:spPr")
                                .with_child(
                                    XmlElement::new("a:xfrm")
                                        .with_child(
                                            XmlElement::new("a:off")
                                                .with_attr("x", "0")
                                                .with_attr("y", "0"),
                                        )
                                        .with_child(extent("a:ext", pic.width_emu, pic.height_emu)),
                                )
                                .with_child(
                                    XmlElement::new("a:prstGeom")
                                        .with_attr("prst", "rect")
                                        .with_child(XmlElement::new("a:avLst")),
                                ),
                        ),
                ),
        );

    XmlElement::new("wp:inline")
        .with_attr("distT", "0")
        .with_attr("distB", "0")
        .with_attr("distL", "0")
        .with_attr("distR", "0")
        .with_child(extent("wp:extent", pic.width_emu, pic.height_emu))
        .with_child(
            XmlElement::new("wp:docPr")
                .with_attr("id", pic.drawing_id.to_string())
                .with_attr("name", format!("Picture {}", pic.drawing_id)),
        )
        .with_child(
            XmlElement::new("wp:cNvGraphicFramePr").with_child(
                XmlElement::new("a:graphicFrameLocks")
                    .with_attr("xmlns:a", DML_NS)
                    .with_attr("noChangeAspect", "1"),
            ),
        )
        .with_child(graphic)
}

fn page_position(axis: &str, offset: i64) -> XmlElement {
    XmlElement::new(axis)
        .with_attr("relativeFrom", "page")
        .with_child(XmlElement::new("wp:posOffset").with_text(offset.to_string()))
}

fn wrap_element(mode: WrapMode) -> XmlElement {
    match mode {
        WrapMode::None => XmlElement::new("wp:wrapNone"),
        WrapMode::Square => XmlElement::new("wp:wrapSquare").with_attr("wrapText", "bothSides"),
        WrapMode::Tight => {
            // Polygon coordinates are in a 21600×21600 space over the picture.
            let point = |name: &str, x: i64, y: i64| {
                XmlElement::new(name)
                    .with_attr("x", x.to_string())
                    .with_attr("y", y.to_string())
            };
            XmlElement::new("wp:wrapTight")
                .with_attr("wrapText", "bothSides")
                .with_child(
                    XmlElement::new("wp:wrapPolygon")
                        .with_attr("edited", "0")
                        .with_child(point("wp:start", 0, 0))
                        .with_child(point("wp:lineTo", 21600, 0))
                        .with_child(point("wp:lineTo", 21600, 21600))
                        .with_child(point("wp:lineTo", 0, 21600))
                        .with_child(point("wp:lineTo", 0, 0)),
                )
        }
    }
}

/// Rebuilds a `wp:inline` as a page-anchored `wp:anchor`. Children come out
/// in the order the schema requires: simplePos, positionH, positionV, extent,
/// effectExtent, wrap, docPr, cNvGraphicFramePr, graphic.
pub fn build_anchor(inline: &XmlElement, placement: &AnchorPlacement) -> Result<XmlElement, Error> {
    let extent = inline
        .find("wp:extent")
        .ok_or(Error::MissingGraphicNode("wp:extent"))?;
    let doc_pr = inline
        .find("wp:docPr")
        .ok_or(Error::MissingGraphicNode("wp:docPr"))?;
    let graphic = inline
        .find("a:graphic")
        .ok_or(Error::MissingGraphicNode("a:graphic"))?;
    let frame_pr = inline.find("wp:cNvGraphicFramePr");

    let mut anchor = XmlElement::new("wp:anchor")
        .with_attr("distT", "0")
        .with_attr("distB", "0")
        .with_attr("distL", "114300")
        .with_attr("distR", "114300")
        .with_attr("simplePos", "0")
        .with_attr("relativeHeight", placement.z_order.max(1).to_string())
        .with_attr("behindDoc", if placement.behind_text { "1" } else { "0" })
        .with_attr("locked", "0")
        .with_attr("layoutInCell", "1")
        .with_attr("allowOverlap", "1")
        .with_child(
            XmlElement::new("wp:simplePos")
                .with_attr("x", "0")
                .with_attr("y", "0"),
        )
        .with_child(page_position("wp:positionH", placement.x_emu))
        .with_child(page_position("wp:positionV", placement.y_emu))
        .with_child(extent.clone())
        .with_child(
            XmlElement::new("wp:effectExtent")
                .with_attr("l", "0")
                .with_attr("t", "0")
                .with_attr("r", "0")
                .with_attr("b", "0"),
        )
        .with_child(wrap_element(placement.wrap))
        .with_child(doc_pr.clone());
    if let Some(frame_pr) = frame_pr {
        anchor.push(frame_pr.clone());
    }
    anchor.push(graphic.clone());
    Ok(anchor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> XmlElement {
        inline_picture(&InlinePicture {
            rel_id: "rId7".into(),
            drawing_id: 3,
            name: "logo.png".into(),
            width_emu: 1_260_000,
            height_emu: 630_000,
        })
    }

    fn placement() -> AnchorPlacement {
        AnchorPlacement {
            x_emu: 5_580_000,
            y_emu: 9_288_000,
            z_order: 2,
            wrap: WrapMode::Tight,
            behind_text: true,
        }
    }

    #[test]
    fn anchor_children_in_schema_order() {
        let anchor = build_anchor(&sample(), &placement()).unwrap();
        let names: Vec<_> = anchor.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "wp:simplePos",
                "wp:positionH",
                "wp:positionV",
                "wp:extent",
                "wp:effectExtent",
                "wp:wrapTight",
                "wp:docPr",
                "wp:cNvGraphicFramePr",
                "a:graphic",
            ]
        );
        assert_eq!(anchor.attr("behindDoc"), Some("1"));
        assert_eq!(anchor.attr("relativeHeight"), Some("2"));
        let h = anchor.find("wp:positionH").unwrap();
        assert_eq!(h.find("wp:posOffset").unwrap().text_content(), "5580000");
    }

    #[test]
    fn missing_graphic_is_an_error() {
        let mut inline = sample();
        inline.retain_elements(|e| !e.is("a:graphic"));
        let err = build_anchor(&inline, &placement()).unwrap_err();
        assert!(matches!(err, Error::MissingGraphicNode("a:graphic")));
    }

    #[test]
    fn square_wrap_carries_wrap_text() {
        let mut p = placement();
        p.wrap = WrapMode::Square;
        let anchor = build_anchor(&sample(), &p).unwrap();
        let wrap = anchor.find("wp:wrapSquare").unwrap();
        assert_eq!(wrap.attr("wrapText"), Some("bothSides"));
    }
}
