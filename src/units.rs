//! Conversions between the three measurement systems used in a DOCX package:
//! EMU (drawing offsets and sizes), twips a.k.a. dxa (page geometry and table
//! layout) and points (fonts and borders).

pub const EMU_PER_CM: f64 = 360_000.0;
pub const EMU_PER_MM: f64 = 36_000.0;
pub const EMU_PER_INCH: f64 = 914_400.0;
/// 914400 EMU/inch ÷ 1440 dxa/inch.
pub const EMU_PER_DXA: i64 = 635;
pub const TWIPS_PER_PT: f64 = 20.0;

pub fn cm_to_emu(cm: f64) -> i64 {
    (cm * EMU_PER_CM).round() as i64
}

pub fn mm_to_emu(mm: f64) -> i64 {
    (mm * EMU_PER_MM).round() as i64
}

pub fn inch_to_emu(inch: f64) -> i64 {
    (inch * EMU_PER_INCH).round() as i64
}

pub fn emu_to_cm(emu: i64) -> f64 {
    emu as f64 / EMU_PER_CM
}

/// Truncates toward zero, so a width computed from EMU never exceeds the
/// space it was derived from.
pub fn emu_to_dxa(emu: i64) -> i64 {
    emu / EMU_PER_DXA
}

pub fn dxa_to_emu(dxa: i64) -> i64 {
    dxa * EMU_PER_DXA
}

pub fn cm_to_twips(cm: f64) -> i64 {
    (cm * EMU_PER_CM / EMU_PER_DXA as f64).round() as i64
}

pub fn pt_to_twips(pt: f64) -> i64 {
    (pt * TWIPS_PER_PT).round() as i64
}

/// Font sizes in `w:sz` are half-points.
pub fn pt_to_half_points(pt: f64) -> i64 {
    (pt * 2.0).round() as i64
}

/// Border widths in `w:sz` are eighths of a point; Word rejects zero.
pub fn border_eighths(pt: f64) -> i64 {
    ((pt * 8.0).round() as i64).max(1)
}
