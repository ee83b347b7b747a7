//! Contrast math
//! <https://www.w3.org/TR/WCAG21/#dfn-relative-luminance>

use shared_types::Rgb;

pub const AA_NORMAL_TEXT: f64 = 4.5;
pub const AA_LARGE_TEXT: f64 = 3.0;
pub const AAA_NORMAL_TEXT: f64 = 7.0;
pub const AAA_LARGE_TEXT: f64 = 4.5;

pub fn relative_luminance(color: Rgb) -> f64 {
    let [r, g, b] = [color.0, color.1, color.2].map(|c| {
        let v = f64::from(c) / 255.0;
        if v <= 0.04045 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    });
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Contrast ratio between two colours, 1.0 to 21.0, order-insensitive
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Minimum ratios (AA, AAA) for text of the given size class
pub fn required_ratios(large_text: bool) -> (f64, f64) {
    if large_text {
        (AA_LARGE_TEXT, AAA_LARGE_TEXT)
    } else {
        (AA_NORMAL_TEXT, AAA_NORMAL_TEXT)
    }
}
