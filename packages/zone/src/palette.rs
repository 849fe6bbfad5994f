//! Display color assignment for zone fields.
//!
//! Every distinct field (polje) gets a color from a golden-angle hue
//! walk, which spreads hues evenly for any palette size. Descendant
//! levels reuse the field color darkened by fixed factors.

use std::collections::{BTreeMap, BTreeSet};

use factory_map_zone_models::Rgb;

/// Hue step between consecutive palette entries, in degrees. The golden
/// angle maximizes perceptual spread regardless of palette size.
const GOLDEN_ANGLE_DEG: f64 = 137.5;

/// Darkening factor applied to a field color for its subzones.
pub const SUBZONE_DARKEN: f64 = 0.8;

/// Darkening factor applied to a field color for its vrsta rows.
pub const VRSTA_DARKEN: f64 = 0.6;

/// Generates a palette of `n` visually distinct colors.
///
/// Saturation and lightness cycle through small offsets so neighboring
/// entries differ in more than hue.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn palette(n: usize) -> Vec<Rgb> {
    (0..n)
        .map(|i| {
            let hue = (i as f64 * GOLDEN_ANGLE_DEG) % 360.0;
            let saturation = 0.7 + (i % 3) as f64 * 0.1;
            let lightness = 0.5 + (i % 2) as f64 * 0.2;
            hsl_to_rgb(hue / 360.0, saturation, lightness)
        })
        .collect()
}

/// Assigns palette colors to the sorted distinct field codes, making
/// the assignment independent of record order.
#[must_use]
pub fn field_colors<I, S>(field_codes: I) -> BTreeMap<String, Rgb>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let distinct: BTreeSet<String> = field_codes
        .into_iter()
        .map(|code| code.as_ref().to_string())
        .collect();
    let colors = palette(distinct.len());
    distinct.into_iter().zip(colors).collect()
}

/// Converts hue (as a fraction of a turn), saturation, and lightness to
/// RGB channels, truncating to integer channel values.
fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> Rgb {
    let to_channel = |value: f64| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (value * 255.0).clamp(0.0, 255.0) as u8
        }
    };

    if saturation == 0.0 {
        let channel = to_channel(lightness);
        return Rgb::new(channel, channel, channel);
    }

    let m2 = if lightness <= 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let m1 = 2.0 * lightness - m2;

    Rgb::new(
        to_channel(hue_channel(m1, m2, hue + 1.0 / 3.0)),
        to_channel(hue_channel(m1, m2, hue)),
        to_channel(hue_channel(m1, m2, hue - 1.0 / 3.0)),
    )
}

/// One channel of the HSL conversion, with the hue wrapped into [0, 1).
fn hue_channel(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = hue.rem_euclid(1.0);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}
