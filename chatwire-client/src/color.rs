//! Stable per-identity display colors.
//!
//! Every identity maps to a hue derived from a 32-bit polynomial string
//! hash; saturation and lightness are fixed so all names read equally well
//! on either theme. Colors are memoized for the lifetime of the session.
//! Collisions are possible and left alone.
//!
//! ```text
//! "alice" ──hash──▶ 92903040 ──|h| mod 360──▶ hue 0 ──▶ hsl(0 60% 55%)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Fixed saturation, in percent.
pub const SATURATION: u8 = 60;
/// Fixed lightness, in percent.
pub const LIGHTNESS: u8 = 55;

/// Display color for an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Hue in degrees, `0..360`.
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl Color {
    /// Color at the given hue with the fixed saturation and lightness.
    pub fn from_hue(hue: u16) -> Self {
        Self {
            hue: hue % 360,
            saturation: SATURATION,
            lightness: LIGHTNESS,
        }
    }

    /// Derive the color for an identity without memoization.
    pub fn for_identity(identity: &str) -> Self {
        let hue = (identity_hash(identity).unsigned_abs() % 360) as u16;
        Self::from_hue(hue)
    }

    /// Convert to 8-bit RGB, for terminals that take truecolor escapes.
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let (r, g, b) = hsl_to_rgb(
            f32::from(self.hue) / 360.0,
            f32::from(self.saturation) / 100.0,
            f32::from(self.lightness) / 100.0,
        );
        let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (to_u8(r), to_u8(g), to_u8(b))
    }
}

impl fmt::Display for Color {
    /// CSS Color 4 notation, e.g. `hsl(157 60% 55%)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({} {}% {}%)", self.hue, self.saturation, self.lightness)
    }
}

/// `h = h * 31 + unit` over UTF-16 code units, wrapping at 32 bits.
pub fn identity_hash(identity: &str) -> i32 {
    identity
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// HSL to RGB conversion helper.
fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (l, l, l);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    (r, g, b)
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 { t += 1.0; }
    if t > 1.0 { t -= 1.0; }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

// ───────────────────────────────────────────────────────────────────
// Memoized assigner
// ───────────────────────────────────────────────────────────────────

/// Session-scoped memo table of identity colors.
#[derive(Debug, Default)]
pub struct ColorAssigner {
    assigned: HashMap<String, Color>,
}

impl ColorAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color for `identity`, computed on first request and reused after.
    pub fn color_for(&mut self, identity: &str) -> Color {
        if let Some(color) = self.assigned.get(identity) {
            return *color;
        }
        let color = Color::for_identity(identity);
        self.assigned.insert(identity.to_string(), color);
        color
    }

    /// Number of identities colored so far.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}
