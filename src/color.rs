use std::fmt;
use std::str::FromStr;

use palette::{Srgb, Srgba};
use tracing::warn;

use crate::error::{Error, Result};

pub const DEFAULT_BACKGROUND: &str = "#181818";

/// Wall background colour. Cells without a usable image are filled with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundColor(Srgb<u8>);

impl BackgroundColor {
    pub fn parse(input: &str) -> Result<Self> {
        parse_hex_color(input)
            .map(Self)
            .ok_or_else(|| Error::InvalidColor(input.to_string()))
    }

    /// Parse `input`, falling back to [`DEFAULT_BACKGROUND`] when it is not a hex colour.
    pub fn resolve(input: &str) -> Self {
        match Self::parse(input) {
            Ok(color) => color,
            Err(err) => {
                warn!(%err, fallback = DEFAULT_BACKGROUND, "using default background colour");
                Self::default()
            }
        }
    }

    pub fn rgb(&self) -> [u8; 3] {
        [self.0.red, self.0.green, self.0.blue]
    }

    /// CSS `rgba()` notation with the given opacity.
    pub fn rgba_css(&self, alpha: f32) -> String {
        let [r, g, b] = self.rgb();
        format!("rgba({r},{g},{b},{})", alpha.clamp(0.0, 1.0))
    }

    /// Opaque edges fading to transparent over the outer 8% of each axis.
    pub fn edge_fade_css(&self) -> String {
        let solid = self.rgba_css(1.0);
        let clear = self.rgba_css(0.0);
        let stops = format!("{solid} 0%, {clear} 8%, {clear} 92%, {solid} 100%");
        format!("linear-gradient(to right, {stops}),linear-gradient(to bottom, {stops})")
    }

    /// The softer overlay kept above and below the dock row.
    pub fn top_bottom_fade_css(&self) -> String {
        let edge = self.rgba_css(0.95);
        let clear = self.rgba_css(0.0);
        format!("linear-gradient(to bottom, {edge} 0%, {clear} 8%, {clear} 92%, {edge} 100%)")
    }
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self(Srgb::new(0x18, 0x18, 0x18))
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.rgb();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl FromStr for BackgroundColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_hex_color(input: &str) -> Option<Srgb<u8>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    // 8-digit hex carries alpha; the wall background is always opaque.
    if trimmed.trim_start_matches('#').len() == 8 {
        let rgba = Srgba::<u8>::from_str(trimmed).ok()?;
        return Some(Srgb::new(rgba.red, rgba.green, rgba.blue));
    }

    Srgb::<u8>::from_str(trimmed).ok()
}
