use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use wall_config::{
    EdgeStretchOptions, GridOptions, MomentumOptions, ParallaxOptions, ScaleLoopOptions,
    SnapOptions,
};

use crate::color::{BackgroundColor, DEFAULT_BACKGROUND};
use crate::export::ExportOptions;
use crate::layout::GridMode;

/// Top-level YAML configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    pub mode: GridMode,
    /// Hex colour used behind the wall and for cells whose image is unusable.
    pub background_color: String,
    /// Image references shown on the wall, in addition to `image-directory`.
    pub images: Vec<String>,
    /// Directory scanned recursively for image files.
    pub image_directory: Option<PathBuf>,
    /// Embed directory images as data URIs instead of `file://` URLs.
    pub inline_images: bool,
    /// Used when no images are available; empty means the built-in set.
    pub placeholder_images: Vec<String>,
    /// Fixed seed for the shuffle and cell assignment.
    pub layout_seed: Option<u64>,
    #[serde(with = "humantime_serde")]
    pub frame_interval: Duration,
    pub grid: GridOptions,
    pub parallax: ParallaxOptions,
    pub momentum: MomentumOptions,
    pub snap: SnapOptions,
    pub scale_loop: ScaleLoopOptions,
    pub edge_stretch: EdgeStretchOptions,
    pub export: ExportOptions,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(serde_yaml::from_str(&s)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        BackgroundColor::parse(&self.background_color)
            .with_context(|| format!("background-color {:?}", self.background_color))?;
        ensure!(
            !self.frame_interval.is_zero(),
            "frame-interval must be greater than zero"
        );
        ensure!(
            self.export.iframe_height > 0,
            "export.iframe-height must be greater than zero"
        );
        ensure!(
            !self.export.origin.trim().is_empty(),
            "export.origin must not be empty"
        );
        self.grid.validate()?;
        self.parallax.validate()?;
        self.momentum.validate()?;
        self.snap.validate()?;
        self.scale_loop.validate()?;
        self.edge_stretch.validate()?;
        Ok(self)
    }

    /// Background colour, falling back to the default when unparsable.
    pub fn background(&self) -> BackgroundColor {
        BackgroundColor::resolve(&self.background_color)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            mode: GridMode::default(),
            background_color: DEFAULT_BACKGROUND.to_string(),
            images: Vec::new(),
            image_directory: None,
            inline_images: false,
            placeholder_images: Vec::new(),
            layout_seed: None,
            frame_interval: Duration::from_millis(16),
            grid: GridOptions::default(),
            parallax: ParallaxOptions::default(),
            momentum: MomentumOptions::default(),
            snap: SnapOptions::default(),
            scale_loop: ScaleLoopOptions::default(),
            edge_stretch: EdgeStretchOptions::default(),
            export: ExportOptions::default(),
        }
    }
}
