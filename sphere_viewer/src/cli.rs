use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(about = "Sphere-world demo: grid floor, spinning torus, orbiters, overlay surface", version)]
pub struct Args {
    /// PNG page composited as the overlay surface; a built-in ring-menu
    /// panel is used when omitted
    #[arg(long)]
    pub page: Option<PathBuf>,

    /// Optional JSON preset overriding overlay resolution and hit-testing
    #[arg(long)]
    pub overlay_preset: Option<PathBuf>,

    /// Seed for the random sphere field
    #[arg(long, default_value_t = sphere_scene::DEFAULT_SEED)]
    pub seed: u64,

    /// Initial window width in physical pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Initial window height in physical pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Skip creating a winit window/event loop; useful for headless automation
    #[arg(long)]
    pub headless: bool,

    /// Render a single frame offscreen and write it to this path as PNG
    #[arg(long)]
    pub dump_frame: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct OverlayPreset {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub alpha_threshold: Option<u8>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl OverlayPreset {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

pub fn load_overlay_preset(path: &Path) -> Result<OverlayPreset> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading overlay preset {}", path.display()))?;
    let preset: OverlayPreset = serde_json::from_str(&data)
        .with_context(|| format!("parsing overlay preset {}", path.display()))?;
    Ok(preset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn preset_defaults_to_enabled() {
        let preset = OverlayPreset::default();
        assert!(preset.enabled());
        assert!(preset.width.is_none());
    }

    #[test]
    fn preset_loads_partial_fields() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"width": 512, "alpha_threshold": 40, "enabled": false}}"#)
            .expect("write preset");

        let preset = load_overlay_preset(file.path()).expect("load preset");
        assert_eq!(preset.width, Some(512));
        assert_eq!(preset.height, None);
        assert_eq!(preset.alpha_threshold, Some(40));
        assert!(!preset.enabled());
    }

    #[test]
    fn preset_load_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write preset");

        let err = load_overlay_preset(file.path()).expect_err("must fail");
        assert!(err.to_string().contains("parsing overlay preset"));
    }
}
