//! The embedded overlay surface composited over the 3D scene. The surface
//! owns page pixels (a decoded PNG or a built-in ring-menu panel),
//! answers per-pixel transparency queries so clicks on see-through regions
//! fall through to the scene, and keeps a journal of the window events
//! forwarded to it.

use std::{collections::VecDeque, path::Path};

use anyhow::{Context, Result, ensure};
use log::{debug, info};

use crate::texture::load_rgba_png;

/// Alpha at or above this counts as a solid pixel for hit-testing.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 16;

const JOURNAL_CAPACITY: usize = 64;
const DEV_PANEL_TAIL: usize = 8;

const PANEL_BAND_COLOR: [u8; 4] = [30, 34, 44, 230];
const PANEL_RIM_COLOR: [u8; 4] = [96, 150, 220, 255];
const PANEL_HUB_COLOR: [u8; 4] = [52, 58, 74, 210];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayButton {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayEvent {
    MouseMove {
        x: u32,
        y: u32,
    },
    MouseButton {
        x: u32,
        y: u32,
        button: OverlayButton,
        released: bool,
        click_count: u8,
    },
    Wheel {
        x: u32,
        y: u32,
        delta_x: f32,
        delta_y: f32,
    },
    Focus {
        gained: bool,
    },
    CaptureLost,
}

impl OverlayEvent {
    fn label(&self) -> &'static str {
        match self {
            OverlayEvent::MouseMove { .. } => "mouse-move",
            OverlayEvent::MouseButton { released: false, .. } => "button-down",
            OverlayEvent::MouseButton { released: true, .. } => "button-up",
            OverlayEvent::Wheel { .. } => "wheel",
            OverlayEvent::Focus { gained: true } => "focus-gained",
            OverlayEvent::Focus { gained: false } => "focus-lost",
            OverlayEvent::CaptureLost => "capture-lost",
        }
    }
}

pub struct OverlaySurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    alpha_threshold: u8,
    dirty: bool,
    focused: bool,
    journal: VecDeque<OverlayEvent>,
    forwarded_total: u64,
}

impl OverlaySurface {
    /// Surface backed by a PNG page on disk.
    pub fn from_page(path: &Path, alpha_threshold: u8) -> Result<Self> {
        let (width, height, pixels) = load_rgba_png(path)
            .with_context(|| format!("loading overlay page {}", path.display()))?;
        info!("[sphere_viewer] overlay page {} ({width}x{height})", path.display());
        Ok(Self::from_pixels(width, height, pixels, alpha_threshold))
    }

    /// Built-in ring-menu panel: an annular band with a translucent hub,
    /// transparent outside the ring. Used when no page is supplied.
    pub fn placeholder(width: u32, height: u32, alpha_threshold: u8) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut pixels = vec![0u8; width as usize * height as usize * 4];

        let center_x = (width as f32 - 1.0) * 0.5;
        let center_y = (height as f32 - 1.0) * 0.5;
        let outer = width.min(height) as f32 * 0.35;
        let inner = outer * 0.55;
        let hub = outer * 0.18;
        let rim = outer * 0.06;

        for y in 0..height {
            for x in 0..width {
                let dx = x as f32 - center_x;
                let dy = y as f32 - center_y;
                let radius = (dx * dx + dy * dy).sqrt();

                let color = if radius <= hub {
                    Some(PANEL_HUB_COLOR)
                } else if radius >= inner && radius <= outer {
                    let near_edge =
                        (radius - inner) < rim || (outer - radius) < rim;
                    Some(if near_edge { PANEL_RIM_COLOR } else { PANEL_BAND_COLOR })
                } else {
                    None
                };

                if let Some(color) = color {
                    let offset = ((y * width + x) * 4) as usize;
                    pixels[offset..offset + 4].copy_from_slice(&color);
                }
            }
        }

        Self::from_pixels(width, height, pixels, alpha_threshold)
    }

    fn from_pixels(width: u32, height: u32, pixels: Vec<u8>, alpha_threshold: u8) -> Self {
        Self {
            width,
            height,
            pixels,
            alpha_threshold,
            dirty: true,
            focused: false,
            journal: VecDeque::with_capacity(JOURNAL_CAPACITY),
            forwarded_total: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// True when the point misses the surface or lands on a pixel whose
    /// alpha is below the hit-test threshold. Clicks on transparent pixels
    /// belong to the scene behind the overlay.
    pub fn is_transparent(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return true;
        }
        let offset = ((y * self.width + x) * 4 + 3) as usize;
        self.pixels[offset] < self.alpha_threshold
    }

    /// Forward one translated window event. Button events are dropped when
    /// they land on a transparent pixel; everything else always reaches
    /// the surface. Returns whether the event was taken.
    pub fn handle_event(&mut self, event: OverlayEvent) -> bool {
        match event {
            OverlayEvent::MouseButton { x, y, .. } if self.is_transparent(x, y) => {
                debug!("[sphere_viewer] overlay pass-through at ({x}, {y})");
                return false;
            }
            OverlayEvent::Focus { gained } => {
                self.focused = gained;
            }
            _ => {}
        }

        debug!("[sphere_viewer] overlay {}", event.label());
        if self.journal.len() == JOURNAL_CAPACITY {
            self.journal.pop_front();
        }
        self.journal.push_back(event);
        self.forwarded_total += 1;
        true
    }

    pub fn journal(&self) -> impl Iterator<Item = &OverlayEvent> {
        self.journal.iter()
    }

    /// F11 hook: dump the surface state and the tail of the event journal
    /// to the log.
    pub fn open_dev_panel(&self) {
        info!(
            "[sphere_viewer] overlay dev panel: {}x{}, threshold {}, focused {}, {} events forwarded",
            self.width, self.height, self.alpha_threshold, self.focused, self.forwarded_total
        );
        let skip = self.journal.len().saturating_sub(DEV_PANEL_TAIL);
        for (index, event) in self.journal.iter().enumerate().skip(skip) {
            info!("  [{index:02}] {event:?}");
        }
    }

    /// Hand the pixel buffer to the renderer when it has changed since the
    /// last upload.
    pub fn take_dirty_pixels(&mut self) -> Option<&[u8]> {
        if self.dirty {
            self.dirty = false;
            Some(&self.pixels)
        } else {
            None
        }
    }

    /// Replace the page content in place; dimensions must match the
    /// surface the renderer allocated.
    pub fn replace_pixels(&mut self, pixels: Vec<u8>) -> Result<()> {
        ensure!(
            pixels.len() == self.pixels.len(),
            "replacement page is {} bytes, surface needs {}",
            pixels.len(),
            self.pixels.len()
        );
        self.pixels = pixels;
        self.dirty = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_point(surface: &OverlaySurface) -> (u32, u32) {
        for y in 0..surface.height() {
            for x in 0..surface.width() {
                if !surface.is_transparent(x, y) {
                    return (x, y);
                }
            }
        }
        panic!("placeholder surface has no solid pixels");
    }

    #[test]
    fn placeholder_center_hub_is_solid_and_corners_are_not() {
        let surface = OverlaySurface::placeholder(200, 160, DEFAULT_ALPHA_THRESHOLD);
        assert!(!surface.is_transparent(100, 80), "hub must hit-test solid");
        assert!(surface.is_transparent(0, 0));
        assert!(surface.is_transparent(199, 159));
    }

    #[test]
    fn out_of_bounds_points_are_transparent() {
        let surface = OverlaySurface::placeholder(64, 64, DEFAULT_ALPHA_THRESHOLD);
        assert!(surface.is_transparent(64, 10));
        assert!(surface.is_transparent(10, 64));
        assert!(surface.is_transparent(u32::MAX, u32::MAX));
    }

    #[test]
    fn threshold_separates_faint_pixels_from_solid_ones() {
        let mut pixels = vec![0u8; 2 * 1 * 4];
        pixels[3] = 10; // faint
        pixels[7] = 200; // solid
        let surface = OverlaySurface::from_pixels(2, 1, pixels, DEFAULT_ALPHA_THRESHOLD);

        assert!(surface.is_transparent(0, 0));
        assert!(!surface.is_transparent(1, 0));
    }

    #[test]
    fn clicks_on_transparent_pixels_fall_through() {
        let mut surface = OverlaySurface::placeholder(200, 160, DEFAULT_ALPHA_THRESHOLD);
        let taken = surface.handle_event(OverlayEvent::MouseButton {
            x: 0,
            y: 0,
            button: OverlayButton::Left,
            released: false,
            click_count: 1,
        });
        assert!(!taken);
        assert_eq!(surface.journal().count(), 0);
    }

    #[test]
    fn clicks_on_solid_pixels_are_journaled() {
        let mut surface = OverlaySurface::placeholder(200, 160, DEFAULT_ALPHA_THRESHOLD);
        let (x, y) = solid_point(&surface);
        let event = OverlayEvent::MouseButton {
            x,
            y,
            button: OverlayButton::Right,
            released: true,
            click_count: 1,
        };
        assert!(surface.handle_event(event));
        assert_eq!(surface.journal().last(), Some(&event));
    }

    #[test]
    fn moves_and_wheel_ignore_transparency() {
        let mut surface = OverlaySurface::placeholder(200, 160, DEFAULT_ALPHA_THRESHOLD);
        assert!(surface.handle_event(OverlayEvent::MouseMove { x: 0, y: 0 }));
        assert!(surface.handle_event(OverlayEvent::Wheel {
            x: 0,
            y: 0,
            delta_x: 0.0,
            delta_y: -3.0,
        }));
        assert_eq!(surface.journal().count(), 2);
    }

    #[test]
    fn focus_events_track_surface_focus() {
        let mut surface = OverlaySurface::placeholder(64, 64, DEFAULT_ALPHA_THRESHOLD);
        assert!(!surface.is_focused());

        surface.handle_event(OverlayEvent::Focus { gained: true });
        assert!(surface.is_focused());

        surface.handle_event(OverlayEvent::Focus { gained: false });
        assert!(!surface.is_focused());

        surface.handle_event(OverlayEvent::CaptureLost);
        assert_eq!(surface.journal().count(), 3);
    }

    #[test]
    fn journal_is_bounded() {
        let mut surface = OverlaySurface::placeholder(64, 64, DEFAULT_ALPHA_THRESHOLD);
        for step in 0..(JOURNAL_CAPACITY as u32 + 10) {
            surface.handle_event(OverlayEvent::MouseMove { x: step, y: 0 });
        }
        assert_eq!(surface.journal().count(), JOURNAL_CAPACITY);
        assert_eq!(
            surface.journal().next(),
            Some(&OverlayEvent::MouseMove { x: 10, y: 0 })
        );
    }

    #[test]
    fn dirty_pixels_upload_once() {
        let mut surface = OverlaySurface::placeholder(32, 32, DEFAULT_ALPHA_THRESHOLD);
        assert!(surface.take_dirty_pixels().is_some());
        assert!(surface.take_dirty_pixels().is_none());

        let replacement = vec![255u8; 32 * 32 * 4];
        surface.replace_pixels(replacement).expect("same size");
        assert!(surface.take_dirty_pixels().is_some());

        assert!(surface.replace_pixels(vec![0u8; 8]).is_err());
    }
}
