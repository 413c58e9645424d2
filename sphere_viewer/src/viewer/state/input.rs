use winit::{
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{Key, NamedKey},
};

use super::ViewerState;
use crate::overlay::{OverlayButton, OverlayEvent};

/// Camera steps per arrow-key press.
const LINEAR_STEP: f32 = 0.1;
const ANGULAR_STEP_DEGREES: f32 = 5.0;

const WHEEL_PIXELS_PER_LINE: f32 = 40.0;

pub(super) fn handle_key_event(state: &mut ViewerState, event: &KeyEvent) {
    if event.state != ElementState::Pressed {
        return;
    }

    match event.logical_key {
        Key::Named(NamedKey::ArrowUp) => state.camera.move_forward(LINEAR_STEP),
        Key::Named(NamedKey::ArrowDown) => state.camera.move_forward(-LINEAR_STEP),
        Key::Named(NamedKey::ArrowLeft) => {
            state.camera.rotate_world_y(ANGULAR_STEP_DEGREES.to_radians());
        }
        Key::Named(NamedKey::ArrowRight) => {
            state.camera.rotate_world_y(-ANGULAR_STEP_DEGREES.to_radians());
        }
        Key::Named(NamedKey::F11) => {
            if let Some(surface) = state.overlay_surface.as_ref() {
                surface.open_dev_panel();
            }
        }
        _ => {}
    }
}

/// The window-message translation: mouse, wheel, and focus traffic becomes
/// overlay events, with button presses subject to the surface's
/// transparency hit-test.
pub(super) fn handle_window_event(state: &mut ViewerState, event: &WindowEvent) {
    match event {
        WindowEvent::CursorMoved { position, .. } => {
            state.cursor = Some((position.x, position.y));
            if let Some((surface, (x, y))) = overlay_target(state) {
                surface.handle_event(OverlayEvent::MouseMove { x, y });
            }
        }
        WindowEvent::MouseInput {
            state: button_state,
            button,
            ..
        } => {
            let Some(button) = translate_button(*button) else {
                return;
            };
            let released = *button_state == ElementState::Released;
            if let Some((surface, (x, y))) = overlay_target(state) {
                surface.handle_event(OverlayEvent::MouseButton {
                    x,
                    y,
                    button,
                    released,
                    click_count: 1,
                });
            }
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let (delta_x, delta_y) = match delta {
                MouseScrollDelta::LineDelta(x, y) => {
                    (x * WHEEL_PIXELS_PER_LINE, y * WHEEL_PIXELS_PER_LINE)
                }
                MouseScrollDelta::PixelDelta(position) => {
                    (position.x as f32, position.y as f32)
                }
            };
            if let Some((surface, (x, y))) = overlay_target(state) {
                surface.handle_event(OverlayEvent::Wheel {
                    x,
                    y,
                    delta_x,
                    delta_y,
                });
            }
        }
        WindowEvent::Focused(gained) => {
            if let Some(surface) = state.overlay_surface.as_mut() {
                surface.handle_event(OverlayEvent::Focus { gained: *gained });
            }
        }
        WindowEvent::CursorLeft { .. } => {
            state.cursor = None;
            if let Some(surface) = state.overlay_surface.as_mut() {
                surface.handle_event(OverlayEvent::CaptureLost);
            }
        }
        _ => {}
    }
}

fn translate_button(button: MouseButton) -> Option<OverlayButton> {
    match button {
        MouseButton::Left => Some(OverlayButton::Left),
        MouseButton::Right => Some(OverlayButton::Right),
        _ => None,
    }
}

fn overlay_target(
    state: &mut ViewerState,
) -> Option<(&mut crate::overlay::OverlaySurface, (u32, u32))> {
    let cursor = state.cursor?;
    let window = (state.size.width, state.size.height);
    let surface = state.overlay_surface.as_mut()?;
    let point = surface_point(window, (surface.width(), surface.height()), cursor);
    Some((surface, point))
}

/// Map a window-space cursor position onto the overlay's pixel grid. The
/// overlay spans the whole window, so this is a scale plus clamp.
fn surface_point(
    window: (u32, u32),
    surface: (u32, u32),
    cursor: (f64, f64),
) -> (u32, u32) {
    let scale_x = surface.0 as f64 / window.0.max(1) as f64;
    let scale_y = surface.1 as f64 / window.1.max(1) as f64;
    let x = (cursor.0.max(0.0) * scale_x) as u32;
    let y = (cursor.1.max(0.0) * scale_y) as u32;
    (
        x.min(surface.0.saturating_sub(1)),
        y.min(surface.1.saturating_sub(1)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_point_is_identity_at_matching_sizes() {
        assert_eq!(
            surface_point((800, 600), (800, 600), (400.0, 300.0)),
            (400, 300)
        );
    }

    #[test]
    fn surface_point_scales_between_resolutions() {
        assert_eq!(
            surface_point((800, 600), (400, 300), (400.0, 300.0)),
            (200, 150)
        );
        assert_eq!(
            surface_point((400, 300), (800, 600), (100.0, 75.0)),
            (200, 150)
        );
    }

    #[test]
    fn surface_point_clamps_to_the_surface() {
        assert_eq!(
            surface_point((800, 600), (800, 600), (5000.0, -20.0)),
            (799, 0)
        );
        assert_eq!(surface_point((800, 600), (1, 1), (123.0, 456.0)), (0, 0));
    }

    #[test]
    fn middle_button_is_not_forwarded() {
        assert_eq!(translate_button(MouseButton::Left), Some(OverlayButton::Left));
        assert_eq!(
            translate_button(MouseButton::Right),
            Some(OverlayButton::Right)
        );
        assert_eq!(translate_button(MouseButton::Middle), None);
        assert_eq!(translate_button(MouseButton::Back), None);
    }
}
