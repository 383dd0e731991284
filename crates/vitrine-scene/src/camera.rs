//! Orbit input and camera transform sync

use bevy::input::mouse::{AccumulatedMouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::frame::Showcase;
use crate::FrameSet;

/// Browsers report wheel deltas in pixels; roughly this many make one notch
const PIXELS_PER_NOTCH: f32 = 100.0;

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, orbit_input.in_set(FrameSet::Input))
            .add_systems(Update, sync_camera.in_set(FrameSet::Sync));
    }
}

pub fn wheel_notches(unit: MouseScrollUnit, y: f32) -> f32 {
    match unit {
        MouseScrollUnit::Line => y,
        MouseScrollUnit::Pixel => y / PIXELS_PER_NOTCH,
    }
}

/// Ratio by which a two-finger gesture scales the orbit distance
pub fn pinch_scale(previous: (Vec2, Vec2), current: (Vec2, Vec2)) -> f32 {
    let before = previous.0.distance(previous.1);
    let after = current.0.distance(current.1);
    before / after.max(1.0)
}

/// Feed drag, wheel and touch gestures into the orbit controller targets
fn orbit_input(
    mut showcase: ResMut<Showcase>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    touches: Res<Touches>,
) {
    let height = showcase.scene().viewport().height as f32;
    let controls = &mut showcase.scene_mut().controls;

    if mouse_button.pressed(MouseButton::Left) && mouse_motion.delta != Vec2::ZERO {
        controls.rotate_by_pointer(mouse_motion.delta.x, mouse_motion.delta.y, height);
    }

    for scroll in mouse_wheel.read() {
        controls.zoom_by_steps(wheel_notches(scroll.unit, scroll.y));
    }

    let active: Vec<_> = touches.iter().collect();
    match active.as_slice() {
        [touch] => {
            let delta = touch.delta();
            if delta != Vec2::ZERO {
                controls.rotate_by_pointer(delta.x, delta.y, height);
            }
        }
        [first, second] => {
            let previous = (first.position() - first.delta(), second.position() - second.delta());
            let scale = pinch_scale(previous, (first.position(), second.position()));
            if scale != 1.0 {
                controls.zoom_by_scale(scale);
            }
        }
        _ => {}
    }
}

fn sync_camera(showcase: Res<Showcase>, mut cameras: Query<&mut Transform, With<MainCamera>>) {
    let snapshot = showcase.snapshot();
    if let Ok(mut transform) = cameras.single_mut() {
        transform.translation = snapshot.camera_position;
        transform.look_at(snapshot.camera_target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_notches_by_unit() {
        assert_eq!(wheel_notches(MouseScrollUnit::Line, 2.0), 2.0);
        assert_eq!(wheel_notches(MouseScrollUnit::Pixel, -150.0), -1.5);
    }

    #[test]
    fn test_spreading_fingers_zooms_in() {
        let before = (Vec2::new(100.0, 100.0), Vec2::new(200.0, 100.0));
        let after = (Vec2::new(50.0, 100.0), Vec2::new(250.0, 100.0));
        assert!((pinch_scale(before, after) - 0.5).abs() < 1e-6);
        assert!((pinch_scale(after, before) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_collapsed_pinch_is_bounded() {
        let point = Vec2::new(10.0, 10.0);
        let scale = pinch_scale((Vec2::ZERO, Vec2::new(3.0, 4.0)), (point, point));
        assert!(scale.is_finite());
        assert_eq!(scale, 5.0);
    }
}
