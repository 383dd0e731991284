//! Scene composition and resize handling

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use vitrine_core::lighting::srgb_components;
use vitrine_core::{Scene, Viewport};

use crate::camera::MainCamera;
use crate::frame::Showcase;
use crate::{FrameSet, SceneSettings};

/// Bevy lights are photometric; the rig stores unitless intensities
pub const AMBIENT_BRIGHTNESS_SCALE: f32 = 500.0;
pub const DIRECTIONAL_LUX_SCALE: f32 = 10_000.0;
pub const SPOT_LUMENS_SCALE: f32 = 1_000_000.0;

pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, compose_scene)
            .add_systems(Update, handle_resize.in_set(FrameSet::Input));
    }
}

pub fn color_from_hex(hex: u32) -> Color {
    let [r, g, b] = srgb_components(hex);
    Color::srgb(r, g, b)
}

/// Logical size of the window the scene draws into
pub fn window_viewport(window: &Window) -> Viewport {
    Viewport::new(
        window.width().round() as u32,
        window.height().round() as u32,
        window.scale_factor(),
    )
}

/// Build the core scene and spawn its camera and lights
///
/// Without a primary window there is nothing to draw into: the error is
/// logged and no [`Showcase`] is inserted, which keeps every frame system idle.
pub fn compose_scene(
    mut commands: Commands,
    settings: Res<SceneSettings>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let config = settings.0.clone();
    let container = windows.single().ok().map(window_viewport);
    let mut rng = match config.particles.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let scene = match Scene::initialize(container, config, &mut rng) {
        Ok(scene) => scene,
        Err(err) => {
            error!("Scene initialization failed: {}", err);
            return;
        }
    };

    commands.insert_resource(ClearColor(color_from_hex(scene.background)));

    let camera = &scene.camera;
    let ambient = &scene.lights.ambient;
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fov_radians(),
            aspect_ratio: camera.aspect,
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        Transform::from_translation(camera.position).looking_at(camera.target, Vec3::Y),
        AmbientLight {
            color: color_from_hex(ambient.color),
            brightness: ambient.intensity * AMBIENT_BRIGHTNESS_SCALE,
            ..default()
        },
        MainCamera,
    ));

    let sun = &scene.lights.sun;
    commands.spawn((
        DirectionalLight {
            color: color_from_hex(sun.color),
            illuminance: sun.intensity * DIRECTIONAL_LUX_SCALE,
            shadows_enabled: sun.cast_shadows,
            ..default()
        },
        Transform::from_translation(sun.position).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Bevy spot lights already fall off with the inverse square, matching decay 2
    let key = &scene.lights.key;
    commands.spawn((
        SpotLight {
            color: color_from_hex(key.color),
            intensity: key.intensity * SPOT_LUMENS_SCALE,
            range: key.range,
            outer_angle: key.angle,
            inner_angle: key.inner_angle(),
            shadows_enabled: key.cast_shadows,
            ..default()
        },
        Transform::from_translation(key.position).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    info!(
        lights = scene.lights.light_count(),
        shadow_casters = scene.lights.shadow_casters(),
        "Scene composed"
    );
    commands.insert_resource(Showcase::new(scene));
}

/// Recompute aspect and surface from the latest absolute window size
fn handle_resize(
    mut resized: MessageReader<WindowResized>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut showcase: ResMut<Showcase>,
    mut cameras: Query<&mut Projection, With<MainCamera>>,
) {
    let Some(event) = resized.read().last() else {
        return;
    };
    let Ok(window) = windows.get(event.window) else {
        return;
    };

    let viewport = Viewport::new(
        event.width.round() as u32,
        event.height.round() as u32,
        window.scale_factor(),
    );
    showcase.scene_mut().handle_resize(viewport);

    let aspect = showcase.scene().camera.aspect;
    for mut projection in &mut cameras {
        if let Projection::Perspective(perspective) = &mut *projection {
            perspective.aspect_ratio = aspect;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        assert_eq!(color_from_hex(0xffffff), Color::srgb(1.0, 1.0, 1.0));
        assert_eq!(color_from_hex(0x000000), Color::srgb(0.0, 0.0, 0.0));
        let gold = color_from_hex(0xd4af37).to_srgba();
        assert!((gold.red - 212.0 / 255.0).abs() < 1e-6);
        assert!((gold.green - 175.0 / 255.0).abs() < 1e-6);
        assert!((gold.blue - 55.0 / 255.0).abs() < 1e-6);
    }
}
