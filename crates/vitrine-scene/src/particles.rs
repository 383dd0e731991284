//! Particle entities sharing one sphere mesh and one translucent material

use bevy::light::{NotShadowCaster, NotShadowReceiver};
use bevy::prelude::*;
use vitrine_core::lighting::srgb_components;
use vitrine_core::particles::{PARTICLE_COLOR, PARTICLE_OPACITY, PARTICLE_RADIUS, PARTICLE_SEGMENTS};

use crate::frame::Showcase;
use crate::scene::compose_scene;
use crate::FrameSet;

/// Index of the particle in the core field this entity renders
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleIndex(pub usize);

pub struct ParticlesPlugin;

impl Plugin for ParticlesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            spawn_particles
                .after(compose_scene)
                .run_if(resource_exists::<Showcase>),
        )
        .add_systems(Update, sync_particles.in_set(FrameSet::Sync));
    }
}

pub fn particle_material() -> StandardMaterial {
    let [r, g, b] = srgb_components(PARTICLE_COLOR);
    StandardMaterial {
        base_color: Color::srgba(r, g, b, PARTICLE_OPACITY),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    }
}

fn spawn_particles(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    showcase: Res<Showcase>,
) {
    let mesh = meshes.add(
        Sphere::new(PARTICLE_RADIUS)
            .mesh()
            .uv(PARTICLE_SEGMENTS, PARTICLE_SEGMENTS),
    );
    let material = materials.add(particle_material());

    for (index, position) in showcase.snapshot().particles.iter().enumerate() {
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(*position),
            ParticleIndex(index),
            NotShadowCaster,
            NotShadowReceiver,
        ));
    }
}

pub fn sync_particles(
    showcase: Res<Showcase>,
    mut particles: Query<(&ParticleIndex, &mut Transform)>,
) {
    let positions = &showcase.snapshot().particles;
    for (index, mut transform) in &mut particles {
        if let Some(position) = positions.get(index.0) {
            transform.translation = *position;
        }
    }
}
