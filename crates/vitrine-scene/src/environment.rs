//! Six-face environment cube map

use bevy::asset::{LoadState, RenderAssetUsages};
use bevy::light::EnvironmentMapLight;
use bevy::prelude::*;
use bevy::render::render_resource::{
    Extent3d, TextureDimension, TextureViewDescriptor, TextureViewDimension,
};
use tracing::info;
use vitrine_core::scene::EnvironmentState;
use vitrine_core::AssetLoadError;

use crate::camera::MainCamera;
use crate::frame::Showcase;
use crate::scene::{color_from_hex, compose_scene};
use crate::FrameSet;

/// Face order expected by the cube view: +x, -x, +y, -y, +z, -z
pub const CUBE_FACES: usize = 6;

pub const ENVIRONMENT_INTENSITY: f32 = 900.0;

#[derive(Resource)]
pub struct EnvironmentFaces {
    pub paths: Vec<String>,
    pub handles: Vec<Handle<Image>>,
}

pub struct EnvironmentPlugin;

impl Plugin for EnvironmentPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            request_environment
                .after(compose_scene)
                .run_if(resource_exists::<Showcase>),
        )
        .add_systems(Update, poll_environment.in_set(FrameSet::Input));
    }
}

fn request_environment(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    showcase: Res<Showcase>,
) {
    if !matches!(showcase.scene().environment(), EnvironmentState::Loading(_)) {
        return;
    }
    let paths = showcase.scene().config().environment.faces.to_vec();
    let handles: Vec<Handle<Image>> = paths
        .iter()
        .map(|path| asset_server.load(path.clone()))
        .collect();
    commands.insert_resource(EnvironmentFaces { paths, handles });
}

/// Concatenate six equally sized faces into one cube texture
pub fn stack_cube_faces(faces: &[&Image]) -> Result<Image, String> {
    if faces.len() != CUBE_FACES {
        return Err(format!("expected {} faces, got {}", CUBE_FACES, faces.len()));
    }
    let size = faces[0].texture_descriptor.size;
    let format = faces[0].texture_descriptor.format;

    let mut data = Vec::new();
    for (index, face) in faces.iter().enumerate() {
        let descriptor = &face.texture_descriptor;
        if descriptor.size != size || descriptor.format != format {
            return Err(format!("face {} does not match the size or format of face 0", index));
        }
        let Some(bytes) = &face.data else {
            return Err(format!("face {} has no pixel data", index));
        };
        data.extend_from_slice(bytes);
    }

    let mut cube = Image::new(
        Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: CUBE_FACES as u32,
        },
        TextureDimension::D2,
        data,
        format,
        RenderAssetUsages::RENDER_WORLD,
    );
    cube.texture_view_descriptor = Some(TextureViewDescriptor {
        dimension: Some(TextureViewDimension::Cube),
        ..default()
    });
    Ok(cube)
}

fn poll_environment(
    mut commands: Commands,
    faces: Option<Res<EnvironmentFaces>>,
    asset_server: Res<AssetServer>,
    mut images: ResMut<Assets<Image>>,
    mut showcase: ResMut<Showcase>,
    cameras: Query<Entity, With<MainCamera>>,
) {
    let Some(faces) = faces else {
        return;
    };
    if !matches!(showcase.scene().environment(), EnvironmentState::Loading(_)) {
        return;
    }

    let mut failure = None;
    let mut loaded = 0;
    for (path, handle) in faces.paths.iter().zip(&faces.handles) {
        match asset_server.get_load_state(handle.id()) {
            Some(LoadState::Loaded) => loaded += 1,
            Some(LoadState::Failed(err)) => {
                failure = Some(AssetLoadError::new(path.clone(), err.to_string()));
                break;
            }
            _ => {}
        }
    }

    if failure.is_none() && loaded < faces.handles.len() {
        return;
    }

    let cube = match failure {
        Some(err) => Err(err),
        None => {
            let face_images: Option<Vec<&Image>> =
                faces.handles.iter().map(|handle| images.get(handle)).collect();
            let stacked = match face_images {
                Some(face_images) => stack_cube_faces(&face_images),
                None => Err("face image missing after load".to_string()),
            };
            stacked.map_err(|reason| AssetLoadError::new(faces.paths.join(","), reason))
        }
    };

    match cube {
        Ok(cube) => {
            let handle = images.add(cube);
            showcase.scene_mut().on_environment_loaded();
            for camera in &cameras {
                commands.entity(camera).insert(EnvironmentMapLight {
                    diffuse_map: handle.clone(),
                    specular_map: handle.clone(),
                    intensity: ENVIRONMENT_INTENSITY,
                    ..default()
                });
            }
            info!("Environment map applied");
        }
        Err(err) => {
            showcase.scene_mut().on_environment_failed(err);
            commands.insert_resource(ClearColor(color_from_hex(showcase.scene().background)));
        }
    }
}
