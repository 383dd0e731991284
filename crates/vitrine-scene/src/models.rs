//! glTF model loading with the procedural fallback

use bevy::asset::{LoadState, RecursiveDependencyLoadState, RenderAssetUsages};
use bevy::gltf::{Gltf, GltfNode};
use bevy::light::{NotShadowCaster, NotShadowReceiver};
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::platform::collections::HashMap;
use bevy::render::render_resource::PrimitiveTopology;
use tracing::{info, warn};
use vitrine_core::geometry::MeshData;
use vitrine_core::scene::{FallbackRenderable, ModelTransform};
use vitrine_core::{AssetLoadError, SceneNode};

use crate::frame::Showcase;
use crate::scene::{color_from_hex, compose_scene};
use crate::FrameSet;

/// Progress is reported in phases: file fetched, then all dependencies
pub const LOAD_PHASES: u64 = 2;

/// The single in-flight model request
#[derive(Resource)]
pub struct ModelLoad {
    pub handle: Handle<Gltf>,
}

/// Root of the spawned glTF scene
#[derive(Component)]
pub struct LoadedModel;

/// Mesh inside the model that has been set up to cast and receive shadows
#[derive(Component)]
pub struct ModelMesh;

/// Set on a model root once its spawned scene has been walked for shadows
#[derive(Component)]
pub struct ShadowsApplied;

#[derive(Component)]
pub struct FallbackKnot;

pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            request_model
                .after(compose_scene)
                .run_if(resource_exists::<Showcase>),
        )
        .add_systems(Update, poll_model_load.in_set(FrameSet::Input))
        .add_systems(
            Update,
            (apply_model_shadows, sync_model, sync_fallback).in_set(FrameSet::Sync),
        );
    }
}

/// Where a glTF request stands right now
enum GltfPoll {
    Pending(u64),
    Ready { scene: Handle<Scene>, root: SceneNode },
    Failed(AssetLoadError),
}

fn request_model(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut showcase: ResMut<Showcase>,
) {
    let url = showcase.scene().model_load().url().to_string();
    let handle: Handle<Gltf> = asset_server.load(url);
    showcase.scene_mut().on_model_progress(0, Some(LOAD_PHASES));
    commands.insert_resource(ModelLoad { handle });
}

fn poll_gltf(
    asset_server: &AssetServer,
    gltf_assets: &Assets<Gltf>,
    gltf_nodes: &Assets<GltfNode>,
    handle: &Handle<Gltf>,
    url: &str,
) -> GltfPoll {
    match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => {}
        Some(LoadState::Failed(err)) => {
            return GltfPoll::Failed(AssetLoadError::new(url, err.to_string()));
        }
        _ => return GltfPoll::Pending(0),
    }

    match asset_server.get_recursive_dependency_load_state(handle.id()) {
        Some(RecursiveDependencyLoadState::Loaded) => {}
        Some(RecursiveDependencyLoadState::Failed(err)) => {
            return GltfPoll::Failed(AssetLoadError::new(url, err.to_string()));
        }
        _ => return GltfPoll::Pending(1),
    }

    let Some(gltf) = gltf_assets.get(handle) else {
        return GltfPoll::Pending(1);
    };
    let Some(root) = gltf_outline(gltf, gltf_nodes, url) else {
        return GltfPoll::Pending(1);
    };
    // Use first scene if no default
    match gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned()) {
        Some(scene) => GltfPoll::Ready { scene, root },
        None => GltfPoll::Failed(AssetLoadError::new(url, "file contains no scenes")),
    }
}

/// Flattened glTF node: children refer to positions in the node list
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineNode {
    pub name: String,
    pub mesh: bool,
    pub children: Vec<usize>,
}

/// Hierarchy summary handed to the core scene. The entities themselves are
/// spawned by the scene spawner later and marked by `apply_model_shadows`.
fn gltf_outline(gltf: &Gltf, gltf_nodes: &Assets<GltfNode>, url: &str) -> Option<SceneNode> {
    let positions: HashMap<AssetId<GltfNode>, usize> = gltf
        .nodes
        .iter()
        .enumerate()
        .map(|(index, handle)| (handle.id(), index))
        .collect();

    let mut nodes = Vec::with_capacity(gltf.nodes.len());
    for handle in &gltf.nodes {
        let node = gltf_nodes.get(handle)?;
        nodes.push(OutlineNode {
            name: node.name.clone(),
            mesh: node.mesh.is_some(),
            children: node
                .children
                .iter()
                .filter_map(|child| positions.get(&child.id()).copied())
                .collect(),
        });
    }
    Some(outline_tree(url, &nodes))
}

/// Rebuild the node tree under one group named after the file; nodes no
/// other node lists as a child become its direct children
pub fn outline_tree(url: &str, nodes: &[OutlineNode]) -> SceneNode {
    let mut is_child = vec![false; nodes.len()];
    for node in nodes {
        for &child in &node.children {
            if let Some(flag) = is_child.get_mut(child) {
                *flag = true;
            }
        }
    }
    let roots = (0..nodes.len())
        .filter(|&index| !is_child[index])
        .map(|index| outline_node(nodes, index, nodes.len()))
        .collect();
    SceneNode::group(url, roots)
}

fn outline_node(nodes: &[OutlineNode], index: usize, depth_left: usize) -> SceneNode {
    let node = &nodes[index];
    let mut outline = if node.mesh {
        SceneNode::mesh(node.name.clone())
    } else {
        SceneNode::group(node.name.clone(), Vec::new())
    };
    // A well-formed file has no cycles; the depth bound keeps a broken one finite
    if depth_left > 0 {
        outline.children = node
            .children
            .iter()
            .filter(|&&child| child < nodes.len())
            .map(|&child| outline_node(nodes, child, depth_left - 1))
            .collect();
    }
    outline
}

/// Turn asset server state into load events; exactly one of model or
/// fallback is spawned
#[allow(clippy::too_many_arguments)]
fn poll_model_load(
    mut commands: Commands,
    load: Option<Res<ModelLoad>>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    gltf_nodes: Res<Assets<GltfNode>>,
    time: Res<Time>,
    mut showcase: ResMut<Showcase>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(load) = load else {
        return;
    };
    if !showcase.scene().model_load().is_pending() {
        return;
    }

    let url = showcase.scene().model_load().url().to_string();
    match poll_gltf(&asset_server, &gltf_assets, &gltf_nodes, &load.handle, &url) {
        GltfPoll::Pending(phase) => {
            showcase.scene_mut().on_model_progress(phase, Some(LOAD_PHASES));
        }
        GltfPoll::Ready { scene, root } => {
            showcase.scene_mut().on_model_progress(LOAD_PHASES, Some(LOAD_PHASES));
            let now_ms = time.elapsed_secs_f64() * 1000.0;
            if !showcase.scene_mut().on_model_loaded(root, now_ms) {
                return;
            }
            if let Some(model) = showcase.scene().model() {
                info!(meshes = model.root.mesh_count(), "Model attached");
                commands.spawn((
                    SceneRoot(scene),
                    model_transform(&model.transform),
                    LoadedModel,
                ));
            }
        }
        GltfPoll::Failed(err) => {
            if !showcase.scene_mut().on_model_failed(err) {
                return;
            }
            if let Some(fallback) = showcase.scene().fallback() {
                warn!("Showing fallback geometry in place of {}", url);
                spawn_fallback(&mut commands, &mut meshes, &mut materials, fallback);
            }
        }
    }
}

pub fn model_transform(transform: &ModelTransform) -> Transform {
    let rotation = transform.rotation;
    Transform {
        translation: transform.position,
        rotation: Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z),
        scale: Vec3::splat(transform.scale),
    }
}

pub fn knot_mesh(data: &MeshData) -> Mesh {
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, data.positions.clone())
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, data.normals.clone())
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, data.uvs.clone())
        .with_inserted_indices(Indices::U32(data.indices.clone()))
}

fn spawn_fallback(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    fallback: &FallbackRenderable,
) {
    let material = StandardMaterial {
        base_color: color_from_hex(fallback.material.color),
        metallic: fallback.material.metalness,
        perceptual_roughness: fallback.material.roughness,
        ..default()
    };
    let mut entity = commands.spawn((
        Mesh3d(meshes.add(knot_mesh(&fallback.geometry.build()))),
        MeshMaterial3d(materials.add(material)),
        Transform::default(),
        FallbackKnot,
        NotShadowReceiver,
    ));
    if !fallback.cast_shadow {
        entity.insert(NotShadowCaster);
    }
}

/// The scene spawner writes a whole instance under its root in one pass, so
/// each root is walked once, on the first frame it has children
fn apply_model_shadows(
    mut commands: Commands,
    models: Query<Entity, (With<LoadedModel>, With<Children>, Without<ShadowsApplied>)>,
    children_query: Query<&Children>,
    mesh_query: Query<(), (With<Mesh3d>, Without<ModelMesh>)>,
) {
    for root in &models {
        mark_model_meshes(&mut commands, root, &children_query, &mesh_query);
        commands.entity(root).insert(ShadowsApplied);
    }
}

fn mark_model_meshes(
    commands: &mut Commands,
    parent: Entity,
    children_query: &Query<&Children>,
    mesh_query: &Query<(), (With<Mesh3d>, Without<ModelMesh>)>,
) {
    if let Ok(children) = children_query.get(parent) {
        for child in children.iter() {
            if mesh_query.get(child).is_ok() {
                commands
                    .entity(child)
                    .remove::<(NotShadowCaster, NotShadowReceiver)>()
                    .insert(ModelMesh);
            }
            mark_model_meshes(commands, child, children_query, mesh_query);
        }
    }
}

fn sync_model(showcase: Res<Showcase>, mut models: Query<&mut Transform, With<LoadedModel>>) {
    let Some(model) = &showcase.snapshot().model else {
        return;
    };
    for mut transform in &mut models {
        *transform = model_transform(model);
    }
}

fn sync_fallback(
    showcase: Res<Showcase>,
    mut fallbacks: Query<&mut Transform, With<FallbackKnot>>,
) {
    let Some(rotation) = showcase.snapshot().fallback_rotation else {
        return;
    };
    for mut transform in &mut fallbacks {
        transform.rotation = Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{headless_app, update_until};
    use vitrine_core::geometry::TorusKnot;
    use vitrine_core::SceneConfig;

    fn node(name: &str, mesh: bool, children: Vec<usize>) -> OutlineNode {
        OutlineNode {
            name: name.to_string(),
            mesh,
            children,
        }
    }

    #[test]
    fn test_knot_mesh_keeps_topology() {
        let data = TorusKnot::default().build();
        let mesh = knot_mesh(&data);
        assert_eq!(mesh.count_vertices(), 101 * 17);
        assert_eq!(mesh.indices().map(|indices| indices.len()), Some(100 * 16 * 6));
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
        assert!(mesh.attribute(Mesh::ATTRIBUTE_UV_0).is_some());
    }

    #[test]
    fn test_model_transform() {
        let transform = model_transform(&ModelTransform {
            position: Vec3::new(0.0, -1.0, 0.0),
            scale: 1.5,
            rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
        });
        assert_eq!(transform.translation, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(transform.scale, Vec3::splat(1.5));
        let forward = transform.rotation * Vec3::Z;
        assert!((forward - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_outline_follows_node_hierarchy() {
        // armature -> (body mesh, hand -> sword mesh), plus a detached helmet mesh
        let nodes = vec![
            node("body", true, vec![]),
            node("armature", false, vec![0, 2]),
            node("hand", false, vec![3]),
            node("sword", true, vec![]),
            node("helmet", true, vec![]),
        ];
        let root = outline_tree("assets/samurai.glb", &nodes);

        assert_eq!(root.name, "assets/samurai.glb");
        assert!(!root.is_mesh);
        let names: Vec<&str> = root.children.iter().map(|child| child.name.as_str()).collect();
        assert_eq!(names, ["armature", "helmet"]);
        assert_eq!(root.mesh_count(), 3);

        let hand = &root.children[0].children[1];
        assert_eq!(hand.name, "hand");
        assert_eq!(hand.children[0].name, "sword");
        assert!(hand.children[0].is_mesh);
    }

    #[test]
    fn test_outline_survives_cyclic_nodes() {
        let nodes = vec![node("a", true, vec![1]), node("b", true, vec![0, 9])];
        let root = outline_tree("broken.glb", &nodes);
        // Every node is someone's child, so nothing is a root
        assert!(root.children.is_empty());

        let bounded = outline_node(&nodes, 0, nodes.len());
        assert_eq!(bounded.mesh_count(), 3);
    }

    #[test]
    fn test_every_model_mesh_is_marked_for_shadows() {
        let mut app = App::new();
        app.add_systems(Update, apply_model_shadows);

        let root = app
            .world_mut()
            .spawn(LoadedModel)
            .with_children(|root| {
                root.spawn((Mesh3d(Handle::default()), NotShadowCaster, NotShadowReceiver));
                root.spawn(Transform::default()).with_children(|group| {
                    group.spawn(Mesh3d(Handle::default()));
                });
            })
            .id();
        let stray = app.world_mut().spawn(Mesh3d(Handle::default())).id();

        app.update();

        let world = app.world_mut();
        let mut marked = world.query_filtered::<Entity, With<ModelMesh>>();
        assert_eq!(marked.iter(world).count(), 2);
        let mut unshadowed =
            world.query_filtered::<Entity, (With<ModelMesh>, With<NotShadowCaster>)>();
        assert_eq!(unshadowed.iter(world).count(), 0);
        assert!(world.get::<ModelMesh>(stray).is_none());
        assert!(world.get::<ShadowsApplied>(root).is_some());
    }

    #[test]
    fn test_shadow_walk_runs_once_per_model() {
        let mut app = App::new();
        app.add_systems(Update, apply_model_shadows);

        // A root without children yet is left for a later frame
        let root = app.world_mut().spawn(LoadedModel).id();
        app.update();
        assert!(app.world().get::<ShadowsApplied>(root).is_none());

        app.world_mut().entity_mut(root).with_children(|root| {
            root.spawn(Mesh3d(Handle::default()));
        });
        app.update();
        assert!(app.world().get::<ShadowsApplied>(root).is_some());

        let late = app.world_mut().spawn(Mesh3d(Handle::default())).id();
        app.world_mut().entity_mut(root).add_child(late);
        app.update();
        app.update();
        assert!(app.world().get::<ModelMesh>(late).is_none());
    }

    #[test]
    fn test_missing_model_spawns_single_fallback_and_keeps_rendering() {
        let mut config = SceneConfig::default();
        config.model.url = "missing/statue.glb".to_string();
        config.environment.enabled = false;
        let mut app = headless_app(config);
        app.add_plugins((ModelsPlugin, crate::frame::FramePlugin));

        let settled = update_until(&mut app, |world| {
            !world.resource::<Showcase>().scene().model_load().is_pending()
        });
        assert!(settled, "model load never finished");

        let world = app.world_mut();
        let mut knots = world.query_filtered::<Entity, With<FallbackKnot>>();
        assert_eq!(knots.iter(world).count(), 1);
        let mut models = world.query_filtered::<Entity, With<LoadedModel>>();
        assert_eq!(models.iter(world).count(), 0);
        assert!(world.resource::<Showcase>().scene().fallback().is_some());

        let frames = app.world().resource::<Showcase>().frames_rendered();
        for _ in 0..5 {
            app.update();
        }
        let world = app.world_mut();
        assert_eq!(knots.iter(world).count(), 1);
        assert_eq!(world.resource::<Showcase>().frames_rendered(), frames + 5);
        assert!(world.resource::<Showcase>().snapshot().fallback_rotation.is_some());
    }
}
