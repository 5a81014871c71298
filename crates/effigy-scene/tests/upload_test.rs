//! GPU upload integration tests.
//!
//! These tests need a GPU adapter (real or software fallback). Without one
//! they print a notice and return early.

use effigy_core::{Circle, Classified, Feature, Shape, VisualDescriptor};
use effigy_scene::{MeshBuilder, ResourceContext, SceneNode};
use glam::Mat4;
use pollster::FutureExt;

fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .block_on()?;
    adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("effigy upload test device"),
                ..Default::default()
            },
            None,
        )
        .block_on()
        .ok()
}

fn critter() -> VisualDescriptor {
    VisualDescriptor {
        width: 70.0,
        height: 50.0,
        features: vec![
            Feature::new(
                "head",
                "#E0B040",
                Shape::Circle(Circle {
                    x: 16.0,
                    y: 16.0,
                    radius: 14.0,
                }),
            ),
            Feature::new(
                "left eye",
                "#FFFFFF",
                Shape::Circle(Circle {
                    x: 11.0,
                    y: 13.0,
                    radius: 3.0,
                }),
            ),
        ],
        ..Default::default()
    }
}

/// Names and index counts of every mesh node, in visit order.
fn mesh_nodes(root: &SceneNode) -> Vec<(String, usize)> {
    let mut found = Vec::new();
    root.visit(Mat4::IDENTITY, &mut |node, _| {
        if let Some(geometry) = node.geometry() {
            if !geometry.mesh().is_empty() {
                found.push((node.name.clone(), geometry.mesh().indices.len()));
            }
        }
    });
    found
}

#[test]
fn headless_upload_matches_scene() {
    let Some((device, _queue)) = headless_device() else {
        eprintln!("Skipping headless upload: no GPU adapter available");
        return;
    };

    let ctx = ResourceContext::new();
    let entity = MeshBuilder::new(&ctx).build(&Classified::new(critter()));
    let stats = ctx.stats();
    let expected = mesh_nodes(entity.root());
    assert!(!expected.is_empty());

    let uploaded = entity.upload(&device).unwrap();
    assert_eq!(uploaded.len(), expected.len());
    for (mesh, (name, index_count)) in uploaded.meshes().iter().zip(&expected) {
        assert_eq!(&mesh.name, name);
        assert_eq!(mesh.index_count as usize, *index_count);
        assert!(mesh.index_buffer.size() >= (*index_count * 4) as u64);
        assert!(mesh.vertex_buffer.usage().contains(wgpu::BufferUsages::VERTEX));
        assert!(mesh.index_buffer.usage().contains(wgpu::BufferUsages::INDEX));
    }
    let head = uploaded
        .meshes()
        .iter()
        .find(|m| m.name == "head")
        .unwrap();
    assert!(head.model.w_axis.x > 0.0, "head sits forward");

    // Uploading allocates GPU buffers only; the resource ledger is untouched.
    drop(uploaded);
    assert_eq!(ctx.stats(), stats);
}
