//! GPU buffer upload for built entities.

use effigy_core::{EffigyError, Result};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::geometry::MeshData;
use crate::scene::SceneNode;

/// Vertex layout uploaded for every mesh.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl GpuVertex {
    /// Vertex buffer layout matching this struct.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// One immutable buffer per mesh stream; nothing is written after upload.
fn init_buffer(
    device: &wgpu::Device,
    mesh: &str,
    stream: &str,
    contents: &[u8],
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("effigy {mesh} {stream}")),
        contents,
        usage,
    })
}

/// Interleaves a mesh into upload order, rejecting non-finite data.
pub fn vertices(name: &str, mesh: &MeshData) -> Result<Vec<GpuVertex>> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .map(|(p, n)| {
            if p.is_finite() && n.is_finite() {
                Ok(GpuVertex {
                    position: p.to_array(),
                    normal: n.to_array(),
                })
            } else {
                Err(EffigyError::GpuUpload(format!(
                    "mesh '{name}' has non-finite vertex data"
                )))
            }
        })
        .collect()
}

/// One uploaded mesh node.
#[derive(Debug)]
pub struct GpuMesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    /// World matrix at upload time.
    pub model: Mat4,
    /// Linear RGBA base color.
    pub color: [f32; 4],
}

/// Buffers for every mesh of an entity. Destroys them on drop.
#[derive(Debug, Default)]
pub struct GpuEntity {
    meshes: Vec<GpuMesh>,
}

impl GpuEntity {
    pub fn meshes(&self) -> &[GpuMesh] {
        &self.meshes
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl Drop for GpuEntity {
    fn drop(&mut self) {
        for mesh in &self.meshes {
            mesh.vertex_buffer.destroy();
            mesh.index_buffer.destroy();
        }
    }
}

/// Uploads every non-empty mesh in `root`'s subtree.
pub(crate) fn upload(device: &wgpu::Device, root: &SceneNode) -> Result<GpuEntity> {
    let mut staged = Vec::new();
    let mut failure = None;
    root.visit(Mat4::IDENTITY, &mut |node, world| {
        if failure.is_some() {
            return;
        }
        let (Some(geometry), Some(material)) = (node.geometry(), node.material()) else {
            return;
        };
        let mesh = geometry.mesh();
        if mesh.is_empty() {
            return;
        }
        match vertices(&node.name, mesh) {
            Ok(data) => staged.push((
                node.name.clone(),
                data,
                mesh.indices.clone(),
                world,
                material.color.to_vec3().extend(material.opacity).to_array(),
            )),
            Err(err) => failure = Some(err),
        }
    });
    if let Some(err) = failure {
        return Err(err);
    }

    let mut entity = GpuEntity::default();
    for (name, data, indices, model, color) in staged {
        let vertex_buffer = init_buffer(
            device,
            &name,
            "vertices",
            bytemuck::cast_slice(&data),
            wgpu::BufferUsages::VERTEX,
        );
        let index_buffer = init_buffer(
            device,
            &name,
            "indices",
            bytemuck::cast_slice(&indices),
            wgpu::BufferUsages::INDEX,
        );
        entity.meshes.push(GpuMesh {
            name,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            model,
            color,
        });
    }
    log::debug!("uploaded {} meshes", entity.meshes.len());
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_vertex_layout_size() {
        assert_eq!(std::mem::size_of::<GpuVertex>(), 24);
        assert_eq!(GpuVertex::layout().array_stride, 24);
    }

    #[test]
    fn test_vertices_interleave() {
        let mesh = MeshData::cuboid(Vec3::ONE);
        let data = vertices("box", &mesh).unwrap();
        assert_eq!(data.len(), mesh.vertex_count());
        assert_eq!(data[0].position, mesh.positions[0].to_array());
        assert_eq!(data[0].normal, mesh.normals[0].to_array());
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut mesh = MeshData::cuboid(Vec3::ONE);
        mesh.positions[3] = Vec3::splat(f32::NAN);
        let err = vertices("broken", &mesh).unwrap_err();
        assert!(matches!(err, EffigyError::GpuUpload(msg) if msg.contains("broken")));
    }
}
