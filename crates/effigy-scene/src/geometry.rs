//! Procedural geometry.
//!
//! Generators produce indexed triangle lists ([`MeshData`]); a [`Geometry`]
//! wraps one together with the parameters it was built from and a ledger
//! ticket from its [`ResourceContext`].

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::options::MeshOptions;
use crate::resources::{ResourceContext, ResourceKind, Ticket};

/// Indexed triangle mesh with per-vertex normals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterates triangles as corner positions.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.positions[t[0] as usize],
                self.positions[t[1] as usize],
                self.positions[t[2] as usize],
            ]
        })
    }

    /// Axis-aligned bounds, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(min, max), &p| (min.min(p), max.max(p))),
        )
    }

    /// Appends `other`, re-basing its indices.
    pub fn append(&mut self, other: &MeshData) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    fn push(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        index
    }

    /// A UV ellipsoid centered at the origin.
    pub fn ellipsoid(radii: Vec3, segments: u32, rings: u32) -> Self {
        let mut mesh = Self::default();
        let inv_sq = Vec3::ONE / (radii * radii).max(Vec3::splat(f32::EPSILON));
        for ring in 0..=rings {
            let theta = PI * ring as f32 / rings as f32;
            for seg in 0..=segments {
                let phi = TAU * seg as f32 / segments as f32;
                let unit = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
                let p = unit * radii;
                mesh.push(p, (p * inv_sq).normalize_or(unit));
            }
        }
        let stride = segments + 1;
        for ring in 0..rings {
            for seg in 0..segments {
                let a = ring * stride + seg;
                let b = a + stride;
                mesh.indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
            }
        }
        mesh
    }

    /// An axis-aligned box centered at the origin.
    pub fn cuboid(size: Vec3) -> Self {
        let h = size * 0.5;
        let mut mesh = Self::default();
        // (normal, tangent u, tangent v) with u x v = normal
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        for (n, u, v) in faces {
            let center = n * h;
            let (eu, ev) = (u * h, v * h);
            let a = mesh.push(center - eu - ev, n);
            let b = mesh.push(center + eu - ev, n);
            let c = mesh.push(center + eu + ev, n);
            let d = mesh.push(center - eu + ev, n);
            mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
        mesh
    }

    /// A cone with its base disc at `y = 0` and apex at `y = height`.
    pub fn cone(radius: f32, height: f32, segments: u32) -> Self {
        let mut mesh = Self::default();
        let apex = Vec3::new(0.0, height, 0.0);
        let slope = radius / height.max(f32::EPSILON);
        for seg in 0..segments {
            let a0 = TAU * seg as f32 / segments as f32;
            let a1 = TAU * (seg + 1) as f32 / segments as f32;
            let p0 = Vec3::new(a0.cos(), 0.0, a0.sin()) * radius;
            let p1 = Vec3::new(a1.cos(), 0.0, a1.sin()) * radius;
            let mid = (a0 + a1) * 0.5;
            let n = Vec3::new(mid.cos(), slope, mid.sin()).normalize();
            let i0 = mesh.push(p0, n);
            let i1 = mesh.push(p1, n);
            let ia = mesh.push(apex, n);
            mesh.indices.extend_from_slice(&[i0, ia, i1]);

            let c = mesh.push(Vec3::ZERO, Vec3::NEG_Y);
            let b0 = mesh.push(p0, Vec3::NEG_Y);
            let b1 = mesh.push(p1, Vec3::NEG_Y);
            mesh.indices.extend_from_slice(&[c, b0, b1]);
        }
        mesh
    }

    /// A capless cylinder between two points. Degenerate input yields an
    /// empty mesh.
    pub fn tube(from: Vec3, to: Vec3, radius: f32, segments: u32) -> Self {
        let mut mesh = Self::default();
        let axis = to - from;
        let Some(dir) = axis.try_normalize() else {
            return mesh;
        };
        let (u, v) = dir.any_orthonormal_pair();
        for seg in 0..=segments {
            let angle = TAU * seg as f32 / segments as f32;
            let n = u * angle.cos() + v * angle.sin();
            mesh.push(from + n * radius, n);
            mesh.push(to + n * radius, n);
        }
        for seg in 0..segments {
            let a = seg * 2;
            mesh.indices.extend_from_slice(&[a, a + 2, a + 1, a + 1, a + 2, a + 3]);
        }
        mesh
    }

    /// Tubes along consecutive points of a polyline.
    pub fn tube_path(points: &[Vec3], radius: f32, segments: u32) -> Self {
        let mut mesh = Self::default();
        for pair in points.windows(2) {
            mesh.append(&Self::tube(pair[0], pair[1], radius, segments));
        }
        mesh
    }

    /// A double-sided rectangle in the XY plane, centered at the origin.
    pub fn quad(width: f32, height: f32) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let corners = [
            Vec3::new(-hw, -hh, 0.0),
            Vec3::new(hw, -hh, 0.0),
            Vec3::new(hw, hh, 0.0),
            Vec3::new(-hw, hh, 0.0),
        ];
        let mut mesh = Self::default();
        for normal in [Vec3::Z, Vec3::NEG_Z] {
            let base = mesh.positions.len() as u32;
            for corner in corners {
                mesh.push(corner, normal);
            }
            if normal.z > 0.0 {
                mesh.indices
                    .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            } else {
                mesh.indices
                    .extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
            }
        }
        mesh
    }

    /// A disc in the XZ plane facing `+Y`.
    pub fn disc(radius: f32, segments: u32) -> Self {
        let mut mesh = Self::default();
        let center = mesh.push(Vec3::ZERO, Vec3::Y);
        for seg in 0..segments {
            let angle = TAU * seg as f32 / segments as f32;
            mesh.push(Vec3::new(angle.cos(), 0.0, angle.sin()) * radius, Vec3::Y);
        }
        for seg in 0..segments {
            let a = 1 + seg;
            let b = 1 + (seg + 1) % segments;
            mesh.indices.extend_from_slice(&[center, b, a]);
        }
        mesh
    }

    /// A polygon in the XY plane extruded symmetrically along Z. Caps are
    /// fanned from the centroid, so star-shaped outlines triangulate cleanly.
    pub fn prism(outline: &[Vec2], depth: f32) -> Self {
        let mut mesh = Self::default();
        if outline.len() < 3 {
            return mesh;
        }
        let half = depth * 0.5;
        let centroid = outline.iter().copied().sum::<Vec2>() / outline.len() as f32;
        let n = outline.len();

        for (z, normal) in [(half, Vec3::Z), (-half, Vec3::NEG_Z)] {
            let c = mesh.push(centroid.extend(z), normal);
            let first = mesh.positions.len() as u32;
            for p in outline {
                mesh.push(p.extend(z), normal);
            }
            for i in 0..n as u32 {
                let a = first + i;
                let b = first + (i + 1) % n as u32;
                if normal.z > 0.0 {
                    mesh.indices.extend_from_slice(&[c, a, b]);
                } else {
                    mesh.indices.extend_from_slice(&[c, b, a]);
                }
            }
        }

        for i in 0..n {
            let p0 = outline[i];
            let p1 = outline[(i + 1) % n];
            let edge = p1 - p0;
            let normal = Vec3::new(edge.y, -edge.x, 0.0).normalize_or_zero();
            let a = mesh.push(p0.extend(half), normal);
            let b = mesh.push(p1.extend(half), normal);
            let c = mesh.push(p1.extend(-half), normal);
            let d = mesh.push(p0.extend(-half), normal);
            mesh.indices.extend_from_slice(&[a, d, c, a, c, b]);
        }
        mesh
    }
}

/// The primitive a [`Geometry`] was generated from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryKind {
    Ellipsoid { radii: Vec3 },
    Cuboid { size: Vec3 },
    Cone { radius: f32, height: f32 },
    Tube { radius: f32, length: f32 },
    Quad { width: f32, height: f32 },
    Disc { radius: f32 },
    Prism { depth: f32 },
}

impl GeometryKind {
    /// Radius of a sphere, or the largest radius of an ellipsoid.
    pub fn radius(&self) -> Option<f32> {
        match self {
            Self::Ellipsoid { radii } => Some(radii.max_element()),
            Self::Cone { radius, .. } | Self::Tube { radius, .. } | Self::Disc { radius } => {
                Some(*radius)
            }
            _ => None,
        }
    }
}

/// Tessellated geometry owned by a scene node.
#[derive(Debug)]
pub struct Geometry {
    kind: GeometryKind,
    mesh: MeshData,
    _ticket: Ticket,
}

impl Geometry {
    fn new(ctx: &ResourceContext, kind: GeometryKind, mesh: MeshData) -> Self {
        Self {
            kind,
            mesh,
            _ticket: ctx.acquire(ResourceKind::Geometry),
        }
    }

    pub fn sphere(ctx: &ResourceContext, radius: f32, options: &MeshOptions) -> Self {
        Self::ellipsoid(ctx, Vec3::splat(radius), options)
    }

    pub fn ellipsoid(ctx: &ResourceContext, radii: Vec3, options: &MeshOptions) -> Self {
        let options = options.clamped();
        let mesh = MeshData::ellipsoid(radii, options.sphere_segments, options.sphere_rings);
        Self::new(ctx, GeometryKind::Ellipsoid { radii }, mesh)
    }

    pub fn cuboid(ctx: &ResourceContext, size: Vec3) -> Self {
        Self::new(ctx, GeometryKind::Cuboid { size }, MeshData::cuboid(size))
    }

    pub fn cone(ctx: &ResourceContext, radius: f32, height: f32, options: &MeshOptions) -> Self {
        let mesh = MeshData::cone(radius, height, options.clamped().radial_segments);
        Self::new(ctx, GeometryKind::Cone { radius, height }, mesh)
    }

    /// A tube along a polyline.
    pub fn tube(
        ctx: &ResourceContext,
        points: &[Vec3],
        radius: f32,
        options: &MeshOptions,
    ) -> Self {
        let length = points.windows(2).map(|w| w[0].distance(w[1])).sum();
        let mesh = MeshData::tube_path(points, radius, options.clamped().radial_segments);
        Self::new(ctx, GeometryKind::Tube { radius, length }, mesh)
    }

    pub fn quad(ctx: &ResourceContext, width: f32, height: f32) -> Self {
        Self::new(
            ctx,
            GeometryKind::Quad { width, height },
            MeshData::quad(width, height),
        )
    }

    pub fn disc(ctx: &ResourceContext, radius: f32, options: &MeshOptions) -> Self {
        let mesh = MeshData::disc(radius, options.clamped().radial_segments);
        Self::new(ctx, GeometryKind::Disc { radius }, mesh)
    }

    pub fn prism(ctx: &ResourceContext, outline: &[Vec2], depth: f32) -> Self {
        Self::new(ctx, GeometryKind::Prism { depth }, MeshData::prism(outline, depth))
    }

    pub fn kind(&self) -> &GeometryKind {
        &self.kind
    }

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }
}
