//! Procedural torus-knot geometry for the fallback renderable

use glam::Vec3;
use std::f32::consts::TAU;

/// Indexed triangle list with per-vertex normals and UVs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A tube swept along a (p, q) torus knot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusKnot {
    pub radius: f32,
    pub tube: f32,
    pub tubular_segments: u32,
    pub radial_segments: u32,
    /// Windings around the axis of rotational symmetry
    pub p: u32,
    /// Windings around the interior circle
    pub q: u32,
}

impl Default for TorusKnot {
    fn default() -> Self {
        Self {
            radius: 1.0,
            tube: 0.3,
            tubular_segments: 100,
            radial_segments: 16,
            p: 2,
            q: 3,
        }
    }
}

impl TorusKnot {
    /// Point on the knot curve at parameter `u`
    fn curve_point(&self, u: f32) -> Vec3 {
        let p = self.p.max(1) as f32;
        let q = self.q as f32;
        let qu_over_p = q / p * u;
        let cs = qu_over_p.cos();
        Vec3::new(
            self.radius * (2.0 + cs) * 0.5 * u.cos(),
            self.radius * (2.0 + cs) * 0.5 * u.sin(),
            self.radius * qu_over_p.sin() * 0.5,
        )
    }

    pub fn build(&self) -> MeshData {
        let tubular = self.tubular_segments.max(3);
        let radial = self.radial_segments.max(3);
        let rings = (tubular + 1) as usize;
        let ring_len = (radial + 1) as usize;

        let mut mesh = MeshData {
            positions: Vec::with_capacity(rings * ring_len),
            normals: Vec::with_capacity(rings * ring_len),
            uvs: Vec::with_capacity(rings * ring_len),
            indices: Vec::with_capacity((tubular * radial * 6) as usize),
        };

        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * self.p.max(1) as f32 * TAU;
            let p1 = self.curve_point(u);
            let p2 = self.curve_point(u + 0.01);

            // Frenet-style frame along the curve
            let tangent = p2 - p1;
            let mut normal = p2 + p1;
            let binormal = tangent.cross(normal).normalize_or_zero();
            normal = binormal.cross(tangent).normalize_or_zero();

            for j in 0..=radial {
                let v = j as f32 / radial as f32 * TAU;
                let cx = -self.tube * v.cos();
                let cy = self.tube * v.sin();
                let vertex = p1 + normal * cx + binormal * cy;

                mesh.positions.push(vertex.to_array());
                mesh.normals.push((vertex - p1).normalize_or_zero().to_array());
                mesh.uvs.push([i as f32 / tubular as f32, j as f32 / radial as f32]);
            }
        }

        let stride = radial + 1;
        for j in 1..=tubular {
            for i in 1..=radial {
                let a = stride * (j - 1) + (i - 1);
                let b = stride * j + (i - 1);
                let c = stride * j + i;
                let d = stride * (j - 1) + i;
                mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_knot_counts() {
        let mesh = TorusKnot::default().build();
        assert_eq!(mesh.vertex_count(), 101 * 17);
        assert_eq!(mesh.normals.len(), mesh.vertex_count());
        assert_eq!(mesh.uvs.len(), mesh.vertex_count());
        assert_eq!(mesh.triangle_count(), 100 * 16 * 2);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_normals_are_unit_and_tube_radius_holds() {
        let knot = TorusKnot::default();
        let mesh = knot.build();
        for normal in &mesh.normals {
            let n = Vec3::from_array(*normal);
            assert!((n.length() - 1.0).abs() < 1e-3);
        }
        // Every ring vertex sits one tube radius from the curve point
        let centre = knot.curve_point(0.0);
        for position in &mesh.positions[..17] {
            let distance = Vec3::from_array(*position).distance(centre);
            assert!((distance - knot.tube).abs() < 1e-4);
        }
    }

    #[test]
    fn test_knot_fits_expected_bounds() {
        let mesh = TorusKnot::default().build();
        let extent = mesh
            .positions
            .iter()
            .map(|p| Vec3::from_array(*p).length())
            .fold(0.0f32, f32::max);
        // Curve reaches radius * 1.5 from the origin, plus the tube
        assert!(extent <= 1.5 + 0.3 + 1e-3);
        assert!(extent > 1.0);
    }
}
