//! Procedural torus tessellation.
//!
//! A torus is a small circle (the tube) swept around a larger circle (the
//! ring). [`TorusMesh`] walks a `(radial_segments + 1) × (tube_segments + 1)`
//! grid over the two angles and produces positions, normals, UVs and a
//! triangle list that closes both loops.
//!
//! ```
//! use shade::{TorusMesh, TorusParams};
//!
//! let torus = TorusMesh::new(TorusParams::default());
//! assert_eq!(torus.vertex_count(), 475);
//! assert_eq!(torus.index_count(), 2592);
//! ```
//!
//! # Grid Layout
//!
//! Vertex `(i, j)` lives at index `j + i × (tube_segments + 1)`, where `i` is
//! the radial step and `j` the tube step. The last step of each loop repeats
//! the first one's position and normal so the texture seam gets its own
//! column and row of vertices with UV 1.0.

use std::f32::consts::TAU;

use glam::{Quat, Vec2, Vec3};

use crate::error::{Error, Result};
use crate::mesh::Vertex3d;

/// Dimensions and subdivision counts of a torus.
///
/// The default is a ring of radius 1.0 with a tube of radius 0.3, split into
/// 24 radial segments and 18 tube segments.
///
/// ```
/// use shade::TorusParams;
///
/// let params = TorusParams::new()
///     .radii(2.0, 0.5)
///     .segments(48, 24);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TorusParams {
    /// Distance from the torus centre to the centre of the tube.
    pub major_radius: f32,
    /// Radius of the tube cross-section.
    pub minor_radius: f32,
    /// Number of steps around the large ring.
    pub radial_segments: u32,
    /// Number of steps around the tube cross-section.
    pub tube_segments: u32,
}

impl Default for TorusParams {
    fn default() -> Self {
        Self {
            major_radius: 1.0,
            minor_radius: 0.3,
            radial_segments: 24,
            tube_segments: 18,
        }
    }
}

impl TorusParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ring (major) and tube (minor) radii.
    pub fn radii(mut self, major: f32, minor: f32) -> Self {
        self.major_radius = major;
        self.minor_radius = minor;
        self
    }

    /// Set the radial and tube subdivision counts.
    pub fn segments(mut self, radial: u32, tube: u32) -> Self {
        self.radial_segments = radial;
        self.tube_segments = tube;
        self
    }

    /// Check that these parameters describe a closed, non-degenerate torus.
    ///
    /// Both loops need at least three segments, the grid's vertex and index
    /// counts must fit in `u32`, and both radii must be positive and finite.
    pub fn validate(&self) -> Result<()> {
        if self.radial_segments < 3 || self.tube_segments < 3 {
            return Err(Error::InvalidTorus(format!(
                "need at least 3 segments per loop, got {}x{}",
                self.radial_segments, self.tube_segments
            )));
        }
        // Vertex and index counts, and the indices themselves, are u32.
        let vertices = self
            .radial_segments
            .checked_add(1)
            .zip(self.tube_segments.checked_add(1))
            .and_then(|(r, t)| r.checked_mul(t));
        let indices = self
            .radial_segments
            .checked_mul(self.tube_segments)
            .and_then(|quads| quads.checked_mul(6));
        if vertices.is_none() || indices.is_none() {
            return Err(Error::InvalidTorus(format!(
                "{}x{} segments overflow a 32-bit index buffer",
                self.radial_segments, self.tube_segments
            )));
        }
        for (name, radius) in [
            ("major", self.major_radius),
            ("minor", self.minor_radius),
        ] {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(Error::InvalidTorus(format!(
                    "{name} radius must be positive, got {radius}"
                )));
            }
        }
        Ok(())
    }
}

/// CPU-side torus geometry.
///
/// Positions, normals and UVs are parallel sequences indexed by the same
/// vertex index; `indices` is a triangle list into them. The mesh is
/// immutable once built. Use [`TorusMesh::vertices`] to interleave it into
/// the GPU vertex format.
#[derive(Clone, Debug)]
pub struct TorusMesh {
    params: TorusParams,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
}

impl Default for TorusMesh {
    fn default() -> Self {
        Self::new(TorusParams::default())
    }
}

impl TorusMesh {
    /// Tessellate a torus from parameters already known to be valid.
    ///
    /// Use [`TorusMesh::try_new`] for parameters that come from outside.
    pub fn new(params: TorusParams) -> Self {
        let radial = params.radial_segments;
        let tube = params.tube_segments;
        let vertex_count = ((radial + 1) * (tube + 1)) as usize;

        let mut positions = Vec::with_capacity(vertex_count);
        let mut normals = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);

        for i in 0..=radial {
            let center = ring_center(&params, i);
            let ring_rotation = Quat::from_rotation_y(-ring_angle(&params, i));

            for j in 0..=tube {
                // Last tube step reuses step 0 so the loop closes exactly.
                let side = if j == tube { 0 } else { j };
                let theta = side as f32 / tube as f32 * TAU;
                let offset = Vec3::new(
                    theta.sin() * params.minor_radius,
                    theta.cos() * params.minor_radius,
                    0.0,
                );

                let position = center + ring_rotation * offset;
                positions.push(position);
                normals.push((position - center).normalize());
                uvs.push(Vec2::new(
                    i as f32 / radial as f32,
                    j as f32 / tube as f32,
                ));
            }
        }

        let mut indices = Vec::with_capacity((radial * tube * 6) as usize);
        for i in 0..radial {
            for j in 0..tube {
                let current = j + i * (tube + 1);
                let next = j + (i + 1) * (tube + 1);

                indices.push(current);
                indices.push(next);
                indices.push(next + 1);

                indices.push(current);
                indices.push(next + 1);
                indices.push(current + 1);
            }
        }

        tracing::debug!(
            vertices = positions.len(),
            indices = indices.len(),
            radial,
            tube,
            "tessellated torus"
        );

        Self {
            params,
            positions,
            normals,
            uvs,
            indices,
        }
    }

    /// Validate `params`, then tessellate.
    pub fn try_new(params: TorusParams) -> Result<Self> {
        params.validate()?;
        Ok(Self::new(params))
    }

    pub fn params(&self) -> &TorusParams {
        &self.params
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Unit surface normals, pointing away from the tube's own axis.
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Triangle list indices, counter-clockwise when seen from outside.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Index of grid vertex `(radial_step, tube_step)`.
    pub fn vertex_index(&self, radial_step: u32, tube_step: u32) -> usize {
        (tube_step + radial_step * (self.params.tube_segments + 1)) as usize
    }

    /// Centre of the tube cross-section at the given radial step.
    pub fn ring_center(&self, radial_step: u32) -> Vec3 {
        ring_center(&self.params, radial_step)
    }

    /// Interleave the parallel sequences into GPU vertices.
    pub fn vertices(&self) -> Vec<Vertex3d> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((position, normal), uv)| {
                Vertex3d::new(position.to_array(), normal.to_array(), uv.to_array())
            })
            .collect()
    }

    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.positions.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        )
    }
}

/// Angle around the ring for a radial step; the final step aliases to 0.
fn ring_angle(params: &TorusParams, radial_step: u32) -> f32 {
    let seg = if radial_step == params.radial_segments {
        0
    } else {
        radial_step
    };
    seg as f32 / params.radial_segments as f32 * TAU
}

fn ring_center(params: &TorusParams, radial_step: u32) -> Vec3 {
    let angle = ring_angle(params, radial_step);
    Vec3::new(
        angle.cos() * params.major_radius,
        0.0,
        angle.sin() * params.major_radius,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn default_counts() {
        let torus = TorusMesh::default();
        assert_eq!(torus.vertex_count(), 25 * 19);
        assert_eq!(torus.vertex_count(), 475);
        assert_eq!(torus.index_count(), 24 * 18 * 6);
        assert_eq!(torus.index_count(), 2592);
        assert_eq!(torus.triangle_count(), 864);
        assert_eq!(torus.normals().len(), torus.vertex_count());
        assert_eq!(torus.uvs().len(), torus.vertex_count());
    }

    #[test]
    fn normals_are_unit_length() {
        let torus = TorusMesh::default();
        for n in torus.normals() {
            assert!((n.length() - 1.0).abs() < EPS, "normal {n} not unit");
        }
    }

    #[test]
    fn vertices_sit_on_the_tube() {
        let torus = TorusMesh::default();
        let p = *torus.params();
        for i in 0..=p.radial_segments {
            let center = torus.ring_center(i);
            for j in 0..=p.tube_segments {
                let v = torus.positions()[torus.vertex_index(i, j)];
                assert!(
                    (v.distance(center) - 0.3).abs() < EPS,
                    "vertex ({i}, {j}) is {} from its ring centre",
                    v.distance(center)
                );
            }
        }
    }

    #[test]
    fn normals_point_away_from_tube_axis() {
        let torus = TorusMesh::default();
        let p = *torus.params();
        for i in 0..=p.radial_segments {
            let center = torus.ring_center(i);
            for j in 0..=p.tube_segments {
                let idx = torus.vertex_index(i, j);
                let expected = (torus.positions()[idx] - center) / p.minor_radius;
                assert!(torus.normals()[idx].abs_diff_eq(expected, 1e-4));
            }
        }
    }

    #[test]
    fn uv_corners_span_unit_square() {
        let torus = TorusMesh::default();
        let uvs = torus.uvs();
        assert_eq!(uvs[torus.vertex_index(0, 0)], Vec2::new(0.0, 0.0));
        assert_eq!(uvs[torus.vertex_index(0, 18)], Vec2::new(0.0, 1.0));
        assert_eq!(uvs[torus.vertex_index(24, 0)], Vec2::new(1.0, 0.0));
        assert_eq!(uvs[torus.vertex_index(24, 18)], Vec2::new(1.0, 1.0));
        for uv in uvs {
            assert!((0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y));
        }
    }

    #[test]
    fn seams_are_closed() {
        let torus = TorusMesh::default();
        let pos = torus.positions();
        let nrm = torus.normals();
        for j in 0..=18 {
            let (first, last) = (torus.vertex_index(0, j), torus.vertex_index(24, j));
            assert_eq!(pos[first], pos[last]);
            assert_eq!(nrm[first], nrm[last]);
        }
        for i in 0..=24 {
            let (first, last) = (torus.vertex_index(i, 0), torus.vertex_index(i, 18));
            assert_eq!(pos[first], pos[last]);
            assert_eq!(nrm[first], nrm[last]);
        }
    }

    #[test]
    fn indices_in_range() {
        let torus = TorusMesh::default();
        let count = torus.vertex_count() as u32;
        assert!(torus.indices().iter().all(|&i| i < count));
        // Every grid vertex except the far seam corner is referenced.
        let max = *torus.indices().iter().max().unwrap();
        assert_eq!(max as usize, torus.vertex_index(24, 18));
    }

    #[test]
    fn triangles_face_outward() {
        let torus = TorusMesh::default();
        let pos = torus.positions();
        let nrm = torus.normals();
        for tri in torus.indices().chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let face = (pos[b] - pos[a]).cross(pos[c] - pos[a]);
            let avg = nrm[a] + nrm[b] + nrm[c];
            assert!(face.dot(avg) > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn bounds_cover_ring_and_tube() {
        let torus = TorusMesh::default();
        let (min, max) = torus.bounds();
        assert!((max.y - 0.3).abs() < EPS);
        assert!((min.y + 0.3).abs() < EPS);
        assert!(max.x <= 1.3 + EPS && min.x >= -1.3 - EPS);
        assert!(max.z <= 1.3 + EPS && min.z >= -1.3 - EPS);
        assert!(max.x > 1.29);
    }

    #[test]
    fn custom_params_scale_counts() {
        let torus = TorusMesh::try_new(TorusParams::new().segments(8, 4)).unwrap();
        assert_eq!(torus.vertex_count(), 9 * 5);
        assert_eq!(torus.index_count(), 8 * 4 * 6);
    }

    #[test]
    fn rejects_degenerate_params() {
        assert!(matches!(
            TorusMesh::try_new(TorusParams::new().segments(0, 18)),
            Err(Error::InvalidTorus(_))
        ));
        assert!(TorusParams::new().segments(24, 2).validate().is_err());
        assert!(TorusParams::new().radii(1.0, 0.0).validate().is_err());
        assert!(TorusParams::new().radii(f32::NAN, 0.3).validate().is_err());
    }

    #[test]
    fn rejects_segment_counts_overflowing_u32() {
        assert!(matches!(
            TorusMesh::try_new(TorusParams::new().segments(70_000, 70_000)),
            Err(Error::InvalidTorus(_))
        ));
        // 6·S·T overflows even though (S+1)(T+1) fits.
        assert!(TorusParams::new().segments(30_000, 30_000).validate().is_err());
        assert!(TorusParams::new().segments(u32::MAX, 3).validate().is_err());
        // Large, but the index buffer still fits.
        assert!(TorusParams::new().segments(26_000, 26_000).validate().is_ok());
    }

    #[test]
    fn interleaved_vertices_match_sequences() {
        let torus = TorusMesh::default();
        let vertices = torus.vertices();
        assert_eq!(vertices.len(), torus.vertex_count());
        let k = torus.vertex_index(5, 7);
        assert_eq!(vertices[k].position, torus.positions()[k].to_array());
        assert_eq!(vertices[k].normal, torus.normals()[k].to_array());
        assert_eq!(vertices[k].uv, torus.uvs()[k].to_array());
    }
}
