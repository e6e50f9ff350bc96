//! Icosphere geometry shared by every layer of the celestial body.

use glam::Vec3;
use globe_config::MAX_GLOBE_DETAIL;

/// Golden ratio, used for the base icosahedron vertices.
const PHI: f32 = 1.618_034;

const ICOSAHEDRON_VERTICES: [[f32; 3]; 12] = [
    [-1.0, PHI, 0.0],
    [1.0, PHI, 0.0],
    [-1.0, -PHI, 0.0],
    [1.0, -PHI, 0.0],
    [0.0, -1.0, PHI],
    [0.0, 1.0, PHI],
    [0.0, -1.0, -PHI],
    [0.0, 1.0, -PHI],
    [PHI, 0.0, -1.0],
    [PHI, 0.0, 1.0],
    [-PHI, 0.0, -1.0],
    [-PHI, 0.0, 1.0],
];

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Triangle mesh on a sphere of a given radius.
///
/// Vertices are not shared between triangles so that triangles straddling
/// the texture seam can carry their own wrapped UVs. Indices are sequential.
#[derive(Debug, Clone)]
pub struct Geometry {
    /// Sphere radius the positions were projected to.
    pub radius: f32,
    /// Subdivision detail the geometry was built with.
    pub detail: u32,
    /// Vertex positions on the sphere.
    pub positions: Vec<Vec3>,
    /// Unit outward normals.
    pub normals: Vec<Vec3>,
    /// Equirectangular UVs, `v` growing downward. `u` may exceed 1.0 on
    /// seam triangles; sample with a repeating address mode.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Build an icosphere by splitting each icosahedron face into
    /// `(detail + 1)²` triangles and projecting every vertex onto the sphere.
    ///
    /// Detail 0 is the bare icosahedron (20 triangles); detail 12 yields
    /// 3380 triangles. Detail is capped at [`MAX_GLOBE_DETAIL`].
    pub fn icosahedron(radius: f32, detail: u32) -> Self {
        let detail = detail.min(MAX_GLOBE_DETAIL);
        let corners: Vec<Vec3> = ICOSAHEDRON_VERTICES
            .iter()
            .map(|v| Vec3::from_array(*v).normalize())
            .collect();

        let triangle_count = Self::triangle_count(detail).unwrap_or(0) as usize;
        let mut directions: Vec<Vec3> = Vec::with_capacity(triangle_count * 3);
        for face in &ICOSAHEDRON_FACES {
            subdivide_face(
                corners[face[0]],
                corners[face[1]],
                corners[face[2]],
                detail,
                &mut directions,
            );
        }

        let mut uvs: Vec<[f32; 2]> = directions.iter().map(|d| equirect_uv(*d)).collect();
        for (tri_dirs, tri_uvs) in directions.chunks(3).zip(uvs.chunks_mut(3)) {
            correct_pole_uvs(tri_dirs, tri_uvs);
            correct_seam_uvs(tri_uvs);
        }

        let normals = directions.clone();
        let positions = directions.iter().map(|d| *d * radius).collect();
        let indices = (0..directions.len() as u32).collect();

        Self {
            radius,
            detail,
            positions,
            normals,
            uvs,
            indices,
        }
    }

    /// Number of triangles an icosphere of the given detail has, or `None`
    /// if its index count would not fit in a `u32`.
    pub fn triangle_count(detail: u32) -> Option<u32> {
        let side = detail.checked_add(1)?;
        let triangles = side.checked_mul(side)?.checked_mul(20)?;
        triangles.checked_mul(3)?;
        Some(triangles)
    }

    /// Number of vertices in this geometry.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Split triangle `(a, b, c)` into a grid of `(detail + 1)²` triangles,
/// pushing three unit directions per triangle. Winding follows the input.
fn subdivide_face(a: Vec3, b: Vec3, c: Vec3, detail: u32, out: &mut Vec<Vec3>) {
    let cols = detail as usize + 1;
    let mut grid: Vec<Vec<Vec3>> = Vec::with_capacity(cols + 1);

    for i in 0..=cols {
        let t = i as f32 / cols as f32;
        let aj = a.lerp(c, t);
        let bj = b.lerp(c, t);
        let rows = cols - i;
        let row = (0..=rows)
            .map(|j| {
                if rows == 0 {
                    aj
                } else {
                    aj.lerp(bj, j as f32 / rows as f32)
                }
            })
            .collect();
        grid.push(row);
    }

    for i in 0..cols {
        for j in 0..(2 * (cols - i) - 1) {
            let k = j / 2;
            let tri = if j % 2 == 0 {
                [grid[i][k + 1], grid[i + 1][k], grid[i][k]]
            } else {
                [grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]
            };
            out.extend(tri.iter().map(|v| v.normalize()));
        }
    }
}

fn azimuth(dir: Vec3) -> f32 {
    dir.z.atan2(-dir.x)
}

fn equirect_uv(dir: Vec3) -> [f32; 2] {
    let u = azimuth(dir) / std::f32::consts::TAU + 0.5;
    let v = 0.5 - dir.y.clamp(-1.0, 1.0).asin() / std::f32::consts::PI;
    [u, v]
}

/// Vertices exactly on a pole have no azimuth; give them the azimuth of the
/// triangle's centroid so the texture doesn't pinch toward `u = 0.5`.
fn correct_pole_uvs(dirs: &[Vec3], uvs: &mut [[f32; 2]]) {
    let centroid = dirs.iter().copied().sum::<Vec3>() / dirs.len() as f32;
    let centroid_u = azimuth(centroid) / std::f32::consts::TAU + 0.5;
    for (dir, uv) in dirs.iter().zip(uvs.iter_mut()) {
        if dir.x.abs() < 1e-6 && dir.z.abs() < 1e-6 {
            uv[0] = centroid_u;
        }
    }
}

/// A triangle whose `u` spans almost the full range crosses the seam;
/// lift its low-`u` vertices past 1.0 so it interpolates the short way.
fn correct_seam_uvs(uvs: &mut [[f32; 2]]) {
    let (min_u, max_u) = uvs
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), uv| (lo.min(uv[0]), hi.max(uv[0])));
    if max_u - min_u > 0.9 {
        for uv in uvs.iter_mut() {
            if uv[0] < 0.2 {
                uv[0] += 1.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_zero_is_icosahedron() {
        let geometry = Geometry::icosahedron(1.0, 0);
        assert_eq!(geometry.indices.len() / 3, 20);
        assert_eq!(geometry.vertex_count(), 60);
    }

    #[test]
    fn test_triangle_count_grows_quadratically() {
        assert_eq!(Geometry::triangle_count(1), Some(80));
        assert_eq!(Geometry::triangle_count(12), Some(3380));
        let geometry = Geometry::icosahedron(1.0, 12);
        assert_eq!(geometry.indices.len() / 3, 3380);
    }

    #[test]
    fn test_triangle_count_overflow_is_none() {
        assert_eq!(Geometry::triangle_count(20_000), None);
        assert_eq!(Geometry::triangle_count(u32::MAX), None);
        assert!(Geometry::triangle_count(MAX_GLOBE_DETAIL).is_some());
    }

    #[test]
    fn test_vertices_on_sphere_of_radius() {
        let geometry = Geometry::icosahedron(2.5, 4);
        for pos in &geometry.positions {
            assert!(
                (pos.length() - 2.5).abs() < 1e-4,
                "vertex not on sphere: length = {}",
                pos.length()
            );
        }
    }

    #[test]
    fn test_normals_are_unit_and_outward() {
        let geometry = Geometry::icosahedron(3.0, 3);
        for (pos, normal) in geometry.positions.iter().zip(&geometry.normals) {
            assert!((normal.length() - 1.0).abs() < 1e-5);
            assert!((pos.normalize() - *normal).length() < 1e-5);
        }
    }

    #[test]
    fn test_indices_valid() {
        let geometry = Geometry::icosahedron(1.0, 5);
        let n = geometry.vertex_count() as u32;
        assert!(geometry.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn test_triangles_wind_outward() {
        let geometry = Geometry::icosahedron(1.0, 3);
        for tri in geometry.indices.chunks(3) {
            let a = geometry.positions[tri[0] as usize];
            let b = geometry.positions[tri[1] as usize];
            let c = geometry.positions[tri[2] as usize];
            let face_normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(
                face_normal.dot(centroid) > 0.0,
                "triangle winds inward at {centroid:?}"
            );
        }
    }

    #[test]
    fn test_uvs_in_range_after_seam_fix() {
        let geometry = Geometry::icosahedron(1.0, 6);
        for uv in &geometry.uvs {
            assert!((0.0..=1.2).contains(&uv[0]), "U out of range: {}", uv[0]);
            assert!((0.0..=1.0).contains(&uv[1]), "V out of range: {}", uv[1]);
        }
    }

    #[test]
    fn test_no_triangle_spans_whole_texture() {
        let geometry = Geometry::icosahedron(1.0, 6);
        for tri in geometry.uvs.chunks(3) {
            let min = tri.iter().map(|uv| uv[0]).fold(f32::MAX, f32::min);
            let max = tri.iter().map(|uv| uv[0]).fold(f32::MIN, f32::max);
            assert!(max - min < 0.9, "seam triangle not corrected: {tri:?}");
        }
    }

    #[test]
    fn test_north_pole_maps_to_top_row() {
        let uv = equirect_uv(Vec3::Y);
        assert!(uv[1].abs() < 1e-6);
        let uv = equirect_uv(Vec3::NEG_Y);
        assert!((uv[1] - 1.0).abs() < 1e-6);
    }
}
