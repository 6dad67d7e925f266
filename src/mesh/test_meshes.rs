//! Simple meshes used in tests and in the demo binary
use super::{CellType, MixedMesh3d, Tetrahedron};
use crate::{Tag, Vert3d};
use rustc_hash::{FxBuildHasher, FxHashMap};

/// Split of the hexahedron `0..8` into 6 tetrahedra around the diagonal `(0, 6)`
const HEX2TETS: [[usize; 4]; 6] = [
    [0, 1, 2, 6],
    [0, 2, 3, 6],
    [0, 3, 7, 6],
    [0, 7, 4, 6],
    [0, 4, 5, 6],
    [0, 5, 1, 6],
];

/// Faces of a tetrahedron, oriented outwards
const TETRA2FACES: [[usize; 3]; 4] = [[1, 2, 3], [2, 0, 3], [0, 1, 3], [0, 2, 1]];

/// Mesh with a single tetrahedron
#[must_use]
pub fn test_mesh_3d_single_tet() -> MixedMesh3d {
    let coords = [
        Vert3d::new(0., 0., 0.),
        Vert3d::new(1., 0., 0.),
        Vert3d::new(0., 1., 0.),
        Vert3d::new(0., 0., 1.),
    ];
    let elems = [Tetrahedron::new(0, 1, 2, 3)];
    let etags = [1];

    MixedMesh3d::from_tetrahedra(&coords, &elems, &etags).unwrap()
}

/// Mesh with two tetrahedra sharing the face `(1, 2, 3)`, tagged differently.
/// Vertex 5 is not used by any cell.
#[must_use]
pub fn test_mesh_3d_two_tets() -> MixedMesh3d {
    let coords = [
        Vert3d::new(0., 0., 0.),
        Vert3d::new(1., 0., 0.),
        Vert3d::new(0., 1., 0.),
        Vert3d::new(0., 0., 1.),
        Vert3d::new(1., 1., 1.),
        Vert3d::new(5., 5., 5.),
    ];
    let elems = [Tetrahedron::new(0, 1, 2, 3), Tetrahedron::new(4, 1, 3, 2)];
    let etags = [1, 2];

    MixedMesh3d::from_tetrahedra(&coords, &elems, &etags).unwrap()
}

/// Create a tetrahedron mesh of a `lx` by `ly` by `lz` box by splitting a `nx`
/// by `ny` by `nz` uniform structured grid
#[must_use]
pub fn box_mesh(lx: f64, nx: usize, ly: f64, ny: usize, lz: f64, nz: usize) -> MixedMesh3d {
    let dx = lx / (nx as f64 - 1.);
    let x_1d = (0..nx).map(|i| i as f64 * dx).collect::<Vec<_>>();

    let dy = ly / (ny as f64 - 1.);
    let y_1d = (0..ny).map(|i| i as f64 * dy).collect::<Vec<_>>();

    let dz = lz / (nz as f64 - 1.);
    let z_1d = (0..nz).map(|i| i as f64 * dz).collect::<Vec<_>>();

    nonuniform_box_mesh(&x_1d, &y_1d, &z_1d)
}

/// Create a tetrahedron mesh of a box by splitting a structured grid; every
/// hexahedron of the grid is split into 6 tetrahedra, tagged 1
#[must_use]
pub fn nonuniform_box_mesh(x: &[f64], y: &[f64], z: &[f64]) -> MixedMesh3d {
    let nx = x.len();
    let ny = y.len();
    let nz = z.len();

    let idx = |i, j, k| i + j * nx + k * nx * ny;

    let mut verts = vec![Vert3d::zeros(); nx * ny * nz];
    for (i, &x) in x.iter().enumerate() {
        for (j, &y) in y.iter().enumerate() {
            for (k, &z) in z.iter().enumerate() {
                verts[idx(i, j, k)] = Vert3d::new(x, y, z);
            }
        }
    }

    let mut tets = Vec::with_capacity(6 * (nx - 1) * (ny - 1) * (nz - 1));
    for i in 0..nx - 1 {
        for j in 0..ny - 1 {
            for k in 0..nz - 1 {
                let hex = [
                    idx(i, j, k),
                    idx(i + 1, j, k),
                    idx(i + 1, j + 1, k),
                    idx(i, j + 1, k),
                    idx(i, j, k + 1),
                    idx(i + 1, j, k + 1),
                    idx(i + 1, j + 1, k + 1),
                    idx(i, j + 1, k + 1),
                ];
                tets.extend(HEX2TETS.iter().map(|t| Tetrahedron(t.map(|l| hex[l]))));
            }
        }
    }
    let etags = vec![1; tets.len()];

    MixedMesh3d::from_tetrahedra(&verts, &tets, &etags).unwrap()
}

/// Boundary faces of the tetrahedra of `mesh`, oriented outwards
#[must_use]
pub fn boundary_triangles(mesh: &MixedMesh3d) -> Vec<[usize; 3]> {
    let mut faces: FxHashMap<[usize; 3], ([usize; 3], usize)> = FxHashMap::with_hasher(FxBuildHasher);
    for i in mesh.tetrahedra() {
        let e = mesh.tetrahedron(i);
        for f in TETRA2FACES {
            let f = f.map(|j| e[j]);
            let mut key = f;
            key.sort_unstable();
            faces.entry(key).or_insert((f, 0)).1 += 1;
        }
    }
    let mut res = faces
        .into_values()
        .filter(|&(_, n)| n == 1)
        .map(|(f, _)| f)
        .collect::<Vec<_>>();
    res.sort_unstable();
    res
}

/// Box mesh with the boundary triangles, a vertex cell and an edge cell added
/// after the tetrahedra, as found in volume meshes that also store their
/// boundary
#[must_use]
pub fn test_mesh_3d_mixed() -> MixedMesh3d {
    let mut res = box_mesh(1.0, 3, 1.0, 3, 1.0, 3);
    let tag: Tag = 2;
    for f in boundary_triangles(&res) {
        res.add_cell(CellType::Triangle, &f, tag).unwrap();
    }
    res.add_cell(CellType::Vertex, &[0], 3).unwrap();
    res.add_cell(CellType::Edge, &[0, 1], 4).unwrap();
    res
}
