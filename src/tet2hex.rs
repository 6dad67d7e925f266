//! Split of tetrahedra into 4 hexahedra
//!
//! For a tetrahedron with corners `0, 1, 2, 3` the following vertices are
//! created, and numbered locally after the corners:
//!
//! | local ids | vertices                                   |
//! |-----------|--------------------------------------------|
//! | 4 - 9     | edge midpoints `01, 02, 03, 12, 13, 23`    |
//! | 10 - 13   | face barycenters `012, 013, 023, 123`      |
//! | 14        | centroid                                   |
//!
//! Each hexahedron contains one corner: 3 of its faces lie on the faces of the
//! tetrahedron and the 3 others meet at the centroid. The hexahedron around
//! corner `i` is the set of points whose barycentric coordinate `i` is the
//! largest, so its volume is a quarter of the volume of the tetrahedron.
use crate::{
    Error, Result, Tag, Vert3d,
    mesh::{CellType, GTetrahedron, HexMesh3d, Hexahedron, MixedMesh3d, Tetrahedron},
    registry::{DEFAULT_PRECISION, PointRegistry, Quantization},
};
use log::{debug, info, warn};
use serde::Serialize;

/// Number of vertices created in a tetrahedron
pub const N_AUX_VERTS: usize = 11;

/// Hexahedra in a tetrahedron, using the local vertex ids described above.
/// The ordering is the one of [`Hexahedron`] and gives hexahedra with a
/// positive volume if the tetrahedron has a positive volume.
pub const TET2HEXS: [[usize; 8]; 4] = [
    [4, 1, 7, 10, 11, 8, 13, 14],
    [7, 2, 5, 10, 13, 9, 12, 14],
    [5, 0, 4, 10, 12, 6, 11, 14],
    [9, 3, 6, 12, 13, 8, 11, 14],
];

/// Conversion parameters
#[derive(Clone, Copy, Debug)]
pub struct Tet2HexParams {
    /// Number of decimal digits used to identify the new vertices (see
    /// [`Quantization`])
    pub precision: i32,
}

impl Default for Tet2HexParams {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

/// Conversion statistics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tet2HexStats {
    /// Number of vertices in the input mesh
    pub n_input_verts: usize,
    /// Number of cells (of all types) in the input mesh
    pub n_input_cells: usize,
    /// Number of tetrahedra split
    pub n_tets: usize,
    /// Number of tetrahedra with a negative volume
    pub n_inverted_tets: usize,
    /// Number of input cells that are not tetrahedra
    pub n_dropped_cells: usize,
    /// Number of vertices created
    pub n_new_verts: usize,
    /// Number of hexahedra created
    pub n_hexas: usize,
}

impl Tet2HexStats {
    /// Json representation
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Edge midpoints, face barycenters and centroid of a tetrahedron, in the
/// local order `4..15`
#[must_use]
pub fn tet_aux_verts(ge: &GTetrahedron) -> [Vert3d; N_AUX_VERTS] {
    let [p0, p1, p2, p3] = [ge[0], ge[1], ge[2], ge[3]];
    [
        (p0 + p1) / 2.0,
        (p0 + p2) / 2.0,
        (p0 + p3) / 2.0,
        (p1 + p2) / 2.0,
        (p1 + p3) / 2.0,
        (p2 + p3) / 2.0,
        (p0 + p1 + p2) / 3.0,
        (p0 + p1 + p3) / 3.0,
        (p0 + p2 + p3) / 3.0,
        (p1 + p2 + p3) / 3.0,
        (p0 + p1 + p2 + p3) / 4.0,
    ]
}

/// Split tetrahedron `e`, with vertices `ge`, into 4 hexahedra
///
/// The vertices of `e` must be given in the order of the input mesh, as the
/// hexahedra orientation depends on it. The new vertices are added to (or
/// found in) `registry`, so that the hexahedra created from neighboring
/// tetrahedra share their vertices.
pub fn split_tet(
    e: &Tetrahedron,
    ge: &GTetrahedron,
    registry: &mut PointRegistry,
) -> [Hexahedron; 4] {
    let mut ids = [0; 4 + N_AUX_VERTS];
    ids[..4].copy_from_slice(&e.0);
    for (i, v) in tet_aux_verts(ge).iter().enumerate() {
        ids[4 + i] = registry.insert_or_get(v);
    }
    TET2HEXS.map(|h| Hexahedron(h.map(|j| ids[j])))
}

/// Build the hexahedron mesh
///   - the original vertices are copied first, with the same ids
///   - the vertices of `registry` follow, in creation order
///   - then the hexahedra, with their tags
pub fn assemble<I1, I2>(verts: I1, registry: PointRegistry, elems_and_tags: I2) -> HexMesh3d
where
    I1: ExactSizeIterator<Item = Vert3d>,
    I2: ExactSizeIterator<Item = (Hexahedron, Tag)>,
{
    assert_eq!(verts.len(), registry.n_verts());
    let mut res = HexMesh3d::empty();
    res.add_verts(verts);
    res.add_verts(registry.into_verts().into_iter());
    res.add_elems_and_tags(elems_and_tags);
    res
}

/// Convert the tetrahedra of `mesh` into hexahedra
///
/// Each tetrahedron is split into 4 hexahedra that inherit its tag; the cells
/// of other types are not used and are not present in the output mesh. The
/// input mesh is not modified.
///
/// An error is returned, before any output is built, if the precision is not
/// valid or if the coordinates of a tetrahedron cannot be quantized.
pub fn tet2hex(mesh: &MixedMesh3d, params: &Tet2HexParams) -> Result<(HexMesh3d, Tet2HexStats)> {
    let quantization = Quantization::new(params.precision)?;

    info!("Input number of cells: {}", mesh.n_cells());

    let tets = mesh.tetrahedra().collect::<Vec<_>>();
    for &i in &tets {
        let e = mesh.tetrahedron(i);
        if let Some(j) = e.into_iter().find(|&j| !quantization.is_valid(&mesh.vert(j))) {
            return Err(Error::from(&format!(
                "Vertex {j} = {:?} cannot be quantized with precision {}: coordinates must be smaller than {:.3e}",
                mesh.vert(j),
                quantization.precision(),
                quantization.max_coord()
            )));
        }
    }

    let mut stats = Tet2HexStats {
        n_input_verts: mesh.n_verts(),
        n_input_cells: mesh.n_cells(),
        n_tets: tets.len(),
        n_dropped_cells: mesh.n_cells() - tets.len(),
        ..Tet2HexStats::default()
    };

    if stats.n_dropped_cells > 0 {
        for cell_type in [
            CellType::Vertex,
            CellType::Edge,
            CellType::Triangle,
            CellType::Quadrangle,
            CellType::Hexahedron,
            CellType::Prism,
            CellType::Pyramid,
        ] {
            let n = mesh.n_cells_of_type(cell_type);
            if n > 0 {
                debug!("{n} cells of type {cell_type:?} are dropped");
            }
        }
    }

    let mut registry =
        PointRegistry::with_capacity(mesh.n_verts(), quantization, 4 * tets.len());
    let mut elems = Vec::with_capacity(4 * tets.len());
    let mut etags = Vec::with_capacity(4 * tets.len());

    for &i in &tets {
        let e = mesh.tetrahedron(i);
        let ge = mesh.gtet(&e);
        if ge.vol() < 0.0 {
            stats.n_inverted_tets += 1;
        }
        elems.extend(split_tet(&e, &ge, &mut registry));
        etags.extend([mesh.etag(i); 4]);
    }

    if stats.n_inverted_tets > 0 {
        warn!(
            "{} tetrahedra have a negative volume, the corresponding hexahedra are inverted",
            stats.n_inverted_tets
        );
    }

    stats.n_new_verts = registry.len();
    stats.n_hexas = elems.len();
    debug!(
        "{} vertices created for {} tetrahedra",
        stats.n_new_verts, stats.n_tets
    );

    let res = assemble(
        mesh.verts(),
        registry,
        elems.iter().copied().zip(etags.iter().copied()),
    );

    info!("Final number of cells: {}", res.n_elems());

    Ok((res, stats))
}

#[cfg(test)]
mod tests {
    use super::{TET2HEXS, Tet2HexParams, split_tet, tet2hex, tet_aux_verts};
    use crate::{
        Result, Vert3d, assert_delta,
        mesh::{
            CellType, GTetrahedron, MixedMesh3d, Tetrahedron,
            test_meshes::{
                box_mesh, boundary_triangles, test_mesh_3d_mixed, test_mesh_3d_single_tet,
                test_mesh_3d_two_tets,
            },
        },
        registry::{PointRegistry, Quantization},
    };
    use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
    use rustc_hash::{FxBuildHasher, FxHashSet};

    fn random_tet(rng: &mut StdRng) -> GTetrahedron {
        let mut p = [0; 4].map(|_| Vert3d::from_fn(|_, _| rng.random::<f64>() - 0.5));
        let ge = GTetrahedron::new(&p[0], &p[1], &p[2], &p[3]);
        if ge.vol() < 0.0 {
            p.swap(0, 1);
        }
        GTetrahedron::new(&p[0], &p[1], &p[2], &p[3])
    }

    #[test]
    fn test_tables() {
        for (i, h) in TET2HEXS.iter().enumerate() {
            // one corner per hexahedron, at position 1
            assert!(h[1] < 4);
            assert_eq!(h.iter().filter(|&&j| j < 4).count(), 1);
            assert_eq!(h[7], 14);
            let mut tmp = *h;
            tmp.sort_unstable();
            assert!(tmp.windows(2).all(|w| w[0] < w[1]), "hex {i}");
        }
        let mut corners = TET2HEXS.map(|h| h[1]);
        corners.sort_unstable();
        assert_eq!(corners, [0, 1, 2, 3]);
    }

    #[test]
    fn test_aux_verts() {
        let mesh = test_mesh_3d_single_tet();
        let ge = mesh.gtet(&mesh.tetrahedron(0));
        let v = tet_aux_verts(&ge);
        assert_delta!((v[0] - Vert3d::new(0.5, 0.0, 0.0)).norm(), 0.0, 1e-15);
        assert_delta!((v[5] - Vert3d::new(0.0, 0.5, 0.5)).norm(), 0.0, 1e-15);
        assert_delta!((v[9] - Vert3d::new(1.0, 1.0, 1.0) / 3.0).norm(), 0.0, 1e-15);
        assert_delta!((v[10] - ge.center()).norm(), 0.0, 1e-15);
    }

    #[test]
    fn test_split_random() {
        // each hexahedron is the image of a reference hexahedron by an affine
        // map, so its volume is a quarter of the volume of the tetrahedron
        let mut rng = StdRng::seed_from_u64(1234);
        for _ in 0..100 {
            let ge = random_tet(&mut rng);
            let vol = ge.vol();
            let mut registry = PointRegistry::new(4, Quantization::default());
            let hexs = split_tet(&Tetrahedron::new(0, 1, 2, 3), &ge, &mut registry);
            assert_eq!(registry.len(), 11);

            let verts = [ge[0], ge[1], ge[2], ge[3]]
                .into_iter()
                .chain(registry.verts())
                .collect::<Vec<_>>();
            let mut total = 0.0;
            for h in hexs {
                assert!(h.has_distinct_verts());
                let gh = crate::mesh::GHexahedron::new(h.0.map(|i| verts[i]));
                let v = gh.vol();
                assert!(v > 0.0);
                assert_delta!(v / vol, 0.25, 1e-9);
                total += v;
            }
            assert_delta!(total / vol, 1.0, 1e-9);
        }
    }

    #[test]
    fn test_single_tet() -> Result<()> {
        let mesh = test_mesh_3d_single_tet();
        let (hexs, stats) = tet2hex(&mesh, &Tet2HexParams::default())?;

        assert_eq!(hexs.n_verts(), 15);
        assert_eq!(hexs.n_elems(), 4);
        assert_eq!(stats.n_new_verts, 11);
        assert_eq!(stats.n_hexas, 4);
        assert_eq!(stats.n_dropped_cells, 0);
        for e in hexs.elems() {
            assert!(e.has_distinct_verts());
            assert!(e.into_iter().all(|i| i < 15));
        }
        assert_delta!(hexs.vol(), 1.0 / 6.0, 1e-12);
        assert!(hexs.etags().all(|t| t == 1));
        hexs.check()?;

        // 3 quadrangles per triangle on the boundary
        assert_eq!(hexs.boundary_faces()?.len(), 12);

        Ok(())
    }

    #[test]
    fn test_two_tets() -> Result<()> {
        let mesh = test_mesh_3d_two_tets();
        let (hexs, stats) = tet2hex(&mesh, &Tet2HexParams::default())?;

        assert_eq!(hexs.n_verts(), 6 + 11 + 11 - 4);
        assert_eq!(stats.n_new_verts, 18);
        assert_eq!(hexs.n_elems(), 8);
        assert_eq!(hexs.etags().collect::<Vec<_>>(), vec![1, 1, 1, 1, 2, 2, 2, 2]);
        assert_delta!(hexs.vol(), 1.0 / 6.0 + 1.0 / 3.0, 1e-12);

        // the unused vertex is kept
        assert_eq!(hexs.vert(5), mesh.vert(5));

        // vertices shared by the hexahedra of the 2 tetrahedra: the 3
        // corners, 3 midpoints and the barycenter of the common face
        let verts = |range: std::ops::Range<usize>| {
            range
                .flat_map(|i| hexs.elem(i).into_iter())
                .collect::<FxHashSet<_>>()
        };
        let v0 = verts(0..4);
        let v1 = verts(4..8);
        assert_eq!(v0.len(), 15);
        assert_eq!(v1.len(), 15);
        let mut common = v0.intersection(&v1).copied().collect::<Vec<_>>();
        common.sort_unstable();
        assert_eq!(common.len(), 7);
        assert_eq!(&common[..3], &[1, 2, 3]);

        let face_center = (mesh.vert(1) + mesh.vert(2) + mesh.vert(3)) / 3.0;
        assert!(
            common
                .iter()
                .any(|&i| (hexs.vert(i) - face_center).norm() < 1e-12)
        );

        hexs.check()?;
        Ok(())
    }

    #[test]
    fn test_mixed() -> Result<()> {
        let mesh = test_mesh_3d_mixed();
        let (hexs, stats) = tet2hex(&mesh, &Tet2HexParams::default())?;

        let n_tets = mesh.n_cells_of_type(CellType::Tetrahedron);
        assert_eq!(stats.n_tets, n_tets);
        assert_eq!(stats.n_dropped_cells, mesh.n_cells() - n_tets);
        assert_eq!(hexs.n_elems(), 4 * n_tets);
        assert!(hexs.etags().all(|t| t == 1));

        // the input vertices are copied
        for (i, v) in mesh.verts().enumerate() {
            let w = hexs.vert(i);
            assert!(v.iter().zip(w.iter()).all(|(a, b)| a.to_bits() == b.to_bits()));
        }

        assert_delta!(hexs.vol(), 1.0, 1e-12);
        hexs.check()?;

        // the input mesh is not modified
        assert_eq!(mesh.n_cells(), test_mesh_3d_mixed().n_cells());

        Ok(())
    }

    #[test]
    fn test_box() -> Result<()> {
        let mesh = box_mesh(1.0, 4, 2.0, 3, 0.5, 5);
        let (hexs, _) = tet2hex(&mesh, &Tet2HexParams::default())?;

        // one new vertex per edge, face and tetrahedron
        let mut edges = FxHashSet::with_hasher(FxBuildHasher);
        let mut faces = FxHashSet::with_hasher(FxBuildHasher);
        for i in mesh.tetrahedra() {
            let e = mesh.tetrahedron(i);
            for j in 0..4 {
                for k in j + 1..4 {
                    let mut edg = [e[j], e[k]];
                    edg.sort_unstable();
                    edges.insert(edg);
                    for l in k + 1..4 {
                        let mut f = [e[j], e[k], e[l]];
                        f.sort_unstable();
                        faces.insert(f);
                    }
                }
            }
        }
        let n_tets = mesh.n_cells();
        assert_eq!(
            hexs.n_verts(),
            mesh.n_verts() + edges.len() + faces.len() + n_tets
        );

        assert_eq!(hexs.n_elems(), 4 * n_tets);
        assert_delta!(hexs.vol(), 1.0, 1e-12);
        hexs.check()?;
        assert_eq!(
            hexs.boundary_faces()?.len(),
            3 * boundary_triangles(&mesh).len()
        );

        Ok(())
    }

    #[test]
    fn test_determinism() -> Result<()> {
        let mesh = box_mesh(1.0, 3, 1.0, 4, 1.0, 3);
        let (hexs0, stats0) = tet2hex(&mesh, &Tet2HexParams::default())?;
        let (hexs1, stats1) = tet2hex(&mesh, &Tet2HexParams::default())?;

        assert_eq!(stats0, stats1);
        assert_eq!(hexs0.n_verts(), hexs1.n_verts());
        for (v0, v1) in hexs0.verts().zip(hexs1.verts()) {
            assert!(v0.iter().zip(v1.iter()).all(|(a, b)| a.to_bits() == b.to_bits()));
        }
        assert!(hexs0.elems().eq(hexs1.elems()));

        Ok(())
    }

    #[test]
    fn test_traversal_order() -> Result<()> {
        let mesh = box_mesh(1.0, 4, 1.0, 3, 1.0, 3);
        let (hexs, _) = tet2hex(&mesh, &Tet2HexParams::default())?;

        let mut rng = StdRng::seed_from_u64(1234);
        let mut tets = mesh
            .tetrahedra()
            .map(|i| mesh.tetrahedron(i))
            .collect::<Vec<_>>();
        tets.shuffle(&mut rng);
        let etags = vec![1; tets.len()];
        let verts = mesh.verts().collect::<Vec<_>>();
        let shuffled = MixedMesh3d::from_tetrahedra(&verts, &tets, &etags)?;

        let (hexs2, _) = tet2hex(&shuffled, &Tet2HexParams::default())?;
        assert_eq!(hexs.n_verts(), hexs2.n_verts());
        assert_eq!(hexs.n_elems(), hexs2.n_elems());
        assert_delta!(hexs.vol(), hexs2.vol(), 1e-12);
        hexs2.check()?;

        Ok(())
    }

    #[test]
    fn test_no_tets() -> Result<()> {
        let mut mesh = MixedMesh3d::empty();
        mesh.add_verts(
            [
                Vert3d::new(0., 0., 0.),
                Vert3d::new(1., 0., 0.),
                Vert3d::new(0., 1., 0.),
            ]
            .into_iter(),
        );
        mesh.add_cell(CellType::Triangle, &[0, 1, 2], 1)?;

        let (hexs, stats) = tet2hex(&mesh, &Tet2HexParams::default())?;
        assert_eq!(hexs.n_verts(), 3);
        assert_eq!(hexs.n_elems(), 0);
        assert_eq!(stats.n_dropped_cells, 1);
        assert_eq!(hexs.vert(1), mesh.vert(1));

        let (hexs, _) = tet2hex(&MixedMesh3d::empty(), &Tet2HexParams::default())?;
        assert_eq!(hexs.n_verts(), 0);
        assert_eq!(hexs.n_elems(), 0);

        Ok(())
    }

    #[test]
    fn test_config_errors() {
        let mesh = test_mesh_3d_single_tet();
        assert!(tet2hex(&mesh, &Tet2HexParams { precision: -2 }).is_err());
        assert!(tet2hex(&mesh, &Tet2HexParams { precision: 20 }).is_err());

        let verts = [
            Vert3d::new(0., 0., 0.),
            Vert3d::new(1e300, 0., 0.),
            Vert3d::new(0., 1., 0.),
            Vert3d::new(0., 0., 1.),
        ];
        let mesh =
            MixedMesh3d::from_tetrahedra(&verts, &[Tetrahedron::new(0, 1, 2, 3)], &[1]).unwrap();
        assert!(tet2hex(&mesh, &Tet2HexParams::default()).is_err());
        assert!(tet2hex(&mesh, &Tet2HexParams { precision: 0 }).is_err());
    }

    #[test]
    fn test_large_coordinates() -> Result<()> {
        let offset = Vert3d::new(1e9, 0.0, 0.0);
        let verts = test_mesh_3d_single_tet()
            .verts()
            .map(|v| v + offset)
            .collect::<Vec<_>>();
        let mesh = MixedMesh3d::from_tetrahedra(&verts, &[Tetrahedron::new(0, 1, 2, 3)], &[1])?;

        // above the coordinate limit of the default precision
        let err = tet2hex(&mesh, &Tet2HexParams::default()).unwrap_err();
        assert!(err.to_string().contains("must be smaller than"));

        // fewer digits allow larger coordinates
        let (hexs, stats) = tet2hex(&mesh, &Tet2HexParams { precision: 6 })?;
        assert_eq!(stats.n_new_verts, 11);
        assert_eq!(hexs.n_verts(), 15);
        assert!(hexs.gelems().all(|ge| ge.vol() > 0.0));
        assert_delta!(hexs.vol(), 1.0 / 6.0, 1e-4);
        Ok(())
    }

    #[test]
    fn test_coarse_precision() -> Result<()> {
        // with integer keys, the barycenters and the centroid of the unit
        // tetrahedron are merged and the hexahedra are degenerate
        let mesh = test_mesh_3d_single_tet();
        let (hexs, stats) = tet2hex(&mesh, &Tet2HexParams { precision: 0 })?;
        assert_eq!(stats.n_new_verts, 7);
        assert_eq!(hexs.n_verts(), 11);
        assert!(hexs.check().is_err());
        Ok(())
    }

    #[test]
    fn test_inverted_tet() -> Result<()> {
        let mesh = test_mesh_3d_single_tet();
        let verts = mesh.verts().collect::<Vec<_>>();
        let mesh = MixedMesh3d::from_tetrahedra(&verts, &[Tetrahedron::new(1, 0, 2, 3)], &[1])?;
        let (hexs, stats) = tet2hex(&mesh, &Tet2HexParams::default())?;
        assert_eq!(stats.n_inverted_tets, 1);
        assert_delta!(hexs.vol(), -1.0 / 6.0, 1e-12);
        assert!(hexs.check().is_err());
        Ok(())
    }

    #[test]
    fn test_stats_json() -> Result<()> {
        let (_, stats) = tet2hex(&test_mesh_3d_single_tet(), &Tet2HexParams::default())?;
        let json = stats.to_json()?;
        assert!(json.contains("\"n_hexas\": 4"));
        assert!(json.contains("\"n_new_verts\": 11"));
        Ok(())
    }
}
