//! Hexahedron meshes in 3d
use super::{GHexahedron, Hexahedron, Quadrangle};
use crate::{Error, Result, Tag, Vert3d};
use log::debug;
use rayon::prelude::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use rustc_hash::{FxBuildHasher, FxHashMap};

/// Check if `b` is `a` with the opposite orientation
fn is_reversed(a: &Quadrangle, b: &Quadrangle) -> bool {
    (0..4).any(|s| (0..4).all(|i| b[i] == a[(s + 4 - i) % 4]))
}

/// Mesh containing only hexahedra
#[derive(Clone, Debug, Default)]
pub struct HexMesh3d {
    verts: Vec<Vert3d>,
    elems: Vec<Hexahedron>,
    etags: Vec<Tag>,
}

impl HexMesh3d {
    /// Create an empty mesh
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a new mesh from slices of vertices, hexahedra and tags
    #[must_use]
    pub fn new(verts: &[Vert3d], elems: &[Hexahedron], etags: &[Tag]) -> Self {
        let mut res = Self::empty();
        res.add_verts(verts.iter().copied());
        res.add_elems(elems.iter().copied(), etags.iter().copied());
        res
    }

    /// Number of vertices
    #[must_use]
    pub const fn n_verts(&self) -> usize {
        self.verts.len()
    }

    /// Get the `i`th vertex
    #[must_use]
    pub fn vert(&self, i: usize) -> Vert3d {
        self.verts[i]
    }

    /// Sequential iterator over the vertices
    #[must_use]
    pub fn verts(&self) -> impl ExactSizeIterator<Item = Vert3d> + Clone + '_ {
        self.verts.iter().copied()
    }

    /// Add vertices to the mesh
    pub fn add_verts<I: ExactSizeIterator<Item = Vert3d>>(&mut self, v: I) {
        self.verts.reserve(v.len());
        self.verts.extend(v);
    }

    /// Number of elements
    #[must_use]
    pub const fn n_elems(&self) -> usize {
        self.elems.len()
    }

    /// Get the `i`th element
    #[must_use]
    pub fn elem(&self, i: usize) -> Hexahedron {
        self.elems[i]
    }

    /// Sequential iterator over the mesh elements
    #[must_use]
    pub fn elems(&self) -> impl ExactSizeIterator<Item = Hexahedron> + Clone + '_ {
        self.elems.iter().copied()
    }

    /// Add elements to the mesh
    pub fn add_elems<I1: ExactSizeIterator<Item = Hexahedron>, I2: ExactSizeIterator<Item = Tag>>(
        &mut self,
        elems: I1,
        etags: I2,
    ) {
        self.elems.reserve(elems.len());
        self.elems.extend(elems);
        self.etags.reserve(etags.len());
        self.etags.extend(etags);
    }

    /// Add elements to the mesh
    pub fn add_elems_and_tags<I: ExactSizeIterator<Item = (Hexahedron, Tag)>>(
        &mut self,
        elems_and_tags: I,
    ) {
        self.elems.reserve(elems_and_tags.len());
        self.etags.reserve(elems_and_tags.len());
        for (e, t) in elems_and_tags {
            self.elems.push(e);
            self.etags.push(t);
        }
    }

    /// Get the tag of the `i`th element
    #[must_use]
    pub fn etag(&self, i: usize) -> Tag {
        self.etags[i]
    }

    /// Sequential iterator over the element tags
    #[must_use]
    pub fn etags(&self) -> impl ExactSizeIterator<Item = Tag> + Clone + '_ {
        self.etags.iter().copied()
    }

    /// Get the vertices of element `e`
    #[must_use]
    pub fn gelem(&self, e: &Hexahedron) -> GHexahedron {
        GHexahedron::new(e.0.map(|i| self.verts[i]))
    }

    /// Sequential iterator over element vertices
    #[must_use]
    pub fn gelems(&self) -> impl ExactSizeIterator<Item = GHexahedron> + Clone + '_ {
        self.elems().map(|e| self.gelem(&e))
    }

    /// Parallel iterator over element vertices
    #[must_use]
    pub fn par_gelems(&self) -> impl IndexedParallelIterator<Item = GHexahedron> + '_ {
        self.elems.par_iter().map(|e| self.gelem(e))
    }

    /// Total volume
    #[must_use]
    pub fn vol(&self) -> f64 {
        self.par_gelems().map(|ge| ge.vol()).sum::<f64>()
    }

    /// Compute all the mesh faces (boundary & internal)
    ///
    /// A map from sorted face `[i0, i1, i2, i3]` to the face index and face
    /// elements `[i_face, e0, e1]` is returned. The face is oriented outwards
    /// for `e0`; if it only belongs to one element, `e1 = usize::MAX`.
    ///
    /// An error is returned if a face belongs to more than 2 elements, or if
    /// the 2 elements sharing a face are not consistently oriented
    pub fn all_faces(&self) -> Result<FxHashMap<Quadrangle, [usize; 3]>> {
        let mut res: FxHashMap<Quadrangle, [usize; 3]> =
            FxHashMap::with_capacity_and_hasher(3 * self.n_elems(), FxBuildHasher);

        for (i_elem, e) in self.elems().enumerate() {
            for f in e.faces() {
                let tmp = f.sorted();
                match res.entry(tmp) {
                    std::collections::hash_map::Entry::Occupied(occupied_entry) => {
                        let arr = occupied_entry.into_mut();
                        if arr[2] != usize::MAX {
                            return Err(Error::from(&format!(
                                "face {f:?} belongs to {}, {} and {i_elem}",
                                arr[1], arr[2]
                            )));
                        }
                        let other = self.elem(arr[1]);
                        let f0 = other
                            .faces()
                            .find(|g| g.sorted() == tmp)
                            .ok_or_else(|| Error::from("face not found"))?;
                        if !is_reversed(&f0, &f) {
                            return Err(Error::from(&format!(
                                "face {f:?} has the same orientation in {} and {i_elem}",
                                arr[1]
                            )));
                        }
                        arr[2] = i_elem;
                    }
                    std::collections::hash_map::Entry::Vacant(vacant_entry) => {
                        vacant_entry.insert([0, i_elem, usize::MAX]);
                    }
                }
            }
        }

        // number the faces by first element
        let mut faces = res.iter().map(|(f, v)| (v[1], *f)).collect::<Vec<_>>();
        faces.sort_unstable_by_key(|&(e0, f)| (e0, f.0));
        for (i, (_, f)) in faces.iter().enumerate() {
            if let Some(v) = res.get_mut(f) {
                v[0] = i;
            }
        }

        Ok(res)
    }

    /// Boundary faces (faces that belong to only one element), oriented
    /// outwards, together with their element
    pub fn boundary_faces(&self) -> Result<Vec<(Quadrangle, usize)>> {
        let all_faces = self.all_faces()?;
        let res = self
            .elems()
            .enumerate()
            .flat_map(|(i_elem, e)| e.faces().map(move |f| (f, i_elem)).collect::<Vec<_>>())
            .filter(|(f, _)| all_faces.get(&f.sorted()).is_some_and(|v| v[2] == usize::MAX))
            .collect::<Vec<_>>();
        Ok(res)
    }

    /// Check the mesh validity
    ///   - connectivity and tag sizes
    ///   - element to vertex connectivities
    ///   - element orientations
    ///   - faces shared by at most 2 consistently oriented elements
    ///   - the volume enclosed by the boundary faces is the volume of the elements
    pub fn check(&self) -> Result<()> {
        // lengths
        if self.elems.len() != self.etags.len() {
            return Err(Error::from("Inconsistent sizes (elems)"));
        }

        // indices & element volume
        for e in self.elems() {
            if !e.into_iter().all(|i| i < self.n_verts()) {
                return Err(Error::from("Invalid index in elems"));
            }
            if !e.has_distinct_verts() {
                return Err(Error::from(&format!("Duplicated vertices in {e:?}")));
            }
            let ge = self.gelem(&e);
            if ge.vol() < 0.0 {
                return Err(Error::from(&format!(
                    "Elem has a <0 volume: center = {:?}",
                    ge.center()
                )));
            }
        }

        // faces
        let bdy = self.boundary_faces()?;
        debug!("{} boundary faces", bdy.len());

        // volumes
        let vol = self.vol();
        let vol2 = bdy
            .iter()
            .map(|(f, i_elem)| {
                let ge = self.gelem(&self.elem(*i_elem));
                let i_face = self
                    .elem(*i_elem)
                    .faces()
                    .position(|g| g == *f)
                    .unwrap_or_default();
                ge.face(i_face).flux_vol()
            })
            .sum::<f64>();
        if (vol - vol2).abs() > 1e-10 * vol.abs().max(f64::MIN_POSITIVE) {
            return Err(Error::from(&format!(
                "Invalid volume : {vol} from elements, {vol2} from boundary faces"
            )));
        }

        Ok(())
    }
}
