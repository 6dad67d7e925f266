//! Meshes with cells of different types
use super::{CellType, GTetrahedron, Tetrahedron};
use crate::{Error, Result, Tag, Vert3d};
use log::debug;

/// Mesh in 3D with cells of any [`CellType`]
///
/// The cell connectivities are stored contiguously (CSR layout); the order of
/// the vertices within a cell is kept as given, as it defines the orientation
#[derive(Clone, Debug)]
pub struct MixedMesh3d {
    verts: Vec<Vert3d>,
    cell_types: Vec<CellType>,
    cell_ptr: Vec<usize>,
    cell_conn: Vec<usize>,
    etags: Vec<Tag>,
}

impl Default for MixedMesh3d {
    fn default() -> Self {
        Self::empty()
    }
}

impl MixedMesh3d {
    /// Create an empty mesh
    #[must_use]
    pub fn empty() -> Self {
        Self {
            verts: Vec::new(),
            cell_types: Vec::new(),
            cell_ptr: vec![0],
            cell_conn: Vec::new(),
            etags: Vec::new(),
        }
    }

    /// Create a mesh from vertices and tetrahedra
    pub fn from_tetrahedra(verts: &[Vert3d], elems: &[Tetrahedron], etags: &[Tag]) -> Result<Self> {
        if elems.len() != etags.len() {
            return Err(Error::from("Inconsistent sizes (elems)"));
        }
        let mut res = Self::empty();
        res.add_verts(verts.iter().copied());
        for (e, &t) in elems.iter().zip(etags.iter()) {
            res.add_cell(CellType::Tetrahedron, &e.0, t)?;
        }
        Ok(res)
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
        self.verts.extend(v);
    }

    /// Number of cells (of all types)
    #[must_use]
    pub const fn n_cells(&self) -> usize {
        self.cell_types.len()
    }

    /// Add a cell
    ///
    /// An error is returned if the number of vertices does not match the
    /// cell type or if a vertex index is not valid
    pub fn add_cell(&mut self, cell_type: CellType, ids: &[usize], tag: Tag) -> Result<()> {
        if ids.len() != cell_type.n_verts() {
            return Err(Error::from(&format!(
                "{cell_type:?} with {} vertices",
                ids.len()
            )));
        }
        if let Some(i) = ids.iter().find(|&&i| i >= self.n_verts()) {
            return Err(Error::from(&format!(
                "Invalid vertex index {i} in {cell_type:?} (n_verts = {})",
                self.n_verts()
            )));
        }
        self.cell_types.push(cell_type);
        self.cell_conn.extend_from_slice(ids);
        self.cell_ptr.push(self.cell_conn.len());
        self.etags.push(tag);
        Ok(())
    }

    /// Get the type and the vertices of the `i`th cell
    #[must_use]
    pub fn cell(&self, i: usize) -> (CellType, &[usize]) {
        let start = self.cell_ptr[i];
        let end = self.cell_ptr[i + 1];
        (self.cell_types[i], &self.cell_conn[start..end])
    }

    /// Sequential iterator over the cells
    #[must_use]
    pub fn cells(&self) -> impl ExactSizeIterator<Item = (CellType, &[usize])> + '_ {
        (0..self.n_cells()).map(|i| self.cell(i))
    }

    /// Get the type of the `i`th cell
    #[must_use]
    pub fn cell_type(&self, i: usize) -> CellType {
        self.cell_types[i]
    }

    /// Get the tag of the `i`th cell
    #[must_use]
    pub fn etag(&self, i: usize) -> Tag {
        self.etags[i]
    }

    /// Sequential iterator over the cell tags
    #[must_use]
    pub fn etags(&self) -> impl ExactSizeIterator<Item = Tag> + Clone + '_ {
        self.etags.iter().copied()
    }

    /// Number of cells of a given type
    #[must_use]
    pub fn n_cells_of_type(&self, cell_type: CellType) -> usize {
        self.cell_types.iter().filter(|&&t| t == cell_type).count()
    }

    /// Indices of the cells of a given type, in increasing order
    pub fn cells_of_type(&self, cell_type: CellType) -> impl Iterator<Item = usize> + '_ {
        self.cell_types
            .iter()
            .enumerate()
            .filter(move |&(_, &t)| t == cell_type)
            .map(|(i, _)| i)
    }

    /// Indices of the tetrahedra, in increasing order; the other cells are
    /// ignored
    pub fn tetrahedra(&self) -> impl Iterator<Item = usize> + '_ {
        let n = self.n_cells_of_type(CellType::Tetrahedron);
        debug!(
            "{n} tetrahedra selected, {} other cells ignored",
            self.n_cells() - n
        );
        self.cells_of_type(CellType::Tetrahedron)
    }

    /// Get the `i`th cell, that must be a tetrahedron, with the vertex order
    /// of the mesh
    #[must_use]
    pub fn tetrahedron(&self, i: usize) -> Tetrahedron {
        let (cell_type, ids) = self.cell(i);
        assert_eq!(cell_type, CellType::Tetrahedron);
        Tetrahedron::new(ids[0], ids[1], ids[2], ids[3])
    }

    /// Get the vertices of tetrahedron `e`
    #[must_use]
    pub fn gtet(&self, e: &Tetrahedron) -> GTetrahedron {
        GTetrahedron::new(
            &self.verts[e[0]],
            &self.verts[e[1]],
            &self.verts[e[2]],
            &self.verts[e[3]],
        )
    }
}
