//! Volumetric meshes in 3D
//!   - [`MixedMesh3d`]: vertices and cells of any type, as read from a mesh file
//!   - [`HexMesh3d`]: vertices and hexahedra, produced by the conversion
mod elements;
mod hex_mesh;
mod mixed_mesh;
pub mod test_meshes;

use derive_more::{AsRef, From, Index, IndexMut, IntoIterator};

pub use elements::{GHexahedron, GQuadrangle, GTetrahedron, HEX2FACES};
pub use hex_mesh::HexMesh3d;
pub use mixed_mesh::MixedMesh3d;

/// Cell types, numbered as in the VTK file format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellType {
    /// Vertex
    Vertex,
    /// Edge
    Edge,
    /// Triangle
    Triangle,
    /// Quadrangle
    Quadrangle,
    /// Tetrahedron
    Tetrahedron,
    /// Hexahedron
    Hexahedron,
    /// Prism
    Prism,
    /// Pyramid
    Pyramid,
}

impl CellType {
    /// Number of vertices of a cell
    #[must_use]
    pub const fn n_verts(self) -> usize {
        match self {
            Self::Vertex => 1,
            Self::Edge => 2,
            Self::Triangle => 3,
            Self::Quadrangle | Self::Tetrahedron => 4,
            Self::Pyramid => 5,
            Self::Prism => 6,
            Self::Hexahedron => 8,
        }
    }

    /// VTK cell type id
    #[must_use]
    pub const fn vtk_id(self) -> u8 {
        match self {
            Self::Vertex => 1,
            Self::Edge => 3,
            Self::Triangle => 5,
            Self::Quadrangle => 9,
            Self::Tetrahedron => 10,
            Self::Hexahedron => 12,
            Self::Prism => 13,
            Self::Pyramid => 14,
        }
    }
}

/// Tetrahedron
#[derive(
    Default, Clone, Copy, PartialEq, Eq, Hash, Debug, Index, IndexMut, IntoIterator, From, AsRef,
)]
#[as_ref(forward)]
pub struct Tetrahedron(pub [usize; 4]);

impl Tetrahedron {
    #[must_use]
    pub const fn new(i0: usize, i1: usize, i2: usize, i3: usize) -> Self {
        Self([i0, i1, i2, i3])
    }
}

/// Hexahedron, with the VTK vertex ordering: bottom quadrangle `0, 1, 2, 3`
/// then top quadrangle `4, 5, 6, 7`, vertex `4 + i` being above vertex `i`
#[derive(
    Default, Clone, Copy, PartialEq, Eq, Hash, Debug, Index, IndexMut, IntoIterator, From, AsRef,
)]
#[as_ref(forward)]
pub struct Hexahedron(pub [usize; 8]);

impl Hexahedron {
    #[must_use]
    pub const fn new(indices: [usize; 8]) -> Self {
        Self(indices)
    }

    /// Get the `i`th face, oriented outwards
    #[must_use]
    pub fn face(&self, i: usize) -> Quadrangle {
        Quadrangle(HEX2FACES[i].map(|j| self.0[j]))
    }

    /// Iterator over the 6 faces, oriented outwards
    #[must_use]
    pub fn faces(&self) -> impl ExactSizeIterator<Item = Quadrangle> + '_ {
        (0..6).map(|i| self.face(i))
    }

    /// Check if the 8 vertices are distinct
    #[must_use]
    pub fn has_distinct_verts(&self) -> bool {
        let mut tmp = self.0;
        tmp.sort_unstable();
        tmp.windows(2).all(|w| w[0] != w[1])
    }
}

/// Quadrangle
#[derive(
    Default, Clone, Copy, PartialEq, Eq, Hash, Debug, Index, IndexMut, IntoIterator, From, AsRef,
)]
#[as_ref(forward)]
pub struct Quadrangle(pub [usize; 4]);

impl Quadrangle {
    #[must_use]
    pub const fn new(i0: usize, i1: usize, i2: usize, i3: usize) -> Self {
        Self([i0, i1, i2, i3])
    }

    /// Quadrangle with sorted vertex ids, used as a key for faces
    #[must_use]
    pub fn sorted(&self) -> Self {
        let mut tmp = *self;
        tmp.0.sort_unstable();
        tmp
    }
}
