//! Conversion of tetrahedral meshes into conforming hexahedral meshes
//!
//! Every tetrahedron is split into 4 hexahedra, built from its edge midpoints,
//! face barycenters and centroid. The new vertices are shared between
//! neighboring tetrahedra through a [`registry::PointRegistry`] keyed by
//! quantized coordinates.
use core::fmt;
use nalgebra::SVector;

pub mod io;
pub mod mesh;
pub mod registry;
pub mod tet2hex;

/// Result
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Error
#[derive(Debug)]
pub struct Error(String);
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "There is an error: {}", self.0)
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Set the error message
    #[must_use]
    pub fn from(msg: &str) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Tag used for cells (cell entity ids)
pub type Tag = i16;

/// Vertex in D dimensions
pub type Vertex<const D: usize> = SVector<f64, D>;
/// Vertex in 3D
pub type Vert3d = Vertex<3>;

/// Assert that two floating point values are closer than a tolerance
#[macro_export]
macro_rules! assert_delta {
    ($x:expr, $y:expr, $d:expr) => {
        assert!(
            ($x - $y).abs() < $d,
            "({:.3e} - {:.3e}).abs() = {:.3e}",
            $x,
            $y,
            ($x - $y).abs()
        )
    };
}

pub use tet2hex::{Tet2HexParams, Tet2HexStats, tet2hex};
