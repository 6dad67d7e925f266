use crate::Vert3d;
use derive_more::{AsRef, From, Index, IndexMut, IntoIterator};
use nalgebra::Matrix3;

/// Faces of a hexahedron, oriented outwards
pub const HEX2FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [1, 2, 6, 5],
    [2, 3, 7, 6],
    [3, 0, 4, 7],
];

/// Vertices of the reference hexahedron `[-1, 1]^3`
const HEX_REF: [[f64; 3]; 8] = [
    [-1., -1., -1.],
    [1., -1., -1.],
    [1., 1., -1.],
    [-1., 1., -1.],
    [-1., -1., 1.],
    [1., -1., 1.],
    [1., 1., 1.],
    [-1., 1., 1.],
];

/// 2 points Gauss rule on `[-1, 1]`, the weights are 1
const GAUSS_2: [f64; 2] = [-0.577_350_269_189_625_8, 0.577_350_269_189_625_8];

/// Tetrahedron vertices
#[derive(Clone, Copy, Debug, Index, IndexMut, IntoIterator, From, AsRef)]
#[as_ref(forward)]
pub struct GTetrahedron([Vert3d; 4]);

impl GTetrahedron {
    #[must_use]
    pub const fn new(v0: &Vert3d, v1: &Vert3d, v2: &Vert3d, v3: &Vert3d) -> Self {
        Self([*v0, *v1, *v2, *v3])
    }

    /// Signed volume, > 0 if `(v1 - v0, v2 - v0, v3 - v0)` is direct
    #[must_use]
    pub fn vol(&self) -> f64 {
        let e1 = self[1] - self[0];
        let e2 = self[2] - self[0];
        let e3 = self[3] - self[0];

        e3.dot(&e1.cross(&e2)) / 6.0
    }

    /// Centroid
    #[must_use]
    pub fn center(&self) -> Vert3d {
        (self[0] + self[1] + self[2] + self[3]) / 4.0
    }
}

impl Default for GTetrahedron {
    fn default() -> Self {
        Self([Vert3d::zeros(); 4])
    }
}

/// Hexahedron vertices, with the ordering of [`super::Hexahedron`]
#[derive(Clone, Copy, Debug, Index, IndexMut, IntoIterator, From, AsRef)]
#[as_ref(forward)]
pub struct GHexahedron([Vert3d; 8]);

impl GHexahedron {
    #[must_use]
    pub const fn new(verts: [Vert3d; 8]) -> Self {
        Self(verts)
    }

    /// Jacobian of the trilinear map from the reference hexahedron at `(u, v, w)`
    #[must_use]
    pub fn jacobian(&self, u: f64, v: f64, w: f64) -> Matrix3<f64> {
        let mut res = Matrix3::zeros();
        for (x, [ui, vi, wi]) in self.0.iter().zip(HEX_REF) {
            let du = 0.125 * ui * (1.0 + v * vi) * (1.0 + w * wi);
            let dv = 0.125 * vi * (1.0 + u * ui) * (1.0 + w * wi);
            let dw = 0.125 * wi * (1.0 + u * ui) * (1.0 + v * vi);
            for i in 0..3 {
                res[(i, 0)] += du * x[i];
                res[(i, 1)] += dv * x[i];
                res[(i, 2)] += dw * x[i];
            }
        }
        res
    }

    /// Signed volume of the trilinear hexahedron
    ///
    /// The jacobian determinant is of degree 2 in each direction, so the
    /// 2x2x2 Gauss rule is exact
    #[must_use]
    pub fn vol(&self) -> f64 {
        let mut res = 0.0;
        for u in GAUSS_2 {
            for v in GAUSS_2 {
                for w in GAUSS_2 {
                    res += self.jacobian(u, v, w).determinant();
                }
            }
        }
        res
    }

    /// Vertex average
    #[must_use]
    pub fn center(&self) -> Vert3d {
        self.0.iter().sum::<Vert3d>() / 8.0
    }

    /// Get the `i`th face, oriented outwards
    #[must_use]
    pub fn face(&self, i: usize) -> GQuadrangle {
        GQuadrangle(HEX2FACES[i].map(|j| self.0[j]))
    }
}

impl Default for GHexahedron {
    fn default() -> Self {
        Self([Vert3d::zeros(); 8])
    }
}

/// Bilinear quadrangle vertices
#[derive(Clone, Copy, Debug, Index, IndexMut, IntoIterator, From, AsRef)]
#[as_ref(forward)]
pub struct GQuadrangle([Vert3d; 4]);

impl GQuadrangle {
    /// `1/3 * int x.n dS` over the bilinear patch; summed over the oriented
    /// boundary of a closed volume, it gives the enclosed volume
    #[must_use]
    pub fn flux_vol(&self) -> f64 {
        let mut res = 0.0;
        for u in GAUSS_2 {
            let u = 0.5 * (1.0 + u);
            for v in GAUSS_2 {
                let v = 0.5 * (1.0 + v);
                let x = (1.0 - u) * (1.0 - v) * self[0]
                    + u * (1.0 - v) * self[1]
                    + u * v * self[2]
                    + (1.0 - u) * v * self[3];
                let dxdu = (1.0 - v) * (self[1] - self[0]) + v * (self[2] - self[3]);
                let dxdv = (1.0 - u) * (self[3] - self[0]) + u * (self[2] - self[1]);
                res += 0.25 * x.dot(&dxdu.cross(&dxdv));
            }
        }
        res / 3.0
    }
}
