//! Deduplication of the vertices created by the conversion
//!
//! Vertices are identified through a quantized representation of their
//! coordinates: `x` is mapped to `round(x * 10^precision)`. Two vertices are
//! the same if their keys are identical. This is a tolerance, not an exact
//! equality:
//!   - two distinct vertices closer than `10^-precision` may be merged,
//!   - two vertices computed with different rounding errors may end up on both
//!     sides of a rounding boundary and not be merged.
//!
//! Keys are stored as `i64`, so the coordinates must satisfy
//! `|x| < 2^63 / 10^precision`: about `9.2e8` with the default precision,
//! `9.2e12` with 6 digits. Coarser precisions accept larger coordinates.
use crate::{Error, Result, Vert3d};
use rustc_hash::{FxBuildHasher, FxHashMap};

/// Default number of decimal digits kept in the vertex keys; coordinates
/// must be smaller than about `9.2e8` in absolute value
pub const DEFAULT_PRECISION: i32 = 10;

/// Largest number of decimal digits allowed
pub const MAX_PRECISION: i32 = 15;

/// Quantized coordinates
pub type VertexKey = [i64; 3];

/// Quantization of the vertex coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantization {
    precision: i32,
    scale: f64,
}

impl Default for Quantization {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            scale: 10_f64.powi(DEFAULT_PRECISION),
        }
    }
}

impl Quantization {
    /// Keep `precision` decimal digits, `0 <= precision <= MAX_PRECISION`
    pub fn new(precision: i32) -> Result<Self> {
        if !(0..=MAX_PRECISION).contains(&precision) {
            return Err(Error::from(&format!(
                "Invalid precision {precision}, must be in 0..={MAX_PRECISION}"
            )));
        }
        Ok(Self {
            precision,
            scale: 10_f64.powi(precision),
        })
    }

    /// Number of decimal digits kept
    #[must_use]
    pub const fn precision(&self) -> i32 {
        self.precision
    }

    /// Largest absolute value of the coordinates that can be quantized,
    /// `2^63 / 10^precision`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn max_coord(&self) -> f64 {
        i64::MAX as f64 / self.scale
    }

    /// Check that the coordinates of `v` can be quantized, i.e. that they are
    /// finite and that `x * 10^precision` fits in an `i64`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn is_valid(&self, v: &Vert3d) -> bool {
        v.iter().all(|&x| {
            let tmp = (x * self.scale).round();
            tmp.is_finite() && tmp.abs() < i64::MAX as f64
        })
    }

    /// Quantized coordinates of `v`
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn key(&self, v: &Vert3d) -> VertexKey {
        [0, 1, 2].map(|i| (v[i] * self.scale).round() as i64)
    }
}

/// Store of the new vertices
///
/// The vertices are appended to an arena and the vertex ids are given by
/// their position in the arena, shifted by the number of vertices of the
/// original mesh. The ids only depend on the order in which the distinct keys
/// are first seen.
pub struct PointRegistry {
    n_verts: usize,
    quantization: Quantization,
    ids: FxHashMap<VertexKey, usize>,
    verts: Vec<Vert3d>,
}

impl PointRegistry {
    /// Create an empty registry; the ids of the new vertices will start at
    /// `n_verts`
    #[must_use]
    pub const fn new(n_verts: usize, quantization: Quantization) -> Self {
        Self {
            n_verts,
            quantization,
            ids: FxHashMap::with_hasher(FxBuildHasher),
            verts: Vec::new(),
        }
    }

    /// Create an empty registry with an initial capacity
    #[must_use]
    pub fn with_capacity(n_verts: usize, quantization: Quantization, capacity: usize) -> Self {
        Self {
            n_verts,
            quantization,
            ids: FxHashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            verts: Vec::with_capacity(capacity),
        }
    }

    /// Get the id of the vertex with the same key as `v`, or add `v` and
    /// return its new id
    pub fn insert_or_get(&mut self, v: &Vert3d) -> usize {
        let key = self.quantization.key(v);
        *self.ids.entry(key).or_insert_with(|| {
            self.verts.push(*v);
            self.n_verts + self.verts.len() - 1
        })
    }

    /// Number of vertices in the input mesh, i.e. the first new id
    #[must_use]
    pub const fn n_verts(&self) -> usize {
        self.n_verts
    }

    /// Number of new vertices
    #[must_use]
    pub const fn len(&self) -> usize {
        self.verts.len()
    }

    /// Check if no vertex was added
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    /// Sequential iterator over the new vertices, in creation order
    #[must_use]
    pub fn verts(&self) -> impl ExactSizeIterator<Item = Vert3d> + Clone + '_ {
        self.verts.iter().copied()
    }

    /// Get the new vertices, in creation order
    #[must_use]
    pub fn into_verts(self) -> Vec<Vert3d> {
        self.verts
    }
}
