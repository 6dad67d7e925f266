//! Mesh output
mod vtu_output;

pub use vtu_output::{VTUEncoding, VTUFile};
