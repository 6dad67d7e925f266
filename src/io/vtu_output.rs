use crate::{
    Result, Tag, Vert3d,
    mesh::{CellType, HexMesh3d, MixedMesh3d},
};
use base64::Engine as _;
use quick_xml::se::to_utf8_io_writer;
use serde::Serialize;
use std::{
    fmt::Display,
    io::{BufWriter, Write},
    path::Path,
};

/// Encoding for vtk files
#[derive(Clone, Copy, Debug)]
pub enum VTUEncoding {
    /// Ascii
    Ascii,
    /// Binary
    Binary,
}

#[derive(Serialize)]
#[serde(rename = "VTKFile", rename_all = "PascalCase")]
/// VTU file writer
pub struct VTUFile {
    #[serde(rename = "@type")]
    grid_type: String,
    #[serde(rename = "@version")]
    version: f64,
    #[serde(rename = "@header_type")]
    header_type: String,
    #[serde(rename = "@byte_order")]
    byte_order: String,
    unstructured_grid: UnstructuredGrid,
    #[serde(skip_serializing)]
    encoding: VTUEncoding,
}

impl VTUFile {
    fn new(
        verts: impl ExactSizeIterator<Item = Vert3d>,
        cells: Cells,
        etags: impl ExactSizeIterator<Item = Tag>,
        encoding: VTUEncoding,
    ) -> Self {
        let number_of_points = verts.len();
        let number_of_cells = etags.len();
        Self {
            grid_type: "UnstructuredGrid".to_string(),
            version: 0.1,
            header_type: "UInt32".to_string(),
            byte_order: "LittleEndian".to_string(),
            unstructured_grid: UnstructuredGrid {
                piece: Piece {
                    number_of_points,
                    number_of_cells,
                    points: Points::from_verts(verts, encoding),
                    cells,
                    cell_data: CellData::from_etags(etags, encoding),
                    point_data: PointData::new(),
                },
            },
            encoding,
        }
    }

    /// Create a vtu writer for a hexahedron mesh
    #[must_use]
    pub fn from_hex_mesh(mesh: &HexMesh3d, encoding: VTUEncoding) -> Self {
        Self::new(
            mesh.verts(),
            Cells::from_hexas(mesh, encoding),
            mesh.etags(),
            encoding,
        )
    }

    /// Create a vtu writer for a mesh with cells of any type
    #[must_use]
    pub fn from_mixed_mesh(mesh: &MixedMesh3d, encoding: VTUEncoding) -> Self {
        Self::new(
            mesh.verts(),
            Cells::from_cells(mesh, encoding),
            mesh.etags(),
            encoding,
        )
    }

    /// Add cell data
    pub fn add_cell_data<I: Iterator<Item = f64>>(
        &mut self,
        name: &str,
        number_of_components: usize,
        data: I,
    ) {
        let piece = &mut self.unstructured_grid.piece;
        piece.cell_data.data_array.push(DataArray::new(
            name,
            number_of_components,
            number_of_components * piece.number_of_cells,
            data,
            self.encoding,
        ));
    }

    /// Add point data
    pub fn add_point_data<I: Iterator<Item = f64>>(
        &mut self,
        name: &str,
        number_of_components: usize,
        data: I,
    ) {
        let piece = &mut self.unstructured_grid.piece;
        piece.point_data.data_array.push(DataArray::new(
            name,
            number_of_components,
            number_of_components * piece.number_of_points,
            data,
            self.encoding,
        ));
    }

    /// Write the file
    pub fn export<P: AsRef<Path>>(&self, file_name: P) -> Result<()> {
        let f = std::fs::File::create(file_name)?;
        let mut writer = BufWriter::new(f);
        writeln!(writer, "<?xml version=\"1.0\"?>")?;
        to_utf8_io_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UnstructuredGrid {
    piece: Piece,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Piece {
    #[serde(rename = "@NumberOfPoints")]
    number_of_points: usize,
    #[serde(rename = "@NumberOfCells")]
    number_of_cells: usize,
    points: Points,
    cells: Cells,
    cell_data: CellData,
    point_data: PointData,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Points {
    data_array: DataArray,
}

impl Points {
    fn from_verts<I: ExactSizeIterator<Item = Vert3d>>(data: I, encoding: VTUEncoding) -> Self {
        Self {
            data_array: DataArray::new(
                "Points",
                3,
                3 * data.len(),
                data.flat_map(|x| [x[0], x[1], x[2]]),
                encoding,
            ),
        }
    }
}

/// Scalar types that can be stored in a `DataArray`
trait VtkScalar: Copy + Display {
    const NAME: &'static str;
    const SIZE: usize;

    fn extend_le_bytes(self, out: &mut Vec<u8>);
}

macro_rules! impl_vtk_scalar {
    ($t:ty, $name:literal) => {
        impl VtkScalar for $t {
            const NAME: &'static str = $name;
            const SIZE: usize = size_of::<$t>();

            fn extend_le_bytes(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }
        }
    };
}

impl_vtk_scalar!(f64, "Float64");
impl_vtk_scalar!(i64, "Int64");
impl_vtk_scalar!(i16, "Int16");
impl_vtk_scalar!(u8, "UInt8");

#[derive(Serialize)]
struct DataArray {
    #[serde(rename = "@type")]
    data_type: String,
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@format")]
    format: String,
    #[serde(rename = "@NumberOfComponents")]
    number_of_components: usize,
    #[serde(rename = "$text")]
    data: String,
}

/// Base64 encoding of `len` values, preceded by the size in bytes
#[allow(clippy::cast_possible_truncation)]
fn encode<T: VtkScalar, I: Iterator<Item = T>>(len: usize, data: I) -> String {
    let capacity = size_of::<u32>() + len * T::SIZE;

    let mut out = Vec::with_capacity(capacity);
    let header = ((len * T::SIZE) as u32).to_le_bytes();
    out.extend_from_slice(&header);
    for x in data {
        x.extend_le_bytes(&mut out);
    }
    assert_eq!(out.len(), capacity);
    base64::prelude::BASE64_STANDARD.encode(out)
}

impl DataArray {
    fn new<T: VtkScalar, I: Iterator<Item = T>>(
        name: &str,
        number_of_components: usize,
        len: usize,
        data: I,
        encoding: VTUEncoding,
    ) -> Self {
        use std::fmt::Write;
        let (format, data) = match encoding {
            VTUEncoding::Ascii => (
                "ascii".to_string(),
                data.fold(String::new(), |mut output, b| {
                    let _ = write!(output, "{b} ");
                    output
                }),
            ),
            VTUEncoding::Binary => ("binary".to_string(), encode(len, data)),
        };

        Self {
            data_type: T::NAME.to_string(),
            name: name.to_string(),
            format,
            number_of_components,
            data,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Cells {
    data_array: Vec<DataArray>,
}

impl Cells {
    #[allow(clippy::cast_possible_wrap)]
    fn from_hexas(mesh: &HexMesh3d, encoding: VTUEncoding) -> Self {
        let n = mesh.n_elems();

        let connectivity = DataArray::new(
            "connectivity",
            1,
            8 * n,
            mesh.elems().flatten().map(|x| x as i64),
            encoding,
        );

        let data = (0..n).map(|i| (8 * (i + 1)) as i64);
        let offsets = DataArray::new("offsets", 1, n, data, encoding);

        let cell_type = CellType::Hexahedron.vtk_id();
        let types = DataArray::new("types", 1, n, (0..n).map(|_| cell_type), encoding);

        Self {
            data_array: vec![connectivity, offsets, types],
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    fn from_cells(mesh: &MixedMesh3d, encoding: VTUEncoding) -> Self {
        let n = mesh.n_cells();
        let len = mesh.cells().map(|(_, ids)| ids.len()).sum::<usize>();

        let connectivity = DataArray::new(
            "connectivity",
            1,
            len,
            mesh.cells()
                .flat_map(|(_, ids)| ids.iter().map(|&x| x as i64)),
            encoding,
        );

        let data = mesh.cells().scan(0, |offset, (_, ids)| {
            *offset += ids.len();
            Some(*offset as i64)
        });
        let offsets = DataArray::new("offsets", 1, n, data, encoding);

        let types = DataArray::new(
            "types",
            1,
            n,
            mesh.cells().map(|(t, _)| t.vtk_id()),
            encoding,
        );

        Self {
            data_array: vec![connectivity, offsets, types],
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CellData {
    data_array: Vec<DataArray>,
}

impl CellData {
    fn from_etags<I: ExactSizeIterator<Item = Tag>>(data: I, encoding: VTUEncoding) -> Self {
        let tags = DataArray::new("tags", 1, data.len(), data, encoding);

        Self {
            data_array: vec![tags],
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PointData {
    data_array: Vec<DataArray>,
}

impl PointData {
    const fn new() -> Self {
        Self {
            data_array: Vec::new(),
        }
    }
}
