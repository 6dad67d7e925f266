use env_logger::Env;
use log::info;
use std::time::Instant;
use tethex::{
    Result,
    io::{VTUEncoding, VTUFile},
    mesh::test_meshes::box_mesh,
    tet2hex::{Tet2HexParams, tet2hex},
};

pub fn init_log(level: &str) {
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    init_log("info");

    let mesh = box_mesh(1.0, 11, 2.0, 21, 0.5, 6);
    VTUFile::from_mixed_mesh(&mesh, VTUEncoding::Binary).export("box_tets.vtu")?;

    let now = Instant::now();
    let (hexs, stats) = tet2hex(&mesh, &Tet2HexParams::default())?;
    info!("Conversion done in {:.3}s", now.elapsed().as_secs_f64());
    info!("{}", stats.to_json()?);

    hexs.check()?;
    info!("Volume: {:.6e}", hexs.vol());

    let mut writer = VTUFile::from_hex_mesh(&hexs, VTUEncoding::Binary);
    writer.add_cell_data("vol", 1, hexs.gelems().map(|ge| ge.vol()));
    writer.export("box_hexas.vtu")?;

    Ok(())
}
