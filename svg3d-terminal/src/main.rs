//! SVG3D Terminal Demo - Rotating Shape
//!
//! Usage: svg3d-terminal [--shape cube|sphere|tetrahedron] [--options options.json]
//!        svg3d-terminal --print-options
//!
//! Controls:
//!   - WASD / Arrow Keys: Rotate the model
//!   - E/R: Roll rotation
//!   - F: Toggle wireframe
//!   - C: Toggle face culling
//!   - Q/ESC: Quit

use std::env;
use std::io;
use svg3d_core::{primitives, BufferGeometry, RendererOptions};
use svg3d_terminal::{init_logging, TerminalApp};

fn invalid_input(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

fn shape(name: &str) -> io::Result<BufferGeometry> {
    match name {
        "cube" => Ok(primitives::box_geometry(2.0, 2.0, 2.0)),
        "sphere" => Ok(primitives::sphere_geometry(1.0, 24, 16)),
        "tetrahedron" => Ok(primitives::tetrahedron_geometry(1.0)),
        other => Err(invalid_input(format!("unknown shape: {other}"))),
    }
}

fn main() -> io::Result<()> {
    init_logging();

    let mut geometry = None;
    let mut options = RendererOptions::default();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--shape" => {
                let name = args.next().ok_or_else(|| invalid_input("--shape needs a value".into()))?;
                geometry = Some(shape(&name)?);
            }
            "--options" => {
                let path = args.next().ok_or_else(|| invalid_input("--options needs a path".into()))?;
                options = RendererOptions::load(&path).map_err(|e| {
                    io::Error::new(io::ErrorKind::InvalidData, format!("Failed to load {path}: {e}"))
                })?;
            }
            "--print-options" => {
                let json = serde_json::to_string_pretty(&options)
                    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
                println!("{json}");
                return Ok(());
            }
            other => return Err(invalid_input(format!("unexpected argument: {other}"))),
        }
    }

    let geometry = match geometry {
        Some(geometry) => geometry,
        None => shape("cube")?,
    };

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(geometry, options)?;
    app.run()?;

    println!("Thank you for using SVG3D Terminal!");
    Ok(())
}
