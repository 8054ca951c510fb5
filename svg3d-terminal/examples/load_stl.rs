//! Example: Load and render an STL file in the terminal
//!
//! Usage: cargo run --example load_stl -- path/to/file.stl [out.svg]
//!
//! With a second argument, one frame is also written as an SVG document.

use std::env;
use std::io;
use std::sync::Arc;
use svg3d_core::{
    frame_object, primitives, stl, Camera, FrameTarget, Material, Renderer, RendererOptions, Scene,
    SvgSurface,
};
use svg3d_terminal::{init_logging, TerminalApp};

fn to_io(e: svg3d_core::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e.to_string())
}

fn main() -> io::Result<()> {
    init_logging();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <stl-file> [out.svg]", args[0]);
        eprintln!("\nNo STL file provided, using default cube...");
        let cube = primitives::box_geometry(2.0, 2.0, 2.0);
        let mut app = TerminalApp::new(cube, RendererOptions::default())?;
        return app.run();
    }

    let stl_path = &args[1];
    println!("Loading STL file: {}", stl_path);
    let geometry = stl::load_stl(stl_path).map_err(to_io)?;
    println!("Loaded {} triangles", geometry.triangles().count());

    if let Some(svg_path) = args.get(2) {
        let geometry = Arc::new(geometry.clone());
        let mut scene = Scene::new();
        let mesh = scene.spawn_mesh(geometry.clone(), Arc::new(Material::default()));
        scene.add(scene.root(), mesh);
        let options = RendererOptions::default();
        let camera = scene.spawn_camera(Camera::for_viewport(options.width, options.height));
        frame_object(&mut scene, camera, FrameTarget::Geometry(&geometry), 0.8);

        let mut svg = SvgSurface::default();
        let stats = Renderer::new(options).render(&mut scene, camera, &mut svg);
        svg.save(svg_path).map_err(to_io)?;
        println!("Wrote {} triangles to {}", stats.emitted, svg_path);
    }

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(geometry, RendererOptions::default())?;
    app.run()?;

    println!("Thank you for using SVG3D Terminal!");
    Ok(())
}
