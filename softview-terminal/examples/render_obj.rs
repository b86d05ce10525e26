/// Example: Render an OBJ file once, without raw mode, and print frame stats
///
/// Usage: cargo run --example render_obj -- path/to/file.obj [cols rows]
use std::env;
use std::io::{self, stdout, Write};

use softview_core::{obj, Mesh, PixelBuffer, RenderEngine, RenderParams, RenderingModes, ViewerConfig};
use softview_terminal::HalfBlockPresenter;

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut mesh = match args.get(1) {
        Some(path) => obj::load(path).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
        None => {
            eprintln!("Usage: {} <obj-file> [cols rows]", args[0]);
            eprintln!("\nNo OBJ file provided, using default cube...");
            Mesh::cube(2.0)
        }
    };
    mesh.preprocess();
    mesh.transform_mut().rotate_y(0.6);
    mesh.transform_mut().rotate_x(0.4);

    let cols = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(80u16);
    let rows = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(25u16);
    let presenter = HalfBlockPresenter::new(0);
    let (width, height) = presenter.buffer_size(cols, rows);

    let config = ViewerConfig {
        modes: RenderingModes::new(true, false, true),
        ..ViewerConfig::default()
    };
    let camera = config.camera(width as f32 / height as f32);
    let lighting = config
        .lighting(&camera)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let params = RenderParams {
        lighting: Some(&lighting),
        ..config.render_params()
    };

    let mut canvas = PixelBuffer::new(width, height);
    let stats = RenderEngine::new().render(&mut canvas, &camera, &mesh, &params);

    let mut out = stdout();
    presenter.draw(&canvas, &mut out)?;
    writeln!(out)?;
    writeln!(out, "{:#?}", stats)?;
    out.flush()
}
