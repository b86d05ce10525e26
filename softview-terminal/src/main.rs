/// Softview terminal viewer
///
/// Usage: softview [model.obj ...] [--texture image.png] [--config viewer.ron]
///
/// Without a model a cube is shown.
/// Controls:
///   - Arrows: Orbit, +/-: Zoom
///   - WASD: Fly, IJKL: Pan
///   - 1/2/3: Wireframe / texture / lighting
///   - x/y/z (X/Y/Z): Rotate model, </>: Scale, R: Reset
///   - v/p: Delete last vertex / polygon, Del: Remove model, O: Save edited copy
///   - c/n/m: Save view / Next view / Drop last saved view
///   - Tab: Next model, Q/ESC: Quit
use std::env;
use std::io;
use std::path::PathBuf;

use softview_core::{obj, Mesh, Scene, Texture, ViewerConfig};
use softview_terminal::TerminalApp;

#[derive(Debug, Default)]
struct Args {
    models: Vec<PathBuf>,
    texture: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--texture" | "-t" => {
                parsed.texture = Some(args.next().ok_or("--texture needs a file")?.into());
            }
            "--config" | "-c" => {
                parsed.config = Some(args.next().ok_or("--config needs a file")?.into());
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option {}", flag)),
            model => parsed.models.push(model.into()),
        }
    }
    Ok(parsed)
}

fn main() -> io::Result<()> {
    let args = parse_args(env::args().skip(1)).map_err(|e| {
        eprintln!("Usage: softview [model.obj ...] [--texture image.png] [--config viewer.ron]");
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let config = match &args.config {
        Some(path) => ViewerConfig::load(path).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
        None => ViewerConfig::default(),
    };

    let mut scene = Scene::new();
    for path in &args.models {
        println!("Loading OBJ file: {}", path.display());
        match obj::load(path) {
            Ok(mesh) => {
                println!("Loaded {} vertices, {} polygons", mesh.vertex_count(), mesh.polygon_count());
                scene.add(prepare(mesh));
            }
            Err(e) => eprintln!("Failed to load {}: {}", path.display(), e),
        }
    }
    if scene.is_empty() {
        println!("No model loaded, using default cube...");
        scene.add(prepare(Mesh::cube(2.0)));
    }
    scene.set_active(0);

    let texture = args.texture.as_ref().and_then(|path| match Texture::load(path) {
        Ok(texture) => Some(texture),
        Err(e) => {
            eprintln!("Failed to load texture {}: {}", path.display(), e);
            None
        }
    });

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(scene, &config, texture)?;
    app.run()?;

    println!("Thank you for using Softview!");
    Ok(())
}

/// Triangulate, compute normals and take the reset snapshot
fn prepare(mut mesh: Mesh) -> Mesh {
    mesh.preprocess();
    mesh.set_original_vertices();
    mesh
}
