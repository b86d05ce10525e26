use softview_core::{
    obj, Camera, Color, Lighting, Mesh, PixelBuffer, Polygon, RenderEngine, RenderParams, RenderingModes,
    Texture, Vec2, Vec3,
};

const SIZE: usize = 200;

fn camera_at(position: Vec3) -> Camera {
    Camera::new(position, Vec3::zeros(), 60f32.to_radians(), 1.0, 0.1, 100.0)
}

fn params(modes: RenderingModes) -> RenderParams<'static> {
    RenderParams {
        modes,
        base_color: Color::LIGHT_GRAY,
        wire_color: Color::new(1.0, 0.0, 0.0),
        background: Color::BLACK,
        ..RenderParams::default()
    }
}

/// Unit square in the z = 0 plane facing +z
fn square() -> Mesh {
    let mut mesh = Mesh::named("square");
    for (x, y) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
        mesh.add_vertex(Vec3::new(x, y, 0.0));
    }
    mesh.add_polygon(Polygon::new(vec![0, 1, 2, 3]));
    mesh
}

#[test]
fn test_cube_shows_three_faces_from_a_corner() {
    let mut canvas = PixelBuffer::new(SIZE, SIZE);
    let camera = camera_at(Vec3::new(4.0, 4.0, 4.0));
    let stats = RenderEngine::new().render(
        &mut canvas,
        &camera,
        &Mesh::cube(2.0),
        &params(RenderingModes::default()),
    );

    assert_eq!(stats.faces_drawn, 3);
    assert_eq!(stats.faces_culled, 3);
    assert_eq!(stats.faces_skipped, 0);
    assert_eq!(stats.triangles_filled, 6);
    assert!(stats.pixels_filled > 1000);
    // Pixels on shared edges can be claimed twice
    assert!(canvas.count_not(Color::BLACK) <= stats.pixels_filled);
}

#[test]
fn test_cube_head_on_shows_front_face_only() {
    let mut canvas = PixelBuffer::new(SIZE, SIZE);
    let camera = camera_at(Vec3::new(0.0, 0.0, 5.0));
    let stats = RenderEngine::new().render(
        &mut canvas,
        &camera,
        &Mesh::cube(2.0),
        &params(RenderingModes::default()),
    );
    // The side faces are seen from behind
    assert_eq!(stats.faces_drawn, 1);
    assert_eq!(stats.faces_culled, 5);
    assert!(canvas.pixel(SIZE / 2, SIZE / 2) == Some(Color::LIGHT_GRAY));
}

#[test]
fn test_degenerate_polygon_is_skipped() {
    let mut mesh = square();
    mesh.add_polygon(Polygon::new(vec![0, 2]));

    let mut canvas = PixelBuffer::new(SIZE, SIZE);
    let stats = RenderEngine::new().render(
        &mut canvas,
        &camera_at(Vec3::new(0.0, 0.0, 5.0)),
        &mesh,
        &params(RenderingModes::default()),
    );
    assert_eq!(stats.faces_skipped, 1);
    assert_eq!(stats.faces_drawn, 1);
    assert!(canvas.count_not(Color::BLACK) > 0);
}

#[test]
fn test_back_face_never_filled() {
    let mut mesh = Mesh::new();
    mesh.add_vertex(Vec3::new(-1.0, -1.0, 0.0));
    mesh.add_vertex(Vec3::new(1.0, -1.0, 0.0));
    mesh.add_vertex(Vec3::new(0.0, 1.0, 0.0));
    // Clockwise seen from +z
    mesh.add_polygon(Polygon::new(vec![0, 2, 1]));

    let mut canvas = PixelBuffer::new(SIZE, SIZE);
    let stats = RenderEngine::new().render(
        &mut canvas,
        &camera_at(Vec3::new(0.0, 0.0, 5.0)),
        &mesh,
        &params(RenderingModes::new(true, true, true)),
    );
    assert_eq!(stats.triangles_filled, 0);
    assert_eq!(stats.faces_culled, 1);
    assert_eq!(canvas.count_not(Color::BLACK), 0);
}

#[test]
fn test_scaling_doubles_screen_extent() {
    let camera = camera_at(Vec3::new(0.0, 0.0, 5.0));
    let mut engine = RenderEngine::new();
    let modes = params(RenderingModes::default());

    let mut mesh = square();
    let mut canvas = PixelBuffer::new(SIZE, SIZE);
    engine.render(&mut canvas, &camera, &mesh, &modes);
    let (x0, y0, x1, y1) = canvas.covered_bounds(Color::BLACK).unwrap();
    let (w1, h1) = ((x1 - x0 + 1) as f32, (y1 - y0 + 1) as f32);

    mesh.transform_mut().scale_by(Vec3::new(2.0, 2.0, 2.0));
    engine.render(&mut canvas, &camera, &mesh, &modes);
    let (x0, y0, x1, y1) = canvas.covered_bounds(Color::BLACK).unwrap();
    let (w2, h2) = ((x1 - x0 + 1) as f32, (y1 - y0 + 1) as f32);

    assert!((w2 - 2.0 * w1).abs() <= 2.0, "width {w1} -> {w2}");
    assert!((h2 - 2.0 * h1).abs() <= 2.0, "height {h1} -> {h2}");
}

#[test]
fn test_wireframe_only_adds_pixels() {
    let camera = camera_at(Vec3::new(3.0, 2.5, 4.0));
    let mesh = Mesh::cube(2.0);
    let mut engine = RenderEngine::new();

    let mut filled = PixelBuffer::new(SIZE, SIZE);
    let plain = engine.render(&mut filled, &camera, &mesh, &params(RenderingModes::default()));

    let mut wired = PixelBuffer::new(SIZE, SIZE);
    let overlay = engine.render(&mut wired, &camera, &mesh, &params(RenderingModes::new(true, false, false)));

    assert_eq!(plain.faces_drawn, overlay.faces_drawn);
    assert!(overlay.wire_pixels > 0);
    for (before, after) in filled.pixels().iter().zip(wired.pixels()) {
        if *before != Color::BLACK {
            assert_ne!(*after, Color::BLACK);
        }
    }
    assert!(wired.count_not(Color::BLACK) >= filled.count_not(Color::BLACK));
}

#[test]
fn test_textured_and_lit_obj() {
    let text = "\
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";
    let mut mesh = obj::parse(text).unwrap();
    mesh.preprocess();
    assert_eq!(mesh.polygon_count(), 2);

    let camera = camera_at(Vec3::new(0.0, 0.0, 5.0));
    let lighting = Lighting::new(&camera, 0.2, 0.8).unwrap();
    let texture = Texture::checkerboard(8, 4, Color::WHITE, Color::new(0.0, 0.0, 1.0));
    let params = RenderParams {
        modes: RenderingModes::new(false, true, true),
        base_color: Color::WHITE,
        texture: Some(&texture),
        lighting: Some(&lighting),
        ..RenderParams::default()
    };

    let mut canvas = PixelBuffer::new(SIZE, SIZE);
    let stats = RenderEngine::new().render(&mut canvas, &camera, &mesh, &params);
    assert_eq!(stats.faces_drawn, 2);

    // Both checker colours show up, and the facing surface is lit close to full
    let pixels = canvas.pixels();
    assert!(pixels.iter().any(|c| c.r > 0.9 && c.g > 0.9 && c.b > 0.9));
    assert!(pixels.iter().any(|c| c.r < 0.1 && c.b > 0.9));
}

#[test]
fn test_uv_interpolation_is_perspective_correct() {
    // A floor stretching away from the camera; the texture's left half is
    // white and its right half blue, split at u = 0.5
    let mut mesh = Mesh::new();
    for (x, z) in [(-1.0, 1.0), (1.0, 1.0), (1.0, -20.0), (-1.0, -20.0)] {
        mesh.add_vertex(Vec3::new(x, -1.0, z));
    }
    for (u, v) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
        mesh.add_texture_coord(Vec2::new(u, v));
    }
    mesh.add_polygon(
        Polygon::new(vec![0, 1, 2, 3])
            .with_texture_indices(vec![0, 1, 2, 3])
            .unwrap(),
    );
    let texture = Texture::new(2, 1, vec![Color::WHITE, Color::new(0.0, 0.0, 1.0)]).unwrap();

    let camera = Camera::new(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, -1.0, 0.0), 1.2, 1.0, 0.1, 100.0);
    let params = RenderParams {
        modes: RenderingModes::new(false, true, false),
        base_color: Color::WHITE,
        texture: Some(&texture),
        ..RenderParams::default()
    };
    let mut canvas = PixelBuffer::new(SIZE, SIZE);
    let stats = RenderEngine::new().render(&mut canvas, &camera, &mesh, &params);
    assert_eq!(stats.faces_drawn, 1);

    // Along every covered row the colour switches at the screen-space centre
    // line, which projects u = 0.5 for a floor symmetric about x = 0
    for y in 0..SIZE {
        let row: Vec<_> = (0..SIZE).filter_map(|x| canvas.pixel(x, y).map(|c| (x, c))).collect();
        let left = row.iter().filter(|(_, c)| *c == Color::WHITE).map(|(x, _)| *x).max();
        let right = row.iter().filter(|(_, c)| c.b > 0.9 && c.r < 0.1).map(|(x, _)| *x).min();
        if let (Some(left), Some(right)) = (left, right) {
            assert!(left < right);
            assert!(left + 2 >= SIZE / 2 - 1 && right <= SIZE / 2 + 2, "row {y}: {left} {right}");
        }
    }
}
