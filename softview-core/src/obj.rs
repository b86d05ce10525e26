/// Wavefront OBJ reader and writer
use std::fmt::Write as _;
use std::path::Path;

use log::info;
use nom::{
    bytes::complete::take_till1,
    character::complete::{char, i64 as index, space0, space1},
    combinator::{all_consuming, opt},
    multi::many0,
    number::complete::float,
    sequence::{pair, preceded, terminated},
    IResult,
};

use crate::error::ObjError;
use crate::geometry::{Mesh, Polygon};
use crate::math::{Vec2, Vec3};

/// One `f` element as written in the file: `v`, `v/vt`, `v//vn` or `v/vt/vn`
type FaceElement = (i64, Option<i64>, Option<i64>);

/// Parse OBJ text into a mesh.
///
/// Understands `v`, `vt`, `vn` and `f`; `o` names the mesh, everything else is
/// ignored. Indices are 1-based, or negative to count back from the last
/// element defined so far.
pub fn parse(text: &str) -> Result<Mesh, ObjError> {
    let mut mesh = Mesh::new();

    for (i, raw) in text.lines().enumerate() {
        let line_number = i + 1;
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let (args, statement) = keyword(line).map_err(|_| ObjError::parse(line_number, "Unreadable statement"))?;
        match statement {
            "v" => {
                let c = coordinates(args, 3, line_number, "Vertex")?;
                mesh.add_vertex(Vec3::new(c[0], c[1], c[2]));
            }
            "vt" => {
                let c = coordinates(args, 2, line_number, "Texture vertex")?;
                mesh.add_texture_coord(Vec2::new(c[0], c[1]));
            }
            "vn" => {
                let c = coordinates(args, 3, line_number, "Normal")?;
                mesh.add_normal(Vec3::new(c[0], c[1], c[2]));
            }
            "f" => {
                let polygon = face(&mesh, args, line_number)?;
                mesh.add_polygon(polygon);
            }
            "o" if mesh.name.is_empty() => mesh.name = args.trim().to_string(),
            _ => {}
        }
    }

    if mesh.vertices.is_empty() {
        return Err(ObjError::parse(0, "Model contains no vertices"));
    }

    info!(
        "parsed OBJ: {} vertices, {} texture coords, {} normals, {} polygons",
        mesh.vertices.len(),
        mesh.texture_coords.len(),
        mesh.normals.len(),
        mesh.polygons.len()
    );
    Ok(mesh)
}

/// Read and parse an OBJ file. The mesh is named after the file stem unless
/// the file names it.
pub fn load(path: impl AsRef<Path>) -> Result<Mesh, ObjError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let mut mesh = parse(&text)?;
    if mesh.name.is_empty() {
        if let Some(stem) = path.file_stem() {
            mesh.name = stem.to_string_lossy().into_owned();
        }
    }
    info!("loaded {} from {}", mesh.name, path.display());
    Ok(mesh)
}

/// Serialize a mesh to OBJ text.
///
/// Coordinates use six decimals; faces carry texture and normal indices only
/// when the polygon has them.
pub fn write(mesh: &Mesh) -> String {
    let mut out = String::new();
    if !mesh.name.is_empty() {
        let _ = writeln!(out, "o {}", mesh.name);
    }
    for v in &mesh.vertices {
        let _ = writeln!(out, "v {:.6} {:.6} {:.6}", v.x, v.y, v.z);
    }
    for vt in &mesh.texture_coords {
        let _ = writeln!(out, "vt {:.6} {:.6}", vt.x, vt.y);
    }
    for vn in &mesh.normals {
        let _ = writeln!(out, "vn {:.6} {:.6} {:.6}", vn.x, vn.y, vn.z);
    }
    for polygon in &mesh.polygons {
        out.push('f');
        for (corner, &v) in polygon.vertex_indices().iter().enumerate() {
            let vt = polygon.texture_indices().get(corner);
            let vn = polygon.normal_indices().get(corner);
            let _ = match (vt, vn) {
                (Some(t), Some(n)) => write!(out, " {}/{}/{}", v + 1, t + 1, n + 1),
                (Some(t), None) => write!(out, " {}/{}", v + 1, t + 1),
                (None, Some(n)) => write!(out, " {}//{}", v + 1, n + 1),
                (None, None) => write!(out, " {}", v + 1),
            };
        }
        out.push('\n');
    }
    out
}

/// Write a mesh to an OBJ file
pub fn save(mesh: &Mesh, path: impl AsRef<Path>) -> Result<(), ObjError> {
    let path = path.as_ref();
    std::fs::write(path, write(mesh))?;
    info!("wrote {} to {}", mesh.name, path.display());
    Ok(())
}

fn keyword(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace())(input)
}

fn float_list(input: &str) -> IResult<&str, Vec<f32>> {
    all_consuming(terminated(many0(preceded(space1, float)), space0))(input)
}

fn face_element(input: &str) -> IResult<&str, FaceElement> {
    let (input, v) = index(input)?;
    let (input, rest) = opt(preceded(
        char('/'),
        pair(opt(index), opt(preceded(char('/'), index))),
    ))(input)?;
    let (vt, vn) = rest.unwrap_or((None, None));
    Ok((input, (v, vt, vn)))
}

fn face_elements(input: &str) -> IResult<&str, Vec<FaceElement>> {
    all_consuming(terminated(many0(preceded(space1, face_element)), space0))(input)
}

fn coordinates(args: &str, required: usize, line: usize, what: &str) -> Result<Vec<f32>, ObjError> {
    let (_, values) =
        float_list(args).map_err(|_| ObjError::parse(line, format!("Invalid number format in {}", what.to_lowercase())))?;
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ObjError::parse(line, format!("{what} coordinates must be finite")));
    }
    if values.len() < required {
        return Err(ObjError::parse(
            line,
            format!("{what} requires at least {required} coordinates"),
        ));
    }
    Ok(values)
}

fn face(mesh: &Mesh, args: &str, line: usize) -> Result<Polygon, ObjError> {
    let (_, elements) = face_elements(args).map_err(|_| ObjError::parse(line, "Invalid face element format"))?;
    if elements.len() < 3 {
        return Err(ObjError::parse(line, "Polygon must have at least 3 vertices"));
    }

    let mut vertices = Vec::with_capacity(elements.len());
    let mut textures = Vec::new();
    let mut normals = Vec::new();
    for (v, vt, vn) in elements {
        vertices.push(resolve(v, mesh.vertices.len(), line)?);
        if let Some(vt) = vt {
            textures.push(resolve(vt, mesh.texture_coords.len(), line)?);
        }
        if let Some(vn) = vn {
            normals.push(resolve(vn, mesh.normals.len(), line)?);
        }
    }

    Polygon::new(vertices)
        .with_texture_indices(textures)
        .and_then(|p| p.with_normal_indices(normals))
        .map_err(|e| ObjError::parse(line, e.to_string()))
}

/// Turn a 1-based or negative-relative OBJ index into a 0-based one
fn resolve(raw: i64, len: usize, line: usize) -> Result<usize, ObjError> {
    if raw == 0 {
        return Err(ObjError::parse(line, "Zero index is not allowed in OBJ format"));
    }
    let resolved = if raw > 0 { raw - 1 } else { len as i64 + raw };
    if resolved < 0 || resolved >= len as i64 {
        return Err(ObjError::parse(
            line,
            format!("Index {raw} is out of bounds. List size: {len}"),
        ));
    }
    Ok(resolved as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# a textured quad
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1

f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_parse_quad() {
        let mesh = parse(QUAD).unwrap();
        assert_eq!(mesh.name, "quad");
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.texture_coords.len(), 4);
        assert_eq!(mesh.normals.len(), 1);
        assert_eq!(mesh.polygon_count(), 1);
        let polygon = &mesh.polygons[0];
        assert_eq!(polygon.vertex_indices(), &[0, 1, 2, 3]);
        assert_eq!(polygon.texture_indices(), &[0, 1, 2, 3]);
        assert_eq!(polygon.normal_indices(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_face_element_forms() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\nf 1 2 3\n").unwrap();
        assert!(!mesh.polygons[0].has_texture_indices());
        assert_eq!(mesh.polygons[0].normal_indices(), &[0, 0, 0]);
        assert!(!mesh.polygons[1].has_normal_indices());
    }

    #[test]
    fn test_negative_indices() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(mesh.polygons[0].vertex_indices(), &[0, 1, 2]);
    }

    #[test]
    fn test_comments_and_unknown_statements() {
        let mesh = parse("mtllib x.mtl\nv 0 0 0 # origin\ng group\nv 1 0 0\nusemtl m\nv 0 1 0\ns off\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.polygon_count(), 1);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let cases = [
            ("v 0 0 0\nv 1 0\n", 2),
            ("v 0 0 0\nv 1 0 x\n", 2),
            ("vt 0\n", 1),
            ("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2\n", 4),
            ("v 0 0 0\nv 1 0 0\nv 0 1 0\n\nf 1 2 0\n", 5),
            ("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n", 4),
            ("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 -4\n", 4),
            ("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/1 2 3\n", 4),
            ("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 a\n", 4),
        ];
        for (text, line) in cases {
            let err = parse(text).unwrap_err();
            assert_eq!(err.line(), Some(line), "{text:?} gave {err}");
        }
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        for (text, line) in [
            ("v nan 0 0\n", 1),
            ("v 0 0 0\nvn 0 inf 0\n", 2),
            ("v 0 0 0\n\nvt -infinity 0\n", 3),
        ] {
            let err = parse(text).unwrap_err();
            assert_eq!(err.line(), Some(line), "{text:?} gave {err}");
            assert!(err.to_string().contains("finite"));
        }
    }

    #[test]
    fn test_mixed_texture_indices_rejected() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1 2 3/1\n";
        let err = parse(text).unwrap_err();
        assert_eq!(err.line(), Some(5));
    }

    #[test]
    fn test_empty_model_rejected() {
        let err = parse("# nothing here\n").unwrap_err();
        assert_eq!(err.to_string(), "Model contains no vertices");
    }

    #[test]
    fn test_write_then_parse() {
        let mut mesh = parse(QUAD).unwrap();
        mesh.add_polygon(Polygon::new(vec![0, 1, 2]));
        let text = write(&mesh);
        assert!(text.contains("v 1.000000 1.000000 0.000000\n"));
        assert!(text.contains("f 1/1/1 2/2/1 3/3/1 4/4/1\n"));
        assert!(text.contains("f 1 2 3\n"));

        let again = parse(&text).unwrap();
        assert_eq!(again.polygons, mesh.polygons);
        assert_eq!(again.vertices, mesh.vertices);
        assert_eq!(again.name, "quad");
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teapot.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let mesh = load(&path).unwrap();
        assert_eq!(mesh.name, "teapot");

        let out = dir.path().join("out.obj");
        save(&mesh, &out).unwrap();
        assert_eq!(load(&out).unwrap().name, "teapot");
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(load("/no/such/model.obj"), Err(ObjError::Io(_))));
    }
}
