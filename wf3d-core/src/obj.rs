//! Wavefront OBJ reader and writer.
//!
//! Supported subset: `v`, `vt`, `vn` and `f` statements plus `#` comments.
//! Other statements (`o`, `g`, `s`, `usemtl`, `mtllib`, ...) are skipped.
//! Face references are 1-based in the text and 0-based in [`Mesh`].

use nom::{
    character::complete::{char, i64 as integer},
    combinator::{all_consuming, opt},
    number::complete::float,
    sequence::{pair, preceded},
    IResult,
};

use crate::error::{ElementKind, ParseError, WriteError};
use crate::geometry::{Corner, Mesh, Polygon};
use crate::math::{Vector2, Vector3};

const VERTEX_TOKEN: &str = "v";
const TEXTURE_TOKEN: &str = "vt";
const NORMAL_TOKEN: &str = "vn";
const FACE_TOKEN: &str = "f";

/// Header comment emitted by [`write_obj`].
pub const DEFAULT_COMMENT: &str = "Exported by wf3d";

/// Parse OBJ text into a mesh.
///
/// Only lexical and structural checks happen here; index ranges are checked
/// by [`write_obj`].
pub fn parse_obj(text: &str) -> Result<Mesh, ParseError> {
    let mut mesh = Mesh::new();

    for (number, raw) in text.lines().enumerate() {
        let line = number + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut words = trimmed.split_whitespace();
        let Some(token) = words.next() else {
            continue;
        };
        let args: Vec<&str> = words.collect();

        match token {
            VERTEX_TOKEN => {
                let [x, y, z] = parse_floats::<3>(&args, line, "vertex")?;
                mesh.add_vertex(Vector3::new(x, y, z));
            }
            TEXTURE_TOKEN => {
                let [u, v] = parse_floats::<2>(&args, line, "texture coordinate")?;
                mesh.add_texture_vertex(Vector2::new(u, v));
            }
            NORMAL_TOKEN => {
                let [x, y, z] = parse_floats::<3>(&args, line, "normal")?;
                mesh.add_normal(Vector3::new(x, y, z));
            }
            FACE_TOKEN => mesh.add_polygon(parse_face(&args, line)?),
            _ => {}
        }
    }

    tracing::debug!(%mesh, "parsed OBJ");
    Ok(mesh)
}

/// Reads the first `N` floats of a statement; extra components are ignored.
fn parse_floats<const N: usize>(
    args: &[&str],
    line: usize,
    what: &str,
) -> Result<[f32; N], ParseError> {
    if args.len() < N {
        return Err(ParseError::new(line, format!("Too few {what} components")));
    }
    let mut out = [0.0; N];
    for (slot, word) in out.iter_mut().zip(args) {
        *slot = parse_float(word)
            .ok_or_else(|| ParseError::new(line, format!("Invalid float in {what}: {word}")))?;
    }
    Ok(out)
}

fn parse_float(word: &str) -> Option<f32> {
    all_consuming(float::<&str, ()>)(word)
        .ok()
        .map(|(_, value)| value)
}

fn parse_face(args: &[&str], line: usize) -> Result<Polygon, ParseError> {
    if args.len() < 3 {
        return Err(ParseError::new(line, "Face must have at least 3 vertices"));
    }

    let corners = args
        .iter()
        .map(|word| parse_corner(word, line))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::with_corners(&corners))
}

/// Raw face reference: `v`, `v/t`, `v/t/n`, `v//n` (also `v/` and `v/t/`).
type RawReference = (i64, Option<(Option<i64>, Option<Option<i64>>)>);

fn face_reference(input: &str) -> IResult<&str, RawReference> {
    pair(
        integer,
        opt(preceded(
            char('/'),
            pair(opt(integer), opt(preceded(char('/'), opt(integer)))),
        )),
    )(input)
}

fn parse_corner(word: &str, line: usize) -> Result<Corner, ParseError> {
    let (_, (vertex, rest)) = all_consuming(face_reference)(word)
        .map_err(|_| ParseError::new(line, format!("Invalid index format: {word}")))?;

    let (texture, normal) = match rest {
        Some((texture, normal)) => (texture, normal.flatten()),
        None => (None, None),
    };

    Ok(Corner {
        vertex: to_zero_based(vertex, line)?,
        texture: texture.map(|t| to_zero_based(t, line)).transpose()?,
        normal: normal.map(|n| to_zero_based(n, line)).transpose()?,
    })
}

fn to_zero_based(index: i64, line: usize) -> Result<usize, ParseError> {
    match index {
        0 => Err(ParseError::new(line, "Zero index is not allowed in .obj")),
        i if i < 0 => Err(ParseError::new(
            line,
            format!("Negative (relative) index is not supported: {i}"),
        )),
        i => usize::try_from(i - 1)
            .map_err(|_| ParseError::new(line, format!("Index out of range: {i}"))),
    }
}

/// Serialize a mesh as OBJ text with the default header comment.
pub fn write_obj(mesh: &Mesh) -> Result<String, WriteError> {
    write_obj_with_comment(mesh, Some(DEFAULT_COMMENT))
}

/// Serialize a mesh as OBJ text.
///
/// Every polygon is validated before anything is emitted. Groups are
/// separated by a blank line and omitted when empty.
pub fn write_obj_with_comment(mesh: &Mesh, comment: Option<&str>) -> Result<String, WriteError> {
    for (i, polygon) in mesh.polygons.iter().enumerate() {
        validate_polygon(polygon, i + 1, mesh)?;
    }

    let mut out = String::new();

    if let Some(comment) = comment.filter(|c| !c.trim().is_empty()) {
        out.push_str("# ");
        out.push_str(comment);
        out.push_str("\n\n");
    }

    for (i, v) in mesh.vertices.iter().enumerate() {
        let [x, y, z] = format_components([v.x, v.y, v.z], ElementKind::Vertex, i + 1)?;
        out.push_str(&format!("v {x} {y} {z}\n"));
    }
    if !mesh.vertices.is_empty() {
        out.push('\n');
    }

    for (i, vt) in mesh.texture_vertices.iter().enumerate() {
        let [u, v] = format_components([vt.x, vt.y], ElementKind::TextureVertex, i + 1)?;
        out.push_str(&format!("vt {u} {v}\n"));
    }
    if !mesh.texture_vertices.is_empty() {
        out.push('\n');
    }

    for (i, vn) in mesh.normals.iter().enumerate() {
        let [x, y, z] = format_components([vn.x, vn.y, vn.z], ElementKind::Normal, i + 1)?;
        out.push_str(&format!("vn {x} {y} {z}\n"));
    }
    if !mesh.normals.is_empty() {
        out.push('\n');
    }

    for polygon in &mesh.polygons {
        out.push('f');
        let has_texture = polygon.corners().any(|c| c.texture.is_some());
        let has_normal = polygon.corners().any(|c| c.normal.is_some());
        for corner in polygon.corners() {
            out.push(' ');
            out.push_str(&face_token(corner, has_texture, has_normal));
        }
        out.push('\n');
    }

    tracing::debug!(%mesh, bytes = out.len(), "wrote OBJ");
    Ok(out)
}

fn face_token(corner: Corner, has_texture: bool, has_normal: bool) -> String {
    let one_based = |index: Option<usize>| index.map(|i| (i + 1).to_string()).unwrap_or_default();
    match (has_texture, has_normal) {
        (false, false) => format!("{}", corner.vertex + 1),
        (true, false) => format!("{}/{}", corner.vertex + 1, one_based(corner.texture)),
        (false, true) => format!("{}//{}", corner.vertex + 1, one_based(corner.normal)),
        (true, true) => format!(
            "{}/{}/{}",
            corner.vertex + 1,
            one_based(corner.texture),
            one_based(corner.normal)
        ),
    }
}

fn validate_polygon(polygon: &Polygon, number: usize, mesh: &Mesh) -> Result<(), WriteError> {
    let vertices = polygon.vertex_indices.len();
    if vertices < 3 {
        return Err(WriteError::TooFewVertices {
            polygon: number,
            count: vertices,
        });
    }
    if let Some(&index) = polygon
        .vertex_indices
        .iter()
        .find(|&&vi| vi >= mesh.vertices.len())
    {
        return Err(WriteError::VertexIndexOutOfRange {
            polygon: number,
            index,
        });
    }

    if polygon.has_texture_coordinates() {
        if polygon.texture_indices.len() != vertices {
            return Err(WriteError::TextureCountMismatch {
                polygon: number,
                textures: polygon.texture_indices.len(),
                vertices,
            });
        }
        if let Some(index) = first_out_of_range(&polygon.texture_indices, mesh.texture_vertices.len()) {
            return Err(WriteError::TextureIndexOutOfRange {
                polygon: number,
                index,
            });
        }
    }

    if polygon.has_normals() {
        if polygon.normal_indices.len() != vertices {
            return Err(WriteError::NormalCountMismatch {
                polygon: number,
                normals: polygon.normal_indices.len(),
                vertices,
            });
        }
        if let Some(index) = first_out_of_range(&polygon.normal_indices, mesh.normals.len()) {
            return Err(WriteError::NormalIndexOutOfRange {
                polygon: number,
                index,
            });
        }
    }

    Ok(())
}

fn first_out_of_range(indices: &[Option<usize>], len: usize) -> Option<usize> {
    indices.iter().flatten().copied().find(|&i| i >= len)
}

fn format_components<const N: usize>(
    values: [f32; N],
    kind: ElementKind,
    number: usize,
) -> Result<[String; N], WriteError> {
    if values.iter().any(|v| v.is_nan()) {
        return Err(WriteError::NotANumber { kind, number });
    }
    if values.iter().any(|v| v.is_infinite()) {
        return Err(WriteError::Infinite { kind, number });
    }
    Ok(values.map(format_float))
}

/// Fixed seven-digit precision with trailing zeros and a bare trailing
/// point removed; negative zero prints as `0`.
fn format_float(value: f32) -> String {
    let fixed = format!("{value:.7}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        s => s.to_string(),
    }
}
