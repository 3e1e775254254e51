//! Minimal Wavefront OBJ reader.
//!
//! Reads `v`, `vn`, `vt` and `f` records; everything else (objects, groups,
//! smoothing, materials) is skipped. Polygons are fan-triangulated. Indices
//! come out 0-based: positive OBJ indices are 1-based, negative ones count
//! back from the end of the array as it stood when the face was read.

use crate::error::{RenderError, Result};

use super::{FaceVertexRef, RawGeometryArrays};

/// Geometry read from one OBJ file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjData {
    pub arrays: RawGeometryArrays,
    /// Triangulated corners, three per triangle.
    pub faces: Vec<FaceVertexRef>,
}

impl ObjData {
    pub fn triangle_count(&self) -> usize {
        self.faces.len() / 3
    }
}

pub fn parse(text: &str) -> Result<ObjData> {
    let mut out = ObjData::default();
    let mut corners = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        let mut fields = content.split_whitespace();
        let Some(tag) = fields.next() else { continue };

        match tag {
            // `v x y z [w]` or `v x y z r g b`: the extra fields are dropped.
            "v" => out.arrays.positions.push(floats::<3>(fields, line, 7)?),
            "vn" => out.arrays.normals.push(floats::<3>(fields, line, 3)?),
            // `vt u v [w]`: w is dropped.
            "vt" => out.arrays.tex_coords.push(floats::<2>(fields, line, 3)?),
            "f" => {
                corners.clear();
                for token in fields {
                    corners.push(corner(token, &out.arrays, line)?);
                }
                if corners.len() < 3 {
                    return Err(parse_err(
                        line,
                        format!("face needs at least 3 vertices, got {}", corners.len()),
                    ));
                }
                for k in 1..corners.len() - 1 {
                    out.faces.extend([corners[0], corners[k], corners[k + 1]]);
                }
            }
            _ => {}
        }
    }

    log::debug!(
        "obj: {} positions, {} normals, {} texcoords, {} triangles",
        out.arrays.positions.len(),
        out.arrays.normals.len(),
        out.arrays.tex_coords.len(),
        out.triangle_count()
    );

    Ok(out)
}

fn parse_err(line: usize, message: impl Into<String>) -> RenderError {
    RenderError::MeshParse {
        line,
        message: message.into(),
    }
}

/// Reads `N` floats, tolerating up to `max` fields.
fn floats<'a, const N: usize>(
    fields: impl Iterator<Item = &'a str>,
    line: usize,
    max: usize,
) -> Result<[f32; N]> {
    let mut out = [0.0; N];
    let mut count = 0;
    for field in fields {
        let value: f32 = field
            .parse()
            .map_err(|_| parse_err(line, format!("`{field}` is not a number")))?;
        if count < N {
            out[count] = value;
        }
        count += 1;
    }
    if count < N || count > max {
        let expected = if N == max {
            format!("{N}")
        } else {
            format!("{N} to {max}")
        };
        return Err(parse_err(line, format!("expected {expected} numbers, got {count}")));
    }
    Ok(out)
}

/// `p`, `p/t`, `p//n` or `p/t/n`.
fn corner(token: &str, arrays: &RawGeometryArrays, line: usize) -> Result<FaceVertexRef> {
    let mut parts = token.split('/');
    let position = parts.next().unwrap_or("");
    let tex_coord = parts.next().filter(|s| !s.is_empty());
    let normal = parts.next().filter(|s| !s.is_empty());
    if parts.next().is_some() || position.is_empty() {
        return Err(parse_err(line, format!("malformed face vertex `{token}`")));
    }

    Ok(FaceVertexRef {
        position: resolve(position, arrays.positions.len(), line)?,
        normal: normal
            .map(|n| resolve(n, arrays.normals.len(), line))
            .transpose()?,
        tex_coord: tex_coord
            .map(|t| resolve(t, arrays.tex_coords.len(), line))
            .transpose()?,
    })
}

/// Converts an OBJ index to 0-based. Positive indices past the end are left
/// for the packer to reject.
fn resolve(field: &str, len: usize, line: usize) -> Result<u32> {
    let raw: i64 = field
        .parse()
        .map_err(|_| parse_err(line, format!("`{field}` is not an index")))?;
    let resolved = match raw {
        0 => return Err(parse_err(line, "index 0 is not valid in OBJ")),
        r if r > 0 => r - 1,
        r => len as i64 + r,
    };
    u32::try_from(resolved).map_err(|_| {
        let message = if raw > 0 {
            format!("index {raw} exceeds the largest supported index")
        } else {
            format!("index {raw} points before the first element")
        };
        parse_err(line, message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# unit quad
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
s off
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn quad_is_fan_triangulated() {
        let obj = parse(QUAD).unwrap();
        assert_eq!(obj.arrays.positions.len(), 4);
        assert_eq!(obj.triangle_count(), 2);

        let positions: Vec<u32> = obj.faces.iter().map(|f| f.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 0, 2, 3]);
        assert!(obj.faces.iter().all(|f| f.normal == Some(0)));
    }

    #[test]
    fn negative_indices_are_relative() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvt 0 0\nf -3/-1/-1 -2/-1/-1 -1/-1/-1\n";
        let obj = parse(text).unwrap();
        assert_eq!(obj.faces[0], FaceVertexRef::new(0, 0, 0));
        assert_eq!(obj.faces[2], FaceVertexRef::new(2, 0, 0));
    }

    #[test]
    fn missing_components_are_kept_as_none() {
        let obj = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n").unwrap();
        assert_eq!(obj.faces[0].tex_coord, None);
        assert_eq!(obj.faces[0].normal, Some(0));
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = parse("v 0 0 0\nv 1 nope 0\n").unwrap_err();
        assert!(matches!(err, RenderError::MeshParse { line: 2, .. }));

        let err = parse("v 0 0 0\nf 1 1\n").unwrap_err();
        assert!(matches!(err, RenderError::MeshParse { line: 2, .. }));

        let err = parse("f 0 1 2\n").unwrap_err();
        assert!(matches!(err, RenderError::MeshParse { line: 1, .. }));
    }

    #[test]
    fn extra_position_fields_are_dropped() {
        let text = "\
v 0 0 0 1
v 1 0 0 0.5 0.5 0.5
v 0 1 0
vn 0 0 1
vt 0 0
f 1/1/1 2/1/1 3/1/1
";
        let obj = parse(text).unwrap();
        assert_eq!(obj.arrays.positions, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert_eq!(obj.triangle_count(), 1);

        let err = parse("v 0 0 0 1 1 1 1 1\n").unwrap_err();
        assert_eq!(err.to_string(), "mesh parse error at line 1: expected 3 to 7 numbers, got 8");
        let err = parse("vn 0 0 1 0\n").unwrap_err();
        assert_eq!(err.to_string(), "mesh parse error at line 1: expected 3 numbers, got 4");
    }

    #[test]
    fn index_overflow_names_its_direction() {
        let err = parse("v 0 0 0\nf 99999999999 1 1\n").unwrap_err();
        assert!(err.to_string().contains("exceeds the largest supported index"), "{err}");

        let err = parse("v 0 0 0\nf -2 1 1\n").unwrap_err();
        assert!(err.to_string().contains("points before the first element"), "{err}");
    }
}
