//! codec::off
//!
//! ASCII OFF reader.
//!
//! ```text
//! OFF
//! <vertex count> <face count> <edge count>
//! x y z            (one line per vertex)
//! n i0 i1 ... in-1 (one line per face)
//! ```
//!
//! `#` starts a comment. Polygons with more than three corners are
//! fan-triangulated around their first corner.

use super::{CodecError, GeometryCodec, MeshData};

#[derive(Debug, Clone, Copy, Default)]
pub struct OffCodec;

fn err(message: impl Into<String>) -> CodecError {
    CodecError::parse("OFF", message)
}

impl GeometryCodec for OffCodec {
    fn name(&self) -> &'static str {
        "OFF"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["off"]
    }

    fn decode(&self, bytes: &[u8]) -> Result<MeshData, CodecError> {
        let text = std::str::from_utf8(bytes).map_err(|e| err(e.to_string()))?;
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(n, line)| (n + 1, line.split('#').next().unwrap_or("").trim()))
            .filter(|(_, line)| !line.is_empty());

        // Header may share its line with the counts ("OFF 8 6 0").
        let (_, header) = lines.next().ok_or_else(|| err("file is empty"))?;
        let mut header_tokens = header.split_whitespace();
        if header_tokens.next() != Some("OFF") {
            return Err(err("missing 'OFF' header"));
        }
        let rest: Vec<&str> = header_tokens.collect();
        let counts: Vec<usize> = if rest.is_empty() {
            let (n, line) = lines.next().ok_or_else(|| err("missing element counts"))?;
            parse_all(line, n)?
        } else {
            parse_all(&rest.join(" "), 1)?
        };
        let (vertex_count, face_count) = match counts.as_slice() {
            [v, f, ..] => (*v, *f),
            _ => return Err(err("expected vertex and face counts")),
        };

        // Counts come from the file; never reserve more than the input could hold.
        let mut vertices = Vec::with_capacity(vertex_count.min(bytes.len() / 6));
        for _ in 0..vertex_count {
            let (n, line) = lines
                .next()
                .ok_or_else(|| err(format!("expected {} vertices", vertex_count)))?;
            let coords: Vec<f32> = parse_all(line, n)?;
            match coords.as_slice() {
                [x, y, z, ..] => vertices.push([*x, *y, *z]),
                _ => return Err(err(format!("line {}: vertex needs 3 coordinates", n))),
            }
        }

        let mut faces = Vec::with_capacity(face_count.min(bytes.len() / 6));
        for _ in 0..face_count {
            let (n, line) = lines
                .next()
                .ok_or_else(|| err(format!("expected {} faces", face_count)))?;
            let values: Vec<usize> = parse_all(line, n)?;
            let (&corners, rest) = values
                .split_first()
                .ok_or_else(|| err(format!("line {}: empty face", n)))?;
            if corners < 3 || rest.len() < corners {
                return Err(err(format!("line {}: face needs at least 3 indices", n)));
            }
            let polygon = &rest[..corners];
            for i in 1..corners - 1 {
                faces.push([polygon[0], polygon[i], polygon[i + 1]]);
            }
        }

        Ok(MeshData {
            vertices,
            faces,
            normals: None,
        })
    }
}

fn parse_all<T: std::str::FromStr>(line: &str, line_no: usize) -> Result<Vec<T>, CodecError> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<T>()
                .map_err(|_| err(format!("line {}: cannot parse '{}'", line_no, tok)))
        })
        .collect()
}
