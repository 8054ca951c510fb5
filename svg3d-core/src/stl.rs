//! STL loading for binary and ASCII files.
//!
//! Both formats produce non-indexed geometry: three vertices per facet, each
//! carrying the facet normal.

use std::path::Path;

use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{multispace0, multispace1},
    multi::many0,
    number::complete::float,
    sequence::preceded,
    IResult,
};

use crate::error::{Error, Result};
use crate::geometry::{BufferAttribute, BufferGeometry, NORMAL, POSITION};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

type Vec3 = (f32, f32, f32);

struct Facet {
    normal: Vec3,
    vertices: [Vec3; 3],
}

fn build_geometry(facets: &[Facet]) -> BufferGeometry {
    let mut positions = Vec::with_capacity(facets.len() * 9);
    let mut normals = Vec::with_capacity(facets.len() * 9);
    for facet in facets {
        let (nx, ny, nz) = facet.normal;
        for &(x, y, z) in &facet.vertices {
            positions.extend_from_slice(&[x, y, z]);
            normals.extend_from_slice(&[nx, ny, nz]);
        }
    }
    BufferGeometry::new()
        .with_attribute(POSITION, BufferAttribute::packed(positions, 3))
        .with_attribute(NORMAL, BufferAttribute::packed(normals, 3))
}

fn read_vec3(bytes: &[u8]) -> Vec3 {
    let f = |i: usize| f32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
    (f(0), f(4), f(8))
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<BufferGeometry> {
    if data.len() < HEADER_LEN + 4 {
        return Err(Error::Stl("file too small to be a valid STL".to_string()));
    }

    let data = &data[HEADER_LEN..];
    let triangle_count = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let body = &data[4..];

    let needed = triangle_count
        .checked_mul(FACET_LEN)
        .ok_or_else(|| Error::Stl(format!("triangle count {triangle_count} overflows")))?;
    if body.len() < needed {
        return Err(Error::Stl(format!(
            "unexpected end of file: {triangle_count} facets need {needed} bytes, found {}",
            body.len()
        )));
    }

    let facets: Vec<Facet> = body
        .chunks_exact(FACET_LEN)
        .take(triangle_count)
        .map(|chunk| Facet {
            normal: read_vec3(&chunk[0..12]),
            // trailing 2-byte attribute count is ignored
            vertices: [
                read_vec3(&chunk[12..24]),
                read_vec3(&chunk[24..36]),
                read_vec3(&chunk[36..48]),
            ],
        })
        .collect();

    tracing::debug!("parsed binary STL with {} facets", facets.len());
    Ok(build_geometry(&facets))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<BufferGeometry> {
    match parse_solid(input) {
        Ok((_, facets)) => {
            tracing::debug!("parsed ASCII STL with {} facets", facets.len());
            Ok(build_geometry(&facets))
        }
        Err(e) => Err(Error::Stl(format!("failed to parse ASCII STL: {e:?}"))),
    }
}

fn parse_solid(input: &str) -> IResult<&str, Vec<Facet>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    // optional name, up to the end of the line
    let (input, _) = take_till(|c| c == '\n')(input)?;
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    Ok((input, facets))
}

fn parse_facet(input: &str) -> IResult<&str, Facet> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, v3) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((
        input,
        Facet {
            normal,
            vertices: [v1, v2, v3],
        },
    ))
}

fn parse_vertex(input: &str) -> IResult<&str, Vec3> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    parse_vector3(input)
}

fn parse_vector3(input: &str) -> IResult<&str, Vec3> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, (x, y, z)))
}

/// Detect and parse STL data (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<BufferGeometry> {
    // Binary files may also start with "solid", so fall back on failure
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            match parse_ascii_stl(text) {
                Ok(geometry) => return Ok(geometry),
                Err(e) => tracing::debug!("not ASCII STL, trying binary: {e}"),
            }
        }
    }

    parse_binary_stl(data)
}

/// Read and parse an STL file from disk.
pub fn load_stl(path: impl AsRef<Path>) -> Result<BufferGeometry> {
    let data = std::fs::read(path)?;
    parse_stl(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASCII_TRIANGLE: &str = "solid tri
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid tri
";

    fn binary_stl(facets: &[[f32; 12]]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data.extend_from_slice(&(facets.len() as u32).to_le_bytes());
        for facet in facets {
            for value in facet {
                data.extend_from_slice(&value.to_le_bytes());
            }
            data.extend_from_slice(&0u16.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_parse_binary_header() {
        let data = binary_stl(&[]);
        let geometry = parse_binary_stl(&data).unwrap();
        assert_eq!(geometry.position().unwrap().count(), 0);
        assert_eq!(geometry.triangles().count(), 0);
    }

    #[test]
    fn test_parse_binary_facet() {
        let data = binary_stl(&[[0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]]);
        let geometry = parse_stl(&data).unwrap();
        assert!(geometry.index().is_none());
        assert_eq!(geometry.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);
        assert_eq!(geometry.position().unwrap().get(1), Some(&[1.0, 0.0, 0.0][..]));
        assert_eq!(geometry.normal().unwrap().get(2), Some(&[0.0, 0.0, 1.0][..]));
    }

    #[test]
    fn test_binary_truncated() {
        let mut data = binary_stl(&[[0.0; 12]]);
        data.truncate(data.len() - 10);
        assert!(matches!(parse_binary_stl(&data), Err(Error::Stl(_))));
        assert!(matches!(parse_binary_stl(&[0u8; 10]), Err(Error::Stl(_))));
    }

    #[test]
    fn test_parse_ascii() {
        let geometry = parse_stl(ASCII_TRIANGLE.as_bytes()).unwrap();
        assert_eq!(geometry.position().unwrap().count(), 3);
        assert_eq!(geometry.position().unwrap().get(2), Some(&[0.0, 1.0, 0.0][..]));
        assert_eq!(geometry.normal().unwrap().get(0), Some(&[0.0, 0.0, 1.0][..]));
    }

    #[test]
    fn test_ascii_garbage() {
        assert!(parse_ascii_stl("solid x\n facet nonsense").is_err());
    }
}
