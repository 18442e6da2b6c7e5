//! Wavefront OBJ reading and writing.
//!
//! Only the subset the pipeline produces and consumes is understood: `v`
//! positions, `f` polygons and `l` polylines. Texture coordinates, normals,
//! groups and material statements are skipped.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::geom::{GeomMesh, PointCloud};

pub type ObjResult<T> = Result<T, ObjError>;

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: invalid number `{token}`")]
    Number { line: usize, token: String },
    #[error("line {line}: vertex needs three coordinates")]
    ShortVertex { line: usize },
    #[error("line {line}: face needs at least three vertices")]
    ShortFace { line: usize },
    #[error("line {line}: vertex index {index} out of range for {count} vertices")]
    IndexOutOfRange { line: usize, index: i64, count: usize },
    #[error("refusing to write invalid mesh: {0}")]
    InvalidMesh(String),
}

impl ObjError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Raw contents of an OBJ document.
///
/// Faces are already fan-triangulated into zero-based index triples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjDocument {
    pub positions: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,
    /// Number of `l` statements seen.
    pub line_elements: usize,
}

impl ObjDocument {
    #[must_use]
    pub fn has_faces(&self) -> bool {
        !self.triangles.is_empty()
    }
}

/// Writes a triangle mesh as `v` and `f` records with one-based indices.
pub fn write_mesh(path: &Path, mesh: &GeomMesh, name: &str) -> ObjResult<()> {
    mesh.validate().map_err(ObjError::InvalidMesh)?;
    write_with(path, |w| write_mesh_records(w, mesh, name))
}

/// Writes a point cloud as `v` records only.
pub fn write_points(path: &Path, cloud: &PointCloud, name: &str) -> ObjResult<()> {
    write_with(path, |w| write_point_records(w, cloud, name))
}

fn write_with<F>(path: &Path, body: F) -> ObjResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ObjError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| ObjError::io(path, e))?;
    let mut w = BufWriter::new(file);
    body(&mut w)
        .and_then(|()| w.flush())
        .map_err(|e| ObjError::io(path, e))
}

pub fn write_mesh_records<W: Write>(w: &mut W, mesh: &GeomMesh, name: &str) -> io::Result<()> {
    writeln!(w, "# shape3d-engine")?;
    writeln!(w, "o {name}")?;
    for p in &mesh.positions {
        writeln!(w, "v {} {} {}", p[0], p[1], p[2])?;
    }
    for [a, b, c] in mesh.triangles() {
        writeln!(w, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    Ok(())
}

pub fn write_point_records<W: Write>(w: &mut W, cloud: &PointCloud, name: &str) -> io::Result<()> {
    writeln!(w, "# shape3d-engine")?;
    writeln!(w, "o {name}")?;
    for p in &cloud.points {
        writeln!(w, "v {} {} {}", p[0], p[1], p[2])?;
    }
    Ok(())
}

/// Reads and parses an OBJ file.
pub fn read_file(path: &Path) -> ObjResult<ObjDocument> {
    let text = fs::read_to_string(path).map_err(|e| ObjError::io(path, e))?;
    parse_str(&text)
}

/// Parses OBJ text.
///
/// Face indices may be negative (relative to the vertices read so far) and
/// may carry `/vt/vn` suffixes, which are ignored.
pub fn parse_str(input: &str) -> ObjResult<ObjDocument> {
    let mut doc = ObjDocument::default();

    for (line_index, raw) in input.lines().enumerate() {
        let line = line_index + 1;
        let content = raw.split('#').next().unwrap_or_default();
        let mut tokens = content.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let coords = tokens
                    .take(3)
                    .map(|t| parse_number(t, line))
                    .collect::<ObjResult<Vec<f64>>>()?;
                let [x, y, z] = coords.as_slice() else {
                    return Err(ObjError::ShortVertex { line });
                };
                doc.positions.push([*x, *y, *z]);
            }
            Some("f") => {
                let polygon = tokens
                    .map(|t| resolve_index(t, line, doc.positions.len()))
                    .collect::<ObjResult<Vec<u32>>>()?;
                if polygon.len() < 3 {
                    return Err(ObjError::ShortFace { line });
                }
                for k in 1..polygon.len() - 1 {
                    doc.triangles.push([polygon[0], polygon[k], polygon[k + 1]]);
                }
            }
            Some("l") => doc.line_elements += 1,
            _ => {}
        }
    }

    Ok(doc)
}

fn parse_number(token: &str, line: usize) -> ObjResult<f64> {
    token.parse().map_err(|_| ObjError::Number {
        line,
        token: token.to_owned(),
    })
}

fn resolve_index(token: &str, line: usize, count: usize) -> ObjResult<u32> {
    let head = token.split('/').next().unwrap_or_default();
    let index: i64 = head.parse().map_err(|_| ObjError::Number {
        line,
        token: token.to_owned(),
    })?;
    let out_of_range = || ObjError::IndexOutOfRange { line, index, count };

    let count_i = i64::try_from(count).map_err(|_| out_of_range())?;
    let zero_based = match index {
        i if i > 0 => i - 1,
        i if i < 0 => count_i + i,
        _ => return Err(out_of_range()),
    };
    if !(0..count_i).contains(&zero_based) {
        return Err(out_of_range());
    }
    u32::try_from(zero_based).map_err(|_| out_of_range())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vertices_and_faces() {
        let doc = parse_str(
            "# comment\no tri\nv 0 0 0\nv 1 0 0\nv 0 1 0 1.0\nvn 0 0 1\nf 1 2 3\n",
        )
        .unwrap();
        assert_eq!(doc.positions.len(), 3);
        assert_eq!(doc.positions[2], [0.0, 1.0, 0.0]);
        assert_eq!(doc.triangles, vec![[0, 1, 2]]);
    }

    #[test]
    fn quads_are_fan_triangulated() {
        let doc = parse_str("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1/1/1 2/2/1 3/3/1 4/4/1\n").unwrap();
        assert_eq!(doc.triangles, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn negative_indices_are_relative() {
        let doc = parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(doc.triangles, vec![[0, 1, 2]]);
    }

    #[test]
    fn out_of_range_index_reports_line() {
        let err = parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\n\nf 1 2 9\n").unwrap_err();
        assert!(matches!(
            err,
            ObjError::IndexOutOfRange {
                line: 5,
                index: 9,
                count: 3
            }
        ));
        assert!(matches!(
            parse_str("v 0 0 0\nf 0 1 1\n"),
            Err(ObjError::IndexOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn malformed_records_are_rejected() {
        assert!(matches!(
            parse_str("v 1 2\n"),
            Err(ObjError::ShortVertex { line: 1 })
        ));
        assert!(matches!(
            parse_str("v 1 2 3\nv 1 x 3\n"),
            Err(ObjError::Number { line: 2, .. })
        ));
        assert!(matches!(
            parse_str("v 0 0 0\nv 1 0 0\nf 1 2\n"),
            Err(ObjError::ShortFace { line: 3 })
        ));
    }

    #[test]
    fn polylines_are_counted_not_meshed() {
        let doc = parse_str("v 0 0 0\nv 1 0 0\nl 1 2\n").unwrap();
        assert_eq!(doc.line_elements, 1);
        assert!(!doc.has_faces());
    }

    #[test]
    fn mesh_records_use_one_based_indices() {
        let mesh = GeomMesh::new(vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], vec![0, 1, 2]);
        let mut out = Vec::new();
        write_mesh_records(&mut out, &mesh, "tri").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("o tri\n"));
        assert!(text.contains("v 1 0 0\n"));
        assert!(text.ends_with("f 1 2 3\n"));
    }

    #[test]
    fn point_records_have_no_faces() {
        let cloud = PointCloud::new(vec![[0.5, 0.25, 0.1], [2.0, 3.0, 0.05]]);
        let mut out = Vec::new();
        write_point_records(&mut out, &cloud, "cloud").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.lines().any(|l| l.starts_with("f ")));
        let doc = parse_str(&text).unwrap();
        assert_eq!(doc.positions, cloud.points);
    }

    #[test]
    fn write_mesh_rejects_dangling_indices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.obj");
        let mesh = GeomMesh::new(vec![[0.0; 3]], vec![0, 1, 2]);
        assert!(matches!(
            write_mesh(&path, &mesh, "bad"),
            Err(ObjError::InvalidMesh(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quad.obj");
        let mesh = GeomMesh::new(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            vec![0, 1, 2, 0, 2, 3],
        );
        write_mesh(&path, &mesh, "quad").unwrap();
        let doc = read_file(&path).unwrap();
        assert_eq!(doc.positions, mesh.positions);
        assert_eq!(doc.triangles, mesh.triangles().collect::<Vec<_>>());
    }
}
