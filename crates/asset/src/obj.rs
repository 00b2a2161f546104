//! Minimal OBJ importer producing a flat (non-indexed) triangle vertex list.
//!
//! Supported records: `v x y z`, `vt u v`, `vn x y z` and triangular
//! `f P/T/N P/T/N P/T/N` faces with 1-based indices. Everything else is ignored.
//!
//! Nothing here is fatal: a bad record or face corner is skipped, a
//! [`Diagnostic`] is recorded and logged, and parsing goes on. Face indices are
//! checked against the attribute tables *as read so far*, so a face can only
//! reference `v`/`vt`/`vn` lines that appear above it.

use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
    str::SplitWhitespace,
};

use log::{debug, info, warn};
use thiserror::Error;

use crate::mesh::Vertex;

/// Record tag a diagnostic refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum RecordKind {
    Position,
    TexCoord,
    Normal,
    Face,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Position => "v",
            RecordKind::TexCoord => "vt",
            RecordKind::Normal => "vn",
            RecordKind::Face => "f",
        })
    }
}

/// Attribute table a face corner indexes into.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Attribute {
    Position,
    TexCoord,
    Normal,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Attribute::Position => "position",
            Attribute::TexCoord => "texcoord",
            Attribute::Normal => "normal",
        })
    }
}

/// Recoverable problem found while importing.
#[derive(Debug, Error)]
pub enum ImportIssue {
    #[error("Cannot open OBJ file {}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read OBJ data: {source}")]
    Io {
        #[source]
        source: io::Error,
    },

    #[error("Malformed '{record}' record: {detail}")]
    MalformedRecord { record: RecordKind, detail: String },

    /// `index` is the raw 1-based value from the file.
    #[error("Face {attribute} index {index} out of range (len={len})")]
    IndexOutOfRange {
        attribute: Attribute,
        index: i64,
        len: usize,
    },
}

/// An [`ImportIssue`] tagged with the 1-based line it came from (0 = whole file).
#[derive(Debug)]
pub struct Diagnostic {
    pub line: usize,
    pub issue: ImportIssue,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.issue)
        } else {
            write!(f, "line {}: {}", self.line, self.issue)
        }
    }
}

/// Counters for one import call.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ImportStats {
    pub positions: usize,
    pub tex_coords: usize,
    pub normals: usize,
    pub faces: usize,
    pub vertices: usize,
    pub malformed_records: usize,
    pub out_of_range: usize,
    pub io_errors: usize,
}

impl ImportStats {
    /// Face corners that did not make it into the output.
    pub fn dropped_corners(&self) -> usize {
        (self.faces * 3).saturating_sub(self.vertices)
    }

    pub fn diagnostics(&self) -> usize {
        self.malformed_records + self.out_of_range + self.io_errors
    }
}

/// Result of an import: the flat vertex list plus everything that was skipped.
#[derive(Debug, Default)]
pub struct ObjImport {
    pub vertices: Vec<Vertex>,
    pub diagnostics: Vec<Diagnostic>,
    stats: ImportStats,
}

impl ObjImport {
    pub fn stats(&self) -> ImportStats {
        self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn into_vertices(self) -> Vec<Vertex> {
        self.vertices
    }
}

/// Import an OBJ file into a flat vertex list. Returns an empty list if the
/// file cannot be opened; the caller decides whether that is fatal.
pub fn import(path: impl AsRef<Path>) -> Vec<Vertex> {
    import_with_report(path).into_vertices()
}

/// Like [`import`], but also returns diagnostics and counters.
pub fn import_with_report(path: impl AsRef<Path>) -> ObjImport {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(source) => {
            let mut parser = ObjParser::default();
            parser.record(
                0,
                ImportIssue::FileNotFound {
                    path: path.to_path_buf(),
                    source,
                },
            );
            return parser.finish();
        }
    };

    let import = parse_reader(BufReader::new(file));
    info!(
        "Loaded OBJ file {}: {} vertices, {} diagnostics",
        path.display(),
        import.vertices.len(),
        import.diagnostics.len()
    );
    import
}

/// Parse OBJ data from any [`BufRead`] implementation.
pub fn parse_reader<R: BufRead>(mut reader: R) -> ObjImport {
    let mut parser = ObjParser::default();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                line_no += 1;
                parser.parse_line(line_no, &String::from_utf8_lossy(&buf));
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                parser.record(line_no + 1, ImportIssue::Io { source });
                break;
            }
        }
    }

    parser.finish()
}

/// Convenience helper to parse an OBJ string literal.
pub fn parse_str(contents: &str) -> ObjImport {
    parse_reader(io::Cursor::new(contents))
}

/// Bounds-checked, 0-based corner waiting for resolution.
#[derive(Clone, Copy, Debug)]
struct FaceCorner {
    line: usize,
    position: usize,
    tex_coord: usize,
    normal: usize,
}

#[derive(Default)]
struct ObjParser {
    positions: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    corners: Vec<FaceCorner>,
    diagnostics: Vec<Diagnostic>,
    stats: ImportStats,
}

impl ObjParser {
    fn parse_line(&mut self, line_no: usize, line: &str) {
        let mut parts = line.split_whitespace();
        let Some(tag) = parts.next() else {
            return;
        };

        match tag {
            "v" => match parse_floats::<3>(&mut parts) {
                Ok(p) => self.positions.push(p),
                Err(detail) => self.malformed(line_no, RecordKind::Position, detail),
            },
            "vt" => match parse_floats::<2>(&mut parts) {
                Ok(t) => self.tex_coords.push(t),
                Err(detail) => self.malformed(line_no, RecordKind::TexCoord, detail),
            },
            "vn" => match parse_floats::<3>(&mut parts) {
                Ok(n) => self.normals.push(n),
                Err(detail) => self.malformed(line_no, RecordKind::Normal, detail),
            },
            "f" => self.parse_face(line_no, parts),
            _ => {
                // Comments, o/g/s/usemtl/mtllib etc.
            }
        }
    }

    fn parse_face(&mut self, line_no: usize, parts: SplitWhitespace<'_>) {
        self.stats.faces += 1;
        let groups: Vec<&str> = parts.collect();
        if groups.len() > 3 {
            debug!(
                "line {}: face has {} corners, only the first 3 are used",
                line_no,
                groups.len()
            );
        }

        for slot in 0..3 {
            let Some(group) = groups.get(slot) else {
                self.malformed(
                    line_no,
                    RecordKind::Face,
                    format!("corner {} is missing", slot + 1),
                );
                continue;
            };

            let raw = match parse_corner(group) {
                Ok(raw) => raw,
                Err(detail) => {
                    self.malformed(line_no, RecordKind::Face, detail);
                    continue;
                }
            };

            match self.check_corner(line_no, raw) {
                Ok(corner) => self.corners.push(corner),
                Err(issue) => self.record(line_no, issue),
            }
        }
    }

    /// Convert to 0-based and check against the tables read so far.
    fn check_corner(&self, line: usize, [p, t, n]: [i64; 3]) -> Result<FaceCorner, ImportIssue> {
        Ok(FaceCorner {
            line,
            position: to_index(p, Attribute::Position, self.positions.len())?,
            tex_coord: to_index(t, Attribute::TexCoord, self.tex_coords.len())?,
            normal: to_index(n, Attribute::Normal, self.normals.len())?,
        })
    }

    fn resolve(&self, corner: &FaceCorner) -> Result<Vertex, ImportIssue> {
        let out_of_range = |attribute, index: usize, len| ImportIssue::IndexOutOfRange {
            attribute,
            index: index as i64 + 1,
            len,
        };

        let position = self
            .positions
            .get(corner.position)
            .copied()
            .ok_or_else(|| out_of_range(Attribute::Position, corner.position, self.positions.len()))?;
        let tex_coord = self
            .tex_coords
            .get(corner.tex_coord)
            .copied()
            .ok_or_else(|| out_of_range(Attribute::TexCoord, corner.tex_coord, self.tex_coords.len()))?;
        let normal = self
            .normals
            .get(corner.normal)
            .copied()
            .ok_or_else(|| out_of_range(Attribute::Normal, corner.normal, self.normals.len()))?;

        Ok(Vertex::new(position, tex_coord, normal))
    }

    fn malformed(&mut self, line: usize, record: RecordKind, detail: String) {
        self.record(line, ImportIssue::MalformedRecord { record, detail });
    }

    fn record(&mut self, line: usize, issue: ImportIssue) {
        match issue {
            ImportIssue::FileNotFound { .. } | ImportIssue::Io { .. } => self.stats.io_errors += 1,
            ImportIssue::MalformedRecord { .. } => self.stats.malformed_records += 1,
            ImportIssue::IndexOutOfRange { .. } => self.stats.out_of_range += 1,
        }
        let diagnostic = Diagnostic { line, issue };
        warn!("OBJ: {}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn finish(mut self) -> ObjImport {
        let corners = std::mem::take(&mut self.corners);
        let mut vertices = Vec::with_capacity(corners.len());
        for corner in &corners {
            match self.resolve(corner) {
                Ok(vertex) => vertices.push(vertex),
                Err(issue) => self.record(corner.line, issue),
            }
        }

        self.stats.positions = self.positions.len();
        self.stats.tex_coords = self.tex_coords.len();
        self.stats.normals = self.normals.len();
        self.stats.vertices = vertices.len();

        ObjImport {
            vertices,
            diagnostics: self.diagnostics,
            stats: self.stats,
        }
    }
}

fn parse_floats<const N: usize>(parts: &mut SplitWhitespace<'_>) -> Result<[f32; N], String> {
    let mut out = [0.0; N];
    for (i, slot) in out.iter_mut().enumerate() {
        let token = parts
            .next()
            .ok_or_else(|| format!("expected {} values, found {}", N, i))?;
        *slot = token
            .parse::<f32>()
            .map_err(|_| format!("'{}' is not a number", token))?;
    }
    Ok(out)
}

/// Split a `P/T/N` group into its three raw (1-based) indices.
fn parse_corner(group: &str) -> Result<[i64; 3], String> {
    let fields: Vec<&str> = group.split('/').collect();
    if fields.len() != 3 {
        return Err(format!("corner '{}' is not of the form P/T/N", group));
    }

    let mut out = [0i64; 3];
    for (slot, field) in out.iter_mut().zip(&fields) {
        *slot = field
            .parse::<i64>()
            .map_err(|_| format!("corner '{}' has invalid index '{}'", group, field))?;
    }
    Ok(out)
}

fn to_index(raw: i64, attribute: Attribute, len: usize) -> Result<usize, ImportIssue> {
    match usize::try_from(raw) {
        Ok(one_based) if one_based >= 1 && one_based <= len => Ok(one_based - 1),
        _ => Err(ImportIssue::IndexOutOfRange {
            attribute,
            index: raw,
            len,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = r#"
        # two triangles sharing an edge
        o quad
        v 0.0 0.0 0.0
        v 1.0 0.0 0.0
        v 1.0 1.0 0.0
        v 0.0 1.0 0.0
        vt 0.0 0.0
        vt 1.0 0.0
        vt 1.0 1.0
        vt 0.0 1.0
        vn 0.0 0.0 1.0
        vn 0.0 0.0 2.0
        vn 0.0 1.0 0.0
        vn 1.0 0.0 0.0
        usemtl none
        f 1/1/1 2/2/2 3/3/3
        f 1/1/1 3/3/3 4/4/4
    "#;

    #[test]
    fn parse_two_triangles() {
        let import = parse_str(QUAD);
        assert!(import.diagnostics.is_empty(), "{:?}", import.diagnostics);
        assert_eq!(import.vertices.len(), 6);

        let v = &import.vertices;
        assert_eq!(v[0], Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0], [0.0, 0.0, 1.0]));
        assert_eq!(v[1], Vertex::new([1.0, 0.0, 0.0], [1.0, 0.0], [0.0, 0.0, 2.0]));
        assert_eq!(v[2], Vertex::new([1.0, 1.0, 0.0], [1.0, 1.0], [0.0, 1.0, 0.0]));
        assert_eq!(v[3], v[0]);
        assert_eq!(v[4], v[2]);
        assert_eq!(v[5], Vertex::new([0.0, 1.0, 0.0], [0.0, 1.0], [1.0, 0.0, 0.0]));

        let stats = import.stats();
        assert_eq!(stats.positions, 4);
        assert_eq!(stats.tex_coords, 4);
        assert_eq!(stats.normals, 4);
        assert_eq!(stats.faces, 2);
        assert_eq!(stats.dropped_corners(), 0);
    }

    #[test]
    fn short_attribute_lines_do_not_shift_indices() {
        let src = "\
v 9.0 9.0
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.5
vt 0.0 0.0
vn 0.0 zero 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/1/1 3/1/1
";
        let import = parse_str(src);
        assert_eq!(import.vertices.len(), 3);
        assert_eq!(import.vertices[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(import.vertices[2].position, [0.0, 1.0, 0.0]);
        assert_eq!(import.stats().malformed_records, 3);

        let lines: Vec<usize> = import.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![1, 5, 7]);
        assert!(matches!(
            import.diagnostics[0].issue,
            ImportIssue::MalformedRecord {
                record: RecordKind::Position,
                ..
            }
        ));
    }

    #[test]
    fn forward_references_are_dropped() {
        let src = "\
v 0 0 0
v 1 0 0
vt 0 0
vn 0 0 1
f 1/1/1 2/1/1 3/1/1
v 0 1 0
f 1/1/1 2/1/1 3/1/1
";
        let import = parse_str(src);
        // First face loses its third corner, second face is complete.
        assert_eq!(import.vertices.len(), 5);
        assert_eq!(import.stats().out_of_range, 1);
        let d = &import.diagnostics[0];
        assert_eq!(d.line, 5);
        assert!(matches!(
            d.issue,
            ImportIssue::IndexOutOfRange {
                attribute: Attribute::Position,
                index: 3,
                len: 2
            }
        ));
    }

    #[test]
    fn malformed_corner_skips_only_that_corner() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vn 0 0 1
f 1/1/1 2//1 3/1/1
f 1/1 2/1/1 3/1/1/1
f 1/x/1 2/1/1
";
        let import = parse_str(src);
        assert_eq!(import.vertices.len(), 4);
        assert_eq!(import.vertices[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(import.vertices[1].position, [0.0, 1.0, 0.0]);
        assert_eq!(import.vertices[2].position, [1.0, 0.0, 0.0]);
        assert_eq!(import.vertices[3].position, [1.0, 0.0, 0.0]);
        // 2//1, 1/1, 3/1/1/1, 1/x/1 and the missing third corner.
        assert_eq!(import.stats().malformed_records, 5);
        assert_eq!(import.stats().dropped_corners(), 5);
    }

    #[test]
    fn zero_and_negative_indices_are_out_of_range() {
        let src = "\
v 0 0 0
vt 0 0
vn 0 0 1
f 0/1/1 -1/1/1 1/1/1
f 1/1/2 1/2/1 1/1/1
";
        let import = parse_str(src);
        assert_eq!(import.vertices.len(), 2);
        assert_eq!(import.stats().out_of_range, 4);
        let attrs: Vec<Attribute> = import
            .diagnostics
            .iter()
            .filter_map(|d| match d.issue {
                ImportIssue::IndexOutOfRange { attribute, .. } => Some(attribute),
                _ => None,
            })
            .collect();
        assert_eq!(
            attrs,
            vec![
                Attribute::Position,
                Attribute::Position,
                Attribute::Normal,
                Attribute::TexCoord
            ]
        );
    }

    #[test]
    fn extra_face_corners_are_ignored() {
        let src = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vn 0 0 1
f 1/1/1 2/1/1 3/1/1 4/1/1
";
        let import = parse_str(src);
        assert_eq!(import.vertices.len(), 3);
        assert!(import.diagnostics.is_empty());
    }

    #[test]
    fn unknown_records_and_crlf_are_tolerated() {
        let src = "mtllib a.mtl\r\ns off\r\n\r\nv 1 2 3 1.0\r\nvt 0.25 0.75 0.0\r\nvn 0 1 0\r\nf 1/1/1 1/1/1 1/1/1\r\n";
        let import = parse_str(src);
        assert!(import.diagnostics.is_empty());
        assert_eq!(import.vertices.len(), 3);
        assert_eq!(
            import.vertices[0],
            Vertex::new([1.0, 2.0, 3.0], [0.25, 0.75], [0.0, 1.0, 0.0])
        );
    }

    #[test]
    fn invalid_utf8_line_does_not_stop_parsing() {
        let mut bytes = b"v 0 0 0\n# caf\xe9\nvt 0 0\nvn 0 0 1\n".to_vec();
        bytes.extend_from_slice(b"f 1/1/1 1/1/1 1/1/1\n");
        let import = parse_reader(io::Cursor::new(bytes));
        assert_eq!(import.vertices.len(), 3);
        assert!(import.diagnostics.is_empty());
    }

    #[test]
    fn missing_file_yields_empty_result() {
        let import = import_with_report("definitely/not/here.obj");
        assert!(import.is_empty());
        assert_eq!(import.stats().io_errors, 1);
        assert_eq!(import.diagnostics[0].line, 0);
        assert!(matches!(
            import.diagnostics[0].issue,
            ImportIssue::FileNotFound { .. }
        ));
    }

    #[test]
    fn diagnostic_display_includes_line() {
        let import = parse_str("v 1 2\n");
        let text = import.diagnostics[0].to_string();
        assert!(text.starts_with("line 1:"), "{text}");
        assert!(text.contains("'v'"), "{text}");
    }
}
