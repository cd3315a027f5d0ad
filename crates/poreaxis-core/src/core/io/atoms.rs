use crate::core::models::atom::AtomRecord;
use nalgebra::Point3;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Line that terminates a frame in a multi-frame atom file.
const FRAME_SEPARATOR: &str = "END";

#[derive(Debug, Error)]
pub enum AtomFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Line {line}: expected 4 columns (x y z r) or 6 columns (name resname element x y z), found {found}")]
    ColumnCount { line: usize, found: usize },
    #[error("Line {line}: invalid number '{value}'")]
    InvalidNumber { line: usize, value: String },
}

/// Reads atom frames from whitespace-separated text.
///
/// Each non-empty, non-comment line holds one atom, either as `x y z r` or as
/// `name resname element x y z`. A line containing only `END` closes the current
/// frame; a trailing frame without `END` is accepted as well.
///
/// # Arguments
///
/// * `reader` - The buffered reader to read from.
///
/// # Return
///
/// The frames in file order. Empty frames are skipped.
///
/// # Errors
///
/// Returns an error if a line has the wrong number of columns or a numeric
/// column cannot be parsed.
pub fn read_frames(reader: &mut impl BufRead) -> Result<Vec<Vec<AtomRecord>>, AtomFileError> {
    let mut frames = Vec::new();
    let mut current = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        if content == FRAME_SEPARATOR {
            if !current.is_empty() {
                frames.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(parse_atom_line(content, line_number)?);
    }
    if !current.is_empty() {
        frames.push(current);
    }

    Ok(frames)
}

pub fn read_frames_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<Vec<AtomRecord>>, AtomFileError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    read_frames(&mut reader)
}

fn parse_atom_line(content: &str, line: usize) -> Result<AtomRecord, AtomFileError> {
    let columns: Vec<&str> = content.split_whitespace().collect();
    let number = |value: &str| -> Result<f64, AtomFileError> {
        value.parse().map_err(|_| AtomFileError::InvalidNumber {
            line,
            value: value.to_string(),
        })
    };

    match columns.as_slice() {
        [x, y, z, r] => Ok(AtomRecord::with_radius(
            Point3::new(number(*x)?, number(*y)?, number(*z)?),
            number(*r)?,
        )),
        [name, residue_name, element, x, y, z] => Ok(AtomRecord::named(
            name,
            residue_name,
            element,
            Point3::new(number(*x)?, number(*y)?, number(*z)?),
        )),
        _ => Err(AtomFileError::ColumnCount {
            line,
            found: columns.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_single_xyzr_frame() {
        let mut reader = Cursor::new("0.0 0.0 -5.0 1.0\n0.0 0.0 5.0 1.5\n");
        let frames = read_frames(&mut reader).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len(), 2);
        assert_eq!(frames[0][1].position, Point3::new(0.0, 0.0, 5.0));
        assert_eq!(frames[0][1].radius, Some(1.5));
    }

    #[test]
    fn reads_named_atoms_without_radius() {
        let mut reader = Cursor::new("CA ALA C 1.0 2.0 3.0\n");
        let frames = read_frames(&mut reader).unwrap();
        let atom = &frames[0][0];
        assert_eq!(atom.name, "CA");
        assert_eq!(atom.residue_name, "ALA");
        assert_eq!(atom.element, "C");
        assert!(atom.radius.is_none());
    }

    #[test]
    fn splits_frames_and_skips_comments() {
        let content = "# frame one\n1 2 3 1\nEND\n\n# frame two\n4 5 6 1 # trailing\n7 8 9 1\nEND\nEND\n";
        let mut reader = Cursor::new(content);
        let frames = read_frames(&mut reader).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].len(), 1);
        assert_eq!(frames[1].len(), 2);
    }

    #[test]
    fn rejects_wrong_column_count() {
        let mut reader = Cursor::new("1 2 3\n");
        let result = read_frames(&mut reader);
        assert!(matches!(
            result,
            Err(AtomFileError::ColumnCount { line: 1, found: 3 })
        ));
    }

    #[test]
    fn rejects_invalid_numbers() {
        let mut reader = Cursor::new("1 2 3 1\n1 two 3 1\n");
        let result = read_frames(&mut reader);
        assert!(matches!(
            result,
            Err(AtomFileError::InvalidNumber { line: 2, .. })
        ));
    }
}
