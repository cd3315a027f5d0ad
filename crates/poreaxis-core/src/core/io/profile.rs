use crate::core::path::ProfileSample;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ProfileRow {
    s: f64,
    x: f64,
    y: f64,
    z: f64,
    radius: f64,
}

impl From<&ProfileSample> for ProfileRow {
    fn from(sample: &ProfileSample) -> Self {
        Self {
            s: sample.arclength,
            x: sample.position.x,
            y: sample.position.y,
            z: sample.position.z,
            radius: sample.radius,
        }
    }
}

/// Writes a resampled path profile as CSV with the header `s,x,y,z,radius`.
pub fn write_profile<W: Write>(samples: &[ProfileSample], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for sample in samples {
        csv_writer.serialize(ProfileRow::from(sample))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_profile_to_path<P: AsRef<Path>>(
    samples: &[ProfileSample],
    path: P,
) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path)?;
    write_profile(samples, std::io::BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn writes_header_and_rows() {
        let samples = vec![
            ProfileSample {
                arclength: 0.0,
                position: Point3::new(0.0, 0.0, -1.0),
                radius: 1.5,
            },
            ProfileSample {
                arclength: 1.0,
                position: Point3::new(0.0, 0.0, 0.0),
                radius: 2.0,
            },
        ];
        let mut buffer = Vec::new();
        write_profile(&samples, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "s,x,y,z,radius");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "1.0,0.0,0.0,0.0,2.0");
    }

    #[test]
    fn writes_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.csv");
        let samples = vec![ProfileSample {
            arclength: 0.5,
            position: Point3::new(1.0, 2.0, 3.0),
            radius: 0.25,
        }];
        write_profile_to_path(&samples, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("s,x,y,z,radius"));
        assert!(text.contains("0.5,1.0,2.0,3.0,0.25"));
    }
}
