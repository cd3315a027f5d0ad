use crate::core::models::atom::{AtomRecord, AtomSphere};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Residue name that matches any residue in a lookup table.
pub const GENERIC_RESIDUE_NAME: &str = "???";

#[derive(Debug, Error)]
pub enum RadiusLookupError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Default van der Waals radius may not be negative (got {0})")]
    NegativeDefault(f64),
    #[error("Van der Waals radius for atom '{atom_name}' in residue '{residue_name}' is negative ({radius})")]
    NegativeRecord {
        atom_name: String,
        residue_name: String,
        radius: f64,
    },
    #[error(
        "Could not find van der Waals radius for atom '{atom_name}' in residue '{residue_name}' and no default radius is set"
    )]
    NotFound {
        atom_name: String,
        residue_name: String,
    },
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct VdwRadiusRecord {
    #[serde(rename = "atomname")]
    pub atom_name: String,
    #[serde(rename = "resname")]
    pub residue_name: String,
    #[serde(rename = "vdwr")]
    pub radius: f64,
}

#[derive(Debug, Deserialize)]
struct VdwRadiusTable {
    #[serde(rename = "vdwradii")]
    records: Vec<VdwRadiusRecord>,
}

/// Resolves van der Waals radii from a table of `(atom name, residue name)` records.
///
/// Lookups try, in order: the exact atom and residue name, the atom name with
/// the generic residue `"???"`, the same two rules with the upper-cased element
/// symbol in place of the atom name, and finally the default radius.
#[derive(Debug, Clone, Default)]
pub struct VdwRadiusProvider {
    records: Vec<VdwRadiusRecord>,
    default_radius: Option<f64>,
}

impl VdwRadiusProvider {
    pub fn new(records: Vec<VdwRadiusRecord>) -> Result<Self, RadiusLookupError> {
        if let Some(bad) = records.iter().find(|r| !(r.radius >= 0.0)) {
            return Err(RadiusLookupError::NegativeRecord {
                atom_name: bad.atom_name.clone(),
                residue_name: bad.residue_name.clone(),
                radius: bad.radius,
            });
        }
        Ok(Self {
            records,
            default_radius: None,
        })
    }

    pub fn load(path: &Path) -> Result<Self, RadiusLookupError> {
        let content = std::fs::read_to_string(path).map_err(|e| RadiusLookupError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let table: VdwRadiusTable =
            toml::from_str(&content).map_err(|e| RadiusLookupError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        debug!(
            num_records = table.records.len(),
            "Loaded van der Waals radius table from {:?}", path
        );
        Self::new(table.records)
    }

    pub fn with_default_radius(mut self, radius: f64) -> Result<Self, RadiusLookupError> {
        if !(radius >= 0.0) {
            return Err(RadiusLookupError::NegativeDefault(radius));
        }
        self.default_radius = Some(radius);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn radius_for(
        &self,
        atom_name: &str,
        residue_name: &str,
        element: &str,
    ) -> Result<f64, RadiusLookupError> {
        let element = element.trim().to_ascii_uppercase();

        self.match_name(atom_name, residue_name)
            .or_else(|| {
                if element.is_empty() {
                    None
                } else {
                    self.match_name(&element, residue_name)
                }
            })
            .or(self.default_radius)
            .ok_or_else(|| RadiusLookupError::NotFound {
                atom_name: atom_name.to_string(),
                residue_name: residue_name.to_string(),
            })
    }

    /// Turns a frame of atom records into spheres, keeping explicit radii.
    pub fn resolve(&self, records: &[AtomRecord]) -> Result<Vec<AtomSphere>, RadiusLookupError> {
        records
            .iter()
            .map(|record| {
                let radius = match record.radius {
                    Some(radius) => radius,
                    None => self.radius_for(&record.name, &record.residue_name, &record.element)?,
                };
                Ok(AtomSphere::new(record.position, radius))
            })
            .collect()
    }

    fn match_name(&self, atom_name: &str, residue_name: &str) -> Option<f64> {
        let mut generic = None;
        for record in self.records.iter().filter(|r| r.atom_name == atom_name) {
            if record.residue_name == residue_name {
                return Some(record.radius);
            }
            if generic.is_none() && record.residue_name == GENERIC_RESIDUE_NAME {
                generic = Some(record.radius);
            }
        }
        generic
    }
}
