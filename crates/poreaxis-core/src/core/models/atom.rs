use nalgebra::Point3;

/// A single atom reduced to the geometry relevant for void detection.
///
/// Path finding only needs to know where an atom sits and how much space it
/// occupies, so an `AtomSphere` carries nothing but a centre and a van der Waals
/// radius. Spheres are immutable for the lifetime of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomSphere {
    /// The centre of the atom in Angstroms.
    pub position: Point3<f64>,
    /// The van der Waals radius in Angstroms.
    pub radius: f64,
}

impl AtomSphere {
    /// Creates a new sphere from a centre and a van der Waals radius.
    ///
    /// # Arguments
    ///
    /// * `position` - The centre of the atom.
    /// * `radius` - The van der Waals radius of the atom.
    pub fn new(position: Point3<f64>, radius: f64) -> Self {
        Self { position, radius }
    }

    /// Returns the signed distance from `point` to the surface of this sphere.
    ///
    /// The value is negative when `point` lies inside the sphere.
    ///
    /// # Arguments
    ///
    /// * `point` - The query point.
    ///
    /// # Return
    ///
    /// The centre distance minus the van der Waals radius.
    #[inline]
    pub fn surface_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.position).norm() - self.radius
    }

    /// Checks that the sphere has finite coordinates and a non-negative, finite radius.
    pub fn is_valid(&self) -> bool {
        self.position.iter().all(|c| c.is_finite()) && self.radius.is_finite() && self.radius >= 0.0
    }
}

/// An atom as read from an input frame, before its radius has been resolved.
///
/// Records coming from plain `x y z r` input already carry a radius; records
/// that only carry names get their radius from a
/// [`VdwRadiusProvider`](crate::core::radii::VdwRadiusProvider).
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    /// The atom name (e.g., "CA", "OG1").
    pub name: String,
    /// The name of the residue this atom belongs to (e.g., "SER").
    pub residue_name: String,
    /// The chemical element symbol (e.g., "C", "O").
    pub element: String,
    /// The centre of the atom in Angstroms.
    pub position: Point3<f64>,
    /// The van der Waals radius if the input provided one.
    pub radius: Option<f64>,
}

impl AtomRecord {
    /// Creates an anonymous record with an explicit radius.
    pub fn with_radius(position: Point3<f64>, radius: f64) -> Self {
        Self {
            name: String::new(),
            residue_name: String::new(),
            element: String::new(),
            position,
            radius: Some(radius),
        }
    }

    /// Creates a named record whose radius must be looked up later.
    ///
    /// # Arguments
    ///
    /// * `name` - The atom name.
    /// * `residue_name` - The residue name.
    /// * `element` - The element symbol.
    /// * `position` - The centre of the atom.
    pub fn named(name: &str, residue_name: &str, element: &str, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            residue_name: residue_name.to_string(),
            element: element.to_string(),
            position,
            radius: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_distance_is_centre_distance_minus_radius() {
        let atom = AtomSphere::new(Point3::new(1.0, 0.0, 0.0), 0.5);
        assert!((atom.surface_distance(&Point3::new(4.0, 0.0, 0.0)) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn surface_distance_is_negative_inside_sphere() {
        let atom = AtomSphere::new(Point3::origin(), 2.0);
        assert!(atom.surface_distance(&Point3::new(0.5, 0.0, 0.0)) < 0.0);
    }

    #[test]
    fn is_valid_rejects_negative_and_non_finite_values() {
        assert!(AtomSphere::new(Point3::origin(), 0.0).is_valid());
        assert!(!AtomSphere::new(Point3::origin(), -0.1).is_valid());
        assert!(!AtomSphere::new(Point3::new(f64::NAN, 0.0, 0.0), 1.0).is_valid());
        assert!(!AtomSphere::new(Point3::origin(), f64::INFINITY).is_valid());
    }

    #[test]
    fn named_record_has_no_radius() {
        let record = AtomRecord::named("CA", "ALA", "C", Point3::new(1.0, 2.0, 3.0));
        assert_eq!(record.name, "CA");
        assert_eq!(record.residue_name, "ALA");
        assert!(record.radius.is_none());
    }
}
