use nalgebra::{Point3, Unit, Vector3};

/// An orthonormal frame attached to a marching direction.
///
/// `u` and `w` span the plane orthogonal to `direction`, so that a 2-D in-plane
/// coordinate `(a, b)` maps onto the 3-D point `origin + a·u + b·w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionFrame {
    direction: Unit<Vector3<f64>>,
    u: Unit<Vector3<f64>>,
    w: Unit<Vector3<f64>>,
}

impl DirectionFrame {
    /// Builds a frame from an arbitrary (not necessarily unit) direction vector.
    ///
    /// The in-plane basis is obtained by Gram–Schmidt against whichever
    /// coordinate axis is least aligned with the direction.
    ///
    /// # Arguments
    ///
    /// * `direction` - The marching direction.
    ///
    /// # Return
    ///
    /// `None` if the direction has zero length or non-finite components.
    pub fn new(direction: &Vector3<f64>) -> Option<Self> {
        if !direction.iter().all(|c| c.is_finite()) {
            return None;
        }
        let direction = Unit::try_new(*direction, f64::EPSILON)?;

        let reference = if direction.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u = Unit::new_normalize(reference - direction.into_inner() * direction.dot(&reference));
        let w = Unit::new_normalize(direction.cross(&u));

        Some(Self { direction, u, w })
    }

    pub fn direction(&self) -> &Unit<Vector3<f64>> {
        &self.direction
    }

    pub fn u(&self) -> &Unit<Vector3<f64>> {
        &self.u
    }

    pub fn w(&self) -> &Unit<Vector3<f64>> {
        &self.w
    }

    /// Returns the same frame marching in the opposite direction.
    ///
    /// The in-plane basis is kept, so the handedness flips.
    pub fn reversed(&self) -> Self {
        Self {
            direction: -self.direction,
            u: self.u,
            w: self.w,
        }
    }

    /// Maps an in-plane coordinate onto the plane through `origin`.
    #[inline]
    pub fn plane_to_point(&self, origin: &Point3<f64>, a: f64, b: f64) -> Point3<f64> {
        origin + self.u.into_inner() * a + self.w.into_inner() * b
    }

    /// Translates `origin` by `distance` along the marching direction.
    #[inline]
    pub fn advance(&self, origin: &Point3<f64>, distance: f64) -> Point3<f64> {
        origin + self.direction.into_inner() * distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn assert_orthonormal(frame: &DirectionFrame) {
        let d = frame.direction();
        let u = frame.u();
        let w = frame.w();
        assert!((d.norm() - 1.0).abs() < TOLERANCE);
        assert!((u.norm() - 1.0).abs() < TOLERANCE);
        assert!((w.norm() - 1.0).abs() < TOLERANCE);
        assert!(d.dot(u).abs() < TOLERANCE);
        assert!(d.dot(w).abs() < TOLERANCE);
        assert!(u.dot(w).abs() < TOLERANCE);
    }

    #[test]
    fn frame_is_orthonormal_for_axis_directions() {
        for direction in [Vector3::x(), Vector3::y(), Vector3::z(), -Vector3::x()] {
            let frame = DirectionFrame::new(&direction).unwrap();
            assert_orthonormal(&frame);
        }
    }

    #[test]
    fn frame_is_orthonormal_for_oblique_direction() {
        let frame = DirectionFrame::new(&Vector3::new(3.0, -2.0, 7.5)).unwrap();
        assert_orthonormal(&frame);
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert!(DirectionFrame::new(&Vector3::zeros()).is_none());
        assert!(DirectionFrame::new(&Vector3::new(f64::NAN, 0.0, 1.0)).is_none());
    }

    #[test]
    fn plane_points_stay_in_plane() {
        let frame = DirectionFrame::new(&Vector3::new(0.0, 1.0, 1.0)).unwrap();
        let origin = Point3::new(1.0, 2.0, 3.0);
        let p = frame.plane_to_point(&origin, 0.7, -1.3);
        assert!((p - origin).dot(frame.direction()).abs() < TOLERANCE);
        assert!(((p - origin).norm() - (0.7f64.powi(2) + 1.3f64.powi(2)).sqrt()).abs() < TOLERANCE);
    }

    #[test]
    fn reversed_frame_points_backwards() {
        let frame = DirectionFrame::new(&Vector3::z()).unwrap();
        let back = frame.reversed();
        assert!((back.direction().into_inner() + Vector3::z()).norm() < TOLERANCE);
        assert_eq!(back.u(), frame.u());
        let p = back.advance(&Point3::origin(), 2.0);
        assert!((p - Point3::new(0.0, 0.0, -2.0)).norm() < TOLERANCE);
    }
}
