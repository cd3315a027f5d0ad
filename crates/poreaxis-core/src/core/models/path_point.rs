use nalgebra::Point3;

/// A support point of a pore centre line.
///
/// `radius` is the free radius at `position`: the radius of the largest sphere
/// centred there that does not intersect any atom, capped by the neighbour
/// search cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub position: Point3<f64>,
    pub radius: f64,
}

impl PathPoint {
    pub fn new(position: Point3<f64>, radius: f64) -> Self {
        Self { position, radius }
    }
}

/// An ordered sequence of path points, monotonic in arclength.
pub type RawPath = Vec<PathPoint>;
