//! Continuous pore centre lines built from discrete support points.

pub mod molecular_path;
pub mod spline;

pub use molecular_path::{MolecularPath, PathError, PathMapping, ProfileSample};
pub use spline::{CubicSpline, SplineCurve3D};
