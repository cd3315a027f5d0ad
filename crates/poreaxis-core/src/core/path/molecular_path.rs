use super::spline::{CubicSpline, SplineCurve3D};
use crate::core::models::path_point::PathPoint;
use nalgebra::Point3;
use std::f64::consts::PI;
use thiserror::Error;

/// Number of grid intervals used for integrals and minimum searches along the path.
const PROFILE_GRID_INTERVALS: usize = 1000;
/// Largest profile a single resampling request may produce.
const MAX_PROFILE_SAMPLES: usize = 1_000_000;
/// Number of golden-section iterations used to refine a projection onto the path.
const PROJECTION_REFINEMENT_ITERATIONS: usize = 60;

#[derive(Debug, Error, PartialEq)]
pub enum PathError {
    #[error("A molecular path needs at least 2 support points, found {found}")]
    TooFewPoints { found: usize },
    #[error("Support point {index} does not advance the arclength of the path")]
    NonIncreasingArclength { index: usize },
    #[error("Extrapolation distance must be a finite, non-negative number (got {0})")]
    InvalidExtrapolation(f64),
    #[error("Invalid resampling request: {0}")]
    InvalidSampling(String),
}

/// One point of a resampled path profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSample {
    pub arclength: f64,
    pub position: Point3<f64>,
    pub radius: f64,
}

/// The projection of an external point onto the centre line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathMapping {
    /// Arclength of the closest point on the centre line.
    pub arclength: f64,
    /// Distance between the external point and the centre line.
    pub distance: f64,
}

/// A continuous pore centre line with a radius profile.
///
/// The path is parametrised by the cumulative Euclidean arclength between its
/// support points, starting at zero on the first point. Both the centre line
/// and the radius are interpolated by natural cubic splines that pass exactly
/// through the support points. Within the extrapolation distance beyond either
/// end, the centre line continues along its end tangent while the radius stays
/// at the value of the terminal support point.
#[derive(Debug, Clone)]
pub struct MolecularPath {
    support_points: Vec<PathPoint>,
    arclengths: Vec<f64>,
    centre_line: SplineCurve3D,
    radius_spline: CubicSpline,
    extrapolation_distance: f64,
}

impl MolecularPath {
    /// Builds a path from an ordered sequence of support points.
    ///
    /// # Arguments
    ///
    /// * `points` - Support points ordered along the path.
    /// * `extrapolation_distance` - How far beyond the sampled extent the path is
    ///   considered defined.
    ///
    /// # Return
    ///
    /// The fitted path.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::TooFewPoints`] for fewer than two points and
    /// [`PathError::NonIncreasingArclength`] if two consecutive points coincide.
    pub fn new(points: &[PathPoint], extrapolation_distance: f64) -> Result<Self, PathError> {
        if points.len() < 2 {
            return Err(PathError::TooFewPoints {
                found: points.len(),
            });
        }
        if !(extrapolation_distance >= 0.0) || !extrapolation_distance.is_finite() {
            return Err(PathError::InvalidExtrapolation(extrapolation_distance));
        }

        let mut arclengths = Vec::with_capacity(points.len());
        arclengths.push(0.0);
        for (index, pair) in points.windows(2).enumerate() {
            let step = (pair[1].position - pair[0].position).norm();
            if !(step > 0.0) {
                return Err(PathError::NonIncreasingArclength { index: index + 1 });
            }
            arclengths.push(arclengths[index] + step);
        }

        let positions: Vec<Point3<f64>> = points.iter().map(|p| p.position).collect();
        let radii: Vec<f64> = points.iter().map(|p| p.radius).collect();

        let centre_line = SplineCurve3D::new(&arclengths, &positions).ok_or(
            PathError::NonIncreasingArclength {
                index: points.len() - 1,
            },
        )?;
        let radius_spline = CubicSpline::new(arclengths.clone(), radii).ok_or(
            PathError::NonIncreasingArclength {
                index: points.len() - 1,
            },
        )?;

        Ok(Self {
            support_points: points.to_vec(),
            arclengths,
            centre_line,
            radius_spline,
            extrapolation_distance,
        })
    }

    pub fn support_points(&self) -> &[PathPoint] {
        &self.support_points
    }

    pub fn support_arclengths(&self) -> &[f64] {
        &self.arclengths
    }

    pub fn min_arclength(&self) -> f64 {
        self.arclengths[0]
    }

    pub fn max_arclength(&self) -> f64 {
        self.arclengths[self.arclengths.len() - 1]
    }

    /// Length of the sampled extent of the centre line.
    pub fn length(&self) -> f64 {
        self.max_arclength() - self.min_arclength()
    }

    /// Returns the arclength interval over which the path is defined, i.e. the
    /// sampled extent widened by the extrapolation distance on both sides.
    pub fn domain(&self) -> (f64, f64) {
        (
            self.min_arclength() - self.extrapolation_distance,
            self.max_arclength() + self.extrapolation_distance,
        )
    }

    pub fn position(&self, arclength: f64) -> Point3<f64> {
        self.centre_line.evaluate(arclength)
    }

    pub fn radius(&self, arclength: f64) -> f64 {
        if arclength <= self.min_arclength() {
            self.support_points[0].radius
        } else if arclength >= self.max_arclength() {
            self.support_points[self.support_points.len() - 1].radius
        } else {
            self.radius_spline.evaluate(arclength)
        }
    }

    /// Returns the location and value of the narrowest point of the sampled extent.
    pub fn min_radius(&self) -> (f64, f64) {
        let grid = uniform_grid(
            self.min_arclength(),
            self.max_arclength(),
            PROFILE_GRID_INTERVALS + 1,
        );
        grid.into_iter()
            .chain(self.arclengths.iter().copied())
            .map(|s| (s, self.radius(s)))
            .fold((self.min_arclength(), f64::INFINITY), |best, candidate| {
                if candidate.1 < best.1 { candidate } else { best }
            })
    }

    /// Volume of the pore over the sampled extent, integrating `π r(s)²`.
    pub fn volume(&self) -> f64 {
        let grid = uniform_grid(
            self.min_arclength(),
            self.max_arclength(),
            PROFILE_GRID_INTERVALS + 1,
        );
        grid.windows(2)
            .map(|w| {
                let a = PI * self.radius(w[0]).powi(2);
                let b = PI * self.radius(w[1]).powi(2);
                0.5 * (a + b) * (w[1] - w[0])
            })
            .sum()
    }

    /// Projects `point` onto the centre line and returns the closest arclength.
    pub fn map_to_arclength(&self, point: &Point3<f64>) -> f64 {
        self.map_point(point).arclength
    }

    /// Projects `point` onto the centre line within the path's domain.
    ///
    /// A coarse scan over a uniform grid brackets the closest point, which is
    /// then refined by golden-section search on the squared distance.
    pub fn map_point(&self, point: &Point3<f64>) -> PathMapping {
        let (lo, hi) = self.domain();
        let num_samples = (self.support_points.len() * 10).max(PROFILE_GRID_INTERVALS / 10) + 1;
        let grid = uniform_grid(lo, hi, num_samples);
        let distance_sq = |s: f64| (self.position(s) - point).norm_squared();

        let (best_index, _) = grid
            .iter()
            .enumerate()
            .map(|(i, &s)| (i, distance_sq(s)))
            .fold((0, f64::INFINITY), |best, candidate| {
                if candidate.1 < best.1 { candidate } else { best }
            });

        let mut a = grid[best_index.saturating_sub(1)];
        let mut b = grid[(best_index + 1).min(grid.len() - 1)];
        let ratio = (5.0_f64.sqrt() - 1.0) / 2.0;
        let mut c = b - ratio * (b - a);
        let mut d = a + ratio * (b - a);
        let mut fc = distance_sq(c);
        let mut fd = distance_sq(d);
        for _ in 0..PROJECTION_REFINEMENT_ITERATIONS {
            if fc < fd {
                b = d;
                d = c;
                fd = fc;
                c = b - ratio * (b - a);
                fc = distance_sq(c);
            } else {
                a = c;
                c = d;
                fc = fd;
                d = a + ratio * (b - a);
                fd = distance_sq(d);
            }
        }

        let refined = 0.5 * (a + b);
        let coarse = grid[best_index];
        let arclength = if distance_sq(refined) <= distance_sq(coarse) {
            refined
        } else {
            coarse
        };

        PathMapping {
            arclength,
            distance: distance_sq(arclength).sqrt(),
        }
    }

    /// Checks whether `point` lies within the pore, widened by `margin`.
    pub fn is_pore_lining(&self, point: &Point3<f64>, margin: f64) -> bool {
        let mapping = self.map_point(point);
        mapping.distance < self.radius(mapping.arclength) + margin
    }

    /// Samples the path at `count` equidistant arclengths covering its domain.
    pub fn resample_by_count(&self, count: usize) -> Result<Vec<ProfileSample>, PathError> {
        if count < 2 {
            return Err(PathError::InvalidSampling(format!(
                "at least 2 samples are required, got {count}"
            )));
        }
        if count > MAX_PROFILE_SAMPLES {
            return Err(PathError::InvalidSampling(format!(
                "{count} samples exceed the limit of {MAX_PROFILE_SAMPLES}"
            )));
        }
        let (lo, hi) = self.domain();
        Ok(self.sample_at(uniform_grid(lo, hi, count)))
    }

    /// Samples the path on a grid of the given spacing starting at the lower end
    /// of its domain.
    pub fn resample_by_spacing(&self, spacing: f64) -> Result<Vec<ProfileSample>, PathError> {
        if !(spacing > 0.0) || !spacing.is_finite() {
            return Err(PathError::InvalidSampling(format!(
                "spacing must be a positive number, got {spacing}"
            )));
        }
        let (lo, hi) = self.domain();
        let intervals = ((hi - lo) / spacing + 1e-9).floor();
        if intervals + 1.0 > MAX_PROFILE_SAMPLES as f64 {
            return Err(PathError::InvalidSampling(format!(
                "spacing {spacing} over a domain of length {} exceeds the limit of {MAX_PROFILE_SAMPLES} samples",
                hi - lo
            )));
        }
        let num_intervals = intervals as usize;
        let grid = (0..=num_intervals)
            .map(|i| lo + i as f64 * spacing)
            .collect();
        Ok(self.sample_at(grid))
    }

    fn sample_at(&self, arclengths: Vec<f64>) -> Vec<ProfileSample> {
        arclengths
            .into_iter()
            .map(|s| ProfileSample {
                arclength: s,
                position: self.position(s),
                radius: self.radius(s),
            })
            .collect()
    }
}

fn uniform_grid(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    if count < 2 {
        return vec![lo];
    }
    let step = (hi - lo) / (count - 1) as f64;
    (0..count)
        .map(|i| if i + 1 == count { hi } else { lo + i as f64 * step })
        .collect()
}
