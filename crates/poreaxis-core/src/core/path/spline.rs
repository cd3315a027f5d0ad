use nalgebra::Point3;

/// A natural cubic interpolating spline over strictly increasing knots.
///
/// Outside the knot range the spline continues linearly along its end tangent,
/// which keeps it continuous and differentiable everywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl CubicSpline {
    /// Fits a natural cubic spline through `(knots[i], values[i])`.
    ///
    /// # Return
    ///
    /// `None` if fewer than two knots are given, the lengths differ, or the
    /// knots are not strictly increasing.
    pub fn new(knots: Vec<f64>, values: Vec<f64>) -> Option<Self> {
        let n = knots.len();
        if n < 2 || values.len() != n || knots.windows(2).any(|w| !(w[1] > w[0])) {
            return None;
        }

        let mut second_derivatives = vec![0.0; n];
        if n > 2 {
            // Thomas algorithm for the interior second derivatives; the natural
            // boundary conditions pin both ends to zero.
            let interior = n - 2;
            let mut diag = vec![0.0; interior];
            let mut rhs = vec![0.0; interior];
            let mut upper = vec![0.0; interior];

            for i in 1..n - 1 {
                let h_prev = knots[i] - knots[i - 1];
                let h_next = knots[i + 1] - knots[i];
                diag[i - 1] = 2.0 * (h_prev + h_next);
                upper[i - 1] = h_next;
                rhs[i - 1] = 6.0
                    * ((values[i + 1] - values[i]) / h_next - (values[i] - values[i - 1]) / h_prev);
            }

            for k in 1..interior {
                let h_prev = knots[k + 1] - knots[k];
                let factor = h_prev / diag[k - 1];
                diag[k] -= factor * upper[k - 1];
                rhs[k] -= factor * rhs[k - 1];
            }

            second_derivatives[interior] = rhs[interior - 1] / diag[interior - 1];
            for k in (0..interior - 1).rev() {
                second_derivatives[k + 1] =
                    (rhs[k] - upper[k] * second_derivatives[k + 2]) / diag[k];
            }
        }

        Some(Self {
            knots,
            values,
            second_derivatives,
        })
    }

    pub fn lower_bound(&self) -> f64 {
        self.knots[0]
    }

    pub fn upper_bound(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let lo = self.lower_bound();
        let hi = self.upper_bound();
        if x < lo {
            return self.values[0] + self.derivative(lo) * (x - lo);
        }
        if x > hi {
            return self.values[self.values.len() - 1] + self.derivative(hi) * (x - hi);
        }

        let i = self.interval(x);
        let (x0, x1) = (self.knots[i], self.knots[i + 1]);
        let (y0, y1) = (self.values[i], self.values[i + 1]);
        let (m0, m1) = (self.second_derivatives[i], self.second_derivatives[i + 1]);
        let h = x1 - x0;
        let a = x1 - x;
        let b = x - x0;

        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }

    pub fn derivative(&self, x: f64) -> f64 {
        let x = x.clamp(self.lower_bound(), self.upper_bound());
        let i = self.interval(x);
        let (x0, x1) = (self.knots[i], self.knots[i + 1]);
        let (y0, y1) = (self.values[i], self.values[i + 1]);
        let (m0, m1) = (self.second_derivatives[i], self.second_derivatives[i + 1]);
        let h = x1 - x0;
        let a = x1 - x;
        let b = x - x0;

        -m0 * a.powi(2) / (2.0 * h) + m1 * b.powi(2) / (2.0 * h) + (y1 - y0) / h
            - (m1 - m0) * h / 6.0
    }

    // Index of the knot interval containing `x`, clamped to the valid range.
    fn interval(&self, x: f64) -> usize {
        let upper = self.knots.partition_point(|&k| k <= x);
        upper.clamp(1, self.knots.len() - 1) - 1
    }
}

/// A parametric 3-D curve made of one cubic spline per coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineCurve3D {
    x: CubicSpline,
    y: CubicSpline,
    z: CubicSpline,
}

impl SplineCurve3D {
    pub fn new(parameters: &[f64], points: &[Point3<f64>]) -> Option<Self> {
        let coordinate = |axis: usize| -> Option<CubicSpline> {
            CubicSpline::new(parameters.to_vec(), points.iter().map(|p| p[axis]).collect())
        };
        Some(Self {
            x: coordinate(0)?,
            y: coordinate(1)?,
            z: coordinate(2)?,
        })
    }

    pub fn evaluate(&self, t: f64) -> Point3<f64> {
        Point3::new(self.x.evaluate(t), self.y.evaluate(t), self.z.evaluate(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn spline_rejects_invalid_knots() {
        assert!(CubicSpline::new(vec![0.0], vec![1.0]).is_none());
        assert!(CubicSpline::new(vec![0.0, 1.0], vec![1.0]).is_none());
        assert!(CubicSpline::new(vec![0.0, 1.0, 1.0], vec![1.0, 2.0, 3.0]).is_none());
        assert!(CubicSpline::new(vec![0.0, 2.0, 1.0], vec![1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn spline_interpolates_its_knots() {
        let knots = vec![0.0, 0.5, 1.7, 2.0, 3.5];
        let values = vec![1.0, -2.0, 0.3, 4.0, 2.5];
        let spline = CubicSpline::new(knots.clone(), values.clone()).unwrap();
        for (x, y) in knots.iter().zip(values.iter()) {
            assert!((spline.evaluate(*x) - y).abs() < TOLERANCE);
        }
    }

    #[test]
    fn two_knot_spline_is_linear() {
        let spline = CubicSpline::new(vec![0.0, 2.0], vec![1.0, 5.0]).unwrap();
        assert!((spline.evaluate(1.0) - 3.0).abs() < TOLERANCE);
        assert!((spline.derivative(0.3) - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn spline_reproduces_straight_lines_exactly() {
        let knots: Vec<f64> = (0..6).map(|i| i as f64 * 0.7).collect();
        let values: Vec<f64> = knots.iter().map(|x| 3.0 * x - 1.0).collect();
        let spline = CubicSpline::new(knots, values).unwrap();
        for x in [0.1, 1.23, 2.9, 3.4] {
            assert!((spline.evaluate(x) - (3.0 * x - 1.0)).abs() < TOLERANCE);
            assert!((spline.derivative(x) - 3.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn spline_extrapolates_linearly_and_continuously() {
        let spline = CubicSpline::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 0.0]).unwrap();
        let slope = spline.derivative(2.0);
        assert!((spline.evaluate(2.0 + 1e-9) - spline.evaluate(2.0)).abs() < 1e-6);
        assert!((spline.evaluate(3.0) - (spline.evaluate(2.0) + slope)).abs() < TOLERANCE);
    }

    #[test]
    fn curve_interpolates_points() {
        let params = vec![0.0, 1.0, 2.5];
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.5, -1.0),
            Point3::new(2.0, 2.0, 1.0),
        ];
        let curve = SplineCurve3D::new(&params, &points).unwrap();
        for (t, p) in params.iter().zip(points.iter()) {
            assert!((curve.evaluate(*t) - p).norm() < TOLERANCE);
        }
    }
}
