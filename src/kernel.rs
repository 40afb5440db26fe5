//! Tabulated cubic-spline SPH kernel.
//!
//! The shape function W̃(q) depends only on q = r/h; the normalization
//! to a physical 3D kernel depends on h. We tabulate the shape once and
//! let callers apply the normalization, so the table is reusable even
//! if h were ever made per-particle (it isn't here; see Non-goals).

/// Precomputed samples of the cubic-spline kernel shape W̃(q) and its
/// derivative dW̃/dq on q ∈ [0, 2].
#[derive(Debug, Clone)]
pub struct CubicSplineKernel {
    dq: f64,
    w: Vec<f64>,
    dw_dq: Vec<f64>,
}

fn shape(q: f64) -> (f64, f64) {
    if q <= 1.0 {
        (
            1.0 - 1.5 * q * q + 0.75 * q * q * q,
            -3.0 * q + 2.25 * q * q,
        )
    } else if q <= 2.0 {
        let t = 2.0 - q;
        (0.25 * t * t * t, -0.75 * t * t)
    } else {
        (0.0, 0.0)
    }
}

impl CubicSplineKernel {
    /// Build a table with `n_q + 1` samples over q ∈ [0, 2].
    pub fn new(n_q: usize) -> Self {
        let dq = 2.0 / n_q as f64;
        let mut w = Vec::with_capacity(n_q + 1);
        let mut dw_dq = Vec::with_capacity(n_q + 1);
        for i in 0..=n_q {
            let q = i as f64 * dq;
            let (wv, dwv) = shape(q);
            w.push(wv);
            dw_dq.push(dwv);
        }
        Self { dq, w, dw_dq }
    }

    /// Linearly-interpolated lookup of `(W̃(q), dW̃/dq(q))`. Returns
    /// `(0.0, 0.0)` outside the kernel's support (`q >= 2`).
    pub fn sample(&self, q: f64) -> (f64, f64) {
        if q >= 2.0 || q < 0.0 {
            return (0.0, 0.0);
        }
        let f = q / self.dq;
        let i = f.floor() as usize;
        // i can be exactly the last index when q == 2.0 - epsilon rounding;
        // the table has n_q + 1 entries, indices 0..=n_q.
        if i + 1 >= self.w.len() {
            return (self.w[self.w.len() - 1], self.dw_dq[self.dw_dq.len() - 1]);
        }
        let alpha = f - i as f64;
        let wv = (1.0 - alpha) * self.w[i] + alpha * self.w[i + 1];
        let dwv = (1.0 - alpha) * self.dw_dq[i] + alpha * self.dw_dq[i + 1];
        (wv, dwv)
    }

    /// Normalized 3D kernel value and gradient magnitude for separation
    /// `r` at smoothing length `h`: `W = W̃/(π h³)`,
    /// `|∇W| = |dW̃/dq|/(π h⁴)`.
    pub fn eval(&self, r: f64, h: f64) -> (f64, f64) {
        let q = r / h;
        let (wv, dwv) = self.sample(q);
        let w = wv / (std::f64::consts::PI * h * h * h);
        let grad = dwv.abs() / (std::f64::consts::PI * h * h * h * h);
        (w, grad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn shape_matches_reference_points() {
        let k = CubicSplineKernel::new(1000);
        let cases = [
            (0.0, 1.0, 0.0),
            (0.5, 0.78125, -0.9375),
            (1.0, 0.25, -0.75),
            (1.5, 0.03125, -0.1875),
            (2.0, 0.0, 0.0),
            (2.5, 0.0, 0.0),
        ];
        for (q, w_expect, dw_expect) in cases {
            let (w, dw) = k.sample(q);
            assert_relative_eq!(w, w_expect, epsilon = 1e-3);
            assert_relative_eq!(dw, dw_expect, epsilon = 1e-3);
        }
    }

    #[test]
    fn continuous_and_zero_at_support_radius() {
        let k = CubicSplineKernel::new(1000);
        let (w_at_2, dw_at_2) = k.sample(2.0 - 1e-9);
        assert!(w_at_2.abs() < 1e-3);
        assert!(dw_at_2.abs() < 1e-3);
        let (w_beyond, dw_beyond) = k.sample(3.0);
        assert_eq!(w_beyond, 0.0);
        assert_eq!(dw_beyond, 0.0);
    }
}
