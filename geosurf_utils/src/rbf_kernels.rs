/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the concrete RBF kernel functions and their Cartesian derivative calculus.
//
// Created on: 12 Aug 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::utils::{Axis, distance};
use crate::{KernelFromParams, KernelParams};
use serde::{Deserialize, Serialize};

/// Distances below this are treated as coincident points.
const R_COINCIDENT: f64 = 1e-12;

/// A radial kernel `phi(r)` together with its Cartesian derivative calculus.
///
/// Implementors supply the radial profile and its first two derivatives with
/// respect to `r = |a - b|`; the provided methods expand those into partial
/// derivatives with respect to the coordinates of the two points. Every
/// method takes both points explicitly, so kernel values are plain `Copy`
/// data that can be shared freely across threads.
pub trait RadialKernel {
    /// Evaluates the radial profile at distance `r`.
    fn phi(&self, r: f64) -> f64;

    /// First derivative of the radial profile with respect to `r`.
    fn dphi(&self, r: f64) -> f64;

    /// Second derivative of the radial profile with respect to `r`.
    fn d2phi(&self, r: f64) -> f64;

    /// Evaluates `phi(|a - b|)`.
    #[inline(always)]
    fn value(&self, a: &[f64; 3], b: &[f64; 3]) -> f64 {
        self.phi(distance(a, b))
    }

    /// First partial derivative of `phi(|a - b|)` with respect to the
    /// `axis` coordinate of `a`. Zero when the points coincide.
    #[inline(always)]
    fn gradient_component(&self, a: &[f64; 3], b: &[f64; 3], axis: Axis) -> f64 {
        let r = distance(a, b);
        if r < R_COINCIDENT {
            return 0.0;
        }
        let d = a[axis.index()] - b[axis.index()];
        self.dphi(r) * d / r
    }

    /// Second mixed partial of `phi(|a - b|)` with respect to coordinate `i`
    /// of `a` and coordinate `j` of `b`.
    ///
    /// Satisfies `mixed_partial(a, b, i, j) == mixed_partial(b, a, j, i)`.
    /// At coincident points the analytic limit `-delta_ij * d2phi(0)` is
    /// used; profiles whose second derivative diverges at zero yield a
    /// non-finite value here, which assembly reports as an error.
    #[inline(always)]
    fn mixed_partial(&self, a: &[f64; 3], b: &[f64; 3], i: Axis, j: Axis) -> f64 {
        let r = distance(a, b);
        if r < R_COINCIDENT {
            return match i == j {
                true => -self.d2phi(0.0),
                false => 0.0,
            };
        }
        let di = a[i.index()] - b[i.index()];
        let dj = a[j.index()] - b[j.index()];
        let dphi = self.dphi(r);
        let curvature = (self.d2phi(r) - dphi / r) / (r * r);
        let diagonal = match i == j {
            true => dphi / r,
            false => 0.0,
        };
        -(curvature * (di * dj) + diagonal)
    }
}

/// Cubic RBF kernel with `phi(r) = r^3`.
#[derive(Clone, Debug, Copy, Serialize, Deserialize)]
pub struct CubicRbfKernel;

impl RadialKernel for CubicRbfKernel {
    #[inline(always)]
    fn phi(&self, r: f64) -> f64 {
        r.powi(3)
    }

    #[inline(always)]
    fn dphi(&self, r: f64) -> f64 {
        3.0 * r * r
    }

    #[inline(always)]
    fn d2phi(&self, r: f64) -> f64 {
        6.0 * r
    }
}

impl KernelFromParams for CubicRbfKernel {
    #[inline(always)]
    fn from_params(_: &KernelParams) -> Self {
        CubicRbfKernel
    }
}

/// Gaussian RBF kernel with `phi(r) = exp(-(s r)^2)`.
#[derive(Clone, Debug, Copy, Serialize, Deserialize)]
pub struct GaussianRbfKernel {
    pub shape_parameter: f64,
}

impl RadialKernel for GaussianRbfKernel {
    #[inline(always)]
    fn phi(&self, r: f64) -> f64 {
        let s2 = self.shape_parameter * self.shape_parameter;
        (-s2 * r * r).exp()
    }

    #[inline(always)]
    fn dphi(&self, r: f64) -> f64 {
        let s2 = self.shape_parameter * self.shape_parameter;
        -2.0 * s2 * r * (-s2 * r * r).exp()
    }

    #[inline(always)]
    fn d2phi(&self, r: f64) -> f64 {
        let s2 = self.shape_parameter * self.shape_parameter;
        (4.0 * s2 * s2 * r * r - 2.0 * s2) * (-s2 * r * r).exp()
    }
}

impl KernelFromParams for GaussianRbfKernel {
    #[inline(always)]
    fn from_params(p: &KernelParams) -> Self {
        GaussianRbfKernel {
            shape_parameter: p.shape_parameter,
        }
    }
}

/// Multiquadric RBF kernel with `phi(r) = sqrt(r^2 + s^2)`.
#[derive(Clone, Debug, Copy, Serialize, Deserialize)]
pub struct MultiquadricRbfKernel {
    pub shape_parameter: f64,
}

impl RadialKernel for MultiquadricRbfKernel {
    #[inline(always)]
    fn phi(&self, r: f64) -> f64 {
        let s = self.shape_parameter;
        (r * r + s * s).sqrt()
    }

    #[inline(always)]
    fn dphi(&self, r: f64) -> f64 {
        r / self.phi(r)
    }

    #[inline(always)]
    fn d2phi(&self, r: f64) -> f64 {
        let s = self.shape_parameter;
        let phi = self.phi(r);
        (s * s) / (phi * phi * phi)
    }
}

impl KernelFromParams for MultiquadricRbfKernel {
    #[inline(always)]
    fn from_params(p: &KernelParams) -> Self {
        MultiquadricRbfKernel {
            shape_parameter: p.shape_parameter,
        }
    }
}

/// Thin plate spline RBF kernel with `phi(r) = r^2 log r`.
///
/// The second radial derivative diverges at `r = 0`, so this kernel cannot
/// support derivative constraints at coincident points; the resulting
/// non-finite matrix entries are rejected during assembly.
#[derive(Clone, Debug, Copy, Serialize, Deserialize)]
pub struct ThinPlateSplineRbfKernel;

impl RadialKernel for ThinPlateSplineRbfKernel {
    #[inline(always)]
    fn phi(&self, r: f64) -> f64 {
        match r.abs() < f64::EPSILON {
            true => 0.0,
            false => r.powi(2) * r.ln(),
        }
    }

    #[inline(always)]
    fn dphi(&self, r: f64) -> f64 {
        match r.abs() < f64::EPSILON {
            true => 0.0,
            false => r * (2.0 * r.ln() + 1.0),
        }
    }

    #[inline(always)]
    fn d2phi(&self, r: f64) -> f64 {
        // ln(0) = -inf, so the divergence at zero propagates on its own.
        2.0 * r.ln() + 3.0
    }
}

impl KernelFromParams for ThinPlateSplineRbfKernel {
    #[inline(always)]
    fn from_params(_: &KernelParams) -> Self {
        ThinPlateSplineRbfKernel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;

    const FD_STEP: f64 = 1e-5;
    const FD_TOLERANCE: f64 = 1e-5;

    fn offset(p: &[f64; 3], axis: Axis, h: f64) -> [f64; 3] {
        let mut q = *p;
        q[axis.index()] += h;
        q
    }

    /// Central difference of `value` in one coordinate of `a`.
    fn fd_gradient<K: RadialKernel>(k: &K, a: &[f64; 3], b: &[f64; 3], axis: Axis) -> f64 {
        let fwd = k.value(&offset(a, axis, FD_STEP), b);
        let bwd = k.value(&offset(a, axis, -FD_STEP), b);
        (fwd - bwd) / (2.0 * FD_STEP)
    }

    /// Cross difference of `value` in coordinate `i` of `a` and `j` of `b`.
    fn fd_mixed<K: RadialKernel>(k: &K, a: &[f64; 3], b: &[f64; 3], i: Axis, j: Axis) -> f64 {
        let app = k.value(&offset(a, i, FD_STEP), &offset(b, j, FD_STEP));
        let apm = k.value(&offset(a, i, FD_STEP), &offset(b, j, -FD_STEP));
        let amp = k.value(&offset(a, i, -FD_STEP), &offset(b, j, FD_STEP));
        let amm = k.value(&offset(a, i, -FD_STEP), &offset(b, j, -FD_STEP));
        (app - apm - amp + amm) / (4.0 * FD_STEP * FD_STEP)
    }

    fn check_derivatives<K: RadialKernel>(k: &K) {
        let a = [0.3, -0.7, 1.1];
        let b = [-0.4, 0.2, 0.6];

        for i in Axis::ALL {
            let analytic = k.gradient_component(&a, &b, i);
            let numeric = fd_gradient(k, &a, &b, i);
            assert!((analytic - numeric).abs() < FD_TOLERANCE);

            for j in Axis::ALL {
                let analytic = k.mixed_partial(&a, &b, i, j);
                let numeric = fd_mixed(k, &a, &b, i, j);
                assert!((analytic - numeric).abs() < FD_TOLERANCE);
            }
        }
    }

    fn check_symmetry<K: RadialKernel>(k: &K) {
        let a = [1.2, 0.4, -0.9];
        let b = [0.1, -1.3, 0.5];

        for i in Axis::ALL {
            for j in Axis::ALL {
                let forward = k.mixed_partial(&a, &b, i, j);
                let swapped = k.mixed_partial(&b, &a, j, i);
                assert!(forward == swapped);
            }
        }
    }

    #[test]
    fn cubic_derivatives_match_finite_differences() {
        check_derivatives(&CubicRbfKernel);
        check_symmetry(&CubicRbfKernel);
    }

    #[test]
    fn gaussian_derivatives_match_finite_differences() {
        let k = GaussianRbfKernel {
            shape_parameter: 0.8,
        };
        check_derivatives(&k);
        check_symmetry(&k);
    }

    #[test]
    fn multiquadric_derivatives_match_finite_differences() {
        let k = MultiquadricRbfKernel {
            shape_parameter: 0.5,
        };
        check_derivatives(&k);
        check_symmetry(&k);
    }

    #[test]
    fn thin_plate_spline_derivatives_match_finite_differences() {
        check_derivatives(&ThinPlateSplineRbfKernel);
        check_symmetry(&ThinPlateSplineRbfKernel);
    }

    #[test]
    fn coincident_points_use_analytic_limits() {
        let p = [0.5, 0.5, 0.5];

        // Smooth kernels: zero gradient, finite curvature limit on the
        // diagonal, zero off the diagonal.
        let k = GaussianRbfKernel {
            shape_parameter: 1.5,
        };
        let s2 = 1.5 * 1.5;
        assert!(k.gradient_component(&p, &p, Axis::X) == 0.0);
        assert!((k.mixed_partial(&p, &p, Axis::X, Axis::X) - 2.0 * s2).abs() < 1e-12);
        assert!(k.mixed_partial(&p, &p, Axis::X, Axis::Y) == 0.0);

        assert!(CubicRbfKernel.mixed_partial(&p, &p, Axis::Z, Axis::Z) == 0.0);

        // The thin plate spline curvature diverges at zero distance.
        let tps = ThinPlateSplineRbfKernel;
        assert!(!tps.mixed_partial(&p, &p, Axis::X, Axis::X).is_finite());
    }
}
