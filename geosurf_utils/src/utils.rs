/////////////////////////////////////////////////////////////////////////////////////////////
//
// Supplies general-purpose utilities for distances, sampling, sorting, and kernel dispatch.
//
// Created on: 12 Aug 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::rbf_kernels::RadialKernel;
use crate::{KernelFromParams, KernelParams};
use serde::{Deserialize, Serialize};

/// Spatial axis selector used for kernel derivatives and field components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All three axes in coordinate order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the coordinate index of the axis.
    #[inline(always)]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Returns the axis for a coordinate index.
    ///
    /// # Panics
    /// Panics if `idx > 2`.
    #[inline(always)]
    pub fn from_index(idx: usize) -> Axis {
        match idx {
            0 => Axis::X,
            1 => Axis::Y,
            2 => Axis::Z,
            _ => panic!("Axis index out of range: {idx}"),
        }
    }
}

/// Calculates the euclidean distance between two points.
///
/// # Examples
///
/// ```
/// use geosurf_utils::distance;
///
/// let a = [1.0, 2.0, 0.0];
/// let b = [4.0, 6.0, 0.0];
///
/// assert_eq!(distance(&a, &b), 5.0);
/// ```
#[inline(always)]
pub fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let mut dist = 0.0;
    for (t, s) in a.iter().zip(b.iter()) {
        let diff = t - s;
        dist += diff * diff;
    }
    dist.sqrt()
}

/// Returns the indices that would sort the input slice.
///
/// # Examples
///
/// ```
/// use geosurf_utils::argsort;
///
/// let data = [30, 10, 20];
///
/// let sorted_indices = argsort(&data);
///
/// assert_eq!(sorted_indices, vec![1, 2, 0]);
/// ```
#[inline(always)]
pub fn argsort<T: PartialOrd>(data: &[T]) -> Vec<usize> {
    let mut indices = (0..data.len()).collect::<Vec<_>>();
    indices.sort_by(|&i, &j| {
        data[i]
            .partial_cmp(&data[j])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices
}

/// Perform farthest point sampling on a point cloud.
///
/// Starting from the provided `seed_index`, iteratively selects points
/// that maximize the minimum distance to the already selected subset.
/// If `num_wanted_points` meets or exceeds the cloud size, every index
/// is returned.
///
/// # Arguments
/// * `points` - Point coordinates.
/// * `num_wanted_points` - Number of points to sample.
/// * `seed_index` - Index of the initial seed point.
///
/// # Returns
/// A vector of indices into `points` representing the sampled subset.
pub fn farthest_point_sampling(
    points: &[[f64; 3]],
    num_wanted_points: usize,
    seed_index: usize,
) -> Vec<usize> {
    let num_points = points.len();
    if num_wanted_points >= num_points {
        return (0..num_points).collect();
    }

    let mut selected_points: Vec<usize> = Vec::with_capacity(num_wanted_points);
    let mut is_selected = vec![false; num_points];
    let mut min_dists = vec![f64::INFINITY; num_points];

    selected_points.push(seed_index);
    is_selected[seed_index] = true;

    for _ in 1..num_wanted_points {
        let last_selected = *selected_points.last().unwrap();

        for i in 0..num_points {
            if is_selected[i] {
                continue;
            }
            let dist = distance(&points[last_selected], &points[i]);
            if dist < min_dists[i] {
                min_dists[i] = dist;
            }
        }

        // Select the farthest (max-min-distance) point
        let mut farthest_idx = 0;
        let mut max_dist = -1.0;
        for (i, &dist) in min_dists.iter().enumerate() {
            if !is_selected[i] && dist > max_dist {
                max_dist = dist;
                farthest_idx = i;
            }
        }

        selected_points.push(farthest_idx);
        is_selected[farthest_idx] = true;
    }

    selected_points
}

// K-free dispatcher generated from the kernel registry below.
// Assumes each kernel type implements `KernelFromParams::from_params(&KernelParams) -> K`.
macro_rules! for_each_kernel {
    ( registry = [ $( ($V:ident, $Kty:path) ),* $(,)? ] ) => {

        /// Runtime kernel selector built from the kernel registry
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum KernelType {
            $( $V, )*
        }

        /// Runtime-erased wrapper so callers don't need to be generic over [`KernelType`].
        #[derive(Debug, Clone, Copy, Serialize, Deserialize)]
        pub enum Kernel {
            $( $V($Kty), )*
        }

        impl Kernel {
            /// Constructs the erased kernel selected by `kernel_params.kernel_type`.
            #[inline]
            pub fn from_params(kernel_params: &KernelParams) -> Self {
                match kernel_params.kernel_type {
                    $(
                        KernelType::$V => {
                            let k: $Kty = <$Kty as KernelFromParams>::from_params(kernel_params);
                            Kernel::$V(k)
                        }
                    ),*
                }
            }

            /// Evaluates the radial profile at distance `r`.
            #[inline(always)]
            pub fn phi(&self, r: f64) -> f64 {
                match self {
                    $( Self::$V(k) => k.phi(r), )*
                }
            }

            /// Evaluates `phi(|a - b|)`.
            #[inline(always)]
            pub fn value(&self, a: &[f64; 3], b: &[f64; 3]) -> f64 {
                match self {
                    $( Self::$V(k) => k.value(a, b), )*
                }
            }

            /// First partial derivative with respect to the `axis` coordinate of `a`.
            #[inline(always)]
            pub fn gradient_component(&self, a: &[f64; 3], b: &[f64; 3], axis: Axis) -> f64 {
                match self {
                    $( Self::$V(k) => k.gradient_component(a, b, axis), )*
                }
            }

            /// Second mixed partial with respect to coordinate `i` of `a` and `j` of `b`.
            #[inline(always)]
            pub fn mixed_partial(&self, a: &[f64; 3], b: &[f64; 3], i: Axis, j: Axis) -> f64 {
                match self {
                    $( Self::$V(k) => k.mixed_partial(a, b, i, j), )*
                }
            }
        }
    };
}

for_each_kernel! {
    registry = [
        (CubicRbf,           crate::kernels::CubicRbfKernel),
        (GaussianRbf,        crate::kernels::GaussianRbfKernel),
        (MultiquadricRbf,    crate::kernels::MultiquadricRbfKernel),
        (ThinPlateSplineRbf, crate::kernels::ThinPlateSplineRbfKernel),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;

    #[test]
    fn farthest_point_sampling_spreads_selection() {
        // Two tight clusters; sampling two points must take one from each.
        let points = vec![
            [0.0, 0.0, 0.0],
            [0.01, 0.0, 0.0],
            [10.0, 0.0, 0.0],
            [10.01, 0.0, 0.0],
        ];

        let selected = farthest_point_sampling(&points, 2, 0);

        assert!(selected.len() == 2);
        assert!(selected[0] == 0);
        assert!(selected[1] == 2 || selected[1] == 3);
    }

    #[test]
    fn farthest_point_sampling_caps_at_cloud_size() {
        let points = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let selected = farthest_point_sampling(&points, 5, 0);
        assert!(selected == vec![0, 1]);
    }

    #[test]
    fn erased_kernel_matches_typed_kernel() {
        use crate::kernels::{GaussianRbfKernel, RadialKernel};

        let params = KernelParams::builder(KernelType::GaussianRbf)
            .shape_parameter(0.7)
            .build();
        let erased = Kernel::from_params(&params);
        let typed = GaussianRbfKernel {
            shape_parameter: 0.7,
        };

        let a = [0.2, 0.9, -0.4];
        let b = [1.1, -0.3, 0.2];

        assert!(erased.value(&a, &b) == typed.value(&a, &b));
        assert!(
            erased.mixed_partial(&a, &b, Axis::X, Axis::Z)
                == typed.mixed_partial(&a, &b, Axis::X, Axis::Z)
        );
    }
}
