/////////////////////////////////////////////////////////////////////////////////////////////
//
// Evaluates drift monomials and their gradients on normalized coordinates.
//
// Created on: 12 Aug 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::config::Drift;
use geosurf_utils::Axis;

/// Compute translation and scale factors that map points into the cube
/// [-1, 1]^3.
///
/// The translation is the midpoint of each coordinate range and the scale
/// is half the range, with zeros replaced by `1.0` to avoid division by
/// zero. Drift monomials are evaluated on these normalized coordinates to
/// keep the drift columns well conditioned.
pub(crate) fn cube_scaling_factors(positions: &[[f64; 3]]) -> ([f64; 3], [f64; 3]) {
    let mut translation = [0.0; 3];
    let mut scale = [1.0; 3];
    if positions.is_empty() {
        return (translation, scale);
    }

    for d in 0..3 {
        let mut min_coord = positions[0][d];
        let mut max_coord = positions[0][d];
        for p in positions.iter().skip(1) {
            min_coord = min_coord.min(p[d]);
            max_coord = max_coord.max(p[d]);
        }
        translation[d] = (max_coord + min_coord) / 2.0;
        scale[d] = (max_coord - min_coord) / 2.0;
        if scale[d] == 0.0 {
            scale[d] = 1.0;
        }
    }

    (translation, scale)
}

/// Evaluates the drift monomials at `position` on normalized coordinates.
///
/// Ordering is `[1]`, `[1, x, y, z]`, or
/// `[1, x, y, z, x^2, xy, xz, y^2, yz, z^2]` depending on the drift degree.
pub(crate) fn monomial_row(
    position: &[f64; 3],
    drift: Drift,
    translation: &[f64; 3],
    scale: &[f64; 3],
) -> Vec<f64> {
    let x = (position[0] - translation[0]) / scale[0];
    let y = (position[1] - translation[1]) / scale[1];
    let z = (position[2] - translation[2]) / scale[2];

    match drift {
        Drift::None => vec![],
        Drift::Constant => vec![1.0],
        Drift::Linear => vec![1.0, x, y, z],
        Drift::Quadratic => vec![
            1.0,
            x,
            y,
            z,
            x * x,
            x * y,
            x * z,
            y * y,
            y * z,
            z * z,
        ],
    }
}

/// Evaluates the partial derivative of each drift monomial with respect to
/// the world coordinate `axis`, including the chain-rule factor from the
/// cube normalization.
pub(crate) fn monomial_gradient_row(
    position: &[f64; 3],
    drift: Drift,
    axis: Axis,
    translation: &[f64; 3],
    scale: &[f64; 3],
) -> Vec<f64> {
    let x = (position[0] - translation[0]) / scale[0];
    let y = (position[1] - translation[1]) / scale[1];
    let z = (position[2] - translation[2]) / scale[2];
    let c = 1.0 / scale[axis.index()];

    match drift {
        Drift::None => vec![],
        Drift::Constant => vec![0.0],
        Drift::Linear => match axis {
            Axis::X => vec![0.0, c, 0.0, 0.0],
            Axis::Y => vec![0.0, 0.0, c, 0.0],
            Axis::Z => vec![0.0, 0.0, 0.0, c],
        },
        Drift::Quadratic => match axis {
            Axis::X => vec![
                0.0,
                c,
                0.0,
                0.0,
                2.0 * x * c,
                y * c,
                z * c,
                0.0,
                0.0,
                0.0,
            ],
            Axis::Y => vec![
                0.0,
                0.0,
                c,
                0.0,
                0.0,
                x * c,
                0.0,
                2.0 * y * c,
                z * c,
                0.0,
            ],
            Axis::Z => vec![
                0.0,
                0.0,
                0.0,
                c,
                0.0,
                0.0,
                x * c,
                0.0,
                y * c,
                2.0 * z * c,
            ],
        },
    }
}
