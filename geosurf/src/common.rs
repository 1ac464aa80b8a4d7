/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines shared helpers for random point generation.
//
// Created on: 12 Aug 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate random points in the unit cube.
///
/// # Parameters
/// - `n`: Number of points to generate.
/// - `seed`: Optional random seed.
///   - If `Some(seed)` is provided, the same sequence of points will be
///     generated deterministically across runs and platforms (useful for
///     reproducible tests).
///   - If `None`, the generator is seeded from the operating system's
///     randomness source.
///
/// # Example
/// ```
/// use geosurf::generate_random_points;
///
/// // Generate 100 reproducible 3D points
/// let pts = generate_random_points(100, Some(42));
/// assert_eq!(pts.len(), 100);
/// ```
pub fn generate_random_points(n: usize, seed: Option<u64>) -> Vec<[f64; 3]> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    (0..n)
        .map(|_| {
            [
                rng.random_range(0.0..1.0),
                rng.random_range(0.0..1.0),
                rng.random_range(0.0..1.0),
            ]
        })
        .collect()
}
