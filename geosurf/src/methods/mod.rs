/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the modeling method interface shared by the fitting strategies.
//
// Created on: 12 Aug 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

pub mod single_surface;
pub mod vector_field;

use crate::constraints::{ConstraintStore, Point};
use crate::error::{AssemblyError, ConfigError, ModelingError};
use faer::Mat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ProblemType;

/// Bookkeeping recomputed from the constraint store and configuration
/// before each solve.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InternalParameters {
    pub n_interface: usize,
    pub n_planar: usize,
    pub n_tangent: usize,
    pub n_inequality: usize,

    /// Number of kernel basis centers: every constraint location
    /// contributes, with planar constraints counting three times.
    pub n_constraints: usize,

    /// Number of equality rows: interface values, planar components, and
    /// tangent orthogonality.
    pub n_equality: usize,

    /// Number of drift monomial terms.
    pub n_poly_terms: usize,

    /// Whether a polynomial drift is present.
    pub poly_term: bool,

    /// Reserved for basis substitutions that fold the drift into the
    /// kernel; neither shipped strategy sets it.
    pub modified_basis: bool,

    pub problem_type: ProblemType,
}

/// Solved weights paired with the system dimension they were produced for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Solution {
    pub weights: Mat<f64>,
    pub dimension: usize,
}

/// Residual magnitudes for a candidate constraint set, aligned with the
/// store's per-type ordering.
#[derive(Debug, Clone, Default)]
pub struct ResidualSet {
    pub interface: Vec<f64>,
    pub planar: Vec<f64>,
    pub tangent: Vec<f64>,
}

impl ResidualSet {
    /// Largest residual across every constraint type, zero when empty.
    pub fn worst(&self) -> f64 {
        self.interface
            .iter()
            .chain(self.planar.iter())
            .chain(self.tangent.iter())
            .fold(0.0, |acc, &r| acc.max(r))
    }
}

/// Returns the indices left out when a spatially spread seed subset of
/// `positions` is selected by farthest point sampling.
///
/// The seed keeps at least two points so the first fit is well posed.
pub(crate) fn excluded_after_sampling(positions: &[[f64; 3]], seed_fraction: f64) -> Vec<usize> {
    let n = positions.len();
    if n == 0 {
        return Vec::new();
    }

    let wanted = ((n as f64 * seed_fraction).ceil() as usize).max(2);
    let selected = geosurf_utils::farthest_point_sampling(positions, wanted, 0);

    let mut is_selected = vec![false; n];
    for &idx in &selected {
        is_selected[idx] = true;
    }
    (0..n).filter(|&i| !is_selected[i]).collect()
}

/// A fitting strategy: assembles its interpolation system from a constraint
/// store, solves it, and evaluates the fitted field.
pub trait ModelingMethod {
    /// Validates the configuration against the stored constraints and
    /// recomputes the internal bookkeeping counts.
    fn compute_parameters(&mut self) -> Result<(), ConfigError>;

    /// Returns the bookkeeping computed by the last
    /// [`compute_parameters`](ModelingMethod::compute_parameters) call.
    fn parameters(&self) -> &InternalParameters;

    /// Returns the active constraint store.
    fn constraints(&self) -> &ConstraintStore;

    /// Dimension of the assembled square system under the current
    /// parameters.
    fn system_dimension(&self) -> usize;

    /// Right-hand side of the equality rows: interface values, planar
    /// gradient components, and zeros for tangent rows, padded with zeros
    /// for any drift rows.
    fn get_equality_values(&self) -> Mat<f64>;

    /// Assembles the full square interpolation matrix.
    fn get_interpolation_matrix(&self) -> Result<Mat<f64>, AssemblyError>;

    /// Assembles the inequality rows `C` of `C w >= d`. Empty for methods
    /// and configurations without inequality constraints.
    fn get_inequality_matrix(&self) -> Result<Mat<f64>, AssemblyError> {
        Ok(Mat::zeros(0, 0))
    }

    /// Right-hand side `d` of `C w >= d`.
    fn get_inequality_values(&self) -> Mat<f64> {
        Mat::zeros(0, 1)
    }

    /// Assembles and solves the interpolation system, storing the weights
    /// for subsequent evaluation.
    fn setup_system_solver(&mut self) -> Result<(), ModelingError>;

    /// Evaluates the scalar interpolant at a point, writing the result into
    /// its `scalar_field` slot.
    fn eval_scalar_interpolant_at_point(&self, point: &mut Point) -> Result<(), ModelingError>;

    /// Evaluates the vector interpolant at a point, writing the result into
    /// its `vector_field` slot.
    fn eval_vector_interpolant_at_point(&self, point: &mut Point) -> Result<(), ModelingError>;

    /// Evaluates the scalar interpolant at many points in parallel.
    fn eval_scalar_interpolant_at_points(
        &self,
        points: &mut [Point],
    ) -> Result<(), ModelingError>
    where
        Self: Sync + Sized,
    {
        points
            .par_iter_mut()
            .try_for_each(|p| self.eval_scalar_interpolant_at_point(p))
    }

    /// Evaluates the vector interpolant at many points in parallel.
    fn eval_vector_interpolant_at_points(
        &self,
        points: &mut [Point],
    ) -> Result<(), ModelingError>
    where
        Self: Sync + Sized,
    {
        points
            .par_iter_mut()
            .try_for_each(|p| self.eval_vector_interpolant_at_point(p))
    }

    /// Shrinks the active constraints to a spatially spread seed subset and
    /// returns the excluded remainder. Used to start a greedy reduction.
    fn take_minimal_and_excluded_input(&mut self, seed_fraction: f64) -> ConstraintStore;

    /// Moves the given constraints back into the active set, invalidating
    /// any stored solution.
    fn append_greedy_input(&mut self, input: ConstraintStore);

    /// Evaluates the fitted field at the given candidate constraints and
    /// returns how far each one is from being honored.
    fn measure_residuals(&self, input: &ConstraintStore) -> Result<ResidualSet, ModelingError>;

    /// Returns an independent copy of this method behind the trait.
    fn duplicate(&self) -> Box<dyn ModelingMethod + Send + Sync>;
}
