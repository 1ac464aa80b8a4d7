/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the single surface method: a scalar implicit surface fit to mixed constraints.
//
// Created on: 12 Aug 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::config::{ModelConfig, ProblemType};
use crate::constraints::{ConstraintStore, InequalitySense, Point};
use crate::error::{AssemblyError, ConfigError, ModelingError};
use crate::methods::{InternalParameters, ModelingMethod, ResidualSet, Solution};
use crate::polynomials::{cube_scaling_factors, monomial_gradient_row, monomial_row};
use crate::solver;
use faer::Mat;
use geosurf_utils::{Axis, Kernel, KernelParams};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const METHOD_NAME: &str = "single surface";

/// Column offsets of the constraint blocks in the interpolation system.
///
/// Rows mirror columns, so the same offsets locate the equality rows; the
/// inequality block only has rows in quadratic problems, where those
/// locations act as additional basis centers rather than equality rows.
#[derive(Debug, Clone, Copy)]
struct BlockLayout {
    interface: usize,
    planar: usize,
    tangent: usize,
    inequality: usize,
    poly: usize,
    dimension: usize,
}

/// Fits a single scalar implicit surface to interface, planar, tangent, and
/// optionally inequality constraints.
///
/// Interface values, planar gradients, and tangent orthogonality enter as
/// equality rows; inequality bounds turn the fit into a quadratic program
/// in which the bounded locations contribute extra basis centers. An
/// optional polynomial drift absorbs the regional trend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleSurface {
    constraints: ConstraintStore,
    config: ModelConfig,
    kernel: Kernel,
    parameters: InternalParameters,
    translation_factor: [f64; 3],
    scale_factor: [f64; 3],
    solution: Option<Solution>,
}

impl SingleSurface {
    /// Creates an unsolved method over the given constraints.
    pub fn new(config: ModelConfig, constraints: ConstraintStore) -> Self {
        let kernel = Kernel::from_params(&KernelParams::from(&config));
        SingleSurface {
            constraints,
            config,
            kernel,
            parameters: InternalParameters::default(),
            translation_factor: [0.0; 3],
            scale_factor: [1.0; 3],
            solution: None,
        }
    }

    /// Returns the configuration this method was built with.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn weights(&self) -> Result<&Solution, ModelingError> {
        self.solution.as_ref().ok_or(ModelingError::NotSolved)
    }

    fn layout(&self) -> BlockLayout {
        let p = &self.parameters;
        let interface = 0;
        let planar = interface + p.n_interface;
        let tangent = planar + 3 * p.n_planar;
        let inequality = tangent + p.n_tangent;
        let poly = inequality + p.n_inequality;
        BlockLayout {
            interface,
            planar,
            tangent,
            inequality,
            poly,
            dimension: poly + p.n_poly_terms,
        }
    }

    /// Evaluates every basis function at `position`: one entry per system
    /// column, in block order.
    fn basis_row_at(&self, position: &[f64; 3], layout: &BlockLayout) -> Vec<f64> {
        let mut row = vec![0.0; layout.dimension];

        for (i, c) in self.constraints.interface.iter().enumerate() {
            row[layout.interface + i] = self.kernel.value(position, &c.position);
        }
        for (k, c) in self.constraints.planar.iter().enumerate() {
            for s in Axis::ALL {
                row[layout.planar + 3 * k + s.index()] =
                    self.kernel.gradient_component(&c.position, position, s);
            }
        }
        for (m, c) in self.constraints.tangent.iter().enumerate() {
            let mut sum = 0.0;
            for s in Axis::ALL {
                sum += c.direction[s.index()]
                    * self.kernel.gradient_component(&c.position, position, s);
            }
            row[layout.tangent + m] = sum;
        }
        for q in 0..self.parameters.n_inequality {
            let c = &self.constraints.inequality[q];
            row[layout.inequality + q] = self.kernel.value(position, &c.position);
        }

        let poly = monomial_row(
            position,
            self.config.drift,
            &self.translation_factor,
            &self.scale_factor,
        );
        for (t, v) in poly.into_iter().enumerate() {
            row[layout.poly + t] = v;
        }

        row
    }

    /// Evaluates the `axis` partial derivative of every basis function at
    /// `position`.
    fn basis_gradient_row_at(
        &self,
        position: &[f64; 3],
        axis: Axis,
        layout: &BlockLayout,
    ) -> Vec<f64> {
        let mut row = vec![0.0; layout.dimension];

        for (i, c) in self.constraints.interface.iter().enumerate() {
            row[layout.interface + i] =
                self.kernel.gradient_component(position, &c.position, axis);
        }
        for (k, c) in self.constraints.planar.iter().enumerate() {
            for s in Axis::ALL {
                row[layout.planar + 3 * k + s.index()] =
                    self.kernel.mixed_partial(position, &c.position, axis, s);
            }
        }
        for (m, c) in self.constraints.tangent.iter().enumerate() {
            let mut sum = 0.0;
            for s in Axis::ALL {
                sum += c.direction[s.index()]
                    * self.kernel.mixed_partial(position, &c.position, axis, s);
            }
            row[layout.tangent + m] = sum;
        }
        for q in 0..self.parameters.n_inequality {
            let c = &self.constraints.inequality[q];
            row[layout.inequality + q] =
                self.kernel.gradient_component(position, &c.position, axis);
        }

        let poly = monomial_gradient_row(
            position,
            self.config.drift,
            axis,
            &self.translation_factor,
            &self.scale_factor,
        );
        for (t, v) in poly.into_iter().enumerate() {
            row[layout.poly + t] = v;
        }

        row
    }

    /// Fitted scalar field at `position`.
    fn scalar_at(&self, position: &[f64; 3]) -> Result<f64, ModelingError> {
        let solution = self.weights()?;
        let layout = self.layout();
        let row = self.basis_row_at(position, &layout);

        let mut value = 0.0;
        for (j, basis) in row.iter().enumerate() {
            value += basis * solution.weights[(j, 0)];
        }
        Ok(value)
    }

    /// Gradient of the fitted scalar field at `position`.
    fn vector_at(&self, position: &[f64; 3]) -> Result<[f64; 3], ModelingError> {
        let solution = self.weights()?;
        let layout = self.layout();

        let mut gradient = [0.0; 3];
        for axis in Axis::ALL {
            let row = self.basis_gradient_row_at(position, axis, &layout);
            for (j, basis) in row.iter().enumerate() {
                gradient[axis.index()] += basis * solution.weights[(j, 0)];
            }
        }
        Ok(gradient)
    }
}

impl ModelingMethod for SingleSurface {
    fn compute_parameters(&mut self) -> Result<(), ConfigError> {
        let c = &self.constraints;
        if c.is_empty() {
            return Err(ConfigError::EmptyConstraintStore);
        }
        if !c.inequality.is_empty() && self.config.problem_type == ProblemType::Linear {
            return Err(ConfigError::InequalityRequiresQuadratic {
                count: c.inequality.len(),
            });
        }

        let n_interface = c.interface.len();
        let n_planar = c.planar.len();
        let n_tangent = c.tangent.len();
        let n_inequality = c.inequality.len();
        let n_poly_terms = self.config.drift.basis_size();

        self.parameters = InternalParameters {
            n_interface,
            n_planar,
            n_tangent,
            n_inequality,
            n_constraints: n_interface + n_inequality + 3 * n_planar + n_tangent,
            n_equality: n_interface + 3 * n_planar + n_tangent,
            n_poly_terms,
            poly_term: n_poly_terms > 0,
            modified_basis: false,
            problem_type: self.config.problem_type,
        };

        let (translation, scale) = cube_scaling_factors(&c.positions());
        self.translation_factor = translation;
        self.scale_factor = scale;
        Ok(())
    }

    fn parameters(&self) -> &InternalParameters {
        &self.parameters
    }

    fn constraints(&self) -> &ConstraintStore {
        &self.constraints
    }

    fn system_dimension(&self) -> usize {
        self.layout().dimension
    }

    fn get_equality_values(&self) -> Mat<f64> {
        let p = &self.parameters;
        let mut values = Mat::<f64>::zeros(p.n_equality + p.n_poly_terms, 1);

        let mut row = 0;
        for c in &self.constraints.interface {
            values[(row, 0)] = c.value;
            row += 1;
        }
        for c in &self.constraints.planar {
            for axis in Axis::ALL {
                values[(row, 0)] = c.normal[axis.index()];
                row += 1;
            }
        }
        // Tangent rows and drift rows are homogeneous.
        values
    }

    fn get_interpolation_matrix(&self) -> Result<Mat<f64>, AssemblyError> {
        let layout = self.layout();
        let n = layout.dimension;
        if n == 0 {
            return Err(AssemblyError::EmptySystem);
        }

        let mut matrix = Mat::<f64>::zeros(n, n);
        fn write_row(matrix: &mut Mat<f64>, r: usize, row: Vec<f64>) {
            for (j, v) in row.into_iter().enumerate() {
                matrix[(r, j)] = v;
            }
        }

        for (i, c) in self.constraints.interface.iter().enumerate() {
            let row = self.basis_row_at(&c.position, &layout);
            write_row(&mut matrix, layout.interface + i, row);
        }
        for (k, c) in self.constraints.planar.iter().enumerate() {
            for axis in Axis::ALL {
                let row = self.basis_gradient_row_at(&c.position, axis, &layout);
                write_row(&mut matrix, layout.planar + 3 * k + axis.index(), row);
            }
        }
        for (m, c) in self.constraints.tangent.iter().enumerate() {
            let mut combined = vec![0.0; n];
            for axis in Axis::ALL {
                let row = self.basis_gradient_row_at(&c.position, axis, &layout);
                let direction = c.direction[axis.index()];
                for (j, v) in row.into_iter().enumerate() {
                    combined[j] += direction * v;
                }
            }
            write_row(&mut matrix, layout.tangent + m, combined);
        }
        for q in 0..self.parameters.n_inequality {
            let c = &self.constraints.inequality[q];
            let row = self.basis_row_at(&c.position, &layout);
            write_row(&mut matrix, layout.inequality + q, row);
        }
        // Drift rows mirror the drift columns already filled above.
        for t in 0..self.parameters.n_poly_terms {
            for col in 0..layout.poly {
                matrix[(layout.poly + t, col)] = matrix[(col, layout.poly + t)];
            }
        }

        for i in 0..n {
            for j in 0..n {
                if !matrix[(i, j)].is_finite() {
                    return Err(AssemblyError::NonFiniteEntry { row: i, col: j });
                }
            }
        }
        Ok(matrix)
    }

    fn get_inequality_matrix(&self) -> Result<Mat<f64>, AssemblyError> {
        let layout = self.layout();
        let n_q = self.parameters.n_inequality;

        let mut c_mat = Mat::<f64>::zeros(n_q, layout.dimension);
        for q in 0..n_q {
            let constraint = &self.constraints.inequality[q];
            let sign = match constraint.sense {
                InequalitySense::Above => 1.0,
                InequalitySense::Below => -1.0,
            };
            let row = self.basis_row_at(&constraint.position, &layout);
            for (j, v) in row.into_iter().enumerate() {
                if !v.is_finite() {
                    return Err(AssemblyError::NonFiniteEntry { row: q, col: j });
                }
                c_mat[(q, j)] = sign * v;
            }
        }
        Ok(c_mat)
    }

    fn get_inequality_values(&self) -> Mat<f64> {
        let n_q = self.parameters.n_inequality;
        let mut d = Mat::<f64>::zeros(n_q, 1);
        for q in 0..n_q {
            let constraint = &self.constraints.inequality[q];
            let sign = match constraint.sense {
                InequalitySense::Above => 1.0,
                InequalitySense::Below => -1.0,
            };
            d[(q, 0)] = sign * constraint.bound;
        }
        d
    }

    fn setup_system_solver(&mut self) -> Result<(), ModelingError> {
        self.compute_parameters()?;
        self.solution = None;

        let layout = self.layout();
        let matrix = self.get_interpolation_matrix()?;

        let weights = match self.parameters.problem_type {
            ProblemType::Linear => {
                let rhs = self.get_equality_values();
                solver::solve_linear(matrix.as_ref(), rhs.as_ref())?
            }
            ProblemType::Quadratic => {
                let n_equality = self.parameters.n_equality;
                let n_eq_rows = n_equality + self.parameters.n_poly_terms;
                // Equality rows sit before the inequality block; drift rows
                // close out the system.
                let a_eq = Mat::from_fn(n_eq_rows, layout.dimension, |r, j| {
                    let row = match r < n_equality {
                        true => r,
                        false => layout.poly + (r - n_equality),
                    };
                    matrix[(row, j)]
                });
                let b_eq = self.get_equality_values();
                let c_mat = self.get_inequality_matrix()?;
                let d = self.get_inequality_values();
                solver::solve_constrained(
                    matrix.as_ref(),
                    a_eq.as_ref(),
                    b_eq.as_ref(),
                    c_mat.as_ref(),
                    d.as_ref(),
                )?
            }
        };

        self.solution = Some(Solution {
            dimension: layout.dimension,
            weights,
        });
        Ok(())
    }

    fn eval_scalar_interpolant_at_point(&self, point: &mut Point) -> Result<(), ModelingError> {
        let value = self.scalar_at(&point.position())?;
        point.set_scalar_field(value);
        Ok(())
    }

    fn eval_vector_interpolant_at_point(&self, point: &mut Point) -> Result<(), ModelingError> {
        let value = self.vector_at(&point.position())?;
        point.set_vector_field(value);
        Ok(())
    }

    fn take_minimal_and_excluded_input(&mut self, seed_fraction: f64) -> ConstraintStore {
        let interface_positions: Vec<[f64; 3]> = self
            .constraints
            .interface
            .iter()
            .map(|c| c.position)
            .collect();
        let planar_positions: Vec<[f64; 3]> =
            self.constraints.planar.iter().map(|c| c.position).collect();

        let excluded_interface =
            crate::methods::excluded_after_sampling(&interface_positions, seed_fraction);
        let excluded_planar =
            crate::methods::excluded_after_sampling(&planar_positions, seed_fraction);

        self.solution = None;
        self.constraints
            .drain_selected(&excluded_interface, &excluded_planar)
    }

    fn append_greedy_input(&mut self, input: ConstraintStore) {
        self.solution = None;
        self.constraints.append(input);
    }

    fn measure_residuals(&self, input: &ConstraintStore) -> Result<ResidualSet, ModelingError> {
        let interface = input
            .interface
            .par_iter()
            .map(|c| Ok((self.scalar_at(&c.position)? - c.value).abs()))
            .collect::<Result<Vec<f64>, ModelingError>>()?;

        let planar = input
            .planar
            .par_iter()
            .map(|c| {
                let v = self.vector_at(&c.position)?;
                let mut worst = 0.0f64;
                for d in 0..3 {
                    worst = worst.max((v[d] - c.normal[d]).abs());
                }
                Ok(worst)
            })
            .collect::<Result<Vec<f64>, ModelingError>>()?;

        let tangent = input
            .tangent
            .par_iter()
            .map(|c| {
                let v = self.vector_at(&c.position)?;
                let mut dot = 0.0;
                for d in 0..3 {
                    dot += v[d] * c.direction[d];
                }
                Ok(dot.abs())
            })
            .collect::<Result<Vec<f64>, ModelingError>>()?;

        Ok(ResidualSet {
            interface,
            planar,
            tangent,
        })
    }

    fn duplicate(&self) -> Box<dyn ModelingMethod + Send + Sync> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Drift;
    use equator::assert;
    use geosurf_utils::KernelType;

    fn gaussian_config() -> ModelConfig {
        ModelConfig::builder(KernelType::GaussianRbf)
            .shape_parameter(1.0)
            .build()
    }

    fn mixed_store() -> ConstraintStore {
        let mut store = ConstraintStore::new();
        store.add_interface([0.0, 0.0, 0.0], 0.0);
        store.add_interface([1.0, 0.2, -0.3], 1.0);
        store.add_planar([0.5, 1.0, 0.0], [0.0, 0.0, 1.0]);
        store.add_tangent([-0.5, 0.5, 0.8], [1.0, 0.0, 0.0]);
        store
    }

    #[test]
    fn interface_values_reproduced_at_data() {
        let mut store = ConstraintStore::new();
        store.add_interface([0.0, 0.0, 0.0], 0.0);
        store.add_interface([1.0, 0.0, 0.0], 1.0);
        store.add_interface([0.0, 1.0, 0.0], -1.0);

        let mut method = SingleSurface::new(gaussian_config(), store);
        method.setup_system_solver().unwrap();

        for c in method.constraints().interface.clone() {
            let mut p = Point::new(c.position);
            method.eval_scalar_interpolant_at_point(&mut p).unwrap();
            assert!((p.scalar_field().unwrap() - c.value).abs() < 1e-8);
        }
    }

    #[test]
    fn constant_drift_adds_one_dimension_with_unit_entries() {
        let mut store = ConstraintStore::new();
        store.add_interface([0.0, 0.0, 0.0], 0.0);
        store.add_interface([1.0, 0.0, 0.0], 1.0);

        let config = ModelConfig::builder(KernelType::GaussianRbf)
            .drift(Drift::Constant)
            .build();
        let mut method = SingleSurface::new(config, store);
        method.compute_parameters().unwrap();

        let matrix = method.get_interpolation_matrix().unwrap();
        assert!(matrix.nrows() == 3);
        // Interface rows carry a unit drift entry; the drift block is zero.
        assert!(matrix[(0, 2)] == 1.0);
        assert!(matrix[(1, 2)] == 1.0);
        assert!(matrix[(2, 0)] == 1.0);
        assert!(matrix[(2, 1)] == 1.0);
        assert!(matrix[(2, 2)] == 0.0);
    }

    #[test]
    fn mixed_system_is_symmetric() {
        let config = ModelConfig::builder(KernelType::GaussianRbf)
            .drift(Drift::Linear)
            .build();
        let mut method = SingleSurface::new(config, mixed_store());
        method.compute_parameters().unwrap();

        let matrix = method.get_interpolation_matrix().unwrap();
        let n = matrix.nrows();
        assert!(n == method.parameters().n_equality + 4);
        for i in 0..n {
            for j in 0..n {
                assert!(matrix[(i, j)] == matrix[(j, i)]);
            }
        }
    }

    #[test]
    fn planar_normals_and_tangents_honored_at_data() {
        let mut method = SingleSurface::new(gaussian_config(), mixed_store());
        method.setup_system_solver().unwrap();

        let planar = method.constraints().planar.clone();
        for c in &planar {
            let mut p = Point::new(c.position);
            method.eval_vector_interpolant_at_point(&mut p).unwrap();
            let v = p.vector_field().unwrap();
            for d in 0..3 {
                assert!((v[d] - c.normal[d]).abs() < 1e-6);
            }
        }

        let residuals = method.measure_residuals(method.constraints()).unwrap();
        assert!(residuals.worst() < 1e-6);
    }

    #[test]
    fn planar_residual_is_max_component_deviation() {
        let mut method = SingleSurface::new(gaussian_config(), mixed_store());
        method.setup_system_solver().unwrap();

        let position = [0.2, -0.4, 0.9];
        let normal = [0.0, 1.0, 0.0];
        let mut candidates = ConstraintStore::new();
        candidates.add_planar(position, normal);

        let residuals = method.measure_residuals(&candidates).unwrap();

        let v = method.vector_at(&position).unwrap();
        let mut expected = 0.0f64;
        for d in 0..3 {
            expected = expected.max((v[d] - normal[d]).abs());
        }
        assert!(expected > 0.0);
        assert!(residuals.planar == vec![expected]);
    }

    #[test]
    fn thin_plate_spline_with_planar_data_fails_assembly() {
        let config = ModelConfig::builder(KernelType::ThinPlateSplineRbf).build();
        let mut store = ConstraintStore::new();
        store.add_planar([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        let mut method = SingleSurface::new(config, store);
        method.compute_parameters().unwrap();

        let err = method.get_interpolation_matrix().unwrap_err();
        assert!(matches!(err, AssemblyError::NonFiniteEntry { .. }));
    }

    #[test]
    fn linear_drift_reproduces_linear_fields_exactly() {
        // Values drawn from a field inside the drift space are reproduced
        // with zero kernel weights, so off-data evaluation is exact too.
        let linear_field = |p: &[f64; 3]| 2.0 * p[0] - p[1] + 3.0 * p[2] + 0.5;

        let mut store = ConstraintStore::new();
        for position in crate::common::generate_random_points(12, Some(7)) {
            store.add_interface(position, linear_field(&position));
        }

        let config = ModelConfig::builder(KernelType::MultiquadricRbf)
            .shape_parameter(0.5)
            .drift(Drift::Linear)
            .build();
        let mut method = SingleSurface::new(config, store);
        method.setup_system_solver().unwrap();

        for position in [[2.0, -1.0, 3.0], [-0.5, 0.5, -2.0]] {
            let mut p = Point::new(position);
            method.eval_scalar_interpolant_at_point(&mut p).unwrap();
            assert!((p.scalar_field().unwrap() - linear_field(&position)).abs() < 1e-6);
        }
    }

    #[test]
    fn inequality_with_linear_problem_is_rejected() {
        let mut store = ConstraintStore::new();
        store.add_interface([0.0, 0.0, 0.0], 0.0);
        store.add_inequality([1.0, 0.0, 0.0], 0.5, InequalitySense::Above);

        let mut method = SingleSurface::new(gaussian_config(), store);
        let err = method.compute_parameters().unwrap_err();
        assert!(err == ConfigError::InequalityRequiresQuadratic { count: 1 });
    }

    #[test]
    fn quadratic_fit_honors_lower_bound() {
        let mut store = ConstraintStore::new();
        store.add_interface([0.0, 0.0, 0.0], 0.0);
        store.add_interface([2.0, 0.0, 0.0], 1.0);
        store.add_inequality([1.0, 0.0, 0.0], 2.0, InequalitySense::Above);

        let config = ModelConfig::builder(KernelType::GaussianRbf)
            .problem_type(ProblemType::Quadratic)
            .build();
        let mut method = SingleSurface::new(config, store);
        method.setup_system_solver().unwrap();

        // Interface values stay exact while the bound lifts the midpoint.
        let mut p = Point::new([0.0, 0.0, 0.0]);
        method.eval_scalar_interpolant_at_point(&mut p).unwrap();
        assert!(p.scalar_field().unwrap().abs() < 1e-6);

        let mut q = Point::new([1.0, 0.0, 0.0]);
        method.eval_scalar_interpolant_at_point(&mut q).unwrap();
        assert!(q.scalar_field().unwrap() >= 2.0 - 1e-6);
    }

    #[test]
    fn quadratic_fit_with_inactive_bound_keeps_equalities_exact() {
        let mut store = ConstraintStore::new();
        store.add_interface([0.0, 0.0, 0.0], 0.0);
        store.add_interface([2.0, 0.0, 0.0], 1.0);
        store.add_inequality([1.0, 0.0, 0.0], -5.0, InequalitySense::Above);

        let config = ModelConfig::builder(KernelType::GaussianRbf)
            .problem_type(ProblemType::Quadratic)
            .build();
        let mut method = SingleSurface::new(config, store);
        method.setup_system_solver().unwrap();

        let residuals = method.measure_residuals(method.constraints()).unwrap();
        assert!(residuals.worst() < 1e-6);
    }

    #[test]
    fn greedy_hooks_split_and_restore_constraints() {
        let mut store = ConstraintStore::new();
        for i in 0..10 {
            store.add_interface([i as f64, 0.0, 0.0], i as f64);
        }
        let total = store.len();

        let mut method = SingleSurface::new(gaussian_config(), store);
        let excluded = method.take_minimal_and_excluded_input(0.3);

        assert!(method.constraints().len() >= 2);
        assert!(method.constraints().len() + excluded.len() == total);

        method.append_greedy_input(excluded);
        assert!(method.constraints().len() == total);
    }

    #[test]
    fn evaluation_before_solve_reports_not_solved() {
        let method = SingleSurface::new(gaussian_config(), mixed_store());
        let mut p = Point::new([0.0, 0.0, 0.0]);
        let err = method.eval_scalar_interpolant_at_point(&mut p).unwrap_err();
        assert!(err == ModelingError::NotSolved);
    }
}
