/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the vector field method: fits a gradient basis to planar orientation data.
//
// Created on: 12 Aug 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::config::{ModelConfig, ProblemType};
use crate::constraints::{ConstraintStore, Point};
use crate::error::{AssemblyError, ConfigError, ModelingError};
use crate::methods::{InternalParameters, ModelingMethod, ResidualSet, Solution};
use crate::solver;
use faer::Mat;
use geosurf_utils::{Axis, Kernel, KernelParams};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const METHOD_NAME: &str = "vector field";

/// Fits a vector field to planar orientation data alone.
///
/// Each planar constraint contributes three gradient basis functions, one
/// per axis, and three equality rows pinning the interpolated gradient to
/// the observed normal. The system is always square and linear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorField {
    constraints: ConstraintStore,
    config: ModelConfig,
    kernel: Kernel,
    parameters: InternalParameters,
    solution: Option<Solution>,
}

impl VectorField {
    /// Creates an unsolved method over the given constraints.
    pub fn new(config: ModelConfig, constraints: ConstraintStore) -> Self {
        let kernel = Kernel::from_params(&KernelParams::from(&config));
        VectorField {
            constraints,
            config,
            kernel,
            parameters: InternalParameters::default(),
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

    /// Scalar potential of the fitted basis at `position`.
    ///
    /// The vector interpolant is the spatial gradient of this value.
    fn scalar_at(&self, position: &[f64; 3]) -> Result<f64, ModelingError> {
        let solution = self.weights()?;

        let mut elemsum = 0.0;
        for (k, planar) in self.constraints.planar.iter().enumerate() {
            for axis in Axis::ALL {
                let basis = self
                    .kernel
                    .gradient_component(&planar.position, position, axis);
                elemsum += solution.weights[(3 * k + axis.index(), 0)] * basis;
            }
        }
        Ok(elemsum)
    }

    /// Fitted vector field at `position`.
    fn vector_at(&self, position: &[f64; 3]) -> Result<[f64; 3], ModelingError> {
        let solution = self.weights()?;

        let mut elemsum = [0.0; 3];
        for (k, planar) in self.constraints.planar.iter().enumerate() {
            for r in Axis::ALL {
                for s in Axis::ALL {
                    let basis = self
                        .kernel
                        .mixed_partial(position, &planar.position, r, s);
                    elemsum[r.index()] += solution.weights[(3 * k + s.index(), 0)] * basis;
                }
            }
        }
        Ok(elemsum)
    }
}

impl ModelingMethod for VectorField {
    fn compute_parameters(&mut self) -> Result<(), ConfigError> {
        let c = &self.constraints;
        if c.is_empty() {
            return Err(ConfigError::EmptyConstraintStore);
        }
        if c.planar.is_empty() {
            return Err(ConfigError::MissingRequiredConstraints {
                method: METHOD_NAME,
                required: "planar",
            });
        }
        if !c.interface.is_empty() || !c.tangent.is_empty() || !c.inequality.is_empty() {
            return Err(ConfigError::UnsupportedConstraints {
                method: METHOD_NAME,
                interface: c.interface.len(),
                tangent: c.tangent.len(),
                inequality: c.inequality.len(),
            });
        }
        if self.config.drift != crate::config::Drift::None {
            return Err(ConfigError::DriftUnsupported {
                method: METHOD_NAME,
            });
        }

        let n_planar = c.planar.len();
        self.parameters = InternalParameters {
            n_interface: 0,
            n_planar,
            n_tangent: 0,
            n_inequality: 0,
            n_constraints: 3 * n_planar,
            n_equality: 3 * n_planar,
            n_poly_terms: 0,
            poly_term: false,
            modified_basis: false,
            problem_type: ProblemType::Linear,
        };
        Ok(())
    }

    fn parameters(&self) -> &InternalParameters {
        &self.parameters
    }

    fn constraints(&self) -> &ConstraintStore {
        &self.constraints
    }

    fn system_dimension(&self) -> usize {
        3 * self.parameters.n_planar
    }

    fn get_equality_values(&self) -> Mat<f64> {
        let n_planar = self.constraints.planar.len();
        let mut values = Mat::<f64>::zeros(3 * n_planar, 1);
        for (j, planar) in self.constraints.planar.iter().enumerate() {
            for axis in Axis::ALL {
                values[(3 * j + axis.index(), 0)] = planar.normal[axis.index()];
            }
        }
        values
    }

    fn get_interpolation_matrix(&self) -> Result<Mat<f64>, AssemblyError> {
        let planar = &self.constraints.planar;
        let n = 3 * planar.len();

        let mut matrix = Mat::<f64>::zeros(n, n);
        for (j, row_constraint) in planar.iter().enumerate() {
            for (k, col_constraint) in planar.iter().enumerate() {
                for r in Axis::ALL {
                    for s in Axis::ALL {
                        matrix[(3 * j + r.index(), 3 * k + s.index())] =
                            self.kernel.mixed_partial(
                                &row_constraint.position,
                                &col_constraint.position,
                                r,
                                s,
                            );
                    }
                }
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

    fn setup_system_solver(&mut self) -> Result<(), ModelingError> {
        self.compute_parameters()?;
        self.solution = None;

        let matrix = self.get_interpolation_matrix()?;
        let rhs = self.get_equality_values();
        let weights = solver::solve_linear(matrix.as_ref(), rhs.as_ref())?;

        self.solution = Some(Solution {
            dimension: matrix.nrows(),
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
        let positions: Vec<[f64; 3]> =
            self.constraints.planar.iter().map(|p| p.position).collect();
        let excluded = crate::methods::excluded_after_sampling(&positions, seed_fraction);

        self.solution = None;
        self.constraints.drain_selected(&[], &excluded)
    }

    fn append_greedy_input(&mut self, input: ConstraintStore) {
        self.solution = None;
        self.constraints.append(input);
    }

    fn measure_residuals(&self, input: &ConstraintStore) -> Result<ResidualSet, ModelingError> {
        let planar = input
            .planar
            .par_iter()
            .map(|constraint| {
                let v = self.vector_at(&constraint.position)?;
                let mut worst = 0.0f64;
                for d in 0..3 {
                    worst = worst.max((v[d] - constraint.normal[d]).abs());
                }
                Ok(worst)
            })
            .collect::<Result<Vec<f64>, ModelingError>>()?;

        Ok(ResidualSet {
            interface: Vec::new(),
            planar,
            tangent: Vec::new(),
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

    fn two_planar_store() -> ConstraintStore {
        let mut store = ConstraintStore::new();
        store.add_planar([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        store.add_planar([1.0, 1.0, 1.0], [0.0, 1.0, 0.0]);
        store
    }

    fn cubic_config() -> ModelConfig {
        ModelConfig::builder(KernelType::CubicRbf).build()
    }

    #[test]
    fn two_planar_system_is_square_and_symmetric() {
        let mut method = VectorField::new(cubic_config(), two_planar_store());
        method.compute_parameters().unwrap();

        assert!(method.parameters().n_constraints == 6);
        assert!(method.parameters().n_equality == 6);

        let matrix = method.get_interpolation_matrix().unwrap();
        assert!(matrix.nrows() == 6);
        assert!(matrix.ncols() == 6);
        for i in 0..6 {
            for j in 0..6 {
                assert!(matrix[(i, j)] == matrix[(j, i)]);
            }
        }
    }

    #[test]
    fn equality_values_are_concatenated_normals() {
        let mut method = VectorField::new(cubic_config(), two_planar_store());
        method.compute_parameters().unwrap();

        let values = method.get_equality_values();
        assert!(values.nrows() == 6);
        assert!(values.ncols() == 1);

        let expected = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        for (row, &component) in expected.iter().enumerate() {
            assert!(values[(row, 0)] == component);
        }
    }

    #[test]
    fn solved_field_reproduces_normals_at_data() {
        let mut method = VectorField::new(cubic_config(), two_planar_store());
        method.setup_system_solver().unwrap();

        let normals = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        for (k, planar) in method.constraints().planar.clone().iter().enumerate() {
            let mut p = Point::new(planar.position);
            method.eval_vector_interpolant_at_point(&mut p).unwrap();
            let v = p.vector_field().unwrap();
            for d in 0..3 {
                assert!((v[d] - normals[k][d]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn vector_interpolant_is_gradient_of_scalar_interpolant() {
        let mut store = two_planar_store();
        store.add_planar([-1.0, 0.5, 2.0], [0.0, 0.0, 1.0]);
        let config = ModelConfig::builder(KernelType::GaussianRbf)
            .shape_parameter(0.6)
            .build();
        let mut method = VectorField::new(config, store);
        method.setup_system_solver().unwrap();

        let q = [0.3, -0.2, 0.7];
        let h = 1e-5;
        let v = method.vector_at(&q).unwrap();

        for axis in Axis::ALL {
            let mut fwd = q;
            fwd[axis.index()] += h;
            let mut bwd = q;
            bwd[axis.index()] -= h;
            let numeric =
                (method.scalar_at(&fwd).unwrap() - method.scalar_at(&bwd).unwrap()) / (2.0 * h);
            assert!((v[axis.index()] - numeric).abs() < 1e-5);
        }
    }

    #[test]
    fn rejects_unsupported_constraints_and_drift() {
        let mut store = two_planar_store();
        store.add_interface([0.5, 0.5, 0.5], 0.0);
        let mut method = VectorField::new(cubic_config(), store);
        let err = method.compute_parameters().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedConstraints { .. }));

        let config = ModelConfig::builder(KernelType::CubicRbf)
            .drift(Drift::Linear)
            .build();
        let mut method = VectorField::new(config, two_planar_store());
        let err = method.compute_parameters().unwrap_err();
        assert!(matches!(err, ConfigError::DriftUnsupported { .. }));
    }

    #[test]
    fn evaluation_before_solve_reports_not_solved() {
        let method = VectorField::new(cubic_config(), two_planar_store());
        let mut p = Point::new([0.0, 0.0, 0.0]);
        let err = method.eval_vector_interpolant_at_point(&mut p).unwrap_err();
        assert!(err == ModelingError::NotSolved);
    }
}
