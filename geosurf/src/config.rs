/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides configuration and builder types for the modeling methods.
//
// Created on: 12 Aug 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use geosurf_utils::{KernelParams, KernelType};
use serde::{Deserialize, Serialize};

/// Polynomial drift appended to the kernel basis.
///
/// The drift absorbs the smooth regional trend so the kernel weights only
/// have to model residual structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Drift {
    /// Kernel-only interpolation.
    None,
    /// A single constant term.
    Constant,
    /// Constant plus first-order monomials.
    Linear,
    /// Constant plus first- and second-order monomials.
    Quadratic,
}

impl Drift {
    /// Polynomial degree of the drift, `-1` when absent.
    pub(crate) fn degree(self) -> i32 {
        match self {
            Drift::None => -1,
            Drift::Constant => 0,
            Drift::Linear => 1,
            Drift::Quadratic => 2,
        }
    }

    /// Number of monomial basis terms in three dimensions.
    ///
    /// For degree `p` this is `(p + 1)(p + 2)(p + 3) / 6`.
    pub(crate) fn basis_size(self) -> usize {
        let k = (self.degree() + 1) as usize;
        k * (k + 1) * (k + 2) / 6
    }
}

/// Whether the fit is a square equality solve or a constrained minimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProblemType {
    /// Equality constraints only; the system is square and solved directly.
    #[default]
    Linear,
    /// Equality constraints plus one-sided bounds, solved as a quadratic
    /// program. Required whenever inequality constraints are present.
    Quadratic,
}

/// Controls for greedy constraint reduction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GreedyParams {
    /// Largest acceptable residual on excluded constraints.
    pub tolerance: f64,

    /// Maximum number of fit/measure cycles before giving up.
    pub max_iterations: usize,

    /// Maximum number of constraints promoted into the active set per cycle.
    pub batch_size: usize,

    /// Fraction of each reducible constraint type used to seed the active set.
    pub seed_fraction: f64,
}

impl Default for GreedyParams {
    fn default() -> Self {
        GreedyParams {
            tolerance: 1e-3,
            max_iterations: 50,
            batch_size: 32,
            seed_fraction: 0.05,
        }
    }
}

/// Full configuration for a modeling method.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Radial kernel used for every basis function.
    pub kernel_type: KernelType,

    /// Shape parameter forwarded to parameterised kernels.
    pub shape_parameter: f64,

    /// Polynomial drift appended to the kernel basis.
    pub drift: Drift,

    /// Square solve or constrained minimization.
    pub problem_type: ProblemType,

    /// Greedy reduction controls; `None` fits all constraints directly.
    pub greedy: Option<GreedyParams>,
}

impl ModelConfig {
    /// Begins building a [`ModelConfig`] for the given kernel type.
    pub fn builder(kernel_type: KernelType) -> ModelConfigBuilder {
        ModelConfigBuilder {
            kernel_type,
            shape_parameter: 1.0,
            drift: Drift::None,
            problem_type: ProblemType::Linear,
            greedy: None,
        }
    }
}

/// Builder for [`ModelConfig`] that provides sensible defaults.
#[derive(Debug, Clone, Copy)]
pub struct ModelConfigBuilder {
    kernel_type: KernelType,
    shape_parameter: f64,
    drift: Drift,
    problem_type: ProblemType,
    greedy: Option<GreedyParams>,
}

impl ModelConfigBuilder {
    /// Sets the kernel shape parameter.
    pub fn shape_parameter(mut self, v: f64) -> Self {
        self.shape_parameter = v;
        self
    }

    /// Sets the polynomial drift.
    pub fn drift(mut self, v: Drift) -> Self {
        self.drift = v;
        self
    }

    /// Sets the problem type.
    pub fn problem_type(mut self, v: ProblemType) -> Self {
        self.problem_type = v;
        self
    }

    /// Enables greedy constraint reduction with the given controls.
    pub fn greedy(mut self, v: GreedyParams) -> Self {
        self.greedy = Some(v);
        self
    }

    /// Finalises the builder into a [`ModelConfig`] value.
    pub fn build(self) -> ModelConfig {
        assert!(self.shape_parameter > 0.0);
        ModelConfig {
            kernel_type: self.kernel_type,
            shape_parameter: self.shape_parameter,
            drift: self.drift,
            problem_type: self.problem_type,
            greedy: self.greedy,
        }
    }
}

impl From<&ModelConfig> for KernelParams {
    fn from(config: &ModelConfig) -> Self {
        KernelParams::builder(config.kernel_type)
            .shape_parameter(config.shape_parameter)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;

    #[test]
    fn drift_basis_sizes() {
        assert!(Drift::None.basis_size() == 0);
        assert!(Drift::Constant.basis_size() == 1);
        assert!(Drift::Linear.basis_size() == 4);
        assert!(Drift::Quadratic.basis_size() == 10);
    }

    #[test]
    fn builder_defaults() {
        let config = ModelConfig::builder(KernelType::CubicRbf).build();
        assert!(config.drift == Drift::None);
        assert!(config.problem_type == ProblemType::Linear);
        assert!(config.greedy.is_none());
        assert!(config.shape_parameter == 1.0);
    }
}
