/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the error types reported by configuration, assembly, and solving.
//
// Created on: 12 Aug 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use std::error::Error;
use std::fmt;

/// Errors raised while validating a configuration against a constraint store.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The constraint store holds no constraints of any type.
    EmptyConstraintStore,
    /// Inequality constraints were supplied to a linear problem.
    InequalityRequiresQuadratic { count: usize },
    /// The selected method cannot use one or more of the supplied
    /// constraint types.
    UnsupportedConstraints {
        method: &'static str,
        interface: usize,
        tangent: usize,
        inequality: usize,
    },
    /// The selected method does not support a polynomial drift.
    DriftUnsupported { method: &'static str },
    /// The selected method has no data of the type it interpolates.
    MissingRequiredConstraints {
        method: &'static str,
        required: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyConstraintStore => {
                write!(f, "constraint store holds no constraints")
            }
            ConfigError::InequalityRequiresQuadratic { count } => write!(
                f,
                "{count} inequality constraint(s) require a quadratic problem type"
            ),
            ConfigError::UnsupportedConstraints {
                method,
                interface,
                tangent,
                inequality,
            } => write!(
                f,
                "{method} cannot use the supplied constraints \
                 ({interface} interface, {tangent} tangent, {inequality} inequality)"
            ),
            ConfigError::DriftUnsupported { method } => {
                write!(f, "{method} does not support a polynomial drift")
            }
            ConfigError::MissingRequiredConstraints { method, required } => {
                write!(f, "{method} requires at least one {required} constraint")
            }
        }
    }
}

impl Error for ConfigError {}

/// Errors raised while assembling the interpolation system.
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyError {
    /// A kernel or drift evaluation produced a non-finite matrix entry.
    NonFiniteEntry { row: usize, col: usize },
    /// The configuration and constraints produce a system with no unknowns.
    EmptySystem,
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyError::NonFiniteEntry { row, col } => {
                write!(f, "non-finite system entry at ({row}, {col})")
            }
            AssemblyError::EmptySystem => write!(f, "system has no unknowns"),
        }
    }
}

impl Error for AssemblyError {}

/// Errors raised by the linear and constrained solvers.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// The factorization completed but the solution does not satisfy the
    /// system; the matrix is singular or severely ill conditioned.
    Singular { relative_residual: f64 },
    /// The solve produced non-finite values.
    NonFinite,
    /// The inequality constraints admit no feasible solution.
    Infeasible,
    /// The active-set iteration failed to settle within its budget.
    IterationLimitExceeded { iterations: usize },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Singular { relative_residual } => write!(
                f,
                "system is singular or ill conditioned (relative residual {relative_residual:.3e})"
            ),
            SolveError::NonFinite => write!(f, "solve produced non-finite values"),
            SolveError::Infeasible => {
                write!(f, "inequality constraints admit no feasible solution")
            }
            SolveError::IterationLimitExceeded { iterations } => {
                write!(f, "active-set iteration failed to settle in {iterations} iterations")
            }
        }
    }
}

impl Error for SolveError {}

/// Top-level error type for the modeling methods.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelingError {
    Config(ConfigError),
    Assembly(AssemblyError),
    Solve(SolveError),
    /// An evaluation or residual query was made before a successful solve.
    NotSolved,
}

impl fmt::Display for ModelingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelingError::Config(e) => write!(f, "configuration: {e}"),
            ModelingError::Assembly(e) => write!(f, "assembly: {e}"),
            ModelingError::Solve(e) => write!(f, "solve: {e}"),
            ModelingError::NotSolved => {
                write!(f, "model has not been solved; call setup_system_solver first")
            }
        }
    }
}

impl Error for ModelingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModelingError::Config(e) => Some(e),
            ModelingError::Assembly(e) => Some(e),
            ModelingError::Solve(e) => Some(e),
            ModelingError::NotSolved => None,
        }
    }
}

impl From<ConfigError> for ModelingError {
    fn from(e: ConfigError) -> Self {
        ModelingError::Config(e)
    }
}

impl From<AssemblyError> for ModelingError {
    fn from(e: AssemblyError) -> Self {
        ModelingError::Assembly(e)
    }
}

impl From<SolveError> for ModelingError {
    fn from(e: SolveError) -> Self {
        ModelingError::Solve(e)
    }
}
