/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports the public modeling API: constraints, configuration, methods, and model IO.
//
// Created on: 12 Aug 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Generalized RBF modeling of implicit surfaces and vector fields
//!
//! Fits scalar and vector fields to structural observations using radial
//! basis function interpolation. Constraints come in four types:
//! on-surface values (interface), gradient observations (planar), gradient
//! orthogonality (tangent), and one-sided bounds (inequality). A fitting
//! strategy assembles them into one square system, solves it directly or
//! as a quadratic program, and evaluates the fitted field anywhere.
//!
//! ## Quick start
//!
//! ```
//! use geosurf::{ConstraintStore, KernelType, ModelConfig, ModelingMethod, Point, SingleSurface};
//!
//! let mut constraints = ConstraintStore::new();
//! constraints.add_interface([0.0, 0.0, 0.0], 0.0);
//! constraints.add_interface([1.0, 0.0, 0.0], 1.0);
//! constraints.add_planar([0.5, 0.5, 0.0], [0.0, 0.0, 1.0]);
//!
//! let config = ModelConfig::builder(KernelType::GaussianRbf).build();
//! let mut method = SingleSurface::new(config, constraints);
//! method.setup_system_solver()?;
//!
//! let mut point = Point::new([0.5, 0.0, 0.0]);
//! method.eval_scalar_interpolant_at_point(&mut point)?;
//! assert!(point.scalar_field().is_some());
//! # Ok::<(), geosurf::ModelingError>(())
//! ```

mod common;
mod config;
mod constraints;
mod error;
mod greedy;
mod methods;
mod model_io;
mod polynomials;
pub mod progress;
mod solver;

pub use {
    common::generate_random_points,
    config::{Drift, GreedyParams, ModelConfig, ModelConfigBuilder, ProblemType},
    constraints::{
        ConstraintStore, Inequality, InequalitySense, Interface, Planar, Point, Tangent,
    },
    error::{AssemblyError, ConfigError, ModelingError, SolveError},
    geosurf_utils::{Axis, KernelType},
    greedy::{GreedyFit, GreedyReducer},
    methods::{
        InternalParameters, ModelingMethod, ResidualSet, single_surface::SingleSurface,
        vector_field::VectorField,
    },
    model_io::{ModelIOError, load_model, save_model},
};
