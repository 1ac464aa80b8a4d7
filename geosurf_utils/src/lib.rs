/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports kernel calculus, parameter types, and helper functions used across the geosurf crates.
//
// Created on: 12 Aug 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities for the [`geosurf`] crate
mod kernel_helpers;
mod rbf_kernels;
mod traits;
mod utils;

/// Implemented kernels for use in the [`geosurf`] crate.
pub mod kernels {
    pub use super::rbf_kernels::*;
}

pub use {
    kernel_helpers::{KernelParams, KernelParamsBuilder},
    rbf_kernels::RadialKernel,
    traits::KernelFromParams,
    utils::{Axis, Kernel, KernelType, argsort, distance, farthest_point_sampling},
};
