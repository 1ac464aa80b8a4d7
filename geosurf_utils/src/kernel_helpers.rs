/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides parameter and builder types for configuring RBF kernels.
//
// Created on: 12 Aug 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::utils::KernelType;
use serde::{Deserialize, Serialize};

/// Defines the [`KernelType`] to use, along with the shape parameter
/// for parameterised kernels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KernelParams {
    /// KernelType enum variant to use.
    pub kernel_type: KernelType,

    /// Controls the width of the radial profile. Smaller values restrict
    /// influence to a local neighborhood, while larger values produce
    /// smoother, broader effects.
    ///
    /// Typically chosen based on the spacing of your data.
    /// Only used in the Gaussian and Multiquadric kernels.
    pub shape_parameter: f64,
}

impl KernelParams {
    /// Begins building a [`KernelParams`] instance for the given kernel type.
    pub fn builder(kernel_type: KernelType) -> KernelParamsBuilder {
        KernelParamsBuilder {
            kernel_type,
            shape_parameter: 1.0,
        }
    }
}

/// Builder for [`KernelParams`] that provides sensible defaults.
#[derive(Debug, Clone, Copy)]
pub struct KernelParamsBuilder {
    kernel_type: KernelType,
    shape_parameter: f64,
}

impl KernelParamsBuilder {
    /// Sets the `shape_parameter` on the builder.
    pub fn shape_parameter(mut self, v: f64) -> Self {
        self.shape_parameter = v;
        self
    }

    /// Finalises the builder into a [`KernelParams`] value.
    pub fn build(self) -> KernelParams {
        assert!(self.shape_parameter > 0.0);
        KernelParams {
            kernel_type: self.kernel_type,
            shape_parameter: self.shape_parameter,
        }
    }
}
