/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements greedy constraint reduction: fit a seed subset, grow it by worst residual.
//
// Created on: 12 Aug 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::config::GreedyParams;
use crate::constraints::ConstraintStore;
use crate::error::ModelingError;
use crate::methods::{ModelingMethod, ResidualSet};
use crate::progress::{ProgressMsg, ProgressSink};
use geosurf_utils::argsort;
use std::sync::Arc;

/// Outcome of a greedy reduction, carrying the fitted method.
///
/// The method inside always holds the weights of the last successful fit;
/// when `converged` is false the fit is best effort, with the residual
/// level reached recorded in `achieved_residual`.
#[derive(Debug)]
pub struct GreedyFit<M> {
    pub method: M,
    pub converged: bool,
    pub achieved_residual: f64,
    pub iterations: usize,
    pub active_count: usize,
    pub excluded_count: usize,
}

/// Drives a modeling method through greedy constraint reduction.
///
/// Starting from a spatially spread seed subset, repeatedly fits the
/// active constraints, measures residuals on the excluded remainder, and
/// promotes the worst offenders until every excluded constraint is honored
/// within tolerance or the iteration budget runs out.
#[derive(Debug)]
pub struct GreedyReducer {
    params: GreedyParams,
    progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl GreedyReducer {
    /// Creates a reducer with the given controls.
    pub fn new(params: GreedyParams) -> Self {
        GreedyReducer {
            params,
            progress_callback: None,
        }
    }

    /// Installs a progress sink for iteration events.
    pub fn progress_callback(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress_callback = Some(sink);
        self
    }

    fn emit(&self, msg: ProgressMsg) {
        if let Some(sink) = &self.progress_callback {
            sink.emit(msg);
        }
    }

    /// Runs the reduction to completion and returns the fitted method.
    ///
    /// Exhausting the iteration budget is not an error: the fit from the
    /// final cycle is returned with `converged` set to false.
    pub fn reduce<M: ModelingMethod>(&self, mut method: M) -> Result<GreedyFit<M>, ModelingError> {
        method.compute_parameters()?;
        let mut excluded = method.take_minimal_and_excluded_input(self.params.seed_fraction);

        let mut iterations = 0;
        let mut converged = false;
        let mut achieved_residual;

        loop {
            method.setup_system_solver()?;
            self.emit(ProgressMsg::SolveCompleted {
                dimension: method.system_dimension(),
            });

            let residuals = method.measure_residuals(&excluded)?;
            achieved_residual = residuals.worst();

            self.emit(ProgressMsg::GreedyIteration {
                iter: iterations,
                active: method.constraints().len(),
                excluded: excluded.len(),
                worst_residual: achieved_residual,
            });

            if achieved_residual <= self.params.tolerance {
                converged = true;
                break;
            }
            if iterations >= self.params.max_iterations {
                break;
            }
            iterations += 1;

            let offenders = select_offenders(
                &mut excluded,
                &residuals,
                self.params.tolerance,
                self.params.batch_size,
            );
            if offenders.is_empty() {
                // Remaining offenders are of types the method cannot
                // promote; accept the fit as is.
                break;
            }
            method.append_greedy_input(offenders);
        }

        Ok(GreedyFit {
            converged,
            achieved_residual,
            iterations,
            active_count: method.constraints().len(),
            excluded_count: excluded.len(),
            method,
        })
    }
}

/// Moves up to `batch_size` of the worst offending interface and planar
/// constraints out of `excluded`, worst first.
fn select_offenders(
    excluded: &mut ConstraintStore,
    residuals: &ResidualSet,
    tolerance: f64,
    batch_size: usize,
) -> ConstraintStore {
    // Interface and planar residuals in one list; tangent constraints are
    // never excluded by the seeding, so their residuals are not promotable.
    let n_interface = residuals.interface.len();
    let mut combined = Vec::with_capacity(n_interface + residuals.planar.len());
    combined.extend(residuals.interface.iter().copied());
    combined.extend(residuals.planar.iter().copied());

    let order = argsort(&combined);

    let mut interface_indices = Vec::new();
    let mut planar_indices = Vec::new();
    for &idx in order.iter().rev() {
        if interface_indices.len() + planar_indices.len() >= batch_size {
            break;
        }
        if combined[idx] <= tolerance {
            break;
        }
        if idx < n_interface {
            interface_indices.push(idx);
        } else {
            planar_indices.push(idx - n_interface);
        }
    }

    excluded.drain_selected(&interface_indices, &planar_indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::constraints::Point;
    use crate::methods::single_surface::SingleSurface;
    use crate::progress::closure_sink;
    use equator::assert;
    use geosurf_utils::KernelType;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Interface samples of a smooth scalar field on a coarse grid.
    fn sampled_field_store() -> ConstraintStore {
        let mut store = ConstraintStore::new();
        for i in 0..5 {
            for j in 0..5 {
                let x = i as f64 * 0.5;
                let y = j as f64 * 0.5;
                let value = (0.7 * x).sin() + 0.3 * y;
                store.add_interface([x, y, 0.0], value);
            }
        }
        store
    }

    fn reducible_method() -> SingleSurface {
        let config = ModelConfig::builder(KernelType::GaussianRbf)
            .shape_parameter(2.0)
            .build();
        SingleSurface::new(config, sampled_field_store())
    }

    #[test]
    fn reduction_converges_on_smooth_data() {
        let params = GreedyParams {
            tolerance: 1e-4,
            max_iterations: 30,
            batch_size: 4,
            seed_fraction: 0.15,
        };
        let fit = GreedyReducer::new(params)
            .reduce(reducible_method())
            .unwrap();

        assert!(fit.converged);
        assert!(fit.achieved_residual <= params.tolerance);
        assert!(fit.active_count + fit.excluded_count == 25);

        // The returned method is solved and honors its active constraints.
        let mut p = Point::new([0.0, 0.0, 0.0]);
        fit.method
            .eval_scalar_interpolant_at_point(&mut p)
            .unwrap();
        assert!(p.scalar_field().is_some());
    }

    #[test]
    fn exhausted_budget_returns_best_effort_fit() {
        let params = GreedyParams {
            tolerance: 0.0,
            max_iterations: 1,
            batch_size: 1,
            seed_fraction: 0.1,
        };
        let fit = GreedyReducer::new(params)
            .reduce(reducible_method())
            .unwrap();

        assert!(!fit.converged);
        assert!(fit.iterations == 1);

        // Best-effort fit is still usable.
        let mut p = Point::new([1.0, 1.0, 0.0]);
        fit.method
            .eval_scalar_interpolant_at_point(&mut p)
            .unwrap();
        assert!(p.scalar_field().is_some());
    }

    #[test]
    fn progress_events_are_emitted() {
        static EVENTS: AtomicUsize = AtomicUsize::new(0);
        let (sink, handle) = closure_sink(64, |_msg| {
            EVENTS.fetch_add(1, Ordering::Relaxed);
        });

        let params = GreedyParams {
            tolerance: 1e-4,
            max_iterations: 30,
            batch_size: 4,
            seed_fraction: 0.15,
        };
        let fit = GreedyReducer::new(params)
            .progress_callback(sink)
            .reduce(reducible_method())
            .unwrap();
        assert!(fit.converged);

        drop(fit);
        // Listener exits once the last sender is dropped.
        handle.join().unwrap();
        assert!(EVENTS.load(Ordering::Relaxed) >= 2);
    }
}
