/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the direct linear solve and the active-set constrained solve.
//
// Created on: 12 Aug 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::error::SolveError;
use faer::linalg::solvers::Solve;
use faer::{Mat, MatRef};

/// Largest acceptable value of `|Ax - b| / |b|` after a direct solve.
pub(crate) const MAX_RELATIVE_RESIDUAL: f64 = 1e-8;

/// Slack below which an inequality bound counts as violated, and the
/// magnitude below which a multiplier counts as nonnegative.
const ACTIVE_SET_TOLERANCE: f64 = 1e-9;

/// Solves the square system `A x = b` by partial-pivot LU.
///
/// The factorization itself never signals rank deficiency, so the solution
/// is validated against the relative residual; a residual above
/// [`MAX_RELATIVE_RESIDUAL`] is reported as [`SolveError::Singular`].
pub(crate) fn solve_linear(a: MatRef<'_, f64>, b: MatRef<'_, f64>) -> Result<Mat<f64>, SolveError> {
    let lu = a.partial_piv_lu();
    let x = lu.solve(b);

    let ax = a * x.as_ref();
    let b_owned = b.to_owned();
    let residual = &ax - &b_owned;

    let relative = residual.norm_l2() / b_owned.norm_l2().max(f64::MIN_POSITIVE);
    if !relative.is_finite() {
        return Err(SolveError::NonFinite);
    }
    if relative > MAX_RELATIVE_RESIDUAL {
        return Err(SolveError::Singular {
            relative_residual: relative,
        });
    }

    Ok(x)
}

/// Minimizes `w' H w / 2` subject to `A_eq w = b_eq` and `C w >= d` with a
/// primal active-set iteration.
///
/// Each step solves the KKT system for the current working set of bounds
/// held at equality, then either activates the most violated bound,
/// deactivates the bound with the most negative multiplier, or accepts the
/// iterate. A rank-deficient KKT system is reported as infeasible, since it
/// arises from contradictory bounds in the working set.
pub(crate) fn solve_constrained(
    h: MatRef<'_, f64>,
    a_eq: MatRef<'_, f64>,
    b_eq: MatRef<'_, f64>,
    c: MatRef<'_, f64>,
    d: MatRef<'_, f64>,
) -> Result<Mat<f64>, SolveError> {
    let n = h.nrows();
    let n_eq = a_eq.nrows();
    let n_ineq = c.nrows();

    // Every bound can be activated and deactivated a bounded number of
    // times in a non-degenerate problem.
    let max_iterations = 3 * n_ineq + 10;

    let mut active: Vec<usize> = Vec::new();
    let mut is_active = vec![false; n_ineq];

    for _ in 0..max_iterations {
        let n_working = n_eq + active.len();
        let dim = n + n_working;

        // KKT system [[H, -G'], [G, 0]] [w; lambda] = [0; g] for the
        // working set G w = g.
        let mut kkt = Mat::<f64>::zeros(dim, dim);
        let mut rhs = Mat::<f64>::zeros(dim, 1);

        for i in 0..n {
            for j in 0..n {
                kkt[(i, j)] = *h.get(i, j);
            }
        }
        for r in 0..n_eq {
            for j in 0..n {
                let g = *a_eq.get(r, j);
                kkt[(n + r, j)] = g;
                kkt[(j, n + r)] = -g;
            }
            rhs[(n + r, 0)] = *b_eq.get(r, 0);
        }
        for (k, &row) in active.iter().enumerate() {
            for j in 0..n {
                let g = *c.get(row, j);
                kkt[(n + n_eq + k, j)] = g;
                kkt[(j, n + n_eq + k)] = -g;
            }
            rhs[(n + n_eq + k, 0)] = *d.get(row, 0);
        }

        let sol = match solve_linear(kkt.as_ref(), rhs.as_ref()) {
            Ok(sol) => sol,
            Err(SolveError::Singular { .. }) | Err(SolveError::NonFinite) => {
                return Err(SolveError::Infeasible);
            }
            Err(e) => return Err(e),
        };
        let w = sol.as_ref().subrows(0, n).to_owned();

        // Activate the most violated inactive bound, if any.
        let mut worst_violation = -ACTIVE_SET_TOLERANCE;
        let mut worst_row = None;
        for row in 0..n_ineq {
            if is_active[row] {
                continue;
            }
            let mut slack = -*d.get(row, 0);
            for j in 0..n {
                slack += *c.get(row, j) * w[(j, 0)];
            }
            if slack < worst_violation {
                worst_violation = slack;
                worst_row = Some(row);
            }
        }
        if let Some(row) = worst_row {
            active.push(row);
            is_active[row] = true;
            continue;
        }

        // All bounds hold; release the bound with the most negative
        // multiplier, or accept the iterate if there is none.
        let mut most_negative = -ACTIVE_SET_TOLERANCE;
        let mut release_at = None;
        for k in 0..active.len() {
            let lambda = sol[(n + n_eq + k, 0)];
            if lambda < most_negative {
                most_negative = lambda;
                release_at = Some(k);
            }
        }
        match release_at {
            Some(k) => {
                let row = active.remove(k);
                is_active[row] = false;
            }
            None => return Ok(w),
        }
    }

    Err(SolveError::IterationLimitExceeded {
        iterations: max_iterations,
    })
}
