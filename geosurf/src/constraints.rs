/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the structural constraint types and the typed store that holds them.
//
// Created on: 12 Aug 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

/// A query location in space, with slots for evaluated field values.
///
/// Evaluation routines write into the `scalar_field` / `vector_field`
/// slots; both stay `None` until the corresponding evaluation has run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Point {
    position: [f64; 3],
    scalar_field: Option<f64>,
    vector_field: Option<[f64; 3]>,
}

impl Point {
    /// Creates a point at `position` with no evaluated fields.
    pub fn new(position: [f64; 3]) -> Self {
        Point {
            position,
            scalar_field: None,
            vector_field: None,
        }
    }

    /// Returns the spatial position.
    pub fn position(&self) -> [f64; 3] {
        self.position
    }

    /// Returns the evaluated scalar field value, if any.
    pub fn scalar_field(&self) -> Option<f64> {
        self.scalar_field
    }

    /// Returns the evaluated vector field value, if any.
    pub fn vector_field(&self) -> Option<[f64; 3]> {
        self.vector_field
    }

    pub(crate) fn set_scalar_field(&mut self, value: f64) {
        self.scalar_field = Some(value);
    }

    pub(crate) fn set_vector_field(&mut self, value: [f64; 3]) {
        self.vector_field = Some(value);
    }
}

/// An on-surface observation: the scalar field takes `value` at `position`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Interface {
    pub position: [f64; 3],
    pub value: f64,
}

impl Interface {
    pub fn new(position: [f64; 3], value: f64) -> Self {
        Interface { position, value }
    }
}

/// An orientation observation: the field gradient equals `normal` at `position`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Planar {
    pub position: [f64; 3],
    pub normal: [f64; 3],
}

impl Planar {
    pub fn new(position: [f64; 3], normal: [f64; 3]) -> Self {
        Planar { position, normal }
    }
}

/// A directional observation: the field gradient is orthogonal to
/// `direction` at `position`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tangent {
    pub position: [f64; 3],
    pub direction: [f64; 3],
}

impl Tangent {
    pub fn new(position: [f64; 3], direction: [f64; 3]) -> Self {
        Tangent {
            position,
            direction,
        }
    }
}

/// Which side of the bound an inequality constraint enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InequalitySense {
    /// The field value must be greater than or equal to the bound.
    Above,
    /// The field value must be less than or equal to the bound.
    Below,
}

/// A one-sided bound on the scalar field at `position`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Inequality {
    pub position: [f64; 3],
    pub bound: f64,
    pub sense: InequalitySense,
}

impl Inequality {
    pub fn new(position: [f64; 3], bound: f64, sense: InequalitySense) -> Self {
        Inequality {
            position,
            bound,
            sense,
        }
    }
}

/// Ordered collection of structural constraints, grouped by type.
///
/// Insertion order within each group is preserved; system rows and
/// residual vectors are aligned with that order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstraintStore {
    pub interface: Vec<Interface>,
    pub planar: Vec<Planar>,
    pub tangent: Vec<Tangent>,
    pub inequality: Vec<Inequality>,
}

impl ConstraintStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        ConstraintStore::default()
    }

    /// Adds an interface constraint.
    pub fn add_interface(&mut self, position: [f64; 3], value: f64) {
        self.interface.push(Interface::new(position, value));
    }

    /// Adds a planar constraint.
    pub fn add_planar(&mut self, position: [f64; 3], normal: [f64; 3]) {
        self.planar.push(Planar::new(position, normal));
    }

    /// Adds a tangent constraint.
    pub fn add_tangent(&mut self, position: [f64; 3], direction: [f64; 3]) {
        self.tangent.push(Tangent::new(position, direction));
    }

    /// Adds an inequality constraint.
    pub fn add_inequality(&mut self, position: [f64; 3], bound: f64, sense: InequalitySense) {
        self.inequality.push(Inequality::new(position, bound, sense));
    }

    /// Returns `true` when no constraints of any type are present.
    pub fn is_empty(&self) -> bool {
        self.interface.is_empty()
            && self.planar.is_empty()
            && self.tangent.is_empty()
            && self.inequality.is_empty()
    }

    /// Total number of constraints across every type.
    pub fn len(&self) -> usize {
        self.interface.len() + self.planar.len() + self.tangent.len() + self.inequality.len()
    }

    /// Positions of every constraint, in group order.
    pub fn positions(&self) -> Vec<[f64; 3]> {
        let mut positions = Vec::with_capacity(self.len());
        positions.extend(self.interface.iter().map(|c| c.position));
        positions.extend(self.planar.iter().map(|c| c.position));
        positions.extend(self.tangent.iter().map(|c| c.position));
        positions.extend(self.inequality.iter().map(|c| c.position));
        positions
    }

    /// Moves every constraint from `other` into this store, preserving order.
    pub fn append(&mut self, mut other: ConstraintStore) {
        self.interface.append(&mut other.interface);
        self.planar.append(&mut other.planar);
        self.tangent.append(&mut other.tangent);
        self.inequality.append(&mut other.inequality);
    }

    /// Removes the interface and planar constraints at the given indices and
    /// returns them as a new store, preserving relative order on both sides.
    pub(crate) fn drain_selected(
        &mut self,
        interface_indices: &[usize],
        planar_indices: &[usize],
    ) -> ConstraintStore {
        let mut drained = ConstraintStore::new();
        drained.interface = drain_indices(&mut self.interface, interface_indices);
        drained.planar = drain_indices(&mut self.planar, planar_indices);
        drained
    }
}

/// Removes the elements at `indices` from `items`, returning them in their
/// original relative order.
fn drain_indices<T>(items: &mut Vec<T>, indices: &[usize]) -> Vec<T> {
    let mut take = vec![false; items.len()];
    for &idx in indices {
        take[idx] = true;
    }

    let mut taken = Vec::with_capacity(indices.len());
    let mut kept = Vec::with_capacity(items.len() - indices.len());
    for (idx, item) in items.drain(..).enumerate() {
        if take[idx] {
            taken.push(item);
        } else {
            kept.push(item);
        }
    }
    *items = kept;
    taken
}
