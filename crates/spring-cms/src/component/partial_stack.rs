// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use super::SharedComponent;

/// Components declared by partials, one frame per partial being rendered.
///
/// A partial's components are visible while it renders, including from
/// partials nested inside it, and disappear once it is unstacked. Lookups
/// search the innermost frame first.
#[derive(Debug, Default)]
pub struct PartialStack {
    frames: Vec<Vec<(String, SharedComponent)>>,
}

impl PartialStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a frame for a partial about to render.
    pub fn stack_partial(&mut self) {
        self.frames.push(Vec::new());
    }

    /// Closes the innermost frame.
    pub fn unstack_partial(&mut self) {
        self.frames.pop();
    }

    /// Registers a component in the innermost frame.
    pub fn add_component(&mut self, alias: impl Into<String>, component: SharedComponent) {
        if self.frames.is_empty() {
            self.stack_partial();
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.push((alias.into(), component));
        }
    }

    /// Finds a component by alias, innermost frame first.
    pub fn component(&self, alias: &str) -> Option<SharedComponent> {
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter())
            .find(|(name, _)| name == alias)
            .map(|(_, component)| component.clone())
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
