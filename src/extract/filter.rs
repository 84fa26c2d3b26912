//! Triviality filter for accessor-like units
//!
//! A unit is dropped when its name starts with an accessor prefix and its body
//! holds few statement terminators. Counting terminator characters is a cheap
//! stand-in for a statement count: `settle()` or `isolate()` with short bodies
//! are dropped too, and expression-bodied accessors without `;` survive only
//! if they carry more terminators than the threshold. Both are accepted.

use super::CodeUnit;
use crate::config::Heuristics;

/// Drops low-information accessors
#[derive(Debug, Clone)]
pub struct TrivialityFilter {
    prefixes: Vec<String>,
    terminator: char,
    max_terminators: usize,
}

impl TrivialityFilter {
    pub fn new(heuristics: &Heuristics) -> Self {
        Self {
            prefixes: heuristics
                .accessor_prefixes
                .iter()
                .map(|p| p.to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            terminator: heuristics.statement_terminator,
            max_terminators: heuristics.max_trivial_terminators,
        }
    }

    /// Whether the unit looks like a trivial accessor
    pub fn is_trivial(&self, unit: &CodeUnit) -> bool {
        let name = unit.name.to_lowercase();
        if !self.prefixes.iter().any(|p| name.starts_with(p.as_str())) {
            return false;
        }

        let terminators = unit.body.chars().filter(|c| *c == self.terminator).count();
        terminators <= self.max_terminators
    }

    /// Keep the non-trivial units, preserving order
    pub fn retain(&self, units: Vec<CodeUnit>) -> Vec<CodeUnit> {
        units.into_iter().filter(|u| !self.is_trivial(u)).collect()
    }
}

impl Default for TrivialityFilter {
    fn default() -> Self {
        Self::new(&Heuristics::default())
    }
}
