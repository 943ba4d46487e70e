//! The private working array an algorithm mutates during a run.
//!
//! Algorithms touch their array only through the primitives below. Each call to
//! [`StepSequence::step`](crate::engine::algorithms::StepSequence::step) performs
//! exactly one primitive, after which the controller renders and suspends.

use crate::engine::state::Counters;
use std::cmp::Ordering;

/// Outcome of advancing a step sequence by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// One primitive was performed; suspend before the next step.
    Yielded,
    /// The sequence ran to completion without performing a primitive.
    Done,
}

#[derive(Debug, Clone)]
pub struct Workspace<T> {
    values: Vec<T>,
    counters: Counters,
    focus: Vec<usize>,
    primitives: u64,
}

impl<T: Ord + Clone> Workspace<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self {
            values,
            counters: Counters::default(),
            focus: Vec::new(),
            primitives: 0,
        }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Indices highlighted by the most recent primitive.
    pub fn focus(&self) -> &[usize] {
        &self.focus
    }

    /// Total primitives performed so far.
    pub fn primitives(&self) -> u64 {
        self.primitives
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    fn touch(&mut self, focus: &[usize]) {
        self.focus.clear();
        self.focus.extend_from_slice(focus);
        self.primitives += 1;
    }

    /// Order `values[i]` against `values[j]`.
    pub fn compare(&mut self, i: usize, j: usize) -> Ordering {
        let ord = self.values[i].cmp(&self.values[j]);
        self.counters.comparisons += 1;
        self.touch(&[i, j]);
        ord
    }

    /// Order two values held outside the array (a saved key, a merge buffer).
    pub fn compare_values(&mut self, lhs: &T, rhs: &T, focus: &[usize]) -> Ordering {
        let ord = lhs.cmp(rhs);
        self.counters.comparisons += 1;
        self.touch(focus);
        ord
    }

    pub fn swap_at(&mut self, i: usize, j: usize) {
        self.values.swap(i, j);
        self.counters.swaps += 1;
        self.touch(&[i, j]);
    }

    /// Copy `values[from]` over `values[to]`, counted as a swap.
    pub fn shift(&mut self, from: usize, to: usize) {
        self.values[to] = self.values[from].clone();
        self.counters.swaps += 1;
        self.touch(&[from, to]);
    }

    /// Uncounted overwrite of one slot.
    pub fn write(&mut self, index: usize, value: T) {
        self.values[index] = value;
        self.touch(&[index]);
    }

    pub fn mark(&mut self, indices: &[usize]) {
        self.touch(indices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_update_counters_and_focus() {
        let mut ws = Workspace::new(vec![3, 1, 2]);

        assert_eq!(ws.compare(0, 1), Ordering::Greater);
        assert_eq!(ws.focus(), &[0, 1]);

        ws.swap_at(0, 1);
        assert_eq!(ws.values(), &[1, 3, 2]);

        ws.shift(1, 2);
        assert_eq!(ws.values(), &[1, 3, 3]);

        ws.write(1, 2);
        assert_eq!(ws.values(), &[1, 2, 3]);
        assert_eq!(ws.focus(), &[1]);

        ws.mark(&[0, 2]);
        assert_eq!(ws.focus(), &[0, 2]);

        assert_eq!(
            ws.counters(),
            Counters {
                comparisons: 1,
                swaps: 2
            }
        );
        assert_eq!(ws.primitives(), 5);
    }

    #[test]
    fn compare_values_counts_without_touching_the_array() {
        let mut ws = Workspace::new(vec![5, 6]);
        assert_eq!(ws.compare_values(&4, &4, &[1]), Ordering::Equal);
        assert_eq!(ws.values(), &[5, 6]);
        assert_eq!(ws.counters().comparisons, 1);
    }

    #[test]
    fn empty_workspace_has_no_steps() {
        use crate::model::AlgorithmId;

        let mut ws: Workspace<u32> = Workspace::new(Vec::new());
        assert_eq!(ws.len(), 0);
        let mut seq = crate::engine::sequence_for::<u32>(AlgorithmId::Quick, ws.len());
        assert_eq!(seq.step(&mut ws), Progress::Done);
        assert_eq!(ws.primitives(), 0);
    }
}
