use super::StepSequence;
use crate::engine::workspace::{Progress, Workspace};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Compare,
    SwapSmaller,
    Mark,
    PlacePivot,
}

/// Lomuto partition of the inclusive range `[low, high]`, pivot at `high`.
#[derive(Debug, Clone, Copy)]
struct Partition {
    low: usize,
    high: usize,
    /// Boundary of the "smaller than pivot" prefix: `[low, store)`.
    store: usize,
    j: usize,
    stage: Stage,
}

/// Quick sort with Lomuto partitioning and an explicit stack of sub-ranges.
///
/// Both sub-ranges are pushed unconditionally; empty and single-element ranges
/// are discarded by the `low < high` guard when popped.
pub struct QuickSort {
    stack: Vec<(usize, usize)>,
    active: Option<Partition>,
}

impl QuickSort {
    pub fn new(len: usize) -> Self {
        Self {
            // Half-open, so `low < high` over inclusive bounds is `lo + 1 < hi`.
            stack: vec![(0, len)],
            active: None,
        }
    }
}

impl Partition {
    fn new(low: usize, high: usize) -> Self {
        Self {
            low,
            high,
            store: low,
            j: low,
            stage: Stage::Compare,
        }
    }

    /// Perform one primitive; returns the pivot's final index once placed.
    fn step<T: Ord + Clone>(&mut self, ws: &mut Workspace<T>) -> Option<usize> {
        match self.stage {
            Stage::Compare => {
                if self.j >= self.high {
                    self.stage = Stage::PlacePivot;
                    return self.step(ws);
                }
                self.stage = if ws.compare(self.j, self.high) == Ordering::Less {
                    Stage::SwapSmaller
                } else {
                    Stage::Mark
                };
                None
            }
            Stage::SwapSmaller => {
                ws.swap_at(self.store, self.j);
                self.store += 1;
                self.stage = Stage::Mark;
                None
            }
            Stage::Mark => {
                ws.mark(&[self.j, self.high]);
                self.j += 1;
                self.stage = Stage::Compare;
                None
            }
            Stage::PlacePivot => {
                ws.swap_at(self.store, self.high);
                Some(self.store)
            }
        }
    }
}

impl<T: Ord + Clone> StepSequence<T> for QuickSort {
    fn step(&mut self, ws: &mut Workspace<T>) -> Progress {
        loop {
            if let Some(partition) = self.active.as_mut() {
                if let Some(pivot) = partition.step(ws) {
                    let (low, high) = (partition.low, partition.high);
                    self.active = None;
                    // Left range is popped first.
                    self.stack.push((pivot + 1, high + 1));
                    self.stack.push((low, pivot));
                }
                return Progress::Yielded;
            }

            match self.stack.pop() {
                None => return Progress::Done,
                Some((lo, hi)) if lo + 1 < hi => {
                    self.active = Some(Partition::new(lo, hi - 1));
                }
                Some(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::algorithms::testing::run_to_end;
    use crate::model::AlgorithmId;

    #[test]
    fn lomuto_counters_on_small_input() {
        // Pivot 4 over [3,1,2]: three comparisons, three self-swaps, pivot swap.
        // Then [3,1,2] with pivot 2: two comparisons, one swap, pivot swap.
        let (output, counters) = run_to_end(AlgorithmId::Quick, vec![3u32, 1, 2, 4]);
        assert_eq!(output, vec![1, 2, 3, 4]);
        assert_eq!(counters.comparisons, 5);
        assert_eq!(counters.swaps, 6);
    }

    #[test]
    fn sorted_input_degrades_to_quadratic() {
        let (_, counters) = run_to_end(AlgorithmId::Quick, (1u32..=8).collect());
        assert_eq!(counters.comparisons, 28);
    }
}
