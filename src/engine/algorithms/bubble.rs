use super::StepSequence;
use crate::engine::workspace::{Progress, Workspace};
use std::cmp::Ordering;

/// n-1 full passes of adjacent comparisons; no early exit on a clean pass.
pub struct BubbleSort {
    len: usize,
    pass: usize,
    j: usize,
    swap_pending: bool,
}

impl BubbleSort {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            pass: 0,
            j: 0,
            swap_pending: false,
        }
    }
}

impl<T: Ord + Clone> StepSequence<T> for BubbleSort {
    fn step(&mut self, ws: &mut Workspace<T>) -> Progress {
        if self.swap_pending {
            self.swap_pending = false;
            ws.swap_at(self.j, self.j + 1);
            self.j += 1;
            return Progress::Yielded;
        }

        while self.pass + 1 < self.len && self.j + 1 >= self.len - self.pass {
            self.pass += 1;
            self.j = 0;
        }
        if self.pass + 1 >= self.len {
            return Progress::Done;
        }

        if ws.compare(self.j, self.j + 1) == Ordering::Greater {
            self.swap_pending = true;
        } else {
            self.j += 1;
        }
        Progress::Yielded
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::algorithms::testing::run_to_end;
    use crate::model::AlgorithmId;

    #[test]
    fn small_example_counters() {
        let (output, counters) = run_to_end(AlgorithmId::Bubble, vec![5u32, 3, 8, 1]);
        assert_eq!(output, vec![1, 3, 5, 8]);
        assert_eq!(counters.comparisons, 6);
        // One swap per inversion: (5,3) (5,1) (3,1) (8,1).
        assert_eq!(counters.swaps, 4);
    }

    #[test]
    fn sorted_input_still_runs_every_pass() {
        let (_, counters) = run_to_end(AlgorithmId::Bubble, (1u32..=10).collect());
        assert_eq!(counters.comparisons, 45);
        assert_eq!(counters.swaps, 0);
    }
}
