use super::StepSequence;
use crate::engine::workspace::{Progress, Workspace};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Compare,
    Mark,
    Place,
}

/// Scan the unsorted suffix for its minimum, then swap it into place.
pub struct SelectionSort {
    len: usize,
    i: usize,
    j: usize,
    min: usize,
    stage: Stage,
}

impl SelectionSort {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            i: 0,
            j: 1,
            min: 0,
            stage: Stage::Compare,
        }
    }

    fn next_pass(&mut self) {
        self.i += 1;
        self.j = self.i + 1;
        self.min = self.i;
        self.stage = Stage::Compare;
    }
}

impl<T: Ord + Clone> StepSequence<T> for SelectionSort {
    fn step(&mut self, ws: &mut Workspace<T>) -> Progress {
        loop {
            if self.i + 1 >= self.len {
                return Progress::Done;
            }
            match self.stage {
                Stage::Compare => {
                    if self.j >= self.len {
                        self.stage = Stage::Place;
                        continue;
                    }
                    if ws.compare(self.j, self.min) == Ordering::Less {
                        self.min = self.j;
                    }
                    self.stage = Stage::Mark;
                    return Progress::Yielded;
                }
                Stage::Mark => {
                    ws.mark(&[self.i, self.j, self.min]);
                    self.j += 1;
                    self.stage = Stage::Compare;
                    return Progress::Yielded;
                }
                Stage::Place => {
                    let moved = self.min != self.i;
                    if moved {
                        ws.swap_at(self.i, self.min);
                    }
                    self.next_pass();
                    if moved {
                        return Progress::Yielded;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::algorithms::testing::run_to_end;
    use crate::model::AlgorithmId;

    #[test]
    fn swaps_only_when_minimum_moved() {
        let (output, counters) = run_to_end(AlgorithmId::Selection, vec![1u32, 2, 3, 4]);
        assert_eq!(output, vec![1, 2, 3, 4]);
        assert_eq!(counters.comparisons, 6);
        assert_eq!(counters.swaps, 0);

        let (output, counters) = run_to_end(AlgorithmId::Selection, vec![4u32, 3, 2, 1]);
        assert_eq!(output, vec![1, 2, 3, 4]);
        assert_eq!(counters.comparisons, 6);
        // Pass 0 swaps 4<->1, pass 1 swaps 3<->2, pass 2 finds 3 in place.
        assert_eq!(counters.swaps, 2);
    }

    #[test]
    fn equal_candidates_do_not_move_the_minimum() {
        let (_, counters) = run_to_end(AlgorithmId::Selection, vec![2u32, 2, 2]);
        assert_eq!(counters.swaps, 0);
    }
}
