//! Sorting algorithms as resumable step sequences.
//!
//! Each algorithm is an explicit state machine instead of a recursive function:
//! the controller pulls one step at a time, and the recursive sorts keep their
//! pending sub-ranges on a work stack, so a run can stop between any two
//! primitives without unwinding anything.

mod bubble;
mod heap;
mod insertion;
mod merge;
mod quick;
mod selection;

use crate::engine::workspace::{Progress, Workspace};
use crate::model::AlgorithmId;

pub use bubble::BubbleSort;
pub use heap::HeapSort;
pub use insertion::InsertionSort;
pub use merge::MergeSort;
pub use quick::QuickSort;
pub use selection::SelectionSort;

/// A sort that advances one primitive per call.
pub trait StepSequence<T>: Send {
    /// Perform exactly one primitive on `ws` and return [`Progress::Yielded`],
    /// or return [`Progress::Done`] without touching `ws` once sorted.
    fn step(&mut self, ws: &mut Workspace<T>) -> Progress;
}

/// Build the step sequence for `algorithm` over an array of `len` elements.
pub fn sequence_for<T>(algorithm: AlgorithmId, len: usize) -> Box<dyn StepSequence<T>>
where
    T: Ord + Clone + Send + 'static,
{
    match algorithm {
        AlgorithmId::Bubble => Box::new(BubbleSort::new(len)),
        AlgorithmId::Selection => Box::new(SelectionSort::new(len)),
        AlgorithmId::Insertion => Box::new(InsertionSort::new(len)),
        AlgorithmId::Merge => Box::new(MergeSort::new(len)),
        AlgorithmId::Quick => Box::new(QuickSort::new(len)),
        AlgorithmId::Heap => Box::new(HeapSort::new(len)),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn every_algorithm_sorts_a_permutation() {
        let inputs = vec![
            vec![],
            vec![42],
            vec![2, 1],
            vec![1, 2, 3, 4, 5],
            vec![5, 4, 3, 2, 1],
            vec![7, 7, 7, 7],
            vec![5, 3, 8, 1],
            scrambled(37, 1),
            scrambled(64, 99),
            scrambled(100, 7),
        ];
        for algorithm in AlgorithmId::ALL {
            for input in &inputs {
                let (output, _) = run_to_end(algorithm, input.clone());
                assert_eq!(output, sorted_copy(input), "{algorithm} on {input:?}");
            }
        }
    }

    #[test]
    fn trivial_arrays_finish_without_steps() {
        for algorithm in AlgorithmId::ALL {
            let (_, counters) = run_to_end(algorithm, vec![9u32]);
            assert_eq!(counters, Default::default(), "{algorithm}");
        }
    }
}
