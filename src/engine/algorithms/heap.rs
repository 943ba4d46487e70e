use super::StepSequence;
use crate::engine::workspace::{Progress, Workspace};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SiftStage {
    Left,
    Right,
    Decide,
}

/// Max-heapify of `node` within the heap prefix `[0, len)`, one primitive per step.
#[derive(Debug, Clone, Copy)]
struct Sift {
    node: usize,
    len: usize,
    largest: usize,
    stage: SiftStage,
    settled: bool,
}

impl Sift {
    fn new(node: usize, len: usize) -> Self {
        Self {
            node,
            len,
            largest: node,
            stage: SiftStage::Left,
            settled: false,
        }
    }

    /// Perform the next primitive, or `None` once the node has settled.
    fn step<T: Ord + Clone>(&mut self, ws: &mut Workspace<T>) -> Option<Progress> {
        if self.settled {
            return None;
        }
        loop {
            let left = 2 * self.node + 1;
            let right = left + 1;
            match self.stage {
                SiftStage::Left => {
                    self.stage = SiftStage::Right;
                    if left < self.len {
                        if ws.compare(left, self.largest) == Ordering::Greater {
                            self.largest = left;
                        }
                        return Some(Progress::Yielded);
                    }
                }
                SiftStage::Right => {
                    self.stage = SiftStage::Decide;
                    // Strictly greater: on a tie the left child keeps its claim.
                    if right < self.len {
                        if ws.compare(right, self.largest) == Ordering::Greater {
                            self.largest = right;
                        }
                        return Some(Progress::Yielded);
                    }
                }
                SiftStage::Decide => {
                    if self.largest == self.node {
                        let family: Vec<usize> = [self.node, left, right]
                            .into_iter()
                            .filter(|&i| i < self.len)
                            .collect();
                        ws.mark(&family);
                        self.settled = true;
                        return Some(Progress::Yielded);
                    }
                    ws.swap_at(self.node, self.largest);
                    self.node = self.largest;
                    self.stage = SiftStage::Left;
                    return Some(Progress::Yielded);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Heapify nodes `next - 1` down to 0.
    Build { next: usize },
    /// Swap the root to `end`, then restore the heap on `[0, end)`.
    Extract { end: usize, swapped: bool },
}

/// Build a max-heap bottom-up, then repeatedly move the root behind the heap.
pub struct HeapSort {
    len: usize,
    phase: Phase,
    sift: Option<Sift>,
}

impl HeapSort {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            phase: Phase::Build { next: len / 2 },
            sift: None,
        }
    }
}

impl<T: Ord + Clone> StepSequence<T> for HeapSort {
    fn step(&mut self, ws: &mut Workspace<T>) -> Progress {
        loop {
            if let Some(sift) = self.sift.as_mut() {
                if let Some(progress) = sift.step(ws) {
                    return progress;
                }
                self.sift = None;
            }

            match self.phase {
                Phase::Build { next } if next > 0 => {
                    self.phase = Phase::Build { next: next - 1 };
                    self.sift = Some(Sift::new(next - 1, self.len));
                }
                Phase::Build { .. } => {
                    self.phase = Phase::Extract {
                        end: self.len.saturating_sub(1),
                        swapped: false,
                    };
                }
                Phase::Extract { end, .. } if end == 0 => return Progress::Done,
                Phase::Extract {
                    end,
                    swapped: false,
                } => {
                    ws.swap_at(0, end);
                    self.phase = Phase::Extract { end, swapped: true };
                    return Progress::Yielded;
                }
                Phase::Extract { end, swapped: true } => {
                    self.sift = Some(Sift::new(0, end));
                    self.phase = Phase::Extract {
                        end: end - 1,
                        swapped: false,
                    };
                }
            }
        }
    }
}
