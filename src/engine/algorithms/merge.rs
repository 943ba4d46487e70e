use super::StepSequence;
use crate::engine::workspace::{Progress, Workspace};
use std::cmp::Ordering;

/// Pending work over half-open ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Sort { lo: usize, hi: usize },
    Merge { lo: usize, mid: usize, hi: usize },
}

/// A merge in progress: both runs are buffered, output goes back in place.
struct ActiveMerge<T> {
    left: Vec<T>,
    right: Vec<T>,
    li: usize,
    ri: usize,
    k: usize,
    pending: Option<T>,
}

/// Stable top-down merge sort driven by an explicit work stack.
pub struct MergeSort<T> {
    stack: Vec<Task>,
    active: Option<ActiveMerge<T>>,
}

impl<T> MergeSort<T> {
    pub fn new(len: usize) -> Self {
        Self {
            stack: vec![Task::Sort { lo: 0, hi: len }],
            active: None,
        }
    }
}

impl<T: Ord + Clone> ActiveMerge<T> {
    fn start(ws: &Workspace<T>, lo: usize, mid: usize, hi: usize) -> Self {
        Self {
            left: ws.values()[lo..mid].to_vec(),
            right: ws.values()[mid..hi].to_vec(),
            li: 0,
            ri: 0,
            k: lo,
            pending: None,
        }
    }

    /// Perform the next primitive of this merge, or `None` once it is complete.
    fn step(&mut self, ws: &mut Workspace<T>) -> Option<Progress> {
        if let Some(value) = self.pending.take() {
            ws.write(self.k, value);
            self.k += 1;
            return Some(Progress::Yielded);
        }
        if self.li < self.left.len() && self.ri < self.right.len() {
            let ord = ws.compare_values(&self.left[self.li], &self.right[self.ri], &[self.k]);
            // Equal keys take the left run first.
            let value = if ord == Ordering::Greater {
                self.ri += 1;
                self.right[self.ri - 1].clone()
            } else {
                self.li += 1;
                self.left[self.li - 1].clone()
            };
            self.pending = Some(value);
            return Some(Progress::Yielded);
        }
        let value = if self.li < self.left.len() {
            self.li += 1;
            self.left[self.li - 1].clone()
        } else if self.ri < self.right.len() {
            self.ri += 1;
            self.right[self.ri - 1].clone()
        } else {
            return None;
        };
        ws.write(self.k, value);
        self.k += 1;
        Some(Progress::Yielded)
    }
}

impl<T: Ord + Clone + Send> StepSequence<T> for MergeSort<T> {
    fn step(&mut self, ws: &mut Workspace<T>) -> Progress {
        loop {
            if let Some(active) = self.active.as_mut() {
                if let Some(progress) = active.step(ws) {
                    return progress;
                }
                self.active = None;
            }

            match self.stack.pop() {
                None => return Progress::Done,
                Some(Task::Sort { lo, hi }) => {
                    if hi.saturating_sub(lo) < 2 {
                        continue;
                    }
                    // Left run takes the extra element: [lo, mid) and [mid, hi).
                    let mid = lo + (hi - lo - 1) / 2 + 1;
                    self.stack.push(Task::Merge { lo, mid, hi });
                    self.stack.push(Task::Sort { lo: mid, hi });
                    self.stack.push(Task::Sort { lo, hi: mid });
                }
                Some(Task::Merge { lo, mid, hi }) => {
                    self.active = Some(ActiveMerge::start(ws, lo, mid, hi));
                }
            }
        }
    }
}
