use super::StepSequence;
use crate::engine::workspace::{Progress, Workspace};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Pick,
    Compare,
    Shift,
    Place,
}

/// Lift each key out, shift larger predecessors right, drop the key in the gap.
///
/// Every shift counts as a swap; the final placement of the key does not.
pub struct InsertionSort<T> {
    len: usize,
    i: usize,
    hole: usize,
    key: Option<T>,
    stage: Stage,
}

impl<T> InsertionSort<T> {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            i: 1,
            hole: 1,
            key: None,
            stage: Stage::Pick,
        }
    }
}

impl<T: Ord + Clone + Send> StepSequence<T> for InsertionSort<T> {
    fn step(&mut self, ws: &mut Workspace<T>) -> Progress {
        loop {
            match self.stage {
                Stage::Pick => {
                    if self.i >= self.len {
                        return Progress::Done;
                    }
                    self.key = Some(ws.values()[self.i].clone());
                    self.hole = self.i;
                    self.stage = Stage::Compare;
                }
                Stage::Compare => {
                    let Some(key) = self.key.as_ref() else {
                        self.stage = Stage::Pick;
                        continue;
                    };
                    if self.hole == 0 {
                        self.stage = Stage::Place;
                        continue;
                    }
                    let prev = ws.values()[self.hole - 1].clone();
                    self.stage = match ws.compare_values(&prev, key, &[self.hole - 1, self.hole]) {
                        Ordering::Greater => Stage::Shift,
                        _ => Stage::Place,
                    };
                    return Progress::Yielded;
                }
                Stage::Shift => {
                    ws.shift(self.hole - 1, self.hole);
                    self.hole -= 1;
                    self.stage = Stage::Compare;
                    return Progress::Yielded;
                }
                Stage::Place => {
                    if let Some(key) = self.key.take() {
                        ws.write(self.hole, key);
                    }
                    self.i += 1;
                    self.stage = Stage::Pick;
                    return Progress::Yielded;
                }
            }
        }
    }
}
