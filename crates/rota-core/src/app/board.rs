//! Shift bucketing for day boards.
//!
//! Groups a day's due tasks into the three shift buckets and fixes the
//! presentation order inside each: timed tasks first by `scheduled_time`,
//! untimed tasks after them, ties broken by `sort_order`. Side-effect free.

use serde::{Deserialize, Serialize};

use crate::domain::{Shift, TaskDefinition};

/// A day's due tasks grouped by shift, presentation-ordered.
///
/// Buckets are built sorted and not externally mutable, so the ordering
/// invariant holds for the lifetime of the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftBoard {
    opening: Vec<TaskDefinition>,
    midday: Vec<TaskDefinition>,
    closing: Vec<TaskDefinition>,
}

impl ShiftBoard {
    pub fn tasks(&self, shift: Shift) -> &[TaskDefinition] {
        match shift {
            Shift::Opening => &self.opening,
            Shift::Midday => &self.midday,
            Shift::Closing => &self.closing,
        }
    }

    /// Buckets in presentation order (opening, midday, closing).
    pub fn iter(&self) -> impl Iterator<Item = (Shift, &[TaskDefinition])> {
        Shift::ALL.iter().map(|shift| (*shift, self.tasks(*shift)))
    }

    pub fn len(&self) -> usize {
        self.opening.len() + self.midday.len() + self.closing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bucket `due` by declared shift. An empty input yields three empty
/// buckets, never an error.
pub fn bucket_by_shift(due: Vec<TaskDefinition>) -> ShiftBoard {
    let mut board = ShiftBoard::default();
    for definition in due {
        match definition.shift {
            Shift::Opening => board.opening.push(definition),
            Shift::Midday => board.midday.push(definition),
            Shift::Closing => board.closing.push(definition),
        }
    }
    for bucket in [&mut board.opening, &mut board.midday, &mut board.closing] {
        // None scheduled_time sorts after all timed entries; sort_by_key is
        // stable, so equal keys keep their incoming relative order.
        bucket.sort_by_key(|d| (d.scheduled_time.is_none(), d.scheduled_time, d.sort_order));
    }
    board
}
