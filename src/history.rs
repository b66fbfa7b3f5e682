//! Rolling record of past velocity fields for the streamtube tracer.

use crate::error::SimError;
use crate::solver::core::sample_periodic;
use crate::state::Field;

/// Owned copy of the velocity field at one step.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Step count at which the copy was taken.
    pub step: u64,
    pub u: Field,
    pub v: Field,
}

impl Snapshot {
    /// Bilinear, periodic velocity at grid position `(x, y)`.
    pub fn sample(&self, x: f64, y: f64) -> (f64, f64) {
        (sample_periodic(&self.u, x, y), sample_periodic(&self.v, x, y))
    }
}

/// Fixed-capacity ring of snapshots. All slots are allocated up front;
/// recording into a full ring overwrites the oldest slot in place.
pub struct HistoryBuffer {
    slots: Vec<Snapshot>,
    /// Slot the next record goes into.
    next: usize,
    len: usize,
}

impl HistoryBuffer {
    pub fn new(n: usize, capacity: usize) -> Result<Self, SimError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|source| SimError::Allocation { buffer: "history", source })?;
        for _ in 0..capacity {
            slots.push(Snapshot {
                step: 0,
                u: Field::dense(n, "history u")?,
                v: Field::dense(n, "history v")?,
            });
        }
        Ok(Self { slots, next: 0, len: 0 })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy `(u, v)` into the ring, evicting the oldest snapshot when full.
    pub fn record(&mut self, step: u64, u: &Field, v: &Field) {
        let cap = self.capacity();
        if cap == 0 {
            return;
        }
        let slot = &mut self.slots[self.next];
        slot.step = step;
        slot.u.copy_from(u);
        slot.v.copy_from(v);
        self.next = (self.next + 1) % cap;
        self.len = (self.len + 1).min(cap);
    }

    /// Snapshot `age` records back; 0 is the most recent.
    pub fn get(&self, age: usize) -> Option<&Snapshot> {
        if age >= self.len {
            return None;
        }
        let cap = self.capacity();
        Some(&self.slots[(self.next + cap - 1 - age) % cap])
    }

    pub fn newest(&self) -> Option<&Snapshot> {
        self.get(0)
    }

    pub fn oldest(&self) -> Option<&Snapshot> {
        self.len.checked_sub(1).and_then(|age| self.get(age))
    }

    pub fn iter_oldest_first(&self) -> impl Iterator<Item = &Snapshot> + '_ {
        (0..self.len).rev().filter_map(move |age| self.get(age))
    }
}
