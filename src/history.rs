//! Rolling per-axis history of classified records
//!
//! The detector thread is the only writer; UI and report code read through
//! cloned handles. Readers always get an owned snapshot, so a render pass
//! never observes a half-applied append.

use crate::detector::ClassifiedRecord;
use crate::error::CoreError;
use crate::keyboard::Axis;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Default number of records kept per axis
pub const DEFAULT_CAPACITY: usize = 200;

#[derive(Debug)]
struct AxisHistory {
    records: VecDeque<ClassifiedRecord>,
    capacity: usize,
}

impl AxisHistory {
    fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn trim(&mut self) {
        while self.records.len() > self.capacity {
            self.records.pop_front();
        }
    }
}

#[derive(Debug)]
struct Inner {
    axes: [AxisHistory; 2],
}

/// Shared handle to the bounded history queues, one per axis
#[derive(Debug, Clone)]
pub struct HistoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryStore {
    /// Create a store with the same capacity on both axes.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(RwLock::new(Inner {
                axes: [AxisHistory::new(capacity), AxisHistory::new(capacity)],
            })),
        }
    }

    // A panicking reader cannot leave the queues inconsistent, so poisoning
    // is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a record, evicting the oldest once over capacity
    pub fn append(&self, axis: Axis, record: ClassifiedRecord) {
        let mut inner = self.write();
        let history = &mut inner.axes[axis.index()];
        history.records.push_back(record);
        history.trim();
    }

    /// The most recent `count` records in chronological order
    pub fn snapshot(&self, axis: Axis, count: usize) -> Vec<ClassifiedRecord> {
        let inner = self.read();
        let records = &inner.axes[axis.index()].records;
        let skip = records.len().saturating_sub(count);
        records.iter().skip(skip).cloned().collect()
    }

    /// Every stored record for an axis
    pub fn snapshot_all(&self, axis: Axis) -> Vec<ClassifiedRecord> {
        self.snapshot(axis, usize::MAX)
    }

    /// Most recently appended record for an axis
    pub fn latest(&self, axis: Axis) -> Option<ClassifiedRecord> {
        self.read().axes[axis.index()].records.back().cloned()
    }

    pub fn len(&self, axis: Axis) -> usize {
        self.read().axes[axis.index()].records.len()
    }

    pub fn is_empty(&self, axis: Axis) -> bool {
        self.len(axis) == 0
    }

    pub fn capacity(&self, axis: Axis) -> usize {
        self.read().axes[axis.index()].capacity
    }

    /// Change an axis capacity, dropping the oldest records if it shrinks
    pub fn set_capacity(&self, axis: Axis, capacity: usize) -> Result<(), CoreError> {
        if capacity == 0 {
            return Err(CoreError::InvalidCapacity);
        }
        let mut inner = self.write();
        let history = &mut inner.axes[axis.index()];
        history.capacity = capacity;
        history.trim();
        Ok(())
    }

    pub fn clear(&self, axis: Axis) {
        self.write().axes[axis.index()].records.clear();
    }

    pub fn clear_all(&self) {
        let mut inner = self.write();
        for history in inner.axes.iter_mut() {
            history.records.clear();
        }
    }
}
