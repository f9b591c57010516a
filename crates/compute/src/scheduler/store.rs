//! Per-step arena shared by every task of a run.
//!
//! Every step owns a body snapshot, a raw and a blurred frame, and a stats
//! record, allocated once up front. The dependency graph decides which task
//! may touch which slot; the store only checks that claim. Each accessor is a
//! non-blocking `try_read`/`try_write`, and a slot that is already held in a
//! conflicting mode is reported as [`ComputeError::SlotContended`] instead of
//! being waited on. Under a correct schedule that never happens.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};

use orbit_core::{Bodies, Body, Image, ImageStats, OrbitError, N_BODIES};

use super::task::{ComputeError, Slot};

/// State for one simulation step.
#[derive(Debug)]
pub struct StepRecord {
    step: usize,
    bodies: RwLock<Bodies>,
    raw: RwLock<Image>,
    blurred: RwLock<Image>,
    stats: RwLock<ImageStats>,
}

fn claim_read<'a, T>(
    lock: &'a RwLock<T>,
    step: usize,
    slot: Slot,
) -> Result<RwLockReadGuard<'a, T>, ComputeError> {
    lock.try_read().map_err(|e| match e {
        TryLockError::WouldBlock => ComputeError::SlotContended { step, slot },
        TryLockError::Poisoned(_) => ComputeError::SlotPoisoned { step, slot },
    })
}

fn claim_write<'a, T>(
    lock: &'a RwLock<T>,
    step: usize,
    slot: Slot,
) -> Result<RwLockWriteGuard<'a, T>, ComputeError> {
    lock.try_write().map_err(|e| match e {
        TryLockError::WouldBlock => ComputeError::SlotContended { step, slot },
        TryLockError::Poisoned(_) => ComputeError::SlotPoisoned { step, slot },
    })
}

impl StepRecord {
    fn allocate(step: usize, width: usize, height: usize) -> Result<Self, OrbitError> {
        Ok(Self {
            step,
            bodies: RwLock::new([Body::empty(); N_BODIES]),
            raw: RwLock::new(Image::new(width, height)?),
            blurred: RwLock::new(Image::new(width, height)?),
            stats: RwLock::new(ImageStats::default()),
        })
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn bodies(&self) -> Result<RwLockReadGuard<'_, Bodies>, ComputeError> {
        claim_read(&self.bodies, self.step, Slot::Bodies)
    }

    pub fn bodies_mut(&self) -> Result<RwLockWriteGuard<'_, Bodies>, ComputeError> {
        claim_write(&self.bodies, self.step, Slot::Bodies)
    }

    pub fn raw(&self) -> Result<RwLockReadGuard<'_, Image>, ComputeError> {
        claim_read(&self.raw, self.step, Slot::Raw)
    }

    pub fn raw_mut(&self) -> Result<RwLockWriteGuard<'_, Image>, ComputeError> {
        claim_write(&self.raw, self.step, Slot::Raw)
    }

    pub fn blurred(&self) -> Result<RwLockReadGuard<'_, Image>, ComputeError> {
        claim_read(&self.blurred, self.step, Slot::Blurred)
    }

    pub fn blurred_mut(&self) -> Result<RwLockWriteGuard<'_, Image>, ComputeError> {
        claim_write(&self.blurred, self.step, Slot::Blurred)
    }

    pub fn stats(&self) -> Result<RwLockReadGuard<'_, ImageStats>, ComputeError> {
        claim_read(&self.stats, self.step, Slot::Stats)
    }

    pub fn stats_mut(&self) -> Result<RwLockWriteGuard<'_, ImageStats>, ComputeError> {
        claim_write(&self.stats, self.step, Slot::Stats)
    }

    /// Copy out every slot. Only meaningful once no task is running.
    pub fn snapshot(&self) -> Result<StepSnapshot, ComputeError> {
        Ok(StepSnapshot {
            step: self.step,
            bodies: *self.bodies()?,
            raw: self.raw()?.clone(),
            blurred: self.blurred()?.clone(),
            stats: *self.stats()?,
        })
    }
}

/// Owned copy of a [`StepRecord`], for comparing runs.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSnapshot {
    pub step: usize,
    pub bodies: Bodies,
    /// Holds the grayscale frame once the pipeline has run.
    pub raw: Image,
    pub blurred: Image,
    pub stats: ImageStats,
}

/// Arena of [`StepRecord`]s indexed by step.
#[derive(Debug)]
pub struct PipelineStore {
    records: Vec<StepRecord>,
    width: usize,
    height: usize,
}

impl PipelineStore {
    /// Allocate every step's buffers up front. Fails without a partial
    /// store if any allocation fails.
    pub fn allocate(nb_steps: usize, width: usize, height: usize) -> Result<Self, ComputeError> {
        let mut records = Vec::new();
        records.try_reserve_exact(nb_steps).map_err(|e| {
            ComputeError::Resource(OrbitError::Other(format!("cannot allocate {nb_steps} step records: {e}")))
        })?;
        for step in 0..nb_steps {
            records.push(StepRecord::allocate(step, width, height)?);
        }
        Ok(Self {
            records,
            width,
            height,
        })
    }

    /// Install the initial system in step 0; Simulate(0) integrates it in place.
    pub fn seed_bodies(&self, bodies: Bodies) -> Result<(), ComputeError> {
        *self.get(0)?.bodies_mut()? = bodies;
        Ok(())
    }

    pub fn get(&self, step: usize) -> Result<&StepRecord, ComputeError> {
        self.records.get(step).ok_or(ComputeError::StepOutOfRange {
            step,
            nb_steps: self.records.len(),
        })
    }

    pub fn nb_steps(&self) -> usize {
        self.records.len()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn snapshots(&self) -> Result<Vec<StepSnapshot>, ComputeError> {
        self.records.iter().map(StepRecord::snapshot).collect()
    }
}
