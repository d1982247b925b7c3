//! Generational storage for citation records.
//!
//! Every record lives in exactly one arena slot. Containers refer to records
//! through [`Handle`]s; a handle carries the slot generation it was issued
//! for, so a handle kept after its slot was released (and possibly reused)
//! is detected instead of silently aliasing a different record.

use crate::error::StoreError;
use crate::record::Record;

/// Stable, copyable reference to a record slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Which membership structure currently owns a live record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Allocated but not yet enqueued anywhere.
    Detached,
    Pending,
    /// Only during a sort pass.
    Ordered,
    Processed,
}

#[derive(Debug)]
struct Occupant {
    record: Record,
    location: Location,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    occupant: Option<Occupant>,
}

#[derive(Debug, Default)]
pub struct RecordArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl RecordArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Stores a record in a free slot (or a new one) and returns its handle.
    /// The record starts out [`Location::Detached`].
    pub fn create(&mut self, record: Record) -> Result<Handle, StoreError> {
        let occupant = Occupant {
            record,
            location: Location::Detached,
        };

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.occupant = Some(occupant);
            self.live += 1;
            return Ok(Handle {
                index,
                generation: slot.generation,
            });
        }

        let index = u32::try_from(self.slots.len()).map_err(|_| StoreError::AllocationExhausted)?;
        if index == u32::MAX {
            return Err(StoreError::AllocationExhausted);
        }
        self.slots
            .try_reserve(1)
            .map_err(|_| StoreError::AllocationExhausted)?;
        self.slots.push(Slot {
            generation: 0,
            occupant: Some(occupant),
        });
        self.live += 1;
        Ok(Handle {
            index,
            generation: 0,
        })
    }

    pub fn get(&self, handle: Handle) -> Result<&Record, StoreError> {
        self.occupant(handle).map(|o| &o.record)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut Record, StoreError> {
        self.occupant_mut(handle).map(|o| &mut o.record)
    }

    pub fn location(&self, handle: Handle) -> Result<Location, StoreError> {
        self.occupant(handle).map(|o| o.location)
    }

    /// Moves a record between membership structures. Fails without changing
    /// anything if the record is not currently at `from`.
    pub fn relocate(&mut self, handle: Handle, from: Location, to: Location) -> Result<(), StoreError> {
        let occupant = self.occupant_mut(handle)?;
        if occupant.location != from {
            citation_logging::cite_error!(
                "record {} expected at {:?} but found at {:?}",
                occupant.record.key(),
                from,
                occupant.location
            );
            return Err(StoreError::StaleHandle);
        }
        occupant.location = to;
        Ok(())
    }

    /// Frees the slot and hands the record back. Releasing an already
    /// released handle is a no-op that returns `None`.
    pub fn release(&mut self, handle: Handle) -> Option<Record> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let occupant = slot.occupant.take()?;
        self.live -= 1;
        // A slot whose generation counter is exhausted is retired for good.
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free.push(handle.index);
        }
        Some(occupant.record)
    }

    fn occupant(&self, handle: Handle) -> Result<&Occupant, StoreError> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.occupant.as_ref())
            .ok_or(StoreError::StaleHandle)
    }

    fn occupant_mut(&mut self, handle: Handle) -> Result<&mut Occupant, StoreError> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.occupant.as_mut())
            .ok_or(StoreError::StaleHandle)
    }
}
