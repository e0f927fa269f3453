//! Storage collaborator contracts.
//!
//! Reads go straight to committed state. Writes take the scope of the flow
//! that issues them and only become visible once that scope commits.

use crate::data::{Event, EventDetails, EventId, Slot, SlotId, UserId};
use crate::error::StorageError;
use crate::time::TimeWindow;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A unit of writes that is applied atomically or not at all.
///
/// Dropping a scope without committing it must discard its writes.
pub trait Scope {
    fn commit(self) -> Result<(), StorageError>;
    fn rollback(self) -> Result<(), StorageError>;
}

pub trait Transactional {
    type Scope: Scope;

    fn begin(&self) -> Result<Self::Scope, StorageError>;
}

pub trait EventRepository: Transactional {
    fn get_event(&self, id: EventId) -> Result<Option<Event>, StorageError>;

    fn insert_event(
        &self,
        scope: &mut Self::Scope,
        details: &EventDetails,
        at: DateTime<Utc>,
    ) -> Result<EventId, StorageError>;

    fn update_event(
        &self,
        scope: &mut Self::Scope,
        id: EventId,
        details: &EventDetails,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Removes the event row. Anything still referencing the event is removed with it.
    fn delete_event(&self, scope: &mut Self::Scope, id: EventId) -> Result<(), StorageError>;

    fn get_candidate_slots(&self, event: EventId) -> Result<Vec<Slot>, StorageError>;

    fn insert_candidate_slot(
        &self,
        scope: &mut Self::Scope,
        event: EventId,
        window: TimeWindow,
    ) -> Result<SlotId, StorageError>;

    fn delete_candidate_slot(
        &self,
        scope: &mut Self::Scope,
        slot: SlotId,
    ) -> Result<(), StorageError>;
}

pub trait AvailabilityRepository: Transactional {
    fn get_user_availability(
        &self,
        event: EventId,
        user: UserId,
    ) -> Result<Vec<Slot>, StorageError>;

    /// Every user with at least one stored window for the event
    fn get_all_availability(
        &self,
        event: EventId,
    ) -> Result<BTreeMap<UserId, Vec<Slot>>, StorageError>;

    fn insert_availability(
        &self,
        scope: &mut Self::Scope,
        user: UserId,
        event: EventId,
        window: TimeWindow,
    ) -> Result<SlotId, StorageError>;

    fn delete_availability(
        &self,
        scope: &mut Self::Scope,
        user: UserId,
        slot: SlotId,
    ) -> Result<(), StorageError>;
}

/// Source of `created_at` / `updated_at` stamps
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
