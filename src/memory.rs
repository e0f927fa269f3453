//! In-process store implementing the repository contracts.
//!
//! Writes are staged in the [`MemoryScope`] and replayed against a copy of the
//! tables on commit; the copy replaces the tables only if every write applied.

use crate::data::{Event, EventDetails, EventId, Slot, SlotId, UserId};
use crate::error::StorageError;
use crate::repository::{AvailabilityRepository, EventRepository, Scope, Transactional};
use crate::time::TimeWindow;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use log::trace;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone, Debug, Default)]
struct Tables {
    events: BTreeMap<EventId, Event>,
    candidates: BTreeMap<SlotId, (EventId, TimeWindow)>,
    availability: BTreeMap<SlotId, (EventId, UserId, TimeWindow)>,
}

#[derive(Debug)]
enum Write {
    InsertEvent(Event),
    UpdateEvent {
        id: EventId,
        details: EventDetails,
        at: DateTime<Utc>,
    },
    DeleteEvent(EventId),
    InsertCandidate {
        id: SlotId,
        event: EventId,
        window: TimeWindow,
    },
    DeleteCandidate(SlotId),
    InsertAvailability {
        id: SlotId,
        event: EventId,
        user: UserId,
        window: TimeWindow,
    },
    DeleteAvailability {
        user: UserId,
        slot: SlotId,
    },
}

impl Tables {
    fn apply(&mut self, write: Write) -> Result<(), StorageError> {
        match write {
            Write::InsertEvent(event) => {
                self.events.insert(event.id, event);
            }
            Write::UpdateEvent { id, details, at } => {
                let event = self
                    .events
                    .get_mut(&id)
                    .ok_or_else(|| StorageError::new(format!("event {} does not exist", id)))?;
                event.details = details;
                event.updated_at = at;
            }
            Write::DeleteEvent(id) => {
                self.events
                    .remove(&id)
                    .ok_or_else(|| StorageError::new(format!("event {} does not exist", id)))?;
                self.candidates.retain(|_, (event, _)| *event != id);
                self.availability.retain(|_, (event, _, _)| *event != id);
            }
            Write::InsertCandidate { id, event, window } => {
                if !self.events.contains_key(&event) {
                    return Err(StorageError::new(format!(
                        "event {} does not exist",
                        event
                    )));
                }
                self.candidates.insert(id, (event, window));
            }
            Write::DeleteCandidate(slot) => {
                self.candidates
                    .remove(&slot)
                    .ok_or_else(|| StorageError::new(format!("slot {} does not exist", slot)))?;
            }
            Write::InsertAvailability {
                id,
                event,
                user,
                window,
            } => {
                if !self.events.contains_key(&event) {
                    return Err(StorageError::new(format!(
                        "event {} does not exist",
                        event
                    )));
                }
                self.availability.insert(id, (event, user, window));
            }
            Write::DeleteAvailability { user, slot } => {
                let owned = matches!(
                    self.availability.get(&slot),
                    Some((_, owner, _)) if *owner == user
                );
                if !owned {
                    return Err(StorageError::new(format!(
                        "slot {} does not exist for user {}",
                        slot, user
                    )));
                }
                self.availability.remove(&slot);
            }
        }

        Ok(())
    }
}

#[derive(Debug)]
struct Shared {
    tables: Mutex<Tables>,
    next_id: AtomicI64,
}

impl Shared {
    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|_| StorageError::new("memory store lock poisoned"))
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// Cheap to clone; clones share the same tables
#[derive(Clone, Debug)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            shared: Arc::new(Shared {
                tables: Mutex::new(Tables::default()),
                next_id: AtomicI64::new(1),
            }),
        }
    }

    fn owns(&self, scope: &MemoryScope) -> Result<(), StorageError> {
        if Arc::ptr_eq(&self.shared, &scope.shared) {
            Ok(())
        } else {
            Err(StorageError::new("scope belongs to a different store"))
        }
    }
}

/// Staged writes of one flow
#[derive(Debug)]
pub struct MemoryScope {
    shared: Arc<Shared>,
    pending: Vec<Write>,
}

impl MemoryScope {
    fn stage(&mut self, write: Write) {
        trace!("Staging {:?}", write);
        self.pending.push(write);
    }
}

impl Scope for MemoryScope {
    fn commit(self) -> Result<(), StorageError> {
        let mut tables = self.shared.tables()?;
        let mut next = tables.clone();

        for write in self.pending {
            next.apply(write)?;
        }

        *tables = next;
        Ok(())
    }

    fn rollback(self) -> Result<(), StorageError> {
        trace!("Discarding {} staged writes", self.pending.len());
        Ok(())
    }
}

impl Transactional for MemoryStore {
    type Scope = MemoryScope;

    fn begin(&self) -> Result<MemoryScope, StorageError> {
        Ok(MemoryScope {
            shared: Arc::clone(&self.shared),
            pending: Vec::new(),
        })
    }
}

impl EventRepository for MemoryStore {
    fn get_event(&self, id: EventId) -> Result<Option<Event>, StorageError> {
        Ok(self.shared.tables()?.events.get(&id).cloned())
    }

    fn insert_event(
        &self,
        scope: &mut MemoryScope,
        details: &EventDetails,
        at: DateTime<Utc>,
    ) -> Result<EventId, StorageError> {
        self.owns(scope)?;
        let id = EventId(self.shared.next_id());
        scope.stage(Write::InsertEvent(Event {
            id,
            details: details.clone(),
            created_at: at,
            updated_at: at,
        }));
        Ok(id)
    }

    fn update_event(
        &self,
        scope: &mut MemoryScope,
        id: EventId,
        details: &EventDetails,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.owns(scope)?;
        scope.stage(Write::UpdateEvent {
            id,
            details: details.clone(),
            at,
        });
        Ok(())
    }

    fn delete_event(&self, scope: &mut MemoryScope, id: EventId) -> Result<(), StorageError> {
        self.owns(scope)?;
        scope.stage(Write::DeleteEvent(id));
        Ok(())
    }

    fn get_candidate_slots(&self, event: EventId) -> Result<Vec<Slot>, StorageError> {
        Ok(self
            .shared
            .tables()?
            .candidates
            .iter()
            .filter(|(_, (owner, _))| *owner == event)
            .map(|(&id, &(_, window))| Slot::new(id, window))
            .collect_vec())
    }

    fn insert_candidate_slot(
        &self,
        scope: &mut MemoryScope,
        event: EventId,
        window: TimeWindow,
    ) -> Result<SlotId, StorageError> {
        self.owns(scope)?;
        let id = SlotId(self.shared.next_id());
        scope.stage(Write::InsertCandidate { id, event, window });
        Ok(id)
    }

    fn delete_candidate_slot(
        &self,
        scope: &mut MemoryScope,
        slot: SlotId,
    ) -> Result<(), StorageError> {
        self.owns(scope)?;
        scope.stage(Write::DeleteCandidate(slot));
        Ok(())
    }
}

impl AvailabilityRepository for MemoryStore {
    fn get_user_availability(
        &self,
        event: EventId,
        user: UserId,
    ) -> Result<Vec<Slot>, StorageError> {
        Ok(self
            .shared
            .tables()?
            .availability
            .iter()
            .filter(|(_, (e, u, _))| *e == event && *u == user)
            .map(|(&id, &(_, _, window))| Slot::new(id, window))
            .collect_vec())
    }

    fn get_all_availability(
        &self,
        event: EventId,
    ) -> Result<BTreeMap<UserId, Vec<Slot>>, StorageError> {
        let tables = self.shared.tables()?;
        let mut all: BTreeMap<UserId, Vec<Slot>> = BTreeMap::new();

        for (&id, &(e, user, window)) in tables.availability.iter() {
            if e == event {
                all.entry(user).or_default().push(Slot::new(id, window));
            }
        }

        Ok(all)
    }

    fn insert_availability(
        &self,
        scope: &mut MemoryScope,
        user: UserId,
        event: EventId,
        window: TimeWindow,
    ) -> Result<SlotId, StorageError> {
        self.owns(scope)?;
        let id = SlotId(self.shared.next_id());
        scope.stage(Write::InsertAvailability {
            id,
            event,
            user,
            window,
        });
        Ok(id)
    }

    fn delete_availability(
        &self,
        scope: &mut MemoryScope,
        user: UserId,
        slot: SlotId,
    ) -> Result<(), StorageError> {
        self.owns(scope)?;
        scope.stage(Write::DeleteAvailability { user, slot });
        Ok(())
    }
}
