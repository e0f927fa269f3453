use crate::data::{AvailabilityRequest, Event, EventId, EventRequest, Slot, UserId};
use crate::diff::{diff, SlotDiff};
use crate::error::{Result, SchedulerError};
use crate::recommend::{rank, recommend, RecommendedFrame};
use crate::repository::{
    AvailabilityRepository, Clock, EventRepository, Scope, SystemClock, Transactional,
};
use crate::time::TimeWindow;
use crate::validator::Validator;
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::iter;

/// Entry point for every write and read the engine supports.
///
/// Each write runs inside exactly one storage scope, which is committed when the
/// flow succeeds and rolled back when any step fails.
pub struct Scheduler<R, C = SystemClock> {
    store: R,
    validator: Validator,
    clock: C,
}

impl<R> Scheduler<R, SystemClock>
where
    R: EventRepository + AvailabilityRepository,
{
    pub fn new(store: R, validator: Validator) -> Self {
        Scheduler {
            store,
            validator,
            clock: SystemClock,
        }
    }
}

impl<R, C> Scheduler<R, C>
where
    R: EventRepository + AvailabilityRepository,
    C: Clock,
{
    /// Replaces the clock used for `created_at` / `updated_at`
    pub fn with_clock<T: Clock>(self, clock: T) -> Scheduler<R, T> {
        Scheduler {
            store: self.store,
            validator: self.validator,
            clock,
        }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    /// Creates the event (when `request.id` is `None`) or updates it, and
    /// reconciles its candidate slots with `request.proposed_slots`.
    pub fn reconcile_event_write(&self, request: &EventRequest) -> Result<EventId> {
        self.validator.validate_event(request)?;
        let now = self.clock.now();

        let (id, changes) = match request.id {
            None => self.in_scope("create event", |scope| {
                let id = self.store.insert_event(scope, &request.details, now)?;
                let changes = diff(iter::empty(), &request.proposed_slots);
                self.write_candidates(scope, id, &changes)?;
                Ok((id, changes))
            })?,
            Some(id) => self.in_scope("update event", |scope| {
                self.require_event(id)?;
                self.store.update_event(scope, id, &request.details, now)?;
                let existing = self.store.get_candidate_slots(id)?;
                let changes = diff(&existing, &request.proposed_slots);
                self.write_candidates(scope, id, &changes)?;
                Ok((id, changes))
            })?,
        };

        info!(
            "Saved event {}: {} slots added, {} removed",
            id,
            changes.to_insert.len(),
            changes.to_delete.len()
        );
        Ok(id)
    }

    /// Reconciles the user's stored availability for the event with
    /// `request.availability`.
    pub fn reconcile_availability_write(&self, request: &AvailabilityRequest) -> Result<()> {
        self.validator.validate_availability(request)?;
        let (event, user) = (request.event_id, request.user_id);

        let changes = self.in_scope("save availability", |scope| {
            self.require_event(event)?;
            let existing = self.store.get_user_availability(event, user)?;
            let changes = diff(&existing, &request.availability);
            self.write_availability(scope, event, user, &changes)?;
            Ok(changes)
        })?;

        info!(
            "Saved availability of user {} for event {}: {} slots added, {} removed",
            user,
            event,
            changes.to_insert.len(),
            changes.to_delete.len()
        );
        Ok(())
    }

    /// Deletes the event together with its candidate slots
    pub fn delete_event(&self, id: EventId) -> Result<()> {
        let removed = self.in_scope("delete event", |scope| {
            self.require_event(id)?;
            let slots = self.store.get_candidate_slots(id)?;
            for slot in slots.iter() {
                self.store.delete_candidate_slot(scope, slot.id)?;
            }
            self.store.delete_event(scope, id)?;
            Ok(slots.len())
        })?;

        info!("Deleted event {} and {} candidate slots", id, removed);
        Ok(())
    }

    /// Withdraws every window the user submitted for the event
    pub fn remove_availability(&self, event: EventId, user: UserId) -> Result<()> {
        let changes = self.in_scope("remove availability", |scope| {
            self.require_event(event)?;
            let existing = self.store.get_user_availability(event, user)?;
            let changes = diff(&existing, iter::empty());
            self.write_availability(scope, event, user, &changes)?;
            Ok(changes)
        })?;

        info!(
            "Removed {} availability slots of user {} for event {}",
            changes.to_delete.len(),
            user,
            event
        );
        Ok(())
    }

    /// Stored availability of one user, empty if they never submitted any
    pub fn get_user_availability(&self, event: EventId, user: UserId) -> Result<Vec<Slot>> {
        Ok(self.store.get_user_availability(event, user)?)
    }

    /// Frames of the event's candidate slots, best coverage first
    pub fn get_recommendations(&self, id: EventId) -> Result<Vec<RecommendedFrame>> {
        let event = self.require_event(id)?;
        let candidates = self.store.get_candidate_slots(id)?;
        let availability: BTreeMap<UserId, Vec<TimeWindow>> = self
            .store
            .get_all_availability(id)?
            .into_iter()
            .map(|(user, slots)| (user, slots.into_iter().map(|s| s.window).collect()))
            .collect();

        let frames = recommend(
            &event,
            candidates.iter().map(|slot| &slot.window),
            &availability,
        )?;

        debug!("Recommending {} frames for event {}", frames.len(), id);
        Ok(rank(frames))
    }

    fn require_event(&self, id: EventId) -> Result<Event> {
        self.store
            .get_event(id)?
            .ok_or(SchedulerError::NotFound {
                entity: "event",
                id: id.0,
            })
    }

    fn write_candidates(
        &self,
        scope: &mut <R as Transactional>::Scope,
        event: EventId,
        changes: &SlotDiff,
    ) -> Result<()> {
        debug!(
            "Event {} candidate diff: +{} -{}",
            event,
            changes.to_insert.len(),
            changes.to_delete.len()
        );
        for &window in changes.to_insert.iter() {
            self.store.insert_candidate_slot(scope, event, window)?;
        }
        for &slot in changes.to_delete.iter() {
            self.store.delete_candidate_slot(scope, slot)?;
        }
        Ok(())
    }

    fn write_availability(
        &self,
        scope: &mut <R as Transactional>::Scope,
        event: EventId,
        user: UserId,
        changes: &SlotDiff,
    ) -> Result<()> {
        debug!(
            "User {} availability diff for event {}: +{} -{}",
            user,
            event,
            changes.to_insert.len(),
            changes.to_delete.len()
        );
        for &window in changes.to_insert.iter() {
            self.store.insert_availability(scope, user, event, window)?;
        }
        for &slot in changes.to_delete.iter() {
            self.store.delete_availability(scope, user, slot)?;
        }
        Ok(())
    }

    /// Runs `flow` in a fresh scope. The scope is committed if `flow` succeeds and
    /// rolled back otherwise; a failed rollback is logged and the flow's own
    /// error is returned.
    fn in_scope<T, F>(&self, name: &str, flow: F) -> Result<T>
    where
        F: FnOnce(&mut <R as Transactional>::Scope) -> Result<T>,
    {
        let mut scope = self.store.begin()?;

        match flow(&mut scope) {
            Ok(value) => {
                scope.commit()?;
                Ok(value)
            }
            Err(err) => {
                warn!("{} failed, rolling back: {}", name, err);
                if let Err(rollback) = scope.rollback() {
                    error!("Rollback after failed {} also failed: {}", name, rollback);
                }
                Err(err)
            }
        }
    }
}
