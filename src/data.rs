use crate::error::ValidationError;
use crate::time::{FrameLength, TimeWindow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_type!(EventId);
id_type!(UserId);
id_type!(
    /// Row identity of a stored window, used for deletes
    SlotId
);

/// The organizer-editable fields of an event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub title: String,
    pub organizer_id: UserId,
    pub duration_minutes: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(flatten)]
    pub details: EventDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Frame length used when comparing this event's windows
    pub fn frame_length(&self) -> Result<FrameLength, ValidationError> {
        FrameLength::from_minutes(self.details.duration_minutes)
    }
}

/// A stored window: a candidate slot of an event, or one user's availability
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    #[serde(flatten)]
    pub window: TimeWindow,
}

impl Slot {
    pub fn new(id: SlotId, window: TimeWindow) -> Slot {
        Slot { id, window }
    }
}

/// Creates an event when `id` is `None`, otherwise replaces the event's
/// details and candidate slots.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRequest {
    #[serde(default)]
    pub id: Option<EventId>,
    #[serde(flatten)]
    pub details: EventDetails,
    pub proposed_slots: Vec<TimeWindow>,
}

impl EventRequest {
    pub fn create(details: EventDetails, proposed_slots: Vec<TimeWindow>) -> Self {
        EventRequest {
            id: None,
            details,
            proposed_slots,
        }
    }

    pub fn update(id: EventId, details: EventDetails, proposed_slots: Vec<TimeWindow>) -> Self {
        EventRequest {
            id: Some(id),
            details,
            proposed_slots,
        }
    }
}

/// The complete set of windows a user is free for one event
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub user_id: UserId,
    pub event_id: EventId,
    pub availability: Vec<TimeWindow>,
}

impl AvailabilityRequest {
    pub fn new(user_id: UserId, event_id: EventId, availability: Vec<TimeWindow>) -> Self {
        AvailabilityRequest {
            user_id,
            event_id,
            availability,
        }
    }
}
