//! Meeting slot reconciliation and recommendation.
//!
//! Organizers propose candidate windows for an event, invitees submit the
//! windows they are free, and [`Scheduler::get_recommendations`] reports which
//! meeting-length frames of the candidates suit the most attendees.
//!
//! - [`time`]: windows and their decomposition into fixed-length frames
//! - [`diff`]: stored-vs-requested slot reconciliation
//! - [`recommend`]: per-frame attendance and ranking
//! - [`schedule`]: the transactional write and read flows
//! - [`repository`]: the storage contracts, with [`memory`] as an in-process implementation

pub mod config;
pub mod data;
pub mod diff;
pub mod error;
pub mod memory;
pub mod recommend;
pub mod repository;
pub mod schedule;
pub mod time;
pub mod validator;

pub use config::EngineConfig;
pub use data::{
    AvailabilityRequest, Event, EventDetails, EventId, EventRequest, Slot, SlotId, UserId,
};
pub use diff::{diff, SlotDiff};
pub use error::{Result, SchedulerError, StorageError, ValidationError};
pub use memory::MemoryStore;
pub use recommend::{rank, recommend, RecommendedFrame};
pub use schedule::Scheduler;
pub use time::{FrameLength, Framed, TimeWindow};
pub use validator::Validator;
