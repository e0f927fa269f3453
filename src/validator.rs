use crate::config::EngineConfig;
use crate::data::{AvailabilityRequest, EventRequest};
use crate::error::ValidationError;
use crate::time::{FrameLength, TimeWindow};

/// Request checks run before any storage call.
///
/// Window shape (`end > start`) is already guaranteed by [`crate::time::TimeWindow`];
/// this covers everything that depends on configured limits.
#[derive(Clone, Debug)]
pub struct Validator {
    max_slots: usize,
    max_duration_minutes: u32,
    max_window_minutes: i64,
}

impl Default for Validator {
    fn default() -> Self {
        Validator::new(&EngineConfig::default())
    }
}

impl Validator {
    pub fn new(config: &EngineConfig) -> Self {
        Validator {
            max_slots: config.max_slots_per_request,
            max_duration_minutes: config.max_duration_minutes,
            max_window_minutes: config.max_window_minutes,
        }
    }

    pub fn validate_event(&self, request: &EventRequest) -> Result<(), ValidationError> {
        if request.details.title.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "title" });
        }

        let minutes = request.details.duration_minutes;
        FrameLength::from_minutes(minutes)?;
        if minutes > self.max_duration_minutes {
            return Err(ValidationError::DurationTooLong {
                minutes,
                limit: self.max_duration_minutes,
            });
        }

        self.check_length(request.proposed_slots.len())?;
        self.check_windows(&request.proposed_slots)
    }

    pub fn validate_availability(
        &self,
        request: &AvailabilityRequest,
    ) -> Result<(), ValidationError> {
        self.check_length(request.availability.len())?;
        self.check_windows(&request.availability)
    }

    fn check_windows(&self, windows: &[TimeWindow]) -> Result<(), ValidationError> {
        match windows
            .iter()
            .find(|w| w.duration().num_minutes() > self.max_window_minutes)
        {
            Some(window) => Err(ValidationError::WindowTooLong {
                start: window.start(),
                end: window.end(),
                limit: self.max_window_minutes,
            }),
            None => Ok(()),
        }
    }

    fn check_length(&self, found: usize) -> Result<(), ValidationError> {
        if found > self.max_slots {
            Err(ValidationError::UnsupportedLength {
                expected: self.max_slots,
                found,
            })
        } else {
            Ok(())
        }
    }
}
