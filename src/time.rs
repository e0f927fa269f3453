use crate::error::ValidationError;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` window between two UTC instants.
///
/// Equality and ordering are exact over `(start, end)`: two windows that merely
/// overlap are different windows.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "RawWindow")]
pub struct TimeWindow {
    #[serde(rename = "start_time")]
    start: DateTime<Utc>,
    #[serde(rename = "end_time")]
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawWindow {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = ValidationError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        TimeWindow::new(raw.start_time, raw.end_time)
    }
}

impl TimeWindow {
    /// Construct a new window, normalizing both ends to UTC.
    /// The window must not be empty.
    ///
    /// # Examples
    /// ```
    /// use chrono::{FixedOffset, TimeZone, Utc};
    /// use slotplan_libs::time::TimeWindow;
    ///
    /// let berlin = FixedOffset::east_opt(2 * 3600).unwrap();
    /// let window = TimeWindow::new(
    ///     berlin.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    ///     berlin.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap(),
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(window.start(), Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
    /// assert!(TimeWindow::new(window.end(), window.start()).is_err());
    /// ```
    pub fn new<Tz: TimeZone>(
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> Result<TimeWindow, ValidationError> {
        let start = start.with_timezone(&Utc);
        let end = end.with_timezone(&Utc);

        if end <= start {
            return Err(ValidationError::InvalidWindow { start, end });
        }

        Ok(TimeWindow { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Identity used when comparing stored and requested windows
    pub fn key(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.start, self.end)
    }

    /// Splits this window into consecutive frames of `length`, aligned to
    /// `self.start()`. A trailing remainder shorter than `length` is dropped.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use slotplan_libs::time::{FrameLength, TimeWindow};
    ///
    /// let at = |h, m| Utc.with_ymd_and_hms(2024, 5, 1, h, m, 0).unwrap();
    /// let half_hour = FrameLength::from_minutes(30).unwrap();
    ///
    /// let window = TimeWindow::new(at(10, 0), at(11, 10)).unwrap();
    /// assert_eq!(
    ///     window.decompose(half_hour),
    ///     vec![
    ///         TimeWindow::new(at(10, 0), at(10, 30)).unwrap(),
    ///         TimeWindow::new(at(10, 30), at(11, 0)).unwrap(),
    ///     ]
    /// );
    ///
    /// let short = TimeWindow::new(at(10, 0), at(10, 20)).unwrap();
    /// assert!(short.decompose(half_hour).is_empty());
    /// ```
    pub fn decompose(&self, length: FrameLength) -> Vec<TimeWindow> {
        let step = length.duration();
        let mut frames = Vec::new();
        let mut cursor = self.start;

        while let Some(next) = cursor.checked_add_signed(step) {
            if next > self.end {
                break;
            }
            frames.push(TimeWindow {
                start: cursor,
                end: next,
            });
            cursor = next;
        }

        frames
    }
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for TimeWindow {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        // Minute resolution within one year, at most one week long
        let start = u.int_in_range(0..=525_600_i64)?;
        let minutes = u.int_in_range(1..=10_080_i64)?;
        let start = Utc
            .timestamp_opt(start * 60, 0)
            .single()
            .ok_or(arbitrary::Error::IncorrectFormat)?;

        Ok(TimeWindow {
            start,
            end: start + Duration::minutes(minutes),
        })
    }
}

/// Strictly positive frame length, in whole minutes
#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FrameLength(u32);

impl FrameLength {
    pub fn from_minutes(minutes: u32) -> Result<FrameLength, ValidationError> {
        if minutes == 0 {
            Err(ValidationError::InvalidDuration {
                minutes: i64::from(minutes),
            })
        } else {
            Ok(FrameLength(minutes))
        }
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn duration(self) -> Duration {
        Duration::minutes(i64::from(self.0))
    }
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for FrameLength {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(FrameLength(u.int_in_range(1..=1440)?))
    }
}

pub trait Framed {
    fn framed(self, length: FrameLength) -> Vec<TimeWindow>;
}

impl<'a, T> Framed for T
where
    T: Iterator<Item = &'a TimeWindow>,
{
    /// Decomposes every window of the iterator, in iteration order
    ///
    /// # Example
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use slotplan_libs::time::{FrameLength, Framed, TimeWindow};
    ///
    /// let at = |h| Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap();
    /// let windows = vec![
    ///     TimeWindow::new(at(9), at(11)).unwrap(),
    ///     TimeWindow::new(at(14), at(15)).unwrap(),
    /// ];
    ///
    /// assert_eq!(
    ///     windows.iter().framed(FrameLength::from_minutes(60).unwrap()),
    ///     vec![
    ///         TimeWindow::new(at(9), at(10)).unwrap(),
    ///         TimeWindow::new(at(10), at(11)).unwrap(),
    ///         TimeWindow::new(at(14), at(15)).unwrap(),
    ///     ]
    /// );
    /// ```
    fn framed(self, length: FrameLength) -> Vec<TimeWindow> {
        let mut frames = Vec::with_capacity(self.size_hint().0);

        for window in self {
            frames.extend(window.decompose(length));
        }

        frames
    }
}
