use crate::data::{Event, UserId};
use crate::error::ValidationError;
use crate::time::{Framed, TimeWindow};
use log::{debug, trace};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One meeting frame and who can attend it.
///
/// `available` and `unavailable` are disjoint, and together hold every user
/// that submitted availability for the event.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RecommendedFrame {
    #[serde(flatten)]
    pub frame: TimeWindow,
    #[serde(rename = "available_users_id")]
    pub available: BTreeSet<UserId>,
    #[serde(rename = "unavailable_users_id")]
    pub unavailable: BTreeSet<UserId>,
}

impl RecommendedFrame {
    /// Number of attendees available for this frame
    pub fn coverage(&self) -> usize {
        self.available.len()
    }
}

/// Tallies attendance for every frame of the event's candidate slots.
///
/// Candidates and availability are both cut into frames of the event's
/// duration; a user is available for a candidate frame when one of their own
/// frames is identical to it. Frames nobody can attend are left out, and users
/// without any submitted window appear in neither set.
///
/// The result is ordered by frame, not by coverage; see [`rank`].
pub fn recommend<'a, C>(
    event: &Event,
    candidates: C,
    availability: &BTreeMap<UserId, Vec<TimeWindow>>,
) -> Result<Vec<RecommendedFrame>, ValidationError>
where
    C: IntoIterator<Item = &'a TimeWindow>,
{
    let length = event.frame_length()?;

    let respondents: BTreeSet<UserId> = availability
        .iter()
        .filter(|(_, windows)| !windows.is_empty())
        .map(|(&user, _)| user)
        .collect();

    if respondents.is_empty() {
        debug!("No availability submitted for event {}", event.id);
        return Ok(vec![]);
    }

    let universe: BTreeSet<TimeWindow> = candidates
        .into_iter()
        .framed(length)
        .into_iter()
        .collect();

    let mut attendance: BTreeMap<TimeWindow, BTreeSet<UserId>> = BTreeMap::new();
    for (&user, windows) in availability {
        for frame in windows.iter().framed(length) {
            if universe.contains(&frame) {
                trace!("User {} can attend {:?}", user, frame);
                attendance.entry(frame).or_default().insert(user);
            }
        }
    }

    debug!(
        "Event {}: {} candidate frames, {} attendable, {} respondents",
        event.id,
        universe.len(),
        attendance.len(),
        respondents.len()
    );

    Ok(attendance
        .into_iter()
        .map(|(frame, available)| RecommendedFrame {
            frame,
            unavailable: respondents.difference(&available).copied().collect(),
            available,
        })
        .collect())
}

/// Orders frames by descending coverage. Frames with equal coverage are
/// ordered by start, then end, ascending.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use slotplan_libs::data::UserId;
/// use slotplan_libs::recommend::{rank, RecommendedFrame};
/// use slotplan_libs::time::TimeWindow;
///
/// let at = |h| Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap();
/// let frame = |h, available: &[i64], unavailable: &[i64]| RecommendedFrame {
///     frame: TimeWindow::new(at(h), at(h + 1)).unwrap(),
///     available: available.iter().map(|&id| UserId(id)).collect(),
///     unavailable: unavailable.iter().map(|&id| UserId(id)).collect(),
/// };
///
/// let ranked = rank(vec![frame(9, &[1], &[2, 3]), frame(11, &[1, 2, 3], &[]), frame(8, &[2], &[1, 3])]);
///
/// let starts: Vec<_> = ranked.iter().map(|f| f.frame.start()).collect();
/// assert_eq!(starts, vec![at(11), at(8), at(9)]);
/// ```
pub fn rank(mut frames: Vec<RecommendedFrame>) -> Vec<RecommendedFrame> {
    frames.sort_by(|a, b| {
        b.coverage()
            .cmp(&a.coverage())
            .then_with(|| a.frame.cmp(&b.frame))
    });
    frames
}
