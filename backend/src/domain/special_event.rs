//! Administrator-defined campaigns that grant entitlements while they run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use super::user::uuid_id;

/// Validation errors raised by special event constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecialEventValidationError {
    #[error("special event id must not be empty")]
    EmptyId,
    #[error("special event id must be a valid UUID")]
    InvalidId,
    #[error("special event name must not be empty")]
    EmptyName,
    #[error("special event must end after it starts")]
    EndsBeforeStart,
}

uuid_id!(
    /// Special event identifier.
    SpecialEventId,
    SpecialEventValidationError,
    SpecialEventValidationError::EmptyId,
    SpecialEventValidationError::InvalidId
);

/// Time-boxed campaign. Open-ended when `ends_at` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SpecialEventDto")]
pub struct SpecialEvent {
    pub id: SpecialEventId,
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub created_by: UserId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl SpecialEvent {
    /// Validate and construct an event.
    pub fn new(
        id: SpecialEventId,
        name: impl Into<String>,
        created_by: UserId,
        starts_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
    ) -> Result<Self, SpecialEventValidationError> {
        Self::try_from(SpecialEventDto {
            id,
            name: name.into(),
            description: None,
            tags: Vec::new(),
            created_by,
            starts_at,
            ends_at,
        })
    }

    /// Whether the event is running at `now`. The start is inclusive and the
    /// end exclusive.
    ///
    /// # Examples
    /// ```
    /// use chrono::{Duration, Utc};
    /// use emote_portal::domain::{SpecialEvent, SpecialEventId, UserId};
    ///
    /// let now = Utc::now();
    /// let event = SpecialEvent::new(
    ///     SpecialEventId::random(),
    ///     "Launch week",
    ///     UserId::random(),
    ///     now,
    ///     Some(now + Duration::days(7)),
    /// )
    /// .expect("valid event");
    /// assert!(event.is_active(now));
    /// assert!(!event.is_active(now + Duration::days(7)));
    /// ```
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && self.ends_at.is_none_or(|end| now < end)
    }

    /// Whether the event has not started yet at `now`.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        now < self.starts_at
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpecialEventDto {
    id: SpecialEventId,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    created_by: UserId,
    starts_at: DateTime<Utc>,
    #[serde(default)]
    ends_at: Option<DateTime<Utc>>,
}

impl TryFrom<SpecialEventDto> for SpecialEvent {
    type Error = SpecialEventValidationError;

    fn try_from(value: SpecialEventDto) -> Result<Self, Self::Error> {
        if value.name.trim().is_empty() {
            return Err(SpecialEventValidationError::EmptyName);
        }
        if value.ends_at.is_some_and(|end| end <= value.starts_at) {
            return Err(SpecialEventValidationError::EndsBeforeStart);
        }
        Ok(Self {
            id: value.id,
            name: value.name,
            description: value.description,
            tags: value.tags,
            created_by: value.created_by,
            starts_at: value.starts_at,
            ends_at: value.ends_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};

    #[fixture]
    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn event(start: DateTime<Utc>, ends_at: Option<DateTime<Utc>>) -> SpecialEvent {
        SpecialEvent::new(
            SpecialEventId::random(),
            "Winter",
            UserId::random(),
            start,
            ends_at,
        )
        .expect("valid event")
    }

    #[rstest]
    #[case(Duration::hours(-1), false)]
    #[case(Duration::zero(), true)]
    #[case(Duration::days(6), true)]
    #[case(Duration::days(7), false)]
    fn bounded_events_are_active_within_their_window(
        start: DateTime<Utc>,
        #[case] offset: Duration,
        #[case] expected: bool,
    ) {
        let bounded = event(start, Some(start + Duration::days(7)));
        assert_eq!(bounded.is_active(start + offset), expected);
    }

    #[rstest]
    fn open_ended_events_stay_active(start: DateTime<Utc>) {
        let open = event(start, None);
        assert!(open.is_active(start + Duration::days(3650)));
        assert!(open.is_upcoming(start - Duration::seconds(1)));
    }

    #[rstest]
    fn events_must_end_after_they_start(start: DateTime<Utc>) {
        let err = SpecialEvent::new(
            SpecialEventId::random(),
            "Backwards",
            UserId::random(),
            start,
            Some(start),
        )
        .expect_err("invalid window");
        assert_eq!(err, SpecialEventValidationError::EndsBeforeStart);
    }
}
