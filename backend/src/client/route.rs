//! Page routes: `/users/{id}`, `/emotes/{id}`, `/special-events/{id}`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::domain::{EmoteId, SpecialEventId, UserId};

/// Kind of page a route points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    User,
    Emote,
    SpecialEvent,
}

impl PageKind {
    /// Lower-case noun used in messages, e.g. "special event".
    pub fn noun(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Emote => "emote",
            Self::SpecialEvent => "special event",
        }
    }

    fn segment(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Emote => "emotes",
            Self::SpecialEvent => "special-events",
        }
    }
}

/// Reasons a path is not a page route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("unknown route `{path}`")]
    Unknown { path: String },
    #[error("`{value}` is not a valid {kind} id")]
    InvalidId { kind: &'static str, value: String },
}

/// A page route with its typed parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    User(UserId),
    Emote(EmoteId),
    SpecialEvent(SpecialEventId),
}

impl Route {
    /// Kind of page this route shows.
    pub fn kind(&self) -> PageKind {
        match self {
            Self::User(_) => PageKind::User,
            Self::Emote(_) => PageKind::Emote,
            Self::SpecialEvent(_) => PageKind::SpecialEvent,
        }
    }
}

fn parse_id<T: FromStr>(kind: PageKind, value: &str) -> Result<T, RouteError> {
    value.parse().map_err(|_| RouteError::InvalidId {
        kind: kind.noun(),
        value: value.to_owned(),
    })
}

impl FromStr for Route {
    type Err = RouteError;

    /// Parse a path. A trailing slash, a query string and a fragment are
    /// ignored.
    ///
    /// # Examples
    /// ```
    /// use emote_portal::client::{PageKind, Route};
    ///
    /// let route: Route = "/emotes/0f3c9a2e-8d7b-4c61-a5e4-3b2f1d0c9e8a?tab=usage"
    ///     .parse()
    ///     .expect("valid route");
    /// assert_eq!(route.kind(), PageKind::Emote);
    /// assert!("/settings".parse::<Route>().is_err());
    /// ```
    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let unknown = || RouteError::Unknown {
            path: path.to_owned(),
        };
        let trimmed = path.trim();
        let without_query = trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let mut segments = without_query.strip_prefix('/').ok_or_else(unknown)?.split('/');
        let (Some(section), Some(id), None) = (segments.next(), segments.next(), segments.next())
        else {
            return Err(unknown());
        };

        match section {
            "users" => parse_id(PageKind::User, id).map(Self::User),
            "emotes" => parse_id(PageKind::Emote, id).map(Self::Emote),
            "special-events" => parse_id(PageKind::SpecialEvent, id).map(Self::SpecialEvent),
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let segment = self.kind().segment();
        match self {
            Self::User(id) => write!(f, "/{segment}/{id}"),
            Self::Emote(id) => write!(f, "/{segment}/{id}"),
            Self::SpecialEvent(id) => write!(f, "/{segment}/{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    #[rstest]
    #[case(format!("/users/{ID}"), PageKind::User)]
    #[case(format!("/users/{ID}/"), PageKind::User)]
    #[case(format!("/emotes/{ID}?size=4x"), PageKind::Emote)]
    #[case(format!("  /special-events/{ID}#grants "), PageKind::SpecialEvent)]
    fn page_routes_parse(#[case] path: String, #[case] kind: PageKind) {
        let route: Route = path.parse().expect("valid route");
        assert_eq!(route.kind(), kind);
        assert!(route.to_string().ends_with(ID));
    }

    #[rstest]
    #[case("")]
    #[case("/")]
    #[case("users/3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    #[case("/users")]
    #[case("/settings/3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    #[case("/users/3fa85f64-5717-4562-b3fc-2c963f66afa6/emotes")]
    fn other_paths_are_unknown(#[case] path: &str) {
        assert!(matches!(
            path.parse::<Route>(),
            Err(RouteError::Unknown { .. })
        ));
    }

    #[rstest]
    fn malformed_ids_name_the_page_kind() {
        let err = "/special-events/42".parse::<Route>().expect_err("bad id");
        assert_eq!(err.to_string(), "`42` is not a valid special event id");
    }

    #[rstest]
    fn display_round_trips() {
        let route: Route = format!("/special-events/{ID}").parse().expect("valid");
        assert_eq!(route.to_string(), format!("/special-events/{ID}"));
        assert_eq!(route.to_string().parse::<Route>(), Ok(route));
    }
}
