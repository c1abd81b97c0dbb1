//! Parsing helpers that turn malformed request input into `400` errors
//! naming the offending field.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::{AssetKey, Error};

/// Machine-readable validation codes placed in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    InvalidId,
    InvalidAssetKey,
    InvalidTimestamp,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_id",
            Self::InvalidAssetKey => "invalid_asset_key",
            Self::InvalidTimestamp => "invalid_timestamp",
        }
    }
}

/// Name of a path or query parameter as clients see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn invalid_field(
    field: FieldName,
    code: ValidationCode,
    message: String,
    value: &str,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

/// Parse a UUID-backed identifier.
pub(crate) fn parse_id<T: FromStr>(value: &str, field: FieldName) -> Result<T, Error> {
    value.parse::<T>().map_err(|_| {
        invalid_field(
            field,
            ValidationCode::InvalidId,
            format!("{} must be a valid UUID", field.as_str()),
            value,
        )
    })
}

/// Parse a CDN object key.
pub(crate) fn parse_asset_key(value: &str, field: FieldName) -> Result<AssetKey, Error> {
    AssetKey::new(value).map_err(|err| {
        invalid_field(
            field,
            ValidationCode::InvalidAssetKey,
            capitalise_first(&err),
            value,
        )
    })
}

/// Parse an optional RFC 3339 timestamp query parameter.
pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|timestamp| timestamp.with_timezone(&Utc))
                .map_err(|_| {
                    invalid_field(
                        field,
                        ValidationCode::InvalidTimestamp,
                        format!("{} must be an RFC 3339 timestamp", field.as_str()),
                        raw,
                    )
                })
        })
        .transpose()
}

fn capitalise_first(message: &impl Display) -> String {
    let message = message.to_string();
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => message,
    }
}
