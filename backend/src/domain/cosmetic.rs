//! Cosmetics a user can wear: badges and paints, plus emote set identifiers
//! granted alongside them.
//!
//! Paints are layered fills drawn behind a user's name. Colours are packed
//! RGBA (`0xRRGGBBAA`).

use serde::{Deserialize, Serialize};
use url::Url;

use super::user::uuid_id;

/// Validation errors raised by cosmetic constructors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CosmeticValidationError {
    #[error("cosmetic id must not be empty")]
    EmptyId,
    #[error("cosmetic id must be a valid UUID")]
    InvalidId,
    #[error("cosmetic name must not be empty")]
    EmptyName,
    #[error("gradient stop at {at} lies outside [0, 1]")]
    StopOutOfRange { at: f32 },
    #[error("gradient stops must be sorted by position")]
    UnsortedStops,
    #[error("gradients need at least one stop")]
    NoStops,
}

uuid_id!(
    /// Badge identifier.
    BadgeId,
    CosmeticValidationError,
    CosmeticValidationError::EmptyId,
    CosmeticValidationError::InvalidId
);

uuid_id!(
    /// Paint identifier.
    PaintId,
    CosmeticValidationError,
    CosmeticValidationError::EmptyId,
    CosmeticValidationError::InvalidId
);

uuid_id!(
    /// Emote set identifier.
    EmoteSetId,
    CosmeticValidationError,
    CosmeticValidationError::EmptyId,
    CosmeticValidationError::InvalidId
);

/// Small image shown next to a user's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: BadgeId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One colour stop of a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub at: f32,
    pub color: u32,
}

/// Shape of a radial gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadialShape {
    Ellipse,
    Circle,
}

/// A single fill layer of a paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaintLayer {
    SingleColor {
        color: u32,
    },
    LinearGradient {
        angle: i32,
        #[serde(default)]
        repeating: bool,
        stops: Vec<GradientStop>,
    },
    RadialGradient {
        angle: i32,
        #[serde(default)]
        repeating: bool,
        stops: Vec<GradientStop>,
        shape: RadialShape,
    },
    Image {
        url: Url,
    },
}

impl PaintLayer {
    fn validate(&self) -> Result<(), CosmeticValidationError> {
        match self {
            Self::LinearGradient { stops, .. } | Self::RadialGradient { stops, .. } => {
                validate_stops(stops)
            }
            Self::SingleColor { .. } | Self::Image { .. } => Ok(()),
        }
    }
}

fn validate_stops(stops: &[GradientStop]) -> Result<(), CosmeticValidationError> {
    if stops.is_empty() {
        return Err(CosmeticValidationError::NoStops);
    }
    if let Some(stop) = stops.iter().find(|stop| !(0.0..=1.0).contains(&stop.at)) {
        return Err(CosmeticValidationError::StopOutOfRange { at: stop.at });
    }
    if stops.windows(2).any(|pair| pair[0].at > pair[1].at) {
        return Err(CosmeticValidationError::UnsortedStops);
    }
    Ok(())
}

/// Drop shadow drawn under the painted text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintShadow {
    pub color: u32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub blur: f32,
}

/// Layered name fill.
///
/// Constructed through [`Paint::new`] or deserialisation, both of which
/// enforce the gradient stop invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PaintDto")]
pub struct Paint {
    pub id: PaintId,
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub layers: Vec<PaintLayer>,
    pub shadows: Vec<PaintShadow>,
}

impl Paint {
    /// Validate and construct a paint.
    ///
    /// # Examples
    /// ```
    /// use emote_portal::domain::{GradientStop, Paint, PaintId, PaintLayer};
    ///
    /// let paint = Paint::new(
    ///     PaintId::random(),
    ///     "Sunset",
    ///     vec![PaintLayer::LinearGradient {
    ///         angle: 90,
    ///         repeating: false,
    ///         stops: vec![
    ///             GradientStop { at: 0.0, color: 0xff8800ff },
    ///             GradientStop { at: 1.0, color: 0x8800ffff },
    ///         ],
    ///     }],
    /// )
    /// .expect("valid paint");
    /// assert_eq!(paint.layers.len(), 1);
    /// ```
    pub fn new(
        id: PaintId,
        name: impl Into<String>,
        layers: Vec<PaintLayer>,
    ) -> Result<Self, CosmeticValidationError> {
        Self::try_from(PaintDto {
            id,
            name: name.into(),
            description: None,
            tags: Vec::new(),
            layers,
            shadows: Vec::new(),
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaintDto {
    id: PaintId,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    layers: Vec<PaintLayer>,
    #[serde(default)]
    shadows: Vec<PaintShadow>,
}

impl TryFrom<PaintDto> for Paint {
    type Error = CosmeticValidationError;

    fn try_from(value: PaintDto) -> Result<Self, Self::Error> {
        if value.name.trim().is_empty() {
            return Err(CosmeticValidationError::EmptyName);
        }
        value.layers.iter().try_for_each(PaintLayer::validate)?;
        Ok(Self {
            id: value.id,
            name: value.name,
            description: value.description,
            tags: value.tags,
            layers: value.layers,
            shadows: value.shadows,
        })
    }
}
