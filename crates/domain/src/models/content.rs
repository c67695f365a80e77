//! Content entities published on the village website.
//!
//! Every entity type is a variant of [`ContentPayload`] stored as one
//! document per record. Slugged types derive their slug from the title or
//! name field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::slug::slugify;
use shared::validation::{validate_http_url, validate_phone_number};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::error::{collect_field_errors, FieldError};

/// The manageable content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    #[serde(rename = "berita")]
    News,
    #[serde(rename = "galeri")]
    Gallery,
    #[serde(rename = "umkm")]
    Business,
    #[serde(rename = "demografi")]
    Demographic,
    #[serde(rename = "apbdes")]
    Budget,
    #[serde(rename = "struktur")]
    StructureMember,
    #[serde(rename = "dusun")]
    SubArea,
}

impl ContentKind {
    pub const ALL: [ContentKind; 7] = [
        ContentKind::News,
        ContentKind::Gallery,
        ContentKind::Business,
        ContentKind::Demographic,
        ContentKind::Budget,
        ContentKind::StructureMember,
        ContentKind::SubArea,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::News => "berita",
            ContentKind::Gallery => "galeri",
            ContentKind::Business => "umkm",
            ContentKind::Demographic => "demografi",
            ContentKind::Budget => "apbdes",
            ContentKind::StructureMember => "struktur",
            ContentKind::SubArea => "dusun",
        }
    }

    /// Wire name of the field a slug is derived from, for slugged types.
    pub fn slug_source_field(&self) -> Option<&'static str> {
        match self {
            ContentKind::News | ContentKind::Budget => Some("title"),
            ContentKind::Business | ContentKind::SubArea => Some("name"),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown content type: {0}")]
pub struct UnknownContentKind(pub String);

impl FromStr for ContentKind {
    type Err = UnknownContentKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownContentKind(s.to_string()))
    }
}

fn default_true() -> bool {
    true
}

/// A news article (berita).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewsPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Title is required (max 200 characters)"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Author is required"))]
    pub author: String,

    #[validate(custom(function = "validate_http_url"))]
    pub image_url: Option<String>,

    #[serde(default = "default_true")]
    pub published: bool,
}

/// A photo in the gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PhotoItem {
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Title is required"))]
    pub title: String,

    #[validate(length(max = 500, message = "Description is too long"))]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_http_url"))]
    pub image_url: String,
}

/// A video in the gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Title is required"))]
    pub title: String,

    #[validate(length(max = 500, message = "Description is too long"))]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_http_url"))]
    pub video_url: String,
}

/// A gallery item, discriminated by `mediaType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mediaType", rename_all = "lowercase")]
pub enum GalleryPayload {
    Photo(PhotoItem),
    Video(VideoItem),
}

/// A local business listing (UMKM).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BusinessPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Business name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Owner is required"))]
    pub owner: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "Category is required"))]
    pub category: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 2000, message = "Description is required"))]
    pub description: String,

    #[validate(custom(function = "validate_phone_number"))]
    pub phone: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Address is required"))]
    pub address: String,

    #[validate(custom(function = "validate_http_url"))]
    pub image_url: Option<String>,
}

/// A labelled count in a demographic breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CountEntry {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Label is required"))]
    pub label: String,
    pub count: u32,
}

/// Population figures for one year (demografi).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DemographicPayload {
    #[validate(range(min = 2000, max = 2100, message = "Year must be between 2000 and 2100"))]
    pub year: i32,
    pub male_population: u32,
    pub female_population: u32,
    pub household_count: u32,
    #[serde(default)]
    #[validate(nested)]
    pub age_groups: Vec<CountEntry>,
    #[serde(default)]
    #[validate(nested)]
    pub occupations: Vec<CountEntry>,
    #[serde(default)]
    #[validate(nested)]
    pub religions: Vec<CountEntry>,
    #[serde(default)]
    #[validate(nested)]
    pub education: Vec<CountEntry>,
}

impl DemographicPayload {
    pub fn total_population(&self) -> u64 {
        u64::from(self.male_population) + u64::from(self.female_population)
    }
}

/// Largest amount a single budget line may carry, in Rupiah.
pub const MAX_BUDGET_AMOUNT: i64 = 1_000_000_000_000_000;

/// One budget line, amount in whole Rupiah.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLine {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Line name is required"))]
    pub name: String,

    #[validate(range(
        min = 0,
        max = 1_000_000_000_000_000i64,
        message = "Amount must be between 0 and 10^15 Rupiah"
    ))]
    pub amount: i64,
}

/// A group of budget lines, e.g. one field of expenditure (bidang).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSection {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Section name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<BudgetLine>,
}

impl BudgetSection {
    /// Sum of the section's lines, `None` on overflow.
    pub fn total(&self) -> Option<i64> {
        self.items
            .iter()
            .try_fold(0i64, |acc, item| acc.checked_add(item.amount))
    }
}

fn sum_sections(sections: &[BudgetSection]) -> Option<i64> {
    sections
        .iter()
        .try_fold(0i64, |acc, section| acc.checked_add(section.total()?))
}

/// Village budget snapshot (APBDes) for one fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPayload {
    #[validate(range(min = 2000, max = 2100, message = "Year must be between 2000 and 2100"))]
    pub year: i32,

    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    #[serde(default)]
    #[validate(nested)]
    pub income: Vec<BudgetSection>,

    #[serde(default)]
    #[validate(nested)]
    pub expenditure: Vec<BudgetSection>,

    #[serde(default)]
    #[validate(nested)]
    pub financing: Vec<BudgetSection>,
}

/// Totals return `None` when they leave the `i64` range.
impl BudgetPayload {
    pub fn total_income(&self) -> Option<i64> {
        sum_sections(&self.income)
    }

    pub fn total_expenditure(&self) -> Option<i64> {
        sum_sections(&self.expenditure)
    }

    pub fn total_financing(&self) -> Option<i64> {
        sum_sections(&self.financing)
    }

    /// Surplus (positive) or deficit (negative) before financing.
    pub fn surplus(&self) -> Option<i64> {
        self.total_income()?.checked_sub(self.total_expenditure()?)
    }

    fn totals_error(&self) -> Option<FieldError> {
        [
            ("income", self.total_income()),
            ("expenditure", self.total_expenditure()),
            ("financing", self.total_financing()),
        ]
        .into_iter()
        .find(|(_, total)| total.is_none())
        .map(|(field, _)| FieldError::new(field, "Total exceeds the supported range"))
        .or_else(|| {
            self.surplus()
                .is_none()
                .then(|| FieldError::new("expenditure", "Surplus exceeds the supported range"))
        })
    }
}

/// A member of the village government structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StructureMemberPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Position is required"))]
    pub position: String,

    #[serde(default)]
    pub order: u32,

    #[validate(custom(function = "validate_http_url"))]
    pub photo_url: Option<String>,
}

/// Profile of a sub-area of the village (dusun).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubAreaPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Head name is required"))]
    pub head_name: String,

    pub population: Option<u32>,

    #[serde(default)]
    #[validate(length(min = 1, max = 5000, message = "Description is required"))]
    pub description: String,

    #[validate(custom(function = "validate_http_url"))]
    pub image_url: Option<String>,
}

/// Type-specific validated payload of a content entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContentPayload {
    News(NewsPayload),
    Gallery(GalleryPayload),
    Business(BusinessPayload),
    Demographic(DemographicPayload),
    Budget(BudgetPayload),
    StructureMember(StructureMemberPayload),
    SubArea(SubAreaPayload),
}

fn validation_result<T: Validate>(payload: &T) -> Vec<FieldError> {
    match payload.validate() {
        Ok(()) => Vec::new(),
        Err(e) => collect_field_errors(&e),
    }
}

impl ContentPayload {
    /// Deserializes and validates a payload for `kind`.
    pub fn parse(kind: ContentKind, value: serde_json::Value) -> Result<Self, Vec<FieldError>> {
        let payload = Self::from_stored(kind, value)
            .map_err(|e| vec![FieldError::new("payload", e.to_string())])?;

        let mut errors = match &payload {
            Self::News(p) => validation_result(p),
            Self::Gallery(GalleryPayload::Photo(p)) => validation_result(p),
            Self::Gallery(GalleryPayload::Video(p)) => validation_result(p),
            Self::Business(p) => validation_result(p),
            Self::Demographic(p) => validation_result(p),
            Self::Budget(p) => {
                let mut errors = validation_result(p);
                if errors.is_empty() {
                    errors.extend(p.totals_error());
                }
                errors
            }
            Self::StructureMember(p) => validation_result(p),
            Self::SubArea(p) => validation_result(p),
        };

        if let (Some(field), Some(source)) = (kind.slug_source_field(), payload.slug_source()) {
            if !source.trim().is_empty() && slugify(source).is_empty() {
                errors.push(FieldError::new(field, "Must contain at least one letter or digit"));
            }
        }

        if errors.is_empty() {
            Ok(payload)
        } else {
            Err(errors)
        }
    }

    /// Deserializes a stored payload without re-validating it.
    pub fn from_stored(kind: ContentKind, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ContentKind::News => Self::News(serde_json::from_value(value)?),
            ContentKind::Gallery => Self::Gallery(serde_json::from_value(value)?),
            ContentKind::Business => Self::Business(serde_json::from_value(value)?),
            ContentKind::Demographic => Self::Demographic(serde_json::from_value(value)?),
            ContentKind::Budget => Self::Budget(serde_json::from_value(value)?),
            ContentKind::StructureMember => Self::StructureMember(serde_json::from_value(value)?),
            ContentKind::SubArea => Self::SubArea(serde_json::from_value(value)?),
        })
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            Self::News(_) => ContentKind::News,
            Self::Gallery(_) => ContentKind::Gallery,
            Self::Business(_) => ContentKind::Business,
            Self::Demographic(_) => ContentKind::Demographic,
            Self::Budget(_) => ContentKind::Budget,
            Self::StructureMember(_) => ContentKind::StructureMember,
            Self::SubArea(_) => ContentKind::SubArea,
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// The human title a slug is derived from, for slugged types.
    pub fn slug_source(&self) -> Option<&str> {
        match self {
            Self::News(p) => Some(&p.title),
            Self::Budget(p) => Some(&p.title),
            Self::Business(p) => Some(&p.name),
            Self::SubArea(p) => Some(&p.name),
            _ => None,
        }
    }

    pub fn derive_slug(&self) -> Option<String> {
        self.slug_source().map(slugify)
    }

    /// Whether anonymous visitors may see this entity.
    pub fn is_published(&self) -> bool {
        match self {
            Self::News(p) => p.published,
            _ => true,
        }
    }
}

/// A stored content entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntity {
    pub id: Uuid,
    pub entity_type: ContentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(flatten)]
    pub payload: ContentPayload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated entity ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContentEntity {
    pub kind: ContentKind,
    pub slug: Option<String>,
    pub payload: ContentPayload,
    pub created_at: DateTime<Utc>,
}

impl NewContentEntity {
    pub fn new(payload: ContentPayload, created_at: DateTime<Utc>) -> Self {
        Self {
            kind: payload.kind(),
            slug: payload.derive_slug(),
            payload,
            created_at,
        }
    }

    pub fn into_entity(self, id: Uuid) -> ContentEntity {
        ContentEntity {
            id,
            entity_type: self.kind,
            slug: self.slug,
            payload: self.payload,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Shallow-merges a JSON object patch over a stored payload.
///
/// Keys in `patch` replace keys in `base`; a `null` value removes the key.
pub fn merge_patch(
    base: &serde_json::Value,
    patch: &serde_json::Value,
) -> Result<serde_json::Value, FieldError> {
    let patch = patch
        .as_object()
        .ok_or_else(|| FieldError::new("payload", "Update payload must be a JSON object"))?;
    let mut merged = base.as_object().cloned().unwrap_or_default();
    for (key, value) in patch {
        if value.is_null() {
            merged.remove(key);
        } else {
            merged.insert(key.clone(), value.clone());
        }
    }
    Ok(serde_json::Value::Object(merged))
}
