use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use thiserror::Error;

//
// ─── DEFAULTS ──────────────────────────────────────────────────────────────────
//

pub const DEFAULT_CATEGORY: &str = "Web Development";
pub const DEFAULT_DIFFICULTY: &str = "intermediate";
/// Order assigned to projects whose metadata does not set one.
pub const DEFAULT_ORDER: i64 = 999;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MetadataError {
    #[error("project metadata must be a JSON object")]
    NotAnObject,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

//
// ─── SIDECAR METADATA ──────────────────────────────────────────────────────────
//

/// Optional per-project sidecar file. Every present key overrides the value
/// derived from the folder name. Unknown keys are ignored, and a recognized
/// key holding the wrong type is dropped without affecting the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectMetadata {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub thumbnail: Option<String>,
    pub tags: Option<Vec<String>>,
    pub estimated_hours: Option<f64>,
    pub order: Option<i64>,
    pub version: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub hide_footer: Option<bool>,
    pub hide_header: Option<bool>,
    /// Recognized keys whose values were ignored because of their type.
    pub rejected_keys: Vec<&'static str>,
}

impl ProjectMetadata {
    /// Parses sidecar contents key by key.
    ///
    /// `null` counts as absent. Timestamps must be RFC 3339 strings.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::Json` when the document is not valid JSON, or
    /// `MetadataError::NotAnObject` when it is valid JSON but not an object.
    pub fn from_json(raw: &str) -> Result<Self, MetadataError> {
        let Value::Object(map) = serde_json::from_str::<Value>(raw)? else {
            return Err(MetadataError::NotAnObject);
        };
        let mut keys = SidecarKeys {
            map: &map,
            rejected: Vec::new(),
        };

        Ok(Self {
            id: keys.string("id"),
            name: keys.string("name"),
            description: keys.string("description"),
            category: keys.string("category"),
            difficulty: keys.string("difficulty"),
            thumbnail: keys.string("thumbnail"),
            tags: keys.read("tags", |v| {
                v.as_array()?
                    .iter()
                    .map(|tag| tag.as_str().map(str::to_owned))
                    .collect()
            }),
            estimated_hours: keys.read("estimatedHours", Value::as_f64),
            order: keys.read("order", Value::as_i64),
            version: keys.string("version"),
            created_at: keys.timestamp("createdAt"),
            updated_at: keys.timestamp("updatedAt"),
            hide_footer: keys.read("hideFooter", Value::as_bool),
            hide_header: keys.read("hideHeader", Value::as_bool),
            rejected_keys: keys.rejected,
        })
    }
}

struct SidecarKeys<'a> {
    map: &'a Map<String, Value>,
    rejected: Vec<&'static str>,
}

impl<'a> SidecarKeys<'a> {
    fn read<T>(
        &mut self,
        key: &'static str,
        convert: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Option<T> {
        let value = self.map.get(key).filter(|v| !v.is_null())?;
        let converted = convert(value);
        if converted.is_none() {
            self.rejected.push(key);
        }
        converted
    }

    fn string(&mut self, key: &'static str) -> Option<String> {
        self.read(key, |v| v.as_str().map(str::to_owned))
    }

    fn timestamp(&mut self, key: &'static str) -> Option<DateTime<Utc>> {
        self.read(key, |v| {
            DateTime::parse_from_rfc3339(v.as_str()?)
                .ok()
                .map(|at| at.with_timezone(&Utc))
        })
    }
}

//
// ─── DESCRIPTOR ────────────────────────────────────────────────────────────────
//

/// Facts read from the filesystem that seed a descriptor before metadata
/// overrides are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderFacts {
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub thumbnail: Option<String>,
}

/// A discovered interactive project. Recomputed on every discovery call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    pub id: String,
    pub folder_name: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub difficulty: String,
    pub thumbnail: Option<String>,
    pub tags: Vec<String>,
    pub estimated_hours: Option<f64>,
    pub order: i64,
    #[serde(skip)]
    explicit_order: bool,
    pub version: Option<String>,
    pub hide_footer: bool,
    pub hide_header: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProjectDescriptor {
    /// Builds a descriptor from the folder name and filesystem facts, then
    /// applies any metadata overrides.
    #[must_use]
    pub fn build(folder_name: &str, facts: FolderFacts, metadata: Option<ProjectMetadata>) -> Self {
        let meta = metadata.unwrap_or_default();

        Self {
            id: meta.id.unwrap_or_else(|| slugify(folder_name)),
            folder_name: folder_name.to_string(),
            name: meta.name.unwrap_or_else(|| title_case(folder_name)),
            description: meta.description.unwrap_or_default(),
            category: meta.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            difficulty: meta
                .difficulty
                .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
            thumbnail: meta.thumbnail.or(facts.thumbnail),
            tags: meta.tags.unwrap_or_default(),
            estimated_hours: meta.estimated_hours,
            order: meta.order.unwrap_or(DEFAULT_ORDER),
            explicit_order: meta.order.is_some(),
            version: meta.version,
            hide_footer: meta.hide_footer.unwrap_or(false),
            hide_header: meta.hide_header.unwrap_or(false),
            created_at: meta.created_at.or(facts.created_at),
            updated_at: meta.updated_at.or(facts.updated_at),
        }
    }

    /// The order set by metadata, if any.
    #[must_use]
    pub fn explicit_order(&self) -> Option<i64> {
        self.explicit_order.then_some(self.order)
    }

    /// Case-insensitive match against the id or the folder name.
    #[must_use]
    pub fn matches_id(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.id.to_lowercase() == needle || self.folder_name.to_lowercase() == needle
    }
}

/// Listing order: explicit orders ascending, explicit before implicit,
/// otherwise by name.
#[must_use]
pub fn compare_projects(a: &ProjectDescriptor, b: &ProjectDescriptor) -> Ordering {
    match (a.explicit_order(), b.explicit_order()) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| compare_names(&a.name, &b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_names(&a.name, &b.name),
    }
}

/// Dictionary order: letters compare without regard to case first, and only
/// names differing solely in case put the lowercase form first.
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

//
// ─── NAMING ────────────────────────────────────────────────────────────────────
//

/// Lowercases and collapses every run of non-alphanumeric ASCII into `-`.
#[must_use]
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_dash = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        raw.trim().to_lowercase()
    } else {
        slug
    }
}

/// `my-cool_project` becomes `My Cool Project`.
///
/// Whitespace also separates words. Runs of separators collapse to one space
/// and leading or trailing separators are dropped.
#[must_use]
pub fn title_case(raw: &str) -> String {
    raw.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
