//! Itinerary PDF version resolution.
//!
//! An itinerary can carry an originally generated PDF (`pdf_url`) and a
//! manually edited, regenerated PDF (`edited_pdf_url`). The functions here
//! decide which document is current, how to label it, how to list the
//! known versions, and which itinerary of an enquiry should be preselected
//! for a send action.
//!
//! Everything in this module is pure and total: missing or malformed
//! fields degrade to "absent" and nothing here returns an error.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Display label for an itinerary whose PDF was edited and regenerated.
pub const LABEL_REGENERATED: &str = "REGENERATED (EDITED)";

/// Display label for an itinerary that only has its original PDF.
pub const LABEL_ORIGINAL: &str = "GENERATED (ORIGINAL)";

/// Display label for an itinerary with no PDF at all.
pub const LABEL_NOT_GENERATED: &str = "NOT GENERATED";

/// Message shown when no itinerary of an enquiry has a PDF to send.
pub const NO_ITINERARY_AVAILABLE: &str = "No itinerary available to send";

// ---------------------------------------------------------------------------
// Input record
// ---------------------------------------------------------------------------

/// The PDF-related fields of an itinerary, as loaded from storage or
/// received from a client.
///
/// Every field defaults to absent when deserializing, so partial JSON
/// objects never fail to parse. `pdf_versions` is kept as raw JSON and
/// interpreted leniently by [`build_version_list`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItineraryRecord {
    pub id: DbId,
    pub pdf_url: Option<String>,
    pub edited_pdf_url: Option<String>,
    pub edited_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
    pub last_pdf_regenerated_at: Option<Timestamp>,
    pub created_at: Option<Timestamp>,
    pub date_generated: Option<Timestamp>,
    pub active_status: bool,
    pub pdf_versions: Option<serde_json::Value>,
}

impl ItineraryRecord {
    /// The original PDF URL, ignoring blank strings.
    pub fn original_pdf(&self) -> Option<&str> {
        non_blank(self.pdf_url.as_deref())
    }

    /// The edited/regenerated PDF URL, ignoring blank strings.
    pub fn edited_pdf(&self) -> Option<&str> {
        non_blank(self.edited_pdf_url.as_deref())
    }

    /// Whether a regenerated version exists.
    pub fn has_edited_pdf(&self) -> bool {
        self.edited_pdf().is_some()
    }

    /// Whether only the original PDF exists.
    pub fn has_original_only(&self) -> bool {
        self.original_pdf().is_some() && !self.has_edited_pdf()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Which PDF state an itinerary is in, serialized as its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayVersion {
    #[serde(rename = "REGENERATED (EDITED)")]
    RegeneratedEdited,
    #[serde(rename = "GENERATED (ORIGINAL)")]
    GeneratedOriginal,
    #[serde(rename = "NOT GENERATED")]
    NotGenerated,
}

impl DisplayVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegeneratedEdited => LABEL_REGENERATED,
            Self::GeneratedOriginal => LABEL_ORIGINAL,
            Self::NotGenerated => LABEL_NOT_GENERATED,
        }
    }
}

impl fmt::Display for DisplayVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfClassification {
    pub is_edited: bool,
    pub display_version: DisplayVersion,
    pub active_pdf_url: Option<String>,
}

/// Classify an itinerary's PDF state.
///
/// The edited PDF always wins over the original when both exist.
pub fn classify(record: &ItineraryRecord) -> PdfClassification {
    let edited = record.edited_pdf();
    let original = record.original_pdf();

    let display_version = match (edited, original) {
        (Some(_), _) => DisplayVersion::RegeneratedEdited,
        (None, Some(_)) => DisplayVersion::GeneratedOriginal,
        (None, None) => DisplayVersion::NotGenerated,
    };

    PdfClassification {
        is_edited: edited.is_some(),
        display_version,
        active_pdf_url: edited.or(original).map(str::to_string),
    }
}

// ---------------------------------------------------------------------------
// Version list
// ---------------------------------------------------------------------------

/// Whether a version entry is the original or the regenerated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfVersionKind {
    Edited,
    Original,
}

/// One physical PDF document of an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfVersionEntry {
    #[serde(rename = "type")]
    pub kind: PdfVersionKind,
    pub url: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub is_active: bool,
}

/// List the PDF versions of an itinerary, newest first.
///
/// Stored `pdf_versions` are used when they form a JSON array with at least
/// one entry carrying a URL; anything else falls back to entries synthesized
/// from `edited_pdf_url` and `pdf_url`. The result never lists the same URL
/// twice and never has more than one active entry.
pub fn build_version_list(record: &ItineraryRecord) -> Vec<PdfVersionEntry> {
    let stored = record
        .pdf_versions
        .as_ref()
        .map(|value| parse_stored_versions(record, value))
        .unwrap_or_default();

    if stored.is_empty() {
        return synthesize_versions(record);
    }

    let mut entries = stored;
    // `sort_by` is stable; entries without a timestamp sort last.
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    normalize_versions(entries)
}

/// Parse stored version entries, skipping elements that do not describe a
/// document. Non-array values yield an empty list.
fn parse_stored_versions(
    record: &ItineraryRecord,
    value: &serde_json::Value,
) -> Vec<PdfVersionEntry> {
    let Some(items) = value.as_array() else {
        tracing::debug!(itinerary_id = record.id, "Ignoring non-array pdf_versions value");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| parse_stored_entry(record, item))
        .collect()
}

/// Read one stored entry field by field.
///
/// Only a non-blank `url` is required. A bad `createdAt` becomes `None`, a
/// non-boolean `isActive` becomes `false`, and an unknown or missing `type`
/// is inferred from the record's URLs.
fn parse_stored_entry(
    record: &ItineraryRecord,
    item: &serde_json::Value,
) -> Option<PdfVersionEntry> {
    let fields = item.as_object()?;
    let url = fields
        .get("url")
        .and_then(serde_json::Value::as_str)
        .filter(|url| !url.trim().is_empty())?;

    let kind = match fields.get("type").and_then(serde_json::Value::as_str) {
        Some(kind) if kind.eq_ignore_ascii_case("edited") => PdfVersionKind::Edited,
        Some(kind) if kind.eq_ignore_ascii_case("original") => PdfVersionKind::Original,
        _ if record.edited_pdf() == Some(url) => PdfVersionKind::Edited,
        Some(kind) if kind.eq_ignore_ascii_case("regenerated") => PdfVersionKind::Edited,
        _ => PdfVersionKind::Original,
    };

    Some(PdfVersionEntry {
        kind,
        url: url.to_string(),
        created_at: fields
            .get("createdAt")
            .and_then(serde_json::Value::as_str)
            .and_then(parse_stored_timestamp),
        is_active: fields
            .get("isActive")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false),
    })
}

/// RFC 3339, or a bare `YYYY-MM-DD` date taken as midnight UTC.
fn parse_stored_timestamp(raw: &str) -> Option<Timestamp> {
    if let Ok(at) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&chrono::Utc));
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Rewrite stored `pdf_versions` so `entry` is listed first and is the only
/// active document. Any stored entry with the same URL is replaced.
///
/// Returns `None` when nothing usable is stored, leaving the list to be
/// synthesized from the record's URL fields.
pub fn with_active_version(
    stored: Option<&serde_json::Value>,
    entry: &PdfVersionEntry,
) -> Option<serde_json::Value> {
    let mut items = retire_version(stored, Some(&entry.url))?;
    let serde_json::Value::Array(list) = &mut items else {
        return None;
    };
    let mut active = entry.clone();
    active.is_active = true;
    list.insert(0, serde_json::to_value(active).ok()?);
    Some(items)
}

/// Clear every active flag in stored `pdf_versions`, dropping the entry for
/// `url` if given. Returns `None` for anything that is not an array.
pub fn retire_version(
    stored: Option<&serde_json::Value>,
    url: Option<&str>,
) -> Option<serde_json::Value> {
    let items = stored?.as_array()?;
    let kept = items
        .iter()
        .filter(|item| url.is_none() || item.get("url").and_then(serde_json::Value::as_str) != url)
        .cloned()
        .map(|mut item| {
            if let Some(fields) = item.as_object_mut() {
                fields.insert("isActive".to_string(), serde_json::Value::Bool(false));
            }
            item
        })
        .collect();
    Some(serde_json::Value::Array(kept))
}

/// Drop duplicate URLs and keep only the first active flag.
fn normalize_versions(entries: Vec<PdfVersionEntry>) -> Vec<PdfVersionEntry> {
    let mut seen = HashSet::new();
    let mut active_taken = false;

    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.url.clone()))
        .map(|mut entry| {
            if entry.is_active {
                if active_taken {
                    entry.is_active = false;
                }
                active_taken = true;
            }
            entry
        })
        .collect()
}

fn synthesize_versions(record: &ItineraryRecord) -> Vec<PdfVersionEntry> {
    let mut entries = Vec::with_capacity(2);
    let edited = record.edited_pdf();

    if let Some(url) = edited {
        entries.push(PdfVersionEntry {
            kind: PdfVersionKind::Edited,
            url: url.to_string(),
            created_at: record
                .edited_at
                .or(record.updated_at)
                .or(record.created_at),
            is_active: true,
        });
    }

    if let Some(url) = record.original_pdf() {
        // Same document stored under both fields counts once.
        if edited != Some(url) {
            entries.push(PdfVersionEntry {
                kind: PdfVersionKind::Original,
                url: url.to_string(),
                created_at: record.date_generated.or(record.created_at),
                is_active: edited.is_none(),
            });
        }
    }

    entries
}

// ---------------------------------------------------------------------------
// Ranking and selection
// ---------------------------------------------------------------------------

/// The timestamp of an itinerary's most recent activity.
pub fn last_activity(record: &ItineraryRecord) -> Option<Timestamp> {
    record
        .edited_at
        .or(record.last_pdf_regenerated_at)
        .or(record.created_at)
}

/// Sort itineraries by most recent activity, newest first.
///
/// The sort is stable. Records without any timestamp go last.
pub fn rank_itineraries(records: &mut [ItineraryRecord]) {
    records.sort_by(|a, b| last_activity(b).cmp(&last_activity(a)));
}

/// Which selection rule picked the default itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    ActiveEdited,
    ActiveOriginal,
    LatestEdited,
    LatestOriginal,
}

/// The itinerary preselected for a send action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DefaultSelection {
    /// Position within the list passed to [`pick_default_selection`].
    pub index: usize,
    pub itinerary_id: DbId,
    pub reason: SelectionReason,
}

fn is_active_edited(record: &ItineraryRecord) -> bool {
    record.active_status && record.has_edited_pdf()
}

fn is_active_original(record: &ItineraryRecord) -> bool {
    record.active_status && record.has_original_only()
}

/// Priority order: active + edited, active + original, any edited, any
/// original.
const SELECTION_RULES: [(SelectionReason, fn(&ItineraryRecord) -> bool); 4] = [
    (SelectionReason::ActiveEdited, is_active_edited),
    (SelectionReason::ActiveOriginal, is_active_original),
    (SelectionReason::LatestEdited, ItineraryRecord::has_edited_pdf),
    (SelectionReason::LatestOriginal, ItineraryRecord::has_original_only),
];

/// Pick the itinerary to preselect for sending.
///
/// `records` should already be ranked with [`rank_itineraries`]; within
/// each rule the first matching record wins. Several records flagged
/// active are tolerated. Returns `None` when no record has any PDF.
pub fn pick_default_selection(records: &[ItineraryRecord]) -> Option<DefaultSelection> {
    SELECTION_RULES.iter().find_map(|(reason, matches)| {
        records
            .iter()
            .position(|r| matches(r))
            .map(|index| DefaultSelection {
                index,
                itinerary_id: records[index].id,
                reason: *reason,
            })
    })
}

// ---------------------------------------------------------------------------
// View models
// ---------------------------------------------------------------------------

/// Fully resolved PDF state of one itinerary, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedItinerary {
    pub id: DbId,
    pub active_status: bool,
    pub is_edited: bool,
    pub display_version: DisplayVersion,
    pub active_pdf_url: Option<String>,
    pub last_activity_at: Option<Timestamp>,
    pub pdf_versions: Vec<PdfVersionEntry>,
}

/// All itineraries of an enquiry, ranked, with the default selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItineraryOverview {
    pub itineraries: Vec<ResolvedItinerary>,
    pub default_selection: Option<DefaultSelection>,
    /// Set when there is nothing to send.
    pub message: Option<String>,
}

/// Resolve a single itinerary into its view model.
pub fn resolve(record: &ItineraryRecord) -> ResolvedItinerary {
    let classification = classify(record);
    ResolvedItinerary {
        id: record.id,
        active_status: record.active_status,
        is_edited: classification.is_edited,
        display_version: classification.display_version,
        active_pdf_url: classification.active_pdf_url,
        last_activity_at: last_activity(record),
        pdf_versions: build_version_list(record),
    }
}

/// Rank, resolve and select across all itineraries of an enquiry.
pub fn resolve_overview(mut records: Vec<ItineraryRecord>) -> ItineraryOverview {
    rank_itineraries(&mut records);
    let default_selection = pick_default_selection(&records);

    ItineraryOverview {
        itineraries: records.iter().map(resolve).collect(),
        default_selection,
        message: default_selection
            .is_none()
            .then(|| NO_ITINERARY_AVAILABLE.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
