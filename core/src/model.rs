//! Records, projections and write-side commands.
//!
//! Read types serialize to the camelCase wire shapes clients consume.
//! Write types (`New*`, `*Patch`) are what routers hand to the
//! [`FloorPlanStore`](crate::store::FloorPlanStore) after validation.

use crate::types::{BoothId, EventId, Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// Records
// ═══════════════════════════════════════════════════════════════════════

/// A user account as seen by this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Role, assigned elsewhere.
    pub role: Role,
}

/// An event that owns a floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event ID.
    pub id: EventId,
    /// Event name (1–255 characters).
    pub name: String,
    /// Optional free text.
    pub description: Option<String>,
    /// Owning organizer. Never changes after creation.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A rectangular booth placed on an event's floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booth {
    /// Booth ID.
    pub id: BoothId,
    /// Parent event. Never changes after creation.
    pub event_id: EventId,
    /// Left edge, `>= 0`.
    pub x: f64,
    /// Top edge, `>= 0`.
    pub y: f64,
    /// Width, `>= 30`.
    pub width: f64,
    /// Height, `>= 30`.
    pub height: f64,
    /// Booth label (1–100 characters).
    pub name: String,
    /// Optional `#RRGGBB` fill color.
    pub color: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════════════════
// Projections
// ═══════════════════════════════════════════════════════════════════════

/// Public projection of an event's creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    /// Creator's user ID.
    pub id: UserId,
    /// Creator's display name.
    pub username: String,
}

/// Child row counts attached to an event listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounts {
    /// Number of booths on the event's floor plan.
    pub booths: u64,
}

/// Event listing entry returned by `event.getAll` and `event.getMy`.
///
/// `creator` is only populated for the public listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Event fields.
    #[serde(flatten)]
    pub event: Event,
    /// Creator projection.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub creator: Option<Creator>,
    /// Child counts.
    #[serde(rename = "_count")]
    pub count: EventCounts,
}

/// Event with its creator projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventWithCreator {
    /// Event fields.
    #[serde(flatten)]
    pub event: Event,
    /// Creator projection.
    pub creator: Creator,
}

/// Full event view returned by `event.getById`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetail {
    /// Event fields.
    #[serde(flatten)]
    pub event: Event,
    /// Creator projection.
    pub creator: Creator,
    /// All booths, oldest first.
    pub booths: Vec<Booth>,
}

// ═══════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════

/// Insert command for an event. The owner comes from the session, never the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Event name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Owner (the calling organizer).
    pub created_by: UserId,
}

/// Partial event update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
}

/// Insert command for a booth.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooth {
    /// Parent event.
    pub event_id: EventId,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Label.
    pub name: String,
    /// Fill color.
    pub color: Option<String>,
}

/// Partial booth update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoothPatch {
    /// New left edge.
    pub x: Option<f64>,
    /// New top edge.
    pub y: Option<f64>,
    /// New width.
    pub width: Option<f64>,
    /// New height.
    pub height: Option<f64>,
    /// New label.
    pub name: Option<String>,
    /// New fill color.
    pub color: Option<String>,
}

impl BoothPatch {
    /// Apply the supplied fields to `booth`.
    pub fn apply_to(&self, booth: &mut Booth) {
        if let Some(x) = self.x {
            booth.x = x;
        }
        if let Some(y) = self.y {
            booth.y = y;
        }
        if let Some(width) = self.width {
            booth.width = width;
        }
        if let Some(height) = self.height {
            booth.height = height;
        }
        if let Some(name) = &self.name {
            booth.name.clone_from(name);
        }
        if let Some(color) = &self.color {
            booth.color = Some(color.clone());
        }
    }
}

/// One entry of an atomic batch booth update.
#[derive(Debug, Clone, PartialEq)]
pub struct BoothBatchUpdate {
    /// Booth to update.
    pub id: BoothId,
    /// Fields to write.
    pub patch: BoothPatch,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event() -> Event {
        Event {
            id: EventId::new(),
            name: "Spring Fair".to_string(),
            description: None,
            created_by: UserId::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn summary_flattens_event_and_renames_count() {
        let event = event();
        let summary = EventSummary {
            event: event.clone(),
            creator: Some(Creator {
                id: event.created_by,
                username: "alice".to_string(),
            }),
            count: EventCounts { booths: 3 },
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["name"], json!("Spring Fair"));
        assert_eq!(value["createdBy"], json!(event.created_by.to_string()));
        assert_eq!(value["creator"]["username"], json!("alice"));
        assert_eq!(value["_count"]["booths"], json!(3));
    }

    #[test]
    fn summary_without_creator_omits_the_field() {
        let summary = EventSummary {
            event: event(),
            creator: None,
            count: EventCounts { booths: 0 },
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert!(value.get("creator").is_none());
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let mut booth = Booth {
            id: BoothId::new(),
            event_id: EventId::new(),
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
            name: "A1".to_string(),
            color: Some("#FF0000".to_string()),
            created_at: Utc::now(),
        };

        BoothPatch {
            x: Some(55.5),
            name: Some("B2".to_string()),
            ..BoothPatch::default()
        }
        .apply_to(&mut booth);

        assert!((booth.x - 55.5).abs() < f64::EPSILON);
        assert!((booth.y - 20.0).abs() < f64::EPSILON);
        assert_eq!(booth.name, "B2");
        assert_eq!(booth.color.as_deref(), Some("#FF0000"));
    }
}
