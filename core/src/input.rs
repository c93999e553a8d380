//! Typed procedure inputs.
//!
//! Every procedure payload is a struct with declarative constraints. Inputs are
//! decoded and validated by [`parse_input`] before any domain logic or
//! ownership check runs; a failure short-circuits with `BadRequest`.
//!
//! String lengths are counted in UTF-16 code units, matching what browser
//! clients report for `String.length`.

use crate::error::ProcedureError;
use crate::model::{BoothBatchUpdate, BoothPatch, EventPatch, NewBooth};
use crate::types::{BoothId, EventId, IdRef};
use garde::Validate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Minimum booth width and height.
pub const MIN_BOOTH_SIZE: f64 = 30.0;

/// Decode and validate a procedure input.
///
/// A missing input is decoded from JSON `null`, so structs with required
/// fields reject it.
///
/// # Errors
///
/// Returns `BadRequest` if the JSON does not match `T` or a constraint fails.
pub fn parse_input<T>(input: Option<Value>) -> Result<T, ProcedureError>
where
    T: DeserializeOwned + Validate<Context = ()>,
{
    let value: T = serde_json::from_value(input.unwrap_or(Value::Null))?;
    value.validate()?;
    Ok(value)
}

/// Optional field that may be omitted but not sent as `null`.
///
/// Paired with `#[serde(default)]`, so an absent field is `None` and an
/// explicit `null` fails to decode.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ═══════════════════════════════════════════════════════════════════════
// Event inputs
// ═══════════════════════════════════════════════════════════════════════

/// `{ id }` for `event.getById` and `event.delete`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventIdInput {
    /// Target event.
    #[garde(skip)]
    pub id: IdRef<EventId>,
}

/// Input for `event.create`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    /// Event name.
    #[garde(length(utf16, min = 1, max = 255))]
    pub name: String,
    /// Optional description.
    #[garde(skip)]
    #[serde(default, deserialize_with = "present")]
    pub description: Option<String>,
}

/// Input for `event.update`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventInput {
    /// Target event.
    #[garde(skip)]
    pub id: IdRef<EventId>,
    /// New name.
    #[garde(length(utf16, min = 1, max = 255))]
    #[serde(default, deserialize_with = "present")]
    pub name: Option<String>,
    /// New description.
    #[garde(skip)]
    #[serde(default, deserialize_with = "present")]
    pub description: Option<String>,
}

impl UpdateEventInput {
    /// Split into the target and the fields to write.
    #[must_use]
    pub fn into_parts(self) -> (IdRef<EventId>, EventPatch) {
        let Self {
            id,
            name,
            description,
        } = self;
        (id, EventPatch { name, description })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Booth inputs
// ═══════════════════════════════════════════════════════════════════════

/// `{ eventId }` for `booth.getByEventId`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BoothsByEventInput {
    /// Parent event.
    #[garde(skip)]
    pub event_id: IdRef<EventId>,
}

/// `{ id }` for `booth.delete`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BoothIdInput {
    /// Target booth.
    #[garde(skip)]
    pub id: IdRef<BoothId>,
}

/// Input for `booth.create`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoothInput {
    /// Parent event.
    #[garde(skip)]
    pub event_id: IdRef<EventId>,
    /// Left edge.
    #[garde(range(min = 0.0))]
    pub x: f64,
    /// Top edge.
    #[garde(range(min = 0.0))]
    pub y: f64,
    /// Width.
    #[garde(range(min = 30.0))]
    pub width: f64,
    /// Height.
    #[garde(range(min = 30.0))]
    pub height: f64,
    /// Label.
    #[garde(length(utf16, min = 1, max = 100))]
    pub name: String,
    /// Fill color.
    #[garde(pattern(r"^#[0-9A-Fa-f]{6}$"))]
    #[serde(default, deserialize_with = "present")]
    pub color: Option<String>,
}

impl CreateBoothInput {
    /// The booth to insert, or `None` if `eventId` cannot name an event.
    #[must_use]
    pub fn into_new_booth(self) -> Option<NewBooth> {
        let Self {
            event_id,
            x,
            y,
            width,
            height,
            name,
            color,
        } = self;
        Some(NewBooth {
            event_id: event_id.resolve()?,
            x,
            y,
            width,
            height,
            name,
            color,
        })
    }
}

/// Input for `booth.update`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoothInput {
    /// Target booth.
    #[garde(skip)]
    pub id: IdRef<BoothId>,
    /// New left edge.
    #[garde(range(min = 0.0))]
    #[serde(default, deserialize_with = "present")]
    pub x: Option<f64>,
    /// New top edge.
    #[garde(range(min = 0.0))]
    #[serde(default, deserialize_with = "present")]
    pub y: Option<f64>,
    /// New width.
    #[garde(range(min = 30.0))]
    #[serde(default, deserialize_with = "present")]
    pub width: Option<f64>,
    /// New height.
    #[garde(range(min = 30.0))]
    #[serde(default, deserialize_with = "present")]
    pub height: Option<f64>,
    /// New label.
    #[garde(length(utf16, min = 1, max = 100))]
    #[serde(default, deserialize_with = "present")]
    pub name: Option<String>,
    /// New fill color.
    #[garde(pattern(r"^#[0-9A-Fa-f]{6}$"))]
    #[serde(default, deserialize_with = "present")]
    pub color: Option<String>,
}

impl UpdateBoothInput {
    /// Split into the target and the fields to write.
    #[must_use]
    pub fn into_parts(self) -> (IdRef<BoothId>, BoothPatch) {
        let Self {
            id,
            x,
            y,
            width,
            height,
            name,
            color,
        } = self;
        (
            id,
            BoothPatch {
                x,
                y,
                width,
                height,
                name,
                color,
            },
        )
    }
}

/// One entry of `booth.updateMany`: a drag moves the booth, so the position is required.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BoothPositionInput {
    /// Target booth.
    #[garde(skip)]
    pub id: IdRef<BoothId>,
    /// New left edge.
    #[garde(range(min = 0.0))]
    pub x: f64,
    /// New top edge.
    #[garde(range(min = 0.0))]
    pub y: f64,
    /// New width.
    #[garde(range(min = 30.0))]
    #[serde(default, deserialize_with = "present")]
    pub width: Option<f64>,
    /// New height.
    #[garde(range(min = 30.0))]
    #[serde(default, deserialize_with = "present")]
    pub height: Option<f64>,
    /// New label.
    #[garde(length(utf16, min = 1, max = 100))]
    #[serde(default, deserialize_with = "present")]
    pub name: Option<String>,
}

impl BoothPositionInput {
    /// The update to apply, or `None` if `id` cannot name a booth.
    #[must_use]
    pub fn into_update(self) -> Option<BoothBatchUpdate> {
        let Self {
            id,
            x,
            y,
            width,
            height,
            name,
        } = self;
        Some(BoothBatchUpdate {
            id: id.resolve()?,
            patch: BoothPatch {
                x: Some(x),
                y: Some(y),
                width,
                height,
                name,
                color: None,
            },
        })
    }
}

/// Input for `booth.updateMany`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateManyBoothsInput {
    /// Event every booth must belong to.
    #[garde(skip)]
    pub event_id: IdRef<EventId>,
    /// Updates, applied in order.
    #[garde(dive)]
    pub booths: Vec<BoothPositionInput>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn booth(overrides: Value) -> Value {
        let mut base = json!({
            "eventId": EventId::new(),
            "x": 0,
            "y": 0,
            "width": 30,
            "height": 30,
            "name": "A1",
        });
        if let (Some(base), Some(overrides)) = (base.as_object_mut(), overrides.as_object()) {
            for (k, v) in overrides {
                base.insert(k.clone(), v.clone());
            }
        }
        base
    }

    #[test]
    fn accepts_minimal_booth() {
        let input: CreateBoothInput = parse_input(Some(booth(json!({})))).unwrap();
        assert_eq!(input.name, "A1");
        assert!(input.color.is_none());
    }

    #[test]
    fn rejects_booth_below_minimum_size() {
        let err = parse_input::<CreateBoothInput>(Some(booth(json!({ "width": 29.9 }))))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.issues()[0].path, "width");
    }

    #[test]
    fn rejects_negative_coordinates() {
        let err = parse_input::<CreateBoothInput>(Some(booth(json!({ "x": -1, "y": -1 }))))
            .unwrap_err();
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn color_is_case_insensitive_hex() {
        for ok in ["#a1B2c3", "#FFFFFF", "#000000"] {
            assert!(parse_input::<CreateBoothInput>(Some(booth(json!({ "color": ok })))).is_ok());
        }
        for bad in ["a1b2c3", "#a1b2c", "#a1b2c3d", "#GGGGGG", "#a1b2c3 "] {
            let err = parse_input::<CreateBoothInput>(Some(booth(json!({ "color": bad }))))
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BadRequest, "{bad}");
        }
    }

    #[test]
    fn booth_name_length_is_bounded() {
        assert!(parse_input::<CreateBoothInput>(Some(booth(json!({ "name": "" })))).is_err());
        let long = "x".repeat(101);
        assert!(parse_input::<CreateBoothInput>(Some(booth(json!({ "name": long })))).is_err());
        let max = "x".repeat(100);
        assert!(parse_input::<CreateBoothInput>(Some(booth(json!({ "name": max })))).is_ok());
    }

    #[test]
    fn event_name_counts_utf16_units() {
        // each emoji is two UTF-16 code units
        let name = "🎪".repeat(128);
        let err = parse_input::<CreateEventInput>(Some(json!({ "name": name }))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);

        let name = "🎪".repeat(127);
        assert!(parse_input::<CreateEventInput>(Some(json!({ "name": name }))).is_ok());
    }

    #[test]
    fn missing_input_is_bad_request() {
        let err = parse_input::<EventIdInput>(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn any_string_is_accepted_as_an_id() {
        let input = parse_input::<EventIdInput>(Some(json!({ "id": "clx0abc" }))).unwrap();
        assert_eq!(input.id.resolve(), None);
        assert_eq!(input.id.as_str(), "clx0abc");

        let err = parse_input::<EventIdInput>(Some(json!({ "id": 7 }))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn booth_for_unknown_event_reference_has_no_insert() {
        let input: CreateBoothInput =
            parse_input(Some(booth(json!({ "eventId": "clx0abc" })))).unwrap();
        assert!(input.into_new_booth().is_none());
    }

    #[test]
    fn explicit_null_is_rejected_for_optional_fields() {
        let err = parse_input::<UpdateEventInput>(Some(json!({ "id": EventId::new(), "name": null })))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);

        let err = parse_input::<CreateEventInput>(Some(json!({ "name": "Fair", "description": null })))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);

        let err = parse_input::<CreateBoothInput>(Some(booth(json!({ "color": null })))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);

        let err = parse_input::<UpdateBoothInput>(Some(json!({ "id": BoothId::new(), "x": null })))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn omitted_optional_fields_are_none() {
        let input: UpdateEventInput = parse_input(Some(json!({ "id": EventId::new() }))).unwrap();
        let (_, patch) = input.into_parts();
        assert!(patch.name.is_none() && patch.description.is_none());
    }

    #[test]
    fn partial_update_keeps_absent_fields_unset() {
        let id = BoothId::new();
        let input: UpdateBoothInput =
            parse_input(Some(json!({ "id": id, "height": 45 }))).unwrap();
        let (target, patch) = input.into_parts();
        assert_eq!(target.resolve(), Some(id));
        assert_eq!(patch.height, Some(45.0));
        assert!(patch.x.is_none() && patch.name.is_none() && patch.color.is_none());
    }

    #[test]
    fn partial_update_still_validates_supplied_fields() {
        let err = parse_input::<UpdateBoothInput>(Some(json!({ "id": BoothId::new(), "width": 10 })))
            .unwrap_err();
        assert_eq!(err.issues()[0].path, "width");
    }

    #[test]
    fn batch_entries_are_validated_individually() {
        let input = json!({
            "eventId": EventId::new(),
            "booths": [
                { "id": BoothId::new(), "x": 10, "y": 10 },
                { "id": BoothId::new(), "x": 10, "y": -5 },
            ],
        });
        let err = parse_input::<UpdateManyBoothsInput>(Some(input)).unwrap_err();
        assert_eq!(err.issues().len(), 1);
        assert!(err.issues()[0].path.contains("booths[1]"));
    }

    #[test]
    fn batch_entry_requires_position() {
        let input = json!({
            "eventId": EventId::new(),
            "booths": [{ "id": BoothId::new(), "width": 40 }],
        });
        assert!(parse_input::<UpdateManyBoothsInput>(Some(input)).is_err());
    }

    #[test]
    fn batch_entry_converts_to_patch_without_color() {
        let entry: BoothPositionInput =
            serde_json::from_value(json!({ "id": BoothId::new(), "x": 1, "y": 2, "height": 31 }))
                .unwrap();
        let update = entry.into_update().unwrap();
        assert_eq!(update.patch.x, Some(1.0));
        assert_eq!(update.patch.height, Some(31.0));
        assert!(update.patch.color.is_none());

        let entry: BoothPositionInput =
            serde_json::from_value(json!({ "id": "clx0abc", "x": 1, "y": 2 })).unwrap();
        assert!(entry.into_update().is_none());
    }
}
