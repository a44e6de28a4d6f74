//! Versioned JSON snapshot codec.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Current snapshot layout version.
pub const SNAPSHOT_VERSION: u32 = 1;
/// Version assigned to bare JSON arrays written before versioning existed.
pub const LEGACY_SNAPSHOT_VERSION: u32 = 0;

/// Snapshot encode/decode failure.
#[derive(Debug)]
pub enum SnapshotError {
    /// Not valid JSON, or items do not match the expected shape.
    Malformed(serde_json::Error),
    /// Valid JSON that is neither an array nor a versioned envelope.
    UnexpectedShape(&'static str),
    /// Written by a newer build.
    UnsupportedVersion { found: u64, latest_supported: u32 },
    Encode(serde_json::Error),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed snapshot: {err}"),
            Self::UnexpectedShape(details) => write!(f, "unexpected snapshot shape: {details}"),
            Self::UnsupportedVersion {
                found,
                latest_supported,
            } => write!(
                f,
                "snapshot version {found} is newer than supported {latest_supported}"
            ),
            Self::Encode(err) => write!(f, "snapshot encode failed: {err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) | Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl SnapshotError {
    /// Returns whether the stored value should be discarded on load.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Malformed(_) | Self::UnexpectedShape(_))
    }
}

/// Element type of a persisted collection.
pub trait SnapshotItem: DeserializeOwned {
    /// Repairs an item read from the unversioned layout, which stored
    /// user input as typed.
    fn migrate_legacy(&mut self) {}
}

/// Decoded collection plus the layout version it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    pub items: Vec<T>,
    pub source_version: u32,
}

impl<T> Decoded<T> {
    pub fn was_migrated(&self) -> bool {
        self.source_version < SNAPSHOT_VERSION
    }
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    version: u32,
    items: &'a [T],
}

/// Encodes `items` in the current versioned layout.
pub fn encode_snapshot<T: Serialize>(items: &[T]) -> Result<String, SnapshotError> {
    serde_json::to_string(&Envelope {
        version: SNAPSHOT_VERSION,
        items,
    })
    .map_err(SnapshotError::Encode)
}

/// Decodes either layout.
///
/// Version is checked before items so a newer build's items are never
/// interpreted with an older shape.
pub fn decode_snapshot<T: SnapshotItem>(raw: &str) -> Result<Decoded<T>, SnapshotError> {
    let value: Value = serde_json::from_str(raw).map_err(SnapshotError::Malformed)?;
    match value {
        Value::Array(items) => {
            let mut items: Vec<T> =
                serde_json::from_value(Value::Array(items)).map_err(SnapshotError::Malformed)?;
            items.iter_mut().for_each(T::migrate_legacy);
            Ok(Decoded {
                items,
                source_version: LEGACY_SNAPSHOT_VERSION,
            })
        }
        Value::Object(mut envelope) => {
            let version = envelope
                .get("version")
                .and_then(Value::as_u64)
                .ok_or(SnapshotError::UnexpectedShape("missing numeric `version`"))?;
            if version > u64::from(SNAPSHOT_VERSION) {
                return Err(SnapshotError::UnsupportedVersion {
                    found: version,
                    latest_supported: SNAPSHOT_VERSION,
                });
            }
            let items = envelope
                .remove("items")
                .ok_or(SnapshotError::UnexpectedShape("missing `items`"))?;
            Ok(Decoded {
                items: serde_json::from_value(items).map_err(SnapshotError::Malformed)?,
                source_version: version as u32,
            })
        }
        _ => Err(SnapshotError::UnexpectedShape(
            "expected array or versioned object",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_snapshot, encode_snapshot, SnapshotError, SNAPSHOT_VERSION};
    use crate::model::employee::Employee;

    #[test]
    fn legacy_array_is_migrated() {
        let raw = r#"[{"id":"emp-1","name":" Ana","employeeId":"E1 "}]"#;
        let decoded = decode_snapshot::<Employee>(raw).unwrap();
        assert!(decoded.was_migrated());
        assert_eq!(decoded.items[0].employee_id, "E1");
        assert_eq!(decoded.items[0].name, "Ana");
    }

    #[test]
    fn encoded_snapshot_carries_current_version() {
        let encoded = encode_snapshot::<Employee>(&[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["version"], SNAPSHOT_VERSION);
        assert!(value["items"].as_array().unwrap().is_empty());
    }

    #[test]
    fn newer_version_is_not_corrupt() {
        let err = decode_snapshot::<Employee>(r#"{"version":9,"items":[{"x":1}]}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::UnsupportedVersion { found: 9, .. }));
        assert!(!err.is_corrupt());
    }

    #[test]
    fn garbage_and_wrong_shapes_are_corrupt() {
        for raw in ["{not json", "42", r#"{"items":[]}"#, r#"[{"id":1}]"#] {
            let err = decode_snapshot::<Employee>(raw).unwrap_err();
            assert!(err.is_corrupt(), "{raw} should be corrupt, got {err}");
        }
    }
}
