//! Device identity and hierarchical location.
//!
//! A [`Device`] is the root of the tag namespace: binding one to a client
//! replaces every tag with the `device` and `location` tags derived here.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::point::{check_bounded, check_required};
use crate::tags::Tag;

/// Maximum building identifier length in bytes.
pub const MAX_BUILDING_LEN: usize = 64;

/// Maximum floor, room and zone identifier length in bytes.
pub const MAX_LOCATION_PART_LEN: usize = 32;

/// Maximum device id length in bytes.
pub const MAX_DEVICE_ID_LEN: usize = 64;

/// Maximum device type length in bytes.
pub const MAX_DEVICE_TYPE_LEN: usize = 32;

/// Maximum device description length in bytes.
pub const MAX_DESCRIPTION_LEN: usize = 128;

/// Tag key carrying the device id.
pub const DEVICE_TAG: &str = "device";

/// Tag key carrying the location path.
pub const LOCATION_TAG: &str = "location";

/// Where a device is installed, from coarse to fine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    /// Building identifier. Required.
    pub building: String,
    /// Floor number or identifier.
    pub floor: String,
    /// Room number or identifier.
    pub room: String,
    /// Zone within the room.
    pub zone: String,
}

impl Location {
    /// Creates a location.
    pub fn new(
        building: impl Into<String>,
        floor: impl Into<String>,
        room: impl Into<String>,
        zone: impl Into<String>,
    ) -> Self {
        Self {
            building: building.into(),
            floor: floor.into(),
            room: room.into(),
            zone: zone.into(),
        }
    }

    /// Checks the building is present and every part is within bounds.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_required("building", &self.building, MAX_BUILDING_LEN)?;
        check_bounded("floor", &self.floor, MAX_LOCATION_PART_LEN)?;
        check_bounded("room", &self.room, MAX_LOCATION_PART_LEN)?;
        check_bounded("zone", &self.zone, MAX_LOCATION_PART_LEN)
    }

    /// Returns `true` if [`validate`](Self::validate) passes.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Non-empty parts joined with `/`, e.g. `B1/2/201/A`.
    ///
    /// Empty parts are skipped, so a building-only location yields `B1`.
    pub fn path(&self) -> String {
        [&self.building, &self.floor, &self.room, &self.zone]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// A reporting device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Unique device identifier. Required.
    pub id: String,
    /// Installed location.
    #[serde(default)]
    pub location: Location,
    /// Device type (e.g. `sensor`). Required.
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

impl Device {
    /// Creates a device.
    pub fn new(
        id: impl Into<String>,
        location: Location,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            location,
            kind: kind.into(),
            description: description.into(),
        }
    }

    /// Checks id, type, description and location.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_required("device id", &self.id, MAX_DEVICE_ID_LEN)?;
        check_required("device type", &self.kind, MAX_DEVICE_TYPE_LEN)?;
        check_bounded("description", &self.description, MAX_DESCRIPTION_LEN)?;
        self.location.validate()
    }

    /// Returns `true` if [`validate`](Self::validate) passes.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Identity tags in wire order: `device`, then `location`.
    ///
    /// Each tag is emitted only when its value is non-empty.
    pub fn tags(&self) -> Vec<Tag> {
        let mut tags = Vec::with_capacity(2);
        if !self.id.is_empty() {
            tags.push(Tag::new(DEVICE_TAG, self.id.as_str()));
        }
        let path = self.location.path();
        if !path.is_empty() {
            tags.push(Tag::new(LOCATION_TAG, path));
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> Location {
        Location::new("Building-A", "Floor-1", "Room-101", "Zone-1")
    }

    #[test]
    fn test_location_validation() {
        assert!(location().is_valid());
        assert!(!Location::new("", "1", "101", "A").is_valid());
        assert!(Location::new("B1", "", "", "").is_valid());
        assert!(!Location::new("b".repeat(65), "", "", "").is_valid());
        assert!(Location::new("b".repeat(64), "", "", "").is_valid());
        assert!(!Location::new("B1", "f".repeat(33), "", "").is_valid());
        assert!(!Location::new("B1", "", "r".repeat(33), "").is_valid());
        assert!(!Location::new("B1", "", "", "z".repeat(33)).is_valid());
    }

    #[test]
    fn test_location_path() {
        assert_eq!(location().path(), "Building-A/Floor-1/Room-101/Zone-1");
        assert_eq!(Location::new("B1", "", "101", "").path(), "B1/101");
        assert_eq!(Location::default().path(), "");
    }

    #[test]
    fn test_device_validation() {
        assert!(Device::new("device-001", location(), "sensor", "Test device").is_valid());
        assert!(!Device::new("", location(), "sensor", "").is_valid());
        assert!(!Device::new("d1", location(), "", "").is_valid());
        assert!(!Device::new("d1", Location::default(), "sensor", "").is_valid());
        assert!(!Device::new("d1", location(), "sensor", "x".repeat(129)).is_valid());
        assert!(!Device::new("i".repeat(65), location(), "sensor", "").is_valid());
        assert!(!Device::new("d1", location(), "t".repeat(33), "").is_valid());
    }

    #[test]
    fn test_device_validation_reports_field() {
        let err = Device::new("", location(), "sensor", "").validate().unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "device id" });
    }

    #[test]
    fn test_device_tags() {
        let device = Device::new("d1", Location::new("B1", "2", "", ""), "sensor", "");
        assert_eq!(
            device.tags(),
            vec![Tag::new("device", "d1"), Tag::new("location", "B1/2")]
        );

        let bare = Device::new("d1", Location::default(), "", "");
        assert_eq!(bare.tags(), vec![Tag::new("device", "d1")]);

        assert!(Device::default().tags().is_empty());
    }

    #[test]
    fn test_device_json() {
        let device: Device = serde_json::from_str(
            r#"{"id":"d1","type":"sensor","location":{"building":"B1","room":"101"}}"#,
        )
        .unwrap();
        assert_eq!(device.kind, "sensor");
        assert_eq!(device.location.path(), "B1/101");
        assert!(device.is_valid());
    }
}
