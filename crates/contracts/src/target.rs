//! Admission shapes accepted on the enqueue channel
//!
//! A producer either sends a fully built [`Pose`] or a loose coordinate
//! mapping ([`RawTarget`]). Both are folded into [`AdmittedItem`] before they
//! reach the dispatcher.

use std::fmt;

use serde_json::{Map, Value};

use crate::{ContractError, Point, Pose, Quaternion};

/// Coordinate mapping with at least numeric `x` and `y`
///
/// Kept as the raw JSON object until admission so that missing or
/// non-numeric keys can be reported against the original input.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTarget {
    fields: Map<String, Value>,
}

impl RawTarget {
    /// Wrap a JSON object
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build a raw target from plain coordinates
    pub fn from_coords(x: f64, y: f64) -> Self {
        let mut fields = Map::new();
        fields.insert("x".to_string(), Value::from(x));
        fields.insert("y".to_string(), Value::from(y));
        Self { fields }
    }

    /// Convert to a pose.
    ///
    /// `x` and `y` are used both as the planar position and as the roll and
    /// pitch angles of the orientation; `heading` (default 0.0) is the yaw.
    ///
    /// # Errors
    /// [`ContractError::MalformedInput`] if `x` or `y` is absent or not a
    /// number, or if `heading` is present but not a number.
    pub fn to_pose(&self) -> Result<Pose, ContractError> {
        let x = self.required("x")?;
        let y = self.required("y")?;
        let heading = self.optional("heading")?.unwrap_or(0.0);

        Ok(Pose::new(
            Point::planar(x, y),
            Quaternion::from_euler(x, y, heading),
        ))
    }

    fn required(&self, key: &str) -> Result<f64, ContractError> {
        self.optional(key)?
            .ok_or_else(|| ContractError::malformed_input(key, "missing coordinate"))
    }

    fn optional(&self, key: &str) -> Result<Option<f64>, ContractError> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value.as_f64().map(Some).ok_or_else(|| {
                ContractError::malformed_input(key, format!("expected a number, got {value}"))
            }),
        }
    }
}

impl fmt::Display for RawTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // serde_json renders a Map as a compact JSON object
        write!(f, "{}", Value::Object(self.fields.clone()))
    }
}

/// Item accepted on the enqueue channel
#[derive(Debug, Clone, PartialEq)]
pub enum AdmittedItem {
    /// Fully built pose, accepted without numeric validation
    Pose(Pose),
    /// Coordinate mapping, converted on admission
    Raw(RawTarget),
}

impl AdmittedItem {
    /// Classify a transport value.
    ///
    /// Objects carrying both `position` and `orientation` that deserialize as
    /// a [`Pose`] are poses; every other object is a [`RawTarget`]. Arrays,
    /// scalars and null are not admissible and yield `None`.
    pub fn classify(value: Value) -> Option<Self> {
        let Value::Object(fields) = value else {
            return None;
        };

        if fields.contains_key("position") && fields.contains_key("orientation") {
            if let Ok(pose) = serde_json::from_value::<Pose>(Value::Object(fields.clone())) {
                return Some(Self::Pose(pose));
            }
        }

        Some(Self::Raw(RawTarget::new(fields)))
    }

    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pose(_) => "pose",
            Self::Raw(_) => "raw",
        }
    }
}

impl fmt::Display for AdmittedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pose(pose) => fmt::Display::fmt(pose, f),
            Self::Raw(raw) => fmt::Display::fmt(raw, f),
        }
    }
}

impl From<Pose> for AdmittedItem {
    fn from(pose: Pose) -> Self {
        Self::Pose(pose)
    }
}

impl From<RawTarget> for AdmittedItem {
    fn from(raw: RawTarget) -> Self {
        Self::Raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawTarget {
        match AdmittedItem::classify(value) {
            Some(AdmittedItem::Raw(raw)) => raw,
            other => panic!("expected raw target, got {other:?}"),
        }
    }

    #[test]
    fn test_raw_target_to_pose() {
        let pose = raw(json!({ "x": 1.0, "y": 2.0 })).to_pose().unwrap();
        assert_eq!(pose.position, Point::planar(1.0, 2.0));
        assert!((pose.orientation.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_coordinates_double_as_euler_angles() {
        // Current behaviour: x/y feed roll/pitch of the orientation as well.
        let pose = raw(json!({ "x": 1.0, "y": 2.0 })).to_pose().unwrap();
        assert_eq!(pose.orientation, Quaternion::from_euler(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_heading_is_yaw() {
        let pose = raw(json!({ "x": 0, "y": 0, "heading": 1.25 }))
            .to_pose()
            .unwrap();
        assert_eq!(pose.orientation, Quaternion::from_heading(1.25));
    }

    #[test]
    fn test_integer_coordinates_accepted() {
        let pose = raw(json!({ "x": 3, "y": -4 })).to_pose().unwrap();
        assert_eq!(pose.position, Point::planar(3.0, -4.0));
    }

    #[test]
    fn test_missing_x_is_malformed() {
        let err = raw(json!({ "y": 3 })).to_pose().unwrap_err();
        assert!(matches!(
            err,
            ContractError::MalformedInput { ref field, .. } if field == "x"
        ));
    }

    #[test]
    fn test_non_numeric_coordinate_is_malformed() {
        let err = raw(json!({ "x": 1.0, "y": "north" })).to_pose().unwrap_err();
        assert!(err.to_string().contains("'y'"));

        let err = raw(json!({ "x": 1.0, "y": 2.0, "heading": [1] }))
            .to_pose()
            .unwrap_err();
        assert!(err.to_string().contains("heading"));
    }

    #[test]
    fn test_classify_structured_pose() {
        let value = json!({
            "position": { "x": 1.0, "y": 2.0, "z": 0.0 },
            "orientation": { "x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0 }
        });
        let item = AdmittedItem::classify(value).unwrap();
        assert_eq!(item.kind(), "pose");
    }

    #[test]
    fn test_classify_broken_pose_falls_back_to_raw() {
        let value = json!({ "position": "here", "orientation": null });
        let item = AdmittedItem::classify(value).unwrap();
        assert_eq!(item.kind(), "raw");
    }

    #[test]
    fn test_classify_rejects_non_objects() {
        assert!(AdmittedItem::classify(json!([1, 2])).is_none());
        assert!(AdmittedItem::classify(json!("x=1,y=2")).is_none());
        assert!(AdmittedItem::classify(json!(null)).is_none());
    }

    #[test]
    fn test_raw_target_display_is_json() {
        let target = RawTarget::from_coords(1.0, 2.0);
        assert_eq!(target.to_string(), r#"{"x":1.0,"y":2.0}"#);
    }
}
