//! Sensor: the identity record owned by the identity store.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::SensorId;

/// Upper bound on sensor name length, in characters.
pub const MAX_NAME_LEN: usize = 128;

/// A registered sensor: store-assigned id plus unique human name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: SensorId,
    pub name: String,
}

impl Sensor {
    #[must_use]
    pub fn new(id: SensorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Check that `name` can be registered.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyName`] when the name is blank,
/// [`ValidationError::UntrimmedName`] when it has leading or trailing
/// whitespace and [`ValidationError::NameTooLong`] past [`MAX_NAME_LEN`]
/// characters.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    // " s1" and "s1" would otherwise be two sensors that look alike.
    if trimmed.len() != name.len() {
        return Err(ValidationError::UntrimmedName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong { max: MAX_NAME_LEN });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_regular_name() {
        assert!(validate_name("greenhouse-01").is_ok());
    }

    #[test]
    fn should_reject_blank_name() {
        assert_eq!(validate_name(""), Err(ValidationError::EmptyName));
        assert_eq!(validate_name("   "), Err(ValidationError::EmptyName));
    }

    #[test]
    fn should_reject_name_with_surrounding_whitespace() {
        assert_eq!(validate_name(" s1"), Err(ValidationError::UntrimmedName));
        assert_eq!(validate_name("s1\t"), Err(ValidationError::UntrimmedName));
        assert!(validate_name("s 1").is_ok());
    }

    #[test]
    fn should_reject_overlong_name() {
        let name = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            validate_name(&name),
            Err(ValidationError::NameTooLong { max: MAX_NAME_LEN })
        );
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let sensor = Sensor::new(SensorId::new(5), "s1");
        let json = serde_json::to_value(&sensor).unwrap();
        assert_eq!(json, serde_json::json!({"id": 5, "name": "s1"}));
    }
}
