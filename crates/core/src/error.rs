//! Error types for the aquarium core.

use thiserror::Error;

/// Errors produced while constructing or driving aquarium subsystems.
///
/// Every variant is a configuration-time failure: once a school or particle
/// system has been built, ticking it cannot fail.
#[derive(Debug, Error)]
pub enum AquariumError {
    /// Roaming bounds had a non-positive or non-finite component.
    #[error("invalid bounds ({x}, {y}, {z}): every half-extent must be positive and finite")]
    InvalidBounds { x: f64, y: f64, z: f64 },

    /// A count was zero where at least one item is required, or did not divide evenly.
    #[error("invalid count for '{name}': {value}")]
    InvalidCount { name: String, value: usize },

    /// A `[min, max)` range was empty, inverted or non-finite.
    #[error("invalid range for '{name}': [{min}, {max})")]
    InvalidRange { name: String, min: f64, max: f64 },

    /// A scalar parameter was outside its allowed domain.
    #[error("invalid value for '{name}': {value}")]
    InvalidValue { name: String, value: f64 },

    /// A configuration document could not be decoded.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A particle system name was not recognized.
    #[error("unknown particle system: {0}")]
    UnknownSystem(String),

    /// A fish species name was not recognized.
    #[error("unknown species: {0}")]
    UnknownSpecies(String),

    /// An instance attribute array did not match `count * components`.
    #[error("attribute '{name}' has {got} floats, expected {expected}")]
    AttributeLength {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Snapshot or file output failed.
    #[error("I/O error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_bounds_includes_components() {
        let err = AquariumError::InvalidBounds {
            x: 60.0,
            y: -1.0,
            z: 10.0,
        };
        let msg = format!("{err}");
        assert!(msg.contains("60"), "missing x in: {msg}");
        assert!(msg.contains("-1"), "missing y in: {msg}");
    }

    #[test]
    fn invalid_count_includes_name_and_value() {
        let err = AquariumError::InvalidCount {
            name: "school_count".into(),
            value: 0,
        };
        let msg = format!("{err}");
        assert!(msg.contains("school_count"), "missing name in: {msg}");
        assert!(msg.contains('0'), "missing value in: {msg}");
    }

    #[test]
    fn invalid_range_includes_endpoints() {
        let err = AquariumError::InvalidRange {
            name: "lerp_speed".into(),
            min: 0.3,
            max: 0.2,
        };
        let msg = format!("{err}");
        assert!(msg.contains("lerp_speed"), "missing name in: {msg}");
        assert!(msg.contains("0.3"), "missing min in: {msg}");
        assert!(msg.contains("0.2"), "missing max in: {msg}");
    }

    #[test]
    fn unknown_system_includes_name() {
        let err = AquariumError::UnknownSystem("jellyfish".into());
        assert!(format!("{err}").contains("jellyfish"));
    }

    #[test]
    fn attribute_length_includes_all_fields() {
        let err = AquariumError::AttributeLength {
            name: "aOffset".into(),
            expected: 60,
            got: 57,
        };
        let msg = format!("{err}");
        assert!(msg.contains("aOffset"), "missing name in: {msg}");
        assert!(msg.contains("60"), "missing expected in: {msg}");
        assert!(msg.contains("57"), "missing got in: {msg}");
    }

    #[test]
    fn aquarium_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AquariumError>();
    }

    #[test]
    fn aquarium_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<AquariumError>();
    }
}
