//! Error types for rust_motion_planning

use thiserror::Error;

/// Main error type for the planning engine
#[derive(Debug, Error)]
pub enum RoboticsError {
    /// Invalid construction parameter (bounds, dimensions, rates, angles)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A waypoint was requested before any path exists
    #[error("No path available yet")]
    EmptyPath,

    /// I/O error while loading or saving a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Map JSON could not be encoded or decoded
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Parameter file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParseError(#[from] toml::de::Error),
}

/// Result type alias for planning operations
pub type RoboticsResult<T> = Result<T, RoboticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RoboticsError::InvalidParameter("step_length must be positive".to_string());
        assert_eq!(format!("{}", err), "Invalid parameter: step_length must be positive");
        assert_eq!(format!("{}", RoboticsError::EmptyPath), "No path available yet");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RoboticsError = io_err.into();
        assert!(matches!(err, RoboticsError::IoError(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: RoboticsError = json_err.into();
        assert!(matches!(err, RoboticsError::SerializationError(_)));
    }
}
