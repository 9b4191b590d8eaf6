#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    #[error("subscribe failed: {0}")]
    Subscribe(String),
    #[error("publish failed: {0}")]
    Publish(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let subscribe_error = RelayError::Subscribe("channel not authorized".to_string());
        assert_eq!(subscribe_error.to_string(), "subscribe failed: channel not authorized");

        let publish_error = RelayError::Publish("downstream quota exceeded".to_string());
        assert_eq!(publish_error.to_string(), "publish failed: downstream quota exceeded");

        let invalid_data_error = RelayError::InvalidData("Bad format".to_string());
        assert_eq!(invalid_data_error.to_string(), "invalid data: Bad format");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{ invalid json }";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let relay_error: RelayError = json_error.into();
        assert!(matches!(relay_error, RelayError::Json(_)));
        assert!(relay_error.to_string().starts_with("Json error:"));
    }

    #[test]
    fn test_result_type() {
        fn returns_result() -> Result<String> {
            Ok("success".to_string())
        }

        let result = returns_result();
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "success");
    }
}
