use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize)]
pub enum CommonError {
    #[error("could not find resource")]
    NotFound {
        msg: String,
        lookup_id: String,
        #[serde(skip)]
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("unknown error")]
    Unknown(
        #[serde(skip)]
        #[from]
        anyhow::Error,
    ),
    #[error("invalid request")]
    InvalidRequest {
        msg: String,
        #[serde(skip)]
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("serde json error")]
    SerdeSerializationError {
        #[serde(skip)]
        #[from]
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_message_without_source() {
        let error = CommonError::InvalidRequest {
            msg: "unknown status label 'open'".to_string(),
            source: Some(anyhow::anyhow!("lookup failed")),
        };
        let body = serde_json::to_value(&error).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "InvalidRequest": { "msg": "unknown status label 'open'" } })
        );
        assert_eq!(error.to_string(), "invalid request");
    }

    #[test]
    fn test_anyhow_converts_to_unknown() {
        let error: CommonError = anyhow::anyhow!("boom").into();
        assert!(matches!(error, CommonError::Unknown(_)));
        assert_eq!(error.to_string(), "unknown error");
    }
}
