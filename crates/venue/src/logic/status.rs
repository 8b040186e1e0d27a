use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use shared::{
    error::CommonError,
    params::{BoundValue, ToBoundValue, ValueKind},
};

/// Lifecycle status of a venue, stored as a text label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Active,
    Inactive,
    Archived,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Active, Status::Inactive, Status::Archived];

    pub fn as_label(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
            Status::Archived => "archived",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl FromStr for Status {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_label() == s)
            .ok_or_else(|| CommonError::InvalidRequest {
                msg: format!("unknown status label '{s}'"),
                source: None,
            })
    }
}

impl ToBoundValue for Status {
    const KIND: ValueKind = ValueKind::Enum;

    fn to_bound_value(&self) -> BoundValue {
        BoundValue::Enum(self.as_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for status in Status::ALL {
            assert_eq!(status.as_label().parse::<Status>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_label_is_invalid_request() {
        let err = "ACTIVE".parse::<Status>().unwrap_err();
        match err {
            CommonError::InvalidRequest { msg, .. } => {
                assert_eq!(msg, "unknown status label 'ACTIVE'")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_serde_matches_label() {
        for status in Status::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_label()));
        }
    }

    #[test]
    fn test_binds_as_enum_label() {
        assert_eq!(Status::Archived.to_bound_value(), BoundValue::Enum("archived"));
        assert_eq!(Status::KIND, ValueKind::Enum);
    }
}
