use thiserror::Error;

/// Failure reported by an upstream data collaborator.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("{what} lookup failed: {reason}")]
    Unavailable { what: String, reason: String },
}

impl SourceError {
    pub fn unavailable(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            what: what.into(),
            reason: reason.into(),
        }
    }
}

/// A rule check that could not complete normally.
///
/// Never surfaces to callers of the orchestrator: the dispatch boundary turns
/// every variant into a red result carrying the message under `error`.
#[derive(Debug, Clone, Error)]
pub enum CheckError {
    #[error("unknown rule type '{rule_type}'")]
    UnknownRuleType { rule_type: String },

    #[error("missing {what} for runcard '{runcard_id}'")]
    MissingRecord { what: String, runcard_id: String },

    #[error("malformed {field}: '{value}'")]
    MalformedData { field: String, value: String },

    #[error("check panicked: {message}")]
    Panicked { message: String },

    #[error(transparent)]
    Source(#[from] SourceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_rule_type_message() {
        let err = CheckError::UnknownRuleType {
            rule_type: "Bogus".into(),
        };
        assert_eq!(err.to_string(), "unknown rule type 'Bogus'");
    }

    #[test]
    fn missing_record_message() {
        let err = CheckError::MissingRecord {
            what: "wafer condition".into(),
            runcard_id: "RC-1".into(),
        };
        assert_eq!(err.to_string(), "missing wafer condition for runcard 'RC-1'");
    }

    #[test]
    fn malformed_data_message() {
        let err = CheckError::MalformedData {
            field: "waferQty".into(),
            value: "abc".into(),
        };
        assert_eq!(err.to_string(), "malformed waferQty: 'abc'");
    }

    #[test]
    fn source_error_is_transparent() {
        let err = CheckError::from(SourceError::unavailable("inhibition", "timeout"));
        assert_eq!(err.to_string(), "inhibition lookup failed: timeout");
    }
}
