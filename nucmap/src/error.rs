use std::fmt;

/// Rejection raised by strict ingestion and configuration. `code` is stable and
/// is what the bindings hand to the UI; `message` is for humans.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestError {
    pub code: &'static str,
    pub message: String,
}

impl IngestError {
    pub fn new(code: &'static str, message: impl Into<String>) -> IngestError {
        IngestError { code, message: message.into() }
    }

    pub fn json_parse(message: impl Into<String>) -> IngestError { IngestError::new("json_parse", message) }
    pub fn caps_exceeded(what: &str, cap: usize) -> IngestError {
        IngestError::new("caps_exceeded", format!("{}>{}", what, cap))
    }
    pub fn invalid_structure(message: impl Into<String>) -> IngestError {
        IngestError::new("invalid_structure", message)
    }
    pub fn non_finite(field: &str) -> IngestError {
        IngestError::new("non_finite", format!("field '{}' must be finite", field))
    }
    pub fn out_of_bounds(field: &str) -> IngestError {
        IngestError::new("out_of_bounds", format!("field '{}' out of bounds", field))
    }
    pub fn invalid_iso3(got: &str) -> IngestError {
        IngestError::new("invalid_iso3", format!("'{}' is not a three-letter country code", got))
    }
    pub fn duplicate_country(table: &str, iso3: &str) -> IngestError {
        IngestError::new("duplicate_country", format!("table '{}' lists {} more than once", table, iso3))
    }
    pub fn unknown_report(id: &str) -> IngestError {
        IngestError::new("unknown_report", format!("no report table '{}'", id))
    }
    pub fn invalid_config(message: impl Into<String>) -> IngestError {
        IngestError::new("invalid_config", message)
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for IngestError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleError {
    NonFinite { param: &'static str },
}

impl fmt::Display for ScaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleError::NonFinite { param } => write!(f, "parameter '{}' must be finite", param),
        }
    }
}

impl std::error::Error for ScaleError {}
