//! Occupation code newtypes.
//!
//! Taxonomy codes are the fine `DD-DDDD.DD` form; wage statistics are
//! published against the coarse `DD-DDDD` form. Truncation from fine to
//! coarse is many-to-one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OccupationCode(String);

impl OccupationCode {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if !is_fine_code(trimmed) {
            return Err(ModelError::InvalidOccupationCode(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Coarse wage code: the fine code truncated at the decimal point.
    pub fn wage_code(&self) -> WageCode {
        let (coarse, _) = self.0.split_at(7);
        WageCode(coarse.to_string())
    }
}

impl fmt::Display for OccupationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OccupationCode {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OccupationCode> for String {
    fn from(code: OccupationCode) -> Self {
        code.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WageCode(String);

impl WageCode {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if !is_coarse_code(trimmed) {
            return Err(ModelError::InvalidWageCode(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The cross-occupation total row (`00-0000`) published by wage surveys.
    pub fn is_all_occupations(&self) -> bool {
        self.0 == "00-0000"
    }
}

impl fmt::Display for WageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for WageCode {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WageCode> for String {
    fn from(code: WageCode) -> Self {
        code.0
    }
}

fn is_coarse_code(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 7
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[2] == b'-'
        && bytes[3..].iter().all(u8::is_ascii_digit)
}

fn is_fine_code(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && is_coarse_code(&value[..7])
        && bytes[7] == b'.'
        && bytes[8..].iter().all(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fine_code_truncates_to_wage_code() {
        let code = OccupationCode::new("13-2011.00").unwrap();
        assert_eq!(code.wage_code().as_str(), "13-2011");
    }

    #[test]
    fn fine_code_rejects_coarse_form() {
        assert!(OccupationCode::new("13-2011").is_err());
        assert!(OccupationCode::new("13-2011.0").is_err());
        assert!(OccupationCode::new("1a-2011.00").is_err());
    }

    #[test]
    fn codes_are_trimmed() {
        let code = OccupationCode::new(" 15-1252.00 ").unwrap();
        assert_eq!(code.as_str(), "15-1252.00");
        let wage = WageCode::new("15-1252 ").unwrap();
        assert_eq!(wage.as_str(), "15-1252");
    }

    #[test]
    fn wage_code_detects_total_row() {
        assert!(WageCode::new("00-0000").unwrap().is_all_occupations());
        assert!(!WageCode::new("11-1011").unwrap().is_all_occupations());
    }
}
