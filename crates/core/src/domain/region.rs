use crate::error::ChartError;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_REGION_LEN: usize = 32;

/// Normalised chart region code ("global", "at", "us", ...). Always lowercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Region(String);

impl Region {
    pub fn parse(raw: &str) -> Result<Self, ChartError> {
        let code = raw.trim().to_ascii_lowercase();
        if code.is_empty() {
            return Err(ChartError::invalid_argument("region must be non-empty"));
        }
        if code.len() > MAX_REGION_LEN {
            return Err(ChartError::invalid_argument(format!(
                "region must be at most {MAX_REGION_LEN} characters (got {})",
                code.len()
            )));
        }
        if !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ChartError::invalid_argument(format!(
                "region contains invalid characters: {raw:?}"
            )));
        }
        Ok(Self(code))
    }

    pub fn global() -> Self {
        Self("global".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Region {
    type Error = ChartError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_case_and_whitespace() {
        assert_eq!(Region::parse("  Global ").unwrap(), Region::global());
        assert_eq!(Region::parse("US").unwrap().as_str(), "us");
    }

    #[test]
    fn rejects_malformed_codes() {
        for raw in ["", "   ", "de/at", "global;drop", &"x".repeat(33)] {
            assert!(
                matches!(Region::parse(raw), Err(ChartError::InvalidArgument(_))),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn deserializes_through_validation() {
        let r: Region = serde_json::from_str("\"AT\"").unwrap();
        assert_eq!(r.as_str(), "at");
        assert!(serde_json::from_str::<Region>("\"\"").is_err());
    }
}
