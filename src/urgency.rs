// src/urgency.rs
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of severities attached to every synthesized alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
}

impl UrgencyLevel {
    /// Every enumerator, in declaration order. Default urgency pool.
    pub const ALL: [UrgencyLevel; 3] = [UrgencyLevel::Low, UrgencyLevel::Medium, UrgencyLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Low => "LOW",
            UrgencyLevel::Medium => "MEDIUM",
            UrgencyLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrgencyLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(UrgencyLevel::Low),
            "MEDIUM" => Ok(UrgencyLevel::Medium),
            "HIGH" => Ok(UrgencyLevel::High),
            other => anyhow::bail!("unknown urgency level: {other:?}"),
        }
    }
}

// Input goes through `FromStr` so "low" and "LOW" both parse.
impl<'de> Deserialize<'de> for UrgencyLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("low".parse::<UrgencyLevel>().unwrap(), UrgencyLevel::Low);
        assert_eq!(" High ".parse::<UrgencyLevel>().unwrap(), UrgencyLevel::High);
        assert!("urgent".parse::<UrgencyLevel>().is_err());
    }

    #[test]
    fn serializes_uppercase() {
        let s = serde_json::to_string(&UrgencyLevel::Medium).unwrap();
        assert_eq!(s, "\"MEDIUM\"");
        let back: UrgencyLevel = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(back, UrgencyLevel::High);
    }

    #[test]
    fn deserializes_case_insensitively() {
        let back: Vec<UrgencyLevel> = serde_json::from_str(r#"["low", "Medium", "HIGH"]"#).unwrap();
        assert_eq!(back, UrgencyLevel::ALL.to_vec());
        assert!(serde_json::from_str::<UrgencyLevel>("\"severe\"").is_err());
    }
}
