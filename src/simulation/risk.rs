//! Investor risk profiles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How widely simulated annual returns swing around the base rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskProfile {
    pub const ALL: [RiskProfile; 3] = [
        RiskProfile::Conservative,
        RiskProfile::Moderate,
        RiskProfile::Aggressive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "conservative",
            RiskProfile::Moderate => "moderate",
            RiskProfile::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "conservative" | "low" => Ok(RiskProfile::Conservative),
            "moderate" | "medium" => Ok(RiskProfile::Moderate),
            "aggressive" | "high" => Ok(RiskProfile::Aggressive),
            other => Err(format!(
                "unknown risk profile '{}' (expected conservative, moderate or aggressive)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("high".parse::<RiskProfile>(), Ok(RiskProfile::Aggressive));
        assert_eq!("Moderate".parse::<RiskProfile>(), Ok(RiskProfile::Moderate));
        assert!("reckless".parse::<RiskProfile>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&RiskProfile::Conservative).unwrap();
        assert_eq!(json, "\"conservative\"");
    }
}
