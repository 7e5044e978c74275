// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Objective modes that decide how candidates are ranked.

use crate::ScoringError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the recommendation optimises for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveMode {
    /// Highest throughput wins.
    Performance,
    /// Highest composite efficiency wins.
    #[default]
    Sustainability,
}

impl ObjectiveMode {
    pub const ALL: [ObjectiveMode; 2] = [ObjectiveMode::Performance, ObjectiveMode::Sustainability];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectiveMode::Performance => "performance",
            ObjectiveMode::Sustainability => "sustainability",
        }
    }
}

impl fmt::Display for ObjectiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectiveMode {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "performance" => Ok(ObjectiveMode::Performance),
            "sustainability" => Ok(ObjectiveMode::Sustainability),
            _ => Err(ScoringError::UnknownObjective(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert_eq!("Performance".parse::<ObjectiveMode>().unwrap(), ObjectiveMode::Performance);
        assert_eq!(ObjectiveMode::Sustainability.to_string(), "sustainability");
        assert!(matches!(
            "speed".parse::<ObjectiveMode>(),
            Err(ScoringError::UnknownObjective(_))
        ));
    }

    #[test]
    fn test_default_is_sustainability() {
        assert_eq!(ObjectiveMode::default(), ObjectiveMode::Sustainability);
    }
}
