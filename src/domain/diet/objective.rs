//! Diet target objective.

use serde::{Deserialize, Serialize};

/// What the diet is designed to achieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietObjective {
    FatLoss,
    /// Cutting phase, keep muscle while lowering body fat.
    Definition,
    Bulking,
    Healthy,
    MuscleGain,
}

impl DietObjective {
    pub fn as_str(&self) -> &'static str {
        match self {
            DietObjective::FatLoss => "fat_loss",
            DietObjective::Definition => "definition",
            DietObjective::Bulking => "bulking",
            DietObjective::Healthy => "healthy",
            DietObjective::MuscleGain => "muscle_gain",
        }
    }
}

impl std::fmt::Display for DietObjective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DietObjective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fat_loss" => Ok(DietObjective::FatLoss),
            "definition" => Ok(DietObjective::Definition),
            "bulking" => Ok(DietObjective::Bulking),
            "healthy" => Ok(DietObjective::Healthy),
            "muscle_gain" => Ok(DietObjective::MuscleGain),
            other => Err(format!("unknown diet objective: {}", other)),
        }
    }
}
