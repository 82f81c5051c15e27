//! Deployment modes describing how an instrument is sited

use crate::errors::TemplateError;
use std::fmt;
use std::str::FromStr;

/// Where an instrument is deployed, selects the common dimension and variable tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeploymentMode {
    #[default]
    Land,
    Sea,
    Air,
    Trajectory,
}

impl DeploymentMode {
    /// Every valid deployment mode, in vocabulary order
    pub const ALL: [DeploymentMode; 4] = [
        DeploymentMode::Land,
        DeploymentMode::Sea,
        DeploymentMode::Air,
        DeploymentMode::Trajectory,
    ];

    /// Name used in vocabulary file names and the `deployment_mode` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentMode::Land => "land",
            DeploymentMode::Sea => "sea",
            DeploymentMode::Air => "air",
            DeploymentMode::Trajectory => "trajectory",
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentMode {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "land" => Ok(DeploymentMode::Land),
            "sea" => Ok(DeploymentMode::Sea),
            "air" => Ok(DeploymentMode::Air),
            "trajectory" => Ok(DeploymentMode::Trajectory),
            other => Err(TemplateError::InvalidDeploymentMode {
                mode: other.to_string(),
            }),
        }
    }
}
