/// Update status shared between the update task and the heartbeat loop
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UpdateStatus {
    #[default]
    Idle,
    Checking,
    UpToDate,
    Downloading { progress: Option<u8> },
    Verifying,
    Ready,
    Failed { reason: String },
}

impl UpdateStatus {
    pub fn failed(reason: impl fmt::Display) -> Self {
        UpdateStatus::Failed {
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStatus::Idle => f.write_str("idle"),
            UpdateStatus::Checking => f.write_str("checking"),
            UpdateStatus::UpToDate => f.write_str("up to date"),
            UpdateStatus::Downloading { progress: Some(p) } => write!(f, "downloading {}%", p),
            UpdateStatus::Downloading { progress: None } => f.write_str("downloading"),
            UpdateStatus::Verifying => f.write_str("verifying"),
            UpdateStatus::Ready => f.write_str("ready to restart"),
            UpdateStatus::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}
