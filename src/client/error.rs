use thiserror::Error;

/// The one failure category callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SimulationRequestFailed,
}

/// Why a simulation call failed. The variants exist for diagnostics only;
/// every one of them is a [`ErrorKind::SimulationRequestFailed`].
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("simulation request failed: service answered {status}")]
    Status { status: u16 },
    #[error("simulation request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("simulation request failed: unreadable response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl SimulationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::SimulationRequestFailed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_failure_shares_one_kind() {
        let status = SimulationError::Status { status: 503 };
        let decode = SimulationError::Decode(serde_json::from_str::<u32>("nope").unwrap_err());
        assert_eq!(status.kind(), ErrorKind::SimulationRequestFailed);
        assert_eq!(decode.kind(), ErrorKind::SimulationRequestFailed);
        assert!(status.to_string().starts_with("simulation request failed"));
    }
}
