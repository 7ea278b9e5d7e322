//! Link status tracking.
//!
//! The server classifies link health as a short string. Anything it sends
//! that is not one of the known values, including nothing at all, maps to
//! [`LinkStatus::Unknown`].

use std::fmt;

/// Coarse link health.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LinkStatus {
    /// Link is up but not yet exchanging; the server is kick-starting it.
    Init,
    /// Sequence counter is advancing.
    Up,
    /// Interface reports no carrier.
    Down,
    /// Kick-start attempt failed.
    Dead,
    /// Anything else.
    #[default]
    Unknown,
}

impl LinkStatus {
    /// Classify a status string. Total: never fails.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "INIT" => Self::Init,
            "UP" => Self::Up,
            "DOWN" => Self::Down,
            "DEAD" => Self::Dead,
            _ => Self::Unknown,
        }
    }

    /// Wire spelling of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Dead => "DEAD",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds the latest link status and reporting host for presentation.
#[derive(Debug, Clone, Default)]
pub struct StatusTracker {
    current: LinkStatus,
    host: Option<String>,
}

impl StatusTracker {
    /// Create a tracker in the `Unknown` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the status from a snapshot.
    ///
    /// Returns `true` when the status changed. A snapshot without a host
    /// keeps the previously reported one.
    pub fn update(&mut self, status: LinkStatus, host: Option<&str>) -> bool {
        if let Some(host) = host {
            if self.host.as_deref() != Some(host) {
                self.host = Some(host.to_string());
            }
        }
        if status == self.current {
            return false;
        }
        tracing::info!(
            host = self.host.as_deref().unwrap_or("?"),
            "Link status {} -> {}",
            self.current,
            status
        );
        self.current = status;
        true
    }

    /// Latest status.
    #[inline]
    pub fn current(&self) -> LinkStatus {
        self.current
    }

    /// Latest reported host.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }
}
