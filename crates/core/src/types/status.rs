//! Order status state machine.
//!
//! The kitchen workflow is linear and forward-only:
//!
//! ```text
//! PENDING -> PREPARING -> READY -> DELIVERED
//!     \          |          /
//!      `----> CANCELLED <--'
//! ```
//!
//! `DELIVERED` and `CANCELLED` are terminal; no transition leaves them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Placed, not yet picked up by the kitchen.
    #[default]
    Pending,
    /// In the kitchen.
    Preparing,
    /// Ready for pickup or delivery.
    Ready,
    /// Handed to the client. Terminal.
    Delivered,
    /// Abandoned before delivery. Terminal.
    Cancelled,
}

/// Error parsing a status from its wire name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid order status: {0}")]
pub struct StatusParseError(String);

impl OrderStatus {
    /// The single next status along the forward path.
    ///
    /// Returns `None` for terminal statuses; an open order that is neither
    /// `Pending` nor `Preparing` advances straight to `Delivered`.
    #[must_use]
    pub const fn next_forward(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Preparing),
            Self::Preparing => Some(Self::Ready),
            Self::Ready => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    /// Whether no further transition is permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether the order may still be cancelled.
    #[must_use]
    pub const fn can_cancel(self) -> bool {
        !self.is_terminal()
    }

    /// Whether a transition from `self` to `target` is permitted.
    ///
    /// Forward moves follow the linear path one step at a time; `Cancelled`
    /// is reachable from every open state.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        if target == Self::Cancelled {
            return self.can_cancel();
        }
        self.next_forward() == Some(target)
    }

    /// Wire name used by the status-change endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Preparing => "PREPARING",
            Self::Ready => "READY",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PREPARING" => Ok(Self::Preparing),
            "READY" => Ok(Self::Ready),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}
