//! Phase clock: derives the protocol phase from the current time.

use auction_types::{AuctionConfig, Phase, Timestamp};

use crate::error::AuctionError;

/// The two deadlines that split an auction into phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseClock {
    pub bidding_deadline: Timestamp,
    pub reveal_deadline: Timestamp,
}

impl PhaseClock {
    /// Create a clock, rejecting deadlines that are not strictly ordered.
    pub fn new(
        bidding_deadline: Timestamp,
        reveal_deadline: Timestamp,
    ) -> Result<Self, AuctionError> {
        if bidding_deadline >= reveal_deadline {
            return Err(AuctionError::InvalidTiming);
        }
        Ok(Self {
            bidding_deadline,
            reveal_deadline,
        })
    }

    pub fn from_config(config: &AuctionConfig) -> Result<Self, AuctionError> {
        Self::new(config.bidding_deadline, config.reveal_deadline)
    }

    /// Phase at `now`. A finalized auction is always `Ended`.
    pub fn current_phase(&self, now: Timestamp, ended: bool) -> Phase {
        if ended || now >= self.reveal_deadline {
            Phase::Ended
        } else if now >= self.bidding_deadline {
            Phase::RevealWindow
        } else {
            Phase::AcceptingBids
        }
    }

    /// Fail with `WrongPhase` unless the auction is in `required` at `now`.
    pub fn require(
        &self,
        now: Timestamp,
        ended: bool,
        required: Phase,
    ) -> Result<(), AuctionError> {
        let current = self.current_phase(now, ended);
        if current != required {
            return Err(AuctionError::WrongPhase { required, current });
        }
        Ok(())
    }
}
