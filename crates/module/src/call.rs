//! Call message types for the auction module.

use auction_types::{BidDigest, RevealEntry};
use borsh::{BorshDeserialize, BorshSerialize};

/// Call messages for the auction module.
///
/// Deposits travel as the call's attached value, not inside the message.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum AuctionCall {
    /// Open an auction for a resource name.
    StartAuction { resource_name: String },

    /// Submit a blinded bid; the attached value is the deposit.
    SubmitBid {
        resource_name: String,
        digest: BidDigest,
    },

    /// Open the sender's commitments, in submission order.
    Reveal {
        resource_name: String,
        entries: Vec<RevealEntry>,
    },

    /// End the auction and register the winner (anyone).
    Finalize { resource_name: String },

    /// Withdraw the sender's queued refunds.
    Withdraw { resource_name: String },
}

impl AuctionCall {
    /// Resource name the call targets.
    pub fn resource_name(&self) -> &str {
        match self {
            AuctionCall::StartAuction { resource_name }
            | AuctionCall::SubmitBid { resource_name, .. }
            | AuctionCall::Reveal { resource_name, .. }
            | AuctionCall::Finalize { resource_name }
            | AuctionCall::Withdraw { resource_name } => resource_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auction_types::Secret;

    #[test]
    fn test_reveal_call_borsh_roundtrip() {
        let call = AuctionCall::Reveal {
            resource_name: "dns.ntu".into(),
            entries: vec![RevealEntry::new(100, true, Secret::from_phrase("secret").unwrap())],
        };
        let encoded = borsh::to_vec(&call).unwrap();
        let decoded: AuctionCall = borsh::from_slice(&encoded).unwrap();

        assert_eq!(decoded, call);
        assert_eq!(decoded.resource_name(), "dns.ntu");
    }
}
