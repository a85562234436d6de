//! Escrow ledger: custody balance and per-bidder withdrawable refunds.

use std::collections::HashMap;

use auction_types::{Address, Amount};

use crate::error::AuctionError;

/// Funds held by one auction.
///
/// Refunds are only ever credited here; they leave custody through `withdraw`.
#[derive(Clone, Debug, Default)]
pub struct EscrowLedger {
    /// Pending refunds per bidder
    pending: HashMap<Address, Amount>,
    /// Funds currently held
    custody: Amount,
    /// All deposits ever received
    total_deposited: Amount,
    /// All funds ever paid out (refunds and beneficiary)
    total_paid_out: Amount,
}

impl EscrowLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a deposit into custody.
    pub fn deposit(&mut self, amount: Amount) -> Result<(), AuctionError> {
        let custody = self
            .custody
            .checked_add(amount)
            .ok_or(AuctionError::ArithmeticOverflow)?;
        let total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(AuctionError::ArithmeticOverflow)?;
        self.custody = custody;
        self.total_deposited = total_deposited;
        Ok(())
    }

    /// Queue `amount` for withdrawal by `bidder`. Never pays out.
    pub fn credit_refund(&mut self, bidder: Address, amount: Amount) -> Result<(), AuctionError> {
        if amount == 0 {
            return Ok(());
        }
        let balance = self.pending.entry(bidder).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(AuctionError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Pay out and zero the bidder's pending refund.
    pub fn withdraw(&mut self, bidder: &Address) -> Result<Amount, AuctionError> {
        let amount = self.pending_refund(bidder);
        if amount == 0 {
            return Err(AuctionError::NothingToWithdraw);
        }
        self.release(amount)?;
        self.pending.insert(*bidder, 0);
        Ok(amount)
    }

    /// Move `amount` out of custody (beneficiary payment or refund payout).
    pub fn release(&mut self, amount: Amount) -> Result<(), AuctionError> {
        let custody = self
            .custody
            .checked_sub(amount)
            .ok_or(AuctionError::ArithmeticOverflow)?;
        let total_paid_out = self
            .total_paid_out
            .checked_add(amount)
            .ok_or(AuctionError::ArithmeticOverflow)?;
        self.custody = custody;
        self.total_paid_out = total_paid_out;
        Ok(())
    }

    /// Get a bidder's pending refund.
    pub fn pending_refund(&self, bidder: &Address) -> Amount {
        self.pending.get(bidder).copied().unwrap_or(0)
    }

    /// Sum of all pending refunds.
    pub fn pending_total(&self) -> Amount {
        self.pending.values().sum()
    }

    pub fn custody(&self) -> Amount {
        self.custody
    }

    pub fn total_deposited(&self) -> Amount {
        self.total_deposited
    }

    pub fn total_paid_out(&self) -> Amount {
        self.total_paid_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escrow_operations() {
        let mut ledger = EscrowLedger::new();
        let addr = [1u8; 32];

        ledger.deposit(150).unwrap();
        assert_eq!(ledger.pending_refund(&addr), 0);

        ledger.credit_refund(addr, 100).unwrap();
        ledger.credit_refund(addr, 25).unwrap();
        assert_eq!(ledger.pending_refund(&addr), 125);
        assert_eq!(ledger.custody(), 150);

        assert_eq!(ledger.withdraw(&addr), Ok(125));
        assert_eq!(ledger.pending_refund(&addr), 0);
        assert_eq!(ledger.custody(), 25);
        assert_eq!(ledger.total_paid_out(), 125);
    }

    #[test]
    fn test_withdraw_twice() {
        let mut ledger = EscrowLedger::new();
        let addr = [1u8; 32];
        ledger.deposit(50).unwrap();
        ledger.credit_refund(addr, 50).unwrap();

        assert_eq!(ledger.withdraw(&addr), Ok(50));
        assert_eq!(ledger.withdraw(&addr), Err(AuctionError::NothingToWithdraw));
        assert_eq!(ledger.total_paid_out(), 50);
    }

    #[test]
    fn test_release_cannot_exceed_custody() {
        let mut ledger = EscrowLedger::new();
        ledger.deposit(10).unwrap();
        assert_eq!(ledger.release(11), Err(AuctionError::ArithmeticOverflow));
        assert_eq!(ledger.custody(), 10);
    }
}
