//! # External Collaborators - Fee Providers and Token Ledger
//!
//! ## Purpose
//!
//! The engine never moves tokens and never decides dynamic fees itself. Both
//! live behind traits supplied by the embedding settlement layer:
//!
//! - [`FeeProvider`] answers `DynamicFeeAmountIn` with a fee in basis points
//! - [`TokenLedger`] answers taker balances and token supplies for the
//!   taker-eligibility controls
//!
//! Failures are reported as [`ProviderError`] and surface to callers as
//! `VmError::ExternalCall` carrying the target address. They are not retried.
//!
//! The in-memory implementations back tests and local simulations.

use crate::order::OrderHash;
use dashmap::DashMap;
use swapvm_codec::Address;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ProviderError {
    pub reason: String,
}

impl ProviderError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// What a fee provider sees about the swap being priced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuery {
    pub order_hash: OrderHash,
    pub maker: Address,
    pub taker: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub amount: u128,
    pub exact_in: bool,
}

/// Dynamic fee source, addressed by provider
pub trait FeeProvider: Send + Sync {
    /// Fee in basis points; the engine rejects answers at or above 100%
    fn fee_bps(&self, provider: &Address, query: &FeeQuery) -> ProviderResult<u32>;
}

/// Read-only view of token balances held outside the engine
pub trait TokenLedger: Send + Sync {
    fn balance_of(&self, token: &Address, account: &Address) -> ProviderResult<u128>;

    fn total_supply(&self, token: &Address) -> ProviderResult<u128>;
}

/// Fee provider with fixed per-address answers
#[derive(Debug, Default)]
pub struct StaticFeeProvider {
    fees: DashMap<Address, u32>,
}

impl StaticFeeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fee(&self, provider: Address, fee_bps: u32) {
        self.fees.insert(provider, fee_bps);
    }
}

impl FeeProvider for StaticFeeProvider {
    fn fee_bps(&self, provider: &Address, _query: &FeeQuery) -> ProviderResult<u32> {
        self.fees
            .get(provider)
            .map(|fee| *fee)
            .ok_or_else(|| ProviderError::new(format!("no fee registered for {provider}")))
    }
}

/// Token ledger held in memory
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: DashMap<(Address, Address), u128>,
    supplies: DashMap<Address, u128>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, token: Address, account: Address, amount: u128) {
        self.balances.insert((token, account), amount);
    }

    pub fn set_supply(&self, token: Address, supply: u128) {
        self.supplies.insert(token, supply);
    }
}

impl TokenLedger for InMemoryLedger {
    fn balance_of(&self, token: &Address, account: &Address) -> ProviderResult<u128> {
        Ok(self
            .balances
            .get(&(*token, *account))
            .map(|amount| *amount)
            .unwrap_or(0))
    }

    fn total_supply(&self, token: &Address) -> ProviderResult<u128> {
        self.supplies
            .get(token)
            .map(|supply| *supply)
            .ok_or_else(|| ProviderError::new(format!("unknown token {token}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> FeeQuery {
        FeeQuery {
            order_hash: OrderHash::ZERO,
            maker: Address::from_low_byte(1),
            taker: Address::from_low_byte(2),
            token_in: Address::from_low_byte(3),
            token_out: Address::from_low_byte(4),
            amount: 10,
            exact_in: true,
        }
    }

    #[test]
    fn test_static_fee_provider() {
        let provider = StaticFeeProvider::new();
        let address = Address::from_low_byte(9);
        assert!(provider.fee_bps(&address, &query()).is_err());
        provider.set_fee(address, 25);
        assert_eq!(provider.fee_bps(&address, &query()), Ok(25));
    }

    #[test]
    fn test_ledger_defaults() {
        let ledger = InMemoryLedger::new();
        let (token, account) = (Address::from_low_byte(1), Address::from_low_byte(2));
        assert_eq!(ledger.balance_of(&token, &account), Ok(0));
        assert!(ledger.total_supply(&token).is_err());

        ledger.set_balance(token, account, 7);
        ledger.set_supply(token, 70);
        assert_eq!(ledger.balance_of(&token, &account), Ok(7));
        assert_eq!(ledger.total_supply(&token), Ok(70));
    }
}
