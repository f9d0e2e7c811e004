//! # Per-Order State - Tracked Balances, Decay Offsets, Liquidity Scale
//!
//! ## Purpose
//!
//! Everything an order remembers between swaps. The engine keeps one
//! committed [`OrderState`] per order hash; a walk mutates a clone of it and
//! the clone replaces the committed value only when the walk succeeds.
//!
//! Absent values are explicit: [`Slot::Uninitialized`] is distinct from a
//! zero amount, and reading an uninitialized balance is an error.

use crate::error::{StateError, StateResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use swapvm_codec::Address;
use swapvm_math::{mul_div, MathError, MathResult, Rounding};

/// Storage cell that distinguishes "never written" from any value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Slot<T> {
    #[default]
    Uninitialized,
    Initialized(T),
}

impl<T: Copy> Slot<T> {
    pub fn get(&self) -> Option<T> {
        match self {
            Slot::Uninitialized => None,
            Slot::Initialized(value) => Some(*value),
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self, Slot::Initialized(_))
    }
}

/// Which side of the order's trades an offset tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Amounts the order received
    In,
    /// Amounts the order paid out
    Out,
}

/// Linearly decaying offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayEntry {
    pub base: u128,
    pub start: u64,
    pub period: u16,
}

impl DecayEntry {
    /// `base * (period - elapsed) / period`, zero once the period has passed
    pub fn offset_at(&self, now: u64) -> MathResult<u128> {
        let elapsed = now.saturating_sub(self.start);
        let period = u64::from(self.period);
        if period == 0 || elapsed >= period {
            return Ok(0);
        }
        mul_div(
            self.base,
            u128::from(period - elapsed),
            u128::from(period),
            Rounding::Down,
        )
    }
}

/// Apply a decay offset to a balance, clamping at zero
pub fn clamp_balance(balance: u128, offset: u128) -> u128 {
    balance.saturating_sub(offset)
}

/// Committed state of one order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderState {
    balances: HashMap<Address, Slot<u128>>,
    decay: HashMap<(Address, Direction), DecayEntry>,
    scale: Slot<u128>,
}

impl OrderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nothing has ever been written
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty() && self.decay.is_empty() && !self.scale.is_initialized()
    }

    pub fn balance_slot(&self, token: &Address) -> Slot<u128> {
        self.balances.get(token).copied().unwrap_or_default()
    }

    pub fn balance(&self, token: &Address) -> StateResult<u128> {
        self.balance_slot(token)
            .get()
            .ok_or(StateError::UninitializedBalance { token: *token })
    }

    /// Initialize a balance unless it already holds a value
    pub fn init_balance(&mut self, token: Address, amount: u128) -> bool {
        let slot = self.balances.entry(token).or_default();
        if slot.is_initialized() {
            return false;
        }
        *slot = Slot::Initialized(amount);
        true
    }

    pub fn credit(&mut self, token: &Address, amount: u128) -> StateResult<u128> {
        let balance = self.balance(token)?;
        let updated = balance
            .checked_add(amount)
            .ok_or(StateError::BalanceOverflow { token: *token })?;
        self.balances.insert(*token, Slot::Initialized(updated));
        Ok(updated)
    }

    pub fn debit(&mut self, token: &Address, amount: u128) -> StateResult<u128> {
        let balance = self.balance(token)?;
        let updated =
            balance
                .checked_sub(amount)
                .ok_or(StateError::InsufficientTrackedBalance {
                    token: *token,
                    balance,
                    amount,
                })?;
        self.balances.insert(*token, Slot::Initialized(updated));
        Ok(updated)
    }

    pub fn decay_entry(&self, token: &Address, direction: Direction) -> Option<DecayEntry> {
        self.decay.get(&(*token, direction)).copied()
    }

    pub fn decay_offset(&self, token: &Address, direction: Direction, now: u64) -> MathResult<u128> {
        match self.decay_entry(token, direction) {
            Some(entry) => entry.offset_at(now),
            None => Ok(0),
        }
    }

    /// Restart the offset at `current + amount`, decaying over `period`
    pub fn add_decay(
        &mut self,
        token: Address,
        direction: Direction,
        amount: u128,
        now: u64,
        period: u16,
    ) -> MathResult<()> {
        let current = self.decay_offset(&token, direction, now)?;
        let base = current
            .checked_add(amount)
            .ok_or(MathError::overflow("decay offset"))?;
        self.decay.insert(
            (token, direction),
            DecayEntry {
                base,
                start: now,
                period,
            },
        );
        Ok(())
    }

    pub fn scale_slot(&self) -> Slot<u128> {
        self.scale
    }

    pub fn liquidity_scale(&self) -> StateResult<u128> {
        self.scale.get().ok_or(StateError::UninitializedScale)
    }

    pub fn set_liquidity_scale(&mut self, scale: u128) {
        self.scale = Slot::Initialized(scale);
    }
}
