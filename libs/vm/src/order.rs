//! Orders, swap requests and quotes
//!
//! An [`Order`] arrives already authenticated; the engine only needs its
//! content. [`OrderHash`] is the Keccak-256 fingerprint of that content and
//! keys the persistent state, so byte-identical orders share one state bucket.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use swapvm_codec::Address;

/// Keccak-256 order fingerprint
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct OrderHash(pub [u8; 32]);

impl OrderHash {
    pub const ZERO: OrderHash = OrderHash([0u8; 32]);

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for OrderHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for OrderHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OrderHash({self})")
    }
}

/// Maker-authored order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub maker: Address,
    /// Token-agnostic order flags, opaque to the engine
    pub flags: u64,
    pub program: Bytes,
}

impl Order {
    pub fn new(maker: Address, program: impl Into<Bytes>) -> Self {
        Self {
            maker,
            flags: 0,
            program: program.into(),
        }
    }

    pub fn with_flags(mut self, flags: u64) -> Self {
        self.flags = flags;
        self
    }

    /// `keccak256(maker || flags_be || program)`
    pub fn hash(&self) -> OrderHash {
        let mut hasher = Keccak256::new();
        hasher.update(self.maker.as_bytes());
        hasher.update(self.flags.to_be_bytes());
        hasher.update(&self.program);
        OrderHash(hasher.finalize().into())
    }
}

/// Taker's swap request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub taker: Address,
    pub token_in: Address,
    pub token_out: Address,
    /// Input amount for ExactIn, output amount for ExactOut
    pub amount: u128,
    pub exact_in: bool,
    /// Minimum output (ExactIn) or maximum input (ExactOut)
    pub threshold: Option<u128>,
}

impl SwapRequest {
    pub fn exact_in(taker: Address, token_in: Address, token_out: Address, amount_in: u128) -> Self {
        Self {
            taker,
            token_in,
            token_out,
            amount: amount_in,
            exact_in: true,
            threshold: None,
        }
    }

    pub fn exact_out(
        taker: Address,
        token_in: Address,
        token_out: Address,
        amount_out: u128,
    ) -> Self {
        Self {
            taker,
            token_in,
            token_out,
            amount: amount_out,
            exact_in: false,
            threshold: None,
        }
    }

    pub fn with_threshold(mut self, threshold: u128) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// Result of a quote, swap or probe walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub amount_in: u128,
    pub amount_out: u128,
    /// Program counter of the swap instruction that priced the trade
    pub swap_pc: usize,
}
