//! # SwapVM - Programmable Swap Execution
//!
//! ## Purpose
//!
//! Executes maker-authored swap programs against taker requests. A program is
//! a byte string of `{opcode, args_len, args}` instructions; the interpreter
//! walks it with a per-call [`ExecutionContext`], dispatching each opcode
//! through a frozen [`OpcodeTable`]. Handlers read balances, apply fees and
//! balance adjusters, and price the trade through the curves in
//! `swapvm-amm`.
//!
//! ## Integration Points
//!
//! - **Input**: an already-authenticated [`Order`] plus a [`SwapRequest`]
//! - **Output**: a [`Quote`] with `amount_in`, `amount_out` and the swap pc
//! - **Collaborators**: [`FeeProvider`], [`TokenLedger`] and [`Clock`] supplied
//!   by the settlement layer
//! - **Configuration**: `swapvm_config::EngineConfig`
//!
//! ## Architecture
//!
//! ```text
//! Order + SwapRequest
//!        │
//!        ▼
//!    Engine ──clone──▶ scratch OrderState
//!        │                    │
//!        ▼                    ▼
//!  interpreter::run ──▶ ExecutionContext ──▶ Instruction handlers
//!        │                                        │
//!        ▼                                        ▼
//!   Quote (commit scratch on swap)          swapvm-amm / swapvm-math
//! ```
//!
//! ## Usage
//!
//! ```
//! use swapvm::{Engine, Order, SwapRequest};
//! use swapvm_codec::{Address, ProgramBuilder};
//!
//! let (a, b) = (Address::from_low_byte(0xA), Address::from_low_byte(0xB));
//! let program = ProgramBuilder::new()
//!     .dynamic_balances(&[(a, 1_000), (b, 1_000)])
//!     .unwrap()
//!     .constant_product_swap(None)
//!     .build();
//! let order = Order::new(Address::from_low_byte(1), program);
//!
//! let engine = Engine::new();
//! engine.register_order(&order).unwrap();
//! let taker = Address::from_low_byte(2);
//! let quote = engine.swap(&order, &SwapRequest::exact_in(taker, a, b, 100)).unwrap();
//! assert_eq!(quote.amount_out, 90);
//! assert_eq!(engine.tracked_balance(&order.hash(), &a).unwrap(), 1_100);
//! ```

pub mod clock;
pub mod context;
pub mod engine;
pub mod error;
pub mod instructions;
pub mod interpreter;
pub mod order;
pub mod providers;
pub mod state;
pub mod table;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{ExecutionContext, ExecutionEnv, OrderInfo, WalkMode, MAX_CALL_DEPTH};
pub use engine::{Engine, EngineBuilder};
pub use error::{StateError, StateResult, VmError, VmResult};
pub use instructions::standard_table;
pub use interpreter::{run, validate_opcodes, validate_program};
pub use order::{Order, OrderHash, Quote, SwapRequest};
pub use providers::{
    FeeProvider, FeeQuery, InMemoryLedger, ProviderError, ProviderResult, StaticFeeProvider,
    TokenLedger,
};
pub use state::{clamp_balance, DecayEntry, Direction, OrderState, Slot};
pub use table::{Instruction, OpcodeTable, OpcodeTableBuilder};
