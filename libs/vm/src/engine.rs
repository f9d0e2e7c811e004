//! # Swap Engine - Order State Store and Entry Points
//!
//! ## Purpose
//!
//! Owns the frozen opcode table, the external collaborators and the committed
//! state of every order that has traded. Exposes quote, swap and probe walks
//! plus read-only views of per-order state.
//!
//! ## Transactional Walks
//!
//! A walk never touches committed state directly. It clones the order's
//! current [`OrderState`], runs the program against the clone and, for a
//! successful swap that meets the taker's threshold, swaps the clone in as the
//! new committed value. Any error discards the clone.
//!
//! ## Concurrency
//!
//! Swaps on one order are serialized by that order's `swap_lock`, held from
//! reading the committed state until the commit. Quotes and probes take no
//! exclusive lock: they clone the committed `Arc<OrderState>` under a short
//! read lock and walk the snapshot. Different orders never contend beyond
//! the map shard lookup.
//!
//! Only orders with committed state keep a slot. A swap that leaves its slot
//! empty, failed or not, removes it before releasing `swap_lock`. A swap that
//! acquires `swap_lock` on a slot no longer in the map starts over with the
//! current one.
//!
//! # Lock Ordering
//!
//! 1. `orders` shard (never held while waiting on `swap_lock`)
//! 2. `OrderSlot::swap_lock` (short shard lookups and removal allowed under it)
//! 3. `OrderSlot::state` (read or write, never held across a walk)

use crate::clock::{Clock, SystemClock};
use crate::context::{ExecutionContext, ExecutionEnv, OrderInfo, WalkMode};
use crate::error::{StateError, VmError, VmResult};
use crate::interpreter;
use crate::order::{Order, OrderHash, Quote, SwapRequest};
use crate::providers::{FeeProvider, InMemoryLedger, StaticFeeProvider, TokenLedger};
use crate::state::{Direction, OrderState};
use crate::table::OpcodeTable;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use swapvm_codec::Address;
use swapvm_config::EngineConfig;
use tracing::{debug, info, warn};

#[derive(Default)]
struct OrderSlot {
    swap_lock: Mutex<()>,
    state: RwLock<Arc<OrderState>>,
}

impl OrderSlot {
    fn snapshot(&self) -> Arc<OrderState> {
        Arc::clone(&self.state.read())
    }
}

pub struct Engine {
    table: Arc<OpcodeTable>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    fee_provider: Arc<dyn FeeProvider>,
    ledger: Arc<dyn TokenLedger>,
    orders: DashMap<OrderHash, Arc<OrderSlot>>,
}

impl Engine {
    /// Engine with the standard table, default config and wall-clock time
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn table(&self) -> &OpcodeTable {
        &self.table
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Framing and opcode checks, plus handler argument checks unless
    /// `validation.validate_on_register` is off
    pub fn validate_program(&self, program: &[u8]) -> VmResult<usize> {
        if self.config.validation.validate_on_register {
            interpreter::validate_program(program, &self.table)
        } else {
            interpreter::validate_opcodes(program, &self.table)
        }
    }

    /// Validate an order's program; state is created on its first swap
    pub fn register_order(&self, order: &Order) -> VmResult<OrderHash> {
        let hash = order.hash();
        let instructions = self.validate_program(&order.program).map_err(|err| {
            warn!(order = %hash, error = %err, "order rejected");
            err
        })?;
        info!(order = %hash, maker = %order.maker, instructions, "order registered");
        Ok(hash)
    }

    /// Price a swap without changing any state
    pub fn quote(&self, order: &Order, request: &SwapRequest) -> VmResult<Quote> {
        check_request(request)?;
        let hash = order.hash();
        let mut scratch = self.committed(&hash);
        let quote = self
            .walk(order, hash, request, &mut scratch, WalkMode::Quote)
            .map_err(|err| {
                debug!(order = %hash, error = %err, "quote failed");
                err
            })?;
        check_threshold(request, &quote)?;
        Ok(quote)
    }

    /// Execute a swap and commit the order's new state
    pub fn swap(&self, order: &Order, request: &SwapRequest) -> VmResult<Quote> {
        check_request(request)?;
        let hash = order.hash();

        loop {
            let slot = Arc::clone(&self.orders.entry(hash).or_default());
            let _guard = slot.swap_lock.lock();
            if !self.is_current(&hash, &slot) {
                debug!(order = %hash, "order slot replaced while waiting, retrying");
                continue;
            }

            let mut scratch = OrderState::clone(&slot.snapshot());
            let result = self
                .walk(order, hash, request, &mut scratch, WalkMode::Swap)
                .and_then(|quote| check_threshold(request, &quote).map(|_| quote));

            match &result {
                Ok(quote) => {
                    *slot.state.write() = Arc::new(scratch);
                    debug!(
                        order = %hash,
                        amount_in = quote.amount_in,
                        amount_out = quote.amount_out,
                        swap_pc = quote.swap_pc,
                        "swap committed"
                    );
                }
                Err(err) => {
                    warn!(order = %hash, taker = %request.taker, error = %err, "swap failed, state discarded");
                }
            }
            self.release_if_empty(&hash, &slot);
            return result;
        }
    }

    /// Walk up to and including the swap instruction
    ///
    /// Returns the swap point and the amounts the swap instruction priced,
    /// before any wrapping instruction adjusts them. No state changes.
    pub fn probe(&self, order: &Order, request: &SwapRequest) -> VmResult<Quote> {
        check_request(request)?;
        let hash = order.hash();
        let mut scratch = self.committed(&hash);
        self.walk(order, hash, request, &mut scratch, WalkMode::Probe)
    }

    pub fn tracked_balance(&self, hash: &OrderHash, token: &Address) -> VmResult<u128> {
        Ok(self.snapshot(hash)?.balance(token)?)
    }

    pub fn liquidity_scale(&self, hash: &OrderHash) -> VmResult<u128> {
        Ok(self.snapshot(hash)?.liquidity_scale()?)
    }

    /// Decay offset as of now; zero if none was ever recorded
    pub fn decay_offset(
        &self,
        hash: &OrderHash,
        token: &Address,
        direction: Direction,
    ) -> VmResult<u128> {
        let now = self.clock.now();
        Ok(self.snapshot(hash)?.decay_offset(token, direction, now)?)
    }

    /// Committed state of a traded order
    pub fn snapshot(&self, hash: &OrderHash) -> VmResult<Arc<OrderState>> {
        self.orders
            .get(hash)
            .map(|slot| slot.snapshot())
            .ok_or_else(|| StateError::UnknownOrder { hash: *hash }.into())
    }

    /// Drop an order's persistent state
    ///
    /// A swap already walking against the order's slot finishes against the
    /// dropped slot; its commit is not visible afterwards. Swaps still waiting
    /// for the slot start over from the encoded program state.
    pub fn invalidate_order(&self, hash: &OrderHash) -> bool {
        let removed = self.orders.remove(hash).is_some();
        info!(order = %hash, removed, "order invalidated");
        removed
    }

    /// Orders with committed state
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    fn is_current(&self, hash: &OrderHash, slot: &Arc<OrderSlot>) -> bool {
        self.orders
            .get(hash)
            .is_some_and(|current| Arc::ptr_eq(current.value(), slot))
    }

    /// Drop a slot holding no committed state; caller holds its `swap_lock`
    fn release_if_empty(&self, hash: &OrderHash, slot: &Arc<OrderSlot>) {
        if slot.snapshot().is_empty() {
            self.orders
                .remove_if(hash, |_, current| Arc::ptr_eq(current, slot));
        }
    }

    fn committed(&self, hash: &OrderHash) -> OrderState {
        self.orders
            .get(hash)
            .map(|slot| OrderState::clone(&slot.snapshot()))
            .unwrap_or_default()
    }

    fn walk(
        &self,
        order: &Order,
        hash: OrderHash,
        request: &SwapRequest,
        state: &mut OrderState,
        mode: WalkMode,
    ) -> VmResult<Quote> {
        let env = ExecutionEnv {
            clock: self.clock.as_ref(),
            fee_provider: self.fee_provider.as_ref(),
            ledger: self.ledger.as_ref(),
            correction: self.config.correction.policy(),
            max_bisection_steps: self.config.density.max_bisection_steps,
        };
        let info = OrderInfo {
            hash,
            maker: order.maker,
        };
        debug!(order = %hash, ?mode, exact_in = request.exact_in, amount = request.amount, "walk started");

        let mut ctx = ExecutionContext::new(
            &order.program,
            &self.table,
            env,
            state,
            info,
            request,
            mode,
        );
        interpreter::run(&mut ctx, 0)?;

        let quote = match mode {
            WalkMode::Probe => ctx.swap_record().ok_or(VmError::SwapAmountsNotComputed)?,
            WalkMode::Swap | WalkMode::Quote => ctx.finish()?,
        };
        debug!(order = %hash, ?mode, ?quote, "walk finished");
        Ok(quote)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn check_request(request: &SwapRequest) -> VmResult<()> {
    if request.token_in == request.token_out {
        return Err(VmError::IdenticalTokens {
            token: request.token_in,
        });
    }
    if request.amount == 0 {
        return Err(VmError::ZeroAmount);
    }
    Ok(())
}

fn check_threshold(request: &SwapRequest, quote: &Quote) -> VmResult<()> {
    let Some(threshold) = request.threshold else {
        return Ok(());
    };
    if request.exact_in && quote.amount_out < threshold {
        return Err(VmError::ThresholdNotMet {
            amount: quote.amount_out,
            threshold,
        });
    }
    if !request.exact_in && quote.amount_in > threshold {
        return Err(VmError::ThresholdNotMet {
            amount: quote.amount_in,
            threshold,
        });
    }
    Ok(())
}

/// Assembles an [`Engine`]; unset parts fall back to the standard table,
/// default config, wall-clock time, an empty fee provider and an empty ledger
#[derive(Default)]
pub struct EngineBuilder {
    table: Option<Arc<OpcodeTable>>,
    config: Option<EngineConfig>,
    clock: Option<Arc<dyn Clock>>,
    fee_provider: Option<Arc<dyn FeeProvider>>,
    ledger: Option<Arc<dyn TokenLedger>>,
}

impl EngineBuilder {
    pub fn table(mut self, table: OpcodeTable) -> Self {
        self.table = Some(Arc::new(table));
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn fee_provider(mut self, provider: Arc<dyn FeeProvider>) -> Self {
        self.fee_provider = Some(provider);
        self
    }

    pub fn ledger(mut self, ledger: Arc<dyn TokenLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn build(self) -> Engine {
        let table = self
            .table
            .unwrap_or_else(|| Arc::new(crate::instructions::standard_table()));
        debug!(opcodes = table.registered().count(), "engine built");
        Engine {
            table,
            config: self.config.unwrap_or_default(),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            fee_provider: self
                .fee_provider
                .unwrap_or_else(|| Arc::new(StaticFeeProvider::new())),
            ledger: self
                .ledger
                .unwrap_or_else(|| Arc::new(InMemoryLedger::new())),
            orders: DashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swapvm_codec::ProgramBuilder;

    fn tokens() -> (Address, Address, Address) {
        (
            Address::from_low_byte(0xA),
            Address::from_low_byte(0xB),
            Address::from_low_byte(0x7),
        )
    }

    #[test]
    fn test_request_checks() {
        let (a, b, taker) = tokens();
        assert_eq!(
            check_request(&SwapRequest::exact_in(taker, a, a, 1)),
            Err(VmError::IdenticalTokens { token: a })
        );
        assert_eq!(
            check_request(&SwapRequest::exact_in(taker, a, b, 0)),
            Err(VmError::ZeroAmount)
        );
    }

    #[test]
    fn test_threshold_directions() {
        let (a, b, taker) = tokens();
        let quote = Quote {
            amount_in: 100,
            amount_out: 90,
            swap_pc: 0,
        };
        let exact_in = SwapRequest::exact_in(taker, a, b, 100);
        assert!(check_threshold(&exact_in.with_threshold(90), &quote).is_ok());
        assert_eq!(
            check_threshold(&exact_in.with_threshold(91), &quote),
            Err(VmError::ThresholdNotMet {
                amount: 90,
                threshold: 91
            })
        );

        let exact_out = SwapRequest::exact_out(taker, a, b, 90);
        assert!(check_threshold(&exact_out.with_threshold(100), &quote).is_ok());
        assert!(check_threshold(&exact_out.with_threshold(99), &quote).is_err());
    }

    #[test]
    fn test_unknown_order_views() {
        let engine = Engine::new();
        let hash = OrderHash::ZERO;
        assert_eq!(
            engine.liquidity_scale(&hash),
            Err(VmError::State(StateError::UnknownOrder { hash }))
        );
        assert!(!engine.invalidate_order(&hash));
    }

    #[test]
    fn test_quote_leaves_no_state() {
        let (a, b, taker) = tokens();
        let engine = Engine::new();
        let program = ProgramBuilder::new()
            .dynamic_balances(&[(a, 1_000), (b, 1_000)])
            .unwrap()
            .constant_product_swap(None)
            .build();
        let order = Order::new(Address::from_low_byte(1), program);

        let quote = engine
            .quote(&order, &SwapRequest::exact_in(taker, a, b, 100))
            .unwrap();
        assert_eq!(quote.amount_out, 90);
        assert_eq!(engine.order_count(), 0);
    }
}
