//! Density / price curve
//!
//! ## Purpose
//!
//! Prices a maker's inventory as a function of how much of it has already been
//! sold. The normalized position `x ∈ [0, 1]` is the sold fraction of a fixed
//! `capacity`; a [`Shape`] `f(x)` with `f(0) = 0, f(1) = 1` (constant: `f ≡ 1`)
//! shapes the premium over a base price:
//!
//! ```text
//! price_at(x)          = base · (1 + amplitude · f(x))
//! average_price(x0,x1) = base · (1 + amplitude · (F(x1) − F(x0)) / (x1 − x0))
//! ```
//!
//! `F` is the closed-form integral of `f`. Averaging through `F` instead of
//! sampling makes the price path-independent: selling across `[x0, xm]` and then
//! `[xm, x1]` costs the same as selling across `[x0, x1]` at once, because the
//! `F` differences telescope.
//!
//! ## Rounding
//!
//! Prices round up, amounts the taker pays round up and amounts the taker
//! receives round down.

use crate::curve::{CurveKind, SwapCurve};
use crate::error::{CurveError, CurveResult};
use crate::fee::{apply_spread, validate_fee_bps, Side};
use swapvm_math::{exp, ln, mul_div, mul_wad, MathError, Rounding, MIN_NATURAL_EXPONENT, ONE, ONE_I};
use tracing::trace;

/// Default cap on ExactIn bisection rounds; enough to resolve any `u128`
pub const DEFAULT_MAX_BISECTION_STEPS: u32 = 128;

/// Largest exponent accepted by [`Shape::Power`]
pub const MAX_POWER_EXPONENT: u128 = 16 * ONE;

/// Smallest rate accepted by [`Shape::Exponential`]
pub const MIN_EXPONENTIAL_RATE: u128 = ONE / 1_000;

/// Largest rate accepted by [`Shape::Exponential`]; keeps `e^k` within `i128`
pub const MAX_EXPONENTIAL_RATE: u128 = 40 * ONE;

/// Density shape `f(x)` over the normalized position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `f(x) = 1`
    Constant,
    /// `f(x) = x`
    Linear,
    /// `f(x) = x²`
    Quadratic,
    /// `f(x) = x^p`, `p` in WAD
    Power { exponent: u128 },
    /// `f(x) = (e^{kx} − 1) / (e^k − 1)`, `k` in WAD
    Exponential { rate: u128 },
}

impl Shape {
    pub const CONSTANT: u8 = 0;
    pub const LINEAR: u8 = 1;
    pub const QUADRATIC: u8 = 2;
    pub const POWER: u8 = 3;
    pub const EXPONENTIAL: u8 = 4;

    /// Decode a shape from its wire code and parameter
    pub fn from_code(code: u8, parameter: u128) -> CurveResult<Self> {
        let shape = match code {
            Self::CONSTANT => Shape::Constant,
            Self::LINEAR => Shape::Linear,
            Self::QUADRATIC => Shape::Quadratic,
            Self::POWER => Shape::Power {
                exponent: parameter,
            },
            Self::EXPONENTIAL => Shape::Exponential { rate: parameter },
            _ => {
                return Err(CurveError::InvalidShape {
                    code,
                    parameter,
                    reason: "unknown shape code",
                })
            }
        };
        shape.validate()?;
        Ok(shape)
    }

    pub fn code(&self) -> u8 {
        match self {
            Shape::Constant => Self::CONSTANT,
            Shape::Linear => Self::LINEAR,
            Shape::Quadratic => Self::QUADRATIC,
            Shape::Power { .. } => Self::POWER,
            Shape::Exponential { .. } => Self::EXPONENTIAL,
        }
    }

    fn parameter(&self) -> u128 {
        match self {
            Shape::Power { exponent } => *exponent,
            Shape::Exponential { rate } => *rate,
            _ => 0,
        }
    }

    pub fn validate(&self) -> CurveResult<()> {
        let reason = match *self {
            Shape::Power { exponent } if exponent == 0 => "power exponent must be positive",
            Shape::Power { exponent } if exponent > MAX_POWER_EXPONENT => {
                "power exponent above 16"
            }
            Shape::Exponential { rate } if rate < MIN_EXPONENTIAL_RATE => {
                "exponential rate below 0.001"
            }
            Shape::Exponential { rate } if rate > MAX_EXPONENTIAL_RATE => {
                "exponential rate above 40"
            }
            _ => return Ok(()),
        };
        Err(CurveError::InvalidShape {
            code: self.code(),
            parameter: self.parameter(),
            reason,
        })
    }

    /// `f(x)` in WAD
    pub fn density(&self, x: u128) -> CurveResult<u128> {
        check_position(x)?;
        let value = match *self {
            Shape::Constant => ONE,
            Shape::Linear => x,
            Shape::Quadratic => mul_wad(x, x, Rounding::Down)?,
            Shape::Power { exponent } => unit_power(x, exponent)?,
            Shape::Exponential { rate } => {
                let numerator = exp_unit(x, rate)? - ONE;
                let denominator = exp_unit(ONE, rate)? - ONE;
                mul_div(numerator, ONE, denominator, Rounding::Down)?
            }
        };
        Ok(value)
    }

    /// `F(x) = ∫₀ˣ f` in WAD
    pub fn integral(&self, x: u128) -> CurveResult<u128> {
        check_position(x)?;
        let value = match *self {
            Shape::Constant => x,
            Shape::Linear => mul_wad(x, x, Rounding::Down)? / 2,
            Shape::Quadratic => {
                let squared = mul_wad(x, x, Rounding::Down)?;
                mul_wad(squared, x, Rounding::Down)? / 3
            }
            Shape::Power { exponent } => {
                let raised = exponent + ONE;
                mul_div(unit_power(x, raised)?, ONE, raised, Rounding::Down)?
            }
            Shape::Exponential { rate } => {
                let grown = mul_div(exp_unit(x, rate)? - ONE, ONE, rate, Rounding::Down)?;
                let denominator = exp_unit(ONE, rate)? - ONE;
                mul_div(grown.saturating_sub(x), ONE, denominator, Rounding::Down)?
            }
        };
        Ok(value)
    }
}

fn check_position(x: u128) -> CurveResult<()> {
    if x > ONE {
        return Err(CurveError::InvalidPosition { x });
    }
    Ok(())
}

/// `x^q` for `x ∈ [0, 1]`, through `exp(q · ln x)` without the near-one
/// series so that the result is continuous in `x`
fn unit_power(x: u128, q: u128) -> CurveResult<u128> {
    if x == 0 {
        return Ok(0);
    }
    if x == ONE {
        return Ok(ONE);
    }
    // x < ONE so ln(x) < 0
    let magnitude = ln(x as i128)?.unsigned_abs();
    let scaled = mul_div(magnitude, q, ONE, Rounding::Down)?;
    if scaled > MIN_NATURAL_EXPONENT.unsigned_abs() {
        return Ok(0);
    }
    Ok(exp(-(scaled as i128))? as u128)
}

/// `e^{k·x}` for `x ∈ [0, 1]`, at least `ONE`
fn exp_unit(x: u128, rate: u128) -> CurveResult<u128> {
    let exponent = mul_wad(x, rate, Rounding::Down)?;
    let exponent = i128::try_from(exponent).map_err(|_| MathError::overflow("exponential shape"))?;
    Ok(exp(exponent)?.max(ONE_I) as u128)
}

/// Base price plus shaped premium
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceCurve {
    pub base_price: u128,
    pub amplitude: u128,
    pub shape: Shape,
}

impl PriceCurve {
    pub fn new(base_price: u128, amplitude: u128, shape: Shape) -> CurveResult<Self> {
        if base_price == 0 {
            return Err(CurveError::InvalidPrice);
        }
        shape.validate()?;
        Ok(Self {
            base_price,
            amplitude,
            shape,
        })
    }

    fn apply_premium(&self, density: u128) -> CurveResult<u128> {
        let premium = mul_wad(self.amplitude, density, Rounding::Up)?;
        let factor = ONE
            .checked_add(premium)
            .ok_or(MathError::overflow("price premium"))?;
        Ok(mul_wad(self.base_price, factor, Rounding::Up)?)
    }

    /// Evaluate the price at a point
    pub fn price_at(&self, x: u128) -> CurveResult<u128> {
        self.apply_premium(self.shape.density(x)?)
    }

    /// Price at the middle of `[x0, x1]`
    pub fn midpoint_price(&self, x0: u128, x1: u128) -> CurveResult<u128> {
        check_range(x0, x1)?;
        self.price_at(x0 + (x1 - x0) / 2)
    }

    /// Average price over `[x0, x1]`
    pub fn average_price(&self, x0: u128, x1: u128) -> CurveResult<u128> {
        check_range(x0, x1)?;
        if x0 == x1 {
            return self.midpoint_price(x0, x1);
        }
        let area = self
            .shape
            .integral(x1)?
            .saturating_sub(self.shape.integral(x0)?);
        let mean_density = mul_div(area, ONE, x1 - x0, Rounding::Up)?;
        self.apply_premium(mean_density)
    }
}

fn check_range(x0: u128, x1: u128) -> CurveResult<()> {
    check_position(x0)?;
    check_position(x1)?;
    if x0 > x1 {
        return Err(CurveError::InvalidRange { x0, x1 });
    }
    Ok(())
}

/// Inventory curve: sells `capacity` units of the output token along a
/// [`PriceCurve`], quoting in input-token units per output unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DensityCurve {
    price: PriceCurve,
    capacity: u128,
    spread_bps: u32,
    max_bisection_steps: u32,
}

impl DensityCurve {
    pub fn new(price: PriceCurve, capacity: u128, spread_bps: u32) -> CurveResult<Self> {
        if capacity == 0 {
            return Err(CurveError::ZeroCapacity);
        }
        validate_fee_bps(spread_bps)?;
        Ok(Self {
            price,
            capacity,
            spread_bps,
            max_bisection_steps: DEFAULT_MAX_BISECTION_STEPS,
        })
    }

    pub fn with_max_bisection_steps(mut self, steps: u32) -> Self {
        self.max_bisection_steps = steps;
        self
    }

    pub fn price(&self) -> &PriceCurve {
        &self.price
    }

    /// Sold fraction of capacity when `balance_out` remains
    pub fn position(&self, balance_out: u128, rounding: Rounding) -> CurveResult<u128> {
        let sold = self.capacity - balance_out.min(self.capacity);
        Ok(mul_div(sold, ONE, self.capacity, rounding)?)
    }

    fn cost(&self, balance_out: u128, amount_out: u128) -> CurveResult<u128> {
        let x0 = self.position(balance_out, Rounding::Down)?;
        let x1 = self.position(balance_out - amount_out, Rounding::Up)?;
        let average = self.price.average_price(x0, x1)?;
        let amount_in = mul_wad(amount_out, average, Rounding::Up)?;
        apply_spread(amount_in, self.spread_bps, Side::TakerPays)
    }
}

impl SwapCurve for DensityCurve {
    fn kind(&self) -> CurveKind {
        CurveKind::Density
    }

    /// Largest output whose cost fits in `amount_in`, by bisection
    fn exact_in(&self, _balance_in: u128, balance_out: u128, amount_in: u128) -> CurveResult<u128> {
        if amount_in == 0 || balance_out == 0 {
            return Ok(0);
        }

        let (mut low, mut high) = (0u128, balance_out - 1);
        let mut steps = 0;
        while low < high {
            if steps == self.max_bisection_steps {
                return Err(CurveError::NonConvergence {
                    iterations: steps,
                    target: amount_in,
                    best: low,
                });
            }
            steps += 1;

            let mid = low + (high - low).div_ceil(2);
            if self.cost(balance_out, mid)? <= amount_in {
                low = mid;
            } else {
                high = mid - 1;
            }
        }

        trace!(steps, amount_in, amount_out = low, "density ExactIn resolved");
        Ok(low)
    }

    fn exact_out(
        &self,
        _balance_in: u128,
        balance_out: u128,
        amount_out: u128,
    ) -> CurveResult<u128> {
        if amount_out == 0 {
            return Ok(0);
        }
        if amount_out >= balance_out {
            return Err(CurveError::InsufficientOutput {
                amount_out,
                balance_out,
            });
        }
        self.cost(balance_out, amount_out)
    }

    fn spot_price(&self, _balance_in: u128, balance_out: u128) -> CurveResult<u128> {
        let x = self.position(balance_out, Rounding::Down)?;
        apply_spread(self.price.price_at(x)?, self.spread_bps, Side::TakerPays)
    }
}
