//! Context-mixing model with secondary symbol estimation.
//!
//! Each byte is coded MSB first as 8 binary decisions. For every decision
//! three adaptive counters vote: an order-0 table keyed on the intra-byte
//! context, and an order-1 table consulted under both the previous byte and
//! the byte before that. Their fixed-weight mix is then refined through a
//! piecewise-linear SSE table: the mixed probability selects a segment of a
//! 17-knot curve, the two surrounding knots are interpolated, and the coder
//! is handed `p + 3·sse(p)` at the 18-bit scale.
//!
//! The SSE table keeps two planes selected by a run flag, so that long runs
//! (the BWT's bread and butter) learn a sharper remapping than mixed
//! contexts. The flag is frozen for all eight bits of a byte and recomputed
//! once the byte is known.

use crate::range_coder::{RangeDecoder, RangeEncoder};
use bcm_core::error::Result;
use std::io::{Read, Write};

/// Knots per SSE interpolation curve.
const SSE_KNOTS: usize = 17;

/// Adaptive probability cell.
///
/// `p / 2^16` estimates the chance of the next bit being 1. Updates move the
/// estimate a fixed fraction `2^-RATE` of the way toward the observed bit,
/// rounding toward it, so the value can never leave `[0, 65535]`.
#[derive(Debug, Clone, Copy)]
struct Counter<const RATE: u32> {
    p: u16,
}

impl<const RATE: u32> Counter<RATE> {
    fn new() -> Self {
        Self { p: 1 << 15 }
    }

    #[inline(always)]
    fn update(&mut self, bit: u32) {
        if bit != 0 {
            self.p += (self.p ^ 0xFFFF) >> RATE;
        } else {
            self.p -= self.p >> RATE;
        }
    }
}

/// The predictor: counter tables plus the byte-level mixing state.
///
/// Roughly 150 KiB of counters, allocated once per stream. Encoder and
/// decoder run the identical update schedule, so their tables stay in
/// lockstep as long as they agree on every coded bit.
#[derive(Debug)]
pub struct Model {
    /// Order-0 counters, keyed on the intra-byte context.
    order0: Vec<Counter<2>>,
    /// Order-1 counters, keyed on `(byte, intra-byte context)`.
    order1: Vec<Counter<4>>,
    /// SSE knots, two planes of `256 × 17`, contiguous.
    sse: Vec<Counter<6>>,
    /// Previous byte.
    c1: u8,
    /// Byte before the previous one.
    c2: u8,
    /// Consecutive equal-byte count feeding the run flag.
    run: u32,
    /// SSE plane for the next byte: 1 after three equal bytes in a row.
    run_flag: usize,
}

impl Model {
    /// Create a model in its initial state.
    ///
    /// The SSE planes start out as an identity mapping: knot `j` sits at
    /// `j · 4096`, except the last which saturates at 65535.
    pub fn new() -> Self {
        let mut sse = vec![Counter::new(); 2 * 256 * SSE_KNOTS];
        for (i, knot) in sse.iter_mut().enumerate() {
            let j = i % SSE_KNOTS;
            knot.p = if j == SSE_KNOTS - 1 {
                u16::MAX
            } else {
                (j as u16) << 12
            };
        }

        Self {
            order0: vec![Counter::new(); 256],
            order1: vec![Counter::new(); 256 * 256],
            sse,
            c1: 0,
            c2: 0,
            run: 0,
            run_flag: 0,
        }
    }

    /// Mix the three estimates for one decision and refine through SSE.
    ///
    /// Returns the 18-bit probability for the coder together with the SSE
    /// segment index, which the update step needs again.
    #[inline]
    fn predict(&self, ctx: usize) -> (u32, usize) {
        let p0 = u32::from(self.order0[ctx].p);
        let p1 = u32::from(self.order1[(usize::from(self.c1) << 8) | ctx].p);
        let p2 = u32::from(self.order1[(usize::from(self.c2) << 8) | ctx].p);
        let p = ((p0 + p1) * 7 + p2 + p2) >> 4;

        let j = (p >> 12) as usize;
        let base = ((self.run_flag << 8) | ctx) * SSE_KNOTS;
        let x1 = i32::from(self.sse[base + j].p);
        let x2 = i32::from(self.sse[base + j + 1].p);
        let sse_p = x1 + (((x2 - x1) * (p & 0xFFF) as i32) >> 12);

        (p + 3 * sse_p as u32, j)
    }

    /// Update the four counters that took part in one decision.
    ///
    /// The order-1 estimate under `c2` is consulted for mixing only.
    #[inline]
    fn update(&mut self, ctx: usize, j: usize, bit: u32) {
        self.order0[ctx].update(bit);
        self.order1[(usize::from(self.c1) << 8) | ctx].update(bit);
        let base = ((self.run_flag << 8) | ctx) * SSE_KNOTS;
        self.sse[base + j].update(bit);
        self.sse[base + j + 1].update(bit);
    }

    /// Fold a completed byte into the mixing state.
    ///
    /// The run flag computed here holds for all eight bits of the byte that
    /// follows; it never changes mid-byte.
    #[inline]
    fn rotate(&mut self, symbol: u8) {
        if symbol == self.c1 {
            self.run += 1;
        } else {
            self.run = 0;
        }
        self.c2 = self.c1;
        self.c1 = symbol;
        self.run_flag = usize::from(self.run > 2);
    }

    /// Encode one byte through the coder, MSB first.
    pub fn encode<W: Write>(&mut self, rc: &mut RangeEncoder<W>, byte: u8) -> Result<()> {
        let mut pending = u32::from(byte);
        let mut ctx = 1usize;
        while ctx < 256 {
            let bit = (pending >> 7) & 1;
            pending = (pending << 1) & 0xFF;

            let (p, j) = self.predict(ctx);
            rc.encode_bit(bit, p)?;
            self.update(ctx, j, bit);
            ctx = (ctx << 1) | bit as usize;
        }
        self.rotate((ctx - 256) as u8);
        Ok(())
    }

    /// Decode one byte through the coder.
    pub fn decode<R: Read>(&mut self, rc: &mut RangeDecoder<R>) -> Result<u8> {
        let mut ctx = 1usize;
        while ctx < 256 {
            let (p, j) = self.predict(ctx);
            let bit = rc.decode_bit(p)?;
            self.update(ctx, j, bit);
            ctx = (ctx << 1) | bit as usize;
        }
        let symbol = (ctx - 256) as u8;
        self.rotate(symbol);
        Ok(symbol)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}
