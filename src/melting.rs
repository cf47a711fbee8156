//! Melting value model
//!
//! A UTXO records its melt ratio `mr` (fixed point over `MR_SCALE`) at the
//! cycle change hash `cch`. Every cycle boundary since then removes
//! `1 / CYCLE_IN_LUGH` from the ratio:
//!
//! ```text
//! ratio  = mr - count / CYCLE_IN_LUGH        (0 when outside [0, 1])
//! melted = floor(value * ratio)
//! ```
//!
//! `count` is the position of `cch` in the wallet's most-recent-first CCH
//! list. Arithmetic is exact: the ratio is kept as a fraction and the product
//! is taken in `u128`.

use crate::constants::*;
use crate::types::*;

/// Exact melt ratio `num / den`, always within `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeltRatio {
    pub num: u64,
    pub den: u64,
}

impl MeltRatio {
    pub const ZERO: MeltRatio = MeltRatio {
        num: 0,
        den: MR_SCALE * CYCLE_IN_LUGH,
    };

    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// `floor(value * ratio)`
    pub fn apply(&self, value: u64) -> u64 {
        (value as u128 * self.num as u128 / self.den as u128) as u64
    }

    /// Smallest face value whose melted value covers `melted`;
    /// `None` when the ratio is zero
    pub fn face_value_for(&self, melted: u64) -> Option<u64> {
        if self.num == 0 {
            return None;
        }
        let face = (melted as u128 * self.den as u128 + self.num as u128 - 1) / self.num as u128;
        u64::try_from(face).ok()
    }

    /// Ratio for display only
    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

/// Cycles elapsed since `cch`; `None` when the list does not know it
pub fn cycles_elapsed(cch: &Hash, cch_list: &[Hash]) -> Option<usize> {
    cch_list.iter().position(|h| h == cch)
}

/// Ratio left after `count` cycles for a recorded `mr`
pub fn melt_ratio(mr: u64, count: usize) -> MeltRatio {
    let den = MR_SCALE as i128 * CYCLE_IN_LUGH as i128;
    let num = mr as i128 * CYCLE_IN_LUGH as i128 - count as i128 * MR_SCALE as i128;
    if num < 0 || num > den {
        return MeltRatio::ZERO;
    }
    MeltRatio {
        num: num as u64,
        den: den as u64,
    }
}

/// Current ratio of a UTXO, zero when its cycle is unknown (stale)
pub fn utxo_ratio(utxo: &Utxo, cch_list: &[Hash]) -> MeltRatio {
    match cycles_elapsed(&utxo.cch, cch_list) {
        Some(count) => melt_ratio(utxo.mr, count),
        None => MeltRatio::ZERO,
    }
}

/// Currently spendable value of a UTXO
pub fn melted_value(utxo: &Utxo, cch_list: &[Hash]) -> u64 {
    utxo_ratio(utxo, cch_list).apply(utxo.value())
}

/// Sum of melted values
pub fn total_melted_value(utxos: &[Utxo], cch_list: &[Hash]) -> u64 {
    utxos
        .iter()
        .map(|u| melted_value(u, cch_list) as u128)
        .sum::<u128>()
        .min(u64::MAX as u128) as u64
}

/// Shortest prefix of `utxos` (fully melted ones skipped) whose melted value
/// reaches `amount`; `None` when the whole set falls short.
pub fn required_list<'a>(utxos: &'a [Utxo], amount: u64, cch_list: &[Hash]) -> Option<Vec<&'a Utxo>> {
    let mut selected = Vec::new();
    let mut accumulated = 0u128;
    for utxo in utxos {
        if accumulated >= amount as u128 {
            break;
        }
        let melted = melted_value(utxo, cch_list);
        if melted == 0 {
            continue;
        }
        accumulated += melted as u128;
        selected.push(utxo);
    }
    (accumulated >= amount as u128).then_some(selected)
}
