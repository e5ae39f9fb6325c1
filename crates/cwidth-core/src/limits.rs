//! Limit Synthesizer.
//!
//! Bounds of a `w`-bit two's-complement integer are built from
//! `half = 2^(w-2) - 1`:
//!
//! ```text
//! min  = half * -2 - 2     = -2^(w-1)
//! max  = half *  2 + 1     =  2^(w-1) - 1
//! umax = half *  4 + 3     =  2^w - 1
//! ```
//!
//! Only `w - 2` bits are ever shifted and every partial product stays inside
//! the range of a `w`-bit value, so the same expression is valid C for the
//! target type without relying on a literal for the most negative value.
//! Intermediates here are 128 bits wide, which bounds `w` at 128.

use serde::{Deserialize, Serialize};

use crate::error::WidthError;
use crate::kind::NativeKind;

pub const MIN_WIDTH: u32 = 2;
pub const MAX_WIDTH: u32 = 128;

/// Bounds for one `(width, signed)` pair. Never stored in the registry;
/// recomputed from the width on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LimitSet {
    pub width: u32,
    pub signed: bool,
    /// Smallest value; `0` for unsigned sets.
    pub min: i128,
    /// Largest value of the type itself.
    pub max: u128,
    /// Largest value of the unsigned type of the same width.
    pub umax: u128,
}

impl LimitSet {
    /// Largest value as a signed integer, when it fits in `i128`.
    #[must_use]
    pub fn max_signed(&self) -> Option<i128> {
        i128::try_from(self.max).ok()
    }

    /// Whether `value` is representable.
    #[must_use]
    pub fn contains(&self, value: i128) -> bool {
        value >= self.min && u128::try_from(value).map_or(true, |v| v <= self.max)
    }
}

/// Bounds of a `width`-bit integer.
///
/// Unsigned sets never evaluate the signed identities.
pub fn limits(width: u32, signed: bool) -> Result<LimitSet, WidthError> {
    if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
        return Err(WidthError::Domain { width });
    }
    let umax = unsigned_max(width);
    if !signed {
        return Ok(LimitSet {
            width,
            signed,
            min: 0,
            max: umax,
            umax,
        });
    }

    let half: i128 = (1_i128 << (width - 2)) - 1;
    let min = half * -2 - 2;
    let max = half * 2 + 1;
    Ok(LimitSet {
        width,
        signed,
        min,
        max: max.unsigned_abs(),
        umax,
    })
}

fn unsigned_max(width: u32) -> u128 {
    let half: u128 = (1_u128 << (width - 2)) - 1;
    half * 4 + 3
}

/// Overflow-safe C expressions for a bound set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitExpr {
    pub min: String,
    pub max: String,
    pub umax: String,
}

/// Render the identities as C constant expressions typed by `kind`.
///
/// The shift operand carries the kind's literal suffix so the whole
/// expression is evaluated in the target type.
pub fn c_expressions(kind: NativeKind, width: u32) -> Result<LimitExpr, WidthError> {
    if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
        return Err(WidthError::Domain { width });
    }
    let one = format!("1{}", kind.literal_suffix(true));
    let uone = format!("1{}", kind.literal_suffix(false));
    Ok(LimitExpr {
        min: format!("((({one} << ({width}-2)) - 1) * -2 - 2)"),
        max: format!("((({one} << ({width}-2)) - 1) * 2 + 1)"),
        umax: format!("((({uone} << ({width}-2)) - 1) * 4 + 3)"),
    })
}
