//! Resolution policy.
//!
//! The signal-atomic search order is read from `CWIDTH_SIG_ATOMIC_ORDER`:
//! - `legacy` (default): `char, int, long, short, long long`, the order
//!   existing generated headers were built with.
//! - `rank`: `char, short, int, long, long long`, the rank order every other
//!   domain uses.
//!
//! The two only disagree when `short` and `int` share the atomic width.

use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::WidthError;
use crate::kind::NativeKind;

/// Variable selecting the signal-atomic order.
pub const SIG_ATOMIC_ORDER_VAR: &str = "CWIDTH_SIG_ATOMIC_ORDER";

const LEGACY_SIG_ATOMIC_ORDER: [NativeKind; 5] = [
    NativeKind::Char,
    NativeKind::Int,
    NativeKind::Long,
    NativeKind::Short,
    NativeKind::LongLong,
];

/// Candidate order for `sig_atomic_t`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigAtomicOrder {
    #[default]
    Legacy,
    Rank,
}

impl FromStr for SigAtomicOrder {
    type Err = WidthError;

    /// Strict parse: anything but `legacy` or `rank` (and their aliases) is
    /// rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "rank" | "ranked" | "corrected" => Ok(Self::Rank),
            _ => Err(WidthError::InvalidParameter {
                param: String::from("sig_atomic_order"),
                value: s.to_string(),
            }),
        }
    }
}

impl SigAtomicOrder {
    /// Parse from string (case-insensitive). Unknown values fall back to
    /// [`SigAtomicOrder::Legacy`].
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "rank" | "ranked" | "corrected" => Self::Rank,
            _ => Self::Legacy,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Rank => "rank",
        }
    }

    #[must_use]
    pub fn order(self) -> &'static [NativeKind] {
        match self {
            Self::Legacy => &LEGACY_SIG_ATOMIC_ORDER,
            Self::Rank => &NativeKind::ALL,
        }
    }
}

/// Knobs that change which kind a canonical name resolves to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Policy {
    pub sig_atomic_order: SigAtomicOrder,
}

impl Policy {
    #[must_use]
    pub const fn new(sig_atomic_order: SigAtomicOrder) -> Self {
        Self { sig_atomic_order }
    }

    /// Policy configured by the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(sig_atomic_order())
    }

    /// Like [`Policy::from_env`], but reads the variable now and rejects
    /// values that are not a known order. Unset means the default.
    pub fn try_from_env() -> Result<Self, WidthError> {
        Self::from_var(std::env::var(SIG_ATOMIC_ORDER_VAR).ok().as_deref())
    }

    /// Policy for an optional `CWIDTH_SIG_ATOMIC_ORDER` value.
    pub fn from_var(value: Option<&str>) -> Result<Self, WidthError> {
        value
            .map_or(Ok(SigAtomicOrder::default()), str::parse)
            .map(Self::new)
    }
}

// Atomic cache: 0=unresolved, 1=Legacy, 2=Rank.
static CACHED_ORDER: AtomicU8 = AtomicU8::new(0);

const ORDER_UNRESOLVED: u8 = 0;
const ORDER_LEGACY: u8 = 1;
const ORDER_RANK: u8 = 2;

fn order_to_u8(order: SigAtomicOrder) -> u8 {
    match order {
        SigAtomicOrder::Legacy => ORDER_LEGACY,
        SigAtomicOrder::Rank => ORDER_RANK,
    }
}

fn u8_to_order(v: u8) -> SigAtomicOrder {
    match v {
        ORDER_RANK => SigAtomicOrder::Rank,
        _ => SigAtomicOrder::Legacy,
    }
}

/// Configured signal-atomic order (reads the environment on first call,
/// cached for the life of the process).
#[must_use]
pub fn sig_atomic_order() -> SigAtomicOrder {
    let cached = CACHED_ORDER.load(Ordering::Acquire);
    if cached != ORDER_UNRESOLVED {
        return u8_to_order(cached);
    }

    let order = std::env::var(SIG_ATOMIC_ORDER_VAR)
        .map(|v| SigAtomicOrder::from_str_loose(&v))
        .unwrap_or_default();
    // First writer wins so every caller observes one value.
    match CACHED_ORDER.compare_exchange(
        ORDER_UNRESOLVED,
        order_to_u8(order),
        Ordering::AcqRel,
        Ordering::Acquire,
    ) {
        Ok(_) => order,
        Err(existing) => u8_to_order(existing),
    }
}
