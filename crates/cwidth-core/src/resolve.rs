//! Width Resolver.
//!
//! Maps a requested width plus a caller-chosen candidate order onto the
//! native kind that realizes it. Resolution reads only the descriptor and its
//! arguments; equal inputs always produce equal outputs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::env::EnvironmentDescriptor;
use crate::error::WidthError;
use crate::kind::NativeKind;

/// Matching rule applied to each candidate's descriptor width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// Width equals the request.
    Exact,
    /// First candidate whose width is at least the request.
    Least,
    /// Same answer as [`Family::Least`]; no per-architecture speed table is
    /// modeled.
    Fast,
}

impl Family {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Least => "least",
            Self::Fast => "fast",
        }
    }

    /// Whether a kind of `width` bits satisfies a `required`-bit request.
    #[must_use]
    pub const fn accepts(self, width: u32, required: u32) -> bool {
        match self {
            Self::Exact => width == required,
            Self::Least | Self::Fast => width >= required,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Exact-width preference. Among kinds sharing a width the later C
/// definitions used to win, which puts `int` ahead of `long` ahead of
/// `short`. `char` only realizes the 8-bit types.
pub const EXACT_ORDER: [NativeKind; 4] = [
    NativeKind::Int,
    NativeKind::Long,
    NativeKind::Short,
    NativeKind::LongLong,
];

/// Least-width search for 8-bit requests.
pub const LEAST8_ORDER: [NativeKind; 5] = [
    NativeKind::Char,
    NativeKind::Short,
    NativeKind::Int,
    NativeKind::Long,
    NativeKind::LongLong,
];

/// Least-width search for every wider request.
pub const LEAST_ORDER: [NativeKind; 4] = [
    NativeKind::Short,
    NativeKind::Int,
    NativeKind::Long,
    NativeKind::LongLong,
];

/// Exact candidates for a canonical `intN_t`.
#[must_use]
pub fn exact_order(width: u32) -> &'static [NativeKind] {
    if width == 8 {
        &[NativeKind::Char]
    } else {
        &EXACT_ORDER
    }
}

/// Least candidates for a canonical `int_leastN_t`.
#[must_use]
pub fn least_order(width: u32) -> &'static [NativeKind] {
    if width <= 8 { &LEAST8_ORDER } else { &LEAST_ORDER }
}

/// Pick the first kind in `order` whose descriptor width satisfies `family`.
///
/// Kinds missing from the descriptor are never candidates.
pub fn resolve(
    descriptor: &EnvironmentDescriptor,
    required_width: u32,
    family: Family,
    order: &[NativeKind],
) -> Result<NativeKind, WidthError> {
    order
        .iter()
        .copied()
        .find(|kind| {
            descriptor
                .width(kind.param())
                .is_some_and(|width| family.accepts(width, required_width))
        })
        .ok_or_else(|| WidthError::Configuration {
            width: required_width,
            family,
            tried: order.to_vec(),
        })
}

/// Exact match over `exact`, falling back to first-fit over `least`.
///
/// The exact and least families are alternate strategies: only the least
/// failure is reported.
pub fn resolve_at_least(
    descriptor: &EnvironmentDescriptor,
    required_width: u32,
    exact: &[NativeKind],
    least: &[NativeKind],
) -> Result<NativeKind, WidthError> {
    resolve(descriptor, required_width, Family::Exact, exact)
        .or_else(|_| resolve(descriptor, required_width, Family::Least, least))
}

/// A canonical name bound to a native kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedType {
    pub name: String,
    pub kind: NativeKind,
    pub width: u32,
    pub signed: bool,
}

impl ResolvedType {
    /// Bind `name` to `kind`, reading the width from the descriptor.
    pub fn new(
        name: impl Into<String>,
        kind: NativeKind,
        signed: bool,
        descriptor: &EnvironmentDescriptor,
    ) -> Result<Self, WidthError> {
        Ok(Self {
            name: name.into(),
            kind,
            width: descriptor.require(kind.param())?,
            signed,
        })
    }

    /// C spelling of the realizing type, e.g. `unsigned long`.
    #[must_use]
    pub fn c_type(&self) -> &'static str {
        self.kind.c_spelling(self.signed)
    }

    /// Literal suffix that types a literal as this type.
    #[must_use]
    pub fn literal_suffix(&self) -> &'static str {
        self.kind.literal_suffix(self.signed)
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} ({} bits)", self.name, self.c_type(), self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Param, Preset};

    fn scenario() -> EnvironmentDescriptor {
        EnvironmentDescriptor::new()
            .with_width(Param::Char, 8)
            .with_width(Param::Short, 16)
            .with_width(Param::Int, 32)
            .with_width(Param::Long, 32)
            .with_width(Param::LongLong, 64)
    }

    #[test]
    fn exact_sixteen_is_short() {
        let kind = resolve(&scenario(), 16, Family::Exact, exact_order(16)).unwrap();
        assert_eq!(kind, NativeKind::Short);
    }

    #[test]
    fn exact_sixty_four_is_long_long() {
        let kind = resolve(&scenario(), 64, Family::Exact, exact_order(64)).unwrap();
        assert_eq!(kind, NativeKind::LongLong);
    }

    #[test]
    fn exact_prefers_int_over_long_at_equal_width() {
        let kind = resolve(&scenario(), 32, Family::Exact, exact_order(32)).unwrap();
        assert_eq!(kind, NativeKind::Int);
        let lp64 = Preset::Lp64.descriptor();
        let kind = resolve(&lp64, 64, Family::Exact, exact_order(64)).unwrap();
        assert_eq!(kind, NativeKind::Long);
    }

    #[test]
    fn least_is_first_fit_not_best_fit() {
        let descriptor = scenario().without(Param::Short);
        let kind = resolve(&descriptor, 16, Family::Least, &LEAST_ORDER).unwrap();
        assert_eq!(kind, NativeKind::Int);

        let reversed = [NativeKind::LongLong, NativeKind::Int];
        let kind = resolve(&descriptor, 16, Family::Least, &reversed).unwrap();
        assert_eq!(kind, NativeKind::LongLong);
    }

    #[test]
    fn fast_matches_least() {
        let descriptor = scenario();
        for width in [8, 16, 24, 32, 48, 64] {
            assert_eq!(
                resolve(&descriptor, width, Family::Fast, least_order(width)),
                resolve(&descriptor, width, Family::Least, least_order(width)),
            );
        }
    }

    #[test]
    fn missing_long_long_fails_sixty_four_bit() {
        let descriptor = scenario().without(Param::LongLong);
        for family in [Family::Exact, Family::Least, Family::Fast] {
            let err = resolve(&descriptor, 64, family, &LEAST8_ORDER).unwrap_err();
            assert!(matches!(err, WidthError::Configuration { width: 64, .. }));
        }
        let err = resolve_at_least(&descriptor, 64, exact_order(64), least_order(64)).unwrap_err();
        assert_eq!(
            err,
            WidthError::Configuration {
                width: 64,
                family: Family::Least,
                tried: LEAST_ORDER.to_vec(),
            }
        );
    }

    #[test]
    fn at_least_falls_back_when_no_exact_kind() {
        // 36-bit machine: no exact 32, least picks the 36-bit int.
        let descriptor = EnvironmentDescriptor::new()
            .with_width(Param::Char, 9)
            .with_width(Param::Short, 18)
            .with_width(Param::Int, 36)
            .with_width(Param::Long, 36)
            .with_width(Param::LongLong, 72);
        let kind = resolve_at_least(&descriptor, 32, exact_order(32), least_order(32)).unwrap();
        assert_eq!(kind, NativeKind::Int);
        let kind = resolve_at_least(&descriptor, 8, exact_order(8), least_order(8)).unwrap();
        assert_eq!(kind, NativeKind::Char);
    }

    #[test]
    fn resolution_is_deterministic() {
        let descriptor = Preset::Llp64.descriptor();
        let first: Vec<_> = [8, 16, 32, 64]
            .map(|w| resolve(&descriptor, w, Family::Least, least_order(w)))
            .to_vec();
        let second: Vec<_> = [64, 32, 16, 8]
            .map(|w| resolve(&descriptor, w, Family::Least, least_order(w)))
            .into_iter()
            .rev()
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn resolved_type_reads_width_from_descriptor() {
        let ty = ResolvedType::new("int32_t", NativeKind::Int, true, &scenario()).unwrap();
        assert_eq!(ty.width, 32);
        assert_eq!(ty.c_type(), "int");
        assert_eq!(ty.to_string(), "int32_t = int (32 bits)");
        let unsigned = ResolvedType::new("uint64_t", NativeKind::LongLong, false, &scenario())
            .unwrap();
        assert_eq!(unsigned.literal_suffix(), "ULL");
    }
}
