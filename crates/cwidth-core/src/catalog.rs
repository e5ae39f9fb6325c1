//! Declarative table of canonical type names.
//!
//! Every portable name consumers can ask for is one [`CanonicalType`] row:
//! a resolution [`Rule`], a fixed signedness, and the prefix of the bound
//! constants it owns. One pure function per rule turns a row into a
//! [`ResolvedType`]; nothing here branches on the target.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::config::Policy;
use crate::derived::Domain;
use crate::env::{EnvironmentDescriptor, Param};
use crate::error::WidthError;
use crate::kind::NativeKind;
use crate::limits::{c_expressions, limits};
use crate::resolve::{
    Family, ResolvedType, exact_order, least_order, resolve, resolve_at_least,
};

/// How a canonical name picks its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Rule {
    /// `intN_t`: exact width, absent when no kind matches.
    Exact { width: u32 },
    /// `int_leastN_t`: exact width, else first kind at least as wide.
    Least { width: u32 },
    /// `int_fastN_t`: same kind as the least type.
    Fast { width: u32 },
    /// `intmax_t`: always `long long`.
    Max,
    /// Pointer, size, character and clock domains.
    Domain { domain: Domain },
}

impl Rule {
    /// Family the rule resolves under, if it is a width family.
    #[must_use]
    pub const fn family(self) -> Option<Family> {
        match self {
            Self::Exact { .. } => Some(Family::Exact),
            Self::Least { .. } => Some(Family::Least),
            Self::Fast { .. } => Some(Family::Fast),
            Self::Max | Self::Domain { .. } => None,
        }
    }
}

/// One canonical type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalType {
    pub name: &'static str,
    pub rule: Rule,
    pub signed: bool,
    /// Prefix of the owned bound constants (`INT16` gives `INT16_MIN`...).
    pub bounds: Option<&'static str>,
    /// Unsigned types that still publish a `_MIN` of zero.
    pub zero_min: bool,
    /// Literal-suffix constructor macro, e.g. `INT64_C`.
    pub literal_macro: Option<&'static str>,
}

const fn row(
    name: &'static str,
    rule: Rule,
    signed: bool,
    bounds: Option<&'static str>,
    literal_macro: Option<&'static str>,
) -> CanonicalType {
    CanonicalType {
        name,
        rule,
        signed,
        bounds,
        zero_min: false,
        literal_macro,
    }
}

const fn domain(domain: Domain, bounds: Option<&'static str>, zero_min: bool) -> CanonicalType {
    CanonicalType {
        name: domain.type_name(),
        rule: Rule::Domain { domain },
        signed: domain.signed(),
        bounds,
        zero_min,
        literal_macro: None,
    }
}

macro_rules! width_family {
    ($w:literal) => {
        [
            row(
                concat!("int", $w, "_t"),
                Rule::Exact { width: $w },
                true,
                Some(concat!("INT", $w)),
                Some(concat!("INT", $w, "_C")),
            ),
            row(
                concat!("uint", $w, "_t"),
                Rule::Exact { width: $w },
                false,
                Some(concat!("UINT", $w)),
                Some(concat!("UINT", $w, "_C")),
            ),
            row(
                concat!("int_least", $w, "_t"),
                Rule::Least { width: $w },
                true,
                Some(concat!("INT_LEAST", $w)),
                None,
            ),
            row(
                concat!("uint_least", $w, "_t"),
                Rule::Least { width: $w },
                false,
                Some(concat!("UINT_LEAST", $w)),
                None,
            ),
            row(
                concat!("int_fast", $w, "_t"),
                Rule::Fast { width: $w },
                true,
                Some(concat!("INT_FAST", $w)),
                None,
            ),
            row(
                concat!("uint_fast", $w, "_t"),
                Rule::Fast { width: $w },
                false,
                Some(concat!("UINT_FAST", $w)),
                None,
            ),
        ]
    };
}

const W8: [CanonicalType; 6] = width_family!(8);
const W16: [CanonicalType; 6] = width_family!(16);
const W32: [CanonicalType; 6] = width_family!(32);
const W64: [CanonicalType; 6] = width_family!(64);

const OTHERS: [CanonicalType; 13] = [
    row(
        "intmax_t",
        Rule::Max,
        true,
        Some("INTMAX"),
        Some("INTMAX_C"),
    ),
    row(
        "uintmax_t",
        Rule::Max,
        false,
        Some("UINTMAX"),
        Some("UINTMAX_C"),
    ),
    domain(Domain::Intptr, Some("INTPTR"), false),
    domain(Domain::Uintptr, Some("UINTPTR"), false),
    domain(Domain::Size, Some("SIZE"), false),
    domain(Domain::Ptrdiff, Some("PTRDIFF"), false),
    domain(Domain::SigAtomic, Some("SIG_ATOMIC"), false),
    domain(Domain::Wchar, Some("WCHAR"), true),
    domain(Domain::Wint, Some("WINT"), true),
    domain(Domain::Wctrans, None, false),
    domain(Domain::Wctype, None, false),
    domain(Domain::Clock, None, false),
    domain(Domain::Time, None, false),
];

/// Every canonical type, in declaration order.
pub fn catalog() -> impl Iterator<Item = &'static CanonicalType> {
    W8.iter()
        .chain(W16.iter())
        .chain(W32.iter())
        .chain(W64.iter())
        .chain(OTHERS.iter())
}

/// Look up a row by canonical name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static CanonicalType> {
    catalog().find(|ty| ty.name == name)
}

impl CanonicalType {
    /// Resolve against a descriptor. `Ok(None)` means an exact-width type
    /// that the target cannot provide; the header simply omits it.
    pub fn resolve(
        &self,
        descriptor: &EnvironmentDescriptor,
        policy: &Policy,
    ) -> Result<Option<ResolvedType>, WidthError> {
        let kind = match self.rule {
            Rule::Exact { width } => {
                match resolve(descriptor, width, Family::Exact, exact_order(width)) {
                    Ok(kind) => kind,
                    Err(WidthError::Configuration { .. }) => return Ok(None),
                    Err(other) => return Err(other),
                }
            }
            Rule::Least { width } | Rule::Fast { width } => {
                resolve_at_least(descriptor, width, exact_order(width), least_order(width))?
            }
            Rule::Max => {
                descriptor.require(Param::LongLong)?;
                NativeKind::LongLong
            }
            Rule::Domain { domain } => {
                return domain.resolve(descriptor, policy).map(Some);
            }
        };
        ResolvedType::new(self.name, kind, self.signed, descriptor).map(Some)
    }

    /// Bound constants owned by this type once resolved.
    ///
    /// Values come from the realizing kind's width, so a least type on a
    /// 36-bit machine publishes 36-bit bounds. Fast constants alias the
    /// matching least constants.
    pub fn constants(&self, resolved: &ResolvedType) -> Result<Vec<BoundConstant>, WidthError> {
        let Some(prefix) = self.bounds else {
            return Ok(Vec::new());
        };
        let set = limits(resolved.width, self.signed)?;
        let expr = c_expressions(resolved.kind, resolved.width)?;
        let alias_prefix = match self.rule {
            Rule::Fast { .. } => Some(prefix.replacen("FAST", "LEAST", 1)),
            _ => None,
        };
        let alias = |suffix: &str| alias_prefix.as_ref().map(|p| format!("{p}_{suffix}"));

        let mut out = Vec::with_capacity(2);
        if self.signed {
            out.push(BoundConstant {
                name: format!("{prefix}_MIN"),
                value: Bound::Signed(set.min),
                expr: expr.min,
                alias_of: alias("MIN"),
            });
            out.push(BoundConstant {
                name: format!("{prefix}_MAX"),
                value: Bound::Unsigned(set.max),
                expr: expr.max,
                alias_of: alias("MAX"),
            });
        } else {
            if self.zero_min {
                out.push(BoundConstant {
                    name: format!("{prefix}_MIN"),
                    value: Bound::Unsigned(0),
                    expr: String::from("0"),
                    alias_of: None,
                });
            }
            out.push(BoundConstant {
                name: format!("{prefix}_MAX"),
                value: Bound::Unsigned(set.umax),
                expr: expr.umax,
                alias_of: alias("MAX"),
            });
        }
        Ok(out)
    }

    /// Literal-suffix constructor, for types that have one.
    #[must_use]
    pub fn literal(&self, resolved: &ResolvedType) -> Option<LiteralMacro> {
        self.literal_macro.map(|name| LiteralMacro {
            name: name.to_string(),
            suffix: resolved.literal_suffix().to_string(),
        })
    }
}

/// Numeric value of a bound constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    Signed(i128),
    Unsigned(u128),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signed(v) => write!(f, "{v}"),
            Self::Unsigned(v) => write!(f, "{v}"),
        }
    }
}

// Decimal strings keep 64-bit and wider bounds exact for JSON consumers.
impl Serialize for Bound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Named bound constant, e.g. `INT16_MIN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BoundConstant {
    pub name: String,
    pub value: Bound,
    /// Overflow-safe C expression for the value.
    pub expr: String,
    /// Constant this one is defined as, when it is a family alias.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
}

impl BoundConstant {
    fn fixed(name: &str, value: Bound, expr: String) -> Self {
        Self {
            name: name.to_string(),
            value,
            expr,
            alias_of: None,
        }
    }

    /// Text after `#define NAME`.
    #[must_use]
    pub fn definition(&self) -> &str {
        self.alias_of.as_deref().unwrap_or(&self.expr)
    }
}

/// Literal-suffix constructor such as `UINT64_C(v) v ## ULL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LiteralMacro {
    pub name: String,
    pub suffix: String,
}

impl LiteralMacro {
    /// Attach the suffix to a literal's digits.
    #[must_use]
    pub fn apply(&self, literal: &str) -> String {
        format!("{literal}{}", self.suffix)
    }

    /// Replacement list of the C macro.
    #[must_use]
    pub fn definition(&self) -> String {
        if self.suffix.is_empty() {
            String::from("value")
        } else {
            format!("value ## {}", self.suffix)
        }
    }
}

/// `limits.h` constants for the native kinds.
pub const MB_LEN_MAX: u128 = 6;

/// Bounds of every native kind plus the `char` family.
pub fn native_constants(descriptor: &EnvironmentDescriptor) -> Result<Vec<BoundConstant>, WidthError> {
    let char_width = descriptor.require(Param::Char)?;
    let schar = limits(char_width, true)?;
    let char_expr = c_expressions(NativeKind::Char, char_width)?;

    let mut out = vec![
        BoundConstant::fixed(
            "CHAR_BIT",
            Bound::Unsigned(u128::from(char_width)),
            char_width.to_string(),
        ),
        BoundConstant::fixed("SCHAR_MIN", Bound::Signed(schar.min), char_expr.min.clone()),
        BoundConstant::fixed("SCHAR_MAX", Bound::Unsigned(schar.max), char_expr.max.clone()),
        BoundConstant::fixed("UCHAR_MAX", Bound::Unsigned(schar.umax), char_expr.umax.clone()),
    ];
    if descriptor.char_signed() {
        out.push(BoundConstant {
            alias_of: Some(String::from("SCHAR_MIN")),
            ..BoundConstant::fixed("CHAR_MIN", Bound::Signed(schar.min), char_expr.min)
        });
        out.push(BoundConstant {
            alias_of: Some(String::from("SCHAR_MAX")),
            ..BoundConstant::fixed("CHAR_MAX", Bound::Unsigned(schar.max), char_expr.max)
        });
    } else {
        out.push(BoundConstant::fixed(
            "CHAR_MIN",
            Bound::Unsigned(0),
            String::from("0"),
        ));
        out.push(BoundConstant {
            alias_of: Some(String::from("UCHAR_MAX")),
            ..BoundConstant::fixed("CHAR_MAX", Bound::Unsigned(schar.umax), char_expr.umax)
        });
    }
    out.push(BoundConstant::fixed(
        "MB_LEN_MAX",
        Bound::Unsigned(MB_LEN_MAX),
        MB_LEN_MAX.to_string(),
    ));

    for (kind, signed_prefix, unsigned_name) in [
        (NativeKind::Short, "SHRT", "USHRT_MAX"),
        (NativeKind::Int, "INT", "UINT_MAX"),
        (NativeKind::Long, "LONG", "ULONG_MAX"),
        (NativeKind::LongLong, "LLONG", "ULLONG_MAX"),
    ] {
        let width = descriptor.require(kind.param())?;
        let set = limits(width, true)?;
        let expr = c_expressions(kind, width)?;
        out.push(BoundConstant::fixed(
            &format!("{signed_prefix}_MIN"),
            Bound::Signed(set.min),
            expr.min,
        ));
        out.push(BoundConstant::fixed(
            &format!("{signed_prefix}_MAX"),
            Bound::Unsigned(set.max),
            expr.max,
        ));
        out.push(BoundConstant::fixed(
            unsigned_name,
            Bound::Unsigned(set.umax),
            expr.umax,
        ));
    }
    Ok(out)
}

/// `WEOF`: the all-ones value of `wint_t`.
///
/// `(-1U)` is only all-ones at `int` width or wider; a `wint_t` realized by
/// `char` or `short` gets its spelled-out unsigned maximum instead.
pub fn weof(wint: &ResolvedType) -> Result<BoundConstant, WidthError> {
    let set = limits(wint.width, false)?;
    let expr = if wint.kind < NativeKind::Int {
        c_expressions(wint.kind, wint.width)?.umax
    } else {
        format!("(-1{})", wint.literal_suffix())
    };
    Ok(BoundConstant::fixed("WEOF", Bound::Unsigned(set.umax), expr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Preset;

    #[test]
    fn catalog_names_are_unique() {
        let mut names: Vec<_> = catalog().map(|ty| ty.name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 37);
    }

    #[test]
    fn macro_rows_are_well_formed() {
        let ty = lookup("uint_fast32_t").unwrap();
        assert_eq!(ty.rule, Rule::Fast { width: 32 });
        assert!(!ty.signed);
        assert_eq!(ty.bounds, Some("UINT_FAST32"));
        assert_eq!(lookup("int64_t").unwrap().literal_macro, Some("INT64_C"));
        assert!(lookup("int128_t").is_none());
    }

    #[test]
    fn exact_type_absent_without_matching_kind() {
        let descriptor = Preset::Ilp32.descriptor().without(Param::LongLong);
        let ty = lookup("int64_t").unwrap();
        assert_eq!(ty.resolve(&descriptor, &Policy::default()), Ok(None));
        let least = lookup("int_least64_t").unwrap();
        assert!(matches!(
            least.resolve(&descriptor, &Policy::default()),
            Err(WidthError::Configuration { width: 64, .. })
        ));
    }

    #[test]
    fn fast_constants_alias_least() {
        let descriptor = Preset::Lp64.descriptor();
        let ty = lookup("int_fast16_t").unwrap();
        let resolved = ty.resolve(&descriptor, &Policy::default()).unwrap().unwrap();
        let constants = ty.constants(&resolved).unwrap();
        assert_eq!(constants[0].name, "INT_FAST16_MIN");
        assert_eq!(constants[0].alias_of.as_deref(), Some("INT_LEAST16_MIN"));
        assert_eq!(constants[0].definition(), "INT_LEAST16_MIN");
        assert_eq!(constants[1].value, Bound::Unsigned(32767));
    }

    #[test]
    fn wide_char_publishes_zero_min() {
        let descriptor = Preset::Lp64.descriptor();
        let ty = lookup("wchar_t").unwrap();
        let resolved = ty.resolve(&descriptor, &Policy::default()).unwrap().unwrap();
        let constants = ty.constants(&resolved).unwrap();
        let names: Vec<_> = constants.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["WCHAR_MIN", "WCHAR_MAX"]);
        assert_eq!(constants[1].value, Bound::Unsigned(u128::from(u32::MAX)));
    }

    #[test]
    fn literal_macros_use_kind_suffix() {
        let descriptor = Preset::Lp64.descriptor();
        let ty = lookup("uint64_t").unwrap();
        let resolved = ty.resolve(&descriptor, &Policy::default()).unwrap().unwrap();
        let literal = ty.literal(&resolved).unwrap();
        assert_eq!(literal.name, "UINT64_C");
        assert_eq!(literal.apply("42"), "42UL");
        assert_eq!(literal.definition(), "value ## UL");

        let int8 = lookup("int8_t").unwrap();
        let resolved = int8.resolve(&descriptor, &Policy::default()).unwrap().unwrap();
        assert_eq!(int8.literal(&resolved).unwrap().definition(), "value");
    }

    #[test]
    fn native_constants_follow_char_signedness() {
        let unsigned_char = Preset::Lp64.descriptor().with_char_signed(false);
        let constants = native_constants(&unsigned_char).unwrap();
        let char_max = constants.iter().find(|c| c.name == "CHAR_MAX").unwrap();
        assert_eq!(char_max.value, Bound::Unsigned(255));
        assert_eq!(char_max.definition(), "UCHAR_MAX");
        let char_min = constants.iter().find(|c| c.name == "CHAR_MIN").unwrap();
        assert_eq!(char_min.value, Bound::Unsigned(0));

        let signed_char = Preset::Lp64.descriptor();
        let constants = native_constants(&signed_char).unwrap();
        let char_min = constants.iter().find(|c| c.name == "CHAR_MIN").unwrap();
        assert_eq!(char_min.value, Bound::Signed(-128));
    }

    #[test]
    fn weof_uses_wint_suffix() {
        let wint = ResolvedType {
            name: String::from("wint_t"),
            kind: NativeKind::Int,
            width: 32,
            signed: false,
        };
        let weof = weof(&wint).unwrap();
        assert_eq!(weof.expr, "(-1U)");
        assert_eq!(weof.value, Bound::Unsigned(4_294_967_295));
    }

    #[test]
    fn weof_below_int_rank_spells_out_maximum() {
        let descriptor = Preset::Llp64.descriptor();
        let wint = Domain::Wint.resolve(&descriptor, &Policy::default()).unwrap();
        assert_eq!(wint.kind, NativeKind::Short);

        let weof = weof(&wint).unwrap();
        assert_eq!(weof.value, Bound::Unsigned(65_535));
        assert_eq!(weof.expr, "(((1U << (16-2)) - 1) * 4 + 3)");
        assert_eq!(weof.value, Bound::Unsigned(limits(16, false).unwrap().umax));
    }

    #[test]
    fn unsigned_plain_char_max_carries_expression() {
        let descriptor = Preset::Lp64.descriptor().with_char_signed(false);
        let constants = native_constants(&descriptor).unwrap();
        let char_max = constants.iter().find(|c| c.name == "CHAR_MAX").unwrap();
        assert_eq!(char_max.expr, "(((1U << (8-2)) - 1) * 4 + 3)");
        assert_eq!(char_max.alias_of.as_deref(), Some("UCHAR_MAX"));
        assert!(constants.iter().all(|c| !c.expr.is_empty()));
    }
}
