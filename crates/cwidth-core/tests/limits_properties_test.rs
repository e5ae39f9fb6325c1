//! Integration test: limit synthesis against independently computed bounds.
//!
//! Run: cargo test -p cwidth-core --test limits_properties_test

use cwidth_core::limits::{MAX_WIDTH, MIN_WIDTH, c_expressions, limits};
use cwidth_core::{
    Bound, EnvironmentDescriptor, Header, NativeKind, Param, Policy, Preset, TypeRegistry,
    TypeTable, WidthError,
};

fn pow2(exp: u32) -> u128 {
    1_u128 << exp
}

#[test]
fn standard_widths_match_power_of_two_bounds() {
    for width in [8_u32, 16, 32, 64] {
        let signed = limits(width, true).unwrap();
        assert_eq!(signed.min, -(pow2(width - 1) as i128), "min {width}");
        assert_eq!(signed.max, pow2(width - 1) - 1, "max {width}");
        assert_eq!(signed.umax, pow2(width) - 1, "umax {width}");

        let unsigned = limits(width, false).unwrap();
        assert_eq!(unsigned.min, 0);
        assert_eq!(unsigned.max, pow2(width) - 1);
        assert_eq!(unsigned.umax, signed.umax);
    }
}

#[test]
fn standard_widths_match_rust_primitives() {
    let s8 = limits(8, true).unwrap();
    assert_eq!((s8.min, s8.max), (i128::from(i8::MIN), i8::MAX as u128));
    let s16 = limits(16, true).unwrap();
    assert_eq!((s16.min, s16.umax), (i128::from(i16::MIN), u128::from(u16::MAX)));
    let s32 = limits(32, true).unwrap();
    assert_eq!((s32.min, s32.umax), (i128::from(i32::MIN), u128::from(u32::MAX)));
    let s64 = limits(64, true).unwrap();
    assert_eq!(s64.min, i128::from(i64::MIN));
    assert_eq!(s64.max, i64::MAX as u128);
    assert_eq!(s64.umax, u128::from(u64::MAX));
}

#[test]
fn every_supported_width_is_consistent() {
    for width in MIN_WIDTH..=MAX_WIDTH {
        let set = limits(width, true).unwrap();
        // max - min + 1 == umax + 1 == 2^width, checked without overflow.
        assert_eq!(set.max + set.min.unsigned_abs(), set.umax, "width {width}");
        assert_eq!(set.min.unsigned_abs(), set.max + 1, "width {width}");
    }
}

#[test]
fn domain_errors_are_reported() {
    for width in [0, 1, MAX_WIDTH + 1, u32::MAX] {
        assert_eq!(limits(width, true), Err(WidthError::Domain { width }));
        assert_eq!(limits(width, false), Err(WidthError::Domain { width }));
    }
}

#[test]
fn c_expressions_match_header_spelling() {
    let expr = c_expressions(NativeKind::Long, 32).unwrap();
    assert_eq!(expr.min, "(((1L << (32-2)) - 1) * -2 - 2)");
    assert_eq!(expr.max, "(((1L << (32-2)) - 1) * 2 + 1)");
    assert_eq!(expr.umax, "(((1UL << (32-2)) - 1) * 4 + 3)");
}

// ---------------------------------------------------------------------------
// Emitted expressions evaluated under C promotion rules
// ---------------------------------------------------------------------------

/// Type of an integer literal with `suffix` on the target: (width, signed).
fn literal_type(descriptor: &EnvironmentDescriptor, suffix: &str) -> (u32, bool) {
    let param = match suffix.trim_start_matches('U') {
        "" => Param::Int,
        "L" => Param::Long,
        "LL" => Param::LongLong,
        other => panic!("unexpected literal suffix {other:?}"),
    };
    (descriptor.width(param).unwrap(), !suffix.starts_with('U'))
}

/// Apply one arithmetic step in a type of `width` bits. Signed overflow is
/// an error; unsigned arithmetic wraps.
fn step(value: i128, (width, signed): (u32, bool)) -> Result<i128, String> {
    if signed {
        let lo = -(1_i128 << (width - 1));
        let hi = (1_i128 << (width - 1)) - 1;
        if value < lo || value > hi {
            return Err(format!("{value} overflows a signed {width}-bit type"));
        }
        Ok(value)
    } else {
        Ok(value.rem_euclid(1_i128 << width))
    }
}

/// Evaluate the expression shapes the synthesizer emits: plain decimals,
/// `(-1<sfx>)` and `(((1<sfx> << (w-2)) - 1) * k + c)`.
fn eval_c(descriptor: &EnvironmentDescriptor, expr: &str) -> Result<i128, String> {
    if let Ok(value) = expr.parse::<i128>() {
        return Ok(value);
    }
    if let Some(suffix) = expr.strip_prefix("(-1").and_then(|rest| rest.strip_suffix(')')) {
        return step(-1, literal_type(descriptor, suffix));
    }
    let rest = expr
        .strip_prefix("(((1")
        .ok_or_else(|| format!("unrecognized expression {expr:?}"))?;
    let (suffix, rest) = rest.split_once(" << (").ok_or("missing shift")?;
    let (shift, rest) = rest.split_once("-2)) - 1) * ").ok_or("missing shift width")?;
    let rest = rest.strip_suffix(')').ok_or("missing close paren")?;
    let parts: Vec<&str> = rest.split_whitespace().collect();
    let [k, op, c] = parts.as_slice() else {
        return Err(format!("unrecognized tail {rest:?}"));
    };
    let ty = literal_type(descriptor, suffix);
    let shift: u32 = shift.parse().map_err(|_| "bad shift")?;
    let k: i128 = k.parse().map_err(|_| "bad multiplier")?;
    let c: i128 = c.parse().map_err(|_| "bad addend")?;
    if shift - 2 >= ty.0 - u32::from(ty.1) {
        return Err(format!("shift by {} overflows the literal type", shift - 2));
    }
    let value = step(1_i128 << (shift - 2), ty)?;
    let value = step(value - 1, ty)?;
    let value = step(value * k, ty)?;
    match *op {
        "+" => step(value + c, ty),
        "-" => step(value - c, ty),
        other => Err(format!("unexpected operator {other:?}")),
    }
}

fn bound_value(bound: Bound) -> i128 {
    match bound {
        Bound::Signed(v) => v,
        Bound::Unsigned(v) => i128::try_from(v).unwrap(),
    }
}

fn assert_expressions_match(label: &str, descriptor: &EnvironmentDescriptor) {
    let table = TypeTable::resolve(
        descriptor,
        Policy::default(),
        &TypeRegistry::new(),
        &Header::ALL,
    )
    .unwrap();
    for constant in table.all_constants() {
        let evaluated = eval_c(descriptor, &constant.expr)
            .unwrap_or_else(|e| panic!("{label} {}: {e}", constant.name));
        assert_eq!(
            evaluated,
            bound_value(constant.value),
            "{label} {} = {}",
            constant.name,
            constant.expr
        );
    }
}

#[test]
fn every_preset_expression_evaluates_to_its_value() {
    for preset in Preset::ALL {
        assert_expressions_match(preset.name(), &preset.descriptor());
    }
}

#[test]
fn narrow_kinds_survive_integer_promotion() {
    // 16-bit wide characters land on `short`; unsigned plain char exercises
    // the `char` maxima.
    let llp64 = Preset::Llp64.descriptor().with_char_signed(false);
    let table = TypeTable::resolve(
        &llp64,
        Policy::default(),
        &TypeRegistry::new(),
        &[Header::Wchar, Header::Limits],
    )
    .unwrap();
    assert_eq!(table.kind_of("wint_t"), Some(NativeKind::Short));
    let weof = table.constant("WEOF").unwrap();
    assert_eq!(weof.value, Bound::Unsigned(65_535));
    assert_eq!(eval_c(&llp64, &weof.expr), Ok(65_535));
    // What the old `(-1U)` spelling would have produced.
    assert_eq!(eval_c(&llp64, "(-1U)"), Ok(4_294_967_295));

    assert_expressions_match("llp64/unsigned char", &llp64);
}
