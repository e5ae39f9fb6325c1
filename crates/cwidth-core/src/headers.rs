//! Collaborator headers.
//!
//! Each header states which descriptor parameters it needs and which
//! canonical names it declares. Several headers declare the same name
//! (`size_t` appears in six of them); they all bind through one registry,
//! so the declarations converge or the table fails.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::env::Param;
use crate::error::WidthError;

const NATIVE: [Param; 5] = [
    Param::Char,
    Param::Short,
    Param::Int,
    Param::Long,
    Param::LongLong,
];

const STDINT_PARAMS: [Param; 11] = [
    Param::Char,
    Param::Short,
    Param::Int,
    Param::Long,
    Param::LongLong,
    Param::Intptr,
    Param::Size,
    Param::Ptrdiff,
    Param::SigAtomic,
    Param::Wchar,
    Param::Wint,
];

const STDINT_TYPES: [&str; 28] = [
    "int8_t",
    "uint8_t",
    "int_least8_t",
    "uint_least8_t",
    "int_fast8_t",
    "uint_fast8_t",
    "int16_t",
    "uint16_t",
    "int_least16_t",
    "uint_least16_t",
    "int_fast16_t",
    "uint_fast16_t",
    "int32_t",
    "uint32_t",
    "int_least32_t",
    "uint_least32_t",
    "int_fast32_t",
    "uint_fast32_t",
    "int64_t",
    "uint64_t",
    "int_least64_t",
    "uint_least64_t",
    "int_fast64_t",
    "uint_fast64_t",
    "intmax_t",
    "uintmax_t",
    "intptr_t",
    "uintptr_t",
];

const STDINT_BOUNDS: [&str; 33] = [
    "int8_t",
    "uint8_t",
    "int_least8_t",
    "uint_least8_t",
    "int_fast8_t",
    "uint_fast8_t",
    "int16_t",
    "uint16_t",
    "int_least16_t",
    "uint_least16_t",
    "int_fast16_t",
    "uint_fast16_t",
    "int32_t",
    "uint32_t",
    "int_least32_t",
    "uint_least32_t",
    "int_fast32_t",
    "uint_fast32_t",
    "int64_t",
    "uint64_t",
    "int_least64_t",
    "uint_least64_t",
    "int_fast64_t",
    "uint_fast64_t",
    "intmax_t",
    "uintmax_t",
    "intptr_t",
    "uintptr_t",
    "ptrdiff_t",
    "sig_atomic_t",
    "size_t",
    "wchar_t",
    "wint_t",
];

/// Constants a header publishes beyond its types' bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extra {
    /// `CHAR_BIT`, `INT_MAX` and the rest of the native bounds.
    NativeLimits,
    /// `WEOF`.
    Weof,
    /// `RAND_MAX`, the largest `int`.
    RandMax,
    /// `INTn_C` and friends.
    LiteralMacros,
    /// `PRIdN`, `SCNxMAX` and friends.
    FormatMacros,
}

/// Header that consumes resolved types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Header {
    Limits,
    Stdint,
    Inttypes,
    Stddef,
    Signal,
    Wchar,
    Wctype,
    Time,
    Stdio,
    Stdlib,
    String,
}

impl Header {
    pub const ALL: [Header; 11] = [
        Header::Limits,
        Header::Stdint,
        Header::Inttypes,
        Header::Stddef,
        Header::Signal,
        Header::Wchar,
        Header::Wctype,
        Header::Time,
        Header::Stdio,
        Header::Stdlib,
        Header::String,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Limits => "limits",
            Self::Stdint => "stdint",
            Self::Inttypes => "inttypes",
            Self::Stddef => "stddef",
            Self::Signal => "signal",
            Self::Wchar => "wchar",
            Self::Wctype => "wctype",
            Self::Time => "time",
            Self::Stdio => "stdio",
            Self::Stdlib => "stdlib",
            Self::String => "string",
        }
    }

    /// File name, e.g. `stdint.h`.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.h", self.name())
    }

    /// Parameters that must be present before anything is declared.
    #[must_use]
    pub const fn requires(self) -> &'static [Param] {
        match self {
            Self::Limits => &NATIVE,
            Self::Stdint | Self::Inttypes => &STDINT_PARAMS,
            Self::Stddef => &[
                Param::Int,
                Param::Long,
                Param::LongLong,
                Param::Ptrdiff,
                Param::Size,
                Param::Wchar,
            ],
            Self::Signal => &[
                Param::Char,
                Param::Short,
                Param::Int,
                Param::Long,
                Param::LongLong,
                Param::SigAtomic,
            ],
            Self::Wchar => &[
                Param::Int,
                Param::Long,
                Param::LongLong,
                Param::Wint,
                Param::Wchar,
                Param::Size,
            ],
            Self::Wctype => &[
                Param::Short,
                Param::Int,
                Param::Long,
                Param::LongLong,
                Param::Wctrans,
                Param::Wctype,
                Param::Wint,
            ],
            Self::Time => &[
                Param::Short,
                Param::Int,
                Param::Long,
                Param::LongLong,
                Param::Clock,
                Param::Size,
                Param::Time,
            ],
            Self::Stdio | Self::String => &[
                Param::Short,
                Param::Int,
                Param::Long,
                Param::LongLong,
                Param::Size,
            ],
            Self::Stdlib => &[
                Param::Short,
                Param::Int,
                Param::Long,
                Param::LongLong,
                Param::Size,
                Param::Wchar,
            ],
        }
    }

    /// Canonical names the header typedefs, in emission order.
    #[must_use]
    pub const fn declares(self) -> &'static [&'static str] {
        match self {
            Self::Limits => &[],
            Self::Stdint | Self::Inttypes => &STDINT_TYPES,
            Self::Stddef => &["ptrdiff_t", "size_t", "wchar_t"],
            Self::Signal => &["sig_atomic_t"],
            Self::Wchar => &["wint_t", "wchar_t", "size_t"],
            Self::Wctype => &["wint_t", "wctrans_t", "wctype_t"],
            Self::Time => &["clock_t", "time_t", "size_t"],
            Self::Stdio | Self::String => &["size_t"],
            Self::Stdlib => &["size_t", "wchar_t"],
        }
    }

    /// Canonical names whose bound constants the header defines.
    #[must_use]
    pub const fn bounds(self) -> &'static [&'static str] {
        match self {
            Self::Stdint | Self::Inttypes => &STDINT_BOUNDS,
            Self::Wchar => &["wchar_t"],
            Self::Limits
            | Self::Stddef
            | Self::Signal
            | Self::Wctype
            | Self::Time
            | Self::Stdio
            | Self::Stdlib
            | Self::String => &[],
        }
    }

    #[must_use]
    pub const fn extras(self) -> &'static [Extra] {
        match self {
            Self::Limits => &[Extra::NativeLimits],
            Self::Stdint => &[Extra::LiteralMacros],
            Self::Inttypes => &[Extra::LiteralMacros, Extra::FormatMacros],
            Self::Wchar | Self::Wctype => &[Extra::Weof],
            Self::Stdlib => &[Extra::RandMax],
            Self::Stddef | Self::Signal | Self::Time | Self::Stdio | Self::String => &[],
        }
    }

    /// Every canonical name the header needs resolved.
    pub fn needs(self) -> impl Iterator<Item = &'static str> {
        let weof = self.extras().contains(&Extra::Weof).then_some("wint_t");
        self.declares()
            .iter()
            .chain(self.bounds())
            .copied()
            .chain(weof)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Header {
    type Err = WidthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let stem = lowered.strip_suffix(".h").unwrap_or(&lowered);
        Self::ALL
            .into_iter()
            .find(|header| header.name() == stem)
            .ok_or_else(|| WidthError::InvalidParameter {
                param: String::from("header"),
                value: s.to_string(),
            })
    }
}
