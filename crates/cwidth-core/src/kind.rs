//! Native integer kinds.
//!
//! The kinds are ordered by language rank (`char < short < int < long <
//! long long`). Rank is fixed; the bit width of each kind is not, and comes
//! from the [`EnvironmentDescriptor`](crate::env::EnvironmentDescriptor).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::env::Param;

/// One of the base integer categories of the C type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeKind {
    Char,
    Short,
    Int,
    Long,
    LongLong,
}

impl NativeKind {
    /// All kinds in rank order.
    pub const ALL: [NativeKind; 5] = [
        NativeKind::Char,
        NativeKind::Short,
        NativeKind::Int,
        NativeKind::Long,
        NativeKind::LongLong,
    ];

    /// Descriptor parameter holding this kind's bit width.
    #[must_use]
    pub const fn param(self) -> Param {
        match self {
            Self::Char => Param::Char,
            Self::Short => Param::Short,
            Self::Int => Param::Int,
            Self::Long => Param::Long,
            Self::LongLong => Param::LongLong,
        }
    }

    /// Bare C spelling of the kind.
    #[must_use]
    pub const fn c_name(self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::LongLong => "long long",
        }
    }

    /// C spelling with explicit signedness.
    ///
    /// `char` is the only kind whose plain spelling does not fix the sign, so
    /// the signed form spells `signed char`.
    #[must_use]
    pub const fn c_spelling(self, signed: bool) -> &'static str {
        match (self, signed) {
            (Self::Char, true) => "signed char",
            (Self::Char, false) => "unsigned char",
            (Self::Short, true) => "short",
            (Self::Short, false) => "unsigned short",
            (Self::Int, true) => "int",
            (Self::Int, false) => "unsigned int",
            (Self::Long, true) => "long",
            (Self::Long, false) => "unsigned long",
            (Self::LongLong, true) => "long long",
            (Self::LongLong, false) => "unsigned long long",
        }
    }

    /// Integer-literal suffix that gives a literal this kind's type.
    ///
    /// Kinds ranked below `int` promote to `int`, so they take no signed
    /// suffix and only `U` for the unsigned form.
    #[must_use]
    pub const fn literal_suffix(self, signed: bool) -> &'static str {
        match (self, signed) {
            (Self::Char | Self::Short | Self::Int, true) => "",
            (Self::Char | Self::Short | Self::Int, false) => "U",
            (Self::Long, true) => "L",
            (Self::Long, false) => "UL",
            (Self::LongLong, true) => "LL",
            (Self::LongLong, false) => "ULL",
        }
    }

    /// `printf`/`scanf` length modifier for this kind.
    #[must_use]
    pub const fn length_modifier(self) -> &'static str {
        match self {
            Self::Char => "hh",
            Self::Short => "h",
            Self::Int => "",
            Self::Long => "l",
            Self::LongLong => "ll",
        }
    }
}

impl fmt::Display for NativeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.c_name())
    }
}
