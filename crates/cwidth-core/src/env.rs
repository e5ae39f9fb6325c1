//! Environment Descriptor: the externally supplied bit widths of a target.
//!
//! A descriptor is built once per target configuration and never mutated
//! afterwards; builder methods consume and return the value.
//!
//! Descriptors deserialize from a flat JSON object whose keys are parameter
//! names and whose values are either a bare width or a full spec:
//!
//! ```json
//! { "char": { "width": 8, "signed": false }, "short": 16, "int": 32 }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WidthError;

/// Named width parameter of the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    Char,
    Short,
    Int,
    Long,
    LongLong,
    Ptrdiff,
    Size,
    Intptr,
    Wchar,
    Wint,
    Wctrans,
    Wctype,
    SigAtomic,
    Clock,
    Time,
}

impl Param {
    pub const ALL: [Param; 15] = [
        Param::Char,
        Param::Short,
        Param::Int,
        Param::Long,
        Param::LongLong,
        Param::Ptrdiff,
        Param::Size,
        Param::Intptr,
        Param::Wchar,
        Param::Wint,
        Param::Wctrans,
        Param::Wctype,
        Param::SigAtomic,
        Param::Clock,
        Param::Time,
    ];

    /// Stable snake_case name used in JSON and diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::LongLong => "long_long",
            Self::Ptrdiff => "ptrdiff",
            Self::Size => "size",
            Self::Intptr => "intptr",
            Self::Wchar => "wchar",
            Self::Wint => "wint",
            Self::Wctrans => "wctrans",
            Self::Wctype => "wctype",
            Self::SigAtomic => "sig_atomic",
            Self::Clock => "clock",
            Self::Time => "time",
        }
    }

    /// Signedness assumed when the input gives only a width.
    #[must_use]
    pub const fn natural_signed(self) -> bool {
        !matches!(
            self,
            Self::Size
                | Self::Wchar
                | Self::Wint
                | Self::Wctrans
                | Self::Wctype
                | Self::Clock
                | Self::Time
        )
    }

    /// Environment variable carrying this parameter's width.
    #[must_use]
    pub fn env_var(self) -> String {
        format!("CWIDTH_{}_BITS", self.name().to_ascii_uppercase())
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Param {
    type Err = WidthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        let normalized = normalized.strip_suffix("_t").unwrap_or(&normalized);
        match normalized {
            "longlong" | "llong" => return Ok(Self::LongLong),
            "atomic" => return Ok(Self::SigAtomic),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|param| param.name() == normalized)
            .ok_or_else(|| WidthError::InvalidParameter {
                param: s.to_string(),
                value: String::from("<unknown parameter>"),
            })
    }
}

/// Width and signedness of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitWidthSpec {
    pub name: Param,
    pub width: u32,
    pub signed: bool,
}

impl BitWidthSpec {
    /// Spec with the parameter's natural signedness.
    #[must_use]
    pub const fn new(name: Param, width: u32) -> Self {
        Self {
            name,
            width,
            signed: name.natural_signed(),
        }
    }
}

/// Input shape of one descriptor entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSpec {
    Width(u32),
    Full {
        width: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signed: Option<bool>,
    },
}

/// Named bit widths for the native kinds and specialized domains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, RawSpec>", into = "BTreeMap<String, RawSpec>")]
pub struct EnvironmentDescriptor {
    specs: BTreeMap<Param, BitWidthSpec>,
}

impl EnvironmentDescriptor {
    /// Empty descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a width with the parameter's natural signedness.
    #[must_use]
    pub fn with_width(self, param: Param, width: u32) -> Self {
        self.with_spec(BitWidthSpec::new(param, width))
    }

    /// Set a full spec, replacing any previous entry for the same parameter.
    #[must_use]
    pub fn with_spec(mut self, spec: BitWidthSpec) -> Self {
        self.specs.insert(spec.name, spec);
        self
    }

    /// Set the signedness of plain `char`.
    #[must_use]
    pub fn with_char_signed(mut self, signed: bool) -> Self {
        let width = self.width(Param::Char).unwrap_or(8);
        self.specs.insert(
            Param::Char,
            BitWidthSpec {
                name: Param::Char,
                width,
                signed,
            },
        );
        self
    }

    /// Drop a parameter.
    #[must_use]
    pub fn without(mut self, param: Param) -> Self {
        self.specs.remove(&param);
        self
    }

    /// Build from specs, rejecting zero widths.
    pub fn from_specs(specs: impl IntoIterator<Item = BitWidthSpec>) -> Result<Self, WidthError> {
        let descriptor = specs
            .into_iter()
            .fold(Self::new(), |acc, spec| acc.with_spec(spec));
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Read `CWIDTH_<PARAM>_BITS` (and `CWIDTH_CHAR_SIGNED`) from the process
    /// environment.
    pub fn from_env() -> Result<Self, WidthError> {
        Self::from_vars(std::env::vars())
    }

    /// Build from `(name, value)` pairs shaped like the process environment.
    /// Unrelated variables are ignored.
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Result<Self, WidthError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let vars: BTreeMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();

        let mut descriptor = Self::new();
        for param in Param::ALL {
            let key = param.env_var();
            if let Some(raw) = vars.get(&key) {
                let width = parse_width(&key, raw)?;
                descriptor = descriptor.with_width(param, width);
            }
        }
        if let Some(raw) = vars.get("CWIDTH_CHAR_SIGNED") {
            let signed = parse_flag("CWIDTH_CHAR_SIGNED", raw)?;
            descriptor = descriptor.with_char_signed(signed);
        }
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Reject entries that cannot describe an integer.
    pub fn validate(&self) -> Result<(), WidthError> {
        match self.specs.values().find(|spec| spec.width == 0) {
            Some(spec) => Err(WidthError::InvalidParameter {
                param: spec.name.to_string(),
                value: spec.width.to_string(),
            }),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn spec(&self, param: Param) -> Option<&BitWidthSpec> {
        self.specs.get(&param)
    }

    #[must_use]
    pub fn width(&self, param: Param) -> Option<u32> {
        self.specs.get(&param).map(|spec| spec.width)
    }

    #[must_use]
    pub fn contains(&self, param: Param) -> bool {
        self.specs.contains_key(&param)
    }

    /// Width of a parameter that must be present.
    pub fn require(&self, param: Param) -> Result<u32, WidthError> {
        self.width(param)
            .ok_or(WidthError::MissingParameter { param })
    }

    /// Check that every listed parameter is present, reporting the first gap.
    pub fn require_all(&self, params: impl IntoIterator<Item = Param>) -> Result<(), WidthError> {
        for param in params {
            self.require(param)?;
        }
        Ok(())
    }

    /// Signedness of plain `char` (signed when unspecified).
    #[must_use]
    pub fn char_signed(&self) -> bool {
        self.spec(Param::Char).is_none_or(|spec| spec.signed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BitWidthSpec> {
        self.specs.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl TryFrom<BTreeMap<String, RawSpec>> for EnvironmentDescriptor {
    type Error = WidthError;

    fn try_from(raw: BTreeMap<String, RawSpec>) -> Result<Self, Self::Error> {
        let mut specs = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            let name: Param = key.parse()?;
            let spec = match value {
                RawSpec::Width(width) => BitWidthSpec::new(name, width),
                RawSpec::Full { width, signed } => BitWidthSpec {
                    name,
                    width,
                    signed: signed.unwrap_or(name.natural_signed()),
                },
            };
            specs.push(spec);
        }
        Self::from_specs(specs)
    }
}

impl From<EnvironmentDescriptor> for BTreeMap<String, RawSpec> {
    fn from(descriptor: EnvironmentDescriptor) -> Self {
        descriptor
            .specs
            .into_values()
            .map(|spec| {
                (
                    spec.name.name().to_string(),
                    RawSpec::Full {
                        width: spec.width,
                        signed: Some(spec.signed),
                    },
                )
            })
            .collect()
    }
}

fn parse_width(key: &str, raw: &str) -> Result<u32, WidthError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| WidthError::InvalidParameter {
            param: key.to_string(),
            value: raw.to_string(),
        })
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, WidthError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "signed" => Ok(true),
        "0" | "false" | "no" | "unsigned" => Ok(false),
        _ => Err(WidthError::InvalidParameter {
            param: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Well-known data models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// 64-bit Unix: 32-bit int, 64-bit long and pointers.
    Lp64,
    /// 32-bit targets: int, long and pointers are 32 bits.
    Ilp32,
    /// 64-bit Windows: 32-bit long, 64-bit pointers, 16-bit wide chars.
    Llp64,
    /// int, long, pointers and wide chars all 64 bits; no 32-bit kind.
    Ilp64,
    /// 16-bit int, 32-bit long and pointers.
    Lp32,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Lp64,
        Preset::Ilp32,
        Preset::Llp64,
        Preset::Ilp64,
        Preset::Lp32,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lp64 => "lp64",
            Self::Ilp32 => "ilp32",
            Self::Llp64 => "llp64",
            Self::Ilp64 => "ilp64",
            Self::Lp32 => "lp32",
        }
    }

    /// Full descriptor for the model.
    #[must_use]
    pub fn descriptor(self) -> EnvironmentDescriptor {
        // [short, int, long, long long, pointer, wchar, sig_atomic, clock, time]
        let [short, int, long, llong, ptr, wchar, atomic, clock, time] = match self {
            Self::Lp64 => [16, 32, 64, 64, 64, 32, 32, 64, 64],
            Self::Ilp32 => [16, 32, 32, 64, 32, 32, 32, 32, 32],
            Self::Llp64 => [16, 32, 32, 64, 64, 16, 32, 32, 64],
            Self::Ilp64 => [16, 64, 64, 64, 64, 64, 64, 64, 64],
            Self::Lp32 => [16, 16, 32, 64, 32, 16, 16, 32, 32],
        };
        EnvironmentDescriptor::new()
            .with_width(Param::Char, 8)
            .with_width(Param::Short, short)
            .with_width(Param::Int, int)
            .with_width(Param::Long, long)
            .with_width(Param::LongLong, llong)
            .with_width(Param::Ptrdiff, ptr)
            .with_width(Param::Size, ptr)
            .with_width(Param::Intptr, ptr)
            .with_width(Param::Wchar, wchar)
            .with_width(Param::Wint, wchar)
            .with_width(Param::Wctrans, wchar)
            .with_width(Param::Wctype, wchar)
            .with_width(Param::SigAtomic, atomic)
            .with_width(Param::Clock, clock)
            .with_width(Param::Time, time)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = WidthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == lowered)
            .ok_or_else(|| WidthError::InvalidParameter {
                param: String::from("preset"),
                value: s.to_string(),
            })
    }
}
