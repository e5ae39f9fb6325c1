//! Where an environment descriptor comes from.
//!
//! A descriptor is read from a JSON file, taken from a named data model,
//! probed from the host C ABI, or assembled from `CWIDTH_<PARAM>_BITS`
//! variables.

use std::fmt;
use std::mem::size_of;
use std::path::{Path, PathBuf};

use cwidth_core::{EnvironmentDescriptor, Param, Preset};

use crate::error::HarnessError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorSource {
    File(PathBuf),
    Preset(Preset),
    Host,
    Env,
}

impl DescriptorSource {
    pub fn load(&self) -> Result<EnvironmentDescriptor, HarnessError> {
        match self {
            Self::File(path) => load_file(path),
            Self::Preset(preset) => Ok(preset.descriptor()),
            Self::Host => Ok(host_descriptor()),
            Self::Env => Ok(EnvironmentDescriptor::from_env()?),
        }
    }
}

impl fmt::Display for DescriptorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::Preset(preset) => write!(f, "preset:{preset}"),
            Self::Host => f.write_str("host"),
            Self::Env => f.write_str("env"),
        }
    }
}

/// Read a JSON descriptor file.
pub fn load_file(path: &Path) -> Result<EnvironmentDescriptor, HarnessError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| HarnessError::Descriptor {
        path: path.to_path_buf(),
        source,
    })
}

fn bits<T>() -> u32 {
    u32::try_from(size_of::<T>() * 8).unwrap_or(0)
}

/// Descriptor for the C ABI this binary was built for.
///
/// Domains without a portable `libc` type borrow a neighbor's width:
/// signal-atomic and clock widths follow `int`, wide-int and the wide
/// classification types follow `wchar_t`.
#[must_use]
pub fn host_descriptor() -> EnvironmentDescriptor {
    let int = bits::<libc::c_int>();
    let wchar = bits::<libc::wchar_t>();
    EnvironmentDescriptor::new()
        .with_width(Param::Char, bits::<libc::c_char>())
        .with_char_signed(libc::c_char::MIN != 0)
        .with_width(Param::Short, bits::<libc::c_short>())
        .with_width(Param::Int, int)
        .with_width(Param::Long, bits::<libc::c_long>())
        .with_width(Param::LongLong, bits::<libc::c_longlong>())
        .with_width(Param::Ptrdiff, bits::<libc::ptrdiff_t>())
        .with_width(Param::Size, bits::<libc::size_t>())
        .with_width(Param::Intptr, bits::<libc::intptr_t>())
        .with_width(Param::Wchar, wchar)
        .with_width(Param::Wint, wchar)
        .with_width(Param::Wctrans, wchar)
        .with_width(Param::Wctype, wchar)
        .with_width(Param::SigAtomic, int)
        .with_width(Param::Clock, int)
        .with_width(Param::Time, bits::<libc::time_t>())
}
