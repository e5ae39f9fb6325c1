//! `inttypes.h` format-specifier macros.
//!
//! `PRIdN`, `SCNxLEASTN` and the rest expand to the length modifier of the
//! kind that realizes the matching canonical type, followed by the
//! conversion letter. `MAX` and `PTR` use the dedicated `j` and `t`
//! modifiers and need no resolution.

use serde::{Deserialize, Serialize};

use crate::kind::NativeKind;

/// Conversion letters with a macro per width.
pub const CONVERSIONS: [char; 5] = ['d', 'i', 'o', 'u', 'x'];

const WIDTHS: [u32; 4] = [8, 16, 32, 64];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Print,
    Scan,
}

impl Direction {
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Print => "PRI",
            Self::Scan => "SCN",
        }
    }
}

/// One `#define PRIdN "..."` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatMacro {
    pub name: String,
    /// Conversion specification without the leading `%`.
    pub spec: String,
}

impl FormatMacro {
    fn new(direction: Direction, conversion: char, suffix: &str, modifier: &str) -> Self {
        Self {
            name: format!("{}{conversion}{suffix}", direction.prefix()),
            spec: format!("{modifier}{conversion}"),
        }
    }

    /// Quoted C string literal, e.g. `"ld"`.
    #[must_use]
    pub fn literal(&self) -> String {
        format!("\"{}\"", self.spec)
    }
}

/// Build every format macro.
///
/// `kind_of` maps a canonical name to its realizing kind; names it cannot
/// map (absent exact widths) get no macros.
pub fn format_macros(kind_of: impl Fn(&str) -> Option<NativeKind>) -> Vec<FormatMacro> {
    let mut out = Vec::new();
    for width in WIDTHS {
        let groups = [
            (format!("{width}"), format!("int{width}_t")),
            (format!("LEAST{width}"), format!("int_least{width}_t")),
            (format!("FAST{width}"), format!("int_fast{width}_t")),
        ];
        for (suffix, name) in groups {
            let Some(kind) = kind_of(&name) else {
                continue;
            };
            push_group(&mut out, &suffix, kind.length_modifier());
        }
    }
    push_group(&mut out, "MAX", "j");
    push_group(&mut out, "PTR", "t");
    out
}

fn push_group(out: &mut Vec<FormatMacro>, suffix: &str, modifier: &str) {
    for conversion in CONVERSIONS {
        for direction in [Direction::Print, Direction::Scan] {
            out.push(FormatMacro::new(direction, conversion, suffix, modifier));
        }
    }
}
