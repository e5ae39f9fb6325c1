//! Error taxonomy for width resolution.
//!
//! Every variant is fatal for the configuration that produced it: a static
//! environment description cannot become valid by retrying.

use thiserror::Error;

use crate::env::Param;
use crate::kind::NativeKind;
use crate::resolve::{Family, ResolvedType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidthError {
    /// A required width parameter is absent from the descriptor.
    #[error("environment descriptor is missing required parameter `{param}`")]
    MissingParameter { param: Param },

    /// No candidate kind satisfies the requested width under the family rule.
    #[error(
        "no native kind realizes a {family} {width}-bit integer (tried: {})",
        format_order(.tried)
    )]
    Configuration {
        width: u32,
        family: Family,
        tried: Vec<NativeKind>,
    },

    /// Two collaborators committed different resolutions for one name.
    #[error("conflicting resolution for `{name}`: committed {committed}, attempted {attempted}")]
    Conflict {
        name: String,
        committed: Box<ResolvedType>,
        attempted: Box<ResolvedType>,
    },

    /// Width outside the limit synthesizer's domain.
    #[error("width {width} is outside the supported range 2..=128")]
    Domain { width: u32 },

    /// Descriptor input that cannot describe an integer width.
    #[error("invalid value `{value}` for parameter `{param}`")]
    InvalidParameter { param: String, value: String },
}

fn format_order(order: &[NativeKind]) -> String {
    if order.is_empty() {
        return String::from("<none>");
    }
    order
        .iter()
        .map(|kind| kind.c_name())
        .collect::<Vec<_>>()
        .join(", ")
}
