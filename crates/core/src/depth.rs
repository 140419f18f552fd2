//! Pop-out depth markers on descendants of a tilted element.
//!
//! A descendant whose class list contains a `pop-out-` token floats above the
//! card along the Z axis. `pop-out-[36px]` declares an explicit depth; any
//! other `pop-out-` token uses [`DEFAULT_DEPTH_PX`].

/// Depth for a `pop-out-` token without a `[<N>px]` suffix.
pub const DEFAULT_DEPTH_PX: u32 = 20;

/// Selector matching every depth-marked descendant.
pub const DEPTH_SELECTOR: &str = "[class*='pop-out-']";

const MARKER_PREFIX: &str = "pop-out-";

/// A descendant's declared Z translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthMarker {
    pub depth_px: u32,
}

impl DepthMarker {
    /// Reads the marker from an element's full `class` attribute.
    ///
    /// Returns `None` when no class contains `pop-out-`. The first token
    /// with an explicit `[<N>px]` depth wins; otherwise the default applies.
    pub fn from_class_name(class_name: &str) -> Option<Self> {
        if !class_name.contains(MARKER_PREFIX) {
            return None;
        }
        let depth_px = class_name
            .split_whitespace()
            .find_map(explicit_depth)
            .unwrap_or(DEFAULT_DEPTH_PX);
        Some(Self { depth_px })
    }

    /// `translateZ(<N>px)` while raised, `translateZ(0)` when lowered.
    pub fn css(&self, raised: bool) -> String {
        if raised {
            format!("translateZ({}px)", self.depth_px)
        } else {
            "translateZ(0)".to_owned()
        }
    }
}

/// Parses `[<digits>px]` following the marker prefix anywhere in `token`.
fn explicit_depth(token: &str) -> Option<u32> {
    let (_, rest) = token.split_once(MARKER_PREFIX)?;
    let digits = rest.strip_prefix('[')?.strip_suffix("px]")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
