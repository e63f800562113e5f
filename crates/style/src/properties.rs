//! Initial values and inheritance for every longhand the engine knows.

use std::collections::HashMap;

use lazy_static::lazy_static;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDefault {
    pub name: &'static str,
    /// Initial value as CSS text.
    pub initial: &'static str,
    pub inherited: bool,
}

const fn prop(name: &'static str, initial: &'static str, inherited: bool) -> PropertyDefault {
    PropertyDefault { name, initial, inherited }
}

pub const PROPERTY_TABLE: &[PropertyDefault] = &[
    // Box model
    prop("display", "inline", false),
    prop("position", "static", false),
    prop("float", "none", false),
    prop("clear", "none", false),
    prop("box-sizing", "content-box", false),
    prop("width", "auto", false),
    prop("height", "auto", false),
    prop("min-width", "auto", false),
    prop("min-height", "auto", false),
    prop("max-width", "none", false),
    prop("max-height", "none", false),
    prop("margin-top", "0", false),
    prop("margin-right", "0", false),
    prop("margin-bottom", "0", false),
    prop("margin-left", "0", false),
    prop("padding-top", "0", false),
    prop("padding-right", "0", false),
    prop("padding-bottom", "0", false),
    prop("padding-left", "0", false),
    prop("border-top-width", "medium", false),
    prop("border-right-width", "medium", false),
    prop("border-bottom-width", "medium", false),
    prop("border-left-width", "medium", false),
    prop("border-top-style", "none", false),
    prop("border-right-style", "none", false),
    prop("border-bottom-style", "none", false),
    prop("border-left-style", "none", false),
    prop("border-top-color", "currentcolor", false),
    prop("border-right-color", "currentcolor", false),
    prop("border-bottom-color", "currentcolor", false),
    prop("border-left-color", "currentcolor", false),
    prop("border-top-left-radius", "0", false),
    prop("border-top-right-radius", "0", false),
    prop("border-bottom-right-radius", "0", false),
    prop("border-bottom-left-radius", "0", false),
    prop("outline-width", "medium", false),
    prop("outline-style", "none", false),
    prop("outline-color", "currentcolor", false),
    prop("top", "auto", false),
    prop("right", "auto", false),
    prop("bottom", "auto", false),
    prop("left", "auto", false),
    prop("z-index", "auto", false),
    prop("overflow-x", "visible", false),
    prop("overflow-y", "visible", false),
    prop("visibility", "visible", true),
    prop("opacity", "1", false),
    prop("vertical-align", "baseline", false),
    // Text and fonts
    prop("color", "canvastext", true),
    prop("font-family", "serif", true),
    prop("font-size", "medium", true),
    prop("font-style", "normal", true),
    prop("font-weight", "normal", true),
    prop("font-variant", "normal", true),
    prop("line-height", "normal", true),
    prop("text-align", "start", true),
    prop("text-indent", "0", true),
    prop("text-transform", "none", true),
    prop("text-decoration-line", "none", false),
    prop("text-decoration-style", "solid", false),
    prop("text-decoration-color", "currentcolor", false),
    prop("text-shadow", "none", true),
    prop("text-overflow", "clip", false),
    prop("letter-spacing", "normal", true),
    prop("word-spacing", "normal", true),
    prop("white-space", "normal", true),
    prop("word-break", "normal", true),
    prop("overflow-wrap", "normal", true),
    prop("direction", "ltr", true),
    prop("writing-mode", "horizontal-tb", true),
    // Background
    prop("background-color", "transparent", false),
    prop("background-image", "none", false),
    prop("background-repeat", "repeat", false),
    prop("background-position", "0% 0%", false),
    prop("background-size", "auto", false),
    prop("background-attachment", "scroll", false),
    // Lists
    prop("list-style-type", "disc", true),
    prop("list-style-position", "outside", true),
    prop("list-style-image", "none", true),
    // Tables
    prop("border-collapse", "separate", true),
    prop("border-spacing", "0", true),
    prop("caption-side", "top", true),
    prop("empty-cells", "show", true),
    prop("table-layout", "auto", false),
    // Flex and grid
    prop("flex-direction", "row", false),
    prop("flex-wrap", "nowrap", false),
    prop("flex-grow", "0", false),
    prop("flex-shrink", "1", false),
    prop("flex-basis", "auto", false),
    prop("order", "0", false),
    prop("justify-content", "normal", false),
    prop("align-items", "normal", false),
    prop("align-self", "auto", false),
    prop("align-content", "normal", false),
    prop("row-gap", "normal", false),
    prop("column-gap", "normal", false),
    prop("grid-template-columns", "none", false),
    prop("grid-template-rows", "none", false),
    // Misc
    prop("cursor", "auto", true),
    prop("pointer-events", "auto", true),
    prop("user-select", "auto", false),
    prop("content", "normal", false),
    prop("quotes", "auto", true),
    prop("transform", "none", false),
    prop("transition", "all 0s ease 0s", false),
    prop("animation", "none 0s ease 0s 1 normal none running", false),
    prop("box-shadow", "none", false),
    prop("filter", "none", false),
    prop("object-fit", "fill", false),
    prop("resize", "none", false),
    prop("color-scheme", "normal", true),
];

lazy_static! {
    static ref PROPERTY_DEFAULTS: HashMap<&'static str, &'static PropertyDefault> =
        PROPERTY_TABLE.iter().map(|p| (p.name, p)).collect();
}

pub fn property_default(name: &str) -> Option<&'static PropertyDefault> {
    PROPERTY_DEFAULTS.get(name).copied()
}

pub fn is_known_property(name: &str) -> bool {
    PROPERTY_DEFAULTS.contains_key(name)
}

/// Custom properties always inherit; unknown properties never do.
pub fn is_inherited(name: &str) -> bool {
    if name.starts_with("--") {
        return true;
    }
    property_default(name).is_some_and(|p| p.inherited)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_no_duplicates() {
        assert_eq!(PROPERTY_DEFAULTS.len(), PROPERTY_TABLE.len());
        assert!(PROPERTY_TABLE.len() >= 90);
    }

    #[test]
    fn lookups() {
        assert_eq!(property_default("display").map(|p| p.initial), Some("inline"));
        assert!(is_inherited("color"));
        assert!(is_inherited("--brand"));
        assert!(!is_inherited("margin-top"));
        assert!(!is_inherited("no-such-property"));
        assert!(is_known_property("flex-basis"));
        assert!(!is_known_property("margin"));
    }
}
