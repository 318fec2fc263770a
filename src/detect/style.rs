//! Style token normalisation: colors, fonts and style signatures.

use regex::Regex;

use crate::parser::SyntaxNode;

use super::elements::{class_tokens, style_properties};

lazy_static::lazy_static! {
    static ref TAILWIND_COLOR: Regex = Regex::new(
        r"^(?:[a-z0-9-]+:)*!?(?:text|bg|border|ring|fill|stroke|from|via|to|outline|decoration|accent|divide|caret|shadow|placeholder)-(red|orange|amber|yellow|lime|green|emerald|teal|cyan|sky|blue|indigo|violet|purple|fuchsia|pink|rose)(?:-\d{2,3})?(?:/\d+)?$"
    ).unwrap();
    static ref SEMANTIC_COLOR: Regex = Regex::new(
        r"^(?:text|bg|btn|btn-outline|border|alert|badge)-(primary|success|danger|warning|info)$"
    ).unwrap();
    static ref FONT_CLASS: Regex = Regex::new(r"^(?:[a-z0-9-]+:)*font-(.+)$").unwrap();
    static ref RGB: Regex = Regex::new(
        r"^rgba?\(\s*(\d{1,3})[\s,]+(\d{1,3})[\s,]+(\d{1,3})"
    ).unwrap();
    static ref HSL_SATURATION: Regex = Regex::new(r"^hsla?\(\s*[\d.]+(?:deg)?[\s,]+([\d.]+)%").unwrap();
    /// `font-family:` declarations in style blocks and CSS-in-JS templates.
    pub static ref FONT_FAMILY_DECL: Regex = Regex::new(r"(?i)font-family\s*:\s*([^;}\n]+)").unwrap();
}

const FONT_WEIGHTS: &[&str] = &[
    "thin", "extralight", "light", "normal", "medium", "semibold", "bold", "extrabold", "black",
];

const NEUTRAL_NAMES: &[&str] = &[
    "white", "black", "gray", "grey", "silver", "transparent", "inherit", "currentcolor",
    "initial", "unset", "none", "gainsboro", "whitesmoke", "lightgray", "lightgrey", "darkgray",
    "darkgrey", "dimgray", "dimgrey", "snow", "ivory",
];

/// Hue of a color utility class (`text-blue-600` -> `blue`), neutrals excluded.
pub fn utility_color(token: &str) -> Option<String> {
    TAILWIND_COLOR
        .captures(token)
        .or_else(|| SEMANTIC_COLOR.captures(token))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Whether an inline style property carries a color.
pub fn is_color_property(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with("color") || matches!(lower.as_str(), "background" | "fill" | "stroke")
}

/// Normalise an inline color value. Neutrals (grays, black, white and
/// keywords) and values that are not literal colors yield `None`.
pub fn normalize_color(value: &str) -> Option<String> {
    let v = value.trim().to_ascii_lowercase();

    if let Some(hex) = v.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let full: String = match hex.len() {
            3 | 4 => hex.chars().take(3).flat_map(|c| [c, c]).collect(),
            6 | 8 => hex[..6].to_string(),
            _ => return None,
        };
        let (r, g, b) = (&full[0..2], &full[2..4], &full[4..6]);
        if r == g && g == b {
            return None;
        }
        return Some(format!("#{}", full));
    }

    if let Some(c) = RGB.captures(&v) {
        let channel = |i: usize| c.get(i).and_then(|m| m.as_str().parse::<u8>().ok());
        let (r, g, b) = (channel(1)?, channel(2)?, channel(3)?);
        if r == g && g == b {
            return None;
        }
        return Some(format!("#{:02x}{:02x}{:02x}", r, g, b));
    }

    if v.starts_with("hsl") {
        let saturation: f64 = HSL_SATURATION
            .captures(&v)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())?;
        if saturation == 0.0 {
            return None;
        }
        return Some(v.split_whitespace().collect());
    }

    if !v.is_empty() && v.chars().all(|c| c.is_ascii_alphabetic()) {
        if NEUTRAL_NAMES.contains(&v.as_str()) || v.contains("gray") || v.contains("grey") {
            return None;
        }
        return Some(v);
    }

    None
}

/// First family of a `font-family` value, unquoted and lowercased.
pub fn font_family(value: &str) -> Option<String> {
    let first = value.split(',').next()?.trim();
    let first = first.trim_matches(|c| c == '"' || c == '\'' || c == '`').trim();
    if first.is_empty() || first.starts_with("var(") || first.contains("${") {
        return None;
    }
    Some(first.to_ascii_lowercase())
}

/// Font utility class (`font-serif`, `font-['Inter']`), weights excluded.
pub fn font_class(token: &str) -> Option<String> {
    let family = FONT_CLASS.captures(token)?.get(1)?.as_str();
    if FONT_WEIGHTS.contains(&family) || family.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if let Some(arbitrary) = family.strip_prefix('[').and_then(|f| f.strip_suffix(']')) {
        return font_family(&arbitrary.replace('_', " "));
    }
    Some(format!("font-{}", family))
}

/// Normalised style signature of an element: its sorted class tokens, or
/// failing that its sorted inline style entries.
pub fn signature(node: &SyntaxNode) -> Option<String> {
    let mut classes = class_tokens(node);
    classes.sort();
    classes.dedup();
    if !classes.is_empty() {
        return Some(classes.join(" "));
    }

    let mut props: Vec<String> = style_properties(node)
        .into_iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect();
    props.sort();
    props.dedup();
    if !props.is_empty() {
        return Some(props.join("; "));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{AttrValue, NodeKind};

    #[test]
    fn test_utility_color() {
        assert_eq!(utility_color("text-blue-600"), Some("blue".to_string()));
        assert_eq!(utility_color("hover:bg-rose-50/50"), Some("rose".to_string()));
        assert_eq!(utility_color("btn-danger"), Some("danger".to_string()));
        assert_eq!(utility_color("bg-gray-100"), None);
        assert_eq!(utility_color("text-lg"), None);
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("#F00"), Some("#ff0000".to_string()));
        assert_eq!(normalize_color("#333333"), None);
        assert_eq!(normalize_color("rgb(10, 20, 30)"), Some("#0a141e".to_string()));
        assert_eq!(normalize_color("rgba(0,0,0,0.5)"), None);
        assert_eq!(normalize_color("tomato"), Some("tomato".to_string()));
        assert_eq!(normalize_color("white"), None);
        assert_eq!(normalize_color("var(--brand)"), None);
        assert_eq!(normalize_color("hsl(0, 0%, 50%)"), None);
        assert_eq!(normalize_color("#ggg"), None);
    }

    #[test]
    fn test_non_ascii_hex_is_not_a_color() {
        assert_eq!(normalize_color("#aéééx"), None);
        assert_eq!(normalize_color("#ééé"), None);
        assert_eq!(normalize_color("#ab😀"), None);
    }

    #[test]
    fn test_fonts() {
        assert_eq!(font_family("'Inter', sans-serif"), Some("inter".to_string()));
        assert_eq!(font_class("font-serif"), Some("font-serif".to_string()));
        assert_eq!(font_class("font-bold"), None);
        assert_eq!(font_class("font-['Open_Sans']"), Some("open sans".to_string()));
        assert_eq!(font_class("text-sm"), None);
    }

    #[test]
    fn test_signature() {
        let mut n = SyntaxNode::new(NodeKind::Element, "div", 1, 1);
        n.attributes.insert(
            "className".to_string(),
            AttrValue::Literal("p-2 bg-gray-100".to_string()),
        );
        assert_eq!(signature(&n), Some("bg-gray-100 p-2".to_string()));

        n.attributes
            .insert("className".to_string(), AttrValue::Literal("card".to_string()));
        assert_eq!(signature(&n), Some("card".to_string()));

        let bare = SyntaxNode::new(NodeKind::Element, "div", 1, 1);
        assert_eq!(signature(&bare), None);
    }
}
