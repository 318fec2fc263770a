//! Element classification helpers shared by the analyzers.

use regex::Regex;

use crate::parser::{AttrValue, SyntaxNode};

use super::vocab;

lazy_static::lazy_static! {
    static ref QUOTED: Regex = Regex::new(r#"["'`]([^"'`]*)["'`]"#).unwrap();
    static ref STYLE_ENTRY: Regex = Regex::new(
        r#"([A-Za-z_$][\w$]*|['"][\w-]+['"])\s*:\s*('[^']*'|"[^"]*"|`[^`]*`|[^,}]+)"#
    ).unwrap();
    static ref ICON_CLASS: Regex = Regex::new(
        r"(?i)^(icon|icon-.*|fa|fas|far|fab|fa-.*|bi|bi-.*|material-icons.*|lucide.*|glyphicon.*|ti-.*)$"
    ).unwrap();
    static ref HANDLER_CALLEE: Regex = Regex::new(r"^(?:\([^)]*\)|\w+)\s*=>\s*(?:\{\s*)?([A-Za-z_$][\w$.]*)\s*\(").unwrap();
    static ref IDENT: Regex = Regex::new(r"^[A-Za-z_$][\w$.]*$").unwrap();
}

const FIELD_TAGS: &[&str] = &["input", "textarea", "select"];

const NATIVE_INTERACTIVE: &[&str] = &[
    "a", "button", "input", "select", "textarea", "option", "summary", "label",
];

const ACTION_COMPONENTS: &[&str] = &[
    "Button", "IconButton", "Link", "NavLink", "RouterLink", "NextLink", "MenuItem", "Tab",
    "ActionIcon", "Anchor",
];

const INTERACTIVE_ROLES: &[&str] = &[
    "button", "link", "menuitem", "tab", "checkbox", "radio", "switch", "option", "textbox",
    "combobox",
];

/// Whether the tag is an intrinsic (lowercase) element rather than a component.
pub fn is_native(node: &SyntaxNode) -> bool {
    node.name
        .chars()
        .next()
        .map(|c| c.is_ascii_lowercase())
        .unwrap_or(false)
}

/// Last segment of a member tag (`Dialog.Close` -> `Close`).
pub fn base_name(node: &SyntaxNode) -> &str {
    node.name.rsplit('.').next().unwrap_or(&node.name)
}

pub fn is_field(node: &SyntaxNode) -> bool {
    node.is_element() && FIELD_TAGS.contains(&node.name.as_str())
}

pub fn role(node: &SyntaxNode) -> Option<&str> {
    node.literal("role")
}

pub fn has_click(node: &SyntaxNode) -> bool {
    node.has_attr("onClick")
}

pub fn has_key_handler(node: &SyntaxNode) -> bool {
    node.has_attr("onKeyDown") || node.has_attr("onKeyUp") || node.has_attr("onKeyPress")
}

/// Buttons: `<button>`, `<input type="button|submit|reset">`, button
/// components and `role="button"`.
pub fn is_button(node: &SyntaxNode) -> bool {
    if !node.is_element() {
        return false;
    }
    let name = base_name(node);
    name == "button"
        || name.ends_with("Button")
        || role(node) == Some("button")
        || (name == "input"
            && matches!(node.literal("type"), Some("button" | "submit" | "reset")))
}

/// Links and link components.
pub fn is_link(node: &SyntaxNode) -> bool {
    if !node.is_element() {
        return false;
    }
    let name = base_name(node);
    name == "a"
        || name.ends_with("Link")
        || name == "Anchor"
        || role(node) == Some("link")
        || (!is_native(node) && node.has_attr("href"))
}

/// Buttons and links: things a user activates to do or go somewhere.
pub fn is_actionable(node: &SyntaxNode) -> bool {
    is_button(node) || is_link(node) || role(node) == Some("menuitem") || base_name(node) == "MenuItem"
}

/// Elements users can interact with by default or through handlers.
pub fn is_interactive(node: &SyntaxNode) -> bool {
    if !node.is_element() {
        return false;
    }
    NATIVE_INTERACTIVE.contains(&node.name.as_str())
        || ACTION_COMPONENTS.contains(&base_name(node))
        || is_actionable(node)
        || has_click(node)
        || role(node).map(|r| INTERACTIVE_ROLES.contains(&r)).unwrap_or(false)
}

/// Icons: icon components, `<svg>`, `<i>` and icon-font classes.
pub fn is_icon(node: &SyntaxNode) -> bool {
    if !node.is_element() {
        return false;
    }
    let name = base_name(node);
    name == "svg"
        || name == "i"
        || name.contains("Icon")
        || name
            .strip_prefix("Fa")
            .and_then(|rest| rest.chars().next())
            .map(|c| c.is_ascii_uppercase())
            .unwrap_or(false)
        || class_tokens(node).iter().any(|t| ICON_CLASS.is_match(t))
}

/// Navigation and menu containers.
pub fn is_nav_container(node: &SyntaxNode) -> bool {
    if !node.is_element() {
        return false;
    }
    let name = base_name(node);
    name == "nav"
        || name == "menu"
        || matches!(role(node), Some("navigation" | "menu" | "menubar"))
        || (!is_native(node)
            && (name.ends_with("Nav")
                || name.ends_with("Navbar")
                || name.ends_with("Navigation")
                || name.ends_with("Menu")
                || name == "Sidebar"))
}

/// Breadcrumb-labelled containers.
pub fn is_breadcrumb(node: &SyntaxNode) -> bool {
    node.is_element()
        && (vocab::BREADCRUMB.is_match(&node.name)
            || node
                .literal("aria-label")
                .map(|l| l.eq_ignore_ascii_case("breadcrumb") || l.eq_ignore_ascii_case("breadcrumbs"))
                .unwrap_or(false)
            || class_tokens(node)
                .iter()
                .any(|t| t.to_ascii_lowercase().contains("breadcrumb-list")))
}

/// Class tokens from `className`/`class`. For expressions, tokens of every
/// string literal part are collected.
pub fn class_tokens(node: &SyntaxNode) -> Vec<String> {
    let value = node.attr("className").or_else(|| node.attr("class"));
    match value {
        Some(AttrValue::Literal(s)) => s.split_whitespace().map(str::to_string).collect(),
        Some(AttrValue::Dynamic(expr)) => QUOTED
            .captures_iter(expr)
            .filter_map(|c| c.get(1))
            .flat_map(|m| m.as_str().split_whitespace())
            .filter(|t| !t.contains("${") && !t.contains('}'))
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Inline style properties from `style={{ ... }}` as `(name, value)` with
/// quotes stripped from both.
pub fn style_properties(node: &SyntaxNode) -> Vec<(String, String)> {
    let Some(AttrValue::Dynamic(expr)) = node.attr("style") else {
        return Vec::new();
    };
    let body = expr.trim().trim_start_matches('{').trim_end_matches('}');
    STYLE_ENTRY
        .captures_iter(body)
        .filter_map(|c| {
            let name = c.get(1)?.as_str().trim_matches(|ch| ch == '\'' || ch == '"');
            let value = c
                .get(2)?
                .as_str()
                .trim()
                .trim_matches(|ch| ch == '\'' || ch == '"' || ch == '`');
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Text a user perceives as the element's label: visible text, falling back
/// to `aria-label`, `title` and `alt`.
pub fn label_text(node: &SyntaxNode) -> String {
    let text = node.text_content();
    if !text.is_empty() {
        return text;
    }
    ["aria-label", "title", "alt", "value", "label"]
        .iter()
        .find_map(|a| node.literal(a).map(str::to_string))
        .unwrap_or_default()
}

/// Lowercased words of a field's `name`/`id`, split on camelCase and
/// punctuation (`billingZipCode` -> `billing`, `zip`, `code`).
pub fn field_words(node: &SyntaxNode) -> Vec<String> {
    let mut words = Vec::new();
    for attr in ["name", "id"] {
        let Some(value) = node.literal(attr) else {
            continue;
        };
        let mut current = String::new();
        let mut prev_lower = false;
        for c in value.chars() {
            if !c.is_ascii_alphanumeric() {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                prev_lower = false;
                continue;
            }
            if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            current.push(c.to_ascii_lowercase());
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

/// Name of the function a handler attribute refers to: `onClick={remove}`,
/// `onClick={this.remove}`, `onClick={() => remove(id)}`.
pub fn handler_target(value: &AttrValue) -> Option<&str> {
    let AttrValue::Dynamic(expr) = value else {
        return None;
    };
    let expr = expr.trim();
    if IDENT.is_match(expr) {
        return Some(expr.rsplit('.').next().unwrap_or(expr));
    }
    HANDLER_CALLEE
        .captures(expr)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .map(|s| s.rsplit('.').next().unwrap_or(s))
}
