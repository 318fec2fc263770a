//! Shared vocabulary used by the built-in analyzers.
//!
//! Each list is named after the concept it recognises, not after the analyzer
//! that first needed it, so analyzers agree on what "destructive" or "close"
//! means.

use regex::Regex;

lazy_static::lazy_static! {
    /// Labels of actions that destroy data or state.
    pub static ref DESTRUCTIVE: Regex = Regex::new(
        r"(?i)\b(delete|remove|destroy|erase|purge|discard|wipe|clear all|deactivate|terminate|revoke|unsubscribe)\b"
    ).unwrap();

    /// Labels that offer a way back from a destructive action.
    pub static ref UNDO: Regex = Regex::new(
        r"(?i)\b(undo|cancel|restore|revert|recover|keep)\b"
    ).unwrap();

    /// Text or accessible labels meaning "close".
    pub static ref CLOSE: Regex = Regex::new(
        r"(?i)^\s*(close|dismiss|cancel|done|got it|[×✕✖xX])\s*$|\bclose\b"
    ).unwrap();

    /// Icon component or class names meaning "close".
    pub static ref CLOSE_ICON: Regex = Regex::new(
        r"(?i)(close|xmark|^x(icon)?$|^iconx$|^x-?lg$|^x-?circle|^(fa-)?times$|cross(-?icon)?$)"
    ).unwrap();

    pub static ref BACK: Regex = Regex::new(r"(?i)\b(back|previous|prev)\b").unwrap();

    pub static ref NEXT: Regex = Regex::new(r"(?i)\b(next|continue|finish|proceed)\b").unwrap();

    pub static ref STEP: Regex = Regex::new(r"(?i)\bstep\b").unwrap();

    /// Words that name an in-flight state.
    pub static ref LOADING: Regex = Regex::new(
        r"(?i)(loading|pending|submitting|fetching|saving|busy|in_?flight)"
    ).unwrap();

    /// Setting or assigning a loading flag.
    pub static ref LOADING_TOGGLE: Regex = Regex::new(
        r"(?i)\bset[A-Za-z_]*(loading|pending|submitting|fetching|saving|busy)[A-Za-z_]*\s*\(|\b[A-Za-z_.]*(loading|pending|submitting|fetching|saving|busy)[A-Za-z_]*\s*=[^=]"
    ).unwrap();

    /// Branching on a loading flag.
    pub static ref LOADING_CONDITIONAL: Regex = Regex::new(
        r"(?i)[A-Za-z_.]*(loading|pending|submitting|fetching|saving|busy)[A-Za-z_]*\s*(\?|&&|\|\|)|if\s*\(\s*!?\s*[A-Za-z_.]*(loading|pending|submitting|fetching|saving|busy)"
    ).unwrap();

    /// Class tokens and component names for progress indicators.
    pub static ref SPINNER: Regex = Regex::new(
        r"(?i)(spin|loader|loading|skeleton|progress|animate-pulse|throbber)"
    ).unwrap();

    /// Callees that perform network requests.
    pub static ref NETWORK_CALL: Regex = Regex::new(
        r"^(window\.)?fetch$|^(axios|ky|got|superagent)(\.(get|post|put|patch|delete|head|request))?$|^\$\.(ajax|get|post|getJSON)$|^(api|http|client|apiClient|httpClient)\.(get|post|put|patch|delete|request)$"
    ).unwrap();

    /// Wording that exposes implementation details to users.
    pub static ref TECHNICAL_ERROR: Regex = Regex::new(
        r"(?i)\b(exception|stack ?trace|null ?pointer|undefined is not|segfault|errno|econnrefused|enoent|etimedout|internal server error|uncaught|typeerror|referenceerror|syntaxerror|fatal error|error code|error:? ?#?\d{3,}|err_[a-z0-9_]+|network ?error|failed to fetch|status code \d{3}|http \d{3}|0x[0-9a-f]{4,})\b"
    ).unwrap();

    /// Component names and class tokens of error containers.
    pub static ref ERROR_LIKE: Regex = Regex::new(r"(?i)(error|danger|invalid)").unwrap();

    /// Class tokens that visually set an error apart.
    pub static ref ERROR_STYLE: Regex = Regex::new(
        r"(?i)^(?:[a-z]+:)*((text|bg|border)-(red|rose|pink|orange|amber|yellow|danger|error|destructive)\b.*|font-(medium|semibold|bold|extrabold|black)|text-danger|alert-danger|is-danger|has-error|bold)$"
    ).unwrap();

    /// Containers that greet or guide new users.
    pub static ref ONBOARDING: Regex = Regex::new(
        r"(?i)(onboarding|welcome|getting-?started|walkthrough|tour|empty-?state|first-?run)"
    ).unwrap();

    /// Labels of actions that move a new user forward.
    pub static ref ONBOARDING_ACTION: Regex = Regex::new(
        r"(?i)\b(get started|start|begin|next|continue|create|add|try|learn more|take the tour|set up|setup|skip|import|invite|connect)\b"
    ).unwrap();

    /// Help and support link text or targets.
    pub static ref HELP: Regex = Regex::new(
        r"(?i)\b(help|support|faq|docs|documentation|contact|guide)\b"
    ).unwrap();

    /// Hints that tell users a shortcut exists.
    pub static ref SHORTCUT_HINT: Regex = Regex::new(
        r"(?i)\b(ctrl|cmd|alt|shift|meta|option)\s*\+|⌘|⌥|⇧|\bshortcut|\bhotkey"
    ).unwrap();

    /// Callees that register keyboard shortcuts.
    pub static ref SHORTCUT_REGISTRATION: Regex = Regex::new(
        r"^(useHotkeys?|hotkeys|([mM]ousetrap)\.bind|useKeyboardShortcuts?|useShortcut|tinykeys|useKeyPress|keymaster)$"
    ).unwrap();

    /// Key event names passed to `addEventListener`.
    pub static ref KEY_EVENT: Regex = Regex::new(r#"['"`]key(down|up|press)['"`]"#).unwrap();

    /// Confirmation steps.
    pub static ref CONFIRM: Regex = Regex::new(
        r"(?i)\b(confirm|are you sure|setConfirm\w*|showConfirm\w*|openConfirm\w*|ConfirmDialog|ConfirmationModal|AlertDialog|useConfirm|prompt\s*\()"
    ).unwrap();

    /// Company logo elements.
    pub static ref LOGO: Regex = Regex::new(r"(?i)(^|[^a-z])logo").unwrap();

    /// Breadcrumb components.
    pub static ref BREADCRUMB: Regex = Regex::new(r"(?i)breadcrumb").unwrap();
}

/// Field-name words that imply a constrained value, with the input type
/// that enforces it.
pub const CONSTRAINED_FIELDS: &[(&str, &str)] = &[
    ("email", "email"),
    ("phone", "tel"),
    ("tel", "tel"),
    ("mobile", "tel"),
    ("url", "url"),
    ("website", "url"),
    ("homepage", "url"),
    ("date", "date"),
    ("birthday", "date"),
    ("birthdate", "date"),
    ("dob", "date"),
    ("month", "month"),
    ("week", "week"),
    ("time", "time"),
    ("age", "number"),
    ("quantity", "number"),
    ("qty", "number"),
    ("amount", "number"),
    ("price", "number"),
    ("year", "number"),
    ("zip", "text with a pattern"),
    ("zipcode", "text with a pattern"),
    ("postcode", "text with a pattern"),
];

/// Field-name words for sensitive or hard-to-get-right values.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password", "passcode", "pin", "ssn", "tax", "vat", "iban", "swift", "routing", "card", "cvv",
    "cvc", "secret", "token", "apikey", "otp",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_callees() {
        for callee in ["fetch", "window.fetch", "axios", "axios.post", "api.get", "$.ajax"] {
            assert!(NETWORK_CALL.is_match(callee), "{}", callee);
        }
        for callee in ["map.get", "params.delete", "fetchUser", "refetch"] {
            assert!(!NETWORK_CALL.is_match(callee), "{}", callee);
        }
    }

    #[test]
    fn test_loading_toggle() {
        assert!(LOADING_TOGGLE.is_match("setLoading(true);"));
        assert!(LOADING_TOGGLE.is_match("setIsSubmitting(false)"));
        assert!(LOADING_TOGGLE.is_match("this.loading = true;"));
        assert!(!LOADING_TOGGLE.is_match("if (loading === true) {}"));
        assert!(LOADING_CONDITIONAL.is_match("if (isLoading) return;"));
        assert!(LOADING_CONDITIONAL.is_match("return loading ? <Spinner/> : null"));
    }

    #[test]
    fn test_close_vocabulary() {
        assert!(CLOSE.is_match("Close"));
        assert!(CLOSE.is_match("×"));
        assert!(CLOSE.is_match("Close dialog"));
        assert!(!CLOSE.is_match("Closet organizer"));
        assert!(CLOSE_ICON.is_match("XMarkIcon"));
        assert!(CLOSE_ICON.is_match("CloseIcon"));
        assert!(!CLOSE_ICON.is_match("InfoIcon"));
    }

    #[test]
    fn test_destructive_and_undo() {
        assert!(DESTRUCTIVE.is_match("Delete account"));
        assert!(!DESTRUCTIVE.is_match("Deleted items"));
        assert!(UNDO.is_match("Undo"));
        assert!(UNDO.is_match("Cancel"));
    }

    #[test]
    fn test_technical_error() {
        assert!(TECHNICAL_ERROR.is_match("Uncaught TypeError in handler"));
        assert!(TECHNICAL_ERROR.is_match("Request failed with status code 500"));
        assert!(TECHNICAL_ERROR.is_match("err_connection_refused"));
        assert!(TECHNICAL_ERROR.is_match("Error #404"));
        assert!(!TECHNICAL_ERROR.is_match("We couldn't save your changes"));
        assert!(!TECHNICAL_ERROR.is_match("Error: pick a date"));
    }

    #[test]
    fn test_error_style() {
        assert!(ERROR_STYLE.is_match("text-red-600"));
        assert!(ERROR_STYLE.is_match("font-bold"));
        assert!(ERROR_STYLE.is_match("dark:text-red-400"));
        assert!(!ERROR_STYLE.is_match("text-gray-500"));
    }
}
