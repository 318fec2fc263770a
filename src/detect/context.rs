//! Line-based proximity search ("context window").
//!
//! Lines are classified once per file. Searches skip comment lines (line,
//! block and JSX comments, including multi-line block comments) and lines of
//! plain prose, so evidence is only ever found in code.

/// Classification of a source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Code,
    Comment,
    Prose,
    Blank,
}

impl LineClass {
    /// Whether the context window may look at this line.
    pub fn is_searchable(&self) -> bool {
        matches!(self, LineClass::Code)
    }
}

const PROSE_EXCLUDED: &[char] = &[
    '<', '>', '{', '}', '(', ')', '[', ']', '=', ';', '&', '|', '?', '+', '*', '/', '\\', '"', '\'',
    '`',
];

const KEYWORDS: &[&str] = &[
    "const", "let", "var", "return", "if", "else", "for", "while", "function", "import", "export",
    "class", "await", "async", "new", "throw", "try", "catch", "switch", "case", "default",
    "break", "continue", "type", "interface", "from", "do",
];

fn is_prose(line: &str) -> bool {
    if !line.chars().any(|c| c.is_alphabetic()) {
        return false;
    }
    if line.contains(PROSE_EXCLUDED) {
        return false;
    }
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return false;
    };
    if words.next().is_none() {
        return false;
    }
    let first = first.trim_end_matches([':', ',', '.']);
    !KEYWORDS.contains(&first)
}

/// Classify every line of a file.
pub fn classify_lines<S: AsRef<str>>(lines: &[S]) -> Vec<LineClass> {
    let mut classes = Vec::with_capacity(lines.len());
    let mut in_block = false;

    for line in lines {
        let t = line.as_ref().trim();

        if in_block {
            if t.contains("*/") {
                in_block = false;
            }
            classes.push(LineClass::Comment);
            continue;
        }

        let class = if t.is_empty() {
            LineClass::Blank
        } else if t.starts_with("//") {
            LineClass::Comment
        } else if t.starts_with("/*") || t.starts_with("{/*") {
            let opened_at = t.find("/*").unwrap_or(0);
            if !t[opened_at + 2..].contains("*/") {
                in_block = true;
            }
            LineClass::Comment
        } else if t.starts_with('*') {
            LineClass::Comment
        } else if is_prose(t) {
            LineClass::Prose
        } else {
            LineClass::Code
        };
        classes.push(class);
    }

    classes
}

/// The lines of one file with their classification.
#[derive(Debug, Clone)]
pub struct SourceLines {
    lines: Vec<String>,
    classes: Vec<LineClass>,
}

impl SourceLines {
    pub fn new(source: &str) -> Self {
        let lines: Vec<String> = source.lines().map(str::to_string).collect();
        let classes = classify_lines(&lines);
        Self { lines, classes }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line by 1-based number.
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map(String::as_str)
    }

    /// Class of a line by 0-based index.
    pub fn class(&self, index: usize) -> Option<LineClass> {
        self.classes.get(index).copied()
    }

    /// Iterate `(0-based index, line)` over searchable code lines.
    pub fn code_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(i, _)| self.classes[*i].is_searchable())
            .map(|(i, l)| (i, l.as_str()))
    }

    /// First matching code line within `radius` of `center` (0-based).
    pub fn first_nearby(
        &self,
        center: usize,
        radius: usize,
        pred: impl FnMut(&str) -> bool,
    ) -> Option<usize> {
        first_in_window(&self.lines, &self.classes, center, radius, pred)
    }

    pub fn nearby(&self, center: usize, radius: usize, pred: impl FnMut(&str) -> bool) -> bool {
        self.first_nearby(center, radius, pred).is_some()
    }
}

fn first_in_window<S: AsRef<str>>(
    lines: &[S],
    classes: &[LineClass],
    center: usize,
    radius: usize,
    mut pred: impl FnMut(&str) -> bool,
) -> Option<usize> {
    if lines.is_empty() {
        return None;
    }
    let start = center.saturating_sub(radius);
    let end = center.saturating_add(radius).min(lines.len() - 1);
    (start..=end).find(|&i| classes[i].is_searchable() && pred(lines[i].as_ref()))
}

/// Whether any code line within `radius` lines of `center_index` (0-based)
/// satisfies `pred`. The window is clipped to `lines`.
pub fn find_nearby(
    lines: &[&str],
    center_index: usize,
    radius: usize,
    pred: impl FnMut(&str) -> bool,
) -> bool {
    first_nearby(lines, center_index, radius, pred).is_some()
}

/// Index of the first code line in the window that satisfies `pred`,
/// in ascending line order.
pub fn first_nearby(
    lines: &[&str],
    center_index: usize,
    radius: usize,
    pred: impl FnMut(&str) -> bool,
) -> Option<usize> {
    let classes = classify_lines(lines);
    first_in_window(lines, &classes, center_index, radius, pred)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_comments() {
        let lines = [
            "// confirm here",
            "/* multi",
            "   confirm(x) */",
            "{/* jsx confirm */}",
            "const ok = confirm('sure');",
            "",
        ];
        assert_eq!(
            classify_lines(&lines),
            vec![
                LineClass::Comment,
                LineClass::Comment,
                LineClass::Comment,
                LineClass::Comment,
                LineClass::Code,
                LineClass::Blank,
            ]
        );
    }

    #[test]
    fn test_prose_lines() {
        assert!(is_prose("Please confirm before deleting your account"));
        assert!(!is_prose("const x = 1;"));
        assert!(!is_prose("return confirm"));
        assert!(!is_prose("Confirm"));
        assert!(!is_prose("<p>Confirm</p>"));
    }

    #[test]
    fn test_find_nearby_skips_comments_and_prose() {
        let lines = [
            "// confirm",
            "you should confirm this choice",
            "<button onClick={remove}>",
            "  Delete",
            "</button>",
        ];
        assert!(!find_nearby(&lines, 2, 5, |l| l.contains("confirm")));

        let lines = ["if (!window.confirm('x')) return;", "<button onClick={remove}>"];
        assert!(find_nearby(&lines, 1, 1, |l| l.contains("confirm")));
    }

    #[test]
    fn test_window_is_clipped_and_ordered() {
        let lines = ["a()", "match()", "b()", "match()", "c()"];
        assert_eq!(first_nearby(&lines, 2, 100, |l| l.starts_with("match")), Some(1));
        assert_eq!(first_nearby(&lines, 4, 0, |l| l.starts_with("match")), None);
        assert_eq!(first_nearby(&[], 0, 3, |_| true), None);
    }

    #[test]
    fn test_source_lines() {
        let src = "line one()\n/* c\n*/\nline four()";
        let lines = SourceLines::new(src);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines.line(4), Some("line four()"));
        assert_eq!(lines.class(2), Some(LineClass::Comment));
        let code: Vec<_> = lines.code_lines().map(|(i, _)| i).collect();
        assert_eq!(code, vec![0, 3]);
    }
}
