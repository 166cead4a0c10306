//! Docstring normalization
//!
//! Templates are usually written as an indented block inside the function
//! they describe. Before compiling, the stylistic indentation is removed
//! while content-significant whitespace is kept.

/// Turn a raw documentation string into template text
///
/// Strips a single leading newline, then removes the common leading
/// whitespace of all lines (see [`dedent`]).
pub fn format_docstring(doc: &str) -> String {
    let doc = doc.strip_prefix('\n').unwrap_or(doc);
    dedent(doc)
}

/// Remove common leading whitespace from every line
///
/// Lines that consist only of spaces and tabs are normalized to empty lines
/// and do not take part in computing the common margin. The margin is
/// compared as an exact prefix, so a tab never matches spaces.
pub fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();

    let mut margin: Option<&str> = None;
    for line in &lines {
        if is_blank(line) {
            continue;
        }
        let indent = leading_whitespace(line);
        margin = Some(match margin {
            None => indent,
            Some(current) => common_prefix(current, indent),
        });
    }
    let margin = margin.unwrap_or("");

    lines
        .iter()
        .map(|line| {
            if is_blank(line) {
                ""
            } else {
                &line[margin.len()..]
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c == ' ' || c == '\t')
}

fn leading_whitespace(line: &str) -> &str {
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dedent_common_margin() {
        let text = "    Hello\n      world\n    !";
        assert_eq!(dedent(text), "Hello\n  world\n!");
    }

    #[test]
    fn test_dedent_blank_lines_ignored() {
        let text = "    a\n\n  \n    b\n    ";
        assert_eq!(dedent(text), "a\n\n\nb\n");
    }

    #[test]
    fn test_dedent_mixed_tabs_and_spaces() {
        let text = "\tx\n    y";
        assert_eq!(dedent(text), "\tx\n    y");
    }

    #[test]
    fn test_dedent_no_indentation() {
        assert_eq!(dedent("plain text"), "plain text");
    }

    #[test]
    fn test_format_docstring_strips_one_leading_newline() {
        let doc = "\n    Hello {{ name }}\n    ";
        assert_eq!(format_docstring(doc), "Hello {{ name }}\n");
    }

    #[test]
    fn test_format_docstring_keeps_second_newline() {
        let doc = "\n\n  x";
        assert_eq!(format_docstring(doc), "\nx");
    }

    #[test]
    fn test_format_docstring_single_line() {
        let doc = "Hello {{ name|upper }}, you are {{ age }} years old.";
        assert_eq!(format_docstring(doc), doc);
    }
}
