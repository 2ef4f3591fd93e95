//! Bracket-aware helpers for type signature strings.
//!
//! `(`, `[` and `<` all nest; the `>` of a function arrow `->` does not
//! close anything.

fn is_open(c: char) -> bool {
    matches!(c, '(' | '[' | '<')
}

fn is_close(c: char, prev: char) -> bool {
    matches!(c, ')' | ']') || (c == '>' && prev != '-')
}

/// Yields every char of `s` with the bracket depth it sits at. Brackets
/// themselves report the depth outside of them.
fn depths(s: &str) -> impl Iterator<Item = (usize, char, usize)> + '_ {
    let mut depth = 0usize;
    let mut prev = '\0';
    s.char_indices().map(move |(i, c)| {
        let at = if is_open(c) {
            depth += 1;
            depth - 1
        } else if is_close(c, prev) {
            depth = depth.saturating_sub(1);
            depth
        } else {
            depth
        };
        prev = c;
        (i, c, at)
    })
}

/// Byte index of the bracket closing the one at `open`.
pub fn matching_close(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut prev = '\0';
    for (i, c) in s.get(open..)?.char_indices() {
        if is_open(c) {
            depth += 1;
        } else if is_close(c, prev) {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(open + i);
            }
        }
        prev = c;
    }
    None
}

/// Byte index of the first `target` outside any brackets.
pub fn find_top_level(s: &str, target: char) -> Option<usize> {
    depths(s)
        .find(|&(_, c, depth)| c == target && depth == 0)
        .map(|(i, _, _)| i)
}

/// Splits on `sep` outside any brackets. Pieces are not trimmed.
pub fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (i, c, depth) in depths(s) {
        if c == sep && depth == 0 {
            pieces.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    pieces.push(&s[start..]);
    pieces
}

/// Splits a function type on its top-level arrows.
pub fn split_arrows(s: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (i, c, depth) in depths(s) {
        if c == '-' && depth == 0 && s[i + 1..].starts_with('>') {
            pieces.push(s[start..i].trim());
            start = i + 2;
        }
    }
    pieces.push(s[start..].trim());
    pieces
}

/// Removes every `<...>` group, e.g. `Sub2<A, B>.Inner` becomes `Sub2.Inner`.
pub fn strip_generic_suffixes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find('<') {
        let Some(close) = matching_close(rest, open) else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    out
}

/// The comma separated names inside the first `<...>` group.
pub fn generic_parameters(s: &str) -> Vec<String> {
    let Some(open) = s.find('<') else {
        return Vec::new();
    };
    let Some(close) = matching_close(s, open) else {
        return Vec::new();
    };
    split_top_level(&s[open + 1..close], ',')
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Drops one pair of parentheses enclosing the whole string.
pub fn strip_parens(s: &str) -> &str {
    let s = s.trim();
    if s.starts_with('(') && matching_close(s, 0) == Some(s.len() - 1) {
        s[1..s.len() - 1].trim()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_scanning_skips_nested_brackets() {
        assert_eq!(find_top_level("[String: Int]", ':'), None);
        assert_eq!(find_top_level("String: [Int: Bool]", ':'), Some(6));
        assert_eq!(
            split_top_level("A, Sub2<B, C>, (D, E) -> F", ','),
            vec!["A", " Sub2<B, C>", " (D, E) -> F"]
        );
    }

    #[test]
    fn arrows_do_not_close_generics() {
        assert_eq!(matching_close("<(A) -> B>", 0), Some(9));
        assert_eq!(
            split_arrows("(Test14a.Type) -> (one: Int, two: String) -> Test14a"),
            vec!["(Test14a.Type)", "(one: Int, two: String)", "Test14a"]
        );
        assert_eq!(split_arrows("((Int) -> Int) -> Int").len(), 2);
    }

    #[test]
    fn generic_names() {
        assert_eq!(strip_generic_suffixes("Sub2<A, B>"), "Sub2");
        assert_eq!(strip_generic_suffixes("Box<Array<T>>.Index"), "Box.Index");
        assert_eq!(strip_generic_suffixes("Plain"), "Plain");
        assert_eq!(generic_parameters("Sub3<A, B, C>"), vec!["A", "B", "C"]);
        assert!(generic_parameters("Plain").is_empty());
        assert_eq!(strip_parens(" (one: Int) "), "one: Int");
        assert_eq!(strip_parens("(A) -> (B)"), "(A) -> (B)");
    }
}
