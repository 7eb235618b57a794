//! In-memory `ILIKE`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    AnyRun,
    AnyOne,
    Literal(char),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => Token::AnyRun,
            '_' => Token::AnyOne,
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            c => Token::Literal(c),
        });
    }
    tokens
}

/// Case-insensitive SQL `LIKE`: `%` matches any run of characters, `_`
/// exactly one, and a backslash escapes the next character.
pub fn ilike_match(pattern: &str, text: &str) -> bool {
    let tokens = tokenize(&pattern.to_lowercase());
    let text: Vec<char> = text.to_lowercase().chars().collect();

    let (mut p, mut t) = (0, 0);
    // Last `%` seen and the text position it is currently absorbing up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match tokens.get(p) {
            Some(Token::AnyRun) => {
                backtrack = Some((p, t));
                p += 1;
                continue;
            }
            Some(Token::AnyOne) => {
                p += 1;
                t += 1;
                continue;
            }
            Some(Token::Literal(c)) if *c == text[t] => {
                p += 1;
                t += 1;
                continue;
            }
            _ => {}
        }
        match backtrack {
            Some((star, absorbed)) => {
                p = star + 1;
                t = absorbed + 1;
                backtrack = Some((star, absorbed + 1));
            }
            None => return false,
        }
    }

    tokens[p..].iter().all(|t| *t == Token::AnyRun)
}

/// True when the pattern ends in an unpaired backslash, which Postgres
/// rejects outright.
pub fn has_dangling_escape(pattern: &str) -> bool {
    pattern.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::{has_dangling_escape, ilike_match};

    #[test]
    fn wildcards() {
        assert!(ilike_match("%ice", "Alice"));
        assert!(ilike_match("al%", "ALICE"));
        assert!(ilike_match("%LI%", "alice"));
        assert!(ilike_match("a_ice", "alice"));
        assert!(ilike_match("%", ""));
        assert!(ilike_match("%a%b%", "xxaYYbZZ"));
        assert!(!ilike_match("%ice", "alicia"));
        assert!(!ilike_match("a_ice", "aice"));
        assert!(!ilike_match("", "a"));
    }

    #[test]
    fn escapes_are_literal() {
        assert!(ilike_match("100\\%", "100%"));
        assert!(!ilike_match("100\\%", "1000"));
        assert!(ilike_match("a\\_b", "a_b"));
        assert!(!ilike_match("a\\_b", "axb"));
    }

    #[test]
    fn trailing_escape_detection() {
        assert!(has_dangling_escape("%abc\\"));
        assert!(has_dangling_escape("\\\\\\"));
        assert!(!has_dangling_escape("%abc\\\\"));
        assert!(!has_dangling_escape("%abc\\%"));
        assert!(!has_dangling_escape(""));
    }

    #[test]
    fn non_ascii_case_folding() {
        assert!(ilike_match("%ÉCOLE%", "une école"));
    }
}
