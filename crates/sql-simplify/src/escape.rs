//! Character-level escaping for values inlined into MySQL-style statements.
//!
//! This is a blacklist: each listed character is prefixed with a backslash and
//! everything else passes through. It works one character at a time, so it is
//! not idempotent and does not understand tokens. Prefer server-side binding
//! when the driver offers it.
//!
//! The escapes also change stored data. MySQL drops the backslash of `\'` or
//! `\-`, but keeps it in `\_` and `\%` outside a LIKE pattern, so inserting
//! `o_neil@example.com` stores `o\_neil@example.com`. Rows read back are not
//! unescaped.

/// Characters that get a backslash prefix.
pub(crate) const ESCAPED_CHARS: &[char] = &[
    '\'', '"', '\\', ';', '*', '%', '_', '(', ')', '-', '=', '>', '<', '|', '!', '@',
];

fn needs_escape(c: char) -> bool {
    ESCAPED_CHARS.contains(&c)
}

/// Escape `input` by prefixing every blacklisted character with `\`.
///
/// Multi-character sequences such as `--` or `/*` are neutralised through
/// their single characters (`-` and `*`).
///
/// MySQL keeps the backslash of `\_` and `\%` outside LIKE patterns, so values
/// containing `_` or `%` are stored with the backslash.
pub fn escape_char(input: &str) -> String {
    let extra = input.chars().filter(|c| needs_escape(*c)).count();
    let mut out = String::with_capacity(input.len() + extra);
    for c in input.chars() {
        if needs_escape(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape `input` for a standard SQL single-quoted literal (`'` doubled).
pub(crate) fn escape_standard(input: &str) -> String {
    input.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(escape_char("Bob"), "Bob");
        assert_eq!(escape_char("john example com"), "john example com");
        assert_eq!(escape_char(""), "");
    }

    #[test]
    fn every_listed_char_gets_a_backslash() {
        assert_eq!(escape_char("'"), "\\'");
        assert_eq!(escape_char("\""), "\\\"");
        assert_eq!(escape_char("\\"), "\\\\");
        assert_eq!(escape_char("a_b%c"), "a\\_b\\%c");
        assert_eq!(escape_char("x@y!z|w"), "x\\@y\\!z\\|w");
        assert_eq!(escape_char("(1=1)"), "\\(1\\=1\\)");
        assert_eq!(escape_char("<>"), "\\<\\>");
    }

    #[test]
    fn comment_sequences_are_split_per_char() {
        assert_eq!(escape_char("--"), "\\-\\-");
        assert_eq!(escape_char("/*"), "/\\*");
        assert_eq!(escape_char("'; DROP TABLE users; --"), "\\'\\; DROP TABLE users\\; \\-\\-");
    }

    #[test]
    fn escaping_twice_changes_the_output() {
        let once = escape_char("it's");
        let twice = escape_char(&once);
        assert_eq!(once, "it\\'s");
        assert_eq!(twice, "it\\\\\\'s");
    }

    #[test]
    fn wildcards_keep_their_backslash() {
        // Stored verbatim by MySQL outside LIKE patterns.
        assert_eq!(escape_char("o_neil@example.com"), "o\\_neil\\@example.com");
        assert_eq!(escape_char("100%"), "100\\%");
    }

    #[test]
    fn non_ascii_passes_through() {
        assert_eq!(escape_char("Zoë-李"), "Zoë\\-李");
    }

    #[test]
    fn standard_escaping_doubles_quotes() {
        assert_eq!(escape_standard("it's"), "it''s");
        assert_eq!(escape_standard("a\\b"), "a\\b");
    }
}
