//! MarkdownV2 helpers for the poll messages

/// Escapes every character MarkdownV2 treats as markup.
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 2);

    for c in text.chars() {
        if matches!(
            c,
            '\\' | '_'
                | '*'
                | '['
                | ']'
                | '('
                | ')'
                | '~'
                | '`'
                | '>'
                | '#'
                | '+'
                | '-'
                | '='
                | '|'
                | '{'
                | '}'
                | '.'
                | '!'
        ) {
            result.push('\\');
        }
        result.push(c);
    }

    result
}

/// Escaped text wrapped in italics.
pub fn italic(text: &str) -> String {
    format!("_{}_", escape_markdown(text))
}
