//! Backslash escaping for inline text.

/// Characters that always need a backslash in exported plain text.
const ALWAYS_ESCAPED: &[char] = &['\\', '*', '~', '`', '[', ']'];

/// Inside an `_` span an intraword underscore would close it.
const STRICT_ESCAPED: &[char] = &['\\', '*', '~', '`', '[', ']', '_'];

/// Prefix every occurrence of `chars` with a backslash.
pub fn escape_chars(text: &str, chars: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if chars.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape plain text so a later import reads it back as the same characters.
///
/// `_` is left alone between two alphanumerics, where it can never open or close a tag.
pub fn escape_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, c) in chars.iter().enumerate() {
        let escape = match c {
            '_' => {
                let before = i.checked_sub(1).and_then(|j| chars.get(j));
                let after = chars.get(i + 1);
                !(before.is_some_and(|b| b.is_alphanumeric())
                    && after.is_some_and(|a| a.is_alphanumeric()))
            }
            c => ALWAYS_ESCAPED.contains(c),
        };
        if escape {
            out.push('\\');
        }
        out.push(*c);
    }
    out
}

/// Like [`escape_text`] but escapes every `_`, for text written inside `_` italics.
pub fn escape_text_strict(text: &str) -> String {
    escape_chars(text, STRICT_ESCAPED)
}

/// Drop the backslash in front of ASCII punctuation. Other backslashes are literal.
pub fn unescape_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.peek().copied().filter(char::is_ascii_punctuation) {
                out.push(next);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Drop the backslash in front of any character.
pub fn unescape_all(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}
