use std::collections::BTreeSet;

/// Extracts the set of `@`-mention tokens from caption text.
///
/// A mention is `@` followed by one or more word characters (alphanumerics
/// or underscore); any other character ends the token. Duplicates collapse
/// and the leading `@` is not part of the token.
pub fn mentions_from_caption(caption: &str) -> BTreeSet<String> {
    let mut mentions = BTreeSet::new();
    let mut current: Option<String> = None;

    for ch in caption.chars() {
        match current.as_mut() {
            Some(token) => {
                if is_word_char(ch) {
                    token.push(ch);
                } else {
                    if !token.is_empty() {
                        mentions.insert(std::mem::take(token));
                    }
                    current = (ch == '@').then(String::new);
                }
            }
            None => {
                if ch == '@' {
                    current = Some(String::new());
                }
            }
        }
    }
    if let Some(token) = current {
        if !token.is_empty() {
            mentions.insert(token);
        }
    }

    mentions
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
