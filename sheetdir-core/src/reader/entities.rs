//! Decoding of the predefined XML entities in sheet names

use std::borrow::Cow;

const ENTITIES: [(&str, char); 5] = [
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&amp;", '&'),
    ("&quot;", '"'),
    ("&apos;", '\''),
];

/// Replace the five predefined XML entities with the characters they stand for.
///
/// Only `&lt;`, `&gt;`, `&amp;`, `&quot;` and `&apos;` are decoded, matched
/// case-sensitively. Any other `&...;` sequence, numeric character references
/// included, is kept verbatim, as is an `&` with no `;` after it.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').and_then(|semi| {
            let candidate = &rest[..=semi];
            ENTITIES
                .iter()
                .find(|(entity, _)| *entity == candidate)
                .map(|(_, ch)| (*ch, semi + 1))
        });

        match decoded {
            Some((ch, consumed)) => {
                result.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);
    Cow::Owned(result)
}
