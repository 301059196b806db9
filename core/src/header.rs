//! RFC 2047 subject encoding with line folding.
//!
//! # Design
//! Every non-empty subject is emitted as UTF-8 `B` encoded-words, even plain
//! ASCII. Downstream mail processing expects the encoded form, so there is no
//! "already safe" shortcut.
//!
//! Long subjects are split into several encoded-words of at most 75 characters.
//! Splits only happen on `char` boundaries so each word decodes to valid UTF-8
//! on its own. Words are separated by a space and the result is then folded by
//! breaking the line after each `?=` closing marker.

use base64::{engine::general_purpose::STANDARD as B64, Engine};

const WORD_PREFIX: &str = "=?UTF-8?B?";
const WORD_SUFFIX: &str = "?=";
const WORD_SEPARATOR: &str = " ";
const FOLD: &str = "\n";

/// Maximum length of a single encoded-word, including delimiters.
pub const MAX_ENCODED_WORD_LEN: usize = 75;

/// Base64 characters that fit in one word once the delimiters are accounted for.
const MAX_CONTENT_LEN: usize = MAX_ENCODED_WORD_LEN - WORD_PREFIX.len() - WORD_SUFFIX.len();

/// Raw bytes whose base64 form fits in `MAX_CONTENT_LEN`.
const MAX_CHUNK_BYTES: usize = MAX_CONTENT_LEN / 4 * 3;

/// Encode `text` as a folded header value.
///
/// Returns an empty string for empty input. Otherwise every line but the last
/// ends with `?=` followed by `\n`, and continuation lines start with a space.
pub fn encode_subject(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    fold(&encode_words(text))
}

/// Put the encoded `subject` on its own line in front of `message`.
///
/// An empty subject returns `message` unchanged.
pub fn insert_subject(message: &str, subject: &str) -> String {
    let encoded = encode_subject(subject);
    if encoded.is_empty() {
        return message.to_string();
    }
    let mut out = String::with_capacity(encoded.len() + 1 + message.len());
    out.push_str(&encoded);
    out.push_str(FOLD);
    out.push_str(message);
    out
}

/// Encode `text` as one or more space-separated encoded-words.
fn encode_words(text: &str) -> String {
    if base64_len(text.len()) <= MAX_CONTENT_LEN {
        return encoded_word(text.as_bytes());
    }

    let mut words = Vec::new();
    let mut start = 0;
    let mut chunk_len = 0;
    for ch in text.chars() {
        let width = ch.len_utf8();
        if chunk_len + width > MAX_CHUNK_BYTES {
            words.push(encoded_word(&text.as_bytes()[start..start + chunk_len]));
            start += chunk_len;
            chunk_len = 0;
        }
        chunk_len += width;
    }
    words.push(encoded_word(&text.as_bytes()[start..start + chunk_len]));
    words.join(WORD_SEPARATOR)
}

fn encoded_word(bytes: &[u8]) -> String {
    format!("{WORD_PREFIX}{}{WORD_SUFFIX}", B64.encode(bytes))
}

fn base64_len(n: usize) -> usize {
    n.div_ceil(3) * 4
}

/// Break the line after every `?=` except the last one.
///
/// Base64 never produces `?`, so `?=` only ever appears as a word terminator.
fn fold(encoded: &str) -> String {
    let parts: Vec<&str> = encoded.split(WORD_SUFFIX).collect();
    if parts.len() <= 1 {
        return encoded.to_string();
    }

    let mut result = String::with_capacity(encoded.len() + parts.len());
    if let Some((last, rest)) = parts.split_last() {
        for part in rest {
            result.push_str(part);
            result.push_str(WORD_SUFFIX);
            result.push_str(FOLD);
        }
        result.push_str(last);
    }

    match result.strip_suffix(FOLD) {
        Some(trimmed) => trimmed.to_string(),
        None => result,
    }
}
