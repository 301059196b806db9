//! Subject encoding checked against a standard MIME header decoder and with
//! generated inputs.

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use proptest::prelude::*;
use quickmail_core::encode_subject;

/// Decode with mailparse the way a receiving mail client would.
fn mime_decode(encoded: &str) -> String {
    let raw = format!("Subject: {}\r\n", encoded.replace('\n', "\r\n"));
    let (header, _) = mailparse::parse_header(raw.as_bytes()).unwrap();
    header.get_value()
}

/// Concatenate the payloads of every encoded-word, line by line.
fn decode_words(encoded: &str) -> Vec<u8> {
    encoded
        .split('\n')
        .flat_map(|line| {
            let word = line
                .trim_start()
                .strip_prefix("=?UTF-8?B?")
                .and_then(|w| w.strip_suffix("?="))
                .unwrap();
            B64.decode(word).unwrap()
        })
        .collect()
}

#[test]
fn mime_decoder_recovers_short_subjects() {
    for subject in ["Hello", "Grüße aus Köln", "日本語の件名", "Re: 🦀 crab news"] {
        assert_eq!(mime_decode(&encode_subject(subject)), subject);
    }
}

#[test]
fn mime_decoder_recovers_folded_subjects() {
    let subject = "Ein ziemlich langer Betreff mit Umlauten wie ä, ö und ü, der gefaltet werden muss";
    let encoded = encode_subject(subject);
    assert!(encoded.contains('\n'), "subject should span several lines");
    assert_eq!(mime_decode(&encoded), subject);

    let subject = "長い件名".repeat(12);
    assert_eq!(mime_decode(&encode_subject(&subject)), subject);
}

#[test]
fn empty_subject_encodes_to_nothing() {
    assert_eq!(encode_subject(""), "");
}

proptest! {
    #[test]
    fn lines_fit_and_fold_after_closing_marker(subject in "\\PC{1,200}") {
        let encoded = encode_subject(&subject);
        let lines: Vec<&str> = encoded.split('\n').collect();
        for line in &lines {
            // 75-character word plus the folding space.
            prop_assert!(line.chars().count() <= 76, "line too long: {line:?}");
            prop_assert!(line.ends_with("?="));
        }
        for line in lines.iter().skip(1) {
            prop_assert!(line.starts_with(' '));
        }
    }

    #[test]
    fn words_decode_back_to_input(subject in "\\PC{1,200}") {
        let encoded = encode_subject(&subject);
        prop_assert_eq!(String::from_utf8(decode_words(&encoded)).unwrap(), subject);
    }

    #[test]
    fn encoding_is_deterministic(subject in ".{0,120}") {
        prop_assert_eq!(encode_subject(&subject), encode_subject(&subject));
    }
}
