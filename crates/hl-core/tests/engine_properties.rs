use hl_core::hash::digest_str;
use hl_core::matcher::contains_blocked_word;
use hl_core::scrub::{scrub, FixedReplacement};
use hl_core::site::{canonical_site, is_site_blocked};
use hl_core::{canonical_phrase, DigestSet, Sha256Digester};

fn set(entries: &[&str]) -> DigestSet {
    DigestSet::from_plaintext(entries.iter().copied())
}

fn scrub_text(text: &str, blocked: &DigestSet) -> (String, usize, Vec<(usize, usize)>) {
    let mut source = FixedReplacement("wellness".to_string());
    let out = scrub(&Sha256Digester, text, blocked, 6, &mut source).unwrap();
    let spans = out.spans.iter().map(|s| (s.start_word, s.end_word)).collect();
    (out.text, out.match_count, spans)
}

#[test]
fn digest_is_deterministic_and_normalized() {
    assert_eq!(digest_str("chair"), digest_str("chair"));
    assert_eq!(digest_str(" X "), digest_str("x"));
}

#[test]
fn word_check_matches_iff_some_word_is_blocked() {
    let blocked = set(&["chair", "lamp"]);
    let cases = [
        ("I sat on a chair", true),
        ("the LAMP is on", true),
        ("chairs and lamps", false),
        ("", false),
        ("   ", false),
    ];
    for (text, expected) in cases {
        assert_eq!(
            contains_blocked_word(&Sha256Digester, text, &blocked).unwrap(),
            expected,
            "text: {:?}",
            text
        );
    }
}

#[test]
fn scrub_without_matches_is_identity() {
    let blocked = set(&["chair"]);
    for text in ["", "hello", "  spaced   out  ", "punctuation, only!"] {
        let (out, count, _) = scrub_text(text, &blocked);
        assert_eq!(count, 0);
        assert_eq!(out, text);
    }
}

#[test]
fn scrub_is_idempotent() {
    let blocked = set(&["chair", "big table", "red"]);
    let (first, count, _) = scrub_text("A red chair by the BIG table.", &blocked);
    assert_eq!(count, 3);
    let (second, count, _) = scrub_text(&first, &blocked);
    assert_eq!(count, 0);
    assert_eq!(second, first);
}

#[test]
fn spans_never_share_a_word() {
    let blocked = set(&["a", "a b", "b c", "c d e", "e"]);
    let (_, _, spans) = scrub_text("a b c d e a b c d e", &blocked);
    let mut seen = std::collections::HashSet::new();
    for (start, end) in spans {
        for i in start..end {
            assert!(seen.insert(i), "word {} claimed twice", i);
        }
    }
}

#[test]
fn longest_match_is_preferred() {
    let blocked = set(&["a b", "a b c"]);
    let (text, count, spans) = scrub_text("a b c", &blocked);
    assert_eq!(count, 1);
    assert_eq!(spans, vec![(0, 3)]);
    assert_eq!(text, "wellness");
}

#[test]
fn unmatched_identical_text_elsewhere_is_untouched() {
    // "chair" inside "armchair" is not a word of its own.
    let blocked = set(&["chair"]);
    let (text, count, _) = scrub_text("armchair or chair", &blocked);
    assert_eq!(count, 1);
    assert_eq!(text, "armchair or wellness");
}

#[test]
fn site_granularity() {
    let domain = set(&["example.com"]);
    assert!(is_site_blocked(&Sha256Digester, "https://www.example.com/anything", &domain));

    let page = set(&["example.com/page"]);
    assert!(!is_site_blocked(&Sha256Digester, "example.com/other", &page));
    assert!(is_site_blocked(&Sha256Digester, "example.com/page", &page));
}

#[test]
fn site_entry_normalization_round_trip() {
    let canonical = canonical_site("WWW.EXAMPLE.COM/").unwrap();
    assert_eq!(digest_str(&canonical), digest_str("example.com"));
}

#[test]
fn scenario_a_word_scrub() {
    let blocked = DigestSet::from_iter([digest_str("chair")]);
    assert!(contains_blocked_word(&Sha256Digester, "I sat on a chair", &blocked).unwrap());

    let mut source = || "wellness".to_string();
    let out = scrub(&Sha256Digester, "I sat on a chair", &blocked, 6, &mut source).unwrap();
    assert_eq!(out.text, "I sat on a wellness");
    assert_eq!(out.match_count, 1);
}

#[test]
fn phrase_entry_round_trip() {
    let entries = ["don't", "sit  down", "E-mail", "ΟΔΟΣ"];
    let blocked: DigestSet = entries
        .iter()
        .filter_map(|e| canonical_phrase(e))
        .map(|c| digest_str(&c))
        .collect();

    let cases = [
        ("I don't know", "I wellness know"),
        ("please sit  down", "please wellness"),
        ("send e-mail", "send wellness"),
        ("ΟΔΟΣ", "wellness"),
    ];
    for (text, expected) in cases {
        let (scrubbed, count, _) = scrub_text(text, &blocked);
        assert_eq!(scrubbed, expected, "text: {:?}", text);
        assert_eq!(count, 1);
    }
}

#[test]
fn uppercase_final_sigma_word_matches_itself() {
    let blocked = set(&["ΟΔΟΣ"]);
    assert!(contains_blocked_word(&Sha256Digester, "ΟΔΟΣ", &blocked).unwrap());
    assert!(contains_blocked_word(&Sha256Digester, "στην ΟΔΟΣ.", &blocked).unwrap());
}
