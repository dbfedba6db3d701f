use proptest::prelude::*;
use veil_core::MaskConfig;
use veil_text::TextRedactor;

// One PII value, a plain word, or a non-Latin word.
fn piece() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("jane.doe@example.com".to_string()),
        "[0-9]{3}-[0-9]{2}-[0-9]{4}",
        "\\(?[0-9]{3}\\)? ?[0-9]{3}-[0-9]{4}",
        "[0-9]{1,2}/[0-9]{1,2}/(19|20)[0-9]{2}",
        "[0-9]{1,4} [A-Z][a-z]{2,8} (St|Ave|Rd)",
        "[0-9]{5}",
        "[0-9]{9,12}",
        "(电话|邮箱|社保号|résumé|naïve|Straße)",
        "[a-z]{1,8}",
    ]
}

fn separator() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(" ".to_string()),
        Just("，".to_string()),
        Just("\n".to_string()),
    ]
}

fn document() -> impl Strategy<Value = String> {
    proptest::collection::vec((piece(), separator()), 0..12)
        .prop_map(|parts| parts.into_iter().map(|(p, s)| p + &s).collect())
}

proptest! {
    #[test]
    fn second_pass_never_adds_hits(text in document()) {
        let redactor = TextRedactor::new(&MaskConfig::default());
        let first = redactor.redact(&text);
        let second = redactor.redact(&first.masked_text);
        prop_assert!(
            second.hit_count <= first.hit_count,
            "first {} hits, second {} hits on {:?}",
            first.hit_count,
            second.hit_count,
            first.masked_text
        );
    }

    #[test]
    fn redaction_is_deterministic(text in document()) {
        let redactor = TextRedactor::new(&MaskConfig::default());
        prop_assert_eq!(redactor.redact(&text), redactor.redact(&text));
    }
}
