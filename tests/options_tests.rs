use rrpc::{OptionKey, OptionScope, Options};

const TIMEOUT_MS: OptionKey<u64> = OptionKey::rpc("timeout_ms", 50_001);
const IDEMPOTENT: OptionKey<bool> = OptionKey::service("idempotent", 50_002);
const TIMEOUT_AS_TEXT: OptionKey<String> = OptionKey::file("timeout_text", 50_001);

#[test]
fn test_get_value_by_tag() {
    let options = Options::builder()
        .set(&TIMEOUT_MS, 250)
        .set(&IDEMPOTENT, true)
        .build();

    assert_eq!(options.get_value(&TIMEOUT_MS), Some(&250));
    assert_eq!(options.get_value(&IDEMPOTENT), Some(&true));
    assert_eq!(options.len(), 2);
}

#[test]
fn test_unset_or_mistyped_tag_is_none() {
    let options = Options::builder().set(&TIMEOUT_MS, 250).build();

    assert!(Options::empty().get_value(&TIMEOUT_MS).is_none());
    assert!(options.get_value(&IDEMPOTENT).is_none());
    // Same tag, different value type.
    assert!(options.get_value(&TIMEOUT_AS_TEXT).is_none());
    assert!(options.contains_tag(TIMEOUT_AS_TEXT.tag()));
}

#[test]
fn test_merge_overrides_win() {
    let declared = Options::builder()
        .set(&TIMEOUT_MS, 250)
        .set(&IDEMPOTENT, true)
        .build();
    let per_call = Options::builder().set(&TIMEOUT_MS, 1_000).build();

    let merged = declared.merge(&per_call);

    assert_eq!(merged.get_value(&TIMEOUT_MS), Some(&1_000));
    assert_eq!(merged.get_value(&IDEMPOTENT), Some(&true));
    assert_eq!(declared.get_value(&TIMEOUT_MS), Some(&250));

    let mut tags: Vec<u32> = merged.tags().collect();
    tags.sort_unstable();
    assert_eq!(tags, vec![50_001, 50_002]);
}

#[test]
fn test_key_descriptors() {
    assert_eq!(TIMEOUT_MS.name(), "timeout_ms");
    assert_eq!(TIMEOUT_MS.scope(), OptionScope::Rpc);
    assert_eq!(IDEMPOTENT.scope(), OptionScope::Service);
    assert_eq!(TIMEOUT_AS_TEXT.scope(), OptionScope::File);
}
