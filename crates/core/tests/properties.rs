//! Property tests over templates assembled from well-formed pieces.

mod common;

use common::fields;
use etch_core::{emit_template, infer_positional, tokenize};
use proptest::prelude::*;

fn piece() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("{}".to_string()),
        Just("{:d}".to_string()),
        Just("{!r}".to_string()),
        Just("{[k]}".to_string()),
        Just("{x}".to_string()),
        Just("{3}".to_string()),
        Just("{{".to_string()),
        Just("}}".to_string()),
        "[a-z ]{0,5}",
    ]
}

fn template() -> impl Strategy<Value = String> {
    prop::collection::vec(piece(), 0..12).prop_map(|pieces| pieces.concat())
}

proptest! {
    #[test]
    fn inference_is_idempotent(t in template()) {
        let once = infer_positional(&t);
        prop_assert_eq!(infer_positional(&once), once);
    }

    #[test]
    fn anonymous_fields_are_numbered_in_order(t in template()) {
        let raw = tokenize(&t, false).unwrap();
        let inferred = tokenize(&t, true).unwrap();
        let raw_fields = fields(&raw);
        let inferred_fields = fields(&inferred);
        prop_assert_eq!(raw_fields.len(), inferred_fields.len());

        let mut next = 0usize;
        for (before, after) in raw_fields.iter().zip(&inferred_fields) {
            if before.is_anonymous() {
                prop_assert_eq!(after.base_name(), next.to_string());
                prop_assert_eq!(before.subpath(), after.subpath());
                prop_assert_eq!(before.conversion(), after.conversion());
                next += 1;
            } else {
                prop_assert_eq!(before.name(), after.name());
            }
        }
    }

    #[test]
    fn emitted_tokens_tokenize_back(t in template()) {
        let tokens = tokenize(&t, false).unwrap();
        prop_assert_eq!(tokenize(&emit_template(&tokens), false).unwrap(), tokens);
    }
}
