//! Property-based tests for request assembly
//!
//! - The persona prompt is always first and the only system message
//! - The new user message is always last
//! - Well-formed user/assistant entries appear in stored order, nothing else does

use super::{assemble, PERSONA_PROMPT};
use crate::history::{ConversationRecord, Role};
use proptest::prelude::*;
use serde_json::{json, Value};

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z .!?]{0,16}",
        "[ابتثجحخدذرزسشصضطظعغفقكلمنهوي ؟]{0,16}",
    ]
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Assistant), Just(Role::System)]
}

/// Stored entries, well-formed or not, paired with the record they should
/// produce in the request
fn arb_entry() -> impl Strategy<Value = (Value, Option<ConversationRecord>)> {
    prop_oneof![
        (arb_role(), arb_text()).prop_map(|(role, content)| {
            let record = ConversationRecord::new(role, content);
            let expected = (role != Role::System).then(|| record.clone());
            (record.to_entry(), expected)
        }),
        arb_text().prop_map(|content| (json!({"content": content}), None)),
        arb_text().prop_map(|content| (json!({"role": "tool", "content": content}), None)),
        any::<i64>().prop_map(|n| (json!({"role": "user", "content": n}), None)),
        arb_text().prop_map(|s| (json!(s), None)),
        Just((Value::Null, None)),
        Just((json!([1, 2]), None)),
    ]
}

proptest! {
    #[test]
    fn prop_assemble_order(
        entries in proptest::collection::vec(arb_entry(), 0..20),
        message in arb_text(),
    ) {
        let (raw, expected): (Vec<Value>, Vec<Option<ConversationRecord>>) =
            entries.into_iter().unzip();

        let messages = assemble(&raw, &message);

        prop_assert_eq!(messages.first(), Some(&ConversationRecord::system(PERSONA_PROMPT)));
        prop_assert_eq!(messages.last(), Some(&ConversationRecord::user(message.as_str())));
        prop_assert_eq!(
            messages.iter().filter(|m| m.role == Role::System).count(),
            1
        );

        let middle: Vec<ConversationRecord> = expected.into_iter().flatten().collect();
        prop_assert_eq!(&messages[1..messages.len() - 1], middle.as_slice());
    }
}
