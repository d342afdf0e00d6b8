//! Property-based tests for model output cleanup
//!
//! - Cleanup is idempotent
//! - The end marker never survives
//! - Output is always trimmed
//! - Output never grows

use super::{postprocess, END_MARKER};
use proptest::prelude::*;

/// Fragments that exercise markers, terminators and mixed scripts
fn arb_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(END_MARKER.to_string()),
        Just("<END".to_string()),
        Just(".".to_string()),
        Just("!".to_string()),
        Just("?".to_string()),
        Just("؟".to_string()),
        Just("؛".to_string()),
        Just("…".to_string()),
        Just(" ".to_string()),
        Just("\n".to_string()),
        "[a-zA-Z ]{1,12}",
        "[ابتثجحخدذرزسشصضطظعغفقكلمنهوي ]{1,12}",
    ]
}

fn arb_model_output() -> impl Strategy<Value = String> {
    proptest::collection::vec(arb_fragment(), 0..24).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_postprocess_idempotent(raw in arb_model_output()) {
        let once = postprocess(&raw);
        prop_assert_eq!(postprocess(&once), once);
    }

    #[test]
    fn prop_postprocess_idempotent_any_string(raw in any::<String>()) {
        let once = postprocess(&raw);
        prop_assert_eq!(postprocess(&once), once);
    }

    #[test]
    fn prop_no_marker_survives(raw in arb_model_output()) {
        prop_assert!(!postprocess(&raw).contains(END_MARKER));
    }

    #[test]
    fn prop_output_trimmed_and_not_longer(raw in arb_model_output()) {
        let out = postprocess(&raw);
        prop_assert_eq!(out.trim(), out.as_str());
        prop_assert!(out.len() <= raw.len());
    }
}
