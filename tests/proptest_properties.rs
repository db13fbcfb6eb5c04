//! Property-based tests for the translator
//!
//! These generate random programs and check that:
//! 1. Balanced bracket programs always translate into a well formed module
//! 2. Stray brackets are always reported, never panicked on
//! 3. Comments never change the generated module
//! 4. Cell arithmetic wraps at 8 bits

use bfc::{
    interpreter::ir_interpreter::run_module,
    translator::{translate, TranslateError, ENTRY_FUNCTION},
};
use proptest::prelude::*;

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

/// Straight line code, no brackets
fn straight_line() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!['+', '-', '>', '<', '.', ',']), 0..20)
        .prop_map(|chars| chars.into_iter().collect())
}

/// Correctly nested programs
fn balanced_program() -> impl Strategy<Value = String> {
    straight_line().prop_recursive(4, 64, 4, |inner| {
        prop::collection::vec(
            prop_oneof![
                inner.clone(),
                inner.prop_map(|body| format!("[{}]", body)),
            ],
            1..4,
        )
        .prop_map(|parts| parts.concat())
    })
}

/// Bytes that are never instructions
fn comment() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 \t\n#!?]{0,8}").unwrap()
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn balanced_programs_translate(src in balanced_program()) {
        let module = translate(src.as_bytes()).unwrap();
        prop_assert_eq!(module.verify(ENTRY_FUNCTION), Ok(()));

        let loops = src.matches('[').count();
        let blocks = module.function(ENTRY_FUNCTION).unwrap().blocks.len();
        prop_assert_eq!(blocks, 1 + 2 * loops);
    }

    #[test]
    fn arbitrary_bytes_never_panic(src in prop::collection::vec(any::<u8>(), 0..200)) {
        match translate(&src) {
            Ok(module) => prop_assert_eq!(module.verify(ENTRY_FUNCTION), Ok(())),
            Err(TranslateError::UnmatchedClose { position })
            | Err(TranslateError::UnmatchedOpen { position, .. }) => {
                prop_assert!(position.offset < src.len());
            }
        }
    }

    #[test]
    fn extra_open_is_unmatched_open(src in balanced_program()) {
        let src = format!("[{}", src);
        let is_unmatched_open = matches!(
            translate(src.as_bytes()),
            Err(TranslateError::UnmatchedOpen { depth: 1, .. })
        );
        prop_assert!(is_unmatched_open);
    }

    #[test]
    fn early_close_is_unmatched_close(prefix in straight_line(), rest in balanced_program()) {
        let src = format!("{}]{}", prefix, rest);
        let is_unmatched_close = matches!(
            translate(src.as_bytes()),
            Err(TranslateError::UnmatchedClose { position }) if position.offset == prefix.len()
        );
        prop_assert!(is_unmatched_close);
    }

    #[test]
    fn comments_change_nothing(
        parts in prop::collection::vec((comment(), prop::sample::select(vec!['+', '-', '>', '<', '.', ',', '[', ']'])), 0..30),
        tail in comment(),
    ) {
        let mut noisy = String::new();
        let mut clean = String::new();
        for (c, instruction) in parts {
            noisy.push_str(&c);
            noisy.push(instruction);
            clean.push(instruction);
        }
        noisy.push_str(&tail);

        // error positions shift with the comments, only the kind has to agree
        match (translate(noisy.as_bytes()), translate(clean.as_bytes())) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => {
                prop_assert_eq!(std::mem::discriminant(&a), std::mem::discriminant(&b))
            }
            (a, b) => prop_assert!(false, "{:?} vs {:?}", a, b),
        }
    }

    #[test]
    fn cells_wrap_at_eight_bits(ups in 0usize..600, downs in 0usize..600) {
        let src = format!("{}{}.", "+".repeat(ups), "-".repeat(downs));
        let module = translate(src.as_bytes()).unwrap();
        let mut output = vec![];
        run_module(&module, Box::new(std::io::empty()), Box::new(&mut output), None).unwrap();

        let expected = (ups as i64 - downs as i64).rem_euclid(256) as u8;
        prop_assert_eq!(output, vec![expected]);
    }
}
