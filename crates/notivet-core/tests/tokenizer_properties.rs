//! Property tests for query tokenization.

use notivet_core::matcher::{normalize_text, tokenize, MatcherError, QueryTokens};
use proptest::prelude::*;

proptest! {
    #[test]
    fn tokens_are_lowercase_alphanumeric(text in "[a-zA-Z0-9 ,.!?;:()'-]{0,60}") {
        for token in tokenize(&text) {
            prop_assert!(!token.is_empty());
            prop_assert!(token
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn alphanumeric_input_yields_tokens(text in "[ ,.!?-]{0,10}[a-zA-Z0-9][a-zA-Z0-9 ,.!?-]{0,40}") {
        let tokens = QueryTokens::from_query(&text).unwrap();
        prop_assert!(!tokens.is_empty());
    }

    #[test]
    fn punctuation_only_is_rejected(text in "[ ,.!?;:()'\\-\t]{0,30}") {
        let result = QueryTokens::from_query(&text);
        prop_assert!(matches!(result, Err(MatcherError::InvalidQuery(_))));
    }

    #[test]
    fn normalize_is_idempotent(text in "\\PC{0,60}") {
        let once = normalize_text(&text);
        prop_assert_eq!(normalize_text(&once), once.clone());
    }

    #[test]
    fn normalized_text_tokenizes_the_same(text in "\\PC{0,60}") {
        prop_assert_eq!(tokenize(&normalize_text(&text)), tokenize(&text));
    }

    #[test]
    fn case_does_not_change_tokens(text in "[a-zA-Z0-9 ]{0,40}") {
        prop_assert_eq!(tokenize(&text.to_uppercase()), tokenize(&text));
    }
}
