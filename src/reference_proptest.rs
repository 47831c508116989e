//! Property-based tests for the reference grammars.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::fetch::url_key;
    use crate::git::sanitize_token;
    use crate::reference::{GitSource, SourceReference};
    use proptest::prelude::*;

    // ============================================================================
    // SourceReference::parse property tests
    // ============================================================================

    proptest! {
        /// Property: parsing never panics, for any input
        #[test]
        fn parse_never_panics(input in ".*") {
            let _ = SourceReference::parse(&input);
        }

        /// Property: parsing is deterministic (same input = same output)
        #[test]
        fn parse_is_deterministic(input in ".*") {
            let result1 = SourceReference::parse(&input);
            let result2 = SourceReference::parse(&input);
            prop_assert_eq!(result1.is_ok(), result2.is_ok());
            if let (Ok(a), Ok(b)) = (result1, result2) {
                prop_assert_eq!(a, b);
            }
        }

        /// Property: a well-formed git reference round-trips its parts
        #[test]
        fn git_reference_roundtrips_parts(
            host in "[a-z]{1,10}",
            repo in "[a-zA-Z0-9-]{1,15}",
            ref_name in "[a-zA-Z0-9._-]{1,15}",
        ) {
            let reference = format!("git+https://{}.com/org/{}@{}", host, repo, ref_name);
            let parsed = SourceReference::parse(&reference).unwrap();
            prop_assert_eq!(
                parsed,
                SourceReference::Git {
                    url: format!("https://{}.com/org/{}", host, repo),
                    r#ref: ref_name.clone(),
                    subdirectory: None,
                }
            );
        }

        /// Property: the two subdirectory spellings parse to the same shape
        #[test]
        fn subdirectory_spellings_agree(
            repo in "[a-zA-Z0-9-]{1,15}",
            ref_name in "[a-zA-Z0-9._-]{1,15}",
            sub in "[a-zA-Z0-9_-]{1,15}",
        ) {
            let slash =
                SourceReference::parse(&format!("git+https://e.com/{}@{}/{}", repo, ref_name, sub));
            let fragment = SourceReference::parse(&format!(
                "git+https://e.com/{}@{}#subdirectory={}",
                repo, ref_name, sub
            ));
            prop_assert_eq!(slash.unwrap(), fragment.unwrap());
        }

        /// Property: a git marker without an '@ref' is always rejected
        #[test]
        fn git_without_ref_always_fails(body in "[a-zA-Z0-9:/._-]*") {
            prop_assume!(!body.contains('@'));
            let reference = format!("git+{}", body);
            prop_assert!(SourceReference::parse(&reference).is_err());
        }

        /// Property: the strict grammar never silently falls back to a
        /// non-git kind for git-marked input
        #[test]
        fn git_marker_never_parses_as_other_kind(body in ".*") {
            if let Ok(parsed) = SourceReference::parse(&format!("git+{}", body)) {
                prop_assert!(matches!(parsed, SourceReference::Git { .. }), "git-marked input must parse as Git");
            }
        }
    }

    // ============================================================================
    // GitSource::parse property tests
    // ============================================================================

    proptest! {
        /// Property: the lenient grammar accepts refless sources
        #[test]
        fn lenient_refless_source_parses(
            repo in "[a-zA-Z0-9-]{1,15}",
        ) {
            let source = format!("https://e.com/org/{}", repo);
            let parsed = GitSource::parse(&source).unwrap();
            prop_assert_eq!(parsed.url, source);
            prop_assert_eq!(parsed.reference, None);
        }

        /// Property: the git marker is optional and changes nothing
        #[test]
        fn lenient_marker_is_transparent(
            repo in "[a-zA-Z0-9-]{1,15}",
            ref_name in "[a-zA-Z0-9._-]{1,15}",
        ) {
            let bare = GitSource::parse(&format!("https://e.com/{}@{}", repo, ref_name)).unwrap();
            let marked =
                GitSource::parse(&format!("git+https://e.com/{}@{}", repo, ref_name)).unwrap();
            prop_assert_eq!(bare, marked);
        }
    }

    // ============================================================================
    // cache key property tests
    // ============================================================================

    proptest! {
        /// Property: sanitized tokens never contain path separators
        #[test]
        fn sanitize_token_never_contains_slash(input in ".*") {
            prop_assert!(!sanitize_token(&input).contains('/'));
        }

        /// Property: URL keys are always 8 lowercase hex characters
        #[test]
        fn url_key_shape(path in "[a-zA-Z0-9/_-]{0,30}") {
            let key = url_key(&format!("https://example.com/{}", path)).unwrap();
            prop_assert_eq!(key.len(), 8);
            prop_assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        }

        /// Property: URL keys are case-insensitive in the host
        #[test]
        fn url_key_host_case_insensitive(host in "[a-zA-Z]{1,12}") {
            let lower = url_key(&format!("https://{}.com/data", host.to_lowercase())).unwrap();
            let mixed = url_key(&format!("https://{}.com/data", host)).unwrap();
            prop_assert_eq!(lower, mixed);
        }
    }
}
