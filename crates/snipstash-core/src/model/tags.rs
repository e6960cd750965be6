//! Tag list normalization
//!
//! Tags are stored as a free-text comma-delimited string. Reads always
//! normalize to a trimmed, deduplicated list that preserves first-seen
//! order.

/// Convert a stored tag string into a normalized tag list.
///
/// Empty segments are dropped, surrounding whitespace is trimmed, and
/// duplicates are removed while keeping the original ordering.
pub fn build_tags_vec(tags: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    for tag in tags.split(',') {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }

    out
}

/// Convert a tag list back into its storage/display form.
pub fn tags_list(tags: &[String]) -> String {
    tags.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_build_tags_vec_normalizes() {
        assert_eq!(
            build_tags_vec("alpha, beta,alpha , ,gamma"),
            vec!["alpha", "beta", "gamma"]
        );
        assert_eq!(build_tags_vec(""), Vec::<String>::new());
        assert_eq!(build_tags_vec(" , ,,"), Vec::<String>::new());
    }

    #[test]
    fn test_tags_list_round_trip() {
        let tags = build_tags_vec("one,two, three");
        assert_eq!(tags_list(&tags), "one, two, three");
        assert_eq!(build_tags_vec(&tags_list(&tags)), tags);
    }

    proptest! {
        // Normalization is idempotent: re-parsing the list form yields
        // the same tags.
        #[test]
        fn prop_normalization_idempotent(s in "[a-z, ]{0,40}") {
            let once = build_tags_vec(&s);
            let twice = build_tags_vec(&tags_list(&once));
            prop_assert_eq!(once, twice);
        }
    }
}
