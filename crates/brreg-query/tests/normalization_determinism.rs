// SPDX-License-Identifier: Apache-2.0

use brreg_query::{normalize_company_name, normalize_municipality_name};
use proptest::prelude::*;

proptest! {
    #[test]
    fn slug_is_lowercase_ascii_with_single_hyphen_separators(s in ".*") {
        let slug = normalize_company_name(&s);
        prop_assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!slug.starts_with('-'));
        prop_assert!(!slug.ends_with('-'));
        prop_assert!(!slug.contains("--"));
    }

    #[test]
    fn slug_is_deterministic_and_idempotent(s in ".*") {
        let once = normalize_company_name(&s);
        prop_assert_eq!(&once, &normalize_company_name(&s));
        prop_assert_eq!(&once, &normalize_company_name(&once));
    }

    #[test]
    fn municipality_and_company_slugs_agree(s in ".*") {
        prop_assert_eq!(normalize_company_name(&s), normalize_municipality_name(&s));
    }
}

#[test]
fn documented_example_slug() {
    assert_eq!(
        normalize_company_name("Ålesund Skjønnhet AS"),
        "alesund-skjonnhet-as"
    );
}
