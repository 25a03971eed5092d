//! Property tests for URL canonicalization and the deduplicating operations
//! built on it.

use bookmarkhub::{canonicalize, rename_category, upsert_one, Bookmark, BookmarkPayload};
use chrono::Utc;
use proptest::prelude::*;

/// http/https URLs with a lowercase host and a mixed-case path of one to three segments.
fn arb_url() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("https"), Just("http")],
        "[a-z][a-z0-9]{1,10}",
        prop_oneof![Just(".com"), Just(".org"), Just(".io")],
        "(/[a-zA-Z0-9]{1,8}){1,3}",
    )
        .prop_map(|(scheme, host, tld, path)| format!("{}://{}{}{}", scheme, host, tld, path))
}

fn arb_category() -> impl Strategy<Value = String> {
    prop_oneof![Just("a"), Just("b"), Just("other")].prop_map(str::to_string)
}

fn shout_authority(url: &str) -> String {
    let (scheme, rest) = url.split_once("://").unwrap();
    let (host, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
    format!("{}://{}{}", scheme.to_uppercase(), host.to_uppercase(), path)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn scheme_and_host_case_is_ignored(url in arb_url()) {
        prop_assert_eq!(canonicalize(&shout_authority(&url)), canonicalize(&url));
    }

    #[test]
    fn one_trailing_slash_is_ignored(url in arb_url()) {
        prop_assert_eq!(canonicalize(&format!("{}/", url)), canonicalize(&url));
    }

    #[test]
    fn fragment_is_ignored(url in arb_url(), fragment in "[a-z0-9-]{0,12}") {
        prop_assert_eq!(canonicalize(&format!("{}#{}", url, fragment)), canonicalize(&url));
    }

    #[test]
    fn path_case_is_significant(url in arb_url()) {
        let (origin, path) = url.split_at(url.find("://").unwrap() + 3);
        let slash = path.find('/').unwrap();
        let shouted = format!("{}{}{}", origin, &path[..slash], path[slash..].to_uppercase());
        prop_assume!(shouted != url);

        prop_assert_ne!(canonicalize(&shouted), canonicalize(&url));
    }

    #[test]
    fn canonical_form_is_stable(url in arb_url()) {
        let once = canonicalize(&url);
        prop_assert_eq!(canonicalize(&once), once.clone());
    }

    #[test]
    fn upserting_spellings_of_one_url_keeps_one_bookmark(url in arb_url()) {
        let mut collection: Vec<Bookmark> = Vec::new();
        let now = Utc::now();

        upsert_one(&mut collection, BookmarkPayload::with_url(url.clone()), now).unwrap();
        let second = upsert_one(
            &mut collection,
            BookmarkPayload::with_url(format!("{}/#again", shout_authority(&url))),
            now,
        )
        .unwrap();

        prop_assert!(second.was_duplicate);
        prop_assert_eq!(collection.len(), 1);
        prop_assert_eq!(collection[0].visit_count, 2);
    }

    #[test]
    fn rename_moves_exactly_the_old_category(
        categories in proptest::collection::vec(arb_category(), 0..12)
    ) {
        let now = Utc::now();
        let mut collection: Vec<Bookmark> = categories
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let payload = BookmarkPayload {
                    category: Some(category.clone()),
                    ..Default::default()
                };
                Bookmark::from_payload(format!("https://site{}.com", i), payload, now)
            })
            .collect();
        let expected = categories.iter().filter(|c| *c == "a").count();

        let changed = rename_category(&mut collection, "a", "z");

        prop_assert_eq!(changed, expected);
        prop_assert!(collection.iter().all(|b| b.category != "a"));
        for (bookmark, before) in collection.iter().zip(&categories) {
            if before == "a" {
                prop_assert_eq!(bookmark.category.as_str(), "z");
            } else {
                prop_assert_eq!(&bookmark.category, before);
            }
        }
    }
}
