//! Integration tests for categories, text banners and the link directory.

#![allow(clippy::expect_used)]

use linkboard_core::services::catalog;
use linkboard_core::{BannerDetails, CategoryDraft, CategoryId, ContentError, TextBannerId, MAX_TEXT_BANNERS_PER_CATEGORY};
use linkboard_testing::{fixtures, InMemoryStore};

#[tokio::test]
async fn test_new_categories_are_appended() {
    let store = InMemoryStore::new();
    let a = catalog::create_category(&store, &fixtures::category_draft("a"))
        .await
        .expect("a");
    let b = catalog::create_category(&store, &fixtures::category_draft("b"))
        .await
        .expect("b");

    assert_eq!(a.sort_order, 0);
    assert_eq!(b.sort_order, 1);
}

#[tokio::test]
async fn test_duplicate_code_conflicts() {
    let store = InMemoryStore::new();
    catalog::create_category(&store, &fixtures::category_draft("news"))
        .await
        .expect("first");

    let result = catalog::create_category(&store, &fixtures::category_draft("news")).await;
    assert!(matches!(result, Err(ContentError::Conflict { field: Some("code"), .. })));
}

#[tokio::test]
async fn test_invalid_code_is_rejected_before_storage() {
    let store = InMemoryStore::new();
    let result = catalog::create_category(
        &store,
        &CategoryDraft {
            code: "Has Space".to_string(),
            name: "x".to_string(),
        },
    )
    .await;

    assert!(matches!(result, Err(ContentError::Validation(_))));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_update_keeps_rank_and_checks_code() {
    let store = InMemoryStore::new();
    let a = catalog::create_category(&store, &fixtures::category_draft("a"))
        .await
        .expect("a");
    let b = catalog::create_category(&store, &fixtures::category_draft("b"))
        .await
        .expect("b");

    let renamed = catalog::update_category(
        &store,
        b.id,
        &CategoryDraft {
            code: "bee".to_string(),
            name: "Bee".to_string(),
        },
    )
    .await
    .expect("update");
    assert_eq!(renamed.sort_order, 1);
    assert_eq!(renamed.code, "bee");

    let clash = catalog::update_category(&store, b.id, &fixtures::category_draft("a")).await;
    assert!(matches!(clash, Err(ContentError::Conflict { .. })));

    // Keeping its own code is not a clash.
    catalog::update_category(&store, a.id, &fixtures::category_draft("a"))
        .await
        .expect("same code");

    let missing = catalog::update_category(&store, CategoryId(999), &fixtures::category_draft("z")).await;
    assert!(matches!(missing, Err(ContentError::NotFound { .. })));
}

#[tokio::test]
async fn test_category_capacity() {
    let store = InMemoryStore::new();
    let category = catalog::create_category(&store, &fixtures::category_draft("full"))
        .await
        .expect("category");

    for n in 0..MAX_TEXT_BANNERS_PER_CATEGORY {
        let banner = catalog::create_text_banner(&store, &fixtures::text_banner_draft(category.id, &format!("b{n}")))
            .await
            .expect("banner");
        assert_eq!(usize::try_from(banner.sort_order).ok(), Some(n));
    }

    let overflow = catalog::create_text_banner(&store, &fixtures::text_banner_draft(category.id, "extra")).await;
    assert_eq!(
        overflow,
        Err(ContentError::CapacityExceeded {
            category_id: category.id,
            limit: MAX_TEXT_BANNERS_PER_CATEGORY,
        })
    );
}

#[tokio::test]
async fn test_banner_needs_existing_category() {
    let store = InMemoryStore::new();
    let result = catalog::create_text_banner(&store, &fixtures::text_banner_draft(CategoryId(77), "x")).await;
    assert!(matches!(result, Err(ContentError::NotFound { resource: "Category", .. })));
}

#[tokio::test]
async fn test_banner_update_and_delete() {
    let store = InMemoryStore::new();
    let category = catalog::create_category(&store, &fixtures::category_draft("c"))
        .await
        .expect("category");
    let x = catalog::create_text_banner(&store, &fixtures::text_banner_draft(category.id, "x"))
        .await
        .expect("x");
    let y = catalog::create_text_banner(&store, &fixtures::text_banner_draft(category.id, "y"))
        .await
        .expect("y");

    let edited = catalog::update_text_banner(
        &store,
        y.id,
        &BannerDetails {
            name: " why ".to_string(),
            link: "https://why.example".to_string(),
        },
    )
    .await
    .expect("update");
    assert_eq!(edited.name, "why");
    assert_eq!(edited.sort_order, 1);

    catalog::delete_text_banner(&store, x.id).await.expect("delete");
    let remaining = catalog::list_text_banners(&store, Some(category.id))
        .await
        .expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].sort_order, 0);

    let again = catalog::delete_text_banner(&store, x.id).await;
    assert!(matches!(again, Err(ContentError::NotFound { .. })));

    let missing = catalog::update_text_banner(&store, TextBannerId(404), &fixtures::banner_details("n")).await;
    assert!(matches!(missing, Err(ContentError::NotFound { .. })));
}

#[tokio::test]
async fn test_link_directory_groups_by_category_in_rank_order() {
    let store = InMemoryStore::new();
    let first = catalog::create_category(&store, &fixtures::category_draft("first"))
        .await
        .expect("first");
    let second = catalog::create_category(&store, &fixtures::category_draft("second"))
        .await
        .expect("second");
    let empty = catalog::create_category(&store, &fixtures::category_draft("empty"))
        .await
        .expect("empty");

    for (category, name) in [(second.id, "s1"), (first.id, "f1"), (second.id, "s2"), (first.id, "f2")] {
        catalog::create_text_banner(&store, &fixtures::text_banner_draft(category, name))
            .await
            .expect("banner");
    }

    let directory = catalog::link_directory(&store).await.expect("directory");

    let layout: Vec<(String, Vec<String>)> = directory
        .iter()
        .map(|entry| {
            (
                entry.category.code.clone(),
                entry.banners.iter().map(|b| b.name.clone()).collect(),
            )
        })
        .collect();
    assert_eq!(
        layout,
        vec![
            ("first".to_string(), vec!["f1".to_string(), "f2".to_string()]),
            ("second".to_string(), vec!["s1".to_string(), "s2".to_string()]),
            ("empty".to_string(), vec![]),
        ]
    );
    assert_eq!(directory[2].category.id, empty.id);
}
