//! Integration tests for registration, sign-in, admin management and profiles.

#![allow(clippy::expect_used)]

use linkboard_core::providers::{AccountRepository, TextBannerRepository};
use linkboard_core::services::accounts::{self, ProfileUpdate, Registration};
use linkboard_core::services::catalog;
use linkboard_core::{ContentError, Role};
use linkboard_testing::{fixtures, InMemoryMedia, InMemoryStore, PlainTextHasher};

#[tokio::test]
async fn test_register_member_and_sign_in() {
    let store = InMemoryStore::new();
    let member = accounts::register_member(&store, &PlainTextHasher, &fixtures::registration("kim", "Kim"))
        .await
        .expect("register");
    assert_eq!(member.role, Role::Member);
    assert!(member.is_active);

    let signed_in = accounts::authenticate(&store, &PlainTextHasher, "kim", "password123")
        .await
        .expect("sign in");
    assert_eq!(signed_in.id, member.id);
}

#[tokio::test]
async fn test_registration_rules() {
    let store = InMemoryStore::new();
    accounts::register_member(&store, &PlainTextHasher, &fixtures::registration("kim", "Kim"))
        .await
        .expect("register");

    let short = Registration {
        password: "short".to_string(),
        ..fixtures::registration("lee", "Lee")
    };
    assert!(matches!(
        accounts::register_member(&store, &PlainTextHasher, &short).await,
        Err(ContentError::Validation(_))
    ));

    let same_username = accounts::register_member(&store, &PlainTextHasher, &fixtures::registration("kim", "Other")).await;
    assert!(matches!(same_username, Err(ContentError::Conflict { field: Some("username"), .. })));

    let same_nickname = accounts::register_member(&store, &PlainTextHasher, &fixtures::registration("park", "Kim")).await;
    assert!(matches!(same_nickname, Err(ContentError::Conflict { field: Some("nickname"), .. })));

    assert!(accounts::username_taken(&store, " kim ").await.expect("check"));
    assert!(!accounts::nickname_taken(&store, "Nobody").await.expect("check"));
}

#[tokio::test]
async fn test_sign_in_failures() {
    let store = InMemoryStore::new();
    let account = accounts::register_member(&store, &PlainTextHasher, &fixtures::registration("kim", "Kim"))
        .await
        .expect("register");

    let wrong = accounts::authenticate(&store, &PlainTextHasher, "kim", "wrong-password").await;
    assert_eq!(wrong, Err(ContentError::InvalidCredentials));

    let unknown = accounts::authenticate(&store, &PlainTextHasher, "ghost", "password123").await;
    assert_eq!(unknown, Err(ContentError::InvalidCredentials));

    store.set_account_active(account.id, false);
    let disabled = accounts::authenticate(&store, &PlainTextHasher, "kim", "password123").await;
    assert_eq!(disabled, Err(ContentError::AccountDisabled));

    // A disabled account does not reveal itself to a wrong password.
    let disabled_wrong = accounts::authenticate(&store, &PlainTextHasher, "kim", "nope-nope").await;
    assert_eq!(disabled_wrong, Err(ContentError::InvalidCredentials));
}

#[tokio::test]
async fn test_admin_removal_guards() {
    let store = InMemoryStore::new();
    let root = accounts::create_admin(&store, &PlainTextHasher, &fixtures::registration("root", "Root"))
        .await
        .expect("root");

    let itself = accounts::remove_admin(&store, root.id, root.id).await;
    assert!(matches!(itself, Err(ContentError::Validation(_))));

    let member = accounts::register_member(&store, &PlainTextHasher, &fixtures::registration("kim", "Kim"))
        .await
        .expect("member");
    let not_admin = accounts::remove_admin(&store, root.id, member.id).await;
    assert!(matches!(not_admin, Err(ContentError::NotFound { resource: "Admin", .. })));

    let second = accounts::create_admin(&store, &PlainTextHasher, &fixtures::registration("ops", "Ops"))
        .await
        .expect("second");
    accounts::remove_admin(&store, root.id, second.id)
        .await
        .expect("remove second");

    assert_eq!(accounts::list_admins(&store).await.expect("list").len(), 1);
}

#[tokio::test]
async fn test_last_admin_cannot_be_removed() {
    let store = InMemoryStore::new();
    let only = accounts::create_admin(&store, &PlainTextHasher, &fixtures::registration("root", "Root"))
        .await
        .expect("root");
    let outsider = fixtures::unknown_account();

    // Only reachable when the actor's own account is gone; the guard still holds.
    let result = accounts::remove_admin(&store, outsider, only.id).await;
    assert!(matches!(result, Err(ContentError::Validation(_))));
    assert!(store.get_account(only.id).await.expect("get").is_some());
}

#[tokio::test]
async fn test_admins_removing_each_other_leave_one_admin() {
    let store = InMemoryStore::new();
    let root = accounts::create_admin(&store, &PlainTextHasher, &fixtures::registration("root", "Root"))
        .await
        .expect("root");
    let ops = accounts::create_admin(&store, &PlainTextHasher, &fixtures::registration("ops", "Ops"))
        .await
        .expect("ops");

    let (first, second) = tokio::join!(
        accounts::remove_admin(&store, root.id, ops.id),
        accounts::remove_admin(&store, ops.id, root.id),
    );

    assert_eq!([&first, &second].iter().filter(|r| r.is_ok()).count(), 1);
    assert!([first, second]
        .into_iter()
        .any(|r| matches!(r, Err(ContentError::Validation(_)))));
    assert_eq!(accounts::list_admins(&store).await.expect("list").len(), 1);
}

#[tokio::test]
async fn test_removing_admin_keeps_their_content() {
    let store = InMemoryStore::new();
    let root = accounts::create_admin(&store, &PlainTextHasher, &fixtures::registration("root", "Root"))
        .await
        .expect("root");
    let editor = accounts::create_admin(&store, &PlainTextHasher, &fixtures::registration("ed", "Ed"))
        .await
        .expect("editor");
    let category = catalog::create_category(&store, &fixtures::category_draft("c"))
        .await
        .expect("category");
    let mut draft = fixtures::text_banner_draft(category.id, "x");
    draft.created_by = Some(editor.id);
    let banner = catalog::create_text_banner(&store, &draft).await.expect("banner");

    accounts::remove_admin(&store, root.id, editor.id)
        .await
        .expect("remove");

    let kept = store
        .get_text_banner(banner.id)
        .await
        .expect("get")
        .expect("banner survives");
    assert_eq!(kept.created_by, None);
}

#[tokio::test]
async fn test_rename_admin() {
    let store = InMemoryStore::new();
    let root = accounts::create_admin(&store, &PlainTextHasher, &fixtures::registration("root", "Root"))
        .await
        .expect("root");
    accounts::register_member(&store, &PlainTextHasher, &fixtures::registration("kim", "Kim"))
        .await
        .expect("member");

    let renamed = accounts::rename_admin(&store, root.id, "  Boss ").await.expect("rename");
    assert_eq!(renamed.nickname, "Boss");

    // Renaming to the current nickname is allowed.
    accounts::rename_admin(&store, root.id, "Boss").await.expect("same");

    let taken = accounts::rename_admin(&store, root.id, "Kim").await;
    assert!(matches!(taken, Err(ContentError::Conflict { .. })));
}

#[tokio::test]
async fn test_profile_update_with_avatar_and_password() {
    let store = InMemoryStore::new();
    let media = InMemoryMedia::new();
    let account = accounts::register_member(&store, &PlainTextHasher, &fixtures::registration("kim", "Kim"))
        .await
        .expect("register");

    let updated = accounts::update_profile(
        &store,
        &PlainTextHasher,
        &media,
        account.id,
        ProfileUpdate {
            nickname: "Kimmy".to_string(),
            password: Some("new-password".to_string()),
            avatar: Some(fixtures::png_upload("me.PNG")),
        },
    )
    .await
    .expect("update");

    let expected = format!("avatars/{}/profile.png", account.id);
    assert_eq!(updated.nickname, "Kimmy");
    assert_eq!(updated.image_path.as_deref(), Some(expected.as_str()));
    assert!(media.contains(&expected));

    accounts::authenticate(&store, &PlainTextHasher, "kim", "new-password")
        .await
        .expect("new password works");

    // A new avatar with another extension replaces the previous file.
    let replaced = accounts::update_profile(
        &store,
        &PlainTextHasher,
        &media,
        account.id,
        ProfileUpdate {
            nickname: "Kimmy".to_string(),
            password: None,
            avatar: Some(fixtures::png_upload("me.jpeg")),
        },
    )
    .await
    .expect("replace");
    assert_eq!(media.paths(), vec![format!("avatars/{}/profile.jpeg", account.id)]);
    assert!(replaced.image_path.is_some());
}

#[tokio::test]
async fn test_failed_profile_write_keeps_previous_avatar() {
    let store = InMemoryStore::new();
    let media = InMemoryMedia::new();
    let account = accounts::register_member(&store, &PlainTextHasher, &fixtures::registration("kim", "Kim"))
        .await
        .expect("register");
    let avatar = |file_name: &str| ProfileUpdate {
        nickname: "Kim".to_string(),
        password: None,
        avatar: Some(fixtures::png_upload(file_name)),
    };

    accounts::update_profile(&store, &PlainTextHasher, &media, account.id, avatar("me.png"))
        .await
        .expect("first avatar");
    let previous = format!("avatars/{}/profile.png", account.id);

    store.fail_writes(true);
    let result = accounts::update_profile(&store, &PlainTextHasher, &media, account.id, avatar("me.jpeg")).await;
    assert!(matches!(result, Err(ContentError::Storage(_))));
    store.fail_writes(false);

    let kept = store.get_account(account.id).await.expect("get").expect("account");
    assert_eq!(kept.image_path.as_deref(), Some(previous.as_str()));
    assert_eq!(media.paths(), vec![previous]);
}

#[tokio::test]
async fn test_profile_update_rules() {
    let store = InMemoryStore::new();
    let media = InMemoryMedia::new();
    let account = accounts::register_member(&store, &PlainTextHasher, &fixtures::registration("kim", "Kim"))
        .await
        .expect("register");
    accounts::register_member(&store, &PlainTextHasher, &fixtures::registration("lee", "Lee"))
        .await
        .expect("other");

    let update = |nickname: &str, password: Option<&str>| ProfileUpdate {
        nickname: nickname.to_string(),
        password: password.map(str::to_string),
        avatar: None,
    };

    let taken = accounts::update_profile(&store, &PlainTextHasher, &media, account.id, update("Lee", None)).await;
    assert!(matches!(taken, Err(ContentError::Conflict { .. })));

    let short = accounts::update_profile(&store, &PlainTextHasher, &media, account.id, update("Kim", Some("abc"))).await;
    assert!(matches!(short, Err(ContentError::Validation(_))));

    // An empty password field keeps the current password.
    accounts::update_profile(&store, &PlainTextHasher, &media, account.id, update("Kim", Some("")))
        .await
        .expect("keep password");
    accounts::authenticate(&store, &PlainTextHasher, "kim", "password123")
        .await
        .expect("old password still works");
}

#[tokio::test]
async fn test_remove_avatar() {
    let store = InMemoryStore::new();
    let media = InMemoryMedia::new();
    let account = accounts::register_member(&store, &PlainTextHasher, &fixtures::registration("kim", "Kim"))
        .await
        .expect("register");

    let none = accounts::remove_avatar(&store, &media, account.id).await;
    assert!(matches!(none, Err(ContentError::Validation(_))));

    accounts::update_profile(
        &store,
        &PlainTextHasher,
        &media,
        account.id,
        ProfileUpdate {
            nickname: "Kim".to_string(),
            password: None,
            avatar: Some(fixtures::png_upload("a.png")),
        },
    )
    .await
    .expect("avatar");

    media.fail_removes(true);
    let failed = accounts::remove_avatar(&store, &media, account.id).await;
    assert!(matches!(failed, Err(ContentError::Media(_))));
    assert!(store
        .get_account(account.id)
        .await
        .expect("get")
        .and_then(|a| a.image_path)
        .is_some());

    media.fail_removes(false);
    let cleared = accounts::remove_avatar(&store, &media, account.id).await.expect("remove");
    assert_eq!(cleared.image_path, None);
    assert!(media.paths().is_empty());
}
