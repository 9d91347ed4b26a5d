//! Integration tests for the user repository.

mod common;

use salesdesk_core::auth::UserRole;
use salesdesk_core::auth::ValidUser;
use salesdesk_db::UserRepository;
use salesdesk_db::repositories::UserError;

fn valid_user(username: &str) -> ValidUser {
    ValidUser {
        username: username.to_string(),
        password: Some("secret".to_string()),
        role: UserRole::User,
        division: "NetCo".to_string(),
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_create_and_find() {
    let repo = UserRepository::new(common::connect().await);
    let username = common::unique_username();

    let user = repo
        .create(&valid_user(&username), "$argon2id$test_hash")
        .await
        .expect("Failed to create user");
    assert_eq!(user.username, username);
    assert_eq!(user.role, "user");
    assert_eq!(user.division, "NetCo");

    let found = repo
        .find_by_username(&username)
        .await
        .expect("Failed to find user")
        .expect("User should exist");
    assert_eq!(found.id, user.id);

    repo.delete(user.id).await.expect("Failed to delete user");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_username_is_conflict() {
    let repo = UserRepository::new(common::connect().await);
    let username = common::unique_username();

    let user = repo
        .create(&valid_user(&username), "$argon2id$test_hash")
        .await
        .expect("Failed to create user");
    let duplicate = repo
        .create(&valid_user(&username), "$argon2id$other_hash")
        .await;
    assert!(matches!(duplicate, Err(UserError::DuplicateUsername)));

    repo.delete(user.id).await.expect("Failed to delete user");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_without_password_keeps_hash() {
    let repo = UserRepository::new(common::connect().await);
    let username = common::unique_username();

    let user = repo
        .create(&valid_user(&username), "$argon2id$original")
        .await
        .expect("Failed to create user");

    let mut changed = valid_user(&username);
    changed.password = None;
    changed.division = "IT Solutions".to_string();
    let updated = repo
        .update(user.id, &changed, None)
        .await
        .expect("Failed to update user");

    assert_eq!(updated.division, "IT Solutions");
    assert_eq!(updated.password_hash, "$argon2id$original");

    repo.delete(user.id).await.expect("Failed to delete user");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_missing_user_is_not_found() {
    let repo = UserRepository::new(common::connect().await);
    let result = repo.delete(i64::MAX).await;
    assert!(matches!(result, Err(UserError::NotFound(_))));
}
