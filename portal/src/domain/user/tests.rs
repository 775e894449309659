//! Tests for the identity model.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn demo_user() -> User {
    User::new(
        UserId::new("demo-user-1").expect("valid id"),
        Email::new("demo@example.com").expect("valid email"),
        DisplayName::new("Demo User").expect("valid name"),
        UserRole::Participant,
    )
    .with_bio("Data science enthusiast")
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case(" demo-user-1", UserValidationError::InvalidId)]
#[case("demo-user-1\n", UserValidationError::InvalidId)]
fn invalid_user_ids_are_rejected(#[case] raw: &str, #[case] expected: UserValidationError) {
    let err = UserId::new(raw).expect_err("invalid id must fail");
    assert_eq!(err, expected);
}

#[rstest]
fn random_ids_are_distinct() {
    assert_ne!(UserId::random(), UserId::random());
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("   ", UserValidationError::EmptyEmail)]
#[case("demo", UserValidationError::InvalidEmail)]
#[case("@example.com", UserValidationError::InvalidEmail)]
#[case("demo@", UserValidationError::InvalidEmail)]
#[case("de mo@example.com", UserValidationError::InvalidEmail)]
#[case("a@b@c", UserValidationError::InvalidEmail)]
fn invalid_emails_are_rejected(#[case] raw: &str, #[case] expected: UserValidationError) {
    let err = Email::new(raw).expect_err("invalid email must fail");
    assert_eq!(err, expected);
}

#[rstest]
#[case("organizer@example.com", "organizer")]
#[case("  admin@localhost  ", "admin")]
fn valid_emails_expose_local_part(#[case] raw: &str, #[case] local: &str) {
    let email = Email::new(raw).expect("valid email");
    assert_eq!(email.as_ref(), raw.trim());
    assert_eq!(email.local_part(), local);
}

#[rstest]
fn display_names_accept_non_ascii_text() {
    let name = DisplayName::new("Организатор").expect("cyrillic name is valid");
    assert_eq!(name.char_count(), 11);
}

#[rstest]
#[case("   ", UserValidationError::EmptyDisplayName)]
#[case(&"x".repeat(DISPLAY_NAME_MAX + 1), UserValidationError::DisplayNameTooLong { max: DISPLAY_NAME_MAX })]
fn invalid_display_names_are_rejected(#[case] raw: &str, #[case] expected: UserValidationError) {
    let err = DisplayName::new(raw).expect_err("invalid name must fail");
    assert_eq!(err, expected);
}

#[rstest]
#[case("participant", UserRole::Participant)]
#[case("Organizer", UserRole::Organizer)]
#[case(" ADMIN ", UserRole::Admin)]
fn roles_parse_case_insensitively(#[case] raw: &str, #[case] expected: UserRole) {
    assert_eq!(raw.parse::<UserRole>().expect("known role"), expected);
}

#[rstest]
fn unknown_roles_are_rejected() {
    let err = "moderator".parse::<UserRole>().expect_err("unknown role");
    assert!(err.to_string().contains("moderator"));
}

#[rstest]
fn default_role_is_participant() {
    assert_eq!(UserRole::default(), UserRole::Participant);
}

#[rstest]
fn serialises_to_slot_wire_format(demo_user: User) {
    let value = serde_json::to_value(&demo_user).expect("serialise user");
    assert_eq!(
        value,
        json!({
            "id": "demo-user-1",
            "email": "demo@example.com",
            "name": "Demo User",
            "role": "participant",
            "bio": "Data science enthusiast",
        })
    );
}

#[rstest]
fn deserialises_camel_case_avatar() {
    let user: User = serde_json::from_value(json!({
        "id": "org-user-1",
        "email": "organizer@example.com",
        "name": "Organizer",
        "role": "organizer",
        "avatarUrl": "https://example.com/a.png",
    }))
    .expect("valid payload");
    assert_eq!(user.role(), UserRole::Organizer);
    assert_eq!(user.avatar_url(), Some("https://example.com/a.png"));
    assert_eq!(user.bio(), None);
}

#[rstest]
#[case(json!({"id": "x", "email": "x@y", "name": "X", "role": "root"}))]
#[case(json!({"id": "x", "email": "not-an-email", "name": "X", "role": "admin"}))]
#[case(json!({"id": "", "email": "x@y", "name": "X", "role": "admin"}))]
#[case(json!({"id": "x", "email": "x@y", "name": "X", "role": "admin", "token": "t"}))]
#[case(json!({"id": "x", "email": "x@y", "role": "admin"}))]
fn rejects_malformed_payloads(#[case] payload: serde_json::Value) {
    let result = serde_json::from_value::<User>(payload);
    assert!(result.is_err());
}

#[rstest]
fn empty_patch_changes_nothing(demo_user: User) {
    let patch = ProfileUpdate::default();
    assert!(patch.is_empty());
    assert_eq!(demo_user.patched(&patch), demo_user);
}

#[rstest]
fn patch_replaces_only_present_fields(demo_user: User) {
    let patch = ProfileUpdate::default()
        .with_name(DisplayName::new("Ada").expect("valid name"))
        .with_avatar_url("https://example.com/ada.png");
    let updated = demo_user.patched(&patch);

    assert_eq!(updated.id(), demo_user.id());
    assert_eq!(updated.email(), demo_user.email());
    assert_eq!(updated.role(), demo_user.role());
    assert_eq!(updated.name().as_ref(), "Ada");
    assert_eq!(updated.avatar_url(), Some("https://example.com/ada.png"));
    assert_eq!(updated.bio(), Some("Data science enthusiast"));
}

#[rstest]
fn blank_avatar_in_patch_keeps_existing_value(demo_user: User) {
    let user = demo_user.with_avatar_url("https://example.com/old.png");
    let patch = ProfileUpdate::default().with_avatar_url("  ");
    assert!(patch.is_empty());
    assert_eq!(user.patched(&patch).avatar_url(), Some("https://example.com/old.png"));
}

#[rstest]
fn initial_is_upper_cased_first_letter(demo_user: User) {
    assert_eq!(demo_user.initial(), 'D');
}
