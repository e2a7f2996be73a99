// ABOUTME: User principal resolution tests: identifier routing and account status gating
// ABOUTME: Status checks run in a fixed order before any password comparison
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::{make_user, InMemoryUserStore};

use gatekey::errors::AuthError;
use gatekey::models::UserPrincipal;
use gatekey::principal::{self, classify_identifier, IdentifierKind, UserPrincipalStore};

fn store_with(users: Vec<UserPrincipal>) -> UserPrincipalStore {
    UserPrincipalStore::new(InMemoryUserStore::new(users))
}

#[test]
fn identifier_routing_depends_on_the_at_sign() {
    assert_eq!(classify_identifier("bob"), IdentifierKind::Username);
    assert_eq!(classify_identifier("bob@x.com"), IdentifierKind::Email);
    // Any '@' routes to email lookup, even for values that are not
    // deliverable addresses
    assert_eq!(classify_identifier("a@b"), IdentifierKind::Email);
}

#[test]
fn resolves_by_username_and_by_email() {
    let store = store_with(vec![make_user("bob", "bob@x.com", "pw")]);

    let by_name = store.resolve("bob").expect("username lookup");
    let by_email = store.resolve("bob@x.com").expect("email lookup");
    assert_eq!(by_name.id, by_email.id);
}

#[test]
fn username_containing_at_sign_misroutes_to_email_lookup() {
    // A user whose *username* contains '@' but whose email differs is
    // unreachable by that username
    let user = make_user("a@b", "a@real.example", "pw");
    let store = store_with(vec![user]);

    let err = store.resolve("a@b").expect_err("routed to email lookup");
    assert!(matches!(err, AuthError::UserNotFound));
}

#[test]
fn unknown_identifier_is_not_found() {
    let store = store_with(vec![]);
    assert!(matches!(
        store.resolve("ghost").expect_err("no such user"),
        AuthError::UserNotFound
    ));
    assert!(matches!(
        store.resolve("ghost@x.com").expect_err("no such email"),
        AuthError::UserNotFound
    ));
}

#[test]
fn each_account_status_flag_maps_to_its_error() {
    let cases: [(fn(&mut UserPrincipal), fn(&AuthError) -> bool); 4] = [
        (
            |u| u.enabled = false,
            |e| matches!(e, AuthError::AccountDisabled),
        ),
        (
            |u| u.account_non_expired = false,
            |e| matches!(e, AuthError::AccountExpired),
        ),
        (
            |u| u.credentials_non_expired = false,
            |e| matches!(e, AuthError::CredentialsExpired),
        ),
        (
            |u| u.account_non_locked = false,
            |e| matches!(e, AuthError::AccountLocked),
        ),
    ];

    for (mutate, expected) in cases {
        let mut user = make_user("bob", "bob@x.com", "pw");
        mutate(&mut user);
        let store = store_with(vec![user]);
        let err = store.resolve("bob").expect_err("status gate");
        assert!(expected(&err), "unexpected error {err:?}");
    }
}

#[test]
fn disabled_wins_when_multiple_status_flags_fail() {
    let mut user = make_user("bob", "bob@x.com", "pw");
    user.enabled = false;
    user.account_non_locked = false;

    let store = store_with(vec![user]);
    assert!(matches!(
        store.resolve("bob").expect_err("status gate"),
        AuthError::AccountDisabled
    ));
}

#[test]
fn password_verification_distinguishes_mismatch_from_success() {
    let user = make_user("bob", "bob@x.com", "pw");

    assert!(principal::verify_password(&user, "pw").is_ok());
    assert!(matches!(
        principal::verify_password(&user, "nope").expect_err("mismatch"),
        AuthError::InvalidUserCredentials
    ));
}
