use super::*;

// =============================================================
// ArticleStatus
// =============================================================

#[test]
fn status_parse_ignores_case_and_separators() {
    assert_eq!(ArticleStatus::parse("Published"), ArticleStatus::Published);
    assert_eq!(ArticleStatus::parse("IN_REVIEW"), ArticleStatus::InReview);
    assert_eq!(ArticleStatus::parse("in-review"), ArticleStatus::InReview);
    assert_eq!(ArticleStatus::parse(" in review "), ArticleStatus::InReview);
}

#[test]
fn status_parse_unknown_is_pending() {
    assert_eq!(ArticleStatus::parse(""), ArticleStatus::Pending);
    assert_eq!(ArticleStatus::parse("archived"), ArticleStatus::Pending);
}

#[test]
fn only_published_and_approved_are_public() {
    let public: Vec<_> = [
        ArticleStatus::Draft,
        ArticleStatus::Pending,
        ArticleStatus::InReview,
        ArticleStatus::Approved,
        ArticleStatus::Published,
        ArticleStatus::Rejected,
    ]
    .into_iter()
    .filter(|s| s.is_public())
    .collect();
    assert_eq!(public, vec![ArticleStatus::Approved, ArticleStatus::Published]);
}

#[test]
fn status_serializes_snake_case() {
    let body = serde_json::to_value(StatusUpdate { status: ArticleStatus::InReview }).unwrap();
    assert_eq!(body, serde_json::json!({ "status": "in_review" }));
}

#[test]
fn badge_class_groups_statuses() {
    assert_eq!(ArticleStatus::Approved.badge_class(), ArticleStatus::Published.badge_class());
    assert_eq!(ArticleStatus::Pending.badge_class(), ArticleStatus::InReview.badge_class());
    assert_ne!(ArticleStatus::Rejected.badge_class(), ArticleStatus::Draft.badge_class());
}

// =============================================================
// Article
// =============================================================

#[test]
fn article_deserializes_loose_payload() {
    let article: Article = serde_json::from_value(serde_json::json!({
        "id": 7,
        "title": "Soil carbon",
        "author": "Ecology",
        "content": "<p>hi</p>",
        "publishedDate": "2025-03-01T09:30:00",
        "status": "APPROVED",
    }))
    .unwrap();
    assert_eq!(article.id, 7);
    assert_eq!(article.status, ArticleStatus::Approved);
    assert_eq!(article.username, None);
    assert_eq!(article.published_day(), Some("2025-03-01"));
}

#[test]
fn article_missing_or_null_status_is_pending() {
    let missing: Article = serde_json::from_value(serde_json::json!({ "id": "3", "title": "t" })).unwrap();
    assert_eq!(missing.status, ArticleStatus::Pending);
    assert_eq!(missing.id, 3);

    let null: Article = serde_json::from_value(serde_json::json!({ "id": 4, "title": "t", "status": null })).unwrap();
    assert_eq!(null.status, ArticleStatus::Pending);
    assert_eq!(null.published_day(), None);
}

// =============================================================
// Profiles and accounts
// =============================================================

#[test]
fn profile_normalizes_role_and_names() {
    let profile: Profile = serde_json::from_value(serde_json::json!({
        "id": "b6f0",
        "full_name": "  ada lovelace",
        "role": " Officer ",
        "grad_year": 2026,
    }))
    .unwrap();
    assert_eq!(profile.role, Role::Officer);
    assert_eq!(profile.initial(), 'A');
    assert_eq!(profile.display_name(), "ada lovelace");

    let blank: Profile = serde_json::from_value(serde_json::json!({ "id": 9, "role": null })).unwrap();
    assert_eq!(blank.id, "9");
    assert_eq!(blank.role, Role::User);
    assert_eq!(blank.initial(), '?');
    assert_eq!(blank.display_name(), "N/A");
}

#[test]
fn account_update_drops_unchanged_and_blank_fields() {
    let update = AccountUpdate::from_form("jdoe", "j@x.org", " jdoe ", "new@x.org", "");
    assert_eq!(
        update,
        AccountUpdate { username: None, email: Some("new@x.org".to_owned()), password: None }
    );
    assert_eq!(serde_json::to_value(&update).unwrap(), serde_json::json!({ "email": "new@x.org" }));
    assert!(AccountUpdate::from_form("jdoe", "j@x.org", "", "", "").is_empty());
}

#[test]
fn register_request_serializes_lowercase_role() {
    let body = serde_json::to_value(RegisterRequest {
        username: "jdoe".to_owned(),
        email: "j@x.org".to_owned(),
        password: "temp".to_owned(),
        role: Role::Officer,
    })
    .unwrap();
    assert_eq!(body["role"], "officer");
}

// =============================================================
// Auth payloads
// =============================================================

#[test]
fn api_user_with_numeric_id_becomes_principal() {
    let user: ApiUser = serde_json::from_value(serde_json::json!({
        "id": 42,
        "username": "jdoe",
        "email": "j@x.org",
        "role": "ADMIN",
    }))
    .unwrap();
    let principal = user.into_principal();
    assert_eq!(principal.id, "42");
    assert_eq!(principal.metadata.username.as_deref(), Some("jdoe"));
    assert_eq!(principal.metadata_role(), Role::Admin);
}

#[test]
fn api_user_rejects_blank_id() {
    let parsed = serde_json::from_value::<ApiUser>(serde_json::json!({ "id": " ", "email": "j@x.org" }));
    assert!(parsed.is_err());
}

#[test]
fn hosted_token_response_parses_metadata() {
    let token: TokenResponse = serde_json::from_value(serde_json::json!({
        "access_token": "jwt",
        "token_type": "bearer",
        "user": {
            "id": "uuid-1",
            "email": "a@x.org",
            "user_metadata": { "role": "officer", "name": "Ada" }
        }
    }))
    .unwrap();
    assert_eq!(token.access_token, "jwt");
    let principal = token.user.into_principal();
    assert_eq!(principal.metadata.full_name.as_deref(), Some("Ada"));
    assert_eq!(principal.metadata_role(), Role::Officer);
}

#[test]
fn role_lookup_uses_first_row_with_role() {
    let rows = vec![ProfileRoleRow { role: Some("Admin".to_owned()), full_name: Some("Ada".to_owned()) }];
    assert_eq!(
        role_lookup_from_rows(rows),
        Some(RoleLookup { role: Role::Admin, full_name: Some("Ada".to_owned()) })
    );
    assert_eq!(role_lookup_from_rows(Vec::new()), None);
    assert_eq!(role_lookup_from_rows(vec![ProfileRoleRow { role: None, full_name: None }]), None);
}
