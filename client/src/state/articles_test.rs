use super::*;

fn article(id: i64, status: ArticleStatus, date: &str) -> Article {
    Article {
        id,
        title: format!("Article {id}"),
        author: "Field".to_owned(),
        content: String::new(),
        published_date: Some(date.to_owned()),
        status,
        username: None,
    }
}

fn loaded(items: Vec<Article>) -> ArticlesState {
    let mut state = ArticlesState::loading();
    state.finish(Ok(items));
    state
}

#[test]
fn finish_replaces_items_and_clears_error() {
    let mut state = ArticlesState::loading();
    state.finish(Err("offline".to_owned()));
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("offline"));

    state.finish(Ok(vec![article(1, ArticleStatus::Draft, "2025-01-01")]));
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.error, None);
}

#[test]
fn failed_refetch_keeps_previous_items() {
    let mut state = loaded(vec![article(1, ArticleStatus::Draft, "2025-01-01")]);
    state.finish(Err("boom".to_owned()));
    assert_eq!(state.items.len(), 1);
}

#[test]
fn set_status_returns_previous_value() {
    let mut state = loaded(vec![article(1, ArticleStatus::Pending, "2025-01-01")]);
    assert_eq!(state.set_status(1, ArticleStatus::Published), Some(ArticleStatus::Pending));
    assert_eq!(state.items[0].status, ArticleStatus::Published);
    assert_eq!(state.set_status(99, ArticleStatus::Rejected), None);
}

#[test]
fn remove_drops_only_matching_row() {
    let mut state = loaded(vec![
        article(1, ArticleStatus::Draft, "2025-01-01"),
        article(2, ArticleStatus::Draft, "2025-01-02"),
    ]);
    assert!(state.remove(1));
    assert!(!state.remove(1));
    assert_eq!(state.items.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2]);
}

#[test]
fn public_articles_filters_and_sorts_newest_first() {
    let all = vec![
        article(1, ArticleStatus::Published, "2025-01-01"),
        article(2, ArticleStatus::Draft, "2025-03-01"),
        article(3, ArticleStatus::Approved, "2025-02-01"),
        article(4, ArticleStatus::Rejected, "2025-04-01"),
    ];
    let ids: Vec<i64> = public_articles(&all).iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![3, 1]);
}

#[test]
fn non_public_articles_need_sign_in() {
    let draft = article(1, ArticleStatus::InReview, "2025-01-01");
    assert!(!can_view(&draft, false));
    assert!(can_view(&draft, true));
    assert!(can_view(&article(2, ArticleStatus::Published, "2025-01-01"), false));
}

#[test]
fn validate_draft_trims_and_names_missing_field() {
    assert_eq!(validate_draft("  ", "a", "<p>x</p>").unwrap_err(), "Title is required.");
    assert_eq!(validate_draft("t", "", "<p>x</p>").unwrap_err(), "Author is required.");
    assert_eq!(validate_draft("t", "a", " ").unwrap_err(), "Content is required.");

    let draft = validate_draft(" Soil ", " Ecology ", "<p>x</p>").unwrap();
    assert_eq!(draft.title, "Soil");
    assert_eq!(draft.author, "Ecology");
}
