//! Article list state for the browse, submission and moderation pages.
//!
//! DESIGN
//! ======
//! Moderation edits are optimistic: the row changes before the request is
//! sent, and a failure reverts by refetching the whole list rather than by
//! undoing locally, so the table always ends up matching the server.

#[cfg(test)]
#[path = "articles_test.rs"]
mod articles_test;

use crate::net::types::{Article, ArticleStatus, NewArticle};

/// Shared list state for article tables.
#[derive(Clone, Debug, Default)]
pub struct ArticlesState {
    pub items: Vec<Article>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ArticlesState {
    /// State while the first fetch is running.
    pub fn loading() -> Self {
        Self { loading: true, ..Self::default() }
    }

    /// Apply a fetch result.
    pub fn finish(&mut self, result: Result<Vec<Article>, String>) {
        self.loading = false;
        match result {
            Ok(items) => {
                self.items = items;
                self.error = None;
            }
            Err(e) => self.error = Some(e),
        }
    }

    /// Set the status of article `id`; returns the previous status if found.
    pub fn set_status(&mut self, id: i64, status: ArticleStatus) -> Option<ArticleStatus> {
        let article = self.items.iter_mut().find(|a| a.id == id)?;
        Some(std::mem::replace(&mut article.status, status))
    }

    /// Remove article `id`; returns whether a row was removed.
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|a| a.id != id);
        self.items.len() != before
    }
}

/// Articles anonymous visitors may see, newest first.
pub fn public_articles(articles: &[Article]) -> Vec<Article> {
    let mut public: Vec<Article> = articles.iter().filter(|a| a.status.is_public()).cloned().collect();
    public.sort_by(|a, b| b.published_date.cmp(&a.published_date));
    public
}

/// Whether a viewer may open `article`: public ones always, the rest only
/// when signed in.
pub fn can_view(article: &Article, signed_in: bool) -> bool {
    signed_in || article.status.is_public()
}

/// Validate the upload form; returns the draft to send.
///
/// # Errors
///
/// Returns a message naming the first missing field.
pub fn validate_draft(title: &str, author: &str, content_html: &str) -> Result<NewArticle, String> {
    let title = title.trim();
    let author = author.trim();
    if title.is_empty() {
        return Err("Title is required.".to_owned());
    }
    if author.is_empty() {
        return Err("Author is required.".to_owned());
    }
    if content_html.trim().is_empty() {
        return Err("Content is required.".to_owned());
    }
    Ok(NewArticle {
        title: title.to_owned(),
        author: author.to_owned(),
        content: content_html.to_owned(),
    })
}
