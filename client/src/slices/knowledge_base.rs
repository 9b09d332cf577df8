//! Knowledge-base slice: article CRUD.

use crate::environment::AppEnvironment;
use crate::error::ApiError;
use crate::types::{Article, ArticleFilter, ArticleId, ArticlePatch, NewArticle};
use helpdesk_core::{Effect, Reducer, SmallVec, smallvec};

/// Knowledge-base collection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBaseState {
    /// The article list as last replaced by a fetch (head = most recent)
    pub articles: Vec<Article>,
    /// An article operation is in flight
    pub loading: bool,
    /// Human-readable message of the last failed operation
    pub error: Option<String>,
}

impl KnowledgeBaseState {
    /// Empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Actions processed by the knowledge-base slice
#[derive(Debug, Clone)]
pub enum KnowledgeBaseAction {
    /// Command: replace the article list from the server
    FetchAll {
        /// Server-side filter
        filter: ArticleFilter,
    },
    /// Response: the list endpoint answered
    FetchAllResponse(Result<Vec<Article>, ApiError>),

    /// Command: create an article
    Create {
        /// Article fields
        input: NewArticle,
    },
    /// Response: the create endpoint answered
    CreateResponse(Result<Article, ApiError>),

    /// Command: update an article
    Update {
        /// Article to update
        id: ArticleId,
        /// Changed fields
        patch: ArticlePatch,
    },
    /// Response: the update endpoint answered with the new representation
    UpdateResponse(Result<Article, ApiError>),

    /// Command: delete an article
    Delete {
        /// Article to delete
        id: ArticleId,
    },
    /// Response: the delete endpoint answered; carries the deleted id
    DeleteResponse(Result<ArticleId, ApiError>),

    /// Command: dismiss the error banner
    ClearError,
}

/// Reducer for the knowledge-base slice
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBaseReducer;

impl KnowledgeBaseReducer {
    /// Creates a new `KnowledgeBaseReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for KnowledgeBaseReducer {
    type State = KnowledgeBaseState;
    type Action = KnowledgeBaseAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            KnowledgeBaseAction::FetchAll { filter } => {
                state.loading = true;
                state.error = None;

                let response = env.api().fetch_articles(&filter);
                smallvec![Effect::future(async move {
                    Some(KnowledgeBaseAction::FetchAllResponse(response.await))
                })]
            },

            KnowledgeBaseAction::FetchAllResponse(Ok(articles)) => {
                state.loading = false;
                state.articles = articles;
                smallvec![]
            },

            KnowledgeBaseAction::FetchAllResponse(Err(err)) => {
                // Stale list stays visible; only the flags flip
                state.loading = false;
                state.error = Some(err.to_string());
                smallvec![]
            },

            KnowledgeBaseAction::Create { input } => {
                state.loading = true;
                state.error = None;

                let response = env.api().create_article(&input);
                smallvec![Effect::future(async move {
                    Some(KnowledgeBaseAction::CreateResponse(response.await))
                })]
            },

            KnowledgeBaseAction::CreateResponse(Ok(article)) => {
                state.loading = false;
                // Optimistic most-recent-first ordering
                state.articles.insert(0, article);
                smallvec![]
            },

            KnowledgeBaseAction::CreateResponse(Err(err)) => {
                state.loading = false;
                state.error = Some(err.to_string());
                smallvec![]
            },

            KnowledgeBaseAction::Update { id, patch } => {
                state.loading = true;
                state.error = None;

                let response = env.api().update_article(&id, &patch);
                smallvec![Effect::future(async move {
                    Some(KnowledgeBaseAction::UpdateResponse(response.await))
                })]
            },

            KnowledgeBaseAction::UpdateResponse(Ok(article)) => {
                state.loading = false;
                // Wholesale replace; an unknown id is silently dropped
                if let Some(existing) =
                    state.articles.iter_mut().find(|a| a.id == article.id)
                {
                    *existing = article;
                }
                smallvec![]
            },

            KnowledgeBaseAction::UpdateResponse(Err(err)) => {
                state.loading = false;
                state.error = Some(err.to_string());
                smallvec![]
            },

            KnowledgeBaseAction::Delete { id } => {
                state.loading = true;
                state.error = None;

                let response = env.api().delete_article(&id);
                smallvec![Effect::future(async move {
                    Some(KnowledgeBaseAction::DeleteResponse(
                        response.await.map(|()| id),
                    ))
                })]
            },

            KnowledgeBaseAction::DeleteResponse(Ok(id)) => {
                state.loading = false;
                // Idempotent: deleting an absent id is a no-op
                state.articles.retain(|a| a.id != id);
                smallvec![]
            },

            KnowledgeBaseAction::DeleteResponse(Err(err)) => {
                state.loading = false;
                state.error = Some(err.to_string());
                smallvec![]
            },

            KnowledgeBaseAction::ClearError => {
                state.error = None;
                smallvec![]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::api::BearerCell;
    use crate::credentials::MemoryCredentialStore;
    use crate::mocks::MockApi;
    use crate::types::ArticleStatus;
    use chrono::Utc;
    use helpdesk_testing::{ReducerTest, assertions, test_clock};
    use std::sync::Arc;

    fn test_env() -> AppEnvironment {
        AppEnvironment::new(
            Arc::new(MockApi::new()),
            Arc::new(test_clock()),
            Arc::new(MemoryCredentialStore::new()),
            BearerCell::new(),
        )
    }

    fn article(id: &str) -> Article {
        Article {
            id: ArticleId::new(id),
            title: format!("Article {id}"),
            body: "How to fix the thing".to_string(),
            tags: vec!["howto".to_string()],
            status: ArticleStatus::Published,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn fetch_all_response_replaces_collection_exactly() {
        let server_list = vec![article("a3"), article("a1")];
        let expected = server_list.clone();

        ReducerTest::new(KnowledgeBaseReducer::new())
            .with_env(test_env())
            .given_state(KnowledgeBaseState {
                articles: vec![article("stale")],
                loading: true,
                ..KnowledgeBaseState::new()
            })
            .when_action(KnowledgeBaseAction::FetchAllResponse(Ok(server_list)))
            .run()
            .then_state(move |state| {
                assert_eq!(state.articles, expected);
                assert!(!state.loading);
            })
            .then_effects(assertions::assert_no_effects);
    }

    #[test]
    fn fetch_all_failure_retains_stale_collection() {
        ReducerTest::new(KnowledgeBaseReducer::new())
            .with_env(test_env())
            .given_state(KnowledgeBaseState {
                articles: vec![article("a1")],
                loading: true,
                ..KnowledgeBaseState::new()
            })
            .when_action(KnowledgeBaseAction::FetchAllResponse(Err(
                ApiError::Unauthorized,
            )))
            .run()
            .then_state(|state| {
                assert_eq!(state.articles.len(), 1);
                assert!(state.error.is_some());
            });
    }

    #[test]
    fn create_response_inserts_at_head() {
        ReducerTest::new(KnowledgeBaseReducer::new())
            .with_env(test_env())
            .given_state(KnowledgeBaseState {
                articles: vec![article("older")],
                ..KnowledgeBaseState::new()
            })
            .when_action(KnowledgeBaseAction::CreateResponse(Ok(article("new"))))
            .run()
            .then_state(|state| {
                assert_eq!(state.articles[0].id, ArticleId::new("new"));
                assert_eq!(state.articles.len(), 2);
            });
    }

    #[test]
    fn update_response_replaces_matching_article() {
        let mut updated = article("a1");
        updated.title = "Updated title".to_string();

        ReducerTest::new(KnowledgeBaseReducer::new())
            .with_env(test_env())
            .given_state(KnowledgeBaseState {
                articles: vec![article("a1"), article("a2")],
                ..KnowledgeBaseState::new()
            })
            .when_action(KnowledgeBaseAction::UpdateResponse(Ok(updated)))
            .run()
            .then_state(|state| {
                assert_eq!(state.articles[0].title, "Updated title");
                assert_eq!(state.articles[1].title, "Article a2");
            });
    }

    #[test]
    fn update_response_for_unknown_id_is_silently_dropped() {
        ReducerTest::new(KnowledgeBaseReducer::new())
            .with_env(test_env())
            .given_state(KnowledgeBaseState {
                articles: vec![article("a1")],
                ..KnowledgeBaseState::new()
            })
            .when_action(KnowledgeBaseAction::UpdateResponse(Ok(article("ghost"))))
            .run()
            .then_state(|state| {
                assert_eq!(state.articles.len(), 1);
                assert_eq!(state.articles[0].id, ArticleId::new("a1"));
                assert!(state.error.is_none());
            });
    }

    #[test]
    fn delete_response_removes_article() {
        ReducerTest::new(KnowledgeBaseReducer::new())
            .with_env(test_env())
            .given_state(KnowledgeBaseState {
                articles: vec![article("a1"), article("a2")],
                ..KnowledgeBaseState::new()
            })
            .when_action(KnowledgeBaseAction::DeleteResponse(Ok(ArticleId::new(
                "a1",
            ))))
            .run()
            .then_state(|state| {
                assert_eq!(state.articles.len(), 1);
                assert_eq!(state.articles[0].id, ArticleId::new("a2"));
            });
    }

    #[test]
    fn delete_of_absent_id_leaves_collection_unchanged() {
        ReducerTest::new(KnowledgeBaseReducer::new())
            .with_env(test_env())
            .given_state(KnowledgeBaseState {
                articles: vec![article("a1")],
                ..KnowledgeBaseState::new()
            })
            .when_action(KnowledgeBaseAction::DeleteResponse(Ok(ArticleId::new(
                "never-existed",
            ))))
            .run()
            .then_state(|state| {
                assert_eq!(state.articles.len(), 1);
                assert!(state.error.is_none());
            });
    }
}
