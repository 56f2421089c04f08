use std::{collections::HashMap, time::Duration};

use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{Category, CategoryId, Counts, Difficulty, Question, QuestionType, QuizParameters};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use url::Url;

pub mod error;
mod wire;

pub use error::{ResponseCode, TriviaError};

use wire::{CategoriesEnvelope, CountsEnvelope, QuestionsEnvelope};

pub const DEFAULT_BASE_URL: &str = "https://opentdb.com/";
pub const DEFAULT_USER_AGENT: &str = "Quizzical (https://github.com/davep/quizzical)";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const CATEGORY_ENDPOINT: &str = "api_category.php";
const QUESTION_ENDPOINT: &str = "api.php";
const COUNT_ENDPOINT: &str = "api_count_global.php";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

/// Filters for one call to the question endpoint; unset filters are left
/// out of the query entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRequest {
    pub amount: u32,
    pub category: Option<CategoryId>,
    pub difficulty: Option<Difficulty>,
    pub question_type: Option<QuestionType>,
}

impl QuestionRequest {
    pub fn new(amount: u32) -> Self {
        Self {
            amount,
            category: None,
            difficulty: None,
            question_type: None,
        }
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("amount", self.amount.to_string())];
        if let Some(category) = self.category {
            query.push(("category", category.to_string()));
        }
        if let Some(difficulty) = self.difficulty {
            query.push(("difficulty", difficulty.as_str().to_string()));
        }
        if let Some(question_type) = self.question_type {
            query.push(("type", question_type.as_str().to_string()));
        }
        query
    }
}

impl From<&QuizParameters> for QuestionRequest {
    fn from(params: &QuizParameters) -> Self {
        Self {
            amount: params.number_of_questions,
            category: params.category,
            difficulty: params.difficulty,
            question_type: params.question_type,
        }
    }
}

struct CountsSnapshot {
    overall: Counts,
    categories: HashMap<CategoryId, Counts>,
}

/// Client for the Open Trivia DB API.
///
/// The category list and the question counts are fetched at most once and
/// then kept for the lifetime of the client; there is no refresh.
pub struct OpenTriviaDb {
    http: Client,
    base_url: Url,
    categories: OnceCell<Vec<Category>>,
    counts: OnceCell<CountsSnapshot>,
}

impl OpenTriviaDb {
    pub fn new() -> Result<Self, TriviaError> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, TriviaError> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;
        Ok(Self {
            http,
            base_url,
            categories: OnceCell::new(),
            counts: OnceCell::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, TriviaError> {
        let url = self.base_url.join(endpoint)?;
        debug!(%url, ?query, "calling trivia backend");
        let body = self
            .http
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn categories(&self) -> Result<&[Category], TriviaError> {
        let categories = self
            .categories
            .get_or_try_init(|| async {
                let envelope: CategoriesEnvelope = self.call(CATEGORY_ENDPOINT, &[]).await?;
                let categories: Vec<Category> = envelope
                    .trivia_categories
                    .into_iter()
                    .map(Category::from)
                    .collect();
                info!(count = categories.len(), "loaded trivia categories");
                Ok::<_, TriviaError>(categories)
            })
            .await?;
        Ok(categories.as_slice())
    }

    pub async fn category(&self, id: CategoryId) -> Result<Category, TriviaError> {
        self.categories()
            .await?
            .iter()
            .find(|category| category.id() == id)
            .cloned()
            .ok_or(TriviaError::CategoryNotFound(id))
    }

    pub async fn questions(&self, request: &QuestionRequest) -> Result<Vec<Question>, TriviaError> {
        let envelope: QuestionsEnvelope = self.call(QUESTION_ENDPOINT, &request.query()).await?;
        let code = ResponseCode::try_from(envelope.response_code)?;
        if let Err(err) = code.into_result() {
            warn!(code = code.code(), "trivia backend rejected question request: {err}");
            return Err(err);
        }
        let questions = envelope
            .results
            .into_iter()
            .map(Question::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = questions.len(), "decoded questions");
        Ok(questions)
    }

    async fn counts(&self) -> Result<&CountsSnapshot, TriviaError> {
        self.counts
            .get_or_try_init(|| async {
                let envelope: CountsEnvelope = self.call(COUNT_ENDPOINT, &[]).await?;
                let mut categories = HashMap::with_capacity(envelope.categories.len());
                for (key, raw) in envelope.categories {
                    let id = key.parse::<i64>().map_err(|_| {
                        TriviaError::Malformed(format!("category key {key:?} is not an id"))
                    })?;
                    categories.insert(CategoryId(id), Counts::from(raw));
                }
                info!(categories = categories.len(), "loaded question counts");
                Ok::<_, TriviaError>(CountsSnapshot {
                    overall: Counts::from(envelope.overall),
                    categories,
                })
            })
            .await
    }

    pub async fn overall_counts(&self) -> Result<Counts, TriviaError> {
        Ok(self.counts().await?.overall)
    }

    pub async fn category_counts(&self) -> Result<HashMap<CategoryId, Counts>, TriviaError> {
        Ok(self.counts().await?.categories.clone())
    }

    pub async fn counts_for(&self, id: CategoryId) -> Result<Counts, TriviaError> {
        self.counts()
            .await?
            .categories
            .get(&id)
            .copied()
            .ok_or(TriviaError::CategoryNotFound(id))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
