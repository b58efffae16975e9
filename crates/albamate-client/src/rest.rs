//! Reqwest-backed implementation of the remote service contracts.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use albamate_core::{
    AlbaDetail, AlbaDirectory, AlbaPage, AlbaSummary, BookmarkError, BookmarkResult,
    BookmarkService, FormId, ListParams,
};

use crate::config::ClientConfig;

const HEADER_REQUEST_ID: &str = "x-request-id";

/// Fragment the backend puts in its "already scrapped" error message. The
/// backend does not use a dedicated status code for this case, so the match
/// on message text is confined to this single constant.
const ALREADY_SCRAPPED_FRAGMENT: &str = "이미 스크랩";

/// Error body shape returned by the backend on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Paginated collection envelope used by the listing endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionBody {
    data: Vec<AlbaSummary>,
    #[serde(default)]
    next_cursor: Option<i64>,
}

/// HTTP client for the Albamate backend.
///
/// Implements both [`BookmarkService`] and [`AlbaDirectory`]; one instance
/// is shared across the synchronizer and any read-through wrappers.
pub struct RestClient {
    client: Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl RestClient {
    /// Build a configured client.
    ///
    /// # Errors
    ///
    /// Returns [`BookmarkError::Transport`] when the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: &ClientConfig) -> BookmarkResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = Uuid::new_v4().to_string();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            default_headers.insert(HEADER_REQUEST_ID, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(BookmarkError::transport)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            bearer_token: config.bearer_token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> BookmarkResult<Url> {
        self.base_url
            .join(path)
            .map_err(BookmarkError::transport)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    /// Map a non-2xx response into the typed error taxonomy. This is the
    /// only place that looks at status codes or error-body text.
    async fn classify_failure(form_id: Option<FormId>, response: Response) -> BookmarkError {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return BookmarkError::Unauthenticated {
                reason: message.unwrap_or_else(|| format!("status {status}")),
            };
        }

        let already_scrapped = status == StatusCode::CONFLICT
            || message
                .as_deref()
                .is_some_and(|text| text.contains(ALREADY_SCRAPPED_FRAGMENT));
        if already_scrapped {
            if let Some(form_id) = form_id {
                return BookmarkError::Conflict { form_id };
            }
        }

        BookmarkError::Backend {
            status: status.as_u16(),
            message,
        }
    }

    async fn expect_success(
        form_id: Option<FormId>,
        response: Response,
    ) -> BookmarkResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::classify_failure(form_id, response).await)
        }
    }

    async fn get_collection(&self, path: &str) -> BookmarkResult<Vec<AlbaSummary>> {
        let url = self.endpoint(path)?;
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(BookmarkError::transport)?;
        let response = Self::expect_success(None, response).await?;
        let body: CollectionBody = response.json().await.map_err(BookmarkError::transport)?;
        Ok(body.data)
    }
}

#[async_trait]
impl BookmarkService for RestClient {
    async fn add_scrap(&self, form_id: FormId) -> BookmarkResult<()> {
        let url = self.endpoint(&format!("forms/{form_id}/scrap"))?;
        debug!(form_id = form_id.0, "adding scrap");
        let response = self
            .authorize(self.client.post(url))
            .send()
            .await
            .map_err(BookmarkError::transport)?;
        Self::expect_success(Some(form_id), response).await?;
        Ok(())
    }

    async fn remove_scrap(&self, form_id: FormId) -> BookmarkResult<()> {
        let url = self.endpoint(&format!("forms/{form_id}/scrap"))?;
        debug!(form_id = form_id.0, "removing scrap");
        let response = self
            .authorize(self.client.delete(url))
            .send()
            .await
            .map_err(BookmarkError::transport)?;
        Self::expect_success(Some(form_id), response).await?;
        Ok(())
    }
}

#[async_trait]
impl AlbaDirectory for RestClient {
    async fn detail(&self, form_id: FormId) -> BookmarkResult<AlbaDetail> {
        let url = self.endpoint(&format!("forms/{form_id}"))?;
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(BookmarkError::transport)?;
        let response = Self::expect_success(None, response).await?;
        response.json().await.map_err(BookmarkError::transport)
    }

    async fn list(&self, params: &ListParams) -> BookmarkResult<AlbaPage> {
        let url = self.endpoint("forms")?;
        let response = self
            .authorize(self.client.get(url).query(params))
            .send()
            .await
            .map_err(BookmarkError::transport)?;
        let response = Self::expect_success(None, response).await?;
        let body: CollectionBody = response.json().await.map_err(BookmarkError::transport)?;
        Ok(AlbaPage {
            items: body.data,
            next_cursor: body.next_cursor,
        })
    }

    async fn my_scraps(&self) -> BookmarkResult<Vec<AlbaSummary>> {
        self.get_collection("users/me/scraps").await
    }

    async fn my_listings(&self) -> BookmarkResult<Vec<AlbaSummary>> {
        self.get_collection("users/me/forms").await
    }
}
