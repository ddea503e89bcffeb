use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{DocumentStore, StoreError};
use crate::config::FirestoreConfig;
use crate::workspace::AuthSession;

const PAGE_SIZE: &str = "300";

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

/// Firestore REST v1 backend for one collection.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: Client,
    base_url: Url,
    project_id: String,
    collection: String,
    api_key: Option<String>,
    id_token: Option<String>,
}

impl FirestoreStore {
    pub fn new(config: &FirestoreConfig, auth: &AuthSession) -> Result<Self, StoreError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| StoreError::InvalidConfig(format!("base url '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidConfig(format!(
                "base url '{}' cannot hold a path",
                config.base_url
            )));
        }
        Ok(Self {
            client: Client::new(),
            base_url,
            project_id: config.project_id.clone(),
            collection: config.collection.clone(),
            api_key: config.api_key.clone(),
            id_token: auth.id_token.clone(),
        })
    }

    fn url(&self, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                self.collection.as_str(),
            ]);
            if let Some(id) = id {
                // push escapes spaces and the like, so ids go in as-is
                segments.push(id);
            }
        }
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.id_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn rejected(operation: &'static str, id: &str, response: Response) -> StoreError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());
    StoreError::Rejected {
        operation,
        id: id.to_string(),
        status,
        body,
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.url(None);
            url.query_pairs_mut().append_pair("pageSize", PAGE_SIZE);
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let response = self.authorized(self.client.get(url)).send().await?;
            if !response.status().is_success() {
                return Err(rejected("list", &self.collection, response).await);
            }
            let page: ListDocumentsResponse = response.json().await?;

            for document in page.documents {
                // name is the full resource path; the id is its last segment
                let id = document
                    .name
                    .rsplit('/')
                    .next()
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| StoreError::Malformed(format!("document name '{}'", document.name)))?;
                ids.push(id.to_string());
            }

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = ids.len(), collection = %self.collection, "Listed documents");
        Ok(ids)
    }

    async fn set_empty(&self, id: &str) -> Result<(), StoreError> {
        // PATCH creates the document when missing and overwrites it otherwise
        let request = self.client.patch(self.url(Some(id))).json(&json!({ "fields": {} }));
        let response = self.authorized(request).send().await?;
        if !response.status().is_success() {
            return Err(rejected("set", id, response).await);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let response = self.authorized(self.client.delete(self.url(Some(id)))).send().await?;
        let status = response.status();
        // Already gone counts as deleted
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(rejected("delete", id, response).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(api_key: Option<&str>) -> FirestoreStore {
        let config = FirestoreConfig {
            base_url: "https://firestore.example.test/v1/".to_string(),
            project_id: "demo".to_string(),
            collection: "pantry".to_string(),
            api_key: api_key.map(str::to_string),
        };
        FirestoreStore::new(&config, &AuthSession::new("Ada")).unwrap()
    }

    #[test]
    fn document_url_escapes_ids() {
        let url = store(None).url(Some("olive oil"));
        assert_eq!(
            url.as_str(),
            "https://firestore.example.test/v1/projects/demo/databases/(default)/documents/pantry/olive%20oil"
        );
    }

    #[test]
    fn api_key_goes_in_query() {
        let url = store(Some("secret")).url(None);
        assert_eq!(url.query(), Some("key=secret"));
    }

    #[test]
    fn rejects_unusable_base_url() {
        let config = FirestoreConfig {
            base_url: "not a url".to_string(),
            project_id: "demo".to_string(),
            collection: "pantry".to_string(),
            api_key: None,
        };
        let result = FirestoreStore::new(&config, &AuthSession::new("Ada"));
        assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
    }
}
