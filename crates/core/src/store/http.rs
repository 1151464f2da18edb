//! Prompt store reached over the REST surface served by [`crate::server`]

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::PromptBackend;
use crate::errors::{BackendError, PromptError, Result};
use crate::prompt::{Prompt, PromptInput};

/// Error body returned by the server
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base:   Url,
}

impl HttpBackend {
    /// `base` is the server root, e.g. `http://127.0.0.1:5000/`
    pub fn new(base: &str) -> Result<Self> {
        let mut base = Url::parse(base)
            .map_err(|e| PromptError::Config(format!("invalid remote url '{}': {}", base, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    fn url(&self, path: &str) -> std::result::Result<Url, BackendError> {
        self.base
            .join(path)
            .map_err(|e| BackendError::Rejected(format!("bad path '{}': {}", path, e)))
    }

    /// `prompts/<id>` with the id encoded as a single path segment
    fn record_url(&self, id: &str) -> std::result::Result<Url, BackendError> {
        let mut url = self.url("prompts")?;
        url.path_segments_mut()
            .map_err(|_| BackendError::Rejected(format!("base url '{}' cannot hold a path", self.base)))?
            .push(id);
        Ok(url)
    }

    async fn parse<T: DeserializeOwned>(
        response: Response,
        id: Option<&str>,
    ) -> std::result::Result<T, BackendError> {
        let response = Self::check(response, id).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check(response: Response, id: Option<&str>) -> std::result::Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status.to_string(),
        };

        Err(match (status, id) {
            (StatusCode::NOT_FOUND, Some(id)) => BackendError::NotFound(id.to_string()),
            (s, _) if s.is_client_error() => BackendError::Rejected(message),
            _ => BackendError::Unavailable(message),
        })
    }
}

#[async_trait]
impl PromptBackend for HttpBackend {
    async fn list(&self) -> std::result::Result<Vec<Prompt>, BackendError> {
        let response = self.client.get(self.url("prompts")?).send().await?;
        Self::parse(response, None).await
    }

    async fn insert(&self, input: &PromptInput) -> std::result::Result<Prompt, BackendError> {
        let response = self
            .client
            .post(self.url("prompts")?)
            .json(input)
            .send()
            .await?;
        let created: Option<Prompt> = Self::parse(response, None).await?;
        created.ok_or(BackendError::NoRecord("insert"))
    }

    async fn update(&self, id: &str, input: &PromptInput) -> std::result::Result<Prompt, BackendError> {
        let response = self
            .client
            .put(self.record_url(id)?)
            .json(input)
            .send()
            .await?;
        let updated: Option<Prompt> = Self::parse(response, Some(id)).await?;
        updated.ok_or(BackendError::NoRecord("update"))
    }

    async fn delete(&self, id: &str) -> std::result::Result<(), BackendError> {
        let response = self
            .client
            .delete(self.record_url(id)?)
            .send()
            .await?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_gets_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:5000/api").unwrap();
        assert_eq!(
            backend.url("prompts").unwrap().as_str(),
            "http://localhost:5000/api/prompts"
        );
    }

    #[test]
    fn test_record_url_escapes_id() {
        let backend = HttpBackend::new("http://localhost:5000/api").unwrap();
        assert_eq!(
            backend.record_url("a/b?c#d").unwrap().as_str(),
            "http://localhost:5000/api/prompts/a%2Fb%3Fc%23d"
        );
        assert_eq!(
            backend.record_url("0b7c").unwrap().as_str(),
            "http://localhost:5000/api/prompts/0b7c"
        );
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let err = HttpBackend::new("not a url").unwrap_err();
        assert_eq!(err.category(), "config");
    }
}
