use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::FetchError;

/// Body-less request marker for [`HttpClient::fetch`].
pub const NO_BODY: Option<&()> = None;

/// Single-attempt JSON client shared by every upstream service.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Build a client whose every call is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Issue one request and return the status with the decoded body.
    ///
    /// An empty body decodes to `Value::Null`. A body that is not JSON is an
    /// error only on 2xx answers; error pages are commonly HTML.
    pub async fn fetch<B>(
        &self,
        method: Method,
        url: Url,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<(StatusCode, Value), FetchError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;
        debug!(%method, %url, %status, "upstream call");

        if bytes.is_empty() {
            return Ok((status, Value::Null));
        }
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok((status, value)),
            Err(source) if status.is_success() => Err(FetchError::Decode {
                url: url.to_string(),
                source,
            }),
            Err(_) => Ok((status, Value::Null)),
        }
    }

    /// GET a JSON array. Any non-2xx answer reads as an empty list.
    pub async fn fetch_list<T>(&self, url: Url, token: Option<&str>) -> Result<Vec<T>, FetchError>
    where
        T: DeserializeOwned,
    {
        let (status, body) = self.fetch(Method::GET, url.clone(), token, NO_BODY).await?;
        if !status.is_success() {
            warn!(%url, %status, "list endpoint failed, treating as empty");
            return Ok(Vec::new());
        }
        if body.is_null() {
            return Ok(Vec::new());
        }
        decode(&url, body)
    }

    /// GET a single record. Any non-2xx answer reads as absent.
    pub async fn fetch_one<T>(&self, url: Url, token: Option<&str>) -> Result<Option<T>, FetchError>
    where
        T: DeserializeOwned,
    {
        let (status, body) = self.fetch(Method::GET, url.clone(), token, NO_BODY).await?;
        if !status.is_success() {
            warn!(%url, %status, "record lookup failed");
            return Ok(None);
        }
        decode(&url, body).map(Some)
    }

    /// Send a mutation and report whether the service answered `expected`.
    pub async fn mutate<B>(
        &self,
        method: Method,
        url: Url,
        token: Option<&str>,
        body: Option<&B>,
        expected: StatusCode,
    ) -> Result<bool, FetchError>
    where
        B: Serialize + ?Sized,
    {
        let (status, _) = self.fetch(method.clone(), url.clone(), token, body).await?;
        if status != expected {
            warn!(%method, %url, %status, %expected, "mutation rejected");
        }
        Ok(status == expected)
    }

    /// POST a new record and decode the created record from the answer.
    pub async fn create<B, T>(
        &self,
        url: Url,
        token: Option<&str>,
        body: &B,
    ) -> Result<Option<T>, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (status, value) = self.fetch(Method::POST, url.clone(), token, Some(body)).await?;
        if status != StatusCode::CREATED && status != StatusCode::OK {
            warn!(%url, %status, "create rejected");
            return Ok(None);
        }
        decode(&url, value).map(Some)
    }
}

fn decode<T: DeserializeOwned>(url: &Url, value: Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })
}
