use super::{
    CreatedVersion, ParameterStore, Prompt, PromptStore, PromptVariant, StoreError, StoreFuture,
};
use crate::tags::TagSet;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub struct HttpPromptStore {
    client: Client,
    base_url: String,
}

impl HttpPromptStore {
    pub fn new(base_url: String) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn prompt_url(&self, identifier: &str) -> String {
        format!("{}/prompts/{}", self.base_url, encode_path_segment(identifier))
    }

    fn tags_url(&self, resource_arn: &str) -> String {
        format!("{}/tags/{}", self.base_url, encode_path_segment(resource_arn))
    }

    async fn get_prompt_inner(&self, identifier: &str) -> Result<Prompt, StoreError> {
        let response = self
            .client
            .get(self.prompt_url(identifier))
            .send()
            .await
            .map_err(transport)?;
        let body = read_body(response).await?;
        serde_json::from_str(&body)
            .map_err(|e| StoreError::Remote(format!("invalid prompt payload: {e}")))
    }

    async fn update_prompt_inner(
        &self,
        identifier: &str,
        name: &str,
        description: Option<&str>,
        variants: &[PromptVariant],
    ) -> Result<(), StoreError> {
        let mut body = json!({ "name": name, "variants": variants });
        if let Some(description) = description {
            body["description"] = json!(description);
        }
        let response = self
            .client
            .put(self.prompt_url(identifier))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        read_body(response).await?;
        Ok(())
    }

    async fn create_version_inner(
        &self,
        identifier: &str,
        description: &str,
    ) -> Result<CreatedVersion, StoreError> {
        let url = format!(
            "{}/prompts/{}/versions",
            self.base_url,
            encode_path_segment(identifier)
        );
        let response = self
            .client
            .post(url)
            .json(&json!({ "description": description }))
            .send()
            .await
            .map_err(transport)?;
        let body = read_body(response).await?;
        let created: CreateVersionResponse = serde_json::from_str(&body)
            .map_err(|e| StoreError::Remote(format!("invalid create-version payload: {e}")))?;
        Ok(CreatedVersion {
            version: parse_version_number(&created.version)?,
            arn: created.arn,
        })
    }

    async fn tag_resource_inner(
        &self,
        resource_arn: &str,
        tags: &TagSet,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.tags_url(resource_arn))
            .json(&json!({ "tags": tags }))
            .send()
            .await
            .map_err(transport)?;
        read_body(response).await?;
        Ok(())
    }

    async fn list_tags_inner(&self, resource_arn: &str) -> Result<TagSet, StoreError> {
        let response = self
            .client
            .get(self.tags_url(resource_arn))
            .send()
            .await
            .map_err(transport)?;
        let body = read_body(response).await?;
        let listed: ListTagsResponse = serde_json::from_str(&body)
            .map_err(|e| StoreError::Remote(format!("invalid tags payload: {e}")))?;
        Ok(listed.tags)
    }
}

impl PromptStore for HttpPromptStore {
    fn get_prompt<'a>(&'a self, identifier: &'a str) -> StoreFuture<'a, Prompt> {
        Box::pin(self.get_prompt_inner(identifier))
    }

    fn update_prompt<'a>(
        &'a self,
        identifier: &'a str,
        name: &'a str,
        description: Option<&'a str>,
        variants: &'a [PromptVariant],
    ) -> StoreFuture<'a, ()> {
        Box::pin(self.update_prompt_inner(identifier, name, description, variants))
    }

    fn create_version<'a>(
        &'a self,
        identifier: &'a str,
        description: &'a str,
    ) -> StoreFuture<'a, CreatedVersion> {
        Box::pin(self.create_version_inner(identifier, description))
    }

    fn tag_resource<'a>(&'a self, resource_arn: &'a str, tags: &'a TagSet) -> StoreFuture<'a, ()> {
        Box::pin(self.tag_resource_inner(resource_arn, tags))
    }

    fn list_tags<'a>(&'a self, resource_arn: &'a str) -> StoreFuture<'a, TagSet> {
        Box::pin(self.list_tags_inner(resource_arn))
    }
}

pub struct HttpParameterStore {
    client: Client,
    base_url: String,
}

impl HttpParameterStore {
    pub fn new(base_url: String) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_parameter_inner(&self, name: &str) -> Result<String, StoreError> {
        // Indirection records may be stored encrypted; always ask for the
        // decrypted value.
        let url = format!(
            "{}/parameters/{}?withDecryption=true",
            self.base_url,
            encode_path_segment(name)
        );
        let response = self.client.get(url).send().await.map_err(transport)?;
        let body = read_body(response).await?;
        let record: ParameterResponse = serde_json::from_str(&body)
            .map_err(|e| StoreError::Remote(format!("invalid parameter payload: {e}")))?;
        Ok(record.parameter.value)
    }
}

impl ParameterStore for HttpParameterStore {
    fn get_parameter<'a>(&'a self, name: &'a str) -> StoreFuture<'a, String> {
        Box::pin(self.get_parameter_inner(name))
    }
}

#[derive(Deserialize)]
struct CreateVersionResponse {
    version: String,
    arn: String,
}

#[derive(Deserialize)]
struct ListTagsResponse {
    #[serde(default)]
    tags: TagSet,
}

#[derive(Deserialize)]
struct ParameterResponse {
    parameter: ParameterRecord,
}

#[derive(Deserialize)]
struct ParameterRecord {
    value: String,
}

fn build_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(15))
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(8)
        .build()
        .unwrap_or_else(|_| Client::new())
}

fn transport(e: reqwest::Error) -> StoreError {
    StoreError::Remote(e.to_string())
}

async fn read_body(response: reqwest::Response) -> Result<String, StoreError> {
    let status = response.status();
    let text = response.text().await.map_err(transport)?;
    if status.is_success() {
        return Ok(text);
    }
    if is_absent(status, &text) {
        return Err(StoreError::NotFound(text));
    }
    Err(StoreError::Remote(format!("HTTP {status} with body:\n{text}")))
}

// The remote reports a missing versioned identifier either as a plain 404 or
// as a ValidationException on the unrecognized ARN form.
pub(crate) fn is_absent(status: StatusCode, body: &str) -> bool {
    status == StatusCode::NOT_FOUND
        || body.contains("ResourceNotFoundException")
        || body.contains("ValidationException")
}

pub(crate) fn parse_version_number(raw: &str) -> Result<u32, StoreError> {
    raw.parse()
        .map_err(|_| StoreError::Remote(format!("non-numeric version in response: '{raw}'")))
}

// ARNs carry ':' and '/', which must not split the URL path.
pub(crate) fn encode_path_segment(segment: &str) -> String {
    segment
        .replace('%', "%25")
        .replace('/', "%2F")
        .replace('?', "%3F")
        .replace('#', "%23")
}
