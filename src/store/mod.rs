//! Boundary to the remote prompt and parameter services. Everything above
//! this module treats the services as opaque collaborators.

pub mod http;
#[cfg(test)]
pub mod memory;


use crate::tags::TagSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

// Remote failure classification. NotFound terminates version discovery;
// everything else is a genuine fault and must not be mistaken for absence.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("store request failed: {0}")]
    Remote(String),
}

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// One template variant of a prompt. Only the text field is ever rewritten;
/// all other fields ride along untouched through the flattened map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptVariant {
    pub name: String,
    #[serde(rename = "templateConfiguration")]
    pub template_configuration: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PromptVariant {
    pub fn template_text(&self) -> Option<&str> {
        self.template_configuration
            .pointer("/text/text")
            .and_then(Value::as_str)
    }

    /// Returns false when the variant carries no text template to rewrite.
    pub fn set_template_text(&mut self, content: &str) -> bool {
        match self.template_configuration.pointer_mut("/text/text") {
            Some(slot) => {
                *slot = Value::String(content.to_string());
                true
            }
            None => false,
        }
    }
}

/// A prompt resource as returned by the remote service. The same shape serves
/// for the mutable draft and for immutable numbered versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub arn: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub variants: Vec<PromptVariant>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Prompt {
    pub fn first_variant_text(&self) -> Option<&str> {
        self.variants.first().and_then(PromptVariant::template_text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedVersion {
    pub version: u32,
    pub arn: String,
}

/// Versions are addressed by appending `:<n>` to the base ARN; the bare base
/// identifier addresses the draft.
pub fn versioned_identifier(base_arn: &str, version: u32) -> String {
    format!("{base_arn}:{version}")
}

pub trait PromptStore: Send + Sync {
    fn get_prompt<'a>(&'a self, identifier: &'a str) -> StoreFuture<'a, Prompt>;

    fn update_prompt<'a>(
        &'a self,
        identifier: &'a str,
        name: &'a str,
        description: Option<&'a str>,
        variants: &'a [PromptVariant],
    ) -> StoreFuture<'a, ()>;

    fn create_version<'a>(
        &'a self,
        identifier: &'a str,
        description: &'a str,
    ) -> StoreFuture<'a, CreatedVersion>;

    fn tag_resource<'a>(&'a self, resource_arn: &'a str, tags: &'a TagSet) -> StoreFuture<'a, ()>;

    fn list_tags<'a>(&'a self, resource_arn: &'a str) -> StoreFuture<'a, TagSet>;
}

pub trait ParameterStore: Send + Sync {
    fn get_parameter<'a>(&'a self, name: &'a str) -> StoreFuture<'a, String>;
}
