//! In-memory store fakes used by the operation tests.

use super::{
    versioned_identifier, CreatedVersion, ParameterStore, Prompt, PromptStore, PromptVariant,
    StoreError, StoreFuture,
};
use crate::tags::TagSet;
use serde_json::{json, Map};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub struct MemoryPromptStore {
    records: Mutex<HashMap<String, PromptRecord>>,
    tags: Mutex<HashMap<String, TagSet>>,
    fail_tag_lookup: AtomicBool,
    fail_tag_write: AtomicBool,
    fail_probe_at: Mutex<Option<u32>>,
    corrupt_next_update: AtomicBool,
}

struct PromptRecord {
    draft: Prompt,
    versions: BTreeMap<u32, Prompt>,
}

impl MemoryPromptStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            tags: Mutex::new(HashMap::new()),
            fail_tag_lookup: AtomicBool::new(false),
            fail_tag_write: AtomicBool::new(false),
            fail_probe_at: Mutex::new(None),
            corrupt_next_update: AtomicBool::new(false),
        }
    }

    /// Registers a prompt with a single text variant and returns its base ARN.
    pub fn seed_prompt(&self, id: &str, name: &str, text: &str) -> String {
        let arn = format!("arn:aws:bedrock:us-west-2:000000000000:prompt/{id}");
        let draft = Prompt {
            id: id.to_string(),
            arn: arn.clone(),
            name: name.to_string(),
            description: None,
            variants: vec![text_variant(text)],
            extra: Map::new(),
        };
        self.records.lock().unwrap().insert(
            id.to_string(),
            PromptRecord {
                draft,
                versions: BTreeMap::new(),
            },
        );
        arn
    }

    pub fn seed_prompt_with_variants(
        &self,
        id: &str,
        name: &str,
        variants: Vec<PromptVariant>,
    ) -> String {
        let arn = self.seed_prompt(id, name, "");
        let mut records = self.records.lock().unwrap();
        records.get_mut(id).unwrap().draft.variants = variants;
        arn
    }

    pub fn fail_tag_lookups(&self) {
        self.fail_tag_lookup.store(true, Ordering::SeqCst);
    }

    pub fn fail_tag_writes(&self) {
        self.fail_tag_write.store(true, Ordering::SeqCst);
    }

    /// Makes the probe for the given version number fail with a remote fault
    /// instead of NotFound.
    pub fn fail_probe_at(&self, version: u32) {
        *self.fail_probe_at.lock().unwrap() = Some(version);
    }

    /// Corrupts the draft text right after the next update lands, simulating
    /// an interleaved writer between update and read-back.
    pub fn corrupt_next_update(&self) {
        self.corrupt_next_update.store(true, Ordering::SeqCst);
    }

    pub fn draft_text(&self, id: &str) -> Option<String> {
        let records = self.records.lock().unwrap();
        records
            .get(id)
            .and_then(|r| r.draft.first_variant_text().map(str::to_string))
    }

    pub fn draft_variants(&self, id: &str) -> Vec<PromptVariant> {
        let records = self.records.lock().unwrap();
        records
            .get(id)
            .map(|r| r.draft.variants.clone())
            .unwrap_or_default()
    }

    pub fn version_text(&self, id: &str, version: u32) -> Option<String> {
        let records = self.records.lock().unwrap();
        records
            .get(id)
            .and_then(|r| r.versions.get(&version))
            .and_then(|p| p.first_variant_text().map(str::to_string))
    }

    pub fn version_count(&self, id: &str) -> usize {
        let records = self.records.lock().unwrap();
        records.get(id).map(|r| r.versions.len()).unwrap_or(0)
    }

    pub fn tags_for(&self, resource_arn: &str) -> Option<TagSet> {
        self.tags.lock().unwrap().get(resource_arn).cloned()
    }
}

impl PromptStore for MemoryPromptStore {
    fn get_prompt<'a>(&'a self, identifier: &'a str) -> StoreFuture<'a, Prompt> {
        Box::pin(async move {
            if let Some((base_arn, version)) = split_versioned(identifier) {
                if *self.fail_probe_at.lock().unwrap() == Some(version) {
                    return Err(StoreError::Remote(format!(
                        "simulated fault probing version {version}"
                    )));
                }
                let records = self.records.lock().unwrap();
                let record = records
                    .values()
                    .find(|r| r.draft.arn == base_arn)
                    .ok_or_else(|| StoreError::NotFound(identifier.to_string()))?;
                return record
                    .versions
                    .get(&version)
                    .cloned()
                    .ok_or_else(|| StoreError::NotFound(identifier.to_string()));
            }
            let records = self.records.lock().unwrap();
            find_record(&records, identifier)
                .map(|r| r.draft.clone())
                .ok_or_else(|| StoreError::NotFound(identifier.to_string()))
        })
    }

    fn update_prompt<'a>(
        &'a self,
        identifier: &'a str,
        name: &'a str,
        description: Option<&'a str>,
        variants: &'a [PromptVariant],
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut records = self.records.lock().unwrap();
            let record = find_record_mut(&mut records, identifier)
                .ok_or_else(|| StoreError::NotFound(identifier.to_string()))?;
            record.draft.name = name.to_string();
            if let Some(description) = description {
                record.draft.description = Some(description.to_string());
            }
            record.draft.variants = variants.to_vec();
            if self.corrupt_next_update.swap(false, Ordering::SeqCst) {
                for variant in &mut record.draft.variants {
                    if let Some(text) = variant.template_text().map(str::to_string) {
                        variant.set_template_text(&format!("{text} [interleaved write]"));
                    }
                }
            }
            Ok(())
        })
    }

    fn create_version<'a>(
        &'a self,
        identifier: &'a str,
        description: &'a str,
    ) -> StoreFuture<'a, CreatedVersion> {
        Box::pin(async move {
            let mut records = self.records.lock().unwrap();
            let record = find_record_mut(&mut records, identifier)
                .ok_or_else(|| StoreError::NotFound(identifier.to_string()))?;
            let next = record.versions.keys().next_back().copied().unwrap_or(0) + 1;
            let arn = versioned_identifier(&record.draft.arn, next);
            let mut snapshot = record.draft.clone();
            snapshot.arn = arn.clone();
            snapshot.description = Some(description.to_string());
            record.versions.insert(next, snapshot);
            Ok(CreatedVersion { version: next, arn })
        })
    }

    fn tag_resource<'a>(&'a self, resource_arn: &'a str, tags: &'a TagSet) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            if self.fail_tag_write.load(Ordering::SeqCst) {
                return Err(StoreError::Remote("tag service unavailable".to_string()));
            }
            self.tags
                .lock()
                .unwrap()
                .insert(resource_arn.to_string(), tags.clone());
            Ok(())
        })
    }

    fn list_tags<'a>(&'a self, resource_arn: &'a str) -> StoreFuture<'a, TagSet> {
        Box::pin(async move {
            if self.fail_tag_lookup.load(Ordering::SeqCst) {
                return Err(StoreError::Remote("tag service unavailable".to_string()));
            }
            Ok(self
                .tags
                .lock()
                .unwrap()
                .get(resource_arn)
                .cloned()
                .unwrap_or_default())
        })
    }
}

pub struct MemoryParameterStore {
    values: Mutex<HashMap<String, String>>,
    fail: AtomicBool,
}

impl MemoryParameterStore {
    pub fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn register(&self, name: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    pub fn fail_lookups(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

impl ParameterStore for MemoryParameterStore {
    fn get_parameter<'a>(&'a self, name: &'a str) -> StoreFuture<'a, String> {
        Box::pin(async move {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Remote("access denied".to_string()));
            }
            self.values
                .lock()
                .unwrap()
                .get(name)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(name.to_string()))
        })
    }
}

pub fn text_variant(text: &str) -> PromptVariant {
    PromptVariant {
        name: "default".to_string(),
        template_configuration: json!({ "text": { "text": text, "inputVariables": [] } }),
        extra: Map::new(),
    }
}

// A versioned identifier ends in ":<n>" after the "prompt/<id>" segment; a
// bare id or base ARN addresses the draft.
fn split_versioned(identifier: &str) -> Option<(&str, u32)> {
    let (base, version) = identifier.rsplit_once(':')?;
    let version = version.parse().ok()?;
    base.contains("prompt/").then_some((base, version))
}

fn find_record<'a>(
    records: &'a HashMap<String, PromptRecord>,
    identifier: &str,
) -> Option<&'a PromptRecord> {
    records
        .get(identifier)
        .or_else(|| records.values().find(|r| r.draft.arn == identifier))
}

fn find_record_mut<'a>(
    records: &'a mut HashMap<String, PromptRecord>,
    identifier: &str,
) -> Option<&'a mut PromptRecord> {
    if records.contains_key(identifier) {
        return records.get_mut(identifier);
    }
    records.values_mut().find(|r| r.draft.arn == identifier)
}
