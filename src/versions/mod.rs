//! Tag-based version control over a remote prompt resource: the
//! write-draft/snapshot/tag primitive and the list, rollback, and promotion
//! operations built on top of it.

#[cfg(test)]
mod writer_test;

use crate::app_error::AppError;
use crate::environments::{Environment, Environments};
use crate::resolver::ParameterResolver;
use crate::store::{versioned_identifier, Prompt, PromptStore, StoreError};
use crate::tags::{self, TagSet};
use chrono::Local;

pub const DRAFT_LABEL: &str = "DRAFT";
const PREVIEW_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackTarget {
    Draft,
    Version(u32),
}

impl RollbackTarget {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        if s == DRAFT_LABEL {
            return Ok(RollbackTarget::Draft);
        }
        s.parse::<u32>()
            .map(RollbackTarget::Version)
            .map_err(|_| {
                AppError::Config(format!(
                    "Invalid rollback target '{s}': expected a version number or DRAFT"
                ))
            })
    }

    pub fn label(&self) -> String {
        match self {
            RollbackTarget::Draft => DRAFT_LABEL.to_string(),
            RollbackTarget::Version(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VersionSummary {
    /// "DRAFT" for the mutable working copy, otherwise the version number.
    pub version: String,
    pub arn: String,
    pub name: String,
    /// Truncated for display; never the canonical content.
    pub content_preview: String,
    pub tags: TagSet,
}

pub struct VersionController<'a> {
    store: &'a dyn PromptStore,
    environments: &'a Environments,
    environment: Environment,
    probe_limit: u32,
}

impl<'a> VersionController<'a> {
    pub fn new(
        store: &'a dyn PromptStore,
        environments: &'a Environments,
        environment: Environment,
        probe_limit: u32,
    ) -> Self {
        Self {
            store,
            environments,
            environment,
            probe_limit,
        }
    }

    /// The basic write primitive: update the draft in place, snapshot it into
    /// a new immutable version, then attach the tag set. A failure after the
    /// draft update leaves the draft mutated with no corresponding version;
    /// nothing here attempts to roll that back.
    pub async fn create_tagged_version(
        &self,
        identifier: &str,
        content: &str,
        version_tag: &str,
        description: Option<&str>,
    ) -> Result<u32, AppError> {
        let environment = self.environment;

        // 1-3. overwrite the draft, preserving every non-text template field
        self.overwrite_draft(identifier, content, description).await?;

        // 4. snapshot the draft into the next numbered version
        let snapshot_description = format!(
            "{} {}: {}",
            environment.label(),
            version_tag,
            description.unwrap_or("Version created")
        );
        let created = self
            .store
            .create_version(identifier, &snapshot_description)
            .await
            .map_err(|e| {
                AppError::Write(format!("could not create version for {identifier}: {e}"))
            })?;

        // 5-6. environment defaults plus provenance, explicit keys winning
        let defaults = &self.environments.get(environment).default_tags;
        let tag_set =
            tags::version_tags(defaults, version_tag, environment.label(), &Local::now());
        self.store
            .tag_resource(&created.arn, &tag_set)
            .await
            .map_err(|e| {
                AppError::Write(format!(
                    "could not tag version {} of {identifier}: {e}",
                    created.version
                ))
            })?;

        println!(
            "✅ Created version {} ({}) in {}",
            created.version,
            version_tag,
            environment.label()
        );
        Ok(created.version)
    }

    /// Lists the draft plus every numbered version discovered by probing
    /// 1..=probe_limit. The first missing number terminates discovery;
    /// versions are append-only, so a gap means the end. Genuine remote
    /// faults during probing propagate instead of posing as absence.
    pub async fn list_versions(&self, identifier: &str) -> Result<Vec<VersionSummary>, AppError> {
        let draft = self.store.get_prompt(identifier).await.map_err(|e| {
            AppError::Network(format!("could not fetch draft for {identifier}: {e}"))
        })?;

        let mut summaries = Vec::new();
        summaries.push(VersionSummary {
            version: DRAFT_LABEL.to_string(),
            arn: draft.arn.clone(),
            name: draft.name.clone(),
            content_preview: preview(draft.first_variant_text().unwrap_or_default()),
            // the draft is never tagged
            tags: TagSet::new(),
        });

        for number in 1..=self.probe_limit {
            let version_arn = versioned_identifier(&draft.arn, number);
            let prompt = match self.store.get_prompt(&version_arn).await {
                Ok(prompt) => prompt,
                Err(StoreError::NotFound(_)) => break,
                Err(e) => {
                    return Err(AppError::Network(format!(
                        "probing {version_arn} failed: {e}"
                    )))
                }
            };
            // A tag lookup fault downgrades to an empty tag set rather than
            // aborting the whole listing.
            let tags = self.store.list_tags(&version_arn).await.unwrap_or_default();
            summaries.push(VersionSummary {
                version: number.to_string(),
                arn: version_arn,
                name: prompt.name.clone(),
                content_preview: preview(prompt.first_variant_text().unwrap_or_default()),
                tags,
            });
        }

        Ok(summaries)
    }

    /// Restores the draft to the target's content and snapshots the result
    /// as a new version carrying rollback provenance.
    pub async fn rollback_to_version(
        &self,
        identifier: &str,
        target: RollbackTarget,
        reason: &str,
    ) -> Result<u32, AppError> {
        // 1. the draft carries the base ARN used to address the target
        let current = self.store.get_prompt(identifier).await.map_err(|e| {
            AppError::Write(format!("could not fetch draft for {identifier}: {e}"))
        })?;

        // 2. resolve the target's content
        let target_content = match target {
            RollbackTarget::Draft => current.first_variant_text().map(str::to_string),
            RollbackTarget::Version(number) => {
                let target_arn = versioned_identifier(&current.arn, number);
                let target_prompt = self.store.get_prompt(&target_arn).await.map_err(|e| {
                    AppError::Write(format!("could not fetch rollback target {target_arn}: {e}"))
                })?;
                target_prompt.first_variant_text().map(str::to_string)
            }
        }
        .ok_or_else(|| {
            AppError::Write(format!(
                "rollback target {} of {identifier} has no text content",
                target.label()
            ))
        })?;

        // 3. overwrite the draft with the target content
        let rollback_description = format!("Rollback to version {}: {reason}", target.label());
        self.overwrite_draft(identifier, &target_content, Some(&rollback_description))
            .await?;

        // 4. snapshot the restored draft
        let created = self
            .store
            .create_version(
                identifier,
                &format!("ROLLBACK to v{} - {reason}", target.label()),
            )
            .await
            .map_err(|e| {
                AppError::Write(format!(
                    "could not create rollback version for {identifier}: {e}"
                ))
            })?;

        // 5. rollback provenance overrides the environment defaults
        let defaults = &self.environments.get(self.environment).default_tags;
        let tag_set = tags::rollback_tags(
            defaults,
            &target.label(),
            reason,
            self.environment.label(),
            &Local::now(),
        );
        self.store
            .tag_resource(&created.arn, &tag_set)
            .await
            .map_err(|e| {
                AppError::Write(format!(
                    "could not tag rollback version {} of {identifier}: {e}",
                    created.version
                ))
            })?;

        println!(
            "✅ Rolled back to version {} (new version {})",
            target.label(),
            created.version
        );
        Ok(created.version)
    }

    /// Copies the source draft into the destination environment's draft and
    /// snapshots it there. Destination resolution failure aborts the whole
    /// operation before anything is mutated; a read-back mismatch after the
    /// snapshot fails the promotion outright.
    pub async fn promote_version(
        &self,
        source_identifier: &str,
        to_environment: Environment,
        version_tag: &str,
        resolver: &ParameterResolver<'_>,
    ) -> Result<u32, AppError> {
        let from_environment = self.environment;
        println!(
            "🔄 Promoting from {} to {}...",
            from_environment.label(),
            to_environment.label()
        );

        // 1. source draft content
        let source = self.store.get_prompt(source_identifier).await.map_err(|e| {
            AppError::Write(format!(
                "could not fetch source draft {source_identifier}: {e}"
            ))
        })?;
        let source_content = source
            .first_variant_text()
            .ok_or_else(|| {
                AppError::Write(format!(
                    "source draft {source_identifier} has no text content"
                ))
            })?
            .to_string();

        // 2. destination prompt id via the indirection record
        let destination_id = resolver.resolve(to_environment).await?;

        // 3-4. structure-preserving overwrite of the destination draft
        let promote_description = format!(
            "Promoted from {} - {version_tag}",
            from_environment.label()
        );
        self.overwrite_draft(&destination_id, &source_content, Some(&promote_description))
            .await?;

        // 5. snapshot the destination draft
        let created = self
            .store
            .create_version(
                &destination_id,
                &format!(
                    "Promoted from {} to {} - {version_tag}",
                    from_environment.label(),
                    to_environment.label()
                ),
            )
            .await
            .map_err(|e| {
                AppError::Write(format!(
                    "could not create promoted version for {destination_id}: {e}"
                ))
            })?;

        // 6. destination defaults plus promotion provenance
        let defaults = &self.environments.get(to_environment).default_tags;
        let tag_set = tags::promotion_tags(
            defaults,
            version_tag,
            from_environment.label(),
            source_identifier,
            &Local::now(),
        );
        self.store
            .tag_resource(&created.arn, &tag_set)
            .await
            .map_err(|e| {
                AppError::Write(format!(
                    "could not tag promoted version {} of {destination_id}: {e}",
                    created.version
                ))
            })?;

        // 7. read-back verification
        let verification = self.store.get_prompt(&destination_id).await.map_err(|e| {
            AppError::Verification(format!(
                "could not re-read destination draft {destination_id}: {e}"
            ))
        })?;
        if verification.first_variant_text() != Some(source_content.as_str()) {
            return Err(AppError::Verification(format!(
                "destination draft {destination_id} does not match the promoted content"
            )));
        }

        println!(
            "✅ Promoted {} -> {} as version {} ({version_tag})",
            from_environment.label(),
            to_environment.label(),
            created.version
        );
        Ok(created.version)
    }

    // Fetches the current draft and rewrites the text of every template
    // variant, leaving all other variant fields untouched.
    async fn overwrite_draft(
        &self,
        identifier: &str,
        content: &str,
        description: Option<&str>,
    ) -> Result<Prompt, AppError> {
        let current = self.store.get_prompt(identifier).await.map_err(|e| {
            AppError::Write(format!("could not fetch draft for {identifier}: {e}"))
        })?;

        let mut variants = current.variants.clone();
        let mut replaced = false;
        for variant in &mut variants {
            replaced |= variant.set_template_text(content);
        }
        if !replaced {
            return Err(AppError::Write(format!(
                "prompt {identifier} has no text template variant to update"
            )));
        }

        let description = description.or(current.description.as_deref());
        self.store
            .update_prompt(identifier, &current.name, description, &variants)
            .await
            .map_err(|e| {
                AppError::Write(format!("could not update draft for {identifier}: {e}"))
            })?;
        Ok(current)
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LIMIT {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(PREVIEW_LIMIT).collect();
        format!("{truncated}...")
    }
}
