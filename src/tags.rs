use chrono::{DateTime, Local};
use std::collections::BTreeMap;

/// Tag sets are the only structured metadata attached to a version. Keys are
/// unique, and the whole set is written once when the version is created.
pub type TagSet = BTreeMap<String, String>;

pub const ENVIRONMENT: &str = "Environment";
pub const STATUS: &str = "Status";
pub const VERSION: &str = "Version";
pub const CREATED_DATE: &str = "CreatedDate";
pub const CREATED_TIME: &str = "CreatedTime";
pub const SOURCE_ENVIRONMENT: &str = "SourceEnvironment";
pub const ROLLBACK_FROM: &str = "RollbackFrom";
pub const ROLLBACK_TO: &str = "RollbackTo";
pub const ROLLBACK_DATE: &str = "RollbackDate";
pub const ROLLBACK_REASON: &str = "RollbackReason";
pub const PROMOTED_FROM: &str = "PromotedFrom";
pub const PROMOTED_DATE: &str = "PromotedDate";
pub const PROMOTED_TIME: &str = "PromotedTime";
pub const SOURCE_PROMPT_ID: &str = "SourcePromptId";
pub const PROMOTION_TYPE: &str = "PromotionType";

pub const ROLLBACK_ENVIRONMENT: &str = "ROLLBACK";
pub const ROLLBACK_COMPLETE: &str = "ROLLBACK_COMPLETE";
pub const ENVIRONMENT_PROMOTION: &str = "ENVIRONMENT_PROMOTION";

pub fn tags_from(pairs: &[(&str, &str)]) -> TagSet {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Explicit entries override environment defaults on key conflict.
pub fn merge(defaults: &TagSet, explicit: TagSet) -> TagSet {
    let mut merged = defaults.clone();
    merged.extend(explicit);
    merged
}

pub fn version_tags(
    defaults: &TagSet,
    version_tag: &str,
    source_environment: &str,
    now: &DateTime<Local>,
) -> TagSet {
    let date = now.format("%Y-%m-%d").to_string();
    let time = now.format("%H:%M:%S").to_string();
    merge(
        defaults,
        tags_from(&[
            (VERSION, version_tag),
            (CREATED_DATE, &date),
            (CREATED_TIME, &time),
            (SOURCE_ENVIRONMENT, source_environment),
        ]),
    )
}

/// Rollback provenance always wins: the environment tag is forced to the
/// ROLLBACK sentinel no matter which environment initiated the rollback.
pub fn rollback_tags(
    defaults: &TagSet,
    target_version: &str,
    reason: &str,
    source_environment: &str,
    now: &DateTime<Local>,
) -> TagSet {
    let date = now.format("%Y-%m-%d").to_string();
    merge(
        defaults,
        tags_from(&[
            (ENVIRONMENT, ROLLBACK_ENVIRONMENT),
            (ROLLBACK_FROM, "DRAFT"),
            (ROLLBACK_TO, target_version),
            (ROLLBACK_DATE, &date),
            (ROLLBACK_REASON, reason),
            (STATUS, ROLLBACK_COMPLETE),
            (SOURCE_ENVIRONMENT, source_environment),
        ]),
    )
}

pub fn promotion_tags(
    defaults: &TagSet,
    version_tag: &str,
    from_environment: &str,
    source_prompt_id: &str,
    now: &DateTime<Local>,
) -> TagSet {
    let date = now.format("%Y-%m-%d").to_string();
    let time = now.format("%H:%M:%S").to_string();
    merge(
        defaults,
        tags_from(&[
            (VERSION, version_tag),
            (PROMOTED_FROM, from_environment),
            (PROMOTED_DATE, &date),
            (PROMOTED_TIME, &time),
            (SOURCE_PROMPT_ID, source_prompt_id),
            (PROMOTION_TYPE, ENVIRONMENT_PROMOTION),
        ]),
    )
}
