use super::*;
use crate::environments::{Environment, Environments};
use crate::store::memory::{text_variant, MemoryPromptStore};
use crate::store::PromptVariant;
use serde_json::json;

fn setup() -> (MemoryPromptStore, Environments) {
    (MemoryPromptStore::new(), Environments::builtin("text2sql"))
}

#[tokio::test]
async fn test_create_tagged_version_snapshots_the_new_content() {
    let (store, environments) = setup();
    let arn = store.seed_prompt("PROMPT1", "text2sql", "SELECT * FROM old");
    let controller = VersionController::new(&store, &environments, Environment::Dev, 20);

    let version = controller
        .create_tagged_version("PROMPT1", "SELECT * FROM new", "v1.1.0", Some("tuned query"))
        .await
        .unwrap();
    assert_eq!(version, 1);

    // the draft was overwritten and the snapshot captured the new content
    assert_eq!(store.draft_text("PROMPT1").unwrap(), "SELECT * FROM new");
    assert_eq!(store.version_text("PROMPT1", 1).unwrap(), "SELECT * FROM new");

    let versions = controller.list_versions("PROMPT1").await.unwrap();
    assert!(versions
        .iter()
        .any(|v| v.version == "1" && v.content_preview == "SELECT * FROM new"));

    let tags = store.tags_for(&format!("{arn}:1")).unwrap();
    assert_eq!(tags.get("Version").unwrap(), "v1.1.0");
    assert_eq!(tags.get("Environment").unwrap(), "DEV");
    assert_eq!(tags.get("Status").unwrap(), "TESTING");
    assert_eq!(tags.get("SourceEnvironment").unwrap(), "DEV");
    assert!(tags.contains_key("CreatedDate"));
    assert!(tags.contains_key("CreatedTime"));
}

#[tokio::test]
async fn test_version_numbers_are_append_only() {
    let (store, environments) = setup();
    store.seed_prompt("PROMPT1", "text2sql", "v0");
    let controller = VersionController::new(&store, &environments, Environment::Dev, 20);

    let first = controller
        .create_tagged_version("PROMPT1", "first", "v1.0.0", None)
        .await
        .unwrap();
    let second = controller
        .create_tagged_version("PROMPT1", "second", "v1.1.0", None)
        .await
        .unwrap();

    assert_eq!(first, 1);
    assert_eq!(second, 2);
    // earlier snapshots are immutable
    assert_eq!(store.version_text("PROMPT1", 1).unwrap(), "first");
    assert_eq!(store.version_text("PROMPT1", 2).unwrap(), "second");
}

#[tokio::test]
async fn test_write_preserves_non_text_variant_fields() {
    let (store, environments) = setup();
    let variant: PromptVariant = serde_json::from_value(json!({
        "name": "default",
        "templateConfiguration": {
            "text": { "text": "old", "inputVariables": [{"name": "table"}] }
        },
        "modelId": "some-model"
    }))
    .unwrap();
    store.seed_prompt_with_variants("PROMPT1", "text2sql", vec![variant]);
    let controller = VersionController::new(&store, &environments, Environment::Dev, 20);

    controller
        .create_tagged_version("PROMPT1", "new", "v1.0.0", None)
        .await
        .unwrap();

    let variants = store.draft_variants("PROMPT1");
    assert_eq!(variants[0].template_text().unwrap(), "new");
    assert_eq!(
        variants[0].template_configuration["text"]["inputVariables"],
        json!([{"name": "table"}])
    );
    assert_eq!(variants[0].extra["modelId"], json!("some-model"));
}

#[tokio::test]
async fn test_write_rewrites_every_variant() {
    let (store, environments) = setup();
    store.seed_prompt_with_variants(
        "PROMPT1",
        "text2sql",
        vec![text_variant("a"), text_variant("b")],
    );
    let controller = VersionController::new(&store, &environments, Environment::Dev, 20);

    controller
        .create_tagged_version("PROMPT1", "same", "v1.0.0", None)
        .await
        .unwrap();

    let variants = store.draft_variants("PROMPT1");
    assert_eq!(variants.len(), 2);
    assert!(variants
        .iter()
        .all(|v| v.template_text() == Some("same")));
}

#[tokio::test]
async fn test_write_fails_when_no_variant_has_a_text_template() {
    let (store, environments) = setup();
    let variant: PromptVariant = serde_json::from_value(json!({
        "name": "chat-only",
        "templateConfiguration": { "chat": { "messages": [] } }
    }))
    .unwrap();
    store.seed_prompt_with_variants("PROMPT1", "text2sql", vec![variant]);
    let controller = VersionController::new(&store, &environments, Environment::Dev, 20);

    let result = controller
        .create_tagged_version("PROMPT1", "new", "v1.0.0", None)
        .await;
    assert!(matches!(result, Err(AppError::Write(_))));
    assert_eq!(store.version_count("PROMPT1"), 0);
}

#[tokio::test]
async fn test_tag_failure_leaves_the_draft_mutated_without_rollback() {
    let (store, environments) = setup();
    store.seed_prompt("PROMPT1", "text2sql", "old");
    store.fail_tag_writes();
    let controller = VersionController::new(&store, &environments, Environment::Dev, 20);

    let result = controller
        .create_tagged_version("PROMPT1", "new", "v1.0.0", None)
        .await;
    assert!(matches!(result, Err(AppError::Write(_))));

    // accepted inconsistency window: draft mutated, snapshot created, no tags
    assert_eq!(store.draft_text("PROMPT1").unwrap(), "new");
    assert_eq!(store.version_count("PROMPT1"), 1);
}

#[tokio::test]
async fn test_write_against_unknown_prompt_fails() {
    let (store, environments) = setup();
    let controller = VersionController::new(&store, &environments, Environment::Dev, 20);

    let result = controller
        .create_tagged_version("NOPE", "content", "v1.0.0", None)
        .await;
    assert!(matches!(result, Err(AppError::Write(_))));
}
