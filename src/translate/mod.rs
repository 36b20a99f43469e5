//! OCR translation pipeline: page image plus extracted HTML go to a
//! multimodal model, the grouped reply becomes a translator-ready workbook.

pub mod api;
pub mod grouping;
pub mod spreadsheet;


use crate::app_error::AppError;
use crate::config::load_model_api_key;
use crate::logger::Logger;
use api::{extract_text_from_response, MultimodalClient};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use grouping::parse_grouping_reply;
use spreadsheet::write_translation_document;
use std::fs;
use std::path::Path;

const GROUPING_QUERY: &str = "You are given a screenshot of a document page and the HTML text \
extracted from it by OCR. Group every piece of visible text into semantically related groups.

Reply with a JSON array inside a ```json fence. Each element must be an object with these \
fields: \"category\" (short group name), \"texts\" (array of the original text strings), \
\"description\" (what this group is, one sentence), \"priority\" (high, medium, or low for \
translation importance), and \"location\" (where on the page the group sits).

Use the image to resolve reading order and layout; use the HTML for the exact text. Do not \
translate anything yet, and do not omit any visible text.";

pub async fn run(
    logger: &Logger,
    image_path: &str,
    html_path: &str,
    source_lang: &str,
    target_lang: &str,
) -> Result<(), AppError> {
    // 1. load the page image and the OCR html
    println!("📄 Reading {image_path} and {html_path}...");
    let image_bytes = fs::read(image_path)?;
    let image_base64 = STANDARD.encode(&image_bytes);
    let mime_type = mime_for_image(image_path);
    let html = fs::read_to_string(html_path)?;

    // 2. ask the model to group the page text
    let api_key = load_model_api_key()?;
    let client = MultimodalClient::new(api_key);
    let prompt = format!("{GROUPING_QUERY}\n\nHTML extracted from the page:\n{html}");
    println!("🔄 Querying the model...");
    let response = client.query(&prompt, &image_base64, mime_type).await?;
    logger.log_json("model-response.json", &response)?;

    // A reply we cannot pull text out of still flows through the parser,
    // which turns it into the placeholder group.
    let reply = extract_text_from_response(&response).unwrap_or_default();
    logger.log_text("model-reply.txt", &reply)?;

    // 3. parse groups and write the workbook
    let groups = parse_grouping_reply(&reply);
    let image_name = Path::new(image_path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let output = write_translation_document(
        &groups,
        &image_name,
        source_lang,
        target_lang,
        Path::new("."),
    )?;

    println!(
        "✅ Wrote {} with {} groups ({source_lang} -> {target_lang})",
        output.display(),
        groups.len()
    );
    Ok(())
}

fn mime_for_image(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}
