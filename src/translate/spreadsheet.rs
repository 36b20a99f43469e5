use crate::app_error::AppError;
use crate::translate::grouping::TextGroup;
use chrono::Local;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::{Path, PathBuf};

pub const RESULTS_DIR: &str = "final_results";

const TRANSLATION_HEADERS: [&str; 9] = [
    "ID",
    "Category",
    "Priority",
    "Location",
    "Description",
    "Original_Text",
    "Translated_Text",
    "Notes",
    "Status",
];

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRow {
    pub id: String,
    pub category: String,
    pub priority: String,
    pub location: String,
    pub description: String,
    pub original_text: String,
}

/// Flattens groups into spreadsheet rows, skipping groups with no usable
/// text. Row ids are stable and sequential so translators can reference them.
pub fn build_rows(groups: &[TextGroup]) -> Vec<TranslationRow> {
    let mut rows = Vec::new();
    for group in groups {
        let body = group.texts.join("\n");
        if body.trim().is_empty() {
            continue;
        }
        rows.push(TranslationRow {
            id: format!("T{:03}", rows.len() + 1),
            category: group.category.clone(),
            priority: group.priority.clone(),
            location: group.location.clone(),
            description: group.description.clone(),
            original_text: format!("[{}]\n{}", group.category, body),
        });
    }
    rows
}

/// Writes the two-sheet translation workbook under `final_results/` and
/// returns the path of the written file.
pub fn write_translation_document(
    groups: &[TextGroup],
    image_name: &str,
    source_lang: &str,
    target_lang: &str,
    output_root: &Path,
) -> Result<PathBuf, AppError> {
    let results_dir = output_root.join(RESULTS_DIR);
    fs::create_dir_all(&results_dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let file_path =
        results_dir.join(format!("translation_document_{image_name}_{timestamp}.xlsx"));

    let rows = build_rows(groups);
    let mut workbook = Workbook::new();

    let translation_sheet = workbook.add_worksheet();
    translation_sheet.set_name("Translation")?;
    for (col, header) in TRANSLATION_HEADERS.iter().enumerate() {
        let header = match *header {
            "Original_Text" => format!("Original_Text_{source_lang}"),
            "Translated_Text" => format!("Translated_Text_{target_lang}"),
            other => other.to_string(),
        };
        translation_sheet.write(0, col as u16, header)?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        translation_sheet.write(r, 0, row.id.as_str())?;
        translation_sheet.write(r, 1, row.category.as_str())?;
        translation_sheet.write(r, 2, row.priority.as_str())?;
        translation_sheet.write(r, 3, row.location.as_str())?;
        translation_sheet.write(r, 4, row.description.as_str())?;
        translation_sheet.write(r, 5, row.original_text.as_str())?;
        // translated text and notes start blank for the translator to fill
        translation_sheet.write(r, 6, "")?;
        translation_sheet.write(r, 7, "")?;
        translation_sheet.write(r, 8, "Pending")?;
    }

    let info_sheet = workbook.add_worksheet();
    info_sheet.set_name("Info")?;
    let creation_date = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let total_groups = rows.len().to_string();
    let info_rows = [
        ("Field", "Value"),
        ("Creation Date", creation_date.as_str()),
        ("Source Language", source_lang),
        ("Target Language", target_lang),
        ("Total Groups", total_groups.as_str()),
        (
            "Instructions",
            "Fill in the Translated_Text column and set Status to Done per row.",
        ),
    ];
    for (r, (field, value)) in info_rows.iter().enumerate() {
        info_sheet.write(r as u32, 0, *field)?;
        info_sheet.write(r as u32, 1, *value)?;
    }

    workbook.save(&file_path)?;
    Ok(file_path)
}
