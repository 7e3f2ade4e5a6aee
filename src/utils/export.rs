//! Export formatter
//!
//! Renders a prompt list as JSON, CSV or Markdown and hands the payload to
//! the file system. Column headers and labels stay in Spanish to match the
//! data they describe.

use crate::core::data::{Prompt, UNCATEGORIZED};
use crate::utils::error::{AppError, AppResult};
use crate::utils::format::{format_datetime, format_tags_comma};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::path::{Path, PathBuf};

const CSV_HEADERS: [&str; 8] = [
    "ID",
    "Título",
    "Contenido",
    "Descripción",
    "Categoría",
    "Etiquetas",
    "Favorito",
    "Creado",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    #[value(alias = "md")]
    Markdown,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "md",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Markdown => "text/markdown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON",
            ExportFormat::Csv => "CSV",
            ExportFormat::Markdown => "Markdown",
        }
    }
}

/// A rendered export ready to be written out
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPayload {
    pub content: String,
    pub filename: String,
    pub mime_type: &'static str,
}

/// Render `prompts` in `format`; `date` names the suggested file
pub fn export_prompts(
    prompts: &[Prompt],
    format: ExportFormat,
    date: DateTime<Utc>,
) -> AppResult<ExportPayload> {
    let content = match format {
        ExportFormat::Json => to_json(prompts)?,
        ExportFormat::Csv => to_csv(prompts)?,
        ExportFormat::Markdown => to_markdown(prompts),
    };

    Ok(ExportPayload {
        content,
        filename: format!(
            "prompts_export_{}.{}",
            date.format("%Y-%m-%d"),
            format.extension()
        ),
        mime_type: format.mime_type(),
    })
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Sí" } else { "No" }
}

pub fn to_json(prompts: &[Prompt]) -> AppResult<String> {
    serde_json::to_string_pretty(prompts)
        .map_err(|e| AppError::System(format!("Failed to serialize prompts to JSON: {}", e)))
}

/// Every cell is quoted; embedded double quotes are doubled
pub fn to_csv(prompts: &[Prompt]) -> AppResult<String> {
    let csv_error = |e: csv::Error| AppError::System(format!("Failed to write CSV: {}", e));

    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(CSV_HEADERS).map_err(csv_error)?;
    for p in prompts {
        let created = p.created_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        wtr.write_record([
            p.id.as_str(),
            p.title.as_str(),
            p.content.as_str(),
            p.description.as_deref().unwrap_or(""),
            p.category.as_deref().unwrap_or(""),
            p.tags.join(";").as_str(),
            yes_no(p.favorite),
            created.as_str(),
        ])
        .map_err(csv_error)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::System(format!("Failed to flush CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::System(format!("CSV is not UTF-8: {}", e)))
}

pub fn to_markdown(prompts: &[Prompt]) -> String {
    prompts
        .iter()
        .map(markdown_section)
        .collect::<Vec<_>>()
        .join("\n")
}

fn markdown_section(p: &Prompt) -> String {
    let mut out = format!("# {}\n\n", p.title);

    if let Some(desc) = p.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("*{}*\n\n", desc));
    }

    out.push_str(&format!("```\n{}\n```\n\n", p.content));

    let category = p.category.as_deref().filter(|c| !c.is_empty()).unwrap_or(UNCATEGORIZED);
    let tags = if p.tags.is_empty() {
        "Ninguna".to_string()
    } else {
        format_tags_comma(&p.tags)
    };
    out.push_str(&format!("**Categoría:** {}\n", category));
    out.push_str(&format!("**Etiquetas:** {}\n", tags));
    out.push_str(&format!("**Favorito:** {}\n", yes_no(p.favorite)));
    out.push_str(&format!("**Creado:** {}\n\n", format_datetime(&p.created_at)));
    out.push_str("---\n");
    out
}

/// Write the payload into `dir` under its suggested name
pub fn save_payload(payload: &ExportPayload, dir: &Path) -> AppResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(&payload.filename);
    fs::write(&path, &payload.content)?;
    tracing::debug!(path = %path.display(), mime = payload.mime_type, "export written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::fixtures::prompt;

    fn date() -> DateTime<Utc> {
        "2025-03-15T12:00:00Z".parse().unwrap()
    }

    fn sample() -> Vec<Prompt> {
        let mut a = prompt("p1", "Quote", "He said \"hi\"", date());
        a.tags = vec!["chat".into(), "greeting".into()];
        a.favorite = true;
        a.description = Some("A short one".into());
        let b = prompt("p2", "Plain", "no tags here", date());
        vec![a, b]
    }

    #[test]
    fn test_payload_names_and_mime_types() {
        let json = export_prompts(&[], ExportFormat::Json, date()).unwrap();
        assert_eq!(json.filename, "prompts_export_2025-03-15.json");
        assert_eq!(json.mime_type, "application/json");

        let csv = export_prompts(&[], ExportFormat::Csv, date()).unwrap();
        assert_eq!(csv.filename, "prompts_export_2025-03-15.csv");
        assert_eq!(csv.mime_type, "text/csv");

        let md = export_prompts(&[], ExportFormat::Markdown, date()).unwrap();
        assert_eq!(md.filename, "prompts_export_2025-03-15.md");
        assert_eq!(md.mime_type, "text/markdown");
    }

    #[test]
    fn test_json_round_trips() {
        let prompts = sample();
        let json = to_json(&prompts).unwrap();
        let back: Vec<Prompt> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, prompts);
    }

    #[test]
    fn test_csv_doubles_embedded_quotes() {
        let csv = to_csv(&sample()).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            r#""ID","Título","Contenido","Descripción","Categoría","Etiquetas","Favorito","Creado""#
        );
        let first = lines.next().unwrap();
        assert!(first.contains(r#""He said ""hi""""#));
        assert!(first.contains(r#""chat;greeting""#));
        assert!(first.contains(r#""Sí""#));
        assert!(lines.next().unwrap().contains(r#""No""#));
    }

    #[test]
    fn test_csv_reads_back_with_eight_columns() {
        let csv = to_csv(&sample()).unwrap();
        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.len() == 8));
        assert_eq!(&rows[0][2], "He said \"hi\"");
    }

    #[test]
    fn test_markdown_sections() {
        let md = to_markdown(&sample());

        assert!(md.starts_with("# Quote\n\n*A short one*\n\n```\nHe said \"hi\"\n```\n"));
        assert!(md.contains("**Etiquetas:** chat, greeting\n"));
        assert!(md.contains("**Etiquetas:** Ninguna\n"));
        assert!(md.contains("**Favorito:** Sí\n"));
        assert!(md.contains("**Categoría:** Sin Categoría\n"));
        assert_eq!(md.matches("---\n").count(), 2);
        assert!(!md.contains("# Plain\n\n*"));
    }

    #[test]
    fn test_save_payload_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let payload = export_prompts(&sample(), ExportFormat::Markdown, date()).unwrap();

        let path = save_payload(&payload, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("prompts_export_2025-03-15.md"));
        assert_eq!(fs::read_to_string(path).unwrap(), payload.content);
    }
}
