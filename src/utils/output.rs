use crate::cli::ListFormat;
use crate::config::Config;
use crate::core::assist::QualityAudit;
use crate::core::controller::{Notification, NotificationKind};
use crate::core::data::{Category, Prompt, PromptVersion, category_color};
use crate::utils::error::{AppError, AppResult};
use crate::utils::format::{
    format_datetime, format_tags_comma, format_tags_hash, parse_hex_color, truncate_string,
};
use colored::*;

pub struct OutputStyle;

impl OutputStyle {
    pub fn description(text: &str) -> ColoredString {
        text.bright_green()
    }

    pub fn command(text: &str) -> ColoredString {
        text.bright_yellow()
    }

    pub fn content(text: &str) -> ColoredString {
        text.clear()
    }

    pub fn tags(text: &str) -> ColoredString {
        text.bright_cyan()
    }

    pub fn title(text: &str) -> ColoredString {
        text.bright_blue().bold()
    }

    pub fn header(text: &str) -> ColoredString {
        text.bold()
    }

    pub fn label(text: &str) -> ColoredString {
        text.cyan()
    }

    pub fn success(text: &str) -> ColoredString {
        text.green()
    }

    pub fn error(text: &str) -> ColoredString {
        text.red()
    }

    pub fn warning(text: &str) -> ColoredString {
        text.yellow()
    }

    pub fn info(text: &str) -> ColoredString {
        text.blue()
    }

    pub fn muted(text: &str) -> ColoredString {
        text.dimmed()
    }

    /// Text painted in a category's hex color; plain when the color is malformed
    pub fn swatch(text: &str, hex: &str) -> ColoredString {
        match parse_hex_color(hex) {
            Some((r, g, b)) => text.truecolor(r, g, b),
            None => text.clear(),
        }
    }

    pub fn separator() -> String {
        "─".repeat(50)
    }

    pub fn header_separator() -> String {
        "═".repeat(50)
    }

    pub fn print_header(title: &str) {
        println!("{}", Self::title(title));
        println!("{}", Self::header_separator());
    }

    pub fn print_field_colored(label: &str, value: &str, color_fn: impl Fn(&str) -> ColoredString) {
        println!("{:>12}: {}", Self::label(label), color_fn(value));
    }

    pub fn print_prompt_detailed(prompt: &Prompt, categories: &[Category]) {
        let star = if prompt.favorite { " ★" } else { "" };
        println!("{}{}", Self::title(&format!("📝 {}", prompt.title)), Self::warning(star));

        Self::print_field_colored("ID", &prompt.id, Self::muted);
        if let Some(desc) = prompt.description.as_deref().filter(|d| !d.is_empty()) {
            Self::print_field_colored("Description", desc, Self::description);
        }
        let category = prompt.category_label();
        let color = category_color(category, categories);
        Self::print_field_colored("Category", category, |c| Self::swatch(c, color));
        Self::print_field_colored("Tags", &format_tags_comma(&prompt.tags), Self::tags);
        if let Some(score) = prompt.quality_score.filter(|s| *s > 0.0) {
            Self::print_field_colored("Quality", &format!("{}/10", score), Self::info);
        }
        if let Some(tone) = prompt.tone.as_deref().filter(|t| !t.is_empty()) {
            Self::print_field_colored("Tone", tone, Self::content);
        }
        if let Some(feedback) = prompt.quality_feedback.as_deref().filter(|f| !f.is_empty()) {
            Self::print_field_colored("Feedback", feedback, Self::muted);
        }
        Self::print_field_colored("Created", &format_datetime(&prompt.created_at), Self::muted);
        Self::print_field_colored("Updated", &format_datetime(&prompt.updated_at), Self::muted);

        println!("\n{}:", Self::title("📄 Content"));
        println!("{}", Self::content(&prompt.content));
    }

    /// One-line summary used by the simple list
    pub fn format_prompt_line(prompt: &Prompt, categories: &[Category], config: &Config) -> String {
        let short_id: String = prompt.id.chars().take(8).collect();
        let star = if prompt.favorite { "★ " } else { "  " };
        let category = prompt.category_label();
        let preview = if config.general.content_preview {
            format!(" {}", truncate_string(&prompt.content, 60))
        } else {
            String::new()
        };

        format!(
            "{} {}{} {}{}{}",
            Self::muted(&short_id),
            Self::warning(star),
            Self::description(&prompt.title),
            Self::swatch(&format!("[{}]", category), category_color(category, categories)),
            Self::tags(&format_tags_hash(&prompt.tags)),
            Self::muted(&preview)
        )
    }

    pub fn print_versions(prompt: &Prompt, versions: &[PromptVersion]) {
        Self::print_header(&format!("🕘 History of '{}'", prompt.title));
        if versions.is_empty() {
            println!("{}", Self::muted("No previous versions."));
            return;
        }
        for (i, version) in versions.iter().enumerate() {
            println!(
                "{:>3}. {} {}",
                i + 1,
                Self::muted(&format_datetime(&version.created_at)),
                Self::description(&version.title)
            );
            println!("     {}", Self::content(&truncate_string(&version.content, 70)));
        }
    }

    pub fn print_categories(categories: &[Category]) {
        println!("📁 Categories ({})", categories.len());
        println!("{}", Self::separator());
        for category in categories {
            println!(
                "  {} {} {}",
                Self::swatch("■", &category.color),
                category.name,
                Self::muted(&category.color)
            );
        }
    }

    pub fn print_variables_list(variables: &[String]) {
        println!("\n🔧 {}:", Self::header("This prompt contains variables"));
        for name in variables {
            println!("  {}", Self::command(&format!("{{{{{}}}}}", name)));
        }
    }

    pub fn print_rendered_content(content: &str) {
        println!("\n{}:", Self::header("📤 Rendered Prompt"));
        println!("{}", Self::header_separator());
        println!("{}", Self::content(content));
        println!("{}", Self::header_separator());
    }

    pub fn print_quality_audit(audit: &QualityAudit) {
        Self::print_header("🔎 Quality analysis");
        Self::print_field_colored("Score", &format!("{}/10", audit.score), Self::info);
        Self::print_field_colored("Tone", &audit.tone, Self::content);
        Self::print_field_colored("Feedback", &audit.feedback, Self::description);
    }

    pub fn print_notification(notification: &Notification) {
        match notification.kind {
            NotificationKind::Success => print_success(&notification.message),
            NotificationKind::Info => println!("ℹ️  {}", Self::info(&notification.message)),
            NotificationKind::Error => eprintln!("❌ {}", Self::error(&notification.message)),
        }
    }
}

pub fn print_prompt_count(count: usize) {
    if count == 0 {
        println!("{}", OutputStyle::muted("No prompts found."));
    } else {
        println!(
            "📝 {} ({} found)",
            OutputStyle::header("Prompts"),
            OutputStyle::info(&count.to_string())
        );
    }
}

pub fn print_warning(message: &str) {
    println!("⚠️  {}", OutputStyle::warning(message));
}

pub fn print_success(message: &str) {
    println!("✅ {}", OutputStyle::success(message));
}

/// Renders prompt lists in the formats `list` supports
pub struct DisplayFormatter;

impl DisplayFormatter {
    pub fn format_list(
        prompts: &[Prompt],
        categories: &[Category],
        format: &ListFormat,
        config: &Config,
    ) -> AppResult<String> {
        if prompts.is_empty() && !matches!(format, ListFormat::Json) {
            return Ok(OutputStyle::muted("No prompts match your criteria.").to_string());
        }

        let out = match format {
            ListFormat::Simple => prompts
                .iter()
                .map(|p| OutputStyle::format_prompt_line(p, categories, config))
                .collect::<Vec<_>>()
                .join("\n"),
            ListFormat::Table => Self::table(prompts),
            ListFormat::Json => serde_json::to_string_pretty(prompts)
                .map_err(|e| AppError::System(format!("Failed to serialize prompts to JSON: {}", e)))?,
        };
        Ok(out)
    }

    fn table(prompts: &[Prompt]) -> String {
        let title_width = prompts
            .iter()
            .map(|p| p.title.chars().count())
            .max()
            .unwrap_or(0)
            .clamp(15, 50);
        let category_width = prompts
            .iter()
            .map(|p| p.category_label().chars().count())
            .max()
            .unwrap_or(0)
            .clamp(8, 24);

        let mut lines = vec![
            format!(
                "┌─{}─┬─{}─┬─{}─┐",
                "─".repeat(title_width),
                "─".repeat(category_width),
                "─".repeat(19)
            ),
            format!(
                "│ {:<tw$} │ {:<cw$} │ {:^19} │",
                "Title",
                "Category",
                "Updated",
                tw = title_width,
                cw = category_width
            ),
            format!(
                "├─{}─┼─{}─┼─{}─┤",
                "─".repeat(title_width),
                "─".repeat(category_width),
                "─".repeat(19)
            ),
        ];

        for p in prompts {
            lines.push(format!(
                "│ {:<tw$} │ {:<cw$} │ {} │",
                truncate_string(&p.title, title_width),
                truncate_string(p.category_label(), category_width),
                format_datetime(&p.updated_at),
                tw = title_width,
                cw = category_width
            ));
        }

        lines.push(format!(
            "└─{}─┴─{}─┴─{}─┘",
            "─".repeat(title_width),
            "─".repeat(category_width),
            "─".repeat(19)
        ));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::fixtures::prompt;
    use crate::core::data::merge_categories;
    use chrono::Utc;

    #[test]
    fn test_table_has_row_per_prompt() {
        colored::control::set_override(false);
        let prompts = vec![
            prompt("p1", "First", "one", Utc::now()),
            prompt("p2", "Second", "two", Utc::now()),
        ];
        let table = DisplayFormatter::table(&prompts);
        assert_eq!(table.lines().count(), 4 + prompts.len());
        assert!(table.contains("First"));
        assert!(table.contains("Sin Categoría"));
    }

    #[test]
    fn test_prompt_line_shows_short_id_and_category() {
        colored::control::set_override(false);
        let mut p = prompt("0123456789abcdef", "Standup", "Summarise {{notes}}", Utc::now());
        p.favorite = true;
        p.tags = vec!["daily".into()];
        let line = OutputStyle::format_prompt_line(&p, &merge_categories(&[]), &Config::default());

        assert!(line.starts_with("01234567 ★ Standup [Sin Categoría] #daily"));
    }

    #[test]
    fn test_swatch_with_malformed_color_is_plain() {
        colored::control::set_override(false);
        assert_eq!(OutputStyle::swatch("[Research]", "#aéaaa").to_string(), "[Research]");
        assert_eq!(OutputStyle::swatch("[Research]", "teal").to_string(), "[Research]");
    }

    #[test]
    fn test_empty_json_list_is_array() {
        let out =
            DisplayFormatter::format_list(&[], &[], &ListFormat::Json, &Config::default()).unwrap();
        assert_eq!(out, "[]");
    }
}
