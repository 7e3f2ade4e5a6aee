// AI assistance commands

use super::{ai_failure, announce, build_assistant, open_vault, resolve_prompt};
use crate::cli::AiCommands;
use crate::config::Config;
use crate::core::assist::QualityAudit;
use crate::utils::error::{AppError, AppResult};
use crate::utils::format::format_tags_comma;
use crate::utils::output::OutputStyle;

pub async fn handle_ai_command(config: &Config, command: AiCommands) -> AppResult<()> {
    let assistant = build_assistant(config)?;
    let mut controller = open_vault(config).await?;

    match command {
        AiCommands::Improve { identifier, apply } => {
            let prompt = resolve_prompt(&controller, &identifier)?;
            if prompt.content.trim().is_empty() {
                return Err(AppError::System("Prompt has no content to improve".to_string()));
            }

            let mut draft = prompt.to_draft();
            if !controller.improve_draft(&assistant, &mut draft).await {
                return Err(ai_failure(&controller));
            }

            let improved = draft.content.clone().unwrap_or_default();
            OutputStyle::print_rendered_content(&improved);
            if apply {
                controller.save(draft).await?;
                announce(&controller);
            }
        }
        AiCommands::Analyze { identifier, save } => {
            let prompt = resolve_prompt(&controller, &identifier)?;
            let mut draft = prompt.to_draft();
            if !controller.analyze_draft(&assistant, &mut draft).await {
                return Err(ai_failure(&controller));
            }

            OutputStyle::print_quality_audit(&QualityAudit {
                score: draft.quality_score.unwrap_or_default(),
                feedback: draft.quality_feedback.clone().unwrap_or_default(),
                tone: draft.tone.clone().unwrap_or_default(),
            });
            if save {
                controller.save(draft).await?;
                announce(&controller);
            }
        }
        AiCommands::Tag { identifier, save } => {
            let prompt = resolve_prompt(&controller, &identifier)?;
            let mut draft = prompt.to_draft();
            if !controller.tag_draft(&assistant, &mut draft).await {
                return Err(ai_failure(&controller));
            }

            OutputStyle::print_field_colored(
                "Category",
                draft.category.as_deref().unwrap_or_default(),
                OutputStyle::description,
            );
            OutputStyle::print_field_colored(
                "Tags",
                &format_tags_comma(draft.tags.as_deref().unwrap_or_default()),
                OutputStyle::tags,
            );
            if save {
                controller.save(draft).await?;
                announce(&controller);
            }
        }
        AiCommands::Idea { idea } => {
            let idea = idea.join(" ");
            if idea.trim().is_empty() {
                return Err(AppError::System("Describe the idea to turn into a prompt".to_string()));
            }

            let prompt = controller.create_from_idea(&assistant, &idea).await?;
            announce(&controller);
            OutputStyle::print_prompt_detailed(&prompt, &controller.all_categories());
        }
    }
    Ok(())
}
