// Prompt create, read, update and delete commands

use anyhow::Result;

use super::{announce, build_assistant, open_vault, resolve_prompt};
use crate::cli::{DeleteArgs, EditArgs, NewArgs, RevertArgs, ShowArgs, TargetArgs};
use crate::config::Config;
use crate::core::data::{PromptDraft, UNCATEGORIZED};
use crate::utils::error::{AppError, FlowResult, handle_flow};
use crate::utils::output::{OutputStyle, print_warning};
use crate::utils::{interactive, pagination};

pub async fn handle_new_command(config: &Config, args: &NewArgs) -> Result<()> {
    let mut controller = open_vault(config).await?;

    let title = match &args.title {
        Some(title) => title.clone(),
        None => interactive::prompt_input(&format!("{}: ", OutputStyle::label("Title")))?,
    };

    let content = if let Some(content) = &args.content {
        content.clone()
    } else if args.editor {
        interactive::edit_in_editor("", &config.general.editor)?
    } else {
        interactive::prompt_multiline(&format!(
            "{} {}",
            OutputStyle::label("Prompt content"),
            OutputStyle::muted("(Enter to finish, Ctrl+J for a new line)")
        ))?
    };

    let category = match &args.category {
        Some(category) => Some(category.clone()),
        None if args.auto_tag => None,
        None => {
            let names: Vec<String> = controller.all_categories().into_iter().map(|c| c.name).collect();
            println!("{}", OutputStyle::muted(&format!("Categories: {}", names.join(", "))));
            Some(interactive::prompt_with_default("Category", UNCATEGORIZED)?)
        }
    };

    let mut draft = PromptDraft {
        description: args.description.clone(),
        category,
        tags: (!args.tags.is_empty()).then(|| args.tags.clone()),
        favorite: Some(args.favorite),
        ..PromptDraft::new(title, content)
    };

    if args.auto_tag {
        let assistant = build_assistant(config)?;
        if !controller.tag_draft(&assistant, &mut draft).await {
            announce(&controller);
            print_warning("Saving without AI suggestions");
        }
    }

    let prompt = controller.save(draft).await?;
    announce(&controller);
    println!("   {} {}", OutputStyle::label("ID:"), OutputStyle::muted(&prompt.id));
    Ok(())
}

pub async fn handle_show_command(config: &Config, args: &ShowArgs) -> Result<()> {
    let controller = open_vault(config).await?;
    let prompt = resolve_prompt(&controller, &args.identifier)?;

    OutputStyle::print_prompt_detailed(&prompt, &controller.all_categories());

    if args.history {
        println!();
        let versions = controller.versions(&prompt.id).await;
        OutputStyle::print_versions(&prompt, &versions);
    }
    Ok(())
}

pub async fn handle_edit_command(config: &Config, args: &EditArgs) -> Result<()> {
    let mut controller = open_vault(config).await?;
    let prompt = resolve_prompt(&controller, &args.identifier)?;
    let mut draft = prompt.to_draft();

    let has_field_args = args.title.is_some()
        || args.description.is_some()
        || args.tags.is_some()
        || args.category.is_some()
        || args.content.is_some();

    if has_field_args {
        if let Some(title) = &args.title {
            draft.title = Some(title.clone());
        }
        if let Some(description) = &args.description {
            draft.description = Some(description.clone());
        }
        if let Some(tags) = &args.tags {
            draft.tags = Some(tags.clone());
        }
        if let Some(category) = &args.category {
            draft.category = Some(category.clone());
        }
        if let Some(content) = &args.content {
            draft.content = Some(content.clone());
        }
    } else if !args.editor {
        draft.title = Some(interactive::prompt_with_default("Title", &prompt.title)?);
        draft.category = Some(interactive::prompt_with_default("Category", prompt.category_label())?);
        let tags = interactive::prompt_with_default("Tags", &prompt.tags.join(","))?;
        draft.tags = Some(
            tags.split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        );
    }

    if args.editor || !has_field_args {
        draft.content = Some(interactive::edit_in_editor(&prompt.content, &config.general.editor)?);
    }

    if draft == prompt.to_draft() {
        handle_flow(FlowResult::Cancelled("No changes made".to_string()));
        return Ok(());
    }

    controller.save(draft).await?;
    announce(&controller);
    Ok(())
}

pub async fn handle_delete_command(config: &Config, args: &DeleteArgs) -> Result<()> {
    let mut controller = open_vault(config).await?;
    let prompt = resolve_prompt(&controller, &args.identifier)?;

    println!("Prompt to delete: {}", OutputStyle::description(&prompt.to_string()));

    if !args.force
        && !interactive::prompt_yes_no("Are you sure you want to delete this prompt?")?
    {
        handle_flow(FlowResult::Cancelled("Prompt not deleted".to_string()));
        return Ok(());
    }

    controller.delete(&prompt.id).await?;
    announce(&controller);
    Ok(())
}

pub async fn handle_fav_command(config: &Config, args: &TargetArgs) -> Result<()> {
    let mut controller = open_vault(config).await?;
    let prompt = resolve_prompt(&controller, &args.identifier)?;

    controller.toggle_favorite(&prompt.id).await?;
    announce(&controller);
    Ok(())
}

pub async fn handle_history_command(config: &Config, args: &TargetArgs) -> Result<()> {
    let controller = open_vault(config).await?;
    let prompt = resolve_prompt(&controller, &args.identifier)?;

    let versions = controller.gateway().try_list_versions(&prompt.id).await?;
    OutputStyle::print_versions(&prompt, &versions);
    Ok(())
}

pub async fn handle_revert_command(config: &Config, args: &RevertArgs) -> Result<()> {
    let mut controller = open_vault(config).await?;
    let prompt = resolve_prompt(&controller, &args.identifier)?;
    let versions = controller.gateway().try_list_versions(&prompt.id).await?;

    let version = args
        .version
        .checked_sub(1)
        .and_then(|i| versions.get(i))
        .ok_or_else(|| AppError::NotFound(format!("Version {} of '{}'", args.version, prompt.title)))?;

    println!("{}", OutputStyle::header(&format!("Version {}: {}", args.version, version.title)));
    pagination::print_long(&version.content)?;

    if !args.force && !interactive::prompt_yes_no("Restore this version?")? {
        handle_flow(FlowResult::Cancelled("Prompt not reverted".to_string()));
        return Ok(());
    }

    let mut draft = prompt.to_draft();
    draft.revert_to(version);
    controller.save(draft).await?;
    announce(&controller);
    Ok(())
}
