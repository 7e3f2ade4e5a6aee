// Query operations - List, Exec, Export

use super::{announce, open_vault, resolve_prompt};
use crate::cli::{ExecArgs, ExportArgs, ListArgs, ListFormat};
use crate::config::Config;
use crate::utils::command::{
    parse_assignments, parse_prompt_variables, prompt_for_variables, render_prompt_variables,
};
use crate::utils::error::{AppResult, FlowResult, handle_flow};
use crate::utils::export::save_payload;
use crate::utils::interactive::copy_to_clipboard;
use crate::utils::output::{DisplayFormatter, OutputStyle, print_prompt_count, print_success};
use crate::utils::pagination;

pub async fn handle_list_command(config: &Config, args: &ListArgs) -> AppResult<()> {
    let mut controller = open_vault(config).await?;
    controller.set_query(args.filter.to_query(config.general.sort_by));

    let prompts = controller.visible();
    let format = args.format.as_ref().unwrap_or(&ListFormat::Simple);

    if !matches!(format, ListFormat::Json) {
        if prompts.is_empty() {
            handle_flow(FlowResult::EmptyList {
                item_type: "prompts matching your criteria".to_string(),
            });
            return Ok(());
        }
        print_prompt_count(prompts.len());
    }

    let rendered =
        DisplayFormatter::format_list(&prompts, &controller.all_categories(), format, config)?;
    pagination::print_long(&rendered)
}

pub async fn handle_exec_command(config: &Config, args: &ExecArgs) -> AppResult<()> {
    let controller = open_vault(config).await?;
    let prompt = resolve_prompt(&controller, &args.identifier)?;

    let variables = parse_prompt_variables(&prompt.content)?;
    let mut values = parse_assignments(&args.vars)?;

    let rendered = if variables.is_empty() {
        prompt.content.clone()
    } else {
        let missing: Vec<String> = variables
            .iter()
            .filter(|v| !values.contains_key(*v))
            .cloned()
            .collect();
        if !missing.is_empty() {
            OutputStyle::print_variables_list(&missing);
            values.extend(prompt_for_variables(&missing)?);
        }
        render_prompt_variables(&prompt.content, &values)?
    };

    if args.copy {
        copy_to_clipboard(&rendered)?;
        print_success("Prompt copied to clipboard!");
    } else {
        OutputStyle::print_rendered_content(&rendered);
    }
    Ok(())
}

pub async fn handle_export_command(config: &Config, args: &ExportArgs) -> AppResult<()> {
    let mut controller = open_vault(config).await?;
    controller.set_query(args.filter.to_query(config.general.sort_by));

    let payload = controller.export(args.format)?;
    let dir = args.output.as_deref().unwrap_or(config.general.export_dir.as_path());
    let path = save_payload(&payload, dir)?;

    announce(&controller);
    println!(
        "   {} {} ({})",
        OutputStyle::label("File:"),
        path.display(),
        OutputStyle::muted(payload.mime_type)
    );
    Ok(())
}
