use crate::utils::error::{AppError, AppResult};
use crate::utils::interactive::prompt_input;
use regex::Regex;
use std::collections::HashMap;

const PLACEHOLDER_PATTERN: &str = r"\{\{(.*?)\}\}";

fn placeholder_regex() -> AppResult<Regex> {
    Regex::new(PLACEHOLDER_PATTERN)
        .map_err(|e| AppError::System(format!("Invalid placeholder pattern: {}", e)))
}

/// Parse `{{name}}` placeholders from prompt content, unique and in first-seen order
pub fn parse_prompt_variables(content: &str) -> AppResult<Vec<String>> {
    let re = placeholder_regex()?;
    let mut variables: Vec<String> = Vec::new();

    for cap in re.captures_iter(content) {
        if let Some(name) = cap.get(1).map(|m| m.as_str())
            && !variables.iter().any(|v| v == name)
        {
            variables.push(name.to_string());
        }
    }

    Ok(variables)
}

/// Replace placeholders with provided values; unknown names are left as written
pub fn render_prompt_variables(
    content: &str,
    variables: &HashMap<String, String>,
) -> AppResult<String> {
    let re = placeholder_regex()?;

    Ok(re
        .replace_all(content, |caps: &regex::Captures| {
            let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            caps.get(1)
                .and_then(|name| variables.get(name.as_str()))
                .cloned()
                .unwrap_or_else(|| whole.to_string())
        })
        .to_string())
}

/// Prompt user for variable values interactively
pub fn prompt_for_variables(variables: &[String]) -> AppResult<HashMap<String, String>> {
    let mut result = HashMap::new();

    for name in variables {
        let input = prompt_input(&format!("{}: ", name))?;
        result.insert(name.clone(), input);
    }

    Ok(result)
}

/// Parse `name=value` pairs given on the command line
pub fn parse_assignments(pairs: &[String]) -> AppResult<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| AppError::System(format!("Expected name=value, got '{}'", pair)))
        })
        .collect()
}
