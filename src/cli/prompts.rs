//! Prompt helpers over dialoguer, each with a scripted fallback so the whole
//! wizard can run headless. `Ok(None)` means the prompt was dismissed.

use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};

use crate::cli::test_mode::{self, PromptAnswer};
use crate::cli::CliError;

fn theme() -> ColorfulTheme {
    ColorfulTheme::default()
}

pub fn text_input(label: &str, default: Option<&str>) -> Result<Option<String>, CliError> {
    if let Some(answer) = test_mode::next_prompt_answer(label) {
        return Ok(match answer {
            PromptAnswer::Value(value) => Some(value),
            PromptAnswer::Keep => Some(default.unwrap_or("").to_string()),
            PromptAnswer::Cancel => None,
        });
    }

    let theme = theme();
    let mut input = Input::<String>::with_theme(&theme)
        .with_prompt(label)
        .allow_empty(true);
    if let Some(default) = default {
        if !default.is_empty() {
            input = input.default(default.to_string());
        }
    }
    Ok(Some(input.interact_text()?))
}

pub fn select_one(
    label: &str,
    options: &[String],
    default: Option<usize>,
) -> Result<Option<usize>, CliError> {
    if let Some(answer) = test_mode::next_prompt_answer(label) {
        return Ok(match answer {
            PromptAnswer::Value(value) => Some(option_index(label, options, &value)),
            PromptAnswer::Keep => Some(default.unwrap_or(0)),
            PromptAnswer::Cancel => None,
        });
    }

    let selection = Select::with_theme(&theme())
        .with_prompt(label)
        .items(options)
        .default(default.unwrap_or(0))
        .interact_opt()?;
    Ok(selection)
}

pub fn select_many(
    label: &str,
    options: &[String],
    checked: &[bool],
) -> Result<Option<Vec<usize>>, CliError> {
    if let Some(answer) = test_mode::next_prompt_answer(label) {
        return Ok(match answer {
            PromptAnswer::Value(value) => {
                let picks = value
                    .split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(|token| option_index(label, options, token))
                    .collect();
                Some(picks)
            }
            PromptAnswer::Keep => Some(
                checked
                    .iter()
                    .enumerate()
                    .filter_map(|(index, on)| on.then_some(index))
                    .collect(),
            ),
            PromptAnswer::Cancel => None,
        });
    }

    let selection = MultiSelect::with_theme(&theme())
        .with_prompt(label)
        .items(options)
        .defaults(checked)
        .interact_opt()?;
    Ok(selection)
}

pub fn confirm(label: &str, default: bool) -> Result<Option<bool>, CliError> {
    if let Some(answer) = test_mode::next_prompt_answer(label) {
        return Ok(match answer {
            PromptAnswer::Value(value) => Some(parse_confirmation(label, &value)),
            PromptAnswer::Keep => Some(default),
            PromptAnswer::Cancel => None,
        });
    }

    let choice = Confirm::with_theme(&theme())
        .with_prompt(label)
        .default(default)
        .interact_opt()?;
    Ok(choice)
}

fn option_index(label: &str, options: &[String], token: &str) -> usize {
    if let Some(index) = options
        .iter()
        .position(|option| option.eq_ignore_ascii_case(token))
    {
        return index;
    }
    if let Ok(index) = token.parse::<usize>() {
        if index < options.len() {
            return index;
        }
    }
    panic!("No option matching `{token}` for `{label}`");
}

fn parse_confirmation(label: &str, token: &str) -> bool {
    match token.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" => true,
        "n" | "no" | "false" => false,
        other => panic!("Cannot read `{other}` as a yes/no answer for `{label}`"),
    }
}
