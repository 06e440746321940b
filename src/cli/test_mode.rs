//! Scripted input for exercising the interactive wizard without a terminal.
//!
//! Two queues, each fed either from an environment variable at first use or
//! installed directly by in-process tests. Prompt answers come from
//! `INTAKE_TEST_PROMPTS` as `|`-separated tokens, consumed one per prompt in
//! order. Range widget sessions come from `INTAKE_TEST_RANGE_EVENTS` as
//! `|`-separated sequences of comma-separated keys (LEFT, RIGHT, TAB, ENTER,
//! ESC), one sequence per widget.

use std::{collections::VecDeque, env, sync::Mutex};

use once_cell::sync::Lazy;

pub const PROMPTS_VAR: &str = "INTAKE_TEST_PROMPTS";
pub const RANGE_EVENTS_VAR: &str = "INTAKE_TEST_RANGE_EVENTS";

/// One scripted answer to a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAnswer {
    /// Plain value: the typed text, the selected label, or for multi-selects
    /// a comma-separated label list.
    Value(String),
    /// Keep the current value untouched.
    Keep,
    /// Dismiss the prompt, as Esc would.
    Cancel,
}

/// One key in a scripted range widget session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKey {
    Left,
    Right,
    Tab,
    Enter,
    Esc,
}

struct PromptQueue {
    enabled: bool,
    answers: VecDeque<PromptAnswer>,
}

impl PromptQueue {
    fn from_env() -> Self {
        match env::var(PROMPTS_VAR) {
            Ok(raw) => Self {
                enabled: true,
                answers: parse_prompt_answers(&raw),
            },
            Err(_) => Self {
                enabled: false,
                answers: VecDeque::new(),
            },
        }
    }
}

struct RangeQueue {
    enabled: bool,
    sequences: VecDeque<Vec<RangeKey>>,
}

impl RangeQueue {
    fn from_env() -> Self {
        match env::var(RANGE_EVENTS_VAR) {
            Ok(raw) => Self {
                enabled: true,
                sequences: parse_range_sequences(&raw),
            },
            Err(_) => Self {
                enabled: false,
                sequences: VecDeque::new(),
            },
        }
    }
}

static PROMPT_ANSWERS: Lazy<Mutex<PromptQueue>> =
    Lazy::new(|| Mutex::new(PromptQueue::from_env()));

static RANGE_EVENTS: Lazy<Mutex<RangeQueue>> = Lazy::new(|| Mutex::new(RangeQueue::from_env()));

pub fn is_enabled() -> bool {
    PROMPT_ANSWERS
        .lock()
        .expect("prompt answer queue poisoned")
        .enabled
        || RANGE_EVENTS.lock().expect("range event queue poisoned").enabled
}

/// Next scripted prompt answer, `None` when running unscripted.
pub fn next_prompt_answer(label: &str) -> Option<PromptAnswer> {
    let mut guard = PROMPT_ANSWERS.lock().expect("prompt answer queue poisoned");
    if !guard.enabled {
        return None;
    }
    Some(
        guard
            .answers
            .pop_front()
            .unwrap_or_else(|| panic!("Prompt answers exhausted before `{label}`")),
    )
}

/// Next scripted range session, `None` when running unscripted.
pub fn next_range_events(label: &str) -> Option<Vec<RangeKey>> {
    let mut guard = RANGE_EVENTS.lock().expect("range event queue poisoned");
    if !guard.enabled {
        return None;
    }
    Some(
        guard
            .sequences
            .pop_front()
            .unwrap_or_else(|| panic!("Range events exhausted before `{label}` rendered")),
    )
}

fn parse_prompt_answer(token: &str) -> PromptAnswer {
    match token.to_ascii_uppercase().as_str() {
        "<KEEP>" | "KEEP" => PromptAnswer::Keep,
        "<CANCEL>" | "<ESC>" => PromptAnswer::Cancel,
        "<BLANK>" | "<EMPTY>" => PromptAnswer::Value(String::new()),
        _ => PromptAnswer::Value(token.to_string()),
    }
}

fn parse_prompt_answers(raw: &str) -> VecDeque<PromptAnswer> {
    raw.split('|')
        .filter_map(|segment| {
            let trimmed = segment.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(parse_prompt_answer(trimmed))
            }
        })
        .collect()
}

fn parse_range_key(token: &str) -> Option<RangeKey> {
    match token.to_ascii_uppercase().as_str() {
        "LEFT" => Some(RangeKey::Left),
        "RIGHT" => Some(RangeKey::Right),
        "TAB" => Some(RangeKey::Tab),
        "ENTER" | "RETURN" => Some(RangeKey::Enter),
        "ESC" | "ESCAPE" => Some(RangeKey::Esc),
        _ => None,
    }
}

fn parse_range_sequences(raw: &str) -> VecDeque<Vec<RangeKey>> {
    raw.split('|')
        .filter_map(|segment| {
            let trimmed = segment.trim();
            if trimmed.is_empty() {
                return None;
            }
            let keys = trimmed
                .split(',')
                .filter_map(|token| parse_range_key(token.trim()))
                .collect::<Vec<_>>();
            if keys.is_empty() {
                None
            } else {
                Some(keys)
            }
        })
        .collect()
}

pub fn install_prompt_answers(answers: Vec<PromptAnswer>) {
    let mut guard = PROMPT_ANSWERS.lock().expect("prompt answer queue poisoned");
    guard.enabled = true;
    guard.answers = answers.into();
}

pub fn reset_prompt_answers() {
    let mut guard = PROMPT_ANSWERS.lock().expect("prompt answer queue poisoned");
    guard.enabled = false;
    guard.answers.clear();
}

pub fn install_range_events(sequences: Vec<Vec<RangeKey>>) {
    let mut guard = RANGE_EVENTS.lock().expect("range event queue poisoned");
    guard.enabled = true;
    guard.sequences = sequences.into();
}

pub fn reset_range_events() {
    let mut guard = RANGE_EVENTS.lock().expect("range event queue poisoned");
    guard.enabled = false;
    guard.sequences.clear();
}
