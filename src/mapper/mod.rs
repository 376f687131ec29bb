//! Rule-based prompt mapper
//!
//! Turns a free-form prompt into a complete [`IstvonRecord`] using the
//! keyword tables in [`rules`]. Mapping is pure and deterministic: it never
//! fails and falls back to defaults when a field has no signal in the text.

pub mod rules;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::record::{IstvonRecord, Notification, Outcome, SourceDescriptor, ToolDescriptor, Variables};
use rules::{mentions_any, SourceRule};

static POLITENESS: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = rules::POLITENESS_PREFIXES.iter().map(|p| regex::escape(p)).collect();
    Regex::new(&format!(r"(?i)^(?:{})\s*", alternatives.join("|"))).expect("politeness pattern")
});

static TOPIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)about\s+([^,.\n!?]+)").expect("topic pattern"));

static AUDIENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)for\s+([^,.\n!?]+)").expect("audience pattern"));

/// An audience clause trailing inside a captured topic
static AUDIENCE_CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+for\s+").expect("audience clause pattern"));

static LENGTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(words?|pages?|paragraphs?)").expect("length pattern"));

/// Converts natural-language prompts into ISTVON records
#[derive(Debug, Default, Clone, Copy)]
pub struct IstvonMapper;

impl IstvonMapper {
    pub fn new() -> Self {
        Self
    }

    /// Map a prompt to a complete record
    pub fn convert(&self, prompt: &str) -> IstvonRecord {
        map_prompt(prompt)
    }
}

/// Map a prompt to a complete record
pub fn map_prompt(prompt: &str) -> IstvonRecord {
    let lower = prompt.to_lowercase();

    let record = IstvonRecord {
        instructions: extract_instructions(prompt),
        source_data: extract_source_data(&lower),
        tools: extract_tools(&lower),
        variables: extract_variables(prompt),
        outcome: extract_outcome(&lower),
        notification: extract_notification(&lower),
    };

    tracing::debug!(
        tools = ?record.tool_names(),
        format = %record.outcome.format,
        topic = ?record.variables.topic(),
        "mapped prompt"
    );
    record
}

/// Strip one politeness prefix and capitalize the remainder
pub fn extract_instructions(prompt: &str) -> String {
    let cleaned = POLITENESS.replace(prompt, "");
    if cleaned.is_empty() {
        return prompt.to_string();
    }
    capitalize_first(&cleaned)
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Pick the single most likely data source
pub fn extract_source_data(lower: &str) -> Vec<SourceDescriptor> {
    let rule: &SourceRule = rules::SOURCE_RULES
        .iter()
        .find(|rule| mentions_any(lower, rule.words))
        .unwrap_or(&rules::DEFAULT_SOURCE);

    vec![SourceDescriptor::new(rule.kind, rule.source).with_description(rule.description)]
}

/// Distinct tool categories in table order, or the default tool
pub fn extract_tools(lower: &str) -> Vec<ToolDescriptor> {
    let mut categories: Vec<&str> = Vec::new();
    for &(keyword, category) in rules::TOOL_KEYWORDS {
        if lower.contains(keyword) && !categories.contains(&category) {
            categories.push(category);
        }
    }

    if categories.is_empty() {
        categories.push(rules::DEFAULT_TOOL);
    }

    categories.into_iter().map(ToolDescriptor::new).collect()
}

/// Topic, tone, length, audience plus fixed priority and language
pub fn extract_variables(prompt: &str) -> Variables {
    let lower = prompt.to_lowercase();
    let mut variables = Variables::default();

    if let Some(topic) = extract_topic(prompt) {
        variables.set(Variables::TOPIC, topic);
    }

    let tone = rules::TONES
        .iter()
        .find(|tone| lower.contains(*tone))
        .copied()
        .unwrap_or(rules::DEFAULT_TONE);
    variables.set(Variables::TONE, tone);

    if let Some(caps) = LENGTH.captures(&lower) {
        variables.set(Variables::LENGTH, format!("{} {}", &caps[1], &caps[2]));
    }

    if let Some(caps) = AUDIENCE.captures(prompt) {
        variables.set(Variables::TARGET_AUDIENCE, caps[1].trim());
    }

    variables.set(Variables::PRIORITY, rules::DEFAULT_PRIORITY);
    variables.set(Variables::LANGUAGE, rules::DEFAULT_LANGUAGE);

    variables
}

/// Text after "about" up to the clause boundary, without a trailing
/// "for <audience>" clause. Falls back to words 2-4 of longer prompts.
fn extract_topic(prompt: &str) -> Option<String> {
    if let Some(caps) = TOPIC.captures(prompt) {
        let captured = &caps[1];
        let topic = match AUDIENCE_CLAUSE.find(captured) {
            Some(m) if !captured[..m.start()].trim().is_empty() => captured[..m.start()].trim(),
            _ => captured.trim(),
        };
        return Some(topic.to_string());
    }

    let words: Vec<&str> = prompt.split_whitespace().collect();
    if words.len() > 3 {
        Some(words[1..4].join(" "))
    } else {
        None
    }
}

/// Output format from content type, delivery from save keywords
pub fn extract_outcome(lower: &str) -> Outcome {
    let format = rules::OUTPUT_FORMATS
        .iter()
        .find(|(content_type, _)| lower.contains(content_type))
        .map(|(_, format)| *format)
        .unwrap_or(rules::DEFAULT_FORMAT);

    let delivery = if mentions_any(lower, rules::SAVE_WORDS) {
        rules::SAVE_DELIVERY
    } else {
        rules::DEFAULT_DELIVERY
    };

    Outcome::new(format, delivery)
}

/// Notification method from keywords; trigger is always on completion
pub fn extract_notification(lower: &str) -> Notification {
    let method = rules::NOTIFICATION_RULES
        .iter()
        .find(|(words, _)| mentions_any(lower, words))
        .map(|(_, method)| *method)
        .unwrap_or(rules::DEFAULT_METHOD);

    Notification::new(method)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_politeness_prefixes_stripped() {
        assert_eq!(extract_instructions("Please write a short poem"), "Write a short poem");
        assert_eq!(extract_instructions("can you summarize this"), "Summarize this");
        assert_eq!(extract_instructions("Could You translate it"), "Translate it");
        assert_eq!(extract_instructions("I want you to draft a memo"), "Draft a memo");
        assert_eq!(extract_instructions("i need you to fix this"), "Fix this");
    }

    #[test]
    fn test_only_one_prefix_stripped() {
        assert_eq!(extract_instructions("please please help"), "Please help");
    }

    #[test]
    fn test_prefix_must_lead() {
        assert_eq!(extract_instructions("write it please"), "Write it please");
    }

    #[test]
    fn test_instructions_fall_back_when_empty() {
        assert_eq!(extract_instructions("please"), "please");
        assert_eq!(extract_instructions("Please   "), "Please   ");
        assert_eq!(extract_instructions(""), "");
    }

    #[test]
    fn test_source_priority() {
        let sources = extract_source_data("use the internal research data");
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source, "research_data");
        assert_eq!(sources[0].kind, "knowledge_base");

        let sources = extract_source_data("follow company style");
        assert_eq!(sources[0].source, "company_guidelines");

        let sources = extract_source_data("tell me a joke");
        assert_eq!(sources[0].kind, "none");
        assert_eq!(sources[0].source, "general_knowledge");
        assert_eq!(sources[0].description.as_deref(), Some("General knowledge base"));
    }

    #[test]
    fn test_tools_distinct_in_table_order() {
        let tools = extract_tools("write, create and generate code then analyze and write again");
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["text_generation", "data_analysis", "code_generation"]);
    }

    #[test]
    fn test_tools_order_independent_of_prompt_order() {
        let a = extract_tools("summarize then search");
        let b = extract_tools("search then summarize");
        assert_eq!(a, b);
        assert_eq!(a[0].name, "web_search");
    }

    #[test]
    fn test_default_tool() {
        let tools = extract_tools("hello there");
        assert_eq!(tools, vec![ToolDescriptor::new("text_generation")]);
    }

    #[test]
    fn test_topic_from_about() {
        let vars = extract_variables("Tell me about Rust ownership, briefly");
        assert_eq!(vars.topic(), Some("Rust ownership"));
    }

    #[test]
    fn test_topic_stops_before_audience() {
        let vars = extract_variables("Write a blog post about quantum computing for beginners");
        assert_eq!(vars.topic(), Some("quantum computing"));
        assert_eq!(vars.target_audience(), Some("beginners"));
    }

    #[test]
    fn test_topic_fallback_words() {
        let vars = extract_variables("Draft the quarterly sales summary");
        assert_eq!(vars.topic(), Some("the quarterly sales"));

        let vars = extract_variables("three word prompt");
        assert!(vars.topic().is_none());
    }

    #[test]
    fn test_tone_first_match() {
        let vars = extract_variables("Make it casual but technical");
        assert_eq!(vars.tone(), Some("casual"));
        let vars = extract_variables("Make it FRIENDLY");
        assert_eq!(vars.tone(), Some("friendly"));
        let vars = extract_variables("no hint");
        assert_eq!(vars.tone(), Some("professional"));
    }

    #[test]
    fn test_length_patterns() {
        assert_eq!(extract_variables("in 500 Words").length(), Some("500 words"));
        assert_eq!(extract_variables("about 3 pages long").length(), Some("3 pages"));
        assert_eq!(extract_variables("2paragraphs").length(), Some("2 paragraphs"));
        assert_eq!(extract_variables("1 page").length(), Some("1 page"));
        assert!(extract_variables("many words").length().is_none());
    }

    #[test]
    fn test_audience_preserves_case() {
        let vars = extract_variables("Explain it for Senior Engineers. Thanks");
        assert_eq!(vars.target_audience(), Some("Senior Engineers"));
    }

    #[test]
    fn test_fixed_priority_and_language() {
        let vars = extract_variables("urgent: write in French");
        assert_eq!(vars.priority(), Some("medium"));
        assert_eq!(vars.language(), Some("en"));
    }

    #[test]
    fn test_variable_order() {
        let vars = extract_variables("Write 200 words about cats for kids");
        let keys: Vec<&str> = vars.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["topic", "tone", "length", "target_audience", "priority", "language"]);
    }

    #[test]
    fn test_format_first_match() {
        assert_eq!(extract_outcome("a blog post").format, "markdown");
        assert_eq!(extract_outcome("an email with a report").format, "pdf");
        assert_eq!(extract_outcome("a presentation").format, "html");
        assert_eq!(extract_outcome("a document").format, "docx");
        assert_eq!(extract_outcome("a summary").format, "plain_text");
        assert_eq!(extract_outcome("a poem").format, "plain_text");
    }

    #[test]
    fn test_delivery() {
        assert_eq!(extract_outcome("export it").delivery, "save_to_file");
        assert_eq!(extract_outcome("show it").delivery, "display");
    }

    #[test]
    fn test_notification_method() {
        assert_eq!(extract_notification("notify me and alert").method, "email");
        assert_eq!(extract_notification("ping me").method, "in_app");
        let none = extract_notification("quietly");
        assert_eq!(none.method, "none");
        assert_eq!(none.trigger, "on_completion");
    }

    #[test]
    fn test_mapper_struct_matches_function() {
        let prompt = "Analyze and summarize this data";
        assert_eq!(IstvonMapper::new().convert(prompt), map_prompt(prompt));
    }
}
