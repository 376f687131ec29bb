//! Keyword tables for prompt extraction
//!
//! Every table is an ordered slice. Where several entries can match the
//! same prompt, the earlier entry wins, so the order here is part of the
//! mapper's observable behavior.

/// Leading phrases stripped from instructions (case-insensitive)
pub const POLITENESS_PREFIXES: &[&str] = &[
    "please",
    "can you",
    "could you",
    "i want you to",
    "i need you to",
];

/// Keyword -> tool category
pub const TOOL_KEYWORDS: &[(&str, &str)] = &[
    ("write", "text_generation"),
    ("create", "text_generation"),
    ("generate", "text_generation"),
    ("analyze", "data_analysis"),
    ("search", "web_search"),
    ("summarize", "summarization"),
    ("translate", "translation"),
    ("code", "code_generation"),
];

/// Content type -> output format. `blog post` precedes `blog`.
pub const OUTPUT_FORMATS: &[(&str, &str)] = &[
    ("blog post", "markdown"),
    ("blog", "markdown"),
    ("report", "pdf"),
    ("email", "plain_text"),
    ("presentation", "html"),
    ("document", "docx"),
    ("analysis", "pdf"),
    ("summary", "plain_text"),
];

/// Tone keywords, each mapping to itself
pub const TONES: &[&str] = &["professional", "casual", "formal", "friendly", "technical"];

/// A candidate data source: trigger words plus the descriptor it yields
pub struct SourceRule {
    pub words: &'static [&'static str],
    pub kind: &'static str,
    pub source: &'static str,
    pub description: &'static str,
}

/// Source rules, first match wins
pub const SOURCE_RULES: &[SourceRule] = &[
    SourceRule {
        words: &["research", "data", "file", "document"],
        kind: "knowledge_base",
        source: "research_data",
        description: "Referenced research or data sources",
    },
    SourceRule {
        words: &["company", "organization", "internal"],
        kind: "knowledge_base",
        source: "company_guidelines",
        description: "Company or organizational information",
    },
];

/// Used when no source rule matches
pub const DEFAULT_SOURCE: SourceRule = SourceRule {
    words: &[],
    kind: "none",
    source: "general_knowledge",
    description: "General knowledge base",
};

/// Words that switch delivery to `save_to_file`
pub const SAVE_WORDS: &[&str] = &["save", "export", "download", "file"];

/// Notification method rules, first match wins
pub const NOTIFICATION_RULES: &[(&[&str], &str)] = &[
    (&["email", "notify"], "email"),
    (&["alert", "ping"], "in_app"),
];

pub const DEFAULT_TOOL: &str = "text_generation";
pub const DEFAULT_TONE: &str = "professional";
pub const DEFAULT_PRIORITY: &str = "medium";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_FORMAT: &str = "plain_text";
pub const DEFAULT_DELIVERY: &str = "display";
pub const SAVE_DELIVERY: &str = "save_to_file";
pub const DEFAULT_METHOD: &str = "none";

/// True when any of `words` occurs in `text`
pub fn mentions_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_table_order() {
        let categories: Vec<&str> = TOOL_KEYWORDS.iter().map(|(_, c)| *c).collect();
        assert_eq!(
            categories,
            [
                "text_generation",
                "text_generation",
                "text_generation",
                "data_analysis",
                "web_search",
                "summarization",
                "translation",
                "code_generation",
            ]
        );
    }

    #[test]
    fn test_format_table_order() {
        let keys: Vec<&str> = OUTPUT_FORMATS.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            ["blog post", "blog", "report", "email", "presentation", "document", "analysis", "summary"]
        );
    }

    #[test]
    fn test_tone_table_order() {
        assert_eq!(TONES, ["professional", "casual", "formal", "friendly", "technical"]);
    }

    #[test]
    fn test_notification_rule_order() {
        assert_eq!(NOTIFICATION_RULES[0].1, "email");
        assert_eq!(NOTIFICATION_RULES[1].1, "in_app");
    }

    #[test]
    fn test_mentions_any() {
        assert!(mentions_any("please export this", SAVE_WORDS));
        assert!(!mentions_any("just show it", SAVE_WORDS));
    }
}
