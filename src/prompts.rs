use crate::events::Topic;

/// Built-in system prompt, prepended to every completion request.
pub const SYSTEM_PROMPT: &str = r#"
You are an intelligent, friendly Software Engineering expert. Help users understand and apply concepts from SDLC, Agile, OOP, UML, Git, Clean Code, Testing, and more. Give structured, concise answers with examples and code snippets when needed. Use Markdown and code formatting where appropriate.
"#;

/// Notice returned when a submit carries no question.
pub const EMPTY_INPUT_NOTICE: &str = "Please enter a question.";

/// Starter questions offered in the examples panel.
pub const EXAMPLE_PROMPTS: [&str; 5] = [
    "Explain the phases of the Software Development Life Cycle (SDLC).",
    "What are SOLID principles in OOP?",
    "Give an example of a Factory Design Pattern in Python.",
    "How does Git branching work in a team environment?",
    "What is unit testing and why is it important?",
];

/// Prefix a question with its topic tag, the format the model sees.
pub fn tag_with_topic(topic: Topic, input: &str) -> String {
    format!("[Topic: {}] {}", topic.label(), input)
}

/// Look up an example prompt by its 1-based position.
pub fn example_prompt(number: usize) -> Option<&'static str> {
    number
        .checked_sub(1)
        .and_then(|index| EXAMPLE_PROMPTS.get(index))
        .copied()
}
