use std::str::FromStr;

use crate::events::Topic;

use strum::{IntoEnumIterator, AsRefStr, EnumIter, EnumString, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Select the topic questions are tagged with
    Topic,
    /// Load one of the example prompts into the composer
    Example,
    /// Clear the conversation
    Clear,
    /// Save the conversation to a text file
    Download,
    /// Show help
    Help,
    /// Exit the application
    Bye,
}

pub fn command_entries() -> Vec<CommandEntry> {
    SlashCommand::iter()
        .map(|command| CommandEntry {
            keyword: command.command(),
            description: command.description(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    pub argument: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    pub keyword: &'static str,
    pub description: &'static str,
}

impl ParsedCommand {
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    pub fn topic_target(&self) -> Option<Topic> {
        if self.command != SlashCommand::Topic {
            return None;
        }

        Topic::parse(self.argument()?)
    }

    /// 1-based example number for `/example N`
    pub fn example_number(&self) -> Option<usize> {
        if self.command != SlashCommand::Example {
            return None;
        }

        self.argument()?.trim().parse().ok()
    }
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Topic => "select a topic (e.g. /topic git), or cycle to the next one",
            SlashCommand::Example => "load an example prompt (/example 1-5), or list them",
            SlashCommand::Clear => "clear the conversation",
            SlashCommand::Download => "save the conversation to chat_<timestamp>.txt",
            SlashCommand::Help => "show available commands",
            SlashCommand::Bye => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Return all built-in commands in a Vec paired with their command string.
pub fn built_in_slash_commands() -> Vec<(&'static str, SlashCommand)> {
    SlashCommand::iter()
        .map(|c| (c.command(), c))
        .collect()
}

/// Parse a slash command from user input
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].split_whitespace();
    let head = parts.next()?;
    let rest: Vec<String> = parts.map(|s| s.to_string()).collect();

    let command = SlashCommand::from_str(head).ok().or_else(|| match head.to_lowercase().as_str() {
        "q" | "quit" | "exit" => Some(SlashCommand::Bye),
        "t" | "topics" => Some(SlashCommand::Topic),
        "e" | "examples" => Some(SlashCommand::Example),
        "c" | "reset" => Some(SlashCommand::Clear),
        "d" | "save" | "export" => Some(SlashCommand::Download),
        _ => None,
    })?;

    let argument = if rest.is_empty() {
        None
    } else {
        Some(rest.join(" "))
    };

    Some(ParsedCommand { command, argument })
}

/// Get help text for all available commands
pub fn get_help_text() -> String {
    let mut help = String::from("Available commands:\n\n");
    for (command_str, command) in built_in_slash_commands() {
        help.push_str(&format!("/{} - {}\n", command_str, command.description()));
    }

    help.push_str("\nKeys: Enter send, Shift+Enter (or Alt+Enter) newline, Tab/Shift+Tab change topic,");
    help.push_str(" Ctrl+E examples, Alt+1..5 load example, Ctrl+L clear, Ctrl+S download, Esc quit.");

    help
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_topic_with_multi_word_argument() {
        let parsed = parse_slash_command("/topic design patterns").unwrap();
        assert_eq!(parsed.command, SlashCommand::Topic);
        assert_eq!(parsed.argument(), Some("design patterns"));
        assert_eq!(parsed.topic_target(), Some(Topic::DesignPatterns));
    }

    #[test]
    fn parses_aliases() {
        assert_eq!(parse_slash_command("/q").unwrap().command, SlashCommand::Bye);
        assert_eq!(parse_slash_command("/export").unwrap().command, SlashCommand::Download);
        assert_eq!(parse_slash_command("/reset").unwrap().command, SlashCommand::Clear);
        assert_eq!(parse_slash_command("/examples").unwrap().command, SlashCommand::Example);
    }

    #[test]
    fn example_number_parses() {
        assert_eq!(parse_slash_command("/example 3").unwrap().example_number(), Some(3));
        assert_eq!(parse_slash_command("/example").unwrap().example_number(), None);
        assert_eq!(parse_slash_command("/example three").unwrap().example_number(), None);
    }

    #[test]
    fn non_commands_are_ignored() {
        assert!(parse_slash_command("How does /dev/null work?").is_none());
        assert!(parse_slash_command("/frobnicate").is_none());
        assert!(parse_slash_command("/").is_none());
    }

    #[test]
    fn help_lists_every_command() {
        let help = get_help_text();
        for (keyword, _) in built_in_slash_commands() {
            assert!(help.contains(&format!("/{}", keyword)));
        }
    }
}
