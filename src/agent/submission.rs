//! Submission types for the planner REPL.
//!
//! A line of user input is either a control command (`/quit`, `/new`,
//! `/help`, `/summary`) or conversation text for the orchestrator.

/// Parses user input into Submission types.
pub struct SubmissionParser;

impl SubmissionParser {
    /// Parse message content into a Submission.
    pub fn parse(content: &str) -> Submission {
        let trimmed = content.trim();
        let lower = trimmed.to_lowercase();

        match lower.as_str() {
            "/quit" | "/exit" => Submission::Quit,
            "/new" | "/restart" => Submission::NewSession,
            "/help" | "/?" => Submission::Help,
            "/summary" | "/prefs" => Submission::Summary,
            _ => Submission::UserInput {
                content: trimmed.to_string(),
            },
        }
    }
}

/// A line of input from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Conversation text for the current session.
    UserInput { content: String },
    /// Start a fresh planning session.
    NewSession,
    /// Show the collected preferences so far.
    Summary,
    Help,
    Quit,
}

pub const HELP_TEXT: &str = "\
Commands:
  /new      start planning a new trip
  /summary  show the preferences collected so far
  /quit     exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_user_input() {
        let s = SubmissionParser::parse("  I want to fly from Boston  ");
        assert_eq!(
            s,
            Submission::UserInput {
                content: "I want to fly from Boston".to_string()
            }
        );
    }

    #[test]
    fn test_parser_quit() {
        assert_eq!(SubmissionParser::parse("/quit"), Submission::Quit);
        assert_eq!(SubmissionParser::parse("/EXIT"), Submission::Quit);
    }

    #[test]
    fn test_parser_new_session() {
        assert_eq!(SubmissionParser::parse("/new"), Submission::NewSession);
        assert_eq!(SubmissionParser::parse("/Restart"), Submission::NewSession);
    }

    #[test]
    fn test_parser_help_and_summary() {
        assert_eq!(SubmissionParser::parse("/?"), Submission::Help);
        assert_eq!(SubmissionParser::parse("/summary"), Submission::Summary);
    }

    #[test]
    fn test_parser_unknown_slash_is_input() {
        // Only exact commands are intercepted.
        assert!(matches!(
            SubmissionParser::parse("/quit now"),
            Submission::UserInput { .. }
        ));
    }
}
