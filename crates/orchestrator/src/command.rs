//! Command request parsing.
//!
//! The arguments after a mode keyword are order-insensitive: every token is
//! either an operation keyword, the address, or a trailing argument.

use std::fmt;

use crate::error::HolocronError;

/// What a command asks the holocron to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Operation {
    #[default]
    Read,
    Add,
    Edit,
    Delete,
    ChangeAuthor,
    AddGroup,
    EditGroup,
    DeleteGroup,
    List,
    Map,
    Stats,
    Help,
    Clear,
    Populate,
}

impl Operation {
    /// Every operation, in help order.
    pub const ALL: [Operation; 14] = [
        Operation::Read,
        Operation::List,
        Operation::Add,
        Operation::Edit,
        Operation::Delete,
        Operation::ChangeAuthor,
        Operation::AddGroup,
        Operation::EditGroup,
        Operation::DeleteGroup,
        Operation::Map,
        Operation::Stats,
        Operation::Help,
        Operation::Clear,
        Operation::Populate,
    ];

    /// Look up an operation keyword or one of its aliases.
    pub fn lookup(token: &str) -> Option<Self> {
        let op = match token.to_lowercase().as_str() {
            "read" => Self::Read,
            "add" => Self::Add,
            "edit" => Self::Edit,
            "delete" => Self::Delete,
            "reassign" | "author" => Self::ChangeAuthor,
            "addsquad" | "addgroup" => Self::AddGroup,
            "editsquad" | "editgroup" => Self::EditGroup,
            "deletesquad" | "deletegroup" => Self::DeleteGroup,
            "list" => Self::List,
            "map" => Self::Map,
            "stats" => Self::Stats,
            "help" => Self::Help,
            "clean" | "reset" | "clear" => Self::Clear,
            "dummy" | "populate" | "test" => Self::Populate,
            _ => return None,
        };
        Some(op)
    }

    /// Primary keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Add => "add",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::ChangeAuthor => "reassign",
            Self::AddGroup => "addsquad",
            Self::EditGroup => "editsquad",
            Self::DeleteGroup => "deletesquad",
            Self::List => "list",
            Self::Map => "map",
            Self::Stats => "stats",
            Self::Help => "help",
            Self::Clear => "clear",
            Self::Populate => "populate",
        }
    }

    /// Verb used in prompts, e.g. "Which tip would you like to edit?".
    pub fn verb(&self) -> &'static str {
        match self {
            Self::ChangeAuthor => "reassign",
            other => other.keyword(),
        }
    }

    /// Operations that change a tip collection.
    pub fn is_modification(&self) -> bool {
        matches!(self, Self::Add | Self::Edit | Self::Delete | Self::ChangeAuthor)
    }

    /// Operations restricted to requesters with the elevated role.
    pub fn requires_elevated(&self) -> bool {
        matches!(
            self,
            Self::ChangeAuthor | Self::Clear | Self::Populate | Self::DeleteGroup
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Which help section to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    All,
    Operation(Operation),
}

/// A parsed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandRequest {
    pub operation: Operation,
    /// Lowercased address, if one was given.
    pub address: Option<String>,
    pub help_topic: Option<HelpTopic>,
    /// Depth or activity filters for reads.
    pub read_filters: Vec<String>,
    pub new_content: Option<String>,
    pub new_author: Option<String>,
    /// Remaining tokens, case preserved.
    pub trailing_args: Vec<String>,
    pub error: Option<HolocronError>,
}

impl CommandRequest {
    /// Parse a raw argument string, honoring double quotes.
    pub fn parse_line(line: &str) -> Self {
        Self::parse(&split_quoted(line))
    }

    /// Parse already split tokens.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut operation: Option<Operation> = None;
        let mut request = Self::default();

        for token in tokens {
            let token = token.as_ref();
            match Operation::lookup(token) {
                Some(found) if operation == Some(Operation::Help) => {
                    request.help_topic = Some(HelpTopic::Operation(found));
                }
                Some(Operation::Help) => {
                    if let Some(previous) = operation {
                        request.help_topic = Some(HelpTopic::Operation(previous));
                    }
                    operation = Some(Operation::Help);
                }
                Some(found) => operation = Some(found),
                None if request.address.is_none() => {
                    request.address = Some(token.to_lowercase());
                }
                None => request.trailing_args.push(token.to_string()),
            }
        }

        request.operation = operation.unwrap_or_default();
        request.refine();
        request
    }

    /// Second pass: hand trailing arguments to the operation that uses them.
    fn refine(&mut self) {
        match self.operation {
            Operation::Help => {
                if let Some(section) = self.address.take() {
                    self.trailing_args.insert(0, section);
                }
                if self.help_topic.is_none() && self.trailing_args.is_empty() {
                    self.help_topic = Some(HelpTopic::All);
                }
            }
            Operation::Read => {
                if !self.trailing_args.is_empty() {
                    let filter = self.trailing_args.remove(0);
                    self.read_filters.push(filter);
                }
            }
            Operation::Add => match self.trailing_args.len() {
                0 => {}
                1 => self.new_content = Some(self.trailing_args.remove(0)),
                _ => self.error = Some(HolocronError::AmbiguousCommandArgument),
            },
            Operation::ChangeAuthor => {
                if !self.trailing_args.is_empty() {
                    self.new_author = Some(self.trailing_args.remove(0));
                }
            }
            _ => {}
        }
    }

    /// A request for `operation` at `address`, used by continuations.
    pub fn for_location(operation: Operation, address: &str) -> Self {
        Self {
            operation,
            address: Some(address.to_string()),
            ..Self::default()
        }
    }
}

/// Split a line on whitespace, keeping double-quoted runs together.
pub fn split_quoted(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => {
                if in_quotes && !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                in_quotes = !in_quotes;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> CommandRequest {
        CommandRequest::parse_line(line)
    }

    #[test]
    fn test_split_quoted() {
        assert_eq!(
            split_quoted(r#"g1 add "use Thrawn first""#),
            vec!["g1", "add", "use Thrawn first"]
        );
        assert_eq!(split_quoted("  s3n  5 "), vec!["s3n", "5"]);
        assert!(split_quoted("").is_empty());
    }

    #[test]
    fn test_default_is_read() {
        let request = parse("S3B1");
        assert_eq!(request.operation, Operation::Read);
        assert_eq!(request.address.as_deref(), Some("s3b1"));
        assert!(request.error.is_none());
    }

    #[test]
    fn test_order_insensitive() {
        let a = parse(r#"add g1 "Use Thrawn""#);
        let b = parse(r#"g1 add "Use Thrawn""#);
        assert_eq!(a, b);
        assert_eq!(a.operation, Operation::Add);
        assert_eq!(a.new_content.as_deref(), Some("Use Thrawn"));
    }

    #[test]
    fn test_add_with_unquoted_text_is_ambiguous() {
        let request = parse("g1 add use Thrawn");
        assert_eq!(request.error, Some(HolocronError::AmbiguousCommandArgument));
    }

    #[test]
    fn test_aliases() {
        assert_eq!(parse("reset").operation, Operation::Clear);
        assert_eq!(parse("dummy").operation, Operation::Populate);
        assert_eq!(parse("jmk author Bob").operation, Operation::ChangeAuthor);
        assert_eq!(parse("addgroup gas").operation, Operation::AddGroup);
        assert_eq!(parse("deletesquad gas").operation, Operation::DeleteGroup);
    }

    #[test]
    fn test_change_author_takes_new_author() {
        let request = parse("g1 reassign Bob");
        assert_eq!(request.new_author.as_deref(), Some("Bob"));
        assert!(request.trailing_args.is_empty());
    }

    #[test]
    fn test_read_filter_keeps_case() {
        let request = parse("jmk GAC");
        assert_eq!(request.read_filters, vec!["GAC"]);
        let request = parse("jmk 5 tw");
        assert_eq!(request.read_filters, vec!["5"]);
        assert_eq!(request.trailing_args, vec!["tw"]);
    }

    #[test]
    fn test_help_swaps_keywords() {
        let request = parse("add help");
        assert_eq!(request.operation, Operation::Help);
        assert_eq!(request.help_topic, Some(HelpTopic::Operation(Operation::Add)));

        let request = parse("help edit");
        assert_eq!(request.operation, Operation::Help);
        assert_eq!(request.help_topic, Some(HelpTopic::Operation(Operation::Edit)));

        let request = parse("help");
        assert_eq!(request.help_topic, Some(HelpTopic::All));
    }

    #[test]
    fn test_help_with_trailing_section() {
        let request = parse("help location");
        assert_eq!(request.operation, Operation::Help);
        assert_eq!(request.address, None);
        assert_eq!(request.trailing_args, vec!["location"]);
        assert_eq!(request.help_topic, None);
    }
}
