//! Structured requests and the command-line parser.

use std::sync::Arc;

use crate::catalog::{strip_query_marker, Catalog, ParameterDefinition, QUERY_MARKER};
use crate::error::{ScpiError, ScpiResult};

/// Separator between commands on one line.
pub const STATEMENT_DELIMITER: char = ';';

/// Separator between set arguments.
pub const ARGUMENT_DELIMITER: char = ',';

/// A command resolved against the catalog.
///
/// A request without arguments is a query; a set carries its value as the
/// first argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The addressed parameter.
    pub definition: Arc<ParameterDefinition>,
    /// Literal argument tokens, empty for a query.
    pub arguments: Vec<String>,
}

impl Request {
    /// Create a query for a parameter.
    pub fn query(definition: Arc<ParameterDefinition>) -> Self {
        Request {
            definition,
            arguments: Vec::new(),
        }
    }

    /// Create a set for a parameter.
    pub fn set(definition: Arc<ParameterDefinition>, value: impl Into<String>) -> Self {
        Request {
            definition,
            arguments: vec![value.into()],
        }
    }

    /// Whether this request reads the parameter.
    pub fn is_query(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Mnemonic path of the addressed parameter.
    pub fn path(&self) -> &str {
        &self.definition.path
    }

    /// Compose the command text sent over the link.
    ///
    /// Queries append the query marker; sets append a single space and the
    /// first argument.
    pub fn to_command_string(&self) -> String {
        match self.arguments.first() {
            None => format!("{}{}", self.definition.path, QUERY_MARKER),
            Some(value) => format!("{} {}", self.definition.path, value),
        }
    }
}

impl Catalog {
    /// Parse one command such as `:CH1:DISP ON` or `:CH1:DISP?`.
    pub fn parse(&self, line: &str) -> ScpiResult<Request> {
        let line = line.trim();
        let (head, tail) = match line.split_once(' ') {
            Some((head, tail)) => (head, Some(tail.trim()).filter(|t| !t.is_empty())),
            None => (line, None),
        };

        let definition = self
            .lookup_by_path(head)
            .ok_or_else(|| ScpiError::UnknownCommand(head.to_string()))?;

        let (_, is_query) = strip_query_marker(head);
        let arguments = match tail {
            Some(_) if is_query => return Err(ScpiError::UnexpectedArguments(line.to_string())),
            Some(tail) => tail
                .split(ARGUMENT_DELIMITER)
                .map(|arg| arg.trim().to_string())
                .collect(),
            None => Vec::new(),
        };

        Ok(Request {
            definition: definition.clone(),
            arguments,
        })
    }

    /// Parse several `;`-separated commands. Stops at the first error.
    pub fn parse_all(&self, text: &str) -> ScpiResult<Vec<Request>> {
        text.split(STATEMENT_DELIMITER)
            .map(|command| self.parse(command))
            .collect()
    }
}

/// Split a script into individual command strings.
///
/// Lines are split on newlines and then on the statement delimiter; blank
/// entries are skipped.
pub fn split_script(script: &str) -> impl Iterator<Item = &str> {
    script
        .lines()
        .flat_map(|line| line.split(STATEMENT_DELIMITER))
        .map(str::trim)
        .filter(|command| !command.is_empty())
}

/// Whether a command string carries the query marker on its head token.
pub fn is_query_command(command: &str) -> bool {
    let head = command.trim().split(' ').next().unwrap_or_default();
    head.ends_with(QUERY_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AccessMode, CommandSpec};

    const ON_OFF: &[&str] = &["ON", "OFF"];

    fn catalog() -> Catalog {
        let specs = [
            CommandSpec::new(":CH<n>:DISPlay", AccessMode::ReadWrite, Some(ON_OFF), ""),
            CommandSpec::new(":FUNCtion:FREQuency", AccessMode::ReadWrite, None, ""),
        ];
        Catalog::build(&specs, 1..=2).unwrap()
    }

    #[test]
    fn test_parse_set() {
        let request = catalog().parse(":CH1:DISP ON").unwrap();
        assert_eq!(request.path(), ":CH1:DISPlay");
        assert_eq!(request.arguments, vec!["ON".to_string()]);
        assert!(!request.is_query());
        assert_eq!(request.to_command_string(), ":CH1:DISPlay ON");
    }

    #[test]
    fn test_parse_query() {
        let request = catalog().parse("  :CH2:DISP?  ").unwrap();
        assert_eq!(request.path(), ":CH2:DISPlay");
        assert!(request.is_query());
        assert_eq!(request.to_command_string(), ":CH2:DISPlay?");
    }

    #[test]
    fn test_query_with_arguments_rejected() {
        let err = catalog().parse(":CH1:DISP? ON").unwrap_err();
        assert_eq!(err, ScpiError::UnexpectedArguments(":CH1:DISP? ON".to_string()));
    }

    #[test]
    fn test_unknown_command() {
        let err = catalog().parse(":CH9:DISP ON").unwrap_err();
        assert_eq!(err, ScpiError::UnknownCommand(":CH9:DISP".to_string()));
    }

    #[test]
    fn test_comma_arguments() {
        let request = catalog().parse(":FUNC:FREQ 1000,Hz").unwrap();
        assert_eq!(request.arguments, vec!["1000".to_string(), "Hz".to_string()]);
        assert_eq!(request.to_command_string(), ":FUNCtion:FREQuency 1000");
    }

    #[test]
    fn test_parse_all_stops_on_error() {
        let catalog = catalog();
        let requests = catalog.parse_all(":CH1:DISP ON;:CH2:DISP?").unwrap();
        assert_eq!(requests.len(), 2);

        let err = catalog.parse_all(":CH1:DISP ON;:BOGUS;:CH2:DISP?").unwrap_err();
        assert_eq!(err, ScpiError::UnknownCommand(":BOGUS".to_string()));
    }

    #[test]
    fn test_split_script() {
        let script = "\n  :CH1:DISP ON; :CH1:DISP?\n\n:FUNC:FREQ 50;\n";
        let commands: Vec<&str> = split_script(script).collect();
        assert_eq!(commands, vec![":CH1:DISP ON", ":CH1:DISP?", ":FUNC:FREQ 50"]);
        assert!(is_query_command(commands[1]));
        assert!(!is_query_command(commands[0]));
    }
}
