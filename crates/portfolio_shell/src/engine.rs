//! Command processing against the JSON context.

use crt_term::{CommandError, CommandOutput, CommandProcessor};
use log::debug;
use serde_json::{Map, Value};

use crate::error::PortfolioError;

/// Sections `cat` knows, in the order `help` lists them.
pub const SECTIONS: [&str; 7] = [
    "about",
    "projects",
    "skills",
    "experience",
    "education",
    "contact",
    "awards",
];

const HELP: &str = "Available commands:
  help              Show this list
  cat <section>     Print a portfolio section
  echo <text>       Print text
  clear, cls        Clear the screen
  debug mouse       Toggle pointer hover logging";

/// Runs `help`, `echo`, `cat` and `clear` against the context string.
///
/// The parsed context is kept until a different context string arrives.
#[derive(Debug, Default)]
pub struct PortfolioEngine {
    parsed: Option<(String, Value)>,
}

impl PortfolioEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn context(&mut self, raw: &str) -> Result<&Value, CommandError> {
        if raw.trim().is_empty() {
            return Err(CommandError::NotReady);
        }
        let stale = self
            .parsed
            .as_ref()
            .map_or(true, |(cached, _)| cached != raw);
        if stale {
            let value: Value = serde_json::from_str(raw)
                .map_err(|err| CommandError::Failed(format!("invalid context: {err}")))?;
            self.parsed = Some((raw.to_string(), value));
        }
        match &self.parsed {
            Some((_, value)) => Ok(value),
            None => Err(CommandError::NotReady),
        }
    }

    fn cat(&mut self, section: &str, context: &str) -> Result<CommandOutput, CommandError> {
        if section.is_empty() {
            return Ok(CommandOutput::Text(format!(
                "Usage: cat <section>\nSections: {}",
                SECTIONS.join(", ")
            )));
        }
        let section = section.to_lowercase();
        let output = match lookup_section(self.context(context)?, &section) {
            Ok(value) => render_section(&section, value),
            Err(err) => err.to_string(),
        };
        Ok(CommandOutput::Text(output))
    }
}

impl CommandProcessor for PortfolioEngine {
    fn process(&mut self, line: &str, context: &str) -> Result<CommandOutput, CommandError> {
        let line = line.trim();
        let (command, args) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(command, args)| (command, args.trim()));
        debug!("portfolio command {command:?} args {args:?}");

        match command {
            "" => Ok(CommandOutput::Text(String::new())),
            "help" => Ok(CommandOutput::Text(format!(
                "{HELP}\nSections: {}",
                SECTIONS.join(", ")
            ))),
            "echo" => Ok(CommandOutput::Text(args.to_string())),
            "cat" => self.cat(args, context),
            "clear" | "cls" => Ok(CommandOutput::Clear),
            "debug" => Ok(CommandOutput::Text("Usage: debug mouse".to_string())),
            _ => Ok(CommandOutput::Text(format!(
                "Command not found: {command}. Type 'help' for a list of commands."
            ))),
        }
    }
}

fn lookup_section<'a>(context: &'a Value, name: &str) -> Result<&'a Value, PortfolioError> {
    context
        .get(name)
        .ok_or_else(|| PortfolioError::UnknownSection {
            name: name.to_string(),
        })
}

fn render_section(name: &str, value: &Value) -> String {
    match (name, value) {
        ("about", Value::Object(fields)) => match fields.get("content") {
            Some(Value::String(content)) => content.clone(),
            _ => render_fields(fields, 0).join("\n"),
        },
        ("skills", Value::Object(categories)) => render_skills(categories),
        (_, Value::Array(entries)) if entries.is_empty() => "No entries.".to_string(),
        (_, Value::Array(entries)) => entries
            .iter()
            .map(|entry| match entry {
                Value::Object(fields) => render_fields(fields, 0).join("\n"),
                other => scalar(other),
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
        (_, Value::Object(fields)) => render_fields(fields, 0).join("\n"),
        (_, other) => scalar(other),
    }
}

fn render_skills(categories: &Map<String, Value>) -> String {
    let mut lines = Vec::new();
    for (category, items) in categories {
        lines.push(format!("{}:", label(category)));
        match items {
            Value::Array(items) => lines.extend(items.iter().map(scalar)),
            other => lines.push(scalar(other)),
        }
    }
    lines.join("\n")
}

fn render_fields(fields: &Map<String, Value>, indent: usize) -> Vec<String> {
    let pad = " ".repeat(indent);
    let mut lines = Vec::new();
    for (key, value) in fields {
        let label = label(key);
        match value {
            Value::String(text) if text.is_empty() => {}
            Value::String(text) if !text.contains('\n') => {
                lines.push(format!("{pad}{label}: {text}"));
            }
            Value::String(text) => {
                lines.push(format!("{pad}{label}:"));
                lines.extend(text.lines().map(|line| format!("{pad}  {line}")));
            }
            Value::Array(items) => {
                lines.push(format!("{pad}{label}:"));
                for item in items {
                    match item {
                        Value::Object(nested) => lines.extend(render_fields(nested, indent + 2)),
                        other => lines.extend(bullet(&scalar(other), indent + 2)),
                    }
                }
            }
            Value::Object(nested) => {
                lines.push(format!("{pad}{label}:"));
                lines.extend(render_fields(nested, indent + 2));
            }
            other => lines.push(format!("{pad}{label}: {}", scalar(other))),
        }
    }
    lines
}

fn bullet(text: &str, indent: usize) -> Vec<String> {
    let pad = " ".repeat(indent);
    text.lines()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 {
                format!("{pad}- {line}")
            } else {
                format!("{pad}  {line}")
            }
        })
        .collect()
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "N/A".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// `graduation_date` -> `Graduation Date`.
fn label(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
