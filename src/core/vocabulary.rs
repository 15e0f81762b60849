//! Completion vocabularies and the inline suggestion rule.
//!
//! The first word of a line completes against command names; every later word completes
//! against section names. Only the presence of a space decides which list applies.

/// A command token the prompt knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    /// Accepting this command via Tab appends a space so the argument can follow.
    pub takes_argument: bool,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>, takes_argument: bool) -> Self {
        Self {
            name: name.into(),
            takes_argument,
        }
    }
}

/// Which list the word under completion is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionSource {
    Commands,
    Sections,
}

/// Fixed command and section lists, in suggestion priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    commands: Vec<CommandSpec>,
    sections: Vec<String>,
}

impl Vocabulary {
    pub fn new(commands: Vec<CommandSpec>, sections: Vec<String>) -> Self {
        Self { commands, sections }
    }

    /// The portfolio prompt's commands and sections.
    pub fn portfolio_default() -> Self {
        Self::new(
            vec![
                CommandSpec::new("cat", true),
                CommandSpec::new("echo", true),
                CommandSpec::new("help", false),
                CommandSpec::new("clear", false),
                CommandSpec::new("cls", false),
                CommandSpec::new("debug", false),
            ],
            [
                "about",
                "projects",
                "skills",
                "experience",
                "education",
                "contact",
                "awards",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        )
    }

    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|command| command.name.as_str())
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(String::as_str)
    }

    pub fn source_for(line: &str) -> CompletionSource {
        if line.contains(' ') {
            CompletionSource::Sections
        } else {
            CompletionSource::Commands
        }
    }

    /// The partial word at the end of the line.
    pub fn current_word(line: &str) -> &str {
        match line.rfind(' ') {
            Some(idx) => &line[idx + 1..],
            None => line,
        }
    }

    fn entries(&self, source: CompletionSource) -> Box<dyn Iterator<Item = &str> + '_> {
        match source {
            CompletionSource::Commands => Box::new(self.commands()),
            CompletionSource::Sections => Box::new(self.sections()),
        }
    }

    /// Inline remainder for the word being typed: first entry (in list order) that extends it.
    ///
    /// Empty when the line is empty, ends with a space, or nothing extends the word.
    pub fn suggest(&self, line: &str) -> String {
        if line.is_empty() || line.ends_with(' ') {
            return String::new();
        }
        let word = Self::current_word(line);
        self.entries(Self::source_for(line))
            .find(|entry| entry.starts_with(word) && *entry != word)
            .map(|entry| entry[word.len()..].to_string())
            .unwrap_or_default()
    }

    /// Every entry starting with the current word, exact matches included.
    pub fn completions(&self, line: &str) -> Vec<String> {
        let word = Self::current_word(line);
        self.entries(Self::source_for(line))
            .filter(|entry| entry.starts_with(word))
            .map(str::to_string)
            .collect()
    }

    /// Whether the whole line is a command that expects an argument.
    pub fn expects_argument(&self, line: &str) -> bool {
        self.commands
            .iter()
            .any(|command| command.takes_argument && command.name == line)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::portfolio_default()
    }
}
