use std::fs;

use crt_term::{
    default_editor_keybindings_handle, InputEvent, LineEditor, ScreenBuffer, ShellOptions,
    TerminalShell, Vocabulary,
};
use portfolio_shell::{PortfolioEngine, PortfolioError, PortfolioSource};
use pretty_assertions::assert_eq;

const SOURCE: &str = r#"{
    "personal_info": {
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "github": "github.com/ada",
        "profile_art": "[ART]"
    },
    "skills": { "languages": ["Rust"] },
    "icons": { "rust": "<R>" }
}"#;

fn shell_for(source: &PortfolioSource) -> TerminalShell<ScreenBuffer> {
    let (document, assets) = source.build();
    let editor = LineEditor::new(
        Vocabulary::portfolio_default(),
        default_editor_keybindings_handle(),
    );
    let mut shell = TerminalShell::new(
        ScreenBuffer::new(80, 24),
        editor,
        PortfolioEngine::new(),
        ShellOptions::default(),
    )
    .with_assets(assets);
    shell.set_context(document.to_context().expect("context serializes"));
    shell.start();
    shell
}

fn submit(shell: &mut TerminalShell<ScreenBuffer>, line: &str) {
    shell.handle_input(&InputEvent::text(line));
    shell.handle_input(&InputEvent::key("enter"));
}

#[test]
fn loads_source_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("portfolio.json");
    fs::write(&path, SOURCE).expect("write source");

    let source = PortfolioSource::load(&path).expect("load source");
    assert_eq!(source.personal_info.name.as_deref(), Some("Ada Lovelace"));
    let (document, assets) = source.build();
    assert_eq!(document.contact.github_profile, "https://github.com/ada");
    assert_eq!(assets.profile_art(), Some("[ART]"));
}

#[test]
fn load_errors_name_the_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("missing.json");
    let err = PortfolioSource::load(&missing).unwrap_err();
    assert!(matches!(err, PortfolioError::Io { .. }));
    assert!(err.to_string().contains("missing.json"));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ nope").expect("write broken source");
    let err = PortfolioSource::load(&broken).unwrap_err();
    assert!(matches!(err, PortfolioError::JsonParse { .. }));
}

#[test]
fn cat_about_resolves_the_profile_art() {
    let source = PortfolioSource::from_json(SOURCE).expect("parse source");
    let mut shell = shell_for(&source);
    submit(&mut shell, "cat about");

    let lines = shell.surface().visible_lines();
    assert_eq!(
        lines[..9].to_vec(),
        vec![
            "Welcome to the interactive portfolio!",
            "Type 'help' for a list of commands.",
            "> cat about",
            "",
            "[ART]",
            "NAME: Ada Lovelace",
            "",
            "Full Stack Developer.",
            ">",
        ]
    );
}

#[test]
fn cat_skills_shows_icons_between_separator_and_item() {
    let source = PortfolioSource::from_json(SOURCE).expect("parse source");
    let mut shell = shell_for(&source);
    submit(&mut shell, "cat skills");

    let lines = shell.surface().visible_lines();
    let separator = lines
        .iter()
        .position(|line| line == &"-".repeat(40))
        .expect("separator row");
    assert_eq!(lines[separator - 1], "Languages:");
    assert_eq!(lines[separator + 2], "<R>");
    assert_eq!(lines[separator + 4], "   >> Rust");
    assert!(lines.iter().any(|line| line == "Concepts:"));
}

#[test]
fn unknown_commands_and_clear() {
    let source = PortfolioSource::default();
    let mut shell = shell_for(&source);
    submit(&mut shell, "sudo");
    assert!(shell
        .surface()
        .visible_lines()
        .iter()
        .any(|line| line == "Command not found: sudo. Type 'help' for a list of commands."));

    submit(&mut shell, "clear");
    let lines = shell.surface().visible_lines();
    assert_eq!(lines[0], ">");
    assert!(lines[1..].iter().all(String::is_empty));
}
