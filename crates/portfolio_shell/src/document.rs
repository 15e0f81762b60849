//! The portfolio source file and the command context built from it.
//!
//! The source is a loose JSON document where every field may be missing. [`PortfolioSource::build`]
//! fills defaults, wraps prose to the terminal width, normalizes links and lays out skills with
//! icon placeholders. The result serializes to the context string commands run against.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assets::AssetCache;
use crate::error::PortfolioError;
use crate::text::{format_link, wrap_text, TERMINAL_COLS};

const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_NAME: &str = "Anonymous Developer";
const DEFAULT_DESCRIPTION: &str = "Full Stack Developer.";
const DEFAULT_PROJECT_TITLE: &str = "Untitled";
/// Bullet points are indented, so they wrap a little narrower.
const BULLET_COLS: usize = TERMINAL_COLS - 5;
const SKILL_CATEGORIES: [&str; 4] = ["languages", "frameworks_libraries", "tools_platforms", "concepts"];
const SKILL_SEPARATOR_WIDTH: usize = 40;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub name: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    /// Pre-rendered ASCII art for the `about` section.
    pub profile_art: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceProject {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub github: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceExperience {
    pub title: Option<String>,
    pub company: Option<String>,
    pub duration: Option<String>,
    /// A single string or a list of bullet points.
    pub description: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PortfolioSource {
    pub personal_info: PersonalInfo,
    pub education: BTreeMap<String, String>,
    /// Category name to a list of skills, or to an object whose values are skills.
    pub skills: BTreeMap<String, Value>,
    pub projects: Vec<SourceProject>,
    pub experience: Vec<SourceExperience>,
    pub awards: Vec<BTreeMap<String, String>>,
    /// Skill icon art keyed by skill name.
    pub icons: BTreeMap<String, String>,
}

impl PortfolioSource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PortfolioError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|source| PortfolioError::io("reading portfolio", path, source))?;
        let source = serde_json::from_str(&raw)
            .map_err(|source| PortfolioError::json_parse(path, source))?;
        debug!("loaded portfolio source from {}", path.display());
        Ok(source)
    }

    pub fn from_json(raw: &str) -> Result<Self, PortfolioError> {
        serde_json::from_str(raw).map_err(PortfolioError::JsonInline)
    }

    /// Build the command context and the art its placeholders refer to.
    pub fn build(&self) -> (PortfolioDocument, AssetCache) {
        let mut assets = AssetCache::new();
        if let Some(art) = self.personal_info.profile_art.as_deref() {
            assets.set_profile_art(art);
        }
        for (key, art) in &self.icons {
            assets.insert_icon(key, art);
        }

        let info = &self.personal_info;
        let description = wrap_text(
            non_empty(info.description.as_deref()).unwrap_or(DEFAULT_DESCRIPTION),
            TERMINAL_COLS,
        );
        let about = About {
            content: format!(
                "\n[[PROFILE_ART]]\nNAME: {}\n\n{description}",
                non_empty(info.name.as_deref()).unwrap_or(DEFAULT_NAME)
            ),
        };

        let contact = Contact {
            email: or_not_available(info.email.as_deref()),
            linkedin: format_link(info.linkedin.as_deref()),
            github_profile: format_link(info.github.as_deref()),
        };

        let education = Education {
            degree: or_not_available(self.education.get("degree").map(String::as_str)),
            institution: or_not_available(self.education.get("institution").map(String::as_str)),
            graduation_date: or_not_available(
                self.education.get("graduation_date").map(String::as_str),
            ),
        };

        let skill_list = |category: &str| {
            format_skills(
                &skill_items(self.skills.get(category)),
                &assets,
            )
        };
        let skills = Skills {
            languages: skill_list(SKILL_CATEGORIES[0]),
            frameworks_libraries: skill_list(SKILL_CATEGORIES[1]),
            tools_platforms: skill_list(SKILL_CATEGORIES[2]),
            concepts: skill_list(SKILL_CATEGORIES[3]),
        };

        let projects = self
            .projects
            .iter()
            .map(|project| Project {
                title: non_empty(project.title.as_deref())
                    .unwrap_or(DEFAULT_PROJECT_TITLE)
                    .to_string(),
                subtitle: project.subtitle.clone().unwrap_or_default(),
                description: wrap_text(project.description.as_deref().unwrap_or(""), TERMINAL_COLS),
                github: format_link(project.github.as_deref()),
            })
            .collect();

        let experience = self
            .experience
            .iter()
            .map(|entry| Experience {
                title: or_not_available(entry.title.as_deref()),
                company: or_not_available(entry.company.as_deref()),
                duration: or_not_available(entry.duration.as_deref()),
                description: bullet_points(entry.description.as_ref())
                    .iter()
                    .map(|line| wrap_text(line, BULLET_COLS))
                    .collect(),
            })
            .collect();

        let awards = self
            .awards
            .iter()
            .map(|award| Award {
                award: or_not_available(award.get("award").map(String::as_str)),
                event: or_not_available(award.get("event").map(String::as_str)),
                date: or_not_available(award.get("date").map(String::as_str)),
            })
            .collect();

        let document = PortfolioDocument {
            about,
            contact,
            education,
            skills,
            projects,
            experience,
            awards,
        };
        (document, assets)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct About {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    pub linkedin: String,
    pub github_profile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub graduation_date: String,
}

/// Each entry is a display block: separator, optional icon placeholder, then the skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skills {
    pub languages: Vec<String>,
    pub frameworks_libraries: Vec<String>,
    pub tools_platforms: Vec<String>,
    pub concepts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub github: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub duration: String,
    pub description: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub award: String,
    pub event: String,
    pub date: String,
}

/// The context commands are run against, one field per `cat` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioDocument {
    pub about: About,
    pub contact: Contact,
    pub education: Education,
    pub skills: Skills,
    pub projects: Vec<Project>,
    pub experience: Vec<Experience>,
    pub awards: Vec<Award>,
}

impl PortfolioDocument {
    pub fn to_context(&self) -> Result<String, PortfolioError> {
        serde_json::to_string(self).map_err(PortfolioError::ContextSerialize)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn or_not_available(value: Option<&str>) -> String {
    non_empty(value).unwrap_or(NOT_AVAILABLE).to_string()
}

fn skill_items(value: Option<&Value>) -> Vec<String> {
    let values: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(fields)) => fields.values().collect(),
        _ => Vec::new(),
    };
    values
        .into_iter()
        .filter_map(|value| match value {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
        .collect()
}

fn format_skills(items: &[String], assets: &AssetCache) -> Vec<String> {
    if items.is_empty() {
        return vec![NOT_AVAILABLE.to_string()];
    }
    let separator = format!("\x1b[38;5;240m{}\x1b[0m", "-".repeat(SKILL_SEPARATOR_WIDTH));
    let mut formatted: Vec<String> = items
        .iter()
        .map(|item| match assets.icon_key_for(item) {
            Some(key) => format!("{separator}\n[[ICON:{key}]]\n   >> {item}"),
            None => format!("{separator}\n   >> {item}"),
        })
        .collect();
    // A trailing blank line keeps categories apart.
    if let Some(last) = formatted.last_mut() {
        last.push('\n');
    }
    formatted
}

fn bullet_points(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(text)) => vec![text.clone()],
        _ => vec![String::new()],
    }
}
