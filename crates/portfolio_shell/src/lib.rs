mod assets;
mod document;
mod engine;
mod error;
mod text;

pub use assets::{AssetCache, PROFILE_ART_KEY};
pub use document::{
    About, Award, Contact, Education, Experience, PersonalInfo, PortfolioDocument,
    PortfolioSource, Project, Skills, SourceExperience, SourceProject,
};
pub use engine::{PortfolioEngine, SECTIONS};
pub use error::PortfolioError;
pub use text::{format_link, wrap_text, TERMINAL_COLS};
