//! Rendering helpers for generated project files and human-readable artifacts.

mod markdown;
mod pom;
mod properties;

pub use markdown::{render_heal_md, render_translation_md};
pub use pom::render_pom_xml;
pub use properties::render_application_properties;
