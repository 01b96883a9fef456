//! Target project layout.

use crate::ports::WritePort;
use anyhow::Context;
use camino::Utf8Path;
use portfix_render::{render_application_properties, render_pom_xml};
use portfix_types::plan::MigrationPlan;
use tracing::info;

/// Standard Maven source directories, relative to the output root.
pub const MAVEN_LAYOUT: &[&str] = &["src/main/java", "src/main/resources", "src/test/java"];

pub const POM_PATH: &str = "pom.xml";
pub const PROPERTIES_PATH: &str = "src/main/resources/application.properties";

/// Create the Maven layout and write `pom.xml` and `application.properties`.
///
/// Existing files with the same names are overwritten.
pub fn scaffold_project(
    plan: &MigrationPlan,
    output_root: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(output_root)?;
    for dir in MAVEN_LAYOUT {
        writer.create_dir_all(&output_root.join(dir))?;
    }

    writer
        .write_file(
            &output_root.join(POM_PATH),
            render_pom_xml(plan).as_bytes(),
        )
        .context("write pom.xml")?;
    writer
        .write_file(
            &output_root.join(PROPERTIES_PATH),
            render_application_properties(plan).as_bytes(),
        )
        .context("write application.properties")?;

    info!(output = %output_root, "scaffolded target project");
    Ok(())
}
