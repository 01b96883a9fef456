use portfix_types::plan::{DependencySpec, MigrationPlan};

/// Dependencies every generated project gets, as `(group, artifact)`.
/// Plan entries with the same coordinates are dropped to avoid duplicates.
const BUILTIN_DEPENDENCIES: &[(&str, &str)] = &[
    ("org.springframework.boot", "spring-boot-starter-web"),
    ("org.projectlombok", "lombok"),
    ("org.springframework.boot", "spring-boot-starter-test"),
];

/// Render a Spring Boot `pom.xml` for `plan`.
pub fn render_pom_xml(plan: &MigrationPlan) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<project xmlns=\"http://maven.apache.org/POM/4.0.0\"\n");
    out.push_str("         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"\n");
    out.push_str("         xsi:schemaLocation=\"http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd\">\n");
    out.push_str("    <modelVersion>4.0.0</modelVersion>\n");
    out.push_str("    <parent>\n");
    out.push_str("        <groupId>org.springframework.boot</groupId>\n");
    out.push_str("        <artifactId>spring-boot-starter-parent</artifactId>\n");
    out.push_str(&format!(
        "        <version>{}</version>\n",
        xml_escape(&plan.spring_boot_version)
    ));
    out.push_str("        <relativePath/>\n");
    out.push_str("    </parent>\n");
    out.push_str(&format!(
        "    <groupId>{}</groupId>\n",
        xml_escape(&plan.group_id)
    ));
    out.push_str(&format!(
        "    <artifactId>{}</artifactId>\n",
        xml_escape(&plan.artifact_id)
    ));
    out.push_str("    <version>0.0.1-SNAPSHOT</version>\n");
    out.push_str(&format!("    <name>{}</name>\n", xml_escape(&plan.project_name)));
    out.push_str("    <description>Migrated Project</description>\n");
    out.push_str("    <properties>\n");
    out.push_str(&format!(
        "        <java.version>{}</java.version>\n",
        xml_escape(&plan.java_version)
    ));
    out.push_str("    </properties>\n");

    out.push_str("    <dependencies>\n");
    push_dependency(
        &mut out,
        "org.springframework.boot",
        "spring-boot-starter-web",
        None,
        None,
        false,
    );
    push_dependency(&mut out, "org.projectlombok", "lombok", None, None, true);
    for dep in plan.dependencies.iter().filter(|d| !is_builtin(d)) {
        let scope = (dep.scope != "compile").then_some(dep.scope.as_str());
        push_dependency(
            &mut out,
            &dep.group_id,
            &dep.artifact_id,
            dep.version.as_deref(),
            scope,
            false,
        );
    }
    push_dependency(
        &mut out,
        "org.springframework.boot",
        "spring-boot-starter-test",
        None,
        Some("test"),
        false,
    );
    out.push_str("    </dependencies>\n\n");

    out.push_str("    <build>\n");
    out.push_str("        <plugins>\n");
    out.push_str("            <plugin>\n");
    out.push_str("                <groupId>org.springframework.boot</groupId>\n");
    out.push_str("                <artifactId>spring-boot-maven-plugin</artifactId>\n");
    out.push_str("            </plugin>\n");
    out.push_str("        </plugins>\n");
    out.push_str("    </build>\n");
    out.push_str("</project>\n");
    out
}

fn is_builtin(dep: &DependencySpec) -> bool {
    BUILTIN_DEPENDENCIES
        .iter()
        .any(|(g, a)| dep.group_id.trim() == *g && dep.artifact_id.trim() == *a)
}

fn push_dependency(
    out: &mut String,
    group: &str,
    artifact: &str,
    version: Option<&str>,
    scope: Option<&str>,
    optional: bool,
) {
    out.push_str("        <dependency>\n");
    out.push_str(&format!("            <groupId>{}</groupId>\n", xml_escape(group)));
    out.push_str(&format!(
        "            <artifactId>{}</artifactId>\n",
        xml_escape(artifact)
    ));
    if let Some(v) = version.filter(|v| !v.trim().is_empty()) {
        out.push_str(&format!("            <version>{}</version>\n", xml_escape(v)));
    }
    if let Some(s) = scope {
        out.push_str(&format!("            <scope>{}</scope>\n", xml_escape(s)));
    }
    if optional {
        out.push_str("            <optional>true</optional>\n");
    }
    out.push_str("        </dependency>\n");
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn plan(deps: Vec<DependencySpec>) -> MigrationPlan {
        MigrationPlan {
            project_name: "Weather & Co".to_string(),
            group_id: "com.acme".to_string(),
            artifact_id: "weather".to_string(),
            java_version: "21".to_string(),
            spring_boot_version: "3.3.1".to_string(),
            dependencies: deps,
            file_mappings: vec![],
            application_properties: BTreeMap::new(),
        }
    }

    fn dep(group: &str, artifact: &str, version: Option<&str>, scope: &str) -> DependencySpec {
        DependencySpec {
            group_id: group.to_string(),
            artifact_id: artifact.to_string(),
            version: version.map(str::to_string),
            scope: scope.to_string(),
        }
    }

    #[test]
    fn header_carries_plan_coordinates() {
        let xml = render_pom_xml(&plan(vec![]));
        assert!(xml.contains("<artifactId>spring-boot-starter-parent</artifactId>\n        <version>3.3.1</version>"));
        assert!(xml.contains("    <groupId>com.acme</groupId>\n    <artifactId>weather</artifactId>"));
        assert!(xml.contains("<java.version>21</java.version>"));
        assert!(xml.contains("<name>Weather &amp; Co</name>"));
    }

    #[test]
    fn versionless_dependency_omits_version_element() {
        let xml = render_pom_xml(&plan(vec![dep("com.h2database", "h2", None, "runtime")]));
        assert!(xml.contains(
            "            <artifactId>h2</artifactId>\n            <scope>runtime</scope>\n"
        ));
    }

    #[test]
    fn compile_scope_is_implicit() {
        let xml = render_pom_xml(&plan(vec![dep(
            "com.fasterxml.jackson.core",
            "jackson-databind",
            Some("2.17.1"),
            "compile",
        )]));
        assert!(xml.contains(
            "            <artifactId>jackson-databind</artifactId>\n            <version>2.17.1</version>\n        </dependency>"
        ));
    }

    #[test]
    fn builtin_dependencies_are_not_duplicated() {
        let xml = render_pom_xml(&plan(vec![dep(
            "org.springframework.boot",
            "spring-boot-starter-web",
            None,
            "compile",
        )]));
        assert_eq!(xml.matches("spring-boot-starter-web").count(), 1);
    }

    #[test]
    fn plan_dependencies_sit_between_lombok_and_test_starter() {
        let xml = render_pom_xml(&plan(vec![dep("org.postgresql", "postgresql", None, "runtime")]));
        let lombok = xml.find("<artifactId>lombok</artifactId>").expect("lombok");
        let pg = xml.find("<artifactId>postgresql</artifactId>").expect("postgresql");
        let test = xml
            .find("<artifactId>spring-boot-starter-test</artifactId>")
            .expect("test starter");
        assert!(lombok < pg && pg < test);
    }
}
