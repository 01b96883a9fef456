use portfix_domain::{ValidateOptions, contained_target, validate_plan, validate_plan_with};
use pretty_assertions::assert_eq;

const VALID: &str = r#"{
    "project_name": "WeatherApi",
    "group_id": "com.acme",
    "artifact_id": "weather-api",
    "java_version": "21",
    "spring_boot_version": "3.3.1",
    "dependencies": [
        {"group_id": "org.springframework.boot", "artifact_id": "spring-boot-starter-data-jpa"},
        {"group_id": "com.h2database", "artifact_id": "h2", "version": null, "scope": "runtime"}
    ],
    "file_mappings": [
        {"source_file": "Controllers/WeatherController.cs",
         "target_path": "src/main/java/com/acme/controller/WeatherController.java",
         "package_name": "com.acme.controller"},
        {"source_file": "Models/Forecast.cs",
         "target_path": "src/main/java/com/acme/model/Forecast.java",
         "package_name": "com.acme.model"}
    ],
    "application_properties": {"server.port": "8081"}
}"#;

#[test]
fn valid_plan_is_accepted() {
    let plan = validate_plan(VALID).expect("valid plan");
    assert_eq!(plan.project_name, "WeatherApi");
    assert_eq!(plan.group_id, "com.acme");
    assert_eq!(plan.dependencies.len(), 2);
    assert_eq!(plan.dependencies[0].scope, "compile");
    assert_eq!(plan.dependencies[1].version, None);
    assert_eq!(plan.dependencies[1].scope, "runtime");
    assert_eq!(
        plan.application_properties.get("server.port").map(String::as_str),
        Some("8081")
    );
}

#[test]
fn fenced_plan_with_prose_is_accepted() {
    let raw = format!("Here is the plan:\n\n```json\n{VALID}\n```\nLet me know!");
    let plan = validate_plan(&raw).expect("fenced plan");
    assert_eq!(plan.file_mappings.len(), 2);
}

#[test]
fn optional_fields_fall_back_to_defaults() {
    let raw = r#"{
        "project_name": "Tiny",
        "dependencies": [],
        "file_mappings": [{"source_file": "A.cs", "target_path": "src/main/java/A.java", "package_name": "com.example"}],
        "application_properties": {}
    }"#;
    let plan = validate_plan(raw).expect("defaults");
    assert_eq!(plan.group_id, "com.example");
    assert_eq!(plan.artifact_id, "demo");
    assert_eq!(plan.java_version, "17");
    assert_eq!(plan.spring_boot_version, "3.2.0");
}

#[test]
fn missing_required_field_names_its_path() {
    let raw = VALID.replace(r#""project_name": "WeatherApi","#, "");
    let err = validate_plan(&raw).expect_err("missing project_name");
    assert_eq!(err.path, "$.project_name");
    assert_eq!(err.raw, raw);
}

#[test]
fn wrong_type_in_nested_field_names_its_path() {
    let raw = VALID.replace(
        r#""package_name": "com.acme.model""#,
        r#""package_name": 7"#,
    );
    let err = validate_plan(&raw).expect_err("wrong type");
    assert_eq!(err.path, "$.file_mappings[1].package_name");
    assert!(err.reason.contains("a number"), "{}", err.reason);
}

#[test]
fn non_string_property_value_is_rejected() {
    let raw = VALID.replace(r#""8081""#, "8081");
    let err = validate_plan(&raw).expect_err("numeric property");
    assert_eq!(err.path, r#"$.application_properties["server.port"]"#);
}

#[test]
fn duplicate_source_file_is_rejected() {
    let raw = VALID.replace("Models/Forecast.cs", "Controllers/WeatherController.cs");
    let err = validate_plan(&raw).expect_err("duplicate source");
    assert_eq!(err.path, "$.file_mappings[1].source_file");
    assert!(err.reason.contains("index 0"), "{}", err.reason);
}

#[test]
fn duplicate_target_path_is_rejected() {
    let raw = VALID.replace(
        "src/main/java/com/acme/model/Forecast.java",
        "src/main/java/com/acme/controller/WeatherController.java",
    );
    let err = validate_plan(&raw).expect_err("duplicate target");
    assert_eq!(err.path, "$.file_mappings[1].target_path");
}

#[test]
fn target_paths_must_stay_inside_the_output_root() {
    for target in ["/etc/evil.java", "../../up.java", "src/../../up.java", "C:/evil.java"] {
        let raw = VALID.replace("src/main/java/com/acme/model/Forecast.java", target);
        let err = validate_plan(&raw).expect_err(target);
        assert_eq!(err.path, "$.file_mappings[1].target_path", "{target}");
        assert!(err.reason.contains("inside the output root"), "{}", err.reason);
    }
}

#[test]
fn current_dir_prefix_does_not_dodge_target_uniqueness() {
    let raw = VALID.replace(
        "src/main/java/com/acme/model/Forecast.java",
        "./src/main/java/com/acme/controller//WeatherController.java",
    );
    let err = validate_plan(&raw).expect_err("same file twice");
    assert_eq!(err.path, "$.file_mappings[1].target_path");
    assert!(err.reason.contains("index 0"), "{}", err.reason);
}

#[test]
fn contained_target_normalises_relative_paths() {
    assert_eq!(
        contained_target("./src/main/java/A.java").as_deref(),
        Some("src/main/java/A.java")
    );
    assert_eq!(contained_target("src\\A.java").as_deref(), Some("src/A.java"));
    assert_eq!(contained_target("src/../A.java"), None);
    assert_eq!(contained_target("/A.java"), None);
    assert_eq!(contained_target("./"), None);
}

#[test]
fn empty_mappings_are_rejected_unless_allowed() {
    let raw = r#"{"project_name": "X", "dependencies": [], "file_mappings": [], "application_properties": {}}"#;
    let err = validate_plan(raw).expect_err("no mappings");
    assert_eq!(err.path, "$.file_mappings");

    let opts = ValidateOptions {
        require_mappings: false,
    };
    assert!(validate_plan_with(raw, &opts).is_ok());
}

#[test]
fn blank_dependency_coordinates_are_rejected() {
    let raw = VALID.replace(r#""artifact_id": "h2""#, r#""artifact_id": "  ""#);
    let err = validate_plan(&raw).expect_err("blank artifact");
    assert_eq!(err.path, "$.dependencies[1].artifact_id");
}

#[test]
fn malformed_json_keeps_the_raw_response() {
    let raw = "I could not produce a plan for this project.";
    let err = validate_plan(raw).expect_err("not json");
    assert_eq!(err.path, "$");
    assert_eq!(err.raw, raw);
    assert!(err.to_string().starts_with("invalid migration plan at $"));
}
