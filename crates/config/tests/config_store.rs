use sdkpack_common::GeneratorError;
use sdkpack_config::{ConfigFormat, ConfigStore, Field, Rule, TargetSchema};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn targets() -> Vec<TargetSchema> {
    vec![
        TargetSchema::new("javascript-node")
            .option(Field::required("private", Rule::Boolean).with_default(json!(true))),
        TargetSchema::new("python"),
    ]
}

fn workspace() -> (TempDir, ConfigStore) {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("app")).unwrap();
    fs::create_dir(dir.path().join("output")).unwrap();
    let store = ConfigStore::new(targets())
        .unwrap()
        .with_base_dir(dir.path());
    (dir, store)
}

#[test]
fn test_load_yaml_applies_defaults() {
    let (dir, store) = workspace();
    let path = dir.path().join("sdkpack.yaml");
    fs::write(
        &path,
        r#"
global:
  appPath: ./app
  api:
    hostname: api.example.com
sdks:
  javascript-node: {}
"#,
    )
    .unwrap();

    let config = store.load(&path).unwrap();

    assert_eq!(config.global.app_path, dir.path().join("app"));
    assert_eq!(config.global.dest, dir.path().join("output"));
    assert_eq!(config.global.prefix, "Api");
    assert_eq!(config.global.project_name, "api-sdk");
    assert_eq!(config.global.version, "1.0.0");
    assert_eq!(config.global.license, "MIT");
    assert_eq!(config.global.keywords, vec!["api", "sdk"]);
    assert!(config.global.routes.is_empty());

    let target = &config.sdks["javascript-node"];
    assert_eq!(target.options.get("private"), Some(&json!(true)));
    assert!(target.overrides.is_empty());
}

#[test]
fn test_missing_required_field_is_reported() {
    let (_dir, store) = workspace();
    let doc = json!({
        "global": { "api": { "hostname": "localhost" } },
        "sdks": { "javascript-node": {} }
    });

    let err = store
        .parse_str(&doc.to_string(), ConfigFormat::Json)
        .unwrap_err();

    match err {
        GeneratorError::SchemaValidation(violations) => {
            assert!(violations.iter().any(|v| v.path == "/global/appPath"));
        }
        other => panic!("expected schema violation, got {:?}", other),
    }
}

#[test]
fn test_unreadable_file_is_a_path_error() {
    let (dir, store) = workspace();
    let err = store.load(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, GeneratorError::Path { .. }));
}

#[test]
fn test_malformed_file_is_a_parse_error() {
    let (dir, store) = workspace();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(store.load(&path), Err(GeneratorError::Json(_))));
}

#[test]
fn test_merge_uses_merged_project_name() {
    let (dir, store) = workspace();
    let doc = json!({
        "global": {
            "appPath": "app",
            "projectName": "shop-sdk",
            "api": { "hostname": "localhost", "protocol": "https" }
        },
        "sdks": {
            "javascript-node": { "projectName": "shop-node", "api": { "port": 8443 } },
            "python": {}
        }
    });
    let config = store
        .parse_str(&doc.to_string(), ConfigFormat::Json)
        .unwrap();

    let node = store.merge(&config, "javascript-node").unwrap();
    assert_eq!(node.output_path(), dir.path().join("output").join("shop-node"));
    assert_eq!(node.settings.api.port, Some(8443));
    assert_eq!(node.settings.api.hostname, "localhost");
    assert!(node.option_bool("private", false));

    let python = store.merge(&config, "python").unwrap();
    assert_eq!(python.output_path(), dir.path().join("output").join("shop-sdk"));
}

#[test]
fn test_empty_target_equals_global_except_dest() {
    let (_dir, store) = workspace();
    let doc = json!({
        "global": { "appPath": "app", "api": { "hostname": "localhost" } },
        "sdks": { "python": {} }
    });
    let config = store
        .parse_str(&doc.to_string(), ConfigFormat::Json)
        .unwrap();

    let merged = store.merge(&config, "python").unwrap();
    let mut expected = config.global.clone();
    expected.dest = expected.dest.join("api-sdk");
    assert_eq!(merged.settings, expected);
}

#[test]
fn test_deletion_scope_follows_output() {
    let (dir, store) = workspace();
    let doc = json!({
        "global": { "appPath": "app", "api": { "hostname": "localhost" } },
        "sdks": { "python": {} }
    });
    let config = store
        .parse_str(&doc.to_string(), ConfigFormat::Json)
        .unwrap();
    let merged = store.merge(&config, "python").unwrap();

    let root = dir.path().join("output").join("api-sdk");
    let root = root.to_string_lossy();
    assert_eq!(
        merged.deletion_scope.patterns(),
        &[
            format!("{}/**", root),
            format!("!{}", root),
            format!("!{}/.git", root),
        ]
    );

    let serialized = serde_json::to_value(&merged).unwrap();
    assert_eq!(serialized["delPattern"].as_array().unwrap().len(), 3);
    assert_eq!(serialized["projectName"], "api-sdk");
}

#[test]
fn test_merging_unknown_target_fails() {
    let (_dir, store) = workspace();
    let doc = json!({
        "global": { "appPath": "app", "api": { "hostname": "localhost" } },
        "sdks": { "python": {} }
    });
    let config = store
        .parse_str(&doc.to_string(), ConfigFormat::Json)
        .unwrap();
    assert!(store.merge(&config, "javascript-node").is_err());
}

#[test]
fn test_project_name_must_stay_under_dest() {
    let (_dir, store) = workspace();

    for name in ["/abs", "..", "", "nested/sdk"] {
        let doc = json!({
            "global": { "appPath": "app", "api": { "hostname": "localhost" } },
            "sdks": {
                "python": {},
                "javascript-node": { "projectName": name }
            }
        });
        let err = store
            .parse_str(&doc.to_string(), ConfigFormat::Json)
            .unwrap_err();

        match err {
            GeneratorError::SchemaValidation(violations) => {
                assert!(
                    violations
                        .iter()
                        .any(|v| v.path == "/sdks/javascript-node/projectName"),
                    "{:?} was accepted",
                    name
                );
            }
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    let doc = json!({
        "global": { "appPath": "app", "projectName": "..", "api": { "hostname": "localhost" } },
        "sdks": { "python": {} }
    });
    match store.parse_str(&doc.to_string(), ConfigFormat::Json) {
        Err(GeneratorError::SchemaValidation(violations)) => {
            assert!(violations.iter().any(|v| v.path == "/global/projectName"));
        }
        other => panic!("expected schema violation, got {:?}", other),
    }
}
