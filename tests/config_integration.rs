//! Integration tests for configuration loading and context construction.

use lambda_sql::prelude::*;
use lambda_sql::{ErrorCode, LambdaSqlConfig};
use pretty_assertions::assert_eq;

#[derive(Entity)]
#[lambda_sql(rename_all = "PascalCase")]
pub struct Person {
    pub id: i32,
    pub name: String,
}

#[derive(Entity)]
#[lambda_sql(rename_all = "PascalCase")]
pub struct Passport {
    pub id: i32,
    pub person_id: i32,
}

fn write_config(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("lambda-sql.toml");
    std::fs::write(&path, content).expect("Failed to write config");
    (dir, path)
}

/// Aliases from the file replace entity defaults; the rest keep theirs.
#[test]
fn test_config_aliases_apply_to_filters() {
    let (_dir, path) = write_config(
        r#"
        [aliases]
        Person = "per"
    "#,
    );

    let config = LambdaSqlConfig::from_file(&path).unwrap();
    let ctx = SqlContext::from_config(&config).unwrap();
    let passport_person = ctx.field(Passport::PERSON_ID).unwrap();

    let filter = ctx.filter(Person::ID).unwrap().equal_to_field(&passport_person);
    assert_eq!(filter.to_sql(), "per.Id = pa.PersonId");
}

/// Render defaults seed every filter started from the context.
#[test]
fn test_config_render_defaults() {
    let config = LambdaSqlConfig::from_toml_str(
        r#"
        [render]
        without_aliases = true
        parameter_prefix = "f_"

        [debug]
        log_filters = true
    "#,
    )
    .unwrap();
    let ctx = SqlContext::from_config(&config).unwrap();
    assert!(ctx.logs_filters());

    let filter = ctx.filter(Person::NAME).unwrap().is_null();
    assert_eq!(filter.to_sql(), "Name IS NULL");
    assert_eq!(filter.parameter_prefix(), Some("f_"));
    assert_eq!(filter.with_aliases().to_sql(), "pe.Name IS NULL");
}

/// `${VAR}` references are expanded before parsing.
#[test]
fn test_config_env_expansion() {
    // SAFETY: the variable name is unique to this test
    unsafe {
        std::env::set_var("LAMBDA_SQL_IT_PASSPORT_ALIAS", "pas");
    }
    let (_dir, path) = write_config(
        r#"
        [aliases]
        Passport = "${LAMBDA_SQL_IT_PASSPORT_ALIAS}"
    "#,
    );
    let config = LambdaSqlConfig::from_file(&path).unwrap();
    unsafe {
        std::env::remove_var("LAMBDA_SQL_IT_PASSPORT_ALIAS");
    }

    let ctx = SqlContext::from_config(&config).unwrap();
    let filter = ctx.filter(Passport::ID).unwrap().is_not_null();
    assert_eq!(filter.to_sql(), "pas.Id IS NOT NULL");
}

/// An empty file yields the default context.
#[test]
fn test_config_empty_file() {
    let (_dir, path) = write_config("");
    let config = LambdaSqlConfig::from_file(&path).unwrap();
    assert_eq!(config, LambdaSqlConfig::default());

    let ctx = SqlContext::from_config(&config).unwrap();
    assert_eq!(ctx.alias_for::<Person>(), "pe");
    assert!(!ctx.logs_filters());
}

/// Discovery reads `lambda-sql.toml` from a directory.
#[test]
fn test_config_discover() {
    let (dir, _path) = write_config("[aliases]\nPerson = \"p\"\n");
    let config = LambdaSqlConfig::discover(dir.path()).unwrap();
    assert_eq!(config.aliases.get("Person").map(String::as_str), Some("p"));
}

/// Malformed and unknown content is rejected with a configuration error.
#[test]
fn test_config_errors() {
    let err = LambdaSqlConfig::from_toml_str("[aliases\n").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);

    let err = LambdaSqlConfig::from_toml_str("[database]\nurl = \"x\"\n").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);

    let err = LambdaSqlConfig::from_toml_str("[aliases]\nPerson = \"  \"\n").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    assert!(err.display_full().contains("Person"));

    let err = LambdaSqlConfig::from_file("/definitely/missing/lambda-sql.toml").unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigurationIo);
    assert!(err.is_configuration_error());
}
