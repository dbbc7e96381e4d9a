//! CLI command implementations

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tracing::info;

use crate::config::CompilerConfig;
use crate::error::Error;
use crate::model::Model;
use crate::schema::{read_node, CompiledArtifact, Compiler, SchemaLoader};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_records, write_line, write_response};

/// Run a CLI command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Compile { config, files } => compile(config.as_deref(), &files),
        Command::Validate { config, entity } => validate(config.as_deref(), &entity),
    }
}

/// Loads the configuration, or the defaults when no file is given
fn load_config(path: Option<&Path>) -> CliResult<CompilerConfig> {
    match path {
        Some(path) => Ok(CompilerConfig::load(path)?),
        None => Ok(CompilerConfig::default()),
    }
}

/// Compile entity files and print the artifacts as one JSON response
pub fn compile(config_path: Option<&Path>, files: &[PathBuf]) -> CliResult<()> {
    let config = load_config(config_path)?;
    let artifacts = compile_entities(&config, files)?;

    info!(count = artifacts.len(), "compiled entities");
    write_response(serde_json::to_value(&artifacts)?)
}

/// Compiles the given files, or every file of the configured schema directory
pub fn compile_entities(config: &CompilerConfig, files: &[PathBuf]) -> CliResult<Vec<CompiledArtifact>> {
    let loader = match (files.is_empty(), &config.schema_dir) {
        (false, _) => {
            let mut loader = SchemaLoader::with_shared(Path::new("."), config.shared_schemas());
            for file in files {
                loader.load_file(file)?;
            }
            loader
        }
        (true, Some(dir)) => {
            let mut loader = SchemaLoader::with_shared(dir, config.shared_schemas());
            loader.load_all()?;
            loader
        }
        (true, None) => {
            return Err(CliError::config_error(
                "No entity files given and no schema_dir configured",
            ))
        }
    };

    let compiler = Compiler::new(config.clone())?;
    let artifacts = loader
        .all_schemas()
        .map(|node| compiler.compile(node))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(artifacts)
}

/// Validate stdin records against one entity
pub fn validate(config_path: Option<&Path>, entity: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let node = read_node(entity, &config.shared_schemas())?;
    let model = Compiler::new(config)?.define(&node)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let (failed, total) = validate_records(&model, stdin.lock(), &mut stdout)?;

    info!(entity = model.name(), failed, total, "validated records");
    if failed > 0 {
        return Err(CliError::validation_failed(failed, total));
    }
    Ok(())
}

/// Validates every record of `reader`, writing one verdict line per record.
///
/// Returns the number of failed records and the total.
pub fn validate_records<R: BufRead, W: Write>(
    model: &Model,
    reader: R,
    out: &mut W,
) -> CliResult<(usize, usize)> {
    let mut failed = 0;
    let mut total = 0;

    for record in read_records(reader) {
        let record = record?;
        total += 1;

        let verdict = match model.validate_props(&record) {
            Ok(()) => json!({"status": "ok"}),
            Err(Error::Validation(e)) => invalid(e.message(), serde_json::to_value(e.errors())?),
            Err(Error::Schema(e)) if !e.is_fatal() => invalid(e.message(), Value::Array(Vec::new())),
            Err(e) => return Err(e.into()),
        };

        if verdict["status"] != "ok" {
            failed += 1;
        }
        write_line(out, &verdict)?;
    }

    Ok((failed, total))
}

fn invalid(message: &str, errors: Value) -> Value {
    json!({"status": "invalid", "message": message, "errors": errors})
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use crate::schema::builtin_schemas;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn write_entity(dir: &Path, file: &str, title: &str) -> PathBuf {
        let path = dir.join(file);
        fs::write(
            &path,
            json!({
                "title": title,
                "required": ["id"],
                "properties": {
                    "id": {"type": "integer", "minimum": 1, "primaryKey": true},
                    "email": {"type": "string", "maxLength": 64},
                },
                "tableName": title.to_lowercase(),
            })
            .to_string(),
        )
        .unwrap();
        path
    }

    #[test]
    fn test_compile_files() {
        let dir = TempDir::new().unwrap();
        let user = write_entity(dir.path(), "user.json", "User");
        let team = write_entity(dir.path(), "team.json", "Team");

        let artifacts = compile_entities(&CompilerConfig::default(), &[user, team]).unwrap();
        let names: Vec<&str> = artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["User", "Team"]);
        assert_eq!(artifacts[0].columns["email"].data_type.to_string(), "STRING(64)");
    }

    #[test]
    fn test_compile_schema_dir() {
        let dir = TempDir::new().unwrap();
        write_entity(dir.path(), "a.json", "User");
        let config = CompilerConfig {
            schema_dir: Some(dir.path().to_path_buf()),
            ..CompilerConfig::default()
        };

        let artifacts = compile_entities(&config, &[]).unwrap();
        assert_eq!(artifacts.len(), 1);
    }

    #[test]
    fn test_compile_expands_extra_schemas() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("contact.json");
        fs::write(
            &path,
            json!({
                "title": "Contact",
                "required": ["email", "since"],
                "properties": {"email": "Email", "since": "DATE"}
            })
            .to_string(),
        )
        .unwrap();

        let config: CompilerConfig = serde_json::from_value(json!({
            "extra_schemas": {"Email": {"type": "string", "format": "email", "dataType": "CITEXT"}}
        }))
        .unwrap();

        let artifacts = compile_entities(&config, &[path]).unwrap();
        let contact = &artifacts[0];
        assert_eq!(contact.columns["email"].data_type.to_string(), "CITEXT");
        assert_eq!(contact.columns["since"].data_type.to_string(), "DATE");
        assert_eq!(
            contact.schema["properties"],
            json!({"email": {"type": "string", "format": "email"}, "since": {"type": "string"}})
        );
    }

    #[test]
    fn test_compile_without_sources() {
        let err = compile_entities(&CompilerConfig::default(), &[]).unwrap_err();
        assert_eq!(err.code_str(), "CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_duplicate_entity_files() {
        let dir = TempDir::new().unwrap();
        let a = write_entity(dir.path(), "a.json", "User");
        let b = write_entity(dir.path(), "b.json", "User");

        let err = compile_entities(&CompilerConfig::default(), &[a, b]).unwrap_err();
        assert!(err.message().contains("SCHEMA_DUPLICATE"));
    }

    #[test]
    fn test_validate_records() {
        let dir = TempDir::new().unwrap();
        let path = write_entity(dir.path(), "user.json", "User");
        let model = Compiler::new(CompilerConfig::default())
            .unwrap()
            .define(&read_node(&path, &builtin_schemas()).unwrap())
            .unwrap();

        let input = Cursor::new("{\"id\": 1}\n{\"id\": 0}\n{\"ghost\": true}\n");
        let mut out = Vec::new();
        let (failed, total) = validate_records(&model, input, &mut out).unwrap();

        assert_eq!((failed, total), (2, 3));
        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["status"], "ok");
        assert_eq!(lines[1]["status"], "invalid");
        assert!(lines[1]["message"].as_str().unwrap().starts_with("id "));
        assert_eq!(lines[2]["status"], "invalid");
    }
}
