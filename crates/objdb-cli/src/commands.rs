use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use objdb_backend::{BackendRegistry, ObjectBackend, StoreConfig};
use objdb_ledger::AllocationState;
use objdb_schema::{InMemorySchemaRegistry, SchemaDefinition, SchemaRegistry};
use objdb_types::{ClassTag, FieldIndex, ObjectId, Record};
use serde_json::{json, Value};
use tracing::warn;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = StoreConfig::load_or_default(&cli.config)?;
    if let Some(schema) = cli.schema {
        config.schema = Some(schema);
    }
    if let Some(root) = cli.root {
        config.root = root;
    }

    let registry = BackendRegistry::with_builtin();
    match cli.command {
        Command::Create(args) => {
            let mut backend = open_backend(&registry, &config)?;
            cmd_create(backend.as_mut(), args, cli.format)
        }
        Command::Read(args) => {
            let backend = open_backend(&registry, &config)?;
            cmd_read(backend.as_ref(), args.id, cli.format)
        }
        Command::Delete(args) => {
            let mut backend = open_backend(&registry, &config)?;
            cmd_delete(backend.as_mut(), args.id, cli.format)
        }
        Command::Ledger => {
            let backend = open_backend(&registry, &config)?;
            cmd_ledger(backend.as_ref(), &config, cli.format)
        }
        Command::Reclaim => {
            let mut backend = open_backend(&registry, &config)?;
            cmd_reclaim(backend.as_mut(), cli.format)
        }
        Command::Backends => cmd_backends(&registry, &config, cli.format),
    }
}

fn open_backend(
    registry: &BackendRegistry,
    config: &StoreConfig,
) -> anyhow::Result<Box<dyn ObjectBackend>> {
    let schema = load_schema(config)?;
    registry
        .build(config, schema)
        .with_context(|| format!("opening {} backend", config.backend))
}

/// Fail the command if ledger state could not be written before exit.
fn flush_ledger(backend: &mut dyn ObjectBackend) -> anyhow::Result<()> {
    if !backend.flush_ledger() {
        anyhow::bail!("allocation ledger could not be persisted");
    }
    Ok(())
}

fn load_schema(config: &StoreConfig) -> anyhow::Result<Arc<dyn SchemaRegistry>> {
    match &config.schema {
        Some(path) => {
            let registry = SchemaDefinition::load(path)
                .and_then(SchemaDefinition::into_registry)
                .with_context(|| format!("loading schema {}", path.display()))?;
            Ok(Arc::new(registry))
        }
        None => {
            warn!("no schema configured; every class tag will be unknown");
            Ok(Arc::new(InMemorySchemaRegistry::new()))
        }
    }
}

fn cmd_create(
    backend: &mut dyn ObjectBackend,
    args: CreateArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut record = Record::new(ClassTag(args.class));
    for (index, value) in args.fields {
        record.set(FieldIndex(index), value);
    }
    let id = backend.create(&record)?;
    flush_ledger(backend)?;
    match format {
        OutputFormat::Text => println!(
            "{} Created object {}",
            "✓".green().bold(),
            id.to_string().yellow()
        ),
        OutputFormat::Json => println!("{}", json!({ "id": id })),
    }
    Ok(())
}

fn cmd_read(
    backend: &dyn ObjectBackend,
    id: ObjectId,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let Some(record) = backend.read(id)? else {
        anyhow::bail!("object {id} not found");
    };
    match format {
        OutputFormat::Text => {
            println!(
                "Object {}  class {}",
                id.to_string().yellow().bold(),
                record.class_tag.to_string().cyan()
            );
            for (index, value) in &record.fields {
                println!("  field {:>5}: {}", index.to_string().bold(), hex::encode(value));
            }
        }
        OutputFormat::Json => println!("{}", record_json(id, &record)),
    }
    Ok(())
}

fn cmd_delete(
    backend: &mut dyn ObjectBackend,
    id: ObjectId,
    format: OutputFormat,
) -> anyhow::Result<()> {
    backend.delete(id)?;
    flush_ledger(backend)?;
    match format {
        OutputFormat::Text => println!(
            "{} Deleted object {}",
            "✓".green().bold(),
            id.to_string().yellow()
        ),
        OutputFormat::Json => println!("{}", json!({ "deleted": id })),
    }
    Ok(())
}

fn cmd_ledger(
    backend: &dyn ObjectBackend,
    config: &StoreConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let state = backend.allocation_state();
    match format {
        OutputFormat::Text => {
            println!("Range:   [{}, {}]", config.min_id, config.max_id);
            println!("Next id: {}", state.next_id.to_string().bold());
            if state.free_ids.is_empty() {
                println!("Free:    {}", "none".dimmed());
            } else {
                println!("Free:    {}", join_ids(state.free_ids.iter()));
            }
        }
        OutputFormat::Json => println!("{}", ledger_json(config, &state)),
    }
    Ok(())
}

fn cmd_reclaim(backend: &mut dyn ObjectBackend, format: OutputFormat) -> anyhow::Result<()> {
    let reclaimed = backend.reclaim_leaked()?;
    flush_ledger(backend)?;
    match format {
        OutputFormat::Text if reclaimed.is_empty() => {
            println!("{} No leaked identifiers.", "✓".green())
        }
        OutputFormat::Text => println!(
            "{} Reclaimed {} identifiers: {}",
            "✓".green().bold(),
            reclaimed.len(),
            join_ids(reclaimed.iter())
        ),
        OutputFormat::Json => println!("{}", json!({ "reclaimed": reclaimed })),
    }
    Ok(())
}

fn cmd_backends(
    registry: &BackendRegistry,
    config: &StoreConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for name in registry.names() {
                if name == config.backend {
                    println!("* {}", name.green().bold());
                } else {
                    println!("  {name}");
                }
            }
        }
        OutputFormat::Json => println!(
            "{}",
            json!({ "backends": registry.names(), "selected": config.backend })
        ),
    }
    Ok(())
}

fn join_ids<'a>(ids: impl Iterator<Item = &'a ObjectId>) -> String {
    ids.map(ObjectId::to_string).collect::<Vec<_>>().join(", ")
}

fn record_json(id: ObjectId, record: &Record) -> Value {
    let fields: serde_json::Map<String, Value> = record
        .fields
        .iter()
        .map(|(index, value)| (index.to_string(), Value::String(hex::encode(value))))
        .collect();
    json!({ "id": id, "class": record.class_tag, "fields": fields })
}

fn ledger_json(config: &StoreConfig, state: &AllocationState) -> Value {
    json!({
        "min_id": config.min_id,
        "max_id": config.max_id,
        "next_id": state.next_id,
        "free_ids": state.free_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::BTreeSet;
    use std::ffi::OsStr;

    const AVATAR_SCHEMA: &str = r#"
[[class]]
tag = 1
name = "Avatar"
fields = [ { index = 0, name = "setName" } ]
"#;

    #[test]
    fn record_json_hex_fields() {
        let record = Record::new(ClassTag(4))
            .with_field(0, b"Bob".to_vec())
            .with_field(2, vec![]);
        assert_eq!(
            record_json(ObjectId::new(9), &record),
            json!({ "id": 9, "class": 4, "fields": { "0": "426f62", "2": "" } })
        );
    }

    #[test]
    fn ledger_json_shape() {
        let state = AllocationState {
            next_id: 5,
            free_ids: [2, 7].into_iter().map(ObjectId::new).collect::<BTreeSet<_>>(),
        };
        let config = StoreConfig { min_id: 1, max_id: 10, ..StoreConfig::default() };
        assert_eq!(
            ledger_json(&config, &state),
            json!({ "min_id": 1, "max_id": 10, "next_id": 5, "free_ids": [2, 7] })
        );
    }

    #[test]
    fn load_schema_from_file_and_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.toml");
        std::fs::write(&path, AVATAR_SCHEMA).unwrap();

        let config = StoreConfig { schema: Some(path), ..StoreConfig::default() };
        let schema = load_schema(&config).unwrap();
        assert!(schema.resolve_class(ClassTag(1)).is_some());

        let schema = load_schema(&StoreConfig::default()).unwrap();
        assert!(schema.class_tags().is_empty());
    }

    #[test]
    fn create_read_delete_through_commands() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("schema.toml");
        std::fs::write(&schema_path, AVATAR_SCHEMA).unwrap();
        let config = StoreConfig {
            root: dir.path().join("objs"),
            schema: Some(schema_path),
            min_id: 10,
            max_id: 20,
            ..StoreConfig::default()
        };
        let registry = BackendRegistry::with_builtin();
        let mut backend = registry.build(&config, load_schema(&config).unwrap()).unwrap();

        let args = CreateArgs { class: 1, fields: vec![(0, b"Bob".to_vec())] };
        cmd_create(backend.as_mut(), args, OutputFormat::Json).unwrap();
        cmd_read(backend.as_ref(), ObjectId::new(10), OutputFormat::Json).unwrap();
        cmd_delete(backend.as_mut(), ObjectId::new(10), OutputFormat::Text).unwrap();

        assert!(cmd_read(backend.as_ref(), ObjectId::new(10), OutputFormat::Text).is_err());
        assert!(backend.allocation_state().free_ids.contains(&ObjectId::new(10)));
    }

    /// Backend whose ledger never reaches the medium.
    #[derive(Debug)]
    struct Unflushable(Box<dyn ObjectBackend>);

    impl ObjectBackend for Unflushable {
        fn create(&mut self, record: &Record) -> objdb_backend::BackendResult<ObjectId> {
            self.0.create(record)
        }
        fn read(&self, id: ObjectId) -> objdb_backend::BackendResult<Option<Record>> {
            self.0.read(id)
        }
        fn delete(&mut self, id: ObjectId) -> objdb_backend::BackendResult<()> {
            self.0.delete(id)
        }
        fn allocation_state(&self) -> AllocationState {
            self.0.allocation_state()
        }
        fn reclaim_leaked(&mut self) -> objdb_backend::BackendResult<Vec<ObjectId>> {
            self.0.reclaim_leaked()
        }
        fn flush_ledger(&mut self) -> bool {
            false
        }
    }

    #[test]
    fn mutating_commands_fail_when_ledger_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("schema.toml");
        std::fs::write(&schema_path, AVATAR_SCHEMA).unwrap();
        let config = StoreConfig {
            backend: "memory".into(),
            schema: Some(schema_path),
            ..StoreConfig::default()
        };
        let inner = BackendRegistry::with_builtin()
            .build(&config, load_schema(&config).unwrap())
            .unwrap();
        let mut backend = Unflushable(inner);

        let args = CreateArgs { class: 1, fields: vec![] };
        let err = cmd_create(&mut backend, args, OutputFormat::Json).unwrap_err();
        assert!(err.to_string().contains("could not be persisted"));
        assert!(cmd_reclaim(&mut backend, OutputFormat::Json).is_err());
    }

    fn parse(command: &str, config: &std::path::Path, schema: &std::path::Path) -> Cli {
        Cli::try_parse_from([
            OsStr::new("objdb"),
            OsStr::new(command),
            OsStr::new("--config"),
            config.as_os_str(),
            OsStr::new("--schema"),
            schema.as_os_str(),
        ])
        .unwrap()
    }

    #[test]
    fn backends_command_opens_no_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("objdb.toml");
        let missing_schema = dir.path().join("missing.toml");

        run_command(parse("backends", &config, &missing_schema)).unwrap();
        assert!(run_command(parse("ledger", &config, &missing_schema)).is_err());
    }
}
