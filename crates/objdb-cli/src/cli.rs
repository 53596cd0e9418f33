use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use objdb_types::ObjectId;

#[derive(Parser)]
#[command(
    name = "objdb",
    about = "objdb: durable object store with bounded identifier allocation",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store configuration file (defaults apply if it does not exist)
    #[arg(short, long, global = true, default_value = "objdb.toml")]
    pub config: PathBuf,

    /// Schema definition file, overriding the configured one
    #[arg(long, global = true)]
    pub schema: Option<PathBuf>,

    /// Storage root, overriding the configured one
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a new object and print its identifier
    Create(CreateArgs),
    /// Print a stored object
    Read(IdArgs),
    /// Delete an object and recycle its identifier
    Delete(IdArgs),
    /// Show identifier allocation state
    Ledger,
    /// Return leaked identifiers to the free set
    Reclaim,
    /// List available storage backends
    Backends,
}

#[derive(Args)]
pub struct CreateArgs {
    /// Class tag of the object
    #[arg(long)]
    pub class: u16,
    /// Field value as INDEX=HEX, repeatable
    #[arg(long = "field", value_parser = parse_field)]
    pub fields: Vec<(u16, Vec<u8>)>,
}

#[derive(Args)]
pub struct IdArgs {
    pub id: ObjectId,
}

/// Parse `INDEX=HEX`, e.g. `0=426f62`.
pub fn parse_field(s: &str) -> Result<(u16, Vec<u8>), String> {
    let (index, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=HEX, got {s:?}"))?;
    let index: u16 = index
        .trim()
        .parse()
        .map_err(|e| format!("bad field index {index:?}: {e}"))?;
    let value = hex::decode(value.trim()).map_err(|e| format!("bad hex value: {e}"))?;
    Ok((index, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field_ok() {
        assert_eq!(parse_field("0=426f62").unwrap(), (0, b"Bob".to_vec()));
        assert_eq!(parse_field("12=").unwrap(), (12, Vec::new()));
    }

    #[test]
    fn parse_field_errors() {
        assert!(parse_field("0").is_err());
        assert!(parse_field("x=00").is_err());
        assert!(parse_field("1=zz").is_err());
        assert!(parse_field("70000=00").is_err());
    }

    #[test]
    fn parse_create_command() {
        let cli = Cli::try_parse_from([
            "objdb", "create", "--class", "3", "--field", "0=01", "--field", "2=ff00",
        ])
        .unwrap();
        match cli.command {
            Command::Create(args) => {
                assert_eq!(args.class, 3);
                assert_eq!(args.fields, vec![(0, vec![1]), (2, vec![0xff, 0])]);
            }
            _ => panic!("expected create"),
        }
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn parse_read_rejects_reserved_id() {
        assert!(Cli::try_parse_from(["objdb", "read", "0"]).is_err());
        assert!(Cli::try_parse_from(["objdb", "read", "17", "--format", "json"]).is_ok());
    }
}
