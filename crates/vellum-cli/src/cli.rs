use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vellum",
    about = "Vellum: versioned, content-addressed storage",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Data directory holding objects and the chain head
    #[arg(short = 'd', long, global = true, default_value = ".vellum")]
    pub data_dir: PathBuf,

    /// TOML config file; overrides --data-dir
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a new version of a record
    Write(WriteArgs),
    /// Print the payload of the latest version of a record
    Read(ReadArgs),
    /// Print the raw stored bytes of an object
    Raw(RawArgs),
    /// List blocks, newest first
    Blocks(BlocksArgs),
    /// Search indexed versions
    Search(SearchArgs),
    /// Verify block chain integrity
    Verify(VerifyArgs),
    /// Serve this data directory over HTTP
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct WriteArgs {
    pub id: String,
    /// File to read the payload from; stdin when omitted or "-"
    pub file: Option<PathBuf>,
    /// Indexed field, as key=value
    #[arg(short, long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
    /// Version to replace instead of the latest indexed one
    #[arg(long)]
    pub previous: Option<String>,
    /// Keep the current version when the payload is unchanged
    #[arg(long)]
    pub ignore_duplicate: bool,
}

#[derive(Args)]
pub struct ReadArgs {
    /// Record id, or a content ref with --hash
    pub id: String,
    #[arg(long)]
    pub hash: bool,
    /// Print the version's metadata instead of its payload
    #[arg(long)]
    pub meta: bool,
    /// Also list older versions (with --meta)
    #[arg(long)]
    pub history: bool,
}

#[derive(Args)]
pub struct RawArgs {
    pub hash: String,
}

#[derive(Args)]
pub struct BlocksArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Query terms, e.g. `kind:note gte:rank:3 hello`
    #[arg(required = true)]
    pub query: Vec<String>,
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
    #[arg(long)]
    pub skip: Option<usize>,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Check at most this many blocks from the head
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
    /// Also re-read each checked version's payload
    #[arg(long)]
    pub payloads: bool,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Listen address; defaults to 127.0.0.1:7420
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Server TOML file with bind_addr and data_dir
    #[arg(long)]
    pub server_config: Option<PathBuf>,
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got {s:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_write_with_fields() {
        let cli = Cli::try_parse_from([
            "vellum", "write", "doc1", "note.txt", "-f", "kind=note", "--field", "tag=a=b",
        ])
        .unwrap();
        if let Command::Write(args) = cli.command {
            assert_eq!(args.id, "doc1");
            assert_eq!(args.file, Some(PathBuf::from("note.txt")));
            assert_eq!(
                args.fields,
                vec![("kind".into(), "note".into()), ("tag".into(), "a=b".into())]
            );
            assert!(!args.ignore_duplicate);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn malformed_field_is_rejected() {
        assert!(Cli::try_parse_from(["vellum", "write", "doc1", "-f", "novalue"]).is_err());
        assert!(Cli::try_parse_from(["vellum", "write", "doc1", "-f", "=x"]).is_err());
    }

    #[test]
    fn parse_write_from_stdin() {
        let cli = Cli::try_parse_from(["vellum", "write", "doc1", "--ignore-duplicate"]).unwrap();
        if let Command::Write(args) = cli.command {
            assert!(args.file.is_none());
            assert!(args.ignore_duplicate);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_read_by_hash() {
        let cli = Cli::try_parse_from(["vellum", "read", "--hash", "--meta", "blake3-00"]).unwrap();
        if let Command::Read(args) = cli.command {
            assert!(args.hash);
            assert!(args.meta);
            assert_eq!(args.id, "blake3-00");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_search_joins_terms() {
        let cli = Cli::try_parse_from(["vellum", "search", "kind:note", "hello", "-n", "3"]).unwrap();
        if let Command::Search(args) = cli.command {
            assert_eq!(args.query, vec!["kind:note", "hello"]);
            assert_eq!(args.limit, Some(3));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn search_requires_a_query() {
        assert!(Cli::try_parse_from(["vellum", "search"]).is_err());
    }

    #[test]
    fn parse_blocks_limit() {
        let cli = Cli::try_parse_from(["vellum", "blocks", "-n", "5"]).unwrap();
        if let Command::Blocks(args) = cli.command {
            assert_eq!(args.limit, 5);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["vellum", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind.map(|b| b.port()), Some(8080));
            assert!(args.server_config.is_none());
        } else {
            panic!("wrong command");
        }
        assert!(Cli::try_parse_from(["vellum", "serve", "--bind", "nowhere"]).is_err());

        let cli = Cli::try_parse_from(["vellum", "serve", "--server-config", "server.toml"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert!(args.bind.is_none());
            assert_eq!(args.server_config, Some(PathBuf::from("server.toml")));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_global_options() {
        let cli = Cli::try_parse_from([
            "vellum", "verify", "--verbose", "-d", "/tmp/v", "--format", "json",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/v"));
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(matches!(cli.command, Command::Verify(VerifyArgs { payloads: false, .. })));
    }
}
