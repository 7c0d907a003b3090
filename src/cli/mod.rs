//! CLI surface for proxsync.
//!
//! Thin handlers over the library: `plan` is a read-only dry run, `apply`
//! reconciles and treats partial failure as a failed exit, `show` dumps the
//! observed records of one table.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::client::MysqlCli;
use crate::manifest::Manifest;
use crate::schema::{TableSchema, SERVERS, USERS};
use crate::{config, reconcile, Error, Result};

mod render;

#[derive(Parser, Debug)]
#[command(
    name = "proxsync",
    version,
    about = "Declarative reconciler for ProxySQL servers and users",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Machine-readable JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Config file path (default: ./proxsync.toml if present).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Errors only.
    #[arg(short = 'q', long, global = true, default_value_t = false)]
    pub quiet: bool,

    /// Debug output (repeat for more).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the mutations a manifest would apply, without applying them.
    Plan(ManifestArgs),

    /// Reconcile the backend against a manifest.
    Apply(ManifestArgs),

    /// Dump the observed records of one managed table.
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct ManifestArgs {
    /// Manifest path.
    pub manifest: PathBuf,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Which managed table to dump.
    pub table: Table,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Table {
    Servers,
    Users,
}

impl Table {
    fn schema(self) -> &'static TableSchema {
        match self {
            Table::Servers => &SERVERS,
            Table::Users => &USERS,
        }
    }
}

pub fn parse_from<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::parse_from(args)
}

pub fn run(cli: Cli) -> Result<()> {
    let cfg = config::load_or_default(cli.config.as_deref())?;
    let client = MysqlCli::from_config(&cfg);

    match cli.command {
        Commands::Plan(args) => {
            let entities = Manifest::load(&args.manifest)?.entities()?;
            let actions = reconcile::plan_only(&client, &entities)?;
            render::planned_actions(&actions, cli.json);
            Ok(())
        }
        Commands::Apply(args) => {
            let entities = Manifest::load(&args.manifest)?.entities()?;
            let report = reconcile::run(&client, &entities)?;
            render::run_report(&report, cli.json);
            let failed = report.failed();
            let total = report.outcomes.len();
            if failed > 0 {
                return Err(Error::PartialFailure { failed, total });
            }
            // Entity mutations all landed; surface a commit failure if any.
            match report.commits.into_iter().flat_map(|c| c.errors).next() {
                Some(e) => Err(e.into()),
                None => Ok(()),
            }
        }
        Commands::Show(args) => {
            let schema = args.table.schema();
            let records = reconcile::discover(&client, schema)?;
            render::observed_records(schema, &records, cli.json);
            Ok(())
        }
    }
}
