use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use sqlitediff::{generate_migration, DiffOptions};

/// Generate a script migrating one SQLite schema to another
#[derive(Parser)]
#[command(name = "sqlitediff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database with the old schema (paths ending in `sql` are read as scripts)
    from: PathBuf,

    /// Database with the new schema (paths ending in `sql` are read as scripts)
    to: PathBuf,

    /// Log progress to stderr (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Prefixes every log line with `-- ` so logs stay valid SQL.
struct SqlComment<F>(F);

impl<S, N, F> FormatEvent<S, N> for SqlComment<F>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
    F: FormatEvent<S, N>,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        writer.write_str("-- ")?;
        self.0.format_event(ctx, writer, event)
    }
}

/// Build the log subscriber. ANSI colours are off since the output is
/// meant to be pasted into SQL.
fn log_subscriber<W>(
    env_filter: EnvFilter,
    detailed: bool,
    writer: W,
) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let event_format = tracing_subscriber::fmt::format()
        .without_time()
        .with_target(detailed)
        .with_line_number(detailed);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .event_format(SqlComment(event_format))
        .finish()
}

fn setup_logging(verbose: u8) {
    let rust_log = std::env::var_os("RUST_LOG").is_some();
    if verbose == 0 && !rust_log {
        return;
    }

    let default_level = if verbose > 1 { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    log_subscriber(env_filter, verbose > 1, std::io::stderr).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let options = DiffOptions {
        from: cli.from,
        to: cli.to,
    };

    let script = generate_migration(&options)?;
    println!("{}", script);

    Ok(())
}
