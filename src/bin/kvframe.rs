//! kvframe CLI
//!
//! Copies or inspects delimited key/value/ttl files.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use kvframe::pipeline::{copy_file, count_records};
use kvframe::progress::{Progress, Silent, Ticker};
use kvframe::{CancelToken, Config, PartialRecordPolicy};
use tracing_subscriber::{fmt, EnvFilter};

/// kvframe
#[derive(Parser, Debug)]
#[command(name = "kvframe")]
#[command(about = "Read and write delimited key/value/ttl dump files")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    opts: Opts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct Opts {
    /// Suppress progress markers
    #[arg(short, long, global = true)]
    silent: bool,

    /// Drop ttl values instead of passing them through
    #[arg(long, global = true)]
    no_ttl: bool,

    /// Fail on a record cut short by end of file instead of padding it
    #[arg(long, global = true)]
    strict: bool,

    /// Maximum field size in bytes (exclusive)
    #[arg(long, global = true, default_value = "1048576")]
    max_token_size: usize,

    /// Batches in flight between reader and writer
    #[arg(long, global = true, default_value = "1")]
    bus_capacity: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Re-encode a file, dropping records with oversize fields
    Copy {
        /// Existing source file
        src: PathBuf,

        /// Destination file (truncated)
        dst: PathBuf,
    },

    /// Count the records in a file
    Count {
        /// File to scan
        file: PathBuf,
    },
}

fn main() {
    // Logs go to stderr so progress markers on stdout stay readable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,kvframe=info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();

    tracing::debug!("kvframe v{}", kvframe::VERSION);

    let policy = if cli.opts.strict {
        PartialRecordPolicy::Reject
    } else {
        PartialRecordPolicy::Pad
    };

    let config = match Config::builder()
        .silent(cli.opts.silent)
        .forward_ttl(!cli.opts.no_ttl)
        .partial_record(policy)
        .max_token_size(cli.opts.max_token_size)
        .bus_capacity(cli.opts.bus_capacity)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(2);
        }
    };

    let cancel = CancelToken::new();
    if let Err(e) = cancel.cancel_on_interrupt() {
        tracing::warn!("Ctrl-C will not cancel cleanly: {}", e);
    }

    let result = match cli.command {
        Commands::Copy { src, dst } => {
            let progress: Arc<dyn Progress> = if config.silent {
                Arc::new(Silent)
            } else {
                Arc::new(Ticker::stdout())
            };
            copy_file(&src, &dst, &config, &cancel, progress).map(|summary| {
                tracing::info!(
                    records = summary.write.records,
                    rejected = summary.write.rejected,
                    bytes = summary.write.bytes,
                    "Copy complete"
                );
            })
        }
        Commands::Count { file } => count_records(&file, &config, &cancel).map(|records| {
            println!("{}", records);
        }),
    };

    match result {
        Ok(()) => {}
        Err(e) if e.is_cancelled() => {
            tracing::warn!("Interrupted, buffered output was flushed");
            std::process::exit(130);
        }
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}
