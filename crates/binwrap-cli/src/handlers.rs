//! Command handlers.
//!
//! Each handler turns [`WrapArgs`] into a [`BinWrapper`] and returns the exit
//! code the process should end with.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;
use binwrap_core::{Platform, RunOutput, WrapperConfig};
use binwrap_runtime::{
    AcquireOutcome, BinWrapError, BinWrapper, BuiltinExtractor, DownloaderConfig, HttpDownloader,
};
use tracing::debug;

use crate::parser::{Cli, Commands, WrapArgs};
use crate::progress::CliProgress;

/// Route a parsed command line to its handler.
pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Run { wrap, args } => handle_run(&wrap, &args).await,
        Commands::Path { wrap } => {
            println!("{}", build_wrapper(&wrap).path().display());
            Ok(0)
        }
        Commands::Install { wrap } => handle_install(&wrap).await,
    }
}

/// Build the library configuration described by the command line.
pub fn build_config(args: &WrapArgs) -> WrapperConfig {
    let mut builder = WrapperConfig::builder()
        .exec_name(&args.exec_name)
        .strip(args.strip);

    if !args.skip_download {
        for source in &args.sources {
            builder = builder.source(source.clone());
        }
    }
    if let Some(dest) = &args.dest {
        builder = builder.destination(dest);
    }
    for arg in &args.persistent_args {
        builder = builder.flag(arg);
    }

    builder.build()
}

/// Host platform with any `--os`/`--arch` overrides applied.
pub fn target_platform(args: &WrapArgs) -> Platform {
    let host = Platform::current();
    Platform::new(
        args.os.clone().unwrap_or(host.os),
        args.arch.clone().unwrap_or(host.arch),
    )
}

fn build_wrapper(args: &WrapArgs) -> BinWrapper {
    let mut downloader = HttpDownloader::new(DownloaderConfig::default());
    if !args.no_progress {
        downloader = downloader.with_progress(Arc::new(CliProgress::new()));
    }

    let platform = target_platform(args);
    debug!(%platform, "Selecting sources");

    BinWrapper::with_adapters(
        build_config(args),
        Arc::new(downloader),
        Arc::new(BuiltinExtractor),
    )
    .with_platform(platform)
    .with_destination_lock(args.lock)
}

async fn handle_install(args: &WrapArgs) -> anyhow::Result<i32> {
    let acquisition = build_wrapper(args).ensure_installed().await?;
    let path = acquisition.path.display();

    match acquisition.outcome {
        AcquireOutcome::Unmanaged => println!("Downloads disabled; using {path}"),
        AcquireOutcome::Found => println!("Already installed: {path}"),
        AcquireOutcome::NoUrl => println!("No download URL for this platform; using {path}"),
        AcquireOutcome::Downloaded {
            archive,
            stripped_levels,
            ..
        } => match archive {
            Some(format) if stripped_levels > 0 => println!(
                "Installed {path} (unpacked {format}, stripped {stripped_levels} level(s))"
            ),
            Some(format) => println!("Installed {path} (unpacked {format})"),
            None => println!("Installed {path}"),
        },
    }

    Ok(0)
}

async fn handle_run(args: &WrapArgs, call_args: &[String]) -> anyhow::Result<i32> {
    match build_wrapper(args).run(call_args).await {
        Ok(output) => {
            forward_output(&output)?;
            Ok(0)
        }
        Err(BinWrapError::ProcessExit { path, output }) => {
            forward_output(&output)?;
            let code = output.status.code().unwrap_or(1);
            debug!(path = %path.display(), code, "Wrapped binary failed");
            Ok(code)
        }
        Err(err) => Err(err.into()),
    }
}

/// Replay captured streams on our own stdout and stderr.
fn forward_output(output: &RunOutput) -> anyhow::Result<()> {
    io::stdout()
        .write_all(&output.stdout)
        .and_then(|()| io::stdout().flush())
        .context("failed to write wrapped stdout")?;
    io::stderr()
        .write_all(&output.stderr)
        .context("failed to write wrapped stderr")?;
    Ok(())
}
