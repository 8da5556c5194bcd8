//! Command-line definition for the `binwrap` tool.
//!
//! Every subcommand shares [`WrapArgs`], which describes the wrapped binary
//! the same way a library caller would describe it with
//! `WrapperConfig::builder()`.

use std::path::PathBuf;

use binwrap_core::Source;
use clap::{Args, Parser, Subcommand};

/// Download, cache and run third-party command-line binaries.
#[derive(Parser, Debug)]
#[command(name = "binwrap")]
#[command(about = "Download, cache and run third-party command-line binaries")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install the binary if needed, then run it
    Run {
        #[command(flatten)]
        wrap: WrapArgs,

        /// Arguments passed to the binary after any --arg values
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
        args: Vec<String>,
    },

    /// Print the path the binary resolves to for this platform
    Path {
        #[command(flatten)]
        wrap: WrapArgs,
    },

    /// Download and unpack the binary without running it
    Install {
        #[command(flatten)]
        wrap: WrapArgs,
    },
}

/// Options describing the wrapped binary.
#[derive(Args, Debug, Clone)]
pub struct WrapArgs {
    /// Download source, optionally restricted to a platform. Repeatable; the
    /// first source matching the platform is used.
    #[arg(
        long = "src",
        value_name = "URL[,os=OS][,arch=ARCH][,exec=PATH]",
        value_parser = parse_source
    )]
    pub sources: Vec<Source>,

    /// Directory to download and unpack into
    #[arg(long, env = "BINWRAP_DEST")]
    pub dest: Option<PathBuf>,

    /// Executable name inside the destination
    #[arg(long = "exec", env = "BINWRAP_EXEC")]
    pub exec_name: String,

    /// Leading archive directories to flatten after extraction
    #[arg(long, env = "BINWRAP_STRIP", default_value_t = 0)]
    pub strip: usize,

    /// Never download; run the configured path as-is
    #[arg(long)]
    pub skip_download: bool,

    /// Argument always passed before the call arguments. Repeatable.
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    pub persistent_args: Vec<String>,

    /// Serialize installs into the same destination within this process
    #[arg(long)]
    pub lock: bool,

    /// Select sources for this OS instead of the host's
    #[arg(long)]
    pub os: Option<String>,

    /// Select sources for this architecture instead of the host's
    #[arg(long)]
    pub arch: Option<String>,

    /// Do not draw a download progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Parse `URL[,os=OS][,arch=ARCH][,exec=PATH]` into a [`Source`].
///
/// An empty URL yields a source that matches but never downloads.
pub fn parse_source(spec: &str) -> Result<Source, String> {
    let mut parts = spec.split(',');
    let url = parts.next().unwrap_or_default().trim();

    let mut source = Source::new();
    if !url.is_empty() {
        source = source.with_url(url);
    }

    for part in parts {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| format!("expected key=value after the URL, got `{part}`"))?;
        let value = value.trim();
        source = match key.trim() {
            "os" => source.for_os(value),
            "arch" => source.for_arch(value),
            "exec" => source.with_exec_path(value),
            other => {
                return Err(format!(
                    "unknown source attribute `{other}` (expected os, arch or exec)"
                ));
            }
        };
    }

    Ok(source)
}
