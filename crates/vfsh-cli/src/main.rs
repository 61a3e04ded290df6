//! vfsh CLI - shell over an in-memory filesystem seeded from an archive
//!
//! Usage:
//!   vfsh --vfs vfs.zip                         # Interactive session
//!   vfsh --vfs vfs.zip --startup init.sh       # Run a script, then go interactive
//!   vfsh --vfs vfs.zip --prompt '{cwd}> '      # Custom prompt
//!   echo 'tree' | vfsh --vfs vfs.tar.gz        # Read commands from a pipe

#[cfg(feature = "interactive")]
mod editor;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io;
#[cfg(feature = "interactive")]
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vfsh::{BufReadLines, LineReader, RootStyle, Shell, ARCHIVE_ERROR_EXIT, DEFAULT_PROMPT};

/// vfsh - shell over an archive-backed virtual filesystem
#[derive(Parser, Debug)]
#[command(name = "vfsh")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Archive (ZIP, TAR or TAR.GZ) to seed the filesystem from
    #[arg(long, value_name = "PATH")]
    vfs: Option<PathBuf>,

    /// Prompt template; supports {user}, {host} and {cwd}
    #[arg(long, value_name = "TEMPLATE", default_value = DEFAULT_PROMPT)]
    prompt: String,

    /// Script executed before the interactive session
    #[arg(long, value_name = "PATH")]
    startup: Option<PathBuf>,

    /// How the root directory is shown in the prompt
    #[arg(long, value_enum, default_value_t = RootArg::Tilde)]
    root_style: RootArg,

    /// User shown in the prompt (default: $USER)
    #[arg(long)]
    user: Option<String>,

    /// Host shown in the prompt (default: $HOSTNAME)
    #[arg(long)]
    host: Option<String>,

    /// Print the startup parameters before the session starts
    #[arg(long)]
    debug: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum RootArg {
    Slash,
    Tilde,
}

impl From<RootArg> for RootStyle {
    fn from(arg: RootArg) -> Self {
        match arg {
            RootArg::Slash => RootStyle::Slash,
            RootArg::Tilde => RootStyle::Tilde,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with command output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    if args.debug {
        print!("{}", debug_params(&args));
    }

    let mut builder = Shell::builder()
        .prompt(args.prompt.as_str())
        .user(args.user.clone().unwrap_or_else(default_user))
        .host(args.host.clone().unwrap_or_else(default_host))
        .root_style(args.root_style.into());

    match &args.vfs {
        Some(path) => {
            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    eprintln!("vfsh: cannot read archive {}: {}", path.display(), e);
                    std::process::exit(ARCHIVE_ERROR_EXIT);
                }
            };
            builder = builder.archive(bytes);
        }
        None => eprintln!("vfsh: no --vfs given, starting with an empty filesystem"),
    }

    let mut shell = match builder.build() {
        Ok(shell) => shell,
        Err(e) => {
            eprintln!("vfsh: {}", e);
            std::process::exit(ARCHIVE_ERROR_EXIT);
        }
    };
    tracing::info!(nodes = shell.fs().len(), "filesystem ready");

    let startup = match &args.startup {
        Some(path) => read_startup(path)?,
        None => None,
    };

    let mut reader = line_reader()?;
    let code = shell
        .session(io::stdout(), io::stderr())
        .run(startup.as_deref(), reader.as_mut())
        .await
        .context("session failed")?;

    std::process::exit(code);
}

fn debug_params(args: &Args) -> String {
    let show = |p: &Option<PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    };
    format!(
        "[DEBUG] VFS: {}\nPrompt: {}\nStartup: {}\n\n",
        show(&args.vfs),
        args.prompt,
        show(&args.startup)
    )
}

/// Read the startup script. A missing file is reported and skipped.
fn read_startup(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(script) => Ok(Some(script)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            eprintln!("vfsh: startup script not found: {}", path.display());
            Ok(None)
        }
        Err(e) => {
            Err(e).with_context(|| format!("Failed to read startup script: {}", path.display()))
        }
    }
}

fn default_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "user".to_string())
}

/// Kernel hostname on Linux; `$HOSTNAME` is rarely exported to children.
const KERNEL_HOSTNAME: &str = "/proc/sys/kernel/hostname";

fn default_host() -> String {
    non_empty(std::env::var("HOSTNAME").ok())
        .or_else(|| non_empty(std::fs::read_to_string(KERNEL_HOSTNAME).ok()))
        .unwrap_or_else(|| "localhost".to_string())
}

fn non_empty(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// Line editor on a terminal, plain buffered lines otherwise.
fn line_reader() -> Result<Box<dyn LineReader>> {
    #[cfg(feature = "interactive")]
    if io::stdin().is_terminal() {
        return Ok(Box::new(editor::EditorReader::new()?));
    }

    Ok(Box::new(BufReadLines::new(io::stdin().lock(), io::stdout())))
}
