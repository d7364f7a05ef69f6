//! kc-wipe command line - securely destroy one file
//!
//! The wipe itself runs on a worker thread; this thread prints status,
//! redraws progress and turns Ctrl-C into a cancellation request.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use clap::Parser;
use kc_wipe::utils::logging;
use kc_wipe::{WipeError, WipeEvent, Wiper, load_config, spawn_wipe};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Command-line interface definition
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "Encrypts a file in place, overwrites it with the 35-pass Gutmann sequence, scrambles its timestamps and removes it."
)]
struct Cli {
    /// File to destroy
    path: PathBuf,

    /// JSON policy file (defaults to <executable>.config when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            exit(1);
        }
    };
    logging::init(&config.log_level);

    if !cli.path.is_file() {
        eprintln!("❌ File does not exist: {}", cli.path.display());
        exit(1);
    }

    if !cli.yes {
        match confirm(&cli.path) {
            Ok(true) => {}
            Ok(false) => {
                eprintln!("Skipping {}", cli.path.display());
                exit(0);
            }
            Err(e) => {
                eprintln!("❌ Failed to read confirmation: {}", e);
                exit(1);
            }
        }
    }

    if let Err(e) = install_interrupt_handler() {
        eprintln!("⚠️  Could not install Ctrl-C handler: {}", e);
    }

    let handle = match spawn_wipe(Wiper::new(config), cli.path.clone()) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("❌ {}", e);
            exit(1);
        }
    };

    let mut progress_shown = false;
    loop {
        match handle.events().recv_timeout(Duration::from_millis(100)) {
            Ok(WipeEvent::Status(line)) => {
                if progress_shown {
                    eprintln!();
                    progress_shown = false;
                }
                eprintln!("{}", line);
            }
            Ok(WipeEvent::Progress(state)) => {
                eprint!("\r{}    ", state);
                progress_shown = true;
            }
            Ok(WipeEvent::ProgressCleared) => {
                if progress_shown {
                    eprintln!();
                    progress_shown = false;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if INTERRUPTED.swap(false, Ordering::SeqCst) {
            eprintln!("\n🛑 Interrupt received, stopping at the next checkpoint...");
            handle.cancel();
        }
    }

    match handle.join() {
        Ok(report) => {
            eprintln!(
                "✅ {} destroyed ({} bytes, {} passes) in {}s",
                report.original_path.display(),
                report.bytes,
                report.passes,
                report.elapsed.as_secs()
            );
            exit(0);
        }
        Err(WipeError::Cancelled { checkpoint }) => {
            eprintln!("🛑 Cancelled; file left at: {}", checkpoint);
            exit(130);
        }
        Err(e) => {
            eprintln!("❌ {} failed: {}", e.stage(), e);
            exit(1);
        }
    }
}

fn confirm(path: &Path) -> io::Result<bool> {
    eprint!(
        "⚠️  Permanently destroy '{}'? This cannot be undone [y/N]: ",
        path.display()
    );
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[cfg(unix)]
extern "C" fn on_interrupt(_signal: nix::libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

#[cfg(unix)]
fn install_interrupt_handler() -> nix::Result<()> {
    use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

    let action = SigAction::new(
        SigHandler::Handler(on_interrupt),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // SAFETY: the handler only stores to an atomic
    unsafe { sigaction(Signal::SIGINT, &action) }?;
    Ok(())
}

#[cfg(not(unix))]
fn install_interrupt_handler() -> io::Result<()> {
    Ok(())
}
