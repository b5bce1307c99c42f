//! MOTORPOOL - Vehicle Registry Shell
//! Opens the file-backed registry and runs the interactive shell.

use std::path::PathBuf;

use clap::Parser;

use motorpool::config::Config;
use motorpool::input::InputCoordinator;
use motorpool::shell::Shell;

#[derive(Parser, Debug)]
#[command(name = "motorpool", version, about = "Multi-user vehicle registry shell")]
struct Cli {
    /// Directory holding the vehicle, sequence and user files.
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    /// Skip fsync after store writes.
    #[arg(long)]
    no_sync: bool,

    /// Number of command names kept by `history`.
    #[arg(long, default_value_t = 8)]
    history: usize,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    println!();
    println!("  ╔═══════════════════════════════════════════╗");
    println!("  ║            MOTORPOOL Registry             ║");
    println!("  ║      Multi-user vehicle store v1.0.0      ║");
    println!("  ╚═══════════════════════════════════════════╝");
    println!();
    println!("  Type 'help' for commands, 'register' or 'login' to start.");
    println!();

    let config = Config::new(cli.data_dir)
        .with_sync_writes(!cli.no_sync)
        .with_history_capacity(cli.history);

    let mut shell = match Shell::open(&config, InputCoordinator::stdio()) {
        Ok(shell) => shell,
        Err(err) => {
            eprintln!("[ERROR] Failed to open registry: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = shell.run() {
        eprintln!("[ERROR] {}", err);
        std::process::exit(1);
    }
    println!("  Shutting down MOTORPOOL...");
}
