use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;

/// Ambient 3D particle-field background with pointer parallax
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
  /// Run the per-frame update loop without a window (no GPU required)
  #[arg(long, default_value_t = false)]
  headless: bool,
  /// Stop a headless run after this many frames instead of on Ctrl-C
  #[arg(long)]
  frames: Option<u64>,
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Generate shell completion scripts
  Completions {
    /// The shell to generate the script for
    #[arg(value_enum)]
    shell: Shell,
  },
}

fn main() {
  env_logger::init();
  let args = Args::parse();

  if let Some(Commands::Completions { shell }) = args.command {
    let mut cmd = Args::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    return;
  }

  if args.headless {
    parallax_field::state::run_headless(args.frames);
    return;
  }

  if let Err(err) = parallax_field::state::run() {
    log::error!("particle background failed to start: {err}");
    std::process::exit(1);
  }
}
