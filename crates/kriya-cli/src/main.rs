use clap::{CommandFactory, Parser, Subcommand};

mod audio;
mod commands;

#[derive(Parser)]
#[command(name = "kriya", version, about = "Kirtan Kriya meditation timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a meditation session in the foreground
    Run(commands::run::RunArgs),
    /// Print current timer and sound state as JSON
    Status,
    /// List the five phases of the cycle
    Phases {
        /// Override the stored interval multiplier (0.25, 0.5, 0.75, 1)
        #[arg(long)]
        multiplier: Option<f64>,
    },
    /// Settings management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Status => commands::status::run(),
        Commands::Phases { multiplier } => commands::phases::run(multiplier),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "kriya", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
