use clap::Parser;
use dispatcher::cli::{
    handle_completions, handle_config_init, handle_council, handle_exec, handle_status, Cli,
    Commands, ConfigCommands,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Exec(args) => handle_exec(&args).await,
        Commands::Council(args) => handle_council(&args).await,
        Commands::Status(args) => handle_status(&args).await,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
