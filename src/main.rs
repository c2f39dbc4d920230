use clap::Parser;
use kitsupass::cli::commands;
use kitsupass::cli::{Cli, Commands};
use kitsupass::logging;

fn main() {
    let cli = Cli::parse();

    logging::init(match cli.command {
        Commands::Serve { .. } => logging::SERVE_LEVEL,
        _ => logging::CLI_LEVEL,
    });

    let result = match cli.command {
        Commands::Init => commands::init::execute(&cli),
        Commands::Show { ref name } => commands::show::execute(&cli, name.as_deref()),
        Commands::Find { ref needle } => commands::find::execute(&cli, needle),
        Commands::Insert { ref name, stdin } => commands::insert::execute(&cli, name, stdin),
        Commands::Edit { ref name, stdin } => commands::edit::execute(&cli, name, stdin),
        Commands::Delete { ref name, force } => commands::delete::execute(&cli, name, force),
        Commands::Move {
            ref name,
            ref new_name,
        } => commands::move_cmd::execute(&cli, name, new_name),
        Commands::Copy {
            ref name,
            ref new_name,
        } => commands::copy::execute(&cli, name, new_name),
        Commands::Lock => commands::lock::execute(&cli),
        Commands::Serve { ref addr } => commands::serve::execute(&cli, addr.as_deref()),
        Commands::Version => commands::version::execute(),
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        kitsupass::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
