use clap::{Args, Parser, Subcommand};
use house_rental::config::AppConfig;
use house_rental::error::AppError;
use house_rental::rental::{
    parse_decimal, print_matches, CommandLoop, Console, FileStore, HouseRentalSystem,
};
use house_rental::telemetry;
use std::io;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "house-rental",
    about = "Manage rental houses, tenants, and bookings from the console",
    version
)]
struct Cli {
    #[command(flatten)]
    files: FileArgs,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the interactive menu (default command)
    Console(ConsoleArgs),
    /// Search saved houses without entering the menu
    Search(SearchArgs),
}

#[derive(Args, Debug, Default)]
struct FileArgs {
    /// Override the configured houses file
    #[arg(long, global = true)]
    houses_file: Option<PathBuf>,
    /// Override the configured tenants file
    #[arg(long, global = true)]
    tenants_file: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct ConsoleArgs {
    /// Load previously saved houses and tenants before showing the menu
    #[arg(long)]
    load: bool,
    /// Save both files when leaving the menu
    #[arg(long)]
    save_on_exit: bool,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Location to match (case-insensitive)
    #[arg(long)]
    location: String,
    /// Highest acceptable price
    #[arg(long, value_parser = parse_max_price)]
    max_price: f64,
}

fn parse_max_price(raw: &str) -> Result<f64, String> {
    parse_decimal(raw).map_err(|err| err.to_string())
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    if let Some(path) = cli.files.houses_file {
        config.storage.houses_file = path;
    }
    if let Some(path) = cli.files.tenants_file {
        config.storage.tenants_file = path;
    }

    telemetry::init(&config.telemetry)?;

    let store = FileStore::new(
        config.storage.houses_file.clone(),
        config.storage.tenants_file.clone(),
    );
    info!(
        ?config.environment,
        houses = %store.houses_path().display(),
        tenants = %store.tenants_path().display(),
        "house rental console starting"
    );

    let command = cli
        .command
        .unwrap_or_else(|| Command::Console(ConsoleArgs::default()));

    match command {
        Command::Console(args) => run_console(args, &store),
        Command::Search(args) => run_search(args, &store),
    }
}

fn run_console(args: ConsoleArgs, store: &FileStore) -> Result<(), AppError> {
    let mut system = if args.load {
        HouseRentalSystem::load(store)?
    } else {
        HouseRentalSystem::new()
    };

    let mut console = Console::new(io::stdin().lock(), io::stdout().lock());
    CommandLoop::new(&mut system, store)
        .save_on_exit(args.save_on_exit)
        .run(&mut console)?;
    Ok(())
}

fn run_search(args: SearchArgs, store: &FileStore) -> Result<(), AppError> {
    let system = HouseRentalSystem::load(store)?;
    let matches = system.search(&args.location, args.max_price);

    let mut console = Console::new(io::empty(), io::stdout().lock());
    print_matches(&mut console, &matches, &args.location, args.max_price)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_console() {
        let cli = Cli::try_parse_from(["house-rental"]).expect("bare invocation parses");
        assert!(cli.command.is_none());
        assert!(cli.files.houses_file.is_none());
    }

    #[test]
    fn console_flags_and_file_overrides_parse() {
        let cli = Cli::try_parse_from([
            "house-rental",
            "console",
            "--load",
            "--save-on-exit",
            "--houses-file",
            "/tmp/h.txt",
        ])
        .expect("console flags parse");

        assert_eq!(cli.files.houses_file, Some(PathBuf::from("/tmp/h.txt")));
        match cli.command {
            Some(Command::Console(args)) => {
                assert!(args.load);
                assert!(args.save_on_exit);
            }
            other => panic!("expected console command, got {other:?}"),
        }
    }

    #[test]
    fn search_requires_a_finite_max_price() {
        let cli = Cli::try_parse_from([
            "house-rental",
            "search",
            "--location",
            "Lagos",
            "--max-price",
            "600",
        ])
        .expect("search parses");
        match cli.command {
            Some(Command::Search(args)) => {
                assert_eq!(args.location, "Lagos");
                assert_eq!(args.max_price, 600.0);
            }
            other => panic!("expected search command, got {other:?}"),
        }

        for bad in ["cheap", "NaN"] {
            assert!(Cli::try_parse_from([
                "house-rental",
                "search",
                "--location",
                "Lagos",
                "--max-price",
                bad,
            ])
            .is_err());
        }
    }
}
