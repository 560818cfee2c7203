//! `flix` command line entry point.
//!
//! # Responsibility
//! - Populate a catalogue database from CSV sources.
//! - Print catalogue statistics for quick local checks.

use clap::{Parser, Subcommand};
use flix_core::{
    init_from_config, is_store_empty, open_db, populate, CatalogRepository, FlixConfig,
    SqliteCatalogRepository,
};
use log::error;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "flix", version, about = "CS235Flix catalogue tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load the CSV sources into an empty database.
    Populate {
        /// Directory holding movies.csv, actors.csv, directors.csv, users.csv
        /// and comments.csv.
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        database: Option<PathBuf>,
    },
    /// Print row counts and the first and last movie.
    Stats {
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = FlixConfig::from_env()?;
    init_from_config(&config)?;

    match cli.command {
        Command::Populate { data_dir, database } => {
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir;
            }
            if let Some(database) = database {
                config.database_path = database;
            }
            run_populate(&config.database_path, &config.data_dir)
        }
        Command::Stats { database } => {
            if let Some(database) = database {
                config.database_path = database;
            }
            run_stats(&config)
        }
    }
}

fn run_populate(database_path: &Path, data_dir: &Path) -> Result<(), Box<dyn Error>> {
    let conn = open_db(database_path)?;
    let summary = populate(&conn, data_dir)?;
    println!(
        "populated {}: {} movies, {} actors, {} directors, {} genres, {} users, {} reviews",
        database_path.display(),
        summary.movies,
        summary.actors,
        summary.directors,
        summary.genres,
        summary.users,
        summary.reviews
    );
    Ok(())
}

fn run_stats(config: &FlixConfig) -> Result<(), Box<dyn Error>> {
    let conn = open_db(&config.database_path)?;
    if config.populate_on_startup && is_store_empty(&conn)? {
        populate(&conn, &config.data_dir)?;
    }

    let repo = SqliteCatalogRepository::try_new(&conn)?;
    println!("movies:    {}", repo.get_number_of_movies()?);
    println!("actors:    {}", repo.get_actors()?.len());
    println!("directors: {}", repo.get_directors()?.len());
    println!("genres:    {}", repo.get_genres()?.len());
    println!("reviews:   {}", repo.get_reviews()?.len());
    if let Some(movie) = repo.get_first_movie()? {
        println!("first:     {} ({})", movie.title, movie.release_year);
    }
    if let Some(movie) = repo.get_last_movie()? {
        println!("last:      {} ({})", movie.title, movie.release_year);
    }
    Ok(())
}
