//! N-gram store command-line entry point.
//!
//! # Responsibility
//! - Open a store from the `ngram_db_*` environment and run one command.
//! - Print statement templates for operators provisioning databases.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use ngram_core::{
    core_version, relative_frequency_2008, DbSettings, LoggingConfig, NgramOrder, NgramStore,
    QueryTemplates, SqlDialect,
};
use std::num::NonZeroUsize;

/// Insert and look up n-gram counts in `{N}grams` tables
///
/// The database is taken from the `ngram_db_*` environment variables. Without
/// a command, opens the 1-gram store, prints where it connected and exits.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the create, insert, lookup and bulk insert statements for order N
    Sql {
        /// N-gram order
        order: NonZeroUsize,

        /// SQL flavor to render
        #[arg(value_enum, default_value_t = DialectArg::Mysql)]
        dialect: DialectArg,
    },

    /// Print every row matching the words; `%` and `_` act as wildcards
    ///
    /// The store order is the number of words given.
    Get {
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Insert one row, creating the table when missing
    Add {
        /// Occurrence count
        count: u64,

        #[arg(required = true)]
        words: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DialectArg {
    Mysql,
    Sqlite,
}

impl From<DialectArg> for SqlDialect {
    fn from(value: DialectArg) -> Self {
        match value {
            DialectArg::Mysql => SqlDialect::MySql,
            DialectArg::Sqlite => SqlDialect::Sqlite,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    LoggingConfig::from_env()
        .apply()
        .context("setting up logging")?;
    info!("event=cli_start module=cli status=ok command={:?}", cli.command);

    match cli.command {
        None => show_connection(),
        Some(Command::Sql { order, dialect }) => print_sql(order, dialect.into()),
        Some(Command::Get { words }) => get(&words),
        Some(Command::Add { count, words }) => add(count, &words),
    }
}

fn show_connection() -> anyhow::Result<()> {
    let settings = DbSettings::from_env()?;
    let mut store = NgramStore::open(NgramOrder::new(1)?, &settings)
        .with_context(|| format!("opening {settings}"))?;
    println!("ngram_core version={}", core_version());
    println!("connected {settings} table={}", store.table_name());
    store.close()?;
    Ok(())
}

fn print_sql(order: NonZeroUsize, dialect: SqlDialect) -> anyhow::Result<()> {
    let templates = QueryTemplates::new(NgramOrder::new(order.get())?, dialect);
    println!("{}", templates.create_table());
    println!("{}", templates.add());
    println!("{}", templates.get());
    println!("{}", templates.bulk_add(2));
    Ok(())
}

fn get(words: &[String]) -> anyhow::Result<()> {
    let mut store = open_for_words(words)?;
    let printed = store.get_rows(words, |rows| -> anyhow::Result<usize> {
        let mut printed = 0;
        for row in rows {
            let row = row?;
            println!(
                "{}\t{}\t{:.3e}",
                row.phrase(),
                row.count,
                relative_frequency_2008(row.count)
            );
            printed += 1;
        }
        Ok(printed)
    })??;
    info!("event=cli_get module=cli status=ok rows={printed}");
    store.close()?;
    Ok(())
}

fn add(count: u64, words: &[String]) -> anyhow::Result<()> {
    let mut store = open_for_words(words)?;
    store.ensure_table()?;
    store.add_count(words, count)?;
    println!("added {} to {}", count, store.table_name());
    store.close()?;
    Ok(())
}

fn open_for_words(words: &[String]) -> anyhow::Result<NgramStore> {
    let settings = DbSettings::from_env()?;
    let store = NgramStore::open(NgramOrder::new(words.len())?, &settings)
        .with_context(|| format!("opening {settings}"))?;
    Ok(store)
}
