#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! CLI lookup tool for the bookshelf metadata pipeline.
//!
//! Resolves an ISBN-13 against the configured providers (Goodreads,
//! Google Books, Hardcover) and prints the merged record. Credentials
//! are read from `GOOGLE_BOOKS_API_KEY` and `HARDCOVER_API_TOKEN`;
//! provider endpoints come from the embedded registry.

use std::path::PathBuf;

use clap::Parser;

use bookshelf_metadata::resolver::{BookResolver, Credentials};

#[derive(Parser)]
#[command(name = "bookshelf_cli", about = "Book metadata lookup tool")]
struct Cli {
    /// ISBN-13 to resolve
    isbn: String,

    /// Write the fetched cover image to this path
    #[arg(long)]
    cover_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let resolver = BookResolver::from_registry(Credentials::from_env())?;
    let record = resolver.resolve(&cli.isbn).await?;

    println!("Title:      {}", record.title);
    println!("Authors:    {}", record.authors);
    println!("Publisher:  {}", record.publisher);
    println!("Published:  {}", record.published_date);
    println!("Language:   {}", record.language);
    println!("Pages:      {}", record.page_count);

    match record.thumbnail {
        Some(bytes) => {
            println!("Cover:      {} bytes", bytes.len());
            if let Some(path) = cli.cover_out {
                std::fs::write(&path, &bytes)?;
                log::info!("Wrote cover image to {}", path.display());
            }
        }
        None => println!("Cover:      none"),
    }

    Ok(())
}
