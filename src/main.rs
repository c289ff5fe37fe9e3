//! # letterboxd-scraper CLI
//!
//! Command-line access to the scraper:
//!
//! - `dataset`: crawl a user's ratings and emit one row per rated film
//! - `ratings`: crawl a user's ratings without the poster lookups
//! - `film`: details and reviews of a single film
//! - `recommend`: a recommendation feed for a list of films
//!
//! Output goes to stdout, or to `--output`, as text, JSON or TSV.

mod logging;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{instrument, warn};

use letterboxd_scraper::config::{Pagination, ScraperConfig, ScraperConfigBuilder};
use letterboxd_scraper::dataset;
use letterboxd_scraper::film::{DetailOutcome, FilmDetail};
use letterboxd_scraper::http::HttpClient;
use letterboxd_scraper::listing::{self, RatedFilms};
use letterboxd_scraper::recommend::{self, RecommendationEntry};

#[derive(Parser)]
#[command(author, version, about = "Scrape film ratings, details and reviews from Letterboxd", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the rating dataset of a user
    Dataset(UserArgs),

    /// List a user's rated films
    Ratings(UserArgs),

    /// Show details and reviews of a film
    Film(FilmArgs),

    /// Build a recommendation feed from film slugs
    Recommend(RecommendArgs),
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Write output to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Film pages fetched at once in batch lookups
    #[arg(short, long, global = true)]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct UserArgs {
    /// Letterboxd username
    #[arg(required = true)]
    username: String,

    /// Keep films from every listing page instead of only the last one
    #[arg(long)]
    accumulate_pages: bool,

    /// Stop after this many listing pages
    #[arg(long)]
    max_pages: Option<u32>,
}

#[derive(Args, Debug)]
struct FilmArgs {
    /// Film slug, e.g. dune-2021
    #[arg(required = true)]
    slug: String,
}

#[derive(Args, Debug)]
struct RecommendArgs {
    /// Film slugs
    #[arg(required = true, num_args = 1..)]
    slugs: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Tsv,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::setup_logging(cli.global.log_file.as_deref())?;

    match cli.command {
        Some(Commands::Dataset(args)) => dataset_command(&cli.global, args).await?,
        Some(Commands::Ratings(args)) => ratings_command(&cli.global, args).await?,
        Some(Commands::Film(args)) => film_command(&cli.global, args).await?,
        Some(Commands::Recommend(args)) => recommend_command(&cli.global, args).await?,
        None => {
            // If no command is provided, show help
            let _ = Cli::parse_from(["letterboxd-scraper", "--help"]);
        }
    }

    Ok(())
}

/// Environment defaults, then command-line overrides
fn build_config(global: &GlobalArgs, user: Option<&UserArgs>) -> anyhow::Result<ScraperConfig> {
    let mut builder = ScraperConfigBuilder::from_config(ScraperConfig::from_env()?);

    if let Some(concurrency) = global.concurrency {
        builder = builder.concurrency(concurrency);
    }
    if let Some(timeout) = global.timeout {
        builder = builder.timeout_secs(timeout);
    }
    if let Some(user) = user {
        if user.accumulate_pages {
            builder = builder.pagination(Pagination::Accumulate);
        }
        builder = builder.max_pages(user.max_pages);
    }

    Ok(builder.build()?)
}

fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Stdout, or the `--output` file
fn output_writer(global: &GlobalArgs) -> anyhow::Result<Box<dyn Write>> {
    Ok(match &global.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    })
}

#[instrument]
async fn dataset_command(global: &GlobalArgs, args: UserArgs) -> anyhow::Result<()> {
    let config = build_config(global, Some(&args))?;
    let client = HttpClient::new(&config)?;

    let progress = spinner(format!("Scraping {}...", args.username.trim()));
    let data = dataset::scrape_user_dataset(&client, &config, &args.username).await;
    progress.finish_and_clear();
    let data = data?;

    let mut out = output_writer(global)?;
    match global.format {
        Format::Json => dataset::write_json(&mut out, &data.rows)?,
        Format::Tsv => dataset::write_tsv(&mut out, &data.rows)?,
        Format::Text => {
            write!(out, "{}", dataset::render_table(&data.rows))?;
            writeln!(
                out,
                "\n{} rated films for {} (scraped {})",
                data.rows.len(),
                data.username,
                data.scraped_at.format("%Y-%m-%d %H:%M:%S UTC")
            )?;
        }
    }
    out.flush()?;

    if let Some(path) = &global.output {
        eprintln!("Saved {} rows to {}", data.rows.len(), path.display());
    }
    Ok(())
}

#[instrument]
async fn ratings_command(global: &GlobalArgs, args: UserArgs) -> anyhow::Result<()> {
    let config = build_config(global, Some(&args))?;
    let client = HttpClient::new(&config)?;

    let progress = spinner(format!("Crawling {}...", args.username.trim()));
    let rated = async {
        let rated = listing::crawl(&client, &config, &args.username).await?;
        let (names, slugs) =
            listing::filter_unrated(&client, &config, &args.username, rated.names, rated.slugs)
                .await?;
        Ok::<_, letterboxd_scraper::Error>(RatedFilms {
            names,
            slugs,
            ..rated
        })
    }
    .await;
    progress.finish_and_clear();
    let rated = rated?;

    if !rated.is_aligned() {
        warn!(
            "Rated lists are not aligned (names {}, slugs {}, ratings {})",
            rated.names.len(),
            rated.slugs.len(),
            rated.ratings.len()
        );
    }

    let mut out = output_writer(global)?;
    match global.format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, &rated)?;
            writeln!(out)?;
        }
        Format::Tsv => dataset::write_records_tsv(&mut out, &rated.entries())?,
        Format::Text => {
            let rows = rated.names.iter().zip(&rated.slugs).zip(&rated.ratings);
            for (i, ((name, slug), rating)) in rows.enumerate() {
                writeln!(out, "{:>4}. {} ({}) - {}", i + 1, name, slug, rating)?;
            }
            writeln!(
                out,
                "\n{} rated films across {} listing pages",
                rated.len(),
                rated.pages_fetched
            )?;
        }
    }
    out.flush()?;
    Ok(())
}

#[instrument]
async fn film_command(global: &GlobalArgs, args: FilmArgs) -> anyhow::Result<()> {
    let config = build_config(global, None)?;
    let client = HttpClient::new(&config)?;

    let outcome = letterboxd_scraper::film::extract_detail(&client, &config, &args.slug).await?;
    if let DetailOutcome::DecodeFailed { reason, .. } = &outcome {
        warn!("Showing placeholder data for {}: {}", args.slug.trim(), reason);
    }
    let detail = outcome.into_detail();

    let mut out = output_writer(global)?;
    match global.format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, &detail)?;
            writeln!(out)?;
        }
        Format::Tsv => dataset::write_records_tsv(&mut out, &detail.reviews)?,
        Format::Text => write_film_text(&mut out, &detail)?,
    }
    out.flush()?;
    Ok(())
}

fn write_film_text(out: &mut dyn Write, detail: &FilmDetail) -> std::io::Result<()> {
    writeln!(out, "{} ({})", detail.title, detail.year)?;
    writeln!(out, "Director: {}", detail.director)?;
    writeln!(out, "Genres:   {}", detail.genres.join(", "))?;
    writeln!(out, "Rating:   {:.2}", detail.rating)?;
    writeln!(out, "Poster:   {}", detail.poster_url)?;
    if !detail.summary.is_empty() {
        writeln!(out, "\n{}", detail.summary)?;
    }

    if !detail.actors.is_empty() {
        writeln!(out, "\nCast:")?;
        for actor in &detail.actors {
            writeln!(out, "  {} <{}>", actor.name, actor.wiki_url)?;
        }
    }

    writeln!(out, "\nReviews ({}):", detail.reviews.len())?;
    for review in &detail.reviews {
        writeln!(out, "  {} ({} likes)", review.reviewer, review.likes)?;
        writeln!(out, "    {}", review.content)?;
    }
    Ok(())
}

#[instrument]
async fn recommend_command(global: &GlobalArgs, args: RecommendArgs) -> anyhow::Result<()> {
    let config = build_config(global, None)?;
    let client = HttpClient::new(&config)?;

    let progress = spinner(format!("Looking up {} films...", args.slugs.len()));
    let entries = recommend::aggregate(&client, &config, &args.slugs).await;
    progress.finish_and_clear();

    let mut out = output_writer(global)?;
    match global.format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, &entries)?;
            writeln!(out)?;
        }
        Format::Tsv => dataset::write_records_tsv(&mut out, &entries)?,
        Format::Text => {
            for entry in &entries {
                writeln!(
                    out,
                    "{} [{}] {}",
                    entry.title,
                    entry.movie_id,
                    recommendation_rating(entry)
                )?;
            }
            writeln!(out, "\n{} of {} films found", entries.len(), args.slugs.len())?;
        }
    }
    out.flush()?;
    Ok(())
}

fn recommendation_rating(entry: &RecommendationEntry) -> String {
    entry.rating.map(|r| format!("{:.2}", r)).unwrap_or_default()
}
