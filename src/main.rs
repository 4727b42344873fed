use anime365::{
    Client, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, Episode, Filters, Series, Translation,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::error::Error;
use std::process;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "anime365", version)]
#[command(about = "Browse the Anime365 catalog from the command line", long_about = None)]
struct Cli {
    /// API root to send requests to
    #[arg(long, default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS", global = true)]
    timeout: Option<u64>,

    /// Print the decoded entities as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Extra query filter forwarded to the API (repeatable)
    #[arg(short, long = "filter", value_name = "KEY=VALUE", value_parser = parse_filter, global = true)]
    filters: Vec<(String, String)>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search series by title and show their episodes and translations
    Search { query: String },
    /// Show a single series
    Series { id: u32 },
    /// Show a single episode with its translations
    Episode { id: u32 },
    /// Show a single translation
    Translation { id: u32 },
    /// List translations matching the given filters
    Translations,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Download link of a translation's MP4 file on the catalog site
fn download_link(client: &Client, translation: &Translation) -> String {
    client
        .base_url()
        .join(&format!("/translations/mp4/{}", translation.id))
        .map(String::from)
        .unwrap_or_default()
}

fn print_series(series: &Series) {
    println!("Title: {}", series.title);
    if !series.kind_title.is_empty() {
        println!("Type: {} ({})", series.kind_title, series.year);
    }
    if !series.genres.is_empty() {
        let genres: Vec<&str> = series.genres.iter().map(|g| g.title.as_str()).collect();
        println!("Genres: {}", genres.join(", "));
    }
    println!("Description:");
    for description in &series.descriptions {
        println!(
            "{}:\n\t{}",
            description.source,
            nanohtml2text::html2text(&description.value).trim()
        );
    }
}

fn print_translations(client: &Client, translations: &[Translation]) {
    for translation in translations {
        println!(
            "\tLang: {} \n\tAuthors: {} \n\tDownload link: {}",
            translation.type_lang,
            translation.authors_summary,
            download_link(client, translation)
        );
    }
}

fn print_episode(client: &Client, episode: &Episode) {
    println!("#{}", episode.episode_int);
    println!("Translations:");
    print_translations(client, &episode.translations);
}

fn search(client: &Client, query: &str, mut filters: Filters, json: bool) -> Result<(), Box<dyn Error>> {
    filters.insert("query", query);
    let results = client.list_series(&filters)?;

    if json {
        return print_json(&results);
    }

    if results.is_empty() {
        println!("No series found for '{}'.", query);
        return Ok(());
    }

    for series in &results {
        print_series(series);
        println!("Episodes:");
        for episode in &series.episodes {
            // Embedded episodes come without translations
            match client.episode_by_id(episode.id, &Filters::new()) {
                Ok(Some(full)) => print_episode(client, &full),
                Ok(None) => println!("#{} (episode {} not found)", episode.episode_int, episode.id),
                Err(e) => eprintln!("Warning: {}", e),
            }
        }
        println!();
    }

    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let timeout = cli.timeout.map(Duration::from_secs).unwrap_or(DEFAULT_TIMEOUT);
    let client = Client::builder()
        .base_url(cli.base_url)
        .timeout(Some(timeout))
        .build()?;

    let filters: Filters = cli.filters.into_iter().collect();

    match cli.command {
        Command::Search { query } => search(&client, &query, filters, cli.json)?,
        Command::Series { id } => match client.series_by_id(id, &filters)? {
            Some(series) if cli.json => print_json(&series)?,
            Some(series) => {
                print_series(&series);
                println!("Episodes: {}", series.episodes.len());
            }
            None => println!("Series {} not found.", id),
        },
        Command::Episode { id } => match client.episode_by_id(id, &filters)? {
            Some(episode) if cli.json => print_json(&episode)?,
            Some(episode) => print_episode(&client, &episode),
            None => println!("Episode {} not found.", id),
        },
        Command::Translation { id } => match client.translation_by_id(id, &filters)? {
            Some(translation) if cli.json => print_json(&translation)?,
            Some(translation) => print_translations(&client, &[translation]),
            None => println!("Translation {} not found.", id),
        },
        Command::Translations => {
            let translations = client.list_translations(&filters)?;
            if cli.json {
                print_json(&translations)?;
            } else {
                println!("Found {} translation(s)", translations.len());
                print_translations(&client, &translations);
            }
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anime365=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("\nError: {}", e);
        process::exit(1);
    }
}
