//! `reelmap` - find the films shot nearest to you in a given year.

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use reelmap::{
    Coordinate, DataSource, FilmLocator, HtmlMapRenderer, LocatorConfig, MapRenderer, ReleaseYear,
    init_logging,
};
use tracing::Level;

#[derive(Parser)]
#[command(name = "reelmap")]
#[command(about = "Map the films of a release year shot nearest to a location")]
#[command(version)]
struct Cli {
    /// Release year, e.g. 2006 (prompted for when missing)
    #[arg(short, long)]
    year: Option<String>,

    /// Reference point as "lat, long" (prompted for when missing)
    #[arg(short = 'l', long, allow_hyphen_values = true)]
    location: Option<String>,

    /// Path to the locations.list dataset
    #[arg(long, conflicts_with = "url")]
    data: Option<PathBuf>,

    /// Download the dataset from this URL instead (plain text or .zip)
    #[arg(long)]
    url: Option<String>,

    /// Maximum number of films on the map
    #[arg(short = 'n', long, default_value_t = reelmap::DEFAULT_LIMIT)]
    limit: usize,

    /// Number of concurrent geocoding workers
    #[arg(short, long, default_value = "1")]
    workers: usize,

    /// Directory the map is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Base URL of the Nominatim instance
    #[arg(long, env = "REELMAP_NOMINATIM_URL")]
    nominatim_url: Option<String>,

    /// User-Agent sent to the geocoding service
    #[arg(long, env = "REELMAP_USER_AGENT")]
    user_agent: Option<String>,

    /// Print the nearest films as JSON instead of writing a map
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> anyhow::Result<LocatorConfig> {
        let mut builder = LocatorConfig::builder()
            .limit(self.limit)
            .workers(self.workers);
        if let Some(url) = &self.nominatim_url {
            builder = builder.nominatim_url(url.as_str());
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        Ok(builder.build()?)
    }

    fn source(&self) -> DataSource {
        match (&self.data, &self.url) {
            (Some(path), _) => DataSource::File(path.clone()),
            (None, Some(url)) => DataSource::Url(url.clone()),
            (None, None) => DataSource::default(),
        }
    }
}

fn prompt(message: &str) -> io::Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_owned())
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(if cli.verbose { Level::DEBUG } else { Level::WARN })?;

    let year = match &cli.year {
        Some(year) => year.clone(),
        None => prompt("Please enter a year you would like to have a map for: ")?,
    };
    let year: ReleaseYear = year.parse().context("invalid release year")?;

    let location = match &cli.location {
        Some(location) => location.clone(),
        None => prompt("Please enter your location (format: lat, long): ")?,
    };
    let reference: Coordinate = location.parse().context("invalid location")?;

    let config = cli.config()?;
    let locator = FilmLocator::builder().config(config).build()?;

    if !cli.json {
        println!("Map is generating...");
        println!("Please wait...");
    }
    let result = locator
        .locate_source(&year, reference, &cli.source())
        .context("failed to locate films")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let renderer = HtmlMapRenderer::new(&cli.output_dir);
    let path = renderer.render(&result)?;
    let file = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
    println!("Finished. Please have look at the map {file}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_negative_coordinates() {
        let cli = Cli::try_parse_from(["reelmap", "-y", "2006", "-l", "-33.86, 151.2"]).unwrap();
        assert_eq!(cli.year.as_deref(), Some("2006"));
        let reference: Coordinate = cli.location.unwrap().parse().unwrap();
        assert_eq!(reference, Coordinate::new(-33.86, 151.2));
    }

    #[test]
    fn test_data_and_url_conflict() {
        let result = Cli::try_parse_from([
            "reelmap",
            "--data",
            "locations.list",
            "--url",
            "https://example.com/locations.list",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_source_selection() {
        let cli = Cli::try_parse_from(["reelmap", "--data", "here.list"]).unwrap();
        assert_eq!(cli.source(), DataSource::File(PathBuf::from("here.list")));

        let cli = Cli::try_parse_from(["reelmap"]).unwrap();
        assert_eq!(cli.source(), DataSource::default());
    }

    #[test]
    fn test_config_from_flags() {
        let cli = Cli::try_parse_from([
            "reelmap",
            "--limit",
            "5",
            "--workers",
            "3",
            "--nominatim-url",
            "http://localhost:8080",
            "--user-agent",
            "reelmap-tests",
        ])
        .unwrap();
        let config = cli.config().unwrap();
        assert_eq!(config.limit, 5);
        assert_eq!(config.workers, 3);
        assert_eq!(config.nominatim.user_agent, "reelmap-tests");
    }
}
