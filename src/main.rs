use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use ptt_scraper::config::CrawlConfig;
use ptt_scraper::{popularity, store, Config, Pipeline};

/// Pages walked when neither `-n` nor `[crawl] pages` is given.
const CLI_DEFAULT_PAGES: u32 = 10;

#[derive(Parser)]
#[command(name = "ptt_scraper", about = "Incremental PTT board crawler")]
struct Cli {
    /// TOML config file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Board name, overrides the config file
    #[arg(short, long, global = true)]
    board: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl, filter and harvest new post content in one pipeline
    Run {
        /// Listing pages to walk back from the newest [default: config, else 10]
        #[arg(short = 'n', long)]
        pages: Option<u32>,
        /// Minimum popularity score (default: from config)
        #[arg(short, long)]
        threshold: Option<i64>,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Crawl listing pages and overwrite the raw table
    Crawl {
        #[arg(short = 'n', long)]
        pages: Option<u32>,
    },
    /// Re-filter the stored raw table
    Filter {
        #[arg(short, long)]
        threshold: Option<i64>,
    },
    /// Harvest content for the stored filtered table
    Harvest {
        #[arg(short, long)]
        threshold: Option<i64>,
        /// Print harvest counters as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show table sizes and popularity breakdown
    Stats {
        #[arg(short, long)]
        threshold: Option<i64>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let default_threshold = config.crawl.threshold;
    let pipeline = Pipeline::new(config)?;

    match cli.command {
        Commands::Run {
            pages,
            threshold,
            json,
        } => {
            let threshold = threshold.unwrap_or(default_threshold);
            let summary = pipeline.run(resolve_pages(pages, &pipeline.config().crawl), threshold).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }
            match summary.harvest {
                Some(h) => println!(
                    "Done: {} listings, {} with {}+ recommendations, {} new posts stored ({} already stored).",
                    summary.listings, summary.qualifying, threshold, h.written, h.skipped_existing
                ),
                None => println!("Could not resolve the latest page index; nothing stored."),
            }
        }
        Commands::Crawl { pages } => {
            let report = pipeline.crawl(resolve_pages(pages, &pipeline.config().crawl)).await?;
            match report.frontier {
                Some(frontier) => println!(
                    "Crawled {} pages from index {} ({} listings).",
                    report.pages_visited,
                    frontier,
                    report.listings.len()
                ),
                None => println!("Could not resolve the latest page index; nothing stored."),
            }
        }
        Commands::Filter { threshold } => {
            let threshold = threshold.unwrap_or(default_threshold);
            let filtered = pipeline.filter_stored(threshold)?;
            println!("{} listings with {}+ recommendations.", filtered.len(), threshold);
        }
        Commands::Harvest { threshold, json } => {
            let threshold = threshold.unwrap_or(default_threshold);
            let h = pipeline.harvest_stored(threshold).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&h)?);
                return Ok(());
            }
            println!(
                "Done: {} new posts stored ({} empty, {} write errors, {} already stored).",
                h.written, h.empty, h.write_errors, h.skipped_existing
            );
        }
        Commands::Stats { threshold, json } => {
            let threshold = threshold.unwrap_or(default_threshold);
            print_stats(&pipeline, threshold, json)?;
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

/// `-n` wins, then `[crawl] pages`, then the CLI default.
fn resolve_pages(flag: Option<u32>, crawl: &CrawlConfig) -> u32 {
    flag.unwrap_or_else(|| crawl.pages_or(CLI_DEFAULT_PAGES))
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(board) = &cli.board {
        config.board.name = board.clone();
    }
    Ok(config)
}

fn print_stats(pipeline: &Pipeline, threshold: i64, json: bool) -> anyhow::Result<()> {
    let s = pipeline.store();
    let tables = s.stats(threshold)?;
    let raw_path = s.raw_path();
    let summary = if raw_path.exists() {
        Some(popularity::summarize(&store::read_listings(&raw_path)?, threshold))
    } else {
        None
    };

    if json {
        let value = serde_json::json!({
            "board": pipeline.config().board.name,
            "threshold": threshold,
            "tables": tables,
            "popularity": summary,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let show = |n: Option<usize>| n.map(|n| n.to_string()).unwrap_or_else(|| "-".into());
    println!("Board:     {}", pipeline.config().board.name);
    println!("Data dir:  {}", s.dir().display());
    println!("Raw:       {}", show(tables.raw));
    println!("Filtered:  {} (threshold {})", show(tables.filtered), threshold);
    println!("Content:   {}", show(tables.content));
    if let Some(p) = summary {
        println!("\n--- Popularity (raw) ---");
        println!("  爆:        {}", p.max_sentinel);
        println!("  X:         {}", p.negative_sentinel);
        println!("  numeric:   {}", p.numeric);
        println!("  unparsed:  {}", p.unparsed);
        println!("  >= {}:     {}", threshold, p.at_or_above);
    }
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_default_to_ten_without_flag_or_config() {
        let crawl = CrawlConfig::default();
        assert_eq!(resolve_pages(None, &crawl), 10);
        assert_eq!(resolve_pages(Some(2), &crawl), 2);
    }

    #[test]
    fn configured_pages_apply_when_flag_is_absent() {
        let crawl = CrawlConfig {
            pages: Some(7),
            ..CrawlConfig::default()
        };
        assert_eq!(resolve_pages(None, &crawl), 7);
        assert_eq!(resolve_pages(Some(3), &crawl), 3);
    }

    #[test]
    fn run_without_pages_flag_parses() {
        let cli = Cli::try_parse_from(["ptt_scraper", "run"]).unwrap();
        match cli.command {
            Commands::Run { pages, threshold, json } => {
                assert_eq!(pages, None);
                assert_eq!(threshold, None);
                assert!(!json);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn harvest_counters_serialize() {
        let stats = ptt_scraper::harvest::HarvestStats {
            candidates: 3,
            written: 2,
            write_errors: 1,
            ..Default::default()
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["written"], 2);
        assert_eq!(value["write_errors"], 1);
        assert_eq!(value["skipped_duplicate"], 0);
    }
}
