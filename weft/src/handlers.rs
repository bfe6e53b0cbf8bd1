use anyhow::{Context, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use weft_core::aggregate::DomainAggregator;
use weft_core::batch::{self, BatchOptions, Entity};
use weft_core::data::Database;
use weft_core::exclude::ExclusionFilter;
use weft_core::report::{self, ReportFormat};
use weft_core::store::SnapshotStore;
use weft_scanner::CrawlConfig;

pub const DB_FILENAME: &str = "weft.db";
pub const SNAPSHOT_DIR: &str = "crawled_data";
pub const GRAPH_ARTIFACT_FILENAME: &str = "cross_domain_graph.json";

// Helper functions for the crawl handler

/// Load entities from either a roster file or a single --name/--url pair.
pub fn load_entities_from_source(
    name: Option<&String>,
    url: Option<&String>,
    roster: Option<&PathBuf>,
) -> Result<Vec<Entity>, String> {
    if let Some(roster_path) = roster {
        load_entities_from_file(roster_path)
    } else if let (Some(name), Some(url)) = (name, url) {
        Ok(vec![Entity {
            name: name.clone(),
            seed_url: url.clone(),
        }])
    } else {
        Err("Either --roster or --name/--url must be provided".to_string())
    }
}

/// Load and parse roster entries from a file of `Name,URL` lines.
pub fn load_entities_from_file(path: &PathBuf) -> Result<Vec<Entity>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read roster file {}: {}", path.display(), e))?;

    let mut entities = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_roster_line(trimmed) {
            Some(entity) => entities.push(entity),
            None => eprintln!("⚠️  Skipping roster line '{}'", trimmed),
        }
    }

    if entities.is_empty() {
        return Err(format!("No usable entries found in {}", path.display()));
    }

    Ok(entities)
}

/// Parse one roster line. The first comma splits the entity name from its
/// seed URL. A missing comma or blank name makes the line unusable; a blank
/// URL is kept so the orchestrator records it as a failed entity.
pub fn parse_roster_line(line: &str) -> Option<Entity> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let (name, url) = trimmed.split_once(',')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    Some(Entity {
        name: name.to_string(),
        seed_url: url.trim().to_string(),
    })
}

fn expand_data_dir(args: &ArgMatches) -> PathBuf {
    let raw = args
        .get_one::<String>("data-dir")
        .map(String::as_str)
        .unwrap_or("~/.config/weft/");
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

pub fn handle_init(args: &ArgMatches) -> anyhow::Result<()> {
    print_divider();
    println!("{}", "  WEFT INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let raw_path = args.get_one::<String>("PATH").map(String::as_str).unwrap_or("~/.config/weft/");
    let force = args.get_flag("force");
    let expanded = shellexpand::tilde(raw_path);
    let data_dir = Path::new(expanded.as_ref());
    let db_path = data_dir.join(DB_FILENAME);
    let snapshot_dir = data_dir.join(SNAPSHOT_DIR);

    println!(
        "{} Target: {}",
        "→".blue(),
        data_dir.display().to_string().bright_white()
    );
    println!();

    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    fs::create_dir_all(&snapshot_dir)
        .with_context(|| format!("Failed to create snapshot directory {}", snapshot_dir.display()))?;
    println!("{} Directories created", "✓".green().bold());

    if Database::exists(&db_path) {
        if !force {
            bail!(
                "Run-history database already exists at {} (use --force to overwrite)",
                db_path.display()
            );
        }
        println!("{} Deleting existing database (force mode)", "→".yellow().bold());
        Database::remove(&db_path)?;
    }

    Database::new(&db_path)
        .with_context(|| format!("Failed to create database at {}", db_path.display()))?;

    println!();
    print_divider();
    println!("{}", "  INITIALIZATION COMPLETE".green().bold());
    print_divider();
    println!();
    println!(
        "{} Data directory: {}",
        "✓".green().bold(),
        data_dir.display().to_string().bright_white()
    );
    println!(
        "{} Snapshots:      {}",
        "✓".green().bold(),
        snapshot_dir.display().to_string().bright_white()
    );
    println!(
        "{} Database:       {}",
        "✓".green().bold(),
        db_path.display().to_string().bright_white()
    );
    println!();

    Ok(())
}

pub async fn handle_crawl(args: &ArgMatches) -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let roster = args.get_one::<PathBuf>("roster");
    let name = args.get_one::<String>("name");
    let url = args.get_one::<String>("url");

    let entities = match load_entities_from_source(name, url, roster) {
        Ok(entities) => entities,
        Err(message) => bail!(message),
    };

    let data_dir = expand_data_dir(args);
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    let store = SnapshotStore::new(data_dir.join(SNAPSHOT_DIR));

    let max_depth = *args.get_one::<usize>("max-depth").unwrap_or(&5);
    let max_pages = *args.get_one::<usize>("max-pages").unwrap_or(&100);
    let delay = *args.get_one::<u64>("delay").unwrap_or(&2);

    let config = CrawlConfig::default()
        .with_max_depth(max_depth)
        .with_max_pages(max_pages)
        .with_politeness_delay(Duration::from_secs(delay));

    println!("\n🕸  Crawling {} site(s)", entities.len());
    println!("Max depth: {}", max_depth);
    println!("Max pages per site: {}", max_pages);
    println!("Politeness delay: {}s\n", delay);

    // One spinner carries both the per-entity and the per-page updates.
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let entity_spinner = spinner.clone();
    let progress_callback: batch::BatchProgressCallback = Arc::new(move |message: String| {
        entity_spinner.set_message(message);
    });

    let page_spinner = spinner.clone();
    let page_callback: weft_scanner::ProgressCallback =
        Arc::new(move |pages: usize, url: String| {
            page_spinner.set_message(format!("[{} pages] {}", pages, url));
        });

    let db_path = data_dir.join(DB_FILENAME);
    let db = Database::new(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    let run_id = db.create_run(entities.len())?;

    let options = BatchOptions { entities, config };
    let events = match batch::run_batch(
        options,
        &store,
        Some(progress_callback),
        Some(page_callback),
    )
    .await
    {
        Ok(events) => events,
        Err(err) => {
            spinner.finish_and_clear();
            db.fail_run(&run_id)?;
            return Err(err.into());
        }
    };

    for event in &events {
        db.record_outcome(&run_id, event)?;
    }
    db.complete_run(&run_id)?;

    spinner.finish_and_clear();
    println!("{} Crawl complete!\n", "✓".green().bold());

    let summary = batch::summarize(&events);
    let report_content = match report_format(args) {
        ReportFormat::Text => report::generate_batch_text_report(&summary, &events),
        ReportFormat::Json => report::generate_batch_json_report(&summary, &events)?,
    };
    write_or_print(args, &report_content)?;

    println!(
        "{} {} of {} entities crawled successfully (run {})",
        "✓".green().bold(),
        summary.succeeded,
        summary.total,
        run_id
    );

    Ok(())
}

pub fn handle_aggregate(args: &ArgMatches) -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let data_dir = expand_data_dir(args);
    let store = SnapshotStore::new(data_dir.join(SNAPSHOT_DIR));

    let snapshots = store.load_all()?;
    if snapshots.is_empty() {
        println!(
            "{} No snapshots found under {}; run `weft crawl` first.",
            "⚠".yellow().bold(),
            store.root().display()
        );
    } else {
        println!("Aggregating {} snapshot(s)...", snapshots.len());
    }

    let mut aggregator = DomainAggregator::new(ExclusionFilter::default());
    aggregator.add_snapshots(snapshots.iter());
    let graph = aggregator.finish();

    let graph_out = args
        .get_one::<PathBuf>("graph-out")
        .cloned()
        .unwrap_or_else(|| data_dir.join(GRAPH_ARTIFACT_FILENAME));
    report::save_report(&report::graph_artifact_json(&graph)?, &graph_out)
        .with_context(|| format!("Failed to write graph artifact to {}", graph_out.display()))?;
    println!(
        "{} Domain graph written to {}",
        "✓".green().bold(),
        graph_out.display().to_string().bright_white()
    );

    let report_content = match report_format(args) {
        ReportFormat::Text => report::generate_aggregate_text_report(&graph),
        ReportFormat::Json => report::generate_aggregate_json_report(&graph)?,
    };
    write_or_print(args, &report_content)?;

    Ok(())
}

pub fn handle_report(args: &ArgMatches) -> anyhow::Result<()> {
    let data_dir = expand_data_dir(args);
    let db_path = data_dir.join(DB_FILENAME);

    if !Database::exists(&db_path) {
        bail!(
            "No run history found at {}; run `weft init` and `weft crawl` first",
            db_path.display()
        );
    }

    let db = Database::new(&db_path)?;
    let run = match args.get_one::<String>("run") {
        Some(run_id) => db
            .get_runs()?
            .into_iter()
            .find(|r| &r.id == run_id)
            .with_context(|| format!("No run with id {}", run_id))?,
        None => match db.get_latest_run()? {
            Some(run) => run,
            None => {
                println!("No batch runs recorded yet.");
                return Ok(());
            }
        },
    };

    print_divider();
    println!("{}", format!("  RUN {}", run.id).bright_white().bold());
    print_divider();
    println!("Started:  {}", format_timestamp(run.started_at));
    match run.finished_at {
        Some(finished) => println!("Finished: {}", format_timestamp(finished)),
        None => println!("Finished: -"),
    }
    println!("Status:   {}", run.status);
    println!("Entities: {}", run.total_entities);
    println!();

    for outcome in db.get_outcomes_by_run(&run.id)? {
        if outcome.status == "success" {
            println!(
                "  {} {}  ({} nodes, {} edges)",
                "✓".green(),
                outcome.entity,
                outcome.nodes,
                outcome.edges
            );
        } else {
            println!(
                "  {} {}  {}",
                "✗".red(),
                outcome.entity,
                outcome.failure_reason.unwrap_or_default().dimmed()
            );
        }
    }
    println!();

    Ok(())
}

fn report_format(args: &ArgMatches) -> ReportFormat {
    args.get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text)
}

fn write_or_print(args: &ArgMatches, content: &str) -> anyhow::Result<()> {
    match args.get_one::<PathBuf>("output") {
        Some(path) => {
            report::save_report(content, path)
                .with_context(|| format!("Failed to save report to {}", path.display()))?;
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

fn format_timestamp(timestamp: i64) -> String {
    use chrono::{DateTime, Utc};
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
