use clap::{arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("weft")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("weft")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Initializes the weft data directory and run-history database")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Location of the weft data directory")
                        .default_value("~/.config/weft/"),
                )
                .arg(
                    arg!(-f --"force")
                        .help("Overwrite an existing run-history database at the location")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl a roster of company sites into per-entity link-graph snapshots. \
                Contributes outcomes to the run history.",
                )
                .arg(
                    arg!(-r --"roster" <PATH>)
                        .required(false)
                        .help("Path to a roster file of `Name,URL` lines")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with_all(["name", "url"]),
                )
                .arg(
                    arg!(-n --"name" <NAME>)
                        .required(false)
                        .help("Entity name for a single-entity crawl")
                        .requires("url"),
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("Seed URL for a single-entity crawl")
                        .requires("name"),
                )
                .arg(
                    arg!(-d --"data-dir" <PATH>)
                        .required(false)
                        .help("Directory holding snapshots and the run-history database")
                        .default_value("~/.config/weft/"),
                )
                .arg(
                    arg!(--"max-depth" <DEPTH>)
                        .required(false)
                        .help("Maximum link depth to follow from each seed")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("5"),
                )
                .arg(
                    arg!(--"max-pages" <PAGES>)
                        .required(false)
                        .help("Maximum number of pages recorded per site")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("100"),
                )
                .arg(
                    arg!(--"delay" <SECONDS>)
                        .required(false)
                        .help("Politeness delay between page fetches, in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("2"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save the batch report to a file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("aggregate")
                .about(
                    "Merge all persisted snapshots into the cross-company shared-domain \
                graph and report.",
                )
                .arg(
                    arg!(-d --"data-dir" <PATH>)
                        .required(false)
                        .help("Directory holding the per-entity snapshots")
                        .default_value("~/.config/weft/"),
                )
                .arg(
                    arg!(--"graph-out" <PATH>)
                        .required(false)
                        .help("Where to write the domain-graph JSON artifact (default: <data-dir>/cross_domain_graph.json)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save the aggregate report to a file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("report")
                .about("Show recorded batch runs and their per-entity outcomes")
                .arg(
                    arg!(-d --"data-dir" <PATH>)
                        .required(false)
                        .help("Directory holding the run-history database")
                        .default_value("~/.config/weft/"),
                )
                .arg(
                    arg!(--"run" <RUN_ID>)
                        .required(false)
                        .help("Show a specific run (default: the most recent)"),
                ),
        )
}
