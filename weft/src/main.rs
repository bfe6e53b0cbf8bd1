use colored::Colorize;
use weft::commands::command_argument_builder;
use weft::handlers;
use weft_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    let result = match chosen_command.subcommand() {
        Some(("init", primary_command)) => handlers::handle_init(primary_command),
        Some(("crawl", primary_command)) => handlers::handle_crawl(primary_command).await,
        Some(("aggregate", primary_command)) => handlers::handle_aggregate(primary_command),
        Some(("report", primary_command)) => handlers::handle_report(primary_command),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(error) = result {
        eprintln!("{} {}", "✗".red().bold(), error);
        std::process::exit(1);
    }
}
