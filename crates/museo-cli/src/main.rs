// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use museo_app::{CancelInput, CollectionBrowser, HistoryFilter, parse_visit_date};
use museo_client::Client;
use runtime::{
    BrowseRequest, BrowseRuntime, cancel_outcome, check_cancellable, render_history, render_price,
    render_slots,
};
use std::env;
use std::path::PathBuf;
use time::{Date, OffsetDateTime};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    init_tracing(options.verbose)?;

    let today = OffsetDateTime::now_utc().date();
    if let Some(output) = offline_output(&options, today)? {
        print!("{output}");
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `museo --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    debug!(path = %options.config_path.display(), base_url = config.base_url(), "config loaded");

    let client = Client::new(config.base_url(), config.timeout()?)
        .with_context(|| {
            format!(
                "invalid [server] config in {}; fix base_url/timeout values",
                options.config_path.display()
            )
        })?
        .with_collection_path(config.collection_path());
    if options.check_only {
        return Ok(());
    }

    if let Some(ticket_id) = &options.cancel {
        let records = client.history().context("load booking history")?;
        let result = check_cancellable(&records, ticket_id, today).and_then(|()| {
            client.cancel(&CancelInput {
                ticket_id: ticket_id.trim().to_owned(),
            })
        });
        println!("{}", cancel_outcome(result)?);
        return Ok(());
    }

    if let Some(filter) = options.history {
        let records = client.history().context("load booking history")?;
        print!("{}", render_history(&records, filter, today));
        return Ok(());
    }

    let browser = CollectionBrowser::new(client)
        .with_per_page(config.per_page())
        .with_search_fields(config.search_fields());
    let mut runtime = BrowseRuntime::new(browser);
    print!("{}", runtime.run(&options.browse)?);
    Ok(())
}

/// Price and slot lookups need neither the config nor the server.
fn offline_output(options: &CliOptions, today: Date) -> Result<Option<String>> {
    if let Some((people, tier)) = &options.price {
        return Ok(Some(format!("{}\n", render_price(*people, tier))));
    }
    if let Some(date) = options.slots {
        return render_slots(date, today).map(Some);
    }
    Ok(None)
}

fn init_tracing(verbose: bool) -> Result<()> {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|error| anyhow!("initialize logging: {error}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    verbose: bool,
    browse: BrowseRequest,
    price: Option<(u32, String)>,
    slots: Option<Date>,
    history: Option<HistoryFilter>,
    cancel: Option<String>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
        verbose: false,
        browse: BrowseRequest {
            page: 1,
            ..BrowseRequest::default()
        },
        price: None,
        slots: None,
        history: None,
        cancel: None,
    };

    let mut args = args.into_iter().map(|arg| arg.as_ref().to_owned());
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                options.config_path =
                    PathBuf::from(next_value(&mut args, "--config", "a file path")?);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--verbose" | "-v" => {
                options.verbose = true;
            }
            "--page" => {
                let raw = next_value(&mut args, "--page", "a page number")?;
                let page: u32 = raw
                    .parse()
                    .with_context(|| format!("--page expects a positive number, got {raw:?}"))?;
                if page == 0 {
                    bail!("--page expects a positive number, got 0");
                }
                options.browse.page = page;
            }
            "--filter" => {
                let raw = next_value(&mut args, "--filter", "a key=value pair")?;
                let (key, value) = raw
                    .split_once('=')
                    .filter(|(key, _)| !key.trim().is_empty())
                    .ok_or_else(|| anyhow!("--filter expects key=value, got {raw:?}"))?;
                options
                    .browse
                    .filters
                    .push((key.trim().to_owned(), value.trim().to_owned()));
            }
            "--search" => {
                options.browse.search = Some(next_value(&mut args, "--search", "a search term")?);
            }
            "--select" => {
                options.browse.select = Some(next_value(&mut args, "--select", "an item id")?);
            }
            "--price" => {
                let raw = next_value(&mut args, "--price", "a visitor count and a tour type")?;
                let people: u32 = raw
                    .parse()
                    .with_context(|| format!("--price expects a visitor count, got {raw:?}"))?;
                let tier = next_value(&mut args, "--price", "a tour type after the visitor count")?;
                options.price = Some((people, tier));
            }
            "--slots" => {
                let raw = next_value(&mut args, "--slots", "a date (YYYY-MM-DD)")?;
                let date = parse_visit_date(&raw)
                    .ok_or_else(|| anyhow!("--slots expects a YYYY-MM-DD date, got {raw:?}"))?;
                options.slots = Some(date);
            }
            "--history" => {
                let raw = next_value(&mut args, "--history", "a status filter")?;
                let filter = HistoryFilter::parse(&raw).ok_or_else(|| {
                    anyhow!(
                        "--history expects all, upcoming, completed, missed or cancelled, got {raw:?}"
                    )
                })?;
                options.history = Some(filter);
            }
            "--cancel" => {
                options.cancel = Some(next_value(&mut args, "--cancel", "a ticket id")?);
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str, what: &str) -> Result<String> {
    args.next().ok_or_else(|| anyhow!("{flag} requires {what}"))
}

fn print_help() {
    println!("museo: browse museums and manage bookings");
    println!("  --config <path>            Use a specific config path");
    println!("  --print-config-path        Print resolved config path");
    println!("  --print-example-config     Print a v1 config template");
    println!("  --check                    Validate config and client setup, then exit");
    println!("  --page <n>                 Page of the collection to show (default 1)");
    println!("  --filter <key=value>       Keep items whose tag equals value (repeatable)");
    println!("  --search <term>            Case-insensitive search over configured fields");
    println!("  --select <id>              Show details for one item on the page");
    println!("  --price <people> <tier>    Estimate a booking total (works offline)");
    println!("  --slots <YYYY-MM-DD>       List visit slots for a date (works offline)");
    println!("  --history <status>         Show booking history (all, upcoming, ...)");
    println!("  --cancel <ticket>          Cancel an upcoming booking");
    println!("  --verbose, -v              Debug logging (RUST_LOG overrides)");
    println!("  --help                     Show this help");
}
