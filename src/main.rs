// Enable warnings for all clippy lints.
#![warn(
    clippy::correctness,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::pedantic,
    clippy::cargo,
    clippy::restriction
)]
// Selectively disable warnings for some lints.
#![allow(
    clippy::module_name_repetitions,  // Allow name repetitions in module and type names.
    clippy::use_debug, // Debug formatting is useful.
    clippy::multiple_crate_versions, // Beyond our control.
    clippy::missing_docs_in_private_items, // Disabled.
    clippy::missing_inline_in_public_items, // Not considered for now.
    clippy::implicit_return, // Allow.
    clippy::use_self, // Too pedantic.
    clippy::shadow_same,
    clippy::unknown_clippy_lints,
)]
// Mark some lints as errors.
#![deny(clippy::print_stdout)]

use clap::{arg_enum, value_t, App, AppSettings, Arg, ArgMatches, SubCommand};
use linkrank::error::LrError;
use linkrank::settings::Settings;
use linkrank::tasks::bad_link_counters::BadLinkCountersTask;
use linkrank::tasks::bad_links::BadLinksTask;
use linkrank::tasks::inlinks_percentiles::InlinksPercentilesTask;
use linkrank::tasks::link_counters::LinkCountersTask;
use linkrank::tasks::link_documents::LinkDocumentsTask;
use linkrank::tasks::non_canonical_counters::NonCanonicalCountersTask;
use linkrank::tasks::non_canonical_links::NonCanonicalLinksTask;
use linkrank::tasks::page_rank::PageRankTask;
use linkrank::tasks::store::LocalObjectStore;
use linkrank::tasks::top_domains::TopDomainsTask;
use linkrank::tasks::{LinkDirection, LinkTask, TaskContext};
use linkrank::util::logger::init_logger_with_level;
use linkrank_api::LogObserver;
use log::Level;
use std::path::{Path, PathBuf};

const DEFAULT_TMP_DIR: &str = "linkrank";

arg_enum! {
    #[derive(PartialEq, Debug)]
    pub enum LogLevel {
        Error,
        Warn,
        Info,
        Debug,
        Trace,
    }
}

fn main() -> Result<(), LrError> {
    let part_id = || Arg::from_usage("-p, --part-id=<PART_ID> 'Partition to process'");
    let direction = || {
        Arg::from_usage("-d, --direction=<DIRECTION> 'Link direction'")
            .possible_values(&["out", "in"])
    };
    // Parse command line arguments. Global arguments are read from the task's matches, where clap
    // propagates them.
    let matches = App::new("linkrank")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::from_usage("-l, --loglevel=[LEVEL] 'Set the log level'")
                .possible_values(&LogLevel::variants())
                .case_insensitive(true)
                .global(true),
        )
        .arg(Arg::from_usage("-c, --config=[FILE] 'Json settings file'").global(true))
        .arg(Arg::from_usage("-u, --uri=[URI] 'Location of the crawl datasets'").global(true))
        .arg(Arg::from_usage("-t, --tmp-dir=[DIR] 'Local working directory'").global(true))
        .arg(
            Arg::from_usage("-f, --force-fetch 'Fetch datasets even if already present locally'")
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("link-documents")
                .about("Builds the per-url link documents of a partition")
                .arg(part_id())
                .arg(direction()),
        )
        .subcommand(
            SubCommand::with_name("link-counters")
                .about("Builds the link counters of a partition")
                .arg(part_id())
                .arg(direction()),
        )
        .subcommand(SubCommand::with_name("bad-links").about("Lists links to error urls"))
        .subcommand(
            SubCommand::with_name("bad-link-counters")
                .about("Counts links to error urls of a partition")
                .arg(part_id()),
        )
        .subcommand(
            SubCommand::with_name("non-canonical-links")
                .about("Lists links to urls declaring another canonical"),
        )
        .subcommand(
            SubCommand::with_name("non-canonical-counters")
                .about("Counts links to non-canonical urls of a partition")
                .arg(part_id()),
        )
        .subcommand(
            SubCommand::with_name("inlinks-percentiles")
                .about("Assigns an inlinks percentile to every crawled url"),
        )
        .subcommand(SubCommand::with_name("pagerank").about("Computes the pagerank of the crawl"))
        .subcommand(
            SubCommand::with_name("top-domains")
                .about("Ranks the most linked external domains")
                .arg(Arg::from_usage("-n, --nb-top-domains=[N] 'Number of domains to keep'")),
        )
        .get_matches();

    let (name, sub_matches) = matches.subcommand();
    let sub_matches = sub_matches
        .ok_or_else(|| LrError::Config("A task must be given, see --help".to_owned()))?;
    setup_logger(sub_matches)?;

    let mut settings = match sub_matches.value_of("config") {
        Some(file_path) => Settings::from_json_file(Path::new(file_path))?,
        None => Settings::default(),
    };
    if sub_matches.is_present("force-fetch") {
        settings.force_fetch = true;
    }
    if let Some(nb_top_domains) = sub_matches.value_of("nb-top-domains") {
        settings.nb_top_domains = parse_arg("nb-top-domains", nb_top_domains)?;
    }

    let task: Box<dyn LinkTask> = match name {
        "link-documents" => Box::new(LinkDocumentsTask::new(
            part_id_arg(sub_matches)?,
            direction_arg(sub_matches)?,
        )),
        "link-counters" => Box::new(LinkCountersTask::new(
            part_id_arg(sub_matches)?,
            direction_arg(sub_matches)?,
        )),
        "bad-links" => Box::new(BadLinksTask),
        "bad-link-counters" => Box::new(BadLinkCountersTask::new(part_id_arg(sub_matches)?)),
        "non-canonical-links" => Box::new(NonCanonicalLinksTask),
        "non-canonical-counters" => {
            Box::new(NonCanonicalCountersTask::new(part_id_arg(sub_matches)?))
        }
        "inlinks-percentiles" => Box::new(InlinksPercentilesTask),
        "pagerank" => Box::new(PageRankTask),
        "top-domains" => Box::new(TopDomainsTask),
        _ => return Err(LrError::Config(format!("Unknown task '{}'", name))),
    };

    let uri = sub_matches
        .value_of("uri")
        .ok_or_else(|| LrError::Config("Missing --uri".to_owned()))?
        .to_owned();
    let tmp_dir = sub_matches
        .value_of("tmp-dir")
        .map_or_else(|| std::env::temp_dir().join(DEFAULT_TMP_DIR), PathBuf::from);
    std::fs::create_dir_all(&tmp_dir)
        .map_err(|e| LrError::CreateFile(tmp_dir.display().to_string(), e.to_string()))?;

    let context = TaskContext::new(
        uri,
        tmp_dir,
        settings,
        Box::new(LocalObjectStore),
        Box::new(LogObserver),
    );
    linkrank::run_task(task.as_ref(), &context)?;
    Ok(())
}

fn parse_arg<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, LrError> {
    value.parse().map_err(|_| LrError::Config(format!("Invalid value '{}' for --{}", value, name)))
}

fn part_id_arg(matches: &ArgMatches) -> Result<u32, LrError> {
    let value = matches
        .value_of("part-id")
        .ok_or_else(|| LrError::Config("Missing --part-id".to_owned()))?;
    parse_arg("part-id", value)
}

fn direction_arg(matches: &ArgMatches) -> Result<LinkDirection, LrError> {
    matches
        .value_of("direction")
        .ok_or_else(|| LrError::Config("Missing --direction".to_owned()))?
        .parse()
}

fn setup_logger(matches: &ArgMatches) -> Result<(), LrError> {
    // Set log level.
    let log_level = match value_t!(matches, "loglevel", LogLevel).unwrap_or(LogLevel::Info) {
        LogLevel::Error => Level::Error,
        LogLevel::Warn => Level::Warn,
        LogLevel::Info => Level::Info,
        LogLevel::Debug => Level::Debug,
        LogLevel::Trace => Level::Trace,
    };
    init_logger_with_level(log_level)
}
