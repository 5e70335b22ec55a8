use anyhow::{Error, Result};
use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command};
use log::{debug, error};
use relsync::{ConsoleReporter, Syncer, SyncerBuilder, DEFAULT_MANIFEST_URL};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
enum RelsyncError {
    #[error("{0:}")]
    InvalidArgsError(String),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cmd = cmd();
    let matches = cmd.get_matches();
    let res = init_logger_from_matches(&matches);
    if let Err(e) = res {
        eprintln!("Error creating logger: {e}");
        std::process::exit(126);
    }

    let status = match make_syncer(&matches) {
        Ok(mut s) => match s.sync().await {
            Ok(summary) => {
                debug!(
                    "{} releases downloaded, {} already up to date",
                    summary.downloaded, summary.up_to_date,
                );
                if !matches.get_flag("quiet") {
                    println!("All done!");
                }
                0
            }
            Err(e) => {
                print_err(&e);
                1
            }
        },
        Err(e) => {
            print_err(&e);
            127
        }
    };
    std::process::exit(status);
}

const MAX_TERM_WIDTH: usize = 100;

fn cmd() -> Command {
    Command::new("relsync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Mirror the releases listed in a JSON manifest")
        .arg(
            Arg::new("manifest-url")
                .long("manifest-url")
                .short('u')
                .help(concat!(
                    "The URL of the JSON manifest listing the releases to mirror. Defaults to",
                    " the Logic 2 marketplace list.",
                )),
        )
        .arg(Arg::new("dir").long("dir").short('d').help(concat!(
            "The directory in which each release gets its own folder. Defaults to",
            " ./downloads. It is created if it does not exist.",
        )))
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable verbose output."),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Enable debugging output."),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Suppresses progress output and all logging except errors."),
        )
        .group(ArgGroup::new("log-level").args(["verbose", "debug", "quiet"]))
        .max_term_width(MAX_TERM_WIDTH)
}

pub(crate) fn init_logger_from_matches(matches: &ArgMatches) -> Result<(), log::SetLoggerError> {
    let level = if matches.get_flag("debug") {
        log::LevelFilter::Debug
    } else if matches.get_flag("verbose") {
        log::LevelFilter::Info
    } else if matches.get_flag("quiet") {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Warn
    };

    relsync::init_logger(level)
}

fn make_syncer(matches: &ArgMatches) -> Result<Syncer> {
    validate_args(matches)?;

    let mut builder = SyncerBuilder::new();
    if let Some(u) = matches.get_one::<String>("manifest-url") {
        builder = builder.manifest_url(u);
    } else {
        debug!("using the default manifest URL, {DEFAULT_MANIFEST_URL}");
    }
    if let Some(dir) = matches.get_one::<String>("dir") {
        builder = builder.download_dir(dir);
    }
    if matches.get_flag("quiet") {
        builder = builder.reporter(Box::new(ConsoleReporter::quiet()));
    }

    builder.build()
}

fn validate_args(matches: &ArgMatches) -> Result<()> {
    if let Some(u) = matches.get_one::<String>("manifest-url") {
        let url = Url::parse(u).map_err(|e| {
            RelsyncError::InvalidArgsError(format!("The --manifest-url `{u}` is not a URL: {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RelsyncError::InvalidArgsError(format!(
                "The --manifest-url must be an http or https URL, not `{u}`"
            ))
            .into());
        }
    }

    if let Some(dir) = matches.get_one::<String>("dir") {
        if dir.is_empty() {
            return Err(RelsyncError::InvalidArgsError(
                "The --dir option cannot be empty.".to_string(),
            )
            .into());
        }
    }

    Ok(())
}

fn print_err(e: &Error) {
    error!("{e:#}");
    if let Some(re) = e.downcast_ref::<RelsyncError>() {
        match re {
            RelsyncError::InvalidArgsError(_) => {
                println!();
                // The argument error was already logged.
                let _ = cmd().print_help();
            }
        }
    }
}
