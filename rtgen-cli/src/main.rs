//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

mod config;
mod error;
mod store;

use std::path::Path;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use config::{Config, LoggingFileRotation, LoggingFmtStyle};
use error::{Error, with_source};
use rtgen_control::compile::{self, RouteInput};
use rtgen_control::daemon::Birdc;
use rtgen_control::reconfigure::{Reconfigure, ReconfigureOutcome};
use rtgen_policy::config::PolicyContext;
use rtgen_policy::gshut::{GshutController, PolicySnapshot};
use store::Store;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_subscriber::prelude::*;

fn init_tracing(config: &config::Logging) {
    // Enable logging to a file.
    let file = config.file.enabled.then(|| {
        let file_appender = match config.file.rotation {
            LoggingFileRotation::Never => {
                rolling::never(&config.file.dir, &config.file.name)
            }
            LoggingFileRotation::Hourly => {
                rolling::hourly(&config.file.dir, &config.file.name)
            }
            LoggingFileRotation::Daily => {
                rolling::daily(&config.file.dir, &config.file.name)
            }
        };

        let log_level_filter = LevelFilter::from_level(tracing::Level::TRACE);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(false)
            .with_thread_ids(config.file.fmt.show_thread_id)
            .with_file(config.file.fmt.show_source)
            .with_line_number(config.file.fmt.show_source)
            .with_ansi(config.file.fmt.colors);
        let layer = match config.file.fmt.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        };
        layer.with_filter(log_level_filter)
    });

    // Enable logging to stderr. Stdout is reserved for command output.
    let stderr = config.stderr.enabled.then(|| {
        let log_level_filter = LevelFilter::from_level(tracing::Level::TRACE);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(config.stderr.fmt.show_thread_id)
            .with_file(config.stderr.fmt.show_source)
            .with_line_number(config.stderr.fmt.show_source)
            .with_ansi(config.stderr.fmt.colors);
        let layer = match config.stderr.fmt.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        };
        layer.with_filter(log_level_filter)
    });

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rtgen=debug"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(file)
        .with(stderr)
        .init();
}

fn build_version() -> String {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    match rustc_tools_util::get_version_info!().commit_hash {
        Some(hash) => format!("{VERSION} ({hash})"),
        None => VERSION.to_owned(),
    }
}

fn build_cli<'a, 'b>() -> App<'a, 'b> {
    let peer_arg = Arg::with_name("peer")
        .required(true)
        .index(1)
        .help("Peer name, as configured under [policy.peers].");

    App::new("BGP routing-policy compiler")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("file")
                .global(true)
                .help("Specify an alternative configuration file."),
        )
        .subcommand(
            SubCommand::with_name("compile")
                .about("Run routes through the compiled policy")
                .arg(
                    Arg::with_name("input")
                        .short("i")
                        .long("input")
                        .value_name("file")
                        .help("Read routes from a file instead of stdin."),
                ),
        )
        .subcommand(
            SubCommand::with_name("configure")
                .about("Write the compiled policy and reload the daemon"),
        )
        .subcommand(
            SubCommand::with_name("graceful-shutdown")
                .about("Manage graceful shutdown of BGP peers")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("add")
                        .about("Start graceful shutdown of a peer")
                        .arg(peer_arg.clone()),
                )
                .subcommand(
                    SubCommand::with_name("remove")
                        .about("Stop graceful shutdown of a peer")
                        .arg(peer_arg),
                )
                .subcommand(
                    SubCommand::with_name("list")
                        .about("List peers under graceful shutdown"),
                ),
        )
}

// ===== commands =====

async fn run(config: &Config, matches: &ArgMatches<'_>) -> Result<(), Error> {
    let ctx = PolicyContext::new(&config.policy)?;
    let mut store = Store::open(&config.database_path)?;
    let controller = GshutController::new(PolicySnapshot::new(
        0,
        ctx.graceful_shutdown,
        store.gshut_peers(),
    ));

    match matches.subcommand() {
        ("compile", Some(matches)) => {
            let input = matches.value_of("input");
            compile_routes(config, &ctx, &controller, input)
        }
        ("configure", _) => {
            let staged = controller.set_global(ctx.graceful_shutdown);
            apply(config, &ctx, &controller, &mut store, staged).await
        }
        ("graceful-shutdown", Some(matches)) => match matches.subcommand() {
            ("add", Some(matches)) => {
                let peer = matches.value_of("peer").unwrap_or_default();
                let staged = controller.add(&ctx, peer)?;
                apply(config, &ctx, &controller, &mut store, staged).await
            }
            ("remove", Some(matches)) => {
                let peer = matches.value_of("peer").unwrap_or_default();
                let staged = controller.remove(&ctx, peer)?;
                apply(config, &ctx, &controller, &mut store, staged).await
            }
            ("list", _) => {
                for peer in controller.list() {
                    println!("{peer}");
                }
                Ok(())
            }
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}

fn compile_routes(
    config: &Config,
    ctx: &PolicyContext,
    controller: &GshutController,
    input: Option<&str>,
) -> Result<(), Error> {
    let input = match input {
        Some(path) => std::fs::read_to_string(path),
        None => std::io::read_to_string(std::io::stdin()),
    }
    .map_err(Error::Input)?;
    let inputs: Vec<RouteInput> = serde_json::from_str(&input)?;

    let snapshot = controller.load();
    let output =
        compile::compile(ctx, &snapshot, inputs, &config.redistribute)?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

async fn apply(
    config: &Config,
    ctx: &PolicyContext,
    controller: &GshutController,
    store: &mut Store,
    staged: PolicySnapshot,
) -> Result<(), Error> {
    let daemon = Birdc::new(&config.bird.birdc, &config.bird.socket);
    let reconfigure = Reconfigure {
        ctx,
        controller,
        daemon: &daemon,
        policy_file: Path::new(&config.bird.policy_file),
        retry: config.bird.retry(),
    };

    let (snapshot, outcome) = reconfigure.apply(staged).await?;
    store.save_gshut_peers(&snapshot)?;

    match outcome {
        ReconfigureOutcome::Applied => {
            info!("policy applied");
            println!("policy applied");
        }
        ReconfigureOutcome::Unconfirmed => {
            warn!("policy applied, daemon status unconfirmed");
            println!("policy applied, daemon status unconfirmed");
        }
    }

    Ok(())
}

// ===== main =====

fn main() {
    // Parse command-line parameters.
    let version = build_version();
    let matches = build_cli().version(version.as_str()).get_matches();

    // Read configuration file.
    let config_file = matches.value_of("config");
    let config = match Config::load(config_file) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("rtgen: {}", with_source(&error));
            std::process::exit(1);
        }
    };

    // Initialize tracing.
    init_tracing(&config.logging);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("rtgen: failed to create async runtime: {error}");
            std::process::exit(1);
        }
    };

    if let Err(error) = runtime.block_on(run(&config, &matches)) {
        error.log();
        eprintln!("rtgen: {}", with_source(&error));
        std::process::exit(1);
    }
}
