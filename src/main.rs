use chrono::Utc;
use clap::Parser;
use ekas_sync::args::{Args, Command, SettingsCommand, StudentsCommand, TxCommand};
use ekas_sync::model::AppSettings;
use ekas_sync::{commands, Config, Mode, NewTransaction, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().ekas_home();

    // This allows for testing the program without a deployed Apps Script. When
    // EKAS_IN_TEST_MODE is set and non-zero in length, then the mode will be
    // Mode::Test, otherwise it will be Mode::Remote.
    let mode = Mode::from_env();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.script_url())
            .await?
            .print(),

        Command::Login(login_args) => {
            let config = Config::load(home).await?;
            commands::login(config, mode, login_args.username(), login_args.password())
                .await?
                .print()
        }

        Command::Logout => {
            let config = Config::load(home).await?;
            commands::logout(config, mode).await?.print()
        }

        Command::Refresh => {
            let config = Config::load(home).await?;
            commands::refresh(config, mode).await?.print()
        }

        Command::Dashboard => {
            let config = Config::load(home).await?;
            commands::dashboard(config, mode).await?.print()
        }

        Command::Tx(tx_command) => {
            let config = Config::load(home).await?;
            match tx_command {
                TxCommand::List => commands::tx_list(config, mode).await?.print(),
                TxCommand::Add(add) => {
                    let now = Utc::now();
                    let new = NewTransaction {
                        student_id: add.student().map(str::to_string),
                        amount: add.amount(),
                        kind: add.kind().into(),
                        date: add.date().unwrap_or(now),
                        notes: add.notes().map(str::to_string),
                    };
                    commands::tx_add(config, mode, new, now).await?.print()
                }
                TxCommand::Delete(delete) => {
                    commands::tx_delete(config, mode, delete.id()).await?.print()
                }
            }
        }

        Command::Students(students_command) => {
            let config = Config::load(home).await?;
            match students_command {
                StudentsCommand::List => commands::students_list(config, mode).await?.print(),
                StudentsCommand::Add(add) => {
                    commands::students_add(config, mode, add.name(), add.nis())
                        .await?
                        .print()
                }
                StudentsCommand::Update(update) => {
                    commands::students_update(config, mode, update.id(), update.name(), update.nis())
                        .await?
                        .print()
                }
                StudentsCommand::Delete(delete) => {
                    commands::students_delete(config, mode, delete.id())
                        .await?
                        .print()
                }
            }
        }

        Command::Report(report_args) => {
            let config = Config::load(home).await?;
            commands::report(
                config,
                mode,
                report_args.kind(),
                report_args.year(),
                report_args.month(),
            )
            .await?
            .print()
        }

        Command::Settings(settings_command) => {
            let config = Config::load(home).await?;
            match settings_command {
                SettingsCommand::Show => commands::settings_show(config, mode).await?.print(),
                SettingsCommand::Update(update) => {
                    let settings = AppSettings {
                        login_title: update.login_title().to_string(),
                        login_description: update.login_description().to_string(),
                        initial_kas_balance: update.initial_kas_balance(),
                    };
                    commands::settings_update(config, mode, settings)
                        .await?
                        .print()
                }
            }
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
