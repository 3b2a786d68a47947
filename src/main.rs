use clap::Parser;
use ezpay_history::args::{Args, AutopayCommand, Command};
use ezpay_history::{commands, error_type, Config, ErrorType, IntoResult, Mode, Result};
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
            error!("Exiting with error: {e:#}");
            match error_type(&e) {
                Some(ErrorType::Validation) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let common = args.common();
    let home = common.ezpay_home().path();
    let json = common.json();

    // When EZPAY_IN_TEST_MODE is set and non-empty the program runs against built-in sample data
    // instead of the EzPay service.
    let mode = Mode::from_env();

    if let Command::Init(init_args) = args.command() {
        commands::init(
            home,
            common.base_url(),
            init_args.user(),
            init_args.page_size(),
        )
        .await?
        .print(json);
        return Ok(());
    }

    let config = Config::load(home)
        .await
        .and_then(|config| config.with_base_url(common.base_url()))
        .pub_result(ErrorType::Config)?;

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(_) => {}

        Command::History(history_args) => commands::history(
            config,
            mode,
            history_args.selection(),
            history_args.page(),
        )
        .await?
        .print(json),

        Command::Filter(filter_args) => {
            commands::filter(config, mode, filter_args.filter(), filter_args.page())
                .await?
                .print(json)
        }

        Command::Show(show_args) => commands::show(config, mode, show_args.id())
            .await?
            .print(json),

        Command::Export(export_args) => commands::export(
            config,
            mode,
            export_args.selection(),
            export_args.format(),
            export_args.output(),
        )
        .await?
        .print(json),

        Command::Autopay(autopay_args) => match autopay_args.command() {
            AutopayCommand::List => commands::autopay_list(config, mode).await?.print(json),
            AutopayCommand::Show(id_args) => commands::autopay_show(config, mode, id_args.id())
                .await?
                .print(json),
            AutopayCommand::Modify(modify_args) => commands::autopay_modify(
                config,
                mode,
                modify_args.id(),
                modify_args.update(),
            )
            .await?
            .print(json),
            AutopayCommand::Cancel(id_args) => {
                commands::autopay_cancel(config, mode, id_args.id())
                    .await?
                    .print(json)
            }
        },
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
                env!("CARGO_PKG_NAME").replace('-', "_"),
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
