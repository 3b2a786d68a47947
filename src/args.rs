//! These structs provide the CLI interface for the ezpay CLI.

use crate::export::ExportFormat;
use crate::model::{
    Amount, CompositeFilter, Frequency, ScheduleUpdate, Selection, TransactionId,
    TransactionStatus, TransactionType,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing::level_filters::LevelFilter;

/// ezpay: browse, filter and export your EzPay transaction history.
///
/// The program talks to the EzPay service over HTTP. Run `ezpay init --user <you>` once to create
/// the configuration, then use `ezpay history` to page through your transactions, `ezpay filter`
/// to combine several filters, `ezpay export` to save a PDF or CSV report and `ezpay autopay` to
/// manage scheduled payments.
///
/// Set EZPAY_IN_TEST_MODE=1 to run against built-in sample data instead of the service.
#[derive(Debug, Parser, Clone)]
#[command(name = "ezpay", version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the EzPay home directory and its configuration file.
    ///
    /// This is the first command you should run. Pass the user whose history you want to view as
    /// --user; exported reports mark transactions this user received as credits. The service
    /// address defaults to http://localhost:8090 and can be given with --base-url.
    Init(InitArgs),
    /// Show your transactions, optionally narrowed by exactly one of type, status, date range or
    /// transaction ID.
    History(HistoryArgs),
    /// Show your transactions narrowed by any combination of type, status and dates.
    Filter(FilterArgs),
    /// Show every detail of a single transaction.
    Show(ShowArgs),
    /// Save the transactions you select as a PDF or CSV report.
    Export(ExportArgs),
    /// List, modify or cancel scheduled payments.
    Autopay(AutopayArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, global = true, default_value_t = LevelFilter::WARN)]
    log_level: LevelFilter,

    /// The directory where ezpay configuration and exports are held. Defaults to ~/.ezpay
    #[arg(long, global = true, env = "EZPAY_HOME", default_value_t = default_ezpay_home())]
    ezpay_home: DisplayPath,

    /// The address of the EzPay service. Overrides the address in the config file.
    #[arg(long, global = true, env = "EZPAY_BASE_URL")]
    base_url: Option<String>,

    /// Also print the structured output of the command as JSON.
    #[arg(long, global = true)]
    json: bool,
}

impl Common {
    pub fn new(
        log_level: LevelFilter,
        ezpay_home: PathBuf,
        base_url: Option<String>,
        json: bool,
    ) -> Self {
        Self {
            log_level,
            ezpay_home: ezpay_home.into(),
            base_url,
            json,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ezpay_home(&self) -> &DisplayPath {
        &self.ezpay_home
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn json(&self) -> bool {
        self.json
    }
}

/// (Not shown): Args for the `ezpay init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The EzPay user whose transactions you are viewing, e.g. user10
    #[arg(long)]
    user: String,

    /// The number of transactions shown per page.
    #[arg(long)]
    page_size: Option<usize>,
}

impl InitArgs {
    pub fn new(user: impl Into<String>, page_size: Option<usize>) -> Self {
        Self {
            user: user.into(),
            page_size,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }
}

/// (Not shown): Selects the transactions to show. At most one kind of filter may be given.
#[derive(Debug, Default, Parser, Clone)]
pub struct SelectionArgs {
    /// Only show transactions of this type.
    #[arg(long = "type", value_enum, conflicts_with_all = ["status", "from", "to", "id"])]
    transaction_type: Option<TransactionType>,

    /// Only show transactions with this status.
    #[arg(long, value_enum, conflicts_with_all = ["from", "to", "id"])]
    status: Option<TransactionStatus>,

    /// Only show transactions on or after this date (YYYY-MM-DD). Requires --to.
    #[arg(long, conflicts_with = "id")]
    from: Option<NaiveDate>,

    /// Only show transactions on or before this date (YYYY-MM-DD). Requires --from.
    #[arg(long, conflicts_with = "id")]
    to: Option<NaiveDate>,

    /// Only show the transaction with this ID.
    #[arg(long)]
    id: Option<TransactionId>,
}

impl SelectionArgs {
    pub fn new(
        transaction_type: Option<TransactionType>,
        status: Option<TransactionStatus>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        id: Option<TransactionId>,
    ) -> Self {
        Self {
            transaction_type,
            status,
            from,
            to,
            id,
        }
    }

    /// The one filter these arguments describe, or the full history when none is given.
    pub fn selection(&self) -> Selection {
        if let Some(t) = self.transaction_type {
            Selection::Type(t)
        } else if let Some(s) = self.status {
            Selection::Status(s)
        } else if let Some(id) = &self.id {
            Selection::Id(id.clone())
        } else if self.from.is_some() || self.to.is_some() {
            Selection::Dates {
                start: self.from,
                end: self.to,
            }
        } else {
            Selection::All
        }
    }
}

/// (Not shown): Args for the `ezpay history` command.
#[derive(Debug, Parser, Clone)]
pub struct HistoryArgs {
    #[clap(flatten)]
    selection: SelectionArgs,

    /// The page to show, starting at 1.
    #[arg(long)]
    page: Option<usize>,
}

impl HistoryArgs {
    pub fn new(selection: SelectionArgs, page: Option<usize>) -> Self {
        Self { selection, page }
    }

    pub fn selection(&self) -> Selection {
        self.selection.selection()
    }

    pub fn page(&self) -> Option<usize> {
        self.page
    }
}

/// (Not shown): Args for the `ezpay filter` command.
#[derive(Debug, Parser, Clone)]
pub struct FilterArgs {
    /// Only show transactions of this type.
    #[arg(long = "type", value_enum)]
    transaction_type: Option<TransactionType>,

    /// Only show transactions with this status.
    #[arg(long, value_enum)]
    status: Option<TransactionStatus>,

    /// Only show transactions on or after this date (YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Only show transactions on or before this date (YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,

    /// The page to show, starting at 1.
    #[arg(long)]
    page: Option<usize>,
}

impl FilterArgs {
    pub fn new(filter: CompositeFilter, page: Option<usize>) -> Self {
        Self {
            transaction_type: filter.transaction_type,
            status: filter.status,
            from: filter.start_date,
            to: filter.end_date,
            page,
        }
    }

    pub fn filter(&self) -> CompositeFilter {
        CompositeFilter {
            transaction_type: self.transaction_type,
            status: self.status,
            start_date: self.from,
            end_date: self.to,
        }
    }

    pub fn page(&self) -> Option<usize> {
        self.page
    }
}

/// (Not shown): Args for the `ezpay show` command.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// The ID of the transaction.
    id: TransactionId,
}

impl ShowArgs {
    pub fn new(id: impl Into<TransactionId>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }
}

/// (Not shown): Args for the `ezpay export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[clap(flatten)]
    selection: SelectionArgs,

    /// The report format.
    #[arg(long, value_enum, default_value_t = ExportFormat::Pdf)]
    format: ExportFormat,

    /// Where to save the report. Defaults to $EZPAY_HOME/exports/Transaction_History.<format>
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(selection: SelectionArgs, format: ExportFormat, output: Option<PathBuf>) -> Self {
        Self {
            selection,
            format,
            output,
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection.selection()
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

/// (Not shown): Args for the `ezpay autopay` command.
#[derive(Debug, Parser, Clone)]
pub struct AutopayArgs {
    #[command(subcommand)]
    command: AutopayCommand,
}

impl AutopayArgs {
    pub fn new(command: AutopayCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &AutopayCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum AutopayCommand {
    /// List all scheduled payments and their status.
    List,
    /// Show one scheduled payment.
    Show(AutopayIdArgs),
    /// Change the end date, frequency or amount of a scheduled payment. Cancelled payments cannot
    /// be modified.
    Modify(ModifyArgs),
    /// Stop a scheduled payment. Expired and already cancelled payments cannot be cancelled.
    Cancel(AutopayIdArgs),
}

/// (Not shown): Identifies one scheduled payment.
#[derive(Debug, Parser, Clone)]
pub struct AutopayIdArgs {
    /// The transaction ID of the scheduled payment.
    id: TransactionId,
}

impl AutopayIdArgs {
    pub fn new(id: impl Into<TransactionId>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }
}

/// (Not shown): Args for the `ezpay autopay modify` command.
#[derive(Debug, Parser, Clone)]
pub struct ModifyArgs {
    /// The transaction ID of the scheduled payment.
    id: TransactionId,

    /// The new last day of the schedule (YYYY-MM-DD).
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// The new frequency.
    #[arg(long, value_enum)]
    frequency: Option<Frequency>,

    /// The new amount, e.g. 1499 or "Rs. 1,499.00"
    #[arg(long)]
    amount: Option<Amount>,
}

impl ModifyArgs {
    pub fn new(id: impl Into<TransactionId>, update: ScheduleUpdate) -> Self {
        Self {
            id: id.into(),
            end_date: update.end_date,
            frequency: update.frequency,
            amount: update.amount,
        }
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn update(&self) -> ScheduleUpdate {
        ScheduleUpdate {
            end_date: self.end_date,
            frequency: self.frequency,
            amount: self.amount,
        }
    }
}

fn default_ezpay_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join(".ezpay"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ezpay-home or EZPAY_HOME instead of relying on the default \
                ezpay home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from(".ezpay")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("ezpay").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        <Args as CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_history_type() {
        let args = parse(&["history", "--type", "bank-transfer", "--page", "2"]).unwrap();
        let Command::History(history) = args.command() else {
            panic!("expected history");
        };
        assert_eq!(
            history.selection(),
            Selection::Type(TransactionType::BankTransfer)
        );
        assert_eq!(history.page(), Some(2));
    }

    #[test]
    fn test_history_filters_are_exclusive() {
        assert!(parse(&["history", "--type", "upi", "--status", "failure"]).is_err());
        assert!(parse(&["history", "--status", "success", "--from", "2024-09-01"]).is_err());
        assert!(parse(&["history", "--id", "5", "--to", "2024-09-01"]).is_err());
    }

    #[test]
    fn test_history_dates() {
        let args = parse(&["history", "--from", "2024-09-01", "--to", "2024-09-30"]).unwrap();
        let Command::History(history) = args.command() else {
            panic!("expected history");
        };
        assert_eq!(
            history.selection(),
            Selection::Dates {
                start: NaiveDate::from_ymd_opt(2024, 9, 1),
                end: NaiveDate::from_ymd_opt(2024, 9, 30),
            }
        );
        assert!(parse(&["history", "--from", "09/01/2024"]).is_err());
    }

    #[test]
    fn test_filter_combines() {
        let args = parse(&["filter", "--type", "upi", "--status", "success"]).unwrap();
        let Command::Filter(filter) = args.command() else {
            panic!("expected filter");
        };
        assert_eq!(filter.filter().transaction_type, Some(TransactionType::Upi));
        assert_eq!(filter.filter().status, Some(TransactionStatus::Success));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&[
            "init",
            "--user",
            "user10",
            "--base-url",
            "http://localhost:9090",
            "--json",
        ])
        .unwrap();
        assert_eq!(args.common().base_url(), Some("http://localhost:9090"));
        assert!(args.common().json());
    }

    #[test]
    fn test_autopay_modify() {
        let args = parse(&[
            "autopay",
            "modify",
            "501",
            "--frequency",
            "weekly",
            "--amount",
            "Rs. 1,499.00",
        ])
        .unwrap();
        let Command::Autopay(autopay) = args.command() else {
            panic!("expected autopay");
        };
        let AutopayCommand::Modify(modify) = autopay.command() else {
            panic!("expected modify");
        };
        assert_eq!(modify.id().as_str(), "501");
        let update = modify.update();
        assert_eq!(update.frequency, Some(Frequency::Weekly));
        assert_eq!(update.amount.unwrap().to_string(), "Rs. 1,499.00");
        assert_eq!(update.end_date, None);
    }

    #[test]
    fn test_export_defaults() {
        let args = parse(&["export", "--status", "failure"]).unwrap();
        let Command::Export(export) = args.command() else {
            panic!("expected export");
        };
        assert_eq!(export.format(), ExportFormat::Pdf);
        assert_eq!(export.output(), None);
        assert_eq!(
            export.selection(),
            Selection::Status(TransactionStatus::Failure)
        );
    }
}
