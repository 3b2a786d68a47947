use crate::api::{self, Mode};
use crate::commands::history::fetch_failure;
use crate::commands::Out;
use crate::controller::FilterController;
use crate::error::{ErrorType, IntoResult};
use crate::export::{ExportFormat, Report};
use crate::model::Selection;
use crate::{utils, Config, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

const INCOMPLETE_RANGE_MESSAGE: &str =
    "Both --from and --to are needed to filter by date range, nothing was exported";

/// Where a report was written.
#[derive(Debug, Clone, Serialize)]
pub struct Exported {
    path: PathBuf,
    format: ExportFormat,
    rows: usize,
}

impl Exported {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}

/// Fetches the transactions for `selection` and saves all of them, not just one page, as a report.
///
/// # Arguments
/// - `output` - The file to write, `None` for `$EZPAY_HOME/exports/Transaction_History.<ext>`
///
/// # Errors
/// - Fails as `history` does when nothing could be fetched.
/// - `Export` when the report cannot be rendered or written.
pub async fn export(
    config: Config,
    mode: Mode,
    selection: Selection,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<Out<Exported>> {
    let backend = api::backend(&config, mode)?;
    let mut controller = FilterController::new(config.page_size());
    controller
        .select(backend.as_ref(), selection, utils::today())
        .await
        .map_err(fetch_failure)?;
    if controller.transactions().is_empty() {
        return Ok(INCOMPLETE_RANGE_MESSAGE.into());
    }

    let report = Report::new(controller.transactions(), config.session_user());
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => config.exports().join(format.default_file_name()),
    };
    report
        .save(format, &path)
        .await
        .pub_result(ErrorType::Export)?;

    let exported = Exported {
        path,
        format,
        rows: report.rows().len(),
    };
    Ok(Out::new(
        format!(
            "Exported {} transactions to {}",
            exported.rows,
            exported.path.display()
        ),
        exported,
    ))
}
