//! Scrap toggle command.

use albamate_core::FormId;
use albamate_sync::ToggleOutcome;

use crate::cli::OutputFormat;
use crate::context::{AppContext, CliError, CliResult};
use crate::output;

pub(crate) async fn toggle(
    context: &AppContext,
    form_id: i64,
    format: OutputFormat,
) -> CliResult<()> {
    let form_id = FormId(form_id);
    let mut stream = context.notices.subscribe(None);

    // Prime the cache so the toggle resolves real server state rather than
    // the fallback. A fetch failure is not fatal here; the toggle falls
    // back to its local default.
    let _ = context.directory.detail(form_id).await;

    let outcome = context.controller.toggle(form_id).await;
    output::render_notices(&stream.drain_ready());

    match outcome {
        ToggleOutcome::Confirmed { .. } | ToggleOutcome::ConflictCorrected => {
            // The toggle invalidated the detail entry; this read-through
            // fetch shows the converged server state.
            let detail = context
                .directory
                .detail(form_id)
                .await
                .map_err(CliError::failure)?;
            output::render_detail(&detail, format)
        }
        ToggleOutcome::RolledBack => Err(CliError::failure(anyhow::anyhow!(
            "scrap toggle failed and was rolled back"
        ))),
        ToggleOutcome::Unauthenticated => Err(CliError::validation(
            "sign in required: provide --token or set ALBAMATE_TOKEN",
        )),
        ToggleOutcome::Skipped => Err(CliError::validation(
            "another scrap toggle is already in flight",
        )),
    }
}
