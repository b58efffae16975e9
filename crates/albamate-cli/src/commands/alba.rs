//! Browsing commands: list, show, aggregates.

use albamate_core::{FormId, ListParams};

use crate::cli::{ListArgs, OutputFormat};
use crate::context::{AppContext, CliError, CliResult};
use crate::output;

pub(crate) async fn list(
    context: &AppContext,
    args: &ListArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let params = ListParams {
        limit: args.limit,
        order_by: args.order_by.into(),
        keyword: args.keyword.clone(),
        is_recruiting: args.recruiting.then_some(true),
        ..ListParams::default()
    };

    let mut list = context
        .directory
        .list(&params)
        .await
        .map_err(CliError::failure)?;

    if args.all {
        while let Some(extended) = context
            .directory
            .load_more(&params)
            .await
            .map_err(CliError::failure)?
        {
            list = extended;
        }
    }

    output::render_list(&list, format)
}

pub(crate) async fn show(context: &AppContext, form_id: i64, format: OutputFormat) -> CliResult<()> {
    let detail = context
        .directory
        .detail(FormId(form_id))
        .await
        .map_err(CliError::failure)?;
    output::render_detail(&detail, format)
}

pub(crate) async fn my_scraps(context: &AppContext, format: OutputFormat) -> CliResult<()> {
    let items = context
        .directory
        .my_scraps()
        .await
        .map_err(CliError::failure)?;
    output::render_summaries(&items, format)
}

pub(crate) async fn my_listings(context: &AppContext, format: OutputFormat) -> CliResult<()> {
    let items = context
        .directory
        .my_listings()
        .await
        .map_err(CliError::failure)?;
    output::render_summaries(&items, format)
}
