use std::sync::Arc;

use ptrscan_core::{
    DisclosureScanner, FetchOutcome, HttpClient, ReqwestHttpClient, ScanConfig, SessionAuth,
    SessionClient,
};
use serde_json::json;
use tracing::info;

use super::{filing_context, CommandResult};
use crate::cli::ScanArgs;
use crate::error::CliError;

pub async fn run(args: &ScanArgs, config: &ScanConfig) -> Result<CommandResult, CliError> {
    let context = filing_context(&args.member, args.chamber, &args.url, args.disclosure_date)?;
    let scanner = DisclosureScanner::from_config(config);

    let session = args.cookie.as_ref().map(|cookie| {
        SessionClient::new(Arc::new(ReqwestHttpClient::with_user_agent(&config.user_agent)))
            .with_auth(SessionAuth::Cookie(cookie.clone()))
    });
    let session = session.as_ref().map(|client| client as &dyn HttpClient);

    let result = scanner.scan(&context, session).await;
    let unavailable = matches!(result.entry.outcome, FetchOutcome::Failed { .. });
    info!(
        url = %context.filing_url,
        records = result.records.len(),
        unavailable,
        "scan complete"
    );

    Ok(CommandResult::ok(json!({
        "entry": result.entry,
        "records": result.records,
        "stats": scanner.stats(),
    }))
    .with_unavailable(unavailable))
}
