use ptrscan_core::{cache_key, ScanConfig};
use serde_json::json;

use super::CommandResult;
use crate::cli::CacheKeyArgs;
use crate::error::CliError;

pub fn run(args: &CacheKeyArgs, config: &ScanConfig) -> Result<CommandResult, CliError> {
    let kind = args.chamber.document_kind();
    let key = cache_key(&args.url, kind);
    let path = config.cache_dir.join(&key);

    Ok(CommandResult::ok(json!({
        "url": args.url,
        "kind": kind,
        "key": key,
        "path": path,
        "cached": path.is_file(),
    })))
}
