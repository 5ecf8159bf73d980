use std::io::{self, Write};

use serde::Serialize;

use crate::error::CliError;

/// Write one JSON document to stdout.
pub fn render<T: Serialize>(payload: &T, pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}
