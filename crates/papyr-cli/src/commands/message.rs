//! Message command - find the document attached to a chat message.

use super::show::print_document;
use super::{load, open_ingestor, resolve_user};
use anyhow::Result;

pub fn run(user: Option<String>, message_id: &str, text: bool) -> Result<()> {
    let (config, paths) = load()?;
    let owner = resolve_user(user, &config);
    let ingestor = open_ingestor(&config, &paths)?;

    let doc = ingestor.find_by_message(message_id, &owner)?;
    print_document(&doc, &config.ui.date_format, text);

    Ok(())
}
