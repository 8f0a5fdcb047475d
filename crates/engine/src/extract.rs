//! Reply extraction: plain text plus raw citations out of a thread message.

use gl_domain::citation::RawCitation;
use gl_upstream::types::ThreadMessage;

/// Pull reply text and raw citation annotations out of the latest assistant
/// message.
///
/// Text-typed content blocks are concatenated in document order and
/// trimmed; a `None` message or one with no text yields an empty string
/// (the caller maps that to `NoReplyFound`). Annotations contribute a raw
/// citation only for the file-citation kind (optional quote) and the
/// file-path kind (no quote); anything else is ignored.
pub fn extract(message: Option<&ThreadMessage>) -> (String, Vec<RawCitation>) {
    let message = match message {
        Some(m) => m,
        None => return (String::new(), Vec::new()),
    };

    let mut text_parts: Vec<&str> = Vec::new();
    let mut citations: Vec<RawCitation> = Vec::new();

    for block in &message.content {
        let text = match (block.kind.as_str(), block.text.as_ref()) {
            ("text", Some(t)) => t,
            _ => continue,
        };
        text_parts.push(&text.value);

        for annotation in &text.annotations {
            match annotation.kind.as_str() {
                "file_citation" => {
                    if let Some(file_id) = annotation
                        .file_citation
                        .as_ref()
                        .and_then(|c| c.file_id.clone())
                    {
                        citations.push(RawCitation {
                            file_id,
                            quote: annotation
                                .file_citation
                                .as_ref()
                                .and_then(|c| c.quote.clone()),
                        });
                    }
                }
                "file_path" => {
                    if let Some(file_id) = annotation
                        .file_path
                        .as_ref()
                        .and_then(|p| p.file_id.clone())
                    {
                        citations.push(RawCitation {
                            file_id,
                            quote: None,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    (text_parts.join("\n").trim().to_string(), citations)
}
