use crate::models::HistoryItem;

/// Flatten prior turns and the new message into one prompt.
///
/// Each turn becomes `"<role>: <content>"`, the new message is appended as a
/// `user` turn, and turns are separated by a blank line.
pub fn build_prompt(history: Option<&[HistoryItem]>, message: &str) -> String {
    history
        .unwrap_or_default()
        .iter()
        .map(|item| format!("{}: {}", item.role, item.content))
        .chain(std::iter::once(format!("user: {message}")))
        .collect::<Vec<_>>()
        .join("\n\n")
}
