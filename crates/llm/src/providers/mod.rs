//! Reasoning provider implementations.

pub mod ollama;
pub mod openai;
pub mod scripted;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use scripted::ScriptedClient;

/// Append `bytes` to `buffer` and return every complete line it now holds.
///
/// Network chunks do not respect line boundaries, so partial lines stay in
/// the buffer until the rest arrives.
pub(crate) fn drain_lines(buffer: &mut String, bytes: &[u8]) -> Vec<String> {
    buffer.push_str(&String::from_utf8_lossy(bytes));

    let mut lines = Vec::new();
    while let Some(pos) = buffer.find('\n') {
        let line: String = buffer.drain(..=pos).collect();
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_lines_keeps_partial_tail() {
        let mut buffer = String::new();
        let lines = drain_lines(&mut buffer, b"{\"a\":1}\n{\"b\"");
        assert_eq!(lines, vec!["{\"a\":1}".to_string()]);
        assert_eq!(buffer, "{\"b\"");

        let lines = drain_lines(&mut buffer, b":2}\n\n");
        assert_eq!(lines, vec!["{\"b\":2}".to_string()]);
        assert!(buffer.is_empty());
    }
}
