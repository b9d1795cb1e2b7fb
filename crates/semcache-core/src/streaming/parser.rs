//! `ChunkParser` (spec.md §4.7).
//!
//! By the time `extract_content` runs, `BackgroundWriter` already has the
//! full captured byte buffer (capture is parsed once, after the stream
//! ends, not incrementally), so this is a batch decoder rather than a
//! streaming one. Grounded in the line-buffering approach of a hand-rolled
//! SSE decoder, extended to this spec's framing rules: three event
//! separators, `event:`/`data:` field recognition, comment lines, and
//! multi-line `data:` concatenation.

use thiserror::Error;

/// `PARSE_FAILED` per spec §7: the background write is discarded, the
/// foreground response is unaffected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed JSON in SSE data frame: {0}")]
    MalformedJson(String),
}

enum SseEvent {
    Data(String),
    Done,
}

/// Normalizes `\r\n` and lone `\r` to `\n` so events separated by any of
/// `\n\n`, `\r\r`, or `\r\n\r\n` collapse to the same `\n\n` boundary.
fn normalize_newlines(buf: &str) -> String {
    buf.replace("\r\n", "\n").replace('\r', "\n")
}

/// Splits a single field line `"name: value"` into `(name, value)`,
/// stripping exactly one leading space from `value` (§4.7: "leading single
/// space after the colon is stripped"). A line with no colon is a
/// field name with an empty value, per the SSE spec.
fn split_field(line: &str) -> (&str, &str) {
    match line.find(':') {
        Some(idx) => {
            let name = &line[..idx];
            let value = &line[idx + 1..];
            (name, value.strip_prefix(' ').unwrap_or(value))
        }
        None => (line, ""),
    }
}

fn parse_events(buf: &[u8]) -> Vec<SseEvent> {
    let text = String::from_utf8_lossy(buf);
    let normalized = normalize_newlines(&text);

    let mut events = Vec::new();
    for block in normalized.split("\n\n") {
        if block.is_empty() {
            continue;
        }

        let mut data_lines: Vec<&str> = Vec::new();
        for line in block.split('\n') {
            if line.is_empty() {
                continue;
            }
            let (name, value) = split_field(line);
            if name.is_empty() {
                continue; // comment line: `: ...`
            }
            if name == "data" {
                data_lines.push(value);
            }
            // other fields (event:, id:, retry:) carry no content for us
        }

        if data_lines.is_empty() {
            continue;
        }

        let data = data_lines.join("\n");
        if data == "[DONE]" {
            events.push(SseEvent::Done);
        } else {
            events.push(SseEvent::Data(data));
        }
    }
    events
}

/// Ordered concatenation of every chunk's `delta.content`, stopping at (and
/// excluding) `[DONE]`. A chunk with no `content` field contributes the
/// empty string. Any malformed JSON data frame aborts the whole parse.
pub fn extract_content(buf: &[u8]) -> Result<String, ParseError> {
    let mut content = String::new();

    for event in parse_events(buf) {
        match event {
            SseEvent::Done => break,
            SseEvent::Data(data) => {
                let value: serde_json::Value = serde_json::from_str(&data)
                    .map_err(|e| ParseError::MalformedJson(e.to_string()))?;

                if let Some(delta_content) = value
                    .get("choices")
                    .and_then(|c| c.get(0))
                    .and_then(|choice| choice.get("delta"))
                    .and_then(|delta| delta.get("content"))
                    .and_then(|c| c.as_str())
                {
                    content.push_str(delta_content);
                }
            }
        }
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str) -> String {
        format!(
            "data: {{\"id\":\"x\",\"object\":\"chat.completion.chunk\",\"created\":0,\"model\":\"m\",\"choices\":[{{\"delta\":{{\"content\":\"{content}\"}},\"index\":0,\"finish_reason\":null}}]}}\n\n"
        )
    }

    #[test]
    fn concatenates_deltas_in_order() {
        let mut buf = String::new();
        buf.push_str(&chunk("Hello "));
        buf.push_str(&chunk("world"));
        buf.push_str("data: [DONE]\n\n");

        assert_eq!(extract_content(buf.as_bytes()).unwrap(), "Hello world");
    }

    #[test]
    fn stops_at_done_sentinel() {
        let mut buf = String::new();
        buf.push_str(&chunk("kept"));
        buf.push_str("data: [DONE]\n\n");
        buf.push_str(&chunk("dropped"));

        assert_eq!(extract_content(buf.as_bytes()).unwrap(), "kept");
    }

    #[test]
    fn missing_content_field_contributes_empty_string() {
        let buf = "data: {\"choices\":[{\"delta\":{},\"index\":0,\"finish_reason\":null}]}\n\n";
        assert_eq!(extract_content(buf.as_bytes()).unwrap(), "");
    }

    #[test]
    fn comment_lines_are_ignored() {
        let mut buf = String::new();
        buf.push_str(": keep-alive\n\n");
        buf.push_str(&chunk("hi"));
        assert_eq!(extract_content(buf.as_bytes()).unwrap(), "hi");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let buf = "data: {not json}\n\n";
        assert!(matches!(
            extract_content(buf.as_bytes()),
            Err(ParseError::MalformedJson(_))
        ));
    }

    #[test]
    fn crlf_crlf_separator_is_recognized() {
        let buf = format!("{}{}", chunk("a").replace('\n', "\r\n"), "data: [DONE]\r\n\r\n");
        assert_eq!(extract_content(buf.as_bytes()).unwrap(), "a");
    }

    #[test]
    fn bare_cr_cr_separator_is_recognized() {
        let buf = "data: {\"choices\":[{\"delta\":{\"content\":\"a\"},\"index\":0,\"finish_reason\":null}]}\r\rdata: [DONE]\r\r";
        assert_eq!(extract_content(buf.as_bytes()).unwrap(), "a");
    }

    #[test]
    fn multiline_data_is_joined_with_newline() {
        let buf = "data: line one\ndata: line two\n\n";
        // two separate "data:" lines in the SAME event concatenate with \n,
        // but this isn't valid chat-completion JSON, so it still errors —
        // exercised separately against real chunk shape below.
        assert!(extract_content(buf.as_bytes()).is_err());
    }

    #[test]
    fn multiline_data_concatenates_into_one_json_document() {
        let buf = "data: {\"choices\":[{\"delta\":{\"content\":\"ab\"},\ndata: \"index\":0,\"finish_reason\":null}]}\n\n";
        assert_eq!(extract_content(buf.as_bytes()).unwrap(), "ab");
    }

    #[test]
    fn finish_reason_stop_without_done_still_extracts() {
        let buf = "data: {\"choices\":[{\"delta\":{\"content\":\"done soon\"},\"index\":0,\"finish_reason\":\"stop\"}]}\n\n";
        assert_eq!(extract_content(buf.as_bytes()).unwrap(), "done soon");
    }
}
