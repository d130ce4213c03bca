//! The relay loop.
//!
//! One outbound WebSocket connection to the MCP server, processed strictly
//! sequentially: receive a message, build the prompt, run one generation
//! call, send the normalized text back. Exactly one generation call is in
//! flight at any time; the next message is not read until the previous reply
//! (or its error report) has been sent.
//!
//! Failures split into two tiers. Anything that goes wrong while producing a
//! reply is caught per message: logged, reported to the peer as
//! `Error: ...`, and the loop keeps going. Anything that goes wrong with the
//! connection itself ends the session; there is no reconnect.

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;

use crate::model::GenerativeModel;
use crate::reply;

/// Longest prefix of message content echoed into the log by default.
const PREVIEW_LIMIT: usize = 50;

/// How a relay session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentExit {
    /// The peer closed the connection, or the transport dropped mid-session.
    Closed,
    /// The server refused the connection outright.
    Refused,
    /// The connection attempt failed for another reason.
    Failed,
    /// An interrupt asked the agent to stop.
    Cancelled,
}

/// Options for one relay session.
#[derive(Debug, Clone)]
pub struct RelayOptions {
    /// WebSocket address of the MCP server.
    pub server_url: String,
    /// Log full message content instead of truncated previews.
    pub verbose: bool,
}

/// Build the prompt for one inbound message. The message is embedded
/// verbatim.
pub fn build_prompt(message: &str) -> String {
    format!(
        "Based on the following browser context, what is the next logical action? Context: {message}"
    )
}

/// Preview of message content for logging. Truncated to a bounded prefix
/// unless verbose logging was requested; counted in characters so multi-byte
/// content never splits.
pub fn preview(content: &str, verbose: bool) -> String {
    if verbose || content.chars().count() <= PREVIEW_LIMIT {
        return content.to_string();
    }
    let prefix: String = content.chars().take(PREVIEW_LIMIT).collect();
    format!("{prefix}...")
}

fn describe_binary(data: &Bytes) -> String {
    format!("<{} bytes of binary data>", data.len())
}

fn is_connection_refused(err: &tungstenite::Error) -> bool {
    matches!(err, tungstenite::Error::Io(io_err)
        if io_err.kind() == std::io::ErrorKind::ConnectionRefused)
}

/// Connect to the MCP server and relay messages until the connection ends
/// or the token is cancelled.
pub async fn run(
    opts: &RelayOptions,
    model: &dyn GenerativeModel,
    cancel: CancellationToken,
) -> AgentExit {
    println!("Attempting to connect to MCP server at {}...", opts.server_url);

    let ws_stream = match connect_async(opts.server_url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(err) if is_connection_refused(&err) => {
            println!(
                "Connection refused. Is the MCP server running at {}?",
                opts.server_url
            );
            return AgentExit::Refused;
        }
        Err(err) => {
            println!("An unexpected error occurred: {err}");
            return AgentExit::Failed;
        }
    };

    println!("Connection established. Agent is running and waiting for messages.");

    let (mut writer, mut reader) = ws_stream.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = writer.send(Message::Close(None)).await;
                return AgentExit::Cancelled;
            }
            incoming = reader.next() => {
                let message = match incoming {
                    Some(Ok(message)) => message,
                    Some(Err(err)) => {
                        println!("Connection closed unexpectedly: {err}");
                        return AgentExit::Closed;
                    }
                    None => {
                        println!("Connection closed by server.");
                        return AgentExit::Closed;
                    }
                };

                // Classification only affects the log preview; binary
                // payloads flow into the prompt via lossy UTF-8.
                let content = match message {
                    Message::Text(text) => {
                        println!("< Received from server: {}", preview(&text, opts.verbose));
                        text.to_string()
                    }
                    Message::Binary(data) => {
                        println!("< Received from server: {}", describe_binary(&data));
                        String::from_utf8_lossy(&data).into_owned()
                    }
                    Message::Close(frame) => {
                        match frame {
                            Some(frame) => println!(
                                "Connection closed unexpectedly: {} (code {})",
                                frame.reason.as_str(),
                                u16::from(frame.code),
                            ),
                            None => println!("Connection closed by server."),
                        }
                        return AgentExit::Closed;
                    }
                    Message::Ping(payload) => {
                        if writer.send(Message::Pong(payload)).await.is_err() {
                            println!("Connection closed unexpectedly: failed to answer ping");
                            return AgentExit::Closed;
                        }
                        continue;
                    }
                    // Pong and raw frames carry nothing to relay.
                    _ => continue,
                };

                let reply_text = match model.generate(&build_prompt(&content)).await {
                    Ok(value) => reply::normalize(&value),
                    Err(err) => {
                        let error_message =
                            format!("Error processing message with AI model: {err}");
                        println!("{error_message}");
                        let report = format!("Error: {error_message}");
                        if let Err(send_err) = writer.send(Message::Text(report.into())).await {
                            println!("Connection closed unexpectedly: {send_err}");
                            return AgentExit::Closed;
                        }
                        continue;
                    }
                };

                println!("> Sending to server: {}", preview(&reply_text, opts.verbose));
                if let Err(err) = writer.send(Message::Text(reply_text.into())).await {
                    println!("Connection closed unexpectedly: {err}");
                    return AgentExit::Closed;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_message_verbatim() {
        let message = "clicked #submit, page title: Caf\u{e9} \u{2615}";
        let prompt = build_prompt(message);
        assert!(prompt.contains(message));
        assert!(prompt.starts_with("Based on the following browser context"));
    }

    #[test]
    fn short_content_is_not_truncated() {
        assert_eq!(preview("hello", false), "hello");
    }

    #[test]
    fn boundary_length_is_not_truncated() {
        let exact: String = "x".repeat(PREVIEW_LIMIT);
        assert_eq!(preview(&exact, false), exact);
    }

    #[test]
    fn long_content_truncates_with_ellipsis() {
        let long = "a".repeat(PREVIEW_LIMIT + 1);
        let out = preview(&long, false);
        assert_eq!(out, format!("{}...", "a".repeat(PREVIEW_LIMIT)));
    }

    #[test]
    fn verbose_disables_truncation() {
        let long = "b".repeat(PREVIEW_LIMIT * 4);
        assert_eq!(preview(&long, true), long);
    }

    #[test]
    fn truncation_respects_character_boundaries() {
        let long = "é".repeat(PREVIEW_LIMIT + 10);
        let out = preview(&long, false);
        assert_eq!(out.chars().count(), PREVIEW_LIMIT + 3);
    }

    #[test]
    fn binary_preview_reports_length_only() {
        let data = Bytes::from_static(&[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(describe_binary(&data), "<4 bytes of binary data>");
    }

    #[test]
    fn refused_io_errors_are_recognized() {
        let refused = tungstenite::Error::Io(std::io::ErrorKind::ConnectionRefused.into());
        assert!(is_connection_refused(&refused));

        let other = tungstenite::Error::Io(std::io::ErrorKind::TimedOut.into());
        assert!(!is_connection_refused(&other));
    }
}
