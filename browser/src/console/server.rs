//! Console server: line reader thread + response writer.

use std::io::{BufRead, Write};

use calloop::channel::{self, Event as ChannelEvent};
use calloop::LoopHandle;
use tracing::{debug, info, warn};

use super::dispatch;
use crate::state::BrowserState;

/// Maximum accepted request length in bytes.
const MAX_LINE_LENGTH: usize = 4096;

/// Console bookkeeping kept in [`BrowserState`].
#[derive(Debug, Default)]
pub struct ConsoleServer {
    /// Log every request and response.
    pub trace: bool,
    /// Requests handled.
    pub requests: u64,
    /// Requests answered with an error.
    pub errors: u64,
    /// Whether the input side has closed.
    pub input_closed: bool,
}

impl ConsoleServer {
    pub fn new(trace: bool) -> Self {
        Self {
            trace,
            ..Default::default()
        }
    }

    /// Start reading requests from `reader` and register the feed with calloop.
    ///
    /// Lines are read on a dedicated thread; responses are written to
    /// `writer` from the event loop.
    pub fn bind<R, W>(
        reader: R,
        mut writer: W,
        loop_handle: &LoopHandle<'static, BrowserState>,
    ) -> anyhow::Result<()>
    where
        R: BufRead + Send + 'static,
        W: Write + 'static,
    {
        let (sender, lines) = channel::channel::<String>();

        std::thread::Builder::new()
            .name("console-reader".into())
            .spawn(move || {
                for line in reader.lines() {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            warn!("console read error: {}", e);
                            break;
                        }
                    };
                    if sender.send(line).is_err() {
                        break;
                    }
                }
                debug!("console reader finished");
            })?;

        loop_handle
            .insert_source(lines, move |event, _, state: &mut BrowserState| match event {
                ChannelEvent::Msg(line) => {
                    if let Some(response) = Self::handle_line(state, &line) {
                        if let Err(e) = writeln!(writer, "{}", response).and_then(|_| writer.flush())
                        {
                            warn!("console write error: {}", e);
                        }
                    }
                }
                ChannelEvent::Closed => {
                    state.console.input_closed = true;
                    info!("Console input closed");
                }
            })
            .map_err(|e| anyhow::anyhow!("failed to register console: {}", e.error))?;

        info!("Console listening on stdin");
        Ok(())
    }

    /// Dispatch one input line. Blank lines produce no response.
    pub fn handle_line(state: &mut BrowserState, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        state.console.requests += 1;
        if state.console.trace {
            info!("<< {}", line);
        }

        let response = if line.len() > MAX_LINE_LENGTH {
            warn!(len = line.len(), "console request exceeds maximum length");
            Some(dispatch::error_response(0, "request too long"))
        } else {
            dispatch::handle_message(state, line)
        };

        if let Some(ref resp) = response {
            if resp.contains(":status :error") {
                state.console.errors += 1;
            }
            if state.console.trace {
                info!(">> {}", resp);
            }
        }
        response
    }
}
