//! Headless run loop: console-driven browsing with optional gesture control.
//!
//! Supports configurable poll intervals, graceful signal handling, an
//! exit timer for CI, and periodic status logging.

use std::io::BufReader;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use calloop::EventLoop;
use tracing::{info, warn};

use crate::console::ConsoleServer;
use crate::gesture::overlay::TraceOverlay;
use crate::gesture::GestureSession;
use crate::state::{BrowserState, HostConfig};

/// Global flag set by SIGTERM/SIGINT handlers.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Install signal handlers for graceful shutdown (SIGTERM, SIGINT).
fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGTERM, signal_handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, signal_handler as libc::sighandler_t);
    }
}

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Run the browser until quit, a signal, or the exit timer.
pub fn run(config: HostConfig, session: GestureSession) -> anyhow::Result<()> {
    let mut event_loop = EventLoop::<BrowserState>::try_new()?;
    let mut state = BrowserState::new(event_loop.handle(), &config, session);

    ConsoleServer::bind(
        BufReader::new(std::io::stdin()),
        std::io::stdout(),
        &event_loop.handle(),
    )?;

    install_signal_handlers();

    if config.debug_overlay {
        state.gesture.set_overlay(Box::new(TraceOverlay::new()));
    }

    if config.start_gesture {
        // A failed start leaves browsing usable; the reason is in the status.
        if let Err(e) = GestureSession::start(&mut state) {
            warn!("Continuing without gesture control: {}", e);
        }
    }

    let start_time = Instant::now();
    let exit_duration = config.exit_after.map(Duration::from_secs);
    let mut last_status_log = Instant::now();
    let status_interval = Duration::from_secs(config.status_interval_secs.max(1));

    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    info!(
        "Headless loop initialized (poll interval: {}ms), entering event loop",
        config.poll_interval_ms
    );

    while state.running {
        // Check global shutdown flag (set by signal handler)
        if SHUTDOWN_REQUESTED.load(Ordering::SeqCst) {
            info!("Shutdown signal received, exiting");
            state.running = false;
            break;
        }

        // Exit timer for CI
        if let Some(dur) = exit_duration {
            if start_time.elapsed() >= dur {
                info!("Exit timer fired after {}s", dur.as_secs());
                state.running = false;
                break;
            }
        }

        // Periodic status logging
        if last_status_log.elapsed() >= status_interval {
            let stats = state.gesture.stats();
            info!(
                layout = state.view.layout().as_str(),
                selected = state.view.selected_category().unwrap_or("-"),
                overview = state.view.overview_mode(),
                offset = state.scroll_offset().unwrap_or(0.0),
                "Status: {} | panel {:?} | {} frame(s), {} swipe(s), {} console request(s)",
                state.gesture.status(),
                state.current_panel(),
                stats.frames,
                stats.swipes,
                state.console.requests
            );
            last_status_log = Instant::now();
        }

        event_loop.dispatch(Some(poll_interval), &mut state)?;
    }

    GestureSession::stop(&mut state);

    info!(
        "Shutting down ({} console request(s), {} error(s))",
        state.console.requests, state.console.errors
    );
    Ok(())
}
