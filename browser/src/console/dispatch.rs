//! Console message dispatch: parse s-expressions and route to handlers.

use std::time::{SystemTime, UNIX_EPOCH};

use lexpr::Value;
use tracing::{debug, info, warn};

use crate::gesture::GestureSession;
use crate::state::BrowserState;
use crate::view::Layout;

/// Parse an s-expression message and dispatch to the appropriate handler.
/// Returns an optional response string (s-expression).
pub fn handle_message(state: &mut BrowserState, raw: &str) -> Option<String> {
    let value = match lexpr::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("malformed s-expression: {}", e);
            return Some(error_response(0, &format!("malformed s-expression: {e}")));
        }
    };

    let msg_type = get_keyword(&value, "type");
    let msg_id = get_int(&value, "id").unwrap_or(0);

    match msg_type.as_deref() {
        Some("ping") => handle_ping(msg_id, &value),
        Some("select") => handle_select(state, msg_id, &value),
        Some("overview") => handle_overview(state, msg_id),
        Some("layout") => handle_layout(state, msg_id, &value),
        Some("gesture-start") => handle_gesture_start(state, msg_id),
        Some("gesture-stop") => handle_gesture_stop(state, msg_id),
        Some("status") => handle_status(state, msg_id),
        Some("catalog") => handle_catalog(state, msg_id, &value),
        Some("quit") => handle_quit(state, msg_id),
        Some(other) => Some(error_response(
            msg_id,
            &format!("unknown message type: {other}"),
        )),
        None => Some(error_response(msg_id, "missing :type field")),
    }
}

// ── Handlers ────────────────────────────────────────────────

fn handle_ping(msg_id: i64, value: &Value) -> Option<String> {
    let client_ts = get_int(value, "timestamp").unwrap_or(0);
    let server_ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    Some(format!(
        "(:type :response :id {} :status :ok :client-timestamp {} :server-timestamp {})",
        msg_id, client_ts, server_ts
    ))
}

fn handle_select(state: &mut BrowserState, msg_id: i64, value: &Value) -> Option<String> {
    let Some(name) = get_string(value, "category") else {
        return Some(error_response(msg_id, "missing :category parameter"));
    };
    let changed = state.select_category(&name);
    if changed {
        if let Some(category) = state.view.current_category(&state.catalog) {
            debug!(
                "Selected category {} ({} subcategories)",
                category.name,
                category.subcategories.len()
            );
        }
    }
    Some(format!(
        "(:type :response :id {} :status :ok :changed {} :view {})",
        msg_id,
        if changed { "t" } else { "nil" },
        state.view.status_sexp()
    ))
}

fn handle_overview(state: &mut BrowserState, msg_id: i64) -> Option<String> {
    state.toggle_overview();
    Some(format!(
        "(:type :response :id {} :status :ok :view {})",
        msg_id,
        state.view.status_sexp()
    ))
}

fn handle_layout(state: &mut BrowserState, msg_id: i64, value: &Value) -> Option<String> {
    let Some(name) = get_string(value, "name") else {
        return Some(error_response(msg_id, "missing :name parameter"));
    };
    let Some(layout) = Layout::from_str(&name) else {
        return Some(error_response(
            msg_id,
            &format!("unknown layout: {name} (vertical, horizontal, split)"),
        ));
    };
    state.set_layout(layout);
    info!("Layout set to {}", layout.as_str());
    Some(format!(
        "(:type :response :id {} :status :ok :view {})",
        msg_id,
        state.view.status_sexp()
    ))
}

fn handle_gesture_start(state: &mut BrowserState, msg_id: i64) -> Option<String> {
    match GestureSession::start(state) {
        Ok(()) => Some(format!(
            "(:type :response :id {} :status :ok :gesture \"{}\")",
            msg_id,
            escape_string(&state.gesture.status().to_string())
        )),
        Err(e) => Some(error_response(msg_id, &e.to_string())),
    }
}

fn handle_gesture_stop(state: &mut BrowserState, msg_id: i64) -> Option<String> {
    GestureSession::stop(state);
    Some(ok_response(msg_id))
}

fn handle_status(state: &mut BrowserState, msg_id: i64) -> Option<String> {
    Some(format!(
        "(:type :response :id {} :status :ok :state {})",
        msg_id,
        state.status_sexp()
    ))
}

fn handle_catalog(state: &mut BrowserState, msg_id: i64, value: &Value) -> Option<String> {
    let Some(name) = get_string(value, "category") else {
        return Some(format!(
            "(:type :response :id {} :status :ok :categories {})",
            msg_id,
            state.catalog.names_sexp()
        ));
    };
    match state.catalog.lookup(&name) {
        Some(category) => {
            let subs: Vec<String> = category
                .subcategories
                .iter()
                .map(|s| format!("\"{}\"", escape_string(s)))
                .collect();
            Some(format!(
                "(:type :response :id {} :status :ok :category \"{}\" :subcategories ({}))",
                msg_id,
                escape_string(category.name),
                subs.join(" ")
            ))
        }
        None => Some(error_response(msg_id, &format!("unknown category: {name}"))),
    }
}

fn handle_quit(state: &mut BrowserState, msg_id: i64) -> Option<String> {
    info!("Quit requested from console");
    state.running = false;
    Some(ok_response(msg_id))
}

// ── Helpers ────────────────────────────────────────────────

fn ok_response(id: i64) -> String {
    format!("(:type :response :id {} :status :ok)", id)
}

pub(super) fn error_response(id: i64, reason: &str) -> String {
    format!(
        "(:type :response :id {} :status :error :reason \"{}\")",
        id,
        escape_string(reason)
    )
}

/// Escape a string for s-expression output.
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Extract a keyword value from an s-expression plist.
/// Accepts both `Value::Keyword("key")` and `Value::Symbol(":key")` forms.
fn get_keyword(value: &Value, key: &str) -> Option<String> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        if is_key {
            let Value::Cons(next) = pair.cdr() else {
                return None;
            };
            let val = next.car();
            return match val {
                Value::Keyword(v) => Some(v.to_string()),
                Value::Symbol(v) => {
                    let s = v.to_string();
                    Some(s.strip_prefix(':').unwrap_or(&s).to_string())
                }
                Value::String(v) => Some(v.to_string()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(if *b { "t" } else { "nil" }.to_string()),
                Value::Null => Some("nil".to_string()),
                _ => Some(val.to_string()),
            };
        }
        current = pair.cdr();
    }
    None
}

/// Extract an integer value from an s-expression plist.
fn get_int(value: &Value, key: &str) -> Option<i64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Extract a string value from an s-expression plist.
fn get_string(value: &Value, key: &str) -> Option<String> {
    get_keyword(value, key)
}
