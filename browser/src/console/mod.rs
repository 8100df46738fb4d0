//! Command console: newline-delimited s-expressions on stdin, responses on stdout.
//!
//! Protocol: each request is a plist with a `:type` keyword and an optional
//! `:id` echoed back in the response.
//!
//! ```text
//! (:type :select :id 1 :category "Bakery")
//! (:type :response :id 1 :status :ok :changed t :view (...))
//! ```

pub mod dispatch;
pub mod server;

pub use server::ConsoleServer;
