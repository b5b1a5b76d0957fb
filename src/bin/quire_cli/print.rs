#![deny(clippy::all, clippy::pedantic)]

use quire::application::toasts::{Toast, ToastKind};
use serde::Serialize;

use crate::client::CliError;

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}

/// Printable form of a drained toast.
#[derive(Debug, Serialize)]
pub struct ToastLine {
    pub kind: ToastKind,
    pub text: String,
    pub ttl_ms: u64,
}

impl From<Toast> for ToastLine {
    fn from(toast: Toast) -> Self {
        Self {
            ttl_ms: toast.ttl_ms(),
            kind: toast.kind,
            text: toast.text,
        }
    }
}

pub fn toast_lines(toasts: Vec<Toast>) -> Vec<ToastLine> {
    toasts.into_iter().map(ToastLine::from).collect()
}
