//! Run one operation.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use portbridge_core::operations::standard_registry;
use portbridge_core::{CallArgs, Dispatcher, Engine, ResponseChannel};
use portbridge_store::ConfigStore;
use portbridge_types::{CallToken, ResponseEnvelope};

use crate::sink::CaptureSink;

/// Run `operation` on `token` and return the envelope it produced.
pub fn run(
    store: Option<&Path>,
    operation: &str,
    token: i64,
    args: Vec<String>,
) -> Result<ResponseEnvelope> {
    let engine: Arc<dyn Engine> = match store {
        Some(path) => Arc::new(
            ConfigStore::open(path)
                .with_context(|| format!("Failed to open store {}", path.display()))?,
        ),
        None => Arc::new(ConfigStore::in_memory()),
    };

    let sink = Arc::new(CaptureSink::default());
    let dispatcher = Dispatcher::new(
        Arc::new(standard_registry()),
        engine,
        ResponseChannel::new(sink.clone()),
    );

    let token = CallToken::new(token);
    dispatcher.execute(operation, token, CallArgs::new(args));

    let (posted_to, message) = sink
        .take()
        .into_iter()
        .next()
        .context("Operation finished without posting a response")?;
    tracing::debug!("Envelope posted to port {}", posted_to);

    ResponseEnvelope::from_json(&message).context("Posted envelope is not valid JSON")
}

/// Format an envelope for stdout.
pub fn render(envelope: &ResponseEnvelope, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(envelope)?)
    } else {
        Ok(envelope.to_json()?)
    }
}
