//! Serving Loop
//!
//! Bootstraps the store, then serves requests until `quit`.

use std::time::Duration;

use crossbeam::channel::{Receiver, SendTimeoutError, Sender};

use crate::config::{config_path_from_args, Config};
use crate::error::{JsonKvError, Result};
use crate::processor::Processor;
use crate::protocol::{Action, Request, Response};
use crate::storage::FamilyStore;

/// Why the serving loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// A `quit` request was processed
    Quit,

    /// Every request sender was dropped
    Disconnected,

    /// Startup failed; the bootstrap message carries the reason
    BootstrapFailed,
}

impl LoopExit {
    /// Process exit code in the usual convention
    pub fn code(self) -> i32 {
        match self {
            LoopExit::Quit | LoopExit::Disconnected => 0,
            LoopExit::BootstrapFailed => 1,
        }
    }
}

/// Run the store from command-line style arguments
///
/// Looks for `--cfg=<path>`, reads that config file, then behaves like
/// [`serve`]. Meant to run on its own thread; returns once the loop is
/// terminated.
pub fn listen<I, S>(
    cfg_args: I,
    input: Receiver<Request>,
    output: Sender<Response>,
    bootstrap: Sender<Response>,
) -> LoopExit
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lines = Vec::new();

    let config_path = match config_path_from_args(cfg_args) {
        Ok(path) => path,
        Err(e) => return report_failure(&bootstrap, lines, e),
    };

    lines.push("reading config file...".to_string());
    let config = match Config::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => return report_failure(&bootstrap, lines, e),
    };
    lines.push("configuration loaded successfully".to_string());

    run(config, lines, input, output, bootstrap)
}

/// Run the store from an already built [`Config`]
pub fn serve(
    config: Config,
    input: Receiver<Request>,
    output: Sender<Response>,
    bootstrap: Sender<Response>,
) -> LoopExit {
    let lines = vec!["configuration supplied directly".to_string()];
    run(config, lines, input, output, bootstrap)
}

// =============================================================================
// Initializing
// =============================================================================

fn run(
    config: Config,
    mut lines: Vec<String>,
    input: Receiver<Request>,
    output: Sender<Response>,
    bootstrap: Sender<Response>,
) -> LoopExit {
    let processor = match initialize(&config, &mut lines) {
        Ok(processor) => processor,
        Err(e) => return report_failure(&bootstrap, lines, e),
    };

    tracing::info!(
        "jsonkv ready: {} families from {}",
        processor.table().family_count(),
        config.jsons_path.display()
    );
    if bootstrap.send(Response::ok(lines)).is_err() {
        tracing::warn!("Bootstrap receiver dropped before startup report");
    }
    // Closes the bootstrap channel
    drop(bootstrap);

    ServingLoop {
        processor,
        input,
        output,
        response_timeout: config.response_timeout,
    }
    .run()
}

/// Directory check, load, placeholder seeding
fn initialize(config: &Config, lines: &mut Vec<String>) -> Result<Processor> {
    let store = FamilyStore::open(&config.jsons_path)?;

    lines.push(format!("loading jsons from {}...", config.jsons_path.display()));
    let mut table = store.load()?;
    if table.is_empty() {
        table.seed_placeholder();
    }
    lines.push("json files loaded into memory".to_string());

    Ok(Processor::new(table, store).with_poison(config.poison.clone()))
}

fn report_failure(
    bootstrap: &Sender<Response>,
    lines: Vec<String>,
    error: JsonKvError,
) -> LoopExit {
    tracing::error!("jsonkv startup failed: {}", error);
    if bootstrap.send(Response::error(lines, error)).is_err() {
        tracing::warn!("Bootstrap receiver dropped before startup report");
    }
    LoopExit::BootstrapFailed
}

// =============================================================================
// Ready / Processing
// =============================================================================

/// The single owner of the table once startup succeeded
struct ServingLoop {
    processor: Processor,
    input: Receiver<Request>,
    output: Sender<Response>,
    response_timeout: Duration,
}

impl ServingLoop {
    /// Serve until `quit` or until all request senders are gone
    ///
    /// Consumes the loop: returning drops `output`, which closes the
    /// response channel for every client.
    fn run(mut self) -> LoopExit {
        loop {
            // Ready: wait as long as it takes for the next request
            let request = match self.input.recv() {
                Ok(request) => request,
                Err(_) => {
                    tracing::info!("Request queue closed, stopping");
                    return LoopExit::Disconnected;
                }
            };

            // Processing: runs to completion
            tracing::debug!("Received {} request", request.action);
            let quit = request.action == Action::Quit;
            let response = self.processor.execute(&request);
            self.deliver(response);

            if quit {
                tracing::info!("Quit received, stopping");
                return LoopExit::Quit;
            }
        }
    }

    /// Hand a response to a consumer, or drop it once the timeout elapses
    fn deliver(&self, response: Response) {
        match self.output.send_timeout(response, self.response_timeout) {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(response)) => {
                tracing::warn!(
                    "No consumer within {:?}, dropping response {:?}",
                    self.response_timeout,
                    response.last_line()
                );
            }
            Err(SendTimeoutError::Disconnected(_)) => {
                tracing::warn!("Response queue closed, dropping response");
            }
        }
    }
}
