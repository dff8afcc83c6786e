//! Client Handle
//!
//! Spawns the serving loop on its own thread and wraps its channels.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};

use crate::config::Config;
use crate::error::{JsonKvError, Result};
use crate::protocol::{Request, Response};

use super::listener::{listen, serve, LoopExit};

/// Name of the serving loop thread
const WORKER_NAME: &str = "jsonkv-listener";

/// Client side of a running store
///
/// Read [`bootstrap`](Self::bootstrap) once before sending requests.
pub struct StoreHandle {
    requests: Sender<Request>,
    responses: Receiver<Response>,
    bootstrap: Receiver<Response>,
    worker: JoinHandle<LoopExit>,
}

impl StoreHandle {
    /// Start a store configured by `--cfg=<path>` arguments
    pub fn spawn<I, S>(cfg_args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = cfg_args
            .into_iter()
            .map(|arg| arg.as_ref().to_string())
            .collect();
        Self::start(move |input, output, bootstrap| listen(args, input, output, bootstrap))
    }

    /// Start a store from an already built config
    pub fn spawn_with_config(config: Config) -> Result<Self> {
        Self::start(move |input, output, bootstrap| serve(config, input, output, bootstrap))
    }

    fn start<F>(body: F) -> Result<Self>
    where
        F: FnOnce(Receiver<Request>, Sender<Response>, Sender<Response>) -> LoopExit
            + Send
            + 'static,
    {
        // Rendezvous queues: a hand-off completes only when both sides meet
        let (request_tx, request_rx) = bounded(0);
        let (response_tx, response_rx) = bounded(0);
        // One slot so startup never waits on the client
        let (bootstrap_tx, bootstrap_rx) = bounded(1);

        let worker = thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || body(request_rx, response_tx, bootstrap_tx))?;

        Ok(Self {
            requests: request_tx,
            responses: response_rx,
            bootstrap: bootstrap_rx,
            worker,
        })
    }

    /// Wait for the startup report
    pub fn bootstrap(&self, timeout: Duration) -> Result<Vec<String>> {
        handle_output(&self.bootstrap, timeout)
    }

    /// Submit a request; blocks until the loop takes it
    pub fn send(&self, request: Request) -> Result<()> {
        self.requests
            .send(request)
            .map_err(|_| JsonKvError::Disconnected("request queue closed".to_string()))
    }

    /// Wait for the next response
    pub fn recv(&self, timeout: Duration) -> Result<Vec<String>> {
        handle_output(&self.responses, timeout)
    }

    /// Submit a request and wait for its response
    pub fn request(&self, request: Request, timeout: Duration) -> Result<Vec<String>> {
        self.send(request)?;
        self.recv(timeout)
    }

    /// Raw response channel, for callers that want the full [`Response`]
    pub fn responses(&self) -> &Receiver<Response> {
        &self.responses
    }

    /// Check whether the serving loop has terminated
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the serving loop to terminate
    ///
    /// Drops the request sender first, so a loop still waiting for work
    /// stops with [`LoopExit::Disconnected`].
    pub fn join(self) -> Result<LoopExit> {
        let StoreHandle {
            requests, worker, ..
        } = self;
        drop(requests);
        worker
            .join()
            .map_err(|_| JsonKvError::Disconnected("serving loop panicked".to_string()))
    }
}

/// Wait up to `timeout` for one response and unpack it
///
/// On success returns every line. On failure the last line becomes the
/// error and the earlier lines are logged.
pub fn handle_output(rx: &Receiver<Response>, timeout: Duration) -> Result<Vec<String>> {
    let response = match rx.recv_timeout(timeout) {
        Ok(response) => response,
        Err(RecvTimeoutError::Timeout) => return Err(JsonKvError::DeliveryTimeout),
        Err(RecvTimeoutError::Disconnected) => {
            return Err(JsonKvError::Disconnected(
                "response queue closed".to_string(),
            ))
        }
    };

    if response.status_ok {
        return Ok(response.message);
    }

    for line in response.info_lines() {
        tracing::info!("{}", line);
    }
    Err(JsonKvError::Remote(
        response.last_line().unwrap_or_default().to_string(),
    ))
}
