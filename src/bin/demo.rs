//! jsonkv Demo Client
//!
//! Starts the store on a background thread and drives it through its
//! request/response channels.

use std::io;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use crossbeam::channel::RecvTimeoutError;
use jsonkv::config::{config_path_from_args, Config};
use jsonkv::protocol::{read_request, write_response};
use jsonkv::{Action, JsonKvError, Request, StoreHandle};
use tracing_subscriber::{fmt, EnvFilter};

/// jsonkv demo
#[derive(Parser, Debug)]
#[command(name = "jsonkv-demo")]
#[command(about = "Drives an embedded jsonkv store through its channels")]
#[command(version)]
struct Args {
    /// Path to the JSON config file (--cfg=/path/to/file.json)
    #[arg(long)]
    cfg: Option<String>,

    /// Seconds to wait for each response
    #[arg(short, long, default_value = "60")]
    wait_secs: u64,

    /// Skip the step that lets a response expire unread
    #[arg(long)]
    skip_timeout_demo: bool,

    /// Read JSON requests from stdin (one per line), print JSON responses
    #[arg(long)]
    stdin: bool,
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,jsonkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("jsonkv demo v{}", jsonkv::VERSION);

    // The core parses --cfg= itself and reports a missing flag at bootstrap
    let cfg_args: Vec<String> = args
        .cfg
        .iter()
        .map(|path| format!("--cfg={}", path))
        .collect();

    tracing::info!("starting jsonkv worker");
    let store = match StoreHandle::spawn(&cfg_args) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to start worker: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let wait = Duration::from_secs(args.wait_secs);
    match store.bootstrap(wait) {
        Ok(lines) => lines.iter().for_each(|line| tracing::info!("{}", line)),
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    }

    let result = if args.stdin {
        run_stdin(&store, wait)
    } else {
        let response_timeout = config_path_from_args(&cfg_args)
            .and_then(|path| Config::from_file(&path))
            .map(|config| config.response_timeout)
            .unwrap_or(Duration::from_secs(5));
        run_walkthrough(&store, wait, response_timeout, args.skip_timeout_demo)
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        return ExitCode::FAILURE;
    }

    match store.join() {
        Ok(exit) => {
            tracing::info!("worker stopped: {:?}", exit);
            ExitCode::from(exit.code() as u8)
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Print every line of a response
fn show(lines: Vec<String>) {
    for line in lines {
        tracing::info!("{}", line);
    }
}

/// Replays the full protocol: writes, reads, an expired response, quit
fn run_walkthrough(
    store: &StoreHandle,
    wait: Duration,
    response_timeout: Duration,
    skip_timeout_demo: bool,
) -> jsonkv::Result<()> {
    let value = format!("qwe-{}", pseudo_random());
    tracing::info!("sending request for set demo.1 to {}", value);
    show(store.request(Request::set("demo", "1", value), wait)?);

    let value = format!("abc-{}", pseudo_random());
    tracing::info!("sending request for set demo.2 to {}", value);
    show(store.request(Request::set("demo", "2", value), wait)?);

    tracing::info!("sending request for get demo.1");
    show(store.request(Request::get("demo", "1"), wait)?);

    tracing::info!("sending request for list");
    show(store.request(Request::list(), wait)?);

    tracing::info!("sending request for listkeys in demo");
    show(store.request(Request::list_keys("demo"), wait)?);

    if !skip_timeout_demo {
        tracing::info!("sending request and letting its response expire");
        store.send(Request::list_keys("demo"))?;
        thread::sleep(response_timeout + Duration::from_secs(1));

        tracing::info!("then starting new request");
        show(store.request(Request::list_keys("demo"), wait)?);
    }

    tracing::info!("closing worker");
    show(store.request(Request::quit(), wait)?);
    Ok(())
}

/// Forwards JSON-lines requests from stdin; sends `quit` at end of input
///
/// Every response is printed. Fails once input is exhausted if any
/// response was a failure.
fn run_stdin(store: &StoreHandle, wait: Duration) -> jsonkv::Result<()> {
    let mut reader = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut failed = 0usize;

    loop {
        let request = read_request(&mut reader)?.unwrap_or_else(Request::quit);
        let quit = request.action == Action::Quit;

        store.send(request)?;
        let response = store.responses().recv_timeout(wait).map_err(|e| match e {
            RecvTimeoutError::Timeout => JsonKvError::DeliveryTimeout,
            RecvTimeoutError::Disconnected => {
                JsonKvError::Disconnected("response queue closed".to_string())
            }
        })?;
        write_response(&mut stdout, &response)?;
        if !response.status_ok {
            failed += 1;
        }

        if quit {
            break;
        }
    }

    if failed > 0 {
        return Err(JsonKvError::Remote(format!("{} request(s) failed", failed)));
    }
    Ok(())
}

/// Cheap value suffix so repeated runs write different values
fn pseudo_random() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() % 99_999)
        .unwrap_or(0)
}
