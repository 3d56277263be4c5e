//! `eggtrack`: replay newline-delimited JSON invocations against an in-memory
//! ledger.
//!
//! Each input line is `{"subject": .., "attributes": {..}, "function": .., "args": [..]}`.
//! For every invocation one result line is printed, followed by one line per
//! event the invocation published.
//!
//! Usage: `eggtrack [FILE]` (reads stdin when no file or `-` is given).

use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use eggtrack_events::{EventBus, InMemoryEventBus, PublishedEvent};
use eggtrack_infra::{ContractConfig, EggTrackingContract, ErrorKind, InMemoryWorldState};

#[derive(Debug, Deserialize)]
struct Invocation {
    subject: String,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    function: String,
    #[serde(default)]
    args: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Output<'a> {
    Success {
        line: usize,
        function: &'a str,
        result: JsonValue,
    },
    Failure {
        line: usize,
        function: &'a str,
        kind: ErrorKind,
        error: String,
    },
    Event {
        line: usize,
        event: &'a PublishedEvent,
    },
}

fn open_input() -> io::Result<Box<dyn BufRead>> {
    match std::env::args().nth(1).as_deref() {
        None | Some("-") => Ok(Box::new(BufReader::new(io::stdin()))),
        Some(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    eggtrack_observability::init();

    let config = ContractConfig::from_env();
    let resolver = config.identity_resolver();
    tracing::info!(
        admins = config.admin_subjects.len(),
        query_cap = config.query_cap.as_str(),
        "starting replay"
    );

    let bus = InMemoryEventBus::new();
    let events = bus.subscribe();
    let contract = EggTrackingContract::new(InMemoryWorldState::new(), bus, config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0usize;

    for (idx, line) in open_input()?.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let invocation: Invocation = match serde_json::from_str(&line) {
            Ok(inv) => inv,
            Err(err) => {
                tracing::warn!(line = line_no, error = %err, "skipping malformed invocation");
                failures += 1;
                continue;
            }
        };

        let caller = resolver.resolve(&invocation.subject, invocation.attributes.clone());
        let args = invocation.args.as_slice();
        let output = match contract.invoke(&caller, &invocation.function, args) {
            Ok(payload) => Output::Success {
                line: line_no,
                function: &invocation.function,
                result: serde_json::from_str(&payload).unwrap_or(JsonValue::String(payload)),
            },
            Err(err) => {
                failures += 1;
                Output::Failure {
                    line: line_no,
                    function: &invocation.function,
                    kind: err.kind(),
                    error: err.to_string(),
                }
            }
        };
        writeln!(out, "{}", serde_json::to_string(&output)?)?;

        for envelope in events.drain() {
            let event = Output::Event {
                line: line_no,
                event: &envelope,
            };
            writeln!(out, "{}", serde_json::to_string(&event)?)?;
        }
    }

    tracing::info!(failures, "replay finished");
    Ok(())
}
