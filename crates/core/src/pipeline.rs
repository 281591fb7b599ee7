//! Loading process trees off the render path.
//!
//! Both triggers (a local file, the demo dataset) produce the same
//! [`TreeReady`] event on one channel; the viewer consumes them in order and
//! renders. Every request gets a [`Ticket`]; only the newest ticket's result
//! is delivered, so a slow earlier load can never overwrite a later one.

use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::DEMO_PATH;
use crate::model::ProcessNode;
use crate::parsers::{ParseError, parse_process_tree};

/// The bundled demonstration profile (a `cargo build` wrapped in sccache).
pub const DEMO_PROFILE: &[u8] = include_bytes!("../assets/cargo-sccache-build.json");

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Where a process tree comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Demo,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Demo => write!(f, "demo ({DEMO_PATH})"),
        }
    }
}

/// Read and parse a source synchronously.
pub fn load(source: &Source) -> Result<ProcessNode, LoadError> {
    let tree = match source {
        Source::File(path) => {
            let data = std::fs::read(path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            parse_process_tree(&data)?
        }
        Source::Demo => parse_process_tree(DEMO_PROFILE)?,
    };
    Ok(tree)
}

/// Identifies one load request. Later requests get larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// Issues tickets and remembers which one is current.
#[derive(Debug, Default)]
pub struct LoadSequencer {
    latest: u64,
}

impl LoadSequencer {
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    /// Whether `ticket` belongs to the most recent request.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

/// A finished load: the canonical "tree ready" event.
#[derive(Debug)]
pub struct TreeReady {
    pub ticket: Ticket,
    pub source: Source,
    pub tree: Result<ProcessNode, LoadError>,
}

/// Runs loads on background threads and delivers their results over a
/// channel, dropping any result that a newer request has superseded.
pub struct Loader {
    sequencer: LoadSequencer,
    tx: Sender<TreeReady>,
    rx: Receiver<TreeReady>,
}

impl Loader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            sequencer: LoadSequencer::default(),
            tx,
            rx,
        }
    }

    /// Start loading `source`. Supersedes every earlier request.
    pub fn request(&mut self, source: Source) -> Ticket {
        let ticket = self.sequencer.issue();
        info!(?ticket, %source, "load requested");
        let tx = self.tx.clone();
        thread::spawn(move || {
            let tree = load(&source);
            // The receiver lives as long as the loader; a failed send means
            // the viewer is shutting down.
            let _ = tx.send(TreeReady {
                ticket,
                source,
                tree,
            });
        });
        ticket
    }

    /// The current request's result, if it has arrived. Never blocks.
    pub fn try_next(&mut self) -> Option<TreeReady> {
        while let Ok(ready) = self.rx.try_recv() {
            if self.accept(&ready) {
                return Some(ready);
            }
        }
        None
    }

    /// Wait up to `timeout` for the current request's result.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<TreeReady> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            match self.rx.recv_timeout(remaining) {
                Ok(ready) if self.accept(&ready) => return Some(ready),
                Ok(_) => {}
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn accept(&self, ready: &TreeReady) -> bool {
        let current = self.sequencer.is_current(ready.ticket);
        if !current {
            warn!(ticket = ?ready.ticket, source = %ready.source, "dropping superseded load");
        }
        current
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
