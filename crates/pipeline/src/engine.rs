//! Execution engine collaborator.
//!
//! Submission is one-way: a request is handed off and the pipeline's
//! responsibility ends there. `Ok` from [`ExecutionEngine::submit`] means
//! "accepted for submission", not "exported". Job status lives with the
//! engine and is polled outside this system.

use crossbeam_channel::{Receiver, Sender};
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::export::{ExportRequest, ExportUnit};

/// Sink for export requests
pub trait ExecutionEngine: Send + Sync {
    /// Hand off one request. Never waits for the export to run.
    fn submit(&self, request: ExportRequest) -> Result<()>;
}

/// Engine front that forwards requests over a channel to whatever drives
/// the real engine.
#[derive(Debug, Clone)]
pub struct ChannelEngine {
    tx: Sender<ExportRequest>,
}

impl ChannelEngine {
    /// Unbounded engine front and the receiving end of its requests
    pub fn unbounded() -> (Self, Receiver<ExportRequest>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }

    /// Engine front over an existing sender
    pub fn new(tx: Sender<ExportRequest>) -> Self {
        Self { tx }
    }
}

impl ExecutionEngine for ChannelEngine {
    fn submit(&self, request: ExportRequest) -> Result<()> {
        self.tx
            .send(request)
            .map_err(|err| PipelineError::EngineUnavailable(format!("receiver dropped before '{}'", err.0.label)))
    }
}

/// Outcome of handing a plan to the engine
#[derive(Debug, Default)]
pub struct SubmitReport {
    /// Labels accepted by the engine front
    pub submitted: Vec<String>,
    /// Labels that could not be handed off, with the reason
    pub failures: Vec<(String, PipelineError)>,
}

impl SubmitReport {
    pub fn submitted_count(&self) -> usize {
        self.submitted.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Submit every unit. A failed hand-off is recorded and the rest are still
/// submitted; units have no ordering or dependency between them.
pub fn submit_all(engine: &dyn ExecutionEngine, units: Vec<ExportUnit>) -> SubmitReport {
    let mut report = SubmitReport::default();
    for unit in units {
        let label = unit.request.label.clone();
        match engine.submit(unit.request) {
            Ok(()) => {
                info!(label = %label, region = %unit.region_name, year = unit.year, index = %unit.index, "export submitted");
                report.submitted.push(label);
            }
            Err(err) => {
                warn!(label = %label, error = %err, "export not submitted");
                report.failures.push((label, err));
            }
        }
    }
    report
}
