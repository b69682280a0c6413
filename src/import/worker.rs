//! Out-of-process export worker.
//!
//! The worker runs the host binary headless against the library file and
//! writes the manifest. There is no protocol beyond that file and the exit.

use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use crate::core::context::ContextMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerInvocation {
    pub host_binary: PathBuf,
    pub target: PathBuf,
    pub script: PathBuf,
    pub mode: ContextMode,
    pub exclude_builtin: bool,
}

impl WorkerInvocation {
    /// `<target> --background --script <script> -- <mode> <exclude flag>`
    pub fn args(&self) -> Vec<String> {
        vec![
            self.target.to_string_lossy().into_owned(),
            "--background".to_string(),
            "--script".to_string(),
            self.script.to_string_lossy().into_owned(),
            "--".to_string(),
            self.mode.worker_arg().to_string(),
            if self.exclude_builtin { "1" } else { "0" }.to_string(),
        ]
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.host_binary);
        command
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

/// A launched worker.
pub trait WorkerHandle: Send {
    fn is_running(&mut self) -> bool;

    /// Stop the worker if it is still running.
    fn kill(&mut self);
}

pub trait WorkerLauncher {
    fn launch(&mut self, invocation: &WorkerInvocation) -> io::Result<Box<dyn WorkerHandle>>;
}

/// Spawns the worker as a child OS process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl WorkerLauncher for ProcessLauncher {
    fn launch(&mut self, invocation: &WorkerInvocation) -> io::Result<Box<dyn WorkerHandle>> {
        let child = invocation.command().spawn()?;
        tracing::info!(
            "Spawned export worker pid={} for {:?}",
            child.id(),
            invocation.target
        );
        Ok(Box::new(ProcessWorker { child }))
    }
}

struct ProcessWorker {
    child: Child,
}

impl WorkerHandle for ProcessWorker {
    fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    fn kill(&mut self) {
        if !self.is_running() {
            return;
        }
        if let Err(err) = self.child.kill() {
            tracing::warn!("Failed to kill export worker: {}", err);
            return;
        }
        let _ = self.child.wait();
    }
}
