//! Launching the external solver as a blocking child process.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::schema::SolverCommand;

/// How often a child under a timeout is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Errors raised while running the solver.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("Failed to spawn solver '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("Solver exited with {}: {}", describe_code(.code), .stderr.trim())]
    ExitStatus { code: Option<i32>, stderr: String },
    #[error("Solver timed out after {:.1}s", .after.as_secs_f64())]
    TimedOut { after: Duration },
    #[error("I/O error while waiting for solver: {0}")]
    Io(#[from] io::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "no status (killed by signal)".to_string(),
    }
}

/// Captured output of one solver run.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutput {
    pub stdout: String,
    pub stderr: String,
    /// Wall-clock time from just before spawn to just after exit.
    pub elapsed: Duration,
}

/// Something that consumes the problem artifact and reports on stdout.
pub trait Solver {
    /// Run once against the current artifact and wait for it to finish.
    fn run(&mut self) -> Result<SolverOutput, InvokeError>;
}

/// Runs the configured command as a child process.
#[derive(Debug, Clone)]
pub struct ProcessSolver {
    command: SolverCommand,
}

impl ProcessSolver {
    pub fn new(command: SolverCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &SolverCommand {
        &self.command
    }

    fn build(&self) -> Command {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.command.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn wait(
        child: &mut Child,
        start: Instant,
        limit: Option<Duration>,
    ) -> Result<ExitStatus, InvokeError> {
        let Some(limit) = limit else {
            return Ok(child.wait()?);
        };

        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if start.elapsed() >= limit {
                warn!("Solver exceeded {:.1}s, killing pid {}", limit.as_secs_f64(), child.id());
                // The child may exit between try_wait and kill.
                if let Err(e) = child.kill() {
                    debug!("kill failed: {}", e);
                }
                child.wait()?;
                return Err(InvokeError::TimedOut { after: limit });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Solver for ProcessSolver {
    fn run(&mut self) -> Result<SolverOutput, InvokeError> {
        let mut cmd = self.build();
        debug!("Launching solver: {}", self.command.display());

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|source| InvokeError::Spawn {
            program: self.command.program.clone(),
            source,
        })?;

        // Drain both pipes concurrently so a chatty solver never blocks on a full pipe.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = Self::wait(&mut child, start, self.command.timeout())?;
        let elapsed = start.elapsed();

        let stdout = collect(stdout);
        let stderr = collect(stderr);

        debug!(
            "Solver finished in {:.2}s ({} bytes stdout, {})",
            elapsed.as_secs_f64(),
            stdout.len(),
            status
        );

        if !status.success() {
            return Err(InvokeError::ExitStatus {
                code: status.code(),
                stderr,
            });
        }

        Ok(SolverOutput {
            stdout,
            stderr,
            elapsed,
        })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut bytes = Vec::new();
            if let Err(e) = pipe.read_to_end(&mut bytes) {
                debug!("Reading solver pipe failed: {}", e);
            }
            String::from_utf8_lossy(&bytes).into_owned()
        })
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sh(script: &str) -> ProcessSolver {
        ProcessSolver::new(SolverCommand {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            working_dir: None,
            timeout_secs: None,
        })
    }

    #[test]
    fn test_captures_stdout() {
        let output = sh("echo 'Iteracao 3, melhor fitness: 2'; echo done")
            .run()
            .unwrap();
        assert_eq!(output.stdout, "Iteracao 3, melhor fitness: 2\ndone\n");
        assert!(output.stderr.is_empty());
        assert!(output.elapsed > Duration::ZERO);
    }

    #[test]
    fn test_nonzero_exit_is_error() {
        let err = sh("echo boom >&2; exit 3").run().unwrap_err();
        match err {
            InvokeError::ExitStatus { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr.trim(), "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let mut solver = ProcessSolver::new(SolverCommand {
            program: "definitely-not-a-real-solver-binary".to_string(),
            args: vec![],
            working_dir: None,
            timeout_secs: None,
        });
        assert!(matches!(solver.run(), Err(InvokeError::Spawn { .. })));
    }

    #[test]
    fn test_timeout_kills_child() {
        let mut solver = sh("exec sleep 5");
        solver.command.timeout_secs = Some(0.2);

        let start = Instant::now();
        let err = solver.run().unwrap_err();
        assert!(matches!(err, InvokeError::TimedOut { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_timeout_not_hit() {
        let mut solver = sh("echo fast");
        solver.command.timeout_secs = Some(10.0);
        assert_eq!(solver.run().unwrap().stdout, "fast\n");
    }

    #[test]
    fn test_working_dir() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();

        let mut solver = sh("cat marker.txt");
        solver.command.working_dir = Some(dir.path().to_path_buf());
        assert_eq!(solver.run().unwrap().stdout, "here");
    }

    #[test]
    fn test_error_messages() {
        let err = InvokeError::ExitStatus {
            code: None,
            stderr: "\n".to_string(),
        };
        assert!(err.to_string().contains("killed by signal"));

        let err = InvokeError::TimedOut {
            after: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "Solver timed out after 1.5s");
    }
}
