use std::{
    io::{self, Read},
    process::{Child, Command, Stdio},
    sync::mpsc::{self, Receiver},
    thread,
    time::{Duration, Instant},
};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const DRAIN_GRACE: Duration = Duration::from_millis(200);

///
/// ProcessOutput
///
/// Captured result of one toolchain invocation. `exit_code` is `None` when
/// the process was terminated by a signal.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    #[must_use]
    pub fn failure(stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: Some(1),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }

    /// Text that explains a failure: stderr when present, stdout otherwise.
    #[must_use]
    pub fn failure_text(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Outcome of [`run_with_timeout`].
#[derive(Debug)]
pub enum RunOutcome {
    Finished(ProcessOutput),
    TimedOut,
}

/// Run `cmd` to completion with piped output, killing it after `timeout`.
///
/// Output is drained on background threads. A grandchild that inherited the
/// pipes can keep them open after the child is gone, so the drains are never
/// waited on past the deadline; on timeout they are abandoned.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> io::Result<RunOutcome> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            kill(&mut child);
            return Ok(RunOutcome::TimedOut);
        }
        thread::sleep(POLL_INTERVAL);
    };

    let wait = deadline.saturating_duration_since(Instant::now()).max(DRAIN_GRACE);
    let collect_by = Instant::now() + wait;

    Ok(RunOutcome::Finished(ProcessOutput {
        stdout: collect(stdout, collect_by),
        stderr: collect(stderr, collect_by),
        exit_code: status.code(),
    }))
}

/// Start `cmd` in the background with its output discarded.
pub fn spawn_detached(cmd: &mut Command) -> io::Result<u32> {
    let child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    Ok(child.id())
}

fn drain<R>(pipe: Option<R>) -> Option<Receiver<String>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            // a read error just truncates what was captured
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
        });
        rx
    })
}

fn collect(drained: Option<Receiver<String>>, by: Instant) -> String {
    drained
        .and_then(|rx| rx.recv_timeout(by.saturating_duration_since(Instant::now())).ok())
        .unwrap_or_default()
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

///
/// TESTS
///

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_both_streams_and_exit_code() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo out; echo err 1>&2; exit 3"]);

        let RunOutcome::Finished(out) =
            run_with_timeout(&mut cmd, Duration::from_secs(10)).expect("spawn sh")
        else {
            panic!("sh should finish");
        };

        assert_eq!(out.stdout.trim(), "out");
        assert_eq!(out.stderr.trim(), "err");
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.is_success());
        assert_eq!(out.failure_text().trim(), "err");
    }

    #[test]
    fn slow_process_is_killed() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "exec sleep 5"]);

        let outcome = run_with_timeout(&mut cmd, Duration::from_millis(100)).expect("spawn sh");
        assert!(matches!(outcome, RunOutcome::TimedOut));
    }

    #[test]
    fn grandchild_holding_the_pipes_does_not_outlive_the_timeout() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 4; true"]);

        let started = Instant::now();
        let outcome = run_with_timeout(&mut cmd, Duration::from_millis(100)).expect("spawn sh");

        assert!(matches!(outcome, RunOutcome::TimedOut));
        assert!(started.elapsed() < Duration::from_secs(2), "{:?}", started.elapsed());
    }

    #[test]
    fn background_writer_does_not_block_a_finished_child() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo ready; sleep 4 & exit 0"]);

        let started = Instant::now();
        let RunOutcome::Finished(out) =
            run_with_timeout(&mut cmd, Duration::from_secs(1)).expect("spawn sh")
        else {
            panic!("sh should finish");
        };

        assert!(out.is_success());
        assert!(started.elapsed() < Duration::from_secs(3), "{:?}", started.elapsed());
    }

    #[test]
    fn failure_text_falls_back_to_stdout() {
        let out = ProcessOutput {
            stdout: "Error 3090003: unsatisfied".into(),
            stderr: "  \n".into(),
            exit_code: Some(1),
        };

        assert_eq!(out.failure_text(), "Error 3090003: unsatisfied");
    }
}
