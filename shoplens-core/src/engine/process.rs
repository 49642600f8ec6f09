//! Subprocess-backed similarity engine.
//!
//! Each call spawns a fresh engine process with the image path as its only
//! positional argument, then:
//!
//! - reads stdout incrementally into a bounded buffer
//! - logs stderr line by line (never part of the result)
//! - waits until the process has exited AND stdout is closed before parsing
//! - kills the process when the timeout expires or the caller goes away

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{ChildStderr, Command};
use tracing::{debug, info, instrument, warn};

use super::{parse_identifiers, EngineError, SimilarityEngine};
use crate::catalog::Identifier;

/// Default time an engine run may take before it is killed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default cap on captured stdout (1 MiB).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// How to launch the engine.
#[derive(Debug, Clone)]
pub struct ProcessEngineConfig {
    /// Executable to run (looked up in `PATH` when not absolute).
    pub program: PathBuf,
    /// Leading arguments, placed before the image path.
    pub args: Vec<String>,
    /// Hard limit on a single run.
    pub timeout: Duration,
    /// Maximum stdout bytes kept; larger output is rejected as malformed.
    pub max_output_bytes: usize,
}

impl Default for ProcessEngineConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("python3"),
            args: vec!["ml/find_similar.py".to_string()],
            timeout: DEFAULT_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

/// Similarity engine that runs one external process per request.
///
/// Holds no mutable state, so a single instance can serve concurrent
/// requests; every call gets its own process.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    config: ProcessEngineConfig,
}

impl ProcessEngine {
    pub fn new(config: ProcessEngineConfig) -> Self {
        Self { config }
    }
}

/// Stdout as captured from the engine.
struct CapturedOutput {
    bytes: Vec<u8>,
    overflowed: bool,
}

/// Read `reader` to EOF, keeping at most `limit` bytes.
///
/// Keeps draining past the limit so the engine never blocks on a full pipe.
async fn collect_output<R: AsyncRead + Unpin>(
    mut reader: R,
    limit: usize,
) -> io::Result<CapturedOutput> {
    let mut bytes = Vec::new();
    let mut overflowed = false;
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        if overflowed {
            continue;
        }
        if bytes.len() + read > limit {
            overflowed = true;
            continue;
        }
        bytes.extend_from_slice(&chunk[..read]);
    }

    Ok(CapturedOutput { bytes, overflowed })
}

async fn log_stderr(stderr: ChildStderr, pid: u32) {
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => warn!(pid, line = %line, "Engine stderr"),
            Ok(None) => break,
            Err(e) => {
                debug!(pid, error = %e, "Stopped reading engine stderr");
                break;
            }
        }
    }
}

#[async_trait]
impl SimilarityEngine for ProcessEngine {
    #[instrument(level = "debug", skip_all, fields(image = %image_path.display()))]
    async fn find_similar(&self, image_path: &Path) -> Result<Vec<Identifier>, EngineError> {
        let started = Instant::now();

        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .arg(image_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::Spawn(format!("{}: {}", self.config.program.display(), e))
            })?;

        let pid = child.id().unwrap_or_default();
        debug!(pid, program = %self.config.program.display(), "Spawned similarity engine");

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Spawn("engine stdout was not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| EngineError::Spawn("engine stderr was not captured".into()))?;

        let run = async {
            let (output, (), status) = tokio::join!(
                collect_output(stdout, self.config.max_output_bytes),
                log_stderr(stderr, pid),
                child.wait(),
            );
            Ok::<_, EngineError>((output?, status?))
        };
        let outcome = tokio::time::timeout(self.config.timeout, run).await;

        let (output, status) = match outcome {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    pid,
                    timeout_ms = self.config.timeout.as_millis() as u64,
                    "Similarity engine timed out, killing process"
                );
                if let Err(e) = child.kill().await {
                    warn!(pid, error = %e, "Failed to kill timed out engine");
                }
                return Err(EngineError::Timeout(self.config.timeout));
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;

        if output.bytes.is_empty() && !output.overflowed {
            warn!(pid, %status, elapsed_ms, "Similarity engine exited without output");
            return Err(EngineError::NoOutput);
        }
        if output.overflowed {
            return Err(EngineError::Malformed(format!(
                "output exceeded {} bytes",
                self.config.max_output_bytes
            )));
        }
        if !status.success() {
            return Err(EngineError::Malformed(format!(
                "engine exited abnormally ({}) after writing {} bytes",
                status,
                output.bytes.len()
            )));
        }

        let ids = parse_identifiers(&output.bytes)?;

        info!(pid, count = ids.len(), elapsed_ms, "Similarity engine finished");

        Ok(ids)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh_engine(script: &str, timeout: Duration) -> ProcessEngine {
        ProcessEngine::new(ProcessEngineConfig {
            program: PathBuf::from("sh"),
            args: vec!["-c".to_string(), script.to_string(), "engine".to_string()],
            timeout,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        })
    }

    fn query_path() -> PathBuf {
        PathBuf::from("/tmp/shoplens-query.jpg")
    }

    #[tokio::test]
    async fn test_returns_identifiers_in_engine_order() {
        let engine = sh_engine(r#"printf '%s' '["a","b","c"]'"#, Duration::from_secs(10));
        let ids = engine.find_similar(&query_path()).await.unwrap();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_image_path_is_sole_positional_argument() {
        let engine = sh_engine(
            r#"[ "$#" -eq 1 ] && printf '["%s"]' "$1""#,
            Duration::from_secs(10),
        );
        let ids = engine.find_similar(&query_path()).await.unwrap();
        assert_eq!(ids, vec!["/tmp/shoplens-query.jpg"]);
    }

    #[tokio::test]
    async fn test_concatenates_chunks_in_arrival_order() {
        let engine = sh_engine(
            r#"printf '["a",'; sleep 0.2; printf '"b",'; sleep 0.1; printf '"c"]'"#,
            Duration::from_secs(10),
        );
        let ids = engine.find_similar(&query_path()).await.unwrap();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_stderr_is_not_mixed_into_result() {
        let engine = sh_engine(
            r#"echo 'loading model weights' >&2; printf '["x"]'; echo 'done' >&2"#,
            Duration::from_secs(10),
        );
        let ids = engine.find_similar(&query_path()).await.unwrap();
        assert_eq!(ids, vec!["x"]);
    }

    #[tokio::test]
    async fn test_no_output_is_reported() {
        let engine = sh_engine("exit 0", Duration::from_secs(10));
        assert!(matches!(
            engine.find_similar(&query_path()).await,
            Err(EngineError::NoOutput)
        ));
    }

    #[tokio::test]
    async fn test_crash_without_output_is_no_output() {
        let engine = sh_engine("echo 'Traceback' >&2; exit 1", Duration::from_secs(10));
        assert!(matches!(
            engine.find_similar(&query_path()).await,
            Err(EngineError::NoOutput)
        ));
    }

    #[tokio::test]
    async fn test_non_json_output_is_malformed() {
        let engine = sh_engine("printf 'not json'", Duration::from_secs(10));
        assert!(matches!(
            engine.find_similar(&query_path()).await,
            Err(EngineError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_abnormal_exit_with_output_is_malformed() {
        let engine = sh_engine(r#"printf '["a"]'; exit 2"#, Duration::from_secs(10));
        assert!(matches!(
            engine.find_similar(&query_path()).await,
            Err(EngineError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_oversized_output_is_malformed() {
        let mut engine = sh_engine(r#"printf '["aaaaaaaaaaaaaaaa"]'"#, Duration::from_secs(10));
        engine.config.max_output_bytes = 8;
        assert!(matches!(
            engine.find_similar(&query_path()).await,
            Err(EngineError::Malformed(msg)) if msg.contains("exceeded")
        ));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let engine = ProcessEngine::new(ProcessEngineConfig {
            program: PathBuf::from("/nonexistent/shoplens-engine"),
            args: Vec::new(),
            ..Default::default()
        });
        assert!(matches!(
            engine.find_similar(&query_path()).await,
            Err(EngineError::Spawn(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_kills_engine() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("query.jpg");
        let engine = sh_engine(
            r#"sleep 1; touch "$1.survived"; printf '["late"]'"#,
            Duration::from_millis(200),
        );

        let started = Instant::now();
        let result = engine.find_similar(&marker).await;

        assert!(matches!(result, Err(EngineError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!dir.path().join("query.jpg.survived").exists());
    }

    #[tokio::test]
    async fn test_dropped_call_kills_engine() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("query.jpg");
        let engine = sh_engine(
            r#"sleep 1; touch "$1.survived"; printf '["late"]'"#,
            Duration::from_secs(30),
        );

        // Simulates a client disconnect: the request future is dropped mid-flight.
        let aborted =
            tokio::time::timeout(Duration::from_millis(200), engine.find_similar(&marker)).await;
        assert!(aborted.is_err());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!dir.path().join("query.jpg.survived").exists());
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let engine = sh_engine(
            r#"sleep 0.1; printf '["%s"]' "$1""#,
            Duration::from_secs(10),
        );
        let first = PathBuf::from("/tmp/first.jpg");
        let second = PathBuf::from("/tmp/second.jpg");

        let (a, b) = tokio::join!(engine.find_similar(&first), engine.find_similar(&second));

        assert_eq!(a.unwrap(), vec!["/tmp/first.jpg"]);
        assert_eq!(b.unwrap(), vec!["/tmp/second.jpg"]);
    }
}
