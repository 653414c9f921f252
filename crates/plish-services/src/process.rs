use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ServiceError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How to launch an external engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    pub executable: PathBuf,
    /// Extra environment for the child process
    #[serde(default)]
    pub env: Vec<(String, String)>,
    /// Directory for per-request input/output files
    #[serde(default = "std::env::temp_dir")]
    pub scratch_dir: PathBuf,
    /// Kill the child once this much time has passed
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl ToolConfig {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            env: Vec::new(),
            scratch_dir: std::env::temp_dir(),
            timeout: None,
        }
    }

    /// Use `env_var` when it is set and non-empty, else `default`.
    pub fn from_env_or(env_var: &str, default: impl Into<PathBuf>) -> Self {
        let executable = std::env::var(env_var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| default.into());
        Self::new(executable)
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn executable_name(&self) -> String {
        self.executable.display().to_string()
    }
}

/// Input, output and stderr files for one request, named after its id and
/// removed on drop.
pub struct ScratchFiles {
    pub input: PathBuf,
    pub output: PathBuf,
    pub stderr: PathBuf,
}

impl ScratchFiles {
    pub fn new(dir: &Path, request_id: Uuid, output_ext: &str) -> Result<Self, ServiceError> {
        fs::create_dir_all(dir)?;
        let stem = request_id.simple().to_string();
        Ok(Self {
            input: dir.join(format!("{stem}.seq")),
            output: dir.join(format!("{stem}.seq.{output_ext}")),
            stderr: dir.join(format!("{stem}.err")),
        })
    }

    pub fn read_output(&self) -> Result<String, ServiceError> {
        Ok(fs::read_to_string(&self.output)?)
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in [&self.input, &self.output, &self.stderr] {
            let _ = fs::remove_file(path);
        }
    }
}

/// Run the tool to completion, honouring the configured timeout. Stdout is
/// discarded; stderr is captured for error reports.
pub fn run_tool(
    config: &ToolConfig,
    args: &[String],
    scratch: &ScratchFiles,
) -> Result<(), ServiceError> {
    let executable = config.executable_name();
    log::debug!("running {} {}", executable, args.join(" "));

    let stderr = File::create(&scratch.stderr)?;
    let mut child = Command::new(&config.executable)
        .args(args)
        .envs(config.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::from(stderr))
        .spawn()
        .map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ServiceError::ToolNotFound {
                    executable: executable.clone(),
                }
            } else {
                ServiceError::Io(e)
            }
        })?;

    let status: ExitStatus = match config.timeout() {
        None => child.wait()?,
        Some(limit) => {
            let started = Instant::now();
            loop {
                if let Some(status) = child.try_wait()? {
                    break status;
                }
                if started.elapsed() >= limit {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ServiceError::TimedOut {
                        executable,
                        after: limit,
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
        }
    };

    if !status.success() {
        let stderr = fs::read_to_string(&scratch.stderr).unwrap_or_default();
        return Err(ServiceError::ToolFailed {
            executable,
            status: status.code(),
            stderr: stderr.trim().to_string(),
        });
    }
    Ok(())
}
