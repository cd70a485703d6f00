//! Async client for the database worker process.

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex};

use super::error::{WorkerError, WorkerResult};
use super::protocol::{
    methods, ConnectionParams, ErrorInfo, ExecuteQueryParams, ExecuteQueryResponse,
    GetColumnsParams, GetColumnsResponse, ListTablesParams, ListTablesResponse, QueryArg,
    RequestEnvelope, ResponseEnvelope,
};
use crate::config::Settings;

/// Default timeout for requests (30 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

type Pending = Arc<Mutex<HashMap<String, oneshot::Sender<ResponseEnvelope>>>>;

/// Async client for the database worker.
///
/// The client spawns the worker as a child process and communicates via
/// NDJSON over stdin/stdout. Each request has a unique ID for correlation
/// with responses, so several requests may be in flight at once.
pub struct WorkerClient {
    stdin: Arc<Mutex<BufWriter<ChildStdin>>>,
    pending: Pending,
    _child: Child,
    reader_task: tokio::task::JoinHandle<()>,
    timeout: Duration,
}

impl WorkerClient {
    /// Spawn a worker with no extra arguments and the default timeout.
    pub async fn spawn<P: AsRef<Path>>(worker_path: P) -> WorkerResult<Self> {
        Self::spawn_with_args(
            worker_path,
            &[],
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
        .await
    }

    /// Spawn the worker described by `settings`, passing its pool options.
    pub async fn spawn_with_settings(settings: &Settings) -> WorkerResult<Self> {
        let worker_path = settings.worker_path().ok_or(WorkerError::NotFound)?;
        let pool_args = settings.worker.pool.to_worker_args();
        let timeout = Duration::from_secs(settings.worker.timeout_secs);

        Self::spawn_with_args(&worker_path, &pool_args, timeout).await
    }

    /// Spawn a worker with command-line arguments and a request timeout.
    pub async fn spawn_with_args<P: AsRef<Path>>(
        worker_path: P,
        args: &[String],
        timeout: Duration,
    ) -> WorkerResult<Self> {
        let worker_path = worker_path.as_ref();
        let mut child = Command::new(worker_path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(WorkerError::SpawnFailed)?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => return Err(WorkerError::WorkerExited),
        };
        tracing::debug!(path = %worker_path.display(), "spawned worker");

        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let reader_task = Self::spawn_reader_task(stdout, pending.clone());

        Ok(Self {
            stdin: Arc::new(Mutex::new(BufWriter::new(stdin))),
            pending,
            _child: child,
            reader_task,
            timeout,
        })
    }

    /// Spawn the background task that routes responses to waiting callers.
    fn spawn_reader_task(stdout: ChildStdout, pending: Pending) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => break,
                    Ok(_) => match serde_json::from_str::<ResponseEnvelope>(&line) {
                        Ok(resp) => {
                            let mut pending = pending.lock().await;
                            match pending.remove(&resp.id) {
                                Some(tx) => {
                                    let _ = tx.send(resp);
                                }
                                None => tracing::warn!(id = %resp.id, "response for unknown request"),
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "failed to parse worker response"),
                    },
                    Err(e) => {
                        tracing::error!(error = %e, "worker read error");
                        break;
                    }
                }
            }

            // Fail every request still waiting on the dead worker.
            let mut pending = pending.lock().await;
            for (id, tx) in pending.drain() {
                let _ = tx.send(ResponseEnvelope {
                    id,
                    success: false,
                    result: None,
                    error: Some(ErrorInfo {
                        code: "WORKER_EXITED".to_string(),
                        message: "Worker process exited unexpectedly".to_string(),
                    }),
                });
            }
        })
    }

    /// Send a request to the worker and wait for its response.
    pub async fn request<P, R>(&self, method: &str, params: P) -> WorkerResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = uuid::Uuid::new_v4().to_string();

        let request = RequestEnvelope {
            id: id.clone(),
            method: method.to_string(),
            params: serde_json::to_value(params).map_err(WorkerError::SerializeFailed)?,
        };

        let line = serde_json::to_string(&request).map_err(WorkerError::SerializeFailed)? + "\n";

        // Registered before writing so an immediate response finds its sender.
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        if let Err(e) = self.write_line(&line).await {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }
        tracing::debug!(%id, method, "sent worker request");

        let response = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(_)) => return Err(WorkerError::ChannelClosed),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                return Err(WorkerError::Timeout(self.timeout.as_secs()));
            }
        };

        if response.success {
            let result = response.result.unwrap_or(serde_json::Value::Null);
            serde_json::from_value(result).map_err(WorkerError::DeserializeFailed)
        } else {
            let error = response.error.unwrap_or_else(|| ErrorInfo {
                code: "UNKNOWN".to_string(),
                message: "Unknown error".to_string(),
            });
            Err(WorkerError::classify(&error.code, &error.message))
        }
    }

    async fn write_line(&self, line: &str) -> WorkerResult<()> {
        let mut stdin = self.stdin.lock().await;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(WorkerError::WriteFailed)?;
        stdin.flush().await.map_err(WorkerError::WriteFailed)
    }

    /// Requests still waiting for a response.
    pub async fn pending_requests(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Whether the worker's stdout is still open.
    pub fn is_alive(&self) -> bool {
        !self.reader_task.is_finished()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

// Convenience methods for the calls the client makes.
impl WorkerClient {
    /// List tables, optionally restricted to one schema.
    pub async fn list_tables(
        &self,
        connection: &ConnectionParams,
        schema: Option<&str>,
    ) -> WorkerResult<ListTablesResponse> {
        self.request(
            methods::LIST_TABLES,
            ListTablesParams {
                connection: connection.clone(),
                schema: schema.map(str::to_string),
            },
        )
        .await
    }

    /// Describe the columns of `schema.table`.
    pub async fn get_columns(
        &self,
        connection: &ConnectionParams,
        schema: &str,
        table: &str,
    ) -> WorkerResult<GetColumnsResponse> {
        self.request(
            methods::GET_COLUMNS,
            GetColumnsParams {
                connection: connection.clone(),
                schema: schema.to_string(),
                table: table.to_string(),
            },
        )
        .await
    }

    /// Execute T-SQL with named arguments.
    pub async fn execute_query(
        &self,
        connection: &ConnectionParams,
        sql: &str,
        args: Vec<QueryArg>,
    ) -> WorkerResult<ExecuteQueryResponse> {
        self.request(
            methods::EXECUTE_QUERY,
            ExecuteQueryParams {
                connection: connection.clone(),
                sql: sql.to_string(),
                args,
            },
        )
        .await
    }
}
