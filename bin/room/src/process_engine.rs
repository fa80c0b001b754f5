//! A bare-bones UCI process wrapper: just enough line protocol to satisfy
//! [`UciEngine`]. The wire protocol itself is assumed available as a
//! local library; this is the thin adapter plugging a real `stockfish`-
//! shaped binary into the battle driver's trait seam.

use std::process::Stdio;
use std::time::Duration;

use cc_battle::{BestMove, EnginePool, EngineError, SearchInfo, UciEngine};
use cc_core::Timestamp;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);
const GO_GRACE: Duration = Duration::from_millis(250);

pub struct UciProcessEngine {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<tokio::process::ChildStdout>,
}

impl UciProcessEngine {
    async fn spawn(program: &str, args: &[String]) -> Result<Self, EngineError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| EngineError::InitFailed(err.to_string()))?;
        let stdin = child.stdin.take().ok_or_else(|| EngineError::InitFailed("no stdin".into()))?;
        let stdout = child.stdout.take().ok_or_else(|| EngineError::InitFailed("no stdout".into()))?;
        let mut engine = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        };
        engine.write_line("uci").await.map_err(|e| EngineError::InitFailed(e.to_string()))?;
        engine
            .wait_for(HANDSHAKE_TIMEOUT, |line| line.trim() == "uciok")
            .await
            .map_err(|_| EngineError::InitFailed("no uciok".into()))?;
        engine.write_line("isready").await.map_err(|e| EngineError::InitFailed(e.to_string()))?;
        engine
            .wait_for(HANDSHAKE_TIMEOUT, |line| line.trim() == "readyok")
            .await
            .map_err(|_| EngineError::InitFailed("no readyok".into()))?;
        Ok(engine)
    }

    async fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await
    }

    async fn wait_for(
        &mut self,
        timeout: Duration,
        matches: impl Fn(&str) -> bool,
    ) -> Result<String, EngineError> {
        tokio::time::timeout(timeout, async {
            let mut line = String::new();
            loop {
                line.clear();
                let read = self
                    .stdout
                    .read_line(&mut line)
                    .await
                    .map_err(|err| EngineError::Other(err.to_string()))?;
                if read == 0 {
                    return Err(EngineError::Other("engine process closed stdout".into()));
                }
                if matches(&line) {
                    return Ok(line.clone());
                }
            }
        })
        .await
        .map_err(|_| EngineError::WaitTimeout)?
    }
}

#[async_trait::async_trait]
impl UciEngine for UciProcessEngine {
    async fn new_game(&mut self) -> Result<(), EngineError> {
        self.write_line("ucinewgame").await.map_err(|e| EngineError::Other(e.to_string()))?;
        self.write_line("isready").await.map_err(|e| EngineError::Other(e.to_string()))?;
        self.wait_for(HANDSHAKE_TIMEOUT, |line| line.trim() == "readyok").await?;
        Ok(())
    }

    async fn set_position(&mut self, fen: &str, moves: &[String]) -> Result<(), EngineError> {
        let mut cmd = format!("position fen {fen}");
        if !moves.is_empty() {
            cmd.push_str(" moves ");
            cmd.push_str(&moves.join(" "));
        }
        self.write_line(&cmd).await.map_err(|err| EngineError::SetPositionFailed(err.to_string()))
    }

    async fn go(&mut self, deadline: Timestamp) -> Result<BestMove, EngineError> {
        let movetime_ms = Timestamp::now().until(deadline).as_millis().max(1);
        self.write_line(&format!("go movetime {movetime_ms}"))
            .await
            .map_err(|err| EngineError::GoFailed(err.to_string()))?;

        let raw = self
            .wait_for(Duration::from_millis(movetime_ms as u64) + GO_GRACE, |line| {
                line.trim().starts_with("bestmove")
            })
            .await?;

        // Real engines report score/depth/nodes on preceding `info` lines;
        // this minimal wrapper does not buffer them.
        let info = SearchInfo::default();
        let uci = raw
            .trim()
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| EngineError::IllegalMove("no bestmove token".into()))?
            .to_string();
        if uci == "(none)" || uci == "0000" {
            return Err(EngineError::WaitTimeout);
        }
        Ok(BestMove { uci, info })
    }

    async fn stop(&mut self) {
        let _ = self.write_line("stop").await;
    }
}

impl Drop for UciProcessEngine {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
    }
}

/// One named, externally-launched UCI engine binary (spec.md §3
/// `Engine{name}`'s runtime counterpart).
#[derive(Debug, Clone)]
pub struct EngineSpec {
    pub program: String,
    pub args: Vec<String>,
}

/// Spawns a fresh process per acquisition rather than keeping a warm
/// pool; simple, and well within the per-pool create timeout for any
/// engine that starts in well under a second.
pub struct ProcessEnginePool {
    spec: EngineSpec,
}

impl ProcessEnginePool {
    pub fn new(spec: EngineSpec) -> Self {
        Self { spec }
    }
}

#[async_trait::async_trait]
impl EnginePool for ProcessEnginePool {
    async fn acquire(&self, timeout: Duration) -> Result<Box<dyn UciEngine>, EngineError> {
        tokio::time::timeout(timeout, UciProcessEngine::spawn(&self.spec.program, &self.spec.args))
            .await
            .map_err(|_| EngineError::InitFailed("engine did not become ready in time".into()))?
            .map(|engine| Box::new(engine) as Box<dyn UciEngine>)
    }

    async fn release(&self, mut engine: Box<dyn UciEngine>, healthy: bool) {
        if !healthy {
            log::warn!("releasing unhealthy engine for {}, process will be killed", self.spec.program);
        }
        engine.stop().await;
    }
}
