//! Raw log-line source: follows a growing chat log file.

use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Events emitted by the log follower.
#[derive(Debug)]
pub enum SourceEvent {
    /// One complete line, without its line terminator.
    Line(String),
    /// Reading or watching failed. The follower keeps running.
    Error(anyhow::Error),
}

/// Incremental reader returning only lines appended since the previous call.
#[derive(Debug)]
pub struct LineReader {
    path: PathBuf,
    offset: u64,
    partial: Vec<u8>,
}

impl LineReader {
    /// Start at the end of the file, or at the beginning when `from_start` is set.
    ///
    /// A missing file is treated as empty until it appears.
    pub fn open(path: impl Into<PathBuf>, from_start: bool) -> Result<Self> {
        let path = path.into();
        let offset = if from_start || !path.exists() {
            0
        } else {
            std::fs::metadata(&path)
                .with_context(|| format!("failed to stat {}", path.display()))?
                .len()
        };
        Ok(Self {
            path,
            offset,
            partial: Vec::new(),
        })
    }

    /// File being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read complete lines written since the last call.
    pub fn read_new_lines(&mut self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut file = File::open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("failed to stat {}", self.path.display()))?
            .len();
        if len < self.offset {
            info!(path = %self.path.display(), "log file shrank; reading from the start");
            self.offset = 0;
            self.partial.clear();
        }
        if len == self.offset {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(self.offset))
            .with_context(|| format!("failed to seek {}", self.path.display()))?;
        let mut buffer = Vec::with_capacity((len - self.offset) as usize);
        file.take(len - self.offset)
            .read_to_end(&mut buffer)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        self.offset += buffer.len() as u64;

        self.partial.extend_from_slice(&buffer);
        let Some(last_newline) = self.partial.iter().rposition(|byte| *byte == b'\n') else {
            return Ok(Vec::new());
        };
        let rest = self.partial.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.partial, rest);

        Ok(complete
            .split(|byte| *byte == b'\n')
            .map(|line| {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                String::from_utf8_lossy(line).into_owned()
            })
            .filter(|line| !line.is_empty())
            .collect())
    }
}

/// Watches a chat log file and forwards new lines over a channel.
#[derive(Debug, Clone)]
pub struct LogFollower {
    path: PathBuf,
    from_start: bool,
    poll_interval: Duration,
}

impl LogFollower {
    /// Follow `path`, optionally replaying what it already contains.
    pub fn new(path: impl Into<PathBuf>, from_start: bool, poll_interval: Duration) -> Self {
        Self {
            path: path.into(),
            from_start,
            poll_interval,
        }
    }

    /// File being followed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run until the receiving side goes away.
    ///
    /// Filesystem notifications trigger reads; the poll interval covers
    /// platforms and network drives where notifications are unreliable.
    pub async fn run(self, sender: mpsc::Sender<SourceEvent>) -> Result<()> {
        let mut reader = LineReader::open(&self.path, self.from_start)?;

        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();
        // Dropping the watcher stops notifications; when it is `None` only polling runs.
        let _watcher = self.watch(notify_tx);
        info!(path = %self.path.display(), "following chat log");

        let mut notify_open = true;
        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                maybe_event = notify_rx.recv(), if notify_open => match maybe_event {
                    Some(Ok(event)) => {
                        let relevant = matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
                            && event.paths.iter().any(|path| path.ends_with(self.file_name()));
                        if !relevant {
                            continue;
                        }
                    }
                    Some(Err(err)) => {
                        if sender.send(SourceEvent::Error(err.into())).await.is_err() {
                            break;
                        }
                        continue;
                    }
                    None => {
                        notify_open = false;
                        continue;
                    }
                },
                _ = ticker.tick() => {}
            }

            if !forward_lines(&mut reader, &sender).await {
                break;
            }
        }

        Ok(())
    }

    fn watch(
        &self,
        notify_tx: mpsc::UnboundedSender<notify::Result<Event>>,
    ) -> Option<RecommendedWatcher> {
        let watch_target = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = notify_tx.send(res);
        })
        .map_err(|err| warn!(?err, "failed to create file watcher"))
        .ok()?;
        watcher
            .watch(watch_target, RecursiveMode::NonRecursive)
            .map_err(|err| warn!(?err, path = %watch_target.display(), "failed to watch directory"))
            .ok()?;
        Some(watcher)
    }

    fn file_name(&self) -> &Path {
        self.path
            .file_name()
            .map(Path::new)
            .unwrap_or(self.path.as_path())
    }
}

/// Returns `false` once the receiver has been dropped.
async fn forward_lines(reader: &mut LineReader, sender: &mpsc::Sender<SourceEvent>) -> bool {
    let event_batch = match reader.read_new_lines() {
        Ok(lines) => lines.into_iter().map(SourceEvent::Line).collect(),
        Err(err) => vec![SourceEvent::Error(err)],
    };
    for event in event_batch {
        if sender.send(event).await.is_err() {
            return false;
        }
    }
    true
}
