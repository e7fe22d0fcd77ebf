//! File-based lock namespace.
//!
//! Each lock id maps to one file under the namespace directory. Acquiring
//! a lock creates the file exclusively and records its owner; dropping the
//! [`LockGuard`] removes it. Two workflow instances racing for the same
//! artifact therefore serialize, while disjoint artifacts never contend.
//!
//! A lock left behind by a dead process is reclaimed only by whoever holds
//! its `.reclaim` gate file, and only if the file still carries the dead
//! owner's token, so two waiters can never both take over one lock.

use crate::error::{PipelineError, Result};
use crate::shell::InterruptFlag;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info, warn};

/// Default bound on how long to wait for a held lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(6 * 60 * 60);

/// Default interval between lock acquisition attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// A reclaim gate older than this belongs to a reclaimer that died.
const GATE_STALE_AFTER: Duration = Duration::from_secs(60);

static TOKEN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// How to behave when a lock is already held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPolicy {
    /// Give up after this long. Zero means fail immediately.
    pub timeout: Duration,

    /// Delay between attempts.
    pub poll_interval: Duration,
}

impl LockPolicy {
    /// Fail immediately if the lock is held.
    pub fn no_wait() -> Self {
        Self {
            timeout: Duration::ZERO,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_LOCK_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Who holds a lock. Written as JSON into the lock file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockOwner {
    /// Lock id as requested.
    pub id: String,

    /// Process id of the holder.
    pub pid: u32,

    /// Host the holder runs on.
    pub host: String,

    /// When the lock was taken.
    pub acquired_at: DateTime<Utc>,

    /// Unique per acquisition; tells one holder's file from the next.
    #[serde(default)]
    pub token: String,
}

impl LockOwner {
    fn current(id: &str) -> Self {
        let acquired_at = Utc::now();
        let token = format!(
            "{}-{}-{}",
            std::process::id(),
            acquired_at.timestamp_nanos_opt().unwrap_or_default(),
            TOKEN_COUNTER.fetch_add(1, Ordering::Relaxed)
        );
        Self {
            id: id.to_string(),
            pid: std::process::id(),
            host: hostname(),
            acquired_at,
            token,
        }
    }

    fn read(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Whether the owner is a dead process on this host.
    fn is_stale(&self) -> bool {
        self.host == hostname() && !process_alive(self.pid)
    }
}

/// Directory of lock files shared by every workflow instance.
#[derive(Debug, Clone)]
pub struct LockNamespace {
    dir: PathBuf,
    policy: LockPolicy,
}

impl LockNamespace {
    /// Create a namespace rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            policy: LockPolicy::default(),
        }
    }

    /// Replace the wait policy.
    pub fn with_policy(mut self, policy: LockPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Namespace directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Current wait policy.
    pub fn policy(&self) -> LockPolicy {
        self.policy
    }

    /// Path of the lock file for `id`.
    ///
    /// The readable part is a sanitised id; the hash suffix keeps ids that
    /// sanitise to the same text apart.
    pub fn lock_path(&self, id: &str) -> PathBuf {
        let hash = Sha256::digest(id.as_bytes());
        let readable: String = id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        let readable = truncate_start(&readable, 80);
        self.dir
            .join(format!("lock.{}.{}", readable, hex::encode(&hash[..6])))
    }

    /// Whether `id` is currently held by anyone.
    pub fn is_held(&self, id: &str) -> bool {
        self.lock_path(id).exists()
    }

    /// Try once to take the lock. Returns `None` if it is held.
    pub fn try_acquire(&self, id: &str) -> Result<Option<LockGuard>> {
        fs::create_dir_all(&self.dir)?;
        let path = self.lock_path(id);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                let owner = LockOwner::current(id);
                let json = serde_json::to_string(&owner).map_err(anyhow::Error::from)?;
                file.write_all(json.as_bytes())?;
                debug!("Acquired lock {} at {}", id, path.display());
                Ok(Some(LockGuard {
                    id: id.to_string(),
                    path,
                    token: owner.token,
                }))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if self.reclaim_stale(&path) {
                    return self.try_acquire(id);
                }
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Take the lock, waiting according to the policy.
    ///
    /// Fails with [`PipelineError::LockTimeout`] once the timeout passes
    /// and with [`PipelineError::Interrupted`] if `interrupt` is raised
    /// while waiting.
    pub fn acquire(&self, id: &str, interrupt: &InterruptFlag) -> Result<LockGuard> {
        let start = Instant::now();
        let mut announced = false;

        loop {
            if let Some(guard) = self.try_acquire(id)? {
                return Ok(guard);
            }

            let waited = start.elapsed();
            if waited >= self.policy.timeout {
                return Err(PipelineError::LockTimeout {
                    lock: id.to_string(),
                    waited,
                });
            }

            if !announced {
                info!("Waiting for lock {} held by another run", id);
                announced = true;
            }

            let remaining = self.policy.timeout - waited;
            let mut slept = Duration::ZERO;
            let nap = self.policy.poll_interval.min(remaining);
            while slept < nap {
                if interrupt.is_set() {
                    return Err(PipelineError::Interrupted {
                        step: id.to_string(),
                    });
                }
                let tick = Duration::from_millis(50).min(nap - slept);
                thread::sleep(tick);
                slept += tick;
            }
        }
    }

    /// Remove the lock file at `path` if its owner is dead.
    ///
    /// Returns `true` when the file is gone and acquisition can be retried.
    fn reclaim_stale(&self, path: &Path) -> bool {
        // An empty or half-written file belongs to a holder mid-acquire.
        let Some(owner) = LockOwner::read(path) else {
            return false;
        };
        if !owner.is_stale() {
            return false;
        }

        let Some(_gate) = ReclaimGate::enter(path) else {
            return false;
        };
        // Another waiter may have reclaimed and re-taken the lock while we
        // waited for the gate.
        match LockOwner::read(path) {
            Some(current) if current.token == owner.token => {}
            Some(_) => return false,
            None => return !path.exists(),
        }

        warn!(
            "Reclaiming stale lock {} left by dead process {}",
            owner.id, owner.pid
        );
        match fs::remove_file(path) {
            Ok(()) => true,
            Err(e) => e.kind() == ErrorKind::NotFound,
        }
    }
}

/// Exclusive right to delete one stale lock file.
struct ReclaimGate {
    path: PathBuf,
}

impl ReclaimGate {
    fn enter(lock: &Path) -> Option<Self> {
        let mut name = lock.as_os_str().to_os_string();
        name.push(".reclaim");
        let path = PathBuf::from(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Some(Self { path }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let abandoned = fs::metadata(&path)
                    .and_then(|m| m.modified())
                    .ok()
                    .and_then(|t| SystemTime::now().duration_since(t).ok())
                    .is_some_and(|age| age > GATE_STALE_AFTER);
                if abandoned {
                    let _ = fs::remove_file(&path);
                }
                None
            }
            Err(e) => {
                debug!("Cannot create reclaim gate {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl Drop for ReclaimGate {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// A held lock. Released when dropped.
#[derive(Debug)]
pub struct LockGuard {
    id: String,
    path: PathBuf,
    token: String,
}

impl LockGuard {
    /// Lock id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Lock file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        match LockOwner::read(&self.path) {
            Some(owner) if owner.token == self.token => {}
            Some(_) => {
                warn!("Lock {} was taken over by another run; leaving it", self.id);
                return;
            }
            None if !self.path.exists() => return,
            None => {}
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Released lock {}", self.id),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to release lock {}: {}", self.id, e),
        }
    }
}

fn truncate_start(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        &s[s.len() - max_len..]
    }
}

fn hostname() -> String {
    #[cfg(unix)]
    {
        let mut buf = [0u8; 256];
        // SAFETY: the buffer is valid for its full length and gethostname
        // writes at most that many bytes.
        let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
        if rc == 0 {
            let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
            return String::from_utf8_lossy(&buf[..end]).into_owned();
        }
    }
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "localhost".to_string())
}

fn process_alive(pid: u32) -> bool {
    #[cfg(unix)]
    {
        // SAFETY: signal 0 performs permission and existence checks only.
        let rc = unsafe { libc::kill(pid as libc::pid_t, 0) };
        if rc == 0 {
            return true;
        }
        std::io::Error::last_os_error().raw_os_error() != Some(libc::ESRCH)
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        true
    }
}
