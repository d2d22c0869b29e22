use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

static CWD_LOCK: OnceLock<ReentrantMutex<()>> = OnceLock::new();

fn cwd_lock() -> &'static ReentrantMutex<()> {
    CWD_LOCK.get_or_init(|| ReentrantMutex::new(()))
}

/// Changes the process working directory for as long as it is alive.
///
/// The previous directory is restored on drop, including during unwinding.
/// Guards are serialized process-wide since the working directory is global.
#[derive(Debug)]
pub struct WorkingDirGuard {
    previous: PathBuf,
    _lock: ReentrantMutexGuard<'static, ()>,
}

impl WorkingDirGuard {
    pub fn enter(dir: &Path) -> io::Result<Self> {
        let lock = cwd_lock().lock();
        let previous = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        tracing::trace!(target: "els.ide", dir = %dir.display(), "entered working directory");
        Ok(Self {
            previous,
            _lock: lock,
        })
    }

    /// Directory that will be restored on drop.
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(err) = std::env::set_current_dir(&self.previous) {
            tracing::warn!(
                target: "els.ide",
                dir = %self.previous.display(),
                error = %err,
                "failed to restore working directory"
            );
        }
    }
}
