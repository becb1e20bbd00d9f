use crate::device::DeviceOps;
use crate::error::{NetlogError, Result};
use crate::flags::store::{FlagSnapshot, FlagStore};
use log::*;
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Opened, nothing written yet
    Pending,
    /// Modified list installed; close will restore
    Active,
    Closed,
}

/// Temporarily replaces a flag list and puts the original back on close
///
/// `close` must run on every exit path. Dropping an active session cannot
/// restore the store (that needs the device) and only logs a warning.
pub struct FlagSession<'s, 'd, D: DeviceOps + ?Sized> {
    store: &'s FlagStore<'d, D>,
    original: FlagSnapshot,
    state: SessionState,
}

impl<'s, 'd, D: DeviceOps + ?Sized> FlagSession<'s, 'd, D> {
    /// Record `original` as the file to restore. Writes nothing.
    pub fn open(store: &'s FlagStore<'d, D>, original: FlagSnapshot) -> Self {
        Self {
            store,
            original,
            state: SessionState::Pending,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Install `flags`. Allowed once, before close.
    ///
    /// If the write itself fails the session never becomes active. If it
    /// lands but reads back wrong the session is active and the error is
    /// still returned, so close puts the original back.
    pub async fn apply(&mut self, flags: &[String]) -> Result<()> {
        match self.state {
            SessionState::Pending => {}
            SessionState::Active => return Err(NetlogError::Session("flags already applied")),
            SessionState::Closed => return Err(NetlogError::Session("session already closed")),
        }

        if let Err(e) = self.store.put(flags).await {
            self.state = SessionState::Closed;
            return Err(e);
        }
        self.state = SessionState::Active;
        debug!("Flag session active on {}", self.store.path());

        self.store.verify(flags).await
    }

    /// Restore the original file if this session changed it. Idempotent.
    pub async fn close(&mut self) -> Result<()> {
        if self.state != SessionState::Active {
            self.state = SessionState::Closed;
            return Ok(());
        }

        // Closed even if the restore fails; there is no second attempt.
        self.state = SessionState::Closed;
        info!(
            "Restoring flags on {}: {:?}",
            self.store.path(),
            self.original.flags()
        );
        self.store.restore(&self.original).await
    }
}

impl<D: DeviceOps + ?Sized> Drop for FlagSession<'_, '_, D> {
    fn drop(&mut self) {
        if self.state == SessionState::Active {
            warn!(
                "Flag session on {} dropped while active; original flags {:?} were not restored",
                self.store.path(),
                self.original.flags()
            );
        }
    }
}

/// Result of a scope run under modified flags
#[derive(Debug)]
pub struct Scoped<T> {
    /// The scope body's own result
    pub value: Result<T>,
    /// The flags that were installed
    pub applied: Vec<String>,
    /// Whether the original flags were put back
    pub restore: Result<()>,
}

/// Run `body` with the flags produced by `edit`, then restore
///
/// `edit` receives the current list. The file is restored byte-for-byte,
/// not re-serialized from that list. The outer error covers reading the
/// current flags and installing the new ones; once installed, `body`'s
/// result and the restore result are both returned regardless of either.
pub async fn with_flags<D, E, F, Fut, T>(
    store: &FlagStore<'_, D>,
    edit: E,
    body: F,
) -> Result<Scoped<T>>
where
    D: DeviceOps + ?Sized,
    E: FnOnce(&[String]) -> Vec<String>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let original = store.snapshot().await?;
    let applied = edit(original.flags());
    info!("Running with flags {:?}", applied);

    let mut session = FlagSession::open(store, original);
    if let Err(e) = session.apply(&applied).await {
        if session.state() == SessionState::Active {
            if let Err(restore) = session.close().await {
                error!("Failed to restore flags after bad write: {}", restore);
            }
        }
        return Err(e);
    }

    let value = body().await;
    let restore = session.close().await;

    Ok(Scoped {
        value,
        applied,
        restore,
    })
}
