// src/sessions.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::quiz::QuizSession;

/// Sessions untouched for this long are dropped by the sweeper
/// (abandoned tabs never send the explicit restart).
const IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// One live session plus its ticker bookkeeping. Every transition goes
/// through the surrounding mutex, which serializes user input against
/// the timeout tick.
pub struct SessionSlot {
    pub session: QuizSession,
    /// Free-form category the client asked for; echoed back so the
    /// score submission can carry it.
    pub category: String,
    ticker: Option<JoinHandle<()>>,
    last_touch: Instant,
}

impl SessionSlot {
    fn new(session: QuizSession, category: String) -> Self {
        Self {
            session,
            category,
            ticker: None,
            last_touch: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_touch = Instant::now();
    }

    /// Aborts the countdown task for the current question, if any.
    pub fn cancel_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

pub type SharedSlot = Arc<Mutex<SessionSlot>>;

/// In-memory registry of live quiz sessions, keyed by session id.
/// Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SharedSlot>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: QuizSession, category: String) -> (Uuid, SharedSlot) {
        let id = Uuid::new_v4();
        let slot = Arc::new(Mutex::new(SessionSlot::new(session, category)));
        self.inner.write().await.insert(id, Arc::clone(&slot));
        (id, slot)
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSlot> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Removes the session and aborts its ticker.
    pub async fn remove(&self, id: Uuid) -> Option<SharedSlot> {
        let slot = self.inner.write().await.remove(&id)?;
        slot.lock().await.cancel_ticker();
        Some(slot)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Drops sessions idle for longer than `idle`. Slots locked by an
    /// in-flight request are left for the next pass.
    pub async fn sweep_idle(&self, idle: Duration) {
        let mut map = self.inner.write().await;
        let mut expired = Vec::new();
        for (id, slot) in map.iter() {
            if let Ok(guard) = slot.try_lock() {
                if guard.last_touch.elapsed() >= idle {
                    expired.push(*id);
                }
            }
        }
        for id in expired {
            if let Some(slot) = map.remove(&id) {
                slot.lock().await.cancel_ticker();
                tracing::debug!("dropped idle session {}", id);
            }
        }
    }
}

/// Spawns the 1 Hz countdown task for the current question and records
/// its handle in the slot. The caller must already hold the slot's lock
/// (the guard), which is what makes replacing an old ticker race-free.
///
/// The task exits on its own once the question settles (answer or
/// timeout) and is aborted explicitly on answer, advance and removal.
pub fn spawn_ticker(slot: &SharedSlot, guard: &mut SessionSlot) {
    guard.cancel_ticker();

    let task_slot = Arc::clone(slot);
    guard.ticker = Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // The first interval tick completes immediately; the countdown
        // starts one second in.
        interval.tick().await;
        loop {
            interval.tick().await;
            let mut guard = task_slot.lock().await;
            if !guard.session.timer_active() {
                break;
            }
            guard.session.tick();
            if !guard.session.timer_active() {
                // Timed out: the question is settled, nothing left to do.
                break;
            }
        }
    }));
}

/// Background task that periodically drops idle sessions.
pub fn spawn_idle_sweeper(store: SessionStore) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            store.sweep_idle(IDLE_TIMEOUT).await;
        }
    })
}
