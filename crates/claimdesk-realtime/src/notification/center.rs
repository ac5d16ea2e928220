//! The notification center: one owned object holding the reconciliation
//! store, the seen record, the popup slot and the toast queue.
//!
//! All mutation goes through its operations under a single lock, so marking
//! a task seen and closing its popup happen together. UI layers observe the
//! center through [`UiEvent`]s.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use claimdesk_core::config::{NotificationConfig, StorageConfig};
use claimdesk_core::error::AppError;
use claimdesk_core::result::AppResult;
use claimdesk_core::traits::KeyValueStore;
use claimdesk_core::types::{TaskId, TicketId, UserId};
use claimdesk_entity::task::{Task, notification_order};
use claimdesk_storage::keys;

use super::dedup::ToastDeduplicator;
use super::presentation::{CloseReason, PresentationQueue};
use super::reconciliation::ReconciliationStore;
use super::seen::SeenRecord;
use super::session_flag::SessionFlag;
use super::toast::{Toast, ToastQueue};
use crate::invalidation::Invalidation;
use crate::message::types::NotificationKind;
use crate::metrics::RealtimeMetrics;

/// Events announced to the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// A popup for `task` appeared.
    PopupShown {
        /// Task shown.
        task: Task,
    },
    /// The popup for `task_id` went away.
    PopupClosed {
        /// Task that was shown.
        task_id: TaskId,
        /// Why it closed.
        reason: CloseReason,
    },
    /// The unseen badge changed.
    UnseenCountChanged {
        /// New unseen count.
        count: usize,
    },
    /// An ephemeral toast.
    Toast(Toast),
    /// Fetching tickets or tasks failed; lists may be stale.
    LoadFailed {
        /// Error description.
        message: String,
    },
    /// A cached list became stale.
    Invalidated(Invalidation),
}

#[derive(Debug)]
struct UserSession {
    user_id: UserId,
    seen: SeenRecord,
    flag: SessionFlag,
}

#[derive(Debug)]
struct CenterState {
    session: Option<UserSession>,
    tasks: ReconciliationStore,
    presentation: PresentationQueue,
    toasts: ToastQueue,
    /// Auto-dismiss timer of the popup on screen.
    timer: Option<JoinHandle<()>>,
    last_unseen: usize,
}

/// Shared notification state for one signed-in user.
#[derive(Debug)]
pub struct NotificationCenter {
    durable: Arc<dyn KeyValueStore>,
    session_store: Arc<dyn KeyValueStore>,
    notifications: NotificationConfig,
    storage: StorageConfig,
    state: Mutex<CenterState>,
    events: broadcast::Sender<UiEvent>,
    dedup: ToastDeduplicator,
    metrics: Arc<RealtimeMetrics>,
}

impl NotificationCenter {
    /// Create a center persisting seen ids to `durable` and session flags
    /// to `session_store`.
    pub fn new(
        durable: Arc<dyn KeyValueStore>,
        session_store: Arc<dyn KeyValueStore>,
        notifications: NotificationConfig,
        storage: StorageConfig,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        let (events, _) = broadcast::channel(notifications.ui_event_buffer.max(1));
        let dedup = ToastDeduplicator::new(std::time::Duration::from_millis(
            notifications.toast_dedup_window_ms,
        ));

        Self {
            durable,
            session_store,
            state: Mutex::new(CenterState {
                session: None,
                tasks: ReconciliationStore::new(),
                presentation: PresentationQueue::new(),
                toasts: ToastQueue::new(notifications.toast_capacity),
                timer: None,
                last_unseen: 0,
            }),
            notifications,
            storage,
            events,
            dedup,
            metrics,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CenterState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: UiEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    /// Subscribe to UI events.
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    /// Shared counters.
    pub fn metrics(&self) -> &Arc<RealtimeMetrics> {
        &self.metrics
    }

    // ── Session ────────────────────────────────────────────

    /// Start a login session: load the user's seen record and generate a
    /// fresh session token. Any previous session is ended first.
    pub fn login(&self, user_id: &UserId) -> AppResult<()> {
        let account = self.storage.namespace_by_account.then_some(user_id);
        let seen = SeenRecord::load(
            self.durable.clone(),
            keys::seen_tasks(account),
            self.storage.max_seen_entries,
        )?;
        let flag = SessionFlag::begin(self.session_store.clone(), user_id.clone())?;

        let mut guard = self.lock();
        let state = &mut *guard;
        self.end_session(state);

        info!(user_id = %user_id, seen = seen.len(), key = seen.key(), "Notification session started");
        state.session = Some(UserSession {
            user_id: user_id.clone(),
            seen,
            flag,
        });
        self.refresh_count(state);
        Ok(())
    }

    /// End the current session and forget all in-memory state.
    pub fn logout(&self) {
        let mut guard = self.lock();
        self.end_session(&mut guard);
    }

    /// Drop all in-memory state without touching storage.
    pub fn reset(&self) {
        let mut guard = self.lock();
        let state = &mut *guard;
        self.clear_transient(state);
        state.session = None;
        state.last_unseen = 0;
    }

    fn end_session(&self, state: &mut CenterState) {
        self.clear_transient(state);
        if let Some(session) = state.session.take() {
            let user_id = session.user_id.clone();
            if let Err(e) = session.flag.end() {
                warn!(user_id = %user_id, error = %e, "Failed to end notification session");
            }
            info!(user_id = %user_id, "Notification session ended");
        }
        self.refresh_count(state);
    }

    fn clear_transient(&self, state: &mut CenterState) {
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        if let Some(task_id) = state.presentation.close() {
            self.emit(UiEvent::PopupClosed {
                task_id,
                reason: CloseReason::Reset,
            });
        }
        state.tasks.clear();
        state.toasts.clear();
    }

    /// User of the active session.
    pub fn current_user(&self) -> Option<UserId> {
        self.lock().session.as_ref().map(|s| s.user_id.clone())
    }

    // ── Reconciliation ─────────────────────────────────────

    /// Merge a fetched task list for `ticket_id`, then update the badge and
    /// maybe show a popup.
    pub fn ingest_ticket_tasks(self: &Arc<Self>, ticket_id: &TicketId, tasks: Vec<Task>) {
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.session.is_none() {
            debug!(ticket_id = %ticket_id, "Ignoring tasks fetched without a session");
            return;
        }
        trace!(ticket_id = %ticket_id, count = tasks.len(), "Merging task list");
        state.tasks.replace_ticket_tasks(ticket_id, tasks);
        self.withdraw_vanished(state);
        self.refresh_count(state);
        self.evaluate_locked(state);
    }

    /// Merge a single task snapshot.
    pub fn ingest_task(self: &Arc<Self>, task: Task) {
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.session.is_none() {
            return;
        }
        if state.tasks.upsert_task(task) {
            self.refresh_count(state);
            self.evaluate_locked(state);
        }
    }

    /// Forget tasks of tickets missing from `ticket_ids`.
    pub fn retain_tickets(&self, ticket_ids: &[TicketId]) {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.tasks.retain_tickets(ticket_ids);
        self.withdraw_vanished(state);
        self.refresh_count(state);
    }

    /// Close the popup without marking anything seen when its task is no
    /// longer held, e.g. the task or its ticket was deleted.
    fn withdraw_vanished(&self, state: &mut CenterState) {
        let Some(task_id) = state.presentation.current() else {
            return;
        };
        if state.tasks.get(task_id).is_some() {
            return;
        }
        let Some(task_id) = state.presentation.close() else {
            return;
        };
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        info!(task_id = %task_id, "Shown task disappeared, closing popup");
        self.emit(UiEvent::PopupClosed {
            task_id,
            reason: CloseReason::Withdrawn,
        });
    }

    fn refresh_count(&self, state: &mut CenterState) {
        let count = match &state.session {
            Some(session) => state.tasks.unseen_count(&session.seen),
            None => 0,
        };
        if count != state.last_unseen {
            state.last_unseen = count;
            self.emit(UiEvent::UnseenCountChanged { count });
        }
    }

    fn evaluate_locked(self: &Arc<Self>, state: &mut CenterState) {
        let Some(session) = state.session.as_ref() else {
            return;
        };
        if state.presentation.is_showing() {
            return;
        }
        let Some(task) = state
            .tasks
            .most_notification_worthy_unseen(&session.seen)
            .cloned()
        else {
            return;
        };

        match session.flag.is_set() {
            Ok(false) => {}
            Ok(true) => {
                trace!(task_id = %task.id, "Popup already shown this session");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read session flag, not showing popup");
                return;
            }
        }

        // without a recorded flag the popup could repeat this session
        if let Err(e) = session.flag.set() {
            warn!(error = %e, "Failed to record popup in session flag, not showing popup");
            return;
        }
        let Some(generation) = state.presentation.show(task.id.clone()) else {
            return;
        };

        self.arm_timer(state, generation);
        info!(task_id = %task.id, ticket_id = %task.ticket_id, "Showing task popup");
        self.emit(UiEvent::PopupShown { task });
    }

    fn arm_timer(self: &Arc<Self>, state: &mut CenterState, generation: u64) {
        if let Some(old) = state.timer.take() {
            old.abort();
        }
        let center = Arc::downgrade(self);
        let delay = self.notifications.auto_dismiss();
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(center) = center.upgrade() {
                center.expire(generation);
            }
        }));
    }

    // ── Acknowledgement ────────────────────────────────────

    /// Task currently shown in the popup.
    pub fn showing(&self) -> Option<Task> {
        let state = self.lock();
        let task_id = state.presentation.current()?;
        state.tasks.get(task_id).cloned()
    }

    /// Close the popup and mark its task seen.
    pub fn dismiss(&self) -> AppResult<Option<TaskId>> {
        let mut guard = self.lock();
        self.acknowledge_current(&mut guard, CloseReason::Dismissed)
    }

    /// Close the popup, mark its task seen and return the task so the
    /// caller can navigate to it.
    pub fn view(&self) -> AppResult<Option<Task>> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let Some(task_id) = self.acknowledge_current(state, CloseReason::Viewed)? else {
            return Ok(None);
        };
        Ok(state.tasks.get(&task_id).cloned())
    }

    fn expire(&self, generation: u64) {
        let mut guard = self.lock();
        let state = &mut *guard;
        if !state.presentation.is_current(generation) {
            return;
        }
        // this timer is finishing; nothing to abort
        state.timer = None;

        if let Err(e) = self.acknowledge_current(state, CloseReason::Expired) {
            warn!(error = %e, "Failed to persist seen task on auto-dismiss");
            if let Some(task_id) = state.presentation.close_generation(generation) {
                self.emit(UiEvent::PopupClosed {
                    task_id,
                    reason: CloseReason::Expired,
                });
            }
        }
    }

    /// Mark the shown task seen and go idle, in that order. If persisting
    /// fails the popup stays up.
    fn acknowledge_current(
        &self,
        state: &mut CenterState,
        reason: CloseReason,
    ) -> AppResult<Option<TaskId>> {
        let Some(task_id) = state.presentation.current().cloned() else {
            return Ok(None);
        };
        if let Some(session) = state.session.as_mut() {
            session.seen.mark(&task_id)?;
        }

        state.presentation.close();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        info!(task_id = %task_id, %reason, "Popup closed");
        self.emit(UiEvent::PopupClosed {
            task_id: task_id.clone(),
            reason,
        });
        self.refresh_count(state);
        Ok(Some(task_id))
    }

    /// Mark a task seen (e.g. the user opened it from a list). Closes the
    /// popup if it shows that task.
    pub fn mark_seen(&self, task_id: &TaskId) -> AppResult<bool> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let session = state
            .session
            .as_mut()
            .ok_or_else(|| AppError::authentication("No active notification session"))?;

        let added = session.seen.mark(task_id)?;
        if state.presentation.close_task(task_id) {
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            self.emit(UiEvent::PopupClosed {
                task_id: task_id.clone(),
                reason: CloseReason::Acknowledged,
            });
        }
        self.refresh_count(state);
        Ok(added)
    }

    /// Forget every seen id of the current user.
    pub fn clear_seen(self: &Arc<Self>) -> AppResult<()> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let Some(session) = state.session.as_mut() else {
            return Ok(());
        };
        session.seen.clear()?;
        self.refresh_count(state);
        self.evaluate_locked(state);
        Ok(())
    }

    /// Whether `task_id` is in the seen record.
    pub fn is_seen(&self, task_id: &TaskId) -> bool {
        self.lock()
            .session
            .as_ref()
            .is_some_and(|s| s.seen.contains(task_id))
    }

    // ── Queries ────────────────────────────────────────────

    /// Number of unseen tasks (the badge).
    pub fn unseen_count(&self) -> usize {
        let state = self.lock();
        match &state.session {
            Some(session) => state.tasks.unseen_count(&session.seen),
            None => 0,
        }
    }

    /// Whether any task is unseen.
    pub fn has_unseen(&self) -> bool {
        self.unseen_count() > 0
    }

    /// Unseen tasks, most notification-worthy first.
    pub fn unseen_tasks(&self) -> Vec<Task> {
        let state = self.lock();
        let Some(session) = &state.session else {
            return Vec::new();
        };
        let mut tasks: Vec<Task> = state.tasks.unseen(&session.seen).cloned().collect();
        tasks.sort_by(notification_order);
        tasks
    }

    /// Ticket owning `task_id`, if the task is known.
    pub fn ticket_of(&self, task_id: &TaskId) -> Option<TicketId> {
        self.lock().tasks.ticket_of(task_id).cloned()
    }

    /// Tickets whose task lists are held.
    pub fn tracked_tickets(&self) -> Vec<TicketId> {
        self.lock().tasks.ticket_ids().cloned().collect()
    }

    // ── Toasts & signals ───────────────────────────────────

    /// Queue a toast unless an identical one was just shown.
    pub fn push_toast(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        task_id: Option<TaskId>,
    ) -> Option<Toast> {
        let message = message.into();
        let key = ToastDeduplicator::make_key(&message, kind, task_id.as_ref());
        let shown = self.dedup.should_show(&key);
        self.metrics.record_toast(shown);
        if !shown {
            debug!(message = %message, "Duplicate toast suppressed");
            return None;
        }

        let toast = self.lock().toasts.push(message, kind, task_id);
        self.emit(UiEvent::Toast(toast.clone()));
        Some(toast)
    }

    /// Queued toasts, oldest first.
    pub fn toasts(&self) -> Vec<Toast> {
        self.lock().toasts.iter().cloned().collect()
    }

    /// Announce that a fetch failed.
    pub fn report_load_failure(&self, error: &AppError) {
        self.emit(UiEvent::LoadFailed {
            message: error.to_string(),
        });
    }

    /// Announce a stale cache.
    pub fn announce_invalidation(&self, invalidation: Invalidation) {
        self.emit(UiEvent::Invalidated(invalidation));
    }
}
