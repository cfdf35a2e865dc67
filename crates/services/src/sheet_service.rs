use std::sync::{Arc, Mutex, PoisonError};

use sheet_core::model::{
    CompletedSet, Outcome, Question, QuestionId, Sheet, Subtopic, SubtopicId, Topic, TopicId,
};
use sheet_core::progress::{self, Progress};
use sheet_core::reorder;
use storage::cache::ClientCache;
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio::task::JoinSet;

use crate::error::SheetServiceError;
use crate::remote::TopicRemote;

/// A remote write the store dispatched after a local mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOp {
    Create(Topic),
    Replace(Topic),
    Delete(TopicId),
}

impl RemoteOp {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            RemoteOp::Create(_) => "create_topic",
            RemoteOp::Replace(_) => "replace_topic",
            RemoteOp::Delete(_) => "delete_topic",
        }
    }

    #[must_use]
    pub fn topic_id(&self) -> &TopicId {
        match self {
            RemoteOp::Create(topic) | RemoteOp::Replace(topic) => topic.id(),
            RemoteOp::Delete(id) => id,
        }
    }
}

/// Reported when a dispatched remote write fails, so the UI can offer a retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFailure {
    pub op: RemoteOp,
    pub error: String,
}

struct SheetState {
    sheet: Sheet,
    completed: CompletedSet,
    admin: bool,
}

/// The hierarchical store.
///
/// Owns the sheet, the completed set and the admin display flag for the
/// session. Construct it once and hand it to every collaborator.
///
/// Every mutation runs under one lock and writes its whole snapshot to the
/// client cache before returning, so snapshots land in mutation order.
/// Changes are made on a copy that replaces the live state only once the
/// cache write succeeds; a failed write leaves memory and cache as they were
/// and sends nothing remote. Mutations that dispatch a remote write must run
/// inside a Tokio runtime. Topic-level changes are then sent to the remote side fire-and-forget:
/// nothing waits for the response and nothing is reconciled with later local
/// changes. Concurrent sessions writing the same remote topic can therefore
/// overwrite each other.
pub struct SheetService {
    state: AsyncMutex<SheetState>,
    cache: ClientCache,
    remote: Option<Arc<dyn TopicRemote>>,
    failures: Option<mpsc::UnboundedSender<RemoteFailure>>,
    pending: Mutex<JoinSet<()>>,
}

impl SheetService {
    /// Restore the store from the client cache.
    ///
    /// Missing or malformed cached values start out empty.
    ///
    /// # Errors
    ///
    /// Returns `SheetServiceError::Storage` if the first-run admin default
    /// cannot be written.
    pub async fn load(cache: ClientCache) -> Result<Self, SheetServiceError> {
        let sheet = cache.load_sheet().await;
        let completed = cache.load_completed().await;
        let admin = cache.load_admin_mode().await?;
        tracing::debug!(
            topics = sheet.len(),
            completed = completed.len(),
            admin,
            "sheet store restored"
        );
        Ok(Self {
            state: AsyncMutex::new(SheetState {
                sheet,
                completed,
                admin,
            }),
            cache,
            remote: None,
            failures: None,
            pending: Mutex::new(JoinSet::new()),
        })
    }

    /// Mirror topic-level changes to a remote document store.
    #[must_use]
    pub fn with_remote(mut self, remote: Arc<dyn TopicRemote>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Receive a `RemoteFailure` for every failed remote write.
    #[must_use]
    pub fn with_failure_sink(mut self, sink: mpsc::UnboundedSender<RemoteFailure>) -> Self {
        self.failures = Some(sink);
        self
    }

    // ─── READS ─────────────────────────────────────────────────────────────────

    /// Run a read-only projection against the current state.
    pub async fn read<R>(&self, f: impl FnOnce(&Sheet, &CompletedSet) -> R) -> R {
        let state = self.state.lock().await;
        f(&state.sheet, &state.completed)
    }

    pub async fn sheet(&self) -> Sheet {
        self.read(|sheet, _| sheet.clone()).await
    }

    pub async fn completed(&self) -> CompletedSet {
        self.read(|_, completed| completed.clone()).await
    }

    /// Whole-sheet progress.
    pub async fn progress(&self) -> Progress {
        self.read(|sheet, completed| Progress::of(sheet, completed))
            .await
    }

    pub async fn topic_progress(&self, id: &TopicId) -> Option<Progress> {
        self.read(|sheet, completed| sheet.topic(id).map(|t| Progress::of(t, completed)))
            .await
    }

    /// First open question in structural order.
    pub async fn next_incomplete(&self) -> Option<Question> {
        self.read(|sheet, completed| {
            progress::next_incomplete(sheet, completed).map(|next| next.question.clone())
        })
        .await
    }

    pub async fn is_admin(&self) -> bool {
        self.state.lock().await.admin
    }

    // ─── TOPICS ────────────────────────────────────────────────────────────────

    /// Append a topic. Returns `None` (and changes nothing) for a blank title.
    ///
    /// # Errors
    ///
    /// Returns `SheetServiceError::Storage` if the snapshot cannot be cached;
    /// the store is left unchanged and nothing is sent.
    pub async fn add_topic(&self, title: &str) -> Result<Option<Topic>, SheetServiceError> {
        let mut state = self.state.lock().await;
        let mut next = state.sheet.clone();
        let topic = match next.add_topic(title) {
            Ok(topic) => topic.clone(),
            Err(err) => {
                tracing::debug!(error = %err, "add_topic rejected");
                return Ok(None);
            }
        };
        self.commit_sheet(&mut state, next).await?;
        drop(state);

        self.dispatch(RemoteOp::Create(topic.clone()));
        Ok(Some(topic))
    }

    /// # Errors
    ///
    /// Returns `SheetServiceError::Storage` if the snapshot cannot be cached.
    pub async fn delete_topic(&self, id: &TopicId) -> Result<Outcome, SheetServiceError> {
        let mut state = self.state.lock().await;
        let mut next = state.sheet.clone();
        let outcome = next.delete_topic(id);
        if outcome.is_applied() {
            self.commit_sheet(&mut state, next).await?;
            drop(state);
            self.dispatch(RemoteOp::Delete(id.clone()));
        }
        Ok(outcome)
    }

    /// Positional move; out-of-range indices are a `NotFound` no-op.
    ///
    /// Ordering is client-local and is not sent to the remote side.
    ///
    /// # Errors
    ///
    /// Returns `SheetServiceError::Storage` if the snapshot cannot be cached.
    pub async fn reorder_topics(
        &self,
        from: usize,
        to: usize,
    ) -> Result<Outcome, SheetServiceError> {
        let mut state = self.state.lock().await;
        let mut next = state.sheet.clone();
        let outcome = next.reorder_topics(from, to);
        if outcome.is_applied() {
            self.commit_sheet(&mut state, next).await?;
        }
        Ok(outcome)
    }

    /// Drag gesture: move `dragged` to the position of `target`.
    ///
    /// # Errors
    ///
    /// Returns `SheetServiceError::Storage` if the snapshot cannot be cached.
    pub async fn move_topic(
        &self,
        dragged: &TopicId,
        target: &TopicId,
    ) -> Result<Outcome, SheetServiceError> {
        let mut state = self.state.lock().await;
        let mut next = state.sheet.clone();
        let outcome = reorder::apply_move(&mut next, dragged, target);
        if outcome.is_applied() {
            self.commit_sheet(&mut state, next).await?;
        }
        Ok(outcome)
    }

    // ─── NESTED ────────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `SheetServiceError::Storage` if the snapshot cannot be cached.
    pub async fn add_subtopic(
        &self,
        topic_id: &TopicId,
        title: &str,
    ) -> Result<Option<Subtopic>, SheetServiceError> {
        let mut state = self.state.lock().await;
        let mut next = state.sheet.clone();
        let Some(subtopic) = next.add_subtopic(topic_id, title).cloned() else {
            return Ok(None);
        };
        self.commit_nested(state, next, topic_id).await?;
        Ok(Some(subtopic))
    }

    /// # Errors
    ///
    /// Returns `SheetServiceError::Storage` if the snapshot cannot be cached.
    pub async fn delete_subtopic(
        &self,
        topic_id: &TopicId,
        sub_id: &SubtopicId,
    ) -> Result<Outcome, SheetServiceError> {
        let mut state = self.state.lock().await;
        let mut next = state.sheet.clone();
        let outcome = next.delete_subtopic(topic_id, sub_id);
        if outcome.is_applied() {
            self.commit_nested(state, next, topic_id).await?;
        }
        Ok(outcome)
    }

    /// Append a question. The link is stored as given; see
    /// `sheet_core::model::normalize_link` for the caller-side cleanup.
    ///
    /// # Errors
    ///
    /// Returns `SheetServiceError::Storage` if the snapshot cannot be cached.
    pub async fn add_question(
        &self,
        topic_id: &TopicId,
        sub_id: &SubtopicId,
        title: &str,
        link: &str,
    ) -> Result<Option<Question>, SheetServiceError> {
        let mut state = self.state.lock().await;
        let mut next = state.sheet.clone();
        let Some(question) = next.add_question(topic_id, sub_id, title, link).cloned() else {
            return Ok(None);
        };
        self.commit_nested(state, next, topic_id).await?;
        Ok(Some(question))
    }

    /// Removes a question. Its id stays in the completed set.
    ///
    /// # Errors
    ///
    /// Returns `SheetServiceError::Storage` if the snapshot cannot be cached.
    pub async fn delete_question(
        &self,
        topic_id: &TopicId,
        sub_id: &SubtopicId,
        question_id: &QuestionId,
    ) -> Result<Outcome, SheetServiceError> {
        let mut state = self.state.lock().await;
        let mut next = state.sheet.clone();
        let outcome = next.delete_question(topic_id, sub_id, question_id);
        if outcome.is_applied() {
            self.commit_nested(state, next, topic_id).await?;
        }
        Ok(outcome)
    }

    // ─── COMPLETION / HYDRATION / ADMIN ───────────────────────────────────────

    /// Flip completion of `id`, whether or not it exists in the tree.
    /// Returns the new membership.
    ///
    /// # Errors
    ///
    /// Returns `SheetServiceError::Storage` if the snapshot cannot be cached.
    pub async fn toggle_complete(&self, id: &QuestionId) -> Result<bool, SheetServiceError> {
        let mut state = self.state.lock().await;
        let mut next = state.completed.clone();
        let done = next.toggle(id.clone());
        self.cache.save_completed(&next).await?;
        state.completed = next;
        Ok(done)
    }

    /// Replace the whole sheet unconditionally.
    ///
    /// # Errors
    ///
    /// Returns `SheetServiceError::Storage` if the snapshot cannot be cached.
    pub async fn hydrate(&self, topics: Vec<Topic>) -> Result<(), SheetServiceError> {
        let mut state = self.state.lock().await;
        let mut next = Sheet::new();
        next.hydrate(topics);
        self.commit_sheet(&mut state, next).await
    }

    /// Replace the sheet only if it is currently empty. Returns whether it did.
    ///
    /// # Errors
    ///
    /// Returns `SheetServiceError::Storage` if the snapshot cannot be cached.
    pub async fn hydrate_if_empty(&self, topics: Vec<Topic>) -> Result<bool, SheetServiceError> {
        let mut state = self.state.lock().await;
        if !state.sheet.is_empty() {
            return Ok(false);
        }
        let mut next = Sheet::new();
        next.hydrate(topics);
        self.commit_sheet(&mut state, next).await?;
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns `SheetServiceError::Storage` if the flag cannot be cached.
    pub async fn set_admin_mode(&self, enabled: bool) -> Result<(), SheetServiceError> {
        let mut state = self.state.lock().await;
        self.cache.save_admin_mode(enabled).await?;
        state.admin = enabled;
        Ok(())
    }

    /// Flip the admin display flag and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `SheetServiceError::Storage` if the flag cannot be cached.
    pub async fn toggle_admin_mode(&self) -> Result<bool, SheetServiceError> {
        let mut state = self.state.lock().await;
        let enabled = !state.admin;
        self.cache.save_admin_mode(enabled).await?;
        state.admin = enabled;
        Ok(enabled)
    }

    /// Cache `next`, then make it the current sheet. A failed save leaves the
    /// current sheet in place.
    async fn commit_sheet(
        &self,
        state: &mut SheetState,
        next: Sheet,
    ) -> Result<(), SheetServiceError> {
        self.cache.save_sheet(&next).await?;
        state.sheet = next;
        Ok(())
    }

    async fn commit_nested(
        &self,
        mut state: tokio::sync::MutexGuard<'_, SheetState>,
        next: Sheet,
        topic_id: &TopicId,
    ) -> Result<(), SheetServiceError> {
        self.commit_sheet(&mut state, next).await?;
        let owner = state.sheet.topic(topic_id).cloned();
        drop(state);
        if let Some(topic) = owner {
            self.dispatch(RemoteOp::Replace(topic));
        }
        Ok(())
    }

    // ─── REMOTE DISPATCH ──────────────────────────────────────────────────────

    /// Send a previously failed remote write again.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime, like every mutation that
    /// dispatches a remote write.
    pub fn retry(&self, op: RemoteOp) {
        self.dispatch(op);
    }

    /// Wait for every in-flight remote write to settle.
    pub async fn flush(&self) {
        let mut pending = std::mem::take(
            &mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner),
        );
        while let Some(joined) = pending.join_next().await {
            if let Err(err) = joined {
                tracing::error!(error = %err, "remote write task aborted");
            }
        }
    }

    /// Spawns onto the current Tokio runtime; panics outside one.
    fn dispatch(&self, op: RemoteOp) {
        let Some(remote) = self.remote.clone() else {
            return;
        };
        let failures = self.failures.clone();

        let task = async move {
            let result = match &op {
                RemoteOp::Create(topic) => remote.create_topic(topic).await.map(|_| ()),
                RemoteOp::Replace(topic) => remote.replace_topic(topic).await,
                RemoteOp::Delete(id) => remote.delete_topic(id).await,
            };
            match result {
                Ok(()) => {
                    tracing::debug!(op = op.name(), topic_id = %op.topic_id(), "remote write applied");
                }
                Err(err) => {
                    tracing::warn!(
                        op = op.name(),
                        topic_id = %op.topic_id(),
                        error = %err,
                        "remote write failed"
                    );
                    if let Some(sink) = failures {
                        let _ = sink.send(RemoteFailure {
                            op,
                            error: err.to_string(),
                        });
                    }
                }
            }
        };

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        while pending.try_join_next().is_some() {}
        pending.spawn(task);
    }
}
