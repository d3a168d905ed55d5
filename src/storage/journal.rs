use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::{
    error::{CaseError, Result},
    storage::{
        kv::KeyValueStore,
        models::{Annotation, Interaction, InteractionKind, JournalTask, Priority, Record, TaskStatus},
        repository::Repository,
    },
};

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Task fields as entered by a caseworker.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    /// Generated when absent.
    pub id: Option<String>,
    pub owner_id: String,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
}

/// Interaction fields as entered by a caseworker.
#[derive(Debug, Clone)]
pub struct InteractionDraft {
    pub id: Option<String>,
    pub owner_id: String,
    pub kind: InteractionKind,
    pub summary: String,
    pub tags: Vec<String>,
}

/// Store the task described by `draft`.
///
/// A task with the same id is replaced as a whole: status, due date,
/// annotations and extensions all come from the draft. Only the creation
/// time of the previous task is kept.
pub fn save_task<S: KeyValueStore + ?Sized>(
    journal: &Repository<'_, JournalTask, S>,
    draft: TaskDraft,
) -> Result<JournalTask> {
    let id = match draft.id {
        Some(id) => id,
        None => next_free_id(journal, "task")?,
    };

    let mut task = JournalTask::new(&id, &draft.owner_id, &draft.title);
    if let Some(existing) = journal.get_by_id(&id)? {
        info!("Replacing task {}", id);
        task.created_at = existing.created_at;
    }

    task.due_date = draft.due_date;
    if let Some(level) = draft.priority {
        task.annotations.push(Annotation::Priority { level });
    }
    task.annotations
        .extend(draft.tags.into_iter().map(|label| Annotation::Tag { label }));

    journal.upsert_by_id(&task)?;
    Ok(task)
}

/// Move an existing task to `status`.
pub fn set_task_status<S: KeyValueStore + ?Sized>(
    journal: &Repository<'_, JournalTask, S>,
    id: &str,
    status: TaskStatus,
) -> Result<JournalTask> {
    let mut task = journal
        .get_by_id(id)?
        .ok_or_else(|| CaseError::RecordNotFound(format!("task {}", id)))?;
    task.set_status(status);
    journal.upsert_by_id(&task)?;
    Ok(task)
}

/// Store the interaction described by `draft`, replacing any with the same id.
pub fn record_interaction<S: KeyValueStore + ?Sized>(
    interactions: &Repository<'_, Interaction, S>,
    draft: InteractionDraft,
) -> Result<Interaction> {
    let id = match draft.id {
        Some(id) => id,
        None => next_free_id(interactions, "int")?,
    };

    let mut interaction = Interaction::new(&id, &draft.owner_id, draft.kind, &draft.summary);
    interaction
        .annotations
        .extend(draft.tags.into_iter().map(|label| Annotation::Tag { label }));

    interactions.upsert_by_id(&interaction)?;
    Ok(interaction)
}

/// Timestamped id with a process-wide sequence number, skipping ids that are
/// already taken in the namespace.
fn next_free_id<T: Record, S: KeyValueStore + ?Sized>(
    repository: &Repository<'_, T, S>,
    prefix: &str,
) -> Result<String> {
    loop {
        let id = format!(
            "{}-{}-{}",
            prefix,
            Utc::now().format("%Y%m%d%H%M%S%3f"),
            ID_SEQUENCE.fetch_add(1, Ordering::Relaxed)
        );
        if !repository.contains(&id)? {
            return Ok(id);
        }
    }
}
