pub mod db;
pub mod journal;
pub mod kv;
pub mod models;
pub mod repository;

pub use db::Database;
pub use journal::{record_interaction, save_task, set_task_status, InteractionDraft, TaskDraft};
pub use kv::{KeyValueStore, MemoryStore, StoredEntry};
pub use models::{Annotation, ExtensionValue, Interaction, InteractionKind, JournalTask, Priority, Record, TaskStatus};
pub use repository::Repository;
