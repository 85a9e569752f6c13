#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    CompletionRepository, EventRepository, InMemoryRepository, MilestoneRepository, Storage,
    StorageError, TaskRepository,
};
