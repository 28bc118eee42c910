#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    ChapterRepository, InMemoryRepository, ProgressRepository, Storage, StorageError,
};
