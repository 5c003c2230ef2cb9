pub mod memory_profile_repo;
pub mod profile_repo;
pub mod repository;

pub use memory_profile_repo::InMemoryProfileRepository;
pub use profile_repo::SqliteProfileRepository;
pub use repository::{ProfileRepository, ProfileStream, RepositoryError};
