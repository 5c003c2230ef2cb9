pub mod category;
pub mod filter_criteria;
pub mod profile;

pub use category::Category;
pub use filter_criteria::FilterCriteria;
pub use profile::{NewProfile, Profile, ProfileRow};
