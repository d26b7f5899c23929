pub mod casting;
pub mod creators;
pub mod metadata;
pub mod poster;
pub mod ratings;
pub mod technical;
pub mod titles;

pub use casting::CastingPatterns;
pub use creators::CreatorPatterns;
pub use ratings::RatingPatterns;
pub use technical::{TechCategory, TechnicalPatterns};
