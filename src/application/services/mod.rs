pub mod public_url;
pub mod review_generator;

pub use public_url::{PublicUrlResolver, DEFAULT_SIGNED_URL_EXPIRY};
pub use review_generator::{DiffDigestReviewer, ReviewGenerationError, ReviewGenerator};
