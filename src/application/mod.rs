/// Application layer: the review pipeline and the publish flow
pub mod services;
pub mod use_cases;
