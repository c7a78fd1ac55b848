pub mod review;

pub use review::{
    BusinessId, GeneratedReview, GenerationSource, PostReceipt, PostedReviewRecord, Rating,
    ReviewInput, SimulatedPost, STATUS_POSTED,
};

#[cfg(test)]
mod tests;
