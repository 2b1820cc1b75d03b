mod candidate_channel;
mod candidate_subscription;

pub use candidate_channel::CandidateChannel;
pub use candidate_subscription::CandidateSubscription;
