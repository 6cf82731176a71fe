mod recency_model;
mod state_store;
mod weight_learner;

pub use recency_model::IRecencyModel;
pub use state_store::IStateStore;
pub use weight_learner::IWeightLearner;
