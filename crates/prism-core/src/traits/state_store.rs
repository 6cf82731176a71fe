use crate::errors::PrismResult;
use crate::models::EngineState;

/// External persistence for the full engine state.
pub trait IStateStore: Send + Sync {
    fn save(&self, state: &EngineState) -> PrismResult<()>;

    /// `None` when nothing has been saved yet.
    fn load(&self) -> PrismResult<Option<EngineState>>;
}
