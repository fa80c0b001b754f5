use std::sync::Arc;

use cc_battle::EnginePool;

/// Resolves a job's named engine slots to the pool that actually runs them.
/// Spawning and managing UCI processes is out of scope here; this crate
/// only needs to find the right [`EnginePool`] by name.
pub trait EngineRegistry: Send + Sync {
    fn pool_for(&self, engine_name: &str) -> Option<Arc<dyn EnginePool>>;
}
