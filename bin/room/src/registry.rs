use std::collections::HashMap;
use std::sync::Arc;

use cc_battle::EnginePool;
use cc_room::EngineRegistry;

use crate::process_engine::{EngineSpec, ProcessEnginePool};

/// Fixed name→pool table built once at startup from `--engine` flags.
pub struct StaticEngineRegistry {
    pools: HashMap<String, Arc<dyn EnginePool>>,
}

impl StaticEngineRegistry {
    pub fn new(specs: impl IntoIterator<Item = (String, EngineSpec)>) -> Self {
        let pools = specs
            .into_iter()
            .map(|(name, spec)| (name, Arc::new(ProcessEnginePool::new(spec)) as Arc<dyn EnginePool>))
            .collect();
        Self { pools }
    }
}

impl EngineRegistry for StaticEngineRegistry {
    fn pool_for(&self, engine_name: &str) -> Option<Arc<dyn EnginePool>> {
        self.pools.get(engine_name).cloned()
    }
}
