//! Store wiring for the HTTP layer.
//!
//! Both backends expose the same three store traits; handlers only ever see
//! the trait objects plus the order mutation pipeline.

use std::sync::Arc;

use vendorperf_infra::config::StoreBackend;
use vendorperf_infra::mutation::{MetricsRecomputeHook, OrderMutationHandler};
use vendorperf_infra::store::{
    HistoryStore, InMemoryStore, OrderStore, PostgresStore, StoreResult, VendorStore,
};

pub struct AppServices {
    pub vendors: Arc<dyn VendorStore>,
    pub orders: Arc<dyn OrderStore>,
    pub history: Arc<dyn HistoryStore>,
    pub mutations: Arc<OrderMutationHandler>,
}

impl AppServices {
    /// Wire services around one value that implements all three stores.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: VendorStore + OrderStore + HistoryStore + 'static,
    {
        let vendors: Arc<dyn VendorStore> = store.clone();
        let orders: Arc<dyn OrderStore> = store.clone();
        let history: Arc<dyn HistoryStore> = store;

        let mutations = OrderMutationHandler::new(orders.clone()).with_hook(Arc::new(
            MetricsRecomputeHook::new(orders.clone(), vendors.clone()),
        ));

        Self {
            vendors,
            orders,
            history,
            mutations: Arc::new(mutations),
        }
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }

    /// Connect to Postgres and create the schema if it is missing.
    pub async fn persistent(database_url: &str) -> StoreResult<Self> {
        let store = PostgresStore::connect(database_url).await?;
        store.migrate().await?;
        Ok(Self::from_store(Arc::new(store)))
    }

    pub async fn from_backend(backend: &StoreBackend) -> StoreResult<Self> {
        match backend {
            StoreBackend::InMemory => {
                tracing::info!("using in-memory stores");
                Ok(Self::in_memory())
            }
            StoreBackend::Postgres { database_url } => {
                tracing::info!("using postgres stores");
                Self::persistent(database_url).await
            }
        }
    }
}
