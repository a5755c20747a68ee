use std::sync::Arc;

use crate::auth::PasswordResets;
use crate::config::Config;
use crate::engine::admin::AdminActions;
use crate::engine::aggregator::Aggregator;
use crate::engine::projection::ProjectionBuilder;
use crate::engine::reader::StoreReader;
use crate::observability::metrics::Metrics;
use crate::store::RemoteStore;

#[derive(Debug, Clone)]
pub struct Settings {
    pub driver_location_limit: usize,
    pub drivers_per_page: usize,
    pub require_admin: bool,
}

pub struct AppState {
    pub store: Arc<dyn RemoteStore>,
    pub auth: Arc<dyn PasswordResets>,
    pub aggregator: Aggregator,
    pub projections: ProjectionBuilder,
    pub admin: AdminActions,
    pub metrics: Metrics,
    pub settings: Settings,
}

impl AppState {
    pub fn new(store: Arc<dyn RemoteStore>, auth: Arc<dyn PasswordResets>, config: &Config) -> Self {
        let metrics = Metrics::new();
        let reader = StoreReader::new(store.clone(), config.fetch_timeout, metrics.clone());

        Self {
            aggregator: Aggregator::new(reader.clone()),
            projections: ProjectionBuilder::new(reader.clone(), config.franchise_owner_id.clone()),
            admin: AdminActions::new(store.clone(), reader, &config.franchise_owner_id),
            store,
            auth,
            metrics,
            settings: Settings {
                driver_location_limit: config.driver_location_limit,
                drivers_per_page: config.drivers_per_page,
                require_admin: config.require_admin,
            },
        }
    }
}
