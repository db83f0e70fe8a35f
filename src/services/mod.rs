//! Business logic services

pub mod catalog;
pub mod loans;
pub mod uploads;
pub mod users;

use crate::{
    config::{AuthConfig, LoansConfig, UploadsConfig},
    store::Store,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub uploads: uploads::UploadsService,
}

impl Services {
    /// Create all services around the given store
    pub fn new(
        store: Store,
        auth_config: AuthConfig,
        loans_config: LoansConfig,
        uploads_config: UploadsConfig,
    ) -> Self {
        Self {
            users: users::UsersService::new(store.clone(), auth_config),
            catalog: catalog::CatalogService::new(store.clone()),
            loans: loans::LoansService::new(store, loans_config),
            uploads: uploads::UploadsService::new(uploads_config),
        }
    }
}
