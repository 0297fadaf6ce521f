use std::sync::Arc;

use async_trait::async_trait;

use crate::entities::{Coordinates, Location, Route, SearchCompletion};
use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LocationUpdate {
    Fix(Coordinates),
    Denied,
}

pub trait LocationProvider {
    /// Updates are delivered once permission is granted and a fix is
    /// obtained. The channel may close after the first fix.
    fn subscribe(&self) -> async_channel::Receiver<LocationUpdate>;
}

#[async_trait]
pub trait AddressSearch {
    async fn complete(
        &self,
        query: String,
        near: Option<Coordinates>,
    ) -> Result<Vec<SearchCompletion>, Error>;
    async fn resolve(&self, completion: SearchCompletion) -> Result<Location, Error>;
}

#[async_trait]
pub trait RoutingService {
    async fn route(&self, origin: Coordinates, destination: Coordinates) -> Result<Route, Error>;
}

pub type DynLocationProvider = Arc<dyn LocationProvider + Send + Sync>;
pub type DynAddressSearch = Arc<dyn AddressSearch + Send + Sync>;
pub type DynRoutingService = Arc<dyn RoutingService + Send + Sync>;

/// The platform services a session depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub location: DynLocationProvider,
    pub search: DynAddressSearch,
    pub routing: DynRoutingService,
}
