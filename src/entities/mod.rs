mod location;
mod region;
mod ride_tier;
mod route;
mod search;

pub use location::{Coordinates, Location};
pub use region::{EdgePadding, MapRegion};
pub use ride_tier::{Fare, RideTier, METERS_PER_MILE};
pub use route::Route;
pub use search::SearchCompletion;
