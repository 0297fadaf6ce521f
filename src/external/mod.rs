pub mod google_maps;
mod static_location;

pub use google_maps::GoogleMaps;
pub use static_location::StaticLocation;
