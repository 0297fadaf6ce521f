use crate::api::{LocationProvider, LocationUpdate};
use crate::entities::Coordinates;

/// A location provider with a single, known answer: one fix, or a denied
/// permission. The channel closes after that first update.
#[derive(Clone, Copy, Debug)]
pub struct StaticLocation {
    update: LocationUpdate,
}

impl StaticLocation {
    pub fn fixed(coordinates: Coordinates) -> Self {
        Self {
            update: LocationUpdate::Fix(coordinates),
        }
    }

    pub fn denied() -> Self {
        Self {
            update: LocationUpdate::Denied,
        }
    }
}

impl LocationProvider for StaticLocation {
    fn subscribe(&self) -> async_channel::Receiver<LocationUpdate> {
        let (tx, rx) = async_channel::bounded(1);

        if tx.try_send(self.update).is_err() {
            tracing::warn!("could not deliver location update");
        }

        rx
    }
}

#[test]
fn emits_once_then_closes() {
    use tokio_test::block_on;

    let provider = StaticLocation::fixed(Coordinates::new(37.7749, -122.4194));
    let updates = provider.subscribe();

    let first = block_on(updates.recv()).unwrap();
    assert_eq!(first, LocationUpdate::Fix(Coordinates::new(37.7749, -122.4194)));
    assert!(block_on(updates.recv()).is_err());
}
