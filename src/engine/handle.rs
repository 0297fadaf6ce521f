use async_channel::Sender;

use super::Input;
use crate::{
    entities::{Location, RideTier, SearchCompletion},
    error::Error,
    session::Event,
};

/// User intents, sent to a running engine.
#[derive(Clone, Debug)]
pub struct Handle {
    tx: Sender<Input>,
}

impl Handle {
    pub(super) fn new(tx: Sender<Input>) -> Self {
        Self { tx }
    }

    pub async fn send(&self, event: Event) -> Result<(), Error> {
        self.tx
            .send(Input::Event(event))
            .await
            .map_err(|_| Error::invalid_state_error())
    }

    pub async fn activate_search(&self) -> Result<(), Error> {
        self.send(Event::SearchActivated).await
    }

    pub async fn set_query(&self, query: impl Into<String>) -> Result<(), Error> {
        self.send(Event::QueryChanged(query.into())).await
    }

    pub async fn select_completion(&self, completion: SearchCompletion) -> Result<(), Error> {
        self.send(Event::CompletionSelected(completion)).await
    }

    pub async fn select_destination(&self, destination: Location) -> Result<(), Error> {
        self.send(Event::DestinationSelected(destination)).await
    }

    pub async fn retry_route(&self) -> Result<(), Error> {
        self.send(Event::RetryRoute).await
    }

    pub async fn select_tier(&self, tier: RideTier) -> Result<(), Error> {
        self.send(Event::TierSelected(tier)).await
    }

    pub async fn dismiss_notice(&self) -> Result<(), Error> {
        self.send(Event::NoticeDismissed).await
    }

    pub async fn back(&self) -> Result<(), Error> {
        self.send(Event::Back).await
    }

    pub async fn shutdown(&self) -> Result<(), Error> {
        self.tx
            .send(Input::Shutdown)
            .await
            .map_err(|_| Error::invalid_state_error())
    }
}
