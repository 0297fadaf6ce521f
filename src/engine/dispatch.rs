use std::future::Future;
use std::time::Duration;

use async_channel::Sender;
use chrono::Utc;

use super::{Engine, Input};
use crate::{error::Error, session::Effect, session::Event};

async fn with_timeout<T, F>(timeout: Duration, request: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    tokio::time::timeout(timeout, request).await?
}

async fn post(tx: &Sender<Input>, event: Event) {
    if tx.send(Input::Event(event)).await.is_err() {
        tracing::debug!("engine stopped before completion was delivered");
    }
}

impl Engine {
    /// Starts a task for every collaborator request among `effects`.
    pub(super) fn dispatch(&self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::RequestCompletions { query, near } => {
                    let search = self.collaborators.search.clone();
                    let tx = self.tx.clone();
                    let timeout = self.request_timeout;
                    let query = query.clone();
                    let near = *near;

                    tokio::spawn(async move {
                        let result = with_timeout(timeout, search.complete(query.clone(), near)).await;
                        post(&tx, Event::CompletionsUpdated { query, result }).await;
                    });
                }
                Effect::ResolveCompletion {
                    request,
                    completion,
                } => {
                    let search = self.collaborators.search.clone();
                    let tx = self.tx.clone();
                    let timeout = self.request_timeout;
                    let request = *request;
                    let completion = completion.clone();

                    tokio::spawn(async move {
                        let result = with_timeout(timeout, search.resolve(completion)).await;
                        post(&tx, Event::DestinationResolved { request, result }).await;
                    });
                }
                Effect::RequestRoute {
                    request,
                    origin,
                    destination,
                } => {
                    let routing = self.collaborators.routing.clone();
                    let tx = self.tx.clone();
                    let timeout = self.request_timeout;
                    let (request, origin, destination) = (*request, *origin, *destination);

                    tracing::info!(%request, "requesting route");

                    tokio::spawn(async move {
                        let result = with_timeout(timeout, routing.route(origin, destination)).await;
                        let received_at = Utc::now();
                        post(
                            &tx,
                            Event::RouteResolved {
                                request,
                                result,
                                received_at,
                            },
                        )
                        .await;
                    });
                }
                _ => (),
            }
        }
    }
}
