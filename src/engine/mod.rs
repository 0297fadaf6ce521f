mod dispatch;
mod handle;

pub use handle::Handle;

use std::time::Duration;

use async_channel::{Receiver, Sender};

use crate::{
    api::{Collaborators, LocationUpdate},
    config::Config,
    session::{Effect, Event, Session, View},
};

#[derive(Debug)]
pub(crate) enum Input {
    Event(Event),
    Shutdown,
}

/// What the screen should do after one transition: map effects to apply
/// and the view to show.
#[derive(Clone, Debug)]
pub struct Render {
    pub effects: Vec<Effect>,
    pub view: View,
}

/// Owns the session and applies every input on a single task.
/// Collaborator calls run on their own tasks and come back as events.
pub struct Engine {
    session: Session,
    collaborators: Collaborators,
    request_timeout: Duration,
    tx: Sender<Input>,
    rx: Receiver<Input>,
    renders: Sender<Render>,
}

impl Engine {
    pub fn new(config: &Config, collaborators: Collaborators) -> (Self, Handle, Receiver<Render>) {
        let (tx, rx) = async_channel::unbounded();
        let (renders, render_rx) = async_channel::unbounded();

        let engine = Self {
            session: Session::new(),
            collaborators,
            request_timeout: config.request_timeout,
            tx: tx.clone(),
            rx,
            renders,
        };

        (engine, Handle::new(tx), render_rx)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs until `Handle::shutdown` and returns the final session.
    #[tracing::instrument(name = "Engine::run", skip_all)]
    pub async fn run(mut self) -> Session {
        self.forward_location_updates();
        self.publish(vec![]).await;

        while let Ok(input) = self.rx.recv().await {
            match input {
                Input::Event(event) => {
                    let effects = self.session.apply(event);
                    self.dispatch(&effects);
                    self.publish(effects).await;
                }
                Input::Shutdown => {
                    tracing::info!("shutting down");
                    break;
                }
            }
        }

        self.session
    }

    fn forward_location_updates(&self) {
        let updates = self.collaborators.location.subscribe();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            while let Ok(update) = updates.recv().await {
                let event = match update {
                    LocationUpdate::Fix(coordinates) => Event::LocationUpdated(coordinates),
                    LocationUpdate::Denied => Event::LocationDenied,
                };

                if tx.send(Input::Event(event)).await.is_err() {
                    break;
                }
            }

            tracing::debug!("location updates ended");
        });
    }

    async fn publish(&self, effects: Vec<Effect>) {
        let render = Render {
            effects,
            view: self.session.view(),
        };

        if self.renders.send(render).await.is_err() {
            tracing::debug!("no renderer attached");
        }
    }
}
