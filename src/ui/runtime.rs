//! # Effect Runtime
//!
//! Executes the [`Effect`]s queued by [`App`](crate::ui::App). Network
//! requests run on spawned tokio tasks and report back over an unbounded
//! channel; the UI loop drains that channel between frames, so all state
//! changes still happen on the UI task.
//!
//! Starting a grid load aborts the one still in flight. Its response would
//! be dropped by the sequence check anyway; aborting also frees the
//! connection.

use crate::grid::{GridError, GridPage, GridSource};
use crate::profile::ProfileStore;
use crate::selector::{OptionsResponse, OptionsSource, OptionsTicket, SelectorError};
use crate::ui::app::Effect;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Completion of a background request.
#[derive(Debug)]
pub enum AppEvent {
    OptionsLoaded {
        ticket: OptionsTicket,
        result: Result<OptionsResponse, SelectorError>,
    },
    GridLoaded {
        seq: u64,
        result: Result<GridPage, GridError>,
    },
}

pub struct EffectRunner {
    options: Arc<dyn OptionsSource>,
    grid: Arc<dyn GridSource>,
    store: Box<dyn ProfileStore>,
    profile_key: String,
    tx: mpsc::UnboundedSender<AppEvent>,
    options_task: Option<JoinHandle<()>>,
    grid_task: Option<JoinHandle<()>>,
}

impl EffectRunner {
    /// Create a runner and the receiving end of its event channel.
    pub fn new(
        options: Arc<dyn OptionsSource>,
        grid: Arc<dyn GridSource>,
        store: Box<dyn ProfileStore>,
        profile_key: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let runner = Self {
            options,
            grid,
            store,
            profile_key: profile_key.into(),
            tx,
            options_task: None,
            grid_task: None,
        };
        (runner, rx)
    }

    pub fn store(&self) -> &dyn ProfileStore {
        self.store.as_ref()
    }

    pub fn run_all(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.run(effect);
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn run(&mut self, effect: Effect) {
        match effect {
            Effect::LoadOptions(ticket) => {
                if let Some(task) = self.options_task.take() {
                    task.abort();
                }
                let source = Arc::clone(&self.options);
                let tx = self.tx.clone();
                self.options_task = Some(tokio::spawn(async move {
                    let result = source.fetch_options().await;
                    // Receiver gone means the UI has exited
                    let _ = tx.send(AppEvent::OptionsLoaded { ticket, result });
                }));
            }
            Effect::LoadGrid(request) => {
                if let Some(task) = self.grid_task.take() {
                    debug!(seq = request.seq, "aborting superseded grid load");
                    task.abort();
                }
                let source = Arc::clone(&self.grid);
                let tx = self.tx.clone();
                self.grid_task = Some(tokio::spawn(async move {
                    let result = source.fetch_page(&request.params).await;
                    let _ = tx.send(AppEvent::GridLoaded {
                        seq: request.seq,
                        result,
                    });
                }));
            }
            Effect::SaveProfile(profile) => {
                if let Err(err) = profile.save(self.store.as_mut(), &self.profile_key) {
                    warn!(key = %self.profile_key, error = %format!("{err:#}"), "failed to save profile");
                }
            }
        }
    }

    /// Stop every request still in flight.
    pub fn shutdown(&mut self) {
        for task in [self.options_task.take(), self.grid_task.take()]
            .into_iter()
            .flatten()
        {
            task.abort();
        }
    }
}
