//! Background forecast requests.
//!
//! Each request runs on its own tokio task and reports back over a channel.
//! Every request gets a new generation number; starting one aborts the task
//! still in flight and [`ForecastReceiver`] discards results from older
//! generations, so a receiver only ever sees the result of the latest search.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::AemetClient;
use crate::error::ForecastError;
use crate::types::{DailySummary, MunicipalityCode};

/// Messages sent from forecast tasks back to the caller
#[derive(Debug)]
pub enum ForecastMessage {
    Done {
        id: u64,
        code: MunicipalityCode,
        result: Result<Vec<DailySummary>, ForecastError>,
    },
}

impl ForecastMessage {
    pub fn id(&self) -> u64 {
        match self {
            Self::Done { id, .. } => *id,
        }
    }
}

/// Receiving half of a [`ForecastService`]. Results superseded by a newer
/// request are dropped here even when they reached the channel first.
pub struct ForecastReceiver {
    rx: mpsc::UnboundedReceiver<ForecastMessage>,
    generation: Arc<AtomicU64>,
}

impl ForecastReceiver {
    /// Wait for the result of the latest request.
    ///
    /// Returns `None` once the service is dropped.
    pub async fn recv(&mut self) -> Option<ForecastMessage> {
        loop {
            let message = self.rx.recv().await?;
            let current = self.generation.load(Ordering::Acquire);
            if message.id() == current {
                return Some(message);
            }
            tracing::debug!(
                id = message.id(),
                current,
                "Discarding superseded forecast result"
            );
        }
    }
}

pub struct ForecastService {
    client: Arc<AemetClient>,
    tx: mpsc::UnboundedSender<ForecastMessage>,
    generation: Arc<AtomicU64>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl ForecastService {
    pub fn new(client: Arc<AemetClient>) -> (Self, ForecastReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let generation = Arc::new(AtomicU64::new(0));
        let service = Self {
            client,
            tx,
            generation: Arc::clone(&generation),
            in_flight: Mutex::new(None),
        };
        (service, ForecastReceiver { rx, generation })
    }

    /// Start a forecast request, cancelling any request still running.
    /// Returns the request id carried by its [`ForecastMessage`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn request(&self, code: MunicipalityCode) -> u64 {
        let mut in_flight = self.in_flight.lock();
        let id = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        if let Some(previous) = in_flight.take() {
            if !previous.is_finished() {
                tracing::debug!("Cancelling in-flight forecast request");
                previous.abort();
            }
        }

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let generation = Arc::clone(&self.generation);
        *in_flight = Some(tokio::spawn(async move {
            let result = client.forecast(&code).await;
            if let Err(e) = &result {
                tracing::warn!(code = %code, "Forecast request failed: {}", e);
            }
            if generation.load(Ordering::Acquire) == id {
                let _ = tx.send(ForecastMessage::Done { id, code, result });
            }
        }));

        id
    }

    /// Abort the running request, if any. Nothing is delivered for it.
    pub fn cancel(&self) {
        let mut in_flight = self.in_flight.lock();
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Some(handle) = in_flight.take() {
            handle.abort();
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ForecastService {
    fn drop(&mut self) {
        self.cancel();
    }
}
