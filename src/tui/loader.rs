//! Background worker standing in for the notes server.
//!
//! The worker thread owns the [`NoteStore`] and answers page, open and
//! batch-delete requests in the order they arrive. The UI thread never
//! waits on it: it sends a request and later drains responses with
//! [`Loader::try_recv`].

use crate::notes::models::{Note, NoteFilter, NoteId, NoteSummary};
use crate::notes::store::NoteStore;
use crate::tui::pagination::{FetchError, ItemSource, Page, PageRequest};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use log::{debug, info, warn};
use std::io;
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone)]
pub enum LoaderRequest {
    Page(PageRequest<NoteFilter>),
    Open(NoteId),
    DeleteBatch(Vec<NoteId>),
}

#[derive(Debug)]
pub enum LoaderResponse {
    Page {
        request: PageRequest<NoteFilter>,
        result: Result<Page<NoteSummary>, FetchError>,
        total: usize,
    },
    Opened(Result<Note, String>),
    Deleted(Result<usize, String>),
}

/// The store viewed as an item source. Every fetch re-reads the file so
/// notes added from another shell show up on the next page.
pub struct NoteSource {
    store: NoteStore,
}

impl NoteSource {
    pub fn new(store: NoteStore) -> Self {
        Self { store }
    }

    pub fn total(&self) -> usize {
        self.store.count()
    }

    fn open(&mut self, id: NoteId) -> Result<Note, String> {
        self.store.reload().map_err(|e| e.to_string())?;
        self.store
            .get(id)
            .cloned()
            .ok_or_else(|| format!("note {} no longer exists", id))
    }

    fn delete_batch(&mut self, ids: &[NoteId]) -> Result<usize, String> {
        self.store.reload().map_err(|e| e.to_string())?;
        let removed = self.store.delete_batch(ids);
        self.store.save().map_err(|e| e.to_string())?;
        Ok(removed)
    }
}

impl ItemSource<NoteSummary, NoteFilter> for NoteSource {
    fn fetch(&mut self, filter: &NoteFilter, offset: usize, limit: usize) -> Result<Page<NoteSummary>, FetchError> {
        self.store
            .reload()
            .map_err(|e| FetchError::Unavailable(e.to_string()))?;
        Ok(self.store.query(filter, offset, limit))
    }
}

pub struct Loader {
    requests: Option<Sender<LoaderRequest>>,
    responses: Receiver<LoaderResponse>,
    handle: Option<JoinHandle<()>>,
}

impl Loader {
    pub fn spawn(store: NoteStore) -> io::Result<Self> {
        let (request_tx, request_rx) = unbounded::<LoaderRequest>();
        let (response_tx, response_rx) = unbounded::<LoaderResponse>();
        let mut source = NoteSource::new(store);

        let handle = thread::Builder::new()
            .name("edgenote-loader".to_string())
            .spawn(move || {
                info!("loader started");
                for request in request_rx.iter() {
                    let response = serve(&mut source, request);
                    if response_tx.send(response).is_err() {
                        break;
                    }
                }
                info!("loader stopped");
            })?;

        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            handle: Some(handle),
        })
    }

    pub fn send(&self, request: LoaderRequest) -> Result<(), FetchError> {
        let Some(requests) = &self.requests else {
            return Err(FetchError::Disconnected);
        };
        requests.send(request).map_err(|_| FetchError::Disconnected)
    }

    /// The next finished response, if any. Fails once the worker has
    /// exited and every response it sent has been taken.
    pub fn try_recv(&self) -> Result<Option<LoaderResponse>, FetchError> {
        match self.responses.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(FetchError::Disconnected),
        }
    }

    /// A loader over bare channels with no worker thread behind it.
    #[cfg(test)]
    pub fn from_channels(requests: Sender<LoaderRequest>, responses: Receiver<LoaderResponse>) -> Self {
        Self {
            requests: Some(requests),
            responses,
            handle: None,
        }
    }

    /// Block for the next response. The UI never waits; tests do.
    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<LoaderResponse> {
        self.responses.recv_timeout(timeout).ok()
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        // Closing the request channel ends the worker's loop.
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("loader thread panicked");
            }
        }
    }
}

fn serve(source: &mut NoteSource, request: LoaderRequest) -> LoaderResponse {
    match request {
        LoaderRequest::Page(request) => {
            let result = source.fetch(&request.filter, request.offset, request.limit);
            debug!(
                "served page at offset {}: {}",
                request.offset,
                match &result {
                    Ok(page) => format!("{} items", page.items.len()),
                    Err(e) => e.to_string(),
                }
            );
            LoaderResponse::Page {
                request,
                result,
                total: source.total(),
            }
        }
        LoaderRequest::Open(id) => LoaderResponse::Opened(source.open(id)),
        LoaderRequest::DeleteBatch(ids) => {
            let result = source.delete_batch(&ids);
            match &result {
                Ok(removed) => info!("deleted {} of {} requested notes", removed, ids.len()),
                Err(e) => warn!("batch delete failed: {}", e),
            }
            LoaderResponse::Deleted(result)
        }
    }
}
