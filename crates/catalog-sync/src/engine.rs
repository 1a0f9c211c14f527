//! # Catalog Engine
//!
//! The single owner of [`CatalogState`]. Runs as one tokio task; every
//! reducer call happens inside it.
//!
//! ## Engine Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CatalogEngine Architecture                       │
//! │                                                                         │
//! │  ┌──────────────┐   Command (mpsc)   ┌──────────────────────────────┐  │
//! │  │CatalogHandle │ ─────────────────► │        CatalogEngine         │  │
//! │  │ (cloneable)  │                    │                              │  │
//! │  │              │ ◄───────────────── │  • FetchOrchestrator         │  │
//! │  │              │  CatalogState      │  • CatalogState (reducers)   │  │
//! │  └──────┬───────┘  (watch)           │  • debounce deadline         │  │
//! │         │                            └───────┬───────────▲──────────┘  │
//! │         │ create / update / delete           │ spawn     │ outcome     │
//! │         ▼                                    ▼           │             │
//! │  ┌──────────────┐  Commit(event)     ┌──────────────────────────────┐  │
//! │  │MutationGate- │ ─────────────────► │   listing fetch tasks        │  │
//! │  │way           │   (same mpsc)      │   (CatalogApi::list)         │  │
//! │  └──────────────┘                    └──────────────────────────────┘  │
//! │                                                                         │
//! │  LOOP (tokio::select!)                                                 │
//! │  ─────────────────────                                                 │
//! │  command received    → orchestrator / reducer                          │
//! │  fetch outcome       → still-relevant check → reducer                  │
//! │  debounce deadline   → fire ticket                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! In-flight requests are never aborted. A response whose ticket has been
//! superseded is dropped when it arrives.

use std::sync::Arc;

use async_trait::async_trait;
use catalog_core::{CatalogEvent, CatalogState, FetchTicket, Product, ProductDraft, ProductId, ProductPage};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use crate::api::CatalogApi;
use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::events::{CatalogEventEmitter, NoOpEmitter};
use crate::gateway::{CatalogSink, MutationGateway, UpdateReport};
use crate::orchestrator::FetchOrchestrator;
use crate::transport::{CatalogTransport, HttpTransport};

const COMMAND_BUFFER: usize = 64;
const OUTCOME_BUFFER: usize = 16;

// =============================================================================
// Commands
// =============================================================================

/// Messages accepted by the engine task. Every command is acknowledged
/// once it has been applied.
enum Command {
    SetSearchText(String, oneshot::Sender<()>),
    SetCategory(String, oneshot::Sender<()>),
    RequestNextPage(oneshot::Sender<bool>),
    Refresh(oneshot::Sender<()>),
    Reset(oneshot::Sender<()>),
    Commit(CatalogEvent, oneshot::Sender<bool>),
    Shutdown(oneshot::Sender<()>),
}

/// A finished listing fetch.
struct FetchOutcome {
    ticket: FetchTicket,
    result: CatalogResult<ProductPage>,
}

// =============================================================================
// Catalog Engine
// =============================================================================

/// State owner task.
pub struct CatalogEngine {
    orchestrator: FetchOrchestrator,
    state: CatalogState,
    state_tx: watch::Sender<CatalogState>,
    api: CatalogApi,
    emitter: Arc<dyn CatalogEventEmitter>,
    commands: mpsc::Receiver<Command>,
    outcomes_tx: mpsc::Sender<FetchOutcome>,
    outcomes_rx: mpsc::Receiver<FetchOutcome>,
}

impl CatalogEngine {
    /// Spawns the engine task and returns a handle to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        config: &CatalogConfig,
        transport: Arc<dyn CatalogTransport>,
        emitter: Arc<dyn CatalogEventEmitter>,
    ) -> CatalogHandle {
        let (command_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (outcomes_tx, outcomes_rx) = mpsc::channel(OUTCOME_BUFFER);
        let (state_tx, state_rx) = watch::channel(CatalogState::new());
        let api = CatalogApi::new(transport);

        let engine = CatalogEngine {
            orchestrator: FetchOrchestrator::from_settings(&config.paging),
            state: CatalogState::new(),
            state_tx,
            api: api.clone(),
            emitter: emitter.clone(),
            commands,
            outcomes_tx,
            outcomes_rx,
        };

        tokio::spawn(engine.run());

        let sink = Arc::new(CommandSink {
            commands: command_tx.clone(),
        });

        CatalogHandle {
            commands: command_tx,
            state_rx,
            gateway: MutationGateway::new(api.clone(), sink, emitter),
            api,
            related_limit: config.paging.related_limit,
        }
    }

    /// Main engine loop.
    async fn run(mut self) {
        info!(
            page_size = self.orchestrator.page_size(),
            "Catalog engine starting"
        );

        loop {
            let deadline = self.orchestrator.deadline();

            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(Command::Shutdown(ack)) => {
                            info!("Catalog engine received shutdown");
                            let _ = ack.send(());
                            break;
                        }
                        Some(command) => self.handle_command(command),
                        None => {
                            debug!("All catalog handles dropped");
                            break;
                        }
                    }
                }

                Some(outcome) = self.outcomes_rx.recv() => {
                    self.on_fetch_complete(outcome);
                }

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(ticket) = self.orchestrator.fire_due(Instant::now()) {
                        self.start_fetch(ticket);
                    }
                }
            }
        }

        info!("Catalog engine stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::SetSearchText(text, ack) => {
                self.orchestrator.set_search_text(&text, Instant::now());
                let _ = ack.send(());
            }
            Command::SetCategory(category, ack) => {
                self.orchestrator.set_category(&category, Instant::now());
                let _ = ack.send(());
            }
            Command::RequestNextPage(ack) => {
                let accepted = match self.orchestrator.request_next_page(&self.state) {
                    Some(ticket) => {
                        self.start_fetch(ticket);
                        true
                    }
                    None => false,
                };
                let _ = ack.send(accepted);
            }
            Command::Refresh(ack) => {
                let ticket = self.orchestrator.refresh();
                self.start_fetch(ticket);
                let _ = ack.send(());
            }
            Command::Reset(ack) => {
                self.orchestrator.reset();
                self.apply(CatalogEvent::Reset);
                let _ = ack.send(());
            }
            Command::Commit(event, ack) => {
                let applied = self.apply(event);
                let _ = ack.send(applied);
            }
            Command::Shutdown(ack) => {
                let _ = ack.send(());
            }
        }
    }

    /// Marks the store loading and runs the request in its own task.
    fn start_fetch(&mut self, ticket: FetchTicket) {
        self.apply(CatalogEvent::FetchPending(ticket.clone()));

        let api = self.api.clone();
        let outcomes = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let result = api.list(&ticket.request).await;
            if outcomes.send(FetchOutcome { ticket, result }).await.is_err() {
                debug!("Engine gone before fetch completed");
            }
        });
    }

    fn on_fetch_complete(&mut self, outcome: FetchOutcome) {
        let FetchOutcome { ticket, result } = outcome;

        if !self.orchestrator.complete(&ticket, result.is_ok()) {
            return;
        }

        match result {
            Ok(page) => {
                debug!(
                    epoch = ticket.epoch,
                    offset = ticket.offset,
                    received = page.products.len(),
                    total = page.total,
                    "Listing page received"
                );
                self.apply(CatalogEvent::FetchFulfilled { ticket, page });
            }
            Err(e) => {
                let message = e.to_string();
                warn!(offset = ticket.offset, mode = %ticket.mode, error = %message, "Listing fetch failed");
                if self.apply(CatalogEvent::FetchRejected {
                    ticket,
                    message: message.clone(),
                }) {
                    self.emitter.emit_fetch_error(&message, e.is_retryable());
                }
            }
        }
    }

    /// Runs the reducer and publishes the new snapshot.
    fn apply(&mut self, event: CatalogEvent) -> bool {
        let name = event.name();
        let applied = self.state.apply(event);

        if applied {
            self.state_tx.send_replace(self.state.clone());
        } else {
            debug!(event = name, epoch = self.state.epoch, "Event dropped by store");
        }
        applied
    }
}

// =============================================================================
// Mutation Sink
// =============================================================================

/// Forwards gateway commits to the engine task.
struct CommandSink {
    commands: mpsc::Sender<Command>,
}

#[async_trait]
impl CatalogSink for CommandSink {
    async fn commit(&self, event: CatalogEvent) -> CatalogResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.commands
            .send(Command::Commit(event, ack_tx))
            .await
            .map_err(|_| CatalogError::ShuttingDown)?;
        ack_rx.await.map_err(|_| CatalogError::ShuttingDown)?;
        Ok(())
    }
}

// =============================================================================
// Catalog Handle
// =============================================================================

/// Cloneable handle to a running engine. The only way the presentation
/// layer reads or changes the catalog.
#[derive(Clone)]
pub struct CatalogHandle {
    commands: mpsc::Sender<Command>,
    state_rx: watch::Receiver<CatalogState>,
    api: CatalogApi,
    gateway: MutationGateway,
    related_limit: u32,
}

impl CatalogHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> CatalogResult<T> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.commands.send(make(ack_tx)).await.map_err(|_| {
            error!("Catalog engine is not running");
            CatalogError::ShuttingDown
        })?;
        ack_rx.await.map_err(|_| CatalogError::ShuttingDown)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current snapshot.
    pub fn state(&self) -> CatalogState {
        self.state_rx.borrow().clone()
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state_rx.clone()
    }

    /// Waits until no listing fetch is loading and returns that snapshot.
    pub async fn wait_until_settled(&self) -> CatalogResult<CatalogState> {
        let mut rx = self.subscribe();
        let state = rx
            .wait_for(|s| !s.is_loading())
            .await
            .map_err(|_| CatalogError::ShuttingDown)?;
        Ok(state.clone())
    }

    /// Looks a product up locally, then on the remote.
    pub async fn get_product(&self, id: ProductId) -> CatalogResult<Product> {
        let local = self.state_rx.borrow().find(id).cloned();
        match local {
            Some(product) => Ok(product),
            None => self.api.product(id).await,
        }
    }

    /// Products in the same category, excluding `product` itself.
    pub async fn related_products(&self, product: &Product) -> CatalogResult<Vec<Product>> {
        self.api
            .related(&product.category, product.id, self.related_limit)
            .await
    }

    /// Normalized category identifiers.
    pub async fn categories(&self) -> CatalogResult<Vec<String>> {
        self.api.categories().await
    }

    // =========================================================================
    // Listing Operations
    // =========================================================================

    pub async fn set_search_text(&self, text: impl Into<String>) -> CatalogResult<()> {
        let text = text.into();
        self.request(|ack| Command::SetSearchText(text, ack)).await
    }

    /// Selects a category; clears any search text.
    pub async fn set_category(&self, category: impl Into<String>) -> CatalogResult<()> {
        let category = category.into();
        self.request(|ack| Command::SetCategory(category, ack)).await
    }

    /// Proximity notification. Returns true if a fetch was issued.
    pub async fn request_next_page(&self) -> CatalogResult<bool> {
        self.request(Command::RequestNextPage).await
    }

    /// Loads the first page of the current mode immediately.
    pub async fn refresh(&self) -> CatalogResult<()> {
        self.request(Command::Refresh).await
    }

    /// Returns the catalog to its initial state.
    pub async fn reset_catalog(&self) -> CatalogResult<()> {
        self.request(Command::Reset).await
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub async fn create_product(&self, draft: ProductDraft) -> CatalogResult<Product> {
        self.gateway.create(draft).await
    }

    /// Local-first edit of product `id`.
    ///
    /// The edit is built on the held product, or the remote's copy, or a bare
    /// product carrying only `id` when neither is available.
    pub async fn update_product(&self, id: ProductId, draft: ProductDraft) -> CatalogResult<UpdateReport> {
        let base = self.edit_base(id).await;
        self.gateway.update(&base, draft).await
    }

    /// Local-first edit on top of a base the caller already resolved.
    pub async fn update_product_from(&self, base: &Product, draft: ProductDraft) -> CatalogResult<UpdateReport> {
        self.gateway.update(base, draft).await
    }

    /// The product an edit of `id` starts from: the held copy, the remote's
    /// copy, or a bare product carrying only `id`.
    pub async fn edit_base(&self, id: ProductId) -> Product {
        match self.get_product(id).await {
            Ok(product) => product,
            Err(e) => {
                debug!(product_id = id, error = %e, "No base product for edit");
                Product {
                    id,
                    ..Default::default()
                }
            }
        }
    }

    pub async fn delete_product(&self, id: ProductId) -> CatalogResult<()> {
        let title = self.state_rx.borrow().find(id).map(|p| p.title.clone());
        self.gateway.delete(id, title).await
    }

    /// Stops the engine. Later calls fail with `ShuttingDown`.
    pub async fn shutdown(&self) -> CatalogResult<()> {
        self.request(Command::Shutdown).await
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for spawning an engine with optional collaborators.
pub struct CatalogEngineBuilder {
    config: CatalogConfig,
    transport: Option<Arc<dyn CatalogTransport>>,
    emitter: Option<Arc<dyn CatalogEventEmitter>>,
}

impl CatalogEngineBuilder {
    pub fn new(config: CatalogConfig) -> Self {
        CatalogEngineBuilder {
            config,
            transport: None,
            emitter: None,
        }
    }

    /// Overrides the HTTP transport.
    pub fn with_transport(mut self, transport: Arc<dyn CatalogTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn CatalogEventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Validates the config and spawns the engine.
    pub fn spawn(self) -> CatalogResult<CatalogHandle> {
        self.config.validate()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.config.api)?),
        };
        let emitter = self.emitter.unwrap_or_else(|| Arc::new(NoOpEmitter));

        Ok(CatalogEngine::spawn(&self.config, transport, emitter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Notice;
    use crate::testing::{RecordingEmitter, Reply, ScriptedTransport};
    use catalog_core::{CatalogMode, CatalogStatus};
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::sleep;

    fn spawn(transport: &Arc<ScriptedTransport>) -> (CatalogHandle, Arc<RecordingEmitter>) {
        let emitter = RecordingEmitter::new();
        let handle = CatalogEngineBuilder::new(CatalogConfig::default())
            .with_transport(transport.clone())
            .with_emitter(emitter.clone())
            .spawn()
            .unwrap();
        (handle, emitter)
    }

    fn ids(state: &CatalogState) -> Vec<ProductId> {
        state.items.iter().map(|p| p.id).collect()
    }

    fn draft(title: &str) -> ProductDraft {
        ProductDraft {
            title: title.into(),
            description: "Cotton".into(),
            price: 19.0,
            stock: 5,
            brand: "Acme".into(),
            category: "tops".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_pages_merge_without_duplicates() {
        let transport = ScriptedTransport::new();
        transport.reply("GET products", Reply::page(&[1, 2], 25));
        transport.reply("GET products", Reply::page(&[2, 3], 25));
        let (handle, _) = spawn(&transport);

        handle.refresh().await.unwrap();
        let state = handle.wait_until_settled().await.unwrap();
        assert_eq!(ids(&state), vec![1, 2]);
        assert!(state.has_more);

        assert!(handle.request_next_page().await.unwrap());
        let state = handle.wait_until_settled().await.unwrap();
        assert_eq!(ids(&state), vec![1, 2, 3]);
        assert!(state.has_more);
        assert_eq!(state.status, CatalogStatus::Succeeded);

        assert_eq!(
            transport.requests(),
            vec!["GET products?limit=10&skip=0", "GET products?limit=10&skip=10"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_keystrokes_are_debounced() {
        let transport = ScriptedTransport::new();
        transport.reply("GET products/search", Reply::page(&[7], 1));
        let (handle, _) = spawn(&transport);

        handle.set_search_text("p").await.unwrap();
        sleep(Duration::from_millis(200)).await;
        handle.set_search_text("ph").await.unwrap();
        sleep(Duration::from_millis(200)).await;
        handle.set_search_text("pho").await.unwrap();
        assert!(transport.requests().is_empty());

        sleep(Duration::from_millis(600)).await;
        let state = handle.wait_until_settled().await.unwrap();

        assert_eq!(transport.requests(), vec!["GET products/search?q=pho"]);
        assert_eq!(state.mode, CatalogMode::Search("pho".into()));
        assert_eq!(ids(&state), vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_category_response_is_discarded() {
        let transport = ScriptedTransport::new();
        transport.reply("GET products/category/a", Reply::page(&[1, 2], 2).after(300));
        transport.reply("GET products/category/b", Reply::page(&[8, 9], 2).after(50));
        let (handle, _) = spawn(&transport);

        // A is issued at t=500 and answers at t=800.
        handle.set_category("a").await.unwrap();
        sleep(Duration::from_millis(600)).await;
        assert!(handle.state().is_loading());

        // B is chosen before A answers.
        handle.set_category("b").await.unwrap();
        sleep(Duration::from_millis(300)).await;
        assert!(handle.state().items.is_empty());

        sleep(Duration::from_millis(300)).await;
        let state = handle.wait_until_settled().await.unwrap();
        assert_eq!(ids(&state), vec![8, 9]);
        assert_eq!(state.mode, CatalogMode::Category("b".into()));
        assert!(!state.has_more);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_replaces_category_listing() {
        let transport = ScriptedTransport::new();
        transport.reply("GET products/category/tops", Reply::page(&[1, 2], 30));
        transport.reply("GET products/search", Reply::page(&[5], 1));
        let (handle, _) = spawn(&transport);

        handle.set_category("tops").await.unwrap();
        sleep(Duration::from_millis(600)).await;
        assert!(matches!(handle.state().mode, CatalogMode::Category(_)));

        handle.set_search_text("shirt").await.unwrap();
        sleep(Duration::from_millis(600)).await;
        let state = handle.wait_until_settled().await.unwrap();

        assert_eq!(state.mode, CatalogMode::Search("shirt".into()));
        assert_eq!(ids(&state), vec![5]);
        assert_eq!(
            transport.requests().last().map(String::as_str),
            Some("GET products/search?q=shirt")
        );

        // Search results are a single bounded page.
        assert!(!handle.request_next_page().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_page_is_retried_by_next_trigger() {
        let transport = ScriptedTransport::new();
        transport.reply("GET products", Reply::Status(503));
        transport.reply("GET products", Reply::page(&[1, 2], 2));
        let (handle, emitter) = spawn(&transport);

        handle.refresh().await.unwrap();
        let state = handle.wait_until_settled().await.unwrap();
        assert_eq!(state.status, CatalogStatus::Failed);
        assert!(state.error.is_some());
        assert!(state.items.is_empty());
        assert_eq!(emitter.fetch_errors.lock().unwrap().len(), 1);

        assert!(handle.request_next_page().await.unwrap());
        let state = handle.wait_until_settled().await.unwrap();
        assert_eq!(state.status, CatalogStatus::Succeeded);
        assert!(state.error.is_none());
        assert_eq!(ids(&state), vec![1, 2]);
        assert_eq!(
            transport.requests(),
            vec!["GET products?limit=10&skip=0", "GET products?limit=10&skip=0"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_page_requests_coalesce() {
        let transport = ScriptedTransport::new();
        transport.reply("GET products", Reply::page(&[1], 20).after(100));
        let (handle, _) = spawn(&transport);

        handle.refresh().await.unwrap();
        assert!(!handle.request_next_page().await.unwrap());
        assert!(!handle.request_next_page().await.unwrap());

        handle.wait_until_settled().await.unwrap();
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_discards_in_flight_response() {
        let transport = ScriptedTransport::new();
        transport.reply("GET products", Reply::page(&[1, 2], 2).after(100));
        let (handle, _) = spawn(&transport);

        handle.refresh().await.unwrap();
        handle.reset_catalog().await.unwrap();
        sleep(Duration::from_millis(200)).await;

        assert_eq!(handle.state(), CatalogState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_is_local_first() {
        let transport = ScriptedTransport::new();
        transport.reply("GET products", Reply::page(&[1, 2, 3], 3));
        transport.reply("PATCH products/2", Reply::Status(404));
        let (handle, emitter) = spawn(&transport);

        handle.refresh().await.unwrap();
        handle.wait_until_settled().await.unwrap();

        let report = handle.update_product(2, draft("Linen Shirt")).await.unwrap();
        assert!(report.remote_error.is_some());

        let state = handle.state();
        assert_eq!(ids(&state), vec![1, 2, 3]);
        assert_eq!(state.items[1].title, "Linen Shirt");
        assert!(!transport.requests().contains(&"GET products/2".to_string()));
        assert!(matches!(
            emitter.notices().as_slice(),
            [Notice::UpdateRemoteFailed { id: 2, .. }]
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_of_unheld_product_still_succeeds() {
        let transport = ScriptedTransport::new();
        let (handle, _) = spawn(&transport);

        let report = handle.update_product(195, draft("Desk")).await.unwrap();
        assert_eq!(report.product.id, 195);
        assert!(!report.remote_confirmed());
        assert!(handle.state().items.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_from_resolved_base_fetches_once() {
        let transport = ScriptedTransport::new();
        transport.reply("GET products/195", Reply::Json(json!({ "id": 195, "title": "Desk", "rating": 4.5 })));
        transport.reply("PATCH products/195", Reply::Status(404));
        let (handle, _) = spawn(&transport);

        let base = handle.edit_base(195).await;
        let mut edit = ProductDraft::from(&base);
        edit.title = "Standing Desk".into();
        edit.description = "Oak".into();
        edit.brand = "Acme".into();
        edit.category = "furniture".into();

        let report = handle.update_product_from(&base, edit).await.unwrap();
        assert_eq!(report.product.title, "Standing Desk");
        assert_eq!(report.product.rating, 4.5);
        assert!(!report.remote_confirmed());
        assert_eq!(
            transport.requests(),
            vec!["GET products/195", "PATCH products/195"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_delete_leaves_state_alone() {
        let transport = ScriptedTransport::new();
        transport.reply("GET products", Reply::page(&[1, 2, 3], 3));
        transport.reply("DELETE products/2", Reply::Status(500));
        let (handle, emitter) = spawn(&transport);

        handle.refresh().await.unwrap();
        let before = handle.wait_until_settled().await.unwrap();

        let err = handle.delete_product(2).await.unwrap_err();
        assert!(matches!(err, CatalogError::DeleteFailed { id: 2, .. }));
        assert_eq!(handle.state(), before);
        assert!(handle.state().error.is_none());
        assert!(matches!(
            emitter.notices().as_slice(),
            [Notice::DeleteFailed { id: 2, .. }]
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_delete_removes_row() {
        let transport = ScriptedTransport::new();
        transport.reply("GET products", Reply::page(&[1, 2, 3], 3));
        transport.reply("DELETE products/2", Reply::Json(json!({ "id": 2, "isDeleted": true })));
        let (handle, emitter) = spawn(&transport);

        handle.refresh().await.unwrap();
        handle.wait_until_settled().await.unwrap();

        handle.delete_product(2).await.unwrap();
        assert_eq!(ids(&handle.state()), vec![1, 3]);
        assert_eq!(
            emitter.notices(),
            vec![Notice::Deleted {
                id: 2,
                title: Some("Product 2".into())
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_product_prefers_local_copy() {
        let transport = ScriptedTransport::new();
        transport.reply("GET products", Reply::page(&[1], 1));
        transport.reply("GET products/42", Reply::Json(json!({ "id": 42, "title": "Remote" })));
        let (handle, _) = spawn(&transport);

        handle.refresh().await.unwrap();
        handle.wait_until_settled().await.unwrap();

        assert_eq!(handle.get_product(1).await.unwrap().title, "Product 1");
        assert_eq!(handle.get_product(42).await.unwrap().title, "Remote");
        assert!(matches!(
            handle.get_product(77).await,
            Err(CatalogError::ProductNotFound(77))
        ));
        assert_eq!(
            transport.requests(),
            vec!["GET products?limit=10&skip=0", "GET products/42", "GET products/77"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_related_products_use_configured_limit() {
        let transport = ScriptedTransport::new();
        transport.reply("GET products/category/tops", Reply::page(&[3, 4, 5], 3));
        let (handle, _) = spawn(&transport);

        let product = Product {
            id: 4,
            category: "tops".into(),
            ..Default::default()
        };
        let related = handle.related_products(&product).await.unwrap();
        assert_eq!(related.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3, 5]);
        assert_eq!(transport.requests(), vec!["GET products/category/tops?limit=4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_rejects_later_calls() {
        let transport = ScriptedTransport::new();
        let (handle, _) = spawn(&transport);

        handle.shutdown().await.unwrap();
        assert!(matches!(
            handle.set_category("tops").await,
            Err(CatalogError::ShuttingDown)
        ));
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let mut config = CatalogConfig::default();
        config.paging.page_size = 0;
        let result = CatalogEngineBuilder::new(config).spawn();
        assert!(matches!(result, Err(CatalogError::InvalidConfig(_))));
    }
}
