//! Cart scope: the in-memory cart, its startup load and the handles UI
//! code uses to reach it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::config::CartConfig;
use super::write_queue::{WritePolicy, WriteQueue};
use crate::domain::cart::codec;
use crate::domain::cart::errors::CartError;
use crate::domain::cart::model::{Cart, CartChange, CartItem, CartSummary, NewCartItem};
use crate::domain::cart::use_cases::get_cart::CartView;
use crate::domain::errors::RepositoryError;
use crate::domain::logger::Logger;
use crate::domain::storage::KeyValueStore;

#[derive(Debug, Clone, PartialEq)]
enum LoadState {
    Loading,
    Ready,
    /// The store could not be read; the cart starts empty and stays usable.
    /// The first mutation overwrites whatever the store still holds.
    Unavailable(RepositoryError),
    /// The stored value is unreadable; mutations are refused so it is
    /// never overwritten.
    Corrupted(CartError),
    /// The provider was shut down or dropped.
    Closed,
}

/// Result of a mutating cart operation.
#[derive(Debug, Clone, PartialEq)]
pub struct CartMutation {
    pub change: CartChange,
    pub products: Vec<CartItem>,
}

struct CartState {
    cart: RwLock<Cart>,
    load: watch::Sender<LoadState>,
    writes: WriteQueue,
    active: AtomicBool,
    logger: Arc<dyn Logger>,
}

impl CartState {
    fn finish_load(&self, result: Result<Option<Vec<u8>>, RepositoryError>) {
        let state = match result {
            Ok(None) => {
                self.logger.info("No persisted cart found, starting empty");
                LoadState::Ready
            }
            Ok(Some(bytes)) => match codec::decode(&bytes) {
                Ok(cart) => {
                    self.logger
                        .info(&format!("Loaded persisted cart with {} line items", cart.len()));
                    *self.cart.write().unwrap_or_else(PoisonError::into_inner) = cart;
                    LoadState::Ready
                }
                Err(e) => {
                    self.logger
                        .error(&format!("Persisted cart is unreadable: {}", e));
                    LoadState::Corrupted(e)
                }
            },
            Err(e) => {
                self.logger
                    .error(&format!("Failed to read persisted cart: {}", e));
                LoadState::Unavailable(e)
            }
        };
        // A closed scope stays closed even if the load finished late.
        self.load.send_if_modified(|current| {
            if *current != LoadState::Loading {
                return false;
            }
            *current = state;
            true
        });
    }

    /// Marks the scope inactive and wakes every call waiting on the load.
    fn close(&self) {
        // Taken so no mutation sits between its scope check and its enqueue.
        let _cart = self.cart.write().unwrap_or_else(PoisonError::into_inner);
        self.active.store(false, Ordering::SeqCst);
        self.load.send_replace(LoadState::Closed);
    }

    async fn loaded(&self) -> LoadState {
        let mut receiver = self.load.subscribe();
        let state = match receiver
            .wait_for(|state| *state != LoadState::Loading)
            .await
        {
            Ok(state) => state.clone(),
            Err(_) => LoadState::Closed,
        };
        state
    }
}

/// Owner of a cart scope.
///
/// The cart lives as long as its provider; handles taken from it stop
/// working once the provider is shut down or dropped.
pub struct CartProvider {
    state: Arc<CartState>,
    load_task: JoinHandle<()>,
}

impl CartProvider {
    /// Creates an empty cart and starts reading the persisted one in the
    /// background. Must be called within a Tokio runtime.
    pub fn activate(
        store: Arc<dyn KeyValueStore>,
        logger: Arc<dyn Logger>,
        config: CartConfig,
    ) -> Self {
        let (writes, _writer_task) = WriteQueue::spawn(
            store.clone(),
            logger.clone(),
            WritePolicy {
                key: config.storage_key.clone(),
                retries: config.write_retries,
                backoff: config.retry_backoff,
            },
        );
        let (load, _) = watch::channel(LoadState::Loading);
        let state = Arc::new(CartState {
            cart: RwLock::new(Cart::new()),
            load,
            writes,
            active: AtomicBool::new(true),
            logger,
        });

        let weak = Arc::downgrade(&state);
        let key = config.storage_key;
        let load_task = tokio::spawn(async move {
            let result = store.get(&key).await;
            if let Some(state) = weak.upgrade() {
                state.finish_load(result);
            }
        });

        state.logger.debug("Cart provider activated");
        Self { state, load_task }
    }

    pub fn handle(&self) -> CartHandle {
        CartHandle {
            state: Arc::downgrade(&self.state),
        }
    }

    /// Closes the scope and waits for pending writes.
    pub async fn shutdown(self) {
        self.state.close();
        self.state.writes.flush().await;
        self.state.logger.debug("Cart provider shut down");
    }
}

impl Drop for CartProvider {
    fn drop(&mut self) {
        self.state.close();
        self.load_task.abort();
    }
}

/// Shared accessor to an active cart.
///
/// A default handle is not bound to any provider; every call on it fails
/// with [`CartError::OutsideScope`].
#[derive(Clone, Default)]
pub struct CartHandle {
    state: Weak<CartState>,
}

impl CartHandle {
    fn state(&self) -> Result<Arc<CartState>, CartError> {
        self.state
            .upgrade()
            .filter(|state| state.active.load(Ordering::SeqCst))
            .ok_or(CartError::OutsideScope)
    }

    /// Current in-memory contents. Empty until the startup load resolves.
    pub fn products(&self) -> Result<Vec<CartItem>, CartError> {
        let state = self.state()?;
        let cart = state.cart.read().unwrap_or_else(PoisonError::into_inner);
        Ok(cart.items().to_vec())
    }

    pub fn summary(&self) -> Result<CartSummary, CartError> {
        let state = self.state()?;
        let cart = state.cart.read().unwrap_or_else(PoisonError::into_inner);
        Ok(cart.summary())
    }

    /// Contents and totals taken from the same snapshot.
    pub fn view(&self) -> Result<CartView, CartError> {
        let state = self.state()?;
        let cart = state.cart.read().unwrap_or_else(PoisonError::into_inner);
        Ok(CartView {
            products: cart.items().to_vec(),
            summary: cart.summary(),
        })
    }

    /// Waits for the startup load and reports how it went.
    pub async fn wait_until_loaded(&self) -> Result<(), CartError> {
        let state = self.state()?;
        match state.loaded().await {
            LoadState::Ready => Ok(()),
            LoadState::Unavailable(e) => Err(CartError::Repository(e)),
            LoadState::Corrupted(e) => Err(e),
            LoadState::Loading | LoadState::Closed => Err(CartError::OutsideScope),
        }
    }

    pub async fn add_to_cart(&self, product: NewCartItem) -> Result<CartMutation, CartError> {
        self.mutate(move |cart| cart.add(product)).await
    }

    pub async fn increment(&self, id: &str) -> Result<CartMutation, CartError> {
        self.mutate(|cart| cart.increment(id)).await
    }

    pub async fn decrement(&self, id: &str) -> Result<CartMutation, CartError> {
        self.mutate(|cart| cart.decrement(id)).await
    }

    /// Waits until every write issued so far reached the store or failed.
    pub async fn flush(&self) -> Result<(), CartError> {
        let state = self.state()?;
        state.writes.flush().await;
        Ok(())
    }

    async fn mutate<F>(&self, operation: F) -> Result<CartMutation, CartError>
    where
        F: FnOnce(&mut Cart) -> CartChange,
    {
        let state = self.state()?;
        match state.loaded().await {
            LoadState::Corrupted(e) => return Err(e),
            LoadState::Loading | LoadState::Closed => return Err(CartError::OutsideScope),
            LoadState::Ready | LoadState::Unavailable(_) => {}
        }

        // The snapshot is queued under the same lock that applied the
        // change, so writes are issued in mutation order.
        let mut cart = state.cart.write().unwrap_or_else(PoisonError::into_inner);
        if !state.active.load(Ordering::SeqCst) {
            return Err(CartError::OutsideScope);
        }
        let change = operation(&mut *cart);
        if change.is_changed() && !state.writes.enqueue(cart.clone()) {
            state
                .logger
                .error("Cart write queue is closed, change kept in memory only");
        }

        Ok(CartMutation {
            change,
            products: cart.items().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use std::sync::Mutex;
    use std::time::Duration;

    mock! {
        pub Store {}

        #[async_trait]
        impl KeyValueStore for Store {
            async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RepositoryError>;
            async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), RepositoryError>;
        }
    }

    mock! {
        pub Log {}

        impl Logger for Log {
            fn info(&self, message: &str);
            fn warn(&self, message: &str);
            fn error(&self, message: &str);
            fn debug(&self, message: &str);
        }
    }

    fn mock_logger() -> Arc<dyn Logger> {
        let mut logger = MockLog::new();
        logger.expect_info().returning(|_| ());
        logger.expect_warn().returning(|_| ());
        logger.expect_error().returning(|_| ());
        logger.expect_debug().returning(|_| ());
        Arc::new(logger)
    }

    fn shoe() -> NewCartItem {
        NewCartItem::new("a", "Shoe", "u", 10.0)
    }

    fn store_with(persisted: Option<&'static str>, written: Arc<Mutex<Vec<Vec<u8>>>>) -> MockStore {
        let mut store = MockStore::new();
        store
            .expect_get()
            .withf(|key| key == "@GoMarketplace")
            .returning(move |_| Ok(persisted.map(|raw| raw.as_bytes().to_vec())));
        store.expect_set().returning(move |_, value| {
            written.lock().unwrap().push(value);
            Ok(())
        });
        store
    }

    fn last_written(written: &Arc<Mutex<Vec<Vec<u8>>>>) -> Cart {
        codec::decode(written.lock().unwrap().last().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn should_start_empty_when_nothing_persisted() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let provider = CartProvider::activate(
            Arc::new(store_with(None, written.clone())),
            mock_logger(),
            CartConfig::default(),
        );
        let handle = provider.handle();

        handle.wait_until_loaded().await.unwrap();

        assert!(handle.products().unwrap().is_empty());
        assert!(written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_load_persisted_cart() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let persisted = r#"[{"id":"a","title":"Shoe","image_url":"u","price":10,"quantity":2}]"#;
        let provider = CartProvider::activate(
            Arc::new(store_with(Some(persisted), written)),
            mock_logger(),
            CartConfig::default(),
        );
        let handle = provider.handle();

        handle.wait_until_loaded().await.unwrap();

        let products = handle.products().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].quantity, 2);
    }

    #[tokio::test]
    async fn should_apply_mutation_on_top_of_loaded_cart() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let persisted = r#"[{"id":"a","title":"Shoe","image_url":"u","price":10,"quantity":2}]"#;
        let provider = CartProvider::activate(
            Arc::new(store_with(Some(persisted), written.clone())),
            mock_logger(),
            CartConfig::default(),
        );
        let handle = provider.handle();

        // Issued before the load resolved.
        let mutation = handle.increment("a").await.unwrap();

        assert_eq!(mutation.change, CartChange::Incremented { quantity: 3 });
        handle.flush().await.unwrap();
        assert_eq!(last_written(&written).get("a").unwrap().quantity, 3);
    }

    #[tokio::test]
    async fn should_persist_merged_quantity_on_repeated_add() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let provider = CartProvider::activate(
            Arc::new(store_with(None, written.clone())),
            mock_logger(),
            CartConfig::default(),
        );
        let handle = provider.handle();

        handle.add_to_cart(shoe()).await.unwrap();
        handle.flush().await.unwrap();
        assert_eq!(last_written(&written).get("a").unwrap().quantity, 1);

        let mutation = handle.add_to_cart(shoe()).await.unwrap();
        handle.flush().await.unwrap();

        assert_eq!(mutation.change, CartChange::Merged { quantity: 2 });
        assert_eq!(last_written(&written).get("a").unwrap().quantity, 2);
        assert_eq!(last_written(&written).items(), mutation.products.as_slice());
    }

    #[tokio::test]
    async fn should_persist_removal_when_decremented_to_zero() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let provider = CartProvider::activate(
            Arc::new(store_with(None, written.clone())),
            mock_logger(),
            CartConfig::default(),
        );
        let handle = provider.handle();

        handle.add_to_cart(shoe()).await.unwrap();
        let mutation = handle.decrement("a").await.unwrap();
        handle.flush().await.unwrap();

        assert_eq!(mutation.change, CartChange::Removed);
        assert!(handle.products().unwrap().is_empty());
        assert!(last_written(&written).is_empty());
    }

    #[tokio::test]
    async fn should_not_write_when_nothing_changed() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let provider = CartProvider::activate(
            Arc::new(store_with(None, written.clone())),
            mock_logger(),
            CartConfig::default(),
        );
        let handle = provider.handle();

        let mutation = handle.increment("missing-id").await.unwrap();
        handle.flush().await.unwrap();

        assert_eq!(mutation.change, CartChange::Unchanged);
        assert!(mutation.products.is_empty());
        assert!(written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_fail_outside_scope_with_unbound_handle() {
        let handle = CartHandle::default();

        assert_eq!(handle.products(), Err(CartError::OutsideScope));
        assert_eq!(
            handle.add_to_cart(shoe()).await,
            Err(CartError::OutsideScope)
        );
        assert_eq!(handle.flush().await, Err(CartError::OutsideScope));
    }

    #[tokio::test]
    async fn should_fail_outside_scope_after_shutdown() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let provider = CartProvider::activate(
            Arc::new(store_with(None, written.clone())),
            mock_logger(),
            CartConfig::default(),
        );
        let handle = provider.handle();
        handle.add_to_cart(shoe()).await.unwrap();

        provider.shutdown().await;

        assert_eq!(written.lock().unwrap().len(), 1);
        assert_eq!(handle.products(), Err(CartError::OutsideScope));
        assert_eq!(handle.increment("a").await, Err(CartError::OutsideScope));
    }

    #[tokio::test]
    async fn should_refuse_mutations_when_persisted_cart_is_corrupted() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let provider = CartProvider::activate(
            Arc::new(store_with(Some("not json"), written.clone())),
            mock_logger(),
            CartConfig::default(),
        );
        let handle = provider.handle();

        assert!(matches!(
            handle.wait_until_loaded().await,
            Err(CartError::Corrupted(_))
        ));
        assert!(matches!(
            handle.add_to_cart(shoe()).await,
            Err(CartError::Corrupted(_))
        ));
        assert!(written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_stay_usable_when_store_cannot_be_read() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let sink = written.clone();
        let mut store = MockStore::new();
        store
            .expect_get()
            .returning(|_| Err(RepositoryError::ReadFailed));
        store.expect_set().returning(move |_, value| {
            sink.lock().unwrap().push(value);
            Ok(())
        });
        let provider =
            CartProvider::activate(Arc::new(store), mock_logger(), CartConfig::default());
        let handle = provider.handle();

        assert_eq!(
            handle.wait_until_loaded().await,
            Err(CartError::Repository(RepositoryError::ReadFailed))
        );
        handle.add_to_cart(shoe()).await.unwrap();
        handle.flush().await.unwrap();

        assert_eq!(last_written(&written).len(), 1);
    }

    #[tokio::test]
    async fn should_use_configured_storage_key() {
        let mut store = MockStore::new();
        store
            .expect_get()
            .withf(|key| key == "@Cart:guest")
            .returning(|_| Ok(None));
        store
            .expect_set()
            .withf(|key, _| key == "@Cart:guest")
            .times(1)
            .returning(|_, _| Ok(()));
        let provider = CartProvider::activate(
            Arc::new(store),
            mock_logger(),
            CartConfig::new("@Cart:guest"),
        );
        let handle = provider.handle();

        handle.add_to_cart(shoe()).await.unwrap();

        provider.shutdown().await;
    }

    /// Store whose read takes a while, to keep the provider in its
    /// loading phase.
    struct SlowStore;

    #[async_trait]
    impl KeyValueStore for SlowStore {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, RepositoryError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: Vec<u8>) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn should_fail_pending_mutation_when_provider_dropped_during_load() {
        let provider =
            CartProvider::activate(Arc::new(SlowStore), mock_logger(), CartConfig::default());
        let handle = provider.handle();
        let pending = tokio::spawn(async move { handle.add_to_cart(shoe()).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(provider);

        let outcome = tokio::time::timeout(Duration::from_secs(2), pending)
            .await
            .expect("mutation should resolve once the provider is gone")
            .unwrap();
        assert_eq!(outcome, Err(CartError::OutsideScope));
    }

    #[tokio::test]
    async fn should_fail_pending_load_wait_when_provider_shut_down() {
        let provider =
            CartProvider::activate(Arc::new(SlowStore), mock_logger(), CartConfig::default());
        let handle = provider.handle();
        let pending = tokio::spawn(async move { handle.wait_until_loaded().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        provider.shutdown().await;

        let outcome = tokio::time::timeout(Duration::from_secs(2), pending)
            .await
            .expect("load wait should resolve once the provider is gone")
            .unwrap();
        assert_eq!(outcome, Err(CartError::OutsideScope));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn should_persist_every_accepted_mutation_before_shutdown_returns() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let provider = CartProvider::activate(
            Arc::new(store_with(None, written.clone())),
            mock_logger(),
            CartConfig::default(),
        );
        provider.handle().wait_until_loaded().await.unwrap();

        let adds: Vec<_> = (0..50)
            .map(|_| {
                let handle = provider.handle();
                tokio::spawn(async move { handle.add_to_cart(shoe()).await })
            })
            .collect();
        tokio::task::yield_now().await;
        provider.shutdown().await;

        let mut accepted = 0;
        for add in adds {
            match add.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(e) => assert_eq!(e, CartError::OutsideScope),
            }
        }
        let persisted = written
            .lock()
            .unwrap()
            .last()
            .map(|bytes| codec::decode(bytes).unwrap().total_items())
            .unwrap_or(0);
        assert_eq!(persisted, accepted);
    }

    #[tokio::test]
    async fn should_build_view_from_one_snapshot() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let provider = CartProvider::activate(
            Arc::new(store_with(None, written)),
            mock_logger(),
            CartConfig::default(),
        );
        let handle = provider.handle();
        handle.add_to_cart(shoe()).await.unwrap();
        handle.add_to_cart(shoe()).await.unwrap();
        handle
            .add_to_cart(NewCartItem::new("b", "Shirt", "v", 25.5))
            .await
            .unwrap();

        let view = handle.view().unwrap();

        assert_eq!(view.products.len(), view.summary.line_items);
        let quantities: u64 = view.products.iter().map(|p| u64::from(p.quantity)).sum();
        assert_eq!(quantities, view.summary.total_items);
        assert!((view.summary.total_price - 45.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn should_fail_view_outside_scope() {
        assert!(matches!(
            CartHandle::default().view(),
            Err(CartError::OutsideScope)
        ));
    }
}
