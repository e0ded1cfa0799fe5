//! High-level storefront session.
//!
//! [`Storefront`] ties the pieces together: the API client, the cart, the
//! catalog pager, and the background token refresh. It owns the login and
//! logout transitions so the scheduler's lifetime always matches the
//! session's.

use tracing::{info, instrument};

use bee_commerce_core::{CartStore, Order, Product};

use crate::account::{Profile, ProfileUpdate};
use crate::api::ApiClient;
use crate::catalog::CatalogPager;
use crate::checkout::{self, CheckoutReceipt};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::scheduler::RefreshScheduler;
use crate::session::{Claims, FileStorage, Session, TokenStorage};

/// A complete storefront session: client, cart, catalog, and token upkeep.
pub struct Storefront {
    client: ApiClient,
    cart: CartStore,
    catalog: CatalogPager,
    scheduler: Option<RefreshScheduler>,
    config: ClientConfig,
}

impl Storefront {
    /// Build a storefront using file-backed token storage from config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let storage = Box::new(FileStorage::new(config.token_path.clone()));
        Self::with_storage(config, storage)
    }

    /// Build a storefront with an explicit token storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_storage(config: ClientConfig, storage: Box<dyn TokenStorage>) -> Result<Self> {
        let client = ApiClient::new(&config, storage)?;
        Ok(Self {
            catalog: CatalogPager::new(client.clone()),
            cart: CartStore::new(),
            scheduler: None,
            client,
            config,
        })
    }

    /// The underlying API client.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The shopping cart.
    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Mutable access to the shopping cart.
    pub const fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    /// The catalog pager.
    pub const fn catalog(&mut self) -> &mut CatalogPager {
        &mut self.catalog
    }

    /// Whether a session is currently held.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.client.credentials().is_active()
    }

    /// Claims of the logged-in user, if any.
    #[must_use]
    pub fn claims(&self) -> Option<Claims> {
        self.client.credentials().claims()
    }

    /// Log in and start the background token refresh.
    ///
    /// # Errors
    ///
    /// Propagates authentication failures; no session state changes on error.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Session> {
        let session = self.client.login(username, password).await?;
        self.start_scheduler();
        info!(username, "session started");
        Ok(session)
    }

    /// Create an account, then log in with the same credentials.
    ///
    /// # Errors
    ///
    /// Propagates validation failures from registration and authentication
    /// failures from the follow-up login.
    #[instrument(skip(self, password))]
    pub async fn register(&mut self, username: &str, email: &str, password: &str) -> Result<Session> {
        self.client.register(username, email, password).await?;
        self.login(username, password).await
    }

    /// Pick up a persisted session from a previous run.
    ///
    /// Starts the background refresh if any credential was recovered; an
    /// expired access token heals through the normal refresh-on-401 path.
    /// Returns whether a session was restored.
    pub fn restore(&mut self) -> bool {
        if self.client.restore() {
            self.start_scheduler();
            true
        } else {
            false
        }
    }

    /// End the session: stop the refresh task, forget tokens, empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if persisted tokens cannot be removed; in-memory
    /// state is torn down regardless.
    #[instrument(skip(self))]
    pub fn logout(&mut self) -> Result<()> {
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.stop();
        }
        self.cart.clear();
        self.client.logout()?;
        info!("session ended");
        Ok(())
    }

    /// Submit the cart as an order; the cart empties only on success.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::EmptyCart`] for an empty cart and
    /// propagates request failures otherwise.
    pub async fn checkout(&mut self) -> Result<CheckoutReceipt> {
        checkout::submit(&self.client, &mut self.cart).await
    }

    /// The logged-in user's order history.
    ///
    /// # Errors
    ///
    /// Propagates request failures.
    pub async fn orders(&self) -> Result<Vec<Order>> {
        self.client.orders().await
    }

    /// The logged-in user's profile.
    ///
    /// # Errors
    ///
    /// Propagates request failures.
    pub async fn profile(&self) -> Result<Profile> {
        self.client.profile().await
    }

    /// Apply a profile update.
    ///
    /// # Errors
    ///
    /// Propagates validation and request failures.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile> {
        self.client.update_profile(update).await
    }

    /// Add one unit of a product to the cart.
    pub fn add_to_cart(&mut self, product: &Product) {
        self.cart.add_item(product);
    }

    fn start_scheduler(&mut self) {
        if let Some(previous) = self.scheduler.take() {
            previous.stop();
        }
        self.scheduler = Some(RefreshScheduler::start(
            self.client.clone(),
            self.config.refresh_period,
        ));
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("logged_in", &self.is_logged_in())
            .field("cart_items", &self.cart.total_items())
            .finish_non_exhaustive()
    }
}
