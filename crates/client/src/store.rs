//! The owned cart store.
//!
//! One [`Store`] holds everything a shopping session needs: the cart of every
//! shop, the active shop and its menu, the persisted [`Session`], and the
//! [`CartMirror`] that replays cart changes on the server. Callers construct it
//! explicitly and pass it by reference.
//!
//! Cart mutations are synchronous. Mirroring happens in the background and
//! never changes what the cart holds; a `Token expired` answer from the
//! mirror logs the session out and the cart carries on as a guest cart.

use drovo_core::{
    Cart, Catalog, DeliveryAddress, Email, ItemId, Price, PlaceOrder, ShopId, UserType,
};
use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::types::{GoogleRegistration, OtpVerification};
use crate::api::{ApiClient, CartAction};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::mirror::{CartMirror, MirrorEvent};
use crate::session::{FileStore, Session, SessionError};

/// Errors from store operations that talk to the API or the session file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Checkout(#[from] drovo_core::CheckoutError),

    #[error("please log in first")]
    NotLoggedIn,

    #[error("no shop selected")]
    NoActiveShop,
}

/// Result of an identity-provider login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoogleLoginOutcome {
    /// The account exists and the session is now logged in.
    LoggedIn,
    /// First login; finish with [`Store::register_google`].
    NeedsRegistration,
}

/// Cart, active shop, menu and session of one user.
#[derive(Debug)]
pub struct Store {
    api: ApiClient,
    session: Session,
    cart: Cart,
    active_shop: Option<ShopId>,
    catalog: Catalog,
    mirror: CartMirror,
}

impl Store {
    /// Create a store with an empty cart.
    ///
    /// Must be called inside a Tokio runtime; the mirror worker is spawned here.
    #[must_use]
    pub fn new(api: ApiClient, session: Session) -> Self {
        let mirror = CartMirror::spawn(api.clone());
        Self {
            api,
            session,
            cart: Cart::new(),
            active_shop: None,
            catalog: Catalog::default(),
            mirror,
        }
    }

    /// Create a store from configuration, restoring the persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file exists but cannot be read.
    pub fn open(config: &ClientConfig) -> Result<Self, StoreError> {
        let store = FileStore::open(&config.session_file)?;
        Ok(Self::new(
            ApiClient::new(config),
            Session::restore(Box::new(store)),
        ))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Carts of every shop.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn active_shop(&self) -> Option<&ShopId> {
        self.active_shop.as_ref()
    }

    /// Menu of the active shop.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Session token, or [`StoreError::NotLoggedIn`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotLoggedIn`] for guests.
    pub fn token(&self) -> Result<&SecretString, StoreError> {
        self.session.token().ok_or(StoreError::NotLoggedIn)
    }

    // =========================================================================
    // Active shop
    // =========================================================================

    /// Make `shop` the active shop with an already loaded menu.
    ///
    /// Other shops' carts are kept.
    pub fn set_active_shop(&mut self, shop: ShopId, catalog: Catalog) {
        info!(shop_id = %shop, items = catalog.len(), "Active shop changed");
        self.active_shop = Some(shop);
        self.catalog = catalog;
    }

    /// Load `shop`'s menu and make it the active shop.
    ///
    /// # Errors
    ///
    /// Returns an error if the menu cannot be loaded; the active shop is then
    /// left unchanged.
    #[instrument(skip(self), fields(shop_id = %shop))]
    pub async fn open_shop(&mut self, shop: &ShopId) -> Result<&Catalog, StoreError> {
        self.process_events();
        let result = self.api.shop_menu(shop, self.session.token()).await;
        let catalog = self.observe(result)?;
        self.set_active_shop(shop.clone(), catalog);
        Ok(&self.catalog)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add one of `item` to `shop`'s cart and return the new quantity.
    ///
    /// When logged in the change is also queued for the server.
    pub fn add_to_cart(&mut self, item: &ItemId, shop: &ShopId) -> u32 {
        self.process_events();
        let quantity = self.cart.add_item(item, shop);
        self.mirror_change(CartAction::Add, item, shop);
        quantity
    }

    /// Take one of `item` out of `shop`'s cart and return what is left.
    ///
    /// When logged in the change is also queued for the server.
    pub fn remove_from_cart(&mut self, item: &ItemId, shop: &ShopId) -> u32 {
        self.process_events();
        let quantity = self.cart.remove_item(item, shop);
        self.mirror_change(CartAction::Remove, item, shop);
        quantity
    }

    /// Drop `item` from `shop`'s cart whatever its quantity.
    ///
    /// Local only: the server has no matching call, so its copy keeps the item.
    pub fn delete_from_cart(&mut self, item: &ItemId, shop: &ShopId) -> Option<u32> {
        self.process_events();
        self.cart.delete_item(item, shop)
    }

    /// Empty the cart of every shop.
    pub fn clear_cart(&mut self) {
        self.cart.clear_all();
    }

    /// Distinct items in the active shop's cart.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.active_shop
            .as_ref()
            .map_or(0, |shop| self.cart.item_count(shop.as_str()))
    }

    /// Value of the active shop's cart at its menu prices.
    #[must_use]
    pub fn total_amount(&self) -> Price {
        self.active_shop.as_ref().map_or(Price::ZERO, |shop| {
            self.cart.total_amount(shop.as_str(), &self.catalog)
        })
    }

    /// Quantity of `item` in the active shop's cart.
    #[must_use]
    pub fn quantity(&self, item: &str) -> u32 {
        self.active_shop
            .as_ref()
            .map_or(0, |shop| self.cart.quantity(item, shop.as_str()))
    }

    #[must_use]
    pub fn has_items(&self) -> bool {
        self.item_count() > 0
    }

    fn mirror_change(&self, action: CartAction, item: &ItemId, shop: &ShopId) {
        if let Some(token) = self.session.token() {
            self.mirror.enqueue(token, action, item, shop);
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// React to events from the mirror worker.
    ///
    /// Returns `true` if the session was reset.
    pub fn process_events(&mut self) -> bool {
        let mut expired = false;
        while let Some(event) = self.mirror.try_next_event() {
            match event {
                MirrorEvent::SessionExpired => expired = true,
            }
        }
        if expired && self.session.is_authenticated() {
            self.expire_session();
            return true;
        }
        false
    }

    /// Wait for queued cart changes to reach the server, then react to any
    /// events they raised.
    pub async fn sync(&mut self) -> bool {
        self.mirror.flush().await;
        self.process_events()
    }

    /// Log in with email and password.
    ///
    /// Only a shop login yields a shop session.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the session cannot
    /// be saved.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &mut self,
        email: &Email,
        password: &str,
        role: UserType,
    ) -> Result<(), StoreError> {
        let token = self.api.login(email, password, role).await?;
        self.session.login(token, role)?;
        Ok(())
    }

    /// Create a customer account and log in.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails or the session cannot be saved.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &mut self,
        name: &str,
        email: &Email,
        password: &str,
    ) -> Result<(), StoreError> {
        let token = self.api.register(name, email, password).await?;
        self.session.login(token, UserType::User)?;
        Ok(())
    }

    /// Finish a shop sign-up and log in as the new shop.
    ///
    /// The shop's name and email are remembered for the setup step.
    ///
    /// # Errors
    ///
    /// Returns an error if verification fails or the session cannot be saved.
    #[instrument(skip(self, verification), fields(email = %verification.email))]
    pub async fn verify_shop_signup(
        &mut self,
        verification: &OtpVerification,
    ) -> Result<(), StoreError> {
        let token = self.api.verify_otp(verification).await?;
        self.session.remember_shop(&verification.name, verification.email.as_str())?;
        self.session.login(token, UserType::Shop)?;
        Ok(())
    }

    /// Log in with an identity-provider ID token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the session cannot be saved.
    #[instrument(skip(self, id_token))]
    pub async fn login_google(
        &mut self,
        id_token: &str,
        user_type: UserType,
    ) -> Result<GoogleLoginOutcome, StoreError> {
        let response = self.api.login_google(id_token, user_type).await?;
        if response.is_new_user {
            return Ok(GoogleLoginOutcome::NeedsRegistration);
        }
        let token = response
            .token
            .ok_or(ApiError::MissingField("token"))?;
        self.session.login(SecretString::from(token), user_type)?;
        Ok(GoogleLoginOutcome::LoggedIn)
    }

    /// Create the account for a first identity-provider login and log in.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails or the session cannot be saved.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register_google(
        &mut self,
        registration: &GoogleRegistration,
    ) -> Result<(), StoreError> {
        let token = self.api.register_google(registration).await?;
        if registration.role == UserType::Shop {
            let name = self.session.shop_name().unwrap_or_else(|| registration.name.clone());
            self.session.remember_shop(&name, registration.email.as_str())?;
        }
        self.session.login(token, registration.role)?;
        Ok(())
    }

    /// Drop the shop name and email remembered since sign-up.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be written.
    pub fn forget_shop_signup(&mut self) -> Result<(), StoreError> {
        self.session.forget_shop()?;
        Ok(())
    }

    /// Forget the token and continue as a guest. The cart is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be written.
    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.session.logout()?;
        Ok(())
    }

    /// Reset the session after the server reported `Token expired`.
    fn expire_session(&mut self) {
        warn!("Session expired, continuing as guest");
        if let Err(e) = self.session.logout() {
            warn!(error = %e, "Failed to persist logout");
        }
    }

    /// Pass an API result through, logging out first if it is a session expiry.
    ///
    /// Callers that use [`Store::api`] directly route results through here.
    ///
    /// # Errors
    ///
    /// Returns the API error, if any.
    pub fn observe<T>(&mut self, result: Result<T, ApiError>) -> Result<T, StoreError> {
        match result {
            Err(e) if e.is_session_expired() => {
                self.expire_session();
                Err(e.into())
            }
            other => Ok(other?),
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Build the order for the active shop's cart without sending it.
    ///
    /// # Errors
    ///
    /// Returns an error if no shop is active, the cart is under the minimum,
    /// or the address is incomplete.
    pub fn prepare_order(
        &self,
        address: DeliveryAddress,
        delivery_charge: Price,
    ) -> Result<PlaceOrder, StoreError> {
        let shop = self.active_shop.as_ref().ok_or(StoreError::NoActiveShop)?;
        Ok(PlaceOrder::from_cart(
            &self.cart,
            shop,
            &self.catalog,
            address,
            delivery_charge,
        )?)
    }

    /// Build the order the active shop's cart would give with `extra` packages
    /// added, leaving the cart untouched and sending nothing to the server.
    ///
    /// # Errors
    ///
    /// Same as [`Store::prepare_order`].
    pub fn preview_order(
        &self,
        extra: &[(ItemId, u32)],
        address: DeliveryAddress,
        delivery_charge: Price,
    ) -> Result<PlaceOrder, StoreError> {
        let shop = self.active_shop.as_ref().ok_or(StoreError::NoActiveShop)?;
        let mut cart = self.cart.clone();
        for (item, packages) in extra {
            for _ in 0..*packages {
                cart.add_item(item, shop);
            }
        }
        Ok(PlaceOrder::from_cart(
            &cart,
            shop,
            &self.catalog,
            address,
            delivery_charge,
        )?)
    }

    /// Place the active shop's order; on success the whole cart is cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is a guest, the order is invalid, or the
    /// API rejects it. A `Token expired` answer also logs the session out.
    #[instrument(skip(self, address))]
    pub async fn place_order(
        &mut self,
        address: DeliveryAddress,
        delivery_charge: Price,
    ) -> Result<PlaceOrder, StoreError> {
        self.process_events();
        let token = self.token()?.clone();
        let order = self.prepare_order(address, delivery_charge)?;

        let result = self.api.place_order(&token, &order).await;
        self.observe(result)?;

        self.clear_cart();
        Ok(order)
    }

    /// Stop the mirror worker after it has drained its queue.
    pub async fn shutdown(self) {
        self.mirror.shutdown().await;
    }
}
