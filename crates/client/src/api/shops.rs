//! Shop listings and shop pages.

use drovo_core::{Catalog, ShopId};
use secrecy::SecretString;
use tracing::{debug, instrument};

use super::types::{Shop, ShopPage};
use super::{ApiClient, Auth, CacheKey, CacheValue, data, field};
use crate::error::Result;

impl ApiClient {
    /// All shops on the marketplace.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_shops(&self) -> Result<Vec<Shop>> {
        if let Some(CacheValue::Shops(shops)) = self.cache().get(&CacheKey::Shops).await {
            debug!("Cache hit for shops");
            return Ok(shops);
        }

        let mut body = self.get("api/shops/all", Auth::Anonymous).await?;
        let shops: Vec<Shop> = data(&mut body)?;

        self.cache()
            .insert(CacheKey::Shops, CacheValue::Shops(shops.clone()))
            .await;
        Ok(shops)
    }

    /// A shop together with its menu.
    ///
    /// The menu also seeds the menu cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the shop does not exist or the request fails.
    #[instrument(skip(self, token), fields(shop_id = %shop_id))]
    pub async fn shop_page(&self, shop_id: &ShopId, token: Option<&SecretString>) -> Result<ShopPage> {
        let auth = token.map_or(Auth::Anonymous, Auth::Token);
        let mut body = self.get(&format!("api/shops/{shop_id}"), auth).await?;
        let page: ShopPage = data(&mut body)?;

        self.cache()
            .insert(
                CacheKey::Menu(shop_id.clone()),
                CacheValue::Menu(Catalog::new(page.food_items.clone())),
            )
            .await;
        Ok(page)
    }

    /// The logged-in owner's shop.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::Redirect`] if setup or renewal is pending,
    /// or an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn my_shop(&self, token: &SecretString) -> Result<Shop> {
        let mut body = self.get("api/shops/details", Auth::Token(token)).await?;
        field(&mut body, "shop")
    }
}
