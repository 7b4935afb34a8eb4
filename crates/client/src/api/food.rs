//! Shop menus and the owner's item management.

use drovo_core::{Catalog, ItemId, ShopId};
use reqwest::multipart::{Form, Part};
use secrecy::SecretString;
use serde_json::json;
use tracing::{debug, info, instrument};

use super::types::{ImageUpload, NewFoodItem};
use super::{ApiClient, Auth, CacheKey, CacheValue, data, message};
use crate::error::Result;

impl ApiClient {
    /// The menu of a shop, served from cache while fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(shop_id = %shop_id))]
    pub async fn shop_menu(&self, shop_id: &ShopId, token: Option<&SecretString>) -> Result<Catalog> {
        let key = CacheKey::Menu(shop_id.clone());
        if let Some(CacheValue::Menu(catalog)) = self.cache().get(&key).await {
            debug!("Cache hit for menu");
            return Ok(catalog);
        }

        let auth = token.map_or(Auth::Anonymous, Auth::Token);
        let mut body = self.get(&format!("api/food/list/{shop_id}"), auth).await?;
        let catalog: Catalog = data(&mut body)?;

        self.cache().insert(key, CacheValue::Menu(catalog.clone())).await;
        Ok(catalog)
    }

    /// Drop a shop's cached menu.
    pub async fn invalidate_menu(&self, shop_id: &ShopId) {
        self.cache().invalidate(&CacheKey::Menu(shop_id.clone())).await;
    }

    /// The logged-in owner's items.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::Redirect`] if setup or renewal is pending,
    /// or an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn my_food(&self, token: &SecretString) -> Result<Catalog> {
        let mut body = self.get("api/food/list", Auth::Token(token)).await?;
        data(&mut body)
    }

    /// Add an item to the owner's menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is rejected or the request fails.
    #[instrument(skip(self, token, item), fields(name = %item.name))]
    pub async fn add_food(&self, token: &SecretString, item: NewFoodItem) -> Result<Option<String>> {
        let form = Form::new()
            .text("name", item.name)
            .text("description", item.description)
            .text("price", item.price.amount().to_string())
            .text("category", item.category)
            .text("unit", item.unit.to_string())
            .text("quantity", item.quantity.to_string())
            .part("image", image_part(item.image));

        let body = self
            .post_multipart("api/food/add", Auth::Token(token), form)
            .await?;
        info!("Food item added");
        Ok(message(&body))
    }

    /// Remove an item from the owner's menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cannot be removed or the request fails.
    #[instrument(skip(self, token), fields(item_id = %item_id))]
    pub async fn remove_food(&self, token: &SecretString, item_id: &ItemId) -> Result<Option<String>> {
        let body = self
            .post_json("api/food/remove", Auth::Token(token), &json!({ "id": item_id }))
            .await?;
        info!("Food item removed");
        Ok(message(&body))
    }
}

pub(super) fn image_part(image: ImageUpload) -> Part {
    Part::bytes(image.bytes).file_name(image.file_name)
}
