//! Integration tests for shop listings, menus and accounts.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::Utc;
use drovo_client::{ApiError, StoreError};
use drovo_core::{CategoryFilter, Email, ShopId, UserType};
use drovo_integration_tests::{
    CUSTOMER_EMAIL, CUSTOMER_PASSWORD, FakeApi, LAPSED_TOKEN, SHOP_ID, VALID_TOKEN,
};
use secrecy::SecretString;

// =============================================================================
// Shops
// =============================================================================

#[tokio::test]
async fn test_list_shops() {
    let api = FakeApi::start().await;
    let store = api.guest_store();

    let shops = store.api().list_shops().await.unwrap();
    assert_eq!(shops.len(), 1);

    let shop = &shops[0];
    assert_eq!(shop.id, ShopId::new(SHOP_ID));
    assert_eq!(shop.name, "Gokul Dairy");
    assert_eq!(shop.plan().map(|plan| plan.code()), Some("149".to_string()));
    assert!(!shop.subscription_expired(Utc::now()));

    store.shutdown().await;
}

#[tokio::test]
async fn test_shop_page_has_menu_and_location() {
    let api = FakeApi::start().await;
    let store = api.guest_store();

    let page = store
        .api()
        .shop_page(&ShopId::new(SHOP_ID), None)
        .await
        .unwrap();
    assert_eq!(page.food_items.len(), 3);
    let location = page.location().unwrap();
    assert!((location.lat - 18.507).abs() < 1e-9);

    store.shutdown().await;
}

#[tokio::test]
async fn test_unknown_shop_is_not_found() {
    let api = FakeApi::start().await;
    let store = api.guest_store();

    let result = store
        .api()
        .shop_page(&ShopId::new("shop-missing"), None)
        .await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));

    store.shutdown().await;
}

#[tokio::test]
async fn test_lapsed_subscription_redirects() {
    let api = FakeApi::start().await;
    let store = api.guest_store();

    let result = store
        .api()
        .my_shop(&SecretString::from(LAPSED_TOKEN))
        .await;
    match result {
        Err(ApiError::Redirect { path, .. }) => assert_eq!(path, "/renew-subscription"),
        other => panic!("expected a redirect, got {other:?}"),
    }

    let shop = store
        .api()
        .my_shop(&SecretString::from(VALID_TOKEN))
        .await
        .unwrap();
    assert_eq!(shop.is_setup_complete, Some(true));

    store.shutdown().await;
}

// =============================================================================
// Menus
// =============================================================================

#[tokio::test]
async fn test_open_shop_caches_menu() {
    let api = FakeApi::start().await;
    let mut store = api.guest_store();
    let shop = ShopId::new(SHOP_ID);

    assert_eq!(store.open_shop(&shop).await.unwrap().len(), 3);
    assert_eq!(store.open_shop(&shop).await.unwrap().len(), 3);
    assert_eq!(api.recorded.menu_requests(), 1);
    assert_eq!(store.active_shop(), Some(&shop));

    store.api().invalidate_menu(&shop).await;
    store.open_shop(&shop).await.unwrap();
    assert_eq!(api.recorded.menu_requests(), 2);

    let filter = CategoryFilter::Only("Paneer".to_string());
    let paneer: Vec<_> = store.catalog().filtered(&filter).collect();
    assert_eq!(paneer.len(), 1);

    store.shutdown().await;
}

#[tokio::test]
async fn test_shop_page_seeds_menu_cache() {
    let api = FakeApi::start().await;
    let mut store = api.guest_store();
    let shop = ShopId::new(SHOP_ID);

    store.api().shop_page(&shop, None).await.unwrap();
    store.open_shop(&shop).await.unwrap();
    assert_eq!(api.recorded.menu_requests(), 0);

    store.shutdown().await;
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_login_and_logout() {
    let api = FakeApi::start().await;
    let mut store = api.guest_store();
    let email = Email::parse(CUSTOMER_EMAIL).unwrap();

    store
        .login(&email, CUSTOMER_PASSWORD, UserType::User)
        .await
        .unwrap();
    assert!(store.session().is_authenticated());
    assert_eq!(store.session().user_type(), UserType::User);

    store.logout().unwrap();
    assert!(!store.session().is_authenticated());

    store.shutdown().await;
}

#[tokio::test]
async fn test_wrong_password_stays_guest() {
    let api = FakeApi::start().await;
    let mut store = api.guest_store();
    let email = Email::parse(CUSTOMER_EMAIL).unwrap();

    let result = store.login(&email, "wrong", UserType::User).await;
    assert!(matches!(result, Err(StoreError::Api(ApiError::Api { .. }))));
    assert!(!store.session().is_authenticated());

    store.shutdown().await;
}

#[tokio::test]
async fn test_register_existing_email_fails() {
    let api = FakeApi::start().await;
    let mut store = api.guest_store();

    let taken = Email::parse(CUSTOMER_EMAIL).unwrap();
    let result = store.register("Asha", &taken, "secret").await;
    match result {
        Err(StoreError::Api(ApiError::Api { message, .. })) => {
            assert_eq!(message, "User already exists");
        }
        other => panic!("expected an API error, got {other:?}"),
    }
    assert!(!store.session().is_authenticated());

    let fresh = Email::parse("ravi@example.com").unwrap();
    store.register("Ravi", &fresh, "secret").await.unwrap();
    assert!(store.session().is_authenticated());

    store.shutdown().await;
}
