//! End-to-end storefront flows against a mock backend.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;

use mercado_integration_tests::{GOOD_PASSWORD, TestContext};
use reqwest::{StatusCode, header};

fn hx_redirect(resp: &reqwest::Response) -> Option<&str> {
    resp.headers().get("hx-redirect").and_then(|v| v.to_str().ok())
}

// ============================================================================
// Session Guard
// ============================================================================

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;
    let resp = ctx.client.get(ctx.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_guarded_pages_redirect_without_token() {
    let ctx = TestContext::new().await;

    let resp = ctx.client.get(ctx.url("/home")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

    let resp = ctx.htmx_get("/catalog").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(hx_redirect(&resp), Some("/"));

    let resp = ctx.htmx_get("/session/check").send().await.unwrap();
    assert_eq!(hx_redirect(&resp), Some("/"));
    assert_eq!(ctx.backend.product_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_logout_trips_the_session_poll() {
    let ctx = TestContext::new().await;
    ctx.login("ana", GOOD_PASSWORD).await;

    let resp = ctx.htmx_get("/session/check").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(hx_redirect(&resp), None);

    let resp = ctx.htmx_post("/auth/logout").send().await.unwrap();
    assert_eq!(hx_redirect(&resp), Some("/"));

    let resp = ctx.htmx_get("/session/check").send().await.unwrap();
    assert_eq!(hx_redirect(&resp), Some("/"));
}

// ============================================================================
// Login & Catalog
// ============================================================================

#[tokio::test]
async fn test_login_page_renders() {
    let ctx = TestContext::new().await;
    let resp = ctx.client.get(ctx.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Sign in"));
    assert!(body.contains("hx-post=\"/auth/login\""));
}

#[tokio::test]
async fn test_login_failure_shows_backend_message() {
    let ctx = TestContext::new().await;

    let resp = ctx.login("ana", "wrong").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Invalid credentials"));
    assert!(body.contains("value=\"ana\""));

    let resp = ctx.login("", "").await;
    let body = resp.text().await.unwrap();
    assert!(body.contains("Please enter your username and password"));
}

#[tokio::test]
async fn test_login_then_browse_catalog() {
    let ctx = TestContext::new().await;

    let resp = ctx.login("ana", GOOD_PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(hx_redirect(&resp), Some("/home"));

    let resp = ctx.client.get(ctx.url("/home")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("hx-get=\"/catalog\""));
    assert!(body.contains("/session/check"));

    let body = ctx.htmx_get("/catalog").send().await.unwrap().text().await.unwrap();
    assert!(body.contains("Backpack"));
    assert!(body.contains("Silver Ring"));
    assert!(body.contains("$109.95"));

    let body = ctx
        .htmx_get("/catalog?category=jewelery")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Silver Ring"));
    assert!(!body.contains("Backpack"));

    let body = ctx
        .htmx_get("/catalog?q=jacket")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Rain Jacket"));
    assert!(!body.contains("Silver Ring"));

    // One fetch per catalog render
    assert_eq!(ctx.backend.product_calls.load(Ordering::SeqCst), 3);
}

// ============================================================================
// Cart & Checkout
// ============================================================================

#[tokio::test]
async fn test_cart_add_remove_and_badge() {
    let ctx = TestContext::new().await;

    let resp = ctx.add_to_cart("1", "Backpack", "10.00").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("hx-trigger").unwrap(), "cart-changed");
    assert!(resp.text().await.unwrap().contains(">1<"));

    ctx.add_to_cart("1", "Backpack", "10.00").await;
    let resp = ctx.add_to_cart("2", "Mug", "2.50").await;
    assert!(resp.text().await.unwrap().contains(">3<"));

    let body = ctx.htmx_get("/cart").send().await.unwrap().text().await.unwrap();
    assert!(body.contains("Total: $22.50"));

    let resp = ctx
        .htmx_post("/cart/remove")
        .form(&[("id", "1")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers().get("hx-trigger").unwrap(), "cart-updated");
    let body = resp.text().await.unwrap();
    assert!(body.contains("Total: $2.50"));
    assert!(!body.contains("Backpack"));

    let body = ctx.htmx_get("/cart/count").send().await.unwrap().text().await.unwrap();
    assert!(body.contains(">1<"));
}

#[tokio::test]
async fn test_out_of_range_prices_leave_cart_usable() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart("1", "Backpack", "10.00").await;

    for price in ["79228162514264337593543950335", "1000000000.01", "-1.00"] {
        let resp = ctx.add_to_cart("9", "Gold bar", price).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "price {price}");
    }

    let resp = ctx.htmx_get("/cart").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Total: $10.00"));
    assert!(!body.contains("Gold bar"));

    let resp = ctx
        .htmx_post("/cart/remove")
        .form(&[("id", "1")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Total: $0.00"));
}

#[tokio::test]
async fn test_checkout_submits_order_and_empties_cart() {
    let ctx = TestContext::new().await;
    ctx.login("ana", GOOD_PASSWORD).await;
    ctx.add_to_cart("1", "Backpack", "10.00").await;
    ctx.add_to_cart("2", "Mug", "2.50").await;

    let resp = ctx.htmx_post("/checkout").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Order received"));
    assert!(body.contains("Your cart is empty"));

    let orders = ctx.backend.orders();
    assert_eq!(orders.len(), 1);
    let order = orders.first().unwrap();
    assert_eq!(order["totalItems"], 2);
    assert_eq!(order["products"].as_array().unwrap().len(), 2);
    assert!((order["priceTotal"].as_f64().unwrap() - 12.5).abs() < 1e-9);
    assert_eq!(order["products"][0]["id"], 1);
    assert_eq!(order["products"][0]["quantity"], 1);
}

#[tokio::test]
async fn test_checkout_without_token_keeps_cart() {
    let ctx = TestContext::new().await;
    ctx.add_to_cart("1", "Backpack", "10.00").await;

    let body = ctx.htmx_post("/checkout").send().await.unwrap().text().await.unwrap();
    assert!(body.contains("Your session has expired"));
    assert!(body.contains("Backpack"));
    assert!(ctx.backend.orders().is_empty());
}

#[tokio::test]
async fn test_failed_checkout_keeps_cart() {
    let ctx = TestContext::new().await;
    ctx.login("ana", GOOD_PASSWORD).await;
    ctx.add_to_cart("1", "Backpack", "10.00").await;
    ctx.backend.fail_checkout.store(true, Ordering::SeqCst);

    let body = ctx.htmx_post("/checkout").send().await.unwrap().text().await.unwrap();
    assert!(body.contains("Out of stock"));
    assert!(body.contains("Backpack"));
    assert!(body.contains("Total: $10.00"));
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_registration_wizard() {
    let ctx = TestContext::new().await;

    let body = ctx
        .client
        .get(ctx.url("/?mode=register"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Step 1 of 3"));

    let body = ctx
        .htmx_post("/auth/register")
        .form(&[
            ("step", "identity"),
            ("name", "Ana"),
            ("email", "ana@example.com"),
            ("username", "ana"),
        ])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Step 2 of 3"));

    let body = ctx
        .htmx_post("/auth/register")
        .form(&[
            ("step", "password"),
            ("password", "pw1"),
            ("confirm_password", "pw2"),
        ])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Passwords do not match"));
    assert!(body.contains("Step 2 of 3"));

    ctx.htmx_post("/auth/register")
        .form(&[
            ("step", "password"),
            ("password", "pw1"),
            ("confirm_password", "pw1"),
        ])
        .send()
        .await
        .unwrap();
    assert!(ctx.backend.signups().is_empty());

    let body = ctx
        .htmx_post("/auth/register")
        .form(&[("step", "phone"), ("phone", "555-0100")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("User created"));
    assert!(body.contains("hx-post=\"/auth/login\""));

    let signups = ctx.backend.signups();
    assert_eq!(signups.len(), 1);
    let signup = signups.first().unwrap();
    assert_eq!(signup["name"], "Ana");
    assert_eq!(signup["email"], "ana@example.com");
    assert_eq!(signup["username"], "ana");
    assert_eq!(signup["password"], "pw1");
    assert_eq!(signup["phone"], "555-0100");
}

// ============================================================================
// Language & Rate Limiting
// ============================================================================

#[tokio::test]
async fn test_language_switch_persists() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .htmx_post("/language")
        .form(&[("lang", "es"), ("return_to", "/")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers().get("hx-refresh").unwrap(), "true");

    let body = ctx.client.get(ctx.url("/")).send().await.unwrap().text().await.unwrap();
    assert!(body.contains("<html lang=\"es\">"));
    assert!(body.contains("Iniciar sesión"));

    // Unsupported codes change nothing
    ctx.htmx_post("/language")
        .form(&[("lang", "de")])
        .send()
        .await
        .unwrap();
    let body = ctx.client.get(ctx.url("/")).send().await.unwrap().text().await.unwrap();
    assert!(body.contains("<html lang=\"es\">"));
}

#[tokio::test]
async fn test_browser_language_used_without_preference() {
    let ctx = TestContext::new().await;
    let body = ctx
        .client
        .get(ctx.url("/"))
        .header(header::ACCEPT_LANGUAGE, "es-MX,es;q=0.9")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Iniciar sesión"));
}

#[tokio::test]
async fn test_login_is_rate_limited() {
    let ctx = TestContext::new().await;
    let mut statuses = Vec::new();
    for _ in 0..12 {
        statuses.push(ctx.login("ana", "wrong").await.status());
    }
    assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS));
    assert_eq!(statuses.first(), Some(&StatusCode::OK));
}
