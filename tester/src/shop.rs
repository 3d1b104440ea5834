//! # Mock storefront
//!
//! A small in-process stand-in for the external cart/product resource, so
//! the widget can be driven end to end without a real shop. Seeds a few
//! fixture products and keeps the cart in memory.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

#[derive(Clone, Debug)]
struct Line {
    variant_id: u64,
    quantity: u32,
}

#[derive(Clone, Default)]
struct ShopState {
    lines: Arc<Mutex<Vec<Line>>>,
    products: Arc<Mutex<HashMap<String, Value>>>,
}

pub struct Shop {
    pub base_url: String,
}

pub async fn start(port: u16) -> anyhow::Result<Shop> {
    let state = ShopState::default();
    *state.products.lock().unwrap() = fixtures();

    let app = Router::new()
        .route("/cart.js", get(get_cart))
        .route("/cart/add.js", post(post_add))
        .route("/cart/change.js", post(post_change))
        .route("/products/{handle}", get(get_product))
        .with_state(state);

    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    let addr = listener.local_addr()?;
    info!("Mock storefront running on {addr}");

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            warn!(%error, "mock storefront exited");
        }
    });

    Ok(Shop {
        base_url: format!("http://{addr}"),
    })
}

fn fixtures() -> HashMap<String, Value> {
    let mut products = HashMap::new();

    products.insert(
        "trio-ritual".to_string(),
        json!({
            "title": "Trio Ritual Set",
            "variants": [{"id": 11, "price": 4800, "compare_at_price": null}],
            "tags": ["trio-bundle"],
            "collections": [{"title": "Rituals"}],
        }),
    );
    products.insert(
        "solo-classic".to_string(),
        json!({
            "title": "Solo Classic Set",
            "variants": [{"id": 22, "price": 1800, "compare_at_price": 2400}],
            "tags": [],
            "collections": [{"title": "Classics"}],
        }),
    );
    products.insert(
        "velvet-gift-box".to_string(),
        json!({
            "title": "Velvet Gift Box",
            "variants": [{"id": 900, "price": 9000, "compare_at_price": null}],
            "tags": [],
            "collections": [],
        }),
    );

    products
}

fn lookup_variant(products: &HashMap<String, Value>, variant_id: u64) -> (String, String, i64) {
    for (handle, product) in products {
        let Some(variants) = product["variants"].as_array() else {
            continue;
        };

        for variant in variants {
            if variant["id"].as_u64() == Some(variant_id) {
                return (
                    handle.clone(),
                    product["title"].as_str().unwrap_or("").to_string(),
                    variant["price"].as_i64().unwrap_or(0),
                );
            }
        }
    }

    (String::new(), String::new(), 0)
}

async fn get_cart(State(state): State<ShopState>) -> Json<Value> {
    let lines = state.lines.lock().unwrap().clone();
    let products = state.products.lock().unwrap().clone();

    let mut items = Vec::new();
    let mut total_price = 0i64;
    let mut item_count = 0u32;

    for line in &lines {
        let (handle, title, price) = lookup_variant(&products, line.variant_id);
        total_price += price * i64::from(line.quantity);
        item_count += line.quantity;

        items.push(json!({
            "variant_id": line.variant_id,
            "quantity": line.quantity,
            "product_title": title,
            "title": title,
            "image": format!("{handle}.jpg"),
            "final_price": price,
            "url": format!("/products/{handle}"),
            "handle": handle,
        }));
    }

    Json(json!({
        "items": items,
        "total_price": total_price,
        "total_discount": 0,
        "item_count": item_count,
    }))
}

async fn post_add(State(state): State<ShopState>, Json(body): Json<Value>) -> Json<Value> {
    if let Some(items) = body["items"].as_array() {
        let mut lines = state.lines.lock().unwrap();

        for item in items {
            let Some(variant_id) = item["id"].as_u64() else {
                continue;
            };
            let quantity = item["quantity"].as_u64().unwrap_or(1) as u32;

            match lines.iter_mut().find(|line| line.variant_id == variant_id) {
                Some(line) => line.quantity += quantity,
                None => lines.push(Line {
                    variant_id,
                    quantity,
                }),
            }
        }
    }

    Json(json!({}))
}

async fn post_change(State(state): State<ShopState>, Json(body): Json<Value>) -> Json<Value> {
    let variant_id = body["id"]
        .as_u64()
        .or_else(|| {
            body["id"]
                .as_str()
                .and_then(|id| id.split(':').next())
                .and_then(|id| id.parse().ok())
        })
        .unwrap_or(0);
    let quantity = body["quantity"].as_u64().unwrap_or(0) as u32;

    let mut lines = state.lines.lock().unwrap();
    if quantity == 0 {
        lines.retain(|line| line.variant_id != variant_id);
    } else if let Some(line) = lines.iter_mut().find(|line| line.variant_id == variant_id) {
        line.quantity = quantity;
    }

    Json(json!({}))
}

async fn get_product(
    State(state): State<ShopState>,
    Path(handle): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let handle = handle.strip_suffix(".js").unwrap_or(&handle);

    state
        .products
        .lock()
        .unwrap()
        .get(handle)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
