//! Shared test fixture: an in-process mock storefront with just enough of
//! the cart/product endpoints for the widget flows, plus request counting
//! and per-route latency injection.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Clone, Debug)]
struct Line {
    variant_id: u64,
    quantity: u32,
    selling_plan: Option<u64>,
}

#[derive(Default)]
struct Inner {
    lines: Mutex<Vec<Line>>,
    products: Mutex<HashMap<String, Value>>,
    total_discount: Mutex<i64>,
    cart_fetches: AtomicUsize,
    cart_delay: Mutex<Option<Duration>>,
    cart_fail: Mutex<bool>,
    add_delay: Mutex<Option<Duration>>,
    add_bodies: Mutex<Vec<Value>>,
}

#[derive(Clone, Default)]
pub struct ShopState {
    inner: Arc<Inner>,
}

pub struct MockShop {
    state: ShopState,
    addr: SocketAddr,
}

impl MockShop {
    pub async fn spawn() -> Self {
        let state = ShopState::default();

        let app = Router::new()
            .route("/cart.js", get(get_cart))
            .route("/cart/add.js", post(post_add))
            .route("/cart/change.js", post(post_change))
            .route("/products/{handle}", get(get_product))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state, addr }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn add_product(&self, handle: &str, product: Value) {
        self.state
            .inner
            .products
            .lock()
            .unwrap()
            .insert(handle.to_string(), product);
    }

    pub fn seed_line(&self, variant_id: u64, quantity: u32) {
        self.state.inner.lines.lock().unwrap().push(Line {
            variant_id,
            quantity,
            selling_plan: None,
        });
    }

    pub fn seed_subscription_line(&self, variant_id: u64, quantity: u32, selling_plan: u64) {
        self.state.inner.lines.lock().unwrap().push(Line {
            variant_id,
            quantity,
            selling_plan: Some(selling_plan),
        });
    }

    pub fn clear_lines(&self) {
        self.state.inner.lines.lock().unwrap().clear();
    }

    pub fn set_discount(&self, cents: i64) {
        *self.state.inner.total_discount.lock().unwrap() = cents;
    }

    /// Delays only the next `/cart.js` fetch.
    pub fn delay_next_cart_fetch(&self, delay: Duration) {
        *self.state.inner.cart_delay.lock().unwrap() = Some(delay);
    }

    /// The next `/cart.js` fetch answers 500.
    pub fn fail_next_cart_fetch(&self) {
        *self.state.inner.cart_fail.lock().unwrap() = true;
    }

    /// Delays only the next `/cart/add.js` call.
    pub fn delay_next_add(&self, delay: Duration) {
        *self.state.inner.add_delay.lock().unwrap() = Some(delay);
    }

    pub fn cart_fetch_count(&self) -> usize {
        self.state.inner.cart_fetches.load(Ordering::SeqCst)
    }

    pub fn add_bodies(&self) -> Vec<Value> {
        self.state.inner.add_bodies.lock().unwrap().clone()
    }

    pub fn line_quantity(&self, variant_id: u64) -> u32 {
        self.state
            .inner
            .lines
            .lock()
            .unwrap()
            .iter()
            .filter(|line| line.variant_id == variant_id)
            .map(|line| line.quantity)
            .sum()
    }
}

/// Product fixture in the `/products/{handle}.js` shape.
pub fn product(
    title: &str,
    variant_id: u64,
    price: i64,
    compare_at: Option<i64>,
    tags: &[&str],
    collection: &str,
) -> Value {
    json!({
        "title": title,
        "variants": [{"id": variant_id, "price": price, "compare_at_price": compare_at}],
        "tags": tags,
        "collections": [{"title": collection}],
    })
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

async fn get_cart(State(state): State<ShopState>) -> Result<Json<Value>, StatusCode> {
    state.inner.cart_fetches.fetch_add(1, Ordering::SeqCst);

    if std::mem::take(&mut *state.inner.cart_fail.lock().unwrap()) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    // Snapshot the cart before any injected delay so a delayed response
    // carries the state from when the request arrived.
    let lines = state.inner.lines.lock().unwrap().clone();
    let products = state.inner.products.lock().unwrap().clone();
    let total_discount = *state.inner.total_discount.lock().unwrap();

    let mut items = Vec::new();
    let mut total_price = 0i64;
    let mut item_count = 0u32;

    for line in &lines {
        let (handle, title, price) = lookup_variant(&products, line.variant_id);
        total_price += price * i64::from(line.quantity);
        item_count += line.quantity;

        let mut item = json!({
            "variant_id": line.variant_id,
            "key": format!("{}:mock", line.variant_id),
            "quantity": line.quantity,
            "product_title": title,
            "title": title,
            "image": format!("{handle}.jpg"),
            "final_price": price,
            "url": format!("/products/{handle}"),
            "handle": handle,
        });
        if let Some(plan) = line.selling_plan {
            item["selling_plan_allocation"] =
                json!({"price": price, "selling_plan": {"id": plan, "name": "Subscribe"}});
        }
        items.push(item);
    }

    let response = json!({
        "items": items,
        "total_price": total_price,
        "total_discount": total_discount,
        "item_count": item_count,
    });

    let delay = state.inner.cart_delay.lock().unwrap().take();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    Ok(Json(response))
}

async fn post_add(State(state): State<ShopState>, Json(body): Json<Value>) -> Json<Value> {
    let delay = state.inner.add_delay.lock().unwrap().take();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    state.inner.add_bodies.lock().unwrap().push(body.clone());

    if let Some(items) = body["items"].as_array() {
        let mut lines = state.inner.lines.lock().unwrap();

        for item in items {
            let Some(variant_id) = item["id"].as_u64() else {
                continue;
            };
            let quantity = item["quantity"].as_u64().unwrap_or(1) as u32;
            let selling_plan = item["selling_plan"].as_u64();

            match lines.iter_mut().find(|line| line.variant_id == variant_id) {
                Some(line) => line.quantity += quantity,
                None => lines.push(Line {
                    variant_id,
                    quantity,
                    selling_plan,
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

    let mut lines = state.inner.lines.lock().unwrap();
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
        .inner
        .products
        .lock()
        .unwrap()
        .get(handle)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
