//! # Bundle widget controller
//!
//! One controller instance owns all state for one bundle section: the
//! current frame, the debounce deadline, and the refresh sequence guard.
//! It runs as a single task draining a typed event channel, so every
//! mutation is serialized without locks.
//!
//! Adds and removes render optimistically at event receipt, before their
//! network call is issued. Every mutation path then schedules a debounced
//! refresh; refresh fetches run in the background and report back through
//! an internal channel, where the sequence guard discards any snapshot
//! superseded by a newer one.

use storefront::{AddItem, AddRequest, Cart, ChangeRequest, StorefrontClient};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::{
    frame::{Frame, SlotCard, SlotRender},
    scheduler::{RefreshScheduler, SeqGuard},
    settings::Settings,
    slots::TagKind,
    sync::{self, CartSnapshot},
};

/// Product data carried by the add-to-cart element, used for the
/// optimistic render and the add call.
#[derive(Debug, Clone, Default)]
pub struct ProductCard {
    pub variant_id: u64,
    pub product_id: Option<u64>,
    pub handle: Option<String>,
    pub title: String,
    pub image: String,
    pub collection: String,
    pub selling_plan: Option<u64>,
    pub selling_plan_ids: Vec<u64>,
    pub trio_bundle: bool,
}

impl ProductCard {
    /// Selling plan for a 1-based ritual dropdown index: picks from the
    /// card's plan list, clamped to its bounds, falling back to the card's
    /// default plan when no list or no index is available.
    pub fn selling_plan_for(&self, ritual_index: Option<usize>) -> Option<u64> {
        if self.selling_plan_ids.is_empty() {
            return self.selling_plan;
        }

        let Some(index) = ritual_index else {
            return self.selling_plan;
        };

        let clamped = index.clamp(1, self.selling_plan_ids.len());
        Some(self.selling_plan_ids[clamped - 1])
    }
}

#[derive(Debug, Clone)]
pub enum WidgetEvent {
    AddToCart {
        card: ProductCard,
        ritual_index: Option<usize>,
    },
    RemoveFromCart {
        variant_id: u64,
    },
    /// Plus button on a product card; behaves like a single-unit add.
    IncreaseQuantity {
        card: ProductCard,
        ritual_index: Option<usize>,
    },
    /// Minus button; decrements the synced quantity, removing the line at
    /// zero.
    DecreaseQuantity {
        variant_id: u64,
    },
    /// Passive theme cart event; only schedules a (shorter) refresh.
    CartChanged,
}

/// Notification emitted after every applied refresh, for unrelated cart
/// UI such as the cart drawer.
#[derive(Debug, Clone)]
pub struct CartRefreshed {
    pub cart: Cart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    OptimisticPending,
    Synced,
}

pub struct BundleWidget {
    settings: Settings,
    client: StorefrontClient,
    frame_tx: watch::Sender<Frame>,
    refreshed_tx: broadcast::Sender<CartRefreshed>,
    scheduler: RefreshScheduler,
    seq: SeqGuard,
    phase: SyncPhase,
    snapshot_tx: mpsc::Sender<(u64, CartSnapshot)>,
    snapshot_rx: mpsc::Receiver<(u64, CartSnapshot)>,
}

impl BundleWidget {
    pub fn new(settings: Settings, client: StorefrontClient) -> Self {
        let (frame_tx, _) = watch::channel(Frame::initial(&settings));
        let (refreshed_tx, _) = broadcast::channel(8);
        let (snapshot_tx, snapshot_rx) = mpsc::channel(8);

        Self {
            settings,
            client,
            frame_tx,
            refreshed_tx,
            scheduler: RefreshScheduler::new(),
            seq: SeqGuard::new(),
            phase: SyncPhase::Idle,
            snapshot_tx,
            snapshot_rx,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn frame(&self) -> Frame {
        self.frame_tx.borrow().clone()
    }

    pub fn frames(&self) -> watch::Receiver<Frame> {
        self.frame_tx.subscribe()
    }

    pub fn refreshed(&self) -> broadcast::Receiver<CartRefreshed> {
        self.refreshed_tx.subscribe()
    }

    /// Drain events until the channel closes. An unconditional refresh
    /// runs first so the widget reflects the cart on page load.
    pub async fn run(mut self, mut events: mpsc::Receiver<WidgetEvent>) {
        self.spawn_refresh();

        loop {
            let deadline = self.scheduler.pending();

            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
                completed = self.snapshot_rx.recv() => {
                    if let Some((seq, snapshot)) = completed {
                        self.apply_snapshot(seq, snapshot);
                    }
                },
                _ = wait_until(deadline), if deadline.is_some() => {
                    self.scheduler.cancel_pending();
                    self.spawn_refresh();
                },
            }
        }
    }

    pub async fn handle_event(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::AddToCart { card, ritual_index }
            | WidgetEvent::IncreaseQuantity { card, ritual_index } => {
                self.add_to_cart(card, ritual_index).await;
            }
            WidgetEvent::RemoveFromCart { variant_id } => self.remove_one(variant_id).await,
            WidgetEvent::DecreaseQuantity { variant_id } => {
                self.decrease_quantity(variant_id).await;
            }
            WidgetEvent::CartChanged => self.scheduler.schedule(self.settings.passive_debounce),
        }
    }

    /// Fetch and apply one authoritative snapshot inline. Failures are
    /// logged and the current frame stays untouched.
    pub async fn refresh(&mut self) {
        let seq = self.seq.begin();

        match sync::fetch_snapshot(&self.client).await {
            Ok(snapshot) => self.apply_snapshot(seq, snapshot),
            Err(error) => warn!(%error, "cart refresh failed, keeping the current view"),
        }
    }

    /// Render the new item into the first empty slot before any network
    /// call is issued. The next refresh replaces this with authoritative
    /// state; the incentive message is left for the refresh to update.
    pub fn optimistic_add(&mut self, card: &ProductCard) {
        self.phase = SyncPhase::OptimisticPending;
        let total = self.settings.total_slots as u32;

        self.frame_tx.send_modify(|frame| {
            let Some(empty) = frame.slots.iter_mut().find(|slot| !slot.is_filled()) else {
                return;
            };

            *empty = SlotRender::Filled(SlotCard {
                variant_id: card.variant_id,
                title: card.title.clone(),
                image: card.image.clone(),
                collection_title: card.collection.clone(),
                quantity: 1,
                tag: if card.trio_bundle {
                    TagKind::TrioBundle
                } else {
                    TagKind::None
                },
                is_duplicate: false,
            });

            let filled = frame.slots.iter().filter(|slot| slot.is_filled()).count() as u32;
            frame.progress.effective_count = filled;
            frame.progress.remaining = total.saturating_sub(filled);
            frame.progress.percent = crate::progress::percent(filled, total);
            frame.steps_reached = (1..=total).map(|step| filled >= step).collect();
        });
    }

    /// Reset the slot showing this variant back to its placeholder; the
    /// refresh corrects progress and totals.
    pub fn optimistic_remove(&mut self, variant_id: u64) {
        self.phase = SyncPhase::OptimisticPending;
        let settings = &self.settings;

        self.frame_tx.send_modify(|frame| {
            let found = frame
                .slots
                .iter_mut()
                .enumerate()
                .find(|(_, slot)| slot.card().is_some_and(|card| card.variant_id == variant_id));

            if let Some((index, slot)) = found {
                *slot = SlotRender::Empty(settings.placeholder(index));
            }
        });
    }

    async fn add_to_cart(&mut self, card: ProductCard, ritual_index: Option<usize>) {
        self.optimistic_add(&card);

        let item =
            AddItem::new(card.variant_id, 1).with_selling_plan(card.selling_plan_for(ritual_index));

        if let Err(error) = self.client.add_items(&AddRequest::single(item)).await {
            warn!(variant_id = card.variant_id, %error, "add to cart failed");
        }

        self.scheduler.schedule(self.settings.refresh_debounce);
    }

    /// Remove one unit of a variant: reset its slot, then decrement the
    /// line (by line key when known), removing it at quantity zero.
    async fn remove_one(&mut self, variant_id: u64) {
        self.optimistic_remove(variant_id);

        match self.client.fetch_cart().await {
            Ok(cart) => {
                let line = cart.items.iter().find(|line| line.variant_id == variant_id);
                let (id, quantity) = match line {
                    Some(line) => (line.change_id(), line.quantity.saturating_sub(1)),
                    None => (variant_id.to_string(), 0),
                };

                let request = ChangeRequest { id, quantity };
                if let Err(error) = self.client.change_line(&request).await {
                    warn!(variant_id, %error, "remove from cart failed");
                }
            }
            Err(error) => warn!(variant_id, %error, "could not load cart before removing"),
        }

        self.scheduler.schedule(self.settings.refresh_debounce);
    }

    async fn decrease_quantity(&mut self, variant_id: u64) {
        let quantity = self.frame_tx.borrow().quantity_of(variant_id);

        if quantity > 1 {
            let request = ChangeRequest {
                id: variant_id.to_string(),
                quantity: quantity - 1,
            };

            if let Err(error) = self.client.change_line(&request).await {
                warn!(variant_id, %error, "cart change failed");
            }

            self.scheduler.schedule(self.settings.refresh_debounce);
        } else {
            self.remove_one(variant_id).await;
        }
    }

    fn spawn_refresh(&mut self) {
        let seq = self.seq.begin();
        let client = self.client.clone();
        let results = self.snapshot_tx.clone();

        tokio::spawn(async move {
            match sync::fetch_snapshot(&client).await {
                Ok(snapshot) => {
                    let _ = results.send((seq, snapshot)).await;
                }
                Err(error) => warn!(%error, "cart refresh failed, keeping the current view"),
            }
        });
    }

    fn apply_snapshot(&mut self, seq: u64, snapshot: CartSnapshot) {
        if !self.seq.try_apply(seq) {
            debug!(seq, "discarding superseded cart snapshot");
            return;
        }

        let frame = sync::build_frame(&self.settings, &snapshot);
        self.frame_tx.send_replace(frame);
        self.phase = SyncPhase::Synced;
        let _ = self.refreshed_tx.send(CartRefreshed {
            cart: snapshot.cart,
        });
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
