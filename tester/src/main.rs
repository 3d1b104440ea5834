//! Scripted walk of the bundle and gift-box widgets against the mock
//! storefront. Run with `RUST_LOG=info` to watch each frame land.

use std::time::Duration;

use clap::Parser;
use storefront::StorefrontClient;
use tokio::{sync::mpsc, time::sleep};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};
use widget::{
    BundleWidget, Frame, GiftBoxWidget, ProductCard, Settings, SlotRender, WidgetEvent, totals,
};

mod shop;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Port for the mock storefront; 0 picks a free one.
    #[arg(long, default_value_t = 0)]
    port: u16,

    /// Pause between scripted steps, in milliseconds.
    #[arg(long, default_value_t = 800)]
    step_ms: u64,
}

fn trio_card() -> ProductCard {
    ProductCard {
        variant_id: 11,
        handle: Some("trio-ritual".to_string()),
        title: "Trio Ritual Set".to_string(),
        image: "trio-ritual.jpg".to_string(),
        collection: "Rituals".to_string(),
        trio_bundle: true,
        ..ProductCard::default()
    }
}

fn solo_card() -> ProductCard {
    ProductCard {
        variant_id: 22,
        handle: Some("solo-classic".to_string()),
        title: "Solo Classic Set".to_string(),
        image: "solo-classic.jpg".to_string(),
        collection: "Classics".to_string(),
        ..ProductCard::default()
    }
}

fn log_frame(label: &str, frame: &Frame) {
    info!(
        "{label}: {}/{} steps, total {}, saved {}, message: {}",
        frame.progress.effective_count,
        frame.progress.total_steps,
        totals::dollars(frame.total_price),
        totals::dollars(frame.amount_saved),
        frame.progress.message,
    );

    for (index, slot) in frame.slots.iter().enumerate() {
        match slot {
            SlotRender::Filled(card) => info!(
                "  slot {}: {}{}",
                index + 1,
                card.title,
                if card.is_duplicate { " (duplicate)" } else { "" }
            ),
            SlotRender::Empty(placeholder) => {
                info!("  slot {}: [{}]", index + 1, placeholder.label);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let step = Duration::from_millis(args.step_ms);

    let shop = shop::start(args.port).await?;
    let client = StorefrontClient::new(shop.base_url.clone());

    let settings = Settings {
        gift_box_handle: Some("velvet-gift-box".to_string()),
        ..Settings::default()
    };

    info!("Starting bundle widget...");
    let widget = BundleWidget::new(settings.clone(), client.clone());
    let frames = widget.frames();
    let (events, inbox) = mpsc::channel(16);
    let task = tokio::spawn(widget.run(inbox));

    sleep(step).await;
    log_frame("on ready", &frames.borrow().clone());

    events
        .send(WidgetEvent::AddToCart {
            card: trio_card(),
            ritual_index: None,
        })
        .await?;
    sleep(step).await;
    log_frame("after trio add", &frames.borrow().clone());

    events
        .send(WidgetEvent::AddToCart {
            card: solo_card(),
            ritual_index: None,
        })
        .await?;
    sleep(step).await;
    log_frame("after solo add", &frames.borrow().clone());

    events
        .send(WidgetEvent::RemoveFromCart { variant_id: 22 })
        .await?;
    sleep(step).await;
    log_frame("after solo remove", &frames.borrow().clone());

    drop(events);
    task.await?;

    info!("Building a gift box...");
    let mut gift = GiftBoxWidget::new(settings, client);
    for _ in 0..gift.capacity() {
        gift.add(&solo_card())?;
    }
    info!("box message: {}", gift.frame().message);

    let redirect = gift.checkout("Enjoy every one of these.").await?;
    info!("gift box checked out, redirecting to {}", redirect.url);

    Ok(())
}
