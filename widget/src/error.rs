use storefront::StorefrontError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("cart request failed: {0}")]
    Network(#[from] StorefrontError),

    #[error("you can only add {capacity} items to your gift box")]
    BoxFull { capacity: usize },

    #[error("please enter a message before proceeding to checkout")]
    NoteRequired,

    #[error("gift box product not configured")]
    GiftProductUnconfigured,

    #[error("product {handle} has no variants")]
    NoVariant { handle: String },
}

impl WidgetError {
    /// Validation failures are surfaced to the shopper; network failures
    /// are logged and the previous view is retained.
    pub fn is_validation(&self) -> bool {
        !matches!(self, WidgetError::Network(_))
    }
}
