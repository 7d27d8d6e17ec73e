//! Cart route handlers.
//!
//! Carts are keyed by an opaque session identifier chosen by the client.
//! Whoever presents the identifier owns the cart; no authentication is
//! involved.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use shopcart_core::{CartItemId, ProductId, Quantity, SessionId};

use crate::error::Result;
use crate::extract::{ValidJson, ValidPath, ValidQuery};
use crate::models::CartView;
use crate::services::CartError;
use crate::state::AppState;

/// Query string of `POST /cart/add`.
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

/// Body of `POST /cart/add`.
#[derive(Debug, Deserialize)]
pub struct AddToCartInput {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

/// Body of `PUT /cart/{session_id}/item/{item_id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateCartItemInput {
    pub quantity: i64,
}

/// Acknowledgement returned by cart mutations.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

impl Message {
    const fn new(message: &'static str) -> Json<Self> {
        Json(Self { message })
    }
}

fn session(raw: &str) -> std::result::Result<SessionId, CartError> {
    Ok(SessionId::parse(raw)?)
}

fn quantity(raw: i64) -> std::result::Result<Quantity, CartError> {
    Ok(Quantity::new(raw)?)
}

/// Add a product to the session's cart, creating the cart if needed.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<SessionQuery>,
    ValidJson(input): ValidJson<AddToCartInput>,
) -> Result<Json<Message>> {
    let session_id = session(&query.session_id)?;
    let quantity = quantity(input.quantity)?;

    state
        .carts()
        .add_item(&session_id, input.product_id, quantity)
        .await?;
    Ok(Message::new("Item added to cart"))
}

/// Show the session's cart. Sessions without a cart get an empty one.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ValidPath(session_id): ValidPath<String>,
) -> Result<Json<CartView>> {
    let session_id = session(&session_id)?;
    Ok(Json(state.carts().get_cart(&session_id).await?))
}

/// Set an item's quantity.
#[instrument(skip(state))]
pub async fn update_item(
    State(state): State<AppState>,
    ValidPath((session_id, item_id)): ValidPath<(String, CartItemId)>,
    ValidJson(input): ValidJson<UpdateCartItemInput>,
) -> Result<Json<Message>> {
    let session_id = session(&session_id)?;
    let quantity = quantity(input.quantity)?;

    state
        .carts()
        .update_item(&session_id, item_id, quantity)
        .await?;
    Ok(Message::new("Cart item updated"))
}

/// Remove an item from the session's cart.
#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    ValidPath((session_id, item_id)): ValidPath<(String, CartItemId)>,
) -> Result<Json<Message>> {
    let session_id = session(&session_id)?;
    state.carts().remove_item(&session_id, item_id).await?;
    Ok(Message::new("Item removed from cart"))
}

/// Delete the session's cart. Succeeds even if there was none.
#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    ValidPath(session_id): ValidPath<String>,
) -> Result<Json<Message>> {
    let session_id = session(&session_id)?;
    state.carts().clear_cart(&session_id).await?;
    Ok(Message::new("Cart cleared"))
}
