//! Checkout route handlers.
//!
//! The card is confirmed in the browser by Stripe.js. The server creates the
//! payment intent when the checkout page is rendered, remembers it in the
//! session, and only places an order for that same intent once the browser
//! reports that payment succeeded.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use threadline_core::models::cart::cart_total;
use tower_sessions::Session;
use tracing::instrument;

use super::cart::CartLineView;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{PageContext, RequireCustomer, set_flash};
use crate::models::{Flash, PendingPayment, session_keys};
use crate::services::checkout::place_order;
use crate::state::AppState;

/// Posted by the checkout script after Stripe confirms the card payment.
#[derive(Debug, Deserialize)]
pub struct CompleteForm {
    pub payment_intent_id: String,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub publishable_key: String,
    pub client_secret: String,
}

/// Whether the intent reported by the browser is the one issued to this session.
#[must_use]
pub fn matches_pending(pending: Option<&PendingPayment>, reported: &str) -> bool {
    pending.is_some_and(|pending| !reported.is_empty() && pending.intent_id == reported)
}

/// Render the card form for the current cart total.
#[instrument(skip(state, customer, page, session))]
pub async fn show(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    page: PageContext,
    session: Session,
) -> Result<Response> {
    let client = state.backend_for(&customer);
    let items = match client.get_cart(&customer.user_id).await {
        Ok(cart) => cart.items,
        Err(e) if e.is_not_found() => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    if items.is_empty() {
        set_flash(&session, Flash::info("Your cart is empty.")).await;
        return Ok(Redirect::to("/cart").into_response());
    }

    let total = cart_total(&items);
    let intent = client.create_payment_intent(total.to_cents()).await?;

    session
        .insert(
            session_keys::PAYMENT_INTENT,
            PendingPayment {
                intent_id: intent.id().to_string(),
                amount_cents: total.to_cents(),
            },
        )
        .await?;

    tracing::info!(amount_cents = total.to_cents(), "Payment intent created");

    Ok(CheckoutTemplate {
        page,
        lines: items.iter().map(CartLineView::from).collect(),
        total: total.display(),
        publishable_key: state.config().stripe.publishable_key.clone(),
        client_secret: intent.client_secret,
    }
    .into_response())
}

/// Place the order for a payment the browser reports as succeeded.
#[instrument(skip(state, customer, session, form))]
pub async fn complete(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    session: Session,
    Form(form): Form<CompleteForm>,
) -> Result<Redirect> {
    let pending = session
        .get::<PendingPayment>(session_keys::PAYMENT_INTENT)
        .await?;

    let pending = match pending {
        Some(pending) if matches_pending(Some(&pending), &form.payment_intent_id) => pending,
        _ => {
            tracing::warn!(
                reported = %form.payment_intent_id,
                "Checkout completion for an unknown payment intent"
            );
            set_flash(
                &session,
                Flash::error("We could not verify your payment. Please try checking out again."),
            )
            .await;
            return Ok(Redirect::to("/cart"));
        }
    };

    let client = state.backend_for(&customer);
    let items = client.get_cart(&customer.user_id).await?.items;

    let total_cents = cart_total(&items).to_cents();
    if total_cents != pending.amount_cents {
        tracing::warn!(
            paid_cents = pending.amount_cents,
            cart_cents = total_cents,
            "Cart changed after the payment intent was created"
        );
    }

    match place_order(&client, &customer.user_id, &pending.intent_id, &items).await {
        Ok(order) => {
            session.remove_value(session_keys::PAYMENT_INTENT).await?;
            session.insert(session_keys::CHECKOUT_COMPLETE, true).await?;
            add_breadcrumb(
                "checkout",
                "Order placed",
                Some(&[("order_id", order.order_id.as_str())]),
            );
        }
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Checkout failed");
            if e.order_created() {
                session.remove_value(session_keys::PAYMENT_INTENT).await?;
            }
            set_flash(&session, Flash::error(e.user_message())).await;
        }
    }

    Ok(Redirect::to("/cart"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_pending_intent() {
        let pending = PendingPayment {
            intent_id: "pi_1".to_string(),
            amount_cents: 1000,
        };
        assert!(matches_pending(Some(&pending), "pi_1"));
        assert!(!matches_pending(Some(&pending), "pi_2"));
        assert!(!matches_pending(Some(&pending), ""));
        assert!(!matches_pending(None, "pi_1"));
    }
}
