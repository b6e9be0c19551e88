use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tera::Context;
use uuid::Uuid;

use crate::error::AppError;
use crate::establish_connection;
use crate::models::{Meal, Order, OrderState};
use crate::store::{self, RECENT_ORDERS_LIMIT};

use super::{render, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(hall))
        .route("/hall", get(hall))
        .route("/kitchen", get(kitchen))
        .route("/order/create", get(new_order).post(create_order))
        .route(
            "/order/set_state/{order_id}/{state}/{referrer}",
            get(set_state),
        )
}

#[derive(Serialize)]
struct ActionButton {
    title: &'static str,
    action: i32,
    referrer: &'static str,
}

#[derive(Serialize)]
struct OrderRow {
    id: String,
    meal_name: String,
    price: String,
    state_label: &'static str,
    created_at: String,
    cooking_at: String,
    ready_at: String,
}

#[derive(Serialize)]
struct MealChoice {
    id: String,
    name: String,
}

#[derive(Deserialize)]
pub struct OrderForm {
    meal_id: Uuid,
}

const TIMESTAMP_FORMAT: &str = "%d.%m.%y %H:%M:%S";

fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(t) => t.format(TIMESTAMP_FORMAT).to_string(),
        None => "—".to_string(),
    }
}

fn order_row(order: &Order, meal: &Meal) -> OrderRow {
    OrderRow {
        id: order.id.to_string(),
        meal_name: meal.name.clone(),
        price: order.price.to_string(),
        state_label: order.state.label(),
        created_at: format_timestamp(Some(order.created_at)),
        cooking_at: format_timestamp(order.cooking_at),
        ready_at: format_timestamp(order.ready_at),
    }
}

fn order_index(
    state: &AppState,
    title: &str,
    buttons: &[ActionButton],
) -> Result<Html<String>, AppError> {
    let conn = &mut establish_connection();
    let orders = store::list_recent_orders(conn, RECENT_ORDERS_LIMIT)?;
    let rows = orders
        .iter()
        .map(|(order, meal)| order_row(order, meal))
        .collect::<Vec<_>>();

    let mut ctx = Context::new();
    ctx.insert("title", title);
    ctx.insert("orders", &rows);
    ctx.insert("buttons", buttons);
    render(&state.templates, "order_index.html.tera", &ctx)
}

async fn hall(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let buttons = [ActionButton {
        title: "Cancel",
        action: OrderState::Cancelled.code(),
        referrer: "hall",
    }];
    order_index(&state, "Hall", &buttons)
}

async fn kitchen(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let buttons = [
        ActionButton {
            title: "In progress",
            action: OrderState::Cooking.code(),
            referrer: "kitchen",
        },
        ActionButton {
            title: "Ready",
            action: OrderState::Ready.code(),
            referrer: "kitchen",
        },
    ];
    order_index(&state, "Kitchen", &buttons)
}

async fn new_order(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let conn = &mut establish_connection();
    let meals = store::list_meals(conn)?;
    let choices = meals
        .iter()
        .map(|meal| MealChoice {
            id: meal.id.to_string(),
            name: meal.name.clone(),
        })
        .collect::<Vec<_>>();

    let mut ctx = Context::new();
    ctx.insert("title", "Place an order");
    ctx.insert("meals", &choices);
    render(&state.templates, "order_create.html.tera", &ctx)
}

async fn create_order(
    State(state): State<AppState>,
    Form(form): Form<OrderForm>,
) -> Result<Response, AppError> {
    let conn = &mut establish_connection();
    store::create_order(conn, form.meal_id)?;
    state.reload.notify_all();
    Ok(Redirect::to("/hall").into_response())
}

async fn set_state(
    State(state): State<AppState>,
    Path((order_id, code, referrer)): Path<(Uuid, i32, String)>,
) -> Result<Response, AppError> {
    let new_state = OrderState::from_code(code).ok_or(AppError::UnknownOrderState(code))?;

    let conn = &mut establish_connection();
    store::set_order_state(conn, order_id, new_state)?;
    state.reload.notify_all();
    Ok(Redirect::to(referrer_target(&referrer)).into_response())
}

fn referrer_target(referrer: &str) -> &'static str {
    match referrer {
        "kitchen" => "/kitchen",
        _ => "/hall",
    }
}
