use axum::http::StatusCode;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tera::Context;

use crate::error::AppError;
use crate::establish_connection;
use crate::store::{self, StoreError};

use super::{render, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meal", get(meal_index))
        .route("/meal/create", get(new_meal).post(create_meal))
}

#[derive(Deserialize)]
pub struct MealForm {
    name: String,
    price: String,
}

#[derive(Serialize)]
struct MealRow {
    id: String,
    name: String,
    price: String,
}

async fn meal_index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let conn = &mut establish_connection();
    let meals = store::list_meals(conn)?;

    let rows = meals
        .iter()
        .map(|meal| MealRow {
            id: meal.id.to_string(),
            name: meal.name.clone(),
            price: meal.price.to_string(),
        })
        .collect::<Vec<_>>();

    let mut ctx = Context::new();
    ctx.insert("title", "Meals");
    ctx.insert("meals", &rows);
    render(&state.templates, "meal_index.html.tera", &ctx)
}

async fn new_meal(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let ctx = form_context("", "", None, None);
    render(&state.templates, "meal_create.html.tera", &ctx)
}

async fn create_meal(
    State(state): State<AppState>,
    Form(form): Form<MealForm>,
) -> Result<Response, AppError> {
    let name = form.name.trim();
    let raw_price = form.price.trim();

    let name_error = name.is_empty().then_some("Name is required");
    let (price, price_error) = match raw_price.parse::<BigDecimal>() {
        Ok(price) => (Some(price), None),
        Err(_) if raw_price.is_empty() => (None, Some("Price is required")),
        Err(_) => (None, Some("Price must be a decimal number")),
    };

    let price = match (price, name_error) {
        (Some(price), None) => price,
        _ => return invalid_form(&state, &form, name_error, price_error),
    };

    let conn = &mut establish_connection();
    match store::create_meal(conn, name, price) {
        Ok(_) => Ok(Redirect::to("/meal").into_response()),
        Err(StoreError::EmptyMealName) => {
            invalid_form(&state, &form, Some("Name is required"), None)
        }
        Err(StoreError::NegativePrice) => {
            invalid_form(&state, &form, None, Some("Price must not be negative"))
        }
        Err(StoreError::DuplicateMealName(name)) => {
            let message = format!("Meal `{name}` already exists");
            invalid_form(&state, &form, Some(&message), None)
        }
        Err(err) => Err(err.into()),
    }
}

fn form_context(
    name: &str,
    price: &str,
    name_error: Option<&str>,
    price_error: Option<&str>,
) -> Context {
    let mut ctx = Context::new();
    ctx.insert("title", "New meal");
    ctx.insert("name", name);
    ctx.insert("price", price);
    ctx.insert("name_error", &name_error);
    ctx.insert("price_error", &price_error);
    ctx
}

fn invalid_form(
    state: &AppState,
    form: &MealForm,
    name_error: Option<&str>,
    price_error: Option<&str>,
) -> Result<Response, AppError> {
    let ctx = form_context(&form.name, &form.price, name_error, price_error);
    let page = render(&state.templates, "meal_create.html.tera", &ctx)?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}
