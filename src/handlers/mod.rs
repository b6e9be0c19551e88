pub mod events;
pub mod meal;
pub mod order;

pub use events::router as events_router;
pub use meal::router as meal_router;
pub use order::router as order_router;

use axum::response::Html;
use tera::{Context, Tera};

use crate::error::AppError;
use crate::reload::ReloadHub;

#[derive(Clone)]
pub struct AppState {
    pub templates: Tera,
    pub reload: ReloadHub,
}

pub(crate) fn render(
    templates: &Tera,
    template: &str,
    ctx: &Context,
) -> Result<Html<String>, AppError> {
    Ok(Html(templates.render(template, ctx)?))
}
