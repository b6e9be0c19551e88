use std::env;

use diesel::{Connection, PgConnection};
use dotenvy::dotenv;

pub mod error;
pub mod handlers;
pub mod models;
pub mod reload;
pub mod schema;
pub mod store;

pub fn establish_connection() -> PgConnection {
    dotenv().ok();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgConnection::establish(&database_url).unwrap()
}
