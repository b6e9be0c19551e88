use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::{
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    prelude::*,
    serialize::{self, Output, ToSql},
    sql_types::Integer,
};
use uuid::Uuid;

use crate::schema::{meals, orders};

#[derive(FromSqlRow, AsExpression, PartialEq, Copy, Clone, Debug)]
#[diesel(sql_type = Integer)]
pub enum OrderState {
    New,
    Cooking,
    Ready,
    Cancelled,
}

impl OrderState {
    pub fn code(self) -> i32 {
        match self {
            OrderState::New => 0,
            OrderState::Cooking => 1,
            OrderState::Ready => 2,
            OrderState::Cancelled => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(OrderState::New),
            1 => Some(OrderState::Cooking),
            2 => Some(OrderState::Ready),
            3 => Some(OrderState::Cancelled),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderState::New => "New",
            OrderState::Cooking => "Cooking",
            OrderState::Ready => "Ready",
            OrderState::Cancelled => "Cancelled",
        }
    }
}

impl ToSql<Integer, Pg> for OrderState {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            OrderState::New => <i32 as ToSql<Integer, Pg>>::to_sql(&0, out),
            OrderState::Cooking => <i32 as ToSql<Integer, Pg>>::to_sql(&1, out),
            OrderState::Ready => <i32 as ToSql<Integer, Pg>>::to_sql(&2, out),
            OrderState::Cancelled => <i32 as ToSql<Integer, Pg>>::to_sql(&3, out),
        }
    }
}

impl FromSql<Integer, Pg> for OrderState {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let code = <i32 as FromSql<Integer, Pg>>::from_sql(bytes)?;
        OrderState::from_code(code).ok_or_else(|| "Unrecognized order state".into())
    }
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq)]
#[diesel(table_name = meals)]
pub struct Meal {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq)]
#[diesel(belongs_to(Meal))]
#[diesel(table_name = orders)]
pub struct Order {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub price: BigDecimal,
    pub state: OrderState,
    pub created_at: DateTime<Utc>,
    pub cooking_at: Option<DateTime<Utc>>,
    pub ready_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}
