use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::{prelude::*, Connection, PgConnection};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Meal, Order, OrderState};
use crate::schema;

pub const RECENT_ORDERS_LIMIT: i64 = 20;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Meal name must not be empty")]
    EmptyMealName,
    #[error("Meal price must not be negative")]
    NegativePrice,
    #[error("Meal `{0}` already exists")]
    DuplicateMealName(String),
    #[error("Meal {0} does not exist")]
    MealNotFound(Uuid),
    #[error("Order {0} does not exist")]
    OrderNotFound(Uuid),
    #[error("Meal {0} is referenced by existing orders")]
    MealInUse(Uuid),
    #[error("Unexpected internal error")]
    Database(#[from] diesel::result::Error),
}

pub fn list_meals(conn: &mut PgConnection) -> Result<Vec<Meal>, StoreError> {
    let meals = schema::meals::table.select(Meal::as_select()).load(conn)?;
    Ok(meals)
}

pub fn create_meal(
    conn: &mut PgConnection,
    name: &str,
    price: BigDecimal,
) -> Result<Meal, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::EmptyMealName);
    }
    if price < BigDecimal::from(0) {
        return Err(StoreError::NegativePrice);
    }

    let meal = Meal {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price,
    };
    match diesel::insert_into(schema::meals::table)
        .values(&meal)
        .execute(conn)
    {
        Ok(_) => Ok(meal),
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => Err(StoreError::DuplicateMealName(meal.name)),
        Err(err) => Err(err.into()),
    }
}

pub fn delete_meal(conn: &mut PgConnection, meal_id: Uuid) -> Result<(), StoreError> {
    conn.transaction(|conn| {
        let referencing = schema::orders::table
            .filter(schema::orders::meal_id.eq(meal_id))
            .count()
            .get_result::<i64>(conn)?;
        if referencing > 0 {
            return Err(StoreError::MealInUse(meal_id));
        }

        let deleted = diesel::delete(schema::meals::table.find(meal_id)).execute(conn)?;
        if deleted == 0 {
            return Err(StoreError::MealNotFound(meal_id));
        }
        Ok(())
    })
}

pub fn list_recent_orders(
    conn: &mut PgConnection,
    limit: i64,
) -> Result<Vec<(Order, Meal)>, StoreError> {
    let orders = schema::orders::table
        .inner_join(schema::meals::table)
        .select((Order::as_select(), Meal::as_select()))
        .order(schema::orders::created_at.desc())
        .limit(limit)
        .load(conn)?;
    Ok(orders)
}

pub fn create_order(conn: &mut PgConnection, meal_id: Uuid) -> Result<Order, StoreError> {
    conn.transaction(|conn| {
        let meal = schema::meals::table
            .find(meal_id)
            .select(Meal::as_select())
            .first(conn)
            .optional()?
            .ok_or(StoreError::MealNotFound(meal_id))?;

        let order = Order {
            id: Uuid::new_v4(),
            meal_id: meal.id,
            price: meal.price,
            state: OrderState::New,
            created_at: Utc::now(),
            cooking_at: None,
            ready_at: None,
            cancelled_at: None,
        };
        diesel::insert_into(schema::orders::table)
            .values(&order)
            .execute(conn)?;
        Ok(order)
    })
}

/// Applies the state unconditionally; a transition to cooking, ready or
/// cancelled re-stamps its timestamp every time it fires, not only the first.
pub fn set_order_state(
    conn: &mut PgConnection,
    order_id: Uuid,
    new_state: OrderState,
) -> Result<Order, StoreError> {
    let now = Utc::now();
    let updated = match new_state {
        OrderState::New => diesel::update(schema::orders::table.find(order_id))
            .set(schema::orders::state.eq(new_state))
            .returning(Order::as_returning())
            .get_result(conn),
        OrderState::Cooking => diesel::update(schema::orders::table.find(order_id))
            .set((
                schema::orders::state.eq(new_state),
                schema::orders::cooking_at.eq(now),
            ))
            .returning(Order::as_returning())
            .get_result(conn),
        OrderState::Ready => diesel::update(schema::orders::table.find(order_id))
            .set((
                schema::orders::state.eq(new_state),
                schema::orders::ready_at.eq(now),
            ))
            .returning(Order::as_returning())
            .get_result(conn),
        OrderState::Cancelled => diesel::update(schema::orders::table.find(order_id))
            .set((
                schema::orders::state.eq(new_state),
                schema::orders::cancelled_at.eq(now),
            ))
            .returning(Order::as_returning())
            .get_result(conn),
    };

    updated
        .optional()?
        .ok_or(StoreError::OrderNotFound(order_id))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::establish_connection;

    fn setup_database() -> PgConnection {
        let mut conn = establish_connection();
        diesel::delete(schema::orders::table)
            .execute(&mut conn)
            .unwrap();
        diesel::delete(schema::meals::table)
            .execute(&mut conn)
            .unwrap();
        conn
    }

    fn price(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    #[test]
    #[ignore = "requires a migrated Postgres database via DATABASE_URL"]
    fn create_meal_persists_name_and_price() {
        let conn = &mut setup_database();

        let meal = create_meal(conn, "Борщ", price("250.00")).unwrap();
        assert_eq!(meal.name, "Борщ");
        assert_eq!(meal.price, price("250.00"));

        let meals = list_meals(conn).unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0], meal);
    }

    #[test]
    #[ignore = "requires a migrated Postgres database via DATABASE_URL"]
    fn create_meal_rejects_empty_name() {
        let conn = &mut setup_database();

        let result = create_meal(conn, "   ", price("10.00"));
        assert!(matches!(result, Err(StoreError::EmptyMealName)));
        assert!(list_meals(conn).unwrap().is_empty());
    }

    #[test]
    #[ignore = "requires a migrated Postgres database via DATABASE_URL"]
    fn create_meal_rejects_negative_price() {
        let conn = &mut setup_database();

        let result = create_meal(conn, "Борщ", price("-1.00"));
        assert!(matches!(result, Err(StoreError::NegativePrice)));
        assert!(list_meals(conn).unwrap().is_empty());
    }

    #[test]
    #[ignore = "requires a migrated Postgres database via DATABASE_URL"]
    fn create_meal_rejects_duplicate_name() {
        let conn = &mut setup_database();

        create_meal(conn, "Борщ", price("250.00")).unwrap();
        let result = create_meal(conn, "Борщ", price("300.00"));
        assert!(matches!(result, Err(StoreError::DuplicateMealName(_))));

        let meals = list_meals(conn).unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].price, price("250.00"));
    }

    #[test]
    #[ignore = "requires a migrated Postgres database via DATABASE_URL"]
    fn create_order_snapshots_price() {
        let conn = &mut setup_database();

        let meal = create_meal(conn, "Борщ", price("250.00")).unwrap();
        let order = create_order(conn, meal.id).unwrap();

        assert_eq!(order.price, price("250.00"));
        assert_eq!(order.state, OrderState::New);
        assert_eq!(order.cooking_at, None);
        assert_eq!(order.ready_at, None);
        assert_eq!(order.cancelled_at, None);
    }

    #[test]
    #[ignore = "requires a migrated Postgres database via DATABASE_URL"]
    fn create_order_unknown_meal() {
        let conn = &mut setup_database();

        let result = create_order(conn, Uuid::new_v4());
        assert!(matches!(result, Err(StoreError::MealNotFound(_))));
        assert!(list_recent_orders(conn, RECENT_ORDERS_LIMIT)
            .unwrap()
            .is_empty());
    }

    #[test]
    #[ignore = "requires a migrated Postgres database via DATABASE_URL"]
    fn set_order_state_stamps_and_overwrites_cooking_at() {
        let conn = &mut setup_database();

        let meal = create_meal(conn, "Борщ", price("250.00")).unwrap();
        let order = create_order(conn, meal.id).unwrap();

        let cooking = set_order_state(conn, order.id, OrderState::Cooking).unwrap();
        assert_eq!(cooking.state, OrderState::Cooking);
        let first = cooking.cooking_at.unwrap();
        assert!(first >= order.created_at);

        std::thread::sleep(Duration::from_millis(10));
        let again = set_order_state(conn, order.id, OrderState::Cooking).unwrap();
        assert!(again.cooking_at.unwrap() > first);
    }

    #[test]
    #[ignore = "requires a migrated Postgres database via DATABASE_URL"]
    fn set_order_state_ready_and_cancelled() {
        let conn = &mut setup_database();

        let meal = create_meal(conn, "Борщ", price("250.00")).unwrap();
        let order = create_order(conn, meal.id).unwrap();

        let ready = set_order_state(conn, order.id, OrderState::Ready).unwrap();
        assert_eq!(ready.state, OrderState::Ready);
        assert!(ready.ready_at.is_some());
        assert_eq!(ready.cooking_at, None);

        let cancelled = set_order_state(conn, order.id, OrderState::Cancelled).unwrap();
        assert_eq!(cancelled.state, OrderState::Cancelled);
        assert!(cancelled.cancelled_at.is_some());
        assert!(cancelled.ready_at.is_some());
    }

    #[test]
    #[ignore = "requires a migrated Postgres database via DATABASE_URL"]
    fn set_order_state_unknown_order() {
        let conn = &mut setup_database();

        let result = set_order_state(conn, Uuid::new_v4(), OrderState::Cooking);
        assert!(matches!(result, Err(StoreError::OrderNotFound(_))));
    }

    #[test]
    #[ignore = "requires a migrated Postgres database via DATABASE_URL"]
    fn list_recent_orders_caps_and_sorts() {
        let conn = &mut setup_database();

        let meal = create_meal(conn, "Борщ", price("250.00")).unwrap();
        for _ in 0..25 {
            create_order(conn, meal.id).unwrap();
        }

        let orders = list_recent_orders(conn, RECENT_ORDERS_LIMIT).unwrap();
        assert_eq!(orders.len(), 20);
        for pair in orders.windows(2) {
            assert!(pair[0].0.created_at >= pair[1].0.created_at);
        }
    }

    #[test]
    #[ignore = "requires a migrated Postgres database via DATABASE_URL"]
    fn delete_meal_refuses_while_referenced() {
        let conn = &mut setup_database();

        let meal = create_meal(conn, "Борщ", price("250.00")).unwrap();
        create_order(conn, meal.id).unwrap();

        let result = delete_meal(conn, meal.id);
        assert!(matches!(result, Err(StoreError::MealInUse(_))));
        assert_eq!(list_meals(conn).unwrap().len(), 1);
    }

    #[test]
    #[ignore = "requires a migrated Postgres database via DATABASE_URL"]
    fn delete_meal_removes_unreferenced_meal() {
        let conn = &mut setup_database();

        let meal = create_meal(conn, "Борщ", price("250.00")).unwrap();
        delete_meal(conn, meal.id).unwrap();
        assert!(list_meals(conn).unwrap().is_empty());

        let result = delete_meal(conn, meal.id);
        assert!(matches!(result, Err(StoreError::MealNotFound(_))));
    }
}
