//! Order access rules.

use orynal_core::models::auth::Role;
use orynal_core::models::order::{NewOrder, Order, OrderStatus, OrderUpdate};
use orynal_core::store::RestaurantStore;
use sqlx::PgPool;

use super::ownership::{AdminPolicy, require_ownership};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;

/// What the caller wants to do with an existing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Read,
    Update,
    Delete,
}

/// Decide whether `user` may perform `action` on `order`.
///
/// Guests reach only their own orders and cannot edit them once canceled or
/// completed. Owners reach orders of restaurants they own. Admins reach all.
pub async fn authorize(
    restaurants: &dyn RestaurantStore,
    user: &CurrentUser,
    order: &Order,
    action: OrderAction,
) -> AppResult<()> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Owner => {
            require_ownership(restaurants, user, order.restaurant_id, AdminPolicy::Bypass).await?;
            Ok(())
        }
        Role::User => {
            if order.user_id != user.user_id {
                return Err(AppError::Forbidden("not your order".into()));
            }
            if action == OrderAction::Update && order.status.is_final() {
                return Err(AppError::Validation(format!(
                    "order is {} and can no longer be changed",
                    order.status
                )));
            }
            Ok(())
        }
    }
}

/// Check that a new order references a table and menu items of the
/// restaurant it is placed at.
pub async fn validate_new_order(pool: &PgPool, order: &NewOrder) -> AppResult<()> {
    check_total_sum(order.total_sum)?;
    super::restaurants::require_restaurant(pool, order.restaurant_id).await?;
    if orynal_core::tables::get_table(pool, order.restaurant_id, order.table_id)
        .await?
        .is_none()
    {
        return Err(AppError::Validation(format!(
            "table {} does not belong to restaurant {}",
            order.table_id, order.restaurant_id
        )));
    }

    let mut foods = order.foods.clone();
    foods.sort_unstable();
    foods.dedup();
    let on_menu = orynal_core::menu::count_menu_items(pool, order.restaurant_id, &foods).await?;
    if on_menu != foods.len() as i64 {
        return Err(AppError::Validation(
            "order contains items that are not on the menu".into(),
        ));
    }
    Ok(())
}

fn check_total_sum(total_sum: f64) -> AppResult<()> {
    if !total_sum.is_finite() || total_sum < 0.0 {
        return Err(AppError::Validation("totalSum must not be negative".into()));
    }
    Ok(())
}

/// Check the fields of an order update that can be judged without the
/// database.
pub fn validate_order_update(update: &OrderUpdate) -> AppResult<()> {
    match update.total_sum {
        Some(total_sum) => check_total_sum(total_sum),
        None => Ok(()),
    }
}

/// Guests may only cancel; confirming and completing is up to the restaurant.
pub fn check_status_change(user: &CurrentUser, update: &OrderUpdate) -> AppResult<()> {
    match update.status {
        Some(status) if user.role == Role::User && status != OrderStatus::Canceled => Err(
            AppError::Forbidden(format!("guests cannot mark an order as {status}")),
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use orynal_core::models::order::OrderStatus;
    use orynal_core::store::MemoryStore;

    use super::*;

    fn order(restaurant_id: i64, user_id: i64, status: OrderStatus) -> Order {
        Order {
            id: 1,
            restaurant_id,
            table_id: 1,
            user_id,
            total_sum: 50.0,
            date: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(19, 0, 0)
                .unwrap(),
            status,
            foods: vec![],
        }
    }

    fn user(user_id: i64, role: Role) -> CurrentUser {
        CurrentUser { user_id, role }
    }

    #[tokio::test]
    async fn guest_reaches_own_order_only() {
        let store = MemoryStore::new();
        let placed = order(1, 5, OrderStatus::Pending);
        assert!(
            authorize(&store, &user(5, Role::User), &placed, OrderAction::Read)
                .await
                .is_ok()
        );
        let err = authorize(&store, &user(6, Role::User), &placed, OrderAction::Read)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn guest_cannot_edit_final_orders() {
        let store = MemoryStore::new();
        for status in [OrderStatus::Canceled, OrderStatus::Completed] {
            let placed = order(1, 5, status);
            let err = authorize(&store, &user(5, Role::User), &placed, OrderAction::Update)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
            assert!(
                authorize(&store, &user(5, Role::User), &placed, OrderAction::Delete)
                    .await
                    .is_ok()
            );
        }
    }

    #[tokio::test]
    async fn owner_reaches_orders_of_own_restaurant() {
        let store = MemoryStore::new();
        let mine = store.insert_restaurant(20);
        let theirs = store.insert_restaurant(21);
        let owner = user(20, Role::Owner);

        let placed = order(mine, 5, OrderStatus::Completed);
        assert!(
            authorize(&store, &owner, &placed, OrderAction::Update)
                .await
                .is_ok()
        );

        let elsewhere = order(theirs, 5, OrderStatus::Pending);
        let err = authorize(&store, &owner, &elsewhere, OrderAction::Read)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn admin_reaches_everything() {
        let store = MemoryStore::new();
        let placed = order(99, 5, OrderStatus::Canceled);
        assert!(
            authorize(&store, &user(1, Role::Admin), &placed, OrderAction::Update)
                .await
                .is_ok()
        );
    }

    #[test]
    fn guests_may_only_cancel() {
        let cancel = OrderUpdate {
            status: Some(OrderStatus::Canceled),
            ..OrderUpdate::default()
        };
        let confirm = OrderUpdate {
            status: Some(OrderStatus::Confirmed),
            ..OrderUpdate::default()
        };
        let guest = user(5, Role::User);
        assert!(check_status_change(&guest, &cancel).is_ok());
        assert!(check_status_change(&guest, &OrderUpdate::default()).is_ok());
        assert!(matches!(
            check_status_change(&guest, &confirm),
            Err(AppError::Forbidden(_))
        ));
        assert!(check_status_change(&user(20, Role::Owner), &confirm).is_ok());
    }

    #[test]
    fn updated_total_sum_must_be_a_non_negative_number() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let update = OrderUpdate {
                total_sum: Some(bad),
                ..OrderUpdate::default()
            };
            assert!(
                matches!(validate_order_update(&update), Err(AppError::Validation(_))),
                "totalSum={bad}"
            );
        }
        let update = OrderUpdate {
            total_sum: Some(0.0),
            ..OrderUpdate::default()
        };
        assert!(validate_order_update(&update).is_ok());
        assert!(validate_order_update(&OrderUpdate::default()).is_ok());
    }
}
