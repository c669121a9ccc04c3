use super::error::Error;
use entity::{order_items, order_status::OrderStatus, orders::*, Id};
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, DatabaseConnection, LoaderTrait, QueryOrder,
    TransactionTrait,
};

use log::*;

/// An order row together with its item rows.
pub type OrderWithItems = (Model, Vec<order_items::Model>);

/// Inserts an order and all of its items in a single transaction.
///
/// `order_model.id` is ignored; the database assigns it. Either the order and
/// every item row are committed together or nothing is.
///
/// # Errors
///
/// Returns `RecordNotFound` when the order references a restaurant that does
/// not exist, `SystemError` for any other database failure. The transaction
/// is rolled back on every error path.
pub async fn create(
    db: &DatabaseConnection,
    order_model: Model,
    items: Vec<(Id, i64)>,
) -> Result<OrderWithItems, Error> {
    debug!(
        "New Order Model to be inserted: {:?} with {} item(s)",
        order_model,
        items.len()
    );

    let txn = db.begin().await?;

    let order = ActiveModel {
        customer_id: Set(order_model.customer_id),
        restaurant_id: Set(order_model.restaurant_id),
        status: Set(order_model.status),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let item_models: Vec<order_items::Model> = items
        .into_iter()
        .map(|(item_id, quantity)| order_items::Model {
            order_id: order.id,
            item_id,
            quantity,
        })
        .collect();

    if !item_models.is_empty() {
        order_items::Entity::insert_many(
            item_models
                .iter()
                .cloned()
                .map(order_items::ActiveModel::from),
        )
        .exec_without_returning(&txn)
        .await?;
    }

    txn.commit().await?;

    info!(
        "Committed order {} for restaurant {}",
        order.id, order.restaurant_id
    );

    Ok((order, item_models))
}

/// Lists a restaurant's orders that are not closed, oldest first, each with its items.
pub async fn find_open_by_restaurant(
    db: &DatabaseConnection,
    restaurant_id: Uuid,
) -> Result<Vec<OrderWithItems>, Error> {
    let orders = Entity::find()
        .filter(Column::RestaurantId.eq(restaurant_id))
        .filter(Column::Status.ne(OrderStatus::Closed))
        .order_by_asc(Column::Id)
        .all(db)
        .await?;

    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let items = orders.load_many(order_items::Entity, db).await?;

    Ok(orders.into_iter().zip(items).collect())
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn restaurant_id() -> Uuid {
        Uuid::parse_str("6f1d5e36-0c39-4b0a-9f5c-3a57b2a2b0e1").unwrap()
    }

    fn order(id: Id, status: OrderStatus) -> Model {
        Model {
            id,
            customer_id: 77,
            restaurant_id: restaurant_id(),
            status,
        }
    }

    #[tokio::test]
    async fn create_returns_the_committed_order_and_items() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![order(12, OrderStatus::Placed)]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();

        let (created, items) = create(
            &db,
            order(0, OrderStatus::Placed),
            vec![(42, 2), (43, 1)],
        )
        .await?;

        assert_eq!(created.id, 12);
        assert_eq!(created.restaurant_id, restaurant_id());
        assert_eq!(
            items,
            vec![
                order_items::Model {
                    order_id: 12,
                    item_id: 42,
                    quantity: 2
                },
                order_items::Model {
                    order_id: 12,
                    item_id: 43,
                    quantity: 1
                },
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_fails_without_an_order_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors(vec![DbErr::Custom("insert failed".to_owned())])
            .into_connection();

        let result = create(&db, order(0, OrderStatus::Placed), vec![(42, 2)]).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn find_open_by_restaurant_attaches_items_to_each_order() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![
                order(1, OrderStatus::Placed),
                order(2, OrderStatus::Ready),
            ]])
            .append_query_results(vec![vec![
                order_items::Model {
                    order_id: 1,
                    item_id: 42,
                    quantity: 2,
                },
                order_items::Model {
                    order_id: 2,
                    item_id: 7,
                    quantity: 1,
                },
            ]])
            .into_connection();

        let orders = find_open_by_restaurant(&db, restaurant_id()).await?;

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].0.id, 1);
        assert_eq!(orders[0].1[0].item_id, 42);
        assert_eq!(orders[1].0.id, 2);
        assert_eq!(orders[1].1[0].item_id, 7);

        Ok(())
    }

    #[tokio::test]
    async fn find_open_by_restaurant_returns_nothing_for_a_quiet_restaurant() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        let orders = find_open_by_restaurant(&db, restaurant_id()).await?;
        assert!(orders.is_empty());

        Ok(())
    }
}
