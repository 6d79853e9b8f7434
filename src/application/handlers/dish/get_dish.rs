//! Dish queries.

use std::sync::Arc;

use crate::application::handlers::visibility::{
    ensure_child_visible, listing_scope, visible_cafe, CrossCafeFilter,
};
use crate::domain::catalog::Dish;
use crate::domain::foundation::{CafeId, CommandMetadata, DishId, ReadScope, ServiceError};
use crate::ports::CatalogReader;

#[derive(Debug, Clone)]
pub struct GetDishQuery {
    pub dish_id: DishId,
}

/// Dishes of one cafe, or of every cafe.
#[derive(Debug, Clone, Default)]
pub struct ListDishesQuery {
    pub cafe_id: Option<CafeId>,
    pub show_all: bool,
}

pub struct GetDishHandler {
    reader: Arc<dyn CatalogReader>,
}

impl GetDishHandler {
    pub fn new(reader: Arc<dyn CatalogReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: GetDishQuery,
        metadata: CommandMetadata,
    ) -> Result<Dish, ServiceError> {
        let actor = &metadata.actor;
        let not_found = || ServiceError::not_found_ids("Dish", [query.dish_id]);
        let dish = self.reader.get_dish(query.dish_id).await?.ok_or_else(not_found)?;
        let cafe = self.reader.get_cafe(dish.cafe_id).await?.ok_or_else(not_found)?;
        ensure_child_visible(actor, &cafe, dish.active, "Dish", dish.id)?;
        Ok(dish)
    }
}

pub struct ListDishesHandler {
    reader: Arc<dyn CatalogReader>,
}

impl ListDishesHandler {
    pub fn new(reader: Arc<dyn CatalogReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: ListDishesQuery,
        metadata: CommandMetadata,
    ) -> Result<Vec<Dish>, ServiceError> {
        let actor = &metadata.actor;
        match query.cafe_id {
            Some(cafe_id) => {
                let cafe = visible_cafe(actor, cafe_id, self.reader.get_cafe(cafe_id).await?)?;
                let scope = listing_scope(actor, cafe.id, query.show_all);
                Ok(self.reader.list_dishes(Some(cafe.id), scope).await?)
            }
            None => {
                let cafes = self.reader.list_cafes(ReadScope::All).await?;
                let filter = CrossCafeFilter::new(actor, &cafes, query.show_all);
                Ok(self
                    .reader
                    .list_dishes(None, ReadScope::All)
                    .await?
                    .into_iter()
                    .filter(|d| filter.admits(d.cafe_id, d.active))
                    .collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::World;
    use crate::domain::catalog::NewDish;
    use crate::ports::TransactionManager;

    async fn add_dish(world: &World, cafe_id: CafeId, name: &str, active: bool) -> Dish {
        let mut uow = world.store.begin().await.unwrap();
        let mut dish = uow
            .insert_dish(NewDish {
                cafe_id,
                name: name.to_string(),
                price: 100,
                description: None,
            })
            .await
            .unwrap();
        if !active {
            dish.active = false;
            uow.update_dish(&dish).await.unwrap();
        }
        uow.commit().await.unwrap();
        dish
    }

    #[tokio::test]
    async fn dish_of_closed_cafe_is_not_found_for_customer() {
        let world = World::new().await;
        let dish = add_dish(&world, world.closed_cafe, "Okroshka", true).await;
        let handler = GetDishHandler::new(world.store.clone());

        let result = handler
            .handle(GetDishQuery { dish_id: dish.id }, world.as_customer())
            .await;
        assert_eq!(result, Err(ServiceError::not_found_ids("Dish", [dish.id])));
    }

    #[tokio::test]
    async fn listing_across_cafes_hides_inactive_for_customers() {
        let world = World::new().await;
        add_dish(&world, world.cafe, "Kompot", false).await;
        add_dish(&world, world.closed_cafe, "Okroshka", true).await;
        let handler = ListDishesHandler::new(world.store.clone());

        let customer = handler
            .handle(
                ListDishesQuery {
                    cafe_id: None,
                    show_all: true,
                },
                world.as_customer(),
            )
            .await
            .unwrap();
        assert_eq!(customer.len(), 1);
        assert_eq!(customer[0].id, world.dish);

        let manager = handler
            .handle(
                ListDishesQuery {
                    cafe_id: None,
                    show_all: true,
                },
                world.as_manager(),
            )
            .await
            .unwrap();
        assert_eq!(manager.len(), 3);
    }

    #[tokio::test]
    async fn single_cafe_listing_needs_show_all_for_inactive() {
        let world = World::new().await;
        add_dish(&world, world.cafe, "Kompot", false).await;
        let handler = ListDishesHandler::new(world.store.clone());

        let default = handler
            .handle(
                ListDishesQuery {
                    cafe_id: Some(world.cafe),
                    show_all: false,
                },
                world.as_manager(),
            )
            .await
            .unwrap();
        assert_eq!(default.len(), 1);

        let all = handler
            .handle(
                ListDishesQuery {
                    cafe_id: Some(world.cafe),
                    show_all: true,
                },
                world.as_manager(),
            )
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }
}
