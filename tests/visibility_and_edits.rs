//! Inactive resources stay hidden from ordinary actors, and past bookings
//! are frozen for everyone.

mod common;

use std::collections::BTreeSet;

use cafe_booking::application::handlers::{
    CreateDishCommand, GetTableQuery, ListCafesQuery, ListDishesQuery, ListTablesQuery,
    ListTimeSlotsQuery, UpdateBookingCommand, UpdateCafeCommand, UpdateTableCommand,
};
use cafe_booking::domain::booking::{BookingPatch, NewBooking};
use cafe_booking::domain::catalog::{CafePatch, NewDish, TablePatch};
use cafe_booking::domain::foundation::{Actor, CommandMetadata, Patch, ServiceError};
use cafe_booking::ports::TransactionManager;

use common::{day, set, Chain};

async fn hide_table(chain: &Chain) {
    chain
        .services
        .update_table
        .handle(
            UpdateTableCommand {
                cafe_id: chain.cafe,
                table_id: chain.t2,
                patch: TablePatch {
                    active: Patch::Set(false),
                    ..TablePatch::default()
                },
            },
            chain.as_user(chain.manager).await,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn customers_never_list_inactive_tables() {
    let chain = Chain::new().await;
    hide_table(&chain).await;

    for metadata in [
        chain.as_user(chain.alice).await,
        CommandMetadata::new(Actor::anonymous()),
    ] {
        let tables = chain
            .services
            .list_tables
            .handle(ListTablesQuery { cafe_id: chain.cafe }, metadata.clone())
            .await
            .unwrap();
        assert!(tables.iter().all(|t| t.active));
        assert_eq!(tables.len(), 1);

        let detail = chain
            .services
            .get_table
            .handle(
                GetTableQuery {
                    cafe_id: chain.cafe,
                    table_id: chain.t2,
                },
                metadata,
            )
            .await;
        assert!(matches!(detail, Err(ServiceError::NotFound { .. })));
    }

    let managed = chain
        .services
        .list_tables
        .handle(
            ListTablesQuery { cafe_id: chain.cafe },
            chain.as_user(chain.manager).await,
        )
        .await
        .unwrap();
    assert_eq!(managed.len(), 2);
}

#[tokio::test]
async fn closing_a_cafe_hides_it_and_its_children() {
    let chain = Chain::new().await;
    chain
        .services
        .create_dish
        .handle(
            CreateDishCommand {
                dish: NewDish {
                    cafe_id: chain.cafe,
                    name: "Syrniki".to_string(),
                    price: 350,
                    description: None,
                },
            },
            chain.as_user(chain.manager).await,
        )
        .await
        .unwrap();
    chain
        .services
        .update_cafe
        .handle(
            UpdateCafeCommand {
                cafe_id: chain.cafe,
                patch: CafePatch {
                    active: Patch::Set(false),
                    ..CafePatch::default()
                },
            },
            chain.as_user(chain.admin).await,
        )
        .await
        .unwrap();
    let alice = chain.as_user(chain.alice).await;

    let cafes = chain
        .services
        .list_cafes
        .handle(ListCafesQuery { show_all: true }, alice.clone())
        .await
        .unwrap();
    assert!(cafes.is_empty());

    let slots = chain
        .services
        .list_time_slots
        .handle(
            ListTimeSlotsQuery {
                cafe_id: chain.cafe,
                date: Some(day(10)),
            },
            alice.clone(),
        )
        .await;
    assert!(matches!(slots, Err(ServiceError::NotFound { .. })));

    let dishes = chain
        .services
        .list_dishes
        .handle(
            ListDishesQuery {
                cafe_id: None,
                show_all: true,
            },
            alice,
        )
        .await
        .unwrap();
    assert!(dishes.is_empty());

    let booking = chain.book(chain.bob, &[chain.t1], &[chain.s1], 2).await;
    assert!(matches!(booking, Err(ServiceError::NotFound { .. })));

    let admin_view = chain
        .services
        .list_cafes
        .handle(ListCafesQuery { show_all: true }, chain.as_user(chain.admin).await)
        .await
        .unwrap();
    assert_eq!(admin_view.len(), 1);
    assert!(!admin_view[0].active);
}

#[tokio::test]
async fn past_booking_is_frozen_even_for_superuser() {
    let chain = Chain::new().await;
    let past = {
        let mut uow = chain.store.begin().await.unwrap();
        let booking = uow
            .insert_booking(NewBooking {
                user_id: chain.alice,
                cafe_id: chain.cafe,
                booking_date: day(3),
                guests_number: 2,
                note: None,
                table_ids: set(&[chain.t1]),
                slot_ids: set(&[chain.s3]),
                dish_ids: BTreeSet::new(),
            })
            .await
            .unwrap();
        uow.commit().await.unwrap();
        booking
    };

    for user in [chain.alice, chain.manager, chain.admin] {
        let result = chain
            .services
            .update_booking
            .handle(
                UpdateBookingCommand {
                    booking_id: past.id,
                    patch: BookingPatch {
                        note: Patch::Set(Some("late".to_string())),
                        ..BookingPatch::default()
                    },
                },
                chain.as_user(user).await,
            )
            .await;
        assert!(
            matches!(result, Err(ServiceError::Validation { ref field, .. }) if field == "booking_date"),
            "user {} got {:?}",
            user,
            result
        );
    }
}
