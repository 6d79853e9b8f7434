//! Shared fixture for integration tests.
//!
//! Builds a chain through the public handlers over the in-memory store,
//! with the clock stopped at 2025-01-05 12:00.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use cafe_booking::adapters::{FixedClock, InMemoryStore};
use cafe_booking::application::handlers::{
    CreateBookingCommand, CreateCafeCommand, CreateTableCommand, CreateTimeSlotCommand,
};
use cafe_booking::application::{Ports, RetryPolicy, Services};
use cafe_booking::domain::booking::Booking;
use cafe_booking::domain::catalog::{NewCafe, NewTable};
use cafe_booking::domain::foundation::{
    CafeId, CommandMetadata, ServiceError, SlotId, TableId, UserId,
};
use cafe_booking::domain::user::User;

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

pub fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn set<T: Ord + Copy>(items: &[T]) -> BTreeSet<T> {
    items.iter().copied().collect()
}

pub struct Chain {
    pub store: Arc<InMemoryStore>,
    pub services: Arc<Services>,
    pub admin: UserId,
    pub manager: UserId,
    pub alice: UserId,
    pub bob: UserId,
    pub cafe: CafeId,
    /// 4 seats.
    pub t1: TableId,
    /// 2 seats.
    pub t2: TableId,
    /// Jan 10, 18:00-19:00.
    pub s1: SlotId,
    /// Jan 10, 19:00-20:00.
    pub s2: SlotId,
    /// Jan 11, 18:00-19:00.
    pub s3: SlotId,
}

async fn register(store: &InMemoryStore, name: &str, is_superuser: bool) -> UserId {
    store
        .add_user(User {
            id: UserId::new(0),
            username: name.to_string(),
            phone: format!("+1555{:04}", name.len()),
            email: None,
            is_superuser,
            active: true,
            managed_cafe_ids: BTreeSet::new(),
        })
        .await
        .id
}

impl Chain {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(FixedClock::new(day(5).and_time(at(12, 0))));
        let services = Arc::new(Services::new(
            Ports::in_memory(store.clone(), clock),
            RetryPolicy::default(),
        ));

        let admin = register(&store, "admin", true).await;
        let manager = register(&store, "manager", false).await;
        let alice = register(&store, "alice", false).await;
        let bob = register(&store, "bob", false).await;

        let mut chain = Self {
            store,
            services,
            admin,
            manager,
            alice,
            bob,
            cafe: CafeId::new(0),
            t1: TableId::new(0),
            t2: TableId::new(0),
            s1: SlotId::new(0),
            s2: SlotId::new(0),
            s3: SlotId::new(0),
        };

        chain.cafe = chain.add_cafe("Central", &[manager]).await;
        chain.t1 = chain.add_table(chain.cafe, 4).await;
        chain.t2 = chain.add_table(chain.cafe, 2).await;
        chain.s1 = chain.add_slot(chain.cafe, day(10), 18).await;
        chain.s2 = chain.add_slot(chain.cafe, day(10), 19).await;
        chain.s3 = chain.add_slot(chain.cafe, day(11), 18).await;
        chain
    }

    /// Request metadata for a user, with managed cafes loaded fresh.
    pub async fn as_user(&self, id: UserId) -> CommandMetadata {
        let user = self.store.user(id).await.unwrap();
        CommandMetadata::new(user.actor()).with_source("integration")
    }

    pub async fn add_cafe(&self, name: &str, managers: &[UserId]) -> CafeId {
        self.services
            .create_cafe
            .handle(
                CreateCafeCommand {
                    cafe: NewCafe {
                        name: name.to_string(),
                        address: "1 Main St".to_string(),
                        phone: "+15550100".to_string(),
                        description: None,
                        manager_ids: set(managers),
                    },
                },
                self.as_user(self.admin).await,
            )
            .await
            .unwrap()
            .id
    }

    pub async fn add_table(&self, cafe_id: CafeId, seats: i32) -> TableId {
        self.services
            .create_table
            .handle(
                CreateTableCommand {
                    table: NewTable {
                        cafe_id,
                        seats,
                        description: None,
                    },
                },
                self.as_user(self.admin).await,
            )
            .await
            .unwrap()
            .id
    }

    pub async fn add_slot(&self, cafe_id: CafeId, date: NaiveDate, hour: u32) -> SlotId {
        self.services
            .create_time_slot
            .handle(
                CreateTimeSlotCommand {
                    cafe_id,
                    date,
                    start_time: at(hour, 0),
                    end_time: at(hour + 1, 0),
                    description: None,
                },
                self.as_user(self.admin).await,
            )
            .await
            .unwrap()
            .id
    }

    pub async fn book(
        &self,
        user: UserId,
        tables: &[TableId],
        slots: &[SlotId],
        guests: i32,
    ) -> Result<Booking, ServiceError> {
        self.services
            .create_booking
            .handle(
                booking_command(self.cafe, tables, slots, guests),
                self.as_user(user).await,
            )
            .await
    }
}

pub fn booking_command(
    cafe_id: CafeId,
    tables: &[TableId],
    slots: &[SlotId],
    guests: i32,
) -> CreateBookingCommand {
    CreateBookingCommand {
        cafe_id,
        table_ids: set(tables),
        slot_ids: set(slots),
        dish_ids: BTreeSet::new(),
        guests_number: guests,
        note: None,
        booking_date: None,
    }
}
