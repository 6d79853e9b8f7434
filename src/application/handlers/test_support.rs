//! Seeded in-memory world shared by handler tests.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::adapters::{FixedClock, InMemoryStore};
use crate::application::retry::RetryPolicy;
use crate::domain::booking::{Booking, NewBooking};
use crate::domain::catalog::{
    Action, Cafe, Dish, NewAction, NewCafe, NewDish, NewTable, Table,
};
use crate::domain::foundation::{
    ActionId, Actor, BookingId, CafeId, CommandMetadata, DishId, DomainError, ErrorCode, SlotId,
    TableId, UserId,
};
use crate::domain::schedule::{NewTimeSlot, TimeSlot};
use crate::domain::user::User;
use crate::ports::{TransactionManager, UnitOfWork};

pub(crate) fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

pub(crate) fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Retry policy with millisecond backoff.
pub(crate) fn quick_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        backoff: Duration::from_millis(1),
        timeout: Duration::from_secs(1),
    }
}

pub(crate) fn set<T: Ord + Copy>(items: &[T]) -> BTreeSet<T> {
    items.iter().copied().collect()
}

/// Cafe "Central" with two tables, two evening slots on Jan 10 and one on
/// Jan 11, a dish and a promotion, plus a closed cafe. The clock reads
/// 2025-01-05 12:00.
pub(crate) struct World {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<FixedClock>,
    pub admin: UserId,
    pub manager: UserId,
    pub customer: UserId,
    pub stranger: UserId,
    pub cafe: CafeId,
    pub closed_cafe: CafeId,
    /// 4 seats.
    pub t1: TableId,
    /// 2 seats.
    pub t2: TableId,
    pub hidden_table: TableId,
    /// Jan 10, 18:00-19:00.
    pub s1: SlotId,
    /// Jan 10, 19:00-20:00.
    pub s2: SlotId,
    /// Jan 11, 18:00-19:00.
    pub s3: SlotId,
    pub dish: DishId,
    pub action: ActionId,
}

async fn user(store: &InMemoryStore, name: &str, is_superuser: bool) -> UserId {
    store
        .add_user(User {
            id: UserId::new(0),
            username: name.to_string(),
            phone: format!("+7{}", name.len()),
            email: None,
            is_superuser,
            active: true,
            managed_cafe_ids: BTreeSet::new(),
        })
        .await
        .id
}

fn new_cafe(name: &str, managers: BTreeSet<UserId>) -> NewCafe {
    NewCafe {
        name: name.to_string(),
        address: "1 Main St".to_string(),
        phone: "+100".to_string(),
        description: None,
        manager_ids: managers,
    }
}

impl World {
    pub(crate) async fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(FixedClock::new(day(5).and_time(at(12, 0))));

        let admin = user(&store, "admin", true).await;
        let manager = user(&store, "manager", false).await;
        let customer = user(&store, "customer", false).await;
        let stranger = user(&store, "stranger", false).await;

        let mut uow = store.begin().await.unwrap();
        let cafe = uow.insert_cafe(new_cafe("Central", set(&[manager]))).await.unwrap().id;
        let mut closed = uow.insert_cafe(new_cafe("Closed", set(&[manager]))).await.unwrap();
        closed.active = false;
        uow.update_cafe(&closed).await.unwrap();

        let table = |seats| NewTable {
            cafe_id: cafe,
            seats,
            description: None,
        };
        let t1 = uow.insert_table(table(4)).await.unwrap().id;
        let t2 = uow.insert_table(table(2)).await.unwrap().id;
        let mut hidden = uow.insert_table(table(6)).await.unwrap();
        hidden.active = false;
        uow.update_table(&hidden).await.unwrap();

        let slot = |d, h| NewTimeSlot {
            cafe_id: cafe,
            date: day(d),
            start_time: at(h, 0),
            end_time: at(h + 1, 0),
            description: None,
        };
        let s1 = uow.insert_slot(slot(10, 18)).await.unwrap().id;
        let s2 = uow.insert_slot(slot(10, 19)).await.unwrap().id;
        let s3 = uow.insert_slot(slot(11, 18)).await.unwrap().id;

        let dish = uow
            .insert_dish(NewDish {
                cafe_id: cafe,
                name: "Borscht".to_string(),
                price: 450,
                description: None,
            })
            .await
            .unwrap()
            .id;
        let action = uow
            .insert_action(NewAction {
                cafe_id: cafe,
                description: "Free dessert on Fridays".to_string(),
            })
            .await
            .unwrap()
            .id;
        uow.commit().await.unwrap();

        Self {
            store,
            clock,
            admin,
            manager,
            customer,
            stranger,
            cafe,
            closed_cafe: closed.id,
            t1,
            t2,
            hidden_table: hidden.id,
            s1,
            s2,
            s3,
            dish,
            action,
        }
    }

    pub(crate) fn as_admin(&self) -> CommandMetadata {
        CommandMetadata::new(Actor::superuser(self.admin)).with_source("test")
    }

    pub(crate) fn as_manager(&self) -> CommandMetadata {
        CommandMetadata::new(Actor::manager(self.manager, [self.cafe, self.closed_cafe]))
            .with_source("test")
    }

    pub(crate) fn as_customer(&self) -> CommandMetadata {
        CommandMetadata::new(Actor::customer(self.customer)).with_source("test")
    }

    pub(crate) fn as_stranger(&self) -> CommandMetadata {
        CommandMetadata::new(Actor::customer(self.stranger)).with_source("test")
    }

    pub(crate) fn as_anonymous(&self) -> CommandMetadata {
        CommandMetadata::new(Actor::anonymous()).with_source("test")
    }

    /// Writes a booking directly, bypassing the availability checks.
    pub(crate) async fn seed_booking(
        &self,
        owner: UserId,
        date: NaiveDate,
        tables: &[TableId],
        slots: &[SlotId],
    ) -> Booking {
        let mut uow = self.store.begin().await.unwrap();
        let booking = uow
            .insert_booking(NewBooking {
                user_id: owner,
                cafe_id: self.cafe,
                booking_date: date,
                guests_number: 2,
                note: None,
                table_ids: set(tables),
                slot_ids: set(slots),
                dish_ids: BTreeSet::new(),
            })
            .await
            .unwrap();
        uow.commit().await.unwrap();
        booking
    }

    /// Overwrites a stored booking, for tests that need an unusual state.
    pub(crate) async fn overwrite_booking(&self, booking: &Booking) {
        let mut uow = self.store.begin().await.unwrap();
        uow.update_booking(booking).await.unwrap();
        uow.commit().await.unwrap();
    }
}

/// Transaction manager whose first `failures` transactions abort, as
/// storage does under serialization conflicts.
pub(crate) struct AbortingTransactions {
    inner: Arc<InMemoryStore>,
    failures: std::sync::Mutex<u32>,
}

impl AbortingTransactions {
    pub(crate) fn new(inner: Arc<InMemoryStore>, failures: u32) -> Self {
        Self {
            inner,
            failures: std::sync::Mutex::new(failures),
        }
    }
}

#[async_trait]
impl TransactionManager for AbortingTransactions {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DomainError> {
        let abort = {
            let mut left = self.failures.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                true
            } else {
                false
            }
        };
        if abort {
            return Err(DomainError::new(
                ErrorCode::SerializationFailure,
                "could not serialize access due to concurrent update",
            ));
        }
        self.inner.begin().await
    }
}

/// Transaction manager whose units of work never see live bookings in the
/// overlap scan, like a snapshot taken before a concurrent commit. Only the
/// claims held by the store can stop a double booking.
pub(crate) struct StaleSnapshotTransactions {
    inner: Arc<InMemoryStore>,
}

impl StaleSnapshotTransactions {
    pub(crate) fn new(inner: Arc<InMemoryStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl TransactionManager for StaleSnapshotTransactions {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DomainError> {
        Ok(Box::new(StaleSnapshot {
            inner: self.inner.begin().await?,
        }))
    }
}

struct StaleSnapshot {
    inner: Box<dyn UnitOfWork>,
}

#[async_trait]
impl UnitOfWork for StaleSnapshot {
    async fn get_cafe(&mut self, id: CafeId) -> Result<Option<Cafe>, DomainError> {
        self.inner.get_cafe(id).await
    }

    async fn find_cafe_by_name(&mut self, name: &str) -> Result<Option<Cafe>, DomainError> {
        self.inner.find_cafe_by_name(name).await
    }

    async fn get_users_by_ids(&mut self, ids: &BTreeSet<UserId>) -> Result<Vec<User>, DomainError> {
        self.inner.get_users_by_ids(ids).await
    }

    async fn get_table(&mut self, id: TableId) -> Result<Option<Table>, DomainError> {
        self.inner.get_table(id).await
    }

    async fn get_tables_by_ids(
        &mut self,
        cafe_id: CafeId,
        ids: &BTreeSet<TableId>,
    ) -> Result<Vec<Table>, DomainError> {
        self.inner.get_tables_by_ids(cafe_id, ids).await
    }

    async fn get_slot(&mut self, id: SlotId) -> Result<Option<TimeSlot>, DomainError> {
        self.inner.get_slot(id).await
    }

    async fn get_slots_by_ids(
        &mut self,
        cafe_id: CafeId,
        ids: &BTreeSet<SlotId>,
    ) -> Result<Vec<TimeSlot>, DomainError> {
        self.inner.get_slots_by_ids(cafe_id, ids).await
    }

    async fn get_active_slots_on(
        &mut self,
        cafe_id: CafeId,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, DomainError> {
        self.inner.get_active_slots_on(cafe_id, date).await
    }

    async fn get_dish(&mut self, id: DishId) -> Result<Option<Dish>, DomainError> {
        self.inner.get_dish(id).await
    }

    async fn get_dishes_by_ids(
        &mut self,
        cafe_id: CafeId,
        ids: &BTreeSet<DishId>,
    ) -> Result<Vec<Dish>, DomainError> {
        self.inner.get_dishes_by_ids(cafe_id, ids).await
    }

    async fn find_dish_by_name(
        &mut self,
        cafe_id: CafeId,
        name: &str,
    ) -> Result<Option<Dish>, DomainError> {
        self.inner.find_dish_by_name(cafe_id, name).await
    }

    async fn get_action(&mut self, id: ActionId) -> Result<Option<Action>, DomainError> {
        self.inner.get_action(id).await
    }

    async fn get_booking(&mut self, id: BookingId) -> Result<Option<Booking>, DomainError> {
        self.inner.get_booking(id).await
    }

    async fn count_live_bookings_for_slot(&mut self, slot_id: SlotId) -> Result<u64, DomainError> {
        self.inner.count_live_bookings_for_slot(slot_id).await
    }

    async fn lock_cafe_day(&mut self, cafe_id: CafeId, date: NaiveDate) -> Result<(), DomainError> {
        self.inner.lock_cafe_day(cafe_id, date).await
    }

    async fn get_live_bookings_for_slot_overlap(
        &mut self,
        _cafe_id: CafeId,
        _date: NaiveDate,
        _table_ids: &BTreeSet<TableId>,
        _slot_ids: &BTreeSet<SlotId>,
        _exclude: Option<BookingId>,
    ) -> Result<Vec<Booking>, DomainError> {
        Ok(Vec::new())
    }

    async fn insert_cafe(&mut self, new: NewCafe) -> Result<Cafe, DomainError> {
        self.inner.insert_cafe(new).await
    }

    async fn update_cafe(&mut self, cafe: &Cafe) -> Result<(), DomainError> {
        self.inner.update_cafe(cafe).await
    }

    async fn insert_table(&mut self, new: NewTable) -> Result<Table, DomainError> {
        self.inner.insert_table(new).await
    }

    async fn update_table(&mut self, table: &Table) -> Result<(), DomainError> {
        self.inner.update_table(table).await
    }

    async fn insert_slot(&mut self, new: NewTimeSlot) -> Result<TimeSlot, DomainError> {
        self.inner.insert_slot(new).await
    }

    async fn update_slot(&mut self, slot: &TimeSlot) -> Result<(), DomainError> {
        self.inner.update_slot(slot).await
    }

    async fn insert_dish(&mut self, new: NewDish) -> Result<Dish, DomainError> {
        self.inner.insert_dish(new).await
    }

    async fn update_dish(&mut self, dish: &Dish) -> Result<(), DomainError> {
        self.inner.update_dish(dish).await
    }

    async fn insert_action(&mut self, new: NewAction) -> Result<Action, DomainError> {
        self.inner.insert_action(new).await
    }

    async fn update_action(&mut self, action: &Action) -> Result<(), DomainError> {
        self.inner.update_action(action).await
    }

    async fn insert_booking(&mut self, new: NewBooking) -> Result<Booking, DomainError> {
        self.inner.insert_booking(new).await
    }

    async fn update_booking(&mut self, booking: &Booking) -> Result<(), DomainError> {
        self.inner.update_booking(booking).await
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.inner.commit().await
    }
}
