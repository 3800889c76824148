use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    adapters::outbound::postgres::{
        PgLedgerStore, PgMemberStore, PgScheduleStore, PgTaskStore,
    },
    domain::{
        change_feed::ChangeFeed,
        ports::{
            inbound::{DayViewService, TaskActions},
            outbound::{LedgerStore, MemberStore, ScheduleStore, TaskStore},
        },
        services::{DayAssembler, TaskEngine},
        timeclock::WallClock,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub day_views: Arc<dyn DayViewService>,
    pub task_actions: Arc<dyn TaskActions>,
    pub task_store: Arc<dyn TaskStore>,
    pub ledger_store: Arc<dyn LedgerStore>,
    pub member_store: Arc<dyn MemberStore>,
    pub schedule_store: Arc<dyn ScheduleStore>,
    pub change_feed: ChangeFeed,
    pub clock: WallClock,
}

impl AppState {
    pub fn new(pool: PgPool, clock: WallClock) -> Self {
        let task_store = Arc::new(PgTaskStore::new(pool.clone()));
        let ledger_store = Arc::new(PgLedgerStore::new(pool.clone()));
        let member_store = Arc::new(PgMemberStore::new(pool.clone()));
        let schedule_store = Arc::new(PgScheduleStore::new(pool));
        let change_feed = ChangeFeed::new(128);

        let task_actions = Arc::new(TaskEngine::new(
            task_store.clone(),
            ledger_store.clone(),
            clock,
            change_feed.clone(),
        ));
        let day_views = Arc::new(DayAssembler::new(
            schedule_store.clone(),
            task_store.clone(),
            member_store.clone(),
            clock,
        ));

        Self {
            day_views,
            task_actions,
            task_store,
            ledger_store,
            member_store,
            schedule_store,
            change_feed,
            clock,
        }
    }
}
