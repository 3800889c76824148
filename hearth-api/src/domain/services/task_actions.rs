//! The task lifecycle engine.
//!
//! Implements the [`TaskActions`] inbound port over injected stores. All
//! authorization and state-machine checks happen here, server-side; the
//! stores re-check the prior status as a write precondition so racing
//! actors cannot double-apply a transition.

use std::sync::Arc;

use async_trait::async_trait;
use time::Date;

use crate::domain::{
    change_feed::{ChangeEvent, ChangeFeed},
    error::DomainError,
    models::{
        FamilyMember, PicklistState, Task, TaskId, TaskInput, TaskKind, TaskStatus,
    },
    ports::{
        inbound::TaskActions,
        outbound::{LedgerStore, TaskStore},
    },
    timeclock::Clock,
};

pub struct TaskEngine<T, L, C> {
    tasks: Arc<T>,
    ledger: Arc<L>,
    clock: C,
    feed: ChangeFeed,
}

impl<T, L, C> TaskEngine<T, L, C> {
    pub fn new(tasks: Arc<T>, ledger: Arc<L>, clock: C, feed: ChangeFeed) -> Self {
        Self {
            tasks,
            ledger,
            clock,
            feed,
        }
    }
}

impl<T: TaskStore, L: LedgerStore, C: Clock> TaskEngine<T, L, C> {
    async fn load(&self, task_id: TaskId) -> Result<Task, DomainError> {
        self.tasks
            .get(task_id)
            .await?
            .ok_or(DomainError::TaskNotFound(task_id))
    }

    /// Whether `actor` may mutate tasks dated `date`. Today is
    /// interactive for everyone; past days only for parents (retroactive
    /// review); future days for no one.
    fn ensure_interactive(&self, actor: &FamilyMember, date: Date) -> Result<(), DomainError> {
        let today = self.clock.today();
        if date == today || (date < today && actor.is_parent()) {
            return Ok(());
        }
        if date < today {
            Err(DomainError::not_permitted(
                "children may only view past days",
            ))
        } else {
            Err(DomainError::not_permitted("future days are read-only"))
        }
    }

    fn ensure_parent(&self, actor: &FamilyMember, action: &str) -> Result<(), DomainError> {
        if actor.is_parent() {
            Ok(())
        } else {
            Err(DomainError::not_permitted(format!(
                "only a parent may {action}"
            )))
        }
    }

    fn expect_status(
        task: &Task,
        expected: TaskStatus,
        action: &'static str,
    ) -> Result<(), DomainError> {
        if task.status == expected {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                from: task.status,
                action,
            })
        }
    }
}

#[async_trait]
impl<T: TaskStore, L: LedgerStore, C: Clock> TaskActions for TaskEngine<T, L, C> {
    async fn mark_done(
        &self,
        actor: &FamilyMember,
        task_id: TaskId,
    ) -> Result<Task, DomainError> {
        let task = self.load(task_id).await?;
        self.ensure_interactive(actor, task.date)?;

        match task.input_type {
            TaskInput::Child => {
                if !actor.is_child() || actor.id != task.member_id {
                    return Err(DomainError::not_permitted(
                        "only the assigned child may complete this task",
                    ));
                }
            }
            TaskInput::Parent => self.ensure_parent(actor, "complete this task")?,
        }
        Self::expect_status(&task, TaskStatus::Pending, "complete")?;

        self.tasks.mark_done(task_id, self.clock.now()).await?;
        self.feed.publish(ChangeEvent::tasks(task.member_id));
        self.load(task_id).await
    }

    async fn undo(&self, actor: &FamilyMember, task_id: TaskId) -> Result<Task, DomainError> {
        let task = self.load(task_id).await?;
        self.ensure_interactive(actor, task.date)?;

        if !actor.is_child() || actor.id != task.member_id {
            return Err(DomainError::not_permitted(
                "only the assigned child may undo a completion",
            ));
        }
        Self::expect_status(&task, TaskStatus::Done, "undo")?;

        self.tasks.mark_undone(task_id).await?;
        self.feed.publish(ChangeEvent::tasks(task.member_id));
        self.load(task_id).await
    }

    async fn accept(&self, actor: &FamilyMember, task_id: TaskId) -> Result<Task, DomainError> {
        let task = self.load(task_id).await?;
        self.ensure_parent(actor, "accept a task")?;
        self.ensure_interactive(actor, task.date)?;
        Self::expect_status(&task, TaskStatus::Done, "accept")?;

        // Status flip, ledger insert and balance increment are one
        // transaction; a concurrent accept loses on the status
        // precondition and surfaces as a conflict.
        self.ledger
            .grant(task_id, task.member_id, task.star_value)
            .await?;

        self.feed.publish(ChangeEvent::tasks(task.member_id));
        self.feed.publish(ChangeEvent::ledger(task.member_id));
        self.load(task_id).await
    }

    async fn unaccept(
        &self,
        actor: &FamilyMember,
        task_id: TaskId,
    ) -> Result<Task, DomainError> {
        let task = self.load(task_id).await?;
        self.ensure_parent(actor, "unaccept a task")?;
        self.ensure_interactive(actor, task.date)?;
        Self::expect_status(&task, TaskStatus::Accepted, "unaccept")?;

        let revoked = self.ledger.revoke(task_id, task.member_id).await?;
        tracing::debug!(
            "revoked {} star(s) from member {} for task {}",
            revoked,
            task.member_id,
            task_id
        );

        self.feed.publish(ChangeEvent::tasks(task.member_id));
        self.feed.publish(ChangeEvent::ledger(task.member_id));
        self.load(task_id).await
    }

    async fn picklist_select(
        &self,
        actor: &FamilyMember,
        task_id: TaskId,
        value: &str,
    ) -> Result<Task, DomainError> {
        let task = self.load(task_id).await?;
        self.ensure_parent(actor, "grade a picklist task")?;
        self.ensure_interactive(actor, task.date)?;

        // An accepted picklist must be unaccepted before regrading, or the
        // ledger would no longer match the selection.
        if task.status == TaskStatus::Accepted {
            return Err(DomainError::InvalidTransition {
                from: task.status,
                action: "reselect",
            });
        }

        let TaskKind::Picklist { options, selected } = &task.kind else {
            return Err(DomainError::NotAPicklist(task_id));
        };
        let option = options
            .iter()
            .find(|o| o.value == value)
            .ok_or_else(|| DomainError::UnknownOption(value.to_string()))?;

        let state = if selected.as_deref() == Some(value) {
            // Toggle off: back to pending, points cleared.
            PicklistState {
                selected: None,
                status: TaskStatus::Pending,
                star_value: 0,
                completed_at: None,
            }
        } else {
            // Select (or switch): done with the option's points, replacing
            // any previous value.
            PicklistState {
                selected: Some(value.to_string()),
                status: TaskStatus::Done,
                star_value: option.points,
                completed_at: Some(self.clock.now()),
            }
        };

        self.tasks.apply_picklist(task_id, &state).await?;
        self.feed.publish(ChangeEvent::tasks(task.member_id));
        self.load(task_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{FamilyId, MemberId, PicklistOption, Role};
    use crate::domain::ports::outbound::mock::InMemoryStore;
    use crate::domain::timeclock::FixedClock;
    use time::macros::datetime;
    use time::OffsetDateTime;

    const NOW: OffsetDateTime = datetime!(2026-08-07 15:00 UTC);

    fn engine(store: &InMemoryStore) -> TaskEngine<InMemoryStore, InMemoryStore, FixedClock> {
        TaskEngine::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            FixedClock(NOW),
            ChangeFeed::new(8),
        )
    }

    fn simple_task(store: &InMemoryStore, id: i64, member: i64, date: Date, stars: i32) -> Task {
        store.add_task(Task {
            id: TaskId::new(id),
            family_id: FamilyId::new(1),
            member_id: MemberId::new(member),
            date,
            title: format!("task {id}"),
            block_id: None,
            day_section: None,
            duration_minutes: 10,
            star_value: stars,
            sort_order: 0,
            input_type: TaskInput::Child,
            status: TaskStatus::Pending,
            completed_at: None,
            accepted_at: None,
            kind: TaskKind::Simple,
            template_id: None,
            created_at: NOW,
        })
    }

    fn picklist_task(store: &InMemoryStore, id: i64, member: i64, date: Date) -> Task {
        store.add_task(Task {
            id: TaskId::new(id),
            family_id: FamilyId::new(1),
            member_id: MemberId::new(member),
            date,
            title: "Behavior color".to_string(),
            block_id: None,
            day_section: None,
            duration_minutes: 0,
            star_value: 0,
            sort_order: 0,
            input_type: TaskInput::Parent,
            status: TaskStatus::Pending,
            completed_at: None,
            accepted_at: None,
            kind: TaskKind::Picklist {
                options: vec![
                    PicklistOption {
                        value: "green".to_string(),
                        label: "Green day".to_string(),
                        points: 2,
                    },
                    PicklistOption {
                        value: "red".to_string(),
                        label: "Red day".to_string(),
                        points: 0,
                    },
                ],
                selected: None,
            },
            template_id: None,
            created_at: NOW,
        })
    }

    fn today() -> Date {
        NOW.date()
    }

    #[tokio::test]
    async fn child_marks_own_task_done_and_undoes_it() {
        let store = InMemoryStore::new();
        let child = store.add_member(1, 1, "Isla", Role::Child);
        let task = simple_task(&store, 10, 1, today(), 1);
        let engine = engine(&store);

        let done = engine.mark_done(&child, task.id).await.unwrap();
        assert_eq!(done.status, TaskStatus::Done);
        assert!(done.completed_at.is_some());

        let undone = engine.undo(&child, task.id).await.unwrap();
        assert_eq!(undone.status, TaskStatus::Pending);
        assert!(undone.completed_at.is_none());
    }

    #[tokio::test]
    async fn parent_cannot_complete_or_undo_a_child_input_task() {
        let store = InMemoryStore::new();
        let parent = store.add_member(1, 1, "Sam", Role::Parent);
        let child = store.add_member(2, 1, "Isla", Role::Child);
        let task = simple_task(&store, 10, 2, today(), 1);
        let engine = engine(&store);

        assert!(matches!(
            engine.mark_done(&parent, task.id).await,
            Err(DomainError::NotPermitted(_))
        ));

        engine.mark_done(&child, task.id).await.unwrap();
        assert!(matches!(
            engine.undo(&parent, task.id).await,
            Err(DomainError::NotPermitted(_))
        ));
    }

    #[tokio::test]
    async fn another_child_cannot_touch_the_task() {
        let store = InMemoryStore::new();
        store.add_member(1, 1, "Isla", Role::Child);
        let sibling = store.add_member(2, 1, "Noah", Role::Child);
        let task = simple_task(&store, 10, 1, today(), 1);
        let engine = engine(&store);

        assert!(matches!(
            engine.mark_done(&sibling, task.id).await,
            Err(DomainError::NotPermitted(_))
        ));
    }

    #[tokio::test]
    async fn parent_input_tasks_are_parent_only() {
        let store = InMemoryStore::new();
        let parent = store.add_member(1, 1, "Sam", Role::Parent);
        let child = store.add_member(2, 1, "Isla", Role::Child);
        let mut task = simple_task(&store, 10, 2, today(), 1);
        task.input_type = TaskInput::Parent;
        store.add_task(task.clone());
        let engine = engine(&store);

        assert!(matches!(
            engine.mark_done(&child, task.id).await,
            Err(DomainError::NotPermitted(_))
        ));
        let done = engine.mark_done(&parent, task.id).await.unwrap();
        assert_eq!(done.status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn accept_grants_stars_and_unaccept_nets_to_zero() {
        let store = InMemoryStore::new();
        let parent = store.add_member(1, 1, "Sam", Role::Parent);
        let child = store.add_member(2, 1, "Isla", Role::Child);
        let task = simple_task(&store, 10, 2, today(), 3);
        let engine = engine(&store);

        engine.mark_done(&child, task.id).await.unwrap();

        let accepted = engine.accept(&parent, task.id).await.unwrap();
        assert_eq!(accepted.status, TaskStatus::Accepted);
        assert!(accepted.accepted_at.is_some());
        assert_eq!(store.balance(child.id), 3);
        assert_eq!(store.ledger_entries(child.id, task.id), 1);

        let reverted = engine.unaccept(&parent, task.id).await.unwrap();
        assert_eq!(reverted.status, TaskStatus::Done);
        assert!(reverted.accepted_at.is_none());
        assert_eq!(store.balance(child.id), 0);
        assert_eq!(store.ledger_entries(child.id, task.id), 0);
    }

    #[tokio::test]
    async fn accept_on_an_accepted_task_is_rejected_without_ledger_effect() {
        let store = InMemoryStore::new();
        let parent = store.add_member(1, 1, "Sam", Role::Parent);
        let child = store.add_member(2, 1, "Isla", Role::Child);
        let task = simple_task(&store, 10, 2, today(), 3);
        let engine = engine(&store);

        engine.mark_done(&child, task.id).await.unwrap();
        engine.accept(&parent, task.id).await.unwrap();

        assert!(matches!(
            engine.accept(&parent, task.id).await,
            Err(DomainError::InvalidTransition { .. })
        ));
        assert_eq!(store.balance(child.id), 3);
        assert_eq!(store.ledger_entries(child.id, task.id), 1);
    }

    #[tokio::test]
    async fn accept_skipping_done_is_rejected() {
        let store = InMemoryStore::new();
        let parent = store.add_member(1, 1, "Sam", Role::Parent);
        store.add_member(2, 1, "Isla", Role::Child);
        let task = simple_task(&store, 10, 2, today(), 3);
        let engine = engine(&store);

        assert!(matches!(
            engine.accept(&parent, task.id).await,
            Err(DomainError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn child_cannot_accept() {
        let store = InMemoryStore::new();
        let child = store.add_member(1, 1, "Isla", Role::Child);
        let task = simple_task(&store, 10, 1, today(), 1);
        let engine = engine(&store);

        engine.mark_done(&child, task.id).await.unwrap();
        assert!(matches!(
            engine.accept(&child, task.id).await,
            Err(DomainError::NotPermitted(_))
        ));
    }

    #[tokio::test]
    async fn balance_tracks_applied_increments_across_sequences() {
        let store = InMemoryStore::new();
        let parent = store.add_member(1, 1, "Sam", Role::Parent);
        let child = store.add_member(2, 1, "Isla", Role::Child);
        let task = simple_task(&store, 10, 2, today(), 2);
        let engine = engine(&store);

        engine.mark_done(&child, task.id).await.unwrap();
        engine.accept(&parent, task.id).await.unwrap();
        engine.unaccept(&parent, task.id).await.unwrap();
        engine.accept(&parent, task.id).await.unwrap();

        // Three accept calls were made in total but only two applied;
        // the balance reflects applied increments, not call count.
        assert!(engine.accept(&parent, task.id).await.is_err());
        assert_eq!(store.balance(child.id), 2);
        assert_eq!(store.ledger_entries(child.id, task.id), 1);
    }

    #[tokio::test]
    async fn children_cannot_mutate_past_days_but_parents_can() {
        let store = InMemoryStore::new();
        let parent = store.add_member(1, 1, "Sam", Role::Parent);
        let child = store.add_member(2, 1, "Isla", Role::Child);
        let yesterday = today().previous_day().unwrap();
        let task = simple_task(&store, 10, 2, yesterday, 1);
        let mut parent_task = simple_task(&store, 11, 2, yesterday, 1);
        parent_task.input_type = TaskInput::Parent;
        store.add_task(parent_task.clone());
        let engine = engine(&store);

        assert!(matches!(
            engine.mark_done(&child, task.id).await,
            Err(DomainError::NotPermitted(_))
        ));

        let done = engine.mark_done(&parent, parent_task.id).await.unwrap();
        assert_eq!(done.status, TaskStatus::Done);
        let accepted = engine.accept(&parent, parent_task.id).await.unwrap();
        assert_eq!(accepted.status, TaskStatus::Accepted);
    }

    #[tokio::test]
    async fn future_days_are_read_only_for_everyone() {
        let store = InMemoryStore::new();
        let parent = store.add_member(1, 1, "Sam", Role::Parent);
        let child = store.add_member(2, 1, "Isla", Role::Child);
        let tomorrow = today().next_day().unwrap();
        let task = simple_task(&store, 10, 2, tomorrow, 1);
        let mut parent_task = simple_task(&store, 11, 2, tomorrow, 1);
        parent_task.input_type = TaskInput::Parent;
        store.add_task(parent_task.clone());
        let engine = engine(&store);

        assert!(matches!(
            engine.mark_done(&child, task.id).await,
            Err(DomainError::NotPermitted(_))
        ));
        assert!(matches!(
            engine.mark_done(&parent, parent_task.id).await,
            Err(DomainError::NotPermitted(_))
        ));
    }

    #[tokio::test]
    async fn picklist_select_and_toggle() {
        let store = InMemoryStore::new();
        let parent = store.add_member(1, 1, "Sam", Role::Parent);
        let task = picklist_task(&store, 10, 2, today());
        let engine = engine(&store);

        let selected = engine
            .picklist_select(&parent, task.id, "green")
            .await
            .unwrap();
        assert_eq!(selected.status, TaskStatus::Done);
        assert_eq!(selected.star_value, 2);
        assert!(selected.completed_at.is_some());
        assert!(matches!(
            &selected.kind,
            TaskKind::Picklist { selected: Some(v), .. } if v == "green"
        ));

        // Selecting the same value toggles it off.
        let cleared = engine
            .picklist_select(&parent, task.id, "green")
            .await
            .unwrap();
        assert_eq!(cleared.status, TaskStatus::Pending);
        assert_eq!(cleared.star_value, 0);
        assert!(cleared.completed_at.is_none());
        assert!(matches!(
            &cleared.kind,
            TaskKind::Picklist { selected: None, .. }
        ));
    }

    #[tokio::test]
    async fn picklist_switch_replaces_points() {
        let store = InMemoryStore::new();
        let parent = store.add_member(1, 1, "Sam", Role::Parent);
        let task = picklist_task(&store, 10, 2, today());
        let engine = engine(&store);

        engine
            .picklist_select(&parent, task.id, "green")
            .await
            .unwrap();
        let switched = engine
            .picklist_select(&parent, task.id, "red")
            .await
            .unwrap();
        assert_eq!(switched.status, TaskStatus::Done);
        assert_eq!(switched.star_value, 0);
    }

    #[tokio::test]
    async fn picklist_guards() {
        let store = InMemoryStore::new();
        let parent = store.add_member(1, 1, "Sam", Role::Parent);
        let child = store.add_member(2, 1, "Isla", Role::Child);
        let picklist = picklist_task(&store, 10, 2, today());
        let simple = simple_task(&store, 11, 2, today(), 1);
        let engine = engine(&store);

        assert!(matches!(
            engine.picklist_select(&child, picklist.id, "green").await,
            Err(DomainError::NotPermitted(_))
        ));
        assert!(matches!(
            engine.picklist_select(&parent, simple.id, "green").await,
            Err(DomainError::NotAPicklist(_))
        ));
        assert!(matches!(
            engine.picklist_select(&parent, picklist.id, "purple").await,
            Err(DomainError::UnknownOption(_))
        ));

        // Accepted picklists must be unaccepted before regrading.
        engine
            .picklist_select(&parent, picklist.id, "green")
            .await
            .unwrap();
        engine.accept(&parent, picklist.id).await.unwrap();
        assert!(matches!(
            engine.picklist_select(&parent, picklist.id, "red").await,
            Err(DomainError::InvalidTransition { .. })
        ));
    }
}
