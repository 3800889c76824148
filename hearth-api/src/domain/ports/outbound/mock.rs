//! In-memory store implementations for engine and service tests.
//!
//! One shared state struct backs all four ports so the multi-step ledger
//! mutations are naturally atomic under a single lock, mirroring the
//! transactional contract of the Postgres adapters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::{Date, OffsetDateTime};

use crate::domain::{
    day_type::DayType,
    models::{
        BlockId, DaySection, FamilyId, FamilyMember, LedgerEntryId, LedgerEntryWithTask,
        MemberId, PicklistState, Role, ScheduleBlock, ScheduleTemplate, StarLedgerEntry, Task,
        TaskId, TaskKind, TaskStatus, TaskTemplateId, TemplateId,
    },
};

use super::{
    LedgerStore, MemberStore, NewScheduleBlock, NewTask, ScheduleStore, StoreError, TaskStore,
    UpdateTask,
};

#[derive(Default)]
struct State {
    members: HashMap<MemberId, FamilyMember>,
    tasks: HashMap<TaskId, Task>,
    ledger: HashMap<(MemberId, TaskId), StarLedgerEntry>,
    templates: Vec<ScheduleTemplate>,
    blocks: Vec<ScheduleBlock>,
    sections: Vec<DaySection>,
    spawn_protos: Vec<NewTask>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory record store implementing every outbound port.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

#[allow(dead_code)]
impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&self, id: i64, family_id: i64, name: &str, role: Role) -> FamilyMember {
        let member = FamilyMember {
            id: MemberId::new(id),
            family_id: FamilyId::new(family_id),
            name: name.to_string(),
            role,
            star_balance: 0,
            created_at: OffsetDateTime::now_utc(),
        };
        self.state
            .lock()
            .unwrap()
            .members
            .insert(member.id, member.clone());
        member
    }

    pub fn add_task(&self, task: Task) -> Task {
        self.state.lock().unwrap().tasks.insert(task.id, task.clone());
        task
    }

    pub fn add_template(&self, template: ScheduleTemplate) {
        self.state.lock().unwrap().templates.push(template);
    }

    pub fn add_block(&self, block: ScheduleBlock) {
        self.state.lock().unwrap().blocks.push(block);
    }

    pub fn add_section(&self, section: DaySection) {
        self.state.lock().unwrap().sections.push(section);
    }

    /// Register a recurring template the spawn operation materializes.
    pub fn add_spawn_proto(&self, proto: NewTask) {
        self.state.lock().unwrap().spawn_protos.push(proto);
    }

    pub fn task(&self, id: TaskId) -> Task {
        self.state.lock().unwrap().tasks[&id].clone()
    }

    pub fn balance(&self, member_id: MemberId) -> i32 {
        self.state.lock().unwrap().members[&member_id].star_balance
    }

    pub fn ledger_entries(&self, member_id: MemberId, task_id: TaskId) -> usize {
        self.state
            .lock()
            .unwrap()
            .ledger
            .contains_key(&(member_id, task_id)) as usize
    }

    pub fn task_count(&self) -> usize {
        self.state.lock().unwrap().tasks.len()
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn get(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.state.lock().unwrap().tasks.get(&id).cloned())
    }

    async fn for_member_date(
        &self,
        member_id: MemberId,
        date: Date,
    ) -> Result<Vec<Task>, StoreError> {
        let mut tasks: Vec<Task> = self
            .state
            .lock()
            .unwrap()
            .tasks
            .values()
            .filter(|t| t.member_id == member_id && t.date == date)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| {
            (&a.day_section, a.block_id, a.sort_order, a.id)
                .cmp(&(&b.day_section, b.block_id, b.sort_order, b.id))
        });
        Ok(tasks)
    }

    async fn for_family_date(
        &self,
        family_id: FamilyId,
        date: Date,
    ) -> Result<Vec<Task>, StoreError> {
        let mut tasks: Vec<Task> = self
            .state
            .lock()
            .unwrap()
            .tasks
            .values()
            .filter(|t| t.family_id == family_id && t.date == date)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.sort_order, t.id));
        Ok(tasks)
    }

    async fn insert(&self, new: &NewTask) -> Result<Task, StoreError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let task = Task {
            id: TaskId::new(id),
            family_id: new.family_id,
            member_id: new.member_id,
            date: new.date,
            title: new.title.clone(),
            block_id: new.block_id,
            day_section: new.day_section.clone(),
            duration_minutes: new.duration_minutes,
            star_value: new.star_value,
            sort_order: new.sort_order,
            input_type: new.input_type,
            status: TaskStatus::Pending,
            completed_at: None,
            accepted_at: None,
            kind: new.kind.clone(),
            template_id: None,
            created_at: OffsetDateTime::now_utc(),
        };
        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, id: TaskId, update: &UpdateTask) -> Result<Task, StoreError> {
        let mut state = self.state.lock().unwrap();
        let task = state
            .tasks
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if let Some(title) = &update.title {
            task.title = title.clone();
        }
        if let Some(section) = &update.day_section {
            task.day_section = Some(section.clone());
        }
        if let Some(block_id) = update.block_id {
            task.block_id = block_id;
        }
        if let Some(duration) = update.duration_minutes {
            task.duration_minutes = duration;
        }
        if let Some(stars) = update.star_value {
            task.star_value = stars;
        }
        if let Some(sort_order) = update.sort_order {
            task.sort_order = sort_order;
        }
        if let Some(input_type) = update.input_type {
            task.input_type = input_type;
        }
        Ok(task.clone())
    }

    async fn delete(&self, id: TaskId) -> Result<(), StoreError> {
        self.state
            .lock()
            .unwrap()
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn mark_done(&self, id: TaskId, at: OffsetDateTime) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let task = state
            .tasks
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if task.status != TaskStatus::Pending {
            return Err(StoreError::Conflict(format!(
                "task {id} is not pending"
            )));
        }
        task.status = TaskStatus::Done;
        task.completed_at = Some(at);
        Ok(())
    }

    async fn mark_undone(&self, id: TaskId) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let task = state
            .tasks
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if task.status != TaskStatus::Done {
            return Err(StoreError::Conflict(format!("task {id} is not done")));
        }
        task.status = TaskStatus::Pending;
        task.completed_at = None;
        Ok(())
    }

    async fn apply_picklist(
        &self,
        id: TaskId,
        new_state: &PicklistState,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let task = state
            .tasks
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if task.status == TaskStatus::Accepted {
            return Err(StoreError::Conflict(format!("task {id} is accepted")));
        }
        match &mut task.kind {
            TaskKind::Picklist { selected, .. } => {
                *selected = new_state.selected.clone();
            }
            TaskKind::Simple => {
                return Err(StoreError::Conflict(format!("task {id} is not a picklist")));
            }
        }
        task.status = new_state.status;
        task.star_value = new_state.star_value;
        task.completed_at = new_state.completed_at;
        Ok(())
    }

    async fn spawn_for_date(&self, date: Date, _day_type: DayType) -> Result<u64, StoreError> {
        let mut state = self.state.lock().unwrap();
        let protos = state.spawn_protos.clone();
        let mut created = 0;
        for (index, proto) in protos.iter().enumerate() {
            let template_id = TaskTemplateId::new(index as i64 + 1);
            let already = state
                .tasks
                .values()
                .any(|t| t.template_id == Some(template_id) && t.date == date);
            if already {
                continue;
            }
            let id = state.next_id();
            let task = Task {
                id: TaskId::new(id),
                family_id: proto.family_id,
                member_id: proto.member_id,
                date,
                title: proto.title.clone(),
                block_id: proto.block_id,
                day_section: proto.day_section.clone(),
                duration_minutes: proto.duration_minutes,
                star_value: proto.star_value,
                sort_order: proto.sort_order,
                input_type: proto.input_type,
                status: TaskStatus::Pending,
                completed_at: None,
                accepted_at: None,
                kind: proto.kind.clone(),
                template_id: Some(template_id),
                created_at: OffsetDateTime::now_utc(),
            };
            state.tasks.insert(task.id, task);
            created += 1;
        }
        Ok(created)
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn recent_for_member(
        &self,
        member_id: MemberId,
        limit: i64,
    ) -> Result<Vec<LedgerEntryWithTask>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut entries: Vec<LedgerEntryWithTask> = state
            .ledger
            .values()
            .filter(|e| e.member_id == member_id)
            .map(|e| LedgerEntryWithTask {
                entry: e.clone(),
                task_title: state
                    .tasks
                    .get(&e.task_id)
                    .map(|t| t.title.clone())
                    .unwrap_or_default(),
            })
            .collect();
        entries.sort_by(|a, b| b.entry.earned_at.cmp(&a.entry.earned_at));
        entries.truncate(limit as usize);
        Ok(entries)
    }

    async fn grant(
        &self,
        task_id: TaskId,
        member_id: MemberId,
        stars: i32,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let entry_id = state.next_id();

        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| StoreError::NotFound(task_id.to_string()))?;
        if task.status != TaskStatus::Done {
            return Err(StoreError::Conflict(format!("task {task_id} is not done")));
        }
        task.status = TaskStatus::Accepted;
        task.accepted_at = Some(OffsetDateTime::now_utc());

        let key = (member_id, task_id);
        if state.ledger.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "ledger entry already exists for task {task_id}"
            )));
        }
        state.ledger.insert(
            key,
            StarLedgerEntry {
                id: LedgerEntryId::new(entry_id),
                member_id,
                task_id,
                stars,
                earned_at: OffsetDateTime::now_utc(),
            },
        );

        let member = state
            .members
            .get_mut(&member_id)
            .ok_or_else(|| StoreError::NotFound(member_id.to_string()))?;
        member.star_balance += stars;
        Ok(())
    }

    async fn revoke(&self, task_id: TaskId, member_id: MemberId) -> Result<i32, StoreError> {
        let mut state = self.state.lock().unwrap();

        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| StoreError::NotFound(task_id.to_string()))?;
        if task.status != TaskStatus::Accepted {
            return Err(StoreError::Conflict(format!(
                "task {task_id} is not accepted"
            )));
        }
        task.status = TaskStatus::Done;
        task.accepted_at = None;

        let entry = state
            .ledger
            .remove(&(member_id, task_id))
            .ok_or_else(|| StoreError::Conflict(format!("no ledger entry for task {task_id}")))?;

        let member = state
            .members
            .get_mut(&member_id)
            .ok_or_else(|| StoreError::NotFound(member_id.to_string()))?;
        member.star_balance -= entry.stars;
        Ok(entry.stars)
    }
}

#[async_trait]
impl MemberStore for InMemoryStore {
    async fn get(&self, id: MemberId) -> Result<Option<FamilyMember>, StoreError> {
        Ok(self.state.lock().unwrap().members.get(&id).cloned())
    }

    async fn for_family(
        &self,
        family_id: FamilyId,
        role: Option<Role>,
    ) -> Result<Vec<FamilyMember>, StoreError> {
        let mut members: Vec<FamilyMember> = self
            .state
            .lock()
            .unwrap()
            .members
            .values()
            .filter(|m| m.family_id == family_id && role.map_or(true, |r| m.role == r))
            .cloned()
            .collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(members)
    }
}

#[async_trait]
impl ScheduleStore for InMemoryStore {
    async fn templates_for(
        &self,
        member_id: MemberId,
        day_type: DayType,
    ) -> Result<Vec<ScheduleTemplate>, StoreError> {
        let mut templates: Vec<ScheduleTemplate> = self
            .state
            .lock()
            .unwrap()
            .templates
            .iter()
            .filter(|t| t.member_id == member_id && t.applies_on(day_type))
            .cloned()
            .collect();
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(templates)
    }

    async fn templates_for_family(
        &self,
        family_id: FamilyId,
    ) -> Result<Vec<ScheduleTemplate>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .templates
            .iter()
            .filter(|t| t.family_id == family_id)
            .cloned()
            .collect())
    }

    async fn blocks(&self, template_id: TemplateId) -> Result<Vec<ScheduleBlock>, StoreError> {
        let mut blocks: Vec<ScheduleBlock> = self
            .state
            .lock()
            .unwrap()
            .blocks
            .iter()
            .filter(|b| b.template_id == template_id)
            .cloned()
            .collect();
        blocks.sort_by_key(|b| (b.start, b.sort_order));
        Ok(blocks)
    }

    async fn create_template(
        &self,
        family_id: FamilyId,
        member_id: MemberId,
        name: &str,
        day_types: &[DayType],
    ) -> Result<ScheduleTemplate, StoreError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let template = ScheduleTemplate {
            id: TemplateId::new(id),
            family_id,
            member_id,
            name: name.to_string(),
            day_types: day_types.to_vec(),
            created_at: OffsetDateTime::now_utc(),
        };
        state.templates.push(template.clone());
        Ok(template)
    }

    async fn delete_template(&self, id: TemplateId) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.templates.retain(|t| t.id != id);
        state.blocks.retain(|b| b.template_id != id);
        Ok(())
    }

    async fn create_block(
        &self,
        template_id: TemplateId,
        new: &NewScheduleBlock,
    ) -> Result<ScheduleBlock, StoreError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let block = ScheduleBlock {
            id: BlockId::new(id),
            template_id,
            label: new.label.clone(),
            emoji: new.emoji.clone(),
            description: new.description.clone(),
            block_type: new.block_type,
            start: new.start,
            end: new.end,
            sort_order: new.sort_order,
        };
        state.blocks.push(block.clone());
        Ok(block)
    }

    async fn delete_block(&self, id: BlockId) -> Result<(), StoreError> {
        self.state.lock().unwrap().blocks.retain(|b| b.id != id);
        Ok(())
    }

    async fn day_sections(&self, family_id: FamilyId) -> Result<Vec<DaySection>, StoreError> {
        let mut sections: Vec<DaySection> = self
            .state
            .lock()
            .unwrap()
            .sections
            .iter()
            .filter(|s| s.family_id == family_id)
            .cloned()
            .collect();
        sections.sort_by_key(|s| s.start);
        Ok(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{TaskInput, TaskKind};
    use time::macros::date;

    fn proto(member: i64) -> NewTask {
        NewTask {
            family_id: FamilyId::new(1),
            member_id: MemberId::new(member),
            date: date!(2026 - 08 - 07),
            title: "Brush teeth".to_string(),
            block_id: None,
            day_section: Some("morning".to_string()),
            duration_minutes: 5,
            star_value: 1,
            sort_order: 0,
            input_type: TaskInput::Child,
            kind: TaskKind::Simple,
        }
    }

    #[tokio::test]
    async fn spawning_twice_yields_the_same_task_set() {
        let store = InMemoryStore::new();
        store.add_spawn_proto(proto(1));
        store.add_spawn_proto(proto(2));

        let day = date!(2026 - 08 - 07);
        let first = store.spawn_for_date(day, DayType::Friday).await.unwrap();
        assert_eq!(first, 2);
        assert_eq!(store.task_count(), 2);

        let second = store.spawn_for_date(day, DayType::Friday).await.unwrap();
        assert_eq!(second, 0);
        assert_eq!(store.task_count(), 2);

        // A different date spawns its own set.
        let other = store
            .spawn_for_date(date!(2026 - 08 - 08), DayType::Saturday)
            .await
            .unwrap();
        assert_eq!(other, 2);
    }

    #[tokio::test]
    async fn grant_requires_done_and_rejects_double_grant() {
        let store = InMemoryStore::new();
        let member = store.add_member(1, 1, "Isla", Role::Child);
        let task = store.insert(&proto(1)).await.unwrap();

        // Not done yet.
        assert!(matches!(
            store.grant(task.id, member.id, 1).await,
            Err(StoreError::Conflict(_))
        ));

        store
            .mark_done(task.id, OffsetDateTime::now_utc())
            .await
            .unwrap();
        store.grant(task.id, member.id, 1).await.unwrap();
        assert_eq!(store.balance(member.id), 1);

        // Status is now accepted; a retried grant must not double-apply.
        assert!(matches!(
            store.grant(task.id, member.id, 1).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.balance(member.id), 1);
        assert_eq!(store.ledger_entries(member.id, task.id), 1);
    }
}
