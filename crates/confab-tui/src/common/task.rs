#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    PageLoad,
    SessionSwitch,
    SessionCreate,
    SessionRename,
    SessionDelete,
    SessionSave,
    MessageSend,
    HistoryContinue,
    LogsRefresh,
}

#[derive(Debug, Clone)]
pub struct TaskStarted {
    pub id: TaskId,
}

#[derive(Debug)]
pub struct TaskCompleted<E> {
    pub id: TaskId,
    pub result: E,
}

/// Task lifecycle state (stored in AppState, mutated only by reducer).
///
/// A slot is occupied from the moment the reducer claims it for an emitted
/// effect until the spawned task's completion clears it. The claim happens
/// before `TaskStarted` arrives, so two triggers buffered in the same input
/// batch cannot both pass the gate.
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
    requested: bool,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.requested || self.active.is_some()
    }

    /// Claims the slot for a task that is about to be spawned.
    ///
    /// Returns false, leaving state untouched, when a task of this kind is
    /// already claimed or running; the caller drops the trigger.
    pub fn claim(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.requested = true;
        true
    }

    pub fn on_started(&mut self, started: &TaskStarted) {
        self.requested = false;
        self.active = Some(started.id);
    }

    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.active = None;
        }
        ok
    }

    pub fn clear(&mut self) {
        self.requested = false;
        self.active = None;
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub page_load: TaskState,
    pub session_switch: TaskState,
    pub session_create: TaskState,
    pub session_rename: TaskState,
    pub session_delete: TaskState,
    pub session_save: TaskState,
    pub message_send: TaskState,
    pub history_continue: TaskState,
    pub logs_refresh: TaskState,
}

impl Tasks {
    pub fn state(&self, kind: TaskKind) -> &TaskState {
        match kind {
            TaskKind::PageLoad => &self.page_load,
            TaskKind::SessionSwitch => &self.session_switch,
            TaskKind::SessionCreate => &self.session_create,
            TaskKind::SessionRename => &self.session_rename,
            TaskKind::SessionDelete => &self.session_delete,
            TaskKind::SessionSave => &self.session_save,
            TaskKind::MessageSend => &self.message_send,
            TaskKind::HistoryContinue => &self.history_continue,
            TaskKind::LogsRefresh => &self.logs_refresh,
        }
    }

    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::PageLoad => &mut self.page_load,
            TaskKind::SessionSwitch => &mut self.session_switch,
            TaskKind::SessionCreate => &mut self.session_create,
            TaskKind::SessionRename => &mut self.session_rename,
            TaskKind::SessionDelete => &mut self.session_delete,
            TaskKind::SessionSave => &mut self.session_save,
            TaskKind::MessageSend => &mut self.message_send,
            TaskKind::HistoryContinue => &mut self.history_continue,
            TaskKind::LogsRefresh => &mut self.logs_refresh,
        }
    }

    pub fn is_running(&self, kind: TaskKind) -> bool {
        self.state(kind).is_running()
    }

    /// Claims the slot for `kind`; false when already claimed or running.
    pub fn claim(&mut self, kind: TaskKind) -> bool {
        self.state_mut(kind).claim()
    }

    pub fn is_any_running(&self) -> bool {
        self.page_load.is_running()
            || self.session_switch.is_running()
            || self.session_create.is_running()
            || self.session_rename.is_running()
            || self.session_delete.is_running()
            || self.session_save.is_running()
            || self.message_send.is_running()
            || self.history_continue.is_running()
            || self.logs_refresh.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_occupies_slot_until_completion() {
        let mut state = TaskState::default();

        assert!(state.claim());
        assert!(state.is_running());
        // A second trigger before the spawn is reported gets nothing
        assert!(!state.claim());

        state.on_started(&TaskStarted { id: TaskId(3) });
        assert!(!state.claim());

        assert!(state.finish_if_active(TaskId(3)));
        assert!(!state.is_running());
        assert!(state.claim());
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut state = TaskState::default();
        state.on_started(&TaskStarted { id: TaskId(5) });

        assert!(!state.finish_if_active(TaskId(4)));
        assert!(state.is_running());
        assert!(state.finish_if_active(TaskId(5)));
    }
}
