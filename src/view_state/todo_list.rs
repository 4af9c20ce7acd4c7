//! Todo list screen.

use std::sync::Arc;

use tracing::{info, warn};

use crate::models::Task;
use crate::reactive::{
    bridge, latest_with_reset, notifier, on_commit, Behavior, Callback, CommitOutcome, FieldState,
    Scope, Shared, Subject,
};
use crate::traits::TodoListService;

/// View state of the todo list.
pub struct TodoListScreen {
    scope: Scope,
    task_name_input: Callback<String>,
    add_task: Callback<()>,
    toggle_task: Callback<(String, bool)>,
    task_name: FieldState<String>,
    tasks: Behavior<Option<Vec<Task>>>,
    add_outcomes: Shared<CommitOutcome<Task>>,
}

impl TodoListScreen {
    pub fn mount(service: Arc<dyn TodoListService>) -> Self {
        let scope = Scope::new("todo_list");
        let (task_name_input, name_changes) = bridge::<String>();
        let (add_task, adds) = notifier();
        let (toggle_task, toggles) = bridge::<(String, bool)>();
        let added = Subject::<()>::new();
        let refresh = Subject::<()>::new();

        let task_name = latest_with_reset(
            &name_changes.take_until(&scope),
            String::new(),
            &added.source(),
        );

        let tasks = {
            let service = Arc::clone(&service);
            refresh
                .source()
                .start_with(())
                .take_until(&scope)
                .switch_map(&scope, move |_| {
                    let service = Arc::clone(&service);
                    async move { service.list_tasks().await }
                })
                .filter_map(|result| match result {
                    Ok(tasks) => Some(Some(tasks.clone())),
                    Err(err) => {
                        warn!(error = %err, "failed to list tasks");
                        None
                    }
                })
                .hold(None)
        };

        let add_outcomes = {
            let name = task_name.clone();
            let service = Arc::clone(&service);
            on_commit(
                &adds,
                &scope,
                move |_| {
                    let name = name.get();
                    let name = name.trim();
                    (!name.is_empty()).then(|| name.to_string())
                },
                move |name: String| {
                    let service = Arc::clone(&service);
                    async move { service.add_task(&name).await }
                },
            )
        };
        {
            let added = added.clone();
            let refresh = refresh.clone();
            scope.keep(add_outcomes.subscribe(move |outcome| {
                if let CommitOutcome::Succeeded(task) = outcome {
                    info!(id = %task.id, "task added");
                    added.emit(());
                    refresh.emit(());
                }
            }));
        }

        let toggled = {
            let service = Arc::clone(&service);
            on_commit(
                &toggles,
                &scope,
                |toggle: &(String, bool)| Some(toggle.clone()),
                move |(id, completed): (String, bool)| {
                    let service = Arc::clone(&service);
                    async move { service.update_task(&id, completed).await }
                },
            )
        };
        {
            let tasks = tasks.clone();
            scope.keep(toggled.subscribe(move |outcome| {
                if let CommitOutcome::Succeeded(task) = outcome {
                    tasks.update(|list| {
                        if let Some(list) = list {
                            replace_task(list, task);
                        }
                    });
                }
            }));
        }

        Self {
            scope,
            task_name_input,
            add_task,
            toggle_task,
            task_name,
            tasks,
            add_outcomes,
        }
    }

    pub fn on_task_name_input(&self, value: impl Into<String>) {
        self.task_name_input.call(value.into());
    }

    pub fn on_add_task(&self) {
        self.add_task.notify();
    }

    pub fn on_toggle_task(&self, id: impl Into<String>, completed: bool) {
        self.toggle_task.call2(id.into(), completed);
    }

    pub fn task_name(&self) -> &FieldState<String> {
        &self.task_name
    }

    /// `None` until the first list arrives.
    pub fn tasks(&self) -> &Behavior<Option<Vec<Task>>> {
        &self.tasks
    }

    pub fn add_outcomes(&self) -> &Shared<CommitOutcome<Task>> {
        &self.add_outcomes
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn unmount(&self) {
        self.scope.teardown();
    }
}

impl Drop for TodoListScreen {
    fn drop(&mut self) {
        self.scope.teardown();
    }
}

fn replace_task(list: &mut [Task], updated: &Task) {
    if let Some(slot) = list.iter_mut().find(|t| t.id == updated.id) {
        *slot = updated.clone();
    }
}
