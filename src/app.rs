use crate::api::ApiClient;
use crate::error::ApiError;
use crate::filters::{ListFilters, StatusFilter};
use crate::form::{ActiveInput, TaskForm};
use crate::models::{Task, TaskUpdate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};

pub const LOAD_ERROR: &str = "Failed to load tasks. Please try again.";
pub const ACTION_ERROR: &str = "Failed to update task. Please try again.";

/// Results posted back to the event loop by spawned requests.
#[derive(Debug)]
pub enum AppEvent {
    TasksLoaded {
        seq: u64,
        result: Result<Vec<Task>, ApiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Form,
}

/// What the list area should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListView {
    Loading,
    Failed,
    Empty { hint: bool },
    Tasks,
}

pub struct App {
    api: ApiClient,
    events: UnboundedSender<AppEvent>,
    pub tasks: Vec<Task>,
    pub state: ListState,
    pub filters: ListFilters,
    pub task_detail: Option<Task>,
    pub input_mode: InputMode,
    pub form: Option<TaskForm>,
    pub error: Option<String>,
    pub notice: Option<String>,
    issued: u64,
    rendered: u64,
}

impl App {
    pub fn new(api: ApiClient, events: UnboundedSender<AppEvent>) -> App {
        App {
            api,
            events,
            tasks: Vec::new(),
            state: ListState::default(),
            filters: ListFilters::default(),
            task_detail: None,
            input_mode: InputMode::Normal,
            form: None,
            error: None,
            notice: None,
            issued: 0,
            rendered: 0,
        }
    }

    /// Issues a list request for the current filters. The response arrives later as
    /// [`AppEvent::TasksLoaded`].
    pub fn refresh_tasks(&mut self) {
        self.issued += 1;
        let seq = self.issued;
        let filters = self.filters.clone();
        let api = self.api.clone();
        let events = self.events.clone();
        debug!(seq, ?filters, "refreshing tasks");

        tokio::spawn(async move {
            let result = api.fetch_tasks(&filters).await;
            // The receiver only goes away on shutdown.
            let _ = events.send(AppEvent::TasksLoaded { seq, result });
        });
    }

    pub fn is_loading(&self) -> bool {
        self.rendered < self.issued
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::TasksLoaded { seq, result } => {
                if seq < self.rendered {
                    debug!(seq, rendered = self.rendered, "dropping stale task list");
                    return;
                }
                self.rendered = seq;
                match result {
                    Ok(tasks) => {
                        debug!(seq, count = tasks.len(), "task list loaded");
                        self.tasks = tasks;
                        self.error = None;
                    }
                    Err(err) => {
                        error!(seq, %err, "failed to fetch tasks");
                        self.tasks.clear();
                        self.error = Some(LOAD_ERROR.to_string());
                    }
                }
                self.clamp_selection();
            }
        }
    }

    pub fn list_view(&self) -> ListView {
        if self.is_loading() {
            ListView::Loading
        } else if self.error.is_some() {
            ListView::Failed
        } else if self.tasks.is_empty() {
            ListView::Empty {
                hint: self.filters.is_active(),
            }
        } else {
            ListView::Tasks
        }
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        if self.filters.status != status {
            self.filters.status = status;
            self.refresh_tasks();
        }
    }

    pub fn toggle_sort(&mut self) {
        self.filters.sort = self.filters.sort.toggle();
        self.refresh_tasks();
    }

    pub fn push_search(&mut self, c: char) {
        self.filters.search.push(c);
        self.refresh_tasks();
    }

    pub fn pop_search(&mut self) {
        if self.filters.search.pop().is_some() {
            self.refresh_tasks();
        }
    }

    fn clamp_selection(&mut self) {
        if self.tasks.is_empty() {
            self.state.select(None);
        } else {
            let i = self.state.selected().unwrap_or(0).min(self.tasks.len() - 1);
            self.state.select(Some(i));
        }
    }

    pub fn next(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.tasks.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.tasks.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.state.selected().and_then(|i| self.tasks.get(i))
    }

    pub async fn select_task(&mut self) {
        let Some(task_id) = self.selected_task().map(|task| task.id) else {
            return;
        };
        match self.api.fetch_task(task_id).await {
            Ok(task) => {
                self.task_detail = Some(task);
                self.notice = None;
            }
            Err(err) => {
                error!(task_id, %err, "failed to fetch task detail");
                self.notice = Some(ACTION_ERROR.to_string());
            }
        }
    }

    pub async fn toggle_done(&mut self) {
        let Some(task) = self.selected_task().cloned() else {
            return;
        };
        let result = if task.is_done {
            self.api.update_task(task.id, &TaskUpdate::reopen()).await
        } else {
            self.api.mark_task_done(task.id).await
        };
        let result = result.map(|updated| {
            if self.task_detail.as_ref().is_some_and(|t| t.id == updated.id) {
                self.task_detail = Some(updated);
            }
        });
        self.after_action(task.id, result);
    }

    pub async fn delete_selected(&mut self) {
        let Some(task_id) = self.selected_task().map(|task| task.id) else {
            return;
        };
        let result = self.api.delete_task(task_id).await;
        if result.is_ok() && self.task_detail.as_ref().is_some_and(|t| t.id == task_id) {
            self.task_detail = None;
        }
        self.after_action(task_id, result);
    }

    fn after_action(&mut self, task_id: u64, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                info!(task_id, "task updated");
                self.notice = None;
                self.refresh_tasks();
            }
            Err(err) => {
                error!(task_id, %err, "task action failed");
                self.notice = Some(ACTION_ERROR.to_string());
            }
        }
    }

    pub fn open_form(&mut self, task: Option<&Task>) {
        self.form = Some(match task {
            Some(task) => TaskForm::for_task(task),
            None => TaskForm::new(),
        });
        self.input_mode = InputMode::Form;
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.input_mode = InputMode::Normal;
    }

    pub async fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match form.submit(&self.api).await {
            Ok(task) => {
                if self.task_detail.as_ref().is_some_and(|t| t.id == task.id) {
                    self.task_detail = Some(task);
                }
                self.refresh_tasks();
                self.close_form();
            }
            // The form keeps its values and shows its own message.
            Err(err) => debug!(%err, "form submission rejected"),
        }
    }

    /// Returns `true` when the user asked to quit.
    pub async fn handle_input(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match self.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Char('j') | KeyCode::Down => self.next(),
                KeyCode::Char('k') | KeyCode::Up => self.previous(),
                KeyCode::Char('1') => self.set_status(StatusFilter::All),
                KeyCode::Char('2') => self.set_status(StatusFilter::Done),
                KeyCode::Char('3') => self.set_status(StatusFilter::Undone),
                KeyCode::Char('t') => self.set_status(self.filters.status.next()),
                KeyCode::Char('s') => self.toggle_sort(),
                KeyCode::Char('/') => self.input_mode = InputMode::Search,
                KeyCode::Char('r') => self.refresh_tasks(),
                KeyCode::Char('a') => self.open_form(None),
                KeyCode::Char('e') => {
                    if let Some(task) = self.selected_task().cloned() {
                        self.open_form(Some(&task));
                    }
                }
                KeyCode::Char('x') | KeyCode::Char(' ') => self.toggle_done().await,
                KeyCode::Char('d') => self.delete_selected().await,
                KeyCode::Enter => self.select_task().await,
                KeyCode::Esc => self.task_detail = None,
                _ => {}
            },

            InputMode::Search => match key.code {
                KeyCode::Enter | KeyCode::Esc => self.input_mode = InputMode::Normal,
                KeyCode::Backspace => self.pop_search(),
                KeyCode::Char(c) => self.push_search(c),
                _ => {}
            },

            InputMode::Form => match key.code {
                KeyCode::Esc => self.close_form(),
                KeyCode::Enter => self.submit_form().await,
                code => {
                    if let Some(form) = self.form.as_mut() {
                        match code {
                            KeyCode::Tab => form.next_input(),
                            KeyCode::BackTab => form.previous_input(),
                            KeyCode::Right if form.active_input == ActiveInput::Priority => {
                                form.raise_priority()
                            }
                            KeyCode::Left if form.active_input == ActiveInput::Priority => {
                                form.lower_priority()
                            }
                            KeyCode::Backspace => form.backspace(),
                            KeyCode::Char(c) => form.push_char(c),
                            _ => {}
                        }
                    }
                }
            },
        }
        false
    }
}
