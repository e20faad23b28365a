// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use fiche_app::{
    Customer, CustomerFormInput, DEFAULT_RESULT_CAP, DemandTitle, EntryKind, ScrollTarget,
    SearchIndex, SearchRow, SelectCommand, SelectEvent, SelectionState, split_text_lines,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

/// Quiescence window before a search query runs; reset on every keystroke.
const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
/// How long a scrolled-to row keeps its flash background.
const HIGHLIGHT_FLASH: Duration = Duration::from_millis(1500);
const STATUS_CLEAR: Duration = Duration::from_secs(4);
const INPUT_POLL: Duration = Duration::from_millis(120);

/// Payload for the update-from-sheet pipeline, captured from the selected
/// customer at launch time so a later re-selection cannot change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    pub did: String,
    pub name: String,
    pub sheet_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshResult {
    /// Import accepted and the record re-fetched.
    Refreshed {
        message: String,
        customer: Box<Customer>,
    },
    /// The import call itself failed; nothing changed server-side.
    UpdateFailed { error: String },
    /// Import accepted but the follow-up fetch failed; displayed data is
    /// stale until the user re-selects.
    FetchFailed { message: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    ClearHighlight {
        token: u64,
    },
    SearchDebounce {
        token: u64,
    },
    CustomersListed {
        request_id: u64,
        result: std::result::Result<Vec<Customer>, String>,
    },
    Refresh {
        request_id: u64,
        did: String,
        result: RefreshResult,
    },
}

/// Backend operations the view needs. The CLI plugs in either the HTTP
/// gateway or the offline demo dataset.
pub trait AppRuntime {
    fn list_customers(&mut self) -> Result<Vec<Customer>>;
    fn refresh_customer_from_sheet(&mut self, request: &RefreshRequest) -> RefreshResult;
    fn submit_new_customer(&mut self, form: &CustomerFormInput) -> Result<String>;

    fn search_debounce(&self) -> Duration {
        SEARCH_DEBOUNCE
    }

    fn result_cap(&self) -> usize {
        DEFAULT_RESULT_CAP
    }

    fn spawn_list_customers(&mut self, request_id: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self
            .list_customers()
            .map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::CustomersListed { request_id, result })
            .map_err(|_| anyhow::anyhow!("internal event channel closed"))?;
        Ok(())
    }

    fn spawn_refresh(
        &mut self,
        request_id: u64,
        request: RefreshRequest,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let did = request.did.clone();
        let result = self.refresh_customer_from_sheet(&request);
        tx.send(InternalEvent::Refresh {
            request_id,
            did,
            result,
        })
        .map_err(|_| anyhow::anyhow!("internal event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Focus {
    #[default]
    Customers,
    Titles,
    Columns,
    Actions,
}

impl Focus {
    const ALL: [Self; 4] = [Self::Customers, Self::Titles, Self::Columns, Self::Actions];

    fn next(self) -> Self {
        let position = Self::ALL
            .iter()
            .position(|focus| *focus == self)
            .unwrap_or(0);
        Self::ALL[(position + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        let position = Self::ALL
            .iter()
            .position(|focus| *focus == self)
            .unwrap_or(0);
        Self::ALL[(position + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// One row of the demand/patient-type column, flattened for cursor
/// navigation and scroll targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnRow {
    Demand { demand: usize },
    PatientType { demand: usize, patient_type: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SearchScope {
    #[default]
    Contextual,
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct SearchUiState {
    visible: bool,
    scope: SearchScope,
    query: String,
    /// Debounce token; only the timer carrying the latest token fires.
    token: u64,
    matches: Vec<usize>,
    expanded: Option<usize>,
    cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct FormUiState {
    name: String,
    did_number: String,
    sheet_url: String,
    field: usize,
    error: Option<String>,
}

impl FormUiState {
    const FIELD_LABELS: [&'static str; 3] = ["name", "did number", "sheet url"];

    fn field_mut(&mut self) -> &mut String {
        match self.field {
            0 => &mut self.name,
            1 => &mut self.did_number,
            _ => &mut self.sheet_url,
        }
    }

    fn input(&self) -> CustomerFormInput {
        CustomerFormInput {
            name: self.name.clone(),
            did_number: self.did_number.clone(),
            sheet_url: self.sheet_url.clone(),
        }
    }
}

/// Separate, separately-dismissable channel for update-from-sheet results.
#[derive(Debug, Clone, PartialEq, Eq)]
enum UpdateStatus {
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RefreshInFlight {
    request_id: u64,
    did: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Highlight {
    row: ColumnRow,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    focus: Focus,
    picker_order: Vec<usize>,
    picker_cursor: usize,
    title_cursor: usize,
    column_cursor: usize,
    actions_cursor: usize,
    search: SearchUiState,
    contextual_index: SearchIndex,
    index_did: Option<String>,
    global_index: Option<SearchIndex>,
    form: Option<FormUiState>,
    help_visible: bool,
    status_line: Option<String>,
    status_token: u64,
    update_status: Option<UpdateStatus>,
    list_request: Option<u64>,
    refresh_in_flight: Option<RefreshInFlight>,
    highlight: Option<Highlight>,
    highlight_token: u64,
    next_request_id: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut SelectionState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    start_list_load(runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);
        ensure_search_index(state, &mut view_data);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(INPUT_POLL).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<R: AppRuntime>(
    state: &mut SelectionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status_line = None;
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::ClearHighlight { token } if token == view_data.highlight_token => {
                view_data.highlight = None;
            }
            InternalEvent::ClearHighlight { .. } => {}
            InternalEvent::SearchDebounce { token } => {
                if view_data.search.visible && token == view_data.search.token {
                    run_search(state, runtime.result_cap(), view_data);
                }
            }
            InternalEvent::CustomersListed { request_id, result } => {
                handle_customers_listed(state, view_data, tx, request_id, result);
            }
            InternalEvent::Refresh {
                request_id,
                did,
                result,
            } => {
                handle_refresh_event(state, view_data, request_id, &did, result);
            }
        }
    }
}

fn handle_customers_listed(
    state: &mut SelectionState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    request_id: u64,
    result: std::result::Result<Vec<Customer>, String>,
) {
    if view_data.list_request != Some(request_id) {
        return;
    }
    view_data.list_request = None;

    match result {
        Ok(customers) => {
            let count = customers.len();
            state.dispatch(SelectCommand::LoadCustomers(customers));
            invalidate_search_index(view_data);
            rebuild_picker(state, view_data);
            clamp_cursors(state, view_data);
            emit_status(view_data, tx, format!("{count} customers loaded"));
        }
        Err(error) => {
            state.dispatch(SelectCommand::LoadCustomers(Vec::new()));
            invalidate_search_index(view_data);
            rebuild_picker(state, view_data);
            clamp_cursors(state, view_data);
            emit_status(view_data, tx, format!("load failed: {error}; press r to retry"));
        }
    }
}

fn handle_refresh_event(
    state: &mut SelectionState,
    view_data: &mut ViewData,
    request_id: u64,
    did: &str,
    result: RefreshResult,
) {
    // Stale pipelines (superseded request id or a different customer) are
    // discarded without touching displayed data.
    let Some(in_flight) = &view_data.refresh_in_flight else {
        return;
    };
    if in_flight.request_id != request_id {
        return;
    }
    view_data.refresh_in_flight = None;
    if in_flight_did_mismatch(did, state) {
        return;
    }

    match result {
        RefreshResult::Refreshed { message, customer } => {
            state.dispatch(SelectCommand::ReplaceSelectedCustomer(*customer));
            invalidate_search_index(view_data);
            rebuild_picker(state, view_data);
            clamp_cursors(state, view_data);
            view_data.update_status = Some(UpdateStatus::Success(message));
        }
        RefreshResult::UpdateFailed { error } => {
            view_data.update_status = Some(UpdateStatus::Error(format!("update failed: {error}")));
        }
        RefreshResult::FetchFailed { message, error } => {
            view_data.update_status = Some(UpdateStatus::Error(format!(
                "update submitted ({message}) but refresh failed: {error}; re-select the customer to reload"
            )));
        }
    }
}

fn in_flight_did_mismatch(did: &str, state: &SelectionState) -> bool {
    state
        .selected_customer()
        .is_none_or(|customer| customer.did_number != did)
}

fn schedule_status_clear(tx: &Sender<InternalEvent>, token: u64) {
    let sender = tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn schedule_search_debounce(tx: &Sender<InternalEvent>, token: u64, delay: Duration) {
    let sender = tx.clone();
    thread::spawn(move || {
        thread::sleep(delay);
        let _ = sender.send(InternalEvent::SearchDebounce { token });
    });
}

fn schedule_highlight_clear(tx: &Sender<InternalEvent>, token: u64) {
    let sender = tx.clone();
    thread::spawn(move || {
        thread::sleep(HIGHLIGHT_FLASH);
        let _ = sender.send(InternalEvent::ClearHighlight { token });
    });
}

fn emit_status(view_data: &mut ViewData, tx: &Sender<InternalEvent>, message: impl Into<String>) {
    view_data.status_line = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(tx, view_data.status_token);
}

/// Rebuilds the contextual index when the selected customer's identity
/// changed. Runs every loop turn and is a no-op otherwise, so typing in the
/// search box never re-flattens the tree.
fn ensure_search_index(state: &SelectionState, view_data: &mut ViewData) {
    let did = state
        .selected_customer()
        .map(|customer| customer.did_number.clone());
    if view_data.index_did == did {
        return;
    }

    view_data.contextual_index = match state.selected_customer() {
        Some(customer) => SearchIndex::build(customer),
        None => SearchIndex::default(),
    };
    view_data.index_did = did;
    if view_data.search.scope == SearchScope::Contextual {
        view_data.search.matches.clear();
        view_data.search.expanded = None;
        view_data.search.cursor = 0;
    }
}

fn invalidate_search_index(view_data: &mut ViewData) {
    view_data.index_did = None;
    view_data.contextual_index = SearchIndex::default();
    view_data.global_index = None;
    view_data.search.matches.clear();
    view_data.search.expanded = None;
    view_data.search.cursor = 0;
}

fn rebuild_picker(state: &SelectionState, view_data: &mut ViewData) {
    let mut order: Vec<usize> = (0..state.customers().len()).collect();
    order.sort_by_key(|&index| {
        let customer = &state.customers()[index];
        (customer.filetitle_rank(), customer.display_label())
    });
    view_data.picker_order = order;
}

fn alloc_request_id(view_data: &mut ViewData) -> u64 {
    view_data.next_request_id = view_data.next_request_id.saturating_add(1);
    view_data.next_request_id
}

fn start_list_load<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let request_id = alloc_request_id(view_data);
    view_data.list_request = Some(request_id);
    if let Err(error) = runtime.spawn_list_customers(request_id, tx.clone()) {
        view_data.list_request = None;
        view_data.status_line = Some(format!("load failed: {error:#}; press r to retry"));
    }
}

fn start_refresh<R: AppRuntime>(
    state: &SelectionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let Some(customer) = state.selected_customer() else {
        emit_status(view_data, tx, "select a customer before updating");
        return;
    };
    if view_data.refresh_in_flight.is_some() {
        emit_status(view_data, tx, "update already running");
        return;
    }

    let request = RefreshRequest {
        did: customer.did_number.clone(),
        name: customer.name.clone(),
        sheet_url: customer.sheet_url.clone(),
    };
    let request_id = alloc_request_id(view_data);
    view_data.refresh_in_flight = Some(RefreshInFlight {
        request_id,
        did: request.did.clone(),
    });
    view_data.update_status = None;
    if let Err(error) = runtime.spawn_refresh(request_id, request, tx.clone()) {
        view_data.refresh_in_flight = None;
        view_data.update_status = Some(UpdateStatus::Error(format!("update failed: {error:#}")));
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut SelectionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.form.is_some() {
        handle_form_key(runtime, view_data, tx, key);
        return false;
    }

    if view_data.search.visible {
        handle_search_key(state, runtime, view_data, tx, key);
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Tab, _) => {
            view_data.focus = view_data.focus.next();
        }
        (KeyCode::BackTab, _) => {
            view_data.focus = view_data.focus.prev();
        }
        (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => {
            move_cursor(state, view_data, 1);
        }
        (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => {
            move_cursor(state, view_data, -1);
        }
        (KeyCode::Enter, _) => {
            activate_cursor(state, view_data, tx);
        }
        (KeyCode::Char('/'), _) => {
            open_search(state, view_data, tx, SearchScope::Contextual);
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) => {
            open_search(state, view_data, tx, SearchScope::Global);
        }
        (KeyCode::Char('a'), KeyModifiers::NONE) => {
            view_data.form = Some(FormUiState::default());
        }
        (KeyCode::Char('u'), KeyModifiers::NONE) => {
            start_refresh(state, runtime, view_data, tx);
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            if view_data.list_request.is_some() {
                emit_status(view_data, tx, "customer list load already running");
            } else {
                start_list_load(runtime, view_data, tx);
            }
        }
        (KeyCode::Char('x'), KeyModifiers::NONE) => {
            view_data.update_status = None;
        }
        (KeyCode::Char('d'), KeyModifiers::NONE) | (KeyCode::Delete, _) => {
            if view_data.focus == Focus::Actions {
                let events =
                    state.dispatch(SelectCommand::RemoveCurrentAction(view_data.actions_cursor));
                apply_dispatch_effects(state, view_data, tx, &events);
            }
        }
        (KeyCode::Char('C'), _) => {
            let events = state.dispatch(SelectCommand::ClearCurrentActions);
            apply_dispatch_effects(state, view_data, tx, &events);
        }
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
        }
        (KeyCode::Esc, _) => {
            if view_data.focus == Focus::Customers && state.selected_customer().is_some() {
                let events = state.dispatch(SelectCommand::ClearCustomer);
                apply_dispatch_effects(state, view_data, tx, &events);
            } else {
                state.clear_error();
                view_data.status_line = None;
            }
        }
        _ => {}
    }
    false
}

fn move_cursor(state: &SelectionState, view_data: &mut ViewData, delta: isize) {
    let (cursor, len) = match view_data.focus {
        Focus::Customers => (&mut view_data.picker_cursor, view_data.picker_order.len()),
        Focus::Titles => (
            &mut view_data.title_cursor,
            state
                .selected_customer()
                .map_or(0, |customer| customer.demand_titles.len()),
        ),
        Focus::Columns => (
            &mut view_data.column_cursor,
            state
                .selected_title()
                .map_or(0, |title| column_rows(title).len()),
        ),
        Focus::Actions => (&mut view_data.actions_cursor, state.current_actions().len()),
    };
    if len == 0 {
        *cursor = 0;
        return;
    }
    let next = (*cursor as isize + delta).clamp(0, len as isize - 1);
    *cursor = next as usize;
}

fn activate_cursor(
    state: &mut SelectionState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    match view_data.focus {
        Focus::Customers => {
            let Some(&customer_index) = view_data.picker_order.get(view_data.picker_cursor) else {
                return;
            };
            let Some(customer) = state.customers().get(customer_index) else {
                return;
            };
            let did = customer.did_number.clone();
            let events = state.dispatch(SelectCommand::SelectCustomer(did));
            view_data.title_cursor = 0;
            view_data.column_cursor = 0;
            view_data.actions_cursor = 0;
            apply_dispatch_effects(state, view_data, tx, &events);
        }
        Focus::Titles => {
            if state.selected_customer().is_none() {
                return;
            }
            let events = state.dispatch(SelectCommand::SelectTitle(Some(view_data.title_cursor)));
            view_data.column_cursor = 0;
            view_data.actions_cursor = 0;
            apply_dispatch_effects(state, view_data, tx, &events);
        }
        Focus::Columns => {
            let Some(title) = state.selected_title() else {
                return;
            };
            let rows = column_rows(title);
            let Some(&row) = rows.get(view_data.column_cursor) else {
                return;
            };
            let mut events = Vec::new();
            match row {
                ColumnRow::Demand { demand } => {
                    events.extend(state.dispatch(SelectCommand::SelectDemand(Some(demand))));
                }
                ColumnRow::PatientType {
                    demand,
                    patient_type,
                } => {
                    events.extend(state.dispatch(SelectCommand::SelectDemand(Some(demand))));
                    events.extend(
                        state.dispatch(SelectCommand::SelectPatientType(Some(patient_type))),
                    );
                }
            }
            view_data.actions_cursor = 0;
            apply_dispatch_effects(state, view_data, tx, &events);
        }
        Focus::Actions => {}
    }
}

/// Post-dispatch bookkeeping: surface inline failures, consume the scroll
/// target, invalidate the index on identity changes, clamp cursors.
fn apply_dispatch_effects(
    state: &mut SelectionState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    events: &[SelectEvent],
) {
    for event in events {
        match event {
            SelectEvent::SelectionFailed(message) => {
                emit_status(view_data, tx, message.clone());
            }
            SelectEvent::CustomerSelected(_)
            | SelectEvent::CustomerRefreshed(_)
            | SelectEvent::CustomerCleared
            | SelectEvent::CustomersLoaded { .. } => {
                invalidate_search_index(view_data);
            }
            _ => {}
        }
    }

    if let Some(target) = state.take_scroll_target() {
        apply_scroll_target(state, view_data, tx, target);
    }
    clamp_cursors(state, view_data);
}

fn apply_scroll_target(
    state: &SelectionState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    target: ScrollTarget,
) {
    let Some(title) = state.selected_title() else {
        return;
    };
    // Unresolvable targets are a silent no-op.
    let Some(row_index) = resolve_scroll_target(title, target) else {
        return;
    };
    let rows = column_rows(title);
    view_data.focus = Focus::Columns;
    view_data.column_cursor = row_index;
    view_data.highlight = rows.get(row_index).map(|&row| Highlight { row });
    view_data.highlight_token = view_data.highlight_token.saturating_add(1);
    schedule_highlight_clear(tx, view_data.highlight_token);
}

fn resolve_scroll_target(title: &DemandTitle, target: ScrollTarget) -> Option<usize> {
    let wanted = match target {
        ScrollTarget::Demand { demand } => ColumnRow::Demand { demand },
        ScrollTarget::PatientType {
            demand,
            patient_type,
        } => ColumnRow::PatientType {
            demand,
            patient_type,
        },
    };
    column_rows(title).iter().position(|&row| row == wanted)
}

fn column_row_label(title: &DemandTitle, row: ColumnRow) -> String {
    match row {
        ColumnRow::Demand { demand } => {
            let Some(demand_ref) = title.demands.get(demand) else {
                return String::new();
            };
            if demand_ref.patient_types.is_empty() {
                format!("{} (no patient types)", demand_ref.name)
            } else {
                demand_ref.name.clone()
            }
        }
        ColumnRow::PatientType {
            demand,
            patient_type,
        } => title
            .demands
            .get(demand)
            .and_then(|demand_ref| demand_ref.patient_types.get(patient_type))
            .map(|patient_type_ref| format!("    {}", patient_type_ref.name))
            .unwrap_or_default(),
    }
}

fn column_rows(title: &DemandTitle) -> Vec<ColumnRow> {
    let mut rows = Vec::new();
    for (demand_index, demand) in title.demands.iter().enumerate() {
        rows.push(ColumnRow::Demand {
            demand: demand_index,
        });
        for patient_type_index in 0..demand.patient_types.len() {
            rows.push(ColumnRow::PatientType {
                demand: demand_index,
                patient_type: patient_type_index,
            });
        }
    }
    rows
}

fn clamp_cursors(state: &SelectionState, view_data: &mut ViewData) {
    view_data.picker_cursor = view_data
        .picker_cursor
        .min(view_data.picker_order.len().saturating_sub(1));
    let title_count = state
        .selected_customer()
        .map_or(0, |customer| customer.demand_titles.len());
    view_data.title_cursor = view_data.title_cursor.min(title_count.saturating_sub(1));
    let row_count = state
        .selected_title()
        .map_or(0, |title| column_rows(title).len());
    view_data.column_cursor = view_data.column_cursor.min(row_count.saturating_sub(1));
    view_data.actions_cursor = view_data
        .actions_cursor
        .min(state.current_actions().len().saturating_sub(1));
}

fn open_search(
    state: &SelectionState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    scope: SearchScope,
) {
    match scope {
        SearchScope::Contextual => {
            if state.selected_customer().is_none() {
                emit_status(view_data, tx, "select a customer before searching");
                return;
            }
        }
        SearchScope::Global => {
            if state.customers().is_empty() {
                emit_status(view_data, tx, "no customers loaded yet");
                return;
            }
        }
    }
    view_data.search = SearchUiState {
        visible: true,
        scope,
        ..SearchUiState::default()
    };
}

fn handle_search_key<R: AppRuntime>(
    state: &mut SelectionState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            view_data.search = SearchUiState::default();
        }
        (KeyCode::Up, _) => {
            view_data.search.cursor = view_data.search.cursor.saturating_sub(1);
        }
        (KeyCode::Char('p'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.search.cursor = view_data.search.cursor.saturating_sub(1);
        }
        (KeyCode::Down, _) => {
            view_data.search.cursor = view_data.search.cursor.saturating_add(1);
        }
        (KeyCode::Char('n'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.search.cursor = view_data.search.cursor.saturating_add(1);
        }
        (KeyCode::Backspace, _) => {
            view_data.search.query.pop();
            on_query_changed(runtime, view_data, tx);
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.search.query.clear();
            on_query_changed(runtime, view_data, tx);
        }
        (KeyCode::Tab, _) => {
            toggle_disclosure(state, view_data);
        }
        (KeyCode::Enter, _) => {
            let rows = search_rows(state, view_data);
            if let Some(&row) = rows.get(view_data.search.cursor.min(rows.len().saturating_sub(1)))
                && !rows.is_empty()
            {
                select_search_row(state, view_data, tx, row);
            }
        }
        (KeyCode::Char(ch), modifiers)
            if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT =>
        {
            view_data.search.query.push(ch);
            on_query_changed(runtime, view_data, tx);
        }
        _ => {}
    }

    let row_count = search_rows(state, view_data).len();
    if row_count == 0 {
        view_data.search.cursor = 0;
    } else {
        view_data.search.cursor = view_data.search.cursor.min(row_count - 1);
    }
}

fn on_query_changed<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    view_data.search.token = view_data.search.token.saturating_add(1);
    if view_data.search.query.trim().is_empty() {
        // Blank queries close the dropdown immediately; no timer needed,
        // and bumping the token above orphans any pending one.
        view_data.search.matches.clear();
        view_data.search.expanded = None;
        view_data.search.cursor = 0;
        return;
    }
    schedule_search_debounce(tx, view_data.search.token, runtime.search_debounce());
}

fn run_search(state: &SelectionState, cap: usize, view_data: &mut ViewData) {
    let matches = match view_data.search.scope {
        SearchScope::Contextual => view_data
            .contextual_index
            .filter(&view_data.search.query, cap),
        SearchScope::Global => {
            let index = view_data
                .global_index
                .get_or_insert_with(|| SearchIndex::build_global(state.customers()));
            index.filter(&view_data.search.query, cap)
        }
    };
    view_data.search.matches = matches;
    view_data.search.expanded = None;
    view_data.search.cursor = 0;
}

fn active_search_index<'a>(view_data: &'a ViewData) -> Option<&'a SearchIndex> {
    match view_data.search.scope {
        SearchScope::Contextual => Some(&view_data.contextual_index),
        SearchScope::Global => view_data.global_index.as_ref(),
    }
}

fn search_rows(state: &SelectionState, view_data: &ViewData) -> Vec<SearchRow> {
    match view_data.search.scope {
        SearchScope::Contextual => match state.selected_customer() {
            Some(customer) => view_data.contextual_index.disclose(
                customer,
                &view_data.search.matches,
                view_data.search.expanded,
            ),
            None => Vec::new(),
        },
        // Two-phase disclosure only exists in the contextual overlay.
        SearchScope::Global => view_data
            .search
            .matches
            .iter()
            .map(|&entry_id| SearchRow::Match(entry_id))
            .collect(),
    }
}

fn toggle_disclosure(state: &SelectionState, view_data: &mut ViewData) {
    if view_data.search.scope != SearchScope::Contextual {
        return;
    }
    let rows = search_rows(state, view_data);
    let Some(&SearchRow::Match(entry_id)) = rows.get(view_data.search.cursor) else {
        return;
    };
    let Some(entry) = view_data.contextual_index.entry(entry_id) else {
        return;
    };
    if entry.kind != EntryKind::Demand {
        return;
    }
    view_data.search.expanded = if view_data.search.expanded == Some(entry_id) {
        None
    } else {
        Some(entry_id)
    };
}

fn select_search_row(
    state: &mut SelectionState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    row: SearchRow,
) {
    let mut events = Vec::new();
    match row {
        SearchRow::Match(entry_id) => {
            let Some(entry) = active_search_index(view_data).and_then(|index| index.entry(entry_id))
            else {
                return;
            };
            let path = entry.path;
            let customer_index = entry.customer;
            if let Some(customer_index) = customer_index {
                let Some(customer) = state.customers().get(customer_index) else {
                    return;
                };
                let did = customer.did_number.clone();
                events.extend(state.dispatch(SelectCommand::SelectCustomer(did)));
            }
            events.extend(state.dispatch(SelectCommand::ApplySearchHit(path)));
        }
        SearchRow::SyntheticPatientType { customer, path } => {
            if let Some(customer_index) = customer {
                let Some(customer) = state.customers().get(customer_index) else {
                    return;
                };
                let did = customer.did_number.clone();
                events.extend(state.dispatch(SelectCommand::SelectCustomer(did)));
            }
            events.extend(state.dispatch(SelectCommand::ApplySearchHit(Some(path))));
        }
    }

    view_data.search = SearchUiState::default();
    view_data.title_cursor = state.selected_title_index().unwrap_or(0);
    apply_dispatch_effects(state, view_data, tx, &events);
}

fn handle_form_key<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(form) = view_data.form.as_mut() else {
        return;
    };

    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            view_data.form = None;
        }
        (KeyCode::Tab, _) | (KeyCode::Down, _) => {
            form.field = (form.field + 1) % FormUiState::FIELD_LABELS.len();
        }
        (KeyCode::BackTab, _) | (KeyCode::Up, _) => {
            form.field =
                (form.field + FormUiState::FIELD_LABELS.len() - 1) % FormUiState::FIELD_LABELS.len();
        }
        (KeyCode::Backspace, _) => {
            form.field_mut().pop();
        }
        (KeyCode::Enter, _) => {
            submit_form(runtime, view_data, tx);
        }
        (KeyCode::Char(ch), modifiers)
            if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT =>
        {
            form.field_mut().push(ch);
        }
        _ => {}
    }
}

fn submit_form<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let Some(form) = view_data.form.as_mut() else {
        return;
    };
    let input = form.input();
    if let Err(error) = input.validate() {
        form.error = Some(format!("{error:#}"));
        return;
    }

    match runtime.submit_new_customer(&input.normalized()) {
        Ok(message) => {
            view_data.form = None;
            emit_status(view_data, tx, message);
            if view_data.list_request.is_none() {
                start_list_load(runtime, view_data, tx);
            }
        }
        Err(error) => {
            form.error = Some(format!("{error:#}"));
        }
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &SelectionState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(breadcrumb_text(state, view_data))
        .block(Block::default().title("fiche").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(28), Constraint::Min(1)])
        .split(layout[1]);

    render_customer_list(frame, body[0], state, view_data);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(actions_pane_height(state)),
        ])
        .split(body[1]);

    let info = Paragraph::new(info_text(state))
        .block(Block::default().title("record").borders(Borders::ALL));
    frame.render_widget(info, right[0]);

    render_titles(frame, right[1], state, view_data);
    render_columns(frame, right[2], state, view_data);
    render_actions(frame, right[3], state, view_data);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if view_data.search.visible {
        let area = centered_rect(72, 60, frame.area());
        frame.render_widget(Clear, area);
        let title = match view_data.search.scope {
            SearchScope::Contextual => "search in customer",
            SearchScope::Global => "search everywhere",
        };
        let height = area.height.saturating_sub(2) as usize;
        let overlay = Paragraph::new(search_overlay_text(state, view_data, height))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(overlay, area);
    }

    if let Some(form) = &view_data.form {
        let area = centered_rect(60, 40, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(form_overlay_text(form))
            .block(Block::default().title("add customer").borders(Borders::ALL));
        frame.render_widget(overlay, area);
    }

    if view_data.help_visible {
        let area = centered_rect(74, 55, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let block = Block::default().title(title).borders(Borders::ALL);
    if focused {
        block.border_style(Style::default().fg(Color::Cyan))
    } else {
        block
    }
}

fn actions_pane_height(state: &SelectionState) -> u16 {
    if state.current_actions().is_empty() {
        3
    } else {
        10
    }
}

fn render_customer_list(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &SelectionState,
    view_data: &ViewData,
) {
    let focused = view_data.focus == Focus::Customers;
    let inner_height = area.height.saturating_sub(2) as usize;
    let mut lines = Vec::new();

    let (start, end) = visible_window(
        view_data.picker_cursor,
        view_data.picker_order.len(),
        inner_height,
    );
    for (position, &customer_index) in view_data
        .picker_order
        .iter()
        .enumerate()
        .take(end)
        .skip(start)
    {
        let Some(customer) = state.customers().get(customer_index) else {
            continue;
        };
        let cursor = position == view_data.picker_cursor;
        let selected = state.selected_customer_index() == Some(customer_index);
        let prefix = if cursor { "> " } else { "  " };
        let marker = if selected { "* " } else { "  " };
        let mut style = Style::default();
        if selected {
            style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
        }
        if cursor && focused {
            style = style.bg(Color::DarkGray);
        }
        lines.push(Line::from(Span::styled(
            format!("{prefix}{marker}{}", customer.display_label()),
            style,
        )));
    }
    if lines.is_empty() {
        let placeholder = if view_data.list_request.is_some() {
            "loading..."
        } else {
            "no customers loaded -- press r to retry"
        };
        lines.push(Line::from(placeholder));
    }

    let title = format!("customers ({})", view_data.picker_order.len());
    let widget = Paragraph::new(lines).block(pane_block(title, focused));
    frame.render_widget(widget, area);
}

fn render_titles(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &SelectionState,
    view_data: &ViewData,
) {
    let focused = view_data.focus == Focus::Titles;
    let line = match state.selected_customer() {
        Some(customer) if !customer.demand_titles.is_empty() => {
            let mut spans = Vec::new();
            for (index, title) in customer.demand_titles.iter().enumerate() {
                if index > 0 {
                    spans.push(Span::raw("  "));
                }
                let cursor = focused && index == view_data.title_cursor;
                let selected = state.selected_title_index() == Some(index);
                let mut style = Style::default();
                if selected {
                    style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
                }
                if cursor {
                    style = style.bg(Color::DarkGray);
                }
                let text = if selected {
                    format!("[{}]", title.title)
                } else {
                    format!(" {} ", title.title)
                };
                spans.push(Span::styled(text, style));
            }
            Line::from(spans)
        }
        Some(_) => Line::from("no demand titles for this customer"),
        None => Line::from("select a customer to see demand titles"),
    };

    let widget = Paragraph::new(line).block(pane_block("demand titles".to_owned(), focused));
    frame.render_widget(widget, area);
}

fn render_columns(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &SelectionState,
    view_data: &ViewData,
) {
    let focused = view_data.focus == Focus::Columns;
    let mut lines = Vec::new();

    match state.selected_title() {
        None => {
            lines.push(Line::from(
                "select a demand title above to view its demands",
            ));
        }
        Some(title) if title.demands.is_empty() => {
            lines.push(Line::from("no demands found for this title"));
        }
        Some(title) => {
            let rows = column_rows(title);
            let inner_height = area.height.saturating_sub(2) as usize;
            let (start, end) = visible_window(view_data.column_cursor, rows.len(), inner_height);
            for (position, &row) in rows.iter().enumerate().take(end).skip(start) {
                let cursor = focused && position == view_data.column_cursor;
                let highlighted = view_data.highlight == Some(Highlight { row });
                let mut style = Style::default();
                let selected = match row {
                    ColumnRow::Demand { demand } => {
                        style = style.add_modifier(Modifier::BOLD);
                        state.selected_demand_index() == Some(demand)
                            && state.selected_patient_type_index().is_none()
                    }
                    ColumnRow::PatientType {
                        demand,
                        patient_type,
                    } => {
                        state.selected_demand_index() == Some(demand)
                            && state.selected_patient_type_index() == Some(patient_type)
                    }
                };
                if selected {
                    style = style.fg(Color::Cyan);
                }
                if highlighted {
                    style = style.bg(Color::Yellow).fg(Color::Black);
                } else if cursor {
                    style = style.bg(Color::DarkGray);
                }
                lines.push(Line::from(Span::styled(column_row_label(title, row), style)));
            }
        }
    }

    let widget = Paragraph::new(lines).block(pane_block("demands".to_owned(), focused));
    frame.render_widget(widget, area);
}

fn render_actions(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &SelectionState,
    view_data: &ViewData,
) {
    let focused = view_data.focus == Focus::Actions;
    let mut lines = Vec::new();

    if state.current_actions().is_empty() {
        lines.push(Line::from(
            "no current actions -- pick a patient type to load its actions",
        ));
    } else {
        for (index, action) in state.current_actions().iter().enumerate() {
            let cursor = focused && index == view_data.actions_cursor;
            let marker = if cursor { "> " } else { "  " };
            let mut style = Style::default();
            if cursor {
                style = style.bg(Color::DarkGray);
            }
            for (line_index, text) in split_text_lines(&action.description).into_iter().enumerate()
            {
                let prefix = if line_index == 0 { marker } else { "    " };
                lines.push(Line::from(Span::styled(format!("{prefix}{text}"), style)));
            }
            if action.has_dire_text() {
                for text in split_text_lines(&action.dire_text) {
                    lines.push(Line::from(Span::styled(
                        format!("    ! {text}"),
                        style.fg(Color::Blue),
                    )));
                }
            }
        }
    }

    let title = format!("current actions ({})", state.current_actions().len());
    let widget = Paragraph::new(lines).block(pane_block(title, focused));
    frame.render_widget(widget, area);
}

fn visible_window(cursor: usize, len: usize, height: usize) -> (usize, usize) {
    if height == 0 || len == 0 {
        return (0, 0);
    }
    let start = cursor
        .saturating_sub(height / 2)
        .min(len.saturating_sub(height));
    (start, (start + height).min(len))
}

fn breadcrumb_text(state: &SelectionState, view_data: &ViewData) -> String {
    let mut parts = Vec::new();
    match state.selected_customer() {
        Some(customer) => parts.push(customer.display_label()),
        None => parts.push("no customer selected".to_owned()),
    }
    if let Some(title) = state.selected_title() {
        parts.push(title.title.clone());
    }
    if let Some(demand) = state.selected_demand() {
        parts.push(demand.name.clone());
    }
    if let Some(patient_type) = state.selected_patient_type() {
        parts.push(patient_type.name.clone());
    }

    let mut text = parts.join(" > ");
    if view_data.list_request.is_some() {
        text.push_str("  [loading customers]");
    }
    if let Some(in_flight) = &view_data.refresh_in_flight {
        text.push_str(&format!("  [updating {}]", in_flight.did));
    }
    text
}

fn info_text(state: &SelectionState) -> String {
    let Some(customer) = state.selected_customer() else {
        return "select a customer via the list, / search, or g global search".to_owned();
    };
    let mut lines = vec![format!(
        "{} | {} | {}",
        customer.address, customer.note1, customer.name
    )];
    if !customer.note2.trim().is_empty() {
        lines.push(customer.note2.clone());
    }
    if !customer.note3.trim().is_empty() {
        lines.push(customer.note3.clone());
    }
    lines.join("\n")
}

fn status_text(state: &SelectionState, view_data: &ViewData) -> String {
    let first = if let Some(error) = state.last_error() {
        error.to_owned()
    } else if let Some(status) = &view_data.status_line {
        status.clone()
    } else {
        "tab focus | enter select | / search | g global | a add | u update | r reload | ? help"
            .to_owned()
    };

    let second = match &view_data.update_status {
        Some(UpdateStatus::Success(message)) => format!("update: {message} (x dismiss)"),
        Some(UpdateStatus::Error(message)) => format!("update: {message} (x dismiss)"),
        None => String::new(),
    };
    format!("{first}\n{second}")
}

fn search_overlay_text(state: &SelectionState, view_data: &ViewData, height: usize) -> String {
    let mut lines = Vec::new();
    lines.push(format!("query: {}", view_data.search.query));

    let rows = search_rows(state, view_data);
    if view_data.search.query.trim().is_empty() {
        lines.push("type to search; results appear after a short pause".to_owned());
    } else if rows.is_empty() {
        lines.push("(no matches)".to_owned());
    } else {
        let position = view_data.search.cursor.min(rows.len() - 1) + 1;
        lines.push(format!("{position}/{} results", rows.len()));
        lines.push(String::new());

        let list_height = height.saturating_sub(5).max(1);
        let (start, end) = visible_window(view_data.search.cursor, rows.len(), list_height);
        for (position, row) in rows.iter().enumerate().take(end).skip(start) {
            let prefix = if position == view_data.search.cursor {
                "> "
            } else {
                "  "
            };
            lines.push(format!(
                "{prefix}{}",
                search_row_label(state, view_data, *row)
            ));
        }
    }

    lines.push(String::new());
    let hint = match view_data.search.scope {
        SearchScope::Contextual => {
            "type filter | up/down pick | tab expand demand | enter select | esc close"
        }
        SearchScope::Global => "type filter | up/down pick | enter select | esc close",
    };
    lines.push(hint.to_owned());
    lines.join("\n")
}

fn search_row_label(state: &SelectionState, view_data: &ViewData, row: SearchRow) -> String {
    match row {
        SearchRow::Match(entry_id) => {
            let Some(entry) = active_search_index(view_data).and_then(|index| index.entry(entry_id))
            else {
                return String::new();
            };
            let expanded = view_data.search.expanded == Some(entry_id);
            let marker = if expanded {
                "v "
            } else if entry.kind == EntryKind::Demand
                && view_data.search.scope == SearchScope::Contextual
            {
                "+ "
            } else {
                "  "
            };
            format!(
                "{marker}{} -- {}: {}",
                entry.display_path,
                entry.kind.label(),
                highlight_match(&entry.display_match, &view_data.search.query)
            )
        }
        SearchRow::SyntheticPatientType { path, .. } => {
            let name = state
                .selected_customer()
                .and_then(|customer| customer.demand_titles.get(path.title))
                .and_then(|title| title.demands.get(path.demand?))
                .and_then(|demand| demand.patient_types.get(path.patient_type?))
                .map(|patient_type| patient_type.name.as_str())
                .unwrap_or("?");
            format!("      -> Type: {name}")
        }
    }
}

/// Wraps the first case-insensitive occurrence of the query in brackets.
/// Texts whose lowercase form changes byte length are left unmarked.
fn highlight_match(text: &str, query: &str) -> String {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return text.to_owned();
    }
    let lower_text = text.to_lowercase();
    let lower_query = query.to_lowercase();
    if lower_text.len() != text.len() {
        return text.to_owned();
    }
    let Some(start) = lower_text.find(&lower_query) else {
        return text.to_owned();
    };
    let end = start + lower_query.len();
    match (text.get(..start), text.get(start..end), text.get(end..)) {
        (Some(prefix), Some(matched), Some(suffix)) => format!("{prefix}[{matched}]{suffix}"),
        _ => text.to_owned(),
    }
}

fn form_overlay_text(form: &FormUiState) -> String {
    let values = [&form.name, &form.did_number, &form.sheet_url];
    let mut lines = vec!["enter the customer details and the sheet to import".to_owned()];
    lines.push(String::new());
    for (index, label) in FormUiState::FIELD_LABELS.iter().enumerate() {
        let prefix = if index == form.field { "> " } else { "  " };
        lines.push(format!("{prefix}{label}: {}", values[index]));
    }
    lines.push(String::new());
    if let Some(error) = &form.error {
        lines.push(format!("error: {error}"));
        lines.push(String::new());
    }
    lines.push("tab/shift+tab field | enter submit | esc cancel".to_owned());
    lines.join("\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help | esc dismiss\n\
nav: tab/shift+tab focus pane | j/k or arrows move | enter select\n\
customers: enter select | esc clear selection\n\
demands: enter on a demand or patient type selects it\n\
actions: d remove under cursor | C clear all\n\
search: / in-customer | g everywhere | type filter | tab expand demand\n\
search: up/down or ctrl+p/ctrl+n pick | enter apply | esc close\n\
data: u update selected from sheet | r reload customer list | x dismiss update status\n\
add: a open form | tab field | enter submit | esc cancel"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
