use std::{
    collections::BTreeMap,
    future::Future,
    time::{Duration, Instant},
};

use api_types::{
    MemberId,
    expense::Expense,
    group::Group,
    user::User,
};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use divvy_engine::{
    ApiError, CreateExpenseForm, CreateGroupForm, CreateUserForm, Dashboard, DetailsRequest,
    DetailsUpdate, GroupDetails, GroupSnapshot, GroupSummary, Money, RequestTicket, Route,
    SplitApi, SplitMode, fetch_group, fetch_groups,
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::{
    client::Client,
    config::AppConfig,
    error::{AppError, Result},
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

type ApiResult<T> = std::result::Result<T, ApiError>;

const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    CreateUser,
    CreateGroup,
    GroupDetails,
    AddExpense,
}

impl Screen {
    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Groups",
            Self::CreateUser => "New user",
            Self::CreateGroup => "New group",
            Self::GroupDetails => "Group",
            Self::AddExpense => "Add expense",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    expires_at: Instant,
}

/// Outcome of a background request, delivered to the event loop.
#[derive(Debug)]
pub enum Message {
    Groups(RequestTicket, ApiResult<Vec<GroupSummary>>),
    Details(RequestTicket, DetailsUpdate),
    Users(RequestTicket, ApiResult<Vec<User>>),
    ExpenseGroup(RequestTicket, ApiResult<GroupSnapshot>),
    UserCreated(RequestTicket, ApiResult<User>),
    GroupCreated(RequestTicket, ApiResult<Group>),
    ExpenseCreated(RequestTicket, ApiResult<Expense>),
}

#[derive(Debug, Default)]
pub struct DashboardState {
    pub view: Dashboard,
    pub selected: usize,
}

impl DashboardState {
    fn len(&self) -> usize {
        self.view.groups.ready().map_or(0, Vec::len)
    }

    fn select_next(&mut self) {
        let len = self.len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1).min(len - 1);
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn selected_group(&self) -> Option<&GroupSummary> {
        self.view.groups.ready()?.get(self.selected)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupField {
    #[default]
    Name,
    Members,
}

#[derive(Debug, Default)]
pub struct CreateGroupState {
    pub form: CreateGroupForm,
    pub focus: GroupField,
    pub cursor: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpenseField {
    #[default]
    Amount,
    Payer,
    Split,
}

impl ExpenseField {
    fn next(self) -> Self {
        match self {
            Self::Amount => Self::Payer,
            Self::Payer => Self::Split,
            Self::Split => Self::Amount,
        }
    }
}

#[derive(Debug)]
pub struct ExpenseState {
    pub form: CreateExpenseForm,
    pub focus: ExpenseField,
    pub cursor: usize,
    /// Raw text typed for each member's custom share.
    pub custom_inputs: BTreeMap<MemberId, String>,
}

impl ExpenseState {
    fn new(form: CreateExpenseForm) -> Self {
        Self {
            form,
            focus: ExpenseField::default(),
            cursor: 0,
            custom_inputs: BTreeMap::new(),
        }
    }

    fn member_count(&self) -> usize {
        self.form.split().map_or(0, |split| split.members().len())
    }

    fn member_at_cursor(&self) -> Option<MemberId> {
        self.form.split()?.members().get(self.cursor).cloned()
    }

    fn cycle_payer(&mut self, forward: bool) {
        let Some(group) = self.form.group().ready() else {
            return;
        };
        let ids = group.member_ids();
        if ids.is_empty() {
            return;
        }
        let current = self
            .form
            .payer()
            .and_then(|payer| ids.iter().position(|id| id == payer));
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(idx), true) => (idx + 1) % ids.len(),
            (Some(idx), false) => (idx + ids.len() - 1) % ids.len(),
        };
        self.form.set_payer(&ids[next]);
    }

    fn toggle_member_at_cursor(&mut self) {
        let Some(member) = self.member_at_cursor() else {
            return;
        };
        let Some(split) = self.form.split_mut() else {
            return;
        };
        if !split.toggle(&member) {
            self.custom_inputs.remove(&member);
        }
    }

    fn flip_split_mode(&mut self) {
        let Some(split) = self.form.split_mut() else {
            return;
        };
        split.set_mode(split.mode().flipped());
        if split.mode() == SplitMode::Equal {
            self.custom_inputs.clear();
        }
    }

    /// Edits the custom share of the member under the cursor.
    fn edit_custom(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(member) = self.member_at_cursor() else {
            return;
        };
        let Some(split) = self.form.split_mut() else {
            return;
        };
        if split.mode() != SplitMode::Custom || !split.is_selected(&member) {
            return;
        }
        let input = self.custom_inputs.entry(member.clone()).or_default();
        edit(input);
        split.set_custom_amount(&member, input);
    }
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub dashboard: DashboardState,
    pub create_user: CreateUserForm,
    pub create_group: CreateGroupState,
    pub details: Option<GroupDetails>,
    pub expense: Option<ExpenseState>,
    pub toast: Option<ToastState>,
    pub base_url: String,
}

pub struct App {
    client: Client,
    tolerance: Money,
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url)?;
        let (tx, rx) = unbounded_channel();
        let state = AppState {
            screen: Screen::Dashboard,
            dashboard: DashboardState::default(),
            create_user: CreateUserForm::default(),
            create_group: CreateGroupState::default(),
            details: None,
            expense: None,
            toast: None,
            base_url: config.base_url.clone(),
        };

        Ok(Self {
            client,
            tolerance: config.split_tolerance(),
            tx,
            rx,
            state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        self.open_dashboard();
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(100);

        while !self.should_quit {
            while let Ok(message) = self.rx.try_recv() {
                self.apply(message);
            }
            self.expire_toast();

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    _ => {}
                }
            }
            tokio::task::yield_now().await;
        }

        Ok(())
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Message> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let message = task.await;
            if tx.send(message).is_err() {
                tracing::debug!("event loop is gone, dropping response");
            }
        });
    }

    fn toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.state.toast = Some(ToastState {
            message: message.into(),
            level,
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    fn toast_form_error(&mut self, message: Option<String>) {
        if let Some(message) = message {
            self.toast(ToastLevel::Error, message);
        }
    }

    fn expire_toast(&mut self) {
        if self
            .state
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= Instant::now())
        {
            self.state.toast = None;
        }
    }

    /// Closes the view on screen so that its late responses, including the
    /// answer to a pending submission, are dropped.
    fn leave(&mut self) {
        match self.state.screen {
            Screen::Dashboard => self.state.dashboard.view.close(),
            Screen::CreateUser => self.state.create_user.close(),
            Screen::CreateGroup => self.state.create_group.form.close(),
            Screen::GroupDetails => {
                if let Some(details) = self.state.details.as_mut() {
                    details.close();
                }
            }
            Screen::AddExpense => {
                if let Some(expense) = self.state.expense.as_mut() {
                    expense.form.close();
                }
            }
        }
    }

    fn navigate(&mut self, route: Route) {
        match route {
            Route::Dashboard => self.open_dashboard(),
            Route::Group(group_id) => self.open_details(&group_id),
        }
    }

    fn open_dashboard(&mut self) {
        self.leave();
        self.state.screen = Screen::Dashboard;
        let ticket = self.state.dashboard.view.begin();
        let client = self.client.clone();
        self.spawn(async move { Message::Groups(ticket, fetch_groups(&client).await) });
    }

    fn open_create_user(&mut self) {
        self.leave();
        self.state.screen = Screen::CreateUser;
        self.state.create_user = CreateUserForm::default();
    }

    fn open_create_group(&mut self) {
        self.leave();
        self.state.screen = Screen::CreateGroup;
        self.state.create_group = CreateGroupState::default();
        self.load_users();
    }

    fn load_users(&mut self) {
        let ticket = self.state.create_group.form.begin_load();
        let client = self.client.clone();
        self.spawn(async move { Message::Users(ticket, client.list_users().await) });
    }

    fn open_details(&mut self, group_id: &str) {
        self.leave();
        self.state.screen = Screen::GroupDetails;
        let mut details = GroupDetails::new(group_id);
        let ticket = details.begin();
        for request in DetailsRequest::ALL {
            let client = self.client.clone();
            let ticket = ticket.clone();
            let group_id = group_id.to_string();
            self.spawn(async move {
                Message::Details(ticket, request.run(&client, &group_id).await)
            });
        }
        self.state.details = Some(details);
    }

    fn open_add_expense(&mut self, group_id: &str) {
        self.leave();
        self.state.screen = Screen::AddExpense;
        let mut form = CreateExpenseForm::new(group_id).with_tolerance(self.tolerance);
        let ticket = form.begin_load();
        let client = self.client.clone();
        let id = group_id.to_string();
        self.spawn(async move { Message::ExpenseGroup(ticket, fetch_group(&client, &id).await) });
        self.state.expense = Some(ExpenseState::new(form));
    }

    fn current_group_id(&self) -> Option<String> {
        match self.state.screen {
            Screen::GroupDetails => self
                .state
                .details
                .as_ref()
                .map(|details| details.group_id().to_string()),
            Screen::AddExpense => self
                .state
                .expense
                .as_ref()
                .map(|expense| expense.form.group_id().to_string()),
            _ => None,
        }
    }

    pub fn apply(&mut self, message: Message) {
        match message {
            Message::Groups(ticket, result) => {
                self.state.dashboard.view.apply(&ticket, result);
                let len = self.state.dashboard.len();
                let selected = self.state.dashboard.selected;
                self.state.dashboard.selected = selected.min(len.saturating_sub(1));
            }
            Message::Details(ticket, update) => match self.state.details.as_mut() {
                Some(details) => {
                    details.apply(&ticket, update);
                }
                None => tracing::debug!("no details view for {}", ticket.key()),
            },
            Message::Users(ticket, result) => {
                self.state.create_group.form.apply_users(&ticket, result);
            }
            Message::ExpenseGroup(ticket, result) => {
                if let Some(expense) = self.state.expense.as_mut()
                    && expense.form.apply_group(&ticket, result)
                {
                    expense.cursor = 0;
                    expense.custom_inputs.clear();
                }
            }
            Message::UserCreated(ticket, result) => {
                match self.state.create_user.finish(&ticket, result) {
                    Some(route) => {
                        self.toast(ToastLevel::Success, "User created");
                        self.navigate(route);
                    }
                    None => {
                        let message = self.state.create_user.error().map(str::to_string);
                        self.toast_form_error(message);
                    }
                }
            }
            Message::GroupCreated(ticket, result) => {
                match self.state.create_group.form.finish(&ticket, result) {
                    Some(route) => {
                        self.toast(ToastLevel::Success, "Group created");
                        self.navigate(route);
                    }
                    None => {
                        let message = self.state.create_group.form.error().map(str::to_string);
                        self.toast_form_error(message);
                    }
                }
            }
            Message::ExpenseCreated(ticket, result) => {
                let route = self
                    .state
                    .expense
                    .as_mut()
                    .and_then(|expense| expense.form.finish(&ticket, result));
                match route {
                    Some(route) => {
                        self.toast(ToastLevel::Success, "Expense added");
                        self.navigate(route);
                    }
                    None => {
                        let message = self
                            .state
                            .expense
                            .as_ref()
                            .and_then(|expense| expense.form.error())
                            .map(str::to_string);
                        self.toast_form_error(message);
                    }
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let action = map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }
        match self.state.screen {
            Screen::Dashboard => self.dashboard_key(action),
            Screen::CreateUser => self.create_user_key(action),
            Screen::CreateGroup => self.create_group_key(action),
            Screen::GroupDetails => self.details_key(action),
            Screen::AddExpense => self.expense_key(action),
        }
    }

    fn dashboard_key(&mut self, action: AppAction) {
        match action {
            AppAction::Up | AppAction::Input('k') => self.state.dashboard.select_prev(),
            AppAction::Down | AppAction::Input('j') => self.state.dashboard.select_next(),
            AppAction::Submit => {
                if let Some(group_id) = self
                    .state
                    .dashboard
                    .selected_group()
                    .map(|group| group.id.clone())
                {
                    self.open_details(&group_id);
                }
            }
            AppAction::Input('u') => self.open_create_user(),
            AppAction::Input('g') => self.open_create_group(),
            AppAction::Input('r') => self.open_dashboard(),
            AppAction::Input('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn create_user_key(&mut self, action: AppAction) {
        match action {
            AppAction::Cancel => return self.open_dashboard(),
            AppAction::Submit => return self.submit_user(),
            _ => {}
        }
        let form = &mut self.state.create_user;
        if form.is_busy() {
            return;
        }
        match action {
            AppAction::Backspace => {
                form.name.pop();
            }
            AppAction::Input(ch) => form.name.push(ch),
            _ => {}
        }
    }

    fn create_group_key(&mut self, action: AppAction) {
        let focus = self.state.create_group.focus;
        match (action, focus) {
            (AppAction::Cancel, _) => return self.open_dashboard(),
            (AppAction::Submit, _) => return self.submit_group(),
            (AppAction::Input('r'), GroupField::Members) => {
                if self.state.create_group.form.users().error().is_some() {
                    self.load_users();
                }
                return;
            }
            _ => {}
        }

        let state = &mut self.state.create_group;
        if action == AppAction::NextField {
            state.focus = match focus {
                GroupField::Name => GroupField::Members,
                GroupField::Members => GroupField::Name,
            };
            return;
        }
        if state.form.is_busy() {
            return;
        }
        match (action, focus) {
            (AppAction::Backspace, GroupField::Name) => {
                state.form.name.pop();
            }
            (AppAction::Input(ch), GroupField::Name) => state.form.name.push(ch),
            (AppAction::Up, GroupField::Members) => state.cursor = state.cursor.saturating_sub(1),
            (AppAction::Down, GroupField::Members) => {
                let len = state.form.users().ready().map_or(0, Vec::len);
                state.cursor = (state.cursor + 1).min(len.saturating_sub(1));
            }
            (AppAction::Input(' '), GroupField::Members) => {
                let Some(user_id) = state
                    .form
                    .users()
                    .ready()
                    .and_then(|users| users.get(state.cursor))
                    .map(|user| user.id.clone())
                else {
                    return;
                };
                if state.form.is_selected(&user_id) {
                    state.form.remove(&user_id);
                } else {
                    state.form.select(&user_id);
                }
            }
            _ => {}
        }
    }

    fn details_key(&mut self, action: AppAction) {
        let Some(group_id) = self.current_group_id() else {
            self.open_dashboard();
            return;
        };
        match action {
            AppAction::Cancel | AppAction::Input('b') => self.open_dashboard(),
            AppAction::Input('a') => self.open_add_expense(&group_id),
            AppAction::Input('s') => {
                if let Some(details) = self.state.details.as_mut() {
                    let mode = details.settlement.toggle();
                    tracing::debug!("settlement view switched to {}", mode.label());
                }
            }
            AppAction::Input('r') => self.open_details(&group_id),
            AppAction::Input('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn expense_key(&mut self, action: AppAction) {
        let Some(group_id) = self.current_group_id() else {
            self.open_dashboard();
            return;
        };
        match action {
            AppAction::Cancel => return self.open_details(&group_id),
            AppAction::Submit => return self.submit_expense(),
            _ => {}
        }

        let Some(state) = self.state.expense.as_mut() else {
            return;
        };
        if action == AppAction::NextField {
            state.focus = state.focus.next();
            return;
        }
        if state.form.is_busy() {
            return;
        }
        match (action, state.focus) {
            (AppAction::Backspace, ExpenseField::Amount) => {
                state.form.amount.pop();
            }
            (AppAction::Input(ch), ExpenseField::Amount) => state.form.amount.push(ch),
            (AppAction::Up, ExpenseField::Payer) => state.cycle_payer(false),
            (AppAction::Down, ExpenseField::Payer) => state.cycle_payer(true),
            (AppAction::Up, ExpenseField::Split) => state.cursor = state.cursor.saturating_sub(1),
            (AppAction::Down, ExpenseField::Split) => {
                state.cursor = (state.cursor + 1).min(state.member_count().saturating_sub(1));
            }
            (AppAction::Input(' '), ExpenseField::Split) => state.toggle_member_at_cursor(),
            (AppAction::Input('m'), ExpenseField::Split) => state.flip_split_mode(),
            (AppAction::Backspace, ExpenseField::Split) => state.edit_custom(|input| {
                input.pop();
            }),
            (AppAction::Input(ch), ExpenseField::Split) => {
                state.edit_custom(|input| input.push(ch));
            }
            _ => {}
        }
    }

    fn submit_user(&mut self) {
        match self.state.create_user.begin_submit() {
            Ok((ticket, payload)) => {
                tracing::info!("creating user {}", payload.name);
                let client = self.client.clone();
                self.spawn(async move {
                    Message::UserCreated(ticket, client.create_user(&payload).await)
                });
            }
            Err(err) => tracing::debug!("user form refused submit: {err}"),
        }
    }

    fn submit_group(&mut self) {
        match self.state.create_group.form.begin_submit() {
            Ok((ticket, payload)) => {
                tracing::info!(
                    "creating group {} with {} members",
                    payload.name,
                    payload.members.len()
                );
                let client = self.client.clone();
                self.spawn(async move {
                    Message::GroupCreated(ticket, client.create_group(&payload).await)
                });
            }
            Err(err) => tracing::debug!("group form refused submit: {err}"),
        }
    }

    fn submit_expense(&mut self) {
        let Some(expense) = self.state.expense.as_mut() else {
            return;
        };
        match expense.form.begin_submit() {
            Ok((ticket, payload)) => {
                tracing::info!(
                    "creating expense of {} in group {}",
                    payload.amount,
                    payload.group_id
                );
                let client = self.client.clone();
                self.spawn(async move {
                    Message::ExpenseCreated(ticket, client.create_expense(&payload).await)
                });
            }
            Err(err) => tracing::debug!("expense form refused submit: {err}"),
        }
    }
}
