//! Controllers for the three entry forms.
//!
//! All of them share one submission state machine:
//!
//! ```text
//! Idle --begin_submit--> Submitting --finish(Ok)--> Succeeded
//!   ^                        |
//!   +-----finish(Err)--------+   (error message kept)
//! ```
//!
//! Submission is split in two halves so that a UI can run the request in the
//! background: [`begin_submit`] validates and hands out the request body
//! together with a [`RequestTicket`], `finish` applies the server's answer
//! for that ticket. `submit` chains both for callers that can simply await.
//!
//! Closing a form abandons its pending submission: the answer is dropped
//! when it lands and produces no [`Route`].
//!
//! [`begin_submit`]: CreateUserForm::begin_submit
use api_types::{
    MemberId,
    expense::{Expense, ExpenseNew},
    group::{Group, GroupNew},
    user::{User, UserNew},
};

use crate::{
    ApiError, FormError, Money, RequestTicket, Resource, SplitAllocator, SplitApi, StaleGuard,
    ValidationError,
    groups::{FETCH_GROUP_FAILED, GroupSnapshot, fetch_group},
    split::DEFAULT_TOLERANCE,
};

pub const CREATE_USER_FAILED: &str = "Failed to create user";
pub const CREATE_GROUP_FAILED: &str = "Failed to create group";
pub const CREATE_EXPENSE_FAILED: &str = "Failed to create expense";
pub const FETCH_USERS_FAILED: &str = "Failed to fetch users";

const USERS_KEY: &str = "users";
const CREATE_USER_KEY: &str = "create-user";
const CREATE_GROUP_KEY: &str = "create-group";

/// Where to go once a form has been submitted successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Group(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
}

#[derive(Debug, Clone, Default)]
struct Submission {
    status: FormStatus,
    error: Option<String>,
    guard: StaleGuard,
}

impl Submission {
    fn begin<T>(
        &mut self,
        key: &str,
        payload: Result<T, ValidationError>,
    ) -> Result<(RequestTicket, T), FormError> {
        match self.status {
            FormStatus::Submitting => return Err(FormError::AlreadySubmitting),
            FormStatus::Succeeded => return Err(FormError::AlreadySubmitted),
            FormStatus::Idle => {}
        }
        match payload {
            Ok(payload) => {
                self.error = None;
                self.status = FormStatus::Submitting;
                Ok((self.guard.begin(key), payload))
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    fn finish<T>(
        &mut self,
        ticket: &RequestTicket,
        result: Result<T, ApiError>,
        fallback: &str,
        route: Route,
    ) -> Option<Route> {
        if !self.guard.accepts(ticket) {
            tracing::debug!("dropping response for abandoned submission {}", ticket.key());
            return None;
        }
        if self.status != FormStatus::Submitting {
            tracing::debug!("ignoring response for a form that is not submitting");
            return None;
        }
        match result {
            Ok(_) => {
                self.status = FormStatus::Succeeded;
                Some(route)
            }
            Err(err) => {
                self.status = FormStatus::Idle;
                self.error = Some(err.user_message(fallback));
                None
            }
        }
    }

    fn abandon(&mut self) {
        self.guard.close();
        if self.status == FormStatus::Submitting {
            self.status = FormStatus::Idle;
        }
    }
}

macro_rules! submission_accessors {
    () => {
        pub fn status(&self) -> FormStatus {
            self.submission.status
        }

        /// `true` while a request is in flight; the submit control must be
        /// disabled.
        pub fn is_busy(&self) -> bool {
            self.submission.status == FormStatus::Submitting
        }

        /// Last validation or server error, kept until the next attempt.
        pub fn error(&self) -> Option<&str> {
            self.submission.error.as_deref()
        }

        /// Ticket of the submission in flight, if any.
        pub fn pending(&self) -> Option<&RequestTicket> {
            self.submission
                .guard
                .current()
                .filter(|_| self.submission.status == FormStatus::Submitting)
        }
    };
}

/// "Create user" form.
#[derive(Debug, Clone, Default)]
pub struct CreateUserForm {
    pub name: String,
    submission: Submission,
}

impl CreateUserForm {
    submission_accessors!();

    pub fn begin_submit(&mut self) -> Result<(RequestTicket, UserNew), FormError> {
        let name = self.name.trim();
        let payload = if name.is_empty() {
            Err(ValidationError::MissingUserName)
        } else {
            Ok(UserNew {
                name: name.to_string(),
            })
        };
        self.submission.begin(CREATE_USER_KEY, payload)
    }

    pub fn finish(
        &mut self,
        ticket: &RequestTicket,
        result: Result<User, ApiError>,
    ) -> Option<Route> {
        self.submission.finish(ticket, result, CREATE_USER_FAILED, Route::Dashboard)
    }

    /// Called when the form is left; a pending submission is abandoned.
    pub fn close(&mut self) {
        self.submission.abandon();
    }

    pub async fn submit<A: SplitApi>(&mut self, api: &A) -> Result<Option<Route>, FormError> {
        let (ticket, payload) = self.begin_submit()?;
        tracing::info!("creating user {}", payload.name);
        let result = api.create_user(&payload).await;
        Ok(self.finish(&ticket, result))
    }
}

/// "Create group" form.
///
/// Members are picked from the user list fetched on entry. Selection is by
/// user id, so the same user can never be added twice.
#[derive(Debug, Clone, Default)]
pub struct CreateGroupForm {
    pub name: String,
    users: Resource<Vec<User>>,
    selected: Vec<User>,
    guard: StaleGuard,
    submission: Submission,
}

impl CreateGroupForm {
    submission_accessors!();

    pub fn begin_load(&mut self) -> RequestTicket {
        self.users = Resource::Loading;
        self.guard.begin(USERS_KEY)
    }

    /// Called when the form is left. Late user lists and a pending
    /// submission are both dropped.
    pub fn close(&mut self) {
        self.guard.close();
        self.submission.abandon();
    }

    pub fn apply_users(
        &mut self,
        ticket: &RequestTicket,
        result: Result<Vec<User>, ApiError>,
    ) -> bool {
        if !self.guard.accepts(ticket) {
            tracing::debug!("dropping stale user list");
            return false;
        }
        self.users = Resource::from_list_result(result, FETCH_USERS_FAILED);
        true
    }

    pub async fn load_users<A: SplitApi>(&mut self, api: &A) {
        let ticket = self.begin_load();
        let result = api.list_users().await;
        self.apply_users(&ticket, result);
    }

    pub fn users(&self) -> &Resource<Vec<User>> {
        &self.users
    }

    pub fn selected(&self) -> &[User] {
        &self.selected
    }

    pub fn is_selected(&self, user_id: &str) -> bool {
        self.selected.iter().any(|user| user.id == user_id)
    }

    /// Adds a loaded user to the group. Returns `false` if the user is
    /// unknown or already selected.
    pub fn select(&mut self, user_id: &str) -> bool {
        if self.is_selected(user_id) {
            return false;
        }
        let Some(user) = self
            .users
            .ready()
            .and_then(|users| users.iter().find(|user| user.id == user_id))
        else {
            return false;
        };
        self.selected.push(user.clone());
        true
    }

    pub fn remove(&mut self, user_id: &str) {
        self.selected.retain(|user| user.id != user_id);
    }

    pub fn begin_submit(&mut self) -> Result<(RequestTicket, GroupNew), FormError> {
        let name = self.name.trim();
        let payload = if name.is_empty() {
            Err(ValidationError::MissingGroupName)
        } else if self.users.is_loading() {
            Err(ValidationError::UsersLoading)
        } else if self.selected.is_empty() {
            Err(ValidationError::NoGroupMembers)
        } else {
            Ok(GroupNew {
                name: name.to_string(),
                members: self.selected.iter().map(|user| user.id.clone()).collect(),
            })
        };
        self.submission.begin(CREATE_GROUP_KEY, payload)
    }

    pub fn finish(
        &mut self,
        ticket: &RequestTicket,
        result: Result<Group, ApiError>,
    ) -> Option<Route> {
        self.submission.finish(ticket, result, CREATE_GROUP_FAILED, Route::Dashboard)
    }

    pub async fn submit<A: SplitApi>(&mut self, api: &A) -> Result<Option<Route>, FormError> {
        let (ticket, payload) = self.begin_submit()?;
        tracing::info!(
            "creating group {} with {} members",
            payload.name,
            payload.members.len()
        );
        let result = api.create_group(&payload).await;
        Ok(self.finish(&ticket, result))
    }
}

/// "Add expense" form of one group.
///
/// The group is fetched on entry; once it arrives every member is
/// pre-selected for the split.
#[derive(Debug, Clone)]
pub struct CreateExpenseForm {
    group_id: String,
    group: Resource<GroupSnapshot>,
    guard: StaleGuard,
    pub amount: String,
    payer: Option<MemberId>,
    split: Option<SplitAllocator>,
    tolerance: Money,
    submission: Submission,
}

impl CreateExpenseForm {
    submission_accessors!();

    pub fn new(group_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            group: Resource::Loading,
            guard: StaleGuard::default(),
            amount: String::new(),
            payer: None,
            split: None,
            tolerance: DEFAULT_TOLERANCE,
            submission: Submission::default(),
        }
    }

    /// Tolerance handed to the split allocator when the group arrives.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Money) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn group(&self) -> &Resource<GroupSnapshot> {
        &self.group
    }

    pub fn begin_load(&mut self) -> RequestTicket {
        self.group = Resource::Loading;
        self.split = None;
        self.payer = None;
        self.guard.begin(&self.group_id)
    }

    pub fn load_ticket(&self) -> Option<&RequestTicket> {
        self.guard.current()
    }

    pub fn close(&mut self) {
        self.guard.close();
        self.submission.abandon();
    }

    /// Applies the group fetch. A failure leaves no group and no split
    /// behind.
    pub fn apply_group(
        &mut self,
        ticket: &RequestTicket,
        result: Result<GroupSnapshot, ApiError>,
    ) -> bool {
        if !self.guard.accepts(ticket) {
            tracing::debug!("dropping stale group for expense form {}", ticket.key());
            return false;
        }
        self.group = Resource::from_result(result, FETCH_GROUP_FAILED);
        self.split = self.group.ready().map(|group| {
            SplitAllocator::new(group.member_ids()).with_tolerance(self.tolerance)
        });
        true
    }

    pub async fn load<A: SplitApi>(&mut self, api: &A) {
        let ticket = self.begin_load();
        let result = fetch_group(api, &self.group_id).await;
        self.apply_group(&ticket, result);
    }

    pub fn payer(&self) -> Option<&str> {
        self.payer.as_deref()
    }

    /// Sets who paid. Only members of the loaded group are accepted.
    pub fn set_payer(&mut self, member: &str) -> bool {
        let known = self
            .group
            .ready()
            .is_some_and(|group| group.member(member).is_some());
        if known {
            self.payer = Some(member.to_string());
        }
        known
    }

    pub fn split(&self) -> Option<&SplitAllocator> {
        self.split.as_ref()
    }

    pub fn split_mut(&mut self) -> Option<&mut SplitAllocator> {
        self.split.as_mut()
    }

    /// The amount field, if it currently holds a number.
    pub fn amount_value(&self) -> Option<Money> {
        Money::parse_input(&self.amount)
    }

    fn payload(&self) -> Result<ExpenseNew, ValidationError> {
        let (Some(split), Some(payer)) = (self.split.as_ref(), self.payer.as_ref()) else {
            return Err(ValidationError::MissingFields);
        };
        if self.amount.trim().is_empty() {
            return Err(ValidationError::MissingFields);
        }
        let amount = self
            .amount_value()
            .filter(|amount| amount.is_positive())
            .ok_or(ValidationError::InvalidAmount)?;
        let split = split.validate(amount)?;

        Ok(ExpenseNew {
            group_id: self.group_id.clone(),
            payer_id: payer.clone(),
            amount: amount.to_major(),
            split_among: split.split_among,
        })
    }

    pub fn begin_submit(&mut self) -> Result<(RequestTicket, ExpenseNew), FormError> {
        let payload = self.payload();
        self.submission.begin(&self.group_id, payload)
    }

    pub fn finish(
        &mut self,
        ticket: &RequestTicket,
        result: Result<Expense, ApiError>,
    ) -> Option<Route> {
        let route = Route::Group(self.group_id.clone());
        self.submission.finish(ticket, result, CREATE_EXPENSE_FAILED, route)
    }

    pub async fn submit<A: SplitApi>(&mut self, api: &A) -> Result<Option<Route>, FormError> {
        let (ticket, payload) = self.begin_submit()?;
        tracing::info!(
            "creating expense of {} in group {} split among {}",
            payload.amount,
            payload.group_id,
            payload.split_among.len()
        );
        let result = api.create_expense(&payload).await;
        Ok(self.finish(&ticket, result))
    }
}
