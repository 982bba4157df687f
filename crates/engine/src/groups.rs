//! Loading groups and their expenses, and the views built from them.
use api_types::{
    MemberId,
    balance::Transaction,
    expense::Expense,
    group::Group,
    user::User,
};
use chrono::{DateTime, Utc};

use crate::{
    ApiError, Money, RequestTicket, Resource, SplitApi, StaleGuard,
    members::{member_ids, normalize, normalize_all, unique_ids},
    settlement::{SettlementMode, SettlementView, fetch_settlement},
};

pub const FETCH_GROUP_FAILED: &str = "Failed to fetch group details";
pub const FETCH_EXPENSES_FAILED: &str = "Failed to fetch expenses";
pub const FETCH_GROUPS_FAILED: &str = "Failed to fetch groups";

const DASHBOARD_KEY: &str = "dashboard";

/// A group with every member normalized to a full record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSnapshot {
    pub id: String,
    pub name: String,
    pub members: Vec<User>,
}

impl GroupSnapshot {
    pub fn from_group(group: Group) -> Self {
        Self {
            members: normalize_all(&group.members),
            id: group.id,
            name: group.name,
        }
    }

    /// All member ids, in group order. Used to pre-select everybody when an
    /// expense is entered.
    pub fn member_ids(&self) -> Vec<MemberId> {
        unique_ids(self.members.iter().map(|member| member.id.as_str()))
    }

    pub fn member(&self, id: &str) -> Option<&User> {
        self.members.iter().find(|member| member.id == id)
    }
}

/// An expense ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseView {
    pub id: String,
    pub group_id: String,
    pub payer: User,
    pub amount: Money,
    pub split_among: Vec<User>,
    pub created_at: DateTime<Utc>,
}

impl ExpenseView {
    pub fn from_expense(expense: Expense) -> Result<Self, ApiError> {
        let amount = Money::from_major(expense.amount).ok_or_else(|| {
            ApiError::Malformed(format!("expense {} has an invalid amount", expense.id))
        })?;
        Ok(Self {
            group_id: expense.group_id.id().to_string(),
            payer: normalize(&expense.payer_id),
            split_among: normalize_all(&expense.split_among),
            amount,
            created_at: expense.created_at,
            id: expense.id,
        })
    }
}

/// One row of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub id: String,
    pub name: String,
    pub member_count: usize,
}

impl From<Group> for GroupSummary {
    fn from(group: Group) -> Self {
        Self {
            member_count: member_ids(&group.members).len(),
            id: group.id,
            name: group.name,
        }
    }
}

/// Fetches one group and normalizes its members.
pub async fn fetch_group<A: SplitApi>(api: &A, group_id: &str) -> Result<GroupSnapshot, ApiError> {
    let group = api.get_group(group_id).await?;
    Ok(GroupSnapshot::from_group(group))
}

/// Fetches the expenses of a group, in server order.
pub async fn fetch_expenses<A: SplitApi>(
    api: &A,
    group_id: &str,
) -> Result<Vec<ExpenseView>, ApiError> {
    api.list_expenses(group_id)
        .await?
        .into_iter()
        .map(ExpenseView::from_expense)
        .collect()
}

/// Fetches every group for the dashboard.
pub async fn fetch_groups<A: SplitApi>(api: &A) -> Result<Vec<GroupSummary>, ApiError> {
    let groups = api.list_groups().await?;
    Ok(groups.into_iter().map(GroupSummary::from).collect())
}

/// One of the independent requests a group details load is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsRequest {
    Group,
    Expenses,
    Settlement(SettlementMode),
}

impl DetailsRequest {
    /// Every request issued on a details load. Both settlement plans are
    /// always part of it, whatever mode is on screen.
    pub const ALL: [DetailsRequest; 4] = [
        DetailsRequest::Group,
        DetailsRequest::Expenses,
        DetailsRequest::Settlement(SettlementMode::Direct),
        DetailsRequest::Settlement(SettlementMode::Simplified),
    ];

    pub async fn run<A: SplitApi>(self, api: &A, group_id: &str) -> DetailsUpdate {
        match self {
            Self::Group => DetailsUpdate::Group(fetch_group(api, group_id).await),
            Self::Expenses => DetailsUpdate::Expenses(fetch_expenses(api, group_id).await),
            Self::Settlement(mode) => {
                DetailsUpdate::Settlement(mode, fetch_settlement(api, group_id, mode).await)
            }
        }
    }
}

/// The outcome of one [`DetailsRequest`].
#[derive(Debug, Clone)]
pub enum DetailsUpdate {
    Group(Result<GroupSnapshot, ApiError>),
    Expenses(Result<Vec<ExpenseView>, ApiError>),
    Settlement(SettlementMode, Result<Vec<Transaction>, ApiError>),
}

/// State of the group details screen.
///
/// Each panel (group header, expenses, balances) has its own load state and
/// is filled in as its response arrives, in whatever order that happens.
#[derive(Debug, Clone)]
pub struct GroupDetails {
    group_id: String,
    guard: StaleGuard,
    pub group: Resource<GroupSnapshot>,
    pub expenses: Resource<Vec<ExpenseView>>,
    pub settlement: SettlementView,
}

impl GroupDetails {
    pub fn new(group_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            guard: StaleGuard::default(),
            group: Resource::Loading,
            expenses: Resource::Loading,
            settlement: SettlementView::default(),
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Starts a (re)load: every panel goes back to loading and responses of
    /// earlier loads will be ignored.
    pub fn begin(&mut self) -> RequestTicket {
        self.group = Resource::Loading;
        self.expenses = Resource::Loading;
        self.settlement.reset();
        self.guard.begin(&self.group_id)
    }

    /// Ticket of the load in progress, or `None` once the screen was left.
    pub fn ticket(&self) -> Option<&RequestTicket> {
        self.guard.current()
    }

    /// Called when the screen is left; late responses are dropped.
    pub fn close(&mut self) {
        self.guard.close();
    }

    /// Applies a response. Returns `false` if it belonged to a stale load.
    pub fn apply(&mut self, ticket: &RequestTicket, update: DetailsUpdate) -> bool {
        if !self.guard.accepts(ticket) {
            tracing::debug!(
                "dropping stale details response for {} (generation {})",
                ticket.key(),
                ticket.generation()
            );
            return false;
        }
        match update {
            DetailsUpdate::Group(result) => {
                self.group = Resource::from_result(result, FETCH_GROUP_FAILED);
            }
            DetailsUpdate::Expenses(result) => {
                self.expenses = Resource::from_list_result(result, FETCH_EXPENSES_FAILED);
            }
            DetailsUpdate::Settlement(mode, result) => self.settlement.apply(mode, result),
        }
        true
    }

    /// Issues every request of a details load concurrently and applies the
    /// results.
    pub async fn load<A: SplitApi>(api: &A, group_id: &str) -> Self {
        let mut details = Self::new(group_id);
        let ticket = details.begin();
        let [group, expenses, direct, simplified] = DetailsRequest::ALL;
        let updates = tokio::join!(
            group.run(api, group_id),
            expenses.run(api, group_id),
            direct.run(api, group_id),
            simplified.run(api, group_id),
        );
        details.apply(&ticket, updates.0);
        details.apply(&ticket, updates.1);
        details.apply(&ticket, updates.2);
        details.apply(&ticket, updates.3);
        details
    }

    /// Resolves a member id to a display name using the loaded group.
    pub fn member_name(&self, id: &str) -> Option<&str> {
        self.group
            .ready()
            .and_then(|group| group.member(id))
            .map(|user| user.name.as_str())
    }
}

/// State of the dashboard screen (list of all groups).
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    guard: StaleGuard,
    pub groups: Resource<Vec<GroupSummary>>,
}

impl Dashboard {
    pub fn begin(&mut self) -> RequestTicket {
        self.groups = Resource::Loading;
        self.guard.begin(DASHBOARD_KEY)
    }

    pub fn close(&mut self) {
        self.guard.close();
    }

    pub fn apply(
        &mut self,
        ticket: &RequestTicket,
        result: Result<Vec<GroupSummary>, ApiError>,
    ) -> bool {
        if !self.guard.accepts(ticket) {
            tracing::debug!("dropping stale dashboard response");
            return false;
        }
        self.groups = Resource::from_list_result(result, FETCH_GROUPS_FAILED);
        true
    }

    pub async fn load<A: SplitApi>(api: &A) -> Self {
        let mut dashboard = Self::default();
        let ticket = dashboard.begin();
        let result = fetch_groups(api).await;
        dashboard.apply(&ticket, result);
        dashboard
    }
}
