use std::future::Future;

use api_types::{
    balance::Transaction,
    expense::{Expense, ExpenseNew},
    group::{Group, GroupNew},
    user::{User, UserNew},
};

use crate::ApiError;

/// The remote expense-tracker API, as seen by the engine.
///
/// The engine never talks HTTP itself: the front end provides an
/// implementation (see `divvy_tui::client`) and tests provide in-memory ones.
/// Every call resolves to a typed [`ApiError`] on failure.
pub trait SplitApi {
    /// `POST /user/create`
    fn create_user(&self, body: &UserNew) -> impl Future<Output = Result<User, ApiError>> + Send;

    /// `GET /user`
    fn list_users(&self) -> impl Future<Output = Result<Vec<User>, ApiError>> + Send;

    /// `POST /groups`
    fn create_group(&self, body: &GroupNew) -> impl Future<Output = Result<Group, ApiError>> + Send;

    /// `GET /groups/{group_id}`
    fn get_group(&self, group_id: &str) -> impl Future<Output = Result<Group, ApiError>> + Send;

    /// `GET /groups`
    fn list_groups(&self) -> impl Future<Output = Result<Vec<Group>, ApiError>> + Send;

    /// `GET /expenses?groupId={group_id}`
    fn list_expenses(
        &self,
        group_id: &str,
    ) -> impl Future<Output = Result<Vec<Expense>, ApiError>> + Send;

    /// `POST /expenses`
    fn create_expense(
        &self,
        body: &ExpenseNew,
    ) -> impl Future<Output = Result<Expense, ApiError>> + Send;

    /// `GET /groups/{group_id}/balances?transitive={transitive}`
    fn get_balances(
        &self,
        group_id: &str,
        transitive: bool,
    ) -> impl Future<Output = Result<Vec<Transaction>, ApiError>> + Send;
}
