#![allow(dead_code)]

use std::{collections::HashMap, sync::Mutex};

use api_types::{
    balance::Transaction,
    expense::{Expense, ExpenseNew},
    group::{Group, GroupNew, GroupRef},
    user::{MemberRef, User, UserNew},
};
use chrono::Utc;
use divvy_engine::{ApiError, SplitApi};

/// In-memory API that records every call it receives.
#[derive(Default)]
pub struct FakeApi {
    pub users: Vec<User>,
    pub groups: Vec<Group>,
    pub expenses: HashMap<String, Vec<Expense>>,
    pub direct: Vec<Transaction>,
    pub simplified: Vec<Transaction>,
    /// Calls (by name) that fail with the given error.
    pub failures: HashMap<&'static str, ApiError>,
    pub calls: Mutex<Vec<String>>,
    pub created: Mutex<Vec<ExpenseNew>>,
}

impl FakeApi {
    pub fn failing(mut self, call: &'static str, err: ApiError) -> Self {
        self.failures.insert(call, err);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn created_expenses(&self) -> Vec<ExpenseNew> {
        self.created.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str, detail: &str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(format!("{call} {detail}").trim().to_string());
        match self.failures.get(call) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl SplitApi for FakeApi {
    async fn create_user(&self, body: &UserNew) -> Result<User, ApiError> {
        self.record("create_user", &body.name)?;
        Ok(user("new-user", &body.name))
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.record("list_users", "")?;
        Ok(self.users.clone())
    }

    async fn create_group(&self, body: &GroupNew) -> Result<Group, ApiError> {
        self.record("create_group", &body.name)?;
        Ok(Group {
            id: "new-group".to_string(),
            name: body.name.clone(),
            members: body.members.iter().cloned().map(MemberRef::Bare).collect(),
        })
    }

    async fn get_group(&self, group_id: &str) -> Result<Group, ApiError> {
        self.record("get_group", group_id)?;
        self.groups
            .iter()
            .find(|group| group.id == group_id)
            .cloned()
            .ok_or(ApiError::NotFound {
                message: Some("Group not found".to_string()),
            })
    }

    async fn list_groups(&self) -> Result<Vec<Group>, ApiError> {
        self.record("list_groups", "")?;
        Ok(self.groups.clone())
    }

    async fn list_expenses(&self, group_id: &str) -> Result<Vec<Expense>, ApiError> {
        self.record("list_expenses", group_id)?;
        Ok(self.expenses.get(group_id).cloned().unwrap_or_default())
    }

    async fn create_expense(&self, body: &ExpenseNew) -> Result<Expense, ApiError> {
        self.record("create_expense", &body.group_id)?;
        self.created.lock().unwrap().push(body.clone());
        Ok(Expense {
            id: "new-expense".to_string(),
            group_id: GroupRef::Bare(body.group_id.clone()),
            payer_id: MemberRef::Bare(body.payer_id.clone()),
            amount: body.amount,
            split_among: body.split_among.iter().cloned().map(MemberRef::Bare).collect(),
            created_at: Utc::now(),
        })
    }

    async fn get_balances(
        &self,
        group_id: &str,
        transitive: bool,
    ) -> Result<Vec<Transaction>, ApiError> {
        let call = if transitive {
            "get_balances_simplified"
        } else {
            "get_balances_direct"
        };
        self.record(call, group_id)?;
        Ok(if transitive {
            self.simplified.clone()
        } else {
            self.direct.clone()
        })
    }
}

pub fn user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn edge(from: &str, to: &str, amount: f64) -> Transaction {
    Transaction {
        from: from.to_string(),
        from_name: from.to_uppercase(),
        to: to.to_string(),
        to_name: to.to_uppercase(),
        amount,
    }
}

/// Group "g1" with members Ada, Bea and a bare id, owing each other in a
/// chain A -> B -> C.
pub fn trip() -> FakeApi {
    let group = Group {
        id: "g1".to_string(),
        name: "Trip".to_string(),
        members: vec![
            MemberRef::Expanded(user("A", "Ada")),
            MemberRef::Expanded(user("B", "Bea")),
            MemberRef::Bare("C0ffee1234".to_string()),
        ],
    };
    let lunch = Expense {
        id: "e1".to_string(),
        group_id: GroupRef::Bare("g1".to_string()),
        payer_id: MemberRef::Expanded(user("A", "Ada")),
        amount: 30.0,
        split_among: vec![
            MemberRef::Bare("A".to_string()),
            MemberRef::Bare("B".to_string()),
            MemberRef::Bare("C0ffee1234".to_string()),
        ],
        created_at: Utc::now(),
    };
    FakeApi {
        users: vec![user("A", "Ada"), user("B", "Bea"), user("C0ffee1234", "Cy")],
        groups: vec![group],
        expenses: HashMap::from([("g1".to_string(), vec![lunch])]),
        direct: vec![edge("a", "b", 10.0), edge("b", "c", 10.0)],
        simplified: vec![edge("a", "c", 10.0)],
        ..Default::default()
    }
}
