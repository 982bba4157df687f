use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a user as issued by the server.
///
/// Identifiers are opaque strings (the server uses Mongo object ids).
pub type MemberId = String;

/// Error body returned by the server on non-2xx responses.
///
/// `error` is optional: clients must fall back to a generic message when it
/// is missing.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

pub mod user {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct User {
        #[serde(rename = "_id", alias = "id")]
        pub id: MemberId,
        pub name: String,
    }

    /// Request body for `POST /user/create`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct UserNew {
        pub name: String,
    }

    /// A reference to a user that the server may or may not have expanded.
    ///
    /// Group members, expense payers and split members come back either as a
    /// bare identifier or as the full user record, depending on whether the
    /// server populated the relation.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum MemberRef {
        Bare(MemberId),
        Expanded(User),
    }

    impl MemberRef {
        /// Returns the identifier regardless of the shape.
        pub fn id(&self) -> &str {
            match self {
                Self::Bare(id) => id,
                Self::Expanded(user) => &user.id,
            }
        }
    }

    impl From<User> for MemberRef {
        fn from(value: User) -> Self {
            Self::Expanded(value)
        }
    }
}

pub mod group {
    use super::{user::MemberRef, *};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Group {
        #[serde(rename = "_id", alias = "id")]
        pub id: String,
        pub name: String,
        #[serde(default)]
        pub members: Vec<MemberRef>,
    }

    /// Request body for `POST /groups`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        pub members: Vec<MemberId>,
    }

    /// The group an expense belongs to, bare or populated.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum GroupRef {
        Bare(String),
        Expanded(Box<Group>),
    }

    impl GroupRef {
        pub fn id(&self) -> &str {
            match self {
                Self::Bare(id) => id,
                Self::Expanded(group) => &group.id,
            }
        }
    }
}

pub mod expense {
    use super::{group::GroupRef, user::MemberRef, *};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Expense {
        #[serde(rename = "_id", alias = "id")]
        pub id: String,
        pub group_id: GroupRef,
        pub payer_id: MemberRef,
        /// Amount in major units (two decimals expected).
        pub amount: f64,
        #[serde(default)]
        pub split_among: Vec<MemberRef>,
        pub created_at: DateTime<Utc>,
    }

    /// Request body for `POST /expenses`.
    ///
    /// No per-member breakdown is sent: the server divides `amount` evenly
    /// among `split_among`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseNew {
        pub group_id: String,
        pub payer_id: MemberId,
        pub amount: f64,
        pub split_among: Vec<MemberId>,
    }
}

pub mod balance {
    use super::*;

    /// One edge of a settlement plan: `from` pays `amount` to `to`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Transaction {
        pub from: MemberId,
        pub from_name: String,
        pub to: MemberId,
        pub to_name: String,
        pub amount: f64,
    }
}
