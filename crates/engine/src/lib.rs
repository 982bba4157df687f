//! Client-side core of Divvy: splitting expenses, loading group state and
//! driving the entry forms.
//!
//! Nothing here talks HTTP. Remote calls go through the [`SplitApi`] trait,
//! which the front-end implements.
pub use api::SplitApi;
pub use error::{ApiError, FormError, ValidationError};
pub use forms::{CreateExpenseForm, CreateGroupForm, CreateUserForm, FormStatus, Route};
pub use groups::{
    Dashboard, DetailsRequest, DetailsUpdate, ExpenseView, GroupDetails, GroupSnapshot,
    GroupSummary, fetch_expenses, fetch_group, fetch_groups,
};
pub use money::Money;
pub use resource::{RequestTicket, Resource, StaleGuard};
pub use settlement::{SettlementMode, SettlementView, fetch_settlement, load_settlement};
pub use split::{DEFAULT_TOLERANCE, SplitAllocator, SplitMode, SplitPayload};

mod api;
mod error;
pub mod forms;
pub mod groups;
pub mod members;
mod money;
mod resource;
mod settlement;
mod split;
