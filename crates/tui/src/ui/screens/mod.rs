pub mod add_expense;
pub mod create_group;
pub mod create_user;
pub mod dashboard;
pub mod group_details;
