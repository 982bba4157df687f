pub mod card;
pub mod hints;
pub mod input;
pub mod money;
pub mod status;
pub mod toast;
