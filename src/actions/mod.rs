pub mod business_actions;
pub mod restaurant_actions;
