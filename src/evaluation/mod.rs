//! Route validation against capacities and time windows.

mod validator;

pub use validator::RouteValidator;
