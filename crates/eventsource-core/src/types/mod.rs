//! Type definitions for credential locators, material and requests

mod credential;
mod locator;
mod request;

pub use credential::*;
pub use locator::*;
pub use request::*;
