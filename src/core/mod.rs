pub mod billing;
pub mod optimistic;
pub mod session;

pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
pub use optimistic::{ListState, Notice, OnFailure, Patch};
pub use session::{Session, SessionStore};
