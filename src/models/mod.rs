pub mod audit;
pub mod task;
pub mod user;

pub use audit::{AuditAction, AuditLogEntry};
pub use task::{CreateTaskInput, Task, UpdateTaskInput};
pub use user::{NewUser, Role, User};
