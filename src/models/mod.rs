pub mod task;
pub mod user;

pub use task::{
    AssignTaskInput, CreateTaskInput, Task, TaskPriority, TaskQuery, TaskStatus,
    UpdateTaskInput, UpdateTaskStatusInput,
};
pub use user::User;
