//! Storage for accounts and student registrations

pub mod students;
pub mod users;

pub use students::{NewStudent, Payment, PaymentStatus, Student, StudentStore, StudentUpdate};
pub use users::UserDirectory;
