pub mod company;
pub mod job;
pub mod user;

pub use company::{Company, CompanyFilter, CompanyUpdate, NewCompany};
pub use job::{Job, JobFilter, JobUpdate, NewJob};
pub use user::{NewUser, User, UserRecord, UserUpdate};
