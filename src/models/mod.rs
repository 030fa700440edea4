pub mod page;
pub mod user;

pub use page::{FindOptions, OrderBy, PageInfo, PageOptions, SortField, SortOrder, UserPage};
pub use user::{
    CreateUserInput, DataMessage, Message, NewUser, UpdateUserInput, User, UserFilters,
};
