pub mod container;
pub mod query;
pub mod state;
pub mod view;

pub use container::{ChangeHandler, ListContainer};
pub use query::ListQuery;
pub use state::{ListState, PageState, ResponseOrdering};
pub use view::ListProps;
