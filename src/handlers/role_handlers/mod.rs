pub mod helpers;
pub mod list;
pub mod crud;
pub mod members;

pub use self::list::index;
pub use self::crud::{details, new_form, create, edit_form, update, delete_form, delete};
pub use self::members::{members_form, update_members};
