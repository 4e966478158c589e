pub mod helpers;
pub mod create;
pub mod read;
pub mod update;
pub mod delete;
pub mod list;

pub use self::create::{new_form, create};
pub use self::read::{details, edit_form, delete_form};
pub use self::update::update;
pub use self::delete::delete;
pub use self::list::index;
