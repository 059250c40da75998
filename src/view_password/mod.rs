mod core;
mod create_endpoint;
mod delete_endpoint;
mod form;
mod page;
mod state;
mod toggle_endpoint;

pub use core::{
    NewViewPassword, ViewPassword, count_active_view_passwords, create_view_password,
    create_view_password_table, delete_view_password, get_active_view_password,
    get_all_view_passwords, toggle_view_password,
};
pub use create_endpoint::create_view_password_endpoint;
pub use delete_endpoint::delete_view_password_endpoint;
pub use page::get_view_passwords_page;
pub use state::ViewPasswordState;
pub use toggle_endpoint::toggle_view_password_endpoint;
