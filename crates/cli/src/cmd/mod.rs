mod apply;
mod destroy;
mod query;
mod refresh;
mod show;

pub use apply::cmd_apply;
pub use destroy::cmd_destroy;
pub use query::cmd_query;
pub use refresh::cmd_refresh;
pub use show::cmd_show;
