mod login_wall;
mod status;

use std::sync::Arc;

pub use login_wall::LoginWallPolicy;
pub use status::StatusPolicy;

use crate::interfaces::ResponsePolicy;

/// 默认策略链：先检查状态码，再检查登录墙
pub fn default_policies() -> Vec<Arc<dyn ResponsePolicy>> {
    vec![Arc::new(StatusPolicy::new()), Arc::new(LoginWallPolicy::new())]
}
