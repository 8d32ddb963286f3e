use crate::core::error::DenyReason;
use crate::interfaces::fetch::FetchResponse;
use crate::interfaces::policy::{PolicyResult, ResponsePolicy};

/// 状态码检查策略，只接受 200
#[derive(Debug, Default)]
pub struct StatusPolicy;

impl StatusPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl ResponsePolicy for StatusPolicy {
    fn name(&self) -> &str {
        "status"
    }

    fn check(&self, resp: &FetchResponse) -> PolicyResult {
        if resp.is_ok() {
            PolicyResult::Pass
        } else {
            PolicyResult::Deny(DenyReason::Status(resp.status))
        }
    }
}
