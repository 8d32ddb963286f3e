use crate::core::error::DenyReason;
use crate::interfaces::fetch::FetchResponse;

/// 策略判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyResult {
    /// 检查通过，响应交给分类器与提取器
    Pass,
    /// 拒绝该响应，回退驱动切换到下一个端点
    Deny(DenyReason),
}

/// 响应检查策略
///
/// - 策略负责：识别登录墙、权限不足、异常状态码。
/// - 策略不负责：不重试，也不修改响应。
pub trait ResponsePolicy: Send + Sync + std::fmt::Debug {
    /// 策略名称 (用于调试/日志)
    fn name(&self) -> &str;

    /// 检查响应并决定后续行为
    fn check(&self, resp: &FetchResponse) -> PolicyResult;
}
