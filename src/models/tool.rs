//! 工具描述模型

use serde::{Deserialize, Serialize};

/// 已注册工具的描述信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// 工具名称
    pub name: String,
    /// 工具说明
    pub description: String,
}
