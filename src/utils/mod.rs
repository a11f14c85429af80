//! 格式化工具

pub mod markdown;
pub mod number;

pub use markdown::format_list_to_markdown_table;
pub use number::*;
