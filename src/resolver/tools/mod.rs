// External tool adapters

mod locate;
mod ytdlp;

pub use locate::{discover, find_python, find_ytdlp, python_has_ytdlp, ToolDiscovery};
pub use ytdlp::YtDlpTool;
