use thiserror::Error;
use vdraw_io::IoError;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("JSON 输出失败: {0}")]
    Render(String),
    #[error("命令 {command} 执行失败: {message}")]
    Command { command: String, message: String },
}
