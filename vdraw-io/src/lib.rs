use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;
use vdraw_core::document::Document;

pub mod dsl;
pub mod expr;

pub use dsl::{DrawingParser, ParseReport, Session, StyleDefaults, parse_drawing};
pub use expr::SymbolTable;

pub mod errors {
    use thiserror::Error;
    use vdraw_core::errors::{ShapeError, StyleError};

    /// 错误分类：格式错误、缺少必填字段、校验失败、名称/代码查找失败。
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ErrorKind {
        Malformed,
        MissingField,
        Validation,
        Lookup,
    }

    /// 单条语句处理失败的原因。
    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum StatementError {
        #[error("undefined symbol \"{name}\"")]
        UndefinedSymbol { name: String },
        #[error("malformed expression \"{expression}\"")]
        MalformedExpression { expression: String },
        #[error("malformed value \"{value}\" for field {field}")]
        MalformedField { field: &'static str, value: String },
        #[error("malformed statement: {0}")]
        MalformedStatement(String),
        #[error("{statement} statement is missing required field \"{field}\"")]
        MissingField {
            statement: &'static str,
            field: &'static str,
        },
        #[error("validation failed: {0}")]
        Validation(String),
        #[error("validation failed: {0}")]
        Shape(#[from] ShapeError),
        #[error(transparent)]
        Lookup(#[from] StyleError),
    }

    impl StatementError {
        pub fn kind(&self) -> ErrorKind {
            match self {
                StatementError::UndefinedSymbol { .. }
                | StatementError::MalformedExpression { .. }
                | StatementError::MalformedField { .. }
                | StatementError::MalformedStatement(_) => ErrorKind::Malformed,
                StatementError::MissingField { .. } => ErrorKind::MissingField,
                StatementError::Validation(_) | StatementError::Shape(_) => ErrorKind::Validation,
                StatementError::Lookup(_) => ErrorKind::Lookup,
            }
        }
    }

    /// 错误日志中的一条记录，`row` 从 1 开始。
    #[derive(Debug, Clone, PartialEq, Error)]
    #[error("row {row}: {error}")]
    pub struct RowError {
        pub row: usize,
        pub error: StatementError,
    }

    impl RowError {
        #[inline]
        pub fn kind(&self) -> ErrorKind {
            self.error.kind()
        }
    }
}

#[derive(Debug, Error)]
pub enum IoError {
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON document {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Document, IoError>;
}

pub trait DocumentSaver {
    fn save(&self, document: &Document, path: &Path) -> Result<(), IoError>;
}

fn read_source(path: &Path) -> Result<String, IoError> {
    fs::read_to_string(path).map_err(|source| IoError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

/// 读取图纸描述语言文件。
pub struct DslFacade;

impl DslFacade {
    pub fn new() -> Self {
        Self
    }

    /// 返回完整解析报告，调用方自行决定如何呈现错误日志。
    /// 逐行错误在解析时已经以 `warn!` 记录过一次。
    pub fn load_report(&self, path: &Path) -> Result<ParseReport, IoError> {
        let source = read_source(path)?;
        let report = parse_drawing(&source);
        info!(
            path = %path.display(),
            shapes = report.document.shape_count(),
            errors = report.errors.len(),
            "图纸解析完成"
        );
        Ok(report)
    }
}

impl Default for DslFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader for DslFacade {
    fn load(&self, path: &Path) -> Result<Document, IoError> {
        Ok(self.load_report(path)?.document)
    }
}

impl DocumentSaver for DslFacade {
    fn save(&self, _document: &Document, path: &Path) -> Result<(), IoError> {
        Err(IoError::UnsupportedFeature(format!(
            "writing drawing DSL to {:?} is not supported",
            path
        )))
    }
}

/// 文档的 JSON 持久化形式：颜色写作名称，点写作 `[x, y]`。
pub struct JsonFacade {
    pretty: bool,
}

impl JsonFacade {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn to_json(&self, document: &Document) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(document)
        } else {
            serde_json::to_string(document)
        }
    }

    pub fn from_json(&self, source: &str) -> Result<Document, serde_json::Error> {
        serde_json::from_str(source)
    }
}

impl Default for JsonFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader for JsonFacade {
    fn load(&self, path: &Path) -> Result<Document, IoError> {
        let source = read_source(path)?;
        self.from_json(&source).map_err(|source| IoError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl DocumentSaver for JsonFacade {
    fn save(&self, document: &Document, path: &Path) -> Result<(), IoError> {
        let text = self.to_json(document).map_err(|source| IoError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }
}
