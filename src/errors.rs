use std::fmt;

#[derive(Debug, Clone)]
pub enum LinkleafError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    SlugTaken(String),
    Unauthorized(String),
    NotFound(String),
    Serialization(String),
    DateParse(String),
}

impl LinkleafError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkleafError::DatabaseConfig(_) => "E001",
            LinkleafError::DatabaseConnection(_) => "E002",
            LinkleafError::DatabaseOperation(_) => "E003",
            LinkleafError::Validation(_) => "E004",
            LinkleafError::SlugTaken(_) => "E005",
            LinkleafError::Unauthorized(_) => "E006",
            LinkleafError::NotFound(_) => "E007",
            LinkleafError::Serialization(_) => "E008",
            LinkleafError::DateParse(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkleafError::DatabaseConfig(_) => "Database Configuration Error",
            LinkleafError::DatabaseConnection(_) => "Database Connection Error",
            LinkleafError::DatabaseOperation(_) => "Database Operation Error",
            LinkleafError::Validation(_) => "Validation Error",
            LinkleafError::SlugTaken(_) => "Slug Already Taken",
            LinkleafError::Unauthorized(_) => "Unauthorized",
            LinkleafError::NotFound(_) => "Resource Not Found",
            LinkleafError::Serialization(_) => "Serialization Error",
            LinkleafError::DateParse(_) => "Date Parse Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkleafError::DatabaseConfig(msg) => msg,
            LinkleafError::DatabaseConnection(msg) => msg,
            LinkleafError::DatabaseOperation(msg) => msg,
            LinkleafError::Validation(msg) => msg,
            LinkleafError::SlugTaken(msg) => msg,
            LinkleafError::Unauthorized(msg) => msg,
            LinkleafError::NotFound(msg) => msg,
            LinkleafError::Serialization(msg) => msg,
            LinkleafError::DateParse(msg) => msg,
        }
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// Transient persistence failures are surfaced as dismissable,
    /// retryable notifications; everything else is inline or fatal.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LinkleafError::DatabaseConnection(_) | LinkleafError::DatabaseOperation(_)
        )
    }
}

impl fmt::Display for LinkleafError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 默认使用简洁格式
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkleafError {}

// 便捷的构造函数
impl LinkleafError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkleafError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkleafError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkleafError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkleafError::Validation(msg.into())
    }

    pub fn slug_taken<T: Into<String>>(msg: T) -> Self {
        LinkleafError::SlugTaken(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        LinkleafError::Unauthorized(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkleafError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkleafError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        LinkleafError::DateParse(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for LinkleafError {
    fn from(err: std::io::Error) -> Self {
        LinkleafError::DatabaseConfig(err.to_string())
    }
}

impl From<sea_orm::DbErr> for LinkleafError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkleafError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkleafError {
    fn from(err: serde_json::Error) -> Self {
        LinkleafError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for LinkleafError {
    fn from(err: chrono::ParseError) -> Self {
        LinkleafError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkleafError>;
