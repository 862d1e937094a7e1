use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 批量提交错误
    #[error("提交错误: {0}")]
    Submit(#[from] SubmitError),
    /// 结果存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 提交错误的分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitErrorKind {
    /// 没有可提交的文件或 ID，不发请求
    Validation,
    /// 网络失败或非成功状态码
    Transport,
    /// 响应结构无法识别
    MalformedResponse,
}

/// 批量提交错误
#[derive(Debug, Error)]
pub enum SubmitError {
    /// 暂存区没有无错误的文件
    #[error("没有可上传的有效文件")]
    NoValidFiles,
    /// 没有选择任何示例图片
    #[error("没有选择示例图片")]
    NoSamplesSelected,
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    Request {
        endpoint: String,
        #[source]
        source: BoxError,
    },
    /// API 返回非成功状态码
    #[error("API返回错误状态 ({endpoint}): {status} {message}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// 响应既不是结果数组也不是 `{results, summary}` 信封
    #[error("响应格式无法识别: {reason}")]
    MalformedResponse { reason: String },
}

impl SubmitError {
    pub fn kind(&self) -> SubmitErrorKind {
        match self {
            SubmitError::NoValidFiles | SubmitError::NoSamplesSelected => {
                SubmitErrorKind::Validation
            }
            SubmitError::Request { .. } | SubmitError::HttpStatus { .. } => {
                SubmitErrorKind::Transport
            }
            SubmitError::MalformedResponse { .. } => SubmitErrorKind::MalformedResponse,
        }
    }

    /// 展示给用户的提示信息
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::NoValidFiles | SubmitError::NoSamplesSelected => self.to_string(),
            SubmitError::Request { .. } | SubmitError::HttpStatus { .. } => {
                "提交失败，请重试".to_string()
            }
            SubmitError::MalformedResponse { .. } => "服务器返回了无法识别的结果".to_string(),
        }
    }

    /// 创建网络请求失败错误
    pub fn request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        SubmitError::Request {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }

    /// 创建响应格式错误
    pub fn malformed(reason: impl Into<String>) -> Self {
        SubmitError::MalformedResponse {
            reason: reason.into(),
        }
    }
}

/// 结果存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 读取持久化文件失败
    #[error("读取结果文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入持久化文件失败
    #[error("写入结果文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 持久化内容无法解析
    #[error("结果文件解析失败 ({path}): {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: BoxError,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: BoxError,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: BoxError,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
    /// 图片内容不是合法的 base64
    #[error("图片解码失败 ({name}): {source}")]
    DecodeFailed {
        name: String,
        #[source]
        source: BoxError,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl FileError {
    /// 创建文件读取错误
    pub fn read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// 创建文件写入错误
    pub fn write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
