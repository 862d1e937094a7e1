use crate::error::ConfigError;

/// 单个文件大小上限（5 MB）
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// 同时暂存的文件数量上限
pub const DEFAULT_MAX_FILE_QTY: usize = 50;

/// 后端 API 路径前缀
const API_PREFIX: &str = "/api/v1";

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 部署环境（production / development）
    pub app_env: String,
    /// 后端服务地址
    pub backend_url: String,
    /// 非生产环境下覆盖的 API 地址
    pub api_url: Option<String>,
    /// 待上传图片所在目录
    pub upload_folder: String,
    /// 要分析的示例图片 ID（逗号分隔，设置后不再上传本地文件）
    pub sample_ids: Option<String>,
    /// 示例图片目录文件
    pub sample_catalog: String,
    /// 结果持久化目录
    pub storage_dir: String,
    /// 处理结果图片输出目录
    pub output_folder: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 单个文件大小上限（字节）
    pub max_file_size: u64,
    /// 暂存文件数量上限
    pub max_file_qty: usize,
    /// 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_env: "development".to_string(),
            backend_url: "http://localhost:8000".to_string(),
            api_url: None,
            upload_folder: "uploads".to_string(),
            sample_ids: None,
            sample_catalog: "samples.toml".to_string(),
            storage_dir: ".".to_string(),
            output_folder: "results".to_string(),
            output_log_file: "output.txt".to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_file_qty: DEFAULT_MAX_FILE_QTY,
            request_timeout_secs: 120,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            app_env: std::env::var("APP_ENV").unwrap_or(default.app_env),
            backend_url: std::env::var("BACKEND_URL").unwrap_or(default.backend_url),
            api_url: std::env::var("API_URL").ok().filter(|v| !v.trim().is_empty()),
            upload_folder: std::env::var("UPLOAD_FOLDER").unwrap_or(default.upload_folder),
            sample_ids: std::env::var("SAMPLE_IDS").ok().filter(|v| !v.trim().is_empty()),
            sample_catalog: std::env::var("SAMPLE_CATALOG").unwrap_or(default.sample_catalog),
            storage_dir: std::env::var("STORAGE_DIR").unwrap_or(default.storage_dir),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            max_file_size: std::env::var("MAX_FILE_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_file_size),
            max_file_qty: std::env::var("MAX_FILE_QTY").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_file_qty),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// 根据部署环境选择 API 地址
    ///
    /// 生产环境始终走后端服务地址；其它环境优先使用 `API_URL`
    pub fn api_base_url(&self) -> String {
        let backend = format!("{}{}", self.backend_url.trim_end_matches('/'), API_PREFIX);
        if self.is_production() {
            return backend;
        }
        match &self.api_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => backend,
        }
    }

    /// 解析 `SAMPLE_IDS`
    ///
    /// # 返回
    /// 未设置时返回 `None`
    pub fn parsed_sample_ids(&self) -> Result<Option<Vec<u32>>, ConfigError> {
        match &self.sample_ids {
            Some(raw) => parse_sample_ids(raw).map(Some),
            None => Ok(None),
        }
    }
}

/// 解析逗号分隔的示例图片 ID 列表，忽略空项
pub fn parse_sample_ids(raw: &str) -> Result<Vec<u32>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>().map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: "SAMPLE_IDS".to_string(),
                value: s.to_string(),
                expected_type: "u32".to_string(),
            })
        })
        .collect()
}
