use crate::error::{AppResult, ConfigError, MailError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 报告文件存放目录
    pub reports_dir: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- SMTP 中继配置 ---
    pub smtp: RelayConfig,
}

/// SMTP 中继配置
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RelayConfig {
    pub server: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("reports"),
            verbose_logging: false,
            smtp: RelayConfig::default(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            server: "smtp.example.com".to_string(),
            port: 587,
            user: String::new(),
            password: String::new(),
        }
    }
}

impl RelayConfig {
    /// 返回登录用的 (用户名, 密码)
    ///
    /// 发送前必须先调用，保证凭据缺失时不会建立任何网络连接
    ///
    /// # 返回
    /// 原样返回配置值；任一项去除空白后为空时返回 `InvalidCredentials`
    pub fn credentials(&self) -> Result<(&str, &str), MailError> {
        if self.user.trim().is_empty() || self.password.trim().is_empty() {
            return Err(MailError::InvalidCredentials);
        }
        Ok((&self.user, &self.password))
    }

    /// 用调用方提供的字段覆盖当前配置
    pub fn with_overrides(
        &self,
        server: Option<String>,
        port: Option<u16>,
        user: Option<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            server: server.unwrap_or_else(|| self.server.clone()),
            port: port.unwrap_or(self.port),
            user: user.unwrap_or_else(|| self.user.clone()),
            password: password.unwrap_or_else(|| self.password.clone()),
        }
    }
}

impl Config {
    /// 加载配置：默认值 < TOML 文件 < 环境变量
    ///
    /// # 参数
    /// - `path`: 配置文件路径，为 None 时读取 `DOC_ANALYZER_CONFIG`，都没有则只用默认值
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let from_env_path = std::env::var("DOC_ANALYZER_CONFIG").ok().map(PathBuf::from);
        let config = match path.map(Path::to_path_buf).or(from_env_path) {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())
    }

    /// 从 TOML 文件读取配置，缺省字段取默认值
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    fn from_toml_str(content: &str, origin: &str) -> AppResult<Self> {
        let config = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        Ok(config)
    }

    fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        if let Some(dir) = lookup("REPORTS_DIR") {
            self.reports_dir = PathBuf::from(dir);
        }
        if let Some(v) = lookup("VERBOSE_LOGGING") {
            self.verbose_logging = parse_var("VERBOSE_LOGGING", &v, "bool")?;
        }
        if let Some(server) = lookup("SMTP_SERVER") {
            self.smtp.server = server;
        }
        if let Some(v) = lookup("SMTP_PORT") {
            self.smtp.port = parse_var("SMTP_PORT", &v, "u16")?;
        }
        if let Some(user) = lookup("SMTP_USER") {
            self.smtp.user = user;
        }
        if let Some(password) = lookup("SMTP_PASSWORD") {
            self.smtp.password = password;
        }
        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(var_name: &str, value: &str, expected_type: &str) -> AppResult<T> {
    value.trim().parse().map_err(|_| {
        ConfigError::InvalidValue {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type: expected_type.to_string(),
        }
        .into()
    })
}
