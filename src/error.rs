use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文档读取与解析错误
    #[error("文档错误: {0}")]
    Document(#[from] DocumentError),
    /// 邮件发送错误
    #[error("邮件错误: {0}")]
    Mail(#[from] MailError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 文档相关错误
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 不是合法的 docx 文档
    #[error("文档解析失败 ({path}): {reason}")]
    Decode { path: String, reason: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 邮件发送错误
#[derive(Debug, Error)]
pub enum MailError {
    /// 中继账号或密码为空
    #[error("SMTP 凭据缺失: 用户名和密码都不能为空")]
    InvalidCredentials,
    /// 邮件地址不合法
    #[error("邮件地址不合法 ({address}): {reason}")]
    InvalidAddress { address: String, reason: String },
    /// 连接、认证或协议失败
    #[error("SMTP 发送失败 ({server}): {reason}")]
    Transport { server: String, reason: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    InvalidValue {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件不存在错误
    pub fn not_found(path: impl Into<String>) -> Self {
        AppError::Document(DocumentError::NotFound { path: path.into() })
    }

    /// 创建文档解析错误
    pub fn decode_failed(path: impl Into<String>, reason: impl ToString) -> Self {
        AppError::Document(DocumentError::Decode {
            path: path.into(),
            reason: reason.to_string(),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Document(DocumentError::Read {
            path: path.into(),
            source,
        })
    }

    /// 创建 SMTP 传输错误
    pub fn transport_failed(server: impl Into<String>, reason: impl ToString) -> Self {
        AppError::Mail(MailError::Transport {
            server: server.into(),
            reason: reason.to_string(),
        })
    }

    /// 创建邮件地址错误
    pub fn invalid_address(address: impl Into<String>, reason: impl ToString) -> Self {
        AppError::Mail(MailError::InvalidAddress {
            address: address.into(),
            reason: reason.to_string(),
        })
    }

    /// 是否为文件不存在错误
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Document(DocumentError::NotFound { .. }))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_detected() {
        let err = AppError::not_found("reports/missing.docx");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("reports/missing.docx"));
    }

    #[test]
    fn test_decode_error_is_not_not_found() {
        let err = AppError::decode_failed("a.docx", "invalid Zip archive");
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("invalid Zip archive"));
    }
}
