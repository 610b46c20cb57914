use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 页面元素相关错误
    #[error("页面错误: {0}")]
    Page(#[from] PageError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 浏览器配置失败
    #[error("浏览器配置失败: {message}")]
    ConfigurationFailed { message: String },
    /// 浏览器尚未启动
    #[error("浏览器尚未初始化")]
    NotInitialized,
    /// 启动浏览器失败
    #[error("启动浏览器失败: {source}")]
    LaunchFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 关闭浏览器失败
    #[error("关闭浏览器失败: {source}")]
    CloseFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 页面元素相关错误
#[derive(Debug, Error)]
pub enum PageError {
    /// 等待元素超时
    #[error("等待元素 {selector} 超时 ({timeout_secs} 秒)")]
    WaitTimeout { selector: String, timeout_secs: u64 },
    /// 找不到元素
    #[error("找不到元素 {selector}: {source}")]
    ElementNotFound {
        selector: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 点击元素失败
    #[error("点击元素 {selector} 失败: {source}")]
    ClickFailed {
        selector: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 读取元素文本失败
    #[error("读取元素 {selector} 文本失败: {source}")]
    TextExtractionFailed {
        selector: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 选择器表中没有该名称
    #[error("未配置的选择器: {name}")]
    UnknownSelector { name: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入配置文件失败
    #[error("写入配置文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 配置序列化失败
    #[error("配置序列化失败: {source}")]
    SerializeFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 配置文件顶层不是键值对象
    #[error("配置文件 {path} 的顶层必须是键值对象")]
    NotAnObject { path: String },
    /// 未知的关键词类型
    #[error("未知的关键词类型: {kind}")]
    UnknownKeywordKind { kind: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建导航失败错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建元素未找到错误
    pub fn element_not_found(
        selector: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Page(PageError::ElementNotFound {
            selector: selector.into(),
            source: Box::new(source),
        })
    }

    /// 创建点击失败错误
    pub fn click_failed(
        selector: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Page(PageError::ClickFailed {
            selector: selector.into(),
            source: Box::new(source),
        })
    }

    /// 是否为等待超时（扫描时可容忍的错误）
    pub fn is_wait_timeout(&self) -> bool {
        matches!(self, AppError::Page(PageError::WaitTimeout { .. }))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_timeout_is_recognized() {
        let err: AppError = PageError::WaitTimeout {
            selector: "article".to_string(),
            timeout_secs: 10,
        }
        .into();
        assert!(err.is_wait_timeout());
        assert_eq!(err.to_string(), "页面错误: 等待元素 article 超时 (10 秒)");

        let other: AppError = BrowserError::NotInitialized.into();
        assert!(!other.is_wait_timeout());
    }
}
