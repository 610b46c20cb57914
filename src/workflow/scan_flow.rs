//! 回复扫描流程 - 流程层
//!
//! 核心职责：定义"一次扫描"的完整处理流程
//!
//! 流程顺序：
//! 1. 等待回复容器 → 取出所有回复
//! 2. 读取作者和正文 → 按标识去重
//! 3. 对新回复分类 → 可疑则拉黑或给出建议

use std::collections::{HashMap, HashSet};

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{ReplyPage, SelectorKey};
use crate::services::classifier::describe_reasons;
use crate::services::BlockService;
use crate::workflow::reply_ctx::{ReplyKey, ReplyRecord};

/// 单条新回复的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// 没有命中关键词
    Clean,
    /// 命中但自动模式关闭，只给出建议
    Advised,
    /// 已拉黑
    Blocked,
    /// 拉黑失败（不会重试）
    BlockFailed,
}

/// 一次扫描的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// 页面上的回复总数
    pub total: usize,
    /// 本次新处理的回复及结果
    pub outcomes: Vec<(ReplyRecord, ReplyOutcome)>,
    /// 本次新出现的读取失败回复数（每条只报告一次）
    pub extraction_errors: usize,
}

impl ScanReport {
    pub fn new_replies(&self) -> usize {
        self.outcomes.len()
    }

    pub fn count(&self, outcome: &ReplyOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| o == outcome).count()
    }

    pub fn suspicious(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o != ReplyOutcome::Clean)
            .count()
    }
}

/// 回复扫描器
///
/// - 持有本次会话的已处理集合（只增不减），读取失败的回复也在其中
/// - 不持有页面资源，每次扫描由调用方传入
#[derive(Debug, Default)]
pub struct ReplyScanner {
    seen: HashSet<ReplyKey>,
    scanned_once: bool,
}

impl ReplyScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已处理的回复数
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// 是否已经处理过这条回复
    pub fn has_seen(&self, key: &ReplyKey) -> bool {
        self.seen.contains(key)
    }

    /// 扫描当前页面的回复
    ///
    /// 等待回复容器超时或取回复列表失败时返回错误，由调用方决定是否继续；
    /// 单条回复读取失败只记录一次日志，不影响其他回复
    pub async fn scan<P: ReplyPage>(
        &mut self,
        page: &P,
        config: &Config,
        blocker: &mut BlockService,
    ) -> AppResult<ScanReport> {
        page.wait_for(SelectorKey::RepliesContainer, config.timeout_duration())
            .await?;

        let elements = page.find_replies().await?;
        let mut report = ScanReport {
            total: elements.len(),
            ..Default::default()
        };

        // 读取作者和正文，过滤已处理的回复
        let mut fresh = Vec::new();
        let mut occurrences: HashMap<ReplyKey, usize> = HashMap::new();
        for (position, element) in elements.into_iter().enumerate() {
            match read_reply(page, &element, config).await {
                Ok(record) => {
                    let base = record.key();
                    let n = occurrences.entry(base).or_insert(0);
                    let key = base.occurrence(*n);
                    *n += 1;

                    if self.has_seen(&key) {
                        continue;
                    }
                    // 无论之后结果如何都记为已处理
                    self.seen.insert(key);
                    fresh.push((element, record));
                }
                Err(failure) => {
                    let key = ReplyKey::unreadable(failure.username.as_deref(), position);
                    if self.seen.insert(key) {
                        error!("❌ 处理回复时出错: {}", failure.error);
                        report.extraction_errors += 1;
                    } else {
                        debug!("跳过无法读取的回复 (位置 {})", position);
                    }
                }
            }
        }

        if !self.scanned_once {
            info!("找到 {} 条回复", fresh.len());
            self.scanned_once = true;
        } else if !fresh.is_empty() {
            info!("找到 {} 条新回复", fresh.len());
        } else {
            debug!("没有新回复");
        }

        for (element, record) in fresh {
            let outcome = evaluate(page, &element, &record, config, blocker).await;
            report.outcomes.push((record, outcome));
        }

        Ok(report)
    }
}

/// 读取失败时带上已经读到的作者名
struct ReadFailure {
    username: Option<String>,
    error: AppError,
}

async fn read_reply<P: ReplyPage>(
    page: &P,
    element: &P::Element,
    config: &Config,
) -> Result<ReplyRecord, ReadFailure> {
    let username = page
        .extract_username(element)
        .await
        .map_err(|error| ReadFailure {
            username: None,
            error,
        })?;
    match page.extract_content(element).await {
        Ok(content) => Ok(ReplyRecord::classify(username, content, config)),
        Err(error) => Err(ReadFailure {
            username: Some(username),
            error,
        }),
    }
}

async fn evaluate<P: ReplyPage>(
    page: &P,
    element: &P::Element,
    record: &ReplyRecord,
    config: &Config,
    blocker: &mut BlockService,
) -> ReplyOutcome {
    if !record.is_suspicious() {
        return ReplyOutcome::Clean;
    }

    warn!(
        "⚠️ 检测到可疑回复: {} | 内容: {} | 原因: {}",
        record.display_name(),
        record.content,
        describe_reasons(&record.reasons())
    );

    if !config.auto_mode {
        info!("建议拉黑: {} (自动模式关闭)", record.display_name());
        return ReplyOutcome::Advised;
    }

    if blocker
        .block_user(page, Some(record.username.as_str()), element)
        .await
    {
        ReplyOutcome::Blocked
    } else {
        ReplyOutcome::BlockFailed
    }
}
