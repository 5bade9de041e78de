use crate::clients::LlmBackend;
use crate::models::MergeKind;
use crate::services::ReviewerKind;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 默认配置文件路径（可用 `REVIEW_CONFIG` 覆盖）
pub const DEFAULT_CONFIG_FILE: &str = "review.toml";

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 学生作业所在目录
    pub works_folder: PathBuf,
    /// 空白模板 notebook
    pub baseline_notebook: PathBuf,
    /// 作业中的任务数量
    pub expected_task_count: usize,
    /// 单元格合并方式
    pub merge_kind: MergeKind,
    /// 每份作业评审前几个任务
    pub tasks_to_review: usize,
    /// 评审策略
    pub reviewer_kind: ReviewerKind,
    /// 协作评审的轮数
    pub collaborative_iterations: usize,
    /// 同时评审的作业数量
    pub max_concurrent_works: usize,
    /// CSV 报告路径
    pub report_file: PathBuf,
    /// 解析失败的作业记录
    pub warn_file: PathBuf,
    /// 输出日志文件
    pub output_log_file: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_backend: LlmBackend,
    /// 协作评审的第二个后端（为空时与主后端相同）
    pub secondary_backend: Option<LlmBackend>,
    pub openai_api_key: String,
    pub openai_api_base_url: String,
    pub openai_model: String,
    pub yandex_iam_token: Option<String>,
    pub yandex_api_key: Option<String>,
    pub yandex_model_uri: String,
    /// 服务账号授权密钥（三项齐全时用 JWT 换取 IAM 令牌）
    pub yandex_service_account_id: Option<String>,
    pub yandex_key_id: Option<String>,
    /// PEM 格式的 RSA 私钥
    pub yandex_private_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    // --- 评审默认值 ---
    /// 任务未声明分数时使用的满分
    pub default_max_score: u32,
    /// 提示词模板名称或完整提示词文本
    pub review_prompt: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            works_folder: PathBuf::from("works"),
            baseline_notebook: PathBuf::from("original.ipynb"),
            expected_task_count: 3,
            merge_kind: MergeKind::ByChange,
            tasks_to_review: 1,
            reviewer_kind: ReviewerKind::Full,
            collaborative_iterations: 2,
            max_concurrent_works: 4,
            report_file: PathBuf::from("review_report.csv"),
            warn_file: PathBuf::from("warn.txt"),
            output_log_file: PathBuf::from("output.txt"),
            verbose_logging: false,
            llm_backend: LlmBackend::OpenAi,
            secondary_backend: None,
            openai_api_key: String::new(),
            openai_api_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o".to_string(),
            yandex_iam_token: None,
            yandex_api_key: None,
            yandex_model_uri: String::new(),
            yandex_service_account_id: None,
            yandex_key_id: None,
            yandex_private_key: None,
            max_tokens: 500,
            temperature: 0.5,
            default_max_score: 10,
            review_prompt: None,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_opt<T: FromStr>(name: &str, default: Option<T>) -> Option<T> {
    match std::env::var(name) {
        Ok(v) => v.parse().ok().or(default),
        Err(_) => default,
    }
}

impl Config {
    /// 加载配置：默认值 → TOML 文件（存在时） → 环境变量
    pub fn load() -> Result<Self> {
        let path = std::env::var("REVIEW_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let path = Path::new(&path);

        if !path.exists() {
            return Ok(Self::from_env());
        }

        Ok(Self::from_toml_file(path)?.with_env_overrides())
    }

    /// 只使用默认值和环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取配置，缺失的字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 用环境变量覆盖已有配置
    pub fn with_env_overrides(self) -> Self {
        Self {
            works_folder: env_or("WORKS_FOLDER", self.works_folder),
            baseline_notebook: env_or("BASELINE_NOTEBOOK", self.baseline_notebook),
            expected_task_count: env_or("EXPECTED_TASK_COUNT", self.expected_task_count),
            merge_kind: env_or("MERGE_KIND", self.merge_kind),
            tasks_to_review: env_or("TASKS_TO_REVIEW", self.tasks_to_review),
            reviewer_kind: env_or("REVIEWER_KIND", self.reviewer_kind),
            collaborative_iterations: env_or("COLLABORATIVE_ITERATIONS", self.collaborative_iterations),
            max_concurrent_works: env_or("MAX_CONCURRENT_WORKS", self.max_concurrent_works),
            report_file: env_or("REPORT_FILE", self.report_file),
            warn_file: env_or("WARN_FILE", self.warn_file),
            output_log_file: env_or("OUTPUT_LOG_FILE", self.output_log_file),
            verbose_logging: env_or("VERBOSE_LOGGING", self.verbose_logging),
            llm_backend: env_or("LLM_BACKEND", self.llm_backend),
            secondary_backend: env_opt("SECONDARY_BACKEND", self.secondary_backend),
            openai_api_key: env_or("OPENAI_API_KEY", self.openai_api_key),
            openai_api_base_url: env_or("OPENAI_API_BASE_URL", self.openai_api_base_url),
            openai_model: env_or("OPENAI_MODEL", self.openai_model),
            yandex_iam_token: env_opt("YANDEX_IAM_TOKEN", self.yandex_iam_token),
            yandex_api_key: env_opt("YANDEX_API_KEY", self.yandex_api_key),
            yandex_model_uri: env_or("YANDEX_MODEL_URI", self.yandex_model_uri),
            yandex_service_account_id: env_opt(
                "YANDEX_SERVICE_ACCOUNT_ID",
                self.yandex_service_account_id,
            ),
            yandex_key_id: env_opt("YANDEX_KEY_ID", self.yandex_key_id),
            yandex_private_key: env_opt("YANDEX_PRIVATE_KEY", self.yandex_private_key),
            max_tokens: env_or("LLM_MAX_TOKENS", self.max_tokens),
            temperature: env_or("LLM_TEMPERATURE", self.temperature),
            default_max_score: env_or("DEFAULT_MAX_SCORE", self.default_max_score),
            review_prompt: env_opt("REVIEW_PROMPT", self.review_prompt),
        }
    }
}
