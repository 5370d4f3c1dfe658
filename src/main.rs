use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use moderation_hooks::{
    preview, EditRequest, MemoryQueue, ModerationConfig, ModerationError, PendingEditRewriter,
    PendingStore, User,
};

#[derive(Parser)]
#[command(name = "moderation_hooks")]
#[command(about = "基于审核队列改写编辑请求、预览待审核编辑、检查上传权限")]
#[command(version)]
struct Cli {
    /// 静默模式(仅输出错误)
    #[arg(long, global = true)]
    quiet: bool,

    /// 配置文件路径（默认使用内置配置）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 把部分编辑请求改写为基于待审核修订的完整编辑
    Rewrite {
        /// 编辑请求JSON文件路径
        #[arg(short, long)]
        request: PathBuf,

        /// 审核队列JSON文件路径
        #[arg(short, long)]
        queue: PathBuf,

        /// 只查找该用户提交的待审核编辑
        #[arg(long)]
        author: Option<String>,

        /// 输出JSON文件路径（默认输出到标准输出）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 预览审核队列中的一条编辑
    Preview {
        /// 审核队列JSON文件路径
        #[arg(short, long)]
        queue: PathBuf,

        /// 编辑编号
        #[arg(long)]
        id: u64,

        /// 以JSON格式输出
        #[arg(long)]
        json: bool,
    },

    /// 检查用户能否执行某个API模块
    Check {
        /// API模块名（如 upload）
        #[arg(long)]
        module: String,

        /// 用户名
        #[arg(long)]
        user: String,

        /// 用户所属用户组（可多次指定）
        #[arg(long = "group")]
        groups: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// 初始化日志输出（RUST_LOG 优先，默认 warn）
fn init_logging(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = ModerationConfig::load_or_embedded(cli.config.as_deref())
        .context("加载配置失败")?;

    match &cli.command {
        Command::Rewrite {
            request,
            queue,
            author,
            output,
        } => handle_rewrite(&config, request, queue, author.as_deref(), output.as_deref()),
        Command::Preview { queue, id, json } => handle_preview(queue, *id, *json),
        Command::Check {
            module,
            user,
            groups,
        } => handle_check(cli, &config, module, user, groups),
    }
}

/// 处理请求改写
fn handle_rewrite(
    config: &ModerationConfig,
    request_path: &Path,
    queue_path: &Path,
    author: Option<&str>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let request_json = std::fs::read_to_string(request_path)
        .with_context(|| format!("读取编辑请求失败: {:?}", request_path))?;
    let request = EditRequest::from_json(&request_json)
        .with_context(|| format!("解析编辑请求失败: {:?}", request_path))?;
    let queue = load_queue(queue_path)?;

    let author_view = author.map(|name| queue.for_author(name));
    let store: &dyn PendingStore = match &author_view {
        Some(view) => view,
        None => &queue,
    };

    let rewriter = PendingEditRewriter::new(store)
        .with_directory(&queue)
        .with_trim_order(config.trim_order);
    let rewritten = rewriter.rewrite(&request)?;

    let json_output = serde_json::to_string_pretty(&rewritten)?;
    match output {
        Some(path) => std::fs::write(path, json_output)
            .with_context(|| format!("写入文件失败: {:?}", path))?,
        None => println!("{}", json_output),
    }

    Ok(())
}

/// 处理待审核编辑预览
fn handle_preview(queue_path: &Path, id: u64, json: bool) -> anyhow::Result<()> {
    let queue = load_queue(queue_path)?;
    let preview = preview(&queue, id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
    } else {
        println!("{}", preview);
    }

    Ok(())
}

/// 处理 API 模块权限检查
fn handle_check(
    cli: &Cli,
    config: &ModerationConfig,
    module: &str,
    user: &str,
    groups: &[String],
) -> anyhow::Result<()> {
    let user = User {
        name: user.to_string(),
        groups: groups.to_vec(),
    };

    config.bypass.check_can_execute(module, &user)?;

    if !cli.quiet {
        let queued = if config.bypass.should_queue(&user) { "是" } else { "否" };
        println!("允许执行模块 {}（编辑需要审核: {}）", module, queued);
    }

    Ok(())
}

fn load_queue(path: &Path) -> anyhow::Result<MemoryQueue> {
    MemoryQueue::load(path).with_context(|| format!("加载审核队列失败: {:?}", path))
}

/// 输出错误：审核错误以 API 错误格式写到标准输出，其他错误写到标准错误
fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<ModerationError>() {
        Some(moderation_err)
            if !matches!(
                moderation_err,
                ModerationError::IoError(_) | ModerationError::JsonError(_)
            ) =>
        {
            let body = serde_json::json!({ "error": moderation_err.to_api_error() });
            println!("{}", body);
        }
        _ => eprintln!("错误: {:#}", err),
    }
}
