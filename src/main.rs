//! RepoMind Q&A client - 终端前端
//!
//! 从标准输入读取命令驱动问答会话，通知与答案直接输出到终端。

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repomind_client::config::{get_config, reload_config, update_config};
use repomind_client::gateway::{Gateway, HttpGateway};
use repomind_client::models::{Answer, HealthSnapshot};
use repomind_client::services::{
    ChannelSink, CodebaseDirectory, DiagramState, HealthMonitor, MermaidTextBackend, Notification,
    RefactorOutcome, SessionController, Severity, SubmitOutcome,
};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "repomind-client", version, about = "Ask questions about an indexed codebase")]
struct Cli {
    /// 覆盖配置中的网关地址（仅本次运行）
    #[arg(long)]
    base_url: Option<String>,

    /// 启动时打开的代码库 ID
    codebase: Option<String>,
}

const HELP: &str = "\
commands:
  open <codebase-id>        open a codebase session
  tags <a, b, c>            set tags for the next question
  ask <question>            ask a question
  history                   list recent questions
  show <n>                  display history entry n
  refactor <n>              suggest refactors for file reference n
  codebases [filter]        list all codebases
  questions <codebase-id>   list questions of another codebase
  health                    show gateway status
  config base-url <url>     persist a new gateway URL
  config reload             reload config.json
  close                     close the current session
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志写到 stderr，不干扰终端输出
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repomind_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = get_config();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let gateway: Arc<dyn Gateway> = Arc::new(
        HttpGateway::from_config(&config).context("failed to create gateway client")?,
    );
    info!("Using gateway at {}", config.base_url);

    let (sink, mut notifications) = ChannelSink::new();
    let sink = Arc::new(sink);
    tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            print_notification(&notification);
        }
    });

    let session = SessionController::new(
        gateway.clone(),
        sink.clone(),
        Arc::new(MermaidTextBackend),
        config.default_language.clone(),
    );
    let directory = CodebaseDirectory::new(gateway.clone(), sink);
    let monitor = HealthMonitor::spawn(gateway, config.health_interval());

    if let Some(codebase) = cli.codebase {
        session.open(&codebase).await;
        print_history(&session);
    }

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "" => {}
            "open" if !rest.is_empty() => {
                session.open(rest).await;
                print_history(&session);
            }
            "tags" => session.set_tags(rest),
            "ask" => {
                session.set_question(rest);
                if let SubmitOutcome::Answered { history_refresh } = session.submit().await {
                    if let Some(answer) = session.active_answer() {
                        print_answer(&answer, &session.render_diagram().await);
                    }
                    if let Err(e) = history_refresh.await {
                        warn!("History refresh task failed: {}", e);
                    }
                }
            }
            "history" => print_history(&session),
            "show" => match rest.parse::<usize>().ok().and_then(|n| session.history().get(n)) {
                Some(record) => {
                    session.select_from_history(&record);
                    if let Some(answer) = session.active_answer() {
                        print_answer(&answer, &session.render_diagram().await);
                    }
                }
                None => println!("no such history entry"),
            },
            "refactor" => {
                let outcome = match rest.parse::<usize>() {
                    Ok(index) => session.refactor_reference(index).await,
                    Err(_) => None,
                };
                match outcome {
                    Some(RefactorOutcome::Applied(_)) => print_suggestions(&session),
                    Some(_) => {}
                    None => println!("no such file reference"),
                }
            }
            "codebases" => {
                directory.load().await;
                for cb in directory.filtered(rest) {
                    println!(
                        "  {}  {}  [{:?}]  {} files",
                        cb.id,
                        cb.name,
                        cb.source,
                        cb.file_count.map_or("—".to_string(), |n| n.to_string())
                    );
                }
            }
            "questions" if !rest.is_empty() => {
                if directory.select(rest).await {
                    for record in directory.questions() {
                        println!("  - {}", record.question);
                    }
                }
            }
            "health" => match monitor.latest() {
                Some(snapshot) => print_health(&snapshot),
                None => println!("no health check yet"),
            },
            "config" => match rest.split_once(' ') {
                Some(("base-url", url)) => {
                    let url = url.trim().to_string();
                    match update_config(|c| c.base_url = url) {
                        Ok(saved) => println!("saved base_url={} (restart to apply)", saved.base_url),
                        Err(e) => println!("{}", e),
                    }
                }
                _ if rest == "reload" => {
                    reload_config();
                    println!("config reloaded (restart to apply)");
                }
                _ => println!("{}", HELP),
            },
            "close" => session.close(),
            "quit" | "exit" => break,
            _ => println!("{}", HELP),
        }
    }

    monitor.shutdown();
    session.close();
    Ok(())
}

fn print_notification(notification: &Notification) {
    match notification.severity {
        Severity::Success => println!("[ok] {}", notification.message),
        Severity::Error => println!("[error] {}", notification.message),
    }
}

fn print_answer(answer: &Answer, diagram: &DiagramState) {
    println!("\nQ: {}", answer.question);
    if !answer.tags.is_empty() {
        println!("   tags: {}", answer.tags.join(", "));
    }
    if let Some(artifact) = diagram.artifact() {
        println!("\n--- {} ({}) ---\n{}\n", artifact.kind, artifact.handle, artifact.body);
    }
    println!("\n{}\n", answer.answer);
    for (i, reference) in answer.file_references.iter().enumerate() {
        let hint = if reference.has_snippet() { "  (refactor available)" } else { "" };
        println!("[{}] {} {}{}", i, reference.file, reference.line_label(), hint);
        if let Some(explanation) = &reference.explanation {
            println!("    {}", explanation);
        }
        for line in reference.snippet.lines() {
            println!("    | {}", line);
        }
    }
}

fn print_history(session: &SessionController) {
    let records = session.history().records();
    if records.is_empty() {
        println!("No questions yet");
        return;
    }
    for (i, record) in records.iter().enumerate() {
        let date = record
            .created_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "—".to_string());
        println!("  {:>2}. {}  ({})", i, record.question, date);
    }
}

fn print_suggestions(session: &SessionController) {
    for suggestion in session.refactor().suggestions().unwrap_or_default() {
        println!(
            "  [{}] {} ({})\n      {}",
            suggestion.priority.as_str().to_uppercase(),
            suggestion.title,
            suggestion.category,
            suggestion.description
        );
    }
}

fn print_health(snapshot: &HealthSnapshot) {
    let online = if snapshot.is_ok() { "Online" } else { "Offline" };
    println!("Backend API: {}", online);
    if let Some(error) = &snapshot.error {
        println!("  {}", error);
    }
    if let Some(db) = &snapshot.database {
        println!("Database: {} [{}]", db.status, status_mark(snapshot.database_connected()));
    }
    if let Some(ai) = &snapshot.ai {
        println!("AI Service: {} [{}]", ai.status, status_mark(snapshot.ai_configured()));
    }
    if let Some(system) = &snapshot.system {
        println!(
            "Platform: {}  Uptime: {}",
            system.platform.as_deref().unwrap_or("—"),
            system.uptime.as_deref().unwrap_or("—")
        );
    }
    if let Some(stats) = &snapshot.stats {
        println!(
            "Codebases: {:?}  Code files: {:?}  Questions: {:?}",
            stats.codebases, stats.code_files, stats.questions
        );
    }
    if let Some(checked_at) = snapshot.checked_at {
        println!("Last checked: {}", checked_at.format("%H:%M:%S"));
    }
}

fn status_mark(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "!!"
    }
}
