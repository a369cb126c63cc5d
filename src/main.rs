// ==========================================
// 后台运营系统 - 命令行入口
// ==========================================
// 用法:
//   ventas-backoffice [--db PATH] [--actor ID] <correo|ventas> <FILE> [campo=indice ...]
//   ventas-backoffice [--db PATH] historial [N]
// ==========================================

use std::error::Error;
use ventas_backoffice::app::{get_default_db_path, AppState};
use ventas_backoffice::{logging, ReconcileKind, APP_NAME, VERSION};

const USAGE: &str = "用法:
  ventas-backoffice [--db PATH] [--actor ID] <correo|ventas> <FILE> [campo=indice ...]
  ventas-backoffice [--db PATH] historial [N]

  correo   物流状态对账（列参数: guia, estado, descripcion, ubicacion）
  ventas   销售状态对账（列参数: sds, estado, observacion）
  historial 最近的对账批次";

/// 命令行默认触发人
const DEFAULT_ACTOR: &str = "cli";

enum Command {
    Reconcile {
        kind: ReconcileKind,
        file: String,
        overrides: Vec<String>,
    },
    History {
        limit: Option<usize>,
    },
}

struct CliArgs {
    db_path: Option<String>,
    actor: String,
    command: Command,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut db_path = None;
    let mut actor = DEFAULT_ACTOR.to_string();
    let mut positional = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => db_path = Some(args.next().ok_or("--db 缺少参数")?),
            "--actor" => actor = args.next().ok_or("--actor 缺少参数")?,
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("correo") => reconcile_command(ReconcileKind::Shipment, positional)?,
        Some("ventas") => reconcile_command(ReconcileKind::Sale, positional)?,
        Some("historial") => {
            let limit = positional
                .next()
                .map(|n| n.parse::<usize>().map_err(|e| format!("无效的条数 '{}': {}", n, e)))
                .transpose()?;
            Command::History { limit }
        }
        Some(other) => return Err(format!("未知命令: {}\n\n{}", other, USAGE)),
        None => return Err(USAGE.to_string()),
    };

    Ok(CliArgs {
        db_path,
        actor,
        command,
    })
}

fn reconcile_command(
    kind: ReconcileKind,
    mut rest: impl Iterator<Item = String>,
) -> Result<Command, String> {
    let file = rest.next().ok_or_else(|| format!("缺少文件路径\n\n{}", USAGE))?;
    Ok(Command::Reconcile {
        kind,
        file,
        overrides: rest.collect(),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let cli = match parse_args(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("{}", msg);
            std::process::exit(2);
        }
    };

    let db_path = cli.db_path.unwrap_or_else(get_default_db_path);
    tracing::info!("{} v{}，数据库: {}", APP_NAME, VERSION, db_path);

    let state = AppState::new(db_path)?;

    match cli.command {
        Command::Reconcile {
            kind,
            file,
            overrides,
        } => {
            let response = state
                .reconcile_api
                .reconcile_file(kind, &file, &overrides, &cli.actor)
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::History { limit } => {
            let runs = state.reconcile_api.list_recent_runs(limit).await?;
            println!("{}", serde_json::to_string_pretty(&runs)?);
        }
    }

    Ok(())
}
