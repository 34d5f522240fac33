use std::sync::Arc;

use anyhow::Result;
use boggle_ai::PRESETS;
use boggle_client::{ConnectionSupervisor, Node, NodeConfig, Preferences, TracingDisplay};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "Commands:
  /host           host a game
  /join HOST:PORT join a game
  /start          start a round (host only)
  /ai [STRENGTH]  add a computer opponent, strength 0..=999 (host only)
  /leave          leave the current game
  /quit           exit
Anything else is taken as words for the current round.";

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("boggle_client=info".parse()?)
            .add_directive("boggle_server=info".parse()?))
        .init();

    let mut prefs = Preferences::load();
    let config = NodeConfig::from_env(&prefs)?;
    info!("Boggle 启动中，玩家: {}", config.name);

    let node = Arc::new(Node::new(config, Arc::new(TracingDisplay)));
    let supervisor = ConnectionSupervisor::new(node.clone()).spawn();

    if let Some(address) = node.config().join.clone() {
        join_and_remember(&node, &mut prefs, &address).await;
    } else if let Some(address) = prefs.last_address() {
        info!("上次加入的主机: {} (输入 /join {} 重新加入)", address, address);
    }
    info!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "/host" => match node.host_game().await {
                Ok(address) => info!("其他玩家可以加入 {}", address),
                Err(e) => warn!("{:#}", e),
            },
            "/join" if !arg.is_empty() => join_and_remember(&node, &mut prefs, arg).await,
            "/start" => {
                if let Err(e) = node.start_round().await {
                    warn!("{:#}", e);
                }
            }
            "/ai" => {
                let strength = if arg.is_empty() {
                    PRESETS[PRESETS.len() - 1]
                } else {
                    match arg.parse() {
                        Ok(strength) => strength,
                        Err(_) => {
                            warn!("Strength must be a number, presets are {:?}", PRESETS);
                            continue;
                        }
                    }
                };
                match node.add_computer_opponent(strength).await {
                    Ok(player) => info!("{} joined", player.name),
                    Err(e) => warn!("{:#}", e),
                }
            }
            "/leave" => node.leave(),
            "/quit" => break,
            _ if command.starts_with('/') => info!("{}", HELP),
            _ => {
                node.words().push(line);
            }
        }
    }

    node.leave();
    supervisor.abort();
    Ok(())
}

async fn join_and_remember(node: &Node, prefs: &mut Preferences, address: &str) {
    match node.join_game(address).await {
        Ok(_) => {
            prefs.player_name = Some(node.name().to_string());
            prefs.remember_host(address);
            if let Err(e) = prefs.save() {
                warn!("保存偏好失败: {:#}", e);
            }
        }
        Err(e) => warn!("{:#}", e),
    }
}
