//! 两个节点通过本机 TCP 玩一轮

use std::sync::{Arc, Mutex};
use std::time::Duration;

use boggle_client::{ConnectionStatus, GameDisplay, Node, NodeConfig};
use boggle_server::{HostConfig, Phase};
use protocol::{Dictionary, Grid, Ledger, RoundSummary};

#[derive(Default)]
struct Screen {
    boards: Mutex<usize>,
    results: Mutex<Vec<RoundSummary>>,
    ledgers: Mutex<Vec<Ledger>>,
}

impl GameDisplay for Screen {
    fn show_board(&self, _grid: &Grid) {
        *self.boards.lock().unwrap() += 1;
    }
    fn show_timer(&self, _elapsed: Duration, _max: Duration) {}
    fn show_connection_status(&self, _status: &ConnectionStatus) {}
    fn show_round_result(&self, summary: &RoundSummary) {
        self.results.lock().unwrap().push(summary.clone());
    }
    fn show_ledger(&self, ledger: &Ledger) {
        self.ledgers.lock().unwrap().push(ledger.clone());
    }
    fn show_message(&self, _text: &str) {}
    fn show_error(&self, _text: &str) {}
}

fn config(name: &str) -> NodeConfig {
    let mut config = NodeConfig {
        name: name.to_string(),
        host: HostConfig {
            round_secs: 1,
            ..Default::default()
        },
        ..Default::default()
    };
    config.network.host = "127.0.0.1".to_string();
    config.network.port = 0;
    config
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_host_and_guest_play_a_round() {
    let dictionary = Arc::new(Dictionary::from_words(["cow", "one", "funky", "double"]));

    let host_screen = Arc::new(Screen::default());
    let host = Node::with_dictionary(config("Ann"), Some(dictionary), host_screen.clone());
    let address = host.host_game().await.unwrap();

    let guest_screen = Arc::new(Screen::default());
    let guest = Node::with_dictionary(config("Bob"), None, guest_screen.clone());
    guest.join_game(&address).await.unwrap();

    let coordinator = host.coordinator().unwrap();
    let grid = Grid::from_rows(&["ONEL", "DUBL", "FCOW", "UNKY"]).unwrap();
    coordinator.start_round_with_grid(grid).await;

    host.words().push("cow funky");
    guest.words().push("cow one hello");

    // 一秒的回合，加上交回和推送结果
    for _ in 0..50 {
        if !guest_screen.results.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let results = guest_screen.results.lock().unwrap();
    assert_eq!(results.len(), 1, "guest never received results");
    let summary = &results[0];
    assert_eq!(summary.entries[0].name, "Ann");
    assert_eq!(summary.entries[0].score, 2);
    assert_eq!(summary.entries[1].name, "Bob");
    assert_eq!(summary.entries[1].score, 1);

    assert_eq!(*host_screen.boards.lock().unwrap(), 1);
    assert_eq!(*guest_screen.boards.lock().unwrap(), 1);
    assert_eq!(host_screen.results.lock().unwrap().len(), 1);
    assert_eq!(coordinator.phase().await, Phase::Idle);

    let ledger = coordinator.ledger().await;
    let standings = ledger.standings();
    assert_eq!(standings[0].1, 2);
    assert_eq!(standings[1].1, 1);
}
