//! End-to-end behaviour of the command surface, through the public API and
//! over a real TCP connection.

use linekv::commands::CommandHandler;
use linekv::connection::{handle_connection, ConnectionStats};
use linekv::protocol::DEFAULT_MAX_LINE;
use linekv::storage::{Clock, ManualClock, StorageEngine};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

fn handler_with_clock() -> (CommandHandler, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let storage = StorageEngine::with_clock(Arc::clone(&clock) as Arc<dyn Clock>);
    (CommandHandler::new(Arc::new(storage)), clock)
}

fn run(handler: &CommandHandler, line: &str) -> String {
    handler.execute(line).to_string()
}

#[test]
fn round_trip_for_many_keys() {
    let (handler, _) = handler_with_clock();

    let pairs = [("k", "v"), ("user:1", "alice"), ("ünï", "cödé"), ("CaSe", "42")];
    for (key, value) in pairs {
        assert_eq!(run(&handler, &format!("SET {} {}", key, value)), "OK");
        assert_eq!(run(&handler, &format!("GET {}", key)), value);
    }
}

#[test]
fn set_overwrites_value() {
    let (handler, _) = handler_with_clock();

    run(&handler, "SET k first");
    run(&handler, "SET k second");
    assert_eq!(run(&handler, "GET k"), "second");
}

#[test]
fn ttl_lifecycle_with_lazy_removal() {
    let (handler, clock) = handler_with_clock();

    assert_eq!(run(&handler, "SET session abc"), "OK");
    assert_eq!(run(&handler, "TTL session"), "(integer) -1");
    assert_eq!(run(&handler, "EXPIRE session 10"), "(integer) 1");
    assert_eq!(run(&handler, "TTL session"), "(integer) 10");

    clock.advance(Duration::from_millis(4_200));
    assert_eq!(run(&handler, "TTL session"), "(integer) 5");
    assert_eq!(run(&handler, "KEYS *"), "1) session");

    clock.advance(Duration::from_millis(5_800));
    assert_eq!(handler.storage().len(), 1);
    assert_eq!(run(&handler, "KEYS *"), "(empty array)");
    assert_eq!(handler.storage().len(), 0);
    assert_eq!(run(&handler, "GET session"), "(nil)");
    assert_eq!(run(&handler, "TTL session"), "(integer) -2");
    assert_eq!(run(&handler, "EXPIRE session 10"), "(integer) 0");
    assert_eq!(run(&handler, "DEL session"), "(integer) 0");
}

#[test]
fn glob_patterns_over_wire() {
    let (handler, _) = handler_with_clock();

    for key in ["abc", "ab", "a", "key1", "key2", "another_key"] {
        run(&handler, &format!("SET {} v", key));
    }

    assert_eq!(run(&handler, "KEYS a*"), "1) a\n2) ab\n3) abc\n4) another_key");
    assert_eq!(run(&handler, "KEYS a?"), "1) ab");
    assert_eq!(run(&handler, "KEYS key[12]"), "1) key1\n2) key2");
    assert_eq!(run(&handler, "KEYS *key*"), "1) another_key\n2) key1\n3) key2");
    assert_eq!(run(&handler, "KEYS nomatch"), "(empty array)");
}

#[test]
fn errors_never_touch_storage() {
    let (handler, _) = handler_with_clock();

    assert_eq!(
        run(&handler, "SET onlyone"),
        "ERR wrong number of arguments for 'SET' command"
    );
    assert_eq!(run(&handler, "FOO x"), "Unknown command");
    assert_eq!(run(&handler, "FOO"), "Unknown command");
    assert_eq!(run(&handler, "EXPIRE k notanumber"), "ERR invalid expire time");
    assert!(handler.storage().is_empty());
}

async fn start_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let storage = Arc::new(StorageEngine::new());
    let stats = Arc::new(ConnectionStats::new());

    tokio::spawn(async move {
        while let Ok((stream, peer)) = listener.accept().await {
            let handler = CommandHandler::new(Arc::clone(&storage));
            tokio::spawn(handle_connection(
                stream,
                peer,
                handler,
                Arc::clone(&stats),
                DEFAULT_MAX_LINE,
            ));
        }
    });

    addr
}

struct Client {
    lines: tokio::io::Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let (reader, writer) = TcpStream::connect(addr).await.unwrap().into_split();
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .unwrap();
    }

    async fn recv(&mut self) -> String {
        self.lines.next_line().await.unwrap().unwrap()
    }
}

#[tokio::test]
async fn tcp_session() {
    let addr = start_server().await;
    let mut client = Client::connect(addr).await;

    client.send("PING").await;
    assert_eq!(client.recv().await, "PONG");

    client.send("set fruit apple").await;
    assert_eq!(client.recv().await, "OK");
    client.send("SET flower rose").await;
    assert_eq!(client.recv().await, "OK");

    // Multi-line KEYS reply: one line per key, single terminator
    client.send("KEYS f*").await;
    assert_eq!(client.recv().await, "1) flower");
    assert_eq!(client.recv().await, "2) fruit");

    client.send("TTL fruit").await;
    assert_eq!(client.recv().await, "(integer) -1");

    client.send("EXPIRE fruit 100").await;
    assert_eq!(client.recv().await, "(integer) 1");

    client.send("DEL fruit").await;
    assert_eq!(client.recv().await, "(integer) 1");

    client.send("GET fruit").await;
    assert_eq!(client.recv().await, "(nil)");

    client.send("").await;
    assert_eq!(client.recv().await, "Unknown command");

    client.send("GET").await;
    assert_eq!(
        client.recv().await,
        "ERR wrong number of arguments for 'GET' command"
    );
}

#[tokio::test]
async fn tcp_concurrent_clients() {
    let addr = start_server().await;

    let tasks: Vec<_> = (0..8)
        .map(|t| {
            tokio::spawn(async move {
                let mut client = Client::connect(addr).await;
                for i in 0..50 {
                    client.send(&format!("SET c{}:{} {}", t, i, i)).await;
                    assert_eq!(client.recv().await, "OK");
                    client.send(&format!("GET c{}:{}", t, i)).await;
                    assert_eq!(client.recv().await, i.to_string());
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    let mut client = Client::connect(addr).await;
    client.send("KEYS c7:4?").await;
    let mut keys = Vec::new();
    for _ in 0..10 {
        keys.push(client.recv().await);
    }
    assert_eq!(keys.first().map(String::as_str), Some("1) c7:40"));
    assert_eq!(keys.last().map(String::as_str), Some("10) c7:49"));
}
