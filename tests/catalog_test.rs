use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use storeview::catalog::{spawn_fetch, CatalogClient, FetchError, ProductId};
use storeview::{App, AppConfig, AppEvent, FetchState, Theme};

const CATALOG: &str = r#"[
  {"id":1,"title":"Red Shirt","price":20,"description":"cotton","category":"clothing",
   "image":"https://example.com/1.jpg","rating":{"rate":4.1,"count":10}},
  {"id":2,"title":"Blue Hat","price":10.5,"category":"accessories"},
  {"id":3,"title":"Green Shirt","price":25,"category":"clothing"}
]"#;

fn read_request(stream: &TcpStream) {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
        if line == "\r\n" {
            break;
        }
        line.clear();
    }
}

fn respond(mut stream: TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

/// Serve one request with the given status line and body.
fn serve_once(status: &'static str, body: &'static str) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        read_request(&stream);
        respond(stream, status, body);
    });
    (addr, server)
}

/// Serve one request, but only answer once `release` fires.
fn serve_delayed(body: &'static str) -> (SocketAddr, std::sync::mpsc::Sender<()>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (release, released) = channel::<()>();
    let server = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        read_request(&stream);
        let _ = released.recv();
        respond(stream, "200 OK", body);
    });
    (addr, release, server)
}

fn client(addr: SocketAddr) -> CatalogClient {
    CatalogClient::new(format!("http://{}/products", addr), Duration::from_secs(5))
}

fn app_for(addr: SocketAddr) -> (App, Receiver<AppEvent>) {
    let (tx, rx) = channel();
    let mut config = AppConfig::default();
    config.catalog.url = format!("http://{}/products", addr);
    config.catalog.timeout_secs = 5;
    (App::new_with_config(tx, Theme::default(), config), rx)
}

fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    done()
}

#[test]
fn test_fetch_decodes_catalog() {
    let (addr, server) = serve_once("200 OK", CATALOG);
    let products = client(addr).fetch().expect("fetch should succeed");
    server.join().unwrap();

    assert_eq!(products.len(), 3);
    assert_eq!(products[0].id, ProductId::Number(1));
    assert_eq!(products[1].title, "Blue Hat");
    assert_eq!(products[1].price_label("$"), "$10.5");
    assert_eq!(products[2].category, "clothing");
}

#[test]
fn test_http_error_status() {
    let (addr, server) = serve_once("500 Internal Server Error", "{}");
    let result = client(addr).fetch();
    server.join().unwrap();

    match result {
        Err(FetchError::Status { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected status error, got {:?}", other),
    }
}

#[test]
fn test_malformed_body() {
    let (addr, server) = serve_once("200 OK", "<html>maintenance</html>");
    let result = client(addr).fetch();
    server.join().unwrap();
    assert!(matches!(result, Err(FetchError::Decode(_))));
}

#[test]
fn test_connection_refused() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let result = client(addr).fetch();
    assert!(matches!(result, Err(FetchError::Transport { .. })));
}

#[test]
fn test_spawn_fetch_delivers_result() {
    let (addr, server) = serve_once("200 OK", CATALOG);
    let (tx, rx) = channel();
    let handle = spawn_fetch(client(addr), tx).unwrap();

    match rx.recv_timeout(Duration::from_secs(10)) {
        Ok(AppEvent::CatalogLoaded(Ok(products))) => assert_eq!(products.len(), 3),
        other => panic!("expected loaded catalog, got {:?}", other),
    }
    server.join().unwrap();
    assert!(wait_until(Duration::from_secs(5), || handle.is_finished()));
}

#[test]
fn test_app_loads_catalog_once() {
    let (addr, server) = serve_once("200 OK", CATALOG);
    let (mut app, rx) = app_for(addr);

    app.event(&AppEvent::Fetch);
    assert_eq!(app.fetch_state(), FetchState::Pending);
    // A second mount-time trigger does not issue another request
    app.event(&AppEvent::Fetch);

    let event = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert!(matches!(event, AppEvent::CatalogLoaded(Ok(_))));
    app.event(&event);
    server.join().unwrap();

    assert_eq!(app.fetch_state(), FetchState::Loaded(3));
    assert_eq!(app.filtered().len(), 3);
    assert!(matches!(
        rx.recv_timeout(Duration::from_millis(200)),
        Err(RecvTimeoutError::Timeout)
    ));
}

#[test]
fn test_app_fetch_failure_leaves_empty_list() {
    let (addr, server) = serve_once("503 Service Unavailable", "");
    let (mut app, rx) = app_for(addr);

    app.event(&AppEvent::Fetch);
    let event = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    app.event(&event);
    server.join().unwrap();

    assert_eq!(app.fetch_state(), FetchState::Failed);
    assert!(app.products().is_empty());
    assert!(app.category_counts().is_empty());
}

#[test]
fn test_result_after_teardown_is_dropped() {
    let (addr, release, server) = serve_delayed(CATALOG);
    let (mut app, rx) = app_for(addr);

    app.event(&AppEvent::Fetch);
    app.shutdown();
    assert_eq!(app.fetch_state(), FetchState::Cancelled);
    assert!(app.fetch_handle().is_some_and(|h| h.is_cancelled()));
    // Shutting down twice, as Drop does after an explicit shutdown, is harmless
    app.shutdown();
    assert_eq!(app.fetch_state(), FetchState::Cancelled);

    release.send(()).unwrap();
    server.join().unwrap();
    let finished = wait_until(Duration::from_secs(10), || {
        app.fetch_handle().map(|h| h.is_finished()).unwrap_or(true)
    });
    assert!(finished);

    assert!(!matches!(
        rx.recv_timeout(Duration::from_millis(200)),
        Ok(AppEvent::CatalogLoaded(_))
    ));
    assert!(app.products().is_empty());
}
