use std::net::SocketAddr;

use logipipe::server::{self, AppState};
use serde_json::Value;

/// Serve `state` on an ephemeral port from a background runtime.
pub fn spawn_server(state: AppState) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let addr = listener.local_addr().expect("local addr");
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("test runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            server::serve_on(listener, state, std::future::pending())
                .await
                .expect("serve");
        });
    });
    addr
}

pub fn get_json(addr: SocketAddr, path: &str) -> (u16, Value) {
    into_status_json(ureq::get(&format!("http://{addr}{path}")).call())
}

pub fn post_json(addr: SocketAddr, path: &str, body: Value) -> (u16, Value) {
    into_status_json(ureq::post(&format!("http://{addr}{path}")).send_json(body))
}

pub fn post_raw(addr: SocketAddr, path: &str, body: &str) -> u16 {
    match ureq::post(&format!("http://{addr}{path}"))
        .set("Content-Type", "application/json")
        .send_string(body)
    {
        Ok(response) => response.status(),
        Err(ureq::Error::Status(code, _)) => code,
        Err(err) => panic!("request failed: {err}"),
    }
}

fn into_status_json(result: Result<ureq::Response, ureq::Error>) -> (u16, Value) {
    match result {
        Ok(response) => {
            let status = response.status();
            (status, response.into_json().expect("json body"))
        }
        Err(ureq::Error::Status(code, response)) => {
            (code, response.into_json().unwrap_or(Value::Null))
        }
        Err(err) => panic!("request failed: {err}"),
    }
}
