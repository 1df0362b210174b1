use crate::cmd::{open_queue, runtime};
use std::path::Path;

pub fn run(root: &Path, port: u16) -> anyhow::Result<()> {
    let queue = open_queue(root)?;

    runtime()?.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        println!("triage API → http://localhost:{actual_port}/api/submissions");

        tokio::select! {
            res = triage_server::serve_on(queue, listener) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
