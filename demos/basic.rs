use netedit_http::{Device, Link, LinkEndpoint, SessionApi};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let api_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8080/api".to_owned());
    let file_url = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "file:///topologies/lab.json".to_owned());

    let api = SessionApi::new(api_url);
    let session = api
        .open(&file_url, None, || eprintln!("session expired, open a new one"))
        .await?;

    session
        .fetch_topology_with_retry(
            |network| {
                println!(
                    "topology: {} device(s), {} link(s)",
                    network.devices.len(),
                    network.links.len()
                )
            },
            |notice| {
                eprintln!(
                    "retry {}/{} after {}",
                    notice.attempt, notice.retry_limit, notice.kind
                )
            },
            || eprintln!("service did not recover, giving up"),
        )
        .await?;

    let a = session.create_device(&Device::new("r1").with_kind("router")).await?;
    let b = session.create_device(&Device::new("pc1").with_kind("host")).await?;
    let a_ports = session.list_ports(&a.id).await?;
    let b_ports = session.list_ports(&b.id).await?;

    if let (Some(a_port), Some(b_port)) = (a_ports.first(), b_ports.first()) {
        let link = session
            .create_link(&Link::between(
                LinkEndpoint::new(&a.id, &a_port.id),
                LinkEndpoint::new(&b.id, &b_port.id),
            ))
            .await?;
        println!("linked {} <-> {} as {}", a.name, b.name, link.id);
    }

    api.destroy_session(session.session_url()).await?;
    Ok(())
}
