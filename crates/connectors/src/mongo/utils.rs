use model::config::{ExtractorConfig, WriteAck};
use mongodb::{
    Client,
    options::{Acknowledgment, ClientOptions, Credential, ServerAddress, WriteConcern},
};

/// Opens one client against the given hosts. Planning dials topology
/// registries and individual deployments, so the host list is a
/// parameter rather than always `config.hosts`.
pub(crate) async fn connect(
    hosts: &[String],
    config: &ExtractorConfig,
) -> Result<Client, mongodb::error::Error> {
    let mut options = ClientOptions::default();
    options.hosts = hosts
        .iter()
        .map(|host| ServerAddress::parse(endpoint(host, config.port)))
        .collect::<Result<Vec<_>, _>>()?;
    if let (Some(user), Some(password)) = (&config.username, &config.password) {
        options.credential = Some(
            Credential::builder()
                .username(user.clone())
                .password(password.clone())
                .build(),
        );
    }
    Client::with_options(options)
}

/// Host strings from topology documents already carry ports; bare
/// hostnames from configuration get the configured port appended.
fn endpoint(host: &str, port: Option<u16>) -> String {
    match port {
        Some(port) if !host.contains(':') => format!("{host}:{port}"),
        _ => host.to_string(),
    }
}

pub(crate) fn write_concern(ack: &WriteAck) -> WriteConcern {
    let w = match ack {
        WriteAck::Unacknowledged => Acknowledgment::Nodes(0),
        WriteAck::Primary => Acknowledgment::Nodes(1),
        WriteAck::Majority => Acknowledgment::Majority,
        WriteAck::Nodes(n) => Acknowledgment::Nodes(*n),
    };
    WriteConcern::builder().w(w).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_hosts_get_the_configured_port() {
        assert_eq!(endpoint("m1", Some(27018)), "m1:27018");
        assert_eq!(endpoint("m1:27017", Some(27018)), "m1:27017");
        assert_eq!(endpoint("m1", None), "m1");
    }

    #[test]
    fn ack_levels_map_onto_driver_write_concerns() {
        assert_eq!(
            write_concern(&WriteAck::Unacknowledged).w,
            Some(Acknowledgment::Nodes(0))
        );
        assert_eq!(
            write_concern(&WriteAck::Primary).w,
            Some(Acknowledgment::Nodes(1))
        );
        assert_eq!(
            write_concern(&WriteAck::Majority).w,
            Some(Acknowledgment::Majority)
        );
        assert_eq!(
            write_concern(&WriteAck::Nodes(3)).w,
            Some(Acknowledgment::Nodes(3))
        );
    }
}
