use model::config::ExtractorConfig;
use tokio_postgres::{Client, Config, NoTls};
use tracing::error;

/// Opens one client for the configured database and drives its
/// connection on a background task. The client owns the connection:
/// dropping it ends the task.
pub(crate) async fn connect(config: &ExtractorConfig) -> Result<Client, tokio_postgres::Error> {
    let mut pg = Config::new();
    for host in &config.hosts {
        pg.host(host);
        if let Some(port) = config.port {
            pg.port(port);
        }
    }
    if let Some(ref user) = config.username {
        pg.user(user);
    }
    if let Some(ref password) = config.password {
        pg.password(password);
    }
    if !config.catalog.is_empty() {
        pg.dbname(&config.catalog);
    }

    let (client, connection) = pg.connect(NoTls).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Postgres connection error");
        }
    });
    Ok(client)
}
