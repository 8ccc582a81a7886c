use crate::Result;
use std::fmt::Display;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

const MYSQL_PORT: u16 = 3306;

/// Credentials and image tag of the throwaway MySQL server.
///
/// Defaults match the `mayfly` database the stores migrate into.
#[derive(Debug, Clone, TypedBuilder)]
pub struct MysqlConfig {
    #[builder(default = "mayfly".to_string())]
    database: String,
    #[builder(default = "mayfly".to_string())]
    username: String,
    #[builder(default = "mayfly".to_string())]
    password: String,
    #[builder(default = "8.4".to_string())]
    tag: String,
}

impl MysqlConfig {
    fn dsn(&self, host: impl Display, port: u16) -> String {
        format!(
            "mysql://{}:{}@{host}:{port}/{}",
            self.username, self.password, self.database
        )
    }
}

/// A MySQL container for the storage integration tests.
///
/// Dropping it removes the container.
pub struct MySqlServer {
    container: ContainerAsync<GenericImage>,
    config: MysqlConfig,
}

impl MySqlServer {
    pub async fn new(config: MysqlConfig) -> Result<Self> {
        let container = GenericImage::new("mysql", config.tag.as_str())
            .with_exposed_port(MYSQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr("ready for connections"))
            .with_env_var("MYSQL_DATABASE", config.database.as_str())
            .with_env_var("MYSQL_USER", config.username.as_str())
            .with_env_var("MYSQL_PASSWORD", config.password.as_str())
            .with_env_var("MYSQL_ROOT_PASSWORD", config.password.as_str())
            .start()
            .await?;

        Ok(Self { container, config })
    }

    /// DSN of the test database as seen from the host, for `MySqlPool::connect`.
    pub async fn database_url(&self) -> Result<String> {
        let host = self.container.get_host().await?;
        let port = self.container.get_host_port_ipv4(MYSQL_PORT).await?;
        Ok(self.config.dsn(host, port))
    }
}
