use log::warn;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

const DEF_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
const DEF_PORT: u16 = 5000;
const DEF_DATABASE_URL: &str = "sqlite:./db/proxdash.sqlite3";
const DEF_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub seed_demo_data: bool,
}

lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}

impl AppConfig {
    pub fn from_env() -> Self {
        // a missing .env is fine, the process environment still applies
        dotenv::dotenv().ok();

        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        AppConfig {
            bind_addr: parse_or(&lookup, "BIND_ADDR", DEF_BIND_ADDR),
            port: parse_or(&lookup, "PORT", DEF_PORT),
            database_url: lookup("DATABASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEF_DATABASE_URL.to_owned()),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEF_MAX_CONNECTIONS).max(1),
            seed_demo_data: parse_or(&lookup, "SEED_DEMO_DATA", true),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("invalid value {:?} for {}, falling back to default", raw, key);
                default
            }
        },
        None => default,
    }
}
