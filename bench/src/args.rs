use clap::Parser;
use reqwest::{Method, Url};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// Number of readiness probes sent before the server is considered unavailable.
pub const PING_RETRIES: u32 = 10;

const DEFAULT_SERVER_SOURCE_PATH: &str = "server";
const DEFAULT_METHOD: &str = "GET";
const DEFAULT_SCHEME: &str = "http";
const DEFAULT_HOST: &str = "127.0.0.1:9090";
const DEFAULT_PATH: &str = "/helloworld";
const DEFAULT_PING_DELAY: &str = "100ms";
const DEFAULT_VEGETA_PROGRAM: &str = "vegeta";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct BenchArgs {
    /// Server source path (cargo package directory). When empty the server is not built and
    /// started, instead the server is expected to already be running on '--host'
    #[arg(long, env = "HELLO_BENCH_RUN", default_value = DEFAULT_SERVER_SOURCE_PATH)]
    pub run: String,

    /// Binary target to build, required when the server package has more than one
    #[arg(long, env = "HELLO_BENCH_BIN")]
    pub bin: Option<String>,

    /// HTTP request method
    #[arg(long, env = "HELLO_BENCH_METHOD", default_value = DEFAULT_METHOD, value_parser = parse_method)]
    pub method: Method,

    /// Server host address scheme
    #[arg(long, env = "HELLO_BENCH_SCHEME", default_value = DEFAULT_SCHEME)]
    pub scheme: String,

    /// Server host address
    #[arg(long, env = "HELLO_BENCH_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// URL path
    #[arg(long, env = "HELLO_BENCH_PATH", default_value = DEFAULT_PATH)]
    pub path: String,

    /// Delay between server pings
    #[arg(long, env = "HELLO_BENCH_PING_DELAY", default_value = DEFAULT_PING_DELAY, value_parser = humantime::parse_duration)]
    pub ping_delay: Duration,

    /// Vegeta attack arguments, each one is passed as '-KEY=VALUE'
    /// (multiple values accepted, e.g. '--veg rate=0 --veg duration=5s')
    #[arg(long = "veg", value_name = "KEY=VALUE")]
    pub vegeta_args: Vec<String>,

    /// Server environment variables
    /// (multiple values accepted, e.g. '--env TOKIO_WORKER_THREADS=1 --env FOO=BAR')
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_var)]
    pub env_vars: Vec<EnvVar>,

    /// Vegeta executable
    #[arg(long, env = "HELLO_BENCH_VEGETA", default_value = DEFAULT_VEGETA_PROGRAM)]
    pub vegeta: PathBuf,
}

fn parse_method(v: &str) -> Result<Method, String> {
    Method::from_bytes(v.as_bytes()).map_err(|_| format!("Invalid HTTP method '{v}'."))
}

fn parse_env_var(v: &str) -> Result<EnvVar, String> {
    match v.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok(EnvVar {
            key: key.to_owned(),
            value: value.to_owned(),
        }),
        _ => Err(format!("Invalid environment variable '{v}', expected KEY=VALUE.")),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

impl Display for EnvVar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSource {
    pub path: PathBuf,
    pub bin: Option<String>,
}

/// Resolved, read-only benchmark configuration.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// `None` when the server is expected to already be running.
    pub server: Option<ServerSource>,
    pub host: String,
    pub method: Method,
    pub url: Url,
    pub ping_delay: Duration,
    pub ping_retries: u32,
    pub env_vars: Vec<EnvVar>,
    pub vegeta: PathBuf,
    pub vegeta_args: Vec<String>,
}

impl TryFrom<BenchArgs> for BenchConfig {
    type Error = String;

    fn try_from(args: BenchArgs) -> Result<Self, Self::Error> {
        let raw_url = format!("{}://{}{}", args.scheme, args.host, args.path);
        let url = Url::parse(&raw_url)
            .map_err(|err| format!("Invalid server URL '{raw_url}': {err}"))?;
        let server = if args.run.is_empty() {
            None
        } else {
            Some(ServerSource {
                path: PathBuf::from(args.run),
                bin: args.bin,
            })
        };

        Ok(BenchConfig {
            server,
            host: args.host,
            method: args.method,
            url,
            ping_delay: args.ping_delay,
            ping_retries: PING_RETRIES,
            env_vars: args.env_vars,
            vegeta: args.vegeta,
            vegeta_args: args.vegeta_args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> BenchConfig {
        let args =
            BenchArgs::try_parse_from(std::iter::once("hello-bench").chain(args.iter().copied()))
                .unwrap();
        BenchConfig::try_from(args).unwrap()
    }

    #[test]
    fn defaults_should_target_local_hello_world() {
        let config = config(&[]);
        assert_eq!(config.url.as_str(), "http://127.0.0.1:9090/helloworld");
        assert_eq!(config.method, Method::GET);
        assert_eq!(config.host, "127.0.0.1:9090");
        assert_eq!(config.ping_delay, Duration::from_millis(100));
        assert_eq!(config.ping_retries, 10);
        assert_eq!(config.vegeta, PathBuf::from("vegeta"));
        assert_eq!(
            config.server,
            Some(ServerSource {
                path: PathBuf::from("server"),
                bin: None
            })
        );
        assert!(config.env_vars.is_empty());
        assert!(config.vegeta_args.is_empty());
    }

    #[test]
    fn empty_run_should_skip_server_start() {
        let config = config(&["--run", ""]);
        assert_eq!(config.server, None);
    }

    #[test]
    fn repeated_flags_should_be_collected_in_order() {
        let config = config(&[
            "--veg",
            "rate=0",
            "--veg",
            "duration=5s",
            "--env",
            "TOKIO_WORKER_THREADS=1",
            "--env",
            "FOO=BAR=BAZ",
        ]);
        assert_eq!(config.vegeta_args, vec!["rate=0", "duration=5s"]);
        assert_eq!(
            config.env_vars,
            vec![
                EnvVar {
                    key: "TOKIO_WORKER_THREADS".to_owned(),
                    value: "1".to_owned()
                },
                EnvVar {
                    key: "FOO".to_owned(),
                    value: "BAR=BAZ".to_owned()
                },
            ]
        );
        assert_eq!(config.env_vars[1].to_string(), "FOO=BAR=BAZ");
    }

    #[test]
    fn url_should_be_built_from_scheme_host_and_path() {
        let config = config(&[
            "--scheme",
            "https",
            "--host",
            "localhost:8443",
            "--path",
            "/a/b?c=d",
            "--method",
            "POST",
            "--ping-delay",
            "2s",
        ]);
        assert_eq!(config.url.as_str(), "https://localhost:8443/a/b?c=d");
        assert_eq!(config.method, Method::POST);
        assert_eq!(config.ping_delay, Duration::from_secs(2));
    }

    #[test]
    fn env_var_without_separator_should_be_rejected() {
        let result = BenchArgs::try_parse_from(["hello-bench", "--env", "NOVALUE"]);
        assert!(result.is_err());
        let result = BenchArgs::try_parse_from(["hello-bench", "--env", "=VALUE"]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_method_should_be_rejected() {
        let result = BenchArgs::try_parse_from(["hello-bench", "--method", "GE T"]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_url_should_be_rejected() {
        let args = BenchArgs::try_parse_from(["hello-bench", "--host", "bad host:80"]).unwrap();
        assert!(BenchConfig::try_from(args).is_err());
    }
}
