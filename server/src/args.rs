use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// HTTP host address, an empty host part (e.g. ":8080") listens on all interfaces
    #[arg(long, env = "HELLO_SERVER_HOST", default_value = ":8080")]
    pub host: String,
}

impl Args {
    pub fn address(&self) -> String {
        listen_address(&self.host)
    }
}

fn listen_address(host: &str) -> String {
    if host.starts_with(':') {
        format!("0.0.0.0{host}")
    } else {
        host.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_listen_on_all_interfaces_when_host_is_empty() {
        assert_eq!(listen_address(":8080"), "0.0.0.0:8080");
    }

    #[test]
    fn should_keep_explicit_host() {
        assert_eq!(listen_address("127.0.0.1:9090"), "127.0.0.1:9090");
        assert_eq!(listen_address("localhost:9090"), "localhost:9090");
    }

    #[test]
    fn should_parse_host_flag() {
        let args = Args::parse_from(["hello-server", "--host", "127.0.0.1:9090"]);
        assert_eq!(args.address(), "127.0.0.1:9090");
    }
}
