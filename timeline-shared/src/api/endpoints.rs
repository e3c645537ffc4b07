pub const GRAPHQL_PATH: &str = "/graphql";
pub const PLAYGROUND_PATH: &str = "/";
pub const HEALTH_PATH: &str = "/healthz";

fn base_join(base: &str, path: &str) -> String {
    let b = base.trim_end_matches('/');
    let p = path.trim_start_matches('/');
    format!("{}/{}", b, p)
}

pub fn graphql(base: &str) -> String {
    base_join(base, GRAPHQL_PATH)
}

pub fn health(base: &str) -> String {
    base_join(base, HEALTH_PATH)
}

#[cfg(test)]
mod tests {
    #[test]
    fn joins_without_double_slashes() {
        assert_eq!(
            super::graphql("http://localhost:8080/"),
            "http://localhost:8080/graphql"
        );
        assert_eq!(super::health("http://h"), "http://h/healthz");
    }
}
