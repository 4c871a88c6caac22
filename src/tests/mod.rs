pub(crate) mod refresh_failure;
pub(crate) mod test_support;

use crate::Config;

#[test]
fn base_url_is_normalized_before_any_network_call() {
    let cfg = Config::from_values("api.example.com/api", None, None);
    let url = cfg.parsed_base_url().expect("valid url");
    assert_eq!(url.as_str(), "https://api.example.com/api/");

    let cfg = Config::from_values("http://localhost:8000/api/", None, None);
    let url = cfg.parsed_base_url().expect("valid url");
    assert_eq!(url.as_str(), "http://localhost:8000/api/");

    let cfg = Config::from_values("http://bad url", None, None);
    assert!(cfg.parsed_base_url().is_err());
}
