use storefront_client::{EndpointClass, EndpointPolicy};

fn classify(path: &str) -> EndpointClass {
    EndpointPolicy.classify(path)
}

#[test]
fn auth_surface_and_catalog_reads_are_public() {
    for path in [
        "auth/login/",
        "auth/register/",
        "auth/refresh/",
        "public/products/",
        "stats/visit/",
        "shops/boutique-dakar/",
        "shops/boutique-dakar/products/",
        "/shops/boutique-dakar/", // leading slash tolerated
    ] {
        assert_eq!(classify(path), EndpointClass::Public, "path: {path}");
    }
}

#[test]
fn merchant_and_account_surfaces_are_protected() {
    for path in [
        "auth/me/",
        "shops/me/",
        "products/",
        "products/42/",
        "stats/me/",
        "utils/check-slug/boutique/",
        "anything/unknown/",
    ] {
        assert_eq!(classify(path), EndpointClass::Protected, "path: {path}");
    }
}

#[test]
fn the_own_shop_exception_wins_over_the_storefront_prefix() {
    assert_eq!(classify("shops/me/"), EndpointClass::Protected);
    // A shop that happens to be named "meow" is still a storefront read.
    assert_eq!(classify("shops/meow/"), EndpointClass::Public);
}
