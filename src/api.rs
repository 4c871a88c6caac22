//! Typed surface over the backend's resources. Every call routes through
//! `StorefrontClient::execute`, so the authentication pipeline (header
//! attachment, refresh-and-replay, session termination) applies uniformly.
//! No business validation happens here; the backend owns that.

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::client::{ApiRequest, StorefrontClient};
use crate::errors::Error;

#[derive(Clone, Debug, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Account {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub shop_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct RegisterResponse {
    access: String,
    refresh: String,
    user: Account,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Shop {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ShopUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
}

/// Price stays a string: the backend serializes decimals as quoted values.
#[derive(Clone, Debug, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitAction {
    View,
    WhatsappClick,
}

#[derive(Clone, Debug, Serialize)]
struct VisitPayload<'a> {
    shop_slug: &'a str,
    action: VisitAction,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DailyVisits {
    pub date: Date,
    pub count: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChartPoint {
    pub date: Date,
    pub visits: u64,
    pub whatsapp: u64,
    pub count: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ShopStats {
    pub total_visits: u64,
    pub total_products: u64,
    pub visits_by_day: Vec<DailyVisits>,
    pub chart_data: Vec<ChartPoint>,
}

#[derive(Clone, Debug, Deserialize)]
struct SlugCheck {
    available: bool,
}

impl StorefrontClient {
    /// POST `auth/login/`. Stores both tokens and re-arms the session signal
    /// so a later expiry can terminate again.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, Error> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self.execute(ApiRequest::post("auth/login/", body)).await?;
        let pair: TokenPair = response.json()?;
        self.credentials()
            .set_tokens(pair.access.clone(), pair.refresh.clone())
            .await?;
        self.session().rearm();
        Ok(pair)
    }

    /// POST `auth/register/`. The backend issues a token pair alongside the
    /// new account; both are stored as with `login`.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Account, Error> {
        let response = self
            .execute(ApiRequest::post(
                "auth/register/",
                serde_json::to_value(request)?,
            ))
            .await?;
        let registered: RegisterResponse = response.json()?;
        self.credentials()
            .set_tokens(registered.access, registered.refresh)
            .await?;
        self.session().rearm();
        Ok(registered.user)
    }

    /// Voluntary sign-out: drop the token pair without raising the
    /// session-invalid signal.
    pub async fn logout(&self) -> Result<(), Error> {
        self.credentials().clear().await
    }

    pub async fn me(&self) -> Result<Account, Error> {
        self.execute(ApiRequest::get("auth/me/")).await?.json()
    }

    pub async fn my_shop(&self) -> Result<Shop, Error> {
        self.execute(ApiRequest::get("shops/me/")).await?.json()
    }

    pub async fn update_my_shop(&self, update: &ShopUpdate) -> Result<Shop, Error> {
        self.execute(ApiRequest::put("shops/me/", serde_json::to_value(update)?))
            .await?
            .json()
    }

    /// Public storefront read; never authenticated.
    pub async fn shop_by_slug(&self, slug: &str) -> Result<Shop, Error> {
        let path = format!("shops/{}/", urlencoding::encode(slug));
        self.execute(ApiRequest::get(path)).await?.json()
    }

    /// Public product listing for one storefront.
    pub async fn shop_products(&self, slug: &str) -> Result<Vec<Product>, Error> {
        let path = format!("shops/{}/products/", urlencoding::encode(slug));
        self.execute(ApiRequest::get(path)).await?.json()
    }

    pub async fn check_slug(&self, slug: &str) -> Result<bool, Error> {
        let path = format!("utils/check-slug/{}/", urlencoding::encode(slug));
        let check: SlugCheck = self.execute(ApiRequest::get(path)).await?.json()?;
        Ok(check.available)
    }

    pub async fn products(&self) -> Result<Vec<Product>, Error> {
        self.execute(ApiRequest::get("products/")).await?.json()
    }

    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, Error> {
        self.execute(ApiRequest::post("products/", serde_json::to_value(input)?))
            .await?
            .json()
    }

    pub async fn product(&self, id: u64) -> Result<Product, Error> {
        self.execute(ApiRequest::get(format!("products/{id}/")))
            .await?
            .json()
    }

    pub async fn update_product(&self, id: u64, input: &ProductInput) -> Result<Product, Error> {
        self.execute(ApiRequest::put(
            format!("products/{id}/"),
            serde_json::to_value(input)?,
        ))
        .await?
        .json()
    }

    pub async fn delete_product(&self, id: u64) -> Result<(), Error> {
        self.execute(ApiRequest::delete(format!("products/{id}/")))
            .await?;
        Ok(())
    }

    pub async fn public_products(&self) -> Result<Vec<Product>, Error> {
        self.execute(ApiRequest::get("public/products/"))
            .await?
            .json()
    }

    /// Public visit tracking; a rejection here is terminal for the write and
    /// never escalates to a refresh.
    pub async fn record_visit(&self, shop_slug: &str, action: VisitAction) -> Result<(), Error> {
        let payload = VisitPayload { shop_slug, action };
        self.execute(ApiRequest::post(
            "stats/visit/",
            serde_json::to_value(&payload)?,
        ))
        .await?;
        Ok(())
    }

    pub async fn my_stats(&self) -> Result<ShopStats, Error> {
        self.execute(ApiRequest::get("stats/me/")).await?.json()
    }
}
