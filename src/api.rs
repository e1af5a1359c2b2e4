use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{
    ApiMessage, Coupon, CouponCreateResponse, CouponListResponse, CouponRedemption,
    CouponSubmission, CouponUses, CouponUsesResponse, DrawListEntry, DrawListResponse, DrawNo,
    DrawResponse, DrawResult, Reply,
};
use reqwest::header::ACCEPT;
use reqwest::{Client, Request, Url};
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("lotto-client/", env!("CARGO_PKG_VERSION"));

/// The lotto service's JSON API as seen by the page handlers.
pub trait LottoApi: Send + Sync {
    fn draw(&self, draw_no: DrawNo) -> impl Future<Output = Result<Reply<DrawResult>>> + Send;

    fn latest_draw(&self) -> impl Future<Output = Result<Reply<DrawResult>>> + Send;

    fn delete_coupon(&self, coupon_id: &str) -> impl Future<Output = Result<ApiMessage>> + Send;

    fn hashtag_draws(
        &self,
        hashtag: &str,
    ) -> impl Future<Output = Result<Reply<Vec<DrawListEntry>>>> + Send;

    fn redeem_coupon(
        &self,
        redemption: &CouponRedemption,
    ) -> impl Future<Output = Result<ApiMessage>> + Send;

    fn list_coupons(&self) -> impl Future<Output = Result<Reply<Vec<Coupon>>>> + Send;

    fn create_coupon(&self) -> impl Future<Output = Result<Reply<String>>> + Send;

    fn coupon_uses(&self, hashtag: &str)
    -> impl Future<Output = Result<Reply<CouponUses>>> + Send;

    fn submit_coupon(
        &self,
        submission: &CouponSubmission,
    ) -> impl Future<Output = Result<ApiMessage>> + Send;
}

/// Whether `segment` survives as one path segment. Url normalization drops
/// `.` and `..`, and an empty segment would change the route.
pub fn is_path_segment(segment: &str) -> bool {
    !matches!(segment, "" | "." | "..")
}

pub struct HttpLottoApi {
    client: Client,
    base_url: Url,
}

impl HttpLottoApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base url.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments.iter().find(|s| !is_path_segment(s)) {
            return Err(Error::InvalidArgument(format!(
                "'{}' is not a usable path segment",
                bad
            )));
        }
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                Error::Config(format!("base url cannot carry a path: {}", self.base_url))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    pub fn draw_request(&self, draw_no: DrawNo) -> Result<Request> {
        let url = self.endpoint(&["lotto", &draw_no.to_string()])?;
        Ok(self.client.get(url).header(ACCEPT, "application/json").build()?)
    }

    pub fn latest_draw_request(&self) -> Result<Request> {
        let url = self.endpoint(&["lotto", "latest"])?;
        Ok(self.client.get(url).header(ACCEPT, "application/json").build()?)
    }

    pub fn delete_coupon_request(&self, coupon_id: &str) -> Result<Request> {
        let url = self.endpoint(&["admin", "coupons"])?;
        Ok(self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .form(&[("action", "delete"), ("coupon_id", coupon_id)])
            .build()?)
    }

    pub fn hashtag_draws_request(&self, hashtag: &str) -> Result<Request> {
        let url = self.endpoint(&["lotto", "draws", hashtag])?;
        Ok(self.client.get(url).header(ACCEPT, "application/json").build()?)
    }

    pub fn redeem_coupon_request(&self, redemption: &CouponRedemption) -> Result<Request> {
        let url = self.endpoint(&["lotto", "coupon", "use"])?;
        Ok(self.client.post(url).json(redemption).build()?)
    }

    pub fn list_coupons_request(&self) -> Result<Request> {
        let url = self.endpoint(&["api", "coupons"])?;
        Ok(self.client.get(url).header(ACCEPT, "application/json").build()?)
    }

    pub fn create_coupon_request(&self) -> Result<Request> {
        let url = self.endpoint(&["admin", "coupons", "create"])?;
        Ok(self.client.post(url).header(ACCEPT, "application/json").build()?)
    }

    pub fn coupon_uses_request(&self, hashtag: &str) -> Result<Request> {
        let url = self.endpoint(&["lotto", "coupon", "lookup"])?;
        Ok(self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .query(&[("hashtag", hashtag)])
            .build()?)
    }

    pub fn submit_coupon_request(&self, submission: &CouponSubmission) -> Result<Request> {
        let url = self.endpoint(&["lotto", "coupon", "submit"])?;
        Ok(self.client.post(url).json(submission).build()?)
    }

    pub fn login_request(&self, username: &str, password: &str) -> Result<Request> {
        let url = self.endpoint(&["admin", "login"])?;
        Ok(self
            .client
            .post(url)
            .form(&[("username", username), ("password", password)])
            .build()?)
    }

    /// Opens an admin session; the session cookie stays in this client.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let request = self.login_request(username, password)?;
        let response = self.client.execute(request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, body });
        }

        // A rejected login redirects back to the login form.
        if response.url().path().trim_end_matches('/').ends_with("/admin/login") {
            return Err(Error::Auth(format!("login rejected for user '{}'", username)));
        }

        info!(username, "admin session established");
        Ok(())
    }

    async fn fetch<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        debug!(method = %request.method(), url = %request.url(), "sending request");

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<T>(&body) {
            Ok(value) => Ok(value),
            Err(_) if !status.is_success() => Err(Error::Status { status, body }),
            Err(e) => Err(Error::Json(e)),
        }
    }
}

impl LottoApi for HttpLottoApi {
    async fn draw(&self, draw_no: DrawNo) -> Result<Reply<DrawResult>> {
        let body: DrawResponse = self.fetch(self.draw_request(draw_no)?).await?;
        body.into_reply()
    }

    async fn latest_draw(&self) -> Result<Reply<DrawResult>> {
        let body: DrawResponse = self.fetch(self.latest_draw_request()?).await?;
        body.into_reply()
    }

    async fn delete_coupon(&self, coupon_id: &str) -> Result<ApiMessage> {
        self.fetch(self.delete_coupon_request(coupon_id)?).await
    }

    async fn hashtag_draws(&self, hashtag: &str) -> Result<Reply<Vec<DrawListEntry>>> {
        let body: DrawListResponse = self.fetch(self.hashtag_draws_request(hashtag)?).await?;
        Ok(body.into_reply())
    }

    async fn redeem_coupon(&self, redemption: &CouponRedemption) -> Result<ApiMessage> {
        self.fetch(self.redeem_coupon_request(redemption)?).await
    }

    async fn list_coupons(&self) -> Result<Reply<Vec<Coupon>>> {
        let body: CouponListResponse = self.fetch(self.list_coupons_request()?).await?;
        Ok(body.into_reply())
    }

    async fn create_coupon(&self) -> Result<Reply<String>> {
        let body: CouponCreateResponse = self.fetch(self.create_coupon_request()?).await?;
        body.into_reply()
    }

    async fn coupon_uses(&self, hashtag: &str) -> Result<Reply<CouponUses>> {
        let body: CouponUsesResponse = self.fetch(self.coupon_uses_request(hashtag)?).await?;
        Ok(body.into_reply())
    }

    async fn submit_coupon(&self, submission: &CouponSubmission) -> Result<ApiMessage> {
        self.fetch(self.submit_coupon_request(submission)?).await
    }
}
